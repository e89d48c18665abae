pub(crate) mod config;
pub(crate) mod gif;
pub(crate) mod palette;
pub(crate) mod session;
pub(crate) mod sink;
