pub(crate) mod decoder;
pub(crate) mod resolver;
pub(crate) mod timeline;
