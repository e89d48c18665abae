pub(crate) mod color;
pub(crate) mod drawable;
pub(crate) mod font;
