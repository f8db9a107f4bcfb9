pub(crate) mod charset;
pub(crate) mod fonts;
pub mod palette;
