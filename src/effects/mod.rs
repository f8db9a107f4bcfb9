pub(crate) mod blur;
pub(crate) mod glyph;
pub(crate) mod line;
pub(crate) mod noise;
pub(crate) mod text;
