//! test data shared by the paint-compiler tests.

/// A paint document with one glyph for each of the 32 paint formats.
///
/// Each glyph is named for the format of its interesting paint, e.g.
/// `p19_PaintVarScaleAroundCenter`. Variable paints use axes whose values
/// are the parameter values themselves, in user space.
pub static ALL_FORMATS: &str = include_str!("../test_data/paints.json");

/// The outline glyphs masked by [`ALL_FORMATS`].
pub static OUTLINE_GLYPHS: &[&str] = &["square", "circle", "star"];
