//! Choosing the table format for a paint.
//!
//! Each kind of paint has one or more concrete formats in the COLR table. The
//! format is never chosen explicitly; it follows from which optional
//! parameters are present and whether any parameter varies.

use std::fmt::Display;

/// The 32 paint table formats.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u8)]
pub enum PaintFormat {
    ColrLayers = 1,
    Solid = 2,
    VarSolid = 3,
    LinearGradient = 4,
    VarLinearGradient = 5,
    RadialGradient = 6,
    VarRadialGradient = 7,
    SweepGradient = 8,
    VarSweepGradient = 9,
    Glyph = 10,
    ColrGlyph = 11,
    Transform = 12,
    VarTransform = 13,
    Translate = 14,
    VarTranslate = 15,
    Scale = 16,
    VarScale = 17,
    ScaleAroundCenter = 18,
    VarScaleAroundCenter = 19,
    ScaleUniform = 20,
    VarScaleUniform = 21,
    ScaleUniformAroundCenter = 22,
    VarScaleUniformAroundCenter = 23,
    Rotate = 24,
    VarRotate = 25,
    RotateAroundCenter = 26,
    VarRotateAroundCenter = 27,
    Skew = 28,
    VarSkew = 29,
    SkewAroundCenter = 30,
    VarSkewAroundCenter = 31,
    Composite = 32,
}

/// The logical kinds of paint, independent of format.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PaintFamily {
    ColrLayers,
    Solid,
    LinearGradient,
    RadialGradient,
    SweepGradient,
    Glyph,
    ColrGlyph,
    Transform,
    Translate,
    Scale,
    Rotate,
    Skew,
    Composite,
}

/// The facts about a paint's parameters that determine its format.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct FormatParams {
    /// A scale has a vertical factor distinct from its horizontal one.
    pub has_scale_y: bool,
    /// A scale, rotation or skew has an explicit center.
    pub has_center: bool,
    /// Any parameter, including the center, varies.
    pub variable: bool,
}

impl PaintFormat {
    /// The format number, as written in the table.
    pub fn format_byte(self) -> u8 {
        self as u8
    }

    /// Returns `true` if this format carries a `var_index_base`.
    pub fn is_variable(self) -> bool {
        matches!(
            self,
            PaintFormat::VarSolid
                | PaintFormat::VarLinearGradient
                | PaintFormat::VarRadialGradient
                | PaintFormat::VarSweepGradient
                | PaintFormat::VarTransform
                | PaintFormat::VarTranslate
                | PaintFormat::VarScale
                | PaintFormat::VarScaleAroundCenter
                | PaintFormat::VarScaleUniform
                | PaintFormat::VarScaleUniformAroundCenter
                | PaintFormat::VarRotate
                | PaintFormat::VarRotateAroundCenter
                | PaintFormat::VarSkew
                | PaintFormat::VarSkewAroundCenter
        )
    }
}

/// Select the most specific format for a paint.
///
/// Optional parameters that do not apply to a family are ignored, as is
/// variability for the families that have no variable format.
pub fn select_format(family: PaintFamily, params: FormatParams) -> PaintFormat {
    use PaintFormat::*;
    let FormatParams {
        has_scale_y,
        has_center,
        variable,
    } = params;
    let pick = |fixed, var| if variable { var } else { fixed };
    match family {
        PaintFamily::ColrLayers => ColrLayers,
        PaintFamily::Solid => pick(Solid, VarSolid),
        PaintFamily::LinearGradient => pick(LinearGradient, VarLinearGradient),
        PaintFamily::RadialGradient => pick(RadialGradient, VarRadialGradient),
        PaintFamily::SweepGradient => pick(SweepGradient, VarSweepGradient),
        PaintFamily::Glyph => Glyph,
        PaintFamily::ColrGlyph => ColrGlyph,
        PaintFamily::Transform => pick(Transform, VarTransform),
        PaintFamily::Translate => pick(Translate, VarTranslate),
        PaintFamily::Scale => match (has_scale_y, has_center) {
            (true, false) => pick(Scale, VarScale),
            (true, true) => pick(ScaleAroundCenter, VarScaleAroundCenter),
            (false, false) => pick(ScaleUniform, VarScaleUniform),
            (false, true) => pick(ScaleUniformAroundCenter, VarScaleUniformAroundCenter),
        },
        PaintFamily::Rotate if has_center => pick(RotateAroundCenter, VarRotateAroundCenter),
        PaintFamily::Rotate => pick(Rotate, VarRotate),
        PaintFamily::Skew if has_center => pick(SkewAroundCenter, VarSkewAroundCenter),
        PaintFamily::Skew => pick(Skew, VarSkew),
        PaintFamily::Composite => Composite,
    }
}

impl Display for PaintFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Paint{self:?} (format {})", self.format_byte())
    }
}
