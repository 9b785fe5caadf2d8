//! Paint expressions, as declared by the user.
//!
//! These describe what a glyph should look like without reference to the
//! table formats used to encode it; choosing a format is the job of the
//! compiler.

use indexmap::IndexMap;

use crate::{color::Color, error::ErrorKind, variation::Value};

pub use read_fonts::tables::colr::{CompositeMode, Extend};

/// The names accepted for an [`Extend`] mode.
pub const EXTEND_NAMES: &[&str] = &["pad", "repeat", "reflect"];

/// The names accepted for a [`CompositeMode`].
pub const COMPOSITE_MODE_NAMES: &[&str] = &[
    "clear",
    "src",
    "dest",
    "src_over",
    "dest_over",
    "src_in",
    "dest_in",
    "src_out",
    "dest_out",
    "src_atop",
    "dest_atop",
    "xor",
    "plus",
    "screen",
    "overlay",
    "darken",
    "lighten",
    "color_dodge",
    "color_burn",
    "hard_light",
    "soft_light",
    "difference",
    "exclusion",
    "multiply",
    "hsl_hue",
    "hsl_saturation",
    "hsl_color",
    "hsl_luminosity",
];

/// Every [`CompositeMode`], in the order of [`COMPOSITE_MODE_NAMES`].
const COMPOSITE_MODES: [CompositeMode; 28] = [
    CompositeMode::Clear,
    CompositeMode::Src,
    CompositeMode::Dest,
    CompositeMode::SrcOver,
    CompositeMode::DestOver,
    CompositeMode::SrcIn,
    CompositeMode::DestIn,
    CompositeMode::SrcOut,
    CompositeMode::DestOut,
    CompositeMode::SrcAtop,
    CompositeMode::DestAtop,
    CompositeMode::Xor,
    CompositeMode::Plus,
    CompositeMode::Screen,
    CompositeMode::Overlay,
    CompositeMode::Darken,
    CompositeMode::Lighten,
    CompositeMode::ColorDodge,
    CompositeMode::ColorBurn,
    CompositeMode::HardLight,
    CompositeMode::SoftLight,
    CompositeMode::Difference,
    CompositeMode::Exclusion,
    CompositeMode::Multiply,
    CompositeMode::HslHue,
    CompositeMode::HslSaturation,
    CompositeMode::HslColor,
    CompositeMode::HslLuminosity,
];

/// A node in a paint tree.
///
/// Any scalar parameter may be a constant or a [`VariationSpec`][crate::VariationSpec].
/// Optional parameters (a scale's `scale_y` and the `center` of the transform
/// kinds) affect which table format is selected when the tree is compiled.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "json", derive(serde::Deserialize))]
#[cfg_attr(feature = "json", serde(deny_unknown_fields))]
pub enum PaintExpr {
    SolidFill {
        color: Color,
        #[cfg_attr(feature = "json", serde(default = "Value::opaque"))]
        alpha: Value,
    },
    LinearGradient {
        p0: Point,
        p1: Point,
        p2: Point,
        color_line: ColorLineSpec,
    },
    RadialGradient {
        c0: Point,
        r0: Value,
        c1: Point,
        r1: Value,
        color_line: ColorLineSpec,
    },
    SweepGradient {
        center: Point,
        start_angle: Value,
        end_angle: Value,
        color_line: ColorLineSpec,
    },
    /// Fill the outline of `glyph` with `paint`.
    GlyphMask { glyph: String, paint: Box<PaintExpr> },
    /// Reuse the paint tree of another color glyph.
    ///
    /// If `paint` is present, it is drawn in place of the referenced glyph's
    /// colors, masked by the referenced glyph.
    ColorGlyphReference {
        glyph: String,
        #[cfg_attr(feature = "json", serde(default))]
        paint: Option<Box<PaintExpr>>,
    },
    AffineTransform {
        transform: Affine,
        paint: Box<PaintExpr>,
    },
    Translate {
        dx: Value,
        dy: Value,
        paint: Box<PaintExpr>,
    },
    Scale {
        scale_x: Value,
        #[cfg_attr(feature = "json", serde(default))]
        scale_y: Option<Value>,
        #[cfg_attr(feature = "json", serde(default))]
        center: Option<Point>,
        paint: Box<PaintExpr>,
    },
    Rotate {
        angle: Value,
        #[cfg_attr(feature = "json", serde(default))]
        center: Option<Point>,
        paint: Box<PaintExpr>,
    },
    Skew {
        x_skew_angle: Value,
        y_skew_angle: Value,
        #[cfg_attr(feature = "json", serde(default))]
        center: Option<Point>,
        paint: Box<PaintExpr>,
    },
    Composite {
        mode: String,
        source: Box<PaintExpr>,
        backdrop: Box<PaintExpr>,
    },
    LayerStack { layers: Vec<PaintExpr> },
}

/// A point whose coordinates may vary.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "json", derive(serde::Deserialize))]
#[cfg_attr(feature = "json", serde(from = "(Value, Value)"))]
pub struct Point {
    pub x: Value,
    pub y: Value,
}

/// A 2x3 affine matrix, in the field order of the binary table.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "json", derive(serde::Deserialize))]
#[cfg_attr(feature = "json", serde(deny_unknown_fields))]
pub struct Affine {
    pub xx: Value,
    pub yx: Value,
    pub xy: Value,
    pub yy: Value,
    pub dx: Value,
    pub dy: Value,
}

/// The stops of a gradient, and how it extends beyond them.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "json", derive(serde::Deserialize))]
#[cfg_attr(feature = "json", serde(deny_unknown_fields))]
pub struct ColorLineSpec {
    #[cfg_attr(feature = "json", serde(deserialize_with = "crate::document::stops"))]
    pub stops: Vec<ColorStopSpec>,
    /// One of [`EXTEND_NAMES`].
    #[cfg_attr(feature = "json", serde(default = "default_extend"))]
    pub extend: String,
}

/// A single gradient stop.
#[derive(Clone, Debug, PartialEq)]
pub struct ColorStopSpec {
    pub offset: Value,
    pub color: Color,
    pub alpha: Value,
}

/// The paint declarations for a set of glyphs, in declaration order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Declarations {
    glyphs: IndexMap<String, PaintExpr>,
}

#[cfg(feature = "json")]
fn default_extend() -> String {
    EXTEND_NAMES[0].to_owned()
}

impl PaintExpr {
    pub fn solid(color: Color) -> Self {
        PaintExpr::SolidFill {
            color,
            alpha: Value::opaque(),
        }
    }

    pub fn solid_with_alpha(color: Color, alpha: impl Into<Value>) -> Self {
        PaintExpr::SolidFill {
            color,
            alpha: alpha.into(),
        }
    }

    pub fn linear_gradient(p0: Point, p1: Point, p2: Point, color_line: ColorLineSpec) -> Self {
        PaintExpr::LinearGradient {
            p0,
            p1,
            p2,
            color_line,
        }
    }

    pub fn radial_gradient(
        c0: Point,
        r0: impl Into<Value>,
        c1: Point,
        r1: impl Into<Value>,
        color_line: ColorLineSpec,
    ) -> Self {
        PaintExpr::RadialGradient {
            c0,
            r0: r0.into(),
            c1,
            r1: r1.into(),
            color_line,
        }
    }

    pub fn sweep_gradient(
        center: Point,
        start_angle: impl Into<Value>,
        end_angle: impl Into<Value>,
        color_line: ColorLineSpec,
    ) -> Self {
        PaintExpr::SweepGradient {
            center,
            start_angle: start_angle.into(),
            end_angle: end_angle.into(),
            color_line,
        }
    }

    pub fn glyph(glyph: impl Into<String>, paint: PaintExpr) -> Self {
        PaintExpr::GlyphMask {
            glyph: glyph.into(),
            paint: Box::new(paint),
        }
    }

    pub fn colr_glyph(glyph: impl Into<String>) -> Self {
        PaintExpr::ColorGlyphReference {
            glyph: glyph.into(),
            paint: None,
        }
    }

    /// Paint `paint` through the shape of another color glyph.
    pub fn colr_glyph_with_paint(glyph: impl Into<String>, paint: PaintExpr) -> Self {
        PaintExpr::ColorGlyphReference {
            glyph: glyph.into(),
            paint: Some(Box::new(paint)),
        }
    }

    pub fn transform(transform: Affine, paint: PaintExpr) -> Self {
        PaintExpr::AffineTransform {
            transform,
            paint: Box::new(paint),
        }
    }

    pub fn translate(dx: impl Into<Value>, dy: impl Into<Value>, paint: PaintExpr) -> Self {
        PaintExpr::Translate {
            dx: dx.into(),
            dy: dy.into(),
            paint: Box::new(paint),
        }
    }

    /// Scale uniformly.
    ///
    /// Use the builder methods [`with_scale_y`][Self::with_scale_y] and
    /// [`with_center`][Self::with_center] for the other forms.
    pub fn scale(scale: impl Into<Value>, paint: PaintExpr) -> Self {
        PaintExpr::Scale {
            scale_x: scale.into(),
            scale_y: None,
            center: None,
            paint: Box::new(paint),
        }
    }

    pub fn rotate(angle: impl Into<Value>, paint: PaintExpr) -> Self {
        PaintExpr::Rotate {
            angle: angle.into(),
            center: None,
            paint: Box::new(paint),
        }
    }

    pub fn skew(
        x_skew_angle: impl Into<Value>,
        y_skew_angle: impl Into<Value>,
        paint: PaintExpr,
    ) -> Self {
        PaintExpr::Skew {
            x_skew_angle: x_skew_angle.into(),
            y_skew_angle: y_skew_angle.into(),
            center: None,
            paint: Box::new(paint),
        }
    }

    pub fn composite(mode: impl Into<String>, source: PaintExpr, backdrop: PaintExpr) -> Self {
        PaintExpr::Composite {
            mode: mode.into(),
            source: Box::new(source),
            backdrop: Box::new(backdrop),
        }
    }

    pub fn layers(layers: impl IntoIterator<Item = PaintExpr>) -> Self {
        PaintExpr::LayerStack {
            layers: layers.into_iter().collect(),
        }
    }

    /// Set a distinct vertical scale factor on a [`PaintExpr::Scale`].
    ///
    /// Has no effect on other kinds.
    pub fn with_scale_y(mut self, scale: impl Into<Value>) -> Self {
        if let PaintExpr::Scale { scale_y, .. } = &mut self {
            *scale_y = Some(scale.into());
        }
        self
    }

    /// Set the center of a scale, rotation or skew.
    ///
    /// Has no effect on other kinds.
    pub fn with_center(mut self, new_center: Point) -> Self {
        match &mut self {
            PaintExpr::Scale { center, .. }
            | PaintExpr::Rotate { center, .. }
            | PaintExpr::Skew { center, .. } => *center = Some(new_center),
            _ => (),
        }
        self
    }

    /// The name of this kind of node, as used in error paths.
    pub fn kind_name(&self) -> &'static str {
        match self {
            PaintExpr::SolidFill { .. } => "SolidFill",
            PaintExpr::LinearGradient { .. } => "LinearGradient",
            PaintExpr::RadialGradient { .. } => "RadialGradient",
            PaintExpr::SweepGradient { .. } => "SweepGradient",
            PaintExpr::GlyphMask { .. } => "GlyphMask",
            PaintExpr::ColorGlyphReference { .. } => "ColorGlyphReference",
            PaintExpr::AffineTransform { .. } => "AffineTransform",
            PaintExpr::Translate { .. } => "Translate",
            PaintExpr::Scale { .. } => "Scale",
            PaintExpr::Rotate { .. } => "Rotate",
            PaintExpr::Skew { .. } => "Skew",
            PaintExpr::Composite { .. } => "Composite",
            PaintExpr::LayerStack { .. } => "LayerStack",
        }
    }
}

impl Point {
    pub fn new(x: impl Into<Value>, y: impl Into<Value>) -> Self {
        Point {
            x: x.into(),
            y: y.into(),
        }
    }

    pub(crate) fn is_variable(&self) -> bool {
        self.x.is_variable() || self.y.is_variable()
    }
}

impl From<(Value, Value)> for Point {
    fn from((x, y): (Value, Value)) -> Self {
        Point { x, y }
    }
}

impl Affine {
    /// Create a matrix from its entries, in `xx, yx, xy, yy, dx, dy` order.
    pub fn new(entries: [Value; 6]) -> Self {
        let [xx, yx, xy, yy, dx, dy] = entries;
        Affine {
            xx,
            yx,
            xy,
            yy,
            dx,
            dy,
        }
    }

    pub(crate) fn entries(&self) -> [(&'static str, &Value); 6] {
        [
            ("xx", &self.xx),
            ("yx", &self.yx),
            ("xy", &self.xy),
            ("yy", &self.yy),
            ("dx", &self.dx),
            ("dy", &self.dy),
        ]
    }
}

impl ColorLineSpec {
    /// Create a color line from a mapping of constant offsets to colors.
    pub fn new(stops: impl IntoIterator<Item = (f64, Color)>) -> Self {
        ColorLineSpec {
            stops: stops
                .into_iter()
                .map(|(offset, color)| ColorStopSpec::new(offset, color))
                .collect(),
            extend: EXTEND_NAMES[0].to_owned(),
        }
    }

    /// A two-stop color line running from `start` at 0 to `end` at 1.
    pub fn between(start: Color, end: Color) -> Self {
        Self::new([(0.0, start), (1.0, end)])
    }

    /// Create a color line from explicit stops, for when offsets vary.
    pub fn from_stops(stops: impl IntoIterator<Item = ColorStopSpec>) -> Self {
        ColorLineSpec {
            stops: stops.into_iter().collect(),
            extend: EXTEND_NAMES[0].to_owned(),
        }
    }

    pub fn with_extend(mut self, extend: impl Into<String>) -> Self {
        self.extend = extend.into();
        self
    }

    /// Returns `true` if any stop offset or alpha varies.
    pub fn is_variable(&self) -> bool {
        self.stops
            .iter()
            .any(|stop| stop.offset.is_variable() || stop.alpha.is_variable())
    }
}

impl ColorStopSpec {
    pub fn new(offset: impl Into<Value>, color: Color) -> Self {
        ColorStopSpec {
            offset: offset.into(),
            color,
            alpha: Value::opaque(),
        }
    }

    pub fn with_alpha(mut self, alpha: impl Into<Value>) -> Self {
        self.alpha = alpha.into();
        self
    }
}

/// Parse an extend mode; names are matched case-insensitively.
pub fn parse_extend(name: &str) -> Result<Extend, ErrorKind> {
    match name.to_ascii_lowercase().as_str() {
        "pad" => Ok(Extend::Pad),
        "repeat" => Ok(Extend::Repeat),
        "reflect" => Ok(Extend::Reflect),
        _ => Err(ErrorKind::InvalidExtendMode(name.to_owned())),
    }
}

/// Parse a composite mode, so both `src_in` and `SRC_IN` are accepted.
pub fn parse_composite_mode(name: &str) -> Result<CompositeMode, ErrorKind> {
    let lower = name.to_ascii_lowercase();
    COMPOSITE_MODE_NAMES
        .iter()
        .position(|known| *known == lower)
        .map(|idx| COMPOSITE_MODES[idx])
        .ok_or_else(|| ErrorKind::UnknownCompositeMode(name.to_owned()))
}

impl Declarations {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare the paint for a glyph, returning any previous declaration.
    pub fn insert(&mut self, glyph: impl Into<String>, paint: PaintExpr) -> Option<PaintExpr> {
        self.glyphs.insert(glyph.into(), paint)
    }

    /// Builder-style variant of [`insert`][Self::insert].
    pub fn with(mut self, glyph: impl Into<String>, paint: PaintExpr) -> Self {
        self.insert(glyph, paint);
        self
    }

    pub fn get(&self, glyph: &str) -> Option<&PaintExpr> {
        self.glyphs.get(glyph)
    }

    pub fn contains(&self, glyph: &str) -> bool {
        self.glyphs.contains_key(glyph)
    }

    /// The position of `glyph` in declaration order.
    pub(crate) fn position(&self, glyph: &str) -> Option<usize> {
        self.glyphs.get_index_of(glyph)
    }

    pub fn len(&self) -> usize {
        self.glyphs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.glyphs.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &PaintExpr)> + '_ {
        self.glyphs.iter().map(|(name, paint)| (name.as_str(), paint))
    }
}

impl FromIterator<(String, PaintExpr)> for Declarations {
    fn from_iter<T: IntoIterator<Item = (String, PaintExpr)>>(iter: T) -> Self {
        Declarations {
            glyphs: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn composite_mode_names() {
        assert_eq!(parse_composite_mode("src_in"), Ok(CompositeMode::SrcIn));
        assert_eq!(parse_composite_mode("MULTIPLY"), Ok(CompositeMode::Multiply));
        assert_eq!(
            parse_composite_mode("Hsl_Luminosity"),
            Ok(CompositeMode::HslLuminosity)
        );
        assert_eq!(
            parse_composite_mode("srcin"),
            Err(ErrorKind::UnknownCompositeMode("srcin".into()))
        );
        for (i, name) in COMPOSITE_MODE_NAMES.iter().enumerate() {
            let mode = parse_composite_mode(name).unwrap();
            assert_eq!(mode as usize, i);
        }
    }

    #[test]
    fn extend_names() {
        assert_eq!(parse_extend("reflect"), Ok(Extend::Reflect));
        assert_eq!(parse_extend("PAD"), Ok(Extend::Pad));
        assert!(matches!(
            parse_extend("mirror"),
            Err(ErrorKind::InvalidExtendMode(_))
        ));
    }

    #[test]
    fn optional_parameters() {
        let fill = PaintExpr::solid(Color::Foreground);
        let scale = PaintExpr::scale(2.0, fill.clone())
            .with_scale_y(0.5)
            .with_center(Point::new(10, 20));
        let PaintExpr::Scale {
            scale_y, center, ..
        } = &scale
        else {
            panic!("not a scale: {scale:?}");
        };
        assert_eq!(scale_y, &Some(Value::Constant(0.5)));
        assert_eq!(center, &Some(Point::new(10, 20)));
        // no-op on other kinds
        assert_eq!(fill.clone().with_scale_y(2.0), fill);
    }

    #[test]
    fn color_line_between() {
        let red: Color = "#FF0000FF".parse().unwrap();
        let blue: Color = "#0000FFFF".parse().unwrap();
        let line = ColorLineSpec::between(red.clone(), blue.clone());
        assert_eq!(line, ColorLineSpec::new([(0.0, red), (1.0, blue)]));
        assert_eq!(line.extend, "pad");
        assert!(!line.is_variable());
    }
}
