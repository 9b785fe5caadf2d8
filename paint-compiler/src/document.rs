//! Loading paint declarations from JSON.
//!
//! A document has an optional `options` object and a `glyphs` object mapping
//! glyph names to paint expressions:
//!
//! ```json
//! {
//!     "options": { "axes": ["wght:100:400:900:Weight"], "location_space": "user" },
//!     "glyphs": {
//!         "A": { "SolidFill": { "color": "#FF0000FF", "alpha": { "": 1.0, "wght=900": 0.5 } } }
//!     }
//! }
//! ```
//!
//! Scalar parameters are numbers, objects mapping locations to values, or
//! strings in the older textual form. Colors are a hex string, `"foreground"`,
//! or a list with one entry per palette. Color line stops are either an
//! object mapping offsets to colors, or a list of `{"offset", "color",
//! "alpha"}` objects.

use indexmap::IndexMap;
use serde::{de::Error as _, Deserialize, Deserializer};

use crate::{
    color::Color,
    compile::{compile, CompiledColr},
    config::CompileOptions,
    error::{Error, ErrorKind},
    glyphs::GlyphSet,
    paint::{ColorStopSpec, Declarations, PaintExpr},
    variation::{Location, Value, VariationSpec},
};

/// A set of paint declarations along with the options to compile them.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PaintDocument {
    pub options: CompileOptions,
    pub declarations: Declarations,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct RawDocument {
    #[serde(default)]
    options: CompileOptions,
    glyphs: IndexMap<String, PaintExpr>,
}

/// A scalar parameter, before validation.
#[derive(Deserialize)]
#[serde(untagged)]
pub(crate) enum RawValue {
    Number(f64),
    Text(String),
    Locations(IndexMap<String, f64>),
}

/// A color, before validation.
#[derive(Deserialize)]
#[serde(untagged)]
pub(crate) enum RawColor {
    Token(String),
    Alternates(Vec<String>),
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawStops {
    ByOffset(IndexMap<String, RawStopColor>),
    List(Vec<RawStop>),
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawStopColor {
    Color(Color),
    WithAlpha {
        color: Color,
        #[serde(default = "Value::opaque")]
        alpha: Value,
    },
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct RawStop {
    offset: Value,
    color: Color,
    #[serde(default = "Value::opaque")]
    alpha: Value,
}

impl PaintDocument {
    /// Parse a document from a JSON string.
    pub fn from_json(src: &str) -> Result<Self, Error> {
        let raw: RawDocument = serde_json::from_str(src)
            .map_err(|e| ErrorKind::MalformedDocument(e.to_string()))?;
        log::debug!("loaded paint document with {} glyphs", raw.glyphs.len());
        Ok(PaintDocument {
            options: raw.options,
            declarations: raw.glyphs.into_iter().collect(),
        })
    }

    /// Compile every glyph in the document.
    pub fn compile<G: GlyphSet + ?Sized>(&self, glyph_set: &G) -> Result<CompiledColr, Error> {
        compile(&self.declarations, glyph_set, &self.options)
    }
}

impl TryFrom<RawValue> for Value {
    type Error = ErrorKind;

    fn try_from(raw: RawValue) -> Result<Self, Self::Error> {
        match raw {
            RawValue::Number(value) => Ok(Value::Constant(value)),
            RawValue::Text(text) => VariationSpec::from_text(&text).map(Value::Variable),
            RawValue::Locations(values) => {
                let mut spec = VariationSpec::new();
                for (location, value) in values {
                    let location = location.parse::<Location>()?;
                    if spec.insert(location.clone(), value).is_some() {
                        return Err(ErrorKind::MalformedVariationSpec(format!(
                            "location {location} given twice"
                        )));
                    }
                }
                Ok(Value::Variable(spec))
            }
        }
    }
}

impl TryFrom<RawColor> for Color {
    type Error = ErrorKind;

    fn try_from(raw: RawColor) -> Result<Self, Self::Error> {
        match raw {
            RawColor::Token(token) => token.parse(),
            RawColor::Alternates(tokens) => Color::alternates(tokens.iter().map(String::as_str)),
        }
    }
}

/// Deserialize the stops of a color line.
pub(crate) fn stops<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Vec<ColorStopSpec>, D::Error> {
    match RawStops::deserialize(deserializer)? {
        RawStops::ByOffset(stops) => stops
            .into_iter()
            .map(|(offset, stop)| {
                let offset = offset
                    .trim()
                    .parse::<f64>()
                    .map_err(|_| D::Error::custom(format!("invalid stop offset '{offset}'")))?;
                let (color, alpha) = match stop {
                    RawStopColor::Color(color) => (color, Value::opaque()),
                    RawStopColor::WithAlpha { color, alpha } => (color, alpha),
                };
                Ok(ColorStopSpec::new(offset, color).with_alpha(alpha))
            })
            .collect(),
        RawStops::List(stops) => Ok(stops
            .into_iter()
            .map(|stop| ColorStopSpec::new(stop.offset, stop.color).with_alpha(stop.alpha))
            .collect()),
    }
}
