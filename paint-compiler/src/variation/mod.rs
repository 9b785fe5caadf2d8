//! Variable parameters and their delta encoding
//!
//! Any scalar parameter of a paint may be a [`Value::Constant`] or a
//! [`Value::Variable`], described by a [`VariationSpec`]: a mapping from
//! locations in the design space to the value of the parameter at that
//! location.
//!
//! The [`VariationResolver`] turns these into a base value plus a set of
//! per-region deltas, sharing regions across every parameter resolved during
//! a compilation. The finished [`VariationStore`] is handed to the table
//! emitter alongside the compiled paints.

mod model;
mod resolver;
mod store;
mod text;

use std::{
    fmt::Display,
    hash::{Hash, Hasher},
    str::FromStr,
};

use font_types::{F2Dot14, Tag};
use indexmap::IndexMap;

use crate::{error::ErrorKind, round::OtRound};

pub use resolver::{ResolvedValue, VariationResolver};
pub use store::{DeltaSet, Region, RegionAxis, VariationStore, NO_VARIATION_INDEX};

/// The encoding used for a parameter in the binary table.
///
/// Both base values and deltas are stored as integers in these units.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Units {
    /// Signed design units: coordinates, translations and centers.
    FWord,
    /// Unsigned design units: gradient radii.
    UfWord,
    /// 2.14 fixed point: alpha, scale factors and stop offsets.
    F2Dot14,
    /// Angles in degrees, stored as 2.14 fixed point multiples of 180°.
    Angle,
    /// 16.16 fixed point: affine matrix entries.
    Fixed,
}

impl Units {
    fn scale(self) -> f64 {
        match self {
            Units::FWord | Units::UfWord => 1.0,
            Units::F2Dot14 => 16384.0,
            Units::Angle => 16384.0 / 180.0,
            Units::Fixed => 65536.0,
        }
    }

    fn range(self) -> (i64, i64) {
        match self {
            Units::FWord | Units::F2Dot14 | Units::Angle => (i16::MIN as i64, i16::MAX as i64),
            Units::UfWord => (0, u16::MAX as i64),
            Units::Fixed => (i32::MIN as i64, i32::MAX as i64),
        }
    }

    /// Convert a value to its rounded integer encoding.
    pub fn to_raw(self, value: f64) -> Result<i32, ErrorKind> {
        let raw: f64 = (value * self.scale()).ot_round();
        let (min, max) = self.range();
        if !raw.is_finite() || raw < min as f64 || raw > max as f64 {
            return Err(ErrorKind::ValueOutOfRange { value, units: self });
        }
        Ok(raw as i32)
    }

    /// Convert an integer encoding (possibly with fractional deltas applied)
    /// back to a value.
    pub fn from_raw(self, raw: f64) -> f64 {
        raw / self.scale()
    }
}

impl Display for Units {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Units::FWord => f.write_str("FWORD"),
            Units::UfWord => f.write_str("UFWORD"),
            Units::F2Dot14 => f.write_str("F2DOT14"),
            Units::Angle => f.write_str("F2DOT14 angle"),
            Units::Fixed => f.write_str("Fixed"),
        }
    }
}

/// A location in the design space, as written in a variation spec.
///
/// Axes are kept sorted by tag, so two locations naming the same
/// coordinates in a different order are equal.
#[derive(Clone, Debug, Default)]
pub struct Location(Vec<(Tag, f64)>);

/// A location in normalized coordinates.
///
/// Axes at their default (zero) coordinate are omitted, so the default
/// location is empty.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NormalizedLocation(Vec<(Tag, F2Dot14)>);

/// How a single scalar parameter varies across the design space.
///
/// Each entry maps a support location to the value of the parameter at that
/// location. A spec must include the default location.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct VariationSpec {
    values: IndexMap<Location, f64>,
}

/// A paint parameter that may or may not vary.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "json", derive(serde::Deserialize))]
#[cfg_attr(feature = "json", serde(try_from = "crate::document::RawValue"))]
pub enum Value {
    Constant(f64),
    Variable(VariationSpec),
}

impl Location {
    /// Create a location from a set of `(axis, coordinate)` pairs.
    ///
    /// Each axis may appear only once.
    pub fn new(coords: impl IntoIterator<Item = (Tag, f64)>) -> Result<Self, ErrorKind> {
        let mut coords = coords.into_iter().collect::<Vec<_>>();
        coords.sort_by_key(|(tag, _)| *tag);
        if let Some(pair) = coords.windows(2).find(|pair| pair[0].0 == pair[1].0) {
            return Err(ErrorKind::MalformedVariationSpec(format!(
                "axis '{}' appears more than once in a location",
                pair[0].0
            )));
        }
        Ok(Location(coords))
    }

    /// The empty location, which is the default in normalized coordinates.
    pub fn origin() -> Self {
        Location(Vec::new())
    }

    pub fn iter(&self) -> impl Iterator<Item = (Tag, f64)> + '_ {
        self.0.iter().copied()
    }
}

/// Parses `"AXIS=value,AXIS=value"`; the empty string is the origin.
impl FromStr for Location {
    type Err = ErrorKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let malformed = |msg: String| ErrorKind::MalformedVariationSpec(format!("{msg} in '{s}'"));
        let mut coords = Vec::new();
        for coord in s.split(',').map(str::trim).filter(|s| !s.is_empty()) {
            let (axis, axis_loc) = coord
                .split_once('=')
                .ok_or_else(|| malformed(format!("missing '=' in '{coord}'")))?;
            let tag = Tag::new_checked(axis.trim().as_bytes())
                .map_err(|_| malformed(format!("bad axis tag '{axis}'")))?;
            let axis_loc = axis_loc
                .trim()
                .parse::<f64>()
                .map_err(|_| malformed(format!("bad coordinate '{axis_loc}'")))?;
            coords.push((tag, axis_loc));
        }
        Location::new(coords)
    }
}

impl PartialEq for Location {
    fn eq(&self, other: &Self) -> bool {
        self.0.len() == other.0.len()
            && self
                .0
                .iter()
                .zip(other.0.iter())
                .all(|(a, b)| a.0 == b.0 && a.1.to_bits() == b.1.to_bits())
    }
}

impl Eq for Location {}

impl Hash for Location {
    fn hash<H: Hasher>(&self, state: &mut H) {
        for (tag, value) in &self.0 {
            tag.hash(state);
            value.to_bits().hash(state);
        }
    }
}

impl Display for Location {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.0.is_empty() {
            return f.write_str("<default>");
        }
        for (i, (tag, value)) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(",")?;
            }
            write!(f, "{tag}={value}")?;
        }
        Ok(())
    }
}

impl NormalizedLocation {
    /// Create a normalized location; coordinates are clamped to `[-1, 1]`.
    pub fn new(coords: impl IntoIterator<Item = (Tag, f32)>) -> Self {
        let mut coords = coords
            .into_iter()
            .map(|(tag, value)| (tag, F2Dot14::from_f32(value.clamp(-1.0, 1.0))))
            .filter(|(_, value)| *value != F2Dot14::ZERO)
            .collect::<Vec<_>>();
        coords.sort_by_key(|(tag, _)| *tag);
        coords.dedup_by_key(|(tag, _)| *tag);
        NormalizedLocation(coords)
    }

    /// Returns `true` if every axis is at its default coordinate.
    pub fn is_default(&self) -> bool {
        self.0.is_empty()
    }

    /// The coordinate for the given axis; zero if the axis is absent.
    pub fn get(&self, axis: Tag) -> F2Dot14 {
        self.0
            .iter()
            .find(|(tag, _)| *tag == axis)
            .map(|(_, value)| *value)
            .unwrap_or(F2Dot14::ZERO)
    }

    pub fn iter(&self) -> impl Iterator<Item = (Tag, F2Dot14)> + '_ {
        self.0.iter().copied()
    }

    pub(crate) fn len(&self) -> usize {
        self.0.len()
    }
}

impl VariationSpec {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the value at a location, returning the previous value if any.
    pub fn insert(&mut self, location: Location, value: f64) -> Option<f64> {
        self.values.insert(location, value)
    }

    /// Builder-style variant of [`insert`][Self::insert].
    pub fn with(mut self, location: Location, value: f64) -> Self {
        self.insert(location, value);
        self
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Location, f64)> + '_ {
        self.values.iter().map(|(loc, value)| (loc, *value))
    }

    /// Parse the deprecated textual form, `"AXIS=value:result AXIS=value:result"`.
    ///
    /// A location may name several axes separated by commas. A deprecation
    /// warning is logged with the equivalent structured form.
    pub fn from_text(src: &str) -> Result<Self, ErrorKind> {
        text::parse(src)
    }

    fn describe_locations(&self) -> Vec<String> {
        self.values.keys().map(ToString::to_string).collect()
    }
}

impl FromIterator<(Location, f64)> for VariationSpec {
    fn from_iter<T: IntoIterator<Item = (Location, f64)>>(iter: T) -> Self {
        VariationSpec {
            values: iter.into_iter().collect(),
        }
    }
}

impl Value {
    /// A constant alpha of `1.0`.
    pub fn opaque() -> Self {
        Value::Constant(1.0)
    }

    /// Returns `true` if this value is described by a variation spec.
    pub fn is_variable(&self) -> bool {
        matches!(self, Value::Variable(_))
    }
}

impl From<f64> for Value {
    fn from(src: f64) -> Self {
        Value::Constant(src)
    }
}

impl From<i32> for Value {
    fn from(src: i32) -> Self {
        Value::Constant(src as f64)
    }
}

impl From<VariationSpec> for Value {
    fn from(src: VariationSpec) -> Self {
        Value::Variable(src)
    }
}
