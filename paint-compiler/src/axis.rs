//! Axes of variation.

use std::{cmp::Ordering, fmt::Display, str::FromStr};

use font_types::Tag;

use crate::error::ErrorKind;

/// An axis of variation known to the compiler.
///
/// Axes are usually written as `TAG:min:default:max:name`, e.g.
/// `wght:100:400:900:Weight`.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "json", derive(serde::Deserialize))]
#[cfg_attr(feature = "json", serde(try_from = "String"))]
pub struct Axis {
    pub tag: Tag,
    pub min: f64,
    pub default: f64,
    pub max: f64,
    pub name: String,
}

impl Axis {
    pub fn new(tag: Tag, min: f64, default: f64, max: f64, name: impl Into<String>) -> Self {
        Axis {
            tag,
            min,
            default,
            max,
            name: name.into(),
        }
    }

    /// Returns a normalized coordinate for the given user coordinate.
    ///
    /// The value will be clamped to the range specified by the minimum
    /// and maximum values.
    pub fn normalize(&self, value: f64) -> f64 {
        // Make sure max is >= min to avoid potential panic in clamp.
        let max = self.max.max(self.min);
        let value = value.clamp(self.min, max);
        let normalized = match value.partial_cmp(&self.default) {
            Some(Ordering::Less) => -(self.default - value) / (self.default - self.min),
            Some(Ordering::Greater) => (value - self.default) / (max - self.default),
            _ => 0.0,
        };
        normalized.clamp(-1.0, 1.0)
    }
}

impl FromStr for Axis {
    type Err = ErrorKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = |msg: &str| ErrorKind::InvalidAxis(format!("{msg} in '{s}'"));
        let fields = s.splitn(5, ':').collect::<Vec<_>>();
        let [tag, min, default, max, name] = fields.as_slice() else {
            return Err(invalid("expected TAG:min:default:max:name"));
        };
        let tag = Tag::new_checked(tag.as_bytes()).map_err(|_| invalid("bad tag"))?;
        let number = |field: &str| {
            field
                .parse::<f64>()
                .map_err(|_| invalid(&format!("bad value '{field}'")))
        };
        let (min, default, max) = (number(min)?, number(default)?, number(max)?);
        if !(min <= default && default <= max) {
            return Err(invalid("values must satisfy min <= default <= max"));
        }
        Ok(Axis::new(tag, min, default, max, *name))
    }
}

impl TryFrom<String> for Axis {
    type Error = ErrorKind;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl Display for Axis {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}:{}:{}:{}:{}",
            self.tag, self.min, self.default, self.max, self.name
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_flag() {
        let axis: Axis = "wght:100:400:900:Weight".parse().unwrap();
        assert_eq!(axis, Axis::new(Tag::new(b"wght"), 100., 400., 900., "Weight"));
        assert_eq!(axis.to_string(), "wght:100:400:900:Weight");
        // the name may itself contain colons
        let axis: Axis = "SCLR:0:0:1:Scale: Red".parse().unwrap();
        assert_eq!(axis.name, "Scale: Red");
    }

    #[test]
    fn bad_flags() {
        for bad in [
            "wght:100:400:900",
            "wght:100:x:900:Weight",
            "toolong:0:0:1:Name",
            "wght:500:400:900:Weight",
        ] {
            assert!(
                matches!(bad.parse::<Axis>(), Err(ErrorKind::InvalidAxis(_))),
                "{bad}"
            );
        }
    }

    #[test]
    fn normalize() {
        let axis = Axis::new(Tag::new(b"wght"), 100., 400., 900., "Weight");
        assert_eq!(axis.normalize(400.0), 0.0);
        assert_eq!(axis.normalize(900.0), 1.0);
        assert_eq!(axis.normalize(650.0), 0.5);
        assert_eq!(axis.normalize(250.0), -0.5);
        assert_eq!(axis.normalize(1000.0), 1.0);
        assert_eq!(axis.normalize(0.0), -1.0);
    }
}
