//! Color literals

use std::{fmt::Display, str::FromStr};

use crate::error::ErrorKind;

/// The literal token naming the text foreground color.
pub const FOREGROUND: &str = "foreground";

/// An 8-bit per channel, non-premultiplied color.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Rgba {
    pub red: u8,
    pub green: u8,
    pub blue: u8,
    pub alpha: u8,
}

/// A color as written in a paint declaration.
///
/// A color is either the special foreground marker, a single value shared by
/// every palette, or one value per alternate palette.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "json", derive(serde::Deserialize))]
#[cfg_attr(feature = "json", serde(try_from = "crate::document::RawColor"))]
pub enum Color {
    Foreground,
    Single(Rgba),
    Alternates(Vec<Rgba>),
}

impl Rgba {
    pub const fn new(red: u8, green: u8, blue: u8, alpha: u8) -> Self {
        Rgba {
            red,
            green,
            blue,
            alpha,
        }
    }
}

impl Color {
    /// Create a color with one value per alternate palette.
    ///
    /// A single alternate is equivalent to [`Color::Single`].
    pub fn alternates<'a>(tokens: impl IntoIterator<Item = &'a str>) -> Result<Self, ErrorKind> {
        let colors = tokens
            .into_iter()
            .map(str::parse::<Rgba>)
            .collect::<Result<Vec<_>, _>>()?;
        Color::from_rgba_list(colors)
    }

    pub(crate) fn from_rgba_list(mut colors: Vec<Rgba>) -> Result<Self, ErrorKind> {
        match colors.len() {
            0 => Err(ErrorKind::InvalidColor("[]".into())),
            1 => Ok(Color::Single(colors.pop().unwrap_or_default())),
            _ => Ok(Color::Alternates(colors)),
        }
    }

    /// The number of palette columns this color specifies, if it is a palette color.
    pub fn palette_count(&self) -> Option<usize> {
        match self {
            Color::Foreground => None,
            Color::Single(_) => Some(1),
            Color::Alternates(colors) => Some(colors.len()),
        }
    }
}

impl FromStr for Rgba {
    type Err = ErrorKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ErrorKind::InvalidColor(s.to_owned());
        let hex = s.strip_prefix('#').unwrap_or(s);
        if hex.len() != 8 || !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(invalid());
        }
        let channel = |i: usize| u8::from_str_radix(&hex[i * 2..i * 2 + 2], 16).map_err(|_| invalid());
        Ok(Rgba {
            red: channel(0)?,
            green: channel(1)?,
            blue: channel(2)?,
            alpha: channel(3)?,
        })
    }
}

impl FromStr for Color {
    type Err = ErrorKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == FOREGROUND {
            return Ok(Color::Foreground);
        }
        s.parse().map(Color::Single)
    }
}

impl From<Rgba> for Color {
    fn from(src: Rgba) -> Self {
        Color::Single(src)
    }
}

impl Display for Rgba {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "#{:02X}{:02X}{:02X}{:02X}",
            self.red, self.green, self.blue, self.alpha
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_literals() {
        assert_eq!("#FF000080".parse(), Ok(Rgba::new(255, 0, 0, 128)));
        assert_eq!("00ff00ff".parse(), Ok(Rgba::new(0, 255, 0, 255)));
        assert_eq!("foreground".parse(), Ok(Color::Foreground));
        assert_eq!(
            "#FF0000".parse::<Rgba>(),
            Err(ErrorKind::InvalidColor("#FF0000".into()))
        );
        assert!("#GG0000FF".parse::<Color>().is_err());
    }

    #[test]
    fn single_alternate_is_single() {
        assert_eq!(
            Color::alternates(["#4285F4FF"]),
            Ok(Color::Single(Rgba::new(0x42, 0x85, 0xF4, 0xFF)))
        );
        let two = Color::alternates(["#4285F4FF", "#000000FF"]).unwrap();
        assert_eq!(two.palette_count(), Some(2));
        assert!(Color::alternates(Vec::<&str>::new()).is_err());
    }

    #[test]
    fn display_roundtrips() {
        let color = Rgba::new(0xEA, 0x43, 0x35, 0xFF);
        assert_eq!(color.to_string(), "#EA4335FF");
        assert_eq!(color.to_string().parse(), Ok(color));
    }
}
