//! Assigning palette indices to colors.

use indexmap::IndexSet;

use crate::{
    color::{Color, Rgba},
    error::ErrorKind,
};

/// The palette index that refers to the text foreground color.
pub const FOREGROUND_INDEX: u16 = 0xFFFF;

/// Interns colors, assigning indices in order of first use.
///
/// A color given as a list of alternates provides one entry for each of a
/// set of parallel palettes; every such list used in a compilation must have
/// the same length.
#[derive(Clone, Debug, Default)]
pub struct PaletteBuilder {
    entries: IndexSet<Vec<Rgba>>,
    num_alternates: Option<usize>,
    has_single: bool,
    broadcast_single_colors: bool,
}

/// The finished palettes.
///
/// All palettes have the same number of entries, and a palette index refers
/// to the same logical color in each.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Palettes {
    palettes: Vec<Vec<Rgba>>,
}

impl PaletteBuilder {
    pub fn new(broadcast_single_colors: bool) -> Self {
        PaletteBuilder {
            broadcast_single_colors,
            ..Default::default()
        }
    }

    /// Returns the palette index for this color, adding it if necessary.
    pub fn intern(&mut self, color: &Color) -> Result<u16, ErrorKind> {
        let colors = match color {
            Color::Foreground => return Ok(FOREGROUND_INDEX),
            Color::Single(rgba) => std::slice::from_ref(rgba),
            Color::Alternates(colors) => colors.as_slice(),
        };
        match colors.len() {
            0 => return Err(ErrorKind::InvalidColor("[]".into())),
            1 => self.check_single()?,
            n => self.check_alternates(n)?,
        }
        let key = colors.to_vec();
        if let Some(idx) = self.entries.get_index_of(&key) {
            return Ok(idx as u16);
        }
        if self.entries.len() >= FOREGROUND_INDEX as usize {
            return Err(ErrorKind::PaletteOverflow);
        }
        let (idx, _) = self.entries.insert_full(key);
        log::trace!("palette entry {idx}: {color:?}");
        Ok(idx as u16)
    }

    fn check_single(&mut self) -> Result<(), ErrorKind> {
        match self.num_alternates {
            Some(expected) if !self.broadcast_single_colors => {
                Err(ErrorKind::PaletteArityMismatch { expected, found: 1 })
            }
            _ => {
                self.has_single = true;
                Ok(())
            }
        }
    }

    fn check_alternates(&mut self, found: usize) -> Result<(), ErrorKind> {
        match self.num_alternates {
            Some(expected) if expected != found => {
                Err(ErrorKind::PaletteArityMismatch { expected, found })
            }
            None if self.has_single && !self.broadcast_single_colors => {
                Err(ErrorKind::PaletteArityMismatch { expected: 1, found })
            }
            _ => {
                self.num_alternates = Some(found);
                Ok(())
            }
        }
    }

    /// The number of distinct colors interned so far.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Produce the final, index-aligned palettes.
    pub fn build(self) -> Palettes {
        let num_palettes = self.num_alternates.unwrap_or(1);
        let palettes = (0..num_palettes)
            .map(|palette| {
                self.entries
                    .iter()
                    .map(|entry| entry.get(palette).or(entry.first()).copied().unwrap_or_default())
                    .collect()
            })
            .collect();
        Palettes { palettes }
    }
}

impl Palettes {
    /// The number of parallel palettes; at least one.
    pub fn num_palettes(&self) -> usize {
        self.palettes.len()
    }

    /// The number of entries in each palette.
    pub fn num_entries(&self) -> usize {
        self.palettes.first().map(Vec::len).unwrap_or(0)
    }

    pub fn palettes(&self) -> &[Vec<Rgba>] {
        &self.palettes
    }

    /// The color at `index` in the given palette.
    pub fn get(&self, palette: usize, index: u16) -> Option<Rgba> {
        self.palettes.get(palette)?.get(index as usize).copied()
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn color(s: &str) -> Color {
        s.parse().unwrap()
    }

    fn alternates(colors: &[&str]) -> Color {
        Color::alternates(colors.iter().copied()).unwrap()
    }

    #[test]
    fn interning_is_idempotent() {
        let mut builder = PaletteBuilder::default();
        let colors = ["#FF0000FF", "#00FF00FF", "#0000FFFF"];
        for (i, c) in colors.iter().enumerate() {
            assert_eq!(builder.intern(&color(c)), Ok(i as u16));
        }
        for (i, c) in colors.iter().enumerate().rev() {
            assert_eq!(builder.intern(&color(c)), Ok(i as u16));
        }
        assert_eq!(builder.len(), 3);
    }

    #[test]
    fn foreground_is_not_interned() {
        let mut builder = PaletteBuilder::default();
        assert_eq!(builder.intern(&Color::Foreground), Ok(FOREGROUND_INDEX));
        assert!(builder.is_empty());
        assert_eq!(builder.intern(&color("#FF0000FF")), Ok(0));
    }

    #[test]
    fn alternates_become_columns() {
        let mut builder = PaletteBuilder::default();
        builder.intern(&alternates(&["#FF0000FF", "#00FF00FF"])).unwrap();
        builder.intern(&alternates(&["#0000FFFF", "#000000FF"])).unwrap();
        let palettes = builder.build();
        assert_eq!(palettes.num_palettes(), 2);
        assert_eq!(palettes.num_entries(), 2);
        assert_eq!(
            palettes.palettes()[1],
            vec![Rgba::new(0, 255, 0, 255), Rgba::new(0, 0, 0, 255)]
        );
    }

    #[test]
    fn arity_mismatch() {
        let mut builder = PaletteBuilder::default();
        builder
            .intern(&alternates(&["#FF0000FF", "#00FF00FF"]))
            .unwrap();
        assert_eq!(
            builder.intern(&color("#0000FFFF")),
            Err(ErrorKind::PaletteArityMismatch {
                expected: 2,
                found: 1
            })
        );
        assert_eq!(
            builder.intern(&alternates(&["#FF0000FF", "#00FF00FF", "#0000FFFF"])),
            Err(ErrorKind::PaletteArityMismatch {
                expected: 2,
                found: 3
            })
        );

        let mut builder = PaletteBuilder::default();
        builder.intern(&color("#0000FFFF")).unwrap();
        assert!(builder
            .intern(&alternates(&["#FF0000FF", "#00FF00FF"]))
            .is_err());
    }

    #[test]
    fn broadcast_single_colors() {
        let mut builder = PaletteBuilder::new(true);
        assert_eq!(builder.intern(&color("#0000FFFF")), Ok(0));
        assert_eq!(
            builder.intern(&alternates(&["#FF0000FF", "#00FF00FF"])),
            Ok(1)
        );
        let palettes = builder.build();
        assert_eq!(palettes.get(1, 0), Some(Rgba::new(0, 0, 255, 255)));
        assert_eq!(palettes.get(1, 1), Some(Rgba::new(0, 255, 0, 255)));
        assert_eq!(palettes.get(2, 0), None);
    }

    #[test]
    fn empty_builder_has_one_palette() {
        let palettes = PaletteBuilder::default().build();
        assert_eq!(palettes.num_palettes(), 1);
        assert_eq!(palettes.num_entries(), 0);
    }
}
