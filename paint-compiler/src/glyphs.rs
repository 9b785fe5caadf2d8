//! Looking up glyph names in the font.

use std::collections::{BTreeSet, HashSet};

use indexmap::IndexSet;

/// The set of glyph names in the font being built.
///
/// Glyphs named by a paint tree must be members of this set.
pub trait GlyphSet {
    fn contains_glyph(&self, name: &str) -> bool;
}

impl GlyphSet for HashSet<String> {
    fn contains_glyph(&self, name: &str) -> bool {
        self.contains(name)
    }
}

impl GlyphSet for BTreeSet<String> {
    fn contains_glyph(&self, name: &str) -> bool {
        self.contains(name)
    }
}

impl GlyphSet for IndexSet<String> {
    fn contains_glyph(&self, name: &str) -> bool {
        self.contains(name)
    }
}

impl GlyphSet for [String] {
    fn contains_glyph(&self, name: &str) -> bool {
        self.iter().any(|glyph| glyph == name)
    }
}

impl GlyphSet for [&str] {
    fn contains_glyph(&self, name: &str) -> bool {
        self.iter().any(|glyph| *glyph == name)
    }
}

impl<const N: usize> GlyphSet for [&str; N] {
    fn contains_glyph(&self, name: &str) -> bool {
        self.iter().any(|glyph| *glyph == name)
    }
}

impl GlyphSet for Vec<String> {
    fn contains_glyph(&self, name: &str) -> bool {
        self.as_slice().contains_glyph(name)
    }
}

impl<T: GlyphSet + ?Sized> GlyphSet for &T {
    fn contains_glyph(&self, name: &str) -> bool {
        (**self).contains_glyph(name)
    }
}
