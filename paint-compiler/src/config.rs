//! Options that control a compilation.

use crate::axis::Axis;

/// The coordinate space used by locations in variation specs.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "json", derive(serde::Deserialize))]
#[cfg_attr(feature = "json", serde(rename_all = "lowercase"))]
pub enum LocationSpace {
    /// Coordinates are normalized, in `[-1, 1]` with the default at zero.
    #[default]
    Normalized,
    /// Coordinates are user values, normalized against the configured axes.
    User,
}

/// Options for a single compilation.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "json", derive(serde::Deserialize))]
#[cfg_attr(feature = "json", serde(default, deny_unknown_fields))]
pub struct CompileOptions {
    /// The axes of the font.
    ///
    /// If this is not empty, locations may only name these axes, and their
    /// order determines the order in which masters are considered.
    pub axes: Vec<Axis>,
    pub location_space: LocationSpace,
    /// If `true`, a single color used alongside alternate palettes is
    /// repeated in every palette instead of being an error.
    pub broadcast_single_colors: bool,
}

impl CompileOptions {
    /// Builder-style method to set the known axes.
    pub fn with_axes(mut self, axes: impl IntoIterator<Item = Axis>) -> Self {
        self.axes = axes.into_iter().collect();
        self
    }

    /// Builder-style method to interpret locations as user coordinates.
    pub fn in_user_space(mut self) -> Self {
        self.location_space = LocationSpace::User;
        self
    }

    pub fn with_broadcast_single_colors(mut self, flag: bool) -> Self {
        self.broadcast_single_colors = flag;
        self
    }
}
