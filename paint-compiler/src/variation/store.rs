//! Accumulating regions and delta sets across a compilation.

use font_types::{F2Dot14, Tag};
use indexmap::IndexSet;

use super::{model::Support, NormalizedLocation};
use crate::{error::ErrorKind, round::OtRound};

/// The special index indicating no variation.
pub const NO_VARIATION_INDEX: u32 = 0xFFFFFFFF;

/// The extent of a region along a single axis.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RegionAxis {
    pub start: F2Dot14,
    pub peak: F2Dot14,
    pub end: F2Dot14,
}

/// A box in normalized design space in which a delta applies.
///
/// Axes not named by the region do not affect its scalar.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Region {
    axes: Vec<(Tag, RegionAxis)>,
}

/// A set of deltas for one parameter.
///
/// Always sorted, so we can ensure equality.
///
/// Each tuple is (region index, delta value)
#[derive(Clone, Debug, Default, Hash, PartialEq, Eq)]
pub struct DeltaSet(Vec<(u16, i32)>);

/// The variation data produced by a compilation.
///
/// Each resolved parameter of a variable paint owns one entry of the var
/// index map, which points to a (deduplicated) delta set. A paint's
/// `var_index_base` is the index of its first parameter's entry.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct VariationStore {
    regions: Vec<Region>,
    delta_sets: Vec<DeltaSet>,
    var_index_map: Vec<u32>,
}

/// A builder for the [`VariationStore`].
///
/// This handles assigning region indices in order of first appearance,
/// deduplicating delta sets, and allocating var indices.
#[derive(Clone, Debug, Default)]
pub(super) struct VariationStoreBuilder {
    regions: IndexSet<Region>,
    delta_sets: IndexSet<DeltaSet>,
    var_index_map: Vec<u32>,
}

impl RegionAxis {
    pub fn new(start: f32, peak: f32, end: f32) -> Self {
        RegionAxis {
            start: F2Dot14::from_f32(start),
            peak: F2Dot14::from_f32(peak),
            end: F2Dot14::from_f32(end),
        }
    }

    fn scalar(&self, coord: f64) -> f64 {
        let start = self.start.to_f32() as f64;
        let peak = self.peak.to_f32() as f64;
        let end = self.end.to_f32() as f64;
        if start > peak || peak > end || peak == 0.0 || start < 0.0 && end > 0.0 {
            1.0
        } else if coord < start || coord > end {
            0.0
        } else if coord == peak {
            1.0
        } else if coord < peak {
            (coord - start) / (peak - start)
        } else {
            (end - coord) / (end - peak)
        }
    }
}

impl Region {
    /// Create a region from per-axis extents.
    pub fn new(axes: impl IntoIterator<Item = (Tag, RegionAxis)>) -> Self {
        let mut axes = axes.into_iter().collect::<Vec<_>>();
        axes.sort_by_key(|(tag, _)| *tag);
        Region { axes }
    }

    pub(super) fn from_support(support: &Support) -> Self {
        Region::new(support.iter().map(|(tag, (start, peak, end))| {
            (*tag, RegionAxis::new(*start as f32, *peak as f32, *end as f32))
        }))
    }

    pub fn axes(&self) -> &[(Tag, RegionAxis)] {
        &self.axes
    }

    /// Computes the scalar for this region at the given location.
    pub fn scalar(&self, location: &NormalizedLocation) -> f64 {
        let mut scalar = 1.0;
        for (tag, axis) in &self.axes {
            scalar *= axis.scalar(location.get(*tag).to_f32() as f64);
            if scalar == 0.0 {
                break;
            }
        }
        scalar
    }
}

impl DeltaSet {
    pub fn iter(&self) -> impl Iterator<Item = (u16, i32)> + '_ {
        self.0.iter().copied()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl VariationStore {
    /// Returns `true` if no var indices were allocated.
    pub fn is_empty(&self) -> bool {
        self.var_index_map.is_empty()
    }

    /// All regions, in order of first appearance.
    pub fn regions(&self) -> &[Region] {
        &self.regions
    }

    pub fn delta_sets(&self) -> &[DeltaSet] {
        &self.delta_sets
    }

    /// For each var index, the index of its delta set.
    pub fn var_index_map(&self) -> &[u32] {
        &self.var_index_map
    }

    /// The deltas for the given var index.
    pub fn deltas(&self, var_index: u32) -> Option<&DeltaSet> {
        let set = self.var_index_map.get(var_index as usize)?;
        self.delta_sets.get(*set as usize)
    }

    /// Apply the deltas for `var_index` to `base` at the given location.
    ///
    /// The result is in the encoded units of the parameter.
    pub fn evaluate(&self, var_index: u32, base: i32, location: &NormalizedLocation) -> f64 {
        let Some(deltas) = self.deltas(var_index) else {
            return base as f64;
        };
        apply_deltas(|idx| self.regions.get(idx), deltas.iter(), base, location)
    }
}

/// Apply deltas to `base`, rounding the result to the nearest integer.
///
/// Deltas are rounded when they are computed so that this reproduces the
/// exact value at every master.
pub(super) fn apply_deltas<'a>(
    region: impl Fn(usize) -> Option<&'a Region>,
    deltas: impl Iterator<Item = (u16, i32)>,
    base: i32,
    location: &NormalizedLocation,
) -> f64 {
    let value = deltas.fold(base as f64, |acc, (idx, delta)| {
        let scalar = region(idx as usize)
            .map(|region| region.scalar(location))
            .unwrap_or(0.0);
        acc + delta as f64 * scalar
    });
    value.ot_round()
}

impl VariationStoreBuilder {
    pub(super) fn region_index(&mut self, region: Region) -> Result<u16, ErrorKind> {
        if let Some(idx) = self.regions.get_index_of(&region) {
            return Ok(idx as u16);
        }
        let idx = u16::try_from(self.regions.len()).map_err(|_| ErrorKind::RegionOverflow)?;
        log::trace!("new region {idx}: {region:?}");
        self.regions.insert(region);
        Ok(idx)
    }

    pub(super) fn regions(&self) -> &IndexSet<Region> {
        &self.regions
    }

    /// Returns the identifier of the delta set holding these deltas.
    pub(super) fn add_deltas(&mut self, deltas: &[(u16, i32)]) -> Result<u32, ErrorKind> {
        let mut delta_set = deltas.to_vec();
        delta_set.sort_unstable();
        // treat a deltaset containing all zeros the same as an empty one;
        // e.g. a constant parameter of a variable paint vs a parameter whose
        // masters all have the default value.
        if delta_set.iter().all(|(_, delta)| *delta == 0) {
            delta_set.clear();
        }
        let idx = self.delta_sets.insert_full(DeltaSet(delta_set)).0;
        u32::try_from(idx).map_err(|_| ErrorKind::VarIndexOverflow)
    }

    /// Allocate the next var index, pointing at the given delta set.
    pub(super) fn push_var_index(&mut self, delta_set: u32) -> Result<u32, ErrorKind> {
        let idx = self.next_var_index();
        if idx == NO_VARIATION_INDEX {
            return Err(ErrorKind::VarIndexOverflow);
        }
        self.var_index_map.push(delta_set);
        Ok(idx)
    }

    /// The next var index; saturates at [`NO_VARIATION_INDEX`].
    pub(super) fn next_var_index(&self) -> u32 {
        u32::try_from(self.var_index_map.len()).unwrap_or(NO_VARIATION_INDEX)
    }

    pub(super) fn build(self) -> VariationStore {
        VariationStore {
            regions: self.regions.into_iter().collect(),
            delta_sets: self.delta_sets.into_iter().collect(),
            var_index_map: self.var_index_map,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const WGHT: Tag = Tag::new(b"wght");

    fn region(start: f32, peak: f32, end: f32) -> Region {
        Region::new([(WGHT, RegionAxis::new(start, peak, end))])
    }

    #[test]
    fn regions_keep_first_appearance_order() {
        let mut builder = VariationStoreBuilder::default();
        assert_eq!(builder.region_index(region(0.0, 1.0, 1.0)), Ok(0));
        assert_eq!(builder.region_index(region(-1.0, -1.0, 0.0)), Ok(1));
        assert_eq!(builder.region_index(region(0.0, 1.0, 1.0)), Ok(0));
        let store = builder.build();
        assert_eq!(store.regions(), &[region(0.0, 1.0, 1.0), region(-1.0, -1.0, 0.0)]);
    }

    #[test]
    fn delta_sets_are_deduplicated() {
        let mut builder = VariationStoreBuilder::default();
        let a = builder.add_deltas(&[(1, 5), (0, 10)]).unwrap();
        let b = builder.add_deltas(&[(0, 10), (1, 5)]).unwrap();
        let empty = builder.add_deltas(&[]).unwrap();
        let zeros = builder.add_deltas(&[(0, 0)]).unwrap();
        assert_eq!(a, b);
        assert_eq!(empty, zeros);
        assert_ne!(a, empty);

        assert_eq!(builder.push_var_index(a), Ok(0));
        assert_eq!(builder.push_var_index(empty), Ok(1));
        assert_eq!(builder.next_var_index(), 2);
        let store = builder.build();
        assert_eq!(store.var_index_map(), &[0, 1]);
        assert!(store.deltas(1).unwrap().is_empty());
        assert!(store.deltas(2).is_none());
    }

    #[test]
    fn evaluate_applies_scalars() {
        let mut builder = VariationStoreBuilder::default();
        let r = builder.region_index(region(0.0, 1.0, 1.0)).unwrap();
        let set = builder.add_deltas(&[(r, 101)]).unwrap();
        let idx = builder.push_var_index(set).unwrap();
        let store = builder.build();
        let half = NormalizedLocation::new([(WGHT, 0.5)]);
        // 10 + 50.5, rounded up
        assert_eq!(store.evaluate(idx, 10, &half), 61.0);
        assert_eq!(store.evaluate(idx, 10, &NormalizedLocation::default()), 10.0);
        assert_eq!(store.evaluate(NO_VARIATION_INDEX, 10, &half), 10.0);
    }

    #[test]
    fn region_indices_are_bounded() {
        let mut builder = VariationStoreBuilder::default();
        for i in 0..=u16::MAX as i32 {
            let axis = RegionAxis {
                start: F2Dot14::from_bits((i / 16384) as i16),
                peak: F2Dot14::from_bits((i % 16384) as i16),
                end: F2Dot14::from_bits(16384),
            };
            assert_eq!(builder.region_index(Region::new([(WGHT, axis)])), Ok(i as u16));
        }
        // known regions are still found
        let first = region(0.0, 0.0, 1.0);
        assert_eq!(builder.region_index(first), Ok(0));
        let one_more = region(-1.0, -1.0, 0.0);
        assert_eq!(builder.region_index(one_more), Err(ErrorKind::RegionOverflow));
        assert_eq!(builder.regions().len(), 65536);
    }
}
