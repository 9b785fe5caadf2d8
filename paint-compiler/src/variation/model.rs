//! Computing supports and deltas for a set of masters.
//!
//! This is the standard OpenType variation model: masters are sorted so that
//! simpler locations come first, each master is assigned a support region
//! that does not reach any earlier master, and deltas are computed in order
//! by subtracting the contribution of earlier supports at each master.

use std::collections::{HashMap, HashSet};

use font_types::Tag;

use super::NormalizedLocation;
use crate::error::ErrorKind;

/// The `(start, peak, end)` of a region along one axis.
pub(super) type Triple = (f64, f64, f64);

/// The support of a single master; empty for the default master.
pub(super) type Support = Vec<(Tag, Triple)>;

#[derive(Clone, Debug)]
pub(super) struct MasterModel {
    /// Master locations, sorted.
    locations: Vec<NormalizedLocation>,
    /// For each sorted master, its index in the caller's order.
    reverse_mapping: Vec<usize>,
    supports: Vec<Support>,
    /// For each sorted master, the scalar of each earlier support at it.
    delta_weights: Vec<Vec<(usize, f64)>>,
}

impl MasterModel {
    /// Build a model from a set of unique master locations, one of which must
    /// be the default location.
    pub(super) fn new(
        locations: &[NormalizedLocation],
        axis_order: &[Tag],
    ) -> Result<Self, ErrorKind> {
        if !locations.iter().any(NormalizedLocation::is_default) {
            return Err(ErrorKind::MissingDefault {
                locations: locations.iter().map(|loc| format!("{loc:?}")).collect(),
            });
        }
        let mut order = (0..locations.len()).collect::<Vec<_>>();
        let sort_key = SortKeys::new(locations, axis_order);
        order.sort_by_cached_key(|i| sort_key.key(&locations[*i]));
        let sorted = order
            .iter()
            .map(|i| locations[*i].clone())
            .collect::<Vec<_>>();

        let supports = compute_supports(&sorted);
        let delta_weights = sorted
            .iter()
            .enumerate()
            .map(|(i, loc)| {
                supports[..i]
                    .iter()
                    .enumerate()
                    .filter_map(|(j, support)| {
                        let scalar = support_scalar(loc, support);
                        (scalar != 0.0).then_some((j, scalar))
                    })
                    .collect()
            })
            .collect();
        Ok(MasterModel {
            locations: sorted,
            reverse_mapping: order,
            supports,
            delta_weights,
        })
    }

    /// The supports of each master, in sorted order; the first is the
    /// (empty) support of the default master.
    pub(super) fn supports(&self) -> &[Support] {
        &self.supports
    }

    #[cfg(test)]
    pub(super) fn locations(&self) -> &[NormalizedLocation] {
        &self.locations
    }

    /// Compute rounded deltas for the given master values.
    ///
    /// Each delta is rounded after subtracting the contribution of earlier
    /// supports, with ties going towards negative infinity.
    ///
    /// `values` are in the caller's order; the result is in sorted order and
    /// its first element is the default value.
    pub(super) fn deltas(&self, values: &[i32]) -> Result<Vec<i32>, ErrorKind> {
        debug_assert_eq!(values.len(), self.locations.len());
        let mut out: Vec<i32> = Vec::with_capacity(values.len());
        for (i, weights) in self.delta_weights.iter().enumerate() {
            let mut delta = values[self.reverse_mapping[i]] as f64;
            for (j, weight) in weights {
                if *weight == 1.0 {
                    delta -= out[*j] as f64;
                } else {
                    delta -= out[*j] as f64 * weight;
                }
            }
            // halves round down, so that rounding the interpolated value at
            // this master with `ot_round` gives back the master's value
            let rounded = (delta - 0.5).ceil();
            let rounded = i32::try_from(rounded as i64).map_err(|_| ErrorKind::ValueOutOfRange {
                value: delta,
                units: super::Units::Fixed,
            })?;
            out.push(rounded);
        }
        Ok(out)
    }
}

/// The scalar of a support at a location: the product of per-axis tents.
pub(super) fn support_scalar(location: &NormalizedLocation, support: &Support) -> f64 {
    let mut scalar = 1.0;
    for (axis, (lower, peak, upper)) in support.iter().copied() {
        if peak == 0.0 || lower > peak || peak > upper || (lower < 0.0 && upper > 0.0) {
            continue;
        }
        let v = location.get(axis).to_f32() as f64;
        if v == peak {
            continue;
        }
        if v <= lower || upper <= v {
            return 0.0;
        }
        if v < peak {
            scalar *= (v - lower) / (peak - lower);
        } else {
            scalar *= (v - upper) / (peak - upper);
        }
    }
    scalar
}

fn compute_supports(locations: &[NormalizedLocation]) -> Vec<Support> {
    let mut min_v: HashMap<Tag, f64> = HashMap::new();
    let mut max_v: HashMap<Tag, f64> = HashMap::new();
    for (tag, value) in locations.iter().flat_map(NormalizedLocation::iter) {
        let value = value.to_f32() as f64;
        let min = min_v.entry(tag).or_insert(value);
        *min = min.min(value);
        let max = max_v.entry(tag).or_insert(value);
        *max = max.max(value);
    }

    let mut supports: Vec<Support> = Vec::with_capacity(locations.len());
    for loc in locations {
        let mut region: Support = loc
            .iter()
            .map(|(tag, value)| {
                let value = value.to_f32() as f64;
                if value > 0.0 {
                    (tag, (0.0, value, max_v[&tag]))
                } else {
                    (tag, (min_v[&tag], value, 0.0))
                }
            })
            .collect();
        let loc_axes = region.iter().map(|(tag, _)| *tag).collect::<HashSet<_>>();

        for prev in &supports {
            // masters with different axes do not participate
            if prev.len() != loc_axes.len() || !prev.iter().all(|(tag, _)| loc_axes.contains(tag))
            {
                continue;
            }
            let prev_peak = |axis: Tag| {
                prev.iter()
                    .find(|(tag, _)| *tag == axis)
                    .map(|(_, (_, peak, _))| *peak)
                    .unwrap_or_default()
            };
            // masters outside of the current box do not participate
            let relevant = region.iter().all(|(axis, (lower, peak, upper))| {
                let val = prev_peak(*axis);
                val == *peak || (*lower < val && val < *upper)
            });
            if !relevant {
                continue;
            }

            // split the box for the new master, in whichever direction has the
            // largest range ratio
            let mut best_axes: Vec<(Tag, Triple)> = Vec::new();
            let mut best_ratio = -1.0;
            for (axis, (lower, loc_v, upper)) in region.iter().copied() {
                let val = prev_peak(axis);
                let (triple, ratio) = if val < loc_v {
                    ((val, loc_v, upper), (val - loc_v) / (lower - loc_v))
                } else if loc_v < val {
                    ((lower, loc_v, val), (val - loc_v) / (upper - loc_v))
                } else {
                    continue;
                };
                if ratio > best_ratio {
                    best_axes.clear();
                    best_ratio = ratio;
                }
                if ratio == best_ratio {
                    best_axes.push((axis, triple));
                }
            }
            for (axis, triple) in best_axes {
                if let Some(entry) = region.iter_mut().find(|(tag, _)| *tag == axis) {
                    entry.1 = triple;
                }
            }
        }
        supports.push(region);
    }
    supports
}

/// Computes the master sort order.
///
/// Masters are ordered by increasing number of axes, then by decreasing
/// number of axes on which they sit on an on-axis master's coordinate, then by
/// axis order, then by the signs and magnitudes of their coordinates.
struct SortKeys<'a> {
    axis_points: HashMap<Tag, HashSet<i16>>,
    axis_order: &'a [Tag],
}

type SortKey = (usize, isize, Vec<usize>, Vec<Tag>, Vec<i8>, Vec<i32>);

impl<'a> SortKeys<'a> {
    fn new(locations: &[NormalizedLocation], axis_order: &'a [Tag]) -> Self {
        let mut axis_points: HashMap<Tag, HashSet<i16>> = HashMap::new();
        for loc in locations.iter().filter(|loc| loc.len() == 1) {
            for (axis, value) in loc.iter() {
                axis_points
                    .entry(axis)
                    .or_insert_with(|| HashSet::from([0]))
                    .insert(value.to_bits());
            }
        }
        SortKeys {
            axis_points,
            axis_order,
        }
    }

    fn key(&self, loc: &NormalizedLocation) -> SortKey {
        let on_point_axes = loc
            .iter()
            .filter(|(axis, value)| {
                self.axis_points
                    .get(axis)
                    .map(|points| points.contains(&value.to_bits()))
                    .unwrap_or(false)
            })
            .count();
        // known axes first in their given order, then the rest by tag
        let mut ordered_axes = self
            .axis_order
            .iter()
            .copied()
            .filter(|axis| loc.iter().any(|(tag, _)| tag == *axis))
            .collect::<Vec<_>>();
        ordered_axes.extend(
            loc.iter()
                .map(|(tag, _)| tag)
                .filter(|tag| !self.axis_order.contains(tag)),
        );
        let order_index = ordered_axes
            .iter()
            .map(|axis| {
                self.axis_order
                    .iter()
                    .position(|known| known == axis)
                    .unwrap_or(0x10000)
            })
            .collect();
        let signs = ordered_axes
            .iter()
            .map(|axis| loc.get(*axis).to_bits().signum() as i8)
            .collect();
        let magnitudes = ordered_axes
            .iter()
            .map(|axis| (loc.get(*axis).to_bits() as i32).abs())
            .collect();
        (
            loc.len(),
            -(on_point_axes as isize),
            order_index,
            ordered_axes,
            signs,
            magnitudes,
        )
    }
}
