//! Resolving parameters into base values and deltas.

use font_types::Tag;

use super::{
    model::MasterModel,
    store::{apply_deltas, Region, VariationStore, VariationStoreBuilder},
    NormalizedLocation, Units, Value, VariationSpec,
};
use crate::{
    axis::Axis,
    config::{CompileOptions, LocationSpace},
    error::ErrorKind,
};

/// A parameter resolved against the shared region registry.
///
/// Values are in the encoded units of the parameter.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ResolvedValue {
    /// The value at the default location.
    pub base: i32,
    /// `(region index, delta)` for each non-default master.
    pub deltas: Vec<(u16, i32)>,
}

/// Resolves constant or variable parameters for a single compilation.
///
/// Every region produced while resolving is registered in a registry shared
/// by all parameters, so that identical regions share an index. Indices are
/// assigned in order of first appearance.
#[derive(Clone, Debug)]
pub struct VariationResolver {
    axes: Vec<Axis>,
    axis_order: Vec<Tag>,
    location_space: LocationSpace,
    store: VariationStoreBuilder,
}

impl ResolvedValue {
    /// Returns `true` if any delta is nonzero.
    pub fn is_variable(&self) -> bool {
        self.deltas.iter().any(|(_, delta)| *delta != 0)
    }
}

impl VariationResolver {
    pub fn new(options: &CompileOptions) -> Self {
        VariationResolver {
            axes: options.axes.clone(),
            axis_order: options.axes.iter().map(|axis| axis.tag).collect(),
            location_space: options.location_space,
            store: Default::default(),
        }
    }

    /// The value of a parameter at the default location, before encoding.
    pub fn default_value(&self, value: &Value) -> Result<f64, ErrorKind> {
        match value {
            Value::Constant(value) => Ok(*value),
            Value::Variable(spec) => {
                for (loc, value) in spec.iter() {
                    if self.normalize(loc)?.is_default() {
                        return Ok(value);
                    }
                }
                Err(missing_default(spec))
            }
        }
    }

    /// Resolve a parameter into a base value and per-region deltas.
    pub fn resolve(&mut self, value: &Value, units: Units) -> Result<ResolvedValue, ErrorKind> {
        let spec = match value {
            Value::Constant(value) => {
                return Ok(ResolvedValue {
                    base: units.to_raw(*value)?,
                    deltas: Vec::new(),
                })
            }
            Value::Variable(spec) => spec,
        };

        let mut locations: Vec<NormalizedLocation> = Vec::with_capacity(spec.len());
        let mut values = Vec::with_capacity(spec.len());
        for (loc, value) in spec.iter() {
            let normalized = self.normalize(loc)?;
            if locations.contains(&normalized) {
                return Err(ErrorKind::MalformedVariationSpec(format!(
                    "location {loc} duplicates an earlier location"
                )));
            }
            locations.push(normalized);
            values.push(units.to_raw(value)?);
        }
        if !locations.iter().any(NormalizedLocation::is_default) {
            return Err(missing_default(spec));
        }

        let model = MasterModel::new(&locations, &self.axis_order)?;
        let mut deltas = model.deltas(&values)?.into_iter();
        let base = deltas.next().unwrap_or_default();
        let deltas = model.supports()[1..]
            .iter()
            .zip(deltas)
            .map(|(support, delta)| {
                let region = Region::from_support(support);
                Ok((self.store.region_index(region)?, delta))
            })
            .collect::<Result<_, ErrorKind>>()?;
        Ok(ResolvedValue { base, deltas })
    }

    /// Allocate a var index for a resolved parameter.
    pub fn add_var_index(&mut self, resolved: &ResolvedValue) -> Result<u32, ErrorKind> {
        let delta_set = self.store.add_deltas(&resolved.deltas)?;
        self.store.push_var_index(delta_set)
    }

    /// The var index that the next call to [`add_var_index`][Self::add_var_index] returns.
    pub fn next_var_index(&self) -> u32 {
        self.store.next_var_index()
    }

    /// The regions registered so far, in order of first appearance.
    pub fn regions(&self) -> impl Iterator<Item = &Region> + '_ {
        self.store.regions().iter()
    }

    /// Evaluate a resolved value at a location, in encoded units.
    ///
    /// The result is rounded, and is exact at every master of the value.
    pub fn evaluate(&self, resolved: &ResolvedValue, location: &NormalizedLocation) -> f64 {
        let regions = self.store.regions();
        apply_deltas(
            |idx| regions.get_index(idx),
            resolved.deltas.iter().copied(),
            resolved.base,
            location,
        )
    }

    /// Normalize a location written in a variation spec.
    pub fn normalize(&self, loc: &super::Location) -> Result<NormalizedLocation, ErrorKind> {
        let mut coords = Vec::new();
        for (tag, value) in loc.iter() {
            let axis = self.axes.iter().find(|axis| axis.tag == tag);
            let value = match (self.location_space, axis) {
                (LocationSpace::User, Some(axis)) => axis.normalize(value),
                (LocationSpace::User, None) => return Err(ErrorKind::UnknownAxis(tag)),
                (LocationSpace::Normalized, None) if !self.axes.is_empty() => {
                    return Err(ErrorKind::UnknownAxis(tag))
                }
                (LocationSpace::Normalized, _) => {
                    if !(-1.0..=1.0).contains(&value) {
                        return Err(ErrorKind::MalformedVariationSpec(format!(
                            "normalized coordinate {value} for axis '{tag}' is outside [-1, 1]"
                        )));
                    }
                    value
                }
            };
            coords.push((tag, value as f32));
        }
        Ok(NormalizedLocation::new(coords))
    }

    /// Finish resolving, producing the variation store.
    pub fn finish(self) -> VariationStore {
        let store = self.store.build();
        log::debug!(
            "variation store: {} regions, {} delta sets, {} var indices",
            store.regions().len(),
            store.delta_sets().len(),
            store.var_index_map().len()
        );
        store
    }
}

fn missing_default(spec: &VariationSpec) -> ErrorKind {
    ErrorKind::MissingDefault {
        locations: spec.describe_locations(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::variation::{Location, RegionAxis};

    const WGHT: Tag = Tag::new(b"wght");
    const WDTH: Tag = Tag::new(b"wdth");

    fn loc(coords: &[(Tag, f64)]) -> Location {
        Location::new(coords.iter().copied()).unwrap()
    }

    fn resolver() -> VariationResolver {
        VariationResolver::new(&CompileOptions::default())
    }

    #[test]
    fn constant_has_no_deltas() {
        let mut resolver = resolver();
        let resolved = resolver.resolve(&Value::Constant(0.5), Units::F2Dot14).unwrap();
        assert_eq!(
            resolved,
            ResolvedValue {
                base: 8192,
                deltas: vec![]
            }
        );
        assert_eq!(resolver.regions().count(), 0);
    }

    #[test]
    fn missing_default() {
        let spec = VariationSpec::new().with(loc(&[(Tag::new(b"AXIS"), 1.0)]), 5.0);
        let err = resolver().resolve(&spec.into(), Units::FWord).unwrap_err();
        assert!(matches!(err, ErrorKind::MissingDefault { .. }), "{err}");
    }

    #[test]
    fn explicit_zero_is_default() {
        let spec = VariationSpec::new()
            .with(loc(&[(WGHT, 0.0)]), 3.0)
            .with(loc(&[(WGHT, 1.0)]), 5.0);
        let mut resolver = resolver();
        assert_eq!(resolver.default_value(&spec.clone().into()), Ok(3.0));
        let resolved = resolver.resolve(&spec.into(), Units::FWord).unwrap();
        assert_eq!(resolved.base, 3);
        assert_eq!(resolved.deltas, vec![(0, 2)]);
    }

    #[test]
    fn duplicate_location_is_malformed() {
        let spec = VariationSpec::new()
            .with(loc(&[]), 3.0)
            .with(loc(&[(WGHT, 0.0)]), 5.0);
        let err = resolver().resolve(&spec.into(), Units::FWord).unwrap_err();
        assert!(matches!(err, ErrorKind::MalformedVariationSpec(_)));
    }

    #[test]
    fn regions_are_shared() {
        let mut resolver = resolver();
        let a = VariationSpec::new()
            .with(loc(&[]), 0.0)
            .with(loc(&[(WGHT, 1.0)]), 100.0);
        let b = VariationSpec::new()
            .with(loc(&[(WDTH, 1.0)]), 20.0)
            .with(loc(&[]), 10.0)
            .with(loc(&[(WGHT, 1.0)]), 30.0);
        let a = resolver.resolve(&a.into(), Units::FWord).unwrap();
        let b = resolver.resolve(&b.into(), Units::FWord).unwrap();
        assert_eq!(a.deltas, vec![(0, 100)]);
        // wdth sorts before wght, so it is registered first within `b`
        assert_eq!(b.base, 10);
        assert_eq!(b.deltas, vec![(1, 10), (0, 20)]);
        assert_eq!(resolver.regions().count(), 2);
    }

    #[test]
    fn round_trip_at_masters() {
        let mut resolver = resolver();
        let masters = [
            (loc(&[]), 100.0),
            (loc(&[(WGHT, 1.0)]), 200.0),
            (loc(&[(WGHT, -1.0)]), 50.0),
            (loc(&[(WGHT, 0.5)]), 180.0),
            (loc(&[(WDTH, 1.0)]), 120.0),
            (loc(&[(WDTH, 1.0), (WGHT, 1.0)]), 300.0),
        ];
        let spec = masters.iter().cloned().collect::<VariationSpec>();
        let resolved = resolver.resolve(&spec.into(), Units::FWord).unwrap();
        assert_eq!(resolved.base, 100);
        for (location, expected) in masters {
            let location = resolver.normalize(&location).unwrap();
            assert_eq!(resolver.evaluate(&resolved, &location), expected);
        }
    }

    #[test]
    fn round_trip_at_partial_corner() {
        let mut resolver = resolver();
        let corner = loc(&[(WGHT, 1.0), (WDTH, 0.5)]);
        let masters = [
            (loc(&[]), 0.0),
            (loc(&[(WDTH, 1.0)]), 101.0),
            (loc(&[(WGHT, 1.0)]), 0.0),
            (corner.clone(), 0.0),
        ];
        let spec = masters.iter().cloned().collect::<VariationSpec>();
        let resolved = resolver.resolve(&spec.into(), Units::FWord).unwrap();
        // 0 - 101 * 0.5 rounds down, so that the corner comes back as 0
        assert_eq!(resolved.deltas.last(), Some(&(2, -51)));
        for (location, expected) in masters {
            let location = resolver.normalize(&location).unwrap();
            assert_eq!(resolver.evaluate(&resolved, &location), expected, "{location:?}");
        }
    }

    #[test]
    fn regions_follow_the_other_masters() {
        let mut resolver = resolver();
        let half = VariationSpec::new()
            .with(loc(&[]), 0.0)
            .with(loc(&[(WGHT, 0.5)]), 50.0);
        let split = VariationSpec::new()
            .with(loc(&[]), 0.0)
            .with(loc(&[(WGHT, 0.5)]), 50.0)
            .with(loc(&[(WGHT, 1.0)]), 100.0);
        let half = resolver.resolve(&half.into(), Units::FWord).unwrap();
        let split = resolver.resolve(&split.into(), Units::FWord).unwrap();
        // the same location has a narrower support when a master lies beyond it
        assert_eq!(half.deltas, vec![(0, 50)]);
        assert_eq!(split.deltas[0], (1, 50));
        let regions = resolver.regions().cloned().collect::<Vec<_>>();
        assert_eq!(
            regions[..2],
            [
                Region::new([(WGHT, RegionAxis::new(0.0, 0.5, 0.5))]),
                Region::new([(WGHT, RegionAxis::new(0.0, 0.5, 1.0))]),
            ]
        );
    }

    #[test]
    fn user_space_locations() {
        let options = CompileOptions {
            axes: vec!["wght:100:400:900:Weight".parse().unwrap()],
            location_space: LocationSpace::User,
            ..Default::default()
        };
        let mut resolver = VariationResolver::new(&options);
        let spec = VariationSpec::new()
            .with(loc(&[(WGHT, 400.0)]), 0.0)
            .with(loc(&[(WGHT, 900.0)]), 1.0)
            .with(loc(&[(WGHT, 100.0)]), -1.0);
        let resolved = resolver.resolve(&spec.into(), Units::F2Dot14).unwrap();
        assert_eq!(resolved.base, 0);
        assert_eq!(resolved.deltas.len(), 2);
        let bold = resolver.normalize(&loc(&[(WGHT, 650.0)])).unwrap();
        assert_eq!(resolver.evaluate(&resolved, &bold), 8192.0);

        let unknown = VariationSpec::new().with(loc(&[(WDTH, 100.0)]), 0.0);
        assert_eq!(
            resolver.resolve(&unknown.into(), Units::FWord),
            Err(ErrorKind::UnknownAxis(WDTH))
        );
    }

    #[test]
    fn var_indices_are_sequential() {
        let mut resolver = resolver();
        let constant = resolver.resolve(&Value::Constant(1.0), Units::FWord).unwrap();
        assert_eq!(resolver.next_var_index(), 0);
        assert_eq!(resolver.add_var_index(&constant), Ok(0));
        assert_eq!(resolver.add_var_index(&constant), Ok(1));
        let store = resolver.finish();
        assert_eq!(store.var_index_map(), &[0, 0]);
    }
}
