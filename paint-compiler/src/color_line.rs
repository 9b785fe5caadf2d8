//! Building color lines.

use font_types::F2Dot14;

use crate::{
    error::{Error, ErrorKind, NodePath},
    graph::{ColorLine, ColorStop},
    palette::PaletteBuilder,
    paint::{parse_extend, ColorLineSpec, ColorStopSpec},
    variation::{Units, Value, VariationResolver},
};

/// Builds the color lines of gradients.
///
/// Colors are interned in the shared palette, and offsets and alphas are
/// resolved against the shared variation registry.
pub struct ColorLineBuilder<'a> {
    resolver: &'a mut VariationResolver,
    palette: &'a mut PaletteBuilder,
}

impl<'a> ColorLineBuilder<'a> {
    pub fn new(resolver: &'a mut VariationResolver, palette: &'a mut PaletteBuilder) -> Self {
        ColorLineBuilder { resolver, palette }
    }

    /// Build a color line, with stops sorted by default offset.
    ///
    /// Every stop is given var indices for its offset and alpha if any stop
    /// varies, or if `variable` is `true` even when none does; the latter is
    /// the case when the line belongs to a variable gradient. Errors carry a
    /// path relative to the color line.
    pub fn build(&mut self, spec: &ColorLineSpec, variable: bool) -> Result<ColorLine, Error> {
        let variable = variable || spec.is_variable();
        let extend = parse_extend(&spec.extend).map_err(|kind| {
            let mut path = NodePath::default();
            path.in_field("extend");
            Error::new(kind, None, path)
        })?;

        let mut stops = Vec::with_capacity(spec.stops.len());
        for (i, stop) in spec.stops.iter().enumerate() {
            let default = self
                .resolver
                .default_value(&stop.offset)
                .map_err(|kind| stop_error(i, "offset", kind))?;
            stops.push((i, default, stop));
        }
        // stable, so stops at the same offset keep their order
        stops.sort_by(|a, b| a.1.total_cmp(&b.1));
        check_duplicate_positions(&stops)?;

        let stops = stops
            .into_iter()
            .map(|(i, _, stop)| self.build_stop(i, stop, variable))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(ColorLine { extend, stops })
    }

    fn build_stop(
        &mut self,
        idx: usize,
        stop: &ColorStopSpec,
        variable: bool,
    ) -> Result<ColorStop, Error> {
        let var_index_base = variable.then(|| self.resolver.next_var_index());
        let mut resolve = |field: &'static str, value: &Value| {
            let resolved = self
                .resolver
                .resolve(value, Units::F2Dot14)
                .map_err(|kind| stop_error(idx, field, kind))?;
            if variable {
                self.resolver
                    .add_var_index(&resolved)
                    .map_err(|kind| stop_error(idx, field, kind))?;
            }
            Ok::<_, Error>(F2Dot14::from_bits(resolved.base as i16))
        };
        let stop_offset = resolve("offset", &stop.offset)?;
        let alpha = resolve("alpha", &stop.alpha)?;
        let palette_index = self
            .palette
            .intern(&stop.color)
            .map_err(|kind| stop_error(idx, "color", kind))?;
        Ok(ColorStop {
            stop_offset,
            palette_index,
            alpha,
            var_index_base,
        })
    }
}

/// Two constant stops may not share an offset.
fn check_duplicate_positions(stops: &[(usize, f64, &ColorStopSpec)]) -> Result<(), Error> {
    let mut constant = stops
        .iter()
        .filter(|(_, _, stop)| !stop.offset.is_variable())
        .map(|(i, offset, _)| (*i, *offset, Units::F2Dot14.to_raw(*offset).ok()));
    let Some(mut prev) = constant.next() else {
        return Ok(());
    };
    for current in constant {
        if let (Some(a), Some(b)) = (prev.2, current.2) {
            if a == b {
                let position = current.1;
                return Err(stop_error(
                    current.0,
                    "offset",
                    ErrorKind::DuplicatePosition { position },
                ));
            }
        }
        prev = current;
    }
    Ok(())
}

fn stop_error(idx: usize, field: &'static str, kind: ErrorKind) -> Error {
    let mut path = NodePath::default();
    path.in_field("stops");
    path.in_index(idx);
    path.in_field(field);
    Error::new(kind, None, path)
}
