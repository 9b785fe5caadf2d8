//! Compiling paint trees.

use std::collections::HashMap;

use font_types::{F2Dot14, Fixed};
use indexmap::IndexMap;

use crate::{
    color_line::ColorLineBuilder,
    config::CompileOptions,
    error::{Error, ErrorKind, NodePath},
    format::{select_format, FormatParams, PaintFamily},
    glyphs::GlyphSet,
    graph::{Affine2x3, Center, ColorLine, Paint, PaintKind},
    palette::{PaletteBuilder, Palettes},
    paint::{parse_composite_mode, ColorLineSpec, CompositeMode, Declarations, PaintExpr, Point},
    variation::{Units, Value, VariationResolver, VariationStore},
};

/// The result of compiling a set of paint declarations.
///
/// This is everything needed to write the `COLR` and `CPAL` tables.
#[derive(Clone, Debug, PartialEq)]
pub struct CompiledColr {
    /// The root paint of each glyph, in declaration order.
    pub glyphs: IndexMap<String, Paint>,
    pub palettes: Palettes,
    pub variations: VariationStore,
}

/// Compiles the paint trees of a set of glyphs.
///
/// A compiler is a single compilation session: the palette and the variation
/// registry are shared by every glyph it compiles, and indices in both are
/// assigned in order of first use.
pub struct PaintTreeCompiler<'a, G: ?Sized> {
    declarations: &'a Declarations,
    glyph_set: &'a G,
    resolver: VariationResolver,
    palette: PaletteBuilder,
    compiled: HashMap<String, Paint>,
    /// The glyphs currently being compiled, outermost first.
    stack: Vec<String>,
    path: NodePath,
}

/// A scalar parameter of a node: its field name, value and units.
type Param<'p> = (&'static str, &'p Value, Units);

/// Compile every declared glyph.
///
/// Every glyph named by a paint, including the targets of color glyph
/// references, must be in `glyph_set`.
pub fn compile<G: GlyphSet + ?Sized>(
    declarations: &Declarations,
    glyph_set: &G,
    options: &CompileOptions,
) -> Result<CompiledColr, Error> {
    PaintTreeCompiler::new(declarations, glyph_set, options).finish()
}

impl<'a, G: GlyphSet + ?Sized> PaintTreeCompiler<'a, G> {
    pub fn new(declarations: &'a Declarations, glyph_set: &'a G, options: &CompileOptions) -> Self {
        PaintTreeCompiler {
            declarations,
            glyph_set,
            resolver: VariationResolver::new(options),
            palette: PaletteBuilder::new(options.broadcast_single_colors),
            compiled: HashMap::new(),
            stack: Vec::new(),
            path: NodePath::default(),
        }
    }

    /// Compile the paint tree for a glyph.
    ///
    /// Declared glyphs referenced by the tree are compiled first, if they have
    /// not been already. A glyph is compiled at most once per session, so it
    /// is an error if `glyph` already has a tree.
    pub fn compile(&mut self, glyph: &str, expr: &PaintExpr) -> Result<&Paint, Error> {
        self.stack.clear();
        self.path = NodePath::default();
        if self.compiled.contains_key(glyph) {
            return Err(Error::new(
                ErrorKind::AlreadyCompiled(glyph.to_owned()),
                Some(glyph),
                NodePath::default(),
            ));
        }
        self.compile_root(glyph, expr)?;
        self.compiled
            .get(glyph)
            .ok_or_else(|| ErrorKind::UnknownGlyph(glyph.to_owned()).into())
    }

    /// Compile any remaining declared glyphs, and finalize the palettes and
    /// variation data.
    pub fn finish(mut self) -> Result<CompiledColr, Error> {
        let declarations = self.declarations;
        for (name, expr) in declarations.iter() {
            if !self.compiled.contains_key(name) {
                self.compile(name, expr)?;
            }
        }
        let mut glyphs = self.compiled.into_iter().collect::<IndexMap<_, _>>();
        glyphs.sort_by(|a, _, b, _| {
            let order = |name: &String| declarations.position(name).unwrap_or(usize::MAX);
            order(a).cmp(&order(b))
        });
        let palettes = self.palette.build();
        let variations = self.resolver.finish();
        log::debug!(
            "compiled {} glyphs, {} palette(s) of {} colors",
            glyphs.len(),
            palettes.num_palettes(),
            palettes.num_entries()
        );
        Ok(CompiledColr {
            glyphs,
            palettes,
            variations,
        })
    }

    fn compile_root(&mut self, glyph: &str, expr: &PaintExpr) -> Result<(), Error> {
        self.stack.push(glyph.to_owned());
        let paint = self.compile_node(expr)?;
        log::debug!(
            "compiled glyph '{glyph}': {} at root, var index base {:?}",
            paint.format,
            paint.var_index_base
        );
        self.compiled.insert(glyph.to_owned(), paint);
        self.stack.pop();
        Ok(())
    }

    fn error(&self, kind: ErrorKind) -> Error {
        Error::new(kind, self.stack.last().map(String::as_str), self.path.clone())
    }

    fn compile_node(&mut self, expr: &PaintExpr) -> Result<Paint, Error> {
        self.path.in_node(expr.kind_name());
        let paint = match expr {
            PaintExpr::SolidFill { color, alpha } => {
                let variable = alpha.is_variable();
                let (var_index_base, [alpha]) =
                    self.resolve_params([("alpha", alpha, Units::F2Dot14)], variable)?;
                self.path.in_field("color");
                let palette_index = self.palette.intern(color).map_err(|e| self.error(e))?;
                self.path.pop();
                let format = select_format(PaintFamily::Solid, variable_params(variable));
                Paint {
                    format,
                    var_index_base,
                    kind: PaintKind::Solid {
                        palette_index,
                        alpha: f2dot14(alpha),
                    },
                }
            }
            PaintExpr::LinearGradient {
                p0,
                p1,
                p2,
                color_line,
            } => {
                let variable = p0.is_variable()
                    || p1.is_variable()
                    || p2.is_variable()
                    || color_line.is_variable();
                let (var_index_base, [x0, y0, x1, y1, x2, y2]) = self.resolve_params(
                    [
                        ("p0.x", &p0.x, Units::FWord),
                        ("p0.y", &p0.y, Units::FWord),
                        ("p1.x", &p1.x, Units::FWord),
                        ("p1.y", &p1.y, Units::FWord),
                        ("p2.x", &p2.x, Units::FWord),
                        ("p2.y", &p2.y, Units::FWord),
                    ],
                    variable,
                )?;
                let color_line = self.color_line(color_line, variable)?;
                Paint {
                    format: select_format(PaintFamily::LinearGradient, variable_params(variable)),
                    var_index_base,
                    kind: PaintKind::LinearGradient {
                        color_line,
                        x0: fword(x0),
                        y0: fword(y0),
                        x1: fword(x1),
                        y1: fword(y1),
                        x2: fword(x2),
                        y2: fword(y2),
                    },
                }
            }
            PaintExpr::RadialGradient {
                c0,
                r0,
                c1,
                r1,
                color_line,
            } => {
                let variable = c0.is_variable()
                    || r0.is_variable()
                    || c1.is_variable()
                    || r1.is_variable()
                    || color_line.is_variable();
                let (var_index_base, [x0, y0, radius0, x1, y1, radius1]) = self.resolve_params(
                    [
                        ("c0.x", &c0.x, Units::FWord),
                        ("c0.y", &c0.y, Units::FWord),
                        ("r0", r0, Units::UfWord),
                        ("c1.x", &c1.x, Units::FWord),
                        ("c1.y", &c1.y, Units::FWord),
                        ("r1", r1, Units::UfWord),
                    ],
                    variable,
                )?;
                let color_line = self.color_line(color_line, variable)?;
                Paint {
                    format: select_format(PaintFamily::RadialGradient, variable_params(variable)),
                    var_index_base,
                    kind: PaintKind::RadialGradient {
                        color_line,
                        x0: fword(x0),
                        y0: fword(y0),
                        radius0: ufword(radius0),
                        x1: fword(x1),
                        y1: fword(y1),
                        radius1: ufword(radius1),
                    },
                }
            }
            PaintExpr::SweepGradient {
                center,
                start_angle,
                end_angle,
                color_line,
            } => {
                let variable = center.is_variable()
                    || start_angle.is_variable()
                    || end_angle.is_variable()
                    || color_line.is_variable();
                let (var_index_base, [center_x, center_y, start_angle, end_angle]) = self
                    .resolve_params(
                        [
                            ("center.x", &center.x, Units::FWord),
                            ("center.y", &center.y, Units::FWord),
                            ("start_angle", start_angle, Units::Angle),
                            ("end_angle", end_angle, Units::Angle),
                        ],
                        variable,
                    )?;
                let color_line = self.color_line(color_line, variable)?;
                Paint {
                    format: select_format(PaintFamily::SweepGradient, variable_params(variable)),
                    var_index_base,
                    kind: PaintKind::SweepGradient {
                        color_line,
                        center_x: fword(center_x),
                        center_y: fword(center_y),
                        start_angle: f2dot14(start_angle),
                        end_angle: f2dot14(end_angle),
                    },
                }
            }
            PaintExpr::GlyphMask { glyph, paint } => {
                self.path.in_field("glyph");
                if !self.glyph_set.contains_glyph(glyph) {
                    return Err(self.error(ErrorKind::UnknownGlyph(glyph.clone())));
                }
                self.path.pop();
                let paint = self.compile_child("paint", paint)?;
                Paint {
                    format: select_format(PaintFamily::Glyph, Default::default()),
                    var_index_base: None,
                    kind: PaintKind::Glyph {
                        glyph: glyph.clone(),
                        paint: Box::new(paint),
                    },
                }
            }
            PaintExpr::ColorGlyphReference { glyph, paint } => {
                let reference = self.colr_glyph(glyph)?;
                match paint {
                    None => reference,
                    Some(paint) => {
                        let source = self.compile_child("paint", paint)?;
                        Paint {
                            format: select_format(PaintFamily::Composite, Default::default()),
                            var_index_base: None,
                            kind: PaintKind::Composite {
                                source_paint: Box::new(source),
                                mode: CompositeMode::SrcIn,
                                backdrop_paint: Box::new(reference),
                            },
                        }
                    }
                }
            }
            PaintExpr::AffineTransform { transform, paint } => {
                let child = self.compile_child("paint", paint)?;
                let entries = transform.entries();
                let variable = entries.iter().any(|(_, value)| value.is_variable());
                let (var_index_base, [xx, yx, xy, yy, dx, dy]) = self.resolve_params(
                    entries.map(|(field, value)| (field, value, Units::Fixed)),
                    variable,
                )?;
                Paint {
                    format: select_format(PaintFamily::Transform, variable_params(variable)),
                    var_index_base,
                    kind: PaintKind::Transform {
                        transform: Affine2x3 {
                            xx: Fixed::from_bits(xx),
                            yx: Fixed::from_bits(yx),
                            xy: Fixed::from_bits(xy),
                            yy: Fixed::from_bits(yy),
                            dx: Fixed::from_bits(dx),
                            dy: Fixed::from_bits(dy),
                        },
                        paint: Box::new(child),
                    },
                }
            }
            PaintExpr::Translate { dx, dy, paint } => {
                let child = self.compile_child("paint", paint)?;
                let variable = dx.is_variable() || dy.is_variable();
                let (var_index_base, [dx, dy]) = self.resolve_params(
                    [("dx", dx, Units::FWord), ("dy", dy, Units::FWord)],
                    variable,
                )?;
                Paint {
                    format: select_format(PaintFamily::Translate, variable_params(variable)),
                    var_index_base,
                    kind: PaintKind::Translate {
                        dx: fword(dx),
                        dy: fword(dy),
                        paint: Box::new(child),
                    },
                }
            }
            PaintExpr::Scale {
                scale_x,
                scale_y,
                center,
                paint,
            } => {
                let child = self.compile_child("paint", paint)?;
                let mut params = vec![("scale_x", scale_x, Units::F2Dot14)];
                if let Some(scale_y) = scale_y {
                    params.push(("scale_y", scale_y, Units::F2Dot14));
                }
                let format_params = transform_params(&params, center.as_ref(), scale_y.is_some());
                let (var_index_base, values, around_center) =
                    self.resolve_transform(params, center.as_ref(), format_params.variable)?;
                let scale_x = f2dot14(values[0]);
                let scale_y = values.get(1).copied().map(f2dot14).unwrap_or(scale_x);
                Paint {
                    format: select_format(PaintFamily::Scale, format_params),
                    var_index_base,
                    kind: PaintKind::Scale {
                        scale_x,
                        scale_y,
                        around_center,
                        paint: Box::new(child),
                    },
                }
            }
            PaintExpr::Rotate {
                angle,
                center,
                paint,
            } => {
                let child = self.compile_child("paint", paint)?;
                let params = vec![("angle", angle, Units::Angle)];
                let format_params = transform_params(&params, center.as_ref(), false);
                let (var_index_base, values, around_center) =
                    self.resolve_transform(params, center.as_ref(), format_params.variable)?;
                Paint {
                    format: select_format(PaintFamily::Rotate, format_params),
                    var_index_base,
                    kind: PaintKind::Rotate {
                        angle: f2dot14(values[0]),
                        around_center,
                        paint: Box::new(child),
                    },
                }
            }
            PaintExpr::Skew {
                x_skew_angle,
                y_skew_angle,
                center,
                paint,
            } => {
                let child = self.compile_child("paint", paint)?;
                let params = vec![
                    ("x_skew_angle", x_skew_angle, Units::Angle),
                    ("y_skew_angle", y_skew_angle, Units::Angle),
                ];
                let format_params = transform_params(&params, center.as_ref(), false);
                let (var_index_base, values, around_center) =
                    self.resolve_transform(params, center.as_ref(), format_params.variable)?;
                Paint {
                    format: select_format(PaintFamily::Skew, format_params),
                    var_index_base,
                    kind: PaintKind::Skew {
                        x_skew_angle: f2dot14(values[0]),
                        y_skew_angle: f2dot14(values[1]),
                        around_center,
                        paint: Box::new(child),
                    },
                }
            }
            PaintExpr::Composite {
                mode,
                source,
                backdrop,
            } => {
                let source = self.compile_child("source", source)?;
                let backdrop = self.compile_child("backdrop", backdrop)?;
                self.path.in_field("mode");
                let mode = parse_composite_mode(mode).map_err(|e| self.error(e))?;
                self.path.pop();
                Paint {
                    format: select_format(PaintFamily::Composite, Default::default()),
                    var_index_base: None,
                    kind: PaintKind::Composite {
                        source_paint: Box::new(source),
                        mode,
                        backdrop_paint: Box::new(backdrop),
                    },
                }
            }
            PaintExpr::LayerStack { layers } => {
                self.path.in_field("layers");
                let mut compiled = Vec::with_capacity(layers.len());
                for (i, layer) in layers.iter().enumerate() {
                    self.path.in_index(i);
                    compiled.push(self.compile_node(layer)?);
                    self.path.pop();
                }
                self.path.pop();
                let layers = compiled;
                Paint {
                    format: select_format(PaintFamily::ColrLayers, Default::default()),
                    var_index_base: None,
                    kind: PaintKind::ColrLayers { layers },
                }
            }
        };
        self.path.pop();
        Ok(paint)
    }

    fn compile_child(&mut self, field: &'static str, expr: &PaintExpr) -> Result<Paint, Error> {
        self.path.in_field(field);
        let paint = self.compile_node(expr)?;
        self.path.pop();
        Ok(paint)
    }

    /// Resolve the parameters of a node.
    ///
    /// If `variable` is set, each parameter is assigned a var index and the
    /// first of these is returned alongside the encoded default values.
    fn resolve_params<const N: usize>(
        &mut self,
        params: [Param; N],
        variable: bool,
    ) -> Result<(Option<u32>, [i32; N]), Error> {
        let var_index_base = variable.then(|| self.resolver.next_var_index());
        let mut values = [0; N];
        for (value, param) in values.iter_mut().zip(params) {
            *value = self.resolve_param(param, variable)?;
        }
        Ok((var_index_base, values))
    }

    fn resolve_param(
        &mut self,
        (field, value, units): Param,
        variable: bool,
    ) -> Result<i32, Error> {
        self.path.in_field(field);
        let resolved = self
            .resolver
            .resolve(value, units)
            .map_err(|e| self.error(e))?;
        if variable {
            self.resolver
                .add_var_index(&resolved)
                .map_err(|e| self.error(e))?;
        }
        self.path.pop();
        Ok(resolved.base)
    }

    /// Resolve the parameters of a scale, rotation or skew, followed by its
    /// center if it has one.
    fn resolve_transform(
        &mut self,
        params: Vec<Param>,
        center: Option<&Point>,
        variable: bool,
    ) -> Result<(Option<u32>, Vec<i32>, Option<Center>), Error> {
        let var_index_base = variable.then(|| self.resolver.next_var_index());
        let values = params
            .into_iter()
            .map(|param| self.resolve_param(param, variable))
            .collect::<Result<Vec<_>, _>>()?;
        let around_center = match center {
            Some(center) => {
                let x = self.resolve_param(("center.x", &center.x, Units::FWord), variable)?;
                let y = self.resolve_param(("center.y", &center.y, Units::FWord), variable)?;
                Some(Center {
                    x: fword(x),
                    y: fword(y),
                })
            }
            None => None,
        };
        Ok((var_index_base, values, around_center))
    }

    fn color_line(&mut self, spec: &ColorLineSpec, variable: bool) -> Result<ColorLine, Error> {
        let glyph = self.stack.last().map(String::as_str);
        let mut prefix = self.path.clone();
        prefix.in_field("color_line");
        ColorLineBuilder::new(&mut self.resolver, &mut self.palette)
            .build(spec, variable)
            .map_err(|e| e.in_context(glyph, &prefix))
    }

    /// Compile a reference to another color glyph, compiling its tree first
    /// if necessary.
    fn colr_glyph(&mut self, glyph: &str) -> Result<Paint, Error> {
        self.path.in_field("glyph");
        if let Some(pos) = self.stack.iter().position(|name| name == glyph) {
            let mut cycle = self.stack[pos..].to_vec();
            cycle.push(glyph.to_owned());
            return Err(self.error(ErrorKind::CyclicReference { cycle }));
        }
        let declarations = self.declarations;
        let target = declarations
            .get(glyph)
            .filter(|_| self.glyph_set.contains_glyph(glyph));
        let Some(target) = target else {
            return Err(self.error(ErrorKind::UnknownGlyph(glyph.to_owned())));
        };
        if !self.compiled.contains_key(glyph) {
            log::trace!("compiling '{glyph}' on first reference");
            let path = std::mem::take(&mut self.path);
            self.compile_root(glyph, target)?;
            self.path = path;
        }
        self.path.pop();
        Ok(Paint {
            format: select_format(PaintFamily::ColrGlyph, Default::default()),
            var_index_base: None,
            kind: PaintKind::ColrGlyph {
                glyph: glyph.to_owned(),
            },
        })
    }
}

fn variable_params(variable: bool) -> FormatParams {
    FormatParams {
        variable,
        ..Default::default()
    }
}

fn transform_params(params: &[Param], center: Option<&Point>, has_scale_y: bool) -> FormatParams {
    FormatParams {
        has_scale_y,
        has_center: center.is_some(),
        variable: params.iter().any(|(_, value, _)| value.is_variable())
            || center.map(Point::is_variable).unwrap_or(false),
    }
}

// values are range checked when they are resolved

fn fword(raw: i32) -> i16 {
    raw as i16
}

fn ufword(raw: i32) -> u16 {
    raw as u16
}

fn f2dot14(raw: i32) -> F2Dot14 {
    F2Dot14::from_bits(raw as i16)
}
