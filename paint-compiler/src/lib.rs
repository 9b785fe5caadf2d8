//! Compiling declarative color paint trees into COLRv1 paint graphs.
//!
//! Paints are described with [`PaintExpr`], a tree of fills, gradients,
//! transforms and composites in which any scalar may vary across the font's
//! design space. The [`PaintTreeCompiler`] turns these trees into [`Paint`]
//! graphs where every node has a concrete table format, every color is an
//! index into a shared palette, and every varying parameter has a var index
//! into a shared [`VariationStore`].
//!
//! ```
//! use paint_compiler::{compile, Color, ColorLineSpec, CompileOptions, Declarations, PaintExpr, Point};
//!
//! let red: Color = "#FF0000FF".parse().unwrap();
//! let blue: Color = "#0000FFFF".parse().unwrap();
//! let gradient = PaintExpr::linear_gradient(
//!     Point::new(0, 0),
//!     Point::new(500, 0),
//!     Point::new(0, 500),
//!     ColorLineSpec::between(red, blue),
//! );
//! let declarations = Declarations::new().with("A", PaintExpr::glyph("A.outline", gradient));
//! let compiled = compile(&declarations, &["A", "A.outline"], &CompileOptions::default()).unwrap();
//! assert_eq!(compiled.palettes.num_entries(), 2);
//! ```

#![forbid(unsafe_code)]

pub mod variation;

mod axis;
mod color;
mod color_line;
mod compile;
mod config;
#[cfg(feature = "json")]
mod document;
mod error;
mod format;
mod glyphs;
mod graph;
mod paint;
mod palette;
mod round;

/// Expose the scalar types used in compiled paints.
pub extern crate font_types as types;

pub use axis::Axis;
pub use color::{Color, Rgba, FOREGROUND};
pub use color_line::ColorLineBuilder;
pub use compile::{compile, CompiledColr, PaintTreeCompiler};
pub use config::{CompileOptions, LocationSpace};
#[cfg(feature = "json")]
pub use document::PaintDocument;
pub use error::{Error, ErrorKind, NodePath};
pub use format::{select_format, FormatParams, PaintFamily, PaintFormat};
pub use glyphs::GlyphSet;
pub use graph::{Affine2x3, Center, ColorLine, ColorStop, Paint, PaintKind};
pub use paint::{
    Affine, ColorLineSpec, ColorStopSpec, CompositeMode, Declarations, Extend, PaintExpr, Point,
    COMPOSITE_MODE_NAMES, EXTEND_NAMES,
};
pub use palette::{PaletteBuilder, Palettes, FOREGROUND_INDEX};
pub use variation::{Location, Value, VariationResolver, VariationSpec, VariationStore};
