//! The compiled paint graph.
//!
//! Every node knows its concrete table format, and every parameter is stored
//! in the type used to encode it. Variable nodes carry a `var_index_base`;
//! their parameters occupy consecutive var indices starting there, in field
//! order.

use font_types::{F2Dot14, Fixed};

use crate::{
    format::PaintFormat,
    paint::{CompositeMode, Extend},
};

/// A compiled paint node.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Paint {
    pub format: PaintFormat,
    /// The first var index of this node's parameters, for variable formats.
    pub var_index_base: Option<u32>,
    pub kind: PaintKind,
}

/// The payload of a compiled paint, with one variant per family of formats.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PaintKind {
    ColrLayers {
        layers: Vec<Paint>,
    },
    Solid {
        palette_index: u16,
        alpha: F2Dot14,
    },
    LinearGradient {
        color_line: ColorLine,
        x0: i16,
        y0: i16,
        x1: i16,
        y1: i16,
        x2: i16,
        y2: i16,
    },
    RadialGradient {
        color_line: ColorLine,
        x0: i16,
        y0: i16,
        radius0: u16,
        x1: i16,
        y1: i16,
        radius1: u16,
    },
    SweepGradient {
        color_line: ColorLine,
        center_x: i16,
        center_y: i16,
        start_angle: F2Dot14,
        end_angle: F2Dot14,
    },
    Glyph {
        glyph: String,
        paint: Box<Paint>,
    },
    ColrGlyph {
        glyph: String,
    },
    Transform {
        transform: Affine2x3,
        paint: Box<Paint>,
    },
    Translate {
        dx: i16,
        dy: i16,
        paint: Box<Paint>,
    },
    /// All four scale formats; the uniform formats have equal factors.
    Scale {
        scale_x: F2Dot14,
        scale_y: F2Dot14,
        around_center: Option<Center>,
        paint: Box<Paint>,
    },
    Rotate {
        angle: F2Dot14,
        around_center: Option<Center>,
        paint: Box<Paint>,
    },
    Skew {
        x_skew_angle: F2Dot14,
        y_skew_angle: F2Dot14,
        around_center: Option<Center>,
        paint: Box<Paint>,
    },
    Composite {
        source_paint: Box<Paint>,
        mode: CompositeMode,
        backdrop_paint: Box<Paint>,
    },
}

/// The center of a scale, rotation or skew.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Center {
    pub x: i16,
    pub y: i16,
}

/// An affine matrix, in 16.16 fixed point.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Affine2x3 {
    pub xx: Fixed,
    pub yx: Fixed,
    pub xy: Fixed,
    pub yy: Fixed,
    pub dx: Fixed,
    pub dy: Fixed,
}

/// A compiled color line.
///
/// Stops are sorted by their default offset.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ColorLine {
    pub extend: Extend,
    pub stops: Vec<ColorStop>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ColorStop {
    pub stop_offset: F2Dot14,
    pub palette_index: u16,
    pub alpha: F2Dot14,
    /// For stops of a variable color line: the var index of the offset; the
    /// alpha follows at the next index.
    pub var_index_base: Option<u32>,
}

impl Paint {
    /// Returns `true` if this node uses a variable format.
    pub fn is_variable(&self) -> bool {
        self.format.is_variable()
    }

    /// The direct children of this node.
    ///
    /// Color glyph references are not followed.
    pub fn children(&self) -> impl Iterator<Item = &Paint> + '_ {
        let children: Vec<&Paint> = match &self.kind {
            PaintKind::ColrLayers { layers } => layers.iter().collect(),
            PaintKind::Glyph { paint, .. }
            | PaintKind::Transform { paint, .. }
            | PaintKind::Translate { paint, .. }
            | PaintKind::Scale { paint, .. }
            | PaintKind::Rotate { paint, .. }
            | PaintKind::Skew { paint, .. } => vec![paint.as_ref()],
            PaintKind::Composite {
                source_paint,
                backdrop_paint,
                ..
            } => vec![source_paint.as_ref(), backdrop_paint.as_ref()],
            PaintKind::Solid { .. }
            | PaintKind::LinearGradient { .. }
            | PaintKind::RadialGradient { .. }
            | PaintKind::SweepGradient { .. }
            | PaintKind::ColrGlyph { .. } => Vec::new(),
        };
        children.into_iter()
    }
}

impl ColorLine {
    /// Returns `true` if this line's stops are variable.
    pub fn is_variable(&self) -> bool {
        self.stops.iter().any(|stop| stop.var_index_base.is_some())
    }
}
