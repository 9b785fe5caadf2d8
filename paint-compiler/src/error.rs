//! Errors that occur during compilation

use std::fmt::{Debug, Display};

use font_types::Tag;

use crate::{
    paint::{COMPOSITE_MODE_NAMES, EXTEND_NAMES},
    variation::Units,
};

/// An error encountered while compiling a set of paint declarations.
///
/// Compilation is fail-fast: the first error aborts the run. The error
/// records the glyph whose tree was being compiled and the path to the
/// offending node within that tree.
#[derive(Clone, PartialEq)]
pub struct Error {
    glyph: Option<String>,
    path: NodePath,
    kind: ErrorKind,
}

/// The specific problem behind an [`Error`].
#[derive(Clone, Debug, PartialEq)]
#[non_exhaustive]
pub enum ErrorKind {
    /// A variation spec has no value at the default location.
    MissingDefault { locations: Vec<String> },
    /// Interned colors disagree on the number of alternate palettes.
    PaletteArityMismatch { expected: usize, found: usize },
    /// A color line extend mode that is not `pad`, `repeat` or `reflect`.
    InvalidExtendMode(String),
    /// A composite mode that is not a member of the COLR enumeration.
    UnknownCompositeMode(String),
    /// Color glyph references form a cycle; the first and last names are equal.
    CyclicReference { cycle: Vec<String> },
    /// Two constant color stop positions are identical.
    DuplicatePosition { position: f64 },
    /// A glyph name that is not present in the glyph set or declarations.
    UnknownGlyph(String),
    /// A variation spec that could not be understood.
    MalformedVariationSpec(String),
    /// A color literal that could not be parsed.
    InvalidColor(String),
    /// A value that cannot be encoded in the units of its parameter.
    ValueOutOfRange { value: f64, units: Units },
    /// A location refers to an axis that is not known to the compiler.
    UnknownAxis(Tag),
    /// An axis description that could not be parsed.
    InvalidAxis(String),
    /// More distinct colors than a palette can index.
    PaletteOverflow,
    /// More distinct regions than a delta set can index.
    RegionOverflow,
    /// More var indices than a delta set index map can hold.
    VarIndexOverflow,
    /// A glyph whose tree has already been compiled in this session.
    AlreadyCompiled(String),
    /// A paint document that could not be loaded.
    MalformedDocument(String),
}

/// The position of a node within a paint tree.
///
/// As compilation travels down the tree the path is recorded via calls to
/// [`in_node`][Self::in_node], [`in_field`][Self::in_field] and
/// [`in_index`][Self::in_index].
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct NodePath {
    elems: Vec<PathElem>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
enum PathElem {
    Node(&'static str),
    Field(&'static str),
    Index(usize),
}

impl NodePath {
    pub(crate) fn in_node(&mut self, name: &'static str) {
        self.elems.push(PathElem::Node(name));
    }

    pub(crate) fn in_field(&mut self, name: &'static str) {
        self.elems.push(PathElem::Field(name));
    }

    pub(crate) fn in_index(&mut self, idx: usize) {
        self.elems.push(PathElem::Index(idx));
    }

    pub(crate) fn pop(&mut self) {
        self.elems.pop();
    }

    /// Returns `true` if this path refers to the root of the tree.
    pub fn is_empty(&self) -> bool {
        self.elems.is_empty()
    }
}

impl Error {
    pub(crate) fn new(kind: ErrorKind, glyph: Option<&str>, path: NodePath) -> Self {
        Self {
            glyph: glyph.map(str::to_owned),
            path,
            kind,
        }
    }

    /// Place an error produced relative to some node within the context of
    /// the glyph and path of that node.
    pub(crate) fn in_context(mut self, glyph: Option<&str>, prefix: &NodePath) -> Self {
        let mut path = prefix.clone();
        path.elems.append(&mut self.path.elems);
        self.path = path;
        if self.glyph.is_none() {
            self.glyph = glyph.map(str::to_owned);
        }
        self
    }

    /// The kind of error.
    pub fn kind(&self) -> &ErrorKind {
        &self.kind
    }

    /// The name of the glyph being compiled when the error occurred, if any.
    pub fn glyph(&self) -> Option<&str> {
        self.glyph.as_deref()
    }

    /// The path to the node that produced the error.
    pub fn path(&self) -> &NodePath {
        &self.path
    }
}

impl From<ErrorKind> for Error {
    fn from(kind: ErrorKind) -> Self {
        Error {
            glyph: None,
            path: NodePath::default(),
            kind,
        }
    }
}

impl Display for NodePath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for (i, elem) in self.elems.iter().enumerate() {
            match elem {
                PathElem::Node(name) if i == 0 => write!(f, "{name}"),
                PathElem::Node(name) => write!(f, " > {name}"),
                PathElem::Field(name) => write!(f, ".{name}"),
                PathElem::Index(idx) => write!(f, "[{idx}]"),
            }?;
        }
        Ok(())
    }
}

impl Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorKind::MissingDefault { locations } => write!(
                f,
                "variation spec has no value at the default location (locations: {})",
                locations.join("; ")
            ),
            ErrorKind::PaletteArityMismatch { expected, found } => write!(
                f,
                "color has {found} palette entries but {expected} alternate palettes are in use"
            ),
            ErrorKind::InvalidExtendMode(mode) => write!(
                f,
                "unknown extend mode '{mode}', must be one of: {}",
                EXTEND_NAMES.join(", ")
            ),
            ErrorKind::UnknownCompositeMode(mode) => write!(
                f,
                "unknown composite mode '{mode}', must be one of: {}",
                COMPOSITE_MODE_NAMES.join(", ")
            ),
            ErrorKind::CyclicReference { cycle } => {
                write!(f, "cyclic color glyph reference: {}", cycle.join(" -> "))
            }
            ErrorKind::DuplicatePosition { position } => {
                write!(f, "more than one color stop at position {position}")
            }
            ErrorKind::UnknownGlyph(name) => write!(f, "unknown glyph '{name}'"),
            ErrorKind::MalformedVariationSpec(msg) => write!(f, "malformed variation spec: {msg}"),
            ErrorKind::InvalidColor(color) => write!(
                f,
                "invalid color '{color}', expected '#RRGGBBAA' or 'foreground'"
            ),
            ErrorKind::ValueOutOfRange { value, units } => {
                write!(f, "value {value} cannot be encoded as {units}")
            }
            ErrorKind::UnknownAxis(tag) => write!(f, "unknown variation axis '{tag}'"),
            ErrorKind::InvalidAxis(msg) => write!(f, "invalid axis: {msg}"),
            ErrorKind::PaletteOverflow => write!(f, "too many colors for a single palette"),
            ErrorKind::RegionOverflow => write!(f, "too many variation regions"),
            ErrorKind::VarIndexOverflow => write!(f, "too many var indices"),
            ErrorKind::AlreadyCompiled(name) => write!(f, "glyph '{name}' is already compiled"),
            ErrorKind::MalformedDocument(msg) => write!(f, "malformed paint document: {msg}"),
        }
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.kind)?;
        if let Some(glyph) = &self.glyph {
            write!(f, " in glyph '{glyph}'")?;
        }
        if !self.path.is_empty() {
            write!(f, " at {}", self.path)?;
        }
        Ok(())
    }
}

impl Debug for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        <Self as Display>::fmt(self, f)
    }
}

impl std::error::Error for ErrorKind {}
impl std::error::Error for Error {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn path_display() {
        let mut path = NodePath::default();
        path.in_node("LayerStack");
        path.in_field("layers");
        path.in_index(1);
        path.in_node("GlyphMask");
        path.in_field("paint");
        assert_eq!(path.to_string(), "LayerStack.layers[1] > GlyphMask.paint");

        let err = Error::new(ErrorKind::UnknownGlyph("star".into()), Some("A"), path);
        assert_eq!(
            err.to_string(),
            "unknown glyph 'star' in glyph 'A' at LayerStack.layers[1] > GlyphMask.paint"
        );
    }

    #[test]
    fn relative_error_in_context() {
        let mut inner = NodePath::default();
        inner.in_field("stops");
        inner.in_index(0);
        let err = Error::new(ErrorKind::PaletteOverflow, None, inner);
        let mut outer = NodePath::default();
        outer.in_node("LinearGradient");
        outer.in_field("color_line");
        let err = err.in_context(Some("B"), &outer);
        assert_eq!(err.glyph(), Some("B"));
        assert_eq!(err.path().to_string(), "LinearGradient.color_line.stops[0]");
    }

    #[test]
    fn bare_kind_has_no_location() {
        let err: Error = ErrorKind::PaletteOverflow.into();
        assert_eq!(err.to_string(), "too many colors for a single palette");
        assert!(err.glyph().is_none());
    }
}
