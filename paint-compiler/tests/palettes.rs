//! Palette assignment across whole compilations.

use paint_compiler::{
    compile, Color, ColorLineSpec, CompileOptions, Declarations, ErrorKind, PaintExpr, PaintKind,
    Point, Rgba, FOREGROUND_INDEX,
};

const GLYPHS: &[&str] = &["A", "B", "C", "square", "circle"];

fn color(s: &str) -> Color {
    s.parse().unwrap()
}

fn alternates(colors: &[&str]) -> Color {
    Color::alternates(colors.iter().copied()).unwrap()
}

fn solid_index(paint: &PaintKind) -> u16 {
    match paint {
        PaintKind::Solid { palette_index, .. } => *palette_index,
        other => panic!("expected a solid fill, found {other:?}"),
    }
}

#[test]
fn layers_share_one_palette() {
    let declarations = Declarations::new()
        .with(
            "A",
            PaintExpr::layers([
                PaintExpr::glyph("square", PaintExpr::solid(color("#FF0000FF"))),
                PaintExpr::glyph("circle", PaintExpr::solid(color("#0000FFFF"))),
            ]),
        )
        .with(
            "B",
            PaintExpr::glyph("circle", PaintExpr::solid(color("#0000FFFF"))),
        );
    let compiled = compile(&declarations, GLYPHS, &CompileOptions::default()).unwrap();
    let PaintKind::ColrLayers { layers } = &compiled.glyphs["A"].kind else {
        panic!("expected layers");
    };
    let indices = layers
        .iter()
        .map(|layer| solid_index(&layer.children().next().unwrap().kind))
        .collect::<Vec<_>>();
    assert_eq!(indices, [0, 1]);
    let b = compiled.glyphs["B"].children().next().unwrap();
    assert_eq!(solid_index(&b.kind), 1);
    assert_eq!(compiled.palettes.num_entries(), 2);
}

#[test]
fn foreground_is_not_interned() {
    let declarations = Declarations::new().with(
        "A",
        PaintExpr::glyph("square", PaintExpr::solid(Color::Foreground)),
    );
    let compiled = compile(&declarations, GLYPHS, &CompileOptions::default()).unwrap();
    let fill = compiled.glyphs["A"].children().next().unwrap();
    assert_eq!(solid_index(&fill.kind), FOREGROUND_INDEX);
    assert_eq!(compiled.palettes.num_entries(), 0);
    assert_eq!(compiled.palettes.num_palettes(), 1);
}

#[test]
fn alternate_palettes() {
    let declarations = Declarations::new()
        .with("A", PaintExpr::solid(alternates(&["#FF0000FF", "#00FF00FF"])))
        .with("B", PaintExpr::solid(alternates(&["#0000FFFF", "#000000FF"])));
    let compiled = compile(&declarations, GLYPHS, &CompileOptions::default()).unwrap();
    let palettes = &compiled.palettes;
    assert_eq!(palettes.num_palettes(), 2);
    assert_eq!(palettes.get(1, 1), Some(Rgba::new(0, 0, 0, 0xFF)));
    assert_eq!(palettes.get(0, 1), Some(Rgba::new(0, 0, 0xFF, 0xFF)));
}

#[test]
fn arity_mismatch() {
    let declarations = Declarations::new()
        .with("A", PaintExpr::solid(alternates(&["#FF0000FF", "#00FF00FF"])))
        .with(
            "B",
            PaintExpr::solid(alternates(&["#FF0000FF", "#00FF00FF", "#0000FFFF"])),
        );
    let err = compile(&declarations, GLYPHS, &CompileOptions::default()).unwrap_err();
    assert_eq!(
        err.kind(),
        &ErrorKind::PaletteArityMismatch {
            expected: 2,
            found: 3
        }
    );
    assert_eq!(err.glyph(), Some("B"));
    assert_eq!(err.path().to_string(), "SolidFill.color");
}

#[test]
fn single_colors_with_alternates() {
    let declarations = Declarations::new()
        .with("A", PaintExpr::solid(alternates(&["#FF0000FF", "#00FF00FF"])))
        .with("B", PaintExpr::solid(color("#0000FFFF")));
    let err = compile(&declarations, GLYPHS, &CompileOptions::default()).unwrap_err();
    assert_eq!(
        err.kind(),
        &ErrorKind::PaletteArityMismatch {
            expected: 2,
            found: 1
        }
    );

    let options = CompileOptions::default().with_broadcast_single_colors(true);
    let compiled = compile(&declarations, GLYPHS, &options).unwrap();
    let blue = Rgba::new(0, 0, 0xFF, 0xFF);
    assert_eq!(compiled.palettes.get(0, 1), Some(blue));
    assert_eq!(compiled.palettes.get(1, 1), Some(blue));
}

#[test]
fn stops_are_interned_in_offset_order() {
    let line = ColorLineSpec::new([
        (1.0, color("#0000FFFF")),
        (0.0, color("#FF0000FF")),
        (0.5, color("#00FF00FF")),
    ]);
    let gradient = PaintExpr::radial_gradient(Point::new(0, 0), 0, Point::new(0, 0), 100, line);
    let declarations = Declarations::new().with("A", gradient);
    let compiled = compile(&declarations, GLYPHS, &CompileOptions::default()).unwrap();
    let PaintKind::RadialGradient { color_line, .. } = &compiled.glyphs["A"].kind else {
        panic!("expected a radial gradient");
    };
    let indices = color_line
        .stops
        .iter()
        .map(|stop| stop.palette_index)
        .collect::<Vec<_>>();
    assert_eq!(indices, [0, 1, 2]);
    assert_eq!(
        compiled.palettes.get(0, 0),
        Some(Rgba::new(0xFF, 0, 0, 0xFF))
    );
}
