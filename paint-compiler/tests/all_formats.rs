//! Compile a document that exercises every paint format.

#![cfg(feature = "json")]

use paint_compiler::{
    types::Tag, variation::NormalizedLocation, CompiledColr, Paint, PaintDocument, PaintFormat,
    PaintKind, Rgba,
};
use paint_test_data::{ALL_FORMATS, OUTLINE_GLYPHS};

fn compile_all() -> CompiledColr {
    let _ = env_logger::builder().is_test(true).try_init();
    let doc = PaintDocument::from_json(ALL_FORMATS).unwrap();
    let glyph_set = doc
        .declarations
        .iter()
        .map(|(name, _)| name.to_owned())
        .chain(OUTLINE_GLYPHS.iter().map(|name| name.to_string()))
        .collect::<Vec<_>>();
    doc.compile(&glyph_set).unwrap()
}

fn formats(paint: &Paint, out: &mut Vec<PaintFormat>) {
    out.push(paint.format);
    for child in paint.children() {
        formats(child, out);
    }
}

fn find<'a>(paint: &'a Paint, format: PaintFormat) -> Option<&'a Paint> {
    if paint.format == format {
        return Some(paint);
    }
    paint.children().find_map(|child| find(child, format))
}

#[test]
fn every_format_is_selected() {
    let compiled = compile_all();
    assert_eq!(compiled.glyphs.len(), 32);
    for (i, (name, paint)) in compiled.glyphs.iter().enumerate() {
        let (number, format_name) = name[1..].split_once('_').unwrap();
        assert_eq!(number.parse::<usize>().unwrap(), i + 1, "glyph order");
        let mut seen = Vec::new();
        formats(paint, &mut seen);
        let format = seen
            .iter()
            .find(|format| format.format_byte() as usize == i + 1)
            .unwrap_or_else(|| panic!("{name} has no format {}: {seen:?}", i + 1));
        assert_eq!(format!("Paint{format:?}"), format_name);
        // only the paint the glyph is named for varies
        for other in seen.iter().filter(|other| *other != format) {
            assert!(!other.is_variable(), "{name}: unexpected {other}");
        }
    }
}

#[test]
fn shared_palette() {
    let compiled = compile_all();
    let red = "#EA4335FF".parse::<Rgba>().unwrap();
    let blue = "#4285F4FF".parse::<Rgba>().unwrap();
    let green = "#34A853FF".parse::<Rgba>().unwrap();
    assert_eq!(compiled.palettes.palettes(), &[vec![red, blue, green]]);
}

#[test]
fn variable_translate() {
    let compiled = compile_all();
    let paint = find(
        &compiled.glyphs["p15_PaintVarTranslate"],
        PaintFormat::VarTranslate,
    )
    .unwrap();
    let PaintKind::Translate { dx, dy, .. } = paint.kind else {
        panic!("not a translate: {paint:?}");
    };
    assert_eq!((dx, dy), (0, 0));
    let base = paint.var_index_base.unwrap();
    let max_x = NormalizedLocation::new([(Tag::new(b"TRAX"), 1.0)]);
    let min_y = NormalizedLocation::new([(Tag::new(b"TRAY"), -1.0)]);
    let store = &compiled.variations;
    assert_eq!(store.evaluate(base, dx as i32, &max_x), 500.0);
    assert_eq!(store.evaluate(base, dx as i32, &min_y), 0.0);
    assert_eq!(store.evaluate(base + 1, dy as i32, &min_y), -500.0);
}

#[test]
fn variable_color_line() {
    let compiled = compile_all();
    let paint = find(
        &compiled.glyphs["p9_PaintVarSweepGradient"],
        PaintFormat::VarSweepGradient,
    )
    .unwrap();
    let PaintKind::SweepGradient { color_line, .. } = &paint.kind else {
        panic!("not a sweep gradient: {paint:?}");
    };
    let base = paint.var_index_base.unwrap();
    // four gradient parameters precede the stops
    let stop_bases = color_line
        .stops
        .iter()
        .map(|stop| stop.var_index_base.unwrap() - base)
        .collect::<Vec<_>>();
    assert_eq!(stop_bases, vec![4, 6, 8]);
    let green = &color_line.stops[1];
    let transparent = NormalizedLocation::new([(Tag::new(b"ALPH"), -1.0)]);
    let alpha = compiled.variations.evaluate(
        green.var_index_base.unwrap() + 1,
        green.alpha.to_bits() as i32,
        &transparent,
    );
    assert_eq!(alpha, 0.0);
}

#[test]
fn colr_glyph_reference() {
    let compiled = compile_all();
    assert_eq!(
        compiled.glyphs["p11_PaintColrGlyph"].kind,
        PaintKind::ColrGlyph {
            glyph: "p10_PaintGlyph".into()
        }
    );
}
