//! Integration tests for the conversion pipeline: SVG extraction,
//! stroke aggregation, normalization, curve encoding and the final
//! `.note` container round-trip.

use std::io::{Cursor, Read, Write};

use plist::{Dictionary, Value};
use pretty_assertions::assert_eq;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

use notelib::{convert_svg, normalize_strokes, strokes_from_svg, strokes_to_json};

const CURVE_FIELDS: [&str; 6] = [
    "curvescolors",
    "curvespoints",
    "curveswidth",
    "curvesnumpoints",
    "curvesfractionalwidths",
    "eventTokens",
];

/// Build a minimal template session: curve dictionary at `$objects[8]`,
/// counts at 9–11, note title 8 slots from the end.
fn template_session_bytes(curve_fields: &[&str]) -> Vec<u8> {
    let mut objects: Vec<Value> = (0..24).map(|_| Value::String("$null".into())).collect();

    let mut curve_dict = Dictionary::new();
    for field in curve_fields {
        curve_dict.insert((*field).into(), Value::Data(Vec::new()));
    }
    objects[8] = Value::Dictionary(curve_dict);
    objects[9] = Value::Integer(0u64.into());
    objects[10] = Value::Integer(0u64.into());
    objects[11] = Value::Integer(0u64.into());
    objects[24 - 8] = Value::String("reverse".into());

    let mut root = Dictionary::new();
    root.insert("$version".into(), Value::Integer(100000u64.into()));
    root.insert("$archiver".into(), Value::String("NSKeyedArchiver".into()));
    root.insert("$objects".into(), Value::Array(objects));

    let mut cursor = Cursor::new(Vec::new());
    Value::Dictionary(root).to_writer_binary(&mut cursor).unwrap();
    cursor.into_inner()
}

/// Wrap a session in a template `.note` archive under `reverse/`.
fn template_note(session: &[u8]) -> Vec<u8> {
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
    writer.add_directory("reverse/", options).unwrap();
    writer.start_file("reverse/Session.plist", options).unwrap();
    writer.write_all(session).unwrap();
    writer.start_file("reverse/metadata.plist", options).unwrap();
    writer.write_all(b"metadata").unwrap();
    writer.finish().unwrap().into_inner()
}

/// Open a produced note and return its re-parsed `$objects` array.
fn note_objects(note: &[u8], name: &str) -> Vec<Value> {
    let mut archive = ZipArchive::new(Cursor::new(note)).unwrap();
    let mut session = Vec::new();
    archive
        .by_name(&format!("{name}/Session.plist"))
        .expect("bound session member")
        .read_to_end(&mut session)
        .unwrap();
    let value = Value::from_reader(Cursor::new(&session[..])).unwrap();
    value
        .as_dictionary()
        .and_then(|d| d.get("$objects"))
        .and_then(Value::as_array)
        .unwrap()
        .clone()
}

fn floats(data: &[u8]) -> Vec<f32> {
    data.chunks_exact(4)
        .map(|c| f32::from_ne_bytes([c[0], c[1], c[2], c[3]]))
        .collect()
}

// ═══════════════════════════════════════════════════════════════════════
// Aggregation properties
// ═══════════════════════════════════════════════════════════════════════

#[test]
fn coincident_same_style_segments_merge_into_one_stroke() {
    let svg = r##"<svg xmlns="http://www.w3.org/2000/svg">
        <path d="M 0 0 L 10 0 L 10 10" style="stroke:#ff0000;stroke-width:2"/>
    </svg>"##;
    let strokes = strokes_from_svg(svg).unwrap();

    assert_eq!(strokes.len(), 1);
    // Seed pair of the first segment + 14 bridge samples for the second
    assert_eq!(strokes[0].points.len(), 16);
    println!("✓ two coincident segments merged into {} points", strokes[0].points.len());
}

#[test]
fn style_change_breaks_strokes_even_with_coincident_endpoints() {
    let svg = r##"<svg xmlns="http://www.w3.org/2000/svg">
        <path d="M 0 0 L 10 0" style="stroke:#ff0000;stroke-width:2"/>
        <path d="M 10 0 L 10 10" style="stroke:#0000ff;stroke-width:2"/>
    </svg>"##;
    let strokes = strokes_from_svg(svg).unwrap();
    assert_eq!(strokes.len(), 2);
}

#[test]
fn dot_path_seeds_a_diamond_stroke() {
    let svg = r##"<svg xmlns="http://www.w3.org/2000/svg">
        <path d="M 3 3 L 3 3" style="stroke:#000000;stroke-width:1"/>
    </svg>"##;
    let strokes = strokes_from_svg(svg).unwrap();

    assert_eq!(strokes.len(), 1);
    let points = &strokes[0].points;
    assert_eq!(points.len(), 4);
    assert_eq!((points[0].x, points[0].y), (3.01, 3.0));
    assert_eq!((points[1].x, points[1].y), (3.0, 3.01));
    assert_eq!((points[2].x, points[2].y), (2.99, 3.0));
    assert_eq!((points[3].x, points[3].y), (3.0, 2.99));
}

#[test]
fn short_stroke_is_padded_by_the_lengthening_rule() {
    let svg = r##"<svg xmlns="http://www.w3.org/2000/svg">
        <path d="M 1 1 L 2 1" style="stroke:#000000;stroke-width:1"/>
    </svg>"##;
    let strokes = strokes_from_svg(svg).unwrap();

    // 2 seed points + 4 padding points
    assert_eq!(strokes[0].points.len(), 6);
}

// ═══════════════════════════════════════════════════════════════════════
// Normalization properties
// ═══════════════════════════════════════════════════════════════════════

#[test]
fn normalization_flips_y_and_fits_the_canvas() {
    let svg = r##"<svg xmlns="http://www.w3.org/2000/svg">
        <path d="M 0 2 L 30 2 L 30 20" style="stroke:#ff0000;stroke-width:2"/>
    </svg>"##;
    let mut strokes = strokes_from_svg(svg).unwrap();
    let scale = normalize_strokes(&mut strokes).unwrap();

    let ys: Vec<f64> = strokes.iter().flat_map(|s| &s.points).map(|p| p.y).collect();
    let max_y = ys.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
    assert!(max_y.abs() < 1e-9, "former maximum must map to 0, got {max_y}");

    let max_x = strokes
        .iter()
        .flat_map(|s| &s.points)
        .map(|p| p.x * scale)
        .fold(f64::NEG_INFINITY, f64::max);
    assert!((max_x - 450.0).abs() < 1e-9, "scaled extent must hit the canvas width, got {max_x}");
    println!("✓ normalized: scale {scale}, max x {max_x}");
}

// ═══════════════════════════════════════════════════════════════════════
// End-to-end conversion
// ═══════════════════════════════════════════════════════════════════════

#[test]
fn converts_two_segment_drawing_into_a_bound_note() {
    let svg = r##"<svg xmlns="http://www.w3.org/2000/svg">
        <path d="M 0 0 L 10 0 L 10 10" style="stroke:#ff0000;stroke-width:2"/>
    </svg>"##;
    let template = template_note(&template_session_bytes(&CURVE_FIELDS));

    let note = convert_svg(svg, &template, "doodle").unwrap();
    let objects = note_objects(&note, "doodle");

    // Counts: one stroke of 16 points, fractional run max(16/3 + 1, 2)
    assert_eq!(objects[9].as_unsigned_integer(), Some(6));
    assert_eq!(objects[10].as_unsigned_integer(), Some(1));
    assert_eq!(objects[11].as_unsigned_integer(), Some(16));
    assert_eq!(objects[24 - 8].as_string(), Some("doodle"));

    let dict = objects[8].as_dictionary().unwrap();
    let colors = dict.get("curvescolors").and_then(Value::as_data).unwrap();
    assert_eq!(colors, [0xff, 0x00, 0x00, 0xff]);

    // scale = 450 / 10, width = 2 · 45
    let widths = floats(dict.get("curveswidth").and_then(Value::as_data).unwrap());
    assert_eq!(widths, vec![90.0]);

    let numpoints = dict.get("curvesnumpoints").and_then(Value::as_data).unwrap();
    assert_eq!(numpoints, 16i32.to_ne_bytes());

    let points = floats(dict.get("curvespoints").and_then(Value::as_data).unwrap());
    assert_eq!(points.len(), 2 * 16);
    let max_x = points
        .iter()
        .step_by(2)
        .cloned()
        .fold(f32::NEG_INFINITY, f32::max);
    assert!((max_x - 450.0).abs() < 1e-3, "packed max x {max_x}");

    let fracs = floats(dict.get("curvesfractionalwidths").and_then(Value::as_data).unwrap());
    assert_eq!(fracs, vec![1.0; 6]);

    let tokens = dict.get("eventTokens").and_then(Value::as_data).unwrap();
    assert_eq!(tokens, [0xff; 4]);

    println!("✓ doodle.note bound: {} curves, {} points", 1, 16);
}

#[test]
fn absent_style_encodes_fallback_color_and_unit_width() {
    let svg = r##"<svg xmlns="http://www.w3.org/2000/svg">
        <path d="M 0 0 L 10 0 L 10 10" style="stroke:purple"/>
    </svg>"##;
    let template = template_note(&template_session_bytes(&CURVE_FIELDS));

    let note = convert_svg(svg, &template, "plain").unwrap();
    let objects = note_objects(&note, "plain");
    let dict = objects[8].as_dictionary().unwrap();

    // Unparseable color → opaque black; absent width → 1.0 · scale
    let colors = dict.get("curvescolors").and_then(Value::as_data).unwrap();
    assert_eq!(colors, [0x00, 0x00, 0x00, 0xff]);
    let widths = floats(dict.get("curveswidth").and_then(Value::as_data).unwrap());
    assert_eq!(widths, vec![45.0]);
}

#[test]
fn note_container_carries_renamed_members() {
    let svg = r##"<svg xmlns="http://www.w3.org/2000/svg">
        <path d="M 0 0 L 10 0 L 10 10" style="stroke:#ff0000;stroke-width:2"/>
    </svg>"##;
    let template = template_note(&template_session_bytes(&CURVE_FIELDS));

    let note = convert_svg(svg, &template, "renamed").unwrap();
    let mut archive = ZipArchive::new(Cursor::new(&note[..])).unwrap();
    let names: Vec<String> = (0..archive.len())
        .filter_map(|i| archive.by_index(i).ok().map(|f| f.name().to_string()))
        .collect();

    assert!(names.iter().any(|n| n == "renamed/Session.plist"), "{names:?}");
    assert!(names.iter().any(|n| n == "renamed/metadata.plist"), "{names:?}");
    assert!(!names.iter().any(|n| n.starts_with("reverse/")), "{names:?}");
}

// ═══════════════════════════════════════════════════════════════════════
// Structural failures
// ═══════════════════════════════════════════════════════════════════════

#[test]
fn svg_without_paths_fails_with_context() {
    let template = template_note(&template_session_bytes(&CURVE_FIELDS));
    let err = convert_svg(
        r#"<svg xmlns="http://www.w3.org/2000/svg"><rect width="5" height="5"/></svg>"#,
        &template,
        "empty",
    )
    .unwrap_err();
    assert!(err.contains("no strokes"), "unexpected error: {err}");
}

#[test]
fn template_missing_a_curve_field_fails_with_context() {
    let svg = r##"<svg xmlns="http://www.w3.org/2000/svg">
        <path d="M 0 0 L 10 0 L 10 10" style="stroke:#ff0000;stroke-width:2"/>
    </svg>"##;
    // Drop one schema field from the template's curve dictionary
    let fields: Vec<&str> = CURVE_FIELDS
        .iter()
        .copied()
        .filter(|f| *f != "curvespoints")
        .collect();
    let template = template_note(&template_session_bytes(&fields));

    let err = convert_svg(svg, &template, "broken").unwrap_err();
    assert!(err.contains("curvespoints"), "unexpected error: {err}");
}

// ═══════════════════════════════════════════════════════════════════════
// Stroke inspection
// ═══════════════════════════════════════════════════════════════════════

#[test]
fn strokes_dump_to_json() {
    let svg = r##"<svg xmlns="http://www.w3.org/2000/svg">
        <path d="M 0 0 L 10 0" style="stroke:#ff0000;stroke-width:2"/>
    </svg>"##;
    let strokes = strokes_from_svg(svg).unwrap();
    let json = strokes_to_json(&strokes).unwrap();
    assert!(json.contains("\"#ff0000\""), "{json}");
    assert!(json.contains("\"points\""), "{json}");
}
