//! notelib — converts SVG line-art into Notability .note files.
//!
//! The pipeline is strictly linear: extract styled path segments from
//! the SVG, aggregate them into pen strokes, normalize into the note
//! canvas coordinate system, pack the strokes into the binary curve
//! arrays, bind those into a template session, and re-archive the
//! note container under the new name.
//!
//! # Example
//! ```no_run
//! use notelib::convert_file;
//!
//! let note_path = convert_file("drawing.svg", "template.note").unwrap();
//! println!("Wrote {}", note_path.display());
//! ```

pub mod aggregate;
pub mod curves;
pub mod model;
pub mod normalize;
pub mod note;
pub mod session;
pub mod style;
pub mod svg;

use std::path::{Path, PathBuf};

pub use aggregate::aggregate_segments;
pub use curves::encode_curves;
pub use model::*;
pub use normalize::normalize_strokes;
pub use style::parse_style;
pub use svg::extract_segments;

/// Convert an SVG document into `.note` bytes, using `template` as the
/// container to rebind. `name` becomes both the note title and the
/// archive's top-level directory.
pub fn convert_svg(svg: &str, template: &[u8], name: &str) -> Result<Vec<u8>, String> {
    let mut strokes = strokes_from_svg(svg)?;
    if strokes.is_empty() {
        return Err("Conversion failed: the SVG produced no strokes".to_string());
    }
    let scale = normalize::normalize_strokes(&mut strokes)?;
    let curve_set = curves::encode_curves(&strokes, scale);

    let session_bytes = note::read_session(template)?;
    let mut session = session::load_session(&session_bytes)?;
    session::bind_session(&mut session, curve_set, name)?;
    let bound = session::session_to_bytes(&session)?;

    note::build_note(template, name, &bound)
}

/// Convert an SVG file into a `.note` file next to it, deriving the
/// note name from the SVG file stem. Returns the written path.
pub fn convert_file<P: AsRef<Path>, Q: AsRef<Path>>(
    svg_path: P,
    template_path: Q,
) -> Result<PathBuf, String> {
    let svg_path = svg_path.as_ref();
    let template_path = template_path.as_ref();

    let svg = std::fs::read_to_string(svg_path)
        .map_err(|e| format!("Failed to read file '{}': {e}", svg_path.display()))?;
    let template = std::fs::read(template_path)
        .map_err(|e| format!("Failed to read template '{}': {e}", template_path.display()))?;

    let name = svg_path
        .file_stem()
        .and_then(|s| s.to_str())
        .ok_or_else(|| format!("Cannot derive a note name from '{}'", svg_path.display()))?;

    let bytes = convert_svg(&svg, &template, name)?;

    let out_path = svg_path.with_extension("note");
    std::fs::write(&out_path, bytes)
        .map_err(|e| format!("Failed to write '{}': {e}", out_path.display()))?;
    Ok(out_path)
}

/// Extract and aggregate an SVG document's strokes without normalizing
/// or encoding them.
pub fn strokes_from_svg(svg: &str) -> Result<Vec<Stroke>, String> {
    let segments = svg::extract_segments(svg)?;
    Ok(aggregate::aggregate_segments(&segments))
}

/// Convert aggregated strokes to a JSON string.
/// Useful for inspecting what the aggregator made of an input.
pub fn strokes_to_json(strokes: &[Stroke]) -> Result<String, String> {
    serde_json::to_string_pretty(strokes).map_err(|e| format!("JSON serialization error: {e}"))
}
