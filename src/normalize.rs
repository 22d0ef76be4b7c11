//! Coordinate normalizer — flips the vertical axis into the note
//! canvas orientation and computes the uniform canvas-fit scale.

use crate::model::Stroke;

/// Fixed note canvas width in canvas units.
pub const CANVAS_WIDTH: f64 = 450.0;

/// Flip every point's y to `max_y − y` (SVG y grows downward, the
/// canvas y grows upward) and return the scale factor that fits the
/// widest point to [`CANVAS_WIDTH`].
///
/// The single scale factor is applied later by the curve encoder, to
/// coordinates and stroke widths alike, so aspect ratio and
/// proportional stroke thickness are preserved.
///
/// Errors when the strokes contain no points at all, or when the
/// maximum x coordinate is not positive — both leave the scale
/// undefined.
pub fn normalize_strokes(strokes: &mut [Stroke]) -> Result<f64, String> {
    let max_y = strokes
        .iter()
        .flat_map(|s| &s.points)
        .map(|p| p.y)
        .fold(f64::NEG_INFINITY, f64::max);
    if max_y == f64::NEG_INFINITY {
        return Err("Normalization failed: no stroke points (empty or fully degenerate input)".to_string());
    }

    for stroke in strokes.iter_mut() {
        for point in &mut stroke.points {
            point.y = max_y - point.y;
        }
    }

    let max_x = strokes
        .iter()
        .flat_map(|s| &s.points)
        .map(|p| p.x)
        .fold(f64::NEG_INFINITY, f64::max);
    if max_x <= 0.0 {
        return Err(format!(
            "Normalization failed: maximum x coordinate {max_x} cannot be fit to the canvas"
        ));
    }

    Ok(CANVAS_WIDTH / max_x)
}
