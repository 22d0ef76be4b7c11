//! Curve encoder — packs aggregated strokes into the binary curve
//! arrays the note session format stores.
//!
//! All arrays are tightly packed 32-bit values in native byte order,
//! except colors, which are 4-byte big-endian RGBA words. Per-element
//! parse failures (bad color hex, non-numeric width) are absorbed into
//! documented defaults; nothing in this module returns an error.

use crate::model::Stroke;

/// Opaque black, the fallback for absent or unparseable colors.
const FALLBACK_COLOR: [u8; 4] = [0x00, 0x00, 0x00, 0xff];

/// Stroke width in canvas units when the style gives none.
const DEFAULT_WIDTH: f64 = 1.0;

/// The packed binary representation of all strokes for one conversion.
///
/// Byte arrays are parallel per stroke; `points` is additionally flat
/// over every sample of every stroke, in stroke order then point order.
#[derive(Debug, Clone)]
pub struct CurveSet {
    /// One 4-byte big-endian RGBA word per stroke
    pub colors: Vec<u8>,
    /// f32 pairs `scale·x, scale·y` for every point
    pub points: Vec<u8>,
    /// One f32 scaled stroke width per stroke
    pub width: Vec<u8>,
    /// One i32 point count per stroke
    pub numpoints: Vec<u8>,
    /// Flat f32 width-modulation samples, one run per stroke
    pub fractionalwidths: Vec<u8>,
    /// One 4-byte `FF FF FF FF` placeholder word per stroke
    pub event_tokens: Vec<u8>,
    /// Total width-modulation samples across all strokes
    pub count_fracwidths: usize,
    /// Number of strokes
    pub count_curves: usize,
    /// Total points across all strokes (not doubled for x/y)
    pub count_points: usize,
}

/// Pack normalized strokes into a [`CurveSet`], applying the uniform
/// `scale` to every coordinate and stroke width.
pub fn encode_curves(strokes: &[Stroke], scale: f64) -> CurveSet {
    let count_curves = strokes.len();

    let mut colors = Vec::with_capacity(4 * count_curves);
    let mut width = Vec::with_capacity(4 * count_curves);
    let mut numpoints = Vec::with_capacity(4 * count_curves);
    let mut event_tokens = Vec::with_capacity(4 * count_curves);
    let mut fractionalwidths = Vec::new();
    let mut points = Vec::new();
    let mut count_fracwidths = 0usize;
    let mut count_points = 0usize;

    for stroke in strokes {
        let n = stroke.points.len();

        colors.extend_from_slice(&render_color(stroke.style.color.as_deref()));
        width.extend_from_slice(&((scale * parse_width(&stroke.style)) as f32).to_ne_bytes());
        numpoints.extend_from_slice(&(n as i32).to_ne_bytes());
        event_tokens.extend_from_slice(&[0xff, 0xff, 0xff, 0xff]);

        // Width-modulation curve: the format samples one width factor
        // per three points (plus one), at least two per stroke. This
        // pipeline always emits a flat curve.
        let frac_run = (n / 3 + 1).max(2);
        for _ in 0..frac_run {
            fractionalwidths.extend_from_slice(&1.0f32.to_ne_bytes());
        }
        count_fracwidths += frac_run;

        for point in &stroke.points {
            points.extend_from_slice(&((scale * point.x) as f32).to_ne_bytes());
            points.extend_from_slice(&((scale * point.y) as f32).to_ne_bytes());
        }
        count_points += n;
    }

    CurveSet {
        colors,
        points,
        width,
        numpoints,
        fractionalwidths,
        event_tokens,
        count_fracwidths,
        count_curves,
        count_points,
    }
}

/// Render a style color as a big-endian RGBA word.
///
/// The hex string (with any `#` removed) gets a full-opacity `ff`
/// appended and is parsed base-16; any failure — absent color, bad
/// digits, too many of them — yields opaque black. A malformed color
/// must never abort a conversion.
fn render_color(color: Option<&str>) -> [u8; 4] {
    let hex = match color {
        Some(c) => c.replace('#', ""),
        None => return FALLBACK_COLOR,
    };
    match u32::from_str_radix(&format!("{hex}ff"), 16) {
        Ok(rgba) => rgba.to_be_bytes(),
        Err(_) => FALLBACK_COLOR,
    }
}

/// Numeric stroke width, defaulting when absent or non-numeric.
fn parse_width(style: &crate::model::StrokeStyle) -> f64 {
    style
        .width
        .as_deref()
        .and_then(|w| w.trim().parse::<f64>().ok())
        .unwrap_or(DEFAULT_WIDTH)
}
