//! Data model for converting vector line-art into pen strokes.
//!
//! These structures capture the path geometry extracted from an SVG
//! document and the aggregated strokes that the note format stores.

use serde::{Deserialize, Serialize};

/// A 2D point in SVG user units.
///
/// SVG coordinates grow downward in y; [`crate::normalize`] flips them
/// into the note canvas orientation before encoding.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Blend between `self` and `other`: `self·(n−i)/n + other·i/n`.
    pub fn blend(self, other: Point, i: usize, n: usize) -> Point {
        let w0 = (n - i) as f64 / n as f64;
        let w1 = i as f64 / n as f64;
        Point {
            x: self.x * w0 + other.x * w1,
            y: self.y * w0 + other.y * w1,
        }
    }

    /// Offset by `dx` along the x axis.
    pub fn offset_x(self, dx: f64) -> Point {
        Point { x: self.x + dx, y: self.y }
    }

    /// Offset by `dy` along the y axis.
    pub fn offset_y(self, dy: f64) -> Point {
        Point { x: self.x, y: self.y + dy }
    }
}

/// One primitive path piece as it appears in an SVG `d` attribute.
///
/// The aggregation pipeline consumes only the endpoints; control points
/// and arc parameters are carried so a segment round-trips losslessly.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Segment {
    Line {
        start: Point,
        end: Point,
    },
    Quadratic {
        start: Point,
        ctrl: Point,
        end: Point,
    },
    Cubic {
        start: Point,
        ctrl1: Point,
        ctrl2: Point,
        end: Point,
    },
    Arc {
        start: Point,
        rx: f64,
        ry: f64,
        x_rotation: f64,
        large_arc: bool,
        sweep: bool,
        end: Point,
    },
}

impl Segment {
    /// Start point of the primitive.
    pub fn start(&self) -> Point {
        match *self {
            Segment::Line { start, .. }
            | Segment::Quadratic { start, .. }
            | Segment::Cubic { start, .. }
            | Segment::Arc { start, .. } => start,
        }
    }

    /// End point of the primitive.
    pub fn end(&self) -> Point {
        match *self {
            Segment::Line { end, .. }
            | Segment::Quadratic { end, .. }
            | Segment::Cubic { end, .. }
            | Segment::Arc { end, .. } => end,
        }
    }
}

/// Stroke presentation pulled from a path element's `style` attribute.
///
/// Both fields keep the raw declaration value; parsing into concrete
/// colors and widths happens at encode time, where failures fall back
/// to defaults instead of aborting the conversion. Two styles are equal
/// iff both fields match exactly, including both being absent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StrokeStyle {
    /// Value of the `stroke` declaration (e.g. `#ff0000`)
    pub color: Option<String>,
    /// Value of the `stroke-width` declaration (e.g. `2.5`)
    pub width: Option<String>,
}

/// One logical pen stroke — the unit the note format stores.
///
/// A finished stroke has either been discarded (0 points) or holds at
/// least 4 points; the aggregator's lengthening rule guarantees no
/// stroke is ever finalized with exactly 2 or 3.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stroke {
    /// Ordered sample points
    pub points: Vec<Point>,
    /// Resolved style for the whole stroke
    pub style: StrokeStyle,
}

impl Stroke {
    pub fn new(points: Vec<Point>, style: StrokeStyle) -> Self {
        Self { points, style }
    }
}
