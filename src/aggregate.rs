//! Stroke aggregator — merges the flat segment sequence into logical
//! pen strokes.
//!
//! Adjacent primitives that share a style and whose endpoints coincide
//! were one drawn curve in the source, sampled as several Bézier
//! pieces; the aggregator rejoins them, replacing each continuation
//! segment with evenly spaced interpolated samples so the stored
//! polyline stays smooth.

use crate::model::{Point, Segment, Stroke, StrokeStyle};

/// Interpolated samples appended per continuation segment.
pub const INTERPOLATE: usize = 14;

/// Endpoint coincidence tolerance, per axis.
const JOIN_EPSILON: f64 = 1e-10;

/// Offset used by the degeneracy repair and the dot seed.
const PAD_OFFSET: f64 = 0.01;

/// Aggregation state: either nothing accumulated yet, or an open
/// stroke buffer with the style all of its segments share.
#[derive(Debug)]
enum State {
    Idle,
    Building { points: Vec<Point>, style: StrokeStyle },
}

/// Accumulates segments into strokes.
///
/// Feed segments in document order with [`push`](Aggregator::push),
/// then take the finished strokes with [`finish`](Aggregator::finish).
#[derive(Debug)]
pub struct Aggregator {
    state: State,
    /// End point of the last segment seen, for the continuity test.
    prev_end: Option<Point>,
    strokes: Vec<Stroke>,
}

impl Aggregator {
    pub fn new() -> Self {
        Self {
            state: State::Idle,
            prev_end: None,
            strokes: Vec::new(),
        }
    }

    /// Feed the next segment.
    ///
    /// A continuation appends `INTERPOLATE` blended samples across the
    /// segment to the open buffer; a break finalizes the buffer and
    /// seeds a new one from the segment's endpoints (or the ±0.01
    /// diamond for a zero-length segment, so a dot stays renderable).
    pub fn push(&mut self, segment: &Segment, style: &StrokeStyle) {
        let start = segment.start();
        let end = segment.end();

        if self.continues(start, style) {
            let (mut points, buf_style) = self.take_buffer();
            for i in 1..=INTERPOLATE {
                points.push(start.blend(end, i, INTERPOLATE));
            }
            self.state = State::Building { points, style: buf_style };
        } else {
            self.finalize_buffer();
            let points = if start == end {
                vec![
                    start.offset_x(PAD_OFFSET),
                    start.offset_y(PAD_OFFSET),
                    start.offset_x(-PAD_OFFSET),
                    start.offset_y(-PAD_OFFSET),
                ]
            } else {
                vec![start, end]
            };
            self.state = State::Building {
                points,
                style: style.clone(),
            };
        }

        self.prev_end = Some(end);
    }

    /// Finalize the remaining buffer and return all strokes.
    pub fn finish(mut self) -> Vec<Stroke> {
        self.finalize_buffer();
        self.strokes
    }

    /// The continuity test: the incoming style must equal the open
    /// buffer's style, and the incoming start must coincide with the
    /// previous segment's end (a missing previous segment counts as
    /// coincident — it is the very first point).
    fn continues(&self, start: Point, style: &StrokeStyle) -> bool {
        let style_matches = match &self.state {
            State::Building { style: current, .. } => style == current,
            // No buffer open yet: behaves as an empty buffer with the
            // default style.
            State::Idle => style.color.is_none() && style.width.is_none(),
        };
        if !style_matches {
            return false;
        }
        match self.prev_end {
            None => true,
            Some(prev) => {
                (prev.x - start.x).abs() < JOIN_EPSILON
                    && (prev.y - start.y).abs() < JOIN_EPSILON
            }
        }
    }

    /// Take the open buffer, leaving `Idle` behind. An `Idle` state
    /// yields an empty buffer with the default style.
    fn take_buffer(&mut self) -> (Vec<Point>, StrokeStyle) {
        match std::mem::replace(&mut self.state, State::Idle) {
            State::Building { points, style } => (points, style),
            State::Idle => (Vec::new(), StrokeStyle::default()),
        }
    }

    /// Close the open buffer into a stroke: apply the degeneracy
    /// repair, drop the stroke if it is empty.
    fn finalize_buffer(&mut self) {
        let (points, style) = self.take_buffer();
        let points = lengthen(points);
        if !points.is_empty() {
            self.strokes.push(Stroke::new(points, style));
        }
    }
}

impl Default for Aggregator {
    fn default() -> Self {
        Self::new()
    }
}

/// Degeneracy repair: a buffer of 1–3 points would render as a barely
/// visible fleck, so pad it with ±0.01 offsets of its endpoints.
/// Buffers with 0 or ≥4 points pass through unchanged, so a finished
/// stroke never has exactly 2 or 3 points.
fn lengthen(points: Vec<Point>) -> Vec<Point> {
    if points.is_empty() || points.len() >= 4 {
        return points;
    }
    let first = points[0];
    let last = points[points.len() - 1];
    let mut padded = Vec::with_capacity(points.len() + 4);
    padded.push(first.offset_x(PAD_OFFSET));
    padded.push(first.offset_y(PAD_OFFSET));
    padded.extend(points);
    padded.push(last.offset_x(-PAD_OFFSET));
    padded.push(last.offset_y(-PAD_OFFSET));
    padded
}

/// Aggregate an ordered segment sequence into strokes.
pub fn aggregate_segments(segments: &[(Segment, StrokeStyle)]) -> Vec<Stroke> {
    let mut aggregator = Aggregator::new();
    for (segment, style) in segments {
        aggregator.push(segment, style);
    }
    aggregator.finish()
}
