//! SVG extraction — converts an SVG document into an ordered sequence
//! of primitive path segments paired with their stroke styles.
//!
//! Only `<path>` elements are read; transforms, `use` references and
//! shape elements (`rect`, `circle`, …) are not resolved. Each `d`
//! attribute is parsed into one [`Segment`] per primitive so adjacent
//! Bézier pieces of a single drawn curve stay adjacent in the output.

use roxmltree::Document;

use crate::model::{Point, Segment, StrokeStyle};
use crate::style::parse_style;

/// Parse an SVG document and return every path primitive in document
/// order, each paired with its element's parsed style.
pub fn extract_segments(svg: &str) -> Result<Vec<(Segment, StrokeStyle)>, String> {
    // Inkscape-exported SVGs carry a DOCTYPE declaration, so we must allow DTDs
    let options = roxmltree::ParsingOptions {
        allow_dtd: true,
        ..Default::default()
    };
    let doc = Document::parse_with_options(svg, options)
        .map_err(|e| format!("SVG parse error: {e}"))?;
    let root = doc.root_element();

    if root.tag_name().name() != "svg" {
        return Err(format!(
            "Unsupported root element: '{}'. Expected 'svg'.",
            root.tag_name().name()
        ));
    }

    let mut segments = Vec::new();
    for node in root
        .descendants()
        .filter(|n| n.is_element() && n.tag_name().name() == "path")
    {
        let d = match node.attribute("d") {
            Some(d) => d,
            None => continue,
        };
        let style = parse_style(node.attribute("style"));
        for segment in parse_path_data(d)? {
            segments.push((segment, style.clone()));
        }
    }

    Ok(segments)
}

// ─── Path data ───────────────────────────────────────────────────────

/// Parse an SVG path `d` attribute into primitive segments.
///
/// Supports the full command set `M m L l H h V v C c S s Q q T t A a
/// Z z`, implicit command repetition (extra coordinate pairs after `M`
/// become line-tos), `S`/`T` control-point reflection and compact arc
/// flags. A `Z` on an already-closed subpath emits no segment.
pub fn parse_path_data(d: &str) -> Result<Vec<Segment>, String> {
    let mut sc = Scanner::new(d);
    let mut segments = Vec::new();

    let mut current = Point::new(0.0, 0.0);
    let mut subpath_start = current;
    let mut cmd: Option<u8> = None;
    // Reflection state for S/T: the last control point, valid only when
    // the previous command was a cubic (for S) or quadratic (for T).
    let mut prev_cubic_ctrl: Option<Point> = None;
    let mut prev_quad_ctrl: Option<Point> = None;

    loop {
        sc.skip_separators();
        let c = match sc.peek() {
            Some(c) => c,
            None => break,
        };
        if c.is_ascii_alphabetic() {
            sc.bump();
            cmd = Some(c);
        }
        let op = match cmd {
            Some(op) => op,
            None => {
                return Err(format!(
                    "Path data: expected a command letter at offset {}",
                    sc.pos
                ));
            }
        };
        let relative = op.is_ascii_lowercase();
        let resolve = |p: Point, x: f64, y: f64| -> Point {
            if relative {
                Point::new(p.x + x, p.y + y)
            } else {
                Point::new(x, y)
            }
        };

        match op.to_ascii_uppercase() {
            b'M' => {
                let (x, y) = sc.pair()?;
                current = resolve(current, x, y);
                subpath_start = current;
                // Further coordinate pairs are implicit line-tos
                cmd = Some(if relative { b'l' } else { b'L' });
                prev_cubic_ctrl = None;
                prev_quad_ctrl = None;
            }
            b'L' => {
                let (x, y) = sc.pair()?;
                let end = resolve(current, x, y);
                segments.push(Segment::Line { start: current, end });
                current = end;
                prev_cubic_ctrl = None;
                prev_quad_ctrl = None;
            }
            b'H' => {
                let x = sc.number()?;
                let end = if relative {
                    current.offset_x(x)
                } else {
                    Point::new(x, current.y)
                };
                segments.push(Segment::Line { start: current, end });
                current = end;
                prev_cubic_ctrl = None;
                prev_quad_ctrl = None;
            }
            b'V' => {
                let y = sc.number()?;
                let end = if relative {
                    current.offset_y(y)
                } else {
                    Point::new(current.x, y)
                };
                segments.push(Segment::Line { start: current, end });
                current = end;
                prev_cubic_ctrl = None;
                prev_quad_ctrl = None;
            }
            b'C' => {
                let (x1, y1) = sc.pair()?;
                let (x2, y2) = sc.pair()?;
                let (x, y) = sc.pair()?;
                let ctrl1 = resolve(current, x1, y1);
                let ctrl2 = resolve(current, x2, y2);
                let end = resolve(current, x, y);
                segments.push(Segment::Cubic { start: current, ctrl1, ctrl2, end });
                current = end;
                prev_cubic_ctrl = Some(ctrl2);
                prev_quad_ctrl = None;
            }
            b'S' => {
                let (x2, y2) = sc.pair()?;
                let (x, y) = sc.pair()?;
                let ctrl1 = reflect(prev_cubic_ctrl, current);
                let ctrl2 = resolve(current, x2, y2);
                let end = resolve(current, x, y);
                segments.push(Segment::Cubic { start: current, ctrl1, ctrl2, end });
                current = end;
                prev_cubic_ctrl = Some(ctrl2);
                prev_quad_ctrl = None;
            }
            b'Q' => {
                let (x1, y1) = sc.pair()?;
                let (x, y) = sc.pair()?;
                let ctrl = resolve(current, x1, y1);
                let end = resolve(current, x, y);
                segments.push(Segment::Quadratic { start: current, ctrl, end });
                current = end;
                prev_quad_ctrl = Some(ctrl);
                prev_cubic_ctrl = None;
            }
            b'T' => {
                let (x, y) = sc.pair()?;
                let ctrl = reflect(prev_quad_ctrl, current);
                let end = resolve(current, x, y);
                segments.push(Segment::Quadratic { start: current, ctrl, end });
                current = end;
                prev_quad_ctrl = Some(ctrl);
                prev_cubic_ctrl = None;
            }
            b'A' => {
                let rx = sc.number()?;
                let ry = sc.number()?;
                let x_rotation = sc.number()?;
                let large_arc = sc.flag()?;
                let sweep = sc.flag()?;
                let (x, y) = sc.pair()?;
                let end = resolve(current, x, y);
                segments.push(Segment::Arc {
                    start: current,
                    rx,
                    ry,
                    x_rotation,
                    large_arc,
                    sweep,
                    end,
                });
                current = end;
                prev_cubic_ctrl = None;
                prev_quad_ctrl = None;
            }
            b'Z' => {
                if current != subpath_start {
                    segments.push(Segment::Line {
                        start: current,
                        end: subpath_start,
                    });
                }
                current = subpath_start;
                // Coordinates after Z without a new command are invalid
                cmd = None;
                prev_cubic_ctrl = None;
                prev_quad_ctrl = None;
            }
            _ => {
                return Err(format!(
                    "Path data: unsupported command '{}' at offset {}",
                    op as char, sc.pos
                ));
            }
        }
    }

    Ok(segments)
}

/// Reflect the previous control point through `current` (SVG smooth
/// curve rule); without a previous control point the result is
/// `current` itself.
fn reflect(prev_ctrl: Option<Point>, current: Point) -> Point {
    match prev_ctrl {
        Some(p) => Point::new(2.0 * current.x - p.x, 2.0 * current.y - p.y),
        None => current,
    }
}

// ─── Number scanning ─────────────────────────────────────────────────

/// Byte scanner over a `d` attribute implementing the SVG number
/// grammar. Commas and whitespace both separate tokens; a second `.`
/// terminates a number, so `1.5.5` reads as `1.5` then `.5`.
struct Scanner<'a> {
    data: &'a [u8],
    text: &'a str,
    pos: usize,
}

impl<'a> Scanner<'a> {
    fn new(d: &'a str) -> Self {
        Self {
            data: d.as_bytes(),
            text: d,
            pos: 0,
        }
    }

    fn peek(&self) -> Option<u8> {
        self.data.get(self.pos).copied()
    }

    fn bump(&mut self) {
        self.pos += 1;
    }

    fn skip_separators(&mut self) {
        while matches!(self.peek(), Some(b) if b == b',' || b.is_ascii_whitespace()) {
            self.bump();
        }
    }

    /// Scan one number: sign, integer digits, optional fraction,
    /// optional exponent.
    fn number(&mut self) -> Result<f64, String> {
        self.skip_separators();
        let start = self.pos;

        if matches!(self.peek(), Some(b'+') | Some(b'-')) {
            self.bump();
        }
        let mut digits = 0;
        while matches!(self.peek(), Some(b) if b.is_ascii_digit()) {
            self.bump();
            digits += 1;
        }
        if self.peek() == Some(b'.') {
            self.bump();
            while matches!(self.peek(), Some(b) if b.is_ascii_digit()) {
                self.bump();
                digits += 1;
            }
        }
        if digits == 0 {
            return Err(format!("Path data: expected a number at offset {start}"));
        }
        // Exponent only counts if at least one digit follows it
        if matches!(self.peek(), Some(b'e') | Some(b'E')) {
            let mark = self.pos;
            self.bump();
            if matches!(self.peek(), Some(b'+') | Some(b'-')) {
                self.bump();
            }
            if matches!(self.peek(), Some(b) if b.is_ascii_digit()) {
                while matches!(self.peek(), Some(b) if b.is_ascii_digit()) {
                    self.bump();
                }
            } else {
                self.pos = mark;
            }
        }

        self.text[start..self.pos]
            .parse::<f64>()
            .map_err(|e| format!("Path data: bad number at offset {start}: {e}"))
    }

    /// Scan one arc flag: a single `0` or `1` character, possibly
    /// juxtaposed with the next token.
    fn flag(&mut self) -> Result<bool, String> {
        self.skip_separators();
        match self.peek() {
            Some(b'0') => {
                self.bump();
                Ok(false)
            }
            Some(b'1') => {
                self.bump();
                Ok(true)
            }
            _ => Err(format!(
                "Path data: expected an arc flag at offset {}",
                self.pos
            )),
        }
    }

    fn pair(&mut self) -> Result<(f64, f64), String> {
        let x = self.number()?;
        let y = self.number()?;
        Ok((x, y))
    }
}
