//! Content stream operations for each annotation kind
//!
//! All coordinates here are PDF space: points, origin bottom-left.

use crate::config::MIN_DASH_LENGTH;
use crate::coords::ui_to_pdf_y;
use lopdf::content::Operation;
use lopdf::{Object, StringFormat};

/// A straight line from `(x1, y1)` to `(x2, y2)`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Segment {
    pub x1: f64,
    pub y1: f64,
    pub x2: f64,
    pub y2: f64,
}

/// Axis-aligned rectangle in PDF space
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PdfRect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl PdfRect {
    /// Place a UI-space box (top-left origin) on a page of the given height
    pub fn from_ui(page_height: f64, x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y: ui_to_pdf_y(page_height, y) - height,
            width,
            height,
        }
    }

    pub fn top(&self) -> f64 {
        self.y + self.height
    }

    pub fn right(&self) -> f64 {
        self.x + self.width
    }
}

/// Split each edge of a rectangle into dashes of `dash` length separated by
/// `gap`. Edges are walked top, right, bottom, left; the last dash on an edge
/// is cut short at the corner.
pub fn dashed_rect_segments(rect: &PdfRect, dash: f64, gap: f64) -> Vec<Segment> {
    let (left, bottom, right, top) = (rect.x, rect.y, rect.right(), rect.top());
    let edges = [
        (left, top, right, top),
        (right, top, right, bottom),
        (right, bottom, left, bottom),
        (left, bottom, left, top),
    ];

    let mut segments = Vec::new();
    if !dash.is_finite() || dash < MIN_DASH_LENGTH {
        return segments;
    }
    let step = dash + gap.max(0.0);

    for (x1, y1, x2, y2) in edges {
        let length = ((x2 - x1).powi(2) + (y2 - y1).powi(2)).sqrt();
        if length == 0.0 {
            continue;
        }
        let (ux, uy) = ((x2 - x1) / length, (y2 - y1) / length);

        let mut start = 0.0;
        while start < length {
            let end = (start + dash).min(length);
            segments.push(Segment {
                x1: x1 + ux * start,
                y1: y1 + uy * start,
                x2: x1 + ux * end,
                y2: y1 + uy * end,
            });
            start += step;
        }
    }
    segments
}

/// Width of `text` in points when set in Helvetica at `font_size`
pub fn helvetica_text_width(text: &str, font_size: f64) -> f64 {
    let units: u32 = text.chars().map(helvetica_advance).sum();
    units as f64 * font_size / 1000.0
}

/// Glyph advance in 1/1000 em, from the standard Helvetica metrics
fn helvetica_advance(c: char) -> u32 {
    const ASCII: [u16; 95] = [
        278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278, // ' '../
        556, 556, 556, 556, 556, 556, 556, 556, 556, 556, // 0-9
        278, 278, 584, 584, 584, 556, 1015, // :..@
        667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833, // A-M
        722, 778, 667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, // N-Z
        278, 278, 278, 469, 556, 333, // [..`
        556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833, // a-m
        556, 556, 556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500, // n-z
        334, 260, 334, 584, // {..~
    ];
    match c as u32 {
        code @ 32..=126 => ASCII[(code - 32) as usize] as u32,
        _ => 556,
    }
}

/// Encode text for a simple font with WinAnsiEncoding. Characters outside
/// Latin-1 become `?`.
pub fn encode_win_ansi(text: &str) -> Vec<u8> {
    text.chars()
        .map(|c| match c as u32 {
            code @ 0x20..=0x7E | code @ 0xA0..=0xFF => code as u8,
            _ => b'?',
        })
        .collect()
}

fn real(v: f64) -> Object {
    Object::Real(v as f32)
}

fn name(n: &str) -> Object {
    Object::Name(n.as_bytes().to_vec())
}

/// Single line of black text with its baseline starting at `(x, y)`
pub fn text_line(font: &str, font_size: f64, x: f64, y: f64, text: &str) -> Vec<Operation> {
    vec![
        Operation::new("BT", vec![]),
        Operation::new("Tf", vec![name(font), real(font_size)]),
        Operation::new("rg", vec![real(0.0), real(0.0), real(0.0)]),
        Operation::new("Td", vec![real(x), real(y)]),
        Operation::new(
            "Tj",
            vec![Object::String(encode_win_ansi(text), StringFormat::Literal)],
        ),
        Operation::new("ET", vec![]),
    ]
}

/// Dashed-border placeholder with a centered label
pub struct PlaceholderStyle<'a> {
    pub font: &'a str,
    pub ink_state: &'a str,
    pub dash: f64,
    pub gap: f64,
    pub border_width: f64,
    pub label_font_size: f64,
}

pub fn placeholder_ops(rect: &PdfRect, label: &str, style: &PlaceholderStyle) -> Vec<Operation> {
    let mut ops = vec![
        Operation::new("q", vec![]),
        Operation::new("gs", vec![name(style.ink_state)]),
        Operation::new("RG", vec![real(0.0), real(0.0), real(0.0)]),
        Operation::new("w", vec![real(style.border_width)]),
    ];

    for seg in dashed_rect_segments(rect, style.dash, style.gap) {
        ops.push(Operation::new("m", vec![real(seg.x1), real(seg.y1)]));
        ops.push(Operation::new("l", vec![real(seg.x2), real(seg.y2)]));
    }
    ops.push(Operation::new("S", vec![]));

    if !label.is_empty() {
        let label_width = helvetica_text_width(label, style.label_font_size);
        let x = rect.x + rect.width / 2.0 - label_width / 2.0;
        let baseline = rect.top() - rect.height / 2.0 - style.label_font_size / 2.0;
        ops.extend(text_line(style.font, style.label_font_size, x, baseline, label));
    }

    ops.push(Operation::new("Q", vec![]));
    ops
}

/// Paint an image XObject into `rect`
pub fn image_ops(rect: &PdfRect, xobject: &str) -> Vec<Operation> {
    vec![
        Operation::new("q", vec![]),
        Operation::new(
            "cm",
            vec![
                real(rect.width),
                real(0.0),
                real(0.0),
                real(rect.height),
                real(rect.x),
                real(rect.y),
            ],
        ),
        Operation::new("Do", vec![name(xobject)]),
        Operation::new("Q", vec![]),
    ]
}

/// Date right-aligned with the box's right edge, `offset` points below its bottom
pub fn date_ops(rect: &PdfRect, font: &str, font_size: f64, offset: f64, date: &str) -> Vec<Operation> {
    let x = rect.right() - helvetica_text_width(date, font_size);
    text_line(font, font_size, x, rect.y - offset, date)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn real_operand(op: &Operation, index: usize) -> f32 {
        match op.operands[index] {
            Object::Real(v) => v,
            ref other => panic!("expected a real, got {:?}", other),
        }
    }

    fn rect() -> PdfRect {
        PdfRect {
            x: 50.0,
            y: 702.0,
            width: 220.0,
            height: 40.0,
        }
    }

    #[test]
    fn test_from_ui_flips_y() {
        let r = PdfRect::from_ui(792.0, 50.0, 50.0, 220.0, 40.0);
        assert_eq!(r, rect());
        assert_eq!(r.top(), 742.0);
        assert_eq!(r.top(), crate::coords::ui_to_pdf_y(792.0, 50.0));
    }

    #[test]
    fn test_top_edge_dashes() {
        let segments = dashed_rect_segments(&rect(), 4.0, 2.0);
        let top: Vec<_> = segments
            .iter()
            .filter(|s| s.y1 == 742.0 && s.y2 == 742.0)
            .collect();

        // 220 / 6 -> 36 full dashes and a 4pt tail starting at 216
        assert_eq!(top.len(), 37);
        assert_eq!((top[0].x1, top[0].x2), (50.0, 54.0));
        assert_eq!((top[1].x1, top[1].x2), (56.0, 60.0));
        let last = top[top.len() - 1];
        assert_eq!((last.x1, last.x2), (266.0, 270.0));
    }

    #[test]
    fn test_dashes_stay_on_the_border() {
        let r = rect();
        for s in dashed_rect_segments(&r, 4.0, 2.0) {
            for (x, y) in [(s.x1, s.y1), (s.x2, s.y2)] {
                assert!(x >= r.x - 1e-9 && x <= r.right() + 1e-9);
                assert!(y >= r.y - 1e-9 && y <= r.top() + 1e-9);
                let on_edge = (x - r.x).abs() < 1e-9
                    || (x - r.right()).abs() < 1e-9
                    || (y - r.y).abs() < 1e-9
                    || (y - r.top()).abs() < 1e-9;
                assert!(on_edge);
            }
        }
    }

    #[test]
    fn test_gapless_dashes_cover_edge() {
        let segments = dashed_rect_segments(&rect(), 4.0, 0.0);
        let covered: f64 = segments
            .iter()
            .map(|s| ((s.x2 - s.x1).powi(2) + (s.y2 - s.y1).powi(2)).sqrt())
            .sum();
        assert!((covered - 2.0 * (220.0 + 40.0)).abs() < 1e-6);
    }

    #[test]
    fn test_degenerate_dash_draws_nothing() {
        assert!(dashed_rect_segments(&rect(), f64::NAN, 2.0).is_empty());
        assert!(dashed_rect_segments(&rect(), 1e-12, 2.0).is_empty());
    }

    #[test]
    fn test_helvetica_width() {
        // "Signature here" = S i g n a t u r e ␣ h e r e
        let expected = (667 + 222 + 556 + 556 + 556 + 278 + 556 + 333 + 556 + 278 + 556 + 556 + 333 + 556) as f64
            * 12.0
            / 1000.0;
        assert_eq!(helvetica_text_width("Signature here", 12.0), expected);
        assert_eq!(helvetica_text_width("", 12.0), 0.0);
    }

    #[test]
    fn test_win_ansi_replaces_unmappable() {
        assert_eq!(encode_win_ansi("Zoë ✓"), vec![b'Z', b'o', 0xEB, b' ', b'?']);
    }

    #[test]
    fn test_placeholder_label_is_centered() {
        let style = PlaceholderStyle {
            font: "F",
            ink_state: "GS",
            dash: 4.0,
            gap: 2.0,
            border_width: 1.0,
            label_font_size: 12.0,
        };
        let ops = placeholder_ops(&rect(), "Sign", &style);
        let td = ops.iter().find(|op| op.operator == "Td").unwrap();
        let width = helvetica_text_width("Sign", 12.0);

        assert_eq!(real_operand(td, 0), (160.0 - width / 2.0) as f32);
        assert_eq!(real_operand(td, 1), (742.0 - 20.0 - 6.0) as f32);
        assert_eq!(ops.first().unwrap().operator, "q");
        assert_eq!(ops.last().unwrap().operator, "Q");
    }

    #[test]
    fn test_date_is_right_aligned_below() {
        let ops = date_ops(&rect(), "F", 10.0, 20.0, "01/02/2024");
        let td = ops.iter().find(|op| op.operator == "Td").unwrap();
        let width = helvetica_text_width("01/02/2024", 10.0);
        assert_eq!(real_operand(td, 0), (270.0 - width) as f32);
        assert_eq!(real_operand(td, 1), 682.0);
    }
}
