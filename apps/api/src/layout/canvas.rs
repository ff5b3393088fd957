//! Backend-neutral drawing primitives.
//!
//! A composed page is a display list of `DrawOp`s in millimetres with the
//! origin at the top-left corner; text `y` is the baseline. The PDF backend
//! flips the axis when it serialises.

use serde::{Deserialize, Serialize};

use crate::layout::font_metrics::FontFace;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    pub const ACCENT: Rgb = Rgb(0, 123, 255);
    pub const DARK_GRAY: Rgb = Rgb(50, 50, 50);
    pub const GRAY: Rgb = Rgb(100, 100, 100);

    /// Components scaled to `0.0..=1.0` for PDF colour operators.
    pub fn unit(self) -> [f32; 3] {
        [
            self.0 as f32 / 255.0,
            self.1 as f32 / 255.0,
            self.2 as f32 / 255.0,
        ]
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum DrawOp {
    Text {
        x: f32,
        y: f32,
        text: String,
        face: FontFace,
        size_pt: f32,
        color: Rgb,
    },
    Line {
        x1: f32,
        y1: f32,
        x2: f32,
        y2: f32,
        width: f32,
        color: Rgb,
    },
    /// Filled disc.
    Circle {
        cx: f32,
        cy: f32,
        radius: f32,
        color: Rgb,
    },
    /// Clickable rectangle; `y` is the top edge.
    Link {
        x: f32,
        y: f32,
        width: f32,
        height: f32,
        url: String,
    },
}

impl DrawOp {
    #[cfg(test)]
    pub fn text(&self) -> Option<&str> {
        match self {
            DrawOp::Text { text, .. } => Some(text),
            _ => None,
        }
    }
}

/// One output page, numbered from 1.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Page {
    pub number: usize,
    pub ops: Vec<DrawOp>,
}

impl Page {
    pub fn new(number: usize) -> Self {
        Self {
            number,
            ops: Vec::new(),
        }
    }

    /// All text drawn on the page, in drawing order.
    #[cfg(test)]
    pub fn texts(&self) -> impl Iterator<Item = &str> {
        self.ops.iter().filter_map(DrawOp::text)
    }

    #[cfg(test)]
    pub fn contains_text(&self, needle: &str) -> bool {
        self.texts().any(|t| t.contains(needle))
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rgb_unit_scaling() {
        assert_eq!(Rgb(255, 0, 0).unit(), [1.0, 0.0, 0.0]);
        let [_, g, _] = Rgb::ACCENT.unit();
        assert!((g - 123.0 / 255.0).abs() < 1e-6);
    }

    #[test]
    fn test_page_text_queries() {
        let mut page = Page::new(1);
        page.ops.push(DrawOp::Line {
            x1: 0.0,
            y1: 5.0,
            x2: 10.0,
            y2: 5.0,
            width: 0.5,
            color: Rgb::ACCENT,
        });
        page.ops.push(DrawOp::Text {
            x: 0.0,
            y: 10.0,
            text: "PROFESSIONAL SUMMARY".into(),
            face: FontFace::Bold,
            size_pt: 12.0,
            color: Rgb::ACCENT,
        });
        assert_eq!(page.texts().count(), 1);
        assert!(page.contains_text("SUMMARY"));
        assert!(!page.contains_text("EXPERIENCE"));
    }
}
