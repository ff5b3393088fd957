//! Page geometry and the vertical write cursor.
//!
//! `PageFlow` owns the pages produced so far and the running `y` position on the
//! last one. Blocks must call `ensure_space` with their full precomputed height
//! before drawing; the flow never splits or moves content that was already drawn.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::layout::canvas::{DrawOp, Page, Rgb};
use crate::layout::font_metrics::FontFace;

pub const A4_WIDTH_MM: f32 = 210.0;
pub const A4_HEIGHT_MM: f32 = 297.0;

/// Gap between the running-header baseline and its rule.
const RUNNING_HEADER_RULE_OFFSET: f32 = 2.0;

// ────────────────────────────────────────────────────────────────────────────
// Geometry
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Margins {
    pub top: f32,
    pub bottom: f32,
    pub left: f32,
    pub right: f32,
}

impl Margins {
    pub fn new(top: f32, bottom: f32, left: f32, right: f32) -> Self {
        Self {
            top,
            bottom,
            left,
            right,
        }
    }
}

/// Fixed portrait page in millimetres.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PageGeometry {
    pub width: f32,
    pub height: f32,
    pub margins: Margins,
}

impl PageGeometry {
    pub fn a4(margins: Margins) -> Self {
        Self {
            width: A4_WIDTH_MM,
            height: A4_HEIGHT_MM,
            margins,
        }
    }

    pub fn content_width(&self) -> f32 {
        self.width - self.margins.left - self.margins.right
    }

    pub fn content_left(&self) -> f32 {
        self.margins.left
    }

    pub fn content_right(&self) -> f32 {
        self.width - self.margins.right
    }

    /// Lowest y any block may reach.
    pub fn bottom_limit(&self) -> f32 {
        self.height - self.margins.bottom
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Running header and placement log
// ────────────────────────────────────────────────────────────────────────────

/// Identity line repeated at the top of every continuation page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunningHeader {
    pub text: String,
    pub size_pt: f32,
    /// Vertical space reserved below the top margin for the header and its rule.
    pub height: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BlockKind {
    SectionHeader,
    EntryHeading,
    Bullet,
    Paragraph,
    SkillGroup,
}

/// Where a block landed. Tests use this log to check the page-break rules.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BlockPlacement {
    pub page: usize,
    pub top: f32,
    pub bottom: f32,
    pub kind: BlockKind,
}

// ────────────────────────────────────────────────────────────────────────────
// PageFlow
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct PageFlow {
    geometry: PageGeometry,
    pages: Vec<Page>,
    y: f32,
    running_header: Option<RunningHeader>,
    placements: Vec<BlockPlacement>,
}

impl PageFlow {
    pub fn new(geometry: PageGeometry) -> Self {
        Self {
            geometry,
            pages: vec![Page::new(1)],
            y: geometry.margins.top,
            running_header: None,
            placements: Vec::new(),
        }
    }

    /// Installs the header drawn on pages created from now on.
    pub fn set_running_header(&mut self, header: RunningHeader) {
        self.running_header = Some(header);
    }

    pub fn geometry(&self) -> &PageGeometry {
        &self.geometry
    }

    pub fn y(&self) -> f32 {
        self.y
    }

    pub fn page_number(&self) -> usize {
        self.pages.len()
    }

    /// Space left between the cursor and the bottom margin.
    pub fn remaining(&self) -> f32 {
        self.geometry.bottom_limit() - self.y
    }

    /// First writable y on the current page.
    pub fn content_top(&self) -> f32 {
        match (&self.running_header, self.page_number()) {
            (Some(header), n) if n > 1 => self.geometry.margins.top + header.height,
            _ => self.geometry.margins.top,
        }
    }

    /// Starts a new page when `required` millimetres do not fit below the cursor.
    ///
    /// Returns `true` if a page break happened. A block taller than a whole page
    /// is left to overflow on a fresh page rather than breaking again.
    pub fn ensure_space(&mut self, required: f32) -> bool {
        if self.y + required <= self.geometry.bottom_limit() {
            return false;
        }
        if self.y <= self.content_top() {
            debug!(
                page = self.page_number(),
                required, "block taller than a page, drawing without a break"
            );
            return false;
        }
        self.new_page();
        true
    }

    pub fn new_page(&mut self) {
        let number = self.pages.len() + 1;
        debug!(page = number, from_y = self.y, "page break");
        self.pages.push(Page::new(number));
        self.y = self.geometry.margins.top;

        if let Some(header) = self.running_header.clone() {
            let top = self.geometry.margins.top;
            self.draw(DrawOp::Text {
                x: self.geometry.content_left(),
                y: top,
                text: header.text,
                face: FontFace::Regular,
                size_pt: header.size_pt,
                color: Rgb::GRAY,
            });
            self.draw(DrawOp::Line {
                x1: self.geometry.content_left(),
                y1: top + RUNNING_HEADER_RULE_OFFSET,
                x2: self.geometry.content_right(),
                y2: top + RUNNING_HEADER_RULE_OFFSET,
                width: 0.2,
                color: Rgb::GRAY,
            });
            self.y = top + header.height;
        }
    }

    pub fn advance(&mut self, height: f32) {
        self.y += height;
    }

    /// Moves the cursor to an absolute position on the current page.
    pub fn advance_to(&mut self, y: f32) {
        self.y = y;
    }

    /// Appends an op to the current page.
    pub fn draw(&mut self, op: DrawOp) {
        if let Some(page) = self.pages.last_mut() {
            page.ops.push(op);
        }
    }

    pub fn record_block(&mut self, kind: BlockKind, top: f32, bottom: f32) {
        self.placements.push(BlockPlacement {
            page: self.page_number(),
            top,
            bottom,
            kind,
        });
    }

    #[cfg(test)]
    pub fn placements(&self) -> &[BlockPlacement] {
        &self.placements
    }

    #[cfg(test)]
    pub fn pages(&self) -> &[Page] {
        &self.pages
    }

    pub fn into_parts(self) -> (Vec<Page>, Vec<BlockPlacement>) {
        (self.pages, self.placements)
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn geometry() -> PageGeometry {
        PageGeometry::a4(Margins::new(30.0, 30.0, 30.0, 30.0))
    }

    fn header() -> RunningHeader {
        RunningHeader {
            text: "Jane Doe | Engineer | jane@example.com | 555".into(),
            size_pt: 8.0,
            height: 8.0,
        }
    }

    #[test]
    fn test_geometry_a4_content_box() {
        let g = geometry();
        assert_eq!(g.content_width(), 150.0);
        assert_eq!(g.bottom_limit(), 267.0);
        assert_eq!(g.content_right(), 180.0);
    }

    #[test]
    fn test_ensure_space_no_break_when_block_fits() {
        let mut flow = PageFlow::new(geometry());
        flow.advance(200.0);
        assert!(!flow.ensure_space(37.0), "230 + 37 = 267 is exactly the limit");
        assert_eq!(flow.page_number(), 1);
        assert_eq!(flow.y(), 230.0);
    }

    #[test]
    fn test_ensure_space_breaks_and_resets_cursor() {
        let mut flow = PageFlow::new(geometry());
        flow.advance(230.0);
        assert!(flow.ensure_space(40.0));
        assert_eq!(flow.page_number(), 2);
        assert_eq!(flow.y(), 30.0);
        assert!(flow.pages()[1].ops.is_empty());
    }

    #[test]
    fn test_running_header_drawn_on_continuation_page() {
        let mut flow = PageFlow::new(geometry());
        flow.set_running_header(header());
        assert!(flow.pages()[0].ops.is_empty(), "first page has no running header");

        flow.advance(240.0);
        flow.ensure_space(30.0);
        let page = &flow.pages()[1];
        assert!(page.contains_text("Jane Doe | Engineer"));
        assert!(page.ops.iter().any(|op| matches!(op, DrawOp::Line { .. })));
        assert_eq!(flow.y(), 38.0);
        assert_eq!(flow.content_top(), 38.0);
    }

    #[test]
    fn test_oversized_block_at_page_top_does_not_cascade() {
        let mut flow = PageFlow::new(geometry());
        assert!(!flow.ensure_space(500.0));
        assert_eq!(flow.page_number(), 1);

        flow.advance(10.0);
        assert!(flow.ensure_space(500.0));
        assert!(!flow.ensure_space(500.0), "fresh page absorbs the overflow");
        assert_eq!(flow.page_number(), 2);
    }

    #[test]
    fn test_draw_targets_current_page() {
        let mut flow = PageFlow::new(geometry());
        flow.new_page();
        flow.draw(DrawOp::Circle {
            cx: 31.5,
            cy: 40.0,
            radius: 0.4,
            color: Rgb::DARK_GRAY,
        });
        let (pages, _) = flow.into_parts();
        assert!(pages[0].ops.is_empty());
        assert_eq!(pages[1].ops.len(), 1);
        assert_eq!(pages[1].number, 2);
    }

    proptest! {
        /// No block that fits on a page ever crosses the bottom margin.
        #[test]
        fn prop_blocks_never_cross_bottom_margin(
            heights in proptest::collection::vec(0.5f32..60.0, 1..120),
        ) {
            let mut flow = PageFlow::new(geometry());
            flow.set_running_header(header());
            for h in &heights {
                flow.ensure_space(*h);
                let top = flow.y();
                flow.advance(*h);
                flow.record_block(BlockKind::Paragraph, top, flow.y());
            }
            let limit = geometry().bottom_limit();
            for p in flow.placements() {
                prop_assert!(p.top <= limit);
                prop_assert!(p.bottom <= limit + 1e-3, "bottom {} > {}", p.bottom, limit);
            }
        }
    }
}
