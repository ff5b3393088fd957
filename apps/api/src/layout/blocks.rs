//! Drawing primitives for the units a document is built from.
//!
//! Every block measures itself completely, reserves its height through
//! `PageFlow::ensure_space`, draws, and only then advances the cursor. The
//! return value is the height consumed on the page the block landed on.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::layout::canvas::{DrawOp, Rgb};
use crate::layout::font_metrics::{FontFace, TextMeasurer, PT_TO_MM};
use crate::layout::markup::{MarkedText, SpanStyle};
use crate::layout::page_flow::{BlockKind, PageFlow};
use crate::layout::profile::{FontSizes, FormatProfile, Spacing};
use crate::layout::wrap::{line_ranges, wrap_text};

/// Clearance reserved before a section header so it is never orphaned.
pub const SECTION_HEADER_CLEARANCE: f32 = 15.0;
const SECTION_BAR_LENGTH: f32 = 50.0;
const SECTION_BAR_OFFSET: f32 = 2.0;
const BULLET_INDENT: f32 = 5.0;
const BULLET_MARKER_X: f32 = 1.5;
/// Marker centre sits this fraction of the font size above the baseline.
const BULLET_MARKER_RISE: f32 = 0.3;
const BULLET_MARKER_RADIUS: f32 = 0.12;
const BULLET_PADDING: f32 = 0.5;
const DATE_GAP: f32 = 3.0;
const ENTRY_GAP: f32 = 1.0;
const COLUMN_GUTTER: f32 = 6.0;

// ────────────────────────────────────────────────────────────────────────────
// Block model
// ────────────────────────────────────────────────────────────────────────────

/// One labelled cell of a two-column block, e.g. `Databases` / `PostgreSQL, MySQL`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnItem {
    pub label: String,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Block {
    SectionHeader {
        title: String,
    },
    /// Bold title with a right-aligned date and an italic subtitle line.
    EntryHeading {
        title: String,
        date: String,
        subtitle: String,
    },
    BulletParagraph {
        text: MarkedText,
        font_size: f32,
    },
    PlainParagraph {
        text: String,
        font_size: f32,
        line_height: f32,
    },
    TwoColumn {
        items: Vec<ColumnItem>,
    },
}

/// Final column offsets of a two-column block, on the page it finished on.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColumnLayout {
    pub left: f32,
    pub right: f32,
    pub tallest: f32,
}

// ────────────────────────────────────────────────────────────────────────────
// BlockRenderer
// ────────────────────────────────────────────────────────────────────────────

pub struct BlockRenderer<'a> {
    measurer: &'a dyn TextMeasurer,
    fonts: FontSizes,
    spacing: Spacing,
}

impl<'a> BlockRenderer<'a> {
    pub fn new(measurer: &'a dyn TextMeasurer, profile: &FormatProfile) -> Self {
        Self {
            measurer,
            fonts: profile.fonts,
            spacing: profile.spacing,
        }
    }

    pub fn measurer(&self) -> &'a dyn TextMeasurer {
        self.measurer
    }

    /// Draws `block` at the cursor and returns the height it consumed.
    pub fn render(&self, flow: &mut PageFlow, block: &Block) -> f32 {
        match block {
            Block::SectionHeader { title } => self.section_header(flow, title),
            Block::EntryHeading {
                title,
                date,
                subtitle,
            } => self.entry_heading(flow, title, date, subtitle),
            Block::BulletParagraph { text, font_size } => {
                self.bullet_paragraph(flow, text, *font_size)
            }
            Block::PlainParagraph {
                text,
                font_size,
                line_height,
            } => self.plain_paragraph(flow, text, *font_size, *line_height),
            Block::TwoColumn { items } => {
                let (page, start) = (flow.page_number(), flow.y());
                let layout = self.two_column(flow, items);
                debug!(
                    items = items.len(),
                    left = layout.left,
                    right = layout.right,
                    tallest = layout.tallest,
                    "two-column block placed"
                );
                let end = layout.left.max(layout.right);
                if flow.page_number() == page {
                    end - start
                } else {
                    end - flow.content_top()
                }
            }
        }
    }

    fn section_header(&self, flow: &mut PageFlow, title: &str) -> f32 {
        flow.ensure_space(SECTION_HEADER_CLEARANCE);
        let left = flow.geometry().content_left();
        let y = flow.y();

        flow.draw(DrawOp::Text {
            x: left,
            y,
            text: title.to_uppercase(),
            face: FontFace::Bold,
            size_pt: self.fonts.section_header,
            color: Rgb::ACCENT,
        });
        flow.draw(DrawOp::Line {
            x1: left,
            y1: y + SECTION_BAR_OFFSET,
            x2: left + SECTION_BAR_LENGTH,
            y2: y + SECTION_BAR_OFFSET,
            width: 0.5,
            color: Rgb::ACCENT,
        });

        let height = self.spacing.section_header_height;
        flow.advance(height);
        flow.record_block(BlockKind::SectionHeader, y, y + height);
        height
    }

    fn entry_heading(&self, flow: &mut PageFlow, title: &str, date: &str, subtitle: &str) -> f32 {
        let geometry = *flow.geometry();
        let lh = self.spacing.line_height;
        let date_size = self.fonts.bullet;
        let date_width = if date.is_empty() {
            0.0
        } else {
            self.measurer.text_width(date, FontFace::Regular, date_size)
        };
        let date_gap = if date.is_empty() { 0.0 } else { DATE_GAP };
        let title_width = geometry.content_width() - date_width - date_gap;

        let title_lines = wrap_text(
            title,
            title_width,
            FontFace::Bold,
            self.fonts.entry_title,
            self.measurer,
        );
        let subtitle_lines = wrap_text(
            subtitle,
            geometry.content_width(),
            FontFace::Oblique,
            self.fonts.entry_subtitle,
            self.measurer,
        );
        let title_count = title_lines.len().max(1);
        let height = (title_count + subtitle_lines.len()) as f32 * lh + ENTRY_GAP;

        // keep the heading together with the first line under it
        flow.ensure_space(height + lh);
        let top = flow.y();

        for (i, line) in title_lines.into_iter().enumerate() {
            flow.draw(DrawOp::Text {
                x: geometry.content_left(),
                y: top + i as f32 * lh,
                text: line,
                face: FontFace::Bold,
                size_pt: self.fonts.entry_title,
                color: Rgb::DARK_GRAY,
            });
        }
        if !date.is_empty() {
            flow.draw(DrawOp::Text {
                x: geometry.content_right() - date_width,
                y: top,
                text: date.to_string(),
                face: FontFace::Regular,
                size_pt: date_size,
                color: Rgb::GRAY,
            });
        }
        let mut y = top + title_count as f32 * lh;
        for line in subtitle_lines {
            flow.draw(DrawOp::Text {
                x: geometry.content_left(),
                y,
                text: line,
                face: FontFace::Oblique,
                size_pt: self.fonts.entry_subtitle,
                color: Rgb::GRAY,
            });
            y += lh;
        }

        flow.advance(height);
        flow.record_block(BlockKind::EntryHeading, top, top + height);
        height
    }

    /// Bulleted, wrapped paragraph. Bold spans are drawn in the bold face.
    fn bullet_paragraph(&self, flow: &mut PageFlow, text: &MarkedText, font_size: f32) -> f32 {
        let geometry = *flow.geometry();
        let lh = self.spacing.line_height;
        if text.is_empty() {
            return 0.0;
        }
        let max_width = geometry.content_width() - BULLET_INDENT;
        let lines = wrap_text(&text.text, max_width, FontFace::Regular, font_size, self.measurer);
        if lines.is_empty() {
            return 0.0;
        }
        let height = lines.len() as f32 * lh + self.spacing.bullet_gap + BULLET_PADDING;

        flow.ensure_space(height);
        let top = flow.y();
        let left = geometry.content_left();
        let size_mm = font_size * PT_TO_MM;

        flow.draw(DrawOp::Circle {
            cx: left + BULLET_MARKER_X,
            cy: top - size_mm * BULLET_MARKER_RISE,
            radius: size_mm * BULLET_MARKER_RADIUS,
            color: Rgb::DARK_GRAY,
        });

        for (i, range) in line_ranges(&text.text, &lines).into_iter().enumerate() {
            let y = top + i as f32 * lh;
            let mut x = left + BULLET_INDENT;
            if range.is_empty() {
                // line not found in the source, draw it unstyled
                flow.draw(self.text_op(x, y, &lines[i], FontFace::Regular, font_size));
                continue;
            }
            for (segment, style) in text.segments(range) {
                let face = match style {
                    Some(SpanStyle::Bold) => FontFace::Bold,
                    None => FontFace::Regular,
                };
                flow.draw(self.text_op(x, y, segment, face, font_size));
                x += self.measurer.text_width(segment, face, font_size);
            }
        }

        flow.advance(height);
        flow.record_block(BlockKind::Bullet, top, top + height);
        height
    }

    fn plain_paragraph(&self, flow: &mut PageFlow, text: &str, font_size: f32, line_height: f32) -> f32 {
        let geometry = *flow.geometry();
        let lines = wrap_text(
            text,
            geometry.content_width(),
            FontFace::Regular,
            font_size,
            self.measurer,
        );
        if lines.is_empty() {
            return 0.0;
        }
        let height = lines.len() as f32 * line_height;

        flow.ensure_space(height);
        let top = flow.y();
        for (i, line) in lines.iter().enumerate() {
            let y = top + i as f32 * line_height;
            flow.draw(self.text_op(geometry.content_left(), y, line, FontFace::Regular, font_size));
        }

        flow.advance(height);
        flow.record_block(BlockKind::Paragraph, top, top + height);
        height
    }

    /// Places each item in whichever column is currently shorter (left on a
    /// tie). When an item does not fit, both columns restart on a new page.
    /// The cursor ends below the taller column.
    fn two_column(&self, flow: &mut PageFlow, items: &[ColumnItem]) -> ColumnLayout {
        let geometry = *flow.geometry();
        let column_width = (geometry.content_width() - COLUMN_GUTTER) / 2.0;
        let right_x = geometry.content_left() + column_width + COLUMN_GUTTER;
        let lh = self.spacing.line_height;

        let mut left_y = flow.y();
        let mut right_y = flow.y();
        let mut tallest: f32 = 0.0;

        for item in items {
            let lines = wrap_text(
                &item.text,
                column_width,
                FontFace::Regular,
                self.fonts.bullet,
                self.measurer,
            );
            let height = (1 + lines.len()) as f32 * lh + self.spacing.bullet_gap;
            tallest = tallest.max(height);

            let mut in_left = left_y <= right_y;
            let mut top = if in_left { left_y } else { right_y };
            if top + height > geometry.bottom_limit() && top > flow.content_top() {
                flow.new_page();
                left_y = flow.y();
                right_y = flow.y();
                top = left_y;
                in_left = true;
            }
            let x = if in_left { geometry.content_left() } else { right_x };

            flow.draw(self.text_op(x, top, &item.label, FontFace::Bold, self.fonts.bullet));
            for (i, line) in lines.iter().enumerate() {
                let y = top + (i + 1) as f32 * lh;
                flow.draw(self.text_op(x, y, line, FontFace::Regular, self.fonts.bullet));
            }
            flow.record_block(BlockKind::SkillGroup, top, top + height);

            if in_left {
                left_y = top + height;
            } else {
                right_y = top + height;
            }
        }

        flow.advance_to(left_y.max(right_y));
        ColumnLayout {
            left: left_y,
            right: right_y,
            tallest,
        }
    }

    fn text_op(&self, x: f32, y: f32, text: &str, face: FontFace, size_pt: f32) -> DrawOp {
        DrawOp::Text {
            x,
            y,
            text: text.to_string(),
            face,
            size_pt,
            color: Rgb::DARK_GRAY,
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
