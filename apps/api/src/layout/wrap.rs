//! Greedy line wrapping.
//!
//! Words are accumulated onto a line until the next word would push the measured
//! width past `max_width`; the line is then committed and the word starts the next
//! one. A word wider than `max_width` is never split: it sits alone on its line
//! and overflows.

use std::ops::Range;

use crate::layout::font_metrics::{FontFace, TextMeasurer};

/// Splits `text` into lines that each fit `max_width` millimetres.
///
/// Empty (or all-whitespace) input yields no lines. Pure and deterministic.
pub fn wrap_text(
    text: &str,
    max_width: f32,
    face: FontFace,
    size_pt: f32,
    measurer: &dyn TextMeasurer,
) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();

    for word in text.split_whitespace() {
        if current.is_empty() {
            current.push_str(word);
            continue;
        }
        let candidate = format!("{current} {word}");
        if measurer.text_width(&candidate, face, size_pt) > max_width {
            lines.push(std::mem::replace(&mut current, word.to_string()));
        } else {
            current = candidate;
        }
    }
    if !current.is_empty() {
        lines.push(current);
    }
    lines
}

/// Byte ranges of each wrapped line inside the source text.
///
/// Lines come from `wrap_text` on the same text, so each one appears in order;
/// a line that cannot be located (source had irregular spacing) gets an empty range.
pub fn line_ranges(text: &str, lines: &[String]) -> Vec<Range<usize>> {
    let mut cursor = 0;
    lines
        .iter()
        .map(|line| match text[cursor..].find(line.as_str()) {
            Some(offset) => {
                let start = cursor + offset;
                cursor = start + line.len();
                start..cursor
            }
            None => cursor..cursor,
        })
        .collect()
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
