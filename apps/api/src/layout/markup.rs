//! Text with highlighted byte ranges.
//!
//! Highlights are recorded as spans over an unchanged string instead of being
//! spliced into it, so measuring and wrapping always see the plain text.

use std::ops::Range;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SpanStyle {
    Bold,
}

/// Half-open byte range `[start, end)` into `MarkedText::text`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Span {
    pub start: usize,
    pub end: usize,
    pub style: SpanStyle,
}

/// Invariant: spans are sorted by `start`, never overlap, and lie on char
/// boundaries inside `text`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MarkedText {
    pub text: String,
    pub spans: Vec<Span>,
}

impl MarkedText {
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            spans: Vec::new(),
        }
    }

    /// Marks every whole-word occurrence of each metric value as bold.
    ///
    /// An occurrence counts only when it is not glued to surrounding letters or
    /// digits, so the value `9` matches in "9 models" but not in "2019" or "9+".
    /// Where candidates overlap the leftmost one wins, then the longest.
    pub fn from_metrics(text: impl Into<String>, values: &[String]) -> Self {
        let text = text.into();
        let mut candidates: Vec<Range<usize>> = values
            .iter()
            .map(|v| v.trim())
            .filter(|v| !v.is_empty())
            .flat_map(|value| {
                text.match_indices(value)
                    .map(|(start, m)| start..start + m.len())
                    .filter(|r| on_word_boundary(&text, r))
                    .collect::<Vec<_>>()
            })
            .collect();
        candidates.sort_by(|a, b| a.start.cmp(&b.start).then(b.end.cmp(&a.end)));

        let mut spans: Vec<Span> = Vec::new();
        for range in candidates {
            if spans.last().is_some_and(|last| range.start < last.end) {
                continue;
            }
            spans.push(Span {
                start: range.start,
                end: range.end,
                style: SpanStyle::Bold,
            });
        }
        Self { text, spans }
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// Splits `range` of the text into consecutive pieces, each tagged with the
    /// style of the span covering it (or `None`).
    pub fn segments(&self, range: Range<usize>) -> Vec<(&str, Option<SpanStyle>)> {
        let mut out = Vec::new();
        let mut pos = range.start;

        for span in &self.spans {
            if span.end <= pos || span.start >= range.end {
                continue;
            }
            let start = span.start.max(pos);
            let end = span.end.min(range.end);
            if start > pos {
                out.push((&self.text[pos..start], None));
            }
            out.push((&self.text[start..end], Some(span.style)));
            pos = end;
        }
        if pos < range.end {
            out.push((&self.text[pos..range.end], None));
        }
        out
    }
}

fn on_word_boundary(text: &str, range: &Range<usize>) -> bool {
    let matched = &text[range.clone()];
    let glued_before = matched.starts_with(|c: char| c.is_alphanumeric())
        && text[..range.start]
            .chars()
            .next_back()
            .is_some_and(|c| c.is_alphanumeric());
    let glued_after = matched.ends_with(|c: char| c.is_alphanumeric())
        && text[range.end..]
            .chars()
            .next()
            .is_some_and(|c| c.is_alphanumeric() || c == '+');
    !glued_before && !glued_after
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn values(v: &[&str]) -> Vec<String> {
        v.iter().map(|s| s.to_string()).collect()
    }

    fn bold_words(m: &MarkedText) -> Vec<&str> {
        m.spans.iter().map(|s| &m.text[s.start..s.end]).collect()
    }

    #[test]
    fn test_metric_marked_at_word_boundary() {
        let m = MarkedText::from_metrics(
            "led productization of 9 analytical models in 2019",
            &values(&["9"]),
        );
        assert_eq!(bold_words(&m), vec!["9"]);
        assert_eq!(m.spans[0].start, 22);
    }

    #[test]
    fn test_metric_not_marked_inside_larger_number() {
        let m = MarkedText::from_metrics("38 users and 9+ models", &values(&["3", "9"]));
        assert!(m.spans.is_empty(), "got {:?}", bold_words(&m));
    }

    #[test]
    fn test_text_is_never_rewritten() {
        let text = "cutting time from >2 quarters to <1 quarter";
        let m = MarkedText::from_metrics(text, &values(&[">2 quarters", "<1 quarter"]));
        assert_eq!(m.text, text);
        assert_eq!(bold_words(&m), vec![">2 quarters", "<1 quarter"]);
    }

    #[test]
    fn test_overlapping_candidates_keep_leftmost_longest() {
        let m = MarkedText::from_metrics("saved 75% of time", &values(&["75", "75%"]));
        assert_eq!(bold_words(&m), vec!["75%"]);
    }

    #[test]
    fn test_empty_values_ignored() {
        let m = MarkedText::from_metrics("no metrics here", &values(&["", "  "]));
        assert!(m.spans.is_empty());
    }

    #[test]
    fn test_segments_split_around_spans() {
        let m = MarkedText::from_metrics("deployed 20 models fast", &values(&["20"]));
        let segs = m.segments(0..m.text.len());
        assert_eq!(
            segs,
            vec![
                ("deployed ", None),
                ("20", Some(SpanStyle::Bold)),
                (" models fast", None)
            ]
        );
    }

    #[test]
    fn test_segments_clip_to_range() {
        let m = MarkedText::from_metrics("over 10,500 hours logged", &values(&["10,500"]));
        // second "line" starts inside the span
        let segs = m.segments(8..17);
        assert_eq!(segs, vec![("500", Some(SpanStyle::Bold)), (" hours", None)]);
    }

    #[test]
    fn test_plain_has_single_unstyled_segment() {
        let m = MarkedText::plain("hello world");
        assert_eq!(m.segments(0..11), vec![("hello world", None)]);
    }
}
