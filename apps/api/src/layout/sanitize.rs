//! Text normalisation applied to every string before it is measured or drawn.
//!
//! The output is printable ASCII with single spaces, which keeps the width tables
//! exact and lets the PDF backend write WinAnsi strings without re-encoding.
//! Sanitising is idempotent: a second pass never changes the output.

use std::sync::LazyLock;

use regex::Regex;
use unicode_normalization::UnicodeNormalization;

/// A run of four or more single-letter tokens, e.g. `M L O p s` or `P y t h o n`.
static SPLIT_LETTER_RUN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:^|\s)((?:[A-Za-z] ){3,}[A-Za-z])(?:\s|$)").expect("static pattern")
});

/// Share of single-character words above which the whole string is rejoined.
const SPLIT_WORD_RATIO: f32 = 0.65;
/// Minimum word count before the ratio rule may fire.
const SPLIT_WORD_MIN_WORDS: usize = 3;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SanitizeOptions {
    /// Rejoin text that upstream extraction split into one-letter tokens.
    /// Best effort: legitimate sequences of short words can be merged too.
    pub repair_split_words: bool,
}

#[derive(Debug, Clone, Default)]
pub struct TextSanitizer {
    options: SanitizeOptions,
}

impl TextSanitizer {
    pub fn new(options: SanitizeOptions) -> Self {
        Self { options }
    }

    pub fn sanitize(&self, text: &str) -> String {
        let mapped = map_special_chars(text);

        let ascii: String = mapped
            .nfd()
            .filter(|c| c.is_ascii() && !c.is_ascii_control())
            .collect();

        let collapsed = ascii.split_whitespace().collect::<Vec<_>>().join(" ");

        if self.options.repair_split_words {
            repair_split_words(&collapsed)
        } else {
            collapsed
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Character mapping
// ────────────────────────────────────────────────────────────────────────────

fn superscript_value(c: char) -> Option<char> {
    match c {
        '\u{2070}' => Some('0'),
        '\u{00B9}' => Some('1'),
        '\u{00B2}' => Some('2'),
        '\u{00B3}' => Some('3'),
        '\u{2074}'..='\u{2079}' => char::from_digit(c as u32 - 0x2070, 10),
        '\u{207A}' => Some('+'),
        '\u{207B}' => Some('-'),
        _ => None,
    }
}

fn map_special_chars(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut in_superscript = false;

    for c in text.chars() {
        if let Some(value) = superscript_value(c) {
            // "10⁻⁹" becomes "10^-9": caret once, at the start of an attached run
            if !in_superscript && out.chars().last().is_some_and(|p| !p.is_whitespace()) {
                out.push('^');
            }
            out.push(value);
            in_superscript = true;
            continue;
        }
        in_superscript = false;

        match c {
            '\u{2010}' | '\u{2011}' | '\u{2012}' | '\u{2013}' | '\u{2043}' | '\u{2212}'
            | '\u{FE58}' | '\u{FE63}' | '\u{FF0D}' => out.push('-'),
            '\u{2014}' | '\u{2015}' => out.push_str(" - "),
            '\u{2018}' | '\u{2019}' | '\u{201A}' | '\u{2032}' => out.push('\''),
            '\u{201C}' | '\u{201D}' | '\u{201E}' | '\u{2033}' => out.push('"'),
            '\u{2026}' => out.push_str("..."),
            '\u{2022}' | '\u{00B7}' => out.push('-'),
            '\u{00D7}' => out.push('x'),
            '\u{00A0}' | '\u{2000}'..='\u{200A}' | '\u{202F}' | '\u{205F}' | '\u{3000}' => {
                out.push(' ')
            }
            '\u{200B}' | '\u{200C}' | '\u{200D}' | '\u{2060}' | '\u{FEFF}' => {}
            '\t' | '\n' | '\r' => out.push(' '),
            _ => out.push(c),
        }
    }
    out
}

// ────────────────────────────────────────────────────────────────────────────
// Split-word repair
// ────────────────────────────────────────────────────────────────────────────

fn is_single_char_word(word: &str) -> bool {
    let mut chars = word.chars();
    matches!((chars.next(), chars.next()), (Some(c), None) if c.is_ascii_alphabetic())
}

/// Expects collapsed input (single spaces, trimmed).
fn repair_split_words(text: &str) -> String {
    let words: Vec<&str> = text.split(' ').filter(|w| !w.is_empty()).collect();
    if words.len() >= SPLIT_WORD_MIN_WORDS {
        let singles = words.iter().filter(|w| is_single_char_word(w)).count();
        if singles as f32 / words.len() as f32 > SPLIT_WORD_RATIO {
            return words.concat();
        }
    }

    let mut out = String::with_capacity(text.len());
    let mut last = 0;
    // Matches do not overlap and each consumes its trailing separator, so a
    // run ending right before the next run's leading space is still found.
    let mut search_from = 0;
    while let Some(caps) = SPLIT_LETTER_RUN.captures_at(text, search_from) {
        let Some(run) = caps.get(1) else { break };
        out.push_str(&text[last..run.start()]);
        out.extend(run.as_str().chars().filter(|c| *c != ' '));
        last = run.end();
        search_from = run.end();
    }
    out.push_str(&text[last..]);
    out
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
