//! Display formatting for record dates.
//!
//! Dates arrive as `YYYY-MM` or a bare `YYYY`. Anything else is shown as-is:
//! a malformed date never fails a render.

use chrono::{Datelike, NaiveDate};

const MONTHS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sept", "Oct", "Nov", "Dec",
];

/// `"2022-08"` becomes `"Aug 2022"`, `"2013"` stays `"2013"`, empty stays empty.
pub fn format_date(raw: &str) -> String {
    let raw = raw.trim();
    if raw.is_empty() {
        return String::new();
    }
    if is_bare_year(raw) {
        return raw.to_string();
    }
    match parse_year_month(raw) {
        Some(date) => format!("{} {}", MONTHS[date.month0() as usize], date.year()),
        None => raw.to_string(),
    }
}

/// `"<start> - <end>"`. A missing end reads `Present`, or `Expected <date>`
/// when only an expected end is known.
pub fn format_range(start: &str, end: Option<&str>, expected_end: Option<&str>) -> String {
    let end = match (end.filter(|e| !e.trim().is_empty()), expected_end) {
        (Some(end), _) => format_date(end),
        (None, Some(expected)) if !expected.trim().is_empty() => {
            format!("Expected {}", format_date(expected))
        }
        _ => "Present".to_string(),
    };
    let start = format_date(start);
    if start.is_empty() {
        end
    } else {
        format!("{start} - {end}")
    }
}

/// Formats both sides of a free-text period such as `"2024-05 - Present"`.
pub fn format_period(raw: &str) -> String {
    match raw.split_once(" - ") {
        Some((start, end)) => format!("{} - {}", format_date(start), format_date(end)),
        None => format_date(raw),
    }
}

/// Whether `raw` is a `YYYY` or `YYYY-MM` value that `format_date` understands.
pub fn is_recognised(raw: &str) -> bool {
    let raw = raw.trim();
    is_bare_year(raw) || parse_year_month(raw).is_some()
}

fn is_bare_year(raw: &str) -> bool {
    raw.len() == 4 && raw.bytes().all(|b| b.is_ascii_digit())
}

fn parse_year_month(raw: &str) -> Option<NaiveDate> {
    let (year, month) = raw.split_once('-')?;
    if year.len() != 4 || month.is_empty() || month.len() > 2 {
        return None;
    }
    NaiveDate::from_ymd_opt(year.parse().ok()?, month.parse().ok()?, 1)
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
