//! Load-time sanity checks on a CV record.
//!
//! The record is trusted, so nothing here rejects it. Problems are returned
//! and logged as warnings; the layout engine copes with each of them.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::layout::dates;
use crate::models::cv::CvRecord;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordWarning {
    /// Dotted path of the offending field, e.g. `experience[2].startDate`.
    pub field: String,
    pub message: String,
}

impl RecordWarning {
    fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

pub fn validate_record(record: &CvRecord) -> Vec<RecordWarning> {
    let mut warnings = Vec::new();

    if record.personal.name.display().is_empty() {
        warnings.push(RecordWarning::new("personal.name", "name is empty"));
    }

    let mut seen = HashSet::new();
    for (i, exp) in record.experience.iter().enumerate() {
        if !seen.insert(exp.id.as_str()) {
            warnings.push(RecordWarning::new(
                format!("experience[{i}].id"),
                format!("duplicate experience id '{}'", exp.id),
            ));
        }
        check_date(&mut warnings, format!("experience[{i}].startDate"), Some(&exp.start_date));
        check_date(&mut warnings, format!("experience[{i}].endDate"), exp.end_date.as_deref());
    }

    for (i, edu) in record.education.iter().enumerate() {
        check_date(&mut warnings, format!("education[{i}].startDate"), Some(&edu.start_date));
        check_date(&mut warnings, format!("education[{i}].endDate"), edu.end_date.as_deref());
        check_date(
            &mut warnings,
            format!("education[{i}].expectedEndDate"),
            edu.expected_end_date.as_deref(),
        );
    }

    for w in &warnings {
        warn!(field = %w.field, "{}", w.message);
    }
    warnings
}

/// Empty and absent dates are fine; anything else must be `YYYY` or `YYYY-MM`.
fn check_date(warnings: &mut Vec<RecordWarning>, field: String, raw: Option<&str>) {
    match raw.map(str::trim) {
        Some(raw) if !raw.is_empty() && !dates::is_recognised(raw) => {
            warnings.push(RecordWarning::new(
                field,
                format!("unrecognised date '{raw}', shown as written"),
            ));
        }
        _ => {}
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
