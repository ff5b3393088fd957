//! Serde model of the CV record.
//!
//! Field names follow the camelCase JSON of the record file. Every optional
//! field is an `Option`, and list groups default to empty, so a sparse record
//! still deserialises and the layout engine simply omits what is missing.

use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CvRecord {
    pub personal: Personal,
    #[serde(default, deserialize_with = "null_as_default")]
    pub experience: Vec<Experience>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub projects: Vec<Project>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub education: Vec<Education>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub certifications: Vec<Certification>,
    #[serde(default)]
    pub skills: IndexMap<String, SkillEntry>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub leadership: Vec<Leadership>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub publications: Vec<Publication>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub awards: Vec<Award>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub languages: Vec<Language>,
    #[serde(default)]
    pub interests: Interests,
    #[serde(default)]
    pub metadata: Metadata,
}

// ────────────────────────────────────────────────────────────────────────────
// Shared value types
// ────────────────────────────────────────────────────────────────────────────

/// Treats an explicit `null` like a missing field.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// A JSON number or string, as used by metric values and years.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Scalar {
    Number(serde_json::Number),
    Text(String),
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scalar::Number(n) => write!(f, "{n}"),
            Scalar::Text(s) => f.write_str(s),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NamedLink {
    pub name: String,
    #[serde(default)]
    pub url: Option<String>,
}

// ────────────────────────────────────────────────────────────────────────────
// Personal
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Personal {
    pub name: PersonName,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub contact: Contact,
    #[serde(default)]
    pub profile_image: Option<String>,
    #[serde(default)]
    pub summary: SummaryText,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PersonName {
    pub first: String,
    pub last: String,
    #[serde(default)]
    pub full: Option<String>,
}

impl PersonName {
    /// `full` when present, otherwise `first last`.
    pub fn display(&self) -> String {
        match self.full.as_deref().map(str::trim) {
            Some(full) if !full.is_empty() => full.to_string(),
            _ => format!("{} {}", self.first.trim(), self.last.trim())
                .trim()
                .to_string(),
        }
    }

    /// First token of the given names, e.g. `Artemio` for `Artemio Santiago`.
    pub fn first_token(&self) -> &str {
        self.first.split_whitespace().next().unwrap_or("")
    }

    pub fn last_token(&self) -> &str {
        self.last.split_whitespace().next().unwrap_or("")
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Contact {
    pub phone: Option<String>,
    pub email: Option<String>,
    pub linkedin: Option<String>,
    pub github: Option<String>,
    pub orcid: Option<String>,
    pub twitter: Option<String>,
    pub facebook: Option<String>,
    pub website: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SummaryText {
    pub brief: Option<String>,
    pub tagline: Option<String>,
    pub full: Option<String>,
    pub connection: Option<String>,
    pub current: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub strengths: Vec<String>,
    pub closing: Option<String>,
}

// ────────────────────────────────────────────────────────────────────────────
// Sections
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Experience {
    pub id: String,
    pub title: String,
    pub company: String,
    #[serde(default)]
    pub location: Option<String>,
    pub start_date: String,
    #[serde(default)]
    pub end_date: Option<String>,
    #[serde(default)]
    pub current: Option<bool>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub highlights: Vec<Highlight>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Highlight {
    pub text: String,
    #[serde(default)]
    pub metrics: IndexMap<String, Scalar>,
}

impl Highlight {
    /// Metric values as they would appear in the sentence.
    pub fn metric_values(&self) -> Vec<String> {
        self.metrics.values().map(Scalar::to_string).collect()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Project {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub year: Option<Scalar>,
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Education {
    pub degree: String,
    pub institution: String,
    #[serde(default)]
    pub start_date: String,
    #[serde(default)]
    pub end_date: Option<String>,
    #[serde(default)]
    pub expected_end_date: Option<String>,
    #[serde(default)]
    pub gpa: Option<String>,
    #[serde(default)]
    pub coursework: Option<String>,
    #[serde(default)]
    pub achievement: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Certification {
    pub name: String,
    #[serde(default)]
    pub issuer: String,
    #[serde(default)]
    pub date: Option<Scalar>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
}

/// A skill category is either a flat list or named sub-lists
/// (`databases: { relational: [...], nosql: [...] }`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SkillEntry {
    List(Vec<String>),
    Nested(IndexMap<String, Vec<String>>),
}

impl SkillEntry {
    /// All skills of the category in record order.
    pub fn items(&self) -> Vec<&str> {
        match self {
            SkillEntry::List(items) => items.iter().map(String::as_str).collect(),
            SkillEntry::Nested(groups) => groups
                .values()
                .flat_map(|items| items.iter().map(String::as_str))
                .collect(),
        }
    }
}

/// Human label for a camelCase category key: `cloudAndMLOps` -> `Cloud & MLOps`.
pub fn skill_label(key: &str) -> String {
    let mut words: Vec<String> = Vec::new();
    let mut prev_lower = false;
    for c in key.chars() {
        if c == '_' || c == '-' || c == ' ' {
            words.push(String::new());
            prev_lower = false;
            continue;
        }
        if words.is_empty() || (c.is_uppercase() && prev_lower) {
            words.push(String::new());
        }
        if let Some(word) = words.last_mut() {
            word.push(c);
        }
        prev_lower = c.is_lowercase() || c.is_ascii_digit();
    }

    words
        .into_iter()
        .filter(|w| !w.is_empty())
        .map(|w| {
            if w.eq_ignore_ascii_case("and") {
                return "&".to_string();
            }
            let mut chars = w.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => w,
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Leadership {
    pub role: String,
    pub organization: String,
    #[serde(default)]
    pub period: String,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub highlights: Vec<String>,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Publication {
    pub title: String,
    #[serde(default)]
    pub journal: Option<String>,
    #[serde(default)]
    pub institution: Option<String>,
    #[serde(default)]
    pub year: Option<Scalar>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
    #[serde(default)]
    pub doi: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Award {
    pub title: String,
    #[serde(default)]
    pub year: Option<Scalar>,
    #[serde(default)]
    pub organization: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub certificates: Vec<NamedLink>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Language {
    pub name: String,
    #[serde(default)]
    pub level: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub certifications: Vec<NamedLink>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Interests {
    #[serde(default, deserialize_with = "null_as_default")]
    pub professional: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub personal: Vec<String>,
    #[serde(default)]
    pub philosophy: Option<String>,
}

impl Interests {
    pub fn is_empty(&self) -> bool {
        self.professional.is_empty()
            && self.personal.is_empty()
            && self.philosophy.as_deref().map_or(true, |p| p.trim().is_empty())
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Metadata
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Metadata {
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub last_updated: Option<String>,
    #[serde(default)]
    pub source: Option<String>,
    #[serde(default)]
    pub template_options: TemplateOptions,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateOptions {
    /// Format keyword -> description.
    #[serde(default)]
    pub formats: IndexMap<String, String>,
    /// Section name -> item limit suggested for the resume format.
    #[serde(default)]
    pub resume_max_items: IndexMap<String, usize>,
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_bundled_record_deserialises() {
        let raw = include_str!("../../data/cv-data.json");
        let record: CvRecord = serde_json::from_str(raw).expect("bundled record parses");
        assert_eq!(record.experience.len(), 8);
        assert!(record.experience[0].end_date.is_none());
        assert_eq!(record.education[2].gpa, None);
        assert!(matches!(
            record.skills.get("databases"),
            Some(SkillEntry::Nested(_))
        ));
        assert_eq!(
            record.metadata.template_options.resume_max_items.get("experience"),
            Some(&3)
        );
    }

    #[test]
    fn test_minimal_record_uses_defaults() {
        let record: CvRecord = serde_json::from_value(json!({
            "personal": { "name": { "first": "Jane", "last": "Doe" } }
        }))
        .expect("minimal record");
        assert!(record.experience.is_empty());
        assert!(record.interests.is_empty());
        assert_eq!(record.personal.name.display(), "Jane Doe");
    }

    #[test]
    fn test_null_lists_read_as_empty() {
        let l: Leadership = serde_json::from_value(json!({
            "role": "Student Representative",
            "organization": "UNAM",
            "period": "2021 - 2022",
            "highlights": null
        }))
        .expect("leadership");
        assert!(l.highlights.is_empty());
    }

    #[test]
    fn test_metric_values_render_numbers_and_strings() {
        let h: Highlight = serde_json::from_value(json!({
            "text": "cut time by 75% over 9 models",
            "metrics": { "models": 9, "reduction": "75%" }
        }))
        .expect("highlight");
        assert_eq!(h.metric_values(), vec!["9", "75%"]);
    }

    #[test]
    fn test_name_tokens() {
        let name = PersonName {
            first: "Artemio Santiago".into(),
            last: "Padilla Robles".into(),
            full: None,
        };
        assert_eq!(name.first_token(), "Artemio");
        assert_eq!(name.last_token(), "Padilla");
        assert_eq!(name.display(), "Artemio Santiago Padilla Robles");
    }

    #[test]
    fn test_skill_labels() {
        assert_eq!(skill_label("cloudAndMLOps"), "Cloud & MLOps");
        assert_eq!(skill_label("bigData"), "Big Data");
        assert_eq!(skill_label("machineLearning"), "Machine Learning");
        assert_eq!(skill_label("languages"), "Languages");
    }

    #[test]
    fn test_nested_skills_flatten_in_order() {
        // Parsed from text: a `json!` map would sort its keys.
        let entry: SkillEntry = serde_json::from_str(
            r#"{ "relational": ["PostgreSQL", "MySQL"], "nosql": ["MongoDB"] }"#,
        )
        .expect("nested");
        assert_eq!(entry.items(), vec!["PostgreSQL", "MySQL", "MongoDB"]);
    }
}
