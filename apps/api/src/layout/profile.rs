//! Per-format density rules.
//!
//! Three fixed profiles control which sections appear, how many entries each
//! keeps, and the font sizes and spacing used to draw them. `FormatProfile::rule`
//! is an exhaustive match, so every section has a rule under every format.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::layout::page_flow::{Margins, PageGeometry};

// ────────────────────────────────────────────────────────────────────────────
// Formats
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentFormat {
    Full,
    Resume,
    Summary,
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown format '{0}' (expected full, resume or summary)")]
pub struct UnknownFormat(pub String);

impl DocumentFormat {
    pub const ALL: [DocumentFormat; 3] = [
        DocumentFormat::Full,
        DocumentFormat::Resume,
        DocumentFormat::Summary,
    ];

    pub fn keyword(self) -> &'static str {
        match self {
            DocumentFormat::Full => "full",
            DocumentFormat::Resume => "resume",
            DocumentFormat::Summary => "summary",
        }
    }

    /// Suffix used in file names and the document title.
    pub fn label(self) -> &'static str {
        match self {
            DocumentFormat::Full => "CV",
            DocumentFormat::Resume => "Resume",
            DocumentFormat::Summary => "Summary",
        }
    }

    /// Used when the record carries no description of its own.
    pub fn description(self) -> &'static str {
        match self {
            DocumentFormat::Full => "Complete CV with all sections",
            DocumentFormat::Resume => "2-page condensed resume",
            DocumentFormat::Summary => "1-page executive summary",
        }
    }
}

impl FromStr for DocumentFormat {
    type Err = UnknownFormat;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "full" => Ok(DocumentFormat::Full),
            "resume" => Ok(DocumentFormat::Resume),
            "summary" => Ok(DocumentFormat::Summary),
            _ => Err(UnknownFormat(s.to_string())),
        }
    }
}

impl fmt::Display for DocumentFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword())
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Sections and rules
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Section {
    Header,
    Summary,
    Experience,
    Education,
    Skills,
    Certifications,
    Leadership,
    Awards,
    Publications,
    Languages,
    Projects,
    Interests,
}

impl Section {
    /// Fixed drawing order.
    pub const ORDER: [Section; 12] = [
        Section::Header,
        Section::Summary,
        Section::Experience,
        Section::Education,
        Section::Skills,
        Section::Certifications,
        Section::Leadership,
        Section::Awards,
        Section::Publications,
        Section::Languages,
        Section::Projects,
        Section::Interests,
    ];

    /// Header text, before uppercasing. `Header` has no title bar.
    pub fn title(self, format: DocumentFormat) -> &'static str {
        match self {
            Section::Header => "",
            Section::Summary => "Professional Summary",
            Section::Experience => "Professional Experience",
            Section::Education => "Education",
            Section::Skills => "Technical Skills",
            Section::Certifications => "Certifications & Training",
            Section::Leadership => "Leadership & Activities",
            Section::Awards => "Awards & Honors",
            Section::Publications => "Publications",
            Section::Languages if format == DocumentFormat::Summary => "Languages & Awards",
            Section::Languages => "Languages",
            Section::Projects => "Selected Projects",
            Section::Interests => "Interests",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum SectionRule {
    Omit,
    All,
    Top(usize),
    /// Drawn only when at least `min_remaining` mm are left on the page; skipped
    /// silently otherwise, and also when there is nothing to draw.
    IfSpace {
        limit: Option<usize>,
        min_remaining: f32,
    },
    /// Languages and awards side by side in two columns.
    WithAwards,
}

impl SectionRule {
    pub fn is_omitted(self) -> bool {
        matches!(self, SectionRule::Omit)
    }

    /// Applies the count limit of this rule to a list.
    pub fn take<T>(self, items: &[T]) -> &[T] {
        let limit = match self {
            SectionRule::Omit => Some(0),
            SectionRule::All | SectionRule::WithAwards => None,
            SectionRule::Top(n) => Some(n),
            SectionRule::IfSpace { limit, .. } => limit,
        };
        match limit {
            Some(n) => &items[..n.min(items.len())],
            None => items,
        }
    }
}

/// Highlights kept per entry: `first` for the most recent entry, `rest` for
/// the others. `None` keeps everything.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HighlightRule {
    pub first: Option<usize>,
    pub rest: Option<usize>,
}

impl HighlightRule {
    pub const ALL: HighlightRule = HighlightRule {
        first: None,
        rest: None,
    };

    pub fn limit_for(self, entry_index: usize) -> Option<usize> {
        if entry_index == 0 {
            self.first
        } else {
            self.rest
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Visual settings
// ────────────────────────────────────────────────────────────────────────────

/// Point sizes per block type.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FontSizes {
    pub name: f32,
    pub title: f32,
    pub contact: f32,
    pub section_header: f32,
    pub entry_title: f32,
    pub entry_subtitle: f32,
    pub body: f32,
    pub bullet: f32,
    pub running_header: f32,
    pub footer: f32,
}

/// Vertical rhythm in millimetres.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Spacing {
    pub section_header_height: f32,
    pub line_height: f32,
    pub section_spacing: f32,
    pub bullet_gap: f32,
    pub running_header_height: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HeaderStyle {
    /// Given names and surnames on two lines, contact details one per line.
    Stacked,
    /// Full name on one line, contact details joined on one line.
    Compact,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SummaryStyle {
    Complete,
    BriefAndFull,
    BriefOnly,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EducationStyle {
    /// GPA, coursework and achievement lines.
    Detailed,
    WithGpa,
    /// One heading per entry, no detail lines.
    Compact,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FooterRule {
    PageNumbers,
    LinkOnLastPage,
    LinkOnFirstPage,
}

impl FooterRule {
    /// Whether the "see full version" link replaces the page number on `page`.
    pub fn shows_link(self, page: usize, total: usize) -> bool {
        match self {
            FooterRule::PageNumbers => false,
            FooterRule::LinkOnLastPage => page == total,
            FooterRule::LinkOnFirstPage => page == 1,
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// FormatProfile
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormatProfile {
    pub format: DocumentFormat,
    pub margins: Margins,
    pub fonts: FontSizes,
    pub spacing: Spacing,
    pub header_style: HeaderStyle,
    pub summary_style: SummaryStyle,
    pub education_style: EducationStyle,
    pub experience_highlights: HighlightRule,
    pub leadership_highlights: Option<usize>,
    pub footer: FooterRule,
}

impl FormatProfile {
    pub fn for_format(format: DocumentFormat) -> Self {
        match format {
            DocumentFormat::Full => Self {
                format,
                margins: Margins::new(30.0, 30.0, 30.0, 30.0),
                fonts: FontSizes {
                    name: 22.0,
                    title: 14.0,
                    contact: 10.0,
                    section_header: 12.0,
                    entry_title: 11.0,
                    entry_subtitle: 10.0,
                    body: 10.0,
                    bullet: 9.0,
                    running_header: 8.0,
                    footer: 9.0,
                },
                spacing: Spacing {
                    section_header_height: 10.0,
                    line_height: 5.0,
                    section_spacing: 10.0,
                    bullet_gap: 3.0,
                    running_header_height: 8.0,
                },
                header_style: HeaderStyle::Stacked,
                summary_style: SummaryStyle::Complete,
                education_style: EducationStyle::Detailed,
                experience_highlights: HighlightRule::ALL,
                leadership_highlights: None,
                footer: FooterRule::PageNumbers,
            },
            DocumentFormat::Resume => Self {
                format,
                margins: Margins::new(20.0, 20.0, 22.0, 22.0),
                fonts: FontSizes {
                    name: 18.0,
                    title: 12.0,
                    contact: 9.0,
                    section_header: 11.0,
                    entry_title: 10.0,
                    entry_subtitle: 9.0,
                    body: 9.0,
                    bullet: 9.0,
                    running_header: 8.0,
                    footer: 8.0,
                },
                spacing: Spacing {
                    section_header_height: 7.0,
                    line_height: 4.2,
                    section_spacing: 4.0,
                    bullet_gap: 1.0,
                    running_header_height: 7.0,
                },
                header_style: HeaderStyle::Compact,
                summary_style: SummaryStyle::BriefAndFull,
                education_style: EducationStyle::WithGpa,
                experience_highlights: HighlightRule {
                    first: Some(3),
                    rest: Some(3),
                },
                leadership_highlights: Some(2),
                footer: FooterRule::LinkOnLastPage,
            },
            DocumentFormat::Summary => Self {
                format,
                margins: Margins::new(14.0, 14.0, 18.0, 18.0),
                fonts: FontSizes {
                    name: 16.0,
                    title: 11.0,
                    contact: 8.0,
                    section_header: 10.0,
                    entry_title: 9.5,
                    entry_subtitle: 8.5,
                    body: 8.5,
                    bullet: 8.0,
                    running_header: 7.0,
                    footer: 7.5,
                },
                spacing: Spacing {
                    section_header_height: 6.5,
                    line_height: 3.8,
                    section_spacing: 4.0,
                    bullet_gap: 1.0,
                    running_header_height: 6.0,
                },
                header_style: HeaderStyle::Compact,
                summary_style: SummaryStyle::BriefOnly,
                education_style: EducationStyle::Compact,
                experience_highlights: HighlightRule {
                    first: Some(3),
                    rest: Some(1),
                },
                leadership_highlights: None,
                footer: FooterRule::LinkOnFirstPage,
            },
        }
    }

    pub fn geometry(&self) -> PageGeometry {
        PageGeometry::a4(self.margins)
    }

    pub fn rule(&self, section: Section) -> SectionRule {
        use SectionRule::*;

        match self.format {
            DocumentFormat::Full => match section {
                Section::Header | Section::Summary | Section::Experience => All,
                Section::Education | Section::Skills | Section::Certifications => All,
                Section::Leadership | Section::Awards | Section::Publications => All,
                Section::Languages => All,
                Section::Projects => IfSpace {
                    limit: Some(3),
                    min_remaining: 50.0,
                },
                Section::Interests => IfSpace {
                    limit: None,
                    min_remaining: 30.0,
                },
            },
            DocumentFormat::Resume => match section {
                Section::Header | Section::Summary | Section::Skills => All,
                Section::Experience => Top(3),
                Section::Education => Top(2),
                Section::Certifications => Top(5),
                Section::Leadership => Top(2),
                Section::Awards => Top(4),
                Section::Publications => Top(1),
                Section::Languages => All,
                Section::Projects | Section::Interests => Omit,
            },
            DocumentFormat::Summary => match section {
                Section::Header | Section::Summary | Section::Skills => All,
                Section::Experience => Top(3),
                Section::Education => Top(3),
                Section::Certifications | Section::Leadership => Omit,
                Section::Awards | Section::Publications => Omit,
                Section::Languages => WithAwards,
                Section::Projects | Section::Interests => Omit,
            },
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
