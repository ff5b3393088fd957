//! Document composition.
//!
//! `DocumentComposer::compose` walks the fixed section order once, asks the
//! format profile how much of each section to keep, and feeds blocks to the
//! `BlockRenderer`. Layout is strictly sequential: nothing drawn is ever moved.
//! A final pass stamps the footer on every page once the page count is known.

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::layout::blocks::{Block, BlockRenderer, ColumnItem};
use crate::layout::canvas::{DrawOp, Page, Rgb};
use crate::layout::dates::{format_date, format_period, format_range};
use crate::layout::font_metrics::{FontFace, TextMeasurer, PT_TO_MM};
use crate::layout::markup::{MarkedText, Span, SpanStyle};
use crate::layout::page_flow::{BlockPlacement, PageFlow, PageGeometry, RunningHeader};
use crate::layout::profile::{
    DocumentFormat, EducationStyle, FormatProfile, HeaderStyle, Section, SectionRule, SummaryStyle,
};
use crate::layout::sanitize::{SanitizeOptions, TextSanitizer};
use crate::models::cv::{skill_label, Award, CvRecord, Experience, Language};

pub const CREATOR: &str = "cv-api";

// ────────────────────────────────────────────────────────────────────────────
// Output types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default)]
pub struct ComposeOptions {
    /// Target of the "see full version" footer link in condensed formats.
    pub full_version_url: Option<String>,
    pub sanitize: SanitizeOptions,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentMetadata {
    pub title: String,
    pub subject: String,
    pub author: String,
    pub keywords: Vec<String>,
    pub creator: String,
}

/// What a section ended up showing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SectionSummary {
    pub section: Section,
    pub title: String,
    /// Lines drawn under each entry (highlights, detail lines or items).
    pub entry_bullets: Vec<usize>,
}

impl SectionSummary {
    pub fn entries(&self) -> usize {
        self.entry_bullets.len()
    }
}

#[derive(Debug, Clone)]
pub struct ComposedDocument {
    pub format: DocumentFormat,
    pub geometry: PageGeometry,
    pub pages: Vec<Page>,
    pub metadata: DocumentMetadata,
    pub sections: Vec<SectionSummary>,
    /// Space-gated sections that had content but no room.
    pub omitted: Vec<Section>,
    pub placements: Vec<BlockPlacement>,
}

impl ComposedDocument {
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    #[cfg(test)]
    pub fn section(&self, section: Section) -> Option<&SectionSummary> {
        self.sections.iter().find(|s| s.section == section)
    }
}

// ────────────────────────────────────────────────────────────────────────────
// DocumentComposer
// ────────────────────────────────────────────────────────────────────────────

pub struct DocumentComposer<'a> {
    measurer: &'a dyn TextMeasurer,
    options: ComposeOptions,
}

impl<'a> DocumentComposer<'a> {
    pub fn new(measurer: &'a dyn TextMeasurer, options: ComposeOptions) -> Self {
        Self { measurer, options }
    }

    pub fn compose(&self, record: &CvRecord, format: DocumentFormat) -> ComposedDocument {
        let profile = FormatProfile::for_format(format);
        if format == DocumentFormat::Resume {
            log_resume_limit_overrides(record, &profile);
        }

        let mut session = RenderSession::new(record, profile, self.measurer, &self.options);
        for section in Section::ORDER {
            session.run_section(section);
        }
        let doc = session.finish(self.options.full_version_url.as_deref());
        info!(
            format = %format,
            pages = doc.page_count(),
            omitted = doc.omitted.len(),
            "document composed"
        );
        doc
    }
}

/// The record may suggest its own resume limits; the fixed profile wins.
fn log_resume_limit_overrides(record: &CvRecord, profile: &FormatProfile) {
    let suggested = &record.metadata.template_options.resume_max_items;
    let sections = [
        ("experience", Section::Experience),
        ("education", Section::Education),
        ("certifications", Section::Certifications),
        ("leadership", Section::Leadership),
        ("awards", Section::Awards),
        ("publications", Section::Publications),
    ];
    for (key, section) in sections {
        if let (Some(&wanted), SectionRule::Top(used)) = (suggested.get(key), profile.rule(section)) {
            if wanted != used {
                debug!(section = key, wanted, used, "record limit ignored, profile limit applies");
            }
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Render session
// ────────────────────────────────────────────────────────────────────────────

/// All mutable state of one render. Built per call, dropped at the end.
struct RenderSession<'a> {
    record: &'a CvRecord,
    profile: FormatProfile,
    renderer: BlockRenderer<'a>,
    sanitizer: TextSanitizer,
    flow: PageFlow,
    sections: Vec<SectionSummary>,
    omitted: Vec<Section>,
}

impl<'a> RenderSession<'a> {
    fn new(
        record: &'a CvRecord,
        profile: FormatProfile,
        measurer: &'a dyn TextMeasurer,
        options: &ComposeOptions,
    ) -> Self {
        Self {
            record,
            renderer: BlockRenderer::new(measurer, &profile),
            flow: PageFlow::new(profile.geometry()),
            profile,
            sanitizer: TextSanitizer::new(options.sanitize),
            sections: Vec::new(),
            omitted: Vec::new(),
        }
    }

    fn clean(&self, text: &str) -> String {
        self.sanitizer.sanitize(text)
    }

    fn run_section(&mut self, section: Section) {
        let rule = self.profile.rule(section);
        if rule.is_omitted() {
            return;
        }
        match rule {
            SectionRule::IfSpace { min_remaining, .. } => {
                if !self.has_content(section) {
                    debug!(?section, "gated section has no data, skipped");
                    return;
                }
                if self.flow.remaining() < min_remaining {
                    info!(
                        ?section,
                        remaining = self.flow.remaining(),
                        min_remaining,
                        "not enough room left, section omitted"
                    );
                    self.omitted.push(section);
                    return;
                }
            }
            _ => {}
        }

        if section == Section::Header {
            self.header();
            return;
        }

        let title = section.title(self.profile.format).to_string();
        self.render(Block::SectionHeader {
            title: title.clone(),
        });
        let entry_bullets = match section {
            Section::Header => Vec::new(),
            Section::Summary => self.summary(),
            Section::Experience => self.experience(rule),
            Section::Education => self.education(rule),
            Section::Skills => self.skills(),
            Section::Certifications => self.certifications(rule),
            Section::Leadership => self.leadership(rule),
            Section::Awards => self.awards(rule),
            Section::Publications => self.publications(rule),
            Section::Languages => self.languages(rule),
            Section::Projects => self.projects(rule),
            Section::Interests => self.interests(),
        };
        self.flow.advance(self.profile.spacing.section_spacing);
        let summary = SectionSummary {
            section,
            title,
            entry_bullets,
        };
        debug!(?section, entries = summary.entries(), page = self.flow.page_number(), "section laid out");
        self.sections.push(summary);
    }

    fn has_content(&self, section: Section) -> bool {
        let r = self.record;
        match section {
            Section::Header | Section::Summary => true,
            Section::Experience => !r.experience.is_empty(),
            Section::Education => !r.education.is_empty(),
            Section::Skills => !r.skills.is_empty(),
            Section::Certifications => !r.certifications.is_empty(),
            Section::Leadership => !r.leadership.is_empty(),
            Section::Awards => !r.awards.is_empty(),
            Section::Publications => !r.publications.is_empty(),
            Section::Languages => !r.languages.is_empty(),
            Section::Projects => !r.projects.is_empty(),
            Section::Interests => !r.interests.is_empty(),
        }
    }

    // ── Text helpers ───────────────────────────────────────────────────────

    fn render(&mut self, block: Block) -> f32 {
        self.renderer.render(&mut self.flow, &block)
    }

    fn draw_line(&mut self, text: &str, face: FontFace, size_pt: f32, color: Rgb) {
        let x = self.flow.geometry().content_left();
        let y = self.flow.y();
        self.flow.draw(DrawOp::Text {
            x,
            y,
            text: text.to_string(),
            face,
            size_pt,
            color,
        });
    }

    fn bullet(&mut self, text: MarkedText) -> bool {
        let font_size = self.profile.fonts.bullet;
        self.render(Block::BulletParagraph { text, font_size }) > 0.0
    }

    fn plain_bullet(&mut self, text: &str) -> bool {
        let marked = MarkedText::plain(self.clean(text));
        self.bullet(marked)
    }

    /// Bullet whose leading `label` is bold, e.g. "Coursework: ...".
    fn labelled_bullet(&mut self, label: &str, rest: &str) -> bool {
        let label = self.clean(label);
        let rest = self.clean(rest);
        let text = if rest.is_empty() {
            label.clone()
        } else {
            format!("{label} {rest}")
        };
        let marked = MarkedText {
            spans: vec![Span {
                start: 0,
                end: label.len(),
                style: SpanStyle::Bold,
            }],
            text,
        };
        self.bullet(marked)
    }

    fn paragraph(&mut self, text: Option<&str>) {
        let Some(text) = text else { return };
        let text = self.clean(text);
        let block = Block::PlainParagraph {
            text,
            font_size: self.profile.fonts.body,
            line_height: self.profile.spacing.line_height,
        };
        if self.render(block) > 0.0 {
            self.flow.advance(self.profile.spacing.bullet_gap);
        }
    }

    fn entry(&mut self, title: &str, date: &str, subtitle: &str) {
        let block = Block::EntryHeading {
            title: self.clean(title),
            date: self.clean(date),
            subtitle: self.clean(subtitle),
        };
        self.render(block);
    }

    // ── Sections ───────────────────────────────────────────────────────────

    fn header(&mut self) {
        let record = self.record;
        let personal = &record.personal;
        let fonts = self.profile.fonts;
        let name = self.clean(&personal.name.display());
        let title = self.clean(&personal.title);
        let contact: Vec<String> = [
            personal.location.as_deref(),
            personal.contact.phone.as_deref(),
            personal.contact.email.as_deref(),
        ]
        .into_iter()
        .flatten()
        .map(|s| self.clean(s))
        .filter(|s| !s.is_empty())
        .collect();

        match self.profile.header_style {
            HeaderStyle::Stacked => {
                let first = self.clean(&personal.name.first);
                let last = self.clean(&personal.name.last);
                self.draw_line(&first, FontFace::Bold, fonts.name, Rgb::DARK_GRAY);
                self.flow.advance(8.0);
                self.draw_line(&last, FontFace::Bold, fonts.name, Rgb::DARK_GRAY);
                self.flow.advance(12.0);
                self.draw_line(&title, FontFace::Regular, fonts.title, Rgb::ACCENT);
                self.flow.advance(10.0);
                for line in &contact {
                    self.draw_line(line, FontFace::Regular, fonts.contact, Rgb::GRAY);
                    self.flow.advance(5.0);
                }
                self.flow.advance(10.0);
            }
            HeaderStyle::Compact => {
                self.draw_line(&name, FontFace::Bold, fonts.name, Rgb::DARK_GRAY);
                self.flow.advance(fonts.name * PT_TO_MM + 2.0);
                self.draw_line(&title, FontFace::Regular, fonts.title, Rgb::ACCENT);
                self.flow.advance(fonts.title * PT_TO_MM + 1.5);
                self.draw_line(&contact.join(" | "), FontFace::Regular, fonts.contact, Rgb::GRAY);
                self.flow.advance(fonts.contact * PT_TO_MM + self.profile.spacing.section_spacing);
            }
        }

        let running = [
            Some(name),
            Some(title),
            personal.contact.email.as_deref().map(|s| self.clean(s)),
            personal.contact.phone.as_deref().map(|s| self.clean(s)),
        ]
        .into_iter()
        .flatten()
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join(" | ");
        self.flow.set_running_header(RunningHeader {
            text: running,
            size_pt: fonts.running_header,
            height: self.profile.spacing.running_header_height,
        });
    }

    fn summary(&mut self) -> Vec<usize> {
        let record = self.record;
        let summary = &record.personal.summary;
        self.paragraph(summary.brief.as_deref());
        if self.profile.summary_style == SummaryStyle::BriefOnly {
            return Vec::new();
        }
        self.paragraph(summary.full.as_deref());
        if self.profile.summary_style == SummaryStyle::BriefAndFull {
            return Vec::new();
        }

        self.paragraph(summary.connection.as_deref());
        self.paragraph(summary.current.as_deref());
        let mut drawn = 0;
        for strength in &summary.strengths {
            drawn += usize::from(self.plain_bullet(strength));
        }
        self.paragraph(summary.closing.as_deref());
        vec![drawn]
    }

    fn experience(&mut self, rule: SectionRule) -> Vec<usize> {
        let record = self.record;
        let entries: &[Experience] = rule.take(&record.experience);
        let mut counts = Vec::with_capacity(entries.len());

        for (i, exp) in entries.iter().enumerate() {
            let date = format_range(&exp.start_date, exp.end_date.as_deref(), None);
            let subtitle = match exp.location.as_deref() {
                Some(loc) if !loc.trim().is_empty() => format!("{} | {}", exp.company, loc),
                _ => exp.company.clone(),
            };
            self.entry(&exp.title, &date, &subtitle);

            let limit = self.profile.experience_highlights.limit_for(i);
            let highlights = match limit {
                Some(n) => &exp.highlights[..n.min(exp.highlights.len())],
                None => &exp.highlights[..],
            };
            let mut drawn = 0;
            for h in highlights {
                let text = self.clean(&h.text);
                let values: Vec<String> = h.metric_values().iter().map(|v| self.clean(v)).collect();
                drawn += usize::from(self.bullet(MarkedText::from_metrics(text, &values)));
            }
            counts.push(drawn);
            self.flow.advance(self.profile.spacing.bullet_gap);
        }
        counts
    }

    fn education(&mut self, rule: SectionRule) -> Vec<usize> {
        let record = self.record;
        let style = self.profile.education_style;
        let mut counts = Vec::new();

        for edu in rule.take(&record.education) {
            let date = format_range(
                &edu.start_date,
                edu.end_date.as_deref(),
                edu.expected_end_date.as_deref(),
            );
            self.entry(&edu.degree, &date, &edu.institution);

            let mut drawn = 0;
            if style != EducationStyle::Compact {
                if let Some(gpa) = edu.gpa.as_deref() {
                    drawn += usize::from(self.labelled_bullet("GPA:", gpa));
                }
            }
            if style == EducationStyle::Detailed {
                if let Some(coursework) = edu.coursework.as_deref() {
                    drawn += usize::from(self.labelled_bullet("Coursework:", coursework));
                }
                if let Some(achievement) = edu.achievement.as_deref() {
                    drawn += usize::from(self.plain_bullet(achievement));
                }
            }
            counts.push(drawn);
            self.flow.advance(self.profile.spacing.bullet_gap);
        }
        counts
    }

    fn skills(&mut self) -> Vec<usize> {
        let items: Vec<ColumnItem> = self
            .record
            .skills
            .iter()
            .map(|(key, entry)| ColumnItem {
                label: self.clean(&skill_label(key)),
                text: self.clean(&entry.items().join(", ")),
            })
            .filter(|item| !item.text.is_empty())
            .collect();
        let count = items.len();
        self.render(Block::TwoColumn { items });
        vec![1; count]
    }

    fn certifications(&mut self, rule: SectionRule) -> Vec<usize> {
        let record = self.record;
        let mut counts = Vec::new();
        for cert in rule.take(&record.certifications) {
            let mut rest = String::new();
            if !cert.issuer.trim().is_empty() {
                rest.push_str(&format!("- {}", cert.issuer));
            }
            if let Some(date) = &cert.date {
                rest.push_str(&format!(" ({})", format_date(&date.to_string())));
            }
            counts.push(usize::from(self.labelled_bullet(&cert.name, rest.trim())));
        }
        counts
    }

    fn leadership(&mut self, rule: SectionRule) -> Vec<usize> {
        let record = self.record;
        let limit = self.profile.leadership_highlights;
        let mut counts = Vec::new();

        for item in rule.take(&record.leadership) {
            let subtitle = match item.location.as_deref() {
                Some(loc) if !loc.trim().is_empty() => format!("{} | {}", item.organization, loc),
                _ => item.organization.clone(),
            };
            let period = format_period(&self.clean(&item.period));
            self.entry(&item.role, &period, &subtitle);

            let highlights = match limit {
                Some(n) => &item.highlights[..n.min(item.highlights.len())],
                None => &item.highlights[..],
            };
            let mut drawn = 0;
            for h in highlights {
                drawn += usize::from(self.plain_bullet(h));
            }
            if highlights.is_empty() {
                if let Some(description) = item.description.as_deref() {
                    drawn += usize::from(self.plain_bullet(description));
                }
            }
            counts.push(drawn);
            self.flow.advance(self.profile.spacing.bullet_gap);
        }
        counts
    }

    fn award_line(&self, award: &Award) -> String {
        let mut text = award.title.clone();
        if let Some(org) = award.organization.as_deref() {
            text.push_str(&format!(", {org}"));
        }
        if let Some(year) = &award.year {
            text.push_str(&format!(" ({year})"));
        }
        self.clean(&text)
    }

    fn awards(&mut self, rule: SectionRule) -> Vec<usize> {
        let record = self.record;
        let mut counts = Vec::new();
        for award in rule.take(&record.awards) {
            let line = self.award_line(award);
            let detail = award.description.as_deref().unwrap_or("");
            counts.push(usize::from(self.labelled_bullet(&line, detail)));
        }
        counts
    }

    fn publications(&mut self, rule: SectionRule) -> Vec<usize> {
        let record = self.record;
        let mut counts = Vec::new();
        for publication in rule.take(&record.publications) {
            let label = match publication.kind.as_deref() {
                Some(kind) => format!("{kind}:"),
                None => String::new(),
            };
            let mut rest = publication.title.clone();
            if let Some(venue) = publication
                .journal
                .as_deref()
                .or(publication.institution.as_deref())
            {
                rest.push_str(&format!(". {venue}"));
            }
            if let Some(year) = &publication.year {
                rest.push_str(&format!(" ({year})"));
            }
            if let Some(doi) = publication.doi.as_deref() {
                rest.push_str(&format!(". DOI: {doi}"));
            }
            let drawn = if label.is_empty() {
                self.plain_bullet(&rest)
            } else {
                self.labelled_bullet(&label, &rest)
            };
            counts.push(usize::from(drawn));
        }
        counts
    }

    fn language_line(language: &Language) -> String {
        let certs: Vec<&str> = language.certifications.iter().map(|c| c.name.as_str()).collect();
        match (language.level.trim().is_empty(), certs.is_empty()) {
            (true, _) => language.name.clone(),
            (false, true) => format!("{} ({})", language.name, language.level),
            (false, false) => format!("{} ({} - {})", language.name, language.level, certs.join(", ")),
        }
    }

    fn languages(&mut self, rule: SectionRule) -> Vec<usize> {
        let lines: Vec<String> = self
            .record
            .languages
            .iter()
            .map(|l| self.clean(&Self::language_line(l)))
            .collect();

        if rule != SectionRule::WithAwards {
            return lines
                .iter()
                .map(|line| usize::from(self.plain_bullet(line)))
                .collect();
        }

        let awards: Vec<String> = self.record.awards.iter().map(|a| self.award_line(a)).collect();
        let items: Vec<ColumnItem> = [("Languages", lines), ("Awards", awards)]
            .into_iter()
            .filter(|(_, entries)| !entries.is_empty())
            .map(|(label, entries)| ColumnItem {
                label: label.to_string(),
                text: entries.join("; "),
            })
            .collect();
        let count = items.len();
        self.render(Block::TwoColumn { items });
        vec![1; count]
    }

    fn projects(&mut self, rule: SectionRule) -> Vec<usize> {
        let record = self.record;
        let mut counts = Vec::new();
        for project in rule.take(&record.projects) {
            let label = match &project.year {
                Some(year) => format!("{} ({year}):", project.name),
                None => format!("{}:", project.name),
            };
            counts.push(usize::from(self.labelled_bullet(&label, &project.description)));
        }
        counts
    }

    fn interests(&mut self) -> Vec<usize> {
        let record = self.record;
        let interests = &record.interests;
        let mut drawn = 0;
        if !interests.professional.is_empty() {
            drawn += usize::from(
                self.labelled_bullet("Professional:", &interests.professional.join(", ")),
            );
        }
        if !interests.personal.is_empty() {
            drawn += usize::from(self.labelled_bullet("Personal:", &interests.personal.join(", ")));
        }
        self.paragraph(interests.philosophy.as_deref());
        vec![drawn]
    }

    // ── Finalisation ───────────────────────────────────────────────────────

    fn finish(self, full_version_url: Option<&str>) -> ComposedDocument {
        let metadata = self.metadata();
        let geometry = *self.flow.geometry();
        let fonts = self.profile.fonts;
        let footer = self.profile.footer;
        let measurer = self.renderer.measurer();
        let (mut pages, placements) = self.flow.into_parts();

        let total = pages.len();
        let y = geometry.height - geometry.margins.bottom.min(30.0) / 2.0;
        let size = fonts.footer;
        for page in &mut pages {
            let url = full_version_url.filter(|_| footer.shows_link(page.number, total));
            let text = match url {
                Some(url) => format!("See full version: {url}"),
                None => format!("Page {} / {}", page.number, total),
            };
            let width = measurer.text_width(&text, FontFace::Regular, size);
            let x = (geometry.width - width) / 2.0;
            page.ops.push(DrawOp::Text {
                x,
                y,
                text,
                face: FontFace::Regular,
                size_pt: size,
                color: Rgb::GRAY,
            });
            if let Some(url) = url {
                let height = size * PT_TO_MM;
                page.ops.push(DrawOp::Link {
                    x,
                    y: y - height,
                    width,
                    height: height * 1.3,
                    url: url.to_string(),
                });
            }
        }

        ComposedDocument {
            format: self.profile.format,
            geometry,
            pages,
            metadata,
            sections: self.sections,
            omitted: self.omitted,
            placements,
        }
    }

    fn metadata(&self) -> DocumentMetadata {
        let format = self.profile.format;
        let author = self.clean(&self.record.personal.name.display());
        let subject = self
            .record
            .metadata
            .template_options
            .formats
            .get(format.keyword())
            .map(|s| self.clean(s))
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| format.description().to_string());

        let mut keywords = vec![self.clean(&self.record.personal.title)];
        keywords.extend(self.record.skills.keys().map(|k| skill_label(k)));
        keywords.push(format.label().to_string());
        keywords.retain(|k| !k.is_empty());

        DocumentMetadata {
            title: format!("{author} - {}", format.label()),
            subject,
            author,
            keywords,
            creator: CREATOR.to_string(),
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::font_metrics::StandardFontMetrics;
    use serde_json::{json, Value};

    fn bundled() -> CvRecord {
        serde_json::from_str(include_str!("../../data/cv-data.json")).expect("bundled record")
    }

    fn highlight(n: usize) -> Value {
        json!({ "text": format!("Delivered outcome number {n} for the team"), "metrics": {} })
    }

    fn experience(id: usize) -> Value {
        json!({
            "id": format!("job-{id}"),
            "title": "Engineer",
            "company": "Acme",
            "startDate": "2020-01",
            "endDate": "2021-01",
            "highlights": (0..4).map(highlight).collect::<Vec<_>>()
        })
    }

    fn record_with(extra: Value) -> CvRecord {
        let mut base = json!({
            "personal": {
                "name": { "first": "Jane", "last": "Doe", "full": "Jane Doe" },
                "title": "Platform Engineer",
                "contact": { "email": "jane@example.com", "phone": "555-0100" },
                "summary": { "brief": "Builds reliable systems.", "full": "Longer story." }
            }
        });
        if let (Some(base), Some(extra)) = (base.as_object_mut(), extra.as_object()) {
            for (k, v) in extra {
                base.insert(k.clone(), v.clone());
            }
        }
        serde_json::from_value(base).expect("record")
    }

    fn compose(record: &CvRecord, format: DocumentFormat, url: Option<&str>) -> ComposedDocument {
        let options = ComposeOptions {
            full_version_url: url.map(str::to_string),
            ..ComposeOptions::default()
        };
        DocumentComposer::new(&StandardFontMetrics, options).compose(record, format)
    }

    fn all_text(doc: &ComposedDocument) -> String {
        doc.pages
            .iter()
            .flat_map(|p| p.texts())
            .collect::<Vec<_>>()
            .join("\n")
    }

    #[test]
    fn test_summary_keeps_three_entries_with_one_highlight_after_first() {
        let record = record_with(json!({
            "experience": (0..6).map(experience).collect::<Vec<_>>()
        }));
        let doc = compose(&record, DocumentFormat::Summary, None);
        let exp = doc.section(Section::Experience).expect("experience section");
        assert_eq!(exp.entry_bullets, vec![3, 1, 1]);
    }

    #[test]
    fn test_full_with_no_certifications_still_draws_header() {
        let record = record_with(json!({ "certifications": [] }));
        let doc = compose(&record, DocumentFormat::Full, None);
        let certs = doc.section(Section::Certifications).expect("certifications section");
        assert_eq!(certs.entries(), 0);
        assert!(all_text(&doc).contains("CERTIFICATIONS & TRAINING"));
    }

    #[test]
    fn test_summary_omits_secondary_sections() {
        let doc = compose(&bundled(), DocumentFormat::Summary, None);
        for section in [
            Section::Certifications,
            Section::Leadership,
            Section::Awards,
            Section::Publications,
            Section::Projects,
            Section::Interests,
        ] {
            assert!(doc.section(section).is_none(), "{section:?} should be absent");
        }
        let text = all_text(&doc);
        assert!(text.contains("LANGUAGES & AWARDS"));
        assert!(!text.contains("CERTIFICATIONS & TRAINING"));
        let edu = doc.section(Section::Education).expect("education");
        assert_eq!(edu.entry_bullets, vec![0, 0, 0], "compact education has no detail lines");
    }

    #[test]
    fn test_resume_truncation_counts() {
        let doc = compose(&bundled(), DocumentFormat::Resume, None);
        let entries = |s| doc.section(s).map(SectionSummary::entries);
        assert_eq!(entries(Section::Experience), Some(3));
        assert_eq!(entries(Section::Education), Some(2));
        assert_eq!(entries(Section::Certifications), Some(5));
        assert_eq!(entries(Section::Leadership), Some(2));
        assert_eq!(entries(Section::Awards), Some(4));
        assert_eq!(entries(Section::Publications), Some(1));
        let exp = doc.section(Section::Experience).expect("experience");
        assert!(exp.entry_bullets.iter().all(|n| *n <= 3));
        let lead = doc.section(Section::Leadership).expect("leadership");
        assert!(lead.entry_bullets.iter().all(|n| *n <= 2));
    }

    #[test]
    fn test_full_format_numbers_every_page() {
        let doc = compose(&bundled(), DocumentFormat::Full, Some("https://example.com/cv"));
        let total = doc.page_count();
        assert!(total > 1, "full CV spans several pages");
        for page in &doc.pages {
            let expected = format!("Page {} / {}", page.number, total);
            assert!(page.contains_text(&expected), "missing '{expected}'");
            assert!(!page.contains_text("See full version"));
        }
    }

    #[test]
    fn test_running_header_on_continuation_pages() {
        let doc = compose(&bundled(), DocumentFormat::Full, None);
        let header = "Artemio Santiago Padilla Robles | MLOps & Automation Engineer Sr.";
        assert!(!doc.pages[0].contains_text(header));
        assert!(doc.pages[1..].iter().all(|p| p.contains_text(header)));
    }

    #[test]
    fn test_summary_footer_link_on_first_page_only() {
        let url = "https://example.com/cv";
        let doc = compose(&bundled(), DocumentFormat::Summary, Some(url));
        let first = &doc.pages[0];
        assert!(first.contains_text("See full version: https://example.com/cv"));
        assert!(first
            .ops
            .iter()
            .any(|op| matches!(op, DrawOp::Link { url: u, .. } if u == url)));
        for page in &doc.pages[1..] {
            assert!(!page.contains_text("See full version"));
            assert!(page.contains_text(&format!("Page {} /", page.number)));
        }
    }

    #[test]
    fn test_resume_footer_link_on_last_page_only() {
        let doc = compose(&bundled(), DocumentFormat::Resume, Some("https://example.com"));
        let last = doc.pages.last().expect("pages");
        assert!(last.contains_text("See full version"));
        if doc.page_count() > 1 {
            assert!(doc.pages[0].contains_text("Page 1 /"));
        }
    }

    #[test]
    fn test_summary_fits_one_page() {
        let doc = compose(&bundled(), DocumentFormat::Summary, Some("https://example.com"));
        assert_eq!(doc.page_count(), 1);
    }

    #[test]
    fn test_resume_fits_two_pages() {
        let doc = compose(&bundled(), DocumentFormat::Resume, Some("https://example.com"));
        assert!(doc.page_count() <= 2, "resume ran to {} pages", doc.page_count());
        assert!(doc.section(Section::Languages).is_some());
        assert!(all_text(&doc).contains("LANGUAGES"));
    }

    #[test]
    fn test_link_footer_without_url_falls_back_to_page_number() {
        let doc = compose(&bundled(), DocumentFormat::Summary, None);
        assert!(doc.pages[0].contains_text("Page 1 /"));
        assert!(doc
            .pages
            .iter()
            .all(|p| !p.ops.iter().any(|op| matches!(op, DrawOp::Link { .. }))));
    }

    #[test]
    fn test_no_block_starts_below_bottom_margin() {
        let record = bundled();
        for format in DocumentFormat::ALL {
            let doc = compose(&record, format, None);
            let limit = doc.geometry.bottom_limit();
            for p in &doc.placements {
                assert!(p.top <= limit, "{format}: block at {} on page {}", p.top, p.page);
            }
        }
    }

    #[test]
    fn test_metrics_drawn_in_bold() {
        let doc = compose(&bundled(), DocumentFormat::Full, None);
        let bold_metric = doc.pages.iter().flat_map(|p| &p.ops).any(|op| {
            matches!(op, DrawOp::Text { text, face: FontFace::Bold, .. } if text == "292")
        });
        assert!(bold_metric, "metric value 292 should be drawn bold");
    }

    #[test]
    fn test_metadata_stamp() {
        let doc = compose(&bundled(), DocumentFormat::Resume, None);
        let m = &doc.metadata;
        assert_eq!(m.title, "Artemio Santiago Padilla Robles - Resume");
        assert_eq!(m.subject, "2-page condensed resume");
        assert_eq!(m.author, "Artemio Santiago Padilla Robles");
        assert_eq!(m.creator, "cv-api");
        assert!(m.keywords.contains(&"Cloud & MLOps".to_string()));
        assert_eq!(m.keywords.last().map(String::as_str), Some("Resume"));
    }

    #[test]
    fn test_gated_section_omitted_when_page_nearly_full() {
        let record = bundled();
        let profile = FormatProfile::for_format(DocumentFormat::Full);
        let options = ComposeOptions::default();
        let mut session = RenderSession::new(&record, profile, &StandardFontMetrics, &options);

        // 40mm left: not enough for projects (50), enough for interests (30)
        let limit = session.flow.geometry().bottom_limit();
        session.flow.advance_to(limit - 40.0);
        session.run_section(Section::Projects);
        session.run_section(Section::Interests);

        assert_eq!(session.omitted, vec![Section::Projects]);
        assert!(session.sections.iter().any(|s| s.section == Section::Interests));
    }

    #[test]
    fn test_gated_section_without_data_skipped_silently() {
        let record = record_with(json!({}));
        let doc = compose(&record, DocumentFormat::Full, None);
        assert!(doc.section(Section::Projects).is_none());
        assert!(doc.omitted.is_empty());
    }

    #[test]
    fn test_full_projects_limited_to_three() {
        let record = record_with(json!({
            "projects": (0..5)
                .map(|i| json!({ "name": format!("Project {i}"), "description": "Tool" }))
                .collect::<Vec<_>>()
        }));
        let doc = compose(&record, DocumentFormat::Full, None);
        assert_eq!(doc.section(Section::Projects).map(SectionSummary::entries), Some(3));
    }
}
