//! The export operation: record in, named PDF out.

pub mod handlers;

use std::path::{Path, PathBuf};
use std::time::Instant;

use serde::Serialize;
use tracing::info;
use unicode_normalization::UnicodeNormalization;

use crate::errors::AppError;
use crate::layout::{ComposeOptions, DocumentComposer, DocumentFormat, StandardFontMetrics};
use crate::models::cv::PersonName;
use crate::models::CvRecord;
use crate::render::{write_pdf, RenderError};
use crate::source::RecordLoader;

#[derive(Debug, Clone)]
pub struct ExportedDocument {
    pub format: DocumentFormat,
    pub filename: String,
    pub bytes: Vec<u8>,
    pub page_count: usize,
}

impl ExportedDocument {
    /// Writes the PDF into `dir` (created if missing) and returns its path.
    pub async fn save_in(&self, dir: &Path) -> std::io::Result<PathBuf> {
        tokio::fs::create_dir_all(dir).await?;
        let path = dir.join(&self.filename);
        tokio::fs::write(&path, &self.bytes).await?;
        Ok(path)
    }
}

/// Loads the current record and renders it in `format`. Layout and PDF
/// serialisation are CPU-bound and run on the blocking pool.
pub async fn generate_document(
    loader: &RecordLoader,
    format: DocumentFormat,
    options: ComposeOptions,
) -> Result<ExportedDocument, AppError> {
    let record = loader.load().await?;
    let started = Instant::now();

    let exported = tokio::task::spawn_blocking(move || render_document(&record, format, &options))
        .await
        .map_err(|e| AppError::Internal(anyhow::anyhow!("render task failed: {e}")))??;

    info!(
        format = %exported.format,
        pages = exported.page_count,
        bytes = exported.bytes.len(),
        elapsed_ms = started.elapsed().as_millis() as u64,
        "generated {}",
        exported.filename
    );
    Ok(exported)
}

/// Synchronous core of [`generate_document`].
pub fn render_document(
    record: &CvRecord,
    format: DocumentFormat,
    options: &ComposeOptions,
) -> Result<ExportedDocument, RenderError> {
    let composer = DocumentComposer::new(&StandardFontMetrics, options.clone());
    let document = composer.compose(record, format);
    let bytes = write_pdf(&document)?;
    Ok(ExportedDocument {
        format: document.format,
        filename: document_filename(&record.personal.name, document.format),
        page_count: document.page_count(),
        bytes,
    })
}

/// `<FirstName>_<LastName>_<Label>.pdf`, reduced to ASCII.
pub fn document_filename(name: &PersonName, format: DocumentFormat) -> String {
    let parts: Vec<String> = [name.first_token(), name.last_token(), format.label()]
        .into_iter()
        .map(ascii_token)
        .filter(|part| !part.is_empty())
        .collect();
    format!("{}.pdf", parts.join("_"))
}

fn ascii_token(raw: &str) -> String {
    raw.nfd()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '-')
        .collect()
}

// ────────────────────────────────────────────────────────────────────────────
// Format catalogue
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize)]
pub struct FormatInfo {
    pub format: DocumentFormat,
    pub label: &'static str,
    pub description: String,
}

/// The three formats, with descriptions taken from the record's template
/// options when it carries them.
pub fn format_catalog(record: Option<&CvRecord>) -> Vec<FormatInfo> {
    DocumentFormat::ALL
        .into_iter()
        .map(|format| {
            let description = record
                .and_then(|r| r.metadata.template_options.formats.get(format.keyword()))
                .filter(|d| !d.trim().is_empty())
                .cloned()
                .unwrap_or_else(|| format.description().to_string());
            FormatInfo {
                format,
                label: format.label(),
                description,
            }
        })
        .collect()
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
