//! Where the CV record comes from.
//!
//! A source is read fresh for every render. [`loader::RecordLoader`] wraps a
//! source with the last good copy so a failing source degrades to stale data
//! instead of no document.

pub mod loader;

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use reqwest::Client;
use thiserror::Error;
use tracing::debug;

use crate::models::CvRecord;

pub use loader::RecordLoader;

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("{url} returned status {status}")]
    Status { url: String, status: u16 },

    #[error("record is not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Anything that can produce the authoritative record.
#[async_trait]
pub trait RecordSource: Send + Sync {
    async fn fetch(&self) -> Result<CvRecord, SourceError>;

    /// Human-readable location for logs.
    fn describe(&self) -> String;
}

/// Picks the source implementation for a configured location: `http(s)://`
/// URLs are fetched, everything else is a file path.
pub fn source_for(location: &str, timeout: Duration) -> Result<Arc<dyn RecordSource>, SourceError> {
    if is_url(location) {
        Ok(Arc::new(HttpSource::new(location, timeout)?))
    } else {
        Ok(Arc::new(FileSource::new(location)))
    }
}

fn is_url(location: &str) -> bool {
    let lower = location.trim().to_ascii_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://")
}

// ────────────────────────────────────────────────────────────────────────────
// File
// ────────────────────────────────────────────────────────────────────────────

pub struct FileSource {
    path: PathBuf,
}

impl FileSource {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }
}

#[async_trait]
impl RecordSource for FileSource {
    async fn fetch(&self) -> Result<CvRecord, SourceError> {
        let raw = tokio::fs::read_to_string(&self.path)
            .await
            .map_err(|source| SourceError::Io {
                path: self.path.clone(),
                source,
            })?;
        Ok(serde_json::from_str(&raw)?)
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}

// ────────────────────────────────────────────────────────────────────────────
// HTTP
// ────────────────────────────────────────────────────────────────────────────

pub struct HttpSource {
    client: Client,
    url: String,
}

impl HttpSource {
    pub fn new(url: &str, timeout: Duration) -> Result<Self, SourceError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            url: url.trim().to_string(),
        })
    }
}

#[async_trait]
impl RecordSource for HttpSource {
    async fn fetch(&self) -> Result<CvRecord, SourceError> {
        // Cache-busting parameter so intermediaries never serve a stale record.
        let response = self
            .client
            .get(&self.url)
            .query(&[("t", Utc::now().timestamp_millis())])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(SourceError::Status {
                url: self.url.clone(),
                status: status.as_u16(),
            });
        }

        let body = response.text().await?;
        debug!(url = %self.url, bytes = body.len(), "fetched record");
        Ok(serde_json::from_str(&body)?)
    }

    fn describe(&self) -> String {
        self.url.clone()
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const BUNDLED: &str = include_str!("../../data/cv-data.json");

    #[test]
    fn test_url_detection() {
        assert!(is_url("https://example.com/cv-data.json"));
        assert!(is_url("  HTTP://example.com/cv.json"));
        assert!(!is_url("data/cv-data.json"));
        assert!(!is_url("/srv/http/cv.json"));
    }

    #[test]
    fn test_source_for_describes_location() {
        let timeout = Duration::from_secs(1);
        let file = source_for("data/cv-data.json", timeout).expect("file source");
        assert_eq!(file.describe(), "data/cv-data.json");
        let http = source_for("https://example.com/cv.json", timeout).expect("http source");
        assert_eq!(http.describe(), "https://example.com/cv.json");
    }

    #[tokio::test]
    async fn test_file_source_reads_record() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        file.write_all(BUNDLED.as_bytes()).expect("write");

        let record = FileSource::new(file.path()).fetch().await.expect("fetch");
        assert_eq!(record.personal.name.display(), "Artemio Santiago Padilla Robles");
    }

    #[tokio::test]
    async fn test_file_source_missing_file_is_io_error() {
        let dir = tempfile::tempdir().expect("temp dir");
        let result = FileSource::new(dir.path().join("absent.json")).fetch().await;
        assert!(matches!(result, Err(SourceError::Io { .. })));
    }

    #[tokio::test]
    async fn test_file_source_rejects_malformed_json() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        file.write_all(b"{ not json").expect("write");
        let result = FileSource::new(file.path()).fetch().await;
        assert!(matches!(result, Err(SourceError::Parse(_))));
    }
}
