//! Source-first record loading with a last-good-copy fallback.

use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::{debug, warn};

use crate::errors::AppError;
use crate::models::{validate_record, CvRecord};
use crate::source::RecordSource;

pub struct RecordLoader {
    source: Arc<dyn RecordSource>,
    cache: RwLock<Option<Arc<CvRecord>>>,
}

impl RecordLoader {
    pub fn new(source: Arc<dyn RecordSource>) -> Self {
        Self {
            source,
            cache: RwLock::new(None),
        }
    }

    /// Starts with `seed` as the cached copy, used until the source answers.
    pub fn with_seed(source: Arc<dyn RecordSource>, seed: CvRecord) -> Self {
        Self {
            source,
            cache: RwLock::new(Some(Arc::new(seed))),
        }
    }

    pub fn source_description(&self) -> String {
        self.source.describe()
    }

    /// Reads the source, refreshing the cache on success. On failure the
    /// cached copy is returned; with nothing cached the load fails.
    pub async fn load(&self) -> Result<Arc<CvRecord>, AppError> {
        match self.source.fetch().await {
            Ok(record) => {
                let warnings = validate_record(&record);
                debug!(
                    source = %self.source.describe(),
                    warnings = warnings.len(),
                    "loaded CV record"
                );
                let record = Arc::new(record);
                *self.cache.write().await = Some(Arc::clone(&record));
                Ok(record)
            }
            Err(e) => {
                let cached = self.cache.read().await.clone();
                match cached {
                    Some(record) => {
                        warn!(
                            source = %self.source.describe(),
                            error = %e,
                            "record source failed, using cached copy"
                        );
                        Ok(record)
                    }
                    None => Err(AppError::DataUnavailable(format!(
                        "{}: {e}",
                        self.source.describe()
                    ))),
                }
            }
        }
    }

    #[cfg(test)]
    pub async fn cached(&self) -> Option<Arc<CvRecord>> {
        self.cache.read().await.clone()
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
