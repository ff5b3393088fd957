use std::sync::Arc;

use crate::config::Config;
use crate::layout::{ComposeOptions, SanitizeOptions};
use crate::source::RecordLoader;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    /// Record source plus the last good copy. Shared by every request.
    pub loader: Arc<RecordLoader>,
}

impl AppState {
    pub fn new(config: Config, loader: RecordLoader) -> Self {
        Self {
            config,
            loader: Arc::new(loader),
        }
    }

    pub fn compose_options(&self) -> ComposeOptions {
        compose_options(&self.config)
    }
}

pub fn compose_options(config: &Config) -> ComposeOptions {
    ComposeOptions {
        full_version_url: config.full_version_url.clone(),
        sanitize: SanitizeOptions {
            repair_split_words: config.repair_split_words,
        },
    }
}
