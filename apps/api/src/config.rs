use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use anyhow::{Context, Result};

pub const DEFAULT_DATA_SOURCE: &str = "apps/api/data/cv-data.json";

/// Application configuration loaded from environment variables.
/// Every variable has a default; malformed values fail startup.
#[derive(Debug, Clone)]
pub struct Config {
    /// File path or `http(s)://` URL of the authoritative record.
    pub data_source: String,
    /// Local copy that seeds the cache before the first successful fetch.
    pub data_fallback: Option<PathBuf>,
    pub full_version_url: Option<String>,
    pub repair_split_words: bool,
    pub output_dir: PathBuf,
    pub fetch_timeout: Duration,
    pub port: u16,
    pub rust_log: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_source: DEFAULT_DATA_SOURCE.to_string(),
            data_fallback: None,
            full_version_url: None,
            repair_split_words: false,
            output_dir: PathBuf::from("."),
            fetch_timeout: Duration::from_secs(10),
            port: 8080,
            rust_log: "info".to_string(),
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from any key lookup; `from_env` passes the process
    /// environment.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let defaults = Config::default();
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        Ok(Config {
            data_source: var("CV_DATA_SOURCE").unwrap_or(defaults.data_source),
            data_fallback: var("CV_DATA_FALLBACK").map(PathBuf::from),
            full_version_url: var("CV_FULL_VERSION_URL"),
            repair_split_words: parse_bool(var("CV_REPAIR_SPLIT_WORDS"), "CV_REPAIR_SPLIT_WORDS")?
                .unwrap_or(defaults.repair_split_words),
            output_dir: var("CV_OUTPUT_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.output_dir),
            fetch_timeout: parse::<u64>(var("CV_FETCH_TIMEOUT_SECS"), "CV_FETCH_TIMEOUT_SECS")?
                .map(Duration::from_secs)
                .unwrap_or(defaults.fetch_timeout),
            port: parse::<u16>(var("PORT"), "PORT")?.unwrap_or(defaults.port),
            rust_log: var("RUST_LOG").unwrap_or(defaults.rust_log),
        })
    }
}

fn parse<T>(value: Option<String>, key: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    value
        .map(|v| {
            v.trim()
                .parse::<T>()
                .with_context(|| format!("{key} must be a valid number, got '{v}'"))
        })
        .transpose()
}

fn parse_bool(value: Option<String>, key: &str) -> Result<Option<bool>> {
    value
        .map(|v| match v.trim().to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => Ok(true),
            "0" | "false" | "no" | "off" => Ok(false),
            _ => Err(anyhow::anyhow!("{key} must be a boolean, got '{v}'")),
        })
        .transpose()
}
