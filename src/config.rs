//! Configuration types for feed-mirror

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use url::Url;

/// Remote feed configuration (endpoints, HTTP client behavior)
///
/// Groups settings for talking to the feed's two well-known endpoints.
/// Used as a nested sub-config within [`Config`].
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct FeedConfig {
    /// Base URL of the feed API (default: the Hacker News v0 API)
    ///
    /// The client derives both endpoints from it: `{base}/maxitem.json`
    /// and `{base}/item/{id}.json`.
    #[serde(default = "default_base_url")]
    pub base_url: Url,

    /// User-Agent header sent with every request
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Per-request timeout in seconds (default: 30)
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            user_agent: default_user_agent(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

/// Data storage configuration
///
/// Used as a nested sub-config within [`Config`].
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PersistenceConfig {
    /// Path to the SQLite database file (default: "./feed.db")
    #[serde(default = "default_database_path")]
    pub database_path: PathBuf,
}

impl Default for PersistenceConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
        }
    }
}

/// Download behavior configuration (concurrency, failure policy)
///
/// Used as a nested sub-config within [`Config`].
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DownloadConfig {
    /// Maximum concurrent fetch-and-store units in flight (default: 3)
    ///
    /// This is the size of the permit pool; the dispatch loop blocks on
    /// permit acquisition once this many units are running.
    #[serde(default = "default_max_concurrent")]
    pub max_concurrent_fetches: usize,

    /// Treat an item fetch answered with HTTP 404/410 as skippable
    /// instead of aborting the run (default: false)
    ///
    /// The feed deletes items occasionally, so an id inside the resume
    /// range is not guaranteed to resolve. With the default policy any
    /// non-success fetch aborts the whole run.
    #[serde(default)]
    pub skip_missing_items: bool,
}

impl Default for DownloadConfig {
    fn default() -> Self {
        Self {
            max_concurrent_fetches: default_max_concurrent(),
            skip_missing_items: false,
        }
    }
}

/// Main configuration for the mirror
///
/// Fields are organized into logical sub-configs:
/// - [`feed`](FeedConfig) — remote endpoints and HTTP behavior
/// - [`persistence`](PersistenceConfig) — database location
/// - [`download`](DownloadConfig) — concurrency and failure policy
///
/// Every field has a default, so `Config::default()` mirrors the public
/// Hacker News feed into `./feed.db` with 3 workers.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Config {
    /// Remote feed settings
    #[serde(default)]
    pub feed: FeedConfig,

    /// Data storage settings
    #[serde(default)]
    pub persistence: PersistenceConfig,

    /// Download behavior settings
    #[serde(default)]
    pub download: DownloadConfig,
}

impl Config {
    /// Load configuration from a JSON file
    ///
    /// Missing fields fall back to their defaults, so a partial config
    /// file overriding only (say) `persistence.database_path` is valid.
    pub async fn load(path: &Path) -> Result<Self> {
        let raw = tokio::fs::read_to_string(path).await.map_err(|e| {
            Error::Io(std::io::Error::new(
                e.kind(),
                format!("Failed to read config file '{}': {}", path.display(), e),
            ))
        })?;

        let config: Config = serde_json::from_str(&raw)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate cross-field constraints
    pub fn validate(&self) -> Result<()> {
        if self.download.max_concurrent_fetches == 0 {
            return Err(Error::Config {
                message: "max_concurrent_fetches must be at least 1".to_string(),
                key: Some("download.max_concurrent_fetches".to_string()),
            });
        }
        if self.feed.request_timeout_secs == 0 {
            return Err(Error::Config {
                message: "request_timeout_secs must be at least 1".to_string(),
                key: Some("feed.request_timeout_secs".to_string()),
            });
        }
        Ok(())
    }
}

// Parsing a known-good literal
#[allow(clippy::unwrap_used)]
fn default_base_url() -> Url {
    Url::parse("https://hacker-news.firebaseio.com/v0/").unwrap()
}

fn default_user_agent() -> String {
    concat!("feed-mirror/", env!("CARGO_PKG_VERSION")).to_string()
}

fn default_request_timeout_secs() -> u64 {
    30
}

fn default_database_path() -> PathBuf {
    PathBuf::from("./feed.db")
}

fn default_max_concurrent() -> usize {
    3
}

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_sensible() {
        let config = Config::default();
        assert_eq!(config.download.max_concurrent_fetches, 3);
        assert!(!config.download.skip_missing_items);
        assert_eq!(config.persistence.database_path, PathBuf::from("./feed.db"));
        assert_eq!(
            config.feed.base_url.as_str(),
            "https://hacker-news.firebaseio.com/v0/"
        );
        config.validate().unwrap();
    }

    #[test]
    fn partial_json_falls_back_to_defaults() {
        let config: Config =
            serde_json::from_str(r#"{"download": {"max_concurrent_fetches": 8}}"#).unwrap();
        assert_eq!(config.download.max_concurrent_fetches, 8);
        assert_eq!(config.feed.request_timeout_secs, 30);
    }

    #[test]
    fn zero_workers_is_rejected() {
        let config: Config =
            serde_json::from_str(r#"{"download": {"max_concurrent_fetches": 0}}"#).unwrap();
        let err = config.validate().unwrap_err();
        assert!(matches!(err, Error::Config { key: Some(ref k), .. }
            if k == "download.max_concurrent_fetches"));
    }

    #[tokio::test]
    async fn load_reads_json_file() {
        let file = tempfile::NamedTempFile::new().unwrap();
        tokio::fs::write(
            file.path(),
            r#"{"persistence": {"database_path": "/tmp/mirror-test.db"}}"#,
        )
        .await
        .unwrap();

        let config = Config::load(file.path()).await.unwrap();
        assert_eq!(
            config.persistence.database_path,
            PathBuf::from("/tmp/mirror-test.db")
        );
    }
}
