//! Configuration file handling
//!
//! Settings live in `~/.config/course-seat-monitor/config.json`. Every field
//! has a default so a missing file yields a working configuration. The
//! catalog URL template carries `{year}`/`{term}` placeholders that are
//! resolved exactly once at startup; the resolved base URL is handed to the
//! catalog client as an immutable value.

use crate::notify::{NotifyConfig, WebhookConfig};
use crate::poller::PollerConfig;
use crate::watch::WatchStore;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Schedule URL template with `{year}` and `{term}` placeholders
    pub catalog_url_template: String,
    pub year: String,
    pub term: String,
    /// Maximum concurrent watches per user
    pub course_limit: usize,
    pub poll_interval_secs: u64,
    pub fetch_delay_secs: u64,
    pub error_backoff_secs: u64,
    pub fetch_timeout_secs: u64,
    pub urgent_repeats: u32,
    pub urgent_delay_secs: u64,
    /// Watch store location override
    pub store_path: Option<PathBuf>,
    /// Webhook gateway; console output is used when absent
    pub webhook: Option<WebhookConfig>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            catalog_url_template:
                "https://courses.illinois.edu/cisapp/explorer/schedule/{year}/{term}".to_string(),
            year: "2026".to_string(),
            term: "fall".to_string(),
            course_limit: 3,
            poll_interval_secs: 5 * 60,
            fetch_delay_secs: 1,
            error_backoff_secs: 30,
            fetch_timeout_secs: 10,
            urgent_repeats: 5,
            urgent_delay_secs: 1,
            store_path: None,
            webhook: None,
        }
    }
}

impl Config {
    pub fn default_path() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".config")
            .join("course-seat-monitor")
            .join("config.json")
    }

    /// Load from the given path, or the default location. Missing file means
    /// defaults; a present-but-invalid file is an error.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = path
            .map(Path::to_path_buf)
            .unwrap_or_else(Self::default_path);

        if !path.exists() {
            debug!(path = %path.display(), "No config file, using defaults");
            return Ok(Self::default());
        }

        let content = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config {}", path.display()))
    }

    /// Substitute `{year}`/`{term}` into the schedule base URL
    pub fn resolve_base_url(&self) -> String {
        self.catalog_url_template
            .replace("{year}", &self.year)
            .replace("{term}", &self.term)
    }

    pub fn store_path(&self) -> PathBuf {
        self.store_path
            .clone()
            .unwrap_or_else(WatchStore::default_path)
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs)
    }

    pub fn poller_config(&self) -> PollerConfig {
        PollerConfig {
            poll_interval: Duration::from_secs(self.poll_interval_secs),
            fetch_delay: Duration::from_secs(self.fetch_delay_secs),
            error_backoff: Duration::from_secs(self.error_backoff_secs),
        }
    }

    pub fn notify_config(&self) -> NotifyConfig {
        NotifyConfig {
            urgent_repeats: self.urgent_repeats,
            urgent_delay: Duration::from_secs(self.urgent_delay_secs),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.course_limit, 3);
        assert_eq!(config.urgent_repeats, 5);
        assert_eq!(config.poll_interval_secs, 300);
        assert!(config.webhook.is_none());
    }

    #[test]
    fn test_resolve_base_url() {
        let config = Config {
            year: "2026".to_string(),
            term: "spring".to_string(),
            ..Config::default()
        };
        assert_eq!(
            config.resolve_base_url(),
            "https://courses.illinois.edu/cisapp/explorer/schedule/2026/spring"
        );
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, r#"{"course_limit": 10, "term": "spring"}"#).unwrap();

        let config = Config::load(Some(&path)).unwrap();
        assert_eq!(config.course_limit, 10);
        assert_eq!(config.term, "spring");
        assert_eq!(config.urgent_repeats, 5);
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load(Some(&dir.path().join("nope.json"))).unwrap();
        assert_eq!(config.course_limit, 3);
    }

    #[test]
    fn test_invalid_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, "{bad").unwrap();
        assert!(Config::load(Some(&path)).is_err());
    }
}
