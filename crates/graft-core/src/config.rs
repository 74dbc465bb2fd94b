//! Configuration model for a migration run.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use crate::default_folder::DefaultFolder;
use crate::error::{GraftError, Result};

pub const DEFAULT_CONCURRENCY: usize = 4;
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_PAGE_SIZE: usize = 1000;
/// Largest `limit` Grafana's search endpoint honours.
pub const MAX_PAGE_SIZE: usize = 5000;
pub const DEFAULT_IMPORT_MESSAGE: &str = "Migrated from source Grafana";

/// Root of `config.toml`.
#[derive(Deserialize, Serialize, Debug, Clone, Default, PartialEq)]
pub struct GraftConfig {
    #[serde(default)]
    pub source: EndpointConfig,
    #[serde(default)]
    pub target: EndpointConfig,
    #[serde(default)]
    pub migration: MigrationSettings,
    #[serde(default)]
    pub default_folder: DefaultFolder,
}

impl GraftConfig {
    /// Checks everything a run needs before any request is sent.
    pub fn validate(&self) -> Result<()> {
        self.source.validate("source")?;
        self.target.validate("target")?;
        self.migration.validate()
    }

    /// Like [`validate`](Self::validate) for read-only commands that never
    /// touch the target.
    pub fn validate_source(&self) -> Result<()> {
        self.source.validate("source")?;
        self.migration.validate()
    }
}

/// Base URL and credential of one Grafana instance.
#[derive(Deserialize, Serialize, Clone, Default, PartialEq, Eq)]
pub struct EndpointConfig {
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub api_key: String,
}

impl EndpointConfig {
    pub fn new(url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            api_key: api_key.into(),
        }
    }

    fn validate(&self, role: &str) -> Result<()> {
        let url = self.url.trim();
        if url.is_empty() {
            return Err(GraftError::config(format!("{role}.url is not set")));
        }
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(GraftError::config(format!(
                "{role}.url must start with http:// or https://, got '{url}'"
            )));
        }
        if self.api_key.trim().is_empty() {
            return Err(GraftError::config(format!("{role}.api_key is not set")));
        }
        Ok(())
    }
}

// API keys must never reach logs.
impl fmt::Debug for EndpointConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EndpointConfig")
            .field("url", &self.url)
            .field("api_key", &"<redacted>")
            .finish()
    }
}

/// Knobs for the migration pipeline.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct MigrationSettings {
    /// Maximum number of requests in flight within a phase.
    pub concurrency: usize,
    pub request_timeout_secs: u64,
    /// Page size for folder listing and dashboard search.
    pub page_size: usize,
    /// Commit message attached to every dashboard import.
    pub import_message: String,
    /// Directory receiving one JSON file per exported dashboard.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub export_dir: Option<PathBuf>,
    pub retry: RetrySettings,
}

impl Default for MigrationSettings {
    fn default() -> Self {
        Self {
            concurrency: DEFAULT_CONCURRENCY,
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            page_size: DEFAULT_PAGE_SIZE,
            import_message: DEFAULT_IMPORT_MESSAGE.to_string(),
            export_dir: None,
            retry: RetrySettings::default(),
        }
    }
}

impl MigrationSettings {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    fn validate(&self) -> Result<()> {
        if self.concurrency == 0 {
            return Err(GraftError::config("migration.concurrency must be at least 1"));
        }
        if self.request_timeout_secs == 0 {
            return Err(GraftError::config(
                "migration.request_timeout_secs must be at least 1",
            ));
        }
        if self.page_size == 0 {
            return Err(GraftError::config("migration.page_size must be at least 1"));
        }
        if self.page_size > MAX_PAGE_SIZE {
            return Err(GraftError::config(format!(
                "migration.page_size must be at most {MAX_PAGE_SIZE}"
            )));
        }
        Ok(())
    }
}

/// Retry policy for transient HTTP failures.
#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(default)]
pub struct RetrySettings {
    pub max_retries: u32,
    pub initial_backoff_ms: u64,
}

impl Default for RetrySettings {
    fn default() -> Self {
        Self {
            max_retries: 2,
            initial_backoff_ms: 250,
        }
    }
}

impl RetrySettings {
    /// Delay before retry number `attempt` (1-based): doubles every attempt.
    pub fn backoff(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1).min(16);
        Duration::from_millis(self.initial_backoff_ms.saturating_mul(1u64 << exponent))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_config() -> GraftConfig {
        GraftConfig {
            source: EndpointConfig::new("http://source-grafana:3000", "src-key"),
            target: EndpointConfig::new("https://target-grafana:3000", "dst-key"),
            ..GraftConfig::default()
        }
    }

    #[test]
    fn test_defaults() {
        let settings = MigrationSettings::default();
        assert_eq!(settings.concurrency, 4);
        assert_eq!(settings.import_message, "Migrated from source Grafana");
        assert_eq!(settings.request_timeout(), Duration::from_secs(30));
        assert!(settings.export_dir.is_none());
    }

    #[test]
    fn test_validate_accepts_complete_config() {
        assert!(valid_config().validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_missing_key() {
        let mut config = valid_config();
        config.target.api_key = "  ".to_string();
        let err = config.validate().unwrap_err();
        assert!(err.is_config());
        assert!(err.to_string().contains("target.api_key"));
    }

    #[test]
    fn test_validate_source_ignores_target() {
        let config = GraftConfig {
            source: EndpointConfig::new("http://source-grafana:3000", "src-key"),
            ..GraftConfig::default()
        };
        assert!(config.validate_source().is_ok());
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_bad_scheme_and_zero_concurrency() {
        let mut config = valid_config();
        config.source.url = "source-grafana:3000".to_string();
        assert!(config.validate().unwrap_err().to_string().contains("source.url"));

        let mut config = valid_config();
        config.migration.concurrency = 0;
        assert!(config.validate().unwrap_err().to_string().contains("concurrency"));
    }

    #[test]
    fn test_validate_caps_page_size() {
        let mut config = valid_config();
        config.migration.page_size = MAX_PAGE_SIZE;
        assert!(config.validate().is_ok());

        config.migration.page_size = MAX_PAGE_SIZE + 1;
        let err = config.validate().unwrap_err();
        assert!(err.is_config());
        assert!(err.to_string().contains("page_size must be at most 5000"));
    }

    #[test]
    fn test_debug_redacts_api_key() {
        let endpoint = EndpointConfig::new("http://grafana", "super-secret");
        let printed = format!("{:?}", endpoint);
        assert!(!printed.contains("super-secret"));
        assert!(printed.contains("<redacted>"));
    }

    #[test]
    fn test_backoff_doubles() {
        let retry = RetrySettings {
            max_retries: 3,
            initial_backoff_ms: 100,
        };
        assert_eq!(retry.backoff(1), Duration::from_millis(100));
        assert_eq!(retry.backoff(2), Duration::from_millis(200));
        assert_eq!(retry.backoff(3), Duration::from_millis(400));
    }

    #[test]
    fn test_parse_from_toml() {
        let config: GraftConfig = toml::from_str(
            r#"
            [source]
            url = "http://source-grafana:3000"
            api_key = "a"

            [target]
            url = "http://target-grafana:3000"
            api_key = "b"

            [migration]
            concurrency = 8
            export_dir = "exported_dashboards"

            [migration.retry]
            max_retries = 0

            [default_folder]
            title = "Allgemein"
            "#,
        )
        .unwrap();

        assert_eq!(config.migration.concurrency, 8);
        assert_eq!(config.migration.page_size, DEFAULT_PAGE_SIZE);
        assert_eq!(config.migration.retry.max_retries, 0);
        assert_eq!(config.migration.retry.initial_backoff_ms, 250);
        assert_eq!(config.default_folder.title, "Allgemein");
        assert_eq!(config.default_folder.target_id.0, 0);
        assert!(config.validate().is_ok());
    }
}
