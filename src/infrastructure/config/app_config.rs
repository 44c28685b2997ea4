//! Application configuration.

use std::num::{NonZeroU32, NonZeroUsize};
use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::args::CliArgs;
use crate::application::{DEFAULT_PAGE_SIZE, ImageCacheConfig};
use crate::infrastructure::http::DEFAULT_TIMEOUT;
use crate::infrastructure::picsum::DEFAULT_CATALOG_URL;

/// Log level configuration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Trace level.
    Trace,
    /// Debug level.
    Debug,
    /// Info level.
    #[default]
    Info,
    /// Warning level.
    Warn,
    /// Error level.
    Error,
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Trace => write!(f, "trace"),
            Self::Debug => write!(f, "debug"),
            Self::Info => write!(f, "info"),
            Self::Warn => write!(f, "warn"),
            Self::Error => write!(f, "error"),
        }
    }
}

/// Application configuration, read from `config.toml` and overridden by CLI flags.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Catalog endpoint settings.
    #[serde(default)]
    pub catalog: CatalogConfig,

    /// Image cache settings.
    #[serde(default)]
    pub images: ImagesConfig,

    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Catalog endpoint configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogConfig {
    /// List endpoint; `page` and `limit` are appended as query parameters.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Records requested per page. Zero falls back to the default.
    #[serde(default = "default_page_size")]
    pub page_size: u32,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            page_size: default_page_size(),
        }
    }
}

/// Image loading configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImagesConfig {
    /// Maximum images kept in memory. Unset or zero keeps everything.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cache_capacity: Option<usize>,

    /// HTTP request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub request_timeout_secs: u64,
}

impl Default for ImagesConfig {
    fn default() -> Self {
        Self {
            cache_capacity: None,
            request_timeout_secs: default_timeout_secs(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log verbosity level.
    #[serde(default)]
    pub log_level: LogLevel,

    /// Log file path. Logs go to stderr when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log_path: Option<PathBuf>,
}

fn default_base_url() -> String {
    DEFAULT_CATALOG_URL.to_string()
}

const fn default_page_size() -> u32 {
    DEFAULT_PAGE_SIZE.get()
}

const fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT.as_secs()
}

impl AppConfig {
    /// Merges CLI arguments into the configuration.
    pub fn merge_with_args(&mut self, args: &CliArgs) {
        if let Some(log_path) = &args.log_path {
            self.logging.log_path = Some(log_path.clone());
        }
        if let Some(log_level) = args.log_level {
            self.logging.log_level = log_level;
        }
        if let Some(base_url) = &args.base_url {
            self.catalog.base_url.clone_from(base_url);
        }
        if let Some(page_size) = args.page_size {
            self.catalog.page_size = page_size;
        }
        if let Some(capacity) = args.cache_capacity {
            self.images.cache_capacity = usize::try_from(capacity).ok();
        }
        if let Some(timeout) = args.timeout {
            self.images.request_timeout_secs = timeout;
        }
    }

    /// Page size as a validated value.
    #[must_use]
    pub fn page_size(&self) -> NonZeroU32 {
        NonZeroU32::new(self.catalog.page_size).unwrap_or(DEFAULT_PAGE_SIZE)
    }

    /// Image cache settings derived from `[images]`.
    #[must_use]
    pub fn image_cache_config(&self) -> ImageCacheConfig {
        ImageCacheConfig {
            capacity: self.images.cache_capacity.and_then(NonZeroUsize::new),
        }
    }

    /// HTTP request timeout. Zero falls back to the default.
    #[must_use]
    pub const fn request_timeout(&self) -> Duration {
        match self.images.request_timeout_secs {
            0 => DEFAULT_TIMEOUT,
            secs => Duration::from_secs(secs),
        }
    }

    /// Returns the log file path, if logging to a file.
    #[must_use]
    pub fn effective_log_path(&self) -> Option<PathBuf> {
        self.logging.log_path.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_partial_config() {
        let toml_content = r#"
            [catalog]
            page_size = 30

            [images]
            cache_capacity = 200

            [logging]
            log_level = "debug"
        "#;

        let config: AppConfig = toml::from_str(toml_content).expect("Failed to parse config");

        assert_eq!(config.catalog.base_url, DEFAULT_CATALOG_URL);
        assert_eq!(config.page_size().get(), 30);
        assert_eq!(config.images.cache_capacity, Some(200));
        assert_eq!(config.request_timeout(), DEFAULT_TIMEOUT);
        assert_eq!(config.logging.log_level, LogLevel::Debug);
        assert_eq!(config.effective_log_path(), None);
    }

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();

        assert_eq!(config.page_size(), DEFAULT_PAGE_SIZE);
        assert_eq!(config.image_cache_config(), ImageCacheConfig::unbounded());
        assert_eq!(config.logging.log_level, LogLevel::Info);
    }

    #[test]
    fn test_zero_values_fall_back() {
        let config: AppConfig = toml::from_str(
            r"
            [catalog]
            page_size = 0

            [images]
            cache_capacity = 0
            request_timeout_secs = 0
        ",
        )
        .unwrap();

        assert_eq!(config.page_size(), DEFAULT_PAGE_SIZE);
        assert_eq!(config.image_cache_config().capacity, None);
        assert_eq!(config.request_timeout(), DEFAULT_TIMEOUT);
    }

    #[test]
    fn test_args_override_file() {
        let mut config: AppConfig = toml::from_str(
            r#"
            [catalog]
            base_url = "http://file.example/list"
            page_size = 30
        "#,
        )
        .unwrap();

        let args = CliArgs {
            page_size: Some(10),
            cache_capacity: Some(5),
            timeout: Some(3),
            log_level: Some(LogLevel::Trace),
            log_path: Some(PathBuf::from("/tmp/photoreel.log")),
            ..CliArgs::default()
        };
        config.merge_with_args(&args);

        assert_eq!(config.catalog.base_url, "http://file.example/list");
        assert_eq!(config.page_size().get(), 10);
        assert_eq!(
            config.image_cache_config().capacity,
            NonZeroUsize::new(5)
        );
        assert_eq!(config.request_timeout(), Duration::from_secs(3));
        assert_eq!(config.logging.log_level, LogLevel::Trace);
        assert_eq!(
            config.effective_log_path(),
            Some(PathBuf::from("/tmp/photoreel.log"))
        );
    }

    #[test]
    fn test_serialized_default_parses_back() {
        let content = toml::to_string_pretty(&AppConfig::default()).unwrap();
        let parsed: AppConfig = toml::from_str(&content).unwrap();

        assert_eq!(parsed.catalog, CatalogConfig::default());
        assert_eq!(parsed.images, ImagesConfig::default());
    }
}
