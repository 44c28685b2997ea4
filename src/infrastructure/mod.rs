//! Infrastructure layer with external service adapters.

/// Application configuration.
pub mod config;
/// HTTP transport.
pub mod http;
/// Picsum catalog API client.
pub mod picsum;

pub use config::{AppConfig, CliArgs, ConfigError, LogLevel, StorageManager};
pub use http::ReqwestTransport;
pub use picsum::{DEFAULT_CATALOG_URL, PicsumCatalogFetcher};
