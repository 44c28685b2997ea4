use super::app_config::LogLevel;
use clap::Parser;
use std::path::PathBuf;

/// Command line arguments.
#[derive(Debug, Default, Parser)]
#[command(
    name = "photoreel",
    version,
    about = "Browse a paginated photo catalog from the terminal",
    long_about = None
)]
pub struct CliArgs {
    /// Configuration file path.
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Log file path.
    #[arg(long, value_name = "PATH")]
    pub log_path: Option<PathBuf>,

    /// Log verbosity level.
    #[arg(long, value_enum)]
    pub log_level: Option<LogLevel>,

    /// Catalog list endpoint.
    #[arg(long, value_name = "URL", env = "PHOTOREEL_BASE_URL")]
    pub base_url: Option<String>,

    /// Records requested per page.
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..))]
    pub page_size: Option<u32>,

    /// Maximum images kept in memory (unbounded if unset).
    #[arg(long, value_parser = clap::value_parser!(u64).range(1..))]
    pub cache_capacity: Option<u64>,

    /// Request timeout in seconds.
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<u64>,

    /// Number of pages to load.
    #[arg(short, long, default_value_t = 1)]
    pub pages: u32,

    /// Filter the loaded catalog by author or id.
    #[arg(short, long)]
    pub search: Option<String>,

    /// Download every listed image and report its dimensions.
    #[arg(long)]
    pub fetch_images: bool,
}
