//! Sumi-Scope: the fetch and scope core of a focused web crawler
//!
//! This crate fetches pages with bounded retry, extracts and normalizes their
//! outbound links, keeps only the links inside a configured crawl scope, and
//! separates links already seen from new ones.

pub mod config;
pub mod crawler;
pub mod output;
pub mod state;
pub mod url;

use thiserror::Error;

/// Main error type for Sumi-Scope operations
#[derive(Debug, Error)]
pub enum CrawlError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Invalid exclude pattern: {0}")]
    Pattern(#[from] regex::Error),

    #[error("No root URLs to crawl")]
    NoRoots,
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),

    #[error("Invalid exclude pattern: {0}")]
    InvalidPattern(String),
}

/// URL-specific errors
#[derive(Debug, Error)]
pub enum UrlError {
    #[error("Failed to parse URL: {0}")]
    Parse(String),
}

// Re-export commonly used types
pub use config::Config;
pub use crawler::{difference, Coordinator, FetchReply, Fetcher, ResponseParser, SeenFilter};
pub use output::CrawlReport;
pub use state::{FetchOutcome, RetryState};
pub use url::{fix_url, CrawlScope, Link};
