//! Webrill: a recursive, politeness-aware site crawler
//!
//! Given a root URL, webrill fetches the page, extracts same-site links,
//! classifies each link against ordered pattern rules, deduplicates
//! already-visited pages, respects robots.txt, throttles outbound requests,
//! and terminates cleanly once the recursive fan-out has drained.

pub mod config;
pub mod crawler;
pub mod robots;
pub mod rules;
pub mod url;

use thiserror::Error;

/// Main error type for webrill operations
#[derive(Debug, Error)]
pub enum CrawlError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Rule error: {0}")]
    Rule(#[from] RuleError),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] ::url::ParseError),

    #[error("Invalid root URL: {0}")]
    InvalidRoot(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
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

    #[error("Invalid rule pattern: {0}")]
    InvalidPattern(String),
}

/// Rule-compilation errors
#[derive(Debug, Error)]
pub enum RuleError {
    #[error("Invalid pattern {pattern:?}: {source}")]
    InvalidPattern {
        pattern: String,
        source: regex::Error,
    },
}

/// Result type alias for webrill operations
pub type Result<T> = std::result::Result<T, CrawlError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use config::Config;
pub use crawler::{start_crawl, CrawlHandle, CrawlSummary, PageDocument};
pub use rules::{CrawlLabel, RuleSet};
pub use url::normalize;
