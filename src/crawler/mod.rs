//! Crawler module for page fetching and crawl coordination
//!
//! This module contains the core crawling machinery:
//! - HTTP client construction and page fetching
//! - HTML link extraction
//! - The per-site rate limiter
//! - Short-lived per-page fetcher tasks
//! - The crawl coordinator that owns dedup, robots, and completion detection

mod coordinator;
mod fetcher;
mod limiter;
mod parser;

pub use coordinator::{start_crawl, CrawlHandle, CrawlSummary, PageDocument, PageRecord};
pub use limiter::RateLimiter;
pub use parser::{extract_links, ExtractedLink};

use crate::config::UserAgentConfig;
use reqwest::Client;
use std::time::Duration;

/// Result of fetching one page
#[derive(Debug)]
pub enum FetchOutcome {
    /// 2xx response with a readable body
    Success {
        /// HTTP status code
        status_code: u16,
        /// Page body content
        body: String,
    },

    /// Non-2xx HTTP status
    HttpError {
        /// The HTTP status code
        status_code: u16,
    },

    /// No usable response (connection refused, timeout, broken body)
    NetworkError {
        /// Error description
        error: String,
    },
}

/// Builds the HTTP client shared by one crawl.
///
/// The user agent follows the `name/version (+contact-url; contact-email)`
/// convention so site operators can identify and reach the crawler.
pub fn build_http_client(config: &UserAgentConfig) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(config.header_value())
        .timeout(Duration::from_secs(30))
        .connect_timeout(Duration::from_secs(10))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Performs the HTTP GET for one page.
///
/// Failures surface as a `FetchOutcome` variant, never as a panic or an
/// error crossing into the coordinator: a fetcher that cannot get a page
/// simply reports nothing and terminates.
pub async fn fetch_url(client: &Client, url: &str) -> FetchOutcome {
    match client.get(url).send().await {
        Ok(response) => {
            let status = response.status();

            if !status.is_success() {
                return FetchOutcome::HttpError {
                    status_code: status.as_u16(),
                };
            }

            match response.text().await {
                Ok(body) => FetchOutcome::Success {
                    status_code: status.as_u16(),
                    body,
                },
                Err(e) => FetchOutcome::NetworkError {
                    error: e.to_string(),
                },
            }
        }
        Err(e) => {
            let error = if e.is_timeout() {
                "Request timeout".to_string()
            } else if e.is_connect() {
                "Connection refused".to_string()
            } else {
                e.to_string()
            };
            FetchOutcome::NetworkError { error }
        }
    }
}
