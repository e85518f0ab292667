use crate::rules::RuleSpec;
use serde::Deserialize;

/// Main configuration structure for webrill
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub site: SiteConfig,
    #[serde(default)]
    pub crawler: CrawlerConfig,
    #[serde(rename = "user-agent", default)]
    pub user_agent: UserAgentConfig,
    #[serde(default)]
    pub rules: RulesConfig,
}

/// The site to crawl
#[derive(Debug, Clone, Deserialize)]
pub struct SiteConfig {
    /// Root URL the crawl starts from
    pub root: String,
}

/// Crawler timing configuration
#[derive(Debug, Clone, Deserialize)]
pub struct CrawlerConfig {
    /// Minimum time between outbound requests to the site (milliseconds)
    #[serde(rename = "rate-limit-interval-ms", default = "default_rate_limit")]
    pub rate_limit_interval_ms: u64,

    /// Delay before dispatching a newly discovered link (milliseconds),
    /// letting in-flight permission checks for the same link settle
    #[serde(rename = "dispatch-delay-ms", default = "default_dispatch_delay")]
    pub dispatch_delay_ms: u64,

    /// Absolute upper bound on one fetcher's lifetime (milliseconds)
    #[serde(rename = "fetch-timeout-ms", default = "default_fetch_timeout")]
    pub fetch_timeout_ms: u64,
}

fn default_rate_limit() -> u64 {
    1000
}

fn default_dispatch_delay() -> u64 {
    500
}

fn default_fetch_timeout() -> u64 {
    600_000
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            rate_limit_interval_ms: default_rate_limit(),
            dispatch_delay_ms: default_dispatch_delay(),
            fetch_timeout_ms: default_fetch_timeout(),
        }
    }
}

/// User agent identification configuration
#[derive(Debug, Clone, Deserialize)]
pub struct UserAgentConfig {
    /// Name of the crawler
    #[serde(rename = "crawler-name", default = "default_crawler_name")]
    pub crawler_name: String,

    /// Version of the crawler
    #[serde(rename = "crawler-version", default = "default_crawler_version")]
    pub crawler_version: String,

    /// URL with information about the crawler
    #[serde(rename = "contact-url", default)]
    pub contact_url: String,

    /// Email address for crawler-related contact
    #[serde(rename = "contact-email", default)]
    pub contact_email: String,
}

fn default_crawler_name() -> String {
    "webrill".to_string()
}

fn default_crawler_version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

impl Default for UserAgentConfig {
    fn default() -> Self {
        Self {
            crawler_name: default_crawler_name(),
            crawler_version: default_crawler_version(),
            contact_url: String::new(),
            contact_email: String::new(),
        }
    }
}

impl UserAgentConfig {
    /// Formats the User-Agent header value: `name/version (+url; email)`
    pub fn header_value(&self) -> String {
        if self.contact_url.is_empty() && self.contact_email.is_empty() {
            format!("{}/{}", self.crawler_name, self.crawler_version)
        } else {
            format!(
                "{}/{} (+{}; {})",
                self.crawler_name, self.crawler_version, self.contact_url, self.contact_email
            )
        }
    }
}

/// Ordered link classification rule lists
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RulesConfig {
    /// Matched against the link target's path, in order, first match wins
    #[serde(default)]
    pub href: Vec<RuleSpec>,

    /// Matched against the anchor text, only when no href rule matched
    #[serde(default)]
    pub anchor: Vec<RuleSpec>,
}
