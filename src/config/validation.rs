//! Configuration validation
//!
//! Checks semantic constraints after TOML parsing: the root URL must be a
//! valid http(s) URL, timings must be sane, and every rule pattern must
//! compile so a malformed regex is rejected before the crawl starts.

use crate::config::types::Config;
use crate::rules::RuleSpec;
use crate::ConfigError;
use regex::RegexBuilder;
use url::Url;

/// Validates a parsed configuration.
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_root(&config.site.root)?;

    if config.crawler.fetch_timeout_ms == 0 {
        return Err(ConfigError::Validation(
            "fetch-timeout-ms must be greater than zero".to_string(),
        ));
    }

    validate_patterns(&config.rules.href)?;
    validate_patterns(&config.rules.anchor)?;

    Ok(())
}

fn validate_root(root: &str) -> Result<(), ConfigError> {
    let url = Url::parse(root)
        .map_err(|e| ConfigError::InvalidUrl(format!("site.root {root:?}: {e}")))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(ConfigError::InvalidUrl(format!(
            "site.root must be http or https, got {}",
            url.scheme()
        )));
    }

    if url.host_str().is_none() {
        return Err(ConfigError::InvalidUrl(format!(
            "site.root {root:?} has no host"
        )));
    }

    Ok(())
}

fn validate_patterns(specs: &[RuleSpec]) -> Result<(), ConfigError> {
    for spec in specs {
        RegexBuilder::new(&spec.pattern)
            .case_insensitive(true)
            .build()
            .map_err(|e| ConfigError::InvalidPattern(format!("{:?}: {e}", spec.pattern)))?;
    }
    Ok(())
}
