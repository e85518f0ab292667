//! Robots.txt fetching and policy evaluation
//!
//! The coordinator fetches `{scheme}://{host}/robots.txt` exactly once per
//! crawl, on the first root job, and keeps the parsed policy for the crawl's
//! lifetime.

mod parser;

pub use parser::RobotsPolicy;

use crate::url::robots_location;
use reqwest::Client;

/// Fetches and parses robots.txt for the site containing `root_url`.
///
/// Outcome by response class:
/// - 2xx: parse the body into a policy
/// - 4xx: the site publishes no rules, allow everything
/// - 5xx or transport failure: fail closed, deny everything
///
/// This never returns an error; a fetch problem degrades to a policy rather
/// than aborting the crawl.
pub async fn fetch_robots(client: &Client, root_url: &str) -> RobotsPolicy {
    let Some(location) = robots_location(root_url) else {
        tracing::warn!("Cannot derive robots.txt location from {root_url}, denying all");
        return RobotsPolicy::deny_all();
    };

    match client.get(&location).send().await {
        Ok(response) => {
            let status = response.status();
            if status.is_success() {
                match response.text().await {
                    Ok(body) => RobotsPolicy::from_content(&body),
                    Err(e) => {
                        tracing::warn!("Failed to read robots.txt body from {location}: {e}");
                        RobotsPolicy::deny_all()
                    }
                }
            } else if status.is_client_error() {
                tracing::debug!("No robots.txt at {location} (HTTP {status}), allowing all");
                RobotsPolicy::allow_all()
            } else {
                tracing::warn!("robots.txt fetch from {location} returned HTTP {status}, denying all");
                RobotsPolicy::deny_all()
            }
        }
        Err(e) => {
            tracing::warn!("Failed to fetch robots.txt from {location}: {e}, denying all");
            RobotsPolicy::deny_all()
        }
    }
}
