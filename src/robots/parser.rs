//! Robots.txt policy wrapper
//!
//! Thin wrapper around the robotstxt crate. A policy is parsed once per
//! crawl and never refreshed during the crawl's lifetime.

use robotstxt::DefaultMatcher;

#[derive(Debug, Clone, PartialEq, Eq)]
enum PolicyMode {
    Parsed,
    AllowAll,
    DenyAll,
}

/// Parsed robots.txt rules for one site.
#[derive(Debug, Clone)]
pub struct RobotsPolicy {
    /// Raw robots.txt content; consulted only in `Parsed` mode
    content: String,
    mode: PolicyMode,
}

impl RobotsPolicy {
    /// Creates a policy from raw robots.txt content.
    pub fn from_content(content: &str) -> Self {
        Self {
            content: content.to_string(),
            mode: PolicyMode::Parsed,
        }
    }

    /// A permissive policy that allows every URL.
    ///
    /// Used when the site has no robots.txt (a 4xx response).
    pub fn allow_all() -> Self {
        Self {
            content: String::new(),
            mode: PolicyMode::AllowAll,
        }
    }

    /// A restrictive policy that denies every URL.
    ///
    /// Used when the robots.txt fetch itself fails: politeness requires
    /// failing closed when we cannot learn the site's rules.
    pub fn deny_all() -> Self {
        Self {
            content: String::new(),
            mode: PolicyMode::DenyAll,
        }
    }

    /// Checks whether `url` may be fetched by `user_agent`.
    pub fn is_allowed(&self, url: &str, user_agent: &str) -> bool {
        match self.mode {
            PolicyMode::AllowAll => true,
            PolicyMode::DenyAll => false,
            PolicyMode::Parsed => {
                if self.content.is_empty() {
                    return true;
                }
                let mut matcher = DefaultMatcher::default();
                matcher.one_agent_allowed_by_robots(&self.content, user_agent, url)
            }
        }
    }
}
