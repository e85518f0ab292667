//! Link classification rules
//!
//! A crawl is configured with two ordered rule lists. Each rule pairs a
//! case-insensitive regular expression with a crawl label. The href list is
//! matched against the link target's path; only if no href rule matches is
//! the anchor list matched against the link's anchor text. The first match
//! in list order wins, and a link with no match in either list is not
//! followed. Rule order is a correctness property, not an optimization.

use crate::url::match_target;
use crate::RuleError;
use regex::{Regex, RegexBuilder};
use serde::Deserialize;

/// How a followed link is crawled on the other end.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CrawlLabel {
    /// Treat the target as a new site root (re-records the crawl base URL)
    Root,
    /// Ordinary same-site page fetch
    Page,
}

impl std::fmt::Display for CrawlLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CrawlLabel::Root => write!(f, "root"),
            CrawlLabel::Page => write!(f, "page"),
        }
    }
}

/// An uncompiled rule as it appears in configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct RuleSpec {
    pub pattern: String,
    pub label: CrawlLabel,
}

/// A single compiled classification rule.
#[derive(Debug, Clone)]
struct CompiledRule {
    pattern: Regex,
    label: CrawlLabel,
}

/// Compiled rule lists for one crawl.
///
/// Patterns are compiled once here, at crawl configuration time, never
/// per-evaluation.
#[derive(Debug, Clone, Default)]
pub struct RuleSet {
    href: Vec<CompiledRule>,
    anchor: Vec<CompiledRule>,
}

impl RuleSet {
    /// Compiles rule lists, preserving list order.
    pub fn compile(href: &[RuleSpec], anchor: &[RuleSpec]) -> Result<Self, RuleError> {
        Ok(Self {
            href: compile_rules(href)?,
            anchor: compile_rules(anchor)?,
        })
    }

    /// A rule set that follows every link as an ordinary page.
    pub fn follow_all() -> Self {
        let wildcard = RuleSpec {
            pattern: ".*".to_string(),
            label: CrawlLabel::Page,
        };
        // The wildcard pattern always compiles
        Self::compile(std::slice::from_ref(&wildcard), &[]).unwrap_or_default()
    }

    /// Classifies a candidate link.
    ///
    /// `link` is the raw link target; absolute targets are reduced to their
    /// path component before matching. Returns `None` when the link should
    /// not be followed, including when an absolute target fails to parse.
    pub fn classify(&self, link: &str, anchor_text: &str) -> Option<CrawlLabel> {
        let target = match_target(link)?;

        if let Some(rule) = self.href.iter().find(|r| r.pattern.is_match(&target)) {
            return Some(rule.label);
        }

        self.anchor
            .iter()
            .find(|r| r.pattern.is_match(anchor_text))
            .map(|r| r.label)
    }

    /// Returns true if both rule lists are empty.
    pub fn is_empty(&self) -> bool {
        self.href.is_empty() && self.anchor.is_empty()
    }
}

fn compile_rules(specs: &[RuleSpec]) -> Result<Vec<CompiledRule>, RuleError> {
    specs
        .iter()
        .map(|spec| {
            let pattern = RegexBuilder::new(&spec.pattern)
                .case_insensitive(true)
                .build()
                .map_err(|source| RuleError::InvalidPattern {
                    pattern: spec.pattern.clone(),
                    source,
                })?;
            Ok(CompiledRule {
                pattern,
                label: spec.label,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spec(pattern: &str, label: CrawlLabel) -> RuleSpec {
        RuleSpec {
            pattern: pattern.to_string(),
            label,
        }
    }

    #[test]
    fn test_first_href_match_wins() {
        let rules = RuleSet::compile(
            &[
                spec("/blog/.*", CrawlLabel::Root),
                spec(".*", CrawlLabel::Page),
            ],
            &[],
        )
        .unwrap();

        assert_eq!(rules.classify("/blog/post", ""), Some(CrawlLabel::Root));
        assert_eq!(rules.classify("/about", ""), Some(CrawlLabel::Page));
    }

    #[test]
    fn test_rule_order_matters() {
        let forward = RuleSet::compile(
            &[
                spec(".*", CrawlLabel::Page),
                spec("/blog/.*", CrawlLabel::Root),
            ],
            &[],
        )
        .unwrap();

        // The wildcard shadows the later blog rule
        assert_eq!(forward.classify("/blog/post", ""), Some(CrawlLabel::Page));
    }

    #[test]
    fn test_anchor_fallback() {
        let rules = RuleSet::compile(
            &[spec("/blog/.*", CrawlLabel::Page)],
            &[spec("read more", CrawlLabel::Page)],
        )
        .unwrap();

        // No href match, anchor text "Read More" matches case-insensitively
        assert_eq!(
            rules.classify("/news/1", "Read More"),
            Some(CrawlLabel::Page)
        );
    }

    #[test]
    fn test_href_match_skips_anchor_rules() {
        let rules = RuleSet::compile(
            &[spec("/news/.*", CrawlLabel::Root)],
            &[spec("read more", CrawlLabel::Page)],
        )
        .unwrap();

        assert_eq!(
            rules.classify("/news/1", "Read More"),
            Some(CrawlLabel::Root)
        );
    }

    #[test]
    fn test_no_match_is_none() {
        let rules = RuleSet::compile(&[spec("/blog/.*", CrawlLabel::Page)], &[]).unwrap();
        assert_eq!(rules.classify("/about", "About Us"), None);
    }

    #[test]
    fn test_case_insensitive_href() {
        let rules = RuleSet::compile(&[spec("/blog/.*", CrawlLabel::Page)], &[]).unwrap();
        assert_eq!(rules.classify("/BLOG/Post", ""), Some(CrawlLabel::Page));
    }

    #[test]
    fn test_absolute_link_matches_on_path() {
        let rules = RuleSet::compile(&[spec("^/blog/", CrawlLabel::Page)], &[]).unwrap();
        assert_eq!(
            rules.classify("https://example.com/blog/post", ""),
            Some(CrawlLabel::Page)
        );
        // Host must not be visible to the pattern
        let host_rule = RuleSet::compile(&[spec("example", CrawlLabel::Page)], &[]).unwrap();
        assert_eq!(host_rule.classify("https://example.com/blog", ""), None);
    }

    #[test]
    fn test_malformed_absolute_link_not_followed() {
        let rules = RuleSet::follow_all();
        assert_eq!(rules.classify("http://", "anything"), None);
    }

    #[test]
    fn test_deterministic() {
        let rules = RuleSet::compile(
            &[spec("/a/.*", CrawlLabel::Root), spec(".*", CrawlLabel::Page)],
            &[spec("more", CrawlLabel::Page)],
        )
        .unwrap();

        for _ in 0..10 {
            assert_eq!(rules.classify("/a/x", "more"), Some(CrawlLabel::Root));
            assert_eq!(rules.classify("/b/x", "more"), Some(CrawlLabel::Page));
        }
    }

    #[test]
    fn test_follow_all() {
        let rules = RuleSet::follow_all();
        assert_eq!(rules.classify("/anything", ""), Some(CrawlLabel::Page));
        assert!(!rules.is_empty());
    }

    #[test]
    fn test_invalid_pattern_rejected() {
        let result = RuleSet::compile(&[spec("(", CrawlLabel::Page)], &[]);
        assert!(matches!(result, Err(RuleError::InvalidPattern { .. })));
    }
}
