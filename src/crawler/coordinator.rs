//! Crawl coordinator - the single point of truth for one crawl
//!
//! The coordinator is one task per crawl that owns everything the fetchers
//! must agree on: the visited table keyed by normalized URL, the robots
//! policy (fetched lazily exactly once per crawl), the compiled rule lists,
//! and the count of in-flight fetchers. All access goes through its message
//! channel, so the permission check-and-claim is serialized by construction
//! and two concurrent discoveries of the same link can never both win.
//!
//! Completion detection: the in-flight counter is incremented before every
//! job is dispatched and decremented when the corresponding fetcher
//! terminates, on success and failure alike. The crawl is done exactly when
//! the counter returns to zero after having been incremented at least once.

use crate::config::{Config, CrawlerConfig};
use crate::crawler::fetcher::{self, FetcherContext};
use crate::crawler::limiter::RateLimiter;
use crate::crawler::parser::ExtractedLink;
use crate::crawler::build_http_client;
use crate::robots::{fetch_robots, RobotsPolicy};
use crate::rules::{CrawlLabel, RuleSet};
use crate::url::normalize;
use crate::CrawlError;
use reqwest::Client;
use std::collections::HashMap;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use url::Url;

/// One unit of crawl work: a URL and how to treat it.
#[derive(Debug, Clone)]
pub struct CrawlJob {
    pub url: String,
    pub label: CrawlLabel,
}

/// Entry in the visited table, created the instant permission is granted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRecord {
    pub started: bool,
}

/// A successfully fetched page, streamed to the crawl requester.
#[derive(Debug, Clone)]
pub struct PageDocument {
    pub url: String,
    pub html: String,
    pub label: CrawlLabel,
}

/// What remains of a crawl after it completes: the visited table, a map of
/// everything that was discovered and claimed.
#[derive(Debug, Default)]
pub struct CrawlSummary {
    pub pages: HashMap<String, PageRecord>,
}

impl CrawlSummary {
    /// Number of pages that were granted permission during the crawl.
    pub fn visited_count(&self) -> usize {
        self.pages.len()
    }
}

/// Messages processed by the coordinator task.
#[derive(Debug)]
pub(crate) enum CoordinatorMsg {
    /// Dispatch a fetcher for a job. `counted` is true when the in-flight
    /// counter was already incremented at discovery time.
    Submit { job: CrawlJob, counted: bool },

    /// Atomic check-and-claim from a fetcher before it does any work.
    Permission {
        url: String,
        reply: tokio::sync::oneshot::Sender<bool>,
    },

    /// A fetched and parsed page with its extracted same-site links.
    PageResult {
        url: String,
        label: CrawlLabel,
        body: String,
        links: Vec<ExtractedLink>,
    },

    /// A fetcher terminated, on any path.
    FetcherDone,
}

/// Handle to a running crawl.
///
/// Pages arrive asynchronously as they are fetched; the stream ends when
/// the crawl completes. `join` waits for completion and returns the final
/// visited map.
pub struct CrawlHandle {
    pages: mpsc::UnboundedReceiver<PageDocument>,
    summary: JoinHandle<CrawlSummary>,
}

impl CrawlHandle {
    /// Receives the next fetched page; `None` means the crawl is complete.
    pub async fn next_page(&mut self) -> Option<PageDocument> {
        self.pages.recv().await
    }

    /// Waits for the crawl to drain and returns the visited table.
    pub async fn join(self) -> CrawlSummary {
        drop(self.pages);
        self.summary.await.unwrap_or_default()
    }
}

/// Starts a crawl from the configured root URL.
///
/// Must be called within a tokio runtime: the coordinator, the rate
/// limiter, and every fetcher run as spawned tasks. When no rules are
/// configured the crawl follows every same-site link as an ordinary page.
pub fn start_crawl(config: &Config) -> Result<CrawlHandle, CrawlError> {
    let root = config.site.root.clone();
    Url::parse(&root).map_err(|e| CrawlError::InvalidRoot(format!("{root:?}: {e}")))?;

    let rules = RuleSet::compile(&config.rules.href, &config.rules.anchor)?;
    let rules = if rules.is_empty() {
        RuleSet::follow_all()
    } else {
        rules
    };

    let client = build_http_client(&config.user_agent)?;
    let limiter = RateLimiter::new(Duration::from_millis(config.crawler.rate_limit_interval_ms));

    let (self_tx, rx) = mpsc::unbounded_channel();
    let (pages_tx, pages) = mpsc::unbounded_channel();

    let coordinator = Coordinator {
        rx,
        self_tx: self_tx.clone(),
        pages_tx,
        client,
        limiter,
        rules,
        user_agent: config.user_agent.crawler_name.clone(),
        timings: config.crawler.clone(),
        visited: HashMap::new(),
        robots: None,
        base_url: None,
        in_flight: 0,
        dispatched: 0,
    };

    // Seed the crawl; the receiver is alive so this cannot fail
    let _ = self_tx.send(CoordinatorMsg::Submit {
        job: CrawlJob {
            url: root,
            label: CrawlLabel::Root,
        },
        counted: false,
    });

    let summary = tokio::spawn(coordinator.run());

    Ok(CrawlHandle { pages, summary })
}

struct Coordinator {
    rx: mpsc::UnboundedReceiver<CoordinatorMsg>,
    self_tx: mpsc::UnboundedSender<CoordinatorMsg>,
    pages_tx: mpsc::UnboundedSender<PageDocument>,
    client: Client,
    limiter: RateLimiter,
    rules: RuleSet,
    /// Product token matched against robots.txt User-agent groups
    user_agent: String,
    timings: CrawlerConfig,
    /// Authoritative "have we already queued or fetched this" set; only
    /// grows during a crawl
    visited: HashMap<String, PageRecord>,
    robots: Option<RobotsPolicy>,
    base_url: Option<String>,
    in_flight: usize,
    dispatched: u64,
}

impl Coordinator {
    async fn run(mut self) -> CrawlSummary {
        while let Some(msg) = self.rx.recv().await {
            match msg {
                CoordinatorMsg::Submit { job, counted } => self.handle_submit(job, counted).await,

                CoordinatorMsg::Permission { url, reply } => {
                    let granted = self.check_and_claim(&url);
                    let _ = reply.send(granted);
                }

                CoordinatorMsg::PageResult {
                    url,
                    label,
                    body,
                    links,
                } => self.handle_page_result(url, label, body, links),

                CoordinatorMsg::FetcherDone => {
                    self.in_flight = self.in_flight.saturating_sub(1);
                    if self.in_flight == 0 && self.dispatched > 0 {
                        if let Some(base) = &self.base_url {
                            tracing::info!("Finished crawling site {}", base);
                        }
                        break;
                    }
                }
            }
        }

        CrawlSummary {
            pages: self.visited,
        }
    }

    /// Entry point for a crawl job. Root jobs trigger the one-time robots
    /// fetch and re-record the crawl's base URL.
    async fn handle_submit(&mut self, job: CrawlJob, counted: bool) {
        if !counted {
            self.in_flight += 1;
            self.dispatched += 1;
        }

        if job.label == CrawlLabel::Root {
            self.base_url = Some(job.url.clone());

            // Idempotent: only the first root for this crawl fetches. The
            // rate limiter is not involved, this is a one-time request.
            if self.robots.is_none() {
                self.robots = Some(fetch_robots(&self.client, &job.url).await);
            }
        }

        fetcher::spawn(
            job,
            FetcherContext {
                coordinator: self.self_tx.clone(),
                client: self.client.clone(),
                limiter: self.limiter.clone(),
                safety_timeout: Duration::from_millis(self.timings.fetch_timeout_ms),
            },
        );
    }

    /// The single synchronization point of the whole crawl: grants iff the
    /// normalized URL is allowed by robots and unseen, and claims it in the
    /// same step so a racing discovery of the same link is denied.
    fn check_and_claim(&mut self, url: &str) -> bool {
        let key = normalize(url);

        let allowed = match &self.robots {
            Some(policy) => policy.is_allowed(&key, &self.user_agent),
            // No root has been submitted yet; fail closed
            None => false,
        };

        let granted = allowed && !self.visited.contains_key(&key);

        if granted {
            self.visited.insert(key, PageRecord { started: true });
        }

        granted
    }

    /// Forwards the page to the crawl requester and fans out fetchers for
    /// the links worth following. The in-flight counter is incremented
    /// immediately; the dispatch itself waits out the configured delay so
    /// in-flight permission checks for the same link can settle first.
    fn handle_page_result(
        &mut self,
        url: String,
        label: CrawlLabel,
        body: String,
        links: Vec<ExtractedLink>,
    ) {
        if body.is_empty() {
            tracing::warn!("No content in {}", url);
        } else {
            let _ = self.pages_tx.send(PageDocument {
                url,
                html: body,
                label,
            });
        }

        for link in links {
            if link.url == "#" {
                continue;
            }

            let key = normalize(&link.url);
            let Some(link_label) = self.rules.classify(&key, &link.anchor_text) else {
                continue;
            };

            self.in_flight += 1;
            self.dispatched += 1;

            let job = CrawlJob {
                // The original URL is what gets fetched; the normalized
                // form is only ever a key
                url: link.url,
                label: link_label,
            };
            let tx = self.self_tx.clone();
            let delay = Duration::from_millis(self.timings.dispatch_delay_ms);

            tokio::spawn(async move {
                tokio::time::sleep(delay).await;
                let _ = tx.send(CoordinatorMsg::Submit { job, counted: true });
            });
        }
    }
}
