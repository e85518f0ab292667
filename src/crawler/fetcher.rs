//! Per-page fetcher tasks
//!
//! A fetcher is a short-lived task that crawls exactly one page and then
//! terminates. Its life is a straight line through well-defined suspension
//! points: ask the coordinator for permission, wait for a rate-limiter slot,
//! perform the GET, parse the body, report the result. Denied permission,
//! a bad status, a transport failure, or a parse problem all end the task
//! early without a report.
//!
//! A safety timeout bounds the whole lifetime, since a fetcher can sit
//! queued behind the rate limiter for a long time on link-dense sites.
//! Whatever the exit path, the coordinator is always notified so its
//! in-flight count stays accurate.

use crate::crawler::coordinator::{CoordinatorMsg, CrawlJob};
use crate::crawler::limiter::RateLimiter;
use crate::crawler::parser::extract_links;
use crate::crawler::{fetch_url, FetchOutcome};
use reqwest::Client;
use std::time::Duration;
use tokio::sync::{mpsc, oneshot};
use url::Url;

/// Everything a fetcher task needs from its coordinator.
#[derive(Clone)]
pub(crate) struct FetcherContext {
    pub coordinator: mpsc::UnboundedSender<CoordinatorMsg>,
    pub client: Client,
    pub limiter: RateLimiter,
    pub safety_timeout: Duration,
}

/// Spawns the fetcher task for one crawl job.
///
/// The caller must have already counted this job in its in-flight total;
/// the spawned task sends exactly one `FetcherDone` on every exit path.
pub(crate) fn spawn(job: CrawlJob, ctx: FetcherContext) {
    tokio::spawn(async move {
        let outcome = tokio::time::timeout(ctx.safety_timeout, crawl_page(&job, &ctx)).await;
        if outcome.is_err() {
            tracing::warn!("Fetcher for {} hit its safety timeout, stopping", job.url);
        }
        let _ = ctx.coordinator.send(CoordinatorMsg::FetcherDone);
    });
}

async fn crawl_page(job: &CrawlJob, ctx: &FetcherContext) {
    // Requesting: claim the page with the coordinator before any work
    let (reply, granted) = oneshot::channel();
    if ctx
        .coordinator
        .send(CoordinatorMsg::Permission {
            url: job.url.clone(),
            reply,
        })
        .is_err()
    {
        return;
    }

    if !granted.await.unwrap_or(false) {
        tracing::debug!("{} already crawled or blocked by robots.txt", job.url);
        return;
    }

    // AwaitingRateSlot
    if !ctx.limiter.acquire().await {
        return;
    }

    // AwaitingResponse
    let body = match fetch_url(&ctx.client, &job.url).await {
        FetchOutcome::Success { body, .. } => body,
        FetchOutcome::HttpError { status_code } => {
            tracing::warn!("Request to {} failed with HTTP {}", job.url, status_code);
            return;
        }
        FetchOutcome::NetworkError { error } => {
            tracing::warn!("No response from {}: {}", job.url, error);
            return;
        }
    };

    // Parsing: a page we cannot interpret is dropped, never escalated
    let base = match Url::parse(&job.url) {
        Ok(base) => base,
        Err(e) => {
            tracing::warn!("Cannot parse fetched URL {}: {}", job.url, e);
            return;
        }
    };
    let links = extract_links(&body, &base);

    // Reporting
    let _ = ctx.coordinator.send(CoordinatorMsg::PageResult {
        url: job.url.clone(),
        label: job.label,
        body,
        links,
    });
}
