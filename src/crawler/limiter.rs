//! Outbound request rate limiter
//!
//! A single-queue serializer shared by all fetchers of one crawl. Waiters
//! are released one at a time in arrival order, with at least the configured
//! interval between consecutive releases. A release is a one-shot permission
//! signal, not a lock: each request is independent and nothing has to be
//! given back. The queue is unbounded; this is pure serialization of
//! permission-to-send, not a worker pool.

use std::time::Duration;
use tokio::sync::{mpsc, oneshot};
use tokio::time::Instant;

/// FIFO rate limiter handing out one send slot per interval.
///
/// Cloning is cheap; all clones feed the same queue. The background task
/// exits once every clone has been dropped.
#[derive(Debug, Clone)]
pub struct RateLimiter {
    queue: mpsc::UnboundedSender<oneshot::Sender<()>>,
}

impl RateLimiter {
    /// Creates a limiter releasing at most one waiter per `interval`.
    pub fn new(interval: Duration) -> Self {
        let (queue, mut waiters) = mpsc::unbounded_channel::<oneshot::Sender<()>>();

        tokio::spawn(async move {
            let mut last_release: Option<Instant> = None;

            while let Some(waiter) = waiters.recv().await {
                if let Some(released_at) = last_release {
                    let elapsed = released_at.elapsed();
                    if elapsed < interval {
                        tokio::time::sleep(interval - elapsed).await;
                    }
                }

                // A waiter whose fetcher already timed out does not consume
                // an interval slot
                if waiter.send(()).is_ok() {
                    last_release = Some(Instant::now());
                }
            }
        });

        Self { queue }
    }

    /// Queues the caller and resolves once its slot is released.
    ///
    /// Returns false if the limiter task is gone, which only happens during
    /// shutdown.
    pub async fn acquire(&self) -> bool {
        let (slot, released) = oneshot::channel();
        if self.queue.send(slot).is_err() {
            return false;
        }
        released.await.is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use tokio::sync::Mutex;

    #[tokio::test]
    async fn test_first_acquire_is_immediate() {
        let limiter = RateLimiter::new(Duration::from_secs(60));
        let started = Instant::now();
        assert!(limiter.acquire().await);
        assert!(started.elapsed() < Duration::from_secs(1));
    }

    #[tokio::test]
    async fn test_gap_between_releases() {
        let interval = Duration::from_millis(50);
        let limiter = RateLimiter::new(interval);

        let mut releases = Vec::new();
        for _ in 0..3 {
            assert!(limiter.acquire().await);
            releases.push(Instant::now());
        }

        for pair in releases.windows(2) {
            assert!(
                pair[1] - pair[0] >= interval,
                "release gap {:?} shorter than interval {:?}",
                pair[1] - pair[0],
                interval
            );
        }
    }

    #[tokio::test]
    async fn test_fifo_release_order() {
        let limiter = RateLimiter::new(Duration::from_millis(20));
        let order = Arc::new(Mutex::new(Vec::new()));

        let mut handles = Vec::new();
        for id in 0..4u32 {
            let limiter = limiter.clone();
            let order = order.clone();
            handles.push(tokio::spawn(async move {
                limiter.acquire().await;
                order.lock().await.push(id);
            }));
            // Space out the enqueues so arrival order is deterministic
            tokio::time::sleep(Duration::from_millis(5)).await;
        }

        for handle in handles {
            handle.await.unwrap();
        }

        assert_eq!(*order.lock().await, vec![0, 1, 2, 3]);
    }

    #[tokio::test]
    async fn test_dropped_waiter_does_not_block_queue() {
        let limiter = RateLimiter::new(Duration::from_millis(10));

        // Enqueue a waiter and drop it before release
        let doomed = limiter.clone();
        let handle = tokio::spawn(async move {
            let _ = doomed.acquire().await;
        });
        handle.abort();
        let _ = handle.await;

        // A live waiter still gets through
        assert!(limiter.acquire().await);
    }
}
