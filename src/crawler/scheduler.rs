//! Per-domain politeness for outgoing requests
//!
//! This module handles:
//! - Capping concurrent requests per domain via semaphores
//! - Spacing request starts to the same domain by a minimum delay
//!
//! The crawl driver never waits on politeness itself; the fetcher acquires a
//! [`ThrottlePermit`] before each request and holds it until the response is read.

use crate::config::CrawlerConfig;
use crate::state::DomainState;
use std::collections::HashMap;
use std::time::Duration;
use tokio::sync::{AcquireError, Mutex, OwnedSemaphorePermit};
use tokio::time::Instant;

/// Held for the duration of one request to a domain
pub struct ThrottlePermit {
    _permit: OwnedSemaphorePermit,
}

/// DomainThrottle enforces per-domain concurrency and delay limits
pub struct DomainThrottle {
    /// Per-domain state tracking
    domains: Mutex<HashMap<String, DomainState>>,

    /// Minimum time between request starts to one domain
    delay: Duration,

    /// Maximum concurrent requests to one domain
    max_concurrent: usize,
}

impl DomainThrottle {
    pub fn new(delay: Duration, max_concurrent: usize) -> Self {
        Self {
            domains: Mutex::new(HashMap::new()),
            delay,
            max_concurrent: max_concurrent.max(1),
        }
    }

    /// Creates a throttle from the crawler configuration
    pub fn from_config(config: &CrawlerConfig) -> Self {
        Self::new(
            Duration::from_millis(config.download_delay_ms),
            config.concurrent_requests_per_domain as usize,
        )
    }

    /// Waits until a request to `domain` may start
    ///
    /// This method:
    /// 1. Acquires one of the domain's concurrency permits
    /// 2. Claims the domain's next start slot
    /// 3. Sleeps until that slot arrives
    ///
    /// # Errors
    ///
    /// Returns `AcquireError` only if the domain's semaphore was closed.
    pub async fn acquire(&self, domain: &str) -> Result<ThrottlePermit, AcquireError> {
        let permits = {
            let mut domains = self.domains.lock().await;
            domains
                .entry(domain.to_string())
                .or_insert_with(|| DomainState::new(self.max_concurrent))
                .permits
                .clone()
        };

        let permit = permits.acquire_owned().await?;

        let wait = {
            let mut domains = self.domains.lock().await;
            domains
                .entry(domain.to_string())
                .or_insert_with(|| DomainState::new(self.max_concurrent))
                .reserve_slot(Instant::now(), self.delay)
        };

        if !wait.is_zero() {
            tracing::trace!("Waiting {:?} before next request to {}", wait, domain);
            tokio::time::sleep(wait).await;
        }

        Ok(ThrottlePermit { _permit: permit })
    }

    /// Number of requests started against a domain so far
    pub async fn request_count(&self, domain: &str) -> u64 {
        self.domains
            .lock()
            .await
            .get(domain)
            .map(|state| state.request_count)
            .unwrap_or(0)
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    pub fn max_concurrent(&self) -> usize {
        self.max_concurrent
    }
}
