//! Crawler module for fetching and walking the warnings listing
//!
//! This module contains the core crawling logic, including:
//! - HTTP fetching restricted to the allowed domains
//! - Per-domain concurrency and delay limits
//! - The pagination driver that ties list pages, detail pages and the sink together

mod coordinator;
mod fetcher;
mod request;
mod scheduler;

pub use coordinator::Coordinator;
pub use fetcher::{build_http_client, FetchError, FetchedPage, Fetcher, HttpFetcher};
pub use request::{CrawlRequest, PageRole};
pub use scheduler::{DomainThrottle, ThrottlePermit};

use crate::config::Config;
use crate::output::{CrawlReport, JsonFileSink};
use crate::CrawlError;
use tokio_util::sync::CancellationToken;

/// Runs a complete crawl against the live site
///
/// This is the main entry point for starting a crawl. It will:
/// 1. Build the HTTP fetcher from the configuration
/// 2. Open the JSON output directory
/// 3. Drive the crawl until every page is resolved or `cancel` fires
///
/// # Arguments
///
/// * `config` - The validated crawler configuration
/// * `cancel` - Cancelling this token stops new requests and drains in-flight ones
///
/// # Example
///
/// ```no_run
/// use fma_warnings::config::Config;
/// use fma_warnings::crawler::crawl;
/// use tokio_util::sync::CancellationToken;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let report = crawl(Config::default(), CancellationToken::new()).await?;
/// println!("{} records written", report.records_written);
/// # Ok(())
/// # }
/// ```
pub async fn crawl(config: Config, cancel: CancellationToken) -> Result<CrawlReport, CrawlError> {
    let fetcher = HttpFetcher::from_config(&config)?;
    let sink = JsonFileSink::new(&config.output.data_directory);

    tracing::info!("Writing records to {}", sink.directory().display());

    Coordinator::new(config, fetcher, sink)
        .with_cancellation(cancel)
        .run()
        .await
}
