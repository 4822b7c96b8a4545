//! Run statistics
//!
//! Every request outcome lands in exactly one counter here, so a finished
//! run can be judged without reading the log.

use chrono::{DateTime, Utc};
use std::collections::BTreeMap;

/// Counters collected over one crawl run
#[derive(Debug, Clone)]
pub struct CrawlReport {
    /// When the run started
    pub started_at: DateTime<Utc>,

    /// When the run finished (set by `finish`)
    pub finished_at: Option<DateTime<Utc>>,

    /// Number of list pages the run set out to visit
    pub pages_planned: u32,

    /// List pages fetched and link-extracted
    pub list_pages_fetched: u64,

    /// List pages that could not be fetched
    pub list_pages_failed: u64,

    /// Detail links found on list pages (allowed domains only)
    pub links_found: u64,

    /// Result links dropped because they left the allowed domains
    pub links_rejected: u64,

    /// Detail pages fetched successfully
    pub detail_pages_fetched: u64,

    /// Detail pages that could not be fetched
    pub detail_pages_failed: u64,

    /// Detail pages without the expected content container
    pub structural_failures: u64,

    /// Records written with an empty body
    pub empty_bodies: u64,

    /// Records handed to the sink successfully
    pub records_written: u64,

    /// Records the sink failed to store
    pub sink_failures: u64,

    /// Queued requests dropped because the run was cancelled
    pub requests_cancelled: u64,

    /// Whether the run was cancelled before the queue drained
    pub cancelled: bool,

    /// Fetch failures keyed by failure kind
    pub fetch_failures: BTreeMap<&'static str, u64>,
}

impl Default for CrawlReport {
    fn default() -> Self {
        Self::new()
    }
}

impl CrawlReport {
    /// Creates an empty report stamped with the current time
    pub fn new() -> Self {
        Self {
            started_at: Utc::now(),
            finished_at: None,
            pages_planned: 0,
            list_pages_fetched: 0,
            list_pages_failed: 0,
            links_found: 0,
            links_rejected: 0,
            detail_pages_fetched: 0,
            detail_pages_failed: 0,
            structural_failures: 0,
            empty_bodies: 0,
            records_written: 0,
            sink_failures: 0,
            requests_cancelled: 0,
            cancelled: false,
            fetch_failures: BTreeMap::new(),
        }
    }

    /// Counts one fetch failure of the given kind
    pub fn record_fetch_failure(&mut self, kind: &'static str) {
        *self.fetch_failures.entry(kind).or_insert(0) += 1;
    }

    /// Marks the report as finished
    pub fn finish(&mut self) {
        self.finished_at = Some(Utc::now());
    }

    /// Run duration in seconds, once finished
    pub fn duration_seconds(&self) -> Option<i64> {
        self.finished_at
            .map(|finished| (finished - self.started_at).num_seconds())
    }

    /// Total number of non-fatal failures of any kind
    pub fn total_failures(&self) -> u64 {
        self.list_pages_failed
            + self.detail_pages_failed
            + self.structural_failures
            + self.sink_failures
    }

    /// Percentage of attempted detail pages that produced a written record
    pub fn success_rate(&self) -> f64 {
        let attempted = self.detail_pages_fetched + self.detail_pages_failed;
        if attempted == 0 {
            return 0.0;
        }
        (self.records_written as f64 / attempted as f64) * 100.0
    }
}

/// Prints a report to stdout in a formatted manner
pub fn print_report(report: &CrawlReport) {
    println!("=== Crawl Report ===\n");

    println!("List pages:");
    println!("  Planned: {}", report.pages_planned);
    println!("  Fetched: {}", report.list_pages_fetched);
    println!("  Failed: {}", report.list_pages_failed);
    println!();

    println!("Detail links:");
    println!("  Found: {}", report.links_found);
    println!("  Rejected (outside allowed domains): {}", report.links_rejected);
    println!();

    println!("Detail pages:");
    println!("  Fetched: {}", report.detail_pages_fetched);
    println!("  Failed: {}", report.detail_pages_failed);
    println!("  Template mismatch: {}", report.structural_failures);
    println!("  Empty bodies: {}", report.empty_bodies);
    println!();

    println!("Records:");
    println!("  Written: {}", report.records_written);
    println!("  Sink failures: {}", report.sink_failures);
    println!();

    if !report.fetch_failures.is_empty() {
        println!("Fetch Failures:");
        for (kind, count) in &report.fetch_failures {
            println!("  {}: {}", kind, count);
        }
        println!();
    }

    if report.cancelled {
        println!(
            "Run cancelled: {} queued requests were not issued",
            report.requests_cancelled
        );
    }

    if let Some(seconds) = report.duration_seconds() {
        println!("Duration: {} seconds", seconds);
    }

    println!(
        "Success Rate: {:.1}% ({} records / {} detail pages attempted)",
        report.success_rate(),
        report.records_written,
        report.detail_pages_fetched + report.detail_pages_failed
    );
}
