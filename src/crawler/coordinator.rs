//! Crawler coordinator - the pagination driver
//!
//! This module contains the main crawl loop, which:
//! - Fetches list page 1 and resolves how many list pages exist
//! - Issues the remaining list pages lazily and queues every detail link they yield
//! - Keeps at most `max-in-flight` fetches running at once
//! - Extracts each detail page and hands the record to the sink
//! - Drains in-flight requests when the run is cancelled
//!
//! HTML documents are parsed and dropped inside synchronous helpers, so no
//! parsed document is ever held across an `.await`.

use crate::config::Config;
use crate::crawler::fetcher::{FetchError, FetchedPage, Fetcher};
use crate::crawler::request::{CrawlRequest, PageRole};
use crate::extract::{
    extract_content, extract_detail_links, resolve_page_count, LinkExtraction, ListPage,
};
use crate::output::{derive_id, CrawlReport, Sink, WarningRecord};
use crate::state::CrawlPhase;
use crate::url::AllowedDomains;
use crate::{CrawlError, ExtractionError};
use futures::future::BoxFuture;
use futures::stream::{FuturesUnordered, StreamExt};
use futures::FutureExt;
use scraper::Html;
use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Instant;
use tokio_util::sync::CancellationToken;
use url::Url;

/// A fetch that has resolved, paired with the request that produced it
struct Completed {
    request: CrawlRequest,
    result: Result<FetchedPage, FetchError>,
}

/// Mutable bookkeeping for a single run
struct RunState {
    phase: CrawlPhase,
    /// Detail requests waiting for a free slot
    queue: VecDeque<CrawlRequest>,
    /// Next list page to issue; list requests are built only when dispatched
    next_list_page: u32,
    lists_unissued: u32,
    /// List pages not yet fetched, failed or dropped
    lists_outstanding: u32,
    report: CrawlReport,
    started: Instant,
}

impl RunState {
    fn new() -> Self {
        Self {
            phase: CrawlPhase::Start,
            queue: VecDeque::new(),
            next_list_page: 2,
            lists_unissued: 0,
            lists_outstanding: 0,
            report: CrawlReport::new(),
            started: Instant::now(),
        }
    }

    fn transition(&mut self, next: CrawlPhase) -> Result<(), CrawlError> {
        if !self.phase.can_transition_to(next) {
            return Err(CrawlError::InvalidTransition {
                from: self.phase,
                to: next,
            });
        }

        tracing::info!("Phase: {} -> {}", self.phase, next);
        self.phase = next;
        Ok(())
    }

    fn fail(&mut self) {
        if !self.phase.is_terminal() {
            tracing::error!("Phase: {} -> {}", self.phase, CrawlPhase::Failed);
            self.phase = CrawlPhase::Failed;
        }
    }

    /// Queues a request, or counts it as cancelled once the run is cancelled
    fn enqueue(&mut self, request: CrawlRequest) {
        if self.report.cancelled {
            self.report.requests_cancelled += 1;
        } else {
            self.queue.push_back(request);
        }
    }

    /// Takes the next list page number, if any remain to be issued
    fn take_list_page(&mut self) -> Option<u32> {
        if self.lists_unissued == 0 {
            return None;
        }

        let page = self.next_list_page;
        self.next_list_page = self.next_list_page.saturating_add(1);
        self.lists_unissued -= 1;
        Some(page)
    }

    /// Marks list pages as resolved (fetched, failed or dropped)
    fn lists_resolved(&mut self, count: u32) -> Result<(), CrawlError> {
        self.lists_outstanding = self.lists_outstanding.saturating_sub(count);

        if self.lists_outstanding == 0 && self.phase == CrawlPhase::ListPagesPending {
            self.transition(CrawlPhase::DetailPagesPending)?;
        }
        Ok(())
    }

    /// Drops every queued request and unissued list page; nothing new is issued after this
    fn cancel_pending(&mut self) -> Result<(), CrawlError> {
        if !self.report.cancelled {
            tracing::warn!(
                "Crawl cancelled, dropping {} queued requests and {} list pages, draining in-flight ones",
                self.queue.len(),
                self.lists_unissued
            );
            self.report.cancelled = true;
        }

        self.report.requests_cancelled += self.queue.len() as u64;
        self.queue.clear();

        let dropped_lists = std::mem::take(&mut self.lists_unissued);
        self.report.requests_cancelled += u64::from(dropped_lists);
        self.lists_resolved(dropped_lists)
    }

    fn record_written(&mut self) {
        self.report.records_written += 1;

        if self.report.records_written % 10 == 0 {
            let elapsed = self.started.elapsed();
            let rate = self.report.records_written as f64 / elapsed.as_secs_f64().max(f64::EPSILON);
            tracing::info!(
                "Progress: {} records written, {} queued, {:.2} records/sec",
                self.report.records_written,
                self.queue.len(),
                rate
            );
        }
    }
}

/// Main crawler coordinator structure
///
/// Generic over how pages are fetched and where records go, so the whole
/// state machine can run against an in-memory site.
pub struct Coordinator<F, S> {
    config: Arc<Config>,
    fetcher: F,
    sink: S,
    allowed: AllowedDomains,
    cancel: CancellationToken,
}

impl<F, S> Coordinator<F, S>
where
    F: Fetcher,
    S: Sink,
{
    /// Creates a new coordinator instance
    ///
    /// The configuration is expected to have passed validation.
    pub fn new(config: Config, fetcher: F, sink: S) -> Self {
        let allowed = AllowedDomains::new(&config.crawler.allowed_domains);

        Self {
            config: Arc::new(config),
            fetcher,
            sink,
            allowed,
            cancel: CancellationToken::new(),
        }
    }

    /// Replaces the coordinator's cancellation token
    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// Token that stops the run when cancelled
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Runs the crawl to completion
    ///
    /// Per-page failures are counted in the returned report. The run only
    /// fails when the number of list pages cannot be determined:
    ///
    /// * `CrawlError::FirstPage` - list page 1 could not be fetched and no
    ///   page count override is configured
    /// * `CrawlError::Extraction` - list page 1 has no usable result count, or
    ///   the count needs more than `max-pages` list pages
    pub async fn run(&self) -> Result<CrawlReport, CrawlError> {
        let mut run = RunState::new();

        if self.cancel.is_cancelled() {
            tracing::warn!("Crawl cancelled before the first request");
            run.report.cancelled = true;
            run.report.requests_cancelled = 1;
            run.report.finish();
            return Ok(run.report);
        }

        let override_pages = self.config.crawler.pages;
        let first_url = self.list_url(1)?;
        tracing::info!("Fetching first list page {}", first_url);

        let first_page = match self.fetcher.fetch(&first_url).await {
            Ok(page) => Some(page),
            Err(e) if override_pages.is_some() => {
                tracing::warn!("First list page failed, continuing with page override: {}", e);
                run.report.list_pages_failed += 1;
                run.report.record_fetch_failure(e.kind());
                None
            }
            Err(e) => {
                tracing::error!("Cannot resolve page count: {}", e);
                run.fail();
                return Err(CrawlError::FirstPage {
                    url: first_url.to_string(),
                    source: e,
                });
            }
        };

        let (pages, first_links) = match self.process_first_page(first_page.as_ref()) {
            Ok(resolved) => resolved,
            Err(e) => {
                tracing::error!("Cannot resolve page count: {}", e);
                run.fail();
                return Err(e.into());
            }
        };

        run.transition(CrawlPhase::CountResolved)?;
        run.report.pages_planned = pages;

        match override_pages {
            Some(_) => tracing::info!("Crawling {} list pages (override)", pages),
            None => tracing::info!("Crawling {} list pages", pages),
        }

        if pages == 0 {
            tracing::info!("No results listed, nothing to crawl");
            run.transition(CrawlPhase::Done)?;
            run.report.finish();
            return Ok(run.report);
        }

        run.transition(CrawlPhase::ListPagesPending)?;

        run.lists_unissued = pages - 1;
        run.lists_outstanding = pages - 1;

        if let Some(extraction) = first_links {
            run.report.list_pages_fetched += 1;
            self.enqueue_links(&mut run, 1, extraction);
        }

        if run.lists_outstanding == 0 {
            run.transition(CrawlPhase::DetailPagesPending)?;
        }

        self.drive(&mut run).await?;

        run.transition(CrawlPhase::Done)?;
        run.report.finish();

        tracing::info!(
            "Crawl completed: {} records written, {} failures in {:?}",
            run.report.records_written,
            run.report.total_failures(),
            run.started.elapsed()
        );

        Ok(run.report)
    }

    /// Pulls requests off the queue until both queue and in-flight set are empty
    async fn drive(&self, run: &mut RunState) -> Result<(), CrawlError> {
        let max_in_flight = self.config.crawler.max_in_flight.max(1);
        let mut in_flight: FuturesUnordered<BoxFuture<'_, Completed>> = FuturesUnordered::new();

        loop {
            if self.cancel.is_cancelled() {
                run.cancel_pending()?;
            }

            while in_flight.len() < max_in_flight {
                let Some(request) = self.next_request(run)? else {
                    break;
                };
                tracing::debug!("Dispatching {}", request);
                in_flight.push(self.dispatch(request));
            }

            let completed = tokio::select! {
                biased;

                _ = self.cancel.cancelled(), if !run.report.cancelled => {
                    run.cancel_pending()?;
                    continue;
                }

                next = in_flight.next() => match next {
                    Some(completed) => completed,
                    None => break,
                },
            };

            self.handle(run, completed)?;
        }

        Ok(())
    }

    /// List pages go first so detail links are discovered early
    fn next_request(&self, run: &mut RunState) -> Result<Option<CrawlRequest>, CrawlError> {
        if let Some(page) = run.take_list_page() {
            return Ok(Some(CrawlRequest::list(page, self.list_url(page)?)));
        }
        Ok(run.queue.pop_front())
    }

    fn dispatch(&self, request: CrawlRequest) -> BoxFuture<'_, Completed> {
        async move {
            let result = self.fetcher.fetch(request.url()).await;
            Completed { request, result }
        }
        .boxed()
    }

    fn handle(&self, run: &mut RunState, completed: Completed) -> Result<(), CrawlError> {
        let Completed { request, result } = completed;

        match request.role() {
            PageRole::List { page } => {
                self.handle_list_page(run, page, result);
                run.lists_resolved(1)
            }
            PageRole::Detail => {
                self.handle_detail_page(run, request.url(), result);
                Ok(())
            }
        }
    }

    /// Resolves the page count and extracts page 1's links
    ///
    /// An override skips reading the result count, but page 1's links are
    /// still used when the page was fetched.
    fn process_first_page(
        &self,
        fetched: Option<&FetchedPage>,
    ) -> Result<(u32, Option<LinkExtraction>), ExtractionError> {
        let list_page = fetched
            .map(|page| ListPage::parse(1, page.url.clone(), &page.body))
            .transpose()?;

        let pages = resolve_page_count(
            list_page.as_ref(),
            self.config.crawler.pages,
            self.config.crawler.page_size,
            self.config.crawler.max_pages,
        )?;

        let links = list_page
            .as_ref()
            .map(|page| extract_detail_links(page, &self.allowed));

        Ok((pages, links))
    }

    fn handle_list_page(&self, run: &mut RunState, page: u32, result: Result<FetchedPage, FetchError>) {
        let fetched = match result {
            Ok(fetched) => fetched,
            Err(e) => {
                tracing::warn!("List page {} failed: {}", page, e);
                run.report.list_pages_failed += 1;
                run.report.record_fetch_failure(e.kind());
                return;
            }
        };

        match ListPage::parse(page, fetched.url, &fetched.body) {
            Ok(list_page) => {
                let extraction = extract_detail_links(&list_page, &self.allowed);
                run.report.list_pages_fetched += 1;
                self.enqueue_links(run, page, extraction);
            }
            Err(e) => {
                tracing::warn!("List page {} unusable: {}", page, e);
                run.report.structural_failures += 1;
            }
        }
    }

    fn enqueue_links(&self, run: &mut RunState, page: u32, extraction: LinkExtraction) {
        if extraction.links.is_empty() {
            tracing::debug!("List page {} has no result items", page);
        }

        for rejected in &extraction.rejected {
            tracing::debug!("Rejected off-domain result link {}", rejected);
        }

        run.report.links_found += extraction.links.len() as u64;
        run.report.links_rejected += extraction.rejected.len() as u64;

        tracing::debug!(
            "List page {}: {} detail links ({} rejected)",
            page,
            extraction.links.len(),
            extraction.rejected.len()
        );

        for link in extraction.links {
            run.enqueue(CrawlRequest::detail(link));
        }
    }

    fn handle_detail_page(
        &self,
        run: &mut RunState,
        requested: &Url,
        result: Result<FetchedPage, FetchError>,
    ) {
        let fetched = match result {
            Ok(fetched) => fetched,
            Err(e) => {
                tracing::warn!("Detail page {} failed: {}", requested, e);
                run.report.detail_pages_failed += 1;
                run.report.record_fetch_failure(e.kind());
                return;
            }
        };
        run.report.detail_pages_fetched += 1;

        let extracted = {
            let document = Html::parse_document(&fetched.body);
            extract_content(&document, &fetched.url)
        };

        let content = match extracted {
            Ok(content) => content,
            Err(e) => {
                tracing::warn!("Skipping {}: {}", fetched.url, e);
                run.report.structural_failures += 1;
                return;
            }
        };

        if content.content.is_empty() {
            tracing::debug!("Empty body on {}", fetched.url);
            run.report.empty_bodies += 1;
        }

        let identifier = derive_id(fetched.url.as_str());
        let record = WarningRecord::new(
            fetched.url.as_str(),
            identifier.as_str(),
            content.title,
            content.content,
        );

        match self.sink.write(&identifier, &record) {
            Ok(path) => {
                tracing::debug!("Wrote {} to {}", identifier, path.display());
                run.record_written();
            }
            Err(e) => {
                tracing::warn!("Failed to store {}: {}", identifier, e);
                run.report.sink_failures += 1;
            }
        }
    }

    fn list_url(&self, page: u32) -> Result<Url, CrawlError> {
        Ok(Url::parse(&self.config.crawler.list_page_url(page))?)
    }
}
