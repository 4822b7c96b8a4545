//! State module for tracking crawl progress
//!
//! # Components
//!
//! - `CrawlPhase`: The pagination driver's state machine
//! - `DomainState`: Per-domain politeness state (concurrency permits and request spacing)

mod crawl_phase;
mod domain_state;

pub use crawl_phase::CrawlPhase;
pub use domain_state::DomainState;
