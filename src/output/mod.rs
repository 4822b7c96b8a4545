//! Output module for extracted warnings
//!
//! This module handles:
//! - The warning record type and its JSON layout
//! - Deriving file-safe identifiers from warning URLs
//! - Writing records through a sink
//! - Recording run statistics

mod json_file;
mod naming;
mod record;
pub mod stats;
mod traits;

pub use json_file::{JsonFileSink, RECORD_EXTENSION};
pub use naming::{derive_id, ID_PREFIX, ID_SUFFIX_LEN};
pub use record::{WarningRecord, RECORD_SCHEMA_VERSION};
pub use stats::{print_report, CrawlReport};
pub use traits::{Sink, SinkError, SinkResult};
