//! Sink trait and error types
//!
//! A sink durably stores one extracted record per identifier. The crawl
//! driver hands each record over once and never reads it back.

use crate::output::record::WarningRecord;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while writing a record
#[derive(Debug, Error)]
pub enum SinkError {
    #[error("IO error writing {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to serialize record {identifier}: {source}")]
    Serialize {
        identifier: String,
        source: serde_json::Error,
    },
}

/// Result type for sink operations
pub type SinkResult<T> = Result<T, SinkError>;

/// Durable destination for extracted warnings
///
/// Implementations must create their storage location when it is missing
/// and must accept duplicate identifiers (overwriting is fine).
/// Implementations must be thread-safe.
pub trait Sink: Send + Sync {
    /// Writes one record under the given identifier
    ///
    /// # Returns
    ///
    /// The location the record was written to
    fn write(&self, identifier: &str, record: &WarningRecord) -> SinkResult<PathBuf>;
}

impl<S: Sink + ?Sized> Sink for std::sync::Arc<S> {
    fn write(&self, identifier: &str, record: &WarningRecord) -> SinkResult<PathBuf> {
        (**self).write(identifier, record)
    }
}
