//! One-JSON-file-per-warning sink

use crate::output::record::WarningRecord;
use crate::output::traits::{Sink, SinkError, SinkResult};
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

/// File extension of written records
pub const RECORD_EXTENSION: &str = "json";

/// Writes each record as `<directory>/<identifier>.json`
///
/// The directory is created on first write if it does not exist. Writing an
/// identifier that already exists replaces the previous file.
#[derive(Debug, Clone)]
pub struct JsonFileSink {
    directory: PathBuf,
}

impl JsonFileSink {
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        Self {
            directory: directory.into(),
        }
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    /// The path a given identifier is written to
    pub fn path_for(&self, identifier: &str) -> PathBuf {
        self.directory
            .join(format!("{}.{}", identifier, RECORD_EXTENSION))
    }
}

impl Sink for JsonFileSink {
    fn write(&self, identifier: &str, record: &WarningRecord) -> SinkResult<PathBuf> {
        fs::create_dir_all(&self.directory).map_err(|source| SinkError::Io {
            path: self.directory.clone(),
            source,
        })?;

        let path = self.path_for(identifier);
        let io_err = |source| SinkError::Io {
            path: path.clone(),
            source,
        };

        let file = File::create(&path).map_err(io_err)?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer_pretty(&mut writer, record).map_err(|source| {
            SinkError::Serialize {
                identifier: identifier.to_string(),
                source,
            }
        })?;
        writer.flush().map_err(io_err)?;

        tracing::debug!("Wrote {}", path.display());
        Ok(path)
    }
}
