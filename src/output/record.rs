use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Current version of the on-disk record layout
pub const RECORD_SCHEMA_VERSION: u32 = 1;

/// One extracted warning, as written to the sink
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WarningRecord {
    /// Layout version, bumped whenever a field changes meaning
    pub schema_version: u32,

    /// The detail page URL the record was extracted from
    pub url: String,

    /// Identifier derived from `url`; also the output file stem
    pub identifier: String,

    /// Page title
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    /// Warning body text; empty when the page had no body paragraphs
    pub content: String,

    /// When the page was fetched
    pub retrieved_at: DateTime<Utc>,
}

impl WarningRecord {
    pub fn new(
        url: impl Into<String>,
        identifier: impl Into<String>,
        title: Option<String>,
        content: impl Into<String>,
    ) -> Self {
        Self {
            schema_version: RECORD_SCHEMA_VERSION,
            url: url.into(),
            identifier: identifier.into(),
            title,
            content: content.into(),
            retrieved_at: Utc::now(),
        }
    }
}
