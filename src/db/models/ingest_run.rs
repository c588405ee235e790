use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Audit entry for one ingestion invocation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct IngestRun {
    pub id: String,
    pub run_date: String,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub files_found: u64,
    pub files_read: u64,
    pub files_skipped: u64,
    pub rows_read: u64,
    pub devices: u64,
}
