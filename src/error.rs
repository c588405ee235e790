use thiserror::Error;

/// Failures that end an ingestion run, one variant per exit status.
#[derive(Debug, Error)]
pub enum IngestError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("no spreadsheet files found in: {dirs}")]
    NoInputFiles { dirs: String },

    #[error("failed to persist run {run_date}: {cause:#}")]
    Persistence { run_date: String, cause: anyhow::Error },

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl IngestError {
    pub fn exit_code(&self) -> i32 {
        match self {
            IngestError::Config(_) => 1,
            IngestError::NoInputFiles { .. } => 2,
            IngestError::Persistence { .. } => 3,
            IngestError::Other(_) => 4,
        }
    }
}
