use anyhow::{Context, Result};
use rusqlite::TransactionBehavior;

use crate::db::{
    connection::Database,
    models::{DeviceRecord, IngestRun, RunSummary},
    repositories::{
        history::replace_history_rows, ingest_runs::insert_ingest_run_row,
        summaries::upsert_summary_row,
    },
};

/// Everything one ingestion run writes for its run date.
#[derive(Debug, Clone)]
pub struct RunWrite {
    pub run_date: String,
    pub devices: Vec<DeviceRecord>,
    pub summary: RunSummary,
    pub log: IngestRun,
}

impl Database {
    /// Replace the run date's history, upsert its summary and log the run in
    /// one write-locked transaction. On any error nothing is committed and the
    /// previous rows for the date stay as they were.
    pub async fn replace_run(&self, run: RunWrite) -> Result<usize> {
        self.execute(move |conn| {
            let tx = conn
                .transaction_with_behavior(TransactionBehavior::Immediate)
                .context("failed to begin run transaction")?;

            let inserted = replace_history_rows(&tx, &run.run_date, &run.devices)?;
            upsert_summary_row(&tx, &run.summary)?;
            insert_ingest_run_row(&tx, &run.log)?;

            tx.commit()
                .with_context(|| format!("failed to commit run {}", run.run_date))?;
            Ok(inserted)
        })
        .await
    }
}
