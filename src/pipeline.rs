//! One ingestion run, end to end:
//! discovery → workbook reading → canonicalization → reconciliation →
//! aggregation → persistence.

use std::path::PathBuf;

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::aggregate::{summarize, AggregationConfig};
use crate::canonical::Canonicalizer;
use crate::db::models::{IngestRun, RunSummary};
use crate::db::{Database, RunWrite};
use crate::error::IngestError;
use crate::ingest::{discover_files, read_workbooks, RawRecord};
use crate::reconcile::{merge_by_hostname, MergeResult};
use crate::settings::IngestSettings;
use crate::{log_debug, log_info};

const ENABLE_LOGS: bool = true;

#[derive(Debug, Clone)]
pub struct IngestRequest {
    pub input_dirs: Vec<PathBuf>,
    pub run_date: NaiveDate,
    /// Reference time for the activity window.
    pub as_of: DateTime<Utc>,
    pub settings: IngestSettings,
}

/// File-level counters carried into the run log.
#[derive(Debug, Clone, Default)]
pub struct SourceStats {
    pub files_found: usize,
    pub files_read: usize,
    pub skipped: Vec<PathBuf>,
    pub rows_read: usize,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RunReport {
    pub run_id: String,
    pub run_date: String,
    pub store: PathBuf,
    pub files_found: usize,
    pub files_read: usize,
    pub skipped_files: Vec<PathBuf>,
    pub rows_read: usize,
    pub devices: usize,
    pub rows_without_hostname: usize,
    pub rows_superseded: usize,
    pub summary: RunSummary,
}

pub fn format_run_date(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// Canonicalize raw rows and keep one record per hostname.
pub fn reconcile_rows<I>(rows: I, canonicalizer: &Canonicalizer) -> MergeResult
where
    I: IntoIterator<Item = RawRecord>,
{
    merge_by_hostname(
        rows.into_iter()
            .map(|row| canonicalizer.canonicalize(&row)),
    )
}

/// Validated column rules plus the workbooks a run will read.
#[derive(Debug)]
pub struct IngestPlan {
    pub canonicalizer: Canonicalizer,
    pub files: Vec<PathBuf>,
}

fn config_error(err: anyhow::Error) -> IngestError {
    IngestError::Config(format!("{err:#}"))
}

/// Check settings and compile the column rules. Touches no files.
pub fn prepare(settings: &IngestSettings) -> Result<Canonicalizer, IngestError> {
    settings.validate().map_err(config_error)?;
    Canonicalizer::new(&settings.column_aliases).map_err(config_error)
}

/// Everything that can fail before the store is opened: configuration first,
/// then discovery.
pub fn plan(request: &IngestRequest) -> Result<IngestPlan, IngestError> {
    if request.input_dirs.is_empty() {
        return Err(IngestError::Config("no input directories supplied".into()));
    }
    let canonicalizer = prepare(&request.settings)?;

    let files = discover_files(&request.input_dirs, &request.settings.extensions);
    if files.is_empty() {
        let dirs = request
            .input_dirs
            .iter()
            .map(|dir| dir.display().to_string())
            .collect::<Vec<_>>()
            .join(";");
        return Err(IngestError::NoInputFiles { dirs });
    }

    Ok(IngestPlan {
        canonicalizer,
        files,
    })
}

/// [`plan`] then [`ingest_planned`].
pub async fn ingest(db: &Database, request: &IngestRequest) -> Result<RunReport, IngestError> {
    let plan = plan(request)?;
    ingest_planned(db, request, plan).await
}

/// Read the planned workbooks and store the run.
pub async fn ingest_planned(
    db: &Database,
    request: &IngestRequest,
    plan: IngestPlan,
) -> Result<RunReport, IngestError> {
    let batch = read_workbooks(&plan.files, request.settings.parallel_reads);
    let stats = SourceStats {
        files_found: plan.files.len(),
        files_read: batch.workbooks.len(),
        skipped: batch.skipped.iter().map(|skip| skip.path.clone()).collect(),
        rows_read: batch.rows_read(),
    };

    store_run(db, request, &plan.canonicalizer, batch.into_records(), stats).await
}

/// Reconcile, summarise and persist rows that were already read. Any
/// front end that accepts uploads goes through here so the store stays
/// consistent with directory ingestion.
pub async fn ingest_rows<I>(
    db: &Database,
    request: &IngestRequest,
    rows: I,
    stats: SourceStats,
) -> Result<RunReport, IngestError>
where
    I: IntoIterator<Item = RawRecord>,
{
    let canonicalizer = prepare(&request.settings)?;
    store_run(db, request, &canonicalizer, rows, stats).await
}

async fn store_run<I>(
    db: &Database,
    request: &IngestRequest,
    canonicalizer: &Canonicalizer,
    rows: I,
    stats: SourceStats,
) -> Result<RunReport, IngestError>
where
    I: IntoIterator<Item = RawRecord>,
{
    let started_at = Utc::now();
    let run_date = format_run_date(request.run_date);

    let merged = reconcile_rows(rows, canonicalizer);
    log_info!(
        "Reconciled {} device(s) for {run_date} ({} row(s) without hostname, {} superseded)",
        merged.records.len(),
        merged.missing_hostname,
        merged.superseded
    );

    let config = AggregationConfig::new(request.as_of)
        .with_window_days(request.settings.activity_window_days);
    let summary = summarize(&run_date, &merged.records, &config).map_err(config_error)?;
    log_debug!("Summary for {run_date}: {summary:?}");

    let run_id = Uuid::new_v4().to_string();
    let devices = merged.records.len();
    let log = IngestRun {
        id: run_id.clone(),
        run_date: run_date.clone(),
        started_at,
        finished_at: Utc::now(),
        files_found: stats.files_found as u64,
        files_read: stats.files_read as u64,
        files_skipped: stats.skipped.len() as u64,
        rows_read: stats.rows_read as u64,
        devices: devices as u64,
    };

    db.replace_run(RunWrite {
        run_date: run_date.clone(),
        devices: merged.records,
        summary: summary.clone(),
        log,
    })
    .await
    .map_err(|cause| IngestError::Persistence {
        run_date: run_date.clone(),
        cause,
    })?;

    Ok(RunReport {
        run_id,
        run_date,
        store: db.path().to_path_buf(),
        files_found: stats.files_found,
        files_read: stats.files_read,
        skipped_files: stats.skipped,
        rows_read: stats.rows_read,
        devices,
        rows_without_hostname: merged.missing_hostname,
        rows_superseded: merged.superseded,
        summary,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ingest::RawValue;

    fn text(s: &str) -> RawValue {
        RawValue::Text(s.to_string())
    }

    #[test]
    fn reconcile_merges_across_sources() {
        let rows = vec![
            RawRecord::new()
                .with("Hostname", text("PC-01"))
                .with("OS", text("Windows 11")),
            RawRecord::new()
                .with("Computer", text("PC-01"))
                .with("Normalized_OS", text("Windows 11"))
                .with("Endpoint Compliance", text("Fully Compliant"))
                .with("Percent Passing", RawValue::Number(95.2)),
            RawRecord::new().with("OS", text("orphan")),
        ];

        let merged = reconcile_rows(rows, &Canonicalizer::builtin().unwrap());
        assert_eq!(merged.records.len(), 1);
        assert_eq!(merged.missing_hostname, 1);

        let pc = &merged.records[0];
        assert_eq!(pc.compliance_status.as_deref(), Some("compliant"));
        assert_eq!(pc.percent_passing, Some(95.2));
        assert_eq!(pc.os.as_deref(), Some("Windows 11"));
    }

    #[test]
    fn run_dates_are_iso_formatted() {
        let date = NaiveDate::from_ymd_opt(2025, 1, 7).unwrap();
        assert_eq!(format_run_date(date), "2025-01-07");
    }
}
