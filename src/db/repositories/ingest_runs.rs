use anyhow::{Context, Result};
use rusqlite::{params, Row, Transaction};

use crate::db::{
    connection::Database,
    helpers::{format_datetime, parse_datetime, to_i64, to_u64},
    models::IngestRun,
};

fn row_to_ingest_run(row: &Row) -> Result<IngestRun> {
    let started_at: String = row.get("started_at")?;
    let finished_at: String = row.get("finished_at")?;

    Ok(IngestRun {
        id: row.get("id")?,
        run_date: row.get("run_date")?,
        started_at: parse_datetime(&started_at, "started_at")?,
        finished_at: parse_datetime(&finished_at, "finished_at")?,
        files_found: to_u64(row.get("files_found")?, "files_found")?,
        files_read: to_u64(row.get("files_read")?, "files_read")?,
        files_skipped: to_u64(row.get("files_skipped")?, "files_skipped")?,
        rows_read: to_u64(row.get("rows_read")?, "rows_read")?,
        devices: to_u64(row.get("devices")?, "devices")?,
    })
}

pub(crate) fn insert_ingest_run_row(tx: &Transaction<'_>, run: &IngestRun) -> Result<()> {
    tx.execute(
        "INSERT INTO ingest_runs (
            id,
            run_date,
            started_at,
            finished_at,
            files_found,
            files_read,
            files_skipped,
            rows_read,
            devices
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
        params![
            run.id,
            run.run_date,
            format_datetime(&run.started_at),
            format_datetime(&run.finished_at),
            to_i64(run.files_found)?,
            to_i64(run.files_read)?,
            to_i64(run.files_skipped)?,
            to_i64(run.rows_read)?,
            to_i64(run.devices)?,
        ],
    )
    .with_context(|| format!("failed to record ingest run {}", run.id))?;
    Ok(())
}

impl Database {
    /// Ingest invocations recorded for a run date, oldest first.
    pub async fn list_ingest_runs(&self, run_date: &str) -> Result<Vec<IngestRun>> {
        let run_date = run_date.to_string();
        self.execute(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT
                    id,
                    run_date,
                    started_at,
                    finished_at,
                    files_found,
                    files_read,
                    files_skipped,
                    rows_read,
                    devices
                FROM ingest_runs
                WHERE run_date = ?1
                ORDER BY started_at ASC",
            )?;

            let mut rows = stmt.query(params![run_date])?;
            let mut runs = Vec::new();
            while let Some(row) = rows.next()? {
                runs.push(row_to_ingest_run(row)?);
            }
            Ok(runs)
        })
        .await
    }
}
