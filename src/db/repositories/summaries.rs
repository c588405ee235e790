use anyhow::{Context, Result};
use rusqlite::{params, OptionalExtension, Row, Transaction};

use crate::db::{connection::Database, models::RunSummary};

const SUMMARY_COLUMNS: &str = "run_date,
    total_devices,
    active_devices,
    compliant_devices,
    noncompliant_devices,
    grace_devices,
    compliance_pct,
    workstations,
    servers,
    eol_devices,
    cs_missing,
    tanium_missing,
    jamf_missing";

fn row_to_summary(row: &Row) -> rusqlite::Result<RunSummary> {
    Ok(RunSummary {
        run_date: row.get("run_date")?,
        total_devices: row.get("total_devices")?,
        active_devices: row.get("active_devices")?,
        compliant_devices: row.get("compliant_devices")?,
        noncompliant_devices: row.get("noncompliant_devices")?,
        grace_devices: row.get("grace_devices")?,
        compliance_pct: row.get("compliance_pct")?,
        workstations: row.get("workstations")?,
        servers: row.get("servers")?,
        eol_devices: row.get("eol_devices")?,
        cs_missing: row.get("cs_missing")?,
        tanium_missing: row.get("tanium_missing")?,
        jamf_missing: row.get("jamf_missing")?,
    })
}

pub(crate) fn upsert_summary_row(tx: &Transaction<'_>, summary: &RunSummary) -> Result<()> {
    tx.execute(
        &format!(
            "INSERT OR REPLACE INTO summary ({SUMMARY_COLUMNS})
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)"
        ),
        params![
            summary.run_date,
            summary.total_devices,
            summary.active_devices,
            summary.compliant_devices,
            summary.noncompliant_devices,
            summary.grace_devices,
            summary.compliance_pct,
            summary.workstations,
            summary.servers,
            summary.eol_devices,
            summary.cs_missing,
            summary.tanium_missing,
            summary.jamf_missing,
        ],
    )
    .with_context(|| format!("failed to upsert summary for {}", summary.run_date))?;
    Ok(())
}

impl Database {
    pub async fn get_summary(&self, run_date: &str) -> Result<Option<RunSummary>> {
        let run_date = run_date.to_string();
        self.execute(move |conn| {
            let summary = conn
                .query_row(
                    &format!("SELECT {SUMMARY_COLUMNS} FROM summary WHERE run_date = ?1"),
                    params![run_date],
                    row_to_summary,
                )
                .optional()?;
            Ok(summary)
        })
        .await
    }

    /// All stored summaries, newest run first.
    pub async fn list_summaries(&self) -> Result<Vec<RunSummary>> {
        self.execute(|conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {SUMMARY_COLUMNS} FROM summary ORDER BY run_date DESC"
            ))?;
            let summaries = stmt
                .query_map([], row_to_summary)?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            Ok(summaries)
        })
        .await
    }
}
