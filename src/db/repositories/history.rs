use anyhow::{anyhow, Context, Result};
use rusqlite::{params, Row, Transaction};

use crate::db::{
    connection::Database,
    helpers::{format_datetime, parse_optional_datetime},
    models::DeviceRecord,
};

fn row_to_device(row: &Row) -> Result<DeviceRecord> {
    let last_seen: Option<String> = row.get("lastSeen")?;
    let end_of_life: i64 = row.get("endOfLife")?;

    Ok(DeviceRecord {
        hostname: row.get("hostname")?,
        os: row.get("os")?,
        device_type: row.get("deviceType")?,
        compliance_status: row.get("complianceStatus")?,
        last_seen: parse_optional_datetime(last_seen, "lastSeen")?,
        percent_passing: row.get("percentPassing")?,
        end_of_life: Some(end_of_life != 0),
        crowdstrike_status: row.get("crowdstrikeStatus")?,
        tanium_status: row.get("taniumStatus")?,
        jamf_status: row.get("jamfStatus")?,
    })
}

/// Drop every history row for `run_date`, then insert `records`.
/// Runs inside the caller's transaction.
pub(crate) fn replace_history_rows(
    tx: &Transaction<'_>,
    run_date: &str,
    records: &[DeviceRecord],
) -> Result<usize> {
    let removed = tx
        .execute("DELETE FROM history WHERE run_date = ?1", params![run_date])
        .with_context(|| format!("failed to clear history for {run_date}"))?;
    log::debug!("Cleared {removed} history rows for {run_date}");

    let mut stmt = tx.prepare(
        "INSERT INTO history (
            run_date,
            hostname,
            os,
            deviceType,
            complianceStatus,
            lastSeen,
            percentPassing,
            endOfLife,
            crowdstrikeStatus,
            taniumStatus,
            jamfStatus
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
    )?;

    for record in records {
        let hostname = record
            .hostname()
            .ok_or_else(|| anyhow!("history record for {run_date} has no hostname"))?;
        stmt.execute(params![
            run_date,
            hostname,
            record.os,
            record.device_type,
            record.compliance_status,
            record.last_seen.as_ref().map(format_datetime),
            record.percent_passing,
            record.is_end_of_life() as i64,
            record.crowdstrike_status,
            record.tanium_status,
            record.jamf_status,
        ])
        .with_context(|| format!("failed to insert history row for {hostname}"))?;
    }

    Ok(records.len())
}

impl Database {
    /// Devices stored for a run, ordered by hostname.
    pub async fn get_history(&self, run_date: &str) -> Result<Vec<DeviceRecord>> {
        let run_date = run_date.to_string();
        self.execute(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT
                    hostname,
                    os,
                    deviceType,
                    complianceStatus,
                    lastSeen,
                    percentPassing,
                    endOfLife,
                    crowdstrikeStatus,
                    taniumStatus,
                    jamfStatus
                FROM history
                WHERE run_date = ?1
                ORDER BY hostname ASC",
            )?;

            let mut rows = stmt.query(params![run_date])?;
            let mut devices = Vec::new();
            while let Some(row) = rows.next()? {
                devices.push(row_to_device(row)?);
            }

            Ok(devices)
        })
        .await
    }

    /// Every run date with history rows, newest first.
    pub async fn list_run_dates(&self) -> Result<Vec<String>> {
        self.execute(|conn| {
            let mut stmt = conn.prepare(
                "SELECT DISTINCT run_date FROM history ORDER BY run_date DESC",
            )?;
            let dates = stmt
                .query_map([], |row| row.get::<_, String>(0))?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            Ok(dates)
        })
        .await
    }
}
