use std::fs;
use std::path::PathBuf;

use chrono::{DateTime, Duration, NaiveDate, TimeZone, Utc};
use tempfile::TempDir;

use fleetcomp_lib::canonical::{CanonicalField, ColumnAlias};
use fleetcomp_lib::db::Database;
use fleetcomp_lib::error::IngestError;
use fleetcomp_lib::ingest::{RawRecord, RawValue};
use fleetcomp_lib::pipeline::{ingest, ingest_rows, plan, IngestRequest, SourceStats};
use fleetcomp_lib::settings::IngestSettings;

fn as_of() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 11, 4, 12, 0, 0).unwrap()
}

fn request(dirs: Vec<PathBuf>) -> IngestRequest {
    IngestRequest {
        input_dirs: dirs,
        run_date: NaiveDate::from_ymd_opt(2025, 11, 4).unwrap(),
        as_of: as_of(),
        settings: IngestSettings::default(),
    }
}

fn text(s: &str) -> RawValue {
    RawValue::Text(s.to_string())
}

/// Serial date for `days` before the as-of instant.
fn serial_days_ago(days: i64) -> RawValue {
    let epoch = Utc.with_ymd_and_hms(1899, 12, 30, 0, 0, 0).unwrap();
    let seen = as_of() - Duration::days(days);
    RawValue::Number((seen - epoch).num_seconds() as f64 / 86_400.0)
}

fn export_rows() -> Vec<RawRecord> {
    vec![
        // Row A: hostname + os only.
        RawRecord::new()
            .with("Hostname", text("PC-01"))
            .with("OS", text("Windows 11")),
        // Row B: same host from another tool, more complete.
        RawRecord::new()
            .with("Computer", text("PC-01"))
            .with("OS Name", text("Windows 11"))
            .with("Endpoint Compliance", text("Fully Compliant"))
            .with("Percent Passing", RawValue::Number(95.2))
            .with("Compliance Last Scan", serial_days_ago(2))
            .with("Device Type", text("Laptop")),
        RawRecord::new()
            .with("asset_name", text("SRV-01"))
            .with("System_Type", text("Server"))
            .with("EndpointCompliance", text("Out of Compliance"))
            .with("CrowdStrike Status", text("Online"))
            .with("Tanium Status", text("Not Installed")),
        RawRecord::new()
            .with("hostname", text("OLD-01"))
            .with("compliance_status", text("Grace Period - Pending"))
            .with("Compliance Last Scan Date", serial_days_ago(90)),
        RawRecord::new().with("OS", text("no host here")),
    ]
}

fn stats() -> SourceStats {
    SourceStats {
        files_found: 2,
        files_read: 2,
        skipped: Vec::new(),
        rows_read: 5,
    }
}

#[tokio::test]
async fn end_to_end_merge_and_summary() {
    let dir = TempDir::new().unwrap();
    let db = Database::new(dir.path().join("devices.db")).unwrap();

    let report = ingest_rows(&db, &request(Vec::new()), export_rows(), stats())
        .await
        .unwrap();
    assert_eq!(report.devices, 3);
    assert_eq!(report.rows_without_hostname, 1);
    assert_eq!(report.rows_superseded, 1);

    let history = db.get_history("2025-11-04").await.unwrap();
    let pc = history
        .iter()
        .find(|d| d.hostname.as_deref() == Some("PC-01"))
        .unwrap();
    assert_eq!(pc.compliance_status.as_deref(), Some("compliant"));
    assert_eq!(pc.percent_passing, Some(95.2));
    assert_eq!(pc.os.as_deref(), Some("Windows 11"));

    let old = history
        .iter()
        .find(|d| d.hostname.as_deref() == Some("OLD-01"))
        .unwrap();
    assert_eq!(old.compliance_status.as_deref(), Some("grace period"));

    let summary = db.get_summary("2025-11-04").await.unwrap().unwrap();
    assert_eq!(summary, report.summary);
    assert_eq!(summary.total_devices, 3);
    // OLD-01 was last seen 90 days ago and reports to no tools.
    assert_eq!(summary.active_devices, 2);
    assert_eq!(summary.compliant_devices, 1);
    assert_eq!(summary.noncompliant_devices, 1);
    assert_eq!(summary.grace_devices, 0);
    assert_eq!(summary.compliance_pct, 50.0);
    assert_eq!(summary.workstations, 1);
    assert_eq!(summary.servers, 1);
    assert_eq!(summary.cs_missing, 1);
    assert_eq!(summary.tanium_missing, 2);
    assert_eq!(summary.jamf_missing, 2);
    assert!((0.0..=100.0).contains(&summary.compliance_pct));
}

#[tokio::test]
async fn reingesting_same_date_is_idempotent() {
    let dir = TempDir::new().unwrap();
    let db = Database::new(dir.path().join("devices.db")).unwrap();
    let req = request(Vec::new());

    ingest_rows(&db, &req, export_rows(), stats()).await.unwrap();
    let first_history = db.get_history("2025-11-04").await.unwrap();
    let first_summary = db.get_summary("2025-11-04").await.unwrap();

    ingest_rows(&db, &req, export_rows(), stats()).await.unwrap();
    assert_eq!(db.get_history("2025-11-04").await.unwrap(), first_history);
    assert_eq!(db.get_summary("2025-11-04").await.unwrap(), first_summary);
    assert_eq!(db.list_ingest_runs("2025-11-04").await.unwrap().len(), 2);
}

#[tokio::test]
async fn no_active_devices_means_zero_percent() {
    let dir = TempDir::new().unwrap();
    let db = Database::new(dir.path().join("devices.db")).unwrap();
    let rows = vec![RawRecord::new()
        .with("hostname", text("GHOST"))
        .with("endpoint compliance", text("compliant"))];

    let report = ingest_rows(&db, &request(Vec::new()), rows, stats())
        .await
        .unwrap();
    assert_eq!(report.summary.active_devices, 0);
    assert_eq!(report.summary.compliance_pct, 0.0);
}

#[tokio::test]
async fn missing_inputs_are_distinct_failures() {
    let dir = TempDir::new().unwrap();
    let db = Database::new(dir.path().join("devices.db")).unwrap();

    let err = ingest(&db, &request(Vec::new())).await.unwrap_err();
    assert!(matches!(err, IngestError::Config(_)));
    assert_eq!(err.exit_code(), 1);

    let empty = dir.path().join("exports");
    fs::create_dir(&empty).unwrap();
    fs::write(empty.join("readme.txt"), b"not a workbook").unwrap();
    let err = ingest(&db, &request(vec![empty])).await.unwrap_err();
    assert!(matches!(err, IngestError::NoInputFiles { .. }));
    assert_eq!(err.exit_code(), 2);

    assert!(db.list_run_dates().await.unwrap().is_empty());
}

#[tokio::test]
async fn corrupt_workbooks_are_skipped() {
    let dir = TempDir::new().unwrap();
    let db = Database::new(dir.path().join("devices.db")).unwrap();

    let exports = dir.path().join("exports");
    fs::create_dir(&exports).unwrap();
    fs::write(exports.join("crowdstrike.xlsx"), b"truncated download").unwrap();

    let report = ingest(&db, &request(vec![exports.clone()])).await.unwrap();
    assert_eq!(report.files_found, 1);
    assert_eq!(report.files_read, 0);
    assert_eq!(report.skipped_files, vec![exports.join("crowdstrike.xlsx")]);
    assert_eq!(report.devices, 0);

    let runs = db.list_ingest_runs("2025-11-04").await.unwrap();
    assert_eq!(runs.len(), 1);
    assert_eq!(runs[0].files_skipped, 1);
}

#[tokio::test]
async fn invalid_settings_are_config_errors_not_panics() {
    let dir = TempDir::new().unwrap();
    let db = Database::new(dir.path().join("devices.db")).unwrap();

    let mut req = request(Vec::new());
    req.settings.activity_window_days = i64::MAX;
    let err = ingest_rows(&db, &req, export_rows(), stats())
        .await
        .unwrap_err();
    assert!(matches!(err, IngestError::Config(_)));
    assert!(db.list_run_dates().await.unwrap().is_empty());
    assert!(db.list_ingest_runs("2025-11-04").await.unwrap().is_empty());
}

#[test]
fn bad_alias_is_rejected_before_discovery() {
    let dir = TempDir::new().unwrap();
    let mut req = request(vec![dir.path().join("does-not-exist")]);
    req.settings.column_aliases = vec![ColumnAlias {
        pattern: "(".into(),
        field: CanonicalField::Os,
    }];

    // A discovery failure would be NoInputFiles; config is checked first.
    let err = plan(&req).unwrap_err();
    assert!(matches!(err, IngestError::Config(_)));
}
