pub mod connection;
pub mod helpers;
mod migrations;
pub mod models;
pub mod repositories;

pub use connection::Database;
pub use repositories::RunWrite;

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};
    use tempfile::TempDir;

    use super::*;
    use crate::db::models::{DeviceRecord, IngestRun, RunSummary};

    fn open(dir: &TempDir) -> Database {
        Database::new(dir.path().join("data").join("devices.db")).unwrap()
    }

    fn device(name: &str, status: &str) -> DeviceRecord {
        DeviceRecord {
            hostname: Some(name.into()),
            os: Some("Windows 11".into()),
            compliance_status: Some(status.into()),
            last_seen: Some(Utc.with_ymd_and_hms(2025, 11, 1, 8, 30, 0).unwrap()),
            percent_passing: Some(88.5),
            crowdstrike_status: Some("Online".into()),
            ..Default::default()
        }
    }

    fn write(run_date: &str, devices: Vec<DeviceRecord>) -> RunWrite {
        let now = Utc.with_ymd_and_hms(2025, 11, 4, 9, 0, 0).unwrap();
        RunWrite {
            run_date: run_date.into(),
            summary: RunSummary {
                run_date: run_date.into(),
                total_devices: devices.len() as i64,
                ..Default::default()
            },
            log: IngestRun {
                id: uuid::Uuid::new_v4().to_string(),
                run_date: run_date.into(),
                started_at: now,
                finished_at: now,
                files_found: 1,
                files_read: 1,
                files_skipped: 0,
                rows_read: devices.len() as u64,
                devices: devices.len() as u64,
            },
            devices,
        }
    }

    #[tokio::test]
    async fn replace_run_overwrites_previous_rows() {
        let dir = TempDir::new().unwrap();
        let db = open(&dir);

        db.replace_run(write("2025-11-04", vec![device("A", "compliant"), device("B", "compliant")]))
            .await
            .unwrap();
        db.replace_run(write("2025-11-04", vec![device("C", "non-compliant")]))
            .await
            .unwrap();

        let history = db.get_history("2025-11-04").await.unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].hostname.as_deref(), Some("C"));
        assert_eq!(history[0].last_seen, device("C", "x").last_seen);
        assert_eq!(history[0].end_of_life, Some(false));

        let summary = db.get_summary("2025-11-04").await.unwrap().unwrap();
        assert_eq!(summary.total_devices, 1);
        assert_eq!(db.list_ingest_runs("2025-11-04").await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn other_run_dates_are_untouched() {
        let dir = TempDir::new().unwrap();
        let db = open(&dir);

        db.replace_run(write("2025-11-03", vec![device("A", "compliant")]))
            .await
            .unwrap();
        db.replace_run(write("2025-11-04", vec![device("B", "compliant")]))
            .await
            .unwrap();

        assert_eq!(db.get_history("2025-11-03").await.unwrap().len(), 1);
        assert_eq!(
            db.list_run_dates().await.unwrap(),
            vec!["2025-11-04".to_string(), "2025-11-03".to_string()]
        );
        let summaries = db.list_summaries().await.unwrap();
        assert_eq!(summaries.len(), 2);
        assert_eq!(summaries[0].run_date, "2025-11-04");
    }

    #[tokio::test]
    async fn failed_insert_rolls_back_whole_run() {
        let dir = TempDir::new().unwrap();
        let db = open(&dir);

        db.replace_run(write("2025-11-04", vec![device("A", "compliant")]))
            .await
            .unwrap();
        let before_history = db.get_history("2025-11-04").await.unwrap();
        let before_summary = db.get_summary("2025-11-04").await.unwrap();

        // Duplicate hostnames violate the (run_date, hostname) key mid-insert.
        let broken = write(
            "2025-11-04",
            vec![device("X", "compliant"), device("Y", "compliant"), device("X", "compliant")],
        );
        assert!(db.replace_run(broken).await.is_err());

        assert_eq!(db.get_history("2025-11-04").await.unwrap(), before_history);
        assert_eq!(db.get_summary("2025-11-04").await.unwrap(), before_summary);
        assert_eq!(db.list_ingest_runs("2025-11-04").await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn missing_summary_is_none() {
        let dir = TempDir::new().unwrap();
        let db = open(&dir);
        assert!(db.get_summary("1999-01-01").await.unwrap().is_none());
        assert!(db.get_history("1999-01-01").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn read_only_store_refuses_writes_and_never_creates() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("nowhere").join("devices.db");
        assert!(Database::open_read_only(missing.clone()).is_err());
        assert!(!missing.exists());
        assert!(!dir.path().join("nowhere").exists());

        let db = open(&dir);
        db.replace_run(write("2025-11-04", vec![device("A", "compliant")]))
            .await
            .unwrap();
        let path = db.path().to_path_buf();
        drop(db);

        let reader = Database::open_read_only(path).unwrap();
        assert_eq!(reader.list_summaries().await.unwrap().len(), 1);
        assert!(reader
            .replace_run(write("2025-11-05", vec![device("B", "compliant")]))
            .await
            .is_err());
        assert!(reader.get_summary("2025-11-05").await.unwrap().is_none());
    }
}
