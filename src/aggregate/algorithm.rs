use anyhow::Result;

use crate::aggregate::activity::{is_active, MissingToolMatcher};
use crate::aggregate::config::AggregationConfig;
use crate::db::models::{ComplianceClass, DeviceRecord, RunSummary};

const WORKSTATION_MARKERS: &[&str] = &["workstation", "laptop", "desktop"];
const SERVER_MARKERS: &[&str] = &["server"];

fn device_type_contains(record: &DeviceRecord, markers: &[&str]) -> bool {
    record
        .device_type
        .as_deref()
        .map(str::to_lowercase)
        .is_some_and(|kind| markers.iter().any(|marker| kind.contains(marker)))
}

fn count<F>(records: &[&DeviceRecord], predicate: F) -> i64
where
    F: Fn(&DeviceRecord) -> bool,
{
    records.iter().filter(|record| predicate(**record)).count() as i64
}

/// Percentage rounded to two decimals; zero when there is no denominator.
pub fn compliance_percentage(compliant: i64, active: i64) -> f64 {
    if active <= 0 {
        return 0.0;
    }
    let pct = compliant as f64 / active as f64 * 100.0;
    (pct * 100.0).round() / 100.0
}

/// Summarise a deduplicated run snapshot.
pub fn summarize(
    run_date: &str,
    records: &[DeviceRecord],
    config: &AggregationConfig,
) -> Result<RunSummary> {
    let cutoff = config.activity_cutoff()?;
    let missing = MissingToolMatcher::new()?;

    let active: Vec<&DeviceRecord> = records
        .iter()
        .filter(|record| is_active(record, cutoff))
        .collect();
    let active_devices = active.len() as i64;

    let status_count = |class: ComplianceClass| {
        count(&active, |r| class.matches(r.compliance_status.as_deref()))
    };
    let compliant_devices = status_count(ComplianceClass::Compliant);

    Ok(RunSummary {
        run_date: run_date.to_string(),
        total_devices: records.len() as i64,
        active_devices,
        compliant_devices,
        noncompliant_devices: status_count(ComplianceClass::NonCompliant),
        grace_devices: status_count(ComplianceClass::GracePeriod),
        compliance_pct: compliance_percentage(compliant_devices, active_devices),
        workstations: count(&active, |r| device_type_contains(r, WORKSTATION_MARKERS)),
        servers: count(&active, |r| device_type_contains(r, SERVER_MARKERS)),
        eol_devices: count(&active, DeviceRecord::is_end_of_life),
        cs_missing: count(&active, |r| missing.is_missing(r.crowdstrike_status.as_deref())),
        tanium_missing: count(&active, |r| missing.is_missing(r.tanium_status.as_deref())),
        jamf_missing: count(&active, |r| missing.is_missing(r.jamf_status.as_deref())),
    })
}
