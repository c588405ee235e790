use serde::{Deserialize, Serialize};

/// Aggregate compliance figures for one run date.
///
/// Counts other than `total_devices` only consider devices classified as
/// active at computation time.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RunSummary {
    pub run_date: String,
    pub total_devices: i64,
    pub active_devices: i64,
    pub compliant_devices: i64,
    pub noncompliant_devices: i64,
    pub grace_devices: i64,
    pub compliance_pct: f64,
    pub workstations: i64,
    pub servers: i64,
    pub eol_devices: i64,
    pub cs_missing: i64,
    pub tanium_missing: i64,
    pub jamf_missing: i64,
}
