//! Per-host device record in canonical form.
//!
//! One `DeviceRecord` is produced per spreadsheet row by the canonicalizer and
//! at most one per hostname survives reconciliation into a run's `history`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Classified compliance states. Free text that matches none of these is
/// stored verbatim instead.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum ComplianceClass {
    Compliant,
    NonCompliant,
    GracePeriod,
}

impl ComplianceClass {
    pub fn as_str(&self) -> &'static str {
        match self {
            ComplianceClass::Compliant => "compliant",
            ComplianceClass::NonCompliant => "non-compliant",
            ComplianceClass::GracePeriod => "grace period",
        }
    }

    pub fn matches(&self, status: Option<&str>) -> bool {
        status.is_some_and(|s| s.eq_ignore_ascii_case(self.as_str()))
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DeviceRecord {
    pub hostname: Option<String>,
    pub os: Option<String>,
    pub device_type: Option<String>,
    pub compliance_status: Option<String>,
    pub last_seen: Option<DateTime<Utc>>,
    pub percent_passing: Option<f64>,
    /// `None` when no end-of-life column was present in the source row.
    pub end_of_life: Option<bool>,
    pub crowdstrike_status: Option<String>,
    pub tanium_status: Option<String>,
    pub jamf_status: Option<String>,
}

impl DeviceRecord {
    pub fn hostname(&self) -> Option<&str> {
        self.hostname.as_deref().filter(|h| !h.is_empty())
    }

    pub fn is_end_of_life(&self) -> bool {
        self.end_of_life.unwrap_or(false)
    }

    /// Tool status fields in persistence column order.
    pub fn tool_statuses(&self) -> [Option<&str>; 3] {
        [
            self.crowdstrike_status.as_deref(),
            self.tanium_status.as_deref(),
            self.jamf_status.as_deref(),
        ]
    }
}
