pub mod coerce;
pub mod rules;
pub mod status;

pub use rules::{CanonicalField, ColumnAlias, ColumnRules};
pub use status::StatusClassifier;

use anyhow::Result;

use crate::db::models::DeviceRecord;
use crate::ingest::{RawRecord, RawValue};

/// Maps raw spreadsheet rows onto [`DeviceRecord`]s.
#[derive(Debug, Clone)]
pub struct Canonicalizer {
    rules: ColumnRules,
    status: StatusClassifier,
}

impl Canonicalizer {
    pub fn new(aliases: &[ColumnAlias]) -> Result<Self> {
        Ok(Self {
            rules: ColumnRules::with_aliases(aliases)?,
            status: StatusClassifier::new()?,
        })
    }

    pub fn builtin() -> Result<Self> {
        Self::new(&[])
    }

    /// Unrecognized columns are dropped. When several columns map to the same
    /// field, the first one in sheet order that coerces to a value is kept.
    pub fn canonicalize(&self, raw: &RawRecord) -> DeviceRecord {
        let mut record = DeviceRecord::default();
        for (header, value) in raw.iter() {
            if let Some(field) = self.rules.field_for(header) {
                self.apply(&mut record, field, value);
            }
        }
        record
    }

    fn apply(&self, record: &mut DeviceRecord, field: CanonicalField, value: &RawValue) {
        match field {
            CanonicalField::Hostname => fill(&mut record.hostname, || coerce::text(value)),
            CanonicalField::Os => fill(&mut record.os, || coerce::text(value)),
            CanonicalField::DeviceType => fill(&mut record.device_type, || coerce::text(value)),
            CanonicalField::ComplianceStatus => fill(&mut record.compliance_status, || {
                coerce::text(value).map(|text| self.status.classify(&text))
            }),
            CanonicalField::LastSeen => fill(&mut record.last_seen, || coerce::date(value)),
            CanonicalField::PercentPassing => {
                fill(&mut record.percent_passing, || coerce::percent(value))
            }
            CanonicalField::EndOfLife => {
                fill(&mut record.end_of_life, || Some(coerce::boolean(value)))
            }
            CanonicalField::CrowdstrikeStatus => {
                fill(&mut record.crowdstrike_status, || coerce::text(value))
            }
            CanonicalField::TaniumStatus => fill(&mut record.tanium_status, || coerce::text(value)),
            CanonicalField::JamfStatus => fill(&mut record.jamf_status, || coerce::text(value)),
        }
    }
}

fn fill<T>(slot: &mut Option<T>, value: impl FnOnce() -> Option<T>) {
    if slot.is_none() {
        *slot = value();
    }
}
