use crate::db::models::DeviceRecord;

fn present(value: Option<&str>) -> bool {
    value.is_some_and(|v| !v.trim().is_empty())
}

/// Number of canonical fields that carry a value. A present end-of-life flag
/// counts whether it is true or false.
pub fn completeness_score(record: &DeviceRecord) -> usize {
    [
        present(record.hostname.as_deref()),
        present(record.os.as_deref()),
        present(record.device_type.as_deref()),
        present(record.compliance_status.as_deref()),
        record.last_seen.is_some(),
        record.percent_passing.is_some(),
        record.end_of_life.is_some(),
        present(record.crowdstrike_status.as_deref()),
        present(record.tanium_status.as_deref()),
        present(record.jamf_status.as_deref()),
    ]
    .into_iter()
    .filter(|populated| *populated)
    .count()
}
