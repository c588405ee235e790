use std::convert::TryFrom;

use anyhow::{anyhow, Context, Result};
use chrono::{DateTime, SecondsFormat, Utc};

pub fn to_i64(value: u64) -> Result<i64> {
    i64::try_from(value).map_err(|_| anyhow!("value {value} exceeds SQLite INTEGER range"))
}

pub fn to_u64(value: i64, field: &str) -> Result<u64> {
    u64::try_from(value).map_err(|_| anyhow!("{field} contains negative value {value}"))
}

/// Millisecond-precision UTC text, e.g. `2025-11-04T13:00:00.000Z`.
pub fn format_datetime(value: &DateTime<Utc>) -> String {
    value.to_rfc3339_opts(SecondsFormat::Millis, true)
}

pub fn parse_datetime(value: &str, field: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .with_context(|| format!("failed to parse {field}"))
}

pub fn parse_optional_datetime(
    value: Option<String>,
    field: &str,
) -> Result<Option<DateTime<Utc>>> {
    match value {
        Some(raw) => parse_datetime(&raw, field).map(Some),
        None => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn datetime_text_round_trips() {
        let dt = Utc.with_ymd_and_hms(2025, 11, 4, 13, 0, 0).unwrap();
        let text = format_datetime(&dt);
        assert_eq!(text, "2025-11-04T13:00:00.000Z");
        assert_eq!(parse_datetime(&text, "lastSeen").unwrap(), dt);
    }

    #[test]
    fn integer_conversions_guard_range() {
        assert!(to_i64(u64::MAX).is_err());
        assert!(to_u64(-1, "devices").is_err());
        assert_eq!(to_u64(7, "devices").unwrap(), 7);
    }
}
