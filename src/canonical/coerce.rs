//! Field-level type coercion. Every function here is total: input that cannot
//! be interpreted comes back as `None` rather than an error, so one bad cell
//! never costs the rest of its row.

use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, TimeZone, Utc};

use crate::ingest::RawValue;

const MS_PER_DAY: f64 = 86_400_000.0;
/// Serial for 9999-12-31, the last date spreadsheets can represent.
const MAX_SERIAL_DAY: f64 = 2_958_465.0;

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
    "%m/%d/%Y %I:%M:%S %p",
    "%m/%d/%Y %I:%M %p",
    "%Y/%m/%d %H:%M:%S",
];

const OFFSET_DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f%z",
    "%Y-%m-%d %H:%M:%S%.f%z",
    "%Y-%m-%d %H:%M:%S%.f %z",
];

const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%m/%d/%Y",
    "%Y/%m/%d",
    "%d-%b-%Y",
    "%d %b %Y",
    "%b %d, %Y",
    "%B %d, %Y",
];

const TRUTHY: &[&str] = &["true", "1", "yes", "y"];

pub fn text(value: &RawValue) -> Option<String> {
    let rendered = value.to_string();
    let trimmed = rendered.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

/// Numbers are spreadsheet serial dates (days since 1899-12-30 UTC); text
/// goes through [`parse_date_text`].
pub fn date(value: &RawValue) -> Option<DateTime<Utc>> {
    match value {
        RawValue::Number(serial) => serial_to_datetime(*serial),
        RawValue::Text(raw) => parse_date_text(raw),
    }
}

pub fn serial_to_datetime(serial: f64) -> Option<DateTime<Utc>> {
    if !serial.is_finite() || !(0.0..=MAX_SERIAL_DAY).contains(&serial) {
        return None;
    }
    let epoch = Utc.with_ymd_and_hms(1899, 12, 30, 0, 0, 0).single()?;
    let offset_ms = (serial * MS_PER_DAY).round() as i64;
    epoch.checked_add_signed(Duration::milliseconds(offset_ms))
}

pub fn parse_date_text(raw: &str) -> Option<DateTime<Utc>> {
    let value = raw.trim();
    if value.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(dt) = DateTime::parse_from_rfc2822(value) {
        return Some(dt.with_timezone(&Utc));
    }
    for format in OFFSET_DATETIME_FORMATS {
        if let Ok(dt) = DateTime::parse_from_str(value, format) {
            return Some(dt.with_timezone(&Utc));
        }
    }
    for format in DATETIME_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(value, format) {
            return Some(naive.and_utc());
        }
    }
    for format in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(value, format) {
            return date.and_hms_opt(0, 0, 0).map(|naive| naive.and_utc());
        }
    }
    None
}

/// Accepts `95.2`, `"95.2"`, `"95.2%"`. Values outside 0..=100 are rejected.
pub fn percent(value: &RawValue) -> Option<f64> {
    let parsed = match value {
        RawValue::Number(n) => *n,
        RawValue::Text(raw) => {
            let trimmed = raw.trim();
            let stripped = trimmed.strip_suffix('%').unwrap_or(trimmed).trim();
            stripped.parse::<f64>().ok()?
        }
    };
    (parsed.is_finite() && (0.0..=100.0).contains(&parsed)).then_some(parsed)
}

pub fn boolean(value: &RawValue) -> bool {
    let normalized = value.to_string().trim().to_lowercase();
    TRUTHY.contains(&normalized.as_str())
}
