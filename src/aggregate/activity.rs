use anyhow::Result;
use chrono::{DateTime, Utc};
use regex::Regex;

use crate::db::models::DeviceRecord;

fn non_empty(value: Option<&str>) -> bool {
    value.is_some_and(|v| !v.trim().is_empty())
}

/// Active means recently seen, or reporting to at least one endpoint tool.
pub fn is_active(record: &DeviceRecord, cutoff: DateTime<Utc>) -> bool {
    let recent = record.last_seen.is_some_and(|seen| seen >= cutoff);
    recent || record.tool_statuses().into_iter().any(non_empty)
}

/// Decides whether a tool status means the agent is absent.
#[derive(Debug, Clone)]
pub struct MissingToolMatcher {
    pattern: Regex,
}

impl MissingToolMatcher {
    pub fn new() -> Result<Self> {
        Ok(Self {
            pattern: Regex::new(r"(?i)missing|not\s*installed")?,
        })
    }

    /// Blank statuses count as missing, and so do statuses that say so.
    pub fn is_missing(&self, status: Option<&str>) -> bool {
        match status.map(str::trim) {
            None | Some("") => true,
            Some(text) => self.pattern.is_match(text),
        }
    }
}
