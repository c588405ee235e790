use anyhow::{anyhow, Result};
use chrono::{DateTime, Duration, Utc};

pub const DEFAULT_ACTIVITY_WINDOW_DAYS: i64 = 60;
/// Accepted range for the activity window, in days.
pub const ACTIVITY_WINDOW_RANGE: std::ops::RangeInclusive<i64> = 1..=36_500;

/// Inputs for summarising a run. `as_of` replaces any reading of the wall
/// clock so summaries are reproducible.
#[derive(Debug, Clone)]
pub struct AggregationConfig {
    pub as_of: DateTime<Utc>,
    /// Devices seen within this many days before `as_of` count as active.
    pub activity_window_days: i64,
}

impl AggregationConfig {
    pub fn new(as_of: DateTime<Utc>) -> Self {
        Self {
            as_of,
            activity_window_days: DEFAULT_ACTIVITY_WINDOW_DAYS,
        }
    }

    pub fn with_window_days(mut self, days: i64) -> Self {
        self.activity_window_days = days;
        self
    }

    pub fn activity_cutoff(&self) -> Result<DateTime<Utc>> {
        Duration::try_days(self.activity_window_days)
            .and_then(|window| self.as_of.checked_sub_signed(window))
            .ok_or_else(|| {
                anyhow!(
                    "activity window of {} days is out of range",
                    self.activity_window_days
                )
            })
    }
}
