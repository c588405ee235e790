use std::collections::HashMap;

use crate::db::models::DeviceRecord;
use crate::reconcile::scoring::completeness_score;

/// Result of collapsing a run's records down to one per hostname.
#[derive(Debug, Clone, Default)]
pub struct MergeResult {
    /// Surviving records in first-seen hostname order.
    pub records: Vec<DeviceRecord>,
    /// Records dropped for having no hostname.
    pub missing_hostname: usize,
    /// Records that lost to another record for the same hostname.
    pub superseded: usize,
}

/// Keep the most complete record per hostname.
///
/// A later record replaces the current holder only when its completeness
/// score is strictly higher, so ties always go to the first record seen.
pub fn merge_by_hostname<I>(records: I) -> MergeResult
where
    I: IntoIterator<Item = DeviceRecord>,
{
    let mut kept: Vec<(DeviceRecord, usize)> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();
    let mut result = MergeResult::default();

    for record in records {
        let Some(hostname) = record.hostname().map(str::to_string) else {
            result.missing_hostname += 1;
            continue;
        };
        let score = completeness_score(&record);

        match index.get(&hostname) {
            Some(&slot) => {
                result.superseded += 1;
                if score > kept[slot].1 {
                    kept[slot] = (record, score);
                }
            }
            None => {
                index.insert(hostname, kept.len());
                kept.push((record, score));
            }
        }
    }

    result.records = kept.into_iter().map(|(record, _)| record).collect();
    result
}
