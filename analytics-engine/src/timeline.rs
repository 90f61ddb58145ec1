use chrono::{NaiveDate, TimeZone};
use dashboard_core::ContentRecord;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub const MAX_TIMELINE_DAYS: usize = 30;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DayCount {
    pub date: NaiveDate,
    pub count: u64,
}

/// Records processed per calendar day in `tz`, oldest first, keeping only
/// the most recent thirty days that have any records.
pub fn timeline_by_day<Tz: TimeZone>(records: &[ContentRecord], tz: &Tz) -> Vec<DayCount> {
    let mut days: BTreeMap<NaiveDate, u64> = BTreeMap::new();

    for processed_at in records.iter().filter_map(|r| r.processed_at) {
        let day = processed_at.with_timezone(tz).date_naive();
        *days.entry(day).or_insert(0) += 1;
    }

    let skip = days.len().saturating_sub(MAX_TIMELINE_DAYS);
    days.into_iter()
        .skip(skip)
        .map(|(date, count)| DayCount { date, count })
        .collect()
}
