use crate::coerce::{relevance, roi};
use chrono::{DateTime, TimeZone};
use dashboard_core::ContentRecord;
use serde::{Deserialize, Serialize};

pub const HIGH_VALUE_RELEVANCE: f64 = 7.0;
pub const HIGH_VALUE_ROI: f64 = 5.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct SummaryCounts {
    pub total_posts: u64,
    pub posts: u64,
    pub comments: u64,
    pub avg_relevance: f64,
    pub high_value_posts: u64,
    pub processed_today: u64,
}

pub fn is_high_value(record: &ContentRecord) -> bool {
    relevance(record) >= HIGH_VALUE_RELEVANCE && roi(record) >= HIGH_VALUE_ROI
}

/// Headline counts; "today" is the calendar day of `now` in its own time zone.
pub fn summary_counts<Tz: TimeZone>(records: &[ContentRecord], now: &DateTime<Tz>) -> SummaryCounts {
    let tz = now.timezone();
    let today = now.date_naive();

    let mut summary = SummaryCounts {
        total_posts: records.len() as u64,
        ..SummaryCounts::default()
    };
    let mut total_relevance = 0.0;

    for record in records {
        match record.content_type.as_deref() {
            Some("post") => summary.posts += 1,
            Some("comment") => summary.comments += 1,
            _ => {}
        }

        total_relevance += relevance(record);

        if is_high_value(record) {
            summary.high_value_posts += 1;
        }

        let processed_today = record
            .processed_at
            .map(|at| at.with_timezone(&tz).date_naive() == today)
            .unwrap_or(false);
        if processed_today {
            summary.processed_today += 1;
        }
    }

    summary.avg_relevance = if records.is_empty() {
        0.0
    } else {
        total_relevance / records.len() as f64
    };

    summary
}
