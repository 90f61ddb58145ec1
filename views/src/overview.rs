use crate::card::PostCard;
use analytics_engine::{summary_counts, SummaryCounts};
use chrono::{DateTime, TimeZone};
use dashboard_core::ContentRecord;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OverviewModel {
    pub summary: SummaryCounts,
    pub top_posts: Vec<PostCard>,
}

impl OverviewModel {
    /// `records` arrive ordered by ROI, so the top posts are a prefix.
    pub fn build<Tz: TimeZone>(
        records: &[ContentRecord],
        now: &DateTime<Tz>,
        top_posts: usize,
    ) -> Self {
        Self {
            summary: summary_counts(records, now),
            top_posts: records
                .iter()
                .take(top_posts)
                .map(PostCard::from_record)
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn test_top_posts_prefix() {
        let records: Vec<ContentRecord> = (0..15)
            .map(|i| {
                let mut record = ContentRecord::new(i.to_string());
                record.roi_weight = Some(15.0 - i as f64);
                record.relevance_score = Some(8.0);
                record
            })
            .collect();

        let model = OverviewModel::build(&records, &Utc::now(), 10);
        assert_eq!(model.top_posts.len(), 10);
        assert_eq!(model.top_posts[0].id, "0");
        assert_eq!(model.summary.total_posts, 15);
        assert_eq!(model.summary.high_value_posts, 11);
    }
}
