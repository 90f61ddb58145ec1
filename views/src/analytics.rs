use analytics_engine::{
    count_by_type, group_by_community, histogram_by_score, summary_counts, timeline_by_day,
    CommunityStats, DayCount, ScoreBucket, ScoreField, SummaryCounts, TypeCount,
};
use chrono::{DateTime, TimeZone};
use dashboard_core::ContentRecord;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsModel {
    pub summary: SummaryCounts,
    pub communities: Vec<CommunityStats>,
    pub types: Vec<TypeCount>,
    pub relevance_histogram: Vec<ScoreBucket>,
    pub timeline: Vec<DayCount>,
}

impl AnalyticsModel {
    pub fn build<Tz: TimeZone>(records: &[ContentRecord], now: &DateTime<Tz>) -> Self {
        Self {
            summary: summary_counts(records, now),
            communities: group_by_community(records),
            types: count_by_type(records),
            relevance_histogram: histogram_by_score(records, ScoreField::Relevance),
            timeline: timeline_by_day(records, &now.timezone()),
        }
    }
}
