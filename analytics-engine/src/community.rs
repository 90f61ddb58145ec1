use crate::coerce::{relevance, roi};
use dashboard_core::ContentRecord;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

pub const MAX_COMMUNITY_GROUPS: usize = 10;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommunityStats {
    pub subreddit: String,
    pub count: u64,
    pub avg_relevance: f64,
    #[serde(rename = "avgROI")]
    pub avg_roi: f64,
}

#[derive(Default)]
struct Accumulator {
    count: u64,
    total_relevance: f64,
    total_roi: f64,
}

/// Per-community count and mean scores, largest groups first, at most ten.
///
/// Groups with equal counts keep the order in which they were first seen.
pub fn group_by_community(records: &[ContentRecord]) -> Vec<CommunityStats> {
    let mut order: Vec<&str> = Vec::new();
    let mut groups: HashMap<&str, Accumulator> = HashMap::new();

    for record in records {
        let Some(community) = record.community() else {
            continue;
        };

        let acc = groups.entry(community).or_insert_with(|| {
            order.push(community);
            Accumulator::default()
        });
        acc.count += 1;
        acc.total_relevance += relevance(record);
        acc.total_roi += roi(record);
    }

    let mut stats: Vec<CommunityStats> = order
        .into_iter()
        .filter_map(|community| {
            let acc = groups.get(community)?;
            let count = acc.count as f64;
            Some(CommunityStats {
                subreddit: community.to_string(),
                count: acc.count,
                avg_relevance: acc.total_relevance / count,
                avg_roi: acc.total_roi / count,
            })
        })
        .collect();

    // sort_by is stable, so ties stay in first-seen order
    stats.sort_by(|a, b| b.count.cmp(&a.count));
    stats.truncate(MAX_COMMUNITY_GROUPS);
    stats
}

/// Unique non-empty community labels in first-seen order.
pub fn distinct_communities(records: &[ContentRecord]) -> Vec<String> {
    let mut seen = HashSet::new();
    records
        .iter()
        .filter_map(ContentRecord::community)
        .filter(|community| seen.insert(*community))
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(id: &str, subreddit: Option<&str>, relevance: Option<f64>, roi: Option<f64>) -> ContentRecord {
        let mut record = ContentRecord::new(id);
        record.subreddit = subreddit.map(str::to_string);
        record.relevance_score = relevance;
        record.roi_weight = roi;
        record
    }

    #[test]
    fn test_grouping_and_means() {
        let records = vec![
            record("1", Some("rust"), Some(8.0), Some(4.0)),
            record("2", Some("golang"), Some(5.0), None),
            record("3", Some("rust"), None, Some(2.0)),
        ];

        let stats = group_by_community(&records);
        assert_eq!(stats.len(), 2);
        assert_eq!(stats[0].subreddit, "rust");
        assert_eq!(stats[0].count, 2);
        assert_eq!(stats[0].avg_relevance, 4.0);
        assert_eq!(stats[0].avg_roi, 3.0);
        assert_eq!(stats[1].subreddit, "golang");
        assert_eq!(stats[1].avg_roi, 0.0);
    }

    #[test]
    fn test_absent_and_empty_communities_excluded() {
        let records = vec![
            record("1", None, Some(9.0), None),
            record("2", Some(""), Some(9.0), None),
            record("3", Some("rust"), Some(1.0), None),
        ];

        let stats = group_by_community(&records);
        assert_eq!(stats.len(), 1);
        assert_eq!(stats[0].count, 1);
    }

    #[test]
    fn test_ties_keep_first_seen_order() {
        let records = vec![
            record("1", Some("b"), None, None),
            record("2", Some("a"), None, None),
            record("3", Some("c"), None, None),
            record("4", Some("c"), None, None),
        ];

        let names: Vec<String> = group_by_community(&records)
            .into_iter()
            .map(|s| s.subreddit)
            .collect();
        assert_eq!(names, vec!["c", "b", "a"]);
    }

    #[test]
    fn test_capped_at_ten_and_non_increasing() {
        let mut records = Vec::new();
        for group in 0..25 {
            for n in 0..(group % 7 + 1) {
                records.push(record(
                    &format!("{}-{}", group, n),
                    Some(&format!("sub{}", group)),
                    None,
                    None,
                ));
            }
        }

        let stats = group_by_community(&records);
        assert_eq!(stats.len(), MAX_COMMUNITY_GROUPS);
        assert!(stats.windows(2).all(|pair| pair[0].count >= pair[1].count));
    }

    #[test]
    fn test_empty_input() {
        assert!(group_by_community(&[]).is_empty());
        assert!(distinct_communities(&[]).is_empty());
    }

    #[test]
    fn test_distinct_communities() {
        let records = vec![
            record("1", Some("rust"), None, None),
            record("2", None, None, None),
            record("3", Some("golang"), None, None),
            record("4", Some("rust"), None, None),
        ];
        assert_eq!(distinct_communities(&records), vec!["rust", "golang"]);
    }

    #[test]
    fn test_chart_field_names() {
        let stats = group_by_community(&[record("1", Some("rust"), Some(7.0), Some(5.0))]);
        let json = serde_json::to_value(&stats[0]).unwrap();
        assert_eq!(json["subreddit"], "rust");
        assert_eq!(json["avgRelevance"], 7.0);
        assert_eq!(json["avgROI"], 5.0);
    }
}
