use crate::coerce::ScoreField;
use dashboard_core::ContentRecord;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

pub const UNKNOWN_TYPE: &str = "unknown";

/// Half-open score ranges used for histograms: [0,2), [2,4), [4,6), [6,8), [8,10).
pub const SCORE_BUCKETS: [(f64, f64); 5] = [(0.0, 2.0), (2.0, 4.0), (4.0, 6.0), (6.0, 8.0), (8.0, 10.0)];

pub const MAX_SCORE: f64 = 10.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TypeCount {
    pub name: String,
    pub value: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreBucket {
    pub name: String,
    pub min: f64,
    pub max: f64,
    pub count: u64,
}

/// Record counts per content type, in order of first appearance.
pub fn count_by_type(records: &[ContentRecord]) -> Vec<TypeCount> {
    let mut counts: Vec<(String, u64)> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    for record in records {
        let label = record
            .content_type
            .as_deref()
            .filter(|t| !t.is_empty())
            .unwrap_or(UNKNOWN_TYPE);

        match index.get(label) {
            Some(&slot) => counts[slot].1 += 1,
            None => {
                index.insert(label.to_string(), counts.len());
                counts.push((label.to_string(), 1));
            }
        }
    }

    counts
        .into_iter()
        .map(|(label, value)| TypeCount {
            name: capitalize(&label),
            value,
        })
        .collect()
}

/// Counts records per score bucket, always returning all five buckets.
///
/// A score of exactly 10 lands in the top bucket. Scores above 10, below 0,
/// or NaN are not counted.
pub fn histogram_by_score(records: &[ContentRecord], field: ScoreField) -> Vec<ScoreBucket> {
    let mut buckets: Vec<ScoreBucket> = SCORE_BUCKETS
        .iter()
        .map(|&(min, max)| ScoreBucket {
            name: format!("{}-{}", min, max),
            min,
            max,
            count: 0,
        })
        .collect();

    for record in records {
        if let Some(slot) = bucket_index(field.of(record)) {
            buckets[slot].count += 1;
        }
    }

    buckets
}

fn bucket_index(score: f64) -> Option<usize> {
    if score == MAX_SCORE {
        return Some(SCORE_BUCKETS.len() - 1);
    }
    SCORE_BUCKETS
        .iter()
        .position(|&(min, max)| score >= min && score < max)
}

/// Colour band used for score badges.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScoreBand {
    High,
    Medium,
    Low,
}

impl ScoreBand {
    pub fn of(score: f64) -> Self {
        if score >= 8.0 {
            ScoreBand::High
        } else if score >= 6.0 {
            ScoreBand::Medium
        } else {
            ScoreBand::Low
        }
    }
}

fn capitalize(label: &str) -> String {
    let mut chars = label.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
