use analytics_engine::{ScoreBand, ScoreField};
use chrono::{DateTime, Utc};
use dashboard_core::ContentRecord;
use serde::Serialize;

pub const TITLE_FALLBACK_CHARS: usize = 100;
pub const EXCERPT_CHARS: usize = 150;
pub const CARD_TAGS: usize = 3;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Score {
    pub value: Option<f64>,
    pub band: Option<ScoreBand>,
}

impl Score {
    fn of(record: &ContentRecord, field: ScoreField) -> Self {
        let value = match field {
            ScoreField::Relevance => record.relevance_score,
            ScoreField::Emotion => record.emotion_score,
            ScoreField::Pain => record.pain_score,
        };
        Self {
            value,
            band: value.map(ScoreBand::of),
        }
    }
}

/// One post or comment as shown in lists.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PostCard {
    pub id: String,
    pub url: String,
    pub title: String,
    pub excerpt: Option<String>,
    pub subreddit: Option<String>,
    pub content_type: Option<String>,
    pub lead_type: Option<String>,
    pub relevance: Score,
    pub emotion: Score,
    pub pain: Score,
    pub roi_weight: Option<f64>,
    pub tags: Vec<String>,
    pub processed_at: Option<DateTime<Utc>>,
}

impl PostCard {
    pub fn from_record(record: &ContentRecord) -> Self {
        let mut tags = record.tag_list();
        tags.truncate(CARD_TAGS);

        Self {
            id: record.id.clone(),
            url: record.url.clone(),
            title: record.display_title(TITLE_FALLBACK_CHARS),
            excerpt: record.body_excerpt(EXCERPT_CHARS),
            subreddit: record.community().map(str::to_string),
            content_type: record.content_type.clone(),
            lead_type: record.lead_type.clone(),
            relevance: Score::of(record, ScoreField::Relevance),
            emotion: Score::of(record, ScoreField::Emotion),
            pain: Score::of(record, ScoreField::Pain),
            roi_weight: record.roi_weight,
            tags,
            processed_at: record.processed_at,
        }
    }
}
