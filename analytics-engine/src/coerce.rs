use dashboard_core::ContentRecord;
use serde::{Deserialize, Serialize};

/// Missing numeric fields count as zero in every sum, mean and threshold.
pub trait OrZero {
    fn or_zero(self) -> f64;
}

impl OrZero for Option<f64> {
    fn or_zero(self) -> f64 {
        self.unwrap_or(0.0)
    }
}

impl OrZero for Option<i64> {
    fn or_zero(self) -> f64 {
        self.unwrap_or(0) as f64
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoreField {
    Relevance,
    Emotion,
    Pain,
}

impl ScoreField {
    pub fn of(&self, record: &ContentRecord) -> f64 {
        match self {
            ScoreField::Relevance => record.relevance_score.or_zero(),
            ScoreField::Emotion => record.emotion_score.or_zero(),
            ScoreField::Pain => record.pain_score.or_zero(),
        }
    }
}

pub fn relevance(record: &ContentRecord) -> f64 {
    ScoreField::Relevance.of(record)
}

pub fn roi(record: &ContentRecord) -> f64 {
    record.roi_weight.or_zero()
}

pub(crate) fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (value * factor).round() / factor
}
