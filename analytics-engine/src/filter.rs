use crate::coerce::relevance;
use dashboard_core::ContentRecord;
use serde::{Deserialize, Serialize};

/// Sentinel meaning "no filter" for the categorical criteria.
pub const ALL: &str = "all";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FilterCriteria {
    pub search_text: String,
    pub community: String,
    pub content_type: String,
    pub min_relevance: f64,
}

impl Default for FilterCriteria {
    fn default() -> Self {
        Self {
            search_text: String::new(),
            community: ALL.to_string(),
            content_type: ALL.to_string(),
            min_relevance: 0.0,
        }
    }
}

impl FilterCriteria {
    pub fn with_search(mut self, text: impl Into<String>) -> Self {
        self.search_text = text.into();
        self
    }

    pub fn with_community(mut self, community: impl Into<String>) -> Self {
        self.community = community.into();
        self
    }

    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = content_type.into();
        self
    }

    pub fn with_min_relevance(mut self, threshold: f64) -> Self {
        self.min_relevance = threshold;
        self
    }

    pub fn is_active(&self) -> bool {
        *self != Self::default()
    }

    /// True when `record` passes every active criterion.
    pub fn matches(&self, record: &ContentRecord) -> bool {
        self.matches_search(record)
            && (self.community == ALL || record.subreddit.as_deref() == Some(self.community.as_str()))
            && (self.content_type == ALL
                || record.content_type.as_deref() == Some(self.content_type.as_str()))
            && (self.min_relevance <= 0.0 || relevance(record) >= self.min_relevance)
    }

    fn matches_search(&self, record: &ContentRecord) -> bool {
        if self.search_text.is_empty() {
            return true;
        }
        let needle = self.search_text.to_lowercase();
        [&record.title, &record.body, &record.subreddit]
            .into_iter()
            .flatten()
            .any(|field| field.to_lowercase().contains(&needle))
    }
}

/// Keeps the records matching `criteria`, preserving their relative order.
pub fn apply_filters(records: &[ContentRecord], criteria: &FilterCriteria) -> Vec<ContentRecord> {
    records
        .iter()
        .filter(|record| criteria.matches(record))
        .cloned()
        .collect()
}
