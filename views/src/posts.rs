use crate::card::PostCard;
use analytics_engine::{apply_filters, distinct_communities, FilterCriteria};
use dashboard_core::ContentRecord;
use serde::Serialize;
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PostsModel {
    pub total: usize,
    pub showing: usize,
    pub communities: Vec<String>,
    pub criteria: FilterCriteria,
    pub posts: Vec<PostCard>,
}

/// A fetched posts snapshot that can be re-filtered without another fetch.
#[derive(Debug, Clone)]
pub struct PostsSession {
    snapshot: Vec<ContentRecord>,
    communities: Vec<String>,
    criteria: FilterCriteria,
}

impl PostsSession {
    pub fn new(snapshot: Vec<ContentRecord>) -> Self {
        let communities = distinct_communities(&snapshot);
        Self {
            snapshot,
            communities,
            criteria: FilterCriteria::default(),
        }
    }

    pub fn criteria(&self) -> &FilterCriteria {
        &self.criteria
    }

    pub fn set_criteria(&mut self, criteria: FilterCriteria) -> PostsModel {
        debug!("Re-filtering {} posts with {:?}", self.snapshot.len(), criteria);
        self.criteria = criteria;
        self.model()
    }

    pub fn model(&self) -> PostsModel {
        let filtered = apply_filters(&self.snapshot, &self.criteria);
        PostsModel {
            total: self.snapshot.len(),
            showing: filtered.len(),
            communities: self.communities.clone(),
            criteria: self.criteria.clone(),
            posts: filtered.iter().map(PostCard::from_record).collect(),
        }
    }
}
