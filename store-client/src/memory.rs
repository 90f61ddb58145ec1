use crate::source::{DataSource, Query, RecordSet};
use async_trait::async_trait;
use dashboard_core::{timestamp, ContentRecord, CostRecord, FetchError, RecordKind};
use serde::Serialize;
use serde_json::Value;
use std::cmp::Ordering;
use std::sync::atomic::{AtomicUsize, Ordering as AtomicOrdering};
use tracing::debug;

/// In-memory data source for fixtures and offline runs.
///
/// Sorting follows Postgres semantics: nulls sort last ascending and first
/// descending, and equal keys keep their stored order.
#[derive(Debug, Default)]
pub struct StaticDataSource {
    content: Vec<ContentRecord>,
    cost: Vec<CostRecord>,
    failure: Option<FetchError>,
    failures_left: Option<AtomicUsize>,
    calls: AtomicUsize,
}

impl StaticDataSource {
    pub fn new(content: Vec<ContentRecord>, cost: Vec<CostRecord>) -> Self {
        Self {
            content,
            cost,
            ..Self::default()
        }
    }

    /// Every select fails with `error`.
    pub fn with_failure(mut self, error: FetchError) -> Self {
        self.failure = Some(error);
        self.failures_left = None;
        self
    }

    /// The first `times` selects fail with `error`, later ones succeed.
    pub fn failing_first(mut self, times: usize, error: FetchError) -> Self {
        self.failure = Some(error);
        self.failures_left = Some(AtomicUsize::new(times));
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(AtomicOrdering::SeqCst)
    }

    fn injected_failure(&self) -> Option<FetchError> {
        let error = self.failure.as_ref()?;
        match &self.failures_left {
            None => Some(error.clone()),
            Some(left) => left
                .fetch_update(AtomicOrdering::SeqCst, AtomicOrdering::SeqCst, |n| {
                    n.checked_sub(1)
                })
                .ok()
                .map(|_| error.clone()),
        }
    }
}

#[async_trait]
impl DataSource for StaticDataSource {
    fn name(&self) -> &str {
        "static"
    }

    async fn select_all(&self, query: &Query) -> Result<RecordSet, FetchError> {
        self.calls.fetch_add(1, AtomicOrdering::SeqCst);

        if let Some(error) = self.injected_failure() {
            debug!("Injected failure for {}: {}", query, error);
            return Err(error);
        }

        match query.kind() {
            RecordKind::Content => Ok(RecordSet::Content(sorted(&self.content, query)?)),
            RecordKind::Cost => Ok(RecordSet::Cost(sorted(&self.cost, query)?)),
        }
    }
}

fn sorted<T: Serialize + Clone>(rows: &[T], query: &Query) -> Result<Vec<T>, FetchError> {
    let mut keyed = rows
        .iter()
        .map(|row| {
            let value = serde_json::to_value(row)
                .map_err(|e| FetchError::malformed(e.to_string()))?;
            let key = value.get(query.order_by()).cloned().unwrap_or(Value::Null);
            Ok((key, row.clone()))
        })
        .collect::<Result<Vec<_>, FetchError>>()?;

    let ascending = query.direction().is_ascending();
    keyed.sort_by(|(a, _), (b, _)| {
        let ordering = compare_values(a, b);
        if ascending {
            ordering
        } else {
            ordering.reverse()
        }
    });

    Ok(keyed.into_iter().map(|(_, row)| row).collect())
}

/// Ascending order with nulls greater than every value.
fn compare_values(a: &Value, b: &Value) -> Ordering {
    match (a, b) {
        (Value::Null, Value::Null) => Ordering::Equal,
        (Value::Null, _) => Ordering::Greater,
        (_, Value::Null) => Ordering::Less,
        (Value::Number(x), Value::Number(y)) => {
            let x = x.as_f64().unwrap_or(f64::NAN);
            let y = y.as_f64().unwrap_or(f64::NAN);
            x.partial_cmp(&y).unwrap_or(Ordering::Equal)
        }
        (Value::String(x), Value::String(y)) => match (timestamp::parse(x), timestamp::parse(y)) {
            (Some(x), Some(y)) => x.cmp(&y),
            _ => x.cmp(y),
        },
        (Value::Bool(x), Value::Bool(y)) => x.cmp(y),
        _ => Ordering::Equal,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn content(id: &str, roi: Option<f64>) -> ContentRecord {
        let mut record = ContentRecord::new(id);
        record.roi_weight = roi;
        record
    }

    fn ids(set: RecordSet) -> Vec<String> {
        match set {
            RecordSet::Content(rows) => rows.into_iter().map(|r| r.id).collect(),
            RecordSet::Cost(rows) => rows.into_iter().map(|r| r.id).collect(),
        }
    }

    #[tokio::test]
    async fn test_sorts_with_postgres_null_order() {
        let source = StaticDataSource::new(
            vec![
                content("a", Some(2.0)),
                content("b", None),
                content("c", Some(9.5)),
                content("d", Some(2.0)),
            ],
            Vec::new(),
        );

        let desc = Query::new(RecordKind::Content, "roi_weight", false).unwrap();
        assert_eq!(ids(source.select_all(&desc).await.unwrap()), vec!["b", "c", "a", "d"]);

        let asc = Query::new(RecordKind::Content, "roi_weight", true).unwrap();
        assert_eq!(ids(source.select_all(&asc).await.unwrap()), vec!["a", "d", "c", "b"]);
        assert_eq!(source.calls(), 2);
    }

    #[tokio::test]
    async fn test_sorts_timestamps_chronologically() {
        let mut early = ContentRecord::new("early");
        early.processed_at = Some(Utc.with_ymd_and_hms(2024, 6, 1, 10, 0, 0).unwrap());
        let mut late = ContentRecord::new("late");
        // fractional seconds must not break ordering
        late.processed_at = Some(
            Utc.with_ymd_and_hms(2024, 6, 1, 10, 0, 0).unwrap() + chrono::Duration::milliseconds(500),
        );

        let source = StaticDataSource::new(vec![late, early], Vec::new());
        let query = Query::new(RecordKind::Content, "processed_at", true).unwrap();
        assert_eq!(ids(source.select_all(&query).await.unwrap()), vec!["early", "late"]);
    }

    #[tokio::test]
    async fn test_sorts_by_renamed_type_column() {
        let mut post = ContentRecord::new("p");
        post.content_type = Some("post".to_string());
        let mut comment = ContentRecord::new("c");
        comment.content_type = Some("comment".to_string());

        let source = StaticDataSource::new(vec![post, comment], Vec::new());
        let query = Query::new(RecordKind::Content, "type", true).unwrap();
        assert_eq!(ids(source.select_all(&query).await.unwrap()), vec!["c", "p"]);
    }

    #[tokio::test]
    async fn test_cost_months() {
        let source = StaticDataSource::new(
            Vec::new(),
            vec![
                CostRecord::new("2", "2024-02"),
                CostRecord::new("1", "2024-01"),
            ],
        );
        let query = Query::new(RecordKind::Cost, "month", true).unwrap();
        assert_eq!(ids(source.select_all(&query).await.unwrap()), vec!["1", "2"]);
    }

    #[tokio::test]
    async fn test_injected_failures() {
        let query = Query::new(RecordKind::Cost, "month", true).unwrap();

        let always = StaticDataSource::default().with_failure(FetchError::transport("offline"));
        assert!(always.select_all(&query).await.unwrap_err().is_transport());
        assert!(always.select_all(&query).await.is_err());

        let flaky = StaticDataSource::default().failing_first(1, FetchError::transport("blip"));
        assert!(flaky.select_all(&query).await.is_err());
        assert!(flaky.select_all(&query).await.unwrap().is_empty());
        assert_eq!(flaky.calls(), 2);
    }
}
