use crate::metrics::{FetchSample, MetricsCollector};
use crate::source::{DataSource, Query, Record};
use dashboard_core::{ErrorExt, FetchError};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Reads whole collections from a data source in a requested order.
///
/// One call is one round trip. Failures are returned as-is; retrying is up
/// to the caller.
#[derive(Clone)]
pub struct Fetcher {
    source: Arc<dyn DataSource>,
    metrics: Arc<MetricsCollector>,
}

impl Fetcher {
    pub fn new(source: Arc<dyn DataSource>) -> Self {
        Self {
            source,
            metrics: Arc::new(MetricsCollector::new()),
        }
    }

    pub fn with_metrics(mut self, metrics: Arc<MetricsCollector>) -> Self {
        self.metrics = metrics;
        self
    }

    pub fn metrics(&self) -> Arc<MetricsCollector> {
        Arc::clone(&self.metrics)
    }

    pub fn source_name(&self) -> &str {
        self.source.name()
    }

    /// Every record of type `R`, ordered by `order_by`.
    pub async fn fetch_all<R: Record>(
        &self,
        order_by: &str,
        ascending: bool,
    ) -> Result<Vec<R>, FetchError> {
        let query = Query::new(R::KIND, order_by, ascending)?;
        self.fetch(&query).await
    }

    pub async fn fetch<R: Record>(&self, query: &Query) -> Result<Vec<R>, FetchError> {
        let request_id = Uuid::new_v4();
        let started = Instant::now();
        debug!("[{}] Fetching {} from {}", request_id, query, self.source.name());

        let outcome = self
            .source
            .select_all(query)
            .await
            .and_then(R::unpack);
        let latency = started.elapsed();

        let sample = FetchSample {
            collection: query.kind().label().to_string(),
            backend: self.source.name().to_string(),
            rows: outcome.as_ref().map(|rows| rows.len() as u64).unwrap_or(0),
            latency,
            success: outcome.is_ok(),
            transport_failure: outcome.as_ref().err().map_or(false, FetchError::is_transport),
            error_code: outcome.as_ref().err().map(|e| e.error_code()),
        };
        self.metrics.record_fetch(sample).await;

        match &outcome {
            Ok(rows) => info!(
                "[{}] Fetched {} {} records in {:?}",
                request_id,
                rows.len(),
                query,
                latency
            ),
            Err(err) => warn!(
                "[{}] Fetch of {} failed after {:?}: {}",
                request_id, query, latency, err
            ),
        }

        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::StaticDataSource;
    use dashboard_core::{ContentRecord, CostRecord};

    fn fetcher(source: StaticDataSource) -> Fetcher {
        Fetcher::new(Arc::new(source))
    }

    #[tokio::test]
    async fn test_fetch_all_typed() {
        let fetcher = fetcher(StaticDataSource::new(
            vec![ContentRecord::new("a"), ContentRecord::new("b")],
            vec![CostRecord::new("c", "2024-01")],
        ));

        let content: Vec<ContentRecord> = fetcher.fetch_all("id", false).await.unwrap();
        assert_eq!(content.len(), 2);
        assert_eq!(content[0].id, "b");

        let cost: Vec<CostRecord> = fetcher.fetch_all("month", true).await.unwrap();
        assert_eq!(cost.len(), 1);

        let metrics = fetcher.metrics().get_metrics().await;
        assert_eq!(metrics.total_fetches, 2);
        assert_eq!(metrics.rows_fetched, 3);
    }

    #[tokio::test]
    async fn test_invalid_column_rejected_before_io() {
        let source = Arc::new(StaticDataSource::default());
        let fetcher = Fetcher::new(source.clone());

        let err = fetcher
            .fetch_all::<CostRecord>("relevance_score", true)
            .await
            .unwrap_err();
        assert!(!err.is_transport());
        assert_eq!(source.calls(), 0);
    }

    #[tokio::test]
    async fn test_no_retry_on_failure() {
        let source = Arc::new(
            StaticDataSource::default().with_failure(FetchError::transport("connection reset")),
        );
        let fetcher = Fetcher::new(source.clone());

        let err = fetcher
            .fetch_all::<ContentRecord>("processed_at", false)
            .await
            .unwrap_err();
        assert!(err.is_transport());
        assert_eq!(source.calls(), 1);

        let metrics = fetcher.metrics().get_metrics().await;
        assert_eq!(metrics.failed_fetches, 1);
        assert_eq!(metrics.transport_failures, 1);
    }

    #[tokio::test]
    async fn test_shared_metrics() {
        let metrics = Arc::new(MetricsCollector::new());
        let fetcher =
            fetcher(StaticDataSource::default()).with_metrics(Arc::clone(&metrics));

        fetcher.fetch_all::<CostRecord>("month", true).await.unwrap();
        assert_eq!(fetcher.source_name(), "static");
        assert!(metrics.get_collection_metrics("cost").await.is_some());
    }
}
