use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, SystemTime};
use tokio::sync::RwLock;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetchMetrics {
    pub total_fetches: u64,
    pub successful_fetches: u64,
    pub failed_fetches: u64,
    pub transport_failures: u64,
    pub rows_fetched: u64,
    pub average_latency: Duration,
    pub last_fetch_time: Option<SystemTime>,
    pub fetches_by_collection: HashMap<String, CollectionMetrics>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CollectionMetrics {
    pub fetch_count: u64,
    pub success_count: u64,
    pub error_count: u64,
    pub rows: u64,
    pub total_latency: Duration,
    pub min_latency: Duration,
    pub max_latency: Duration,
}

/// Outcome of one fetch, as reported by the fetcher.
#[derive(Debug, Clone)]
pub struct FetchSample {
    pub collection: String,
    pub backend: String,
    pub rows: u64,
    pub latency: Duration,
    pub success: bool,
    pub transport_failure: bool,
    pub error_code: Option<String>,
}

impl Default for FetchMetrics {
    fn default() -> Self {
        Self {
            total_fetches: 0,
            successful_fetches: 0,
            failed_fetches: 0,
            transport_failures: 0,
            rows_fetched: 0,
            average_latency: Duration::from_millis(0),
            last_fetch_time: None,
            fetches_by_collection: HashMap::new(),
        }
    }
}

impl CollectionMetrics {
    fn new() -> Self {
        Self {
            fetch_count: 0,
            success_count: 0,
            error_count: 0,
            rows: 0,
            total_latency: Duration::from_millis(0),
            min_latency: Duration::MAX,
            max_latency: Duration::from_millis(0),
        }
    }

    fn update(&mut self, sample: &FetchSample) {
        self.fetch_count += 1;
        self.rows += sample.rows;
        self.total_latency += sample.latency;
        self.min_latency = self.min_latency.min(sample.latency);
        self.max_latency = self.max_latency.max(sample.latency);

        if sample.success {
            self.success_count += 1;
        } else {
            self.error_count += 1;
        }
    }

    pub fn average_latency(&self) -> Duration {
        if self.fetch_count == 0 {
            Duration::from_millis(0)
        } else {
            self.total_latency / self.fetch_count as u32
        }
    }

    pub fn success_rate(&self) -> f64 {
        if self.fetch_count == 0 {
            0.0
        } else {
            self.success_count as f64 / self.fetch_count as f64
        }
    }
}

#[derive(Debug)]
pub struct MetricsCollector {
    metrics: Arc<RwLock<FetchMetrics>>,
}

impl MetricsCollector {
    pub fn new() -> Self {
        Self {
            metrics: Arc::new(RwLock::new(FetchMetrics::default())),
        }
    }

    pub async fn record_fetch(&self, sample: FetchSample) {
        let mut metrics = self.metrics.write().await;

        metrics.total_fetches += 1;
        metrics.last_fetch_time = Some(SystemTime::now());
        metrics.rows_fetched += sample.rows;

        if sample.success {
            metrics.successful_fetches += 1;
        } else {
            metrics.failed_fetches += 1;
        }

        if sample.transport_failure {
            metrics.transport_failures += 1;
        }

        // Running mean over all fetches
        let total_time = metrics.average_latency * metrics.total_fetches as u32
            - metrics.average_latency
            + sample.latency;
        metrics.average_latency = total_time / metrics.total_fetches as u32;

        metrics
            .fetches_by_collection
            .entry(sample.collection.clone())
            .or_insert_with(CollectionMetrics::new)
            .update(&sample);
    }

    pub async fn get_metrics(&self) -> FetchMetrics {
        self.metrics.read().await.clone()
    }

    pub async fn get_collection_metrics(&self, collection: &str) -> Option<CollectionMetrics> {
        let metrics = self.metrics.read().await;
        metrics.fetches_by_collection.get(collection).cloned()
    }

    pub async fn reset_metrics(&self) {
        let mut metrics = self.metrics.write().await;
        *metrics = FetchMetrics::default();
    }

    pub async fn export_metrics(&self) -> Result<String, serde_json::Error> {
        let metrics = self.get_metrics().await;
        serde_json::to_string_pretty(&metrics)
    }
}

impl Default for MetricsCollector {
    fn default() -> Self {
        Self::new()
    }
}
