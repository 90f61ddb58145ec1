#[cfg(test)]
mod tests {
    use crate::{connect, memory, rest, Fetcher, StaticDataSource};
    use dashboard_core::{
        ConfigError, ContentRecord, CostRecord, FetchError, StoreBackend, StoreConfig,
    };
    use std::sync::Arc;

    fn rest_config() -> StoreConfig {
        StoreConfig {
            url: Some("https://project.supabase.co".to_string()),
            api_key: Some("anon-key".to_string()),
            ..StoreConfig::default()
        }
    }

    fn store_payload() -> Vec<ContentRecord> {
        let json = r#"[
            {"id": "1", "url": "", "title": "CRM pain", "subreddit": "startups",
             "type": "post", "relevance_score": 8.2, "roi_weight": 7,
             "processed_at": "2024-06-02T08:30:00+00:00", "insight_processed": true},
            {"id": "2", "url": "", "body": "we switched tools", "subreddit": "saas",
             "type": "comment", "relevance_score": null, "roi_weight": 3.5,
             "processed_at": null, "created_utc": "2024-06-01 10:00:00"},
            {"id": "3", "url": "", "title": "Hiring", "type": "post",
             "processed_at": "2024-06-03T11:00:00.25"}
        ]"#;
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_connect_rest_backend() {
        let source = connect(&rest_config()).unwrap();
        assert_eq!(source.name(), "rest");
    }

    #[test]
    fn test_connect_rest_missing_credentials() {
        let result = connect(&StoreConfig::default());
        assert!(matches!(result, Err(ConfigError::MissingField { .. })));
    }

    #[test]
    #[cfg(feature = "postgres")]
    fn test_connect_postgres_missing_url() {
        let config = StoreConfig {
            backend: StoreBackend::Postgres,
            ..StoreConfig::default()
        };
        assert!(matches!(
            connect(&config),
            Err(ConfigError::MissingField { .. })
        ));
    }

    #[test]
    #[cfg(not(feature = "postgres"))]
    fn test_connect_postgres_needs_feature() {
        let config = StoreConfig {
            backend: StoreBackend::Postgres,
            database_url: Some("postgres://localhost/scraper".to_string()),
            ..StoreConfig::default()
        };
        assert!(matches!(
            connect(&config),
            Err(ConfigError::InvalidValue { .. })
        ));
    }

    #[test]
    fn test_store_payload_decodes_and_sorts() {
        let fetcher = Fetcher::new(Arc::new(StaticDataSource::new(store_payload(), Vec::new())));

        let by_processed: Vec<ContentRecord> =
            tokio_test::block_on(fetcher.fetch_all("processed_at", false)).unwrap();
        let ids: Vec<&str> = by_processed.iter().map(|r| r.id.as_str()).collect();
        // descending puts nulls first
        assert_eq!(ids, vec!["2", "3", "1"]);

        let by_roi: Vec<ContentRecord> =
            tokio_test::block_on(fetcher.fetch_all("roi_weight", false)).unwrap();
        assert_eq!(by_roi[1].id, "1");
        assert_eq!(by_roi[2].id, "2");
    }

    #[test]
    fn test_failure_kinds_survive_fetcher() {
        let rejected = rest::status_error(reqwest::StatusCode::NOT_FOUND, "");
        let fetcher = Fetcher::new(Arc::new(
            memory::StaticDataSource::default().with_failure(rejected.clone()),
        ));

        let err = tokio_test::block_on(fetcher.fetch_all::<CostRecord>("month", true)).unwrap_err();
        assert_eq!(err, rejected);
        assert!(!err.is_transport());

        let fetcher = Fetcher::new(Arc::new(
            StaticDataSource::default().with_failure(FetchError::malformed("truncated body")),
        ));
        let err = tokio_test::block_on(fetcher.fetch_all::<CostRecord>("month", true)).unwrap_err();
        assert!(matches!(err, FetchError::MalformedResponse { .. }));
    }

    #[tokio::test]
    async fn test_metrics_export_after_mixed_fetches() {
        let fetcher = Fetcher::new(Arc::new(
            StaticDataSource::new(store_payload(), Vec::new())
                .failing_first(1, FetchError::transport("reset")),
        ));

        assert!(fetcher.fetch_all::<ContentRecord>("id", true).await.is_err());
        let rows = fetcher.fetch_all::<ContentRecord>("id", true).await.unwrap();
        assert_eq!(rows.len(), 3);

        let metrics = fetcher.metrics();
        let content = metrics.get_collection_metrics("content").await.unwrap();
        assert_eq!(content.fetch_count, 2);
        assert_eq!(content.success_count, 1);
        assert_eq!(content.rows, 3);

        let exported = metrics.export_metrics().await.unwrap();
        assert!(exported.contains("transport_failures"));
    }
}
