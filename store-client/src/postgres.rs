use crate::source::{DataSource, Query, RecordSet, SortDirection};
use async_trait::async_trait;
use dashboard_core::{ConfigError, ContentRecord, CostRecord, FetchError, RecordKind, StoreConfig};
use sqlx::postgres::{PgPool, PgPoolOptions};
use std::sync::Arc;
use tracing::{debug, info};

/// Reads collections straight from the store's Postgres database.
#[derive(Debug, Clone)]
pub struct PgDataSource {
    pool: Arc<PgPool>,
    content_table: String,
    cost_table: String,
}

impl PgDataSource {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool: Arc::new(pool),
            content_table: "posts".to_string(),
            cost_table: "cost_tracking".to_string(),
        }
    }

    /// Builds a lazily connecting pool; the first fetch opens the connection.
    pub fn from_config(config: &StoreConfig) -> Result<Self, ConfigError> {
        let database_url = config
            .database_url
            .as_deref()
            .ok_or_else(|| ConfigError::MissingField {
                field: "store.database_url".to_string(),
            })?;

        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(config.request_timeout())
            .connect_lazy(database_url)
            .map_err(|e| ConfigError::InvalidValue {
                field: "store.database_url".to_string(),
                value: e.to_string(),
            })?;

        info!(
            "Postgres pool configured with {} max connections",
            config.max_connections
        );

        Ok(Self::new(pool).with_tables(&config.content_table, &config.cost_table))
    }

    pub fn with_tables(mut self, content_table: &str, cost_table: &str) -> Self {
        self.content_table = content_table.to_string();
        self.cost_table = cost_table.to_string();
        self
    }

    pub fn select_sql(&self, query: &Query) -> String {
        let (table, columns) = match query.kind() {
            RecordKind::Content => (&self.content_table, CONTENT_COLUMNS),
            RecordKind::Cost => (&self.cost_table, COST_COLUMNS),
        };

        let direction = match query.direction() {
            SortDirection::Ascending => "ASC",
            SortDirection::Descending => "DESC",
        };

        format!(
            "SELECT {} FROM {} ORDER BY {} {}",
            columns.join(", "),
            quote_ident(table),
            quote_ident(query.order_by()),
            direction
        )
    }
}

// Casts keep decoding stable when column types drift (numeric vs float,
// int vs bigint, text timestamps).
const CONTENT_COLUMNS: &[&str] = &[
    "id::text AS id",
    "coalesce(url::text, '') AS url",
    "title::text AS title",
    "body::text AS body",
    "subreddit::text AS subreddit",
    "created_utc::timestamptz AS created_utc",
    "last_active::timestamptz AS last_active",
    "processed_at::timestamptz AS processed_at",
    "relevance_score::float8 AS relevance_score",
    "emotion_score::float8 AS emotion_score",
    "pain_score::float8 AS pain_score",
    "lead_type::text AS lead_type",
    "tags::text AS tags",
    "roi_weight::float8 AS roi_weight",
    "community_type::text AS community_type",
    "\"type\"::text AS \"type\"",
    "coalesce(insight_processed, false) AS insight_processed",
    "created_at::timestamptz AS created_at",
];

const COST_COLUMNS: &[&str] = &[
    "id::text AS id",
    "month::text AS month",
    "total_cost::float8 AS total_cost",
    "input_tokens::int8 AS input_tokens",
    "output_tokens::int8 AS output_tokens",
    "model::text AS model",
    "monthly_budget::float8 AS monthly_budget",
    "created_at::timestamptz AS created_at",
    "updated_at::timestamptz AS updated_at",
];

fn quote_ident(ident: &str) -> String {
    format!("\"{}\"", ident.replace('"', "\"\""))
}

#[async_trait]
impl DataSource for PgDataSource {
    fn name(&self) -> &str {
        "postgres"
    }

    async fn select_all(&self, query: &Query) -> Result<RecordSet, FetchError> {
        let sql = self.select_sql(query);
        debug!("Executing: {}", sql);

        match query.kind() {
            RecordKind::Content => {
                let rows = sqlx::query_as::<_, ContentRecord>(&sql)
                    .fetch_all(&*self.pool)
                    .await?;
                Ok(RecordSet::Content(rows))
            }
            RecordKind::Cost => {
                let rows = sqlx::query_as::<_, CostRecord>(&sql)
                    .fetch_all(&*self.pool)
                    .await?;
                Ok(RecordSet::Cost(rows))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lazy_source() -> PgDataSource {
        let config = StoreConfig {
            database_url: Some("postgres://dashboard@localhost:5432/scraper".to_string()),
            ..StoreConfig::default()
        };
        PgDataSource::from_config(&config).unwrap()
    }

    #[tokio::test]
    async fn test_select_sql_orders_by_quoted_column() {
        let source = lazy_source();
        let query = Query::new(RecordKind::Cost, "month", true).unwrap();
        let sql = source.select_sql(&query);

        assert!(sql.starts_with("SELECT id::text AS id, month::text AS month"));
        assert!(sql.ends_with("FROM \"cost_tracking\" ORDER BY \"month\" ASC"));
    }

    #[tokio::test]
    async fn test_select_sql_content() {
        let source = lazy_source().with_tables("scraped posts", "spend");
        let query = Query::new(RecordKind::Content, "type", false).unwrap();
        let sql = source.select_sql(&query);

        assert!(sql.contains("\"type\"::text AS \"type\""));
        assert!(sql.contains("FROM \"scraped posts\""));
        assert!(sql.ends_with("ORDER BY \"type\" DESC"));
    }

    #[test]
    fn test_every_column_is_selected() {
        for (kind, columns) in [
            (RecordKind::Content, CONTENT_COLUMNS),
            (RecordKind::Cost, COST_COLUMNS),
        ] {
            assert_eq!(kind.columns().len(), columns.len());
            for column in kind.columns() {
                let plain = format!("AS {}", column);
                let quoted = format!("AS \"{}\"", column);
                assert!(
                    columns.iter().any(|c| c.ends_with(&plain) || c.ends_with(&quoted)),
                    "missing column {}",
                    column
                );
            }
        }
    }

    #[test]
    fn test_quote_ident_escapes() {
        assert_eq!(quote_ident("posts"), "\"posts\"");
        assert_eq!(quote_ident("we\"ird"), "\"we\"\"ird\"");
    }

    #[test]
    fn test_from_config_requires_database_url() {
        let err = PgDataSource::from_config(&StoreConfig::default()).unwrap_err();
        assert!(matches!(err, ConfigError::MissingField { .. }));
    }
}
