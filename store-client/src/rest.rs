use crate::source::{DataSource, Query, RecordSet};
use async_trait::async_trait;
use dashboard_core::{
    ConfigError, ContentRecord, CostRecord, FetchError, RecordKind, StoreConfig,
};
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::fmt;
use std::time::Duration;
use tracing::{debug, error, warn};
use url::Url;

const REST_PREFIX: [&str; 2] = ["rest", "v1"];

/// Error body returned by the store's HTTP API.
#[derive(Debug, Deserialize)]
struct StoreErrorBody {
    message: Option<String>,
    code: Option<String>,
    hint: Option<String>,
}

/// Reads collections through the hosted store's REST interface.
#[derive(Clone)]
pub struct RestDataSource {
    http_client: Client,
    base_url: Url,
    api_key: String,
    content_table: String,
    cost_table: String,
}

impl RestDataSource {
    pub fn new(
        base_url: &str,
        api_key: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, FetchError> {
        let base_url = Url::parse(base_url).map_err(|e| {
            FetchError::transport(format!("invalid store url '{}': {}", base_url, e))
        })?;
        if base_url.cannot_be_a_base() {
            return Err(FetchError::transport(format!(
                "store url '{}' cannot be used as a base",
                base_url
            )));
        }

        let http_client = Client::builder()
            .user_agent(concat!("scraper-dashboard/", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .build()?;

        Ok(Self {
            http_client,
            base_url,
            api_key: api_key.into(),
            content_table: "posts".to_string(),
            cost_table: "cost_tracking".to_string(),
        })
    }

    pub fn from_config(config: &StoreConfig) -> Result<Self, ConfigError> {
        let url = config.url.as_deref().ok_or_else(|| ConfigError::MissingField {
            field: "store.url".to_string(),
        })?;
        let api_key = config.api_key.as_deref().ok_or_else(|| ConfigError::MissingField {
            field: "store.api_key".to_string(),
        })?;

        let source = Self::new(url, api_key, config.request_timeout()).map_err(|e| {
            ConfigError::InvalidValue {
                field: "store.url".to_string(),
                value: e.to_string(),
            }
        })?;
        Ok(source.with_tables(&config.content_table, &config.cost_table))
    }

    pub fn with_tables(mut self, content_table: &str, cost_table: &str) -> Self {
        self.content_table = content_table.to_string();
        self.cost_table = cost_table.to_string();
        self
    }

    pub fn table(&self, kind: RecordKind) -> &str {
        match kind {
            RecordKind::Content => &self.content_table,
            RecordKind::Cost => &self.cost_table,
        }
    }

    /// `{base}/rest/v1/{table}?select=*&order={column}.{asc|desc}`
    pub fn endpoint(&self, query: &Query) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty().extend(REST_PREFIX).push(self.table(query.kind()));
        }
        url.query_pairs_mut()
            .append_pair("select", "*")
            .append_pair(
                "order",
                &format!("{}.{}", query.order_by(), query.direction().as_str()),
            );
        url
    }

    async fn get_rows<T: DeserializeOwned>(&self, query: &Query) -> Result<Vec<T>, FetchError> {
        let url = self.endpoint(query);
        debug!("GET {}", url);

        let response = self
            .http_client
            .get(url.clone())
            .header("apikey", &self.api_key)
            .bearer_auth(&self.api_key)
            .header("Accept", "application/json")
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            let err = status_error(status, &body);
            error!("Store returned {} for {}: {}", status, query, err);
            return Err(err);
        }

        serde_json::from_str(&body).map_err(|e| {
            warn!("Could not decode {} rows: {}", query.kind().label(), e);
            FetchError::malformed(format!("{} rows: {}", query.kind().label(), e))
        })
    }
}

impl fmt::Debug for RestDataSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RestDataSource")
            .field("base_url", &self.base_url.as_str())
            .field("api_key", &"<redacted>")
            .field("content_table", &self.content_table)
            .field("cost_table", &self.cost_table)
            .finish()
    }
}

/// Maps a non-success HTTP status to a fetch error.
///
/// Client errors mean the store understood and refused the query; everything
/// else is treated as the store being unreachable.
pub fn status_error(status: StatusCode, body: &str) -> FetchError {
    if status.is_client_error() {
        FetchError::QueryRejected {
            reason: store_message(body).unwrap_or_else(|| status.to_string()),
            status_code: Some(status.as_u16()),
        }
    } else {
        FetchError::transport(format!("store responded with {}", status))
    }
}

fn store_message(body: &str) -> Option<String> {
    let parsed: StoreErrorBody = serde_json::from_str(body).ok()?;
    let message = parsed.message?;
    let mut reason = match parsed.code {
        Some(code) => format!("{} ({})", message, code),
        None => message,
    };
    if let Some(hint) = parsed.hint {
        reason.push_str(&format!("; hint: {}", hint));
    }
    Some(reason)
}

#[async_trait]
impl DataSource for RestDataSource {
    fn name(&self) -> &str {
        "rest"
    }

    async fn select_all(&self, query: &Query) -> Result<RecordSet, FetchError> {
        match query.kind() {
            RecordKind::Content => self
                .get_rows::<ContentRecord>(query)
                .await
                .map(RecordSet::Content),
            RecordKind::Cost => self.get_rows::<CostRecord>(query).await.map(RecordSet::Cost),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn source(base: &str) -> RestDataSource {
        RestDataSource::new(base, "anon-key", Duration::from_secs(5)).unwrap()
    }

    #[test]
    fn test_endpoint_format() {
        let rest = source("https://abc.supabase.co");
        let query = Query::new(RecordKind::Content, "processed_at", false).unwrap();
        assert_eq!(
            rest.endpoint(&query).as_str(),
            "https://abc.supabase.co/rest/v1/posts?select=*&order=processed_at.desc"
        );

        let query = Query::new(RecordKind::Cost, "month", true).unwrap();
        assert_eq!(
            rest.endpoint(&query).as_str(),
            "https://abc.supabase.co/rest/v1/cost_tracking?select=*&order=month.asc"
        );
    }

    #[test]
    fn test_endpoint_with_trailing_slash_and_custom_tables() {
        let rest = source("http://localhost:54321/").with_tables("scraped", "spend");
        let query = Query::new(RecordKind::Content, "roi_weight", false).unwrap();
        assert_eq!(
            rest.endpoint(&query).as_str(),
            "http://localhost:54321/rest/v1/scraped?select=*&order=roi_weight.desc"
        );
    }

    #[test]
    fn test_invalid_base_url() {
        let err = RestDataSource::new("not a url", "key", Duration::from_secs(1)).unwrap_err();
        assert!(err.is_transport());
    }

    #[test]
    fn test_from_config_requires_credentials() {
        let config = StoreConfig::default();
        let err = RestDataSource::from_config(&config).unwrap_err();
        assert!(matches!(err, ConfigError::MissingField { .. }));

        let config = StoreConfig {
            url: Some("https://abc.supabase.co".to_string()),
            api_key: Some("anon".to_string()),
            ..StoreConfig::default()
        };
        assert!(RestDataSource::from_config(&config).is_ok());
    }

    #[test]
    fn test_status_error_classification() {
        let body = r#"{"code":"42703","message":"column posts.nope does not exist","hint":null}"#;
        match status_error(StatusCode::BAD_REQUEST, body) {
            FetchError::QueryRejected { reason, status_code } => {
                assert_eq!(status_code, Some(400));
                assert_eq!(reason, "column posts.nope does not exist (42703)");
            }
            other => panic!("unexpected error: {:?}", other),
        }

        let rejected = status_error(StatusCode::UNAUTHORIZED, "not json");
        assert!(matches!(
            rejected,
            FetchError::QueryRejected {
                status_code: Some(401),
                ..
            }
        ));

        assert!(status_error(StatusCode::BAD_GATEWAY, "").is_transport());
        assert!(status_error(StatusCode::SERVICE_UNAVAILABLE, "{}").is_transport());
    }

    #[tokio::test]
    async fn test_unreachable_store_is_transport() {
        // nothing listens on port 9 locally
        let rest = RestDataSource::new("http://127.0.0.1:9", "key", Duration::from_secs(2)).unwrap();
        let query = Query::new(RecordKind::Cost, "month", true).unwrap();
        let err = rest.select_all(&query).await.unwrap_err();
        assert!(err.is_transport());
    }
}
