pub mod fetcher;
pub mod memory;
pub mod metrics;
#[cfg(feature = "postgres")]
pub mod postgres;
pub mod rest;
pub mod source;

#[cfg(test)]
mod tests;

pub use fetcher::Fetcher;
pub use memory::StaticDataSource;
pub use metrics::{CollectionMetrics, FetchMetrics, FetchSample, MetricsCollector};
#[cfg(feature = "postgres")]
pub use postgres::PgDataSource;
pub use rest::RestDataSource;
pub use source::{DataSource, Query, Record, RecordSet, SortDirection};

use dashboard_core::{ConfigError, StoreBackend, StoreConfig};
use std::sync::Arc;
use tracing::info;

/// Builds the data source selected by `config.backend`.
pub fn connect(config: &StoreConfig) -> Result<Arc<dyn DataSource>, ConfigError> {
    let source: Arc<dyn DataSource> = match config.backend {
        StoreBackend::Rest => Arc::new(RestDataSource::from_config(config)?),
        #[cfg(feature = "postgres")]
        StoreBackend::Postgres => Arc::new(PgDataSource::from_config(config)?),
        #[cfg(not(feature = "postgres"))]
        StoreBackend::Postgres => {
            return Err(ConfigError::InvalidValue {
                field: "store.backend".to_string(),
                value: "postgres (built without the postgres feature)".to_string(),
            })
        }
    };

    info!("Using {} data source", source.name());
    Ok(source)
}
