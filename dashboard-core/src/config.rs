use crate::error::ConfigError;
use crate::error_recovery::RetryPolicy;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use tracing::{debug, info};

pub const CONFIG_PATH_ENV: &str = "DASHBOARD_CONFIG";
pub const DEFAULT_CONFIG_PATH: &str = "dashboard.toml";
pub const STORE_URL_ENV: &str = "SUPABASE_URL";
pub const STORE_KEY_ENV: &str = "SUPABASE_ANON_KEY";
pub const DATABASE_URL_ENV: &str = "DATABASE_URL";
pub const BACKEND_ENV: &str = "DASHBOARD_BACKEND";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    /// The hosted store's HTTP query API
    #[default]
    Rest,
    /// Direct Postgres connection
    Postgres,
}

impl std::str::FromStr for StoreBackend {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "rest" => Ok(StoreBackend::Rest),
            "postgres" | "pg" => Ok(StoreBackend::Postgres),
            other => Err(ConfigError::InvalidValue {
                field: "store.backend".to_string(),
                value: other.to_string(),
            }),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    pub backend: StoreBackend,
    pub url: Option<String>,
    pub api_key: Option<String>,
    pub database_url: Option<String>,
    pub request_timeout_secs: u64,
    pub max_connections: u32,
    pub content_table: String,
    pub cost_table: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            backend: StoreBackend::Rest,
            url: None,
            api_key: None,
            database_url: None,
            request_timeout_secs: 30,
            max_connections: 4,
            content_table: "posts".to_string(),
            cost_table: "cost_tracking".to_string(),
        }
    }
}

impl StoreConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecoveryConfig {
    pub max_attempts: usize,
    pub initial_delay_ms: u64,
    pub max_delay_ms: u64,
}

impl Default for RecoveryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 1,
            initial_delay_ms: 500,
            max_delay_ms: 10_000,
        }
    }
}

impl RecoveryConfig {
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_attempts: self.max_attempts,
            initial_delay: Duration::from_millis(self.initial_delay_ms),
            max_delay: Duration::from_millis(self.max_delay_ms),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    pub top_posts: usize,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self { top_posts: 10 }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    pub log_filter: String,
    pub store: StoreConfig,
    pub recovery: RecoveryConfig,
    pub display: DisplayConfig,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            log_filter: "scraper_dashboard=info,dashboard_core=info,views=info,store_client=info".to_string(),
            store: StoreConfig::default(),
            recovery: RecoveryConfig::default(),
            display: DisplayConfig::default(),
        }
    }
}

impl DashboardConfig {
    pub fn from_toml_str(raw: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(raw)?)
    }

    /// Reads `path` if given, else the default file when it exists.
    pub fn from_file(path: Option<&Path>) -> Result<Self, ConfigError> {
        let (path, required) = match path {
            Some(path) => (path, true),
            None => (Path::new(DEFAULT_CONFIG_PATH), false),
        };

        if !path.exists() {
            if required {
                return Err(ConfigError::FileNotFound {
                    path: path.display().to_string(),
                });
            }
            debug!("No config file at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let raw = std::fs::read_to_string(path).map_err(|_| ConfigError::FileNotFound {
            path: path.display().to_string(),
        })?;
        info!("Loaded configuration from {}", path.display());
        Self::from_toml_str(&raw)
    }

    /// Loads file configuration, applies environment overrides and validates.
    pub fn load() -> Result<Self, ConfigError> {
        let explicit = std::env::var(CONFIG_PATH_ENV).ok();
        let mut config = Self::from_file(explicit.as_deref().map(Path::new))?;
        config.apply_overrides(|name| std::env::var(name).ok())?;
        config.validate()?;
        Ok(config)
    }

    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(backend) = lookup(BACKEND_ENV) {
            self.store.backend = backend.parse()?;
        }
        if let Some(url) = lookup(STORE_URL_ENV) {
            self.store.url = Some(url);
        }
        if let Some(key) = lookup(STORE_KEY_ENV) {
            self.store.api_key = Some(key);
        }
        if let Some(database_url) = lookup(DATABASE_URL_ENV) {
            self.store.database_url = Some(database_url);
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        match self.store.backend {
            StoreBackend::Rest => {
                if is_blank(&self.store.url) {
                    return Err(ConfigError::MissingEnvironmentVariable {
                        var_name: STORE_URL_ENV.to_string(),
                    });
                }
                if is_blank(&self.store.api_key) {
                    return Err(ConfigError::MissingEnvironmentVariable {
                        var_name: STORE_KEY_ENV.to_string(),
                    });
                }
            }
            StoreBackend::Postgres => {
                if is_blank(&self.store.database_url) {
                    return Err(ConfigError::MissingEnvironmentVariable {
                        var_name: DATABASE_URL_ENV.to_string(),
                    });
                }
            }
        }

        if self.store.request_timeout_secs == 0 {
            return Err(ConfigError::InvalidValue {
                field: "store.request_timeout_secs".to_string(),
                value: "0".to_string(),
            });
        }
        if self.store.max_connections == 0 {
            return Err(ConfigError::InvalidValue {
                field: "store.max_connections".to_string(),
                value: "0".to_string(),
            });
        }
        if self.store.content_table.is_empty() || self.store.cost_table.is_empty() {
            return Err(ConfigError::ValidationFailed {
                reason: "table names must not be empty".to_string(),
            });
        }
        if self.recovery.max_attempts == 0 {
            return Err(ConfigError::InvalidValue {
                field: "recovery.max_attempts".to_string(),
                value: "0".to_string(),
            });
        }
        if self.recovery.initial_delay_ms > self.recovery.max_delay_ms {
            return Err(ConfigError::ValidationFailed {
                reason: "recovery.initial_delay_ms exceeds recovery.max_delay_ms".to_string(),
            });
        }
        Ok(())
    }
}

fn is_blank(value: &Option<String>) -> bool {
    value.as_deref().map(str::trim).unwrap_or_default().is_empty()
}
