use thiserror::Error;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Fetch error: {0}")]
    Fetch(#[from] FetchError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Invalid input: {message}")]
    InvalidInput { message: String },

    #[error("Internal error: {message}")]
    Internal { message: String },
}

/// Failure of a single round trip to the record store.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FetchError {
    #[error("Transport failure: {reason}")]
    Transport { reason: String },

    #[error("Query rejected by store: {reason}")]
    QueryRejected {
        reason: String,
        status_code: Option<u16>,
    },

    #[error("Malformed response: {details}")]
    MalformedResponse { details: String },
}

impl FetchError {
    pub fn transport(reason: impl Into<String>) -> Self {
        FetchError::Transport {
            reason: reason.into(),
        }
    }

    pub fn rejected(reason: impl Into<String>) -> Self {
        FetchError::QueryRejected {
            reason: reason.into(),
            status_code: None,
        }
    }

    pub fn malformed(details: impl Into<String>) -> Self {
        FetchError::MalformedResponse {
            details: details.into(),
        }
    }

    pub fn is_transport(&self) -> bool {
        matches!(self, FetchError::Transport { .. })
    }
}

impl From<reqwest::Error> for FetchError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            return FetchError::malformed(err.to_string());
        }

        match err.status() {
            Some(status) if status.is_client_error() => FetchError::QueryRejected {
                reason: err.to_string(),
                status_code: Some(status.as_u16()),
            },
            _ => FetchError::transport(err.to_string()),
        }
    }
}

#[cfg(feature = "postgres")]
impl From<sqlx::Error> for FetchError {
    fn from(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::Database(db_err) => FetchError::rejected(db_err.message()),
            sqlx::Error::RowNotFound
            | sqlx::Error::TypeNotFound { .. }
            | sqlx::Error::ColumnNotFound(_)
            | sqlx::Error::ColumnIndexOutOfBounds { .. } => FetchError::rejected(err.to_string()),
            sqlx::Error::ColumnDecode { .. } | sqlx::Error::Decode(_) => {
                FetchError::malformed(err.to_string())
            }
            _ => FetchError::transport(err.to_string()),
        }
    }
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Configuration file not found: {path}")]
    FileNotFound { path: String },

    #[error("Missing required field: {field}")]
    MissingField { field: String },

    #[error("Invalid value for {field}: {value}")]
    InvalidValue { field: String, value: String },

    #[error("Environment variable not set: {var_name}")]
    MissingEnvironmentVariable { var_name: String },

    #[error("Configuration validation failed: {reason}")]
    ValidationFailed { reason: String },

    #[error("Configuration parsing error: {0}")]
    Parse(#[from] toml::de::Error),
}
