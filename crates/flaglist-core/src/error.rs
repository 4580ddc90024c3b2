use thiserror::Error;

/// Failure reported by a list backend. Passed to the view unchanged.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FetchError {
    #[error("backend unavailable: {0}")]
    Unavailable(String),
    #[error("invalid argument: {field}")]
    InvalidArgument { field: String },
    #[error("internal error: {0}")]
    Internal(String),
}

impl FetchError {
    pub fn invalid_argument(field: impl Into<String>) -> Self {
        FetchError::InvalidArgument {
            field: field.into(),
        }
    }
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid config value for {key}: {reason}")]
    Invalid { key: &'static str, reason: String },
}
