use thiserror::Error;

/// Custom error type for cooccur operations.
#[derive(Debug, Error)]
pub enum CooccurError {
    /// Input or configuration validation failed.
    #[error("Validation error: {0}")]
    Validation(String),

    /// A mention record is missing a required field or carries an unusable value.
    #[error("Malformed mention at record {index}: {reason}")]
    MalformedMention { index: usize, reason: String },

    /// Input could not be decoded in the requested format.
    #[error("Parse error ({format}): {message}")]
    Parse { format: String, message: String },

    /// Configuration file could not be loaded.
    #[error("Config error: {0}")]
    Config(String),

    /// Filesystem operation failed.
    #[error("I/O error: {0}")]
    Io(String),

    /// Graph library rejected an operation.
    #[error("Graph error: {0}")]
    Graph(String),
}

impl From<std::io::Error> for CooccurError {
    fn from(err: std::io::Error) -> Self {
        CooccurError::Io(err.to_string())
    }
}

impl From<serde_json::Error> for CooccurError {
    fn from(err: serde_json::Error) -> Self {
        CooccurError::Parse {
            format: "json".to_string(),
            message: err.to_string(),
        }
    }
}

impl From<csv::Error> for CooccurError {
    fn from(err: csv::Error) -> Self {
        CooccurError::Parse {
            format: "csv".to_string(),
            message: err.to_string(),
        }
    }
}

impl From<serde_yaml_ng::Error> for CooccurError {
    fn from(err: serde_yaml_ng::Error) -> Self {
        CooccurError::Parse {
            format: "yaml".to_string(),
            message: err.to_string(),
        }
    }
}

impl From<toml::de::Error> for CooccurError {
    fn from(err: toml::de::Error) -> Self {
        CooccurError::Config(format!("Invalid TOML: {}", err))
    }
}
