//! Error types for the openstatus CLI

/// Errors that can occur while managing monitors
#[derive(Debug, thiserror::Error)]
pub enum OpenstatusError {
    #[error("Config does not exist: {0}")]
    ConfigNotFound(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Lock file error: {0}")]
    Lock(String),

    #[error("HTTP request failed: {0}")]
    Http(String),

    #[error("API error: {0}")]
    Api(String),

    #[error("Invalid API response: {0}")]
    InvalidResponse(String),

    #[error("Test run failed: {0}")]
    RunFailed(String),

    #[error("Failed to read user input: {0}")]
    Prompt(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

/// Result type alias for openstatus operations
pub type Result<T> = std::result::Result<T, OpenstatusError>;
