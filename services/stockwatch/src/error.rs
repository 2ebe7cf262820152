//! Error types for the stockwatch service

/// Errors that can occur in the stockwatch service
#[derive(Debug, thiserror::Error)]
pub enum StockwatchError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("HTTP request failed: {0}")]
    Http(String),

    #[error("Fetch failed: {0}")]
    Fetch(String),

    #[error("Selector matched nothing: {0}")]
    Selector(String),

    #[error("Notification failed: {0}")]
    Notify(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type alias for stockwatch operations
pub type Result<T> = std::result::Result<T, StockwatchError>;
