//! Domain-specific error types for convo-insight

use thiserror::Error;

/// Main error type for the convo-insight analysis engine
#[derive(Error, Debug)]
pub enum ConvoInsightError {
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Transport error: {message}")]
    Transport { message: String },

    #[error("Backend error: {message}")]
    Remote { message: String },

    #[error("Serialization error: {message}")]
    Serialization { message: String },

    #[error("Ingest error: {message}")]
    Ingest { message: String },

    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl From<anyhow::Error> for ConvoInsightError {
    fn from(err: anyhow::Error) -> Self {
        ConvoInsightError::Internal {
            message: err.to_string(),
        }
    }
}

impl From<serde_json::Error> for ConvoInsightError {
    fn from(err: serde_json::Error) -> Self {
        ConvoInsightError::Serialization {
            message: err.to_string(),
        }
    }
}

impl From<reqwest::Error> for ConvoInsightError {
    fn from(err: reqwest::Error) -> Self {
        ConvoInsightError::Transport {
            message: format!("HTTP request failed: {}", err),
        }
    }
}

impl From<std::io::Error> for ConvoInsightError {
    fn from(err: std::io::Error) -> Self {
        ConvoInsightError::Ingest {
            message: format!("I/O error: {}", err),
        }
    }
}

/// Result type alias for convo-insight operations
pub type Result<T> = std::result::Result<T, ConvoInsightError>;
