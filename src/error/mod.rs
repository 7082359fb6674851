//! Error types for Examus.

use thiserror::Error;

/// Primary error type for all Examus operations.
#[derive(Error, Debug)]
pub enum ExamusError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Config file error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Stream error: {0}")]
    Stream(String),

    #[error("Storage error for {key}: {message}")]
    Storage { key: String, message: String },
}

/// Broad error category used to decide how a failure is surfaced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// The inference endpoint could not be reached or answered badly.
    Connection,
    /// Durable storage could not be read or written.
    Persistence,
    Configuration,
    Serialization,
}

impl ExamusError {
    /// Create an API error from an HTTP status and body.
    pub fn api(status: u16, message: impl Into<String>) -> Self {
        Self::Api {
            status,
            message: message.into(),
        }
    }

    /// Create a storage error for a key.
    pub fn storage(key: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Storage {
            key: key.into(),
            message: message.into(),
        }
    }

    /// Classify this error into a category.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::Network(_) | Self::Api { .. } | Self::Stream(_) => ErrorCategory::Connection,
            Self::Io(_) | Self::Storage { .. } => ErrorCategory::Persistence,
            Self::Configuration(_) | Self::Toml(_) => ErrorCategory::Configuration,
            Self::Serialization(_) => ErrorCategory::Serialization,
        }
    }

    /// Whether the endpoint was unreachable or answered badly.
    ///
    /// The assembler ends a turn with the fixed apology on any transport
    /// error; this only distinguishes the cause in logs.
    pub fn is_connection_failure(&self) -> bool {
        self.category() == ErrorCategory::Connection
    }
}

/// Convenience alias.
pub type Result<T> = std::result::Result<T, ExamusError>;
