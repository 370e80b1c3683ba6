//! Error types for the refcache core

use thiserror::Error;

/// Result type alias using the refcache Error
pub type Result<T> = std::result::Result<T, Error>;

/// Core error types for the reference-data cache
#[derive(Error, Debug)]
pub enum Error {
    /// I/O errors from snapshot storage
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON (de)serialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// HTTP transport errors from the remote table source
    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// Invalid or missing configuration (credential, base/table setup)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Remote table source errors (API rejection, exhausted retries)
    #[error("Source error: {0}")]
    Source(String),

    /// Refresh scheduler errors (invalid schedule expression)
    #[error("Scheduler error: {0}")]
    Scheduler(String),
}

impl Error {
    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a remote source error
    pub fn source(msg: impl Into<String>) -> Self {
        Self::Source(msg.into())
    }

    /// Create a scheduler error
    pub fn scheduler(msg: impl Into<String>) -> Self {
        Self::Scheduler(msg.into())
    }
}
