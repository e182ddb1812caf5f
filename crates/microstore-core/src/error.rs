//! Error types for microstore-core

use thiserror::Error;

/// Core error type
///
/// Store operations are best-effort and never return these to callers;
/// they surface from the codec, configuration and blob backends.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Deserialization error: {0}")]
    Deserialization(String),

    #[error("Encoding not available: {0}")]
    UnsupportedEncoding(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Reserved key: {0}")]
    ReservedKey(String),

    #[error("Backend error: {0}")]
    Backend(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;
