//! Error types for database operations.

use thiserror::Error;

/// Errors that can occur during database operations.
#[derive(Debug, Error)]
pub enum Error {
    /// Native DB error.
    #[error("Database error: {0}")]
    Database(String),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for database operations.
pub type Result<T> = std::result::Result<T, Error>;

impl From<Error> for microstore_core::Error {
    fn from(err: Error) -> Self {
        match err {
            Error::Io(e) => microstore_core::Error::Io(e),
            Error::Database(msg) => microstore_core::Error::Backend(msg),
        }
    }
}
