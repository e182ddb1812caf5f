//! Blob model for database storage.

use native_db::*;
use native_model::{native_model, Model};
use serde::{Deserialize, Serialize};

/// A persisted collection, one row per store key.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[native_model(id = 1, version = 1)]
#[native_db]
pub struct StoredBlob {
    /// Primary key - store key.
    #[primary_key]
    pub key: String,
    /// Encoded collection.
    pub value: String,
}

impl StoredBlob {
    /// Create a row.
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}
