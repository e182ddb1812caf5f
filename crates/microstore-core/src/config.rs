//! Store configuration
//!
//! Every store persists under an explicit key so that two collections
//! never share a blob by accident.

use crate::{Encoding, Error, Result};
use serde::{Deserialize, Serialize};

/// Configuration for an [`EntityStore`](crate::EntityStore)
///
/// # Example
///
/// ```
/// use microstore_core::{Encoding, StoreConfig};
///
/// let config = StoreConfig::new("todos").with_persist(false);
/// assert_eq!(config.key(), "todos");
/// assert!(!config.persist());
/// assert_eq!(config.encoding(), Encoding::Ron);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Blob key the collection is saved under
    key: String,
    /// Whether mutations are written to the blob backend
    #[serde(default = "default_persist")]
    persist: bool,
    /// Text encoding of the saved collection
    #[serde(default)]
    encoding: Encoding,
}

fn default_persist() -> bool {
    true
}

impl StoreConfig {
    /// Create a configuration persisting under `key`
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            persist: true,
            encoding: Encoding::default(),
        }
    }

    /// Parse a configuration from RON
    ///
    /// ```
    /// use microstore_core::StoreConfig;
    ///
    /// let config = StoreConfig::from_ron(r#"(key: "todos", persist: false)"#).unwrap();
    /// assert_eq!(config.key(), "todos");
    /// ```
    pub fn from_ron(text: &str) -> Result<Self> {
        let config: Self =
            ron::from_str(text).map_err(|e| Error::InvalidConfig(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Enable or disable persistence
    pub fn with_persist(mut self, persist: bool) -> Self {
        self.persist = persist;
        self
    }

    /// Select the blob encoding
    pub fn with_encoding(mut self, encoding: Encoding) -> Self {
        self.encoding = encoding;
        self
    }

    /// Reject configurations that cannot address a blob
    pub fn validate(&self) -> Result<()> {
        if self.key.trim().is_empty() {
            return Err(Error::InvalidConfig("store key must not be empty".to_string()));
        }
        Ok(())
    }

    /// Blob key
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Whether mutations are persisted
    pub fn persist(&self) -> bool {
        self.persist
    }

    /// Blob encoding
    pub fn encoding(&self) -> Encoding {
        self.encoding
    }
}
