//! Text encodings for persisted collections

use crate::{Error, Record, RecordId, Result};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// The persisted form of a store: id -> record, in insertion order
pub type Collection = IndexMap<RecordId, Record>;

/// Encoding used for the persisted blob
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Encoding {
    /// RON format (Rust Object Notation)
    #[default]
    Ron,
    /// JSON format (requires serde_json feature)
    Json,
}

impl Encoding {
    /// Encode a collection to text
    pub fn encode(&self, collection: &Collection) -> Result<String> {
        match self {
            Encoding::Ron => ron::ser::to_string_pretty(collection, ron::ser::PrettyConfig::default())
                .map_err(|e| Error::Serialization(e.to_string())),
            Encoding::Json => encode_json(collection),
        }
    }

    /// Decode a collection from text
    pub fn decode(&self, text: &str) -> Result<Collection> {
        match self {
            Encoding::Ron => {
                ron::from_str(text).map_err(|e| Error::Deserialization(e.to_string()))
            }
            Encoding::Json => decode_json(text),
        }
    }
}

#[cfg(feature = "serde_json")]
fn encode_json(collection: &Collection) -> Result<String> {
    serde_json::to_string(collection).map_err(|e| Error::Serialization(e.to_string()))
}

#[cfg(not(feature = "serde_json"))]
fn encode_json(_collection: &Collection) -> Result<String> {
    Err(Error::UnsupportedEncoding(
        "JSON encoding requires the 'serde_json' feature".to_string(),
    ))
}

#[cfg(feature = "serde_json")]
fn decode_json(text: &str) -> Result<Collection> {
    serde_json::from_str(text).map_err(|e| Error::Deserialization(e.to_string()))
}

#[cfg(not(feature = "serde_json"))]
fn decode_json(_text: &str) -> Result<Collection> {
    Err(Error::UnsupportedEncoding(
        "JSON encoding requires the 'serde_json' feature".to_string(),
    ))
}
