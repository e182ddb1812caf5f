//! Stored records and their managed fields

use crate::{Value, ValueMap};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Field holding the record id
pub const ID: &str = "id";
/// Field holding the creation timestamp
pub const CREATED_AT: &str = "createdAt";
/// Field holding the last-update timestamp
pub const UPDATED_AT: &str = "updatedAt";

/// Fields assigned and maintained by the store
pub const MANAGED_FIELDS: [&str; 3] = [ID, CREATED_AT, UPDATED_AT];

/// A single stored entity
///
/// A record is a plain field map. The managed fields live in the same map
/// as caller data so that `where`/`order` can address them like any other
/// field.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Record {
    fields: ValueMap,
}

impl Record {
    /// Build a record from raw fields
    pub fn from_fields(fields: ValueMap) -> Self {
        Self { fields }
    }

    /// The record id, empty if the id field is missing or not a string
    pub fn id(&self) -> &str {
        self.fields.get(ID).and_then(Value::as_str).unwrap_or("")
    }

    /// Creation time, if the record carries one
    pub fn created_at(&self) -> Option<DateTime<Utc>> {
        self.fields.get(CREATED_AT).and_then(Value::as_timestamp)
    }

    /// Last update time, if the record carries one
    pub fn updated_at(&self) -> Option<DateTime<Utc>> {
        self.fields.get(UPDATED_AT).and_then(Value::as_timestamp)
    }

    /// Get a field value
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    /// Get a string field
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.fields.get(key).and_then(Value::as_str)
    }

    /// Get a boolean field
    pub fn get_bool(&self, key: &str) -> Option<bool> {
        self.fields.get(key).and_then(Value::as_bool)
    }

    /// Get a numeric field as f64
    pub fn get_number(&self, key: &str) -> Option<f64> {
        self.fields.get(key).and_then(Value::as_float)
    }

    /// Set a field value
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.fields.insert(key.into(), value.into());
    }

    /// Remove a field
    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.fields.shift_remove(key)
    }

    /// All fields in insertion order
    pub fn fields(&self) -> &ValueMap {
        &self.fields
    }

    /// Consume the record, returning its fields
    pub fn into_fields(self) -> ValueMap {
        self.fields
    }

    /// Shallow merge: every field of `layer` replaces the field of the same name
    pub(crate) fn overlay(&mut self, layer: ValueMap) {
        for (key, value) in layer {
            self.fields.insert(key, value);
        }
    }

    /// True when every predicate field is present and matches
    pub fn satisfies(&self, predicate: &ValueMap) -> bool {
        predicate
            .iter()
            .all(|(key, expected)| self.get(key).is_some_and(|v| v.matches(expected)))
    }
}

impl From<ValueMap> for Record {
    fn from(fields: ValueMap) -> Self {
        Self::from_fields(fields)
    }
}
