//! Database-backed blob store.

use crate::error::{Error, Result};
use crate::models::*;
use microstore_core::BlobStore;
use native_db::*;
use std::path::Path;
use std::sync::LazyLock;

// Static models for the database
static MODELS: LazyLock<Models> = LazyLock::new(|| {
    let mut models = Models::new();
    models
        .define::<StoredBlob>()
        .expect("StoredBlob model definition is valid");
    models
});

/// Blob store persisting each store key as one database row.
pub struct DbBlobStore {
    db: Database<'static>,
}

impl DbBlobStore {
    /// Open or create a database at the given path.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let db = Builder::new()
            .create(&MODELS, path.as_ref())
            .map_err(|e| Error::Database(e.to_string()))?;
        tracing::debug!(target: "microstore", path = %path.as_ref().display(), "blob database opened");
        Ok(Self { db })
    }

    /// Create an in-memory database.
    pub fn in_memory() -> Result<Self> {
        let db = Builder::new()
            .create_in_memory(&MODELS)
            .map_err(|e| Error::Database(e.to_string()))?;
        Ok(Self { db })
    }

    /// Save a blob, replacing any previous value.
    pub fn put(&self, key: &str, value: &str) -> Result<()> {
        let rw = self.db.rw_transaction()?;
        rw.upsert(StoredBlob::new(key, value))?;
        rw.commit()?;
        Ok(())
    }

    /// Load a blob by key.
    pub fn fetch(&self, key: &str) -> Result<Option<String>> {
        let r = self.db.r_transaction()?;
        let stored: Option<StoredBlob> = r.get().primary(key.to_string())?;
        Ok(stored.map(|s| s.value))
    }

    /// Delete a blob. Returns whether it existed.
    pub fn remove(&self, key: &str) -> Result<bool> {
        let rw = self.db.rw_transaction()?;
        let stored: Option<StoredBlob> = rw.get().primary(key.to_string())?;
        let existed = stored.is_some();
        if let Some(s) = stored {
            rw.remove(s)?;
        }
        rw.commit()?;
        Ok(existed)
    }

    /// All stored keys.
    pub fn keys(&self) -> Result<Vec<String>> {
        let r = self.db.r_transaction()?;
        let scan = r.scan().primary::<StoredBlob>()?;
        let iter = scan.all()?;
        let blobs: std::result::Result<Vec<StoredBlob>, _> = iter.collect();
        let blobs = blobs.map_err(|e| Error::Database(e.to_string()))?;
        Ok(blobs.into_iter().map(|b| b.key).collect())
    }
}

impl BlobStore for DbBlobStore {
    fn set(&self, key: &str, value: &str) -> microstore_core::Result<()> {
        Ok(self.put(key, value)?)
    }

    fn get(&self, key: &str) -> microstore_core::Result<Option<String>> {
        Ok(self.fetch(key)?)
    }
}

impl From<native_db::db_type::Error> for Error {
    fn from(err: native_db::db_type::Error) -> Self {
        Error::Database(err.to_string())
    }
}
