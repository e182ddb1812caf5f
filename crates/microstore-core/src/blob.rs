//! Keyed blob persistence backends

use crate::Result;
use indexmap::IndexMap;
use std::cell::RefCell;
use std::rc::Rc;

/// Keyed string storage used to persist a store's collection
///
/// Methods take `&self` so one backend can be shared between store
/// instances (see the `Rc` impl below).
pub trait BlobStore {
    /// Store `value` under `key`, replacing any previous value
    fn set(&self, key: &str, value: &str) -> Result<()>;

    /// Fetch the value stored under `key`
    fn get(&self, key: &str) -> Result<Option<String>>;
}

impl<B: BlobStore + ?Sized> BlobStore for Rc<B> {
    fn set(&self, key: &str, value: &str) -> Result<()> {
        (**self).set(key, value)
    }

    fn get(&self, key: &str) -> Result<Option<String>> {
        (**self).get(key)
    }
}

impl<B: BlobStore + ?Sized> BlobStore for Box<B> {
    fn set(&self, key: &str, value: &str) -> Result<()> {
        (**self).set(key, value)
    }

    fn get(&self, key: &str) -> Result<Option<String>> {
        (**self).get(key)
    }
}

/// Process-local blob store
///
/// Clones share the same underlying map, which lets a test simulate a
/// restart by building a second store over a clone of the first backend.
#[derive(Debug, Clone, Default)]
pub struct MemoryBlobStore {
    blobs: Rc<RefCell<IndexMap<String, String>>>,
}

impl MemoryBlobStore {
    /// Create an empty blob store
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored keys
    pub fn len(&self) -> usize {
        self.blobs.borrow().len()
    }

    /// Check if nothing has been stored
    pub fn is_empty(&self) -> bool {
        self.blobs.borrow().is_empty()
    }
}

impl BlobStore for MemoryBlobStore {
    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.blobs
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.blobs.borrow().get(key).cloned())
    }
}
