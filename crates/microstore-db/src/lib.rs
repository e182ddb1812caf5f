//! Microstore DB - Durable blob backend using native_db
//!
//! Provides a [`microstore_core::BlobStore`] that keeps each store's
//! encoded collection as one row, keyed by the store key, in a native_db
//! database file (or an in-memory database for tests).

mod error;
mod models;
mod store;

pub use error::{Error, Result};
pub use models::StoredBlob;
pub use store::DbBlobStore;
