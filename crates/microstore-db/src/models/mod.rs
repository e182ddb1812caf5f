//! Database models for persistent storage.

mod blob;

pub use blob::*;
