//! Microstore Core - In-memory record store for client-side state
//!
//! This crate provides:
//! - Dynamic value types (`Value`, `ValueMap`) and plain-map `Record`s
//! - `EntityStore`: CRUD with managed `id`/`createdAt`/`updatedAt` fields
//! - Chained queries (`filter`, `order`, `limit`) consumed by `fetch`
//! - Named-event notification through an owned `Emitter`
//! - Pluggable blob persistence (`BlobStore`) with RON or JSON encoding
//!
//! ## Read modes
//!
//! A store is either unfiltered or in the middle of a query chain. The
//! first chain call snapshots the collection; `fetch` hands the staged
//! view back and ends the chain. `all` always reads the full collection.
//!
//! ## JSON Feature
//!
//! Enable the `serde_json` feature to persist collections as JSON:
//! ```toml
//! microstore-core = { version = "0.1", features = ["serde_json"] }
//! ```

mod blob;
mod codec;
mod config;
mod dispatch;
mod emitter;
mod error;
mod identity;
pub mod query;
pub mod record;
mod rng;
mod store;
mod value;

pub use blob::{BlobStore, MemoryBlobStore};
pub use codec::{Collection, Encoding};
pub use config::StoreConfig;
pub use dispatch::{register, register_store};
pub use emitter::{Emitter, Listener, ListenerId};
pub use error::{Error, Result};
pub use identity::{IdGenerator, RecordId};
pub use query::ReadState;
pub use record::Record;
pub use rng::IdRng;
pub use store::{EntityStore, CHANGE_EVENT, RESERVED_DATA_KEYS};
pub use value::{Value, ValueMap};
