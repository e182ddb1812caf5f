//! Record identifiers and id generation

use crate::rng::IdRng;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::fmt;

/// Identifier of a stored record
///
/// String-based so callers can supply their own ids on create.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordId(pub String);

impl RecordId {
    /// Create a new record ID
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Get the ID as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Borrow<str> for RecordId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<&str> for RecordId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for RecordId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// Generates record ids of the form `<millis base36><random base36>`
#[derive(Debug, Clone, Default)]
pub struct IdGenerator {
    rng: IdRng,
}

impl IdGenerator {
    /// Create a generator with a fixed seed
    pub fn with_seed(seed: u64) -> Self {
        Self {
            rng: IdRng::new(seed),
        }
    }

    /// Produce an id for `now` that `taken` does not report as in use
    pub fn next_id(&mut self, now: DateTime<Utc>, taken: impl Fn(&str) -> bool) -> RecordId {
        let prefix = to_base36(now.timestamp_millis().max(0) as u64);
        loop {
            let candidate = format!("{}{}", prefix, to_base36(self.rng.next_u32() as u64));
            if !taken(&candidate) {
                return RecordId(candidate);
            }
            tracing::debug!(target: "microstore", id = %candidate, "id collision, drawing again");
        }
    }
}

/// Lowercase base36 rendering of an unsigned integer
pub(crate) fn to_base36(mut n: u64) -> String {
    const DIGITS: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";
    if n == 0 {
        return "0".to_string();
    }
    let mut out = Vec::new();
    while n > 0 {
        out.push(DIGITS[(n % 36) as usize]);
        n /= 36;
    }
    out.reverse();
    String::from_utf8(out).unwrap_or_default()
}
