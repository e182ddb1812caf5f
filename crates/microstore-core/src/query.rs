//! Chained query view: `where`, `order`, `limit`
//!
//! The store reads in one of two modes. `Unfiltered` is the resting state.
//! The first chain call snapshots the backing collection into a
//! `Filtering` view, later chain calls narrow that same view, and the
//! id-less terminal read takes it and returns to `Unfiltered`.

use crate::codec::Collection;
use crate::{Record, Value, ValueMap};
use std::cmp::Ordering;

/// Read mode of a store
#[derive(Debug, Clone, Default, PartialEq)]
pub enum ReadState {
    /// No chain in progress
    #[default]
    Unfiltered,
    /// Chain in progress over a snapshot of the backing collection
    Filtering(Vec<Record>),
}

impl ReadState {
    /// Check if a chain is in progress
    pub fn is_filtering(&self) -> bool {
        matches!(self, ReadState::Filtering(_))
    }

    /// The staged view, snapshotting `backing` on the first chain call
    pub(crate) fn view_mut(&mut self, backing: &Collection) -> &mut Vec<Record> {
        if let ReadState::Unfiltered = self {
            *self = ReadState::Filtering(backing.values().cloned().collect());
        }
        match self {
            ReadState::Filtering(view) => view,
            ReadState::Unfiltered => unreachable!("view was just staged"),
        }
    }

    /// Consume the staged view, returning to `Unfiltered`
    pub(crate) fn take(&mut self) -> Option<Vec<Record>> {
        match std::mem::take(self) {
            ReadState::Filtering(view) => Some(view),
            ReadState::Unfiltered => None,
        }
    }
}

/// Keep records matching every predicate field, preserving order
pub(crate) fn filter_view(view: &mut Vec<Record>, predicate: &ValueMap) {
    view.retain(|record| record.satisfies(predicate));
}

/// Stable sort by `key`
pub(crate) fn order_view(view: &mut [Record], key: &str, reverse: bool) {
    view.sort_by(|a, b| {
        let ord = sort_cmp(a.get(key), b.get(key));
        if reverse {
            ord.reverse()
        } else {
            ord
        }
    });
}

/// Keep at most the first `n` records
pub(crate) fn limit_view(view: &mut Vec<Record>, n: usize) {
    view.truncate(n);
}

// Booleans, then numbers, then strings, then timestamps; anything
// unordered (missing, null, list, map) sorts last.
fn sort_rank(value: Option<&Value>) -> u8 {
    match value {
        Some(Value::Bool(_)) => 0,
        Some(Value::Int(_) | Value::Float(_)) => 1,
        Some(Value::String(_)) => 2,
        Some(Value::Timestamp(_)) => 3,
        _ => 4,
    }
}

/// Total order over optional field values, required by `sort_by`
fn sort_cmp(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    sort_rank(a).cmp(&sort_rank(b)).then_with(|| match (a, b) {
        (Some(x), Some(y)) => x.compare(y).unwrap_or_else(|| {
            // NaN
            match (x.as_float(), y.as_float()) {
                (Some(fx), Some(fy)) => fx.total_cmp(&fy),
                _ => Ordering::Equal,
            }
        }),
        _ => Ordering::Equal,
    })
}
