//! Named-event publish/subscribe

use crate::Value;
use indexmap::IndexMap;
use std::fmt;

/// Handle returned by [`Emitter::add_listener`], used to unsubscribe
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

impl ListenerId {
    /// Get the raw ID value
    pub fn raw(&self) -> u64 {
        self.0
    }
}

/// A listener callback; receives the optional event payload
pub type Listener = Box<dyn FnMut(Option<&Value>)>;

/// Registry of listeners keyed by event name
///
/// Listeners for one event run in registration order.
#[derive(Default)]
pub struct Emitter {
    listeners: IndexMap<String, Vec<(ListenerId, Listener)>>,
    next_id: u64,
}

impl Emitter {
    /// Create an emitter with no listeners
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribe a listener to an event
    pub fn add_listener(
        &mut self,
        event: impl Into<String>,
        listener: impl FnMut(Option<&Value>) + 'static,
    ) -> ListenerId {
        let id = ListenerId(self.next_id);
        self.next_id += 1;
        self.listeners
            .entry(event.into())
            .or_default()
            .push((id, Box::new(listener)));
        id
    }

    /// Unsubscribe a listener; returns whether it was registered for `event`
    pub fn remove_listener(&mut self, event: &str, id: ListenerId) -> bool {
        let Some(listeners) = self.listeners.get_mut(event) else {
            return false;
        };
        let before = listeners.len();
        listeners.retain(|(lid, _)| *lid != id);
        let removed = listeners.len() != before;
        if listeners.is_empty() {
            self.listeners.shift_remove(event);
        }
        removed
    }

    /// Call every listener of `event`; returns how many ran
    pub fn emit(&mut self, event: &str, payload: Option<&Value>) -> usize {
        let Some(listeners) = self.listeners.get_mut(event) else {
            return 0;
        };
        for (_, listener) in listeners.iter_mut() {
            listener(payload);
        }
        listeners.len()
    }

    /// Number of listeners registered for `event`
    pub fn listener_count(&self, event: &str) -> usize {
        self.listeners.get(event).map_or(0, Vec::len)
    }
}

impl fmt::Debug for Emitter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let counts: IndexMap<&str, usize> = self
            .listeners
            .iter()
            .map(|(event, ls)| (event.as_str(), ls.len()))
            .collect();
        f.debug_struct("Emitter")
            .field("listeners", &counts)
            .finish()
    }
}
