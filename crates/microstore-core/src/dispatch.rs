//! Wiring named actions from an external dispatcher

use crate::{Emitter, EntityStore, ListenerId, Value};
use std::cell::RefCell;
use std::rc::Rc;

/// Subscribe each `(event, handler)` pair on `dispatcher`
pub fn register<I, K, F>(dispatcher: &mut Emitter, actions: I) -> Vec<ListenerId>
where
    I: IntoIterator<Item = (K, F)>,
    K: Into<String>,
    F: FnMut(Option<&Value>) + 'static,
{
    actions
        .into_iter()
        .map(|(event, handler)| dispatcher.add_listener(event, handler))
        .collect()
}

/// Subscribe store actions on `dispatcher`
///
/// Each handler receives the store mutably along with the event payload.
/// Only a weak reference to the store is kept, so the dispatcher does not
/// keep a dropped store alive; events arriving after that are ignored.
///
/// ```
/// use microstore_core::{register_store, Emitter, EntityStore, StoreConfig, Value};
/// use std::cell::RefCell;
/// use std::rc::Rc;
///
/// let store = Rc::new(RefCell::new(EntityStore::in_memory(StoreConfig::new("todos"))));
/// let mut dispatcher = Emitter::new();
/// register_store(&store, &mut dispatcher, [(
///     "TODO_CREATE",
///     |store: &mut EntityStore, _: Option<&Value>| {
///         store.create([("text", "created via dispatcher")]);
///     },
/// )]);
///
/// dispatcher.emit("TODO_CREATE", None);
/// assert_eq!(store.borrow().len(), 1);
/// ```
pub fn register_store<I, K, F>(
    store: &Rc<RefCell<EntityStore>>,
    dispatcher: &mut Emitter,
    actions: I,
) -> Vec<ListenerId>
where
    I: IntoIterator<Item = (K, F)>,
    K: Into<String>,
    F: FnMut(&mut EntityStore, Option<&Value>) + 'static,
{
    let wired = actions.into_iter().map(|(event, mut action)| {
        let event: String = event.into();
        let name = event.clone();
        let target = Rc::downgrade(store);
        let handler = move |payload: Option<&Value>| {
            let Some(store) = target.upgrade() else {
                tracing::debug!(target: "microstore", event = %name, "store dropped, action skipped");
                return;
            };
            match store.try_borrow_mut() {
                Ok(mut store) => action(&mut *store, payload),
                Err(_) => {
                    tracing::warn!(target: "microstore", event = %name, "store busy, action skipped")
                }
            };
        };
        (event, handler)
    });
    register(dispatcher, wired)
}
