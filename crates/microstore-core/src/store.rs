//! The entity store: CRUD, chained queries, change events, persistence

use crate::codec::Collection;
use crate::query::{filter_view, limit_view, order_view, ReadState};
use crate::record::{CREATED_AT, ID, MANAGED_FIELDS, UPDATED_AT};
use crate::{
    BlobStore, Emitter, Error, IdGenerator, ListenerId, Record, RecordId, Result, StoreConfig,
    Value, ValueMap,
};
use chrono::Utc;
use std::fmt;

/// Event emitted after every create, update and destroy
pub const CHANGE_EVENT: &str = "store:change";

/// Names that auxiliary data may not use
pub const RESERVED_DATA_KEYS: [&str; 6] = [ID, CREATED_AT, UPDATED_AT, "records", "defaults", "view"];

/// In-memory collection of records keyed by id
///
/// Mutations emit [`CHANGE_EVENT`] and, when the configuration enables it,
/// write the whole collection to the blob backend. Queries are chained
/// with [`filter`](Self::filter), [`order`](Self::order) and
/// [`limit`](Self::limit) and consumed by [`fetch`](Self::fetch).
///
/// ```
/// use microstore_core::{EntityStore, StoreConfig, Value};
///
/// let mut todos = EntityStore::in_memory(StoreConfig::new("todos"));
/// todos.create([("text", Value::from("b")), ("done", Value::from(true))]);
/// todos.create([("text", Value::from("a")), ("done", Value::from(true))]);
/// todos.create([("text", Value::from("c")), ("done", Value::from(false))]);
///
/// let done = todos.filter([("done", true)]).order("text", false).fetch();
/// let texts: Vec<_> = done.iter().filter_map(|r| r.get_str("text")).collect();
/// assert_eq!(texts, ["a", "b"]);
/// assert_eq!(todos.all().len(), 3);
/// ```
pub struct EntityStore {
    config: StoreConfig,
    records: Collection,
    defaults: ValueMap,
    read: ReadState,
    data: ValueMap,
    emitter: Emitter,
    backend: Option<Box<dyn BlobStore>>,
    ids: IdGenerator,
}

impl EntityStore {
    /// Create a store over `backend`, loading any collection saved under the configured key
    pub fn new(config: StoreConfig, backend: impl BlobStore + 'static) -> Self {
        let mut store = Self::in_memory(config);
        store.backend = Some(Box::new(backend));
        store.records = store.load();
        store
    }

    /// Create a store with no blob backend
    pub fn in_memory(config: StoreConfig) -> Self {
        Self {
            config,
            records: Collection::new(),
            defaults: ValueMap::new(),
            read: ReadState::default(),
            data: ValueMap::new(),
            emitter: Emitter::new(),
            backend: None,
            ids: IdGenerator::default(),
        }
    }

    /// Builder form of [`set_defaults`](Self::set_defaults)
    pub fn with_defaults<K, V>(mut self, defaults: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<Value>,
    {
        self.set_defaults(defaults);
        self
    }

    /// Use a seeded id generator (reproducible ids in tests)
    pub fn with_id_seed(mut self, seed: u64) -> Self {
        self.ids = IdGenerator::with_seed(seed);
        self
    }

    /// Replace the field defaults applied on create
    ///
    /// Managed fields are dropped: defaults never override them.
    pub fn set_defaults<K, V>(&mut self, defaults: impl IntoIterator<Item = (K, V)>)
    where
        K: Into<String>,
        V: Into<Value>,
    {
        self.defaults = ValueMap::new();
        for (key, value) in defaults {
            let key = key.into();
            if MANAGED_FIELDS.contains(&key.as_str()) {
                tracing::warn!(target: "microstore", store = %self.config.key(), field = %key, "ignoring default for managed field");
                continue;
            }
            self.defaults.insert(key, value.into());
        }
    }

    /// Current field defaults
    pub fn defaults(&self) -> &ValueMap {
        &self.defaults
    }

    /// Store configuration
    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    // CRUD

    /// Insert a new record and return its id
    ///
    /// Layers, later winning: `{id, createdAt, updatedAt}`, the defaults,
    /// then `entity`. A string `id` in `entity` keys the record under that
    /// id; any other `id` value is ignored.
    pub fn create<K, V>(&mut self, entity: impl IntoIterator<Item = (K, V)>) -> RecordId
    where
        K: Into<String>,
        V: Into<Value>,
    {
        let now = Utc::now();
        let records = &self.records;
        let generated = self.ids.next_id(now, |candidate| records.contains_key(candidate));

        let mut record = Record::default();
        record.set(ID, generated.as_str());
        record.set(CREATED_AT, now);
        record.set(UPDATED_AT, now);
        record.overlay(self.defaults.clone());
        record.overlay(collect_fields(entity));

        let id = match record.get(ID) {
            Some(Value::String(s)) if !s.is_empty() => RecordId::new(s.clone()),
            other => {
                tracing::warn!(target: "microstore", store = %self.config.key(), kind = other.map_or("missing", crate::Value::type_name), "ignoring non-string id on create");
                record.set(ID, generated.as_str());
                generated
            }
        };

        if self.records.insert(id.clone(), record).is_some() {
            tracing::warn!(target: "microstore", store = %self.config.key(), id = %id, "create replaced an existing record");
        }
        tracing::debug!(target: "microstore", store = %self.config.key(), id = %id, "record created");
        self.changed("create", &id);
        id
    }

    /// Shallow-merge `updates` into the record `id`
    ///
    /// `updatedAt` is refreshed unless `updates` sets it. `id` and
    /// `createdAt` cannot be changed. An unknown id inserts a partial
    /// record under that id.
    pub fn update<K, V>(&mut self, id: &str, updates: impl IntoIterator<Item = (K, V)>)
    where
        K: Into<String>,
        V: Into<Value>,
    {
        let mut updates = collect_fields(updates);
        for field in [ID, CREATED_AT] {
            if updates.shift_remove(field).is_some() {
                tracing::warn!(target: "microstore", store = %self.config.key(), id, field, "ignoring update of immutable field");
            }
        }

        let now = Utc::now();
        match self.records.get_mut(id) {
            Some(record) => {
                // never move updatedAt backwards, even if the wall clock does
                let stamp = record.updated_at().map_or(now, |prev| prev.max(now));
                record.set(UPDATED_AT, stamp);
                record.overlay(updates);
                tracing::debug!(target: "microstore", store = %self.config.key(), id, "record updated");
            }
            None => {
                let mut record = Record::default();
                record.set(ID, id);
                record.set(UPDATED_AT, now);
                record.overlay(updates);
                self.records.insert(RecordId::new(id), record);
                tracing::debug!(target: "microstore", store = %self.config.key(), id, "update of unknown id inserted a partial record");
            }
        }
        self.changed("update", &RecordId::new(id));
    }

    /// Remove the record `id`, returning it if it existed
    pub fn destroy(&mut self, id: &str) -> Option<Record> {
        let removed = self.records.shift_remove(id);
        tracing::debug!(target: "microstore", store = %self.config.key(), id, found = removed.is_some(), "record destroyed");
        self.changed("destroy", &RecordId::new(id));
        removed
    }

    // Reads

    /// Get a record by id
    pub fn get(&self, id: &str) -> Option<&Record> {
        self.records.get(id)
    }

    /// Terminal read: take the chained view and end the chain
    ///
    /// Returns an empty list when no chain is in progress; use
    /// [`all`](Self::all) for the whole collection.
    pub fn fetch(&mut self) -> Vec<Record> {
        self.read.take().unwrap_or_default()
    }

    /// Every record in insertion order, regardless of any chain in progress
    pub fn all(&self) -> Vec<Record> {
        self.records.values().cloned().collect()
    }

    /// Iterate records in insertion order without cloning
    pub fn iter(&self) -> impl Iterator<Item = &Record> {
        self.records.values()
    }

    /// All record ids in insertion order
    pub fn ids(&self) -> impl Iterator<Item = &RecordId> {
        self.records.keys()
    }

    /// Number of records
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Check if the store holds no records
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Check if a chain is in progress
    pub fn is_filtering(&self) -> bool {
        self.read.is_filtering()
    }

    // Query chain

    /// Narrow the view to records whose fields equal every predicate value
    pub fn filter<K, V>(&mut self, predicate: impl IntoIterator<Item = (K, V)>) -> &mut Self
    where
        K: Into<String>,
        V: Into<Value>,
    {
        let predicate = collect_fields(predicate);
        filter_view(self.read.view_mut(&self.records), &predicate);
        self
    }

    /// Sort the view by `key`, descending when `reverse` is set
    pub fn order(&mut self, key: &str, reverse: bool) -> &mut Self {
        order_view(self.read.view_mut(&self.records), key, reverse);
        self
    }

    /// Keep at most the first `n` records of the view
    pub fn limit(&mut self, n: usize) -> &mut Self {
        limit_view(self.read.view_mut(&self.records), n);
        self
    }

    // Auxiliary data

    /// Keep an ad-hoc value next to the collection (not persisted)
    ///
    /// Reserved names are rejected with a warning.
    pub fn set_data(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        let key = key.into();
        if let Err(err) = check_data_key(&key) {
            tracing::warn!(target: "microstore", store = %self.config.key(), error = %err, "set_data rejected");
            return;
        }
        self.data.insert(key, value.into());
    }

    /// Read an auxiliary value
    pub fn get_data(&self, key: &str) -> Option<&Value> {
        if let Err(err) = check_data_key(key) {
            tracing::warn!(target: "microstore", store = %self.config.key(), error = %err, "get_data rejected");
            return None;
        }
        self.data.get(key)
    }

    // Events

    /// Subscribe to [`CHANGE_EVENT`]
    pub fn add_change_listener(
        &mut self,
        listener: impl FnMut(Option<&Value>) + 'static,
    ) -> ListenerId {
        self.emitter.add_listener(CHANGE_EVENT, listener)
    }

    /// Unsubscribe from [`CHANGE_EVENT`]
    pub fn remove_change_listener(&mut self, id: ListenerId) -> bool {
        self.emitter.remove_listener(CHANGE_EVENT, id)
    }

    /// Subscribe to a caller-defined event
    pub fn add_custom_listener(
        &mut self,
        event: impl Into<String>,
        listener: impl FnMut(Option<&Value>) + 'static,
    ) -> ListenerId {
        self.emitter.add_listener(event, listener)
    }

    /// Unsubscribe from a caller-defined event
    pub fn remove_custom_listener(&mut self, event: &str, id: ListenerId) -> bool {
        self.emitter.remove_listener(event, id)
    }

    /// Emit [`CHANGE_EVENT`] without a payload
    pub fn dispatch_change(&mut self) {
        self.emitter.emit(CHANGE_EVENT, None);
    }

    /// Emit a caller-defined event
    pub fn dispatch(&mut self, event: &str, payload: Option<Value>) -> usize {
        self.emitter.emit(event, payload.as_ref())
    }

    // Persistence

    /// Write the collection to the backend now
    ///
    /// Does nothing when persistence is disabled or there is no backend.
    pub fn save(&self) {
        let Some(backend) = self.active_backend() else {
            return;
        };
        let result = self
            .config
            .encoding()
            .encode(&self.records)
            .and_then(|text| backend.set(self.config.key(), &text));
        match result {
            Ok(()) => {
                tracing::debug!(target: "microstore", store = %self.config.key(), records = self.records.len(), "collection saved")
            }
            Err(err) => {
                tracing::warn!(target: "microstore", store = %self.config.key(), error = %err, "failed to save collection")
            }
        }
    }

    /// Replace the collection with the backend's copy and end any chain
    pub fn reload(&mut self) {
        if self.active_backend().is_none() {
            return;
        }
        self.records = self.load();
        self.read = ReadState::Unfiltered;
    }

    fn active_backend(&self) -> Option<&dyn BlobStore> {
        if !self.config.persist() {
            return None;
        }
        self.backend.as_deref()
    }

    fn load(&self) -> Collection {
        match self.try_load() {
            Ok(collection) => collection,
            Err(err) => {
                tracing::warn!(target: "microstore", store = %self.config.key(), error = %err, "discarding unreadable collection");
                Collection::new()
            }
        }
    }

    fn try_load(&self) -> Result<Collection> {
        let Some(backend) = self.active_backend() else {
            return Ok(Collection::new());
        };
        let Some(text) = backend.get(self.config.key())? else {
            tracing::debug!(target: "microstore", store = %self.config.key(), "no saved collection");
            return Ok(Collection::new());
        };
        let mut collection = self.config.encoding().decode(&text)?;
        // the map key is authoritative for the id field
        for (id, record) in collection.iter_mut() {
            if record.id() != id.as_str() {
                record.set(ID, id.as_str());
            }
        }
        tracing::debug!(target: "microstore", store = %self.config.key(), records = collection.len(), "collection loaded");
        Ok(collection)
    }

    fn changed(&mut self, op: &str, id: &RecordId) {
        let mut payload = ValueMap::new();
        payload.insert("op".to_string(), op.into());
        payload.insert(ID.to_string(), id.as_str().into());
        self.emitter.emit(CHANGE_EVENT, Some(&Value::Map(payload)));
        self.save();
    }
}

impl fmt::Debug for EntityStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EntityStore")
            .field("config", &self.config)
            .field("records", &self.records.len())
            .field("defaults", &self.defaults)
            .field("read", &self.read)
            .field("data", &self.data)
            .field("emitter", &self.emitter)
            .field("backend", &self.backend.is_some())
            .finish()
    }
}

fn collect_fields<K, V>(fields: impl IntoIterator<Item = (K, V)>) -> ValueMap
where
    K: Into<String>,
    V: Into<Value>,
{
    fields
        .into_iter()
        .map(|(k, v)| (k.into(), v.into()))
        .collect()
}

fn check_data_key(key: &str) -> Result<()> {
    if RESERVED_DATA_KEYS.contains(&key) {
        return Err(Error::ReservedKey(key.to_string()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MemoryBlobStore;
    use std::cell::RefCell;
    use std::collections::HashSet;
    use std::rc::Rc;

    fn todo_store() -> EntityStore {
        EntityStore::in_memory(StoreConfig::new("todos").with_persist(false))
            .with_defaults([("text", Value::from("")), ("completed", Value::from(false))])
    }

    /// Five todos, created out of text order, three of them completed
    fn seeded_store() -> EntityStore {
        let mut store = todo_store();
        for (text, completed) in [
            ("sample todo 1", true),
            ("sample todo 0", false),
            ("sample todo 2", true),
            ("sample todo 4", false),
            ("sample todo 3", true),
        ] {
            store.create([("text", Value::from(text)), ("completed", Value::from(completed))]);
        }
        store
    }

    fn texts(records: &[Record]) -> Vec<String> {
        records
            .iter()
            .filter_map(|r| r.get_str("text").map(str::to_string))
            .collect()
    }

    #[test]
    fn test_create_applies_defaults() {
        let mut store = todo_store();
        let id = store.create(ValueMap::new());

        let all = store.all();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].id(), id.as_str());
        assert_eq!(all[0].get_str("text"), Some(""));
        assert_eq!(all[0].get_bool("completed"), Some(false));
        assert!(all[0].created_at().is_some());
        assert_eq!(all[0].created_at(), all[0].updated_at());
    }

    #[test]
    fn test_create_fields_override_defaults() {
        let mut store = todo_store();
        let id = store.create([("text", "written")]);
        let record = store.get(id.as_str()).unwrap();
        assert_eq!(record.get_str("text"), Some("written"));
        assert_eq!(record.get_bool("completed"), Some(false));
    }

    #[test]
    fn test_defaults_cannot_touch_managed_fields() {
        let store = todo_store().with_defaults([("id", "fixed"), ("kind", "todo")]);
        assert!(store.defaults().get("id").is_none());
        assert_eq!(store.defaults().get("kind"), Some(&Value::from("todo")));
    }

    #[test]
    fn test_create_with_caller_id() {
        let mut store = todo_store();
        let id = store.create([("id", "custom")]);
        assert_eq!(id.as_str(), "custom");
        assert_eq!(store.get("custom").map(Record::id), Some("custom"));

        let id = store.create([("id", Value::Int(5))]);
        assert_ne!(id.as_str(), "5");
        assert_eq!(store.get(id.as_str()).map(Record::id), Some(id.as_str()));
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn test_update_merges_and_refreshes_timestamp() {
        let mut store = todo_store();
        let id = store.create([("text", "before")]);
        let before = store.get(id.as_str()).cloned().unwrap();

        store.update(id.as_str(), [("text", "update an item")]);

        let after = store.get(id.as_str()).unwrap();
        assert_eq!(after.get_str("text"), Some("update an item"));
        assert_eq!(after.get_bool("completed"), Some(false));
        assert_eq!(after.id(), before.id());
        assert_eq!(after.created_at(), before.created_at());
        assert!(after.updated_at().unwrap() >= before.updated_at().unwrap());
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_update_ignores_immutable_fields() {
        let mut store = todo_store();
        let id = store.create(ValueMap::new());
        let created = store.get(id.as_str()).unwrap().created_at();

        store.update(
            id.as_str(),
            [("id", Value::from("other")), ("createdAt", Value::from(Utc::now()))],
        );

        let record = store.get(id.as_str()).unwrap();
        assert_eq!(record.id(), id.as_str());
        assert_eq!(record.created_at(), created);
        assert!(store.get("other").is_none());
    }

    #[test]
    fn test_update_can_set_updated_at() {
        let mut store = todo_store();
        let id = store.create(ValueMap::new());
        store.update(id.as_str(), [("updatedAt", "manual")]);
        assert_eq!(
            store.get(id.as_str()).unwrap().get("updatedAt"),
            Some(&Value::from("manual"))
        );
    }

    #[test]
    fn test_update_unknown_id_inserts_partial_record() {
        let mut store = todo_store();
        store.update("ghost", [("text", "orphan")]);

        let record = store.get("ghost").unwrap();
        assert_eq!(record.id(), "ghost");
        assert_eq!(record.get_str("text"), Some("orphan"));
        assert!(record.updated_at().is_some());
        assert!(record.created_at().is_none());
        assert!(record.get("completed").is_none());
    }

    #[test]
    fn test_destroy() {
        let mut store = todo_store();
        let id = store.create(ValueMap::new());
        store.create(ValueMap::new());

        assert!(store.destroy(id.as_str()).is_some());
        assert!(store.get(id.as_str()).is_none());
        assert_eq!(store.all().len(), 1);

        assert!(store.destroy("missing").is_none());
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_get_by_id() {
        let store = seeded_store();
        let all = store.all();
        let found = store.get(all[2].id()).unwrap();
        assert_eq!(found, &all[2]);
        assert!(store.get("nope").is_none());
    }

    #[test]
    fn test_fetch_without_chain_is_empty() {
        let mut store = seeded_store();
        assert!(store.fetch().is_empty());
        assert_eq!(store.all().len(), 5);
    }

    #[test]
    fn test_order() {
        let mut store = seeded_store();
        let todos = store.order("text", false).fetch();
        assert_eq!(todos[0].get_str("text"), Some("sample todo 0"));
        assert_eq!(todos[4].get_str("text"), Some("sample todo 4"));

        let todos = store.order("text", true).fetch();
        assert_eq!(todos[0].get_str("text"), Some("sample todo 4"));
        assert_eq!(todos[4].get_str("text"), Some("sample todo 0"));
    }

    #[test]
    fn test_where() {
        let mut store = seeded_store();
        let todos = store.filter([("text", "sample todo 0")]).fetch();
        assert_eq!(texts(&todos), ["sample todo 0"]);

        let todos = store.filter([("completed", true)]).fetch();
        assert_eq!(
            texts(&todos),
            ["sample todo 1", "sample todo 2", "sample todo 3"]
        );
    }

    #[test]
    fn test_where_multiple_keys_is_and() {
        let mut store = seeded_store();
        let todos = store
            .filter([
                ("text", Value::from("sample todo 1")),
                ("completed", Value::from(false)),
            ])
            .fetch();
        assert!(todos.is_empty());

        let todos = store
            .filter([
                ("text", Value::from("sample todo 2")),
                ("completed", Value::from(true)),
            ])
            .fetch();
        assert_eq!(texts(&todos), ["sample todo 2"]);
    }

    #[test]
    fn test_large_integers_compare_exactly() {
        let mut store = todo_store();
        store.create([("text", Value::from("high")), ("n", Value::Int(9_007_199_254_740_993))]);
        store.create([("text", Value::from("low")), ("n", Value::Int(9_007_199_254_740_992))]);

        let todos = store.order("n", false).fetch();
        assert_eq!(texts(&todos), ["low", "high"]);

        let todos = store.filter([("n", Value::Int(9_007_199_254_740_992))]).fetch();
        assert_eq!(texts(&todos), ["low"]);
    }

    #[test]
    fn test_order_by_timestamp() {
        use chrono::TimeZone;
        let day = |d| Value::from(Utc.with_ymd_and_hms(2024, 1, d, 0, 0, 0).unwrap());

        let mut store = todo_store();
        store.create([("text", Value::from("second")), (CREATED_AT, day(2))]);
        store.create([("text", Value::from("third")), (CREATED_AT, day(3))]);
        store.create([("text", Value::from("first")), (CREATED_AT, day(1))]);

        let todos = store.order(CREATED_AT, false).fetch();
        assert_eq!(texts(&todos), ["first", "second", "third"]);

        let todos = store.order(CREATED_AT, true).fetch();
        assert_eq!(texts(&todos), ["third", "second", "first"]);
    }

    #[test]
    fn test_limit() {
        let mut store = seeded_store();
        let todos = store.limit(3).fetch();
        assert_eq!(
            texts(&todos),
            ["sample todo 1", "sample todo 0", "sample todo 2"]
        );

        let todos = store.limit(10).fetch();
        assert_eq!(todos.len(), 5);
    }

    #[test]
    fn test_where_order_limit_then_reset() {
        let mut store = seeded_store();
        let todos = store
            .filter([("completed", true)])
            .order("text", false)
            .limit(2)
            .fetch();
        assert_eq!(texts(&todos), ["sample todo 1", "sample todo 2"]);
        assert!(!store.is_filtering());

        // a fresh chain starts from the full collection again
        assert_eq!(store.limit(10).fetch().len(), 5);
        assert_eq!(store.all().len(), 5);
    }

    #[test]
    fn test_all_ignores_chain_state() {
        let mut store = seeded_store();
        store.filter([("completed", true)]);
        assert_eq!(store.all().len(), 5);
        assert!(store.is_filtering());
        assert_eq!(store.fetch().len(), 3);
    }

    #[test]
    fn test_chain_sees_snapshot_not_later_writes() {
        let mut store = seeded_store();
        store.filter([("completed", true)]);
        store.create([("completed", true)]);
        assert_eq!(store.fetch().len(), 3);
        assert_eq!(store.filter([("completed", true)]).fetch().len(), 4);
    }

    #[test]
    fn test_change_events() {
        let mut store = todo_store();
        let ops = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&ops);
        let listener = store.add_change_listener(move |payload| {
            let op = payload
                .and_then(Value::as_map)
                .and_then(|m| m.get("op"))
                .and_then(Value::as_str)
                .unwrap_or("none")
                .to_string();
            sink.borrow_mut().push(op);
        });

        let id = store.create(ValueMap::new());
        store.update(id.as_str(), [("text", "x")]);
        store.destroy(id.as_str());
        store.destroy(id.as_str());
        store.dispatch_change();
        assert_eq!(*ops.borrow(), ["create", "update", "destroy", "destroy", "none"]);

        assert!(store.remove_change_listener(listener));
        store.create(ValueMap::new());
        assert_eq!(ops.borrow().len(), 5);
    }

    #[test]
    fn test_custom_events() {
        let mut store = todo_store();
        let hits = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&hits);
        let id = store.add_custom_listener("modal:open", move |payload| {
            sink.borrow_mut().push(payload.cloned());
        });

        assert_eq!(store.dispatch("modal:open", Some(Value::from("create"))), 1);
        assert_eq!(store.dispatch("modal:close", None), 0);
        assert_eq!(*hits.borrow(), [Some(Value::from("create"))]);

        assert!(store.remove_custom_listener("modal:open", id));
        assert_eq!(store.dispatch("modal:open", None), 0);
    }

    #[test]
    fn test_set_and_get_data() {
        let mut store = todo_store();
        store.set_data("isCreateModalShowing", true);
        assert_eq!(store.get_data("isCreateModalShowing"), Some(&Value::Bool(true)));
        assert!(store.get_data("unknown").is_none());
    }

    #[test]
    fn test_reserved_data_keys_are_rejected() {
        let mut store = todo_store();
        for key in RESERVED_DATA_KEYS {
            store.set_data(key, 1i64);
            assert!(store.get_data(key).is_none());
        }
        assert!(store.is_empty());
    }

    #[test]
    fn test_ids_unique_with_seeded_generator() {
        let mut store = todo_store().with_id_seed(1);
        for _ in 0..500 {
            store.create(ValueMap::new());
        }
        let ids: HashSet<_> = store.ids().cloned().collect();
        assert_eq!(ids.len(), 500);
    }

    #[test]
    fn test_persistence_round_trip() {
        let blobs = MemoryBlobStore::new();
        let mut store = EntityStore::new(StoreConfig::new("todos"), blobs.clone());
        store.create([("text", Value::from("a")), ("done", Value::from(true))]);
        store.create([("text", Value::from("b")), ("score", Value::from(2.5))]);
        let id = store.create([("text", "c")]);
        store.destroy(id.as_str());

        let restarted = EntityStore::new(StoreConfig::new("todos"), blobs.clone());
        assert_eq!(restarted.all(), store.all());

        let other = EntityStore::new(StoreConfig::new("notes"), blobs);
        assert!(other.is_empty());
    }

    #[test]
    fn test_persist_disabled_writes_nothing() {
        let blobs = MemoryBlobStore::new();
        let mut store =
            EntityStore::new(StoreConfig::new("todos").with_persist(false), blobs.clone());
        store.create(ValueMap::new());
        assert!(blobs.is_empty());
    }

    #[test]
    fn test_malformed_blob_loads_empty() {
        let blobs = MemoryBlobStore::new();
        blobs.set("todos", "{{ definitely not ron").unwrap();
        let store = EntityStore::new(StoreConfig::new("todos"), blobs);
        assert!(store.is_empty());
    }

    #[test]
    fn test_load_repairs_id_field() {
        let blobs = MemoryBlobStore::new();
        blobs
            .set("todos", r#"{"k1": {"text": String("x")}}"#)
            .unwrap();
        let store = EntityStore::new(StoreConfig::new("todos"), blobs);
        assert_eq!(store.get("k1").map(Record::id), Some("k1"));
    }

    #[test]
    fn test_reload_discards_chain_and_local_state() {
        let blobs = MemoryBlobStore::new();
        let mut writer = EntityStore::new(StoreConfig::new("todos"), blobs.clone());
        let mut reader = EntityStore::new(StoreConfig::new("todos"), blobs);

        writer.create([("text", "shared")]);
        reader.filter([("text", "shared")]);
        assert!(reader.is_empty());

        reader.reload();
        assert!(!reader.is_filtering());
        assert_eq!(reader.len(), 1);
    }

    mod properties {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            // true creates a record, false destroys the oldest one
            #[test]
            fn prop_len_tracks_creates_and_destroys(ops in proptest::collection::vec(any::<bool>(), 0..64)) {
                let mut store = todo_store();
                let mut expected = 0usize;
                for create in ops {
                    if create {
                        store.create(ValueMap::new());
                        expected += 1;
                    } else {
                        let oldest = store.ids().next().cloned();
                        if let Some(id) = oldest {
                            store.destroy(id.as_str());
                            expected -= 1;
                        }
                    }
                }
                prop_assert_eq!(store.all().len(), expected);
                let ids: HashSet<_> = store.ids().collect();
                prop_assert_eq!(ids.len(), expected);
            }

            #[test]
            fn prop_limit_never_pads(count in 0usize..12, n in 0usize..24) {
                let mut store = todo_store();
                for i in 0..count {
                    store.create([("rank", i as i64)]);
                }
                let view = store.limit(n).fetch();
                prop_assert_eq!(view.len(), n.min(count));
                prop_assert_eq!(&view[..], &store.all()[..view.len()]);
            }

            #[test]
            fn prop_filter_keeps_relative_order(flags in proptest::collection::vec(any::<bool>(), 0..32)) {
                let mut store = todo_store();
                for (i, flag) in flags.iter().enumerate() {
                    store.create([("rank", Value::from(i as i64)), ("completed", Value::from(*flag))]);
                }
                let ranks: Vec<i64> = store
                    .filter([("completed", true)])
                    .fetch()
                    .iter()
                    .filter_map(|r| r.get("rank").and_then(Value::as_int))
                    .collect();
                let expected: Vec<i64> = flags
                    .iter()
                    .enumerate()
                    .filter(|(_, flag)| **flag)
                    .map(|(i, _)| i as i64)
                    .collect();
                prop_assert_eq!(ranks, expected);
            }
        }
    }
}
