// Favorites store: the single owner of the persisted favorites list

use crate::models::FavoriteId;
use crate::storage_trait::{keys, StorageBackend};
use log::{debug, warn};
use serde_json::Value;
use std::cell::{Cell, RefCell};
use std::rc::Rc;

/// Change notification published to subscribers after every mutation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FavoritesEvent {
    /// One id changed membership
    Changed {
        id: FavoriteId,
        is_favorite: bool,
        count: usize,
    },
    /// Current state of one id re-published by `refresh`; nothing changed
    Refreshed {
        id: FavoriteId,
        is_favorite: bool,
        count: usize,
    },
    /// The whole collection was emptied; `removed` lists the ids that were in it
    Cleared { removed: Vec<FavoriteId> },
    /// Full state re-published, e.g. on page load
    Synced { ids: Vec<FavoriteId> },
}

impl FavoritesEvent {
    /// Count after the event, for badge widgets
    pub fn count(&self) -> usize {
        match self {
            FavoritesEvent::Changed { count, .. } | FavoritesEvent::Refreshed { count, .. } => *count,
            FavoritesEvent::Cleared { .. } => 0,
            FavoritesEvent::Synced { ids } => ids.len(),
        }
    }

    /// Membership state of every id this event touches
    pub fn states(&self) -> Vec<(FavoriteId, bool)> {
        match self {
            FavoritesEvent::Changed { id, is_favorite, .. }
            | FavoritesEvent::Refreshed { id, is_favorite, .. } => vec![(*id, *is_favorite)],
            FavoritesEvent::Cleared { removed } => removed.iter().map(|id| (*id, false)).collect(),
            FavoritesEvent::Synced { ids } => ids.iter().map(|id| (*id, true)).collect(),
        }
    }

    /// Whether the stored collection changed, as opposed to a re-publish
    pub fn is_mutation(&self) -> bool {
        matches!(self, FavoritesEvent::Changed { .. } | FavoritesEvent::Cleared { .. })
    }
}

/// Handle returned by `subscribe`, used to unsubscribe
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Listener = Rc<dyn Fn(&FavoritesEvent)>;

/// Favorites list persisted as a JSON array under `keys::FAVORITES`.
///
/// Operations never fail: corrupt data reads as empty, invalid ids are
/// rejected with `false`, and write failures are logged while subscribers
/// still see the intended state.
pub struct FavoritesStore<S: StorageBackend> {
    storage: S,
    listeners: RefCell<Vec<(SubscriptionId, Listener)>>,
    next_subscription: Cell<u64>,
}

impl<S: StorageBackend> FavoritesStore<S> {
    pub fn new(storage: S) -> Self {
        Self {
            storage,
            listeners: RefCell::new(Vec::new()),
            next_subscription: Cell::new(1),
        }
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// Read the persisted favorites, dropping anything that is not a unique positive integer
    pub fn get_all(&self) -> Vec<FavoriteId> {
        let raw = match self.storage.get_item(keys::FAVORITES) {
            Ok(Some(raw)) => raw,
            Ok(None) => return Vec::new(),
            Err(e) => {
                warn!("Failed to read favorites from storage: {}", e);
                return Vec::new();
            }
        };

        match serde_json::from_str::<Value>(&raw) {
            Ok(Value::Array(entries)) => {
                let mut ids: Vec<FavoriteId> = Vec::with_capacity(entries.len());
                for entry in &entries {
                    match FavoriteId::from_json(entry) {
                        Some(id) if !ids.contains(&id) => ids.push(id),
                        Some(_) => {}
                        None => debug!("Dropping invalid favorites entry: {}", entry),
                    }
                }
                ids
            }
            Ok(other) => {
                warn!("Favorites storage holds a non-array value, ignoring: {}", other);
                Vec::new()
            }
            Err(e) => {
                warn!("Failed to parse favorites from storage: {}", e);
                Vec::new()
            }
        }
    }

    pub fn has(&self, id: FavoriteId) -> bool {
        self.get_all().contains(&id)
    }

    pub fn count(&self) -> usize {
        self.get_all().len()
    }

    /// Toggle a raw id. Non-positive ids are a no-op returning `false`.
    ///
    /// Returns `true` when the id was added and `false` when it was removed.
    pub fn toggle(&self, raw_id: i64) -> bool {
        match FavoriteId::new(raw_id) {
            Some(id) => self.toggle_id(id),
            None => {
                debug!("Ignoring toggle of invalid favorite id {}", raw_id);
                false
            }
        }
    }

    /// Toggle an already validated id; returns whether it is now a favorite
    pub fn toggle_id(&self, id: FavoriteId) -> bool {
        let mut ids = self.get_all();
        let added = match ids.iter().position(|existing| *existing == id) {
            Some(pos) => {
                ids.remove(pos);
                false
            }
            None => {
                ids.push(id);
                true
            }
        };

        self.persist(&ids);
        debug!("Favorite {} {}", id, if added { "added" } else { "removed" });

        self.notify(&FavoritesEvent::Changed {
            id,
            is_favorite: added,
            count: ids.len(),
        });
        added
    }

    /// Remove every favorite
    pub fn clear(&self) {
        let removed = self.get_all();
        if let Err(e) = self.storage.remove_item(keys::FAVORITES) {
            warn!("Failed to clear favorites in storage: {}", e);
        }
        debug!("Cleared {} favorites", removed.len());
        self.notify(&FavoritesEvent::Cleared { removed });
    }

    /// Re-publish the current state of one id without mutating
    pub fn refresh(&self, id: FavoriteId) {
        let ids = self.get_all();
        self.notify(&FavoritesEvent::Refreshed {
            id,
            is_favorite: ids.contains(&id),
            count: ids.len(),
        });
    }

    /// Re-publish the full state so freshly mounted widgets match storage
    pub fn sync(&self) {
        let ids = self.get_all();
        self.notify(&FavoritesEvent::Synced { ids });
    }

    pub fn subscribe<F>(&self, listener: F) -> SubscriptionId
    where
        F: Fn(&FavoritesEvent) + 'static,
    {
        let id = SubscriptionId(self.next_subscription.get());
        self.next_subscription.set(id.0 + 1);
        self.listeners.borrow_mut().push((id, Rc::new(listener)));
        id
    }

    /// Returns `false` when the subscription was already gone
    pub fn unsubscribe(&self, subscription: SubscriptionId) -> bool {
        let mut listeners = self.listeners.borrow_mut();
        let before = listeners.len();
        listeners.retain(|(id, _)| *id != subscription);
        listeners.len() != before
    }

    fn persist(&self, ids: &[FavoriteId]) {
        let json = match serde_json::to_string(ids) {
            Ok(json) => json,
            Err(e) => {
                warn!("Failed to serialize favorites: {}", e);
                return;
            }
        };
        if let Err(e) = self.storage.set_item(keys::FAVORITES, &json) {
            warn!("Failed to save favorites to storage: {}", e);
        }
    }

    fn notify(&self, event: &FavoritesEvent) {
        // Snapshot so listeners may subscribe or call back into the store
        let listeners: Vec<Listener> = self
            .listeners
            .borrow()
            .iter()
            .map(|(_, listener)| listener.clone())
            .collect();
        for listener in listeners {
            listener(event);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage_trait::MemoryStorage;

    fn id(raw: i64) -> FavoriteId {
        FavoriteId::new(raw).unwrap()
    }

    fn recording_store(storage: MemoryStorage) -> (FavoritesStore<MemoryStorage>, Rc<RefCell<Vec<FavoritesEvent>>>) {
        let store = FavoritesStore::new(storage);
        let events = Rc::new(RefCell::new(Vec::new()));
        let sink = events.clone();
        store.subscribe(move |event| sink.borrow_mut().push(event.clone()));
        (store, events)
    }

    #[test]
    fn fresh_storage_is_empty() {
        let store = FavoritesStore::new(MemoryStorage::new());
        assert!(store.get_all().is_empty());
        assert_eq!(store.count(), 0);
        assert!(!store.has(id(1)));
    }

    #[test]
    fn corrupt_json_reads_as_empty() {
        let store = FavoritesStore::new(MemoryStorage::with_item(keys::FAVORITES, "not json"));
        assert!(store.get_all().is_empty());

        let store = FavoritesStore::new(MemoryStorage::with_item(keys::FAVORITES, "{\"a\":1}"));
        assert!(store.get_all().is_empty());
    }

    #[test]
    fn invalid_entries_are_filtered() {
        let store = FavoritesStore::new(MemoryStorage::with_item(keys::FAVORITES, "[1, \"2\", 3.5, -4, 5]"));
        assert_eq!(store.get_all(), vec![id(1), id(5)]);
    }

    #[test]
    fn duplicate_entries_are_dropped() {
        let store = FavoritesStore::new(MemoryStorage::with_item(keys::FAVORITES, "[3, 1, 3, 1, 2]"));
        assert_eq!(store.get_all(), vec![id(3), id(1), id(2)]);
    }

    #[test]
    fn toggle_adds_then_removes() {
        let (store, events) = recording_store(MemoryStorage::new());

        assert!(store.toggle(7));
        assert_eq!(store.get_all(), vec![id(7)]);
        assert_eq!(
            store.storage().get_item(keys::FAVORITES).unwrap().as_deref(),
            Some("[7]")
        );

        assert!(!store.toggle(7));
        assert!(store.get_all().is_empty());

        let events = events.borrow();
        assert_eq!(
            events[0],
            FavoritesEvent::Changed { id: id(7), is_favorite: true, count: 1 }
        );
        assert_eq!(
            events[1],
            FavoritesEvent::Changed { id: id(7), is_favorite: false, count: 0 }
        );
    }

    #[test]
    fn toggle_rejects_invalid_ids_without_notifying() {
        let (store, events) = recording_store(MemoryStorage::new());
        assert!(!store.toggle(0));
        assert!(!store.toggle(-3));
        assert!(store.get_all().is_empty());
        assert!(events.borrow().is_empty());
        assert!(!store.storage().exists(keys::FAVORITES).unwrap());
    }

    #[test]
    fn toggle_rejects_ids_beyond_safe_integer_range() {
        let (store, events) = recording_store(MemoryStorage::new());
        let unsafe_id = 9_007_199_254_740_993;

        assert!(!store.toggle(unsafe_id));
        assert!(!store.toggle(unsafe_id));
        assert!(events.borrow().is_empty());
        assert!(!store.storage().exists(keys::FAVORITES).unwrap());

        let largest = 9_007_199_254_740_991;
        assert!(store.toggle(largest));
        assert!(store.has(id(largest)));
        assert!(!store.toggle(largest));
        assert!(!store.has(id(largest)));
    }

    #[test]
    fn paired_toggles_preserve_order() {
        let store = FavoritesStore::new(MemoryStorage::new());
        for raw in [12, 45, 301] {
            store.toggle(raw);
        }
        let before = store.get_all();

        store.toggle(99);
        store.toggle(99);
        assert_eq!(store.get_all(), before);

        // removing from the middle then re-adding appends at the end
        store.toggle(45);
        store.toggle(45);
        assert_eq!(store.get_all(), vec![id(12), id(301), id(45)]);
    }

    #[test]
    fn membership_follows_toggle_parity() {
        let store = FavoritesStore::new(MemoryStorage::new());
        let sequence = [3, 5, 3, 8, 5, 5, 1, 3, 8, 8, 8];
        for raw in sequence {
            store.toggle(raw);
        }
        for raw in [1, 3, 5, 8] {
            let odd = sequence.iter().filter(|x| **x == raw).count() % 2 == 1;
            assert_eq!(store.has(id(raw)), odd, "id {}", raw);
        }
        let all = store.get_all();
        let mut dedup = all.clone();
        dedup.sort();
        dedup.dedup();
        assert_eq!(dedup.len(), all.len());
    }

    #[test]
    fn clear_publishes_removed_ids() {
        let (store, events) = recording_store(MemoryStorage::new());
        store.toggle(4);
        store.toggle(9);
        store.clear();

        assert_eq!(store.count(), 0);
        let last = events.borrow().last().cloned().unwrap();
        assert_eq!(last, FavoritesEvent::Cleared { removed: vec![id(4), id(9)] });
        assert_eq!(last.count(), 0);
        assert_eq!(last.states(), vec![(id(4), false), (id(9), false)]);
    }

    #[test]
    fn write_failure_still_notifies_intent() {
        let (store, events) = recording_store(MemoryStorage::new());
        store.storage().set_fail_writes(true);

        assert!(store.toggle(11));
        // nothing persisted
        assert!(store.get_all().is_empty());
        assert_eq!(
            events.borrow()[0],
            FavoritesEvent::Changed { id: id(11), is_favorite: true, count: 1 }
        );
    }

    #[test]
    fn refresh_and_sync_republish_without_mutation() {
        let (store, events) = recording_store(MemoryStorage::with_item(keys::FAVORITES, "[2, 6]"));
        store.refresh(id(6));
        store.refresh(id(3));
        store.sync();

        let events = events.borrow();
        assert_eq!(events[0], FavoritesEvent::Refreshed { id: id(6), is_favorite: true, count: 2 });
        assert_eq!(events[1], FavoritesEvent::Refreshed { id: id(3), is_favorite: false, count: 2 });
        assert_eq!(events[2], FavoritesEvent::Synced { ids: vec![id(2), id(6)] });
        assert!(events.iter().all(|event| !event.is_mutation()));
        assert_eq!(store.get_all(), vec![id(2), id(6)]);
    }

    #[test]
    fn unsubscribe_stops_delivery() {
        let store = FavoritesStore::new(MemoryStorage::new());
        let hits = Rc::new(Cell::new(0));
        let counter = hits.clone();
        let sub = store.subscribe(move |_| counter.set(counter.get() + 1));

        store.toggle(1);
        assert!(store.unsubscribe(sub));
        assert!(!store.unsubscribe(sub));
        store.toggle(1);
        assert_eq!(hits.get(), 1);
    }

    #[test]
    fn listener_may_read_store_during_notification() {
        let store = Rc::new(FavoritesStore::new(MemoryStorage::new()));
        let seen = Rc::new(Cell::new(0usize));
        let (inner, sink) = (Rc::downgrade(&store), seen.clone());
        store.subscribe(move |_| {
            if let Some(store) = inner.upgrade() {
                sink.set(store.count());
            }
        });

        store.toggle(5);
        store.toggle(6);
        assert_eq!(seen.get(), 2);
    }
}
