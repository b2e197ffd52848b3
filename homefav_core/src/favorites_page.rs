// Favorites page model: loads listing data for the stored ids and tracks the layout

use crate::favorites::{FavoritesStore, SubscriptionId};
use crate::models::{FavoriteId, PropertySummary};
use crate::property_api::PropertySource;
use crate::storage_trait::StorageBackend;
use crate::view_mode::{load_view, save_view, FavoritesView};
use log::{debug, info, warn};
use std::cell::{Cell, RefCell};
use std::rc::Rc;

#[derive(Debug, Clone, PartialEq)]
pub enum PageState {
    /// No favorites; nothing was fetched
    Empty,
    /// A fetch is in flight
    Loading,
    Loaded(Vec<PropertySummary>),
    /// The fetch failed; the id list is untouched
    Error(String),
}

/// Favorites page bound to a shared store.
///
/// The page subscribes to the store on creation and marks itself stale
/// whenever the collection changes elsewhere (a heart icon, another widget),
/// so a driver can re-fetch with [`FavoritesPage::reload_if_stale`].
/// Responses from a superseded reload are dropped.
pub struct FavoritesPage<S: StorageBackend, P: PropertySource> {
    store: Rc<FavoritesStore<S>>,
    source: P,
    view: Cell<FavoritesView>,
    state: RefCell<PageState>,
    stale: Rc<Cell<bool>>,
    generation: Cell<u64>,
    subscription: SubscriptionId,
}

impl<S: StorageBackend, P: PropertySource> FavoritesPage<S, P> {
    /// Mount the page; the view comes from storage (default grid)
    pub fn new(store: Rc<FavoritesStore<S>>, source: P) -> Self {
        let view = load_view(store.storage());
        let stale = Rc::new(Cell::new(false));
        let flag = Rc::clone(&stale);
        let subscription = store.subscribe(move |event| {
            if event.is_mutation() {
                flag.set(true);
            }
        });
        Self {
            store,
            source,
            view: Cell::new(view),
            state: RefCell::new(PageState::Empty),
            stale,
            generation: Cell::new(0),
            subscription,
        }
    }

    pub fn state(&self) -> PageState {
        self.state.borrow().clone()
    }

    pub fn view(&self) -> FavoritesView {
        self.view.get()
    }

    /// Number shown in the page header
    pub fn total_count(&self) -> usize {
        self.store.count()
    }

    /// The collection changed since the last reload
    pub fn is_stale(&self) -> bool {
        self.stale.get()
    }

    /// Re-read the ids and re-fetch their data
    pub async fn reload(&self) -> PageState {
        self.stale.set(false);
        let generation = self.generation.get() + 1;
        self.generation.set(generation);

        let ids = self.store.get_all();
        if ids.is_empty() {
            self.set_state(PageState::Empty);
            return PageState::Empty;
        }

        self.set_state(PageState::Loading);
        let next = match self.source.fetch_properties(&ids).await {
            Ok(properties) => {
                info!("Loaded {} favorite properties", properties.len());
                PageState::Loaded(properties)
            }
            Err(e) => {
                warn!("Error loading favorites: {}", e);
                PageState::Error(e.to_string())
            }
        };

        if self.generation.get() != generation {
            debug!("Dropping superseded favorites response");
            return self.state();
        }
        self.set_state(next.clone());
        next
    }

    /// Reload only when the store changed since the last reload
    pub async fn reload_if_stale(&self) -> Option<PageState> {
        if self.is_stale() {
            Some(self.reload().await)
        } else {
            None
        }
    }

    /// Switch layout and persist it; loaded data is kept as is
    pub fn switch_view(&self, view: FavoritesView) {
        self.view.set(view);
        save_view(self.store.storage(), view);
    }

    /// Remove one listing from favorites and reload
    pub async fn remove(&self, id: FavoriteId) -> PageState {
        if self.store.has(id) {
            self.store.toggle_id(id);
        }
        self.reload().await
    }

    pub fn clear_all(&self) {
        self.store.clear();
        self.generation.set(self.generation.get() + 1);
        self.stale.set(false);
        self.set_state(PageState::Empty);
    }

    fn set_state(&self, state: PageState) {
        *self.state.borrow_mut() = state;
    }
}

impl<S: StorageBackend, P: PropertySource> Drop for FavoritesPage<S, P> {
    fn drop(&mut self) {
        self.store.unsubscribe(self.subscription);
    }
}
