// Homefav WASM Bindings
// In-page favorites contract for the listing site

use wasm_bindgen::prelude::*;
use homefav_core::view_mode::{
    initial_catalog_view, load_view, prepare_filter_submit, save_view,
};
use homefav_core::{
    badge_text, CatalogView, FavoriteId, FavoritesStore, FavoritesView, MemoryStorage, PageState,
    PropertySummary, StorageBackend, SubscriptionId,
};
use serde::Serialize;
use std::any::Any;
use std::cell::RefCell;
use std::rc::Rc;
use log::{info, warn};

pub mod dom;

use dom::{ToastMessages, Widgets};

// Initialize panic hook and logger for WASM
#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();
    wasm_logger::init(wasm_logger::Config::default());
}

type SharedStorage = Rc<dyn StorageBackend>;
type SharedStore = Rc<FavoritesStore<SharedStorage>>;

/// Browser `localStorage`, or an in-memory store when it is unavailable
/// (private mode, storage disabled, non-browser host).
fn page_storage() -> SharedStorage {
    #[cfg(target_arch = "wasm32")]
    {
        use homefav_core::wasm::LocalStorageBackend;
        let available = web_sys::window()
            .and_then(|w| w.local_storage().ok().flatten())
            .is_some();
        if available {
            return Rc::new(LocalStorageBackend::default_instance());
        }
        warn!("localStorage unavailable, favorites will not survive a reload");
    }
    Rc::new(MemoryStorage::new())
}

/// Accept only integral positive JS numbers
fn parse_id(value: &JsValue) -> Option<FavoriteId> {
    value.as_f64().and_then(FavoriteId::from_f64)
}

/// Favorites page snapshot handed to page scripts
#[derive(Debug, Serialize)]
struct PageLoad {
    state: &'static str,
    properties: Vec<PropertySummary>,
    error: Option<String>,
}

impl From<&PageState> for PageLoad {
    fn from(state: &PageState) -> Self {
        let (name, properties, error) = match state {
            PageState::Empty => ("empty", Vec::new(), None),
            PageState::Loading => ("loading", Vec::new(), None),
            PageState::Loaded(properties) => ("loaded", properties.clone(), None),
            PageState::Error(e) => ("error", Vec::new(), Some(e.clone())),
        };
        Self { state: name, properties, error }
    }
}

/// A page kept in sync with the store until replaced or unmounted
struct PageMount {
    subscription: SubscriptionId,
    _page: Rc<dyn Any>,
}

/// Favorites store exposed to page scripts
#[wasm_bindgen]
pub struct Favorites {
    store: SharedStore,
    widgets: Rc<Widgets>,
    page: RefCell<Option<PageMount>>,
}

#[wasm_bindgen]
impl Favorites {
    /// Create the store and mount the icon, badge and toast widgets
    #[wasm_bindgen(constructor)]
    pub fn new() -> Self {
        Self::with_storage(page_storage(), true)
    }

    /// Ids in stored order
    #[wasm_bindgen(js_name = getAll)]
    pub fn get_all(&self) -> Vec<f64> {
        self.store.get_all().into_iter().map(|id| id.get() as f64).collect()
    }

    #[wasm_bindgen]
    pub fn has(&self, id: JsValue) -> bool {
        parse_id(&id).map(|id| self.store.has(id)).unwrap_or(false)
    }

    /// Returns `true` when added, `false` when removed or when `id` is invalid
    #[wasm_bindgen]
    pub fn toggle(&self, id: JsValue) -> bool {
        match parse_id(&id) {
            Some(id) => self.store.toggle_id(id),
            None => {
                warn!("Ignoring toggle of invalid favorite id {:?}", id);
                false
            }
        }
    }

    #[wasm_bindgen]
    pub fn count(&self) -> usize {
        self.store.count()
    }

    #[wasm_bindgen]
    pub fn clear(&self) {
        self.store.clear();
    }

    /// Per-id UI refresh hook for widgets rendered after the last change
    #[wasm_bindgen]
    pub fn refresh(&self, id: JsValue) {
        if let Some(id) = parse_id(&id) {
            self.store.refresh(id);
        }
    }

    /// Re-apply the whole state to the page, e.g. after an AJAX grid update
    #[wasm_bindgen]
    pub fn sync(&self) {
        self.store.sync();
    }

    /// Badge text, or `undefined` when the badge is hidden
    #[wasm_bindgen(js_name = badgeText)]
    pub fn badge_text(&self) -> Option<String> {
        badge_text(self.store.count())
    }

    /// Register a page callback, invoked as `callback([[id, isFavorite], ...], count)`
    /// after every change
    #[wasm_bindgen]
    pub fn subscribe(&self, callback: js_sys::Function) {
        self.store.subscribe(move |event| {
            let ids = js_sys::Array::new();
            for (id, is_favorite) in event.states() {
                let entry = js_sys::Array::of2(&JsValue::from_f64(id.get() as f64), &JsValue::from_bool(is_favorite));
                ids.push(&entry);
            }
            if let Err(e) = callback.call2(&JsValue::NULL, &ids, &JsValue::from_f64(event.count() as f64)) {
                warn!("Favorites subscriber threw: {:?}", e);
            }
        });
    }

    /// Declare the listing shown on a detail page so its carousel heart is kept in sync
    #[wasm_bindgen(js_name = setDetailProperty)]
    pub fn set_detail_property(&self, id: JsValue) {
        let id = parse_id(&id);
        self.widgets.set_detail_property(id);
        if let Some(id) = id {
            self.store.refresh(id);
        }
    }

    /// Localized toast texts
    #[wasm_bindgen(js_name = setToastMessages)]
    pub fn set_toast_messages(&self, added: String, removed: String, cleared: String) {
        self.widgets.set_messages(ToastMessages { added, removed, cleared });
    }

    #[wasm_bindgen(js_name = favoritesView)]
    pub fn favorites_view(&self) -> String {
        load_view::<FavoritesView, _>(self.store.storage()).to_string()
    }

    /// Persist the favorites page layout; unknown values are rejected
    #[wasm_bindgen(js_name = setFavoritesView)]
    pub fn set_favorites_view(&self, view: &str) -> Result<(), JsValue> {
        let view: FavoritesView = view.parse().map_err(|e: String| JsValue::from_str(&e))?;
        save_view(self.store.storage(), view);
        Ok(())
    }

    /// Catalog layout at page load, consuming a pending return-to-map flag
    #[wasm_bindgen(js_name = initialCatalogView)]
    pub fn initial_catalog_view(&self) -> String {
        initial_catalog_view(self.store.storage()).to_string()
    }

    #[wasm_bindgen(js_name = setCatalogView)]
    pub fn set_catalog_view(&self, view: &str) -> Result<(), JsValue> {
        let view: CatalogView = view.parse().map_err(|e: String| JsValue::from_str(&e))?;
        save_view(self.store.storage(), view);
        Ok(())
    }

    /// Call right before submitting the catalog filter form
    #[wasm_bindgen(js_name = beforeFilterSubmit)]
    pub fn before_filter_submit(&self) {
        prepare_filter_submit(self.store.storage());
    }

    /// Stop re-fetching for a mounted favorites page
    #[wasm_bindgen(js_name = unmountFavoritesPage)]
    pub fn unmount_favorites_page(&self) {
        if let Some(mount) = self.page.borrow_mut().take() {
            self.store.unsubscribe(mount.subscription);
        }
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen]
impl Favorites {
    /// Fetch listing summaries for the current favorites from `endpoint`
    /// (relative to the page origin). Resolves to
    /// `{ state: "empty" | "loaded" | "error", properties, error }`.
    #[wasm_bindgen(js_name = loadFavoritesPage)]
    pub async fn load_favorites_page(&self, endpoint: String) -> Result<JsValue, JsValue> {
        use homefav_core::FavoritesPage;

        let page = FavoritesPage::new(Rc::clone(&self.store), favorites_api(endpoint)?);
        let state = page.reload().await;
        page_value(&state)
    }

    /// Mount the favorites page: `callback(snapshot)` receives a `loading`
    /// snapshot and then the result, now and after every change to the
    /// collection from any widget on the page.
    #[wasm_bindgen(js_name = mountFavoritesPage)]
    pub fn mount_favorites_page(&self, endpoint: String, callback: js_sys::Function) -> Result<(), JsValue> {
        use homefav_core::FavoritesPage;

        let page = Rc::new(FavoritesPage::new(Rc::clone(&self.store), favorites_api(endpoint)?));
        let callback = Rc::new(callback);
        let reload = {
            let page = Rc::downgrade(&page);
            move || {
                let Some(page) = page.upgrade() else {
                    return;
                };
                let callback = Rc::clone(&callback);
                wasm_bindgen_futures::spawn_local(async move {
                    report_page(&callback, &PageState::Loading);
                    let state = page.reload().await;
                    report_page(&callback, &state);
                });
            }
        };

        reload();
        let subscription = self.store.subscribe(move |event| {
            if event.is_mutation() {
                reload();
            }
        });

        self.unmount_favorites_page();
        *self.page.borrow_mut() = Some(PageMount { subscription, _page: page });
        info!("Favorites page mounted");
        Ok(())
    }
}

#[cfg(target_arch = "wasm32")]
fn favorites_api(endpoint: String) -> Result<homefav_core::PropertyApi<homefav_core::wasm::WasmHttpClient>, JsValue> {
    let origin = web_sys::window()
        .ok_or_else(|| JsValue::from_str("No window"))?
        .location()
        .origin()?;
    Ok(homefav_core::PropertyApi::new(homefav_core::wasm::WasmHttpClient::new(), origin, endpoint))
}

#[cfg(target_arch = "wasm32")]
fn page_value(state: &PageState) -> Result<JsValue, JsValue> {
    serde_wasm_bindgen::to_value(&PageLoad::from(state))
        .map_err(|e| JsValue::from_str(&format!("Failed to serialize page: {}", e)))
}

#[cfg(target_arch = "wasm32")]
fn report_page(callback: &js_sys::Function, state: &PageState) {
    let result = page_value(state).and_then(|value| callback.call1(&JsValue::NULL, &value));
    if let Err(e) = result {
        warn!("Favorites page callback failed: {:?}", e);
    }
}

impl Favorites {
    fn with_storage(storage: SharedStorage, mount_dom: bool) -> Self {
        let store = Rc::new(FavoritesStore::new(storage));
        let widgets = Rc::new(Widgets::default());
        if mount_dom {
            let render = Rc::clone(&widgets);
            store.subscribe(move |event| render.render_event(event));
            let announce = Rc::clone(&widgets);
            store.subscribe(move |event| announce.announce_event(event));
            store.sync();
            info!("Favorites mounted with {} saved ids", store.count());
        }
        Self { store, widgets, page: RefCell::new(None) }
    }
}

impl Default for Favorites {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use homefav_core::keys;

    fn detached(storage: MemoryStorage) -> Favorites {
        Favorites::with_storage(Rc::new(storage), false)
    }

    #[test]
    fn view_preferences_through_binding() {
        let favorites = detached(MemoryStorage::with_item(keys::PROPERTY_VIEW_TYPE, "map"));
        assert_eq!(favorites.favorites_view(), "grid");
        favorites.set_favorites_view("table").unwrap();
        assert_eq!(favorites.favorites_view(), "table");

        favorites.before_filter_submit();
        favorites.set_catalog_view("grid").unwrap();
        assert_eq!(favorites.initial_catalog_view(), "map");
        // the flag is gone; map stays because it was saved as the preference
        assert_eq!(favorites.initial_catalog_view(), "map");
    }

    #[test]
    fn page_snapshot_names_every_state() {
        assert_eq!(PageLoad::from(&PageState::Empty).state, "empty");
        assert_eq!(PageLoad::from(&PageState::Loading).state, "loading");

        let error = PageLoad::from(&PageState::Error("HTTP error: 500".to_string()));
        assert_eq!(error.state, "error");
        assert_eq!(error.error.as_deref(), Some("HTTP error: 500"));
        assert!(error.properties.is_empty());
    }

    #[test]
    fn badge_follows_stored_count() {
        let favorites = detached(MemoryStorage::with_item(keys::FAVORITES, "[1, 2, 3]"));
        assert_eq!(favorites.get_all(), vec![1.0, 2.0, 3.0]);
        assert_eq!(favorites.badge_text().as_deref(), Some("3"));
        favorites.clear();
        assert_eq!(favorites.badge_text(), None);
    }
}

#[cfg(all(test, target_arch = "wasm32"))]
mod wasm_tests {
    use super::*;
    use wasm_bindgen_test::*;

    fn detached() -> Favorites {
        Favorites::with_storage(Rc::new(MemoryStorage::new()), false)
    }

    #[wasm_bindgen_test]
    fn parse_id_accepts_only_integral_positive_numbers() {
        assert_eq!(parse_id(&JsValue::from_f64(7.0)), FavoriteId::new(7));
        assert_eq!(parse_id(&JsValue::from_f64(7.5)), None);
        assert_eq!(parse_id(&JsValue::from_f64(-1.0)), None);
        assert_eq!(parse_id(&JsValue::from_str("7")), None);
        assert_eq!(parse_id(&JsValue::NULL), None);
    }

    #[wasm_bindgen_test]
    fn toggle_through_binding() {
        let favorites = detached();
        assert!(favorites.toggle(JsValue::from_f64(7.0)));
        assert_eq!(favorites.get_all(), vec![7.0]);
        assert!(favorites.has(JsValue::from_f64(7.0)));
        assert_eq!(favorites.badge_text().as_deref(), Some("1"));

        assert!(!favorites.toggle(JsValue::from_str("abc")));
        assert!(!favorites.toggle(JsValue::from_f64(7.0)));
        assert_eq!(favorites.count(), 0);
    }
}
