// Persisted view-mode preferences (favorites page and property catalog)

use crate::storage_trait::{keys, StorageBackend};
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A view mode stored as a bare string under its own key
pub trait ViewMode: Copy + Default + FromStr + fmt::Display {
    const STORAGE_KEY: &'static str;
}

/// Parse a stored value, accepting both `grid` and the JSON-quoted `"grid"`
fn unquote(raw: &str) -> &str {
    let trimmed = raw.trim();
    trimmed
        .strip_prefix('"')
        .and_then(|s| s.strip_suffix('"'))
        .unwrap_or(trimmed)
}

/// Layout of the favorites page
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FavoritesView {
    #[default]
    Grid,
    Table,
}

impl FromStr for FavoritesView {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match unquote(s) {
            "grid" => Ok(FavoritesView::Grid),
            "table" => Ok(FavoritesView::Table),
            other => Err(format!("unknown favorites view '{}', expected grid or table", other)),
        }
    }
}

impl fmt::Display for FavoritesView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            FavoritesView::Grid => "grid",
            FavoritesView::Table => "table",
        })
    }
}

impl ViewMode for FavoritesView {
    const STORAGE_KEY: &'static str = keys::FAVORITES_VIEW;
}

/// Layout of the property catalog
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CatalogView {
    #[default]
    Grid,
    Map,
}

impl FromStr for CatalogView {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match unquote(s) {
            "grid" => Ok(CatalogView::Grid),
            "map" => Ok(CatalogView::Map),
            other => Err(format!("unknown catalog view '{}', expected grid or map", other)),
        }
    }
}

impl fmt::Display for CatalogView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            CatalogView::Grid => "grid",
            CatalogView::Map => "map",
        })
    }
}

impl ViewMode for CatalogView {
    const STORAGE_KEY: &'static str = keys::PROPERTY_VIEW_TYPE;
}

/// Read the stored mode; absent, unreadable or unknown values give the default
pub fn load_view<M: ViewMode, S: StorageBackend + ?Sized>(storage: &S) -> M {
    match storage.get_item(M::STORAGE_KEY) {
        Ok(Some(raw)) => raw.parse().unwrap_or_else(|_| {
            debug!("Unrecognized value '{}' for {}, using default", raw, M::STORAGE_KEY);
            M::default()
        }),
        Ok(None) => M::default(),
        Err(e) => {
            warn!("Failed to read {}: {}", M::STORAGE_KEY, e);
            M::default()
        }
    }
}

/// Persist the mode; failures are logged and otherwise ignored
pub fn save_view<M: ViewMode, S: StorageBackend + ?Sized>(storage: &S, mode: M) {
    if let Err(e) = storage.set_item(M::STORAGE_KEY, &mode.to_string()) {
        warn!("Failed to save {}: {}", M::STORAGE_KEY, e);
    }
}

/// Remember that the catalog should reopen in map view after a filter submit
pub fn mark_return_to_map<S: StorageBackend + ?Sized>(storage: &S) {
    if let Err(e) = storage.set_item(keys::RETURN_TO_MAP_VIEW, "true") {
        warn!("Failed to save {}: {}", keys::RETURN_TO_MAP_VIEW, e);
    }
}

/// Called right before a catalog filter form is submitted
pub fn prepare_filter_submit<S: StorageBackend + ?Sized>(storage: &S) {
    if load_view::<CatalogView, S>(storage) == CatalogView::Map {
        mark_return_to_map(storage);
    }
}

/// Initial catalog view at page load. A pending return-to-map flag is consumed
/// and wins over the stored preference.
pub fn initial_catalog_view<S: StorageBackend + ?Sized>(storage: &S) -> CatalogView {
    let flagged = matches!(
        storage.get_item(keys::RETURN_TO_MAP_VIEW),
        Ok(Some(ref v)) if unquote(v) == "true"
    );
    if flagged {
        if let Err(e) = storage.remove_item(keys::RETURN_TO_MAP_VIEW) {
            warn!("Failed to clear {}: {}", keys::RETURN_TO_MAP_VIEW, e);
        }
        save_view(storage, CatalogView::Map);
        return CatalogView::Map;
    }
    load_view(storage)
}
