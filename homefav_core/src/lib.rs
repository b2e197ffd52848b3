// Homefav Core Library
// Platform-agnostic favorites state for the listing site

pub mod models;
pub mod error;
pub mod storage_trait;
pub mod favorites;
pub mod badge;
pub mod view_mode;
pub mod property_api;
pub mod favorites_page;
pub mod settings;

#[cfg(feature = "native")]
pub mod native;

#[cfg(all(feature = "wasm", target_arch = "wasm32"))]
pub mod wasm;

// Re-exports
pub use error::{CoreError, CoreResult};
pub use models::*;
pub use settings::Settings;
pub use storage_trait::*;
pub use favorites::*;
pub use badge::badge_text;
pub use view_mode::{CatalogView, FavoritesView, ViewMode};
pub use property_api::*;
pub use favorites_page::*;
