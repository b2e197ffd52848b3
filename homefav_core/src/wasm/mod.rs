// WASM-specific implementations
pub mod storage_impl;
pub mod http;

// Re-exports
pub use storage_impl::*;
pub use http::*;
