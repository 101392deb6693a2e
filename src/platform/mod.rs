//! Platform abstraction layer
//!
//! Browser bindings for the core:
//! - `storage`: `localStorage` behind the [`KeyValueStore`](crate::persistence::KeyValueStore) trait
//! - `web`: the `WebGame` handle driven from JavaScript (frames, keys, visibility)
//!
//! Native builds use [`MemoryStore`](crate::persistence::MemoryStore) and the
//! headless binary instead.

#[cfg(target_arch = "wasm32")]
pub mod storage;
#[cfg(target_arch = "wasm32")]
pub mod web;

#[cfg(target_arch = "wasm32")]
pub use storage::LocalStorage;
#[cfg(target_arch = "wasm32")]
pub use web::WebGame;
