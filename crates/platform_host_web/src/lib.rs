//! Browser (`wasm32`) implementations of [`platform_host`] service contracts.
//!
//! This crate is the concrete browser-side host wiring layer: `localStorage`-backed preferences
//! and `setTimeout`-backed timers. On other targets the adapters compile to inert fallbacks so the
//! workspace can be built and tested natively.

#![warn(missing_docs, rustdoc::broken_intra_doc_links)]

/// Concrete adapter factories for runtime wiring.
pub mod adapters;
pub mod storage;
pub mod timer;

pub use adapters::{build_host_services, prefs_store, timer_service};
pub use storage::local_prefs::WebPrefsStore;
pub use timer::WebTimerService;
