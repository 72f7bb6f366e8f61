//! Typed host-domain contracts shared by the workspace runtime and browser adapters.
//!
//! This crate is the API-first boundary for platform services. It exposes the key-value
//! preference store contract, the timer contract used for deferred work, and the host bundle that
//! is injected into the runtime. Concrete browser adapters live in `platform_host_web`.

#![warn(missing_docs, rustdoc::broken_intra_doc_links)]

pub mod host;
pub mod storage;
pub mod timer;

pub use host::{HostServices, HostStrategy};
pub use storage::prefs::{
    load_pref_with, save_pref_with, MemoryPrefsStore, NoopPrefsStore, PrefsStore,
};
pub use timer::{ManualTimerService, TimerCallback, TimerHandle, TimerService};
