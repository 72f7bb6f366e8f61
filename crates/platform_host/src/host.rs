//! Shared host-bundle model for browser and headless runtime composition.

use std::rc::Rc;

use crate::{ManualTimerService, MemoryPrefsStore, PrefsStore, TimerService};

/// Stable host strategy selected for the current build/runtime composition path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostStrategy {
    /// Browser-backed runtime composition.
    Browser,
    /// Headless composition (tests, native tooling) with in-memory adapters.
    Headless,
}

impl HostStrategy {
    /// Returns a stable string token for diagnostics and runtime inspection.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Browser => "browser",
            Self::Headless => "headless",
        }
    }
}

/// Runtime-selected host service bundle injected into the workspace runtime.
///
/// All environment-specific service selection happens before this bundle crosses into
/// `workspace_runtime`, which keeps the runtime decoupled from browser adapter details.
#[derive(Clone)]
pub struct HostServices {
    /// Lightweight durable key-value store.
    pub prefs: Rc<dyn PrefsStore>,
    /// One-shot timer service used for deferred writes.
    pub timers: Rc<dyn TimerService>,
    /// Stable strategy identifier for diagnostics.
    pub host_strategy: HostStrategy,
}

impl HostServices {
    /// Builds a host bundle from explicit adapters.
    pub fn new(
        prefs: Rc<dyn PrefsStore>,
        timers: Rc<dyn TimerService>,
        host_strategy: HostStrategy,
    ) -> Self {
        Self {
            prefs,
            timers,
            host_strategy,
        }
    }

    /// Builds a headless bundle over the given in-memory store and manual clock.
    ///
    /// Callers keep their own clones of `prefs` and `timers` to inspect writes and drive time.
    pub fn headless(prefs: MemoryPrefsStore, timers: ManualTimerService) -> Self {
        Self::new(Rc::new(prefs), Rc::new(timers), HostStrategy::Headless)
    }
}

impl std::fmt::Debug for HostServices {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HostServices")
            .field("host_strategy", &self.host_strategy)
            .finish_non_exhaustive()
    }
}
