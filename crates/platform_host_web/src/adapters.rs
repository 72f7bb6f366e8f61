use std::rc::Rc;

use platform_host::{HostServices, HostStrategy, PrefsStore, TimerService};

use crate::{WebPrefsStore, WebTimerService};

/// Returns the browser preference store.
pub fn prefs_store() -> Rc<dyn PrefsStore> {
    Rc::new(WebPrefsStore)
}

/// Returns a fresh browser timer service.
pub fn timer_service() -> Rc<dyn TimerService> {
    Rc::new(WebTimerService::default())
}

/// Assembles the browser host bundle injected into the workspace runtime.
pub fn build_host_services() -> HostServices {
    HostServices::new(prefs_store(), timer_service(), HostStrategy::Browser)
}
