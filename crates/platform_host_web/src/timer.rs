//! `setTimeout`-backed timer service.

use std::{cell::RefCell, collections::HashMap, rc::Rc, time::Duration};

use platform_host::{TimerCallback, TimerHandle, TimerService};

#[derive(Debug, Default)]
struct WebTimerState {
    next_handle: u64,
    // Runtime handle -> browser timeout id.
    active: HashMap<TimerHandle, i32>,
}

/// Browser timer service backed by `window.setTimeout` / `window.clearTimeout`.
///
/// Outside `wasm32` there is no event loop to drive timers, so armed callbacks are dropped without
/// running; hosts that need deferred work natively use [`platform_host::ManualTimerService`].
#[derive(Debug, Clone, Default)]
pub struct WebTimerService {
    inner: Rc<RefCell<WebTimerState>>,
}

impl WebTimerService {
    fn allocate_handle(&self) -> TimerHandle {
        let mut state = self.inner.borrow_mut();
        state.next_handle = state.next_handle.saturating_add(1);
        TimerHandle(state.next_handle)
    }

    /// Returns the number of browser timeouts armed through this service that have not fired.
    pub fn active_count(&self) -> usize {
        self.inner.borrow().active.len()
    }
}

impl TimerService for WebTimerService {
    fn set_timeout(&self, delay: Duration, callback: TimerCallback) -> TimerHandle {
        let handle = self.allocate_handle();

        #[cfg(target_arch = "wasm32")]
        {
            use wasm_bindgen::{closure::Closure, JsCast};

            let state = Rc::downgrade(&self.inner);
            // `once_into_js` frees the closure after its single invocation.
            let js_callback = Closure::once_into_js(move || {
                if let Some(state) = state.upgrade() {
                    state.borrow_mut().active.remove(&handle);
                }
                callback();
            });
            let delay_ms = i32::try_from(delay.as_millis()).unwrap_or(i32::MAX);
            let armed = web_sys::window().and_then(|window| {
                window
                    .set_timeout_with_callback_and_timeout_and_arguments_0(
                        js_callback.unchecked_ref(),
                        delay_ms,
                    )
                    .ok()
            });
            if let Some(browser_id) = armed {
                self.inner.borrow_mut().active.insert(handle, browser_id);
            }
        }

        #[cfg(not(target_arch = "wasm32"))]
        {
            let _ = (delay, callback);
        }

        handle
    }

    fn clear_timeout(&self, handle: TimerHandle) {
        let Some(browser_id) = self.inner.borrow_mut().active.remove(&handle) else {
            return;
        };

        #[cfg(target_arch = "wasm32")]
        {
            if let Some(window) = web_sys::window() {
                window.clear_timeout_with_handle(browser_id);
            }
        }

        #[cfg(not(target_arch = "wasm32"))]
        {
            let _ = browser_id;
        }
    }
}
