//! Timer contracts for deferred host work.
//!
//! The runtime never sleeps or polls: it arms a one-shot timer through [`TimerService`] and keeps
//! the returned [`TimerHandle`] so the timer can be cleared when it is superseded or its owner is
//! torn down.

use std::{cell::RefCell, collections::BTreeMap, fmt, rc::Rc, time::Duration};

/// One-shot callback invoked when a timer elapses.
pub type TimerCallback = Box<dyn FnOnce()>;

/// Opaque handle identifying an armed timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TimerHandle(pub u64);

/// Host service for arming and clearing one-shot timers.
pub trait TimerService {
    /// Arms a timer that invokes `callback` once after `delay` elapses.
    fn set_timeout(&self, delay: Duration, callback: TimerCallback) -> TimerHandle;

    /// Clears a pending timer. Clearing an elapsed or unknown handle is a no-op.
    fn clear_timeout(&self, handle: TimerHandle);
}

struct ScheduledTimer {
    deadline: Duration,
    callback: TimerCallback,
}

#[derive(Default)]
struct ManualTimerState {
    now: Duration,
    next_handle: u64,
    pending: BTreeMap<TimerHandle, ScheduledTimer>,
}

/// Deterministic timer service driven by an explicit virtual clock.
///
/// Nothing fires until [`ManualTimerService::advance`] moves the clock past a deadline. Clones
/// share the same clock and timer table.
#[derive(Clone, Default)]
pub struct ManualTimerService {
    inner: Rc<RefCell<ManualTimerState>>,
}

impl fmt::Debug for ManualTimerService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.inner.borrow();
        f.debug_struct("ManualTimerService")
            .field("now", &state.now)
            .field("pending", &state.pending.len())
            .finish()
    }
}

impl ManualTimerService {
    /// Returns the current virtual time.
    pub fn now(&self) -> Duration {
        self.inner.borrow().now
    }

    /// Returns the number of armed timers that have not fired or been cleared.
    pub fn pending_count(&self) -> usize {
        self.inner.borrow().pending.len()
    }

    /// Advances the virtual clock by `by`, firing every timer whose deadline is reached.
    ///
    /// Timers fire in deadline order (ties in arming order). Callbacks may arm or clear timers;
    /// newly armed timers that fall inside the advanced window fire during the same call.
    /// Returns the number of callbacks invoked.
    pub fn advance(&self, by: Duration) -> usize {
        let target = self.inner.borrow().now.saturating_add(by);
        let mut fired = 0;
        loop {
            let next = {
                let state = self.inner.borrow();
                state
                    .pending
                    .iter()
                    .filter(|(_, timer)| timer.deadline <= target)
                    .min_by_key(|(handle, timer)| (timer.deadline, **handle))
                    .map(|(handle, _)| *handle)
            };
            let Some(handle) = next else {
                break;
            };

            // Release the borrow before running the callback so it can re-arm timers.
            let timer = {
                let mut state = self.inner.borrow_mut();
                let timer = state.pending.remove(&handle);
                if let Some(timer) = &timer {
                    state.now = state.now.max(timer.deadline);
                }
                timer
            };
            if let Some(timer) = timer {
                (timer.callback)();
                fired += 1;
            }
        }
        self.inner.borrow_mut().now = target;
        fired
    }
}

impl TimerService for ManualTimerService {
    fn set_timeout(&self, delay: Duration, callback: TimerCallback) -> TimerHandle {
        let mut state = self.inner.borrow_mut();
        state.next_handle = state.next_handle.saturating_add(1);
        let handle = TimerHandle(state.next_handle);
        let deadline = state.now.saturating_add(delay);
        state
            .pending
            .insert(handle, ScheduledTimer { deadline, callback });
        handle
    }

    fn clear_timeout(&self, handle: TimerHandle) {
        self.inner.borrow_mut().pending.remove(&handle);
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use pretty_assertions::assert_eq;

    use super::*;

    fn counter_callback(counter: &Rc<Cell<u32>>) -> TimerCallback {
        let counter = Rc::clone(counter);
        Box::new(move || counter.set(counter.get() + 1))
    }

    #[test]
    fn timer_fires_only_after_deadline() {
        let timers = ManualTimerService::default();
        let fired = Rc::new(Cell::new(0));
        timers.set_timeout(Duration::from_millis(500), counter_callback(&fired));

        assert_eq!(timers.advance(Duration::from_millis(499)), 0);
        assert_eq!(fired.get(), 0);
        assert_eq!(timers.advance(Duration::from_millis(1)), 1);
        assert_eq!(fired.get(), 1);
        assert_eq!(timers.pending_count(), 0);
        assert_eq!(timers.now(), Duration::from_millis(500));
    }

    #[test]
    fn cleared_timer_never_fires() {
        let timers = ManualTimerService::default();
        let fired = Rc::new(Cell::new(0));
        let handle = timers.set_timeout(Duration::from_millis(10), counter_callback(&fired));
        timers.clear_timeout(handle);
        timers.clear_timeout(handle);

        assert_eq!(timers.advance(Duration::from_secs(1)), 0);
        assert_eq!(fired.get(), 0);
    }

    #[test]
    fn callbacks_may_arm_follow_up_timers() {
        let timers = ManualTimerService::default();
        let fired = Rc::new(Cell::new(0));
        let inner_timers = timers.clone();
        let inner_fired = Rc::clone(&fired);
        timers.set_timeout(
            Duration::from_millis(10),
            Box::new(move || {
                inner_fired.set(inner_fired.get() + 1);
                inner_timers.set_timeout(Duration::from_millis(10), counter_callback(&inner_fired));
            }),
        );

        assert_eq!(timers.advance(Duration::from_millis(25)), 2);
        assert_eq!(fired.get(), 2);
    }

    #[test]
    fn handles_are_unique() {
        let timers = ManualTimerService::default();
        let a = timers.set_timeout(Duration::ZERO, Box::new(|| {}));
        let b = timers.set_timeout(Duration::ZERO, Box::new(|| {}));
        assert_ne!(a, b);
    }
}
