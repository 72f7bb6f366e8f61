//! Debounced snapshot writer.
//!
//! Every committed change re-arms a single timer; the snapshot is written only once the quiet
//! interval passes without another change. At most one write is pending at any time.

use std::{
    cell::{Cell, RefCell},
    rc::{Rc, Weak},
    time::Duration,
};

use platform_host::{TimerHandle, TimerService};

use crate::model::PersistedSnapshot;
use crate::persistence::{PersistencePort, SaveOutcome};

struct PendingWrite {
    generation: u64,
    timer: TimerHandle,
    snapshot: PersistedSnapshot,
}

struct WriterInner {
    port: PersistencePort,
    timers: Rc<dyn TimerService>,
    quiet: Duration,
    generation: Cell<u64>,
    pending: RefCell<Option<PendingWrite>>,
}

impl WriterInner {
    fn take_pending(&self) -> Option<PendingWrite> {
        self.pending.borrow_mut().take()
    }

    fn fire(&self, generation: u64) {
        let due = {
            let mut pending = self.pending.borrow_mut();
            match pending.as_ref() {
                Some(write) if write.generation == generation => pending.take(),
                _ => None,
            }
        };
        if let Some(write) = due {
            self.port.save(&write.snapshot);
        }
    }
}

impl Drop for WriterInner {
    fn drop(&mut self) {
        if let Some(write) = self.pending.get_mut().take() {
            self.timers.clear_timeout(write.timer);
        }
    }
}

/// Coalesces bursts of snapshot changes into a single persistence write.
///
/// Dropping the writer cancels any pending write.
pub struct DebouncedWriter {
    inner: Rc<WriterInner>,
}

impl DebouncedWriter {
    pub fn new(port: PersistencePort, timers: Rc<dyn TimerService>, quiet: Duration) -> Self {
        Self {
            inner: Rc::new(WriterInner {
                port,
                timers,
                quiet,
                generation: Cell::new(0),
                pending: RefCell::new(None),
            }),
        }
    }

    pub fn port(&self) -> &PersistencePort {
        &self.inner.port
    }

    /// Replaces any pending write with `snapshot` and restarts the quiet interval.
    pub fn schedule(&self, snapshot: PersistedSnapshot) {
        self.cancel();

        let generation = self.inner.generation.get().wrapping_add(1);
        self.inner.generation.set(generation);
        let weak: Weak<WriterInner> = Rc::downgrade(&self.inner);
        let timer = self.inner.timers.set_timeout(
            self.inner.quiet,
            Box::new(move || {
                if let Some(inner) = weak.upgrade() {
                    inner.fire(generation);
                }
            }),
        );
        *self.inner.pending.borrow_mut() = Some(PendingWrite {
            generation,
            timer,
            snapshot,
        });
    }

    /// Writes the pending snapshot now. Returns `None` when nothing was pending.
    pub fn flush(&self) -> Option<SaveOutcome> {
        let write = self.inner.take_pending()?;
        self.inner.timers.clear_timeout(write.timer);
        Some(self.inner.port.save(&write.snapshot))
    }

    /// Drops the pending write, if any, without writing it.
    pub fn cancel(&self) {
        if let Some(write) = self.inner.take_pending() {
            self.inner.timers.clear_timeout(write.timer);
        }
    }

    pub fn has_pending(&self) -> bool {
        self.inner.pending.borrow().is_some()
    }
}

#[cfg(test)]
mod tests {
    use platform_host::{ManualTimerService, MemoryPrefsStore, PrefsStore};
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::config::WorkspaceConfig;
    use crate::model::{AppState, PersistedSnapshot};
    use crate::reducer::{reduce_app, WorkspaceAction};

    const QUIET: Duration = Duration::from_millis(500);

    struct CountingPrefsStore {
        inner: MemoryPrefsStore,
        snapshot_writes: Cell<u32>,
    }

    impl PrefsStore for CountingPrefsStore {
        fn load_pref(&self, key: &str) -> Result<Option<String>, String> {
            self.inner.load_pref(key)
        }

        fn save_pref(&self, key: &str, raw_json: &str) -> Result<(), String> {
            if key == "workspace-state" {
                self.snapshot_writes.set(self.snapshot_writes.get() + 1);
            }
            self.inner.save_pref(key, raw_json)
        }

        fn delete_pref(&self, key: &str) -> Result<(), String> {
            self.inner.delete_pref(key)
        }
    }

    fn fixture() -> (DebouncedWriter, Rc<CountingPrefsStore>, ManualTimerService) {
        let store = Rc::new(CountingPrefsStore {
            inner: MemoryPrefsStore::default(),
            snapshot_writes: Cell::new(0),
        });
        let port = PersistencePort::new(store.clone(), &WorkspaceConfig::default());
        port.set_consent(true).expect("consent");
        let timers = ManualTimerService::default();
        let writer = DebouncedWriter::new(port, Rc::new(timers.clone()), QUIET);
        (writer, store, timers)
    }

    fn snapshot_with_windows(count: usize) -> PersistedSnapshot {
        let mut state = AppState::default();
        for index in 0..count {
            reduce_app(
                &mut state,
                WorkspaceAction::open(format!("feature-{index}"), "Feature").into(),
            );
        }
        state.snapshot()
    }

    #[test]
    fn burst_of_changes_produces_one_write_of_latest_snapshot() {
        let (writer, store, timers) = fixture();

        for count in 1..=5 {
            writer.schedule(snapshot_with_windows(count));
            timers.advance(Duration::from_millis(100));
        }
        assert_eq!(store.snapshot_writes.get(), 0);
        assert_eq!(timers.pending_count(), 1);

        timers.advance(QUIET);

        assert_eq!(store.snapshot_writes.get(), 1);
        assert!(!writer.has_pending());
        assert_eq!(writer.port().load(), Some(snapshot_with_windows(5)));
    }

    #[test]
    fn write_waits_for_full_quiet_interval() {
        let (writer, store, timers) = fixture();
        writer.schedule(snapshot_with_windows(1));
        timers.advance(QUIET - Duration::from_millis(1));
        assert_eq!(store.snapshot_writes.get(), 0);
        timers.advance(Duration::from_millis(1));
        assert_eq!(store.snapshot_writes.get(), 1);
    }

    #[test]
    fn dropping_writer_cancels_pending_write() {
        let (writer, store, timers) = fixture();
        writer.schedule(snapshot_with_windows(2));
        drop(writer);

        assert_eq!(timers.pending_count(), 0);
        timers.advance(QUIET * 4);
        assert_eq!(store.snapshot_writes.get(), 0);
    }

    #[test]
    fn cancel_discards_pending_snapshot() {
        let (writer, store, timers) = fixture();
        writer.schedule(snapshot_with_windows(1));
        writer.cancel();
        timers.advance(QUIET);
        assert_eq!(store.snapshot_writes.get(), 0);
        assert_eq!(writer.flush(), None);
    }

    #[test]
    fn flush_writes_immediately_and_clears_timer() {
        let (writer, store, timers) = fixture();
        writer.schedule(snapshot_with_windows(1));

        assert_eq!(writer.flush(), Some(SaveOutcome::Written));
        assert_eq!(store.snapshot_writes.get(), 1);
        assert_eq!(timers.pending_count(), 0);

        timers.advance(QUIET);
        assert_eq!(store.snapshot_writes.get(), 1);
    }
}
