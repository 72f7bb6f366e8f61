//! Workspace store: the single owner of [`AppState`].
//!
//! The store wraps the reducer with startup hydration, synchronous subscriber notification, and
//! the debounced persistence writer. All mutation flows through [`WorkspaceStore::dispatch`].

use std::{
    cell::{Cell, RefCell},
    rc::Rc,
};

use leptos::logging;
use platform_host::HostServices;

use crate::config::{ConfigError, WorkspaceConfig};
use crate::debounce::DebouncedWriter;
use crate::model::AppState;
use crate::persistence::{hydrate_initial_state, PersistenceError, PersistencePort, SaveOutcome};
use crate::reducer::{reduce_app, AppAction};

type Subscriber = Rc<dyn Fn(&AppState)>;

/// Handle returned by [`WorkspaceStore::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

struct StoreInner {
    state: RefCell<Rc<AppState>>,
    subscribers: RefCell<Vec<(SubscriptionId, Subscriber)>>,
    next_subscription: Cell<u64>,
    writer: DebouncedWriter,
    disposed: Cell<bool>,
}

/// Reducer container with subscribers and debounced persistence.
///
/// Clones share the same store. Dropping the last clone cancels any pending write.
#[derive(Clone)]
pub struct WorkspaceStore {
    inner: Rc<StoreInner>,
}

impl WorkspaceStore {
    /// Builds a store whose initial state is the default state merged with the persisted
    /// snapshot (when consent is granted and restore is enabled).
    pub fn new(config: &WorkspaceConfig, host: HostServices) -> Self {
        let port = PersistencePort::new(Rc::clone(&host.prefs), config);
        let initial = hydrate_initial_state(&port, config, AppState::default());
        Self::build(config, host, port, initial)
    }

    /// Builds a hydrated store from a TOML config document (see [`WorkspaceConfig`]).
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] when the document is not a valid config.
    pub fn from_config_toml(raw: &str, host: HostServices) -> Result<Self, ConfigError> {
        let config = WorkspaceConfig::from_toml_str(raw)?;
        Ok(Self::new(&config, host))
    }

    /// Builds a store around an explicit initial state without reading storage.
    pub fn with_state(config: &WorkspaceConfig, host: HostServices, state: AppState) -> Self {
        let port = PersistencePort::new(Rc::clone(&host.prefs), config);
        Self::build(config, host, port, state)
    }

    fn build(
        config: &WorkspaceConfig,
        host: HostServices,
        port: PersistencePort,
        state: AppState,
    ) -> Self {
        let writer = DebouncedWriter::new(port, host.timers, config.persist_debounce());
        Self {
            inner: Rc::new(StoreInner {
                state: RefCell::new(Rc::new(state)),
                subscribers: RefCell::new(Vec::new()),
                next_subscription: Cell::new(0),
                writer,
                disposed: Cell::new(false),
            }),
        }
    }

    /// Returns the committed state.
    pub fn state(&self) -> Rc<AppState> {
        Rc::clone(&self.inner.state.borrow())
    }

    /// Applies `action` and notifies subscribers before returning.
    ///
    /// Transitions that leave the state unchanged notify nobody and schedule nothing. A
    /// persistence write is scheduled only when `workspace` or `settings` changed. Subscribers
    /// may dispatch from inside their callback: the nested transition is committed and announced
    /// immediately, and the outer notification pass stops there, so every subscriber's last
    /// observed state is the committed one.
    pub fn dispatch(&self, action: impl Into<AppAction>) {
        if self.inner.disposed.get() {
            logging::warn!("dispatch on a disposed workspace store ignored");
            return;
        }

        let previous = self.state();
        let mut next = AppState::clone(&previous);
        reduce_app(&mut next, action.into());
        if next == *previous {
            return;
        }

        let persist = next.workspace != previous.workspace || next.settings != previous.settings;
        let next = Rc::new(next);
        *self.inner.state.borrow_mut() = Rc::clone(&next);

        if persist {
            self.inner.writer.schedule(next.snapshot());
        }
        self.notify(&next);
    }

    fn notify(&self, state: &Rc<AppState>) {
        let subscribers = self
            .inner
            .subscribers
            .borrow()
            .iter()
            .map(|(_, subscriber)| Rc::clone(subscriber))
            .collect::<Vec<_>>();
        for subscriber in subscribers {
            // A nested dispatch has already notified everyone with a newer state.
            if !Rc::ptr_eq(state, &self.inner.state.borrow()) {
                return;
            }
            subscriber(state);
        }
    }

    /// Registers a callback invoked with the new state after every committed transition.
    pub fn subscribe(&self, subscriber: impl Fn(&AppState) + 'static) -> SubscriptionId {
        let id = SubscriptionId(self.inner.next_subscription.get());
        self.inner.next_subscription.set(id.0 + 1);
        self.inner
            .subscribers
            .borrow_mut()
            .push((id, Rc::new(subscriber)));
        id
    }

    /// Removes a subscriber. Returns `false` if it was already removed.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut subscribers = self.inner.subscribers.borrow_mut();
        let before = subscribers.len();
        subscribers.retain(|(existing, _)| *existing != id);
        subscribers.len() != before
    }

    pub fn persistence(&self) -> &PersistencePort {
        self.inner.writer.port()
    }

    /// Records the persistence consent flag.
    ///
    /// Granting consent schedules a write of the current state; revoking it drops any pending
    /// write and deletes the stored snapshot.
    ///
    /// # Errors
    ///
    /// Returns [`PersistenceError::Storage`] when the consent flag cannot be stored.
    pub fn set_persistence_consent(&self, granted: bool) -> Result<(), PersistenceError> {
        if !granted {
            self.inner.writer.cancel();
        }
        self.persistence().set_consent(granted)?;
        if granted && !self.inner.disposed.get() {
            self.inner.writer.schedule(self.state().snapshot());
        }
        Ok(())
    }

    /// Writes any pending snapshot immediately (for example when the page is being hidden).
    pub fn flush(&self) -> Option<SaveOutcome> {
        self.inner.writer.flush()
    }

    pub fn has_pending_write(&self) -> bool {
        self.inner.writer.has_pending()
    }

    /// Tears the store down: the pending write is cancelled, subscribers are released, and later
    /// dispatches are ignored.
    pub fn dispose(&self) {
        self.inner.disposed.set(true);
        self.inner.writer.cancel();
        self.inner.subscribers.borrow_mut().clear();
    }
}
