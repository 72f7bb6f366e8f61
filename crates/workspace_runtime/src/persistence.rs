//! Consent-gated persistence port and startup hydration.
//!
//! Nothing in here propagates storage failures to the caller: a snapshot that cannot be read is
//! treated as absent, and a snapshot that cannot be written is logged and dropped.

use std::{fmt, rc::Rc};

use leptos::logging;
use platform_host::{load_pref_with, save_pref_with, PrefsStore};
use serde_json::Value;
use thiserror::Error;

use crate::config::WorkspaceConfig;
use crate::model::{AppState, PersistedSnapshot};
use crate::window_manager::check_invariants;

#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("snapshot serialization failed: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error("storage operation failed: {0}")]
    Storage(String),
}

/// Result of a [`PersistencePort::save`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveOutcome {
    Written,
    /// Consent is absent; storage was not touched.
    SkippedNoConsent,
    /// The write failed and was logged. It is not retried.
    Failed,
}

/// Durable snapshot storage gated by an independently stored consent flag.
#[derive(Clone)]
pub struct PersistencePort {
    prefs: Rc<dyn PrefsStore>,
    snapshot_key: String,
    consent_key: String,
}

impl fmt::Debug for PersistencePort {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PersistencePort")
            .field("snapshot_key", &self.snapshot_key)
            .field("consent_key", &self.consent_key)
            .finish_non_exhaustive()
    }
}

impl PersistencePort {
    pub fn new(prefs: Rc<dyn PrefsStore>, config: &WorkspaceConfig) -> Self {
        Self {
            prefs,
            snapshot_key: config.snapshot_key.clone(),
            consent_key: config.consent_key.clone(),
        }
    }

    /// Returns whether the user has granted persistence consent.
    ///
    /// Only a stored `true` (or the string `"true"`) counts; anything else, including an
    /// unreadable value, means no consent.
    pub fn has_consent(&self) -> bool {
        match load_pref_with::<_, Value>(self.prefs.as_ref(), &self.consent_key) {
            Ok(Some(Value::Bool(granted))) => granted,
            Ok(Some(Value::String(raw))) => raw == "true",
            Ok(_) => false,
            Err(err) => {
                logging::warn!("persistence consent flag unreadable: {err}");
                false
            }
        }
    }

    /// Records the consent flag. Revoking consent also deletes the stored snapshot.
    ///
    /// # Errors
    ///
    /// Returns [`PersistenceError::Storage`] when the flag or snapshot cannot be written.
    pub fn set_consent(&self, granted: bool) -> Result<(), PersistenceError> {
        save_pref_with(self.prefs.as_ref(), &self.consent_key, &granted)
            .map_err(PersistenceError::Storage)?;
        if !granted {
            self.prefs
                .delete_pref(&self.snapshot_key)
                .map_err(PersistenceError::Storage)?;
        }
        logging::log!(
            "workspace persistence {}",
            if granted { "enabled" } else { "disabled" }
        );
        Ok(())
    }

    /// Loads the stored snapshot, if consent is granted and the value is well formed.
    pub fn load(&self) -> Option<PersistedSnapshot> {
        if !self.has_consent() {
            return None;
        }
        match load_pref_with::<_, PersistedSnapshot>(self.prefs.as_ref(), &self.snapshot_key) {
            Ok(snapshot) => snapshot,
            Err(err) => {
                logging::warn!("discarding malformed workspace snapshot: {err}");
                None
            }
        }
    }

    /// Writes `snapshot` if consent is granted. Failures are logged, never retried.
    pub fn save(&self, snapshot: &PersistedSnapshot) -> SaveOutcome {
        if !self.has_consent() {
            return SaveOutcome::SkippedNoConsent;
        }
        match self.write_snapshot(snapshot) {
            Ok(()) => SaveOutcome::Written,
            Err(err) => {
                logging::warn!("workspace snapshot save failed: {err}");
                SaveOutcome::Failed
            }
        }
    }

    fn write_snapshot(&self, snapshot: &PersistedSnapshot) -> Result<(), PersistenceError> {
        let raw = serde_json::to_string(snapshot)?;
        self.prefs
            .save_pref(&self.snapshot_key, &raw)
            .map_err(PersistenceError::Storage)
    }
}

/// Builds the store's initial state: `defaults` merged with the persisted snapshot, if any.
///
/// A snapshot that still breaks workspace invariants after normalization is discarded.
pub fn hydrate_initial_state(
    port: &PersistencePort,
    config: &WorkspaceConfig,
    defaults: AppState,
) -> AppState {
    if !config.restore_on_start {
        return defaults;
    }
    let Some(snapshot) = port.load() else {
        return defaults;
    };

    let hydrated = AppState::from_snapshot(defaults.clone(), snapshot);
    match check_invariants(&hydrated.workspace) {
        Ok(()) => {
            logging::log!(
                "restored {} workspace window(s)",
                hydrated.workspace.apps.len()
            );
            hydrated
        }
        Err(violation) => {
            logging::warn!("discarding inconsistent workspace snapshot: {violation}");
            defaults
        }
    }
}
