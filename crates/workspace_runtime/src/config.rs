//! Runtime configuration for storage keys, write debouncing, and startup restore.

use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;

pub const DEFAULT_SNAPSHOT_KEY: &str = "workspace-state";
pub const DEFAULT_CONSENT_KEY: &str = "workspace-persistence-consent";
pub const DEFAULT_PERSIST_DEBOUNCE_MS: u64 = 500;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid workspace config: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Workspace runtime settings. Every field falls back to its default when omitted.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct WorkspaceConfig {
    /// Storage key holding the persisted snapshot.
    pub snapshot_key: String,
    /// Storage key holding the user's persistence consent flag.
    pub consent_key: String,
    /// Quiet interval after the last change before the snapshot is written.
    pub persist_debounce_ms: u64,
    /// Whether startup hydration reads the persisted snapshot at all.
    pub restore_on_start: bool,
}

impl Default for WorkspaceConfig {
    fn default() -> Self {
        Self {
            snapshot_key: DEFAULT_SNAPSHOT_KEY.to_string(),
            consent_key: DEFAULT_CONSENT_KEY.to_string(),
            persist_debounce_ms: DEFAULT_PERSIST_DEBOUNCE_MS,
            restore_on_start: true,
        }
    }
}

impl WorkspaceConfig {
    /// Parses a TOML document into a config.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] for malformed TOML, wrong value types, or unknown keys.
    pub fn from_toml_str(raw: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(raw)?)
    }

    pub fn persist_debounce(&self) -> Duration {
        Duration::from_millis(self.persist_debounce_ms)
    }
}
