//! Window state machine for the toolkit workspace.
//!
//! A pure reducer ([`reduce_app`]) owns every transition, [`WorkspaceStore`] wraps it with
//! subscribers, and persistence goes through a consent-gated port behind a debounced writer.

pub mod config;
pub mod debounce;
pub mod features;
pub mod model;
pub mod persistence;
pub mod reducer;
pub mod store;
pub mod window_manager;

pub use config::{ConfigError, WorkspaceConfig};
pub use debounce::DebouncedWriter;
pub use features::{feature_catalog, feature_descriptor, open_action, visible_features};
pub use model::*;
pub use persistence::{hydrate_initial_state, PersistenceError, PersistencePort, SaveOutcome};
pub use reducer::{
    reduce_app, reduce_settings, reduce_workspace, AppAction, SettingsAction, WorkspaceAction,
};
pub use store::{SubscriptionId, WorkspaceStore};
pub use window_manager::{check_invariants, InvariantViolation};
