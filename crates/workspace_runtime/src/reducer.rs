//! Reducer actions and transition logic for the workspace runtime.
//!
//! Every transition is total: actions aimed at an instance that no longer exists degrade to
//! no-ops, because the only producer of instance ids is the UI and a stale id means the window
//! already disappeared.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::model::{
    AppId, AppState, GeometryPatch, InstanceId, SessionState, SettingsState, WorkspaceApp,
    WorkspaceState,
};
use crate::window_manager::{
    allocate_instance_id, bring_to_front, cascade_position, reusable_instance,
};

/// Window actions accepted by [`reduce_workspace`].
///
/// The serialized form is internally tagged (`{"type": "open", "appId": ...}`). Payloads with an
/// unrecognized `type` deserialize to [`WorkspaceAction::Unknown`], which leaves state unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case", rename_all_fields = "camelCase")]
pub enum WorkspaceAction {
    /// Open a feature window, or focus the existing non-minimized instance of the same feature.
    Open {
        app_id: AppId,
        title: String,
        #[serde(default)]
        props: Option<Value>,
    },
    /// Close a window. Closing twice is the same as closing once.
    Close { instance_id: InstanceId },
    /// Raise, restore, and activate a window.
    Focus { instance_id: InstanceId },
    /// Minimize a window; it stops being the active one.
    Minimize { instance_id: InstanceId },
    /// Merge a geometry (or title) change into a window without touching focus or stacking.
    UpdateGeometry {
        instance_id: InstanceId,
        #[serde(default)]
        patch: GeometryPatch,
    },
    #[serde(other)]
    Unknown,
}

impl WorkspaceAction {
    pub fn open(app_id: impl Into<AppId>, title: impl Into<String>) -> Self {
        Self::Open {
            app_id: app_id.into(),
            title: title.into(),
            props: None,
        }
    }
}

/// Preference actions accepted by [`reduce_settings`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SettingsAction {
    /// Hide a visible feature or show a hidden one.
    ToggleFeatureHidden { feature_id: String },
    /// Replace the hidden feature list (duplicates are dropped, first occurrence wins).
    SetHiddenFeatures { feature_ids: Vec<String> },
    /// Store or clear the generative-AI API key. Blank keys clear it.
    SetApiKey { api_key: Option<String> },
}

/// Actions dispatched through the workspace store.
#[derive(Debug, Clone, PartialEq)]
pub enum AppAction {
    Workspace(WorkspaceAction),
    Settings(SettingsAction),
    /// Replace session status/identity (delivered by the identity provider).
    SetSessionState(SessionState),
    /// Close every window. The stacking counter and id sequence keep counting up.
    ResetWorkspace,
}

impl From<WorkspaceAction> for AppAction {
    fn from(action: WorkspaceAction) -> Self {
        Self::Workspace(action)
    }
}

impl From<SettingsAction> for AppAction {
    fn from(action: SettingsAction) -> Self {
        Self::Settings(action)
    }
}

/// Applies a [`WorkspaceAction`] to the window state.
pub fn reduce_workspace(state: &mut WorkspaceState, action: WorkspaceAction) {
    match action {
        WorkspaceAction::Open {
            app_id,
            title,
            props,
        } => {
            if let Some(existing) = reusable_instance(state, &app_id) {
                bring_to_front(state, existing);
                return;
            }

            let instance_id = allocate_instance_id(state);
            let position = cascade_position(state.apps.len());
            state.apps.insert(
                instance_id,
                WorkspaceApp {
                    instance_id,
                    app_id,
                    title,
                    position,
                    size: Default::default(),
                    z_index: 0,
                    is_minimized: false,
                    props,
                },
            );
            bring_to_front(state, instance_id);
        }
        WorkspaceAction::Close { instance_id } => {
            if state.apps.remove(&instance_id).is_some()
                && state.active_app_instance_id == Some(instance_id)
            {
                state.active_app_instance_id = None;
            }
        }
        WorkspaceAction::Focus { instance_id } => {
            bring_to_front(state, instance_id);
        }
        WorkspaceAction::Minimize { instance_id } => {
            let Some(app) = state.apps.get_mut(&instance_id) else {
                return;
            };
            app.is_minimized = true;
            if state.active_app_instance_id == Some(instance_id) {
                state.active_app_instance_id = None;
            }
        }
        WorkspaceAction::UpdateGeometry { instance_id, patch } => {
            let Some(app) = state.apps.get_mut(&instance_id) else {
                return;
            };
            if let Some(position) = patch.position {
                app.position = position;
            }
            if let Some(size) = patch.size {
                app.size = size;
            }
            if let Some(title) = patch.title {
                app.title = title;
            }
        }
        WorkspaceAction::Unknown => {}
    }
}

/// Applies a [`SettingsAction`] to user preferences.
pub fn reduce_settings(settings: &mut SettingsState, action: SettingsAction) {
    match action {
        SettingsAction::ToggleFeatureHidden { feature_id } => {
            if let Some(index) = settings
                .hidden_features
                .iter()
                .position(|id| *id == feature_id)
            {
                settings.hidden_features.remove(index);
            } else {
                settings.hidden_features.push(feature_id);
            }
        }
        SettingsAction::SetHiddenFeatures { feature_ids } => {
            let mut hidden = Vec::with_capacity(feature_ids.len());
            for id in feature_ids {
                if !hidden.contains(&id) {
                    hidden.push(id);
                }
            }
            settings.hidden_features = hidden;
        }
        SettingsAction::SetApiKey { api_key } => {
            settings.gemini_api_key = api_key
                .map(|key| key.trim().to_string())
                .filter(|key| !key.is_empty());
        }
    }
}

/// Applies an [`AppAction`] to the full store state.
pub fn reduce_app(state: &mut AppState, action: AppAction) {
    match action {
        AppAction::Workspace(action) => reduce_workspace(&mut state.workspace, action),
        AppAction::Settings(action) => reduce_settings(&mut state.settings, action),
        AppAction::SetSessionState(session) => state.session = session,
        AppAction::ResetWorkspace => {
            state.workspace.apps.clear();
            state.workspace.active_app_instance_id = None;
        }
    }
}
