use std::{collections::BTreeMap, fmt};

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Stacking counter value before any window has been opened.
pub const BASE_Z_INDEX: u32 = 10;
pub const DEFAULT_WINDOW_WIDTH: i32 = 800;
pub const DEFAULT_WINDOW_HEIGHT: i32 = 600;

/// Identifier of one open window instance. Never reused within a process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InstanceId(pub u64);

impl fmt::Display for InstanceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifier of a feature (what a window renders).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AppId(String);

impl AppId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for AppId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for AppId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl fmt::Display for AppId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Size {
    pub width: i32,
    pub height: i32,
}

impl Default for Size {
    fn default() -> Self {
        Self {
            width: DEFAULT_WINDOW_WIDTH,
            height: DEFAULT_WINDOW_HEIGHT,
        }
    }
}

/// One open instance of a feature window.
#[derive(Debug, Clone, PartialEq)]
pub struct WorkspaceApp {
    pub instance_id: InstanceId,
    pub app_id: AppId,
    pub title: String,
    pub position: Position,
    pub size: Size,
    pub z_index: u32,
    pub is_minimized: bool,
    /// Instance-scoped launch payload. Never persisted.
    pub props: Option<Value>,
}

/// Open windows, their stacking order, and the focused instance.
#[derive(Debug, Clone, PartialEq)]
pub struct WorkspaceState {
    pub apps: BTreeMap<InstanceId, WorkspaceApp>,
    pub active_app_instance_id: Option<InstanceId>,
    pub z_counter: u32,
    /// Next value handed out as an [`InstanceId`].
    pub next_instance_seq: u64,
}

impl Default for WorkspaceState {
    fn default() -> Self {
        Self {
            apps: BTreeMap::new(),
            active_app_instance_id: None,
            z_counter: BASE_Z_INDEX,
            next_instance_seq: 1,
        }
    }
}

impl WorkspaceState {
    pub fn app(&self, instance_id: InstanceId) -> Option<&WorkspaceApp> {
        self.apps.get(&instance_id)
    }

    pub fn active_app(&self) -> Option<&WorkspaceApp> {
        self.active_app_instance_id
            .and_then(|instance_id| self.apps.get(&instance_id))
    }

    /// Returns windows bottom-most first.
    pub fn ordered_apps(&self) -> Vec<&WorkspaceApp> {
        let mut apps = self.apps.values().collect::<Vec<_>>();
        apps.sort_by_key(|app| (app.z_index, app.instance_id));
        apps
    }

    pub fn top_most(&self) -> Option<&WorkspaceApp> {
        self.apps
            .values()
            .max_by_key(|app| (app.z_index, app.instance_id))
    }

    pub fn instances_of<'a>(&'a self, app_id: &'a AppId) -> impl Iterator<Item = &'a WorkspaceApp> {
        self.apps.values().filter(move |app| &app.app_id == app_id)
    }

    pub fn max_z_index(&self) -> Option<u32> {
        self.apps.values().map(|app| app.z_index).max()
    }
}

/// User preferences. Persisted in full.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SettingsState {
    pub hidden_features: Vec<String>,
    #[serde(default)]
    pub gemini_api_key: Option<String>,
}

impl SettingsState {
    pub fn is_feature_hidden(&self, feature_id: &str) -> bool {
        self.hidden_features.iter().any(|id| id == feature_id)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionStatus {
    #[default]
    SignedOut,
    Loading,
    SignedIn,
}

/// Signed-in identity supplied by the identity provider.
#[derive(Clone, PartialEq, Eq)]
pub struct SessionUser {
    pub id: String,
    pub email: String,
    pub display_name: String,
    pub access_token: Option<String>,
}

impl fmt::Debug for SessionUser {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionUser")
            .field("id", &self.id)
            .field("email", &self.email)
            .field("display_name", &self.display_name)
            .field(
                "access_token",
                &self.access_token.as_ref().map(|_| "<redacted>"),
            )
            .finish()
    }
}

/// Authentication status and identity.
///
/// Deliberately not `Serialize`: session data can carry short-lived credentials and must never
/// reach durable storage.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SessionState {
    pub status: SessionStatus,
    pub user: Option<SessionUser>,
}

/// Complete state owned by the workspace store.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct AppState {
    pub workspace: WorkspaceState,
    pub settings: SettingsState,
    pub session: SessionState,
}

impl AppState {
    /// Builds the persisted subset of this state.
    ///
    /// `props` are stripped from every window, the active instance is reset, and the session is
    /// left out entirely.
    pub fn snapshot(&self) -> PersistedSnapshot {
        PersistedSnapshot {
            workspace: WorkspaceSnapshot {
                apps: self
                    .workspace
                    .apps
                    .iter()
                    .map(|(instance_id, app)| (*instance_id, PersistedApp::from(app)))
                    .collect(),
                active_app_instance_id: None,
                z_counter: self.workspace.z_counter,
                next_instance_seq: self.workspace.next_instance_seq,
            },
            settings: self.settings.clone(),
        }
    }

    /// Merges a persisted snapshot into `defaults`.
    ///
    /// Workspace and settings come from the snapshot; the session always comes from `defaults`.
    /// No window is active after hydration. The stacking counter is raised to cover every
    /// restored window and the id sequence resumes at the persisted sequence, or above the
    /// highest restored id if that is larger.
    ///
    /// Entries stay under their persisted keys, so a key that disagrees with the entry's
    /// `instanceId` survives into the state and is caught by
    /// [`check_invariants`](crate::window_manager::check_invariants).
    pub fn from_snapshot(defaults: AppState, snapshot: PersistedSnapshot) -> Self {
        let apps = snapshot
            .workspace
            .apps
            .into_iter()
            .map(|(key, app)| (key, WorkspaceApp::from(app)))
            .collect::<BTreeMap<_, _>>();
        let max_z_index = apps.values().map(|app| app.z_index).max().unwrap_or(0);
        let next_instance_seq = apps
            .keys()
            .map(|instance_id| instance_id.0)
            .max()
            .unwrap_or(0)
            .saturating_add(1)
            .max(snapshot.workspace.next_instance_seq)
            .max(defaults.workspace.next_instance_seq);

        Self {
            workspace: WorkspaceState {
                apps,
                active_app_instance_id: None,
                z_counter: snapshot.workspace.z_counter.max(max_z_index),
                next_instance_seq,
            },
            settings: snapshot.settings,
            session: defaults.session,
        }
    }
}

/// Persisted form of a [`WorkspaceApp`] (no `props`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersistedApp {
    pub instance_id: InstanceId,
    pub app_id: AppId,
    pub title: String,
    pub position: Position,
    pub size: Size,
    pub z_index: u32,
    pub is_minimized: bool,
}

impl From<&WorkspaceApp> for PersistedApp {
    fn from(app: &WorkspaceApp) -> Self {
        Self {
            instance_id: app.instance_id,
            app_id: app.app_id.clone(),
            title: app.title.clone(),
            position: app.position,
            size: app.size,
            z_index: app.z_index,
            is_minimized: app.is_minimized,
        }
    }
}

impl From<PersistedApp> for WorkspaceApp {
    fn from(app: PersistedApp) -> Self {
        Self {
            instance_id: app.instance_id,
            app_id: app.app_id,
            title: app.title,
            position: app.position,
            size: app.size,
            z_index: app.z_index,
            is_minimized: app.is_minimized,
            props: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkspaceSnapshot {
    pub apps: BTreeMap<InstanceId, PersistedApp>,
    /// Always written as `null`; ignored on load.
    #[serde(default)]
    pub active_app_instance_id: Option<InstanceId>,
    pub z_counter: u32,
    /// Next instance id to hand out, so ids closed before a reload are not reused.
    #[serde(default)]
    pub next_instance_seq: u64,
}

/// Value stored under the snapshot key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersistedSnapshot {
    pub workspace: WorkspaceSnapshot,
    pub settings: SettingsState,
}

/// Partial window update; absent fields are left untouched.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GeometryPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position: Option<Position>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<Size>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

impl GeometryPatch {
    pub fn position(x: i32, y: i32) -> Self {
        Self {
            position: Some(Position { x, y }),
            ..Self::default()
        }
    }

    pub fn size(width: i32, height: i32) -> Self {
        Self {
            size: Some(Size { width, height }),
            ..Self::default()
        }
    }
}
