use std::time::Duration;

use platform_host::{HostServices, ManualTimerService, MemoryPrefsStore, PrefsStore};
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use workspace_runtime::{
    AppAction, GeometryPatch, InstanceId, SessionState, SessionStatus, SessionUser,
    SettingsAction, WorkspaceAction, WorkspaceConfig, WorkspaceStore,
};

const QUIET: Duration = Duration::from_millis(500);

fn open_store(prefs: &MemoryPrefsStore, timers: &ManualTimerService) -> WorkspaceStore {
    WorkspaceStore::new(
        &WorkspaceConfig::default(),
        HostServices::headless(prefs.clone(), timers.clone()),
    )
}

fn stored_snapshot(prefs: &MemoryPrefsStore) -> Value {
    let raw = prefs.raw("workspace-state").expect("snapshot stored");
    serde_json::from_str(&raw).expect("snapshot is json")
}

#[test]
fn reload_restores_geometry_stacking_and_minimized_flags() {
    let prefs = MemoryPrefsStore::default();
    let timers = ManualTimerService::default();

    let store = open_store(&prefs, &timers);
    store.set_persistence_consent(true).expect("grant consent");
    store.dispatch(WorkspaceAction::Open {
        app_id: "notes".into(),
        title: "Notes".to_string(),
        props: Some(json!({ "draft": "unsaved text" })),
    });
    store.dispatch(WorkspaceAction::open("regex-generator", "Regex Generator"));
    store.dispatch(WorkspaceAction::UpdateGeometry {
        instance_id: InstanceId(1),
        patch: GeometryPatch::size(640, 480),
    });
    store.dispatch(WorkspaceAction::Minimize {
        instance_id: InstanceId(2),
    });
    store.dispatch(SettingsAction::ToggleFeatureHidden {
        feature_id: "mail-summarizer".to_string(),
    });
    timers.advance(QUIET);
    let before = store.state();
    drop(store);

    let stored = stored_snapshot(&prefs);
    assert_eq!(stored["workspace"]["activeAppInstanceId"], Value::Null);
    assert_eq!(stored["workspace"]["apps"]["1"].get("props"), None);
    assert_eq!(stored.get("session"), None);

    let reloaded = open_store(&prefs, &timers);
    let after = reloaded.state();
    assert_eq!(after.workspace.active_app_instance_id, None);
    assert_eq!(after.workspace.z_counter, before.workspace.z_counter);
    assert_eq!(after.settings, before.settings);
    assert_eq!(after.workspace.apps.len(), 2);
    for (id, original) in &before.workspace.apps {
        let restored = after.workspace.app(*id).expect("window restored");
        assert_eq!(restored.app_id, original.app_id);
        assert_eq!(restored.title, original.title);
        assert_eq!(restored.position, original.position);
        assert_eq!(restored.size, original.size);
        assert_eq!(restored.z_index, original.z_index);
        assert_eq!(restored.is_minimized, original.is_minimized);
        assert_eq!(restored.props, None);
    }
}

#[test]
fn session_identity_is_never_written() {
    let prefs = MemoryPrefsStore::default();
    let timers = ManualTimerService::default();
    let store = open_store(&prefs, &timers);
    store.set_persistence_consent(true).expect("grant consent");

    store.dispatch(AppAction::SetSessionState(SessionState {
        status: SessionStatus::SignedIn,
        user: Some(SessionUser {
            id: "user-1".to_string(),
            email: "person@example.com".to_string(),
            display_name: "Person".to_string(),
            access_token: Some("secret-token".to_string()),
        }),
    }));
    store.dispatch(WorkspaceAction::open("notes", "Notes"));
    timers.advance(QUIET);

    let raw = prefs.raw("workspace-state").expect("snapshot stored");
    assert!(!raw.contains("secret-token"));
    assert!(!raw.contains("person@example.com"));

    let reloaded = open_store(&prefs, &timers);
    assert_eq!(reloaded.state().session, SessionState::default());
}

#[test]
fn without_consent_reload_starts_empty() {
    let prefs = MemoryPrefsStore::default();
    let timers = ManualTimerService::default();
    let store = open_store(&prefs, &timers);
    store.dispatch(WorkspaceAction::open("notes", "Notes"));
    timers.advance(QUIET * 2);
    drop(store);

    assert_eq!(prefs.raw("workspace-state"), None);
    let reloaded = open_store(&prefs, &timers);
    assert!(reloaded.state().workspace.apps.is_empty());
}

#[test]
fn corrupt_snapshot_falls_back_to_defaults() {
    let prefs = MemoryPrefsStore::default();
    let timers = ManualTimerService::default();
    let store = open_store(&prefs, &timers);
    store.set_persistence_consent(true).expect("grant consent");
    drop(store);

    prefs
        .save_pref("workspace-state", "{ not json")
        .expect("seed corrupt snapshot");

    let reloaded = open_store(&prefs, &timers);
    assert!(reloaded.state().workspace.apps.is_empty());
    reloaded.dispatch(WorkspaceAction::open("notes", "Notes"));
    assert_eq!(
        reloaded.state().workspace.active_app_instance_id,
        Some(InstanceId(1))
    );
}

#[test]
fn ids_closed_before_reload_are_not_reused() {
    let prefs = MemoryPrefsStore::default();
    let timers = ManualTimerService::default();
    let store = open_store(&prefs, &timers);
    store.set_persistence_consent(true).expect("grant consent");
    store.dispatch(WorkspaceAction::open("notes", "Notes"));
    store.dispatch(WorkspaceAction::open("regex-generator", "Regex Generator"));
    store.dispatch(WorkspaceAction::open("sql-generator", "SQL Generator"));
    store.dispatch(WorkspaceAction::Close {
        instance_id: InstanceId(3),
    });
    assert_eq!(store.flush(), Some(workspace_runtime::SaveOutcome::Written));
    drop(store);

    let reloaded = open_store(&prefs, &timers);
    reloaded.dispatch(WorkspaceAction::open("json-formatter", "JSON Formatter"));
    assert_eq!(
        reloaded.state().workspace.active_app_instance_id,
        Some(InstanceId(4))
    );
}
