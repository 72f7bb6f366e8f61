use proptest::prelude::*;
use workspace_runtime::{
    check_invariants, reduce_workspace, AppId, GeometryPatch, InstanceId, WorkspaceAction,
    WorkspaceState,
};

const APP_IDS: [&str; 4] = ["notes", "regex-generator", "sql-generator", "json-formatter"];

fn action_strategy() -> impl Strategy<Value = WorkspaceAction> {
    let id = (1u64..10).prop_map(InstanceId);
    prop_oneof![
        3 => (0..APP_IDS.len()).prop_map(|index| WorkspaceAction::open(APP_IDS[index], APP_IDS[index])),
        1 => id.clone().prop_map(|instance_id| WorkspaceAction::Close { instance_id }),
        2 => id.clone().prop_map(|instance_id| WorkspaceAction::Focus { instance_id }),
        2 => id.clone().prop_map(|instance_id| WorkspaceAction::Minimize { instance_id }),
        1 => (id, -50..2000i32, -50..2000i32).prop_map(|(instance_id, x, y)| {
            WorkspaceAction::UpdateGeometry {
                instance_id,
                patch: GeometryPatch::position(x, y),
            }
        }),
        1 => Just(WorkspaceAction::Unknown),
    ]
}

fn assert_top_and_active(state: &WorkspaceState, instance_id: InstanceId) {
    let app = state.app(instance_id).expect("target exists");
    assert_eq!(state.active_app_instance_id, Some(instance_id));
    assert!(!app.is_minimized);
    assert_eq!(app.z_index, state.z_counter);
    assert!(state
        .apps
        .values()
        .all(|other| other.instance_id == instance_id || other.z_index < app.z_index));
}

proptest! {
    #[test]
    fn prop_every_reachable_state_keeps_invariants(
        actions in proptest::collection::vec(action_strategy(), 0..60)
    ) {
        let mut state = WorkspaceState::default();
        for action in actions {
            let before = state.clone();
            reduce_workspace(&mut state, action.clone());

            prop_assert!(check_invariants(&state).is_ok(), "{:?}", check_invariants(&state));
            prop_assert!(state.z_counter >= before.z_counter);
            prop_assert!(state.next_instance_seq >= before.next_instance_seq);

            match action {
                WorkspaceAction::Open { app_id, .. } => {
                    let active = state.active_app_instance_id.expect("open activates");
                    prop_assert_eq!(&state.app(active).expect("active").app_id, &app_id);
                    assert_top_and_active(&state, active);
                    let reused = before
                        .instances_of(&app_id)
                        .any(|app| !app.is_minimized);
                    let expected = before.apps.len() + usize::from(!reused);
                    prop_assert_eq!(state.apps.len(), expected);
                }
                WorkspaceAction::Focus { instance_id } if before.apps.contains_key(&instance_id) => {
                    assert_top_and_active(&state, instance_id);
                }
                WorkspaceAction::Close { instance_id } => {
                    prop_assert!(state.app(instance_id).is_none());
                    let mut again = state.clone();
                    reduce_workspace(&mut again, WorkspaceAction::Close { instance_id });
                    prop_assert_eq!(&again, &state);
                }
                WorkspaceAction::Minimize { instance_id } => {
                    prop_assert_ne!(state.active_app_instance_id, Some(instance_id));
                }
                WorkspaceAction::UpdateGeometry { .. } | WorkspaceAction::Unknown => {
                    prop_assert_eq!(state.active_app_instance_id, before.active_app_instance_id);
                    prop_assert_eq!(state.z_counter, before.z_counter);
                }
                WorkspaceAction::Focus { .. } => {
                    prop_assert_eq!(&state, &before);
                }
            }
        }
    }

    #[test]
    fn prop_open_reuses_visible_instance(
        app_index in 0..APP_IDS.len(),
        repeats in 1..8usize
    ) {
        let app_id = AppId::from(APP_IDS[app_index]);
        let mut state = WorkspaceState::default();
        for _ in 0..repeats {
            reduce_workspace(&mut state, WorkspaceAction::open(app_id.clone(), "Feature"));
        }
        prop_assert_eq!(state.apps.len(), 1);
        prop_assert_eq!(state.z_counter, 10 + repeats as u32);
    }
}

#[test]
fn minimized_instance_is_not_reused_by_open() {
    let mut state = WorkspaceState::default();
    reduce_workspace(&mut state, WorkspaceAction::open("notes", "Notes"));
    reduce_workspace(
        &mut state,
        WorkspaceAction::Minimize {
            instance_id: InstanceId(1),
        },
    );
    reduce_workspace(&mut state, WorkspaceAction::open("notes", "Notes"));

    assert_eq!(state.apps.len(), 2);
    assert_eq!(state.active_app_instance_id, Some(InstanceId(2)));
    assert!(check_invariants(&state).is_ok());
}
