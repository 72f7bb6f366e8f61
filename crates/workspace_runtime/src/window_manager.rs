//! Shared window-manager transition helpers used by the workspace reducer.

use std::collections::BTreeSet;

use thiserror::Error;

use crate::model::{AppId, InstanceId, Position, WorkspaceState};

/// Top-left corner of the first cascaded window.
pub const CASCADE_ORIGIN: i32 = 50;
/// Offset between successive cascaded windows on both axes.
pub const CASCADE_STEP: i32 = 30;
/// Number of cascade slots before placement wraps back to the origin.
pub const CASCADE_SLOTS: usize = 10;

/// Structural invariant broken by a [`WorkspaceState`].
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum InvariantViolation {
    #[error("window stored under {key} reports instance id {instance_id}")]
    KeyMismatch {
        key: InstanceId,
        instance_id: InstanceId,
    },
    #[error("stacking counter {z_counter} is below the highest z-index {max_z_index}")]
    ZCounterBehind { z_counter: u32, max_z_index: u32 },
    #[error("z-index {0} is shared by more than one window")]
    DuplicateZIndex(u32),
    #[error("active instance {0} does not exist")]
    DanglingActive(InstanceId),
    #[error("active instance {0} is minimized")]
    MinimizedActive(InstanceId),
    #[error("id sequence {next} would reuse existing instance id {existing}")]
    IdSequenceBehind { next: u64, existing: InstanceId },
}

/// Returns the initial position for a new window given how many windows are already open.
pub fn cascade_position(open_count: usize) -> Position {
    let slot = (open_count % CASCADE_SLOTS) as i32;
    Position {
        x: CASCADE_ORIGIN + slot * CASCADE_STEP,
        y: CASCADE_ORIGIN + slot * CASCADE_STEP,
    }
}

/// Hands out the next instance id, skipping any id still present in `state`.
pub fn allocate_instance_id(state: &mut WorkspaceState) -> InstanceId {
    loop {
        let candidate = InstanceId(state.next_instance_seq);
        state.next_instance_seq = state.next_instance_seq.saturating_add(1);
        if !state.apps.contains_key(&candidate) {
            return candidate;
        }
    }
}

/// Returns the open, non-minimized instance of `app_id` that an Open should reuse.
///
/// When several qualify the top-most one wins.
pub fn reusable_instance(state: &WorkspaceState, app_id: &AppId) -> Option<InstanceId> {
    state
        .instances_of(app_id)
        .filter(|app| !app.is_minimized)
        .max_by_key(|app| app.z_index)
        .map(|app| app.instance_id)
}

/// Raises `instance_id` above every other window, restores it, and makes it active.
///
/// Returns `false` when the instance does not exist.
pub fn bring_to_front(state: &mut WorkspaceState, instance_id: InstanceId) -> bool {
    let next_z = state.z_counter.saturating_add(1);
    let Some(app) = state.apps.get_mut(&instance_id) else {
        return false;
    };
    app.z_index = next_z;
    app.is_minimized = false;
    state.z_counter = next_z;
    state.active_app_instance_id = Some(instance_id);
    true
}

/// Checks the structural invariants every reachable [`WorkspaceState`] satisfies.
///
/// # Errors
///
/// Returns the first [`InvariantViolation`] found.
pub fn check_invariants(state: &WorkspaceState) -> Result<(), InvariantViolation> {
    let mut seen_z = BTreeSet::new();
    for (key, app) in &state.apps {
        if *key != app.instance_id {
            return Err(InvariantViolation::KeyMismatch {
                key: *key,
                instance_id: app.instance_id,
            });
        }
        if !seen_z.insert(app.z_index) {
            return Err(InvariantViolation::DuplicateZIndex(app.z_index));
        }
        if key.0 >= state.next_instance_seq {
            return Err(InvariantViolation::IdSequenceBehind {
                next: state.next_instance_seq,
                existing: *key,
            });
        }
    }

    if let Some(max_z_index) = state.max_z_index() {
        if state.z_counter < max_z_index {
            return Err(InvariantViolation::ZCounterBehind {
                z_counter: state.z_counter,
                max_z_index,
            });
        }
    }

    if let Some(active) = state.active_app_instance_id {
        match state.apps.get(&active) {
            None => return Err(InvariantViolation::DanglingActive(active)),
            Some(app) if app.is_minimized => {
                return Err(InvariantViolation::MinimizedActive(active))
            }
            Some(_) => {}
        }
    }

    Ok(())
}
