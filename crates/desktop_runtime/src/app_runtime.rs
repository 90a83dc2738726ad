//! Runtime app-session state owned by the desktop shell.
//!
//! Each open instance gets a lifecycle signal and a bounded inbox of update signals.

use std::collections::{BTreeSet, HashMap};

use desktop_app_contract::{AppLifecycleEvent, AppUpdate};
use leptos::*;

use crate::model::{AppInstance, InstanceId};

#[derive(Clone, Copy)]
/// Reactive per-instance app session signals.
pub struct InstanceSession {
    /// Latest lifecycle signal value for the instance.
    pub lifecycle: RwSignal<AppLifecycleEvent>,
    /// Update signals delivered to the instance, oldest first.
    pub updates: RwSignal<Vec<AppUpdate>>,
}

#[derive(Default)]
/// Runtime-owned per-instance session state.
pub struct AppRuntimeState {
    sessions: HashMap<InstanceId, InstanceSession>,
}

impl AppRuntimeState {
    fn ensure_session(&mut self, instance_id: InstanceId) -> InstanceSession {
        if let Some(session) = self.sessions.get(&instance_id).copied() {
            return session;
        }

        let session = InstanceSession {
            lifecycle: create_rw_signal(AppLifecycleEvent::Mounted),
            updates: create_rw_signal(Vec::new()),
        };
        self.sessions.insert(instance_id, session);
        session
    }

    fn remove_session(&mut self, instance_id: InstanceId) {
        self.sessions.remove(&instance_id);
    }

    // Lifecycle changes never create sessions; a blur can arrive for an instance already closed.
    fn set_lifecycle(&mut self, instance_id: InstanceId, event: AppLifecycleEvent) {
        if let Some(session) = self.sessions.get(&instance_id) {
            session.lifecycle.set(event);
        }
    }

    fn deliver_update(&mut self, instance_id: InstanceId, update: AppUpdate, limit: usize) {
        let session = self.ensure_session(instance_id);
        session.updates.update(|inbox| {
            inbox.push(update);
            if inbox.len() > limit {
                let overflow = inbox.len() - limit;
                inbox.drain(0..overflow);
            }
        });
    }

    fn sync_instances(&mut self, instances: &[AppInstance]) {
        let active: BTreeSet<InstanceId> = instances
            .iter()
            .map(|instance| instance.instance_id)
            .collect();

        for instance_id in &active {
            self.ensure_session(*instance_id);
        }

        let stale: Vec<InstanceId> = self
            .sessions
            .keys()
            .copied()
            .filter(|instance_id| !active.contains(instance_id))
            .collect();

        for instance_id in stale {
            self.remove_session(instance_id);
        }
    }

    /// Number of live sessions.
    pub fn session_count(&self) -> usize {
        self.sessions.len()
    }
}

/// Ensures and returns a per-instance runtime app session.
pub fn ensure_instance_session(
    runtime_state: RwSignal<AppRuntimeState>,
    instance_id: InstanceId,
) -> InstanceSession {
    if let Some(session) =
        runtime_state.with_untracked(|state| state.sessions.get(&instance_id).copied())
    {
        return session;
    }

    let mut session = None;
    runtime_state.update(|state| {
        session = Some(state.ensure_session(instance_id));
    });
    match session {
        Some(session) => session,
        // The update closure is skipped only for a disposed signal; hand back detached signals.
        None => InstanceSession {
            lifecycle: create_rw_signal(AppLifecycleEvent::Mounted),
            updates: create_rw_signal(Vec::new()),
        },
    }
}

/// Syncs app runtime session state with the currently open instances.
pub fn sync_runtime_sessions(runtime_state: RwSignal<AppRuntimeState>, instances: &[AppInstance]) {
    runtime_state.update(|state| state.sync_instances(instances));
}

/// Drops the session of a closed instance.
pub fn remove_instance_session(runtime_state: RwSignal<AppRuntimeState>, instance_id: InstanceId) {
    runtime_state.update(|state| state.remove_session(instance_id));
}

/// Applies an app lifecycle event to an existing instance session.
pub fn set_instance_lifecycle(
    runtime_state: RwSignal<AppRuntimeState>,
    instance_id: InstanceId,
    event: AppLifecycleEvent,
) {
    runtime_state.update(|state| state.set_lifecycle(instance_id, event));
}

/// Appends an update signal to an instance inbox, keeping at most `limit` entries.
pub fn deliver_instance_update(
    runtime_state: RwSignal<AppRuntimeState>,
    instance_id: InstanceId,
    update: AppUpdate,
    limit: usize,
) {
    runtime_state.update(|state| state.deliver_update(instance_id, update, limit));
}
