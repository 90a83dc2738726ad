//! Per-app aggregate view over the instance table for single-instance consumers.
//!
//! The aggregate is always recomputed from the table and never stored on its own. When an
//! app has several instances, geometry and data come from its foreground instance, or else
//! from its most recently launched one.

use std::collections::BTreeMap;

use desktop_app_contract::ApplicationId;
use serde::Serialize;
use serde_json::Value;

use crate::model::{AppInstance, InstanceId, InstanceTable, WindowPosition, WindowSize};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
/// Single-instance shaped state for one app.
pub struct LegacyAppState {
    /// Whether any instance of the app is open.
    pub is_open: bool,
    /// Whether the foreground instance belongs to the app.
    pub is_foreground: bool,
    /// Number of open instances of the app.
    pub instance_count: usize,
    /// Position of the representative instance.
    pub position: Option<WindowPosition>,
    /// Size of the representative instance.
    pub size: Option<WindowSize>,
    /// Initial data of the representative instance.
    pub initial_data: Value,
    /// Instance the geometry and data were taken from.
    pub source_instance: InstanceId,
    #[serde(skip)]
    source_launched_at: u64,
}

impl LegacyAppState {
    fn from_instance(instance: &AppInstance) -> Self {
        Self {
            is_open: instance.is_open,
            is_foreground: instance.is_foreground,
            instance_count: 1,
            position: instance.position,
            size: instance.size,
            initial_data: instance.initial_data.clone(),
            source_instance: instance.instance_id,
            source_launched_at: instance.launched_at,
        }
    }

    fn absorb(&mut self, instance: &AppInstance) {
        self.instance_count += 1;
        self.is_open |= instance.is_open;

        let replaces_source = !self.is_foreground
            && (instance.is_foreground || instance.launched_at > self.source_launched_at);
        if replaces_source {
            self.position = instance.position;
            self.size = instance.size;
            self.initial_data = instance.initial_data.clone();
            self.source_instance = instance.instance_id;
            self.source_launched_at = instance.launched_at;
        }
        self.is_foreground |= instance.is_foreground;
    }
}

/// Folds the instance table into one [`LegacyAppState`] per app with at least one instance.
pub fn legacy_app_states(table: &InstanceTable) -> BTreeMap<ApplicationId, LegacyAppState> {
    let mut states: BTreeMap<ApplicationId, LegacyAppState> = BTreeMap::new();
    for instance in table.instances() {
        match states.get_mut(&instance.app_id) {
            Some(state) => state.absorb(instance),
            None => {
                states.insert(
                    instance.app_id.clone(),
                    LegacyAppState::from_instance(instance),
                );
            }
        }
    }
    states
}

/// Returns the aggregate for one app, or `None` when it has no instances.
pub fn legacy_app_state(table: &InstanceTable, app_id: &ApplicationId) -> Option<LegacyAppState> {
    let mut state: Option<LegacyAppState> = None;
    for instance in table
        .instances()
        .iter()
        .filter(|instance| instance.app_id == *app_id)
    {
        match state.as_mut() {
            Some(state) => state.absorb(instance),
            None => state = Some(LegacyAppState::from_instance(instance)),
        }
    }
    state
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;
    use crate::{
        model::LaunchOptions,
        reducer::{reduce_instances, InstanceAction},
    };

    fn app(raw: &str) -> ApplicationId {
        ApplicationId::trusted(raw)
    }

    fn launch(table: &mut InstanceTable, app_id: &str, data: Value) -> InstanceId {
        let id = table.peek_next_id();
        reduce_instances(
            table,
            InstanceAction::Launch(LaunchOptions::new(app(app_id)).with_initial_data(data)),
        )
        .expect("launch");
        id
    }

    #[test]
    fn apps_without_instances_have_no_entry() {
        let mut table = InstanceTable::default();
        launch(&mut table, "notes.notepad", Value::Null);

        let states = legacy_app_states(&table);
        assert_eq!(states.len(), 1);
        assert!(!states.contains_key(&app("media.memes")));
        assert_eq!(legacy_app_state(&table, &app("media.memes")), None);
    }

    #[test]
    fn foreground_instance_supplies_geometry_and_data() {
        let mut table = InstanceTable::default();
        let first = launch(&mut table, "notes.notepad", json!({ "noteId": "a" }));
        launch(&mut table, "notes.notepad", json!({ "noteId": "b" }));
        launch(&mut table, "media.memes", Value::Null);
        reduce_instances(
            &mut table,
            InstanceAction::BringToForeground { instance_id: first },
        )
        .expect("focus");

        let notes = legacy_app_state(&table, &app("notes.notepad")).expect("notes state");
        assert!(notes.is_open);
        assert!(notes.is_foreground);
        assert_eq!(notes.instance_count, 2);
        assert_eq!(notes.initial_data, json!({ "noteId": "a" }));
        assert_eq!(notes.source_instance, first);

        let memes = legacy_app_state(&table, &app("media.memes")).expect("memes state");
        assert!(memes.is_open);
        assert!(!memes.is_foreground);
    }

    #[test]
    fn background_app_uses_most_recently_launched_instance() {
        let mut table = InstanceTable::default();
        let first = launch(&mut table, "notes.notepad", json!({ "noteId": "a" }));
        let second = launch(&mut table, "notes.notepad", json!({ "noteId": "b" }));
        launch(&mut table, "media.memes", Value::Null);
        reduce_instances(
            &mut table,
            InstanceAction::BringToForeground { instance_id: first },
        )
        .expect("focus first");
        reduce_instances(
            &mut table,
            InstanceAction::BringToForeground {
                instance_id: InstanceId(3),
            },
        )
        .expect("focus memes");

        let notes = legacy_app_state(&table, &app("notes.notepad")).expect("notes state");
        assert!(!notes.is_foreground);
        assert_eq!(notes.source_instance, second);
        assert_eq!(notes.initial_data, json!({ "noteId": "b" }));
    }

    #[test]
    fn map_and_single_lookup_agree() {
        let mut table = InstanceTable::default();
        launch(&mut table, "notes.notepad", Value::Null);
        launch(&mut table, "media.memes", json!({ "memeId": "m" }));
        launch(&mut table, "notes.notepad", Value::Null);

        for (app_id, state) in legacy_app_states(&table) {
            assert_eq!(legacy_app_state(&table, &app_id), Some(state));
        }
    }
}
