//! Reducer actions, side-effect intents, and transition logic for the instance table.

use desktop_app_contract::ApplicationId;
use serde_json::Value;
use thiserror::Error;

use crate::{
    instance_stack::{
        close_instance, focus_instance, invariant_violation, launch_instance, neighbour_instance,
    },
    model::{InstanceId, InstanceTable, LaunchOptions, WindowPosition, WindowSize},
};

#[derive(Debug, Clone, PartialEq)]
/// Actions accepted by [`reduce_instances`] to mutate an [`InstanceTable`].
pub enum InstanceAction {
    /// Launch a new foreground instance.
    Launch(LaunchOptions),
    /// Close one instance.
    Close {
        /// Instance to close.
        instance_id: InstanceId,
    },
    /// Close every instance of an app.
    CloseApp {
        /// App whose instances close.
        app_id: ApplicationId,
    },
    /// Focus and raise an instance.
    BringToForeground {
        /// Instance to focus.
        instance_id: InstanceId,
    },
    /// Focus the instance stacked above `instance_id`, wrapping to the bottom.
    NavigateNext {
        /// Reference instance.
        instance_id: InstanceId,
    },
    /// Focus the instance stacked below `instance_id`, wrapping to the top.
    NavigatePrevious {
        /// Reference instance.
        instance_id: InstanceId,
    },
    /// Store a new window position.
    Move {
        /// Instance being moved.
        instance_id: InstanceId,
        /// New top-left corner.
        position: WindowPosition,
    },
    /// Store a new window size.
    Resize {
        /// Instance being resized.
        instance_id: InstanceId,
        /// New size.
        size: WindowSize,
    },
    /// Replace the title override.
    SetTitle {
        /// Instance to retitle.
        instance_id: InstanceId,
        /// New title, or `None` for the registry display name.
        title: Option<String>,
    },
    /// Replace an instance's initial data.
    ReplaceInitialData {
        /// Instance to update.
        instance_id: InstanceId,
        /// New payload.
        data: Value,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Side-effect intents emitted by [`reduce_instances`] for the runtime to execute.
pub enum InstanceEffect {
    /// A new instance was created.
    Launched(InstanceId),
    /// An instance was removed.
    Closed {
        /// Removed instance.
        instance_id: InstanceId,
        /// App the removed instance belonged to.
        app_id: ApplicationId,
    },
    /// Foreground ownership moved.
    ForegroundChanged {
        /// Foreground instance before the action.
        previous: Option<InstanceId>,
        /// Foreground instance after the action.
        current: Option<InstanceId>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
/// Reducer errors for writes that target a missing instance.
pub enum ReducerError {
    /// The referenced instance is not in the table.
    #[error("instance {0} not found")]
    InstanceNotFound(InstanceId),
}

/// Applies `action` to `table` and returns the effects the runtime should execute.
///
/// Close, focus and navigation are no-ops for unknown ids. Geometry, title and data writes
/// report [`ReducerError::InstanceNotFound`] and leave the table untouched.
pub fn reduce_instances(
    table: &mut InstanceTable,
    action: InstanceAction,
) -> Result<Vec<InstanceEffect>, ReducerError> {
    let previous_foreground = table.foreground_id();
    let mut effects = Vec::new();

    match action {
        InstanceAction::Launch(options) => {
            let instance_id = launch_instance(table, options);
            effects.push(InstanceEffect::Launched(instance_id));
        }
        InstanceAction::Close { instance_id } => {
            if let Some(removed) = close_instance(table, instance_id) {
                effects.push(InstanceEffect::Closed {
                    instance_id,
                    app_id: removed.app_id,
                });
            }
        }
        InstanceAction::CloseApp { app_id } => {
            for instance_id in table.instances_of_app(&app_id) {
                if close_instance(table, instance_id).is_some() {
                    effects.push(InstanceEffect::Closed {
                        instance_id,
                        app_id: app_id.clone(),
                    });
                }
            }
        }
        InstanceAction::BringToForeground { instance_id } => {
            focus_instance(table, instance_id);
        }
        InstanceAction::NavigateNext { instance_id } => {
            if let Some(target) = neighbour_instance(table, instance_id, 1) {
                focus_instance(table, target);
            }
        }
        InstanceAction::NavigatePrevious { instance_id } => {
            if let Some(target) = neighbour_instance(table, instance_id, -1) {
                focus_instance(table, target);
            }
        }
        InstanceAction::Move {
            instance_id,
            position,
        } => {
            let instance = table
                .get_mut(instance_id)
                .ok_or(ReducerError::InstanceNotFound(instance_id))?;
            instance.position = Some(position);
        }
        InstanceAction::Resize { instance_id, size } => {
            let instance = table
                .get_mut(instance_id)
                .ok_or(ReducerError::InstanceNotFound(instance_id))?;
            instance.size = Some(size);
        }
        InstanceAction::SetTitle { instance_id, title } => {
            let instance = table
                .get_mut(instance_id)
                .ok_or(ReducerError::InstanceNotFound(instance_id))?;
            instance.title = title;
        }
        InstanceAction::ReplaceInitialData { instance_id, data } => {
            let instance = table
                .get_mut(instance_id)
                .ok_or(ReducerError::InstanceNotFound(instance_id))?;
            instance.initial_data = data;
        }
    }

    let current_foreground = table.foreground_id();
    if current_foreground != previous_foreground {
        effects.push(InstanceEffect::ForegroundChanged {
            previous: previous_foreground,
            current: current_foreground,
        });
    }

    debug_assert!(
        invariant_violation(table).is_none(),
        "instance table invariant broken: {:?}",
        invariant_violation(table)
    );

    Ok(effects)
}
