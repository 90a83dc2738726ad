//! Window manager: stacking, render planning, the launch protocol, and focus coupling.

use desktop_app_contract::{AppUpdate, LaunchRequest};
use leptos::*;
use platform_host::next_update_stamp_ms;

use crate::{
    app_runtime::deliver_instance_update,
    apps::{AppDescriptor, AppRegistry},
    model::{AppInstance, DesktopSkin, InstanceId, InstanceTable, WindowPosition, WindowSize},
    runtime_context::DesktopRuntimeContext,
};

const CASCADE_ORIGIN_PX: i32 = 48;
const CASCADE_STEP_PX: i32 = 28;
const CASCADE_SLOTS: usize = 8;

/// Z-index for an instance: one above `base` per position in the stack.
///
/// Ids missing from the stack get `base`.
pub fn window_z_index(table: &InstanceTable, instance_id: InstanceId, base: u32) -> u32 {
    table
        .instance_order()
        .iter()
        .position(|id| *id == instance_id)
        .map(|index| base + index as u32 + 1)
        .unwrap_or(base)
}

/// Cascaded top-left corner for the next window when a launch does not request one.
pub fn default_window_position(open_count: usize) -> WindowPosition {
    let step = (open_count % CASCADE_SLOTS) as i32 * CASCADE_STEP_PX;
    WindowPosition {
        x: CASCADE_ORIGIN_PX + step,
        y: CASCADE_ORIGIN_PX + step,
    }
}

#[derive(Debug, Clone)]
/// Everything needed to render one managed window.
pub struct WindowPlan {
    /// Instance record.
    pub instance: AppInstance,
    /// Registry entry of the instance's app.
    pub descriptor: AppDescriptor,
    /// Stacking order value.
    pub z_index: u32,
    /// Title shown in the window chrome.
    pub title: String,
}

impl PartialEq for WindowPlan {
    fn eq(&self, other: &Self) -> bool {
        self.instance == other.instance
            && self.descriptor.app_id == other.descriptor.app_id
            && self.z_index == other.z_index
            && self.title == other.title
    }
}

/// Title for an instance: its override, or the app display name.
pub fn instance_title(instance: &AppInstance, descriptor: &AppDescriptor) -> String {
    instance
        .title
        .clone()
        .unwrap_or_else(|| descriptor.metadata.display_name.clone())
}

/// Builds one plan per renderable instance, in launch order.
///
/// Instances of apps missing from the registry are skipped with a warning.
pub fn plan_windows(table: &InstanceTable, registry: &AppRegistry, base: u32) -> Vec<WindowPlan> {
    table
        .instances()
        .iter()
        .filter_map(|instance| {
            let Some(descriptor) = registry.get(&instance.app_id) else {
                logging::warn!(
                    "no registered app for {} ({}); window not rendered",
                    instance.app_id,
                    instance.instance_id
                );
                return None;
            };
            Some(WindowPlan {
                instance: instance.clone(),
                descriptor: descriptor.clone(),
                z_index: window_z_index(table, instance.instance_id, base),
                title: instance_title(instance, descriptor),
            })
        })
        .collect()
}

/// Whether the shared global menu bar is visible.
///
/// Taskbar-chrome skins always show it; other skins show it only while nothing is foreground.
pub fn should_show_global_menu(skin: DesktopSkin, has_foreground: bool) -> bool {
    skin.is_chrome_in_taskbar() || !has_foreground
}

/// Handles an external launch request: always opens a new instance, and notifies the app's
/// already-open instances when the request carries data.
pub fn handle_launch_request(runtime: DesktopRuntimeContext, request: &LaunchRequest) -> InstanceId {
    let existing = runtime
        .instances
        .with_untracked(|table| table.instances_of_app(&request.app_id));

    let instance_id = runtime.launch_app(request.app_id.clone(), request.launch_payload());

    if !existing.is_empty() && request.has_initial_data() {
        let mut update = AppUpdate::new(request.app_id.clone(), request.initial_data.clone());
        update.timestamp_unix_ms = Some(next_update_stamp_ms());

        let limit = runtime.config.with_value(|config| config.update_inbox_limit);
        for target in &existing {
            deliver_instance_update(runtime.app_runtime, *target, update.clone(), limit);
        }
        logging::log!(
            "update for {} delivered to {} open instance(s)",
            request.app_id,
            existing.len()
        );
        runtime.bus.get_value().publish_update(update);
    }

    instance_id
}

/// Brings an instance forward on pointer-down unless it already is foreground.
///
/// Returns `true` when focus moved.
pub fn focus_on_pointer_down(runtime: DesktopRuntimeContext, instance_id: InstanceId) -> bool {
    let is_foreground = runtime.instances.with_untracked(|table| {
        table
            .get(instance_id)
            .map(|instance| instance.is_foreground)
    });
    match is_foreground {
        Some(false) => runtime.bring_instance_to_foreground(instance_id),
        _ => false,
    }
}

#[derive(Clone, Copy)]
/// Per-instance chrome callbacks handed to a window.
pub struct WindowCallbacks {
    /// Closes the instance.
    pub on_close: Callback<()>,
    /// Brings the instance to the foreground.
    pub on_focus: Callback<()>,
    /// Focuses the next instance in the stack.
    pub on_navigate_next: Callback<()>,
    /// Focuses the previous instance in the stack.
    pub on_navigate_previous: Callback<()>,
    /// Stores a new window position.
    pub on_move: Callback<WindowPosition>,
    /// Stores a new window size.
    pub on_resize: Callback<WindowSize>,
}

impl WindowCallbacks {
    /// Binds every callback to `instance_id`.
    pub fn for_instance(runtime: DesktopRuntimeContext, instance_id: InstanceId) -> Self {
        Self {
            on_close: Callback::new(move |_| {
                runtime.close_app_instance(instance_id);
            }),
            on_focus: Callback::new(move |_| {
                runtime.bring_instance_to_foreground(instance_id);
            }),
            on_navigate_next: Callback::new(move |_| {
                runtime.navigate_to_next_instance(instance_id);
            }),
            on_navigate_previous: Callback::new(move |_| {
                runtime.navigate_to_previous_instance(instance_id);
            }),
            on_move: Callback::new(move |position| {
                runtime.set_instance_position(instance_id, position);
            }),
            on_resize: Callback::new(move |size| {
                runtime.set_instance_size(instance_id, size);
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::{cell::RefCell, rc::Rc};

    use desktop_app_contract::{AppModule, ApplicationId};
    use platform_host::HostServices;
    use pretty_assertions::assert_eq;
    use serde_json::{json, Value};

    use super::*;
    use crate::{
        app_runtime::ensure_instance_session,
        apps::app_registry,
        config::DesktopConfig,
        instance_stack::invariant_violation,
        model::LaunchOptions,
        reducer::{reduce_instances, InstanceAction},
    };

    fn app(raw: &str) -> ApplicationId {
        ApplicationId::trusted(raw)
    }

    fn with_runtime(test: impl FnOnce(DesktopRuntimeContext)) {
        let reactive = create_runtime();
        let runtime = DesktopRuntimeContext::new(
            HostServices::headless(),
            DesktopConfig::default(),
            app_registry(),
        );
        test(runtime);
        reactive.dispose();
    }

    fn launch(table: &mut InstanceTable, raw: &str) -> InstanceId {
        let id = table.peek_next_id();
        reduce_instances(table, InstanceAction::Launch(LaunchOptions::new(app(raw))))
            .expect("launch");
        id
    }

    #[test]
    fn z_index_follows_stack_position() {
        let mut table = InstanceTable::default();
        let a = launch(&mut table, "notes.notepad");
        let b = launch(&mut table, "media.memes");

        assert_eq!(window_z_index(&table, a, 100), 101);
        assert_eq!(window_z_index(&table, b, 100), 102);
        assert_eq!(window_z_index(&table, InstanceId(99), 100), 100);

        reduce_instances(&mut table, InstanceAction::BringToForeground { instance_id: a })
            .expect("focus");
        assert_eq!(window_z_index(&table, a, 100), 102);
        assert_eq!(window_z_index(&table, b, 100), 101);
    }

    #[test]
    fn render_plan_skips_unregistered_apps() {
        let mut table = InstanceTable::default();
        launch(&mut table, "notes.notepad");
        launch(&mut table, "vendor.ghost");
        let memes = launch(&mut table, "media.memes");

        let plans = plan_windows(&table, app_registry(), 100);
        let planned: Vec<&str> = plans
            .iter()
            .map(|plan| plan.instance.app_id.as_str())
            .collect();
        assert_eq!(planned, vec!["notes.notepad", "media.memes"]);
        let memes_plan = plans
            .iter()
            .find(|plan| plan.instance.instance_id == memes)
            .expect("memes plan");
        assert_eq!(memes_plan.z_index, 103);
        assert_eq!(memes_plan.title, "Memes");
    }

    #[test]
    fn render_plan_prefers_title_override() {
        let descriptor = app_registry()
            .get(&app("media.memes"))
            .cloned()
            .expect("memes");
        let registry = AppRegistry::from_descriptors(vec![crate::apps::AppDescriptor {
            module: AppModule::new(|_| ().into_view()),
            ..descriptor
        }]);
        let mut table = InstanceTable::default();
        reduce_instances(
            &mut table,
            InstanceAction::Launch(LaunchOptions::new(app("media.memes")).with_title("Cats")),
        )
        .expect("launch");

        let plans = plan_windows(&table, &registry, 0);
        assert_eq!(plans[0].title, "Cats");
    }

    #[test]
    fn global_menu_visibility_by_skin() {
        assert!(should_show_global_menu(DesktopSkin::Windows98, true));
        assert!(should_show_global_menu(DesktopSkin::WindowsXp, false));
        assert!(!should_show_global_menu(DesktopSkin::ClassicMac, true));
        assert!(should_show_global_menu(DesktopSkin::ClassicMac, false));
        assert!(!should_show_global_menu(DesktopSkin::MacOsX, true));
    }

    #[test]
    fn cascade_positions_wrap() {
        assert_eq!(default_window_position(0), WindowPosition { x: 48, y: 48 });
        assert_eq!(default_window_position(1), WindowPosition { x: 76, y: 76 });
        assert_eq!(default_window_position(8), default_window_position(0));
    }

    #[test]
    fn relaunch_with_data_opens_new_instance_and_notifies_existing() {
        with_runtime(|runtime| {
            let bus = runtime.bus.get_value();
            let published = Rc::new(RefCell::new(Vec::new()));
            let sink = Rc::clone(&published);
            let _updates = bus.subscribe_updates(move |update| {
                sink.borrow_mut().push(update.initial_data.clone());
            });

            let first = handle_launch_request(runtime, &LaunchRequest::new(app("media.memes")));
            let second = handle_launch_request(
                runtime,
                &LaunchRequest::new(app("media.memes")).with_initial_data(json!({ "memeId": "m42" })),
            );

            assert_ne!(first, second);
            assert_eq!(runtime.instances_of_app(&app("media.memes")), vec![first, second]);
            assert_eq!(
                runtime.foreground_instance().map(|instance| instance.instance_id),
                Some(second)
            );
            let launched = runtime
                .instances
                .with_untracked(|table| table.get(second).cloned())
                .expect("second");
            assert_eq!(launched.initial_data, json!({ "memeId": "m42" }));

            assert_eq!(*published.borrow(), vec![json!({ "memeId": "m42" })]);
            let first_inbox = ensure_instance_session(runtime.app_runtime, first)
                .updates
                .get_untracked();
            assert_eq!(first_inbox.len(), 1);
            assert!(first_inbox[0].timestamp_unix_ms.is_some());
            let second_inbox = ensure_instance_session(runtime.app_runtime, second)
                .updates
                .get_untracked();
            assert!(second_inbox.is_empty());
        });
    }

    #[test]
    fn first_launch_or_empty_payload_sends_no_update() {
        with_runtime(|runtime| {
            let bus = runtime.bus.get_value();
            let count = Rc::new(RefCell::new(0));
            let counter = Rc::clone(&count);
            let _updates = bus.subscribe_updates(move |_| *counter.borrow_mut() += 1);

            handle_launch_request(
                runtime,
                &LaunchRequest::new(app("notes.notepad")).with_initial_data(json!({ "noteId": "a" })),
            );
            handle_launch_request(runtime, &LaunchRequest::new(app("notes.notepad")));

            assert_eq!(*count.borrow(), 0);
            assert_eq!(runtime.instances_of_app(&app("notes.notepad")).len(), 2);
        });
    }

    #[test]
    fn launch_payload_carries_initial_path() {
        with_runtime(|runtime| {
            let id = handle_launch_request(
                runtime,
                &LaunchRequest::new(app("notes.notepad"))
                    .with_initial_data(json!({ "noteId": "abc" }))
                    .with_initial_path("/notes/abc"),
            );
            let data = runtime
                .instances
                .with_untracked(|table| table.get(id).map(|instance| instance.initial_data.clone()))
                .unwrap_or(Value::Null);
            assert_eq!(data, json!({ "noteId": "abc", "initialPath": "/notes/abc" }));
        });
    }

    #[test]
    fn pointer_down_focuses_only_background_windows() {
        with_runtime(|runtime| {
            let a = runtime.launch_app(app("notes.notepad"), Value::Null);
            let b = runtime.launch_app(app("media.memes"), Value::Null);

            assert!(!focus_on_pointer_down(runtime, b));
            assert!(focus_on_pointer_down(runtime, a));
            assert_eq!(
                runtime.instances.with_untracked(|table| table.instance_order().to_vec()),
                vec![b, a]
            );
            assert!(!focus_on_pointer_down(runtime, InstanceId(77)));
            assert_eq!(runtime.instances.with_untracked(invariant_violation), None);
        });
    }

    #[test]
    fn window_callbacks_drive_store_operations() {
        with_runtime(|runtime| {
            let a = runtime.launch_app(app("notes.notepad"), Value::Null);
            let b = runtime.launch_app(app("notes.notepad"), Value::Null);
            let callbacks = WindowCallbacks::for_instance(runtime, b);

            callbacks.on_move.call(WindowPosition { x: 5, y: 6 });
            callbacks.on_navigate_next.call(());
            assert_eq!(runtime.foreground_instance().map(|i| i.instance_id), Some(a));

            callbacks.on_focus.call(());
            assert_eq!(runtime.foreground_instance().map(|i| i.instance_id), Some(b));

            callbacks.on_close.call(());
            assert_eq!(runtime.foreground_instance().map(|i| i.instance_id), Some(a));
            assert_eq!(runtime.instances_of_app(&app("notes.notepad")), vec![a]);
        });
    }
}
