//! Runtime provider and context wiring for the desktop shell.
//!
//! This module owns the reactive instance table, the pointer interaction state, app sessions,
//! the event bus, and the store operations every other layer goes through. UI composition stays
//! in [`crate::components`].

use std::collections::BTreeMap;

use desktop_app_contract::{AppCommand, AppLifecycleEvent, ApplicationId};
use leptos::*;
use platform_host::HostServices;
use serde_json::Value;

use crate::{
    app_bus::DesktopEventBus,
    app_runtime::{
        ensure_instance_session, remove_instance_session, set_instance_lifecycle,
        sync_runtime_sessions, AppRuntimeState,
    },
    apps::{app_registry, AppRegistry},
    config::DesktopConfig,
    deep_link::run_startup_deep_link,
    instance_stack::{DEFAULT_WINDOW_HEIGHT, DEFAULT_WINDOW_WIDTH},
    legacy::{legacy_app_states, LegacyAppState},
    model::{
        AppInstance, InstanceId, InstanceTable, InteractionState, LaunchOptions, WindowPosition,
        WindowSize,
    },
    reducer::{reduce_instances, InstanceAction, InstanceEffect},
    window_manager::{default_window_position, handle_launch_request},
};

#[derive(Clone, Copy)]
/// Leptos context for reading the instance table and running store operations.
pub struct DesktopRuntimeContext {
    /// Host service bundle for navigation and deferred work.
    pub host: StoredValue<HostServices>,
    /// Desktop configuration, fixed for the page lifetime.
    pub config: StoredValue<DesktopConfig>,
    /// Frozen application registry.
    pub registry: &'static AppRegistry,
    /// Authoritative instance table.
    pub instances: RwSignal<InstanceTable>,
    /// Pointer drag/resize interaction state.
    pub interaction: RwSignal<InteractionState>,
    /// Per-app aggregate derived from the instance table.
    pub legacy_states: Memo<BTreeMap<ApplicationId, LegacyAppState>>,
    /// Per-instance lifecycle and update inbox signals.
    pub app_runtime: RwSignal<AppRuntimeState>,
    /// Launch and update channels.
    pub bus: StoredValue<DesktopEventBus>,
    /// Set once the startup deep link has been handled.
    pub deep_link_consumed: StoredValue<bool>,
    /// Reducer dispatch callback.
    pub dispatch: Callback<InstanceAction>,
}

fn run_instance_effects(app_runtime: RwSignal<AppRuntimeState>, effects: &[InstanceEffect]) {
    for effect in effects {
        match effect {
            InstanceEffect::Launched(instance_id) => {
                logging::log!("instance {instance_id} launched");
                ensure_instance_session(app_runtime, *instance_id);
            }
            InstanceEffect::Closed { instance_id, app_id } => {
                logging::log!("instance {instance_id} of {app_id} closed");
                remove_instance_session(app_runtime, *instance_id);
            }
            InstanceEffect::ForegroundChanged { previous, current } => {
                if let Some(previous) = previous {
                    set_instance_lifecycle(
                        app_runtime,
                        *previous,
                        AppLifecycleEvent::Blurred,
                    );
                }
                if let Some(current) = current {
                    set_instance_lifecycle(
                        app_runtime,
                        *current,
                        AppLifecycleEvent::Focused,
                    );
                }
            }
        }
    }
}

fn apply_instance_action(
    instances: RwSignal<InstanceTable>,
    app_runtime: RwSignal<AppRuntimeState>,
    action: InstanceAction,
) -> Vec<InstanceEffect> {
    let mut table = instances.get_untracked();
    let previous = table.clone();

    match reduce_instances(&mut table, action) {
        Ok(effects) => {
            if table != previous {
                instances.set(table);
            }
            run_instance_effects(app_runtime, &effects);
            effects
        }
        Err(err) => {
            logging::warn!("instance reducer error: {err}");
            Vec::new()
        }
    }
}

impl DesktopRuntimeContext {
    /// Creates the runtime signals under the current reactive owner.
    pub fn new(
        host_services: HostServices,
        config: DesktopConfig,
        registry: &'static AppRegistry,
    ) -> Self {
        let instances = create_rw_signal(InstanceTable::default());
        let app_runtime = create_rw_signal(AppRuntimeState::default());
        let legacy_states = create_memo(move |_| instances.with(legacy_app_states));
        let dispatch = Callback::new(move |action: InstanceAction| {
            apply_instance_action(instances, app_runtime, action);
        });

        Self {
            host: store_value(host_services),
            config: store_value(config),
            registry,
            instances,
            interaction: create_rw_signal(InteractionState::default()),
            legacy_states,
            app_runtime,
            bus: store_value(DesktopEventBus::new()),
            deep_link_consumed: store_value(false),
            dispatch,
        }
    }

    /// Dispatches a reducer action through the runtime context callback.
    pub fn dispatch_action(&self, action: InstanceAction) {
        self.dispatch.call(action);
    }

    /// Applies an action and returns the effects it produced.
    pub fn apply(&self, action: InstanceAction) -> Vec<InstanceEffect> {
        apply_instance_action(self.instances, self.app_runtime, action)
    }

    /// Launches a new foreground instance of `app_id` and returns its id.
    pub fn launch_app(&self, app_id: ApplicationId, initial_data: Value) -> InstanceId {
        self.launch_with(LaunchOptions::new(app_id).with_initial_data(initial_data))
    }

    /// Launches with explicit options; missing geometry is filled from the registry.
    pub fn launch_with(&self, mut options: LaunchOptions) -> InstanceId {
        if options.size.is_none() {
            let size = self
                .registry
                .get(&options.app_id)
                .map(|descriptor| WindowSize {
                    width: descriptor.window_defaults.width,
                    height: descriptor.window_defaults.height,
                })
                .unwrap_or(WindowSize {
                    width: DEFAULT_WINDOW_WIDTH,
                    height: DEFAULT_WINDOW_HEIGHT,
                });
            options.size = Some(size);
        }
        if options.position.is_none() {
            let open_count = self.instances.with_untracked(InstanceTable::len);
            options.position = Some(default_window_position(open_count));
        }

        let instance_id = self.instances.with_untracked(InstanceTable::peek_next_id);
        self.apply(InstanceAction::Launch(options));
        instance_id
    }

    /// Closes one instance. Returns `false` when the id is unknown.
    pub fn close_app_instance(&self, instance_id: InstanceId) -> bool {
        self.apply(InstanceAction::Close { instance_id })
            .iter()
            .any(|effect| matches!(effect, InstanceEffect::Closed { .. }))
    }

    /// Closes every instance of `app_id` and returns how many closed.
    pub fn close_all_instances_of_app(&self, app_id: &ApplicationId) -> usize {
        self.apply(InstanceAction::CloseApp {
            app_id: app_id.clone(),
        })
        .iter()
        .filter(|effect| matches!(effect, InstanceEffect::Closed { .. }))
        .count()
    }

    /// Focuses and raises an instance. Returns `false` when the id is unknown.
    pub fn bring_instance_to_foreground(&self, instance_id: InstanceId) -> bool {
        if !self.instances.with_untracked(|table| table.contains(instance_id)) {
            return false;
        }
        self.apply(InstanceAction::BringToForeground { instance_id });
        true
    }

    /// Focuses the topmost instance of `app_id`, for consumers that address apps rather than
    /// instances. Returns `false` and warns when the app has no open instance.
    pub fn bring_app_to_foreground(&self, app_id: &ApplicationId) -> bool {
        let topmost = self
            .instances
            .with_untracked(|table| table.instances_of_app(app_id).last().copied());
        match topmost {
            Some(instance_id) => self.bring_instance_to_foreground(instance_id),
            None => {
                logging::warn!("no open instance of {app_id} to bring to the foreground");
                false
            }
        }
    }

    /// Focuses the next instance in the z-stack, wrapping around. Returns whether focus moved.
    pub fn navigate_to_next_instance(&self, instance_id: InstanceId) -> bool {
        Self::foreground_moved(&self.apply(InstanceAction::NavigateNext { instance_id }))
    }

    /// Focuses the previous instance in the z-stack, wrapping around. Returns whether focus moved.
    pub fn navigate_to_previous_instance(&self, instance_id: InstanceId) -> bool {
        Self::foreground_moved(&self.apply(InstanceAction::NavigatePrevious { instance_id }))
    }

    fn foreground_moved(effects: &[InstanceEffect]) -> bool {
        effects
            .iter()
            .any(|effect| matches!(effect, InstanceEffect::ForegroundChanged { .. }))
    }

    /// Returns the foreground instance, tracking the table reactively.
    pub fn foreground_instance(&self) -> Option<AppInstance> {
        self.instances
            .with(|table| table.foreground_instance().cloned())
    }

    /// Ids of `app_id`'s instances, bottom of the stack first.
    pub fn instances_of_app(&self, app_id: &ApplicationId) -> Vec<InstanceId> {
        self.instances.with(|table| table.instances_of_app(app_id))
    }

    /// Stores a dragged window position.
    pub fn set_instance_position(&self, instance_id: InstanceId, position: WindowPosition) -> bool {
        self.write(
            instance_id,
            InstanceAction::Move {
                instance_id,
                position,
            },
        )
    }

    /// Stores a resized window size, clamped to the app's minimum constraints.
    pub fn set_instance_size(&self, instance_id: InstanceId, size: WindowSize) -> bool {
        let app_id = self
            .instances
            .with_untracked(|table| table.get(instance_id).map(|instance| instance.app_id.clone()));
        let size = match app_id.and_then(|app_id| self.registry.get(&app_id)) {
            Some(descriptor) => size.clamped_min(
                descriptor.window_constraints.min_width,
                descriptor.window_constraints.min_height,
            ),
            None => size,
        };
        self.write(instance_id, InstanceAction::Resize { instance_id, size })
    }

    /// Replaces the title override of an instance.
    pub fn set_instance_title(&self, instance_id: InstanceId, title: Option<String>) -> bool {
        self.write(instance_id, InstanceAction::SetTitle { instance_id, title })
    }

    /// Replaces an instance's initial data.
    pub fn update_instance_initial_data(&self, instance_id: InstanceId, data: Value) -> bool {
        self.write(
            instance_id,
            InstanceAction::ReplaceInitialData { instance_id, data },
        )
    }

    fn write(&self, instance_id: InstanceId, action: InstanceAction) -> bool {
        let known = self
            .instances
            .with_untracked(|table| table.contains(instance_id));
        self.apply(action);
        known
    }

    /// Per-app aggregate for consumers unaware of multiple instances.
    pub fn legacy_app_state(&self, app_id: &ApplicationId) -> Option<LegacyAppState> {
        self.legacy_states.with(|states| states.get(app_id).cloned())
    }

    /// Executes a command sent by a mounted app instance.
    pub fn handle_app_command(&self, instance_id: InstanceId, command: AppCommand) {
        match command {
            AppCommand::SetTitle { title } => {
                self.set_instance_title(instance_id, Some(title));
            }
            AppCommand::AdoptInitialData { data } => {
                self.update_instance_initial_data(instance_id, data);
            }
            AppCommand::Close => {
                self.close_app_instance(instance_id);
            }
            AppCommand::Launch(request) => {
                self.bus.get_value().request_launch(request);
            }
        }
    }
}

fn install_runtime_orchestration(runtime: DesktopRuntimeContext) {
    let launch_subscription = runtime
        .bus
        .get_value()
        .subscribe_launch(move |request| {
            handle_launch_request(runtime, request);
        });
    on_cleanup(move || drop(launch_subscription));

    create_effect(move |_| {
        runtime
            .instances
            .with(|table| sync_runtime_sessions(runtime.app_runtime, table.instances()));
    });

    create_effect(move |_| {
        untrack(move || run_startup_deep_link(runtime));
    });
}

#[component]
/// Provides [`DesktopRuntimeContext`] to descendant components and resolves the startup deep link.
pub fn DesktopProvider(
    /// Injected browser or headless host bundle assembled by the entry layer.
    host_services: HostServices,
    /// Desktop configuration.
    #[prop(optional)]
    config: Option<DesktopConfig>,
    children: Children,
) -> impl IntoView {
    let runtime =
        DesktopRuntimeContext::new(host_services, config.unwrap_or_default(), app_registry());

    provide_context(runtime);

    install_runtime_orchestration(runtime);

    children().into_view()
}

/// Returns the current [`DesktopRuntimeContext`].
///
/// # Panics
///
/// Panics if called outside [`DesktopProvider`].
pub fn use_desktop_runtime() -> DesktopRuntimeContext {
    use_context::<DesktopRuntimeContext>().expect("DesktopRuntimeContext not provided")
}
