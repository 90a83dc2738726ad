pub mod app_bus;
pub mod app_runtime;
pub mod apps;
pub mod components;
pub mod config;
pub mod deep_link;
pub mod instance_stack;
pub mod legacy;
pub mod model;
pub mod reducer;
pub mod runtime_context;
pub mod window_manager;

pub use app_bus::DesktopEventBus;
pub use components::{use_desktop_runtime, DesktopProvider, DesktopRuntimeContext, DesktopShell};
pub use config::{DeepLinkNamespace, DesktopConfig};
pub use deep_link::{resolve_deep_link, run_startup_deep_link, DeepLinkResolution};
pub use legacy::{legacy_app_state, legacy_app_states, LegacyAppState};
pub use model::*;
pub use reducer::{reduce_instances, InstanceAction, InstanceEffect, ReducerError};
pub use window_manager::{handle_launch_request, window_z_index, WindowCallbacks, WindowPlan};
