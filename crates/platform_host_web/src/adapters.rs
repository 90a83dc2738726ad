//! Compile-time host-strategy selection and concrete adapter factories for runtime wiring.

use std::rc::Rc;

use platform_host::{HostServices, HostStrategy};

use crate::{WebNavigationService, WebTaskScheduler};

/// Returns the host strategy for the active build target.
pub const fn selected_host_strategy() -> HostStrategy {
    #[cfg(target_arch = "wasm32")]
    {
        HostStrategy::Browser
    }

    #[cfg(not(target_arch = "wasm32"))]
    {
        HostStrategy::Headless
    }
}

/// Returns the selected host strategy as a stable string token.
pub fn host_strategy_name() -> &'static str {
    selected_host_strategy().as_str()
}

/// Builds the navigation adapter for the active strategy.
pub fn navigation_service() -> WebNavigationService {
    WebNavigationService
}

/// Builds the deferred-task adapter for the active strategy.
pub fn task_scheduler() -> WebTaskScheduler {
    WebTaskScheduler
}

/// Assembles the host service bundle injected into `desktop_runtime`.
pub fn build_host_services() -> HostServices {
    HostServices::new(
        Rc::new(navigation_service()),
        Rc::new(task_scheduler()),
        selected_host_strategy(),
    )
}

#[cfg(test)]
mod tests {
    use platform_host::NavigationService;

    use super::*;

    #[cfg(not(target_arch = "wasm32"))]
    #[test]
    fn native_builds_select_headless_strategy() {
        let services = build_host_services();
        assert_eq!(services.host_strategy, HostStrategy::Headless);
        assert_eq!(host_strategy_name(), "headless");
        assert_eq!(services.navigation.current_path(), "/");
    }
}
