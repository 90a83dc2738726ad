//! Shared host-bundle model for browser and headless runtime composition.

use std::rc::Rc;

use crate::{
    ImmediateTaskScheduler, NavigationService, NoopNavigationService, TaskScheduler,
};

/// Stable host strategy selected for the current build/runtime composition path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostStrategy {
    /// Browser-backed runtime composition.
    Browser,
    /// Headless composition with in-memory or no-op adapters (tests, non-wasm builds).
    Headless,
}

impl HostStrategy {
    /// Returns a stable string token for diagnostics and runtime inspection.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Browser => "browser",
            Self::Headless => "headless",
        }
    }
}

/// Runtime-selected host service bundle injected into the shared desktop runtime.
///
/// All environment-specific service selection happens before this bundle crosses into
/// `desktop_runtime`, which keeps the runtime decoupled from browser adapter details.
#[derive(Clone)]
pub struct HostServices {
    /// Document location access used once at startup for deep links.
    pub navigation: Rc<dyn NavigationService>,
    /// Deferred task scheduling on the UI event loop.
    pub scheduler: Rc<dyn TaskScheduler>,
    /// Stable strategy identifier for diagnostics.
    pub host_strategy: HostStrategy,
}

impl HostServices {
    /// Bundles explicit service implementations.
    pub fn new(
        navigation: Rc<dyn NavigationService>,
        scheduler: Rc<dyn TaskScheduler>,
        host_strategy: HostStrategy,
    ) -> Self {
        Self {
            navigation,
            scheduler,
            host_strategy,
        }
    }

    /// Headless bundle: location is always `/` and deferred tasks run inline.
    pub fn headless() -> Self {
        Self::new(
            Rc::new(NoopNavigationService),
            Rc::new(ImmediateTaskScheduler),
            HostStrategy::Headless,
        )
    }
}

impl std::fmt::Debug for HostServices {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HostServices")
            .field("host_strategy", &self.host_strategy)
            .finish_non_exhaustive()
    }
}
