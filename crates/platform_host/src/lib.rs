//! Typed host-domain contracts used across the desktop runtime and browser adapters.
//!
//! This crate is the API-first boundary for platform services: document navigation, deferred
//! task scheduling and time helpers. Concrete browser adapters live in `platform_host_web`.

#![warn(missing_docs, rustdoc::broken_intra_doc_links)]

pub mod host;
pub mod navigation;
pub mod scheduler;
pub mod time;

pub use host::{HostServices, HostStrategy};
pub use navigation::{MemoryNavigationService, NavigationService, NoopNavigationService};
pub use scheduler::{DeferredTask, ImmediateTaskScheduler, ManualTaskScheduler, TaskScheduler};
pub use time::next_update_stamp_ms;
