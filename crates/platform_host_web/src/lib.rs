//! Browser (`wasm32`) implementations of [`platform_host`] service contracts.
//!
//! Native builds compile the same adapters with inert fallbacks so the runtime can be exercised
//! headlessly.

#![warn(missing_docs, rustdoc::broken_intra_doc_links)]

pub mod adapters;
pub mod navigation;
pub mod scheduler;

pub use adapters::{
    build_host_services, host_strategy_name, navigation_service, selected_host_strategy,
    task_scheduler,
};
pub use navigation::WebNavigationService;
pub use scheduler::WebTaskScheduler;
