//! Browser deferred-task adapter.

use platform_host::{DeferredTask, TaskScheduler};
#[cfg(target_arch = "wasm32")]
use wasm_bindgen::{closure::Closure, JsCast};

#[derive(Debug, Clone, Copy, Default)]
/// Scheduler backed by `window.setTimeout`.
///
/// Outside the browser, or when no window is available, the task runs inline.
pub struct WebTaskScheduler;

impl TaskScheduler for WebTaskScheduler {
    fn schedule(&self, delay_ms: u32, task: DeferredTask) {
        #[cfg(target_arch = "wasm32")]
        {
            let Some(window) = web_sys::window() else {
                task();
                return;
            };
            let callback = Closure::once_into_js(move || task());
            let timeout = i32::try_from(delay_ms).unwrap_or(i32::MAX);
            if let Err(err) = window.set_timeout_with_callback_and_timeout_and_arguments_0(
                callback.unchecked_ref(),
                timeout,
            ) {
                web_sys::console::warn_1(&err);
            }
        }

        #[cfg(not(target_arch = "wasm32"))]
        {
            let _ = delay_ms;
            task();
        }
    }
}
