//! Browser document-location adapter.

use platform_host::NavigationService;
#[cfg(target_arch = "wasm32")]
use wasm_bindgen::JsValue;

#[derive(Debug, Clone, Copy, Default)]
/// Navigation adapter backed by `window.location` and `history.replaceState`.
pub struct WebNavigationService;

impl NavigationService for WebNavigationService {
    fn current_path(&self) -> String {
        #[cfg(target_arch = "wasm32")]
        {
            web_sys::window()
                .and_then(|window| window.location().pathname().ok())
                .unwrap_or_else(|| "/".to_string())
        }

        #[cfg(not(target_arch = "wasm32"))]
        {
            "/".to_string()
        }
    }

    fn replace_path(&self, path: &str) -> Result<(), String> {
        #[cfg(target_arch = "wasm32")]
        {
            let window = web_sys::window().ok_or_else(|| "window unavailable".to_string())?;
            let history = window
                .history()
                .map_err(|err| format!("history unavailable: {err:?}"))?;
            history
                .replace_state_with_url(&JsValue::NULL, "", Some(path))
                .map_err(|err| format!("history.replaceState failed: {err:?}"))
        }

        #[cfg(not(target_arch = "wasm32"))]
        {
            let _ = path;
            Ok(())
        }
    }
}
