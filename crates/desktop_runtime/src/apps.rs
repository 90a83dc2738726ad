//! Application registry built from the build-time manifest catalog.
//!
//! The registry is parsed once and frozen for the page lifetime. Each manifest entry is bound to
//! the [`AppModule`] that mounts its view; entries without a module are dropped with a warning.

mod placeholders;

use std::sync::OnceLock;

use desktop_app_contract::{
    AppMetadata, AppModule, ApplicationId, ApplicationIdError, WindowConstraints, WindowDefaults,
};
use leptos::logging;
use serde::Deserialize;
use thiserror::Error;

include!(concat!(env!("OUT_DIR"), "/app_catalog_generated.rs"));

#[derive(Debug, Clone, Deserialize)]
struct AppManifestEntry {
    app_id: String,
    display_name: String,
    icon: String,
    show_on_desktop: bool,
    show_in_menu: bool,
    window_defaults: WindowDefaults,
    window_constraints: WindowConstraints,
}

#[derive(Debug, Error)]
/// Failures while turning the manifest catalog into a registry.
pub enum CatalogError {
    /// The catalog JSON could not be parsed.
    #[error("app manifest catalog is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
    /// A manifest carries an id that fails validation.
    #[error("app manifest has an invalid id: {0}")]
    InvalidAppId(#[from] ApplicationIdError),
}

#[derive(Debug, Clone)]
/// One registered application.
pub struct AppDescriptor {
    /// Registry key.
    pub app_id: ApplicationId,
    /// Display and visibility metadata.
    pub metadata: AppMetadata,
    /// Size applied to launches that do not request one.
    pub window_defaults: WindowDefaults,
    /// Minimum size and resize policy.
    pub window_constraints: WindowConstraints,
    /// Mount function for the app view.
    pub module: AppModule,
}

impl AppDescriptor {
    /// Returns `true` when `segment` names this app by full id or by its last dotted segment.
    pub fn matches_path_segment(&self, segment: &str) -> bool {
        self.app_id.as_str() == segment || self.app_id.short_name() == segment
    }
}

#[derive(Debug, Clone, Default)]
/// Read-only lookup table of registered applications.
pub struct AppRegistry {
    entries: Vec<AppDescriptor>,
}

impl AppRegistry {
    /// Builds a registry from explicit descriptors. Later duplicates are ignored.
    pub fn from_descriptors(descriptors: Vec<AppDescriptor>) -> Self {
        let mut entries: Vec<AppDescriptor> = Vec::with_capacity(descriptors.len());
        for descriptor in descriptors {
            if entries
                .iter()
                .any(|entry| entry.app_id == descriptor.app_id)
            {
                logging::warn!("duplicate app registration ignored: {}", descriptor.app_id);
                continue;
            }
            entries.push(descriptor);
        }
        Self { entries }
    }

    /// Looks up a registered app.
    pub fn get(&self, app_id: &ApplicationId) -> Option<&AppDescriptor> {
        self.entries.iter().find(|entry| entry.app_id == *app_id)
    }

    /// Returns `true` when `raw_app_id` is registered.
    pub fn contains(&self, raw_app_id: &str) -> bool {
        self.entries
            .iter()
            .any(|entry| entry.app_id.as_str() == raw_app_id)
    }

    /// Resolves a bare deep-link path segment to a registered app.
    pub fn resolve_path_segment(&self, segment: &str) -> Option<&AppDescriptor> {
        self.entries
            .iter()
            .find(|entry| entry.app_id.as_str() == segment)
            .or_else(|| {
                self.entries
                    .iter()
                    .find(|entry| entry.matches_path_segment(segment))
            })
    }

    /// Iterates registered apps in catalog order.
    pub fn iter(&self) -> impl Iterator<Item = &AppDescriptor> {
        self.entries.iter()
    }

    /// Number of registered apps.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` when nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn parse_catalog(raw: &str) -> Result<Vec<AppDescriptor>, CatalogError> {
    let manifests: Vec<AppManifestEntry> = serde_json::from_str(raw)?;
    let mut descriptors = Vec::with_capacity(manifests.len());
    for manifest in manifests {
        let app_id = ApplicationId::new(manifest.app_id)?;
        let Some(module) = placeholders::module_for(&app_id) else {
            logging::warn!("app manifest {app_id} has no registered module; skipping");
            continue;
        };
        descriptors.push(AppDescriptor {
            app_id,
            metadata: AppMetadata {
                display_name: manifest.display_name,
                icon: manifest.icon,
                show_on_desktop: manifest.show_on_desktop,
                show_in_menu: manifest.show_in_menu,
            },
            window_defaults: manifest.window_defaults,
            window_constraints: manifest.window_constraints,
            module,
        });
    }
    Ok(descriptors)
}

/// Returns the frozen application registry.
pub fn app_registry() -> &'static AppRegistry {
    static REGISTRY: OnceLock<AppRegistry> = OnceLock::new();
    REGISTRY.get_or_init(|| match parse_catalog(APP_MANIFEST_CATALOG_JSON) {
        Ok(descriptors) => AppRegistry::from_descriptors(descriptors),
        Err(err) => {
            logging::warn!("app manifest catalog rejected: {err}");
            AppRegistry::default()
        }
    })
}

/// Display name for `app_id`, falling back to the raw id for unknown apps.
pub fn app_title_by_id(app_id: &ApplicationId) -> String {
    app_registry()
        .get(app_id)
        .map(|entry| entry.metadata.display_name.clone())
        .unwrap_or_else(|| app_id.to_string())
}

/// Apps shown as desktop icons.
pub fn desktop_icon_apps() -> Vec<AppDescriptor> {
    app_registry()
        .iter()
        .filter(|entry| entry.metadata.show_on_desktop)
        .cloned()
        .collect()
}

/// Apps listed in the global menu.
pub fn menu_apps() -> Vec<AppDescriptor> {
    app_registry()
        .iter()
        .filter(|entry| entry.metadata.show_in_menu)
        .cloned()
        .collect()
}
