//! Startup deep-link resolution.
//!
//! A navigation path is turned into at most one launch request. Resolution itself is pure; the
//! runtime applies the result through the navigation service and the event bus.

use desktop_app_contract::LaunchRequest;
use leptos::logging;
use serde_json::{Map, Value};

use crate::{apps::AppRegistry, config::DeepLinkNamespace, runtime_context::DesktopRuntimeContext};

#[derive(Debug, Clone, PartialEq)]
/// Outcome of resolving a startup path.
pub enum DeepLinkResolution {
    /// Root path; nothing to do.
    None,
    /// Launch an app.
    Launch {
        /// Request to publish on the launch channel.
        request: LaunchRequest,
        /// Whether the launch waits for the configured startup delay.
        deferred: bool,
    },
    /// A recognized namespace without an item id. Its own handler may still complete it.
    AwaitingAsync {
        /// Matched namespace segment.
        namespace: String,
    },
    /// Unrecognized path.
    Invalid {
        /// Path as received.
        path: String,
    },
}

impl DeepLinkResolution {
    /// Whether the location should be reset to `/` after applying this resolution.
    pub fn resets_path(&self) -> bool {
        matches!(self, Self::Launch { .. } | Self::Invalid { .. })
    }
}

/// Resolves a startup path against the registry and the configured namespaces.
///
/// Trailing slashes are ignored, matching is case-sensitive, and no percent-decoding is applied.
pub fn resolve_deep_link(
    path: &str,
    registry: &AppRegistry,
    namespaces: &[DeepLinkNamespace],
) -> DeepLinkResolution {
    let trimmed = path.trim_end_matches('/');
    if trimmed.is_empty() {
        return DeepLinkResolution::None;
    }
    let invalid = || DeepLinkResolution::Invalid {
        path: path.to_string(),
    };
    let Some(rest) = trimmed.strip_prefix('/') else {
        return invalid();
    };

    let segments: Vec<&str> = rest.split('/').collect();
    let namespace_for =
        |segment: &str| namespaces.iter().find(|entry| entry.namespace == segment);

    match segments.as_slice() {
        [namespace, item_id] if !item_id.is_empty() => match namespace_for(*namespace) {
            Some(entry) => {
                let mut data = Map::new();
                data.insert(entry.data_key.clone(), Value::String(item_id.to_string()));
                DeepLinkResolution::Launch {
                    request: LaunchRequest::new(entry.app_id.clone())
                        .with_initial_data(Value::Object(data))
                        .with_initial_path(trimmed),
                    deferred: false,
                }
            }
            None => invalid(),
        },
        [segment] if !segment.is_empty() => {
            if let Some(descriptor) = registry.resolve_path_segment(*segment) {
                DeepLinkResolution::Launch {
                    request: LaunchRequest::new(descriptor.app_id.clone()),
                    deferred: true,
                }
            } else if let Some(entry) = namespace_for(*segment) {
                DeepLinkResolution::AwaitingAsync {
                    namespace: entry.namespace.clone(),
                }
            } else {
                invalid()
            }
        }
        _ => invalid(),
    }
}

/// Resolves the current location once per page load and applies the result.
///
/// Returns `false` when the startup deep link was already handled.
pub fn run_startup_deep_link(runtime: DesktopRuntimeContext) -> bool {
    let mut first_run = false;
    runtime.deep_link_consumed.update_value(|consumed| {
        first_run = !*consumed;
        *consumed = true;
    });
    if !first_run {
        return false;
    }

    let host = runtime.host.get_value();
    let (namespaces, delay_ms) = runtime.config.with_value(|config| {
        (
            config.deep_link_namespaces.clone(),
            config.deep_link_launch_delay_ms,
        )
    });
    let path = host.navigation.current_path();
    let resolution = resolve_deep_link(&path, runtime.registry, &namespaces);
    let resets_path = resolution.resets_path();

    match resolution {
        DeepLinkResolution::None => {}
        DeepLinkResolution::Launch {
            request,
            deferred: false,
        } => runtime.bus.get_value().request_launch(request),
        DeepLinkResolution::Launch {
            request,
            deferred: true,
        } => {
            let bus = runtime.bus.get_value();
            host.scheduler
                .schedule(delay_ms, Box::new(move || bus.request_launch(request)));
        }
        DeepLinkResolution::AwaitingAsync { namespace } => {
            logging::log!("deep link namespace `{namespace}` left for its handler");
        }
        DeepLinkResolution::Invalid { path } => {
            logging::warn!("ignoring unrecognized deep link `{path}`");
        }
    }

    if resets_path {
        if let Err(err) = host.navigation.replace_path("/") {
            logging::warn!("deep link path reset failed: {err}");
        }
    }
    true
}

#[cfg(test)]
mod tests {
    use std::rc::Rc;

    use desktop_app_contract::ApplicationId;
    use leptos::{create_runtime, SignalWithUntracked};
    use platform_host::{
        HostServices, HostStrategy, ManualTaskScheduler, MemoryNavigationService,
        NavigationService,
    };
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;
    use crate::{apps::app_registry, config::DesktopConfig, window_manager::handle_launch_request};

    struct StartupHarness {
        runtime: DesktopRuntimeContext,
        navigation: MemoryNavigationService,
        scheduler: ManualTaskScheduler,
        _launches: desktop_app_contract::Subscription,
    }

    fn startup(path: &str) -> StartupHarness {
        let navigation = MemoryNavigationService::new(path);
        let scheduler = ManualTaskScheduler::default();
        let host = HostServices::new(
            Rc::new(navigation.clone()),
            Rc::new(scheduler.clone()),
            HostStrategy::Headless,
        );
        let runtime = DesktopRuntimeContext::new(host, DesktopConfig::default(), app_registry());
        let launches = runtime
            .bus
            .get_value()
            .subscribe_launch(move |request| {
                handle_launch_request(runtime, request);
            });
        StartupHarness {
            runtime,
            navigation,
            scheduler,
            _launches: launches,
        }
    }

    fn open_apps(runtime: DesktopRuntimeContext) -> Vec<String> {
        runtime.instances.with_untracked(|table| {
            table
                .instances()
                .iter()
                .map(|instance| instance.app_id.to_string())
                .collect()
        })
    }

    fn resolve(path: &str) -> DeepLinkResolution {
        let config = DesktopConfig::default();
        resolve_deep_link(path, app_registry(), &config.deep_link_namespaces)
    }

    #[test]
    fn root_and_empty_paths_do_nothing() {
        assert_eq!(resolve("/"), DeepLinkResolution::None);
        assert_eq!(resolve(""), DeepLinkResolution::None);
        assert!(!DeepLinkResolution::None.resets_path());
    }

    #[test]
    fn bare_app_name_launches_after_delay() {
        let resolution = resolve("/todo");
        assert_eq!(
            resolution,
            DeepLinkResolution::Launch {
                request: LaunchRequest::new(ApplicationId::trusted("productivity.todo")),
                deferred: true,
            }
        );
        assert!(resolution.resets_path());
        assert_eq!(
            resolve("/productivity.todo/"),
            DeepLinkResolution::Launch {
                request: LaunchRequest::new(ApplicationId::trusted("productivity.todo")),
                deferred: true,
            }
        );
    }

    #[test]
    fn namespace_with_id_launches_immediately_with_data() {
        let resolution = resolve("/notes/abc");
        let DeepLinkResolution::Launch { request, deferred } = &resolution else {
            panic!("expected launch, got {resolution:?}");
        };
        assert!(!deferred);
        assert_eq!(request.app_id.as_str(), "notes.notepad");
        assert_eq!(request.initial_data, json!({ "noteId": "abc" }));
        assert_eq!(request.initial_path.as_deref(), Some("/notes/abc"));
        assert!(resolution.resets_path());
    }

    #[test]
    fn ipod_link_opens_the_shared_video() {
        let resolution = resolve("/ipod/abc");
        assert_eq!(
            resolution,
            DeepLinkResolution::Launch {
                request: LaunchRequest::new(ApplicationId::trusted("media.ipod"))
                    .with_initial_data(json!({ "videoId": "abc" }))
                    .with_initial_path("/ipod/abc"),
                deferred: false,
            }
        );
        assert_eq!(
            resolve("/ipod"),
            DeepLinkResolution::Launch {
                request: LaunchRequest::new(ApplicationId::trusted("media.ipod")),
                deferred: true,
            }
        );
    }

    #[test]
    fn namespace_without_id_awaits_its_handler() {
        for path in ["/notes", "/notes/"] {
            let resolution = resolve(path);
            assert_eq!(
                resolution,
                DeepLinkResolution::AwaitingAsync {
                    namespace: "notes".to_string()
                }
            );
            assert!(!resolution.resets_path());
        }
    }

    #[test]
    fn registered_short_name_wins_over_namespace() {
        let resolution = resolve("/memes");
        assert_eq!(
            resolution,
            DeepLinkResolution::Launch {
                request: LaunchRequest::new(ApplicationId::trusted("media.memes")),
                deferred: true,
            }
        );
    }

    #[test]
    fn unknown_paths_are_invalid_and_reset() {
        for path in ["/not-a-real-app", "/Todo", "/unknown/abc", "/notes/a/b", "notes"] {
            let resolution = resolve(path);
            assert_eq!(
                resolution,
                DeepLinkResolution::Invalid {
                    path: path.to_string()
                }
            );
        }
        assert!(resolve("/not-a-real-app").resets_path());
    }

    #[test]
    fn bare_app_link_launches_once_after_delay_and_resets() {
        let reactive = create_runtime();
        let harness = startup("/todo");

        assert!(run_startup_deep_link(harness.runtime));
        assert!(open_apps(harness.runtime).is_empty());
        assert_eq!(harness.scheduler.pending_delays(), vec![100]);
        assert_eq!(harness.navigation.replacements(), vec!["/".to_string()]);

        assert_eq!(harness.scheduler.run_pending(), 1);
        assert_eq!(open_apps(harness.runtime), vec!["productivity.todo".to_string()]);
        reactive.dispose();
    }

    #[test]
    fn namespaced_link_launches_immediately_with_item_id() {
        let reactive = create_runtime();
        let harness = startup("/notes/abc");

        run_startup_deep_link(harness.runtime);

        let data = harness.runtime.instances.with_untracked(|table| {
            table
                .foreground_instance()
                .map(|instance| instance.initial_data.clone())
        });
        assert_eq!(
            data,
            Some(json!({ "noteId": "abc", "initialPath": "/notes/abc" }))
        );
        assert_eq!(harness.scheduler.pending_len(), 0);
        assert_eq!(harness.navigation.current_path(), "/");
        reactive.dispose();
    }

    #[test]
    fn unknown_link_resets_without_launching() {
        let reactive = create_runtime();
        let harness = startup("/not-a-real-app");

        run_startup_deep_link(harness.runtime);

        assert!(open_apps(harness.runtime).is_empty());
        assert_eq!(harness.scheduler.pending_len(), 0);
        assert_eq!(harness.navigation.replacements(), vec!["/".to_string()]);
        reactive.dispose();
    }

    #[test]
    fn namespace_only_link_keeps_the_path() {
        let reactive = create_runtime();
        let harness = startup("/notes");

        run_startup_deep_link(harness.runtime);

        assert!(open_apps(harness.runtime).is_empty());
        assert!(harness.navigation.replacements().is_empty());
        assert_eq!(harness.navigation.current_path(), "/notes");
        reactive.dispose();
    }

    #[test]
    fn startup_deep_link_runs_only_once() {
        let reactive = create_runtime();
        let harness = startup("/notes/abc");

        assert!(run_startup_deep_link(harness.runtime));
        assert!(!run_startup_deep_link(harness.runtime));

        assert_eq!(open_apps(harness.runtime).len(), 1);
        assert_eq!(harness.navigation.replacements().len(), 1);
        reactive.dispose();
    }
}
