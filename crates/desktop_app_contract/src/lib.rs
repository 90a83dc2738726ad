//! Shared contract types between the desktop window manager runtime and managed apps.
//!
//! Apps are identified by canonical dotted [`ApplicationId`]s and mounted once per running
//! instance through an [`AppModule`]. Cross-component launch and update traffic is described by
//! the typed [`LaunchRequest`] and [`AppUpdate`] payloads so producers never need a direct
//! reference to the window manager.

#![warn(missing_docs, rustdoc::broken_intra_doc_links)]

use std::{cell::Cell, rc::Rc};

use leptos::{Callable, Callback, ReadSignal, RwSignal, View};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

/// Stable identifier for one running app instance, as seen by mounted apps.
pub type InstanceRuntimeId = u64;

const MAX_APPLICATION_ID_LEN: usize = 120;
const MAX_SEGMENT_LEN: usize = 32;

/// Rejection reasons for raw application id strings.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApplicationIdError {
    /// The id was empty.
    #[error("application id is empty")]
    Empty,
    /// The id exceeded the maximum length.
    #[error("application id `{0}` is longer than 120 bytes")]
    TooLong(String),
    /// The id had fewer than two dotted segments.
    #[error("application id `{0}` must have at least two dotted segments")]
    NotNamespaced(String),
    /// A segment was empty, too long, or used characters outside `[a-z0-9-]`.
    #[error("application id `{id}` has an invalid segment `{segment}`")]
    InvalidSegment {
        /// Full raw id.
        id: String,
        /// Offending segment.
        segment: String,
    },
}

/// Stable identifier for an app package/module.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ApplicationId(String);

impl ApplicationId {
    /// Returns an app identifier when `raw` conforms to the `segment.segment...` policy.
    ///
    /// # Errors
    ///
    /// Returns an [`ApplicationIdError`] describing the first policy violation.
    pub fn new(raw: impl Into<String>) -> Result<Self, ApplicationIdError> {
        let raw = raw.into();
        validate_application_id(&raw)?;
        Ok(Self(raw))
    }

    /// Creates an id without validation for compile-time/runtime trusted constants.
    pub fn trusted(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    /// Returns the string form of the identifier.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the last dotted segment (`productivity.todo` -> `todo`).
    pub fn short_name(&self) -> &str {
        self.0.rsplit('.').next().unwrap_or(&self.0)
    }
}

impl std::fmt::Display for ApplicationId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<String> for ApplicationId {
    type Error = ApplicationIdError;

    fn try_from(raw: String) -> Result<Self, Self::Error> {
        Self::new(raw)
    }
}

impl From<ApplicationId> for String {
    fn from(id: ApplicationId) -> Self {
        id.0
    }
}

fn validate_application_id(raw: &str) -> Result<(), ApplicationIdError> {
    if raw.is_empty() {
        return Err(ApplicationIdError::Empty);
    }
    if raw.len() > MAX_APPLICATION_ID_LEN {
        return Err(ApplicationIdError::TooLong(raw.to_string()));
    }

    let mut count = 0usize;
    for part in raw.split('.') {
        count += 1;
        if !is_valid_segment(part) {
            return Err(ApplicationIdError::InvalidSegment {
                id: raw.to_string(),
                segment: part.to_string(),
            });
        }
    }

    if count < 2 {
        return Err(ApplicationIdError::NotNamespaced(raw.to_string()));
    }
    Ok(())
}

fn is_valid_segment(part: &str) -> bool {
    let bytes = part.as_bytes();
    if bytes.is_empty() || bytes.len() > MAX_SEGMENT_LEN {
        return false;
    }
    bytes[0].is_ascii_lowercase()
        && !part.ends_with('-')
        && bytes
            .iter()
            .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit() || *b == b'-')
}

/// Request to launch a new instance of an app.
///
/// Any producer (desktop icons, the deep-link resolver, other app instances) may publish one
/// without holding a reference to the window manager.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LaunchRequest {
    /// App to launch.
    pub app_id: ApplicationId,
    /// Navigation path that originated the request, when any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub initial_path: Option<String>,
    /// Opaque payload handed to the new instance (`Null` when absent).
    #[serde(default)]
    pub initial_data: Value,
}

impl LaunchRequest {
    /// Creates a launch request without payload.
    pub fn new(app_id: ApplicationId) -> Self {
        Self {
            app_id,
            initial_path: None,
            initial_data: Value::Null,
        }
    }

    /// Attaches an initial data payload.
    pub fn with_initial_data(mut self, initial_data: Value) -> Self {
        self.initial_data = initial_data;
        self
    }

    /// Attaches the originating navigation path.
    pub fn with_initial_path(mut self, initial_path: impl Into<String>) -> Self {
        self.initial_path = Some(initial_path.into());
        self
    }

    /// Returns whether the request carries a non-null payload.
    pub fn has_initial_data(&self) -> bool {
        !self.initial_data.is_null()
    }

    /// Returns the payload stored on the launched instance.
    ///
    /// `initial_path` is folded in under `initialPath` when the payload is an object or null;
    /// any other payload shape is passed through untouched.
    pub fn launch_payload(&self) -> Value {
        let Some(path) = self.initial_path.as_ref() else {
            return self.initial_data.clone();
        };
        match &self.initial_data {
            Value::Null => {
                let mut map = Map::new();
                map.insert("initialPath".to_string(), Value::String(path.clone()));
                Value::Object(map)
            }
            Value::Object(map) => {
                let mut map = map.clone();
                map.entry("initialPath")
                    .or_insert_with(|| Value::String(path.clone()));
                Value::Object(map)
            }
            other => other.clone(),
        }
    }
}

/// Best-effort notification that an already-open app was relaunched with new data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppUpdate {
    /// App whose open instances may react.
    pub app_id: ApplicationId,
    /// Replacement data supplied by the relaunch.
    pub initial_data: Value,
    /// Timestamp in unix milliseconds when known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp_unix_ms: Option<u64>,
}

impl AppUpdate {
    /// Creates an update signal for `app_id`.
    pub fn new(app_id: ApplicationId, initial_data: Value) -> Self {
        Self {
            app_id,
            initial_data,
            timestamp_unix_ms: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
/// Lifecycle events emitted by the desktop window manager to a mounted instance.
pub enum AppLifecycleEvent {
    /// App view has been mounted into a managed window.
    Mounted,
    /// Instance became the foreground instance.
    Focused,
    /// Instance lost foreground to another instance.
    Blurred,
}

impl AppLifecycleEvent {
    /// Returns a stable string token for debugging hooks.
    pub const fn token(self) -> &'static str {
        match self {
            Self::Mounted => "mounted",
            Self::Focused => "focused",
            Self::Blurred => "blurred",
        }
    }
}

/// Default window geometry applied when an instance launches without explicit size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WindowDefaults {
    /// Initial width in CSS pixels.
    pub width: i32,
    /// Initial height in CSS pixels.
    pub height: i32,
}

impl Default for WindowDefaults {
    fn default() -> Self {
        Self {
            width: 420,
            height: 300,
        }
    }
}

/// Window sizing policy declared by an app.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WindowConstraints {
    /// Minimum width in CSS pixels.
    pub min_width: i32,
    /// Minimum height in CSS pixels.
    pub min_height: i32,
    /// Whether the window chrome exposes resize handles.
    pub resizable: bool,
}

impl Default for WindowConstraints {
    fn default() -> Self {
        Self {
            min_width: 220,
            min_height: 140,
            resizable: true,
        }
    }
}

/// Static metadata for a registry entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppMetadata {
    /// Human-readable display name.
    pub display_name: String,
    /// Icon token rendered by the shell.
    pub icon: String,
    /// Desktop icon visibility flag.
    pub show_on_desktop: bool,
    /// Global menu visibility flag.
    pub show_in_menu: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
/// Commands an app instance may send back to the desktop runtime.
pub enum AppCommand {
    /// Replace the display title of the sending instance.
    SetTitle {
        /// New title text.
        title: String,
    },
    /// Replace the sending instance's initial data, typically after reacting to an update.
    AdoptInitialData {
        /// Data to store on the instance.
        data: Value,
    },
    /// Close the sending instance.
    Close,
    /// Ask the window manager to launch another app.
    Launch(LaunchRequest),
}

/// Instance-scoped handle for sending [`AppCommand`]s to the runtime.
#[derive(Clone, Copy)]
pub struct AppHost {
    command_sender: Callback<AppCommand>,
}

impl AppHost {
    /// Creates a host handle from the runtime command callback.
    pub fn new(command_sender: Callback<AppCommand>) -> Self {
        Self { command_sender }
    }

    /// Sends a command to the runtime.
    pub fn send(&self, command: AppCommand) {
        self.command_sender.call(command);
    }

    /// Requests a title change for this instance.
    pub fn set_title(&self, title: impl Into<String>) {
        self.send(AppCommand::SetTitle {
            title: title.into(),
        });
    }

    /// Stores `data` as this instance's initial data.
    pub fn adopt_initial_data(&self, data: Value) {
        self.send(AppCommand::AdoptInitialData { data });
    }

    /// Closes this instance.
    pub fn close(&self) {
        self.send(AppCommand::Close);
    }

    /// Launches another app through the window manager.
    pub fn launch(&self, request: LaunchRequest) {
        self.send(AppCommand::Launch(request));
    }
}

#[derive(Clone)]
/// App mount context injected by the desktop runtime per instance.
pub struct AppMountContext {
    /// Stable app id from the registry.
    pub app_id: ApplicationId,
    /// Stable runtime instance id.
    pub instance_id: InstanceRuntimeId,
    /// Initial data supplied at launch time.
    pub initial_data: Value,
    /// Reactive lifecycle signal for this instance.
    pub lifecycle: ReadSignal<AppLifecycleEvent>,
    /// Update signals delivered to this instance after a relaunch of the same app.
    pub updates: RwSignal<Vec<AppUpdate>>,
    /// Runtime command handle.
    pub host: AppHost,
}

/// Static app mount function used by the runtime app registry.
pub type AppMountFn = fn(AppMountContext) -> View;

#[derive(Debug, Clone, Copy)]
/// Mounted app module descriptor used by the runtime app registry.
pub struct AppModule {
    mount_fn: AppMountFn,
}

impl AppModule {
    /// Creates a module from a mount function.
    pub const fn new(mount_fn: AppMountFn) -> Self {
        Self { mount_fn }
    }

    /// Mounts the app view with a runtime-provided context.
    pub fn mount(self, context: AppMountContext) -> View {
        (self.mount_fn)(context)
    }
}

/// Drop-based handle for a bus subscription.
///
/// The handle is not `Clone`: exactly one owner decides when the listener goes away.
pub struct Subscription {
    unsubscribe: Rc<dyn Fn()>,
    active: Cell<bool>,
}

impl Subscription {
    /// Creates a new subscription from an unsubscribe callback.
    pub fn new(unsubscribe: Rc<dyn Fn()>) -> Self {
        Self {
            unsubscribe,
            active: Cell::new(true),
        }
    }

    /// Creates a subscription that owns nothing.
    pub fn noop() -> Self {
        Self::new(Rc::new(|| {}))
    }

    /// Returns whether the listener is still registered.
    pub fn is_active(&self) -> bool {
        self.active.get()
    }

    /// Removes the listener if still registered.
    pub fn unsubscribe(&self) {
        if self.active.replace(false) {
            (self.unsubscribe)();
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.unsubscribe();
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("active", &self.active.get())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;

    #[test]
    fn application_id_requires_dotted_namespaces() {
        assert!(ApplicationId::new("productivity.todo").is_ok());
        assert!(ApplicationId::new("web.url-shortcuts").is_ok());
        assert_eq!(
            ApplicationId::new("todo"),
            Err(ApplicationIdError::NotNamespaced("todo".to_string()))
        );
        assert!(matches!(
            ApplicationId::new("Media.memes"),
            Err(ApplicationIdError::InvalidSegment { .. })
        ));
        assert!(matches!(
            ApplicationId::new("media..memes"),
            Err(ApplicationIdError::InvalidSegment { .. })
        ));
        assert_eq!(ApplicationId::new(""), Err(ApplicationIdError::Empty));
    }

    #[test]
    fn short_name_is_last_segment() {
        assert_eq!(ApplicationId::trusted("productivity.todo").short_name(), "todo");
        assert_eq!(ApplicationId::trusted("a.b.ipod").short_name(), "ipod");
    }

    #[test]
    fn launch_request_uses_camel_case_wire_names() {
        let request = LaunchRequest::new(ApplicationId::trusted("media.memes"))
            .with_initial_data(json!({ "memeId": "m1" }));
        let value = serde_json::to_value(&request).expect("serialize");
        assert_eq!(
            value,
            json!({ "appId": "media.memes", "initialData": { "memeId": "m1" } })
        );

        let parsed: LaunchRequest =
            serde_json::from_value(json!({ "appId": "notes.notepad" })).expect("deserialize");
        assert_eq!(parsed.initial_data, Value::Null);
        assert!(!parsed.has_initial_data());
    }

    #[test]
    fn launch_request_rejects_invalid_app_ids_on_the_wire() {
        let parsed = serde_json::from_value::<LaunchRequest>(json!({ "appId": "NOPE" }));
        assert!(parsed.is_err());
    }

    #[test]
    fn launch_payload_folds_initial_path_into_object_payloads() {
        let app_id = ApplicationId::trusted("notes.notepad");
        let bare = LaunchRequest::new(app_id.clone()).with_initial_path("/notes/a");
        assert_eq!(bare.launch_payload(), json!({ "initialPath": "/notes/a" }));

        let object = LaunchRequest::new(app_id.clone())
            .with_initial_data(json!({ "noteId": "a" }))
            .with_initial_path("/notes/a");
        assert_eq!(
            object.launch_payload(),
            json!({ "noteId": "a", "initialPath": "/notes/a" })
        );

        let scalar = LaunchRequest::new(app_id)
            .with_initial_data(json!("raw"))
            .with_initial_path("/x");
        assert_eq!(scalar.launch_payload(), json!("raw"));
    }

    #[test]
    fn subscription_unsubscribes_once() {
        let calls = Rc::new(Cell::new(0));
        let counter = calls.clone();
        let subscription = Subscription::new(Rc::new(move || counter.set(counter.get() + 1)));
        subscription.unsubscribe();
        assert!(!subscription.is_active());
        drop(subscription);
        assert_eq!(calls.get(), 1);
    }
}
