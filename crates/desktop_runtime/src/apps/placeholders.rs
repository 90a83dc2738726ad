//! Built-in placeholder app implementations used while fuller apps are still in development.
//!
//! Every placeholder shows its launch data, its lifecycle state, and the update signals the
//! window manager delivered to it after the same app was launched again.

use desktop_app_contract::{AppModule, AppMountContext, AppUpdate, ApplicationId, LaunchRequest};
use leptos::*;
use serde_json::Value;

/// Returns the module that mounts `app_id`, if one is built in.
pub(super) fn module_for(app_id: &ApplicationId) -> Option<AppModule> {
    let mount: fn(AppMountContext) -> View = match app_id.as_str() {
        "notes.notepad" => mount_notepad_placeholder_app,
        "productivity.todo" => mount_todo_placeholder_app,
        "media.memes" => mount_memes_placeholder_app,
        "web.url-shortcuts" => mount_url_shortcuts_placeholder_app,
        "media.ipod" => mount_ipod_placeholder_app,
        "productivity.lists" => mount_lists_placeholder_app,
        "system.about" => mount_about_app,
        _ => return None,
    };
    Some(AppModule::new(mount))
}

fn mount_notepad_placeholder_app(context: AppMountContext) -> View {
    view! {
        <PlaceholderApp
            context=context
            blurb="Notes open by id; /notes/<id> links land here."
            data_key="noteId"
        />
    }
    .into_view()
}

fn mount_todo_placeholder_app(context: AppMountContext) -> View {
    view! {
        <PlaceholderApp context=context blurb="Task list placeholder." data_key="taskId" />
    }
    .into_view()
}

fn mount_memes_placeholder_app(context: AppMountContext) -> View {
    view! {
        <PlaceholderApp
            context=context
            blurb="Relaunching Memes with a meme id notifies windows already open."
            data_key="memeId"
        />
    }
    .into_view()
}

fn mount_url_shortcuts_placeholder_app(context: AppMountContext) -> View {
    view! {
        <PlaceholderApp context=context blurb="Saved link shortcuts placeholder." data_key="url" />
    }
    .into_view()
}

fn mount_ipod_placeholder_app(context: AppMountContext) -> View {
    view! {
        <PlaceholderApp context=context blurb="Now playing: nothing." data_key="videoId" />
    }
    .into_view()
}

fn mount_lists_placeholder_app(context: AppMountContext) -> View {
    view! {
        <PlaceholderApp
            context=context
            blurb="Lists open by id; /lists/<id> links land here."
            data_key="listId"
        />
    }
    .into_view()
}

fn mount_about_app(context: AppMountContext) -> View {
    let instance_label = format!("Window instance {}", context.instance_id);
    view! {
        <div class="app-shell app-about-shell">
            <p><strong>"Multi-instance desktop"</strong></p>
            <p>"Every launch opens a new window. Click a window to bring it forward."</p>
            <div class="app-statusbar">
                <span>{instance_label}</span>
            </div>
        </div>
    }
    .into_view()
}

fn describe_payload(data: &Value) -> String {
    if data.is_null() {
        return "No launch data".to_string();
    }
    serde_json::to_string_pretty(data).unwrap_or_else(|_| data.to_string())
}

fn payload_label(data: &Value, data_key: &str) -> Option<String> {
    match data.get(data_key)? {
        Value::String(text) => Some(text.clone()),
        Value::Null => None,
        other => Some(other.to_string()),
    }
}

#[component]
fn PlaceholderApp(
    context: AppMountContext,
    blurb: &'static str,
    data_key: &'static str,
) -> impl IntoView {
    let host = context.host;
    let lifecycle = context.lifecycle;
    let updates = context.updates;
    let current_data = create_rw_signal(context.initial_data.clone());

    let adopt = move |update: AppUpdate| {
        current_data.set(update.initial_data.clone());
        if let Some(label) = payload_label(&update.initial_data, data_key) {
            host.set_title(format!("{} ({label})", update.app_id.short_name()));
        }
        host.adopt_initial_data(update.initial_data);
    };
    let open_about = move |_| {
        host.launch(LaunchRequest::new(ApplicationId::trusted("system.about")));
    };
    let close = move |_| host.close();

    view! {
        <div class="app-shell app-placeholder-shell">
            <div class="app-toolbar" role="group" aria-label="Placeholder app controls">
                <button type="button" class="app-action" on:click=open_about>
                    "About"
                </button>
                <button type="button" class="app-action" on:click=close>
                    "Close"
                </button>
            </div>
            <p>{blurb}</p>
            <pre class="app-payload">{move || describe_payload(&current_data.get())}</pre>
            <Show when=move || !updates.get().is_empty() fallback=|| ()>
                <ul class="app-update-list" aria-label="Updates from newer launches">
                    <For
                        each=move || updates.get().into_iter().enumerate()
                        key=|(index, update)| (*index, update.timestamp_unix_ms)
                        children=move |(_, update)| {
                            let summary = describe_payload(&update.initial_data);
                            let adopt_update = update.clone();
                            view! {
                                <li>
                                    <code>{summary}</code>
                                    <button
                                        type="button"
                                        class="app-action"
                                        on:click=move |_| adopt(adopt_update.clone())
                                    >
                                        "Open here"
                                    </button>
                                </li>
                            }
                        }
                    />
                </ul>
            </Show>
            <div class="app-statusbar">
                <span>{format!("Instance {}", context.instance_id)}</span>
                <span>{move || format!("State: {}", lifecycle.get().token())}</span>
            </div>
        </div>
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;

    #[test]
    fn every_manifest_app_has_a_module() {
        for raw in [
            "notes.notepad",
            "productivity.todo",
            "media.memes",
            "web.url-shortcuts",
            "media.ipod",
            "productivity.lists",
            "system.about",
        ] {
            assert!(module_for(&ApplicationId::trusted(raw)).is_some(), "{raw}");
        }
        assert!(module_for(&ApplicationId::trusted("vendor.ghost")).is_none());
    }

    #[test]
    fn payload_labels_read_the_app_data_key() {
        assert_eq!(
            payload_label(&json!({ "memeId": "cat" }), "memeId"),
            Some("cat".to_string())
        );
        assert_eq!(
            payload_label(&json!({ "memeId": 7 }), "memeId"),
            Some("7".to_string())
        );
        assert_eq!(payload_label(&json!({ "other": 1 }), "memeId"), None);
        assert_eq!(describe_payload(&Value::Null), "No launch data");
    }
}
