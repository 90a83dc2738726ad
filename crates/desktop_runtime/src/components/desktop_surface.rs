use super::*;
use crate::apps::{desktop_icon_apps, AppDescriptor};
use desktop_app_contract::{ApplicationId, LaunchRequest};

// The surface only publishes launch requests; window creation belongs to the launch subscriber.
fn request_icon_launch(runtime: DesktopRuntimeContext, app_id: ApplicationId) {
    let bus = runtime.bus.get_value();
    bus.request_launch(LaunchRequest::new(app_id));
}

#[component]
pub(super) fn DesktopSurface() -> impl IntoView {
    let runtime = use_desktop_runtime();
    let selected = create_rw_signal(None::<ApplicationId>);

    view! {
        <div
            class="desktop-surface"
            role="list"
            aria-label="Desktop"
            on:pointerdown=move |_| selected.set(None)
        >
            <For
                each=desktop_icon_apps
                key=|app: &AppDescriptor| app.app_id.to_string()
                let:app
            >
                {{
                    let app_id = app.app_id.clone();
                    let select_id = app.app_id.clone();
                    let key_id = app.app_id.clone();
                    let is_selected_id = app.app_id.clone();
                    let label = app.metadata.display_name.clone();
                    view! {
                        <button
                            class="desktop-icon"
                            class:selected=move || {
                                selected.with(|current| current.as_ref() == Some(&is_selected_id))
                            }
                            role="listitem"
                            data-app-id=app.app_id.to_string()
                            on:pointerdown=move |ev: web_sys::PointerEvent| {
                                ev.stop_propagation();
                                selected.set(Some(select_id.clone()));
                            }
                            on:dblclick=move |ev| {
                                stop_mouse_event(&ev);
                                request_icon_launch(runtime, app_id.clone());
                            }
                            on:keydown=move |ev: web_sys::KeyboardEvent| {
                                if ev.key() == "Enter" {
                                    ev.prevent_default();
                                    request_icon_launch(runtime, key_id.clone());
                                }
                            }
                        >
                            <span
                                class=format!("desktop-icon-glyph icon-{}", app.metadata.icon)
                                aria-hidden="true"
                            ></span>
                            <span class="desktop-icon-label">{label}</span>
                        </button>
                    }
                }}
            </For>
        </div>
    }
}
