use super::*;
use crate::{
    apps::{app_title_by_id, menu_apps, AppDescriptor},
    model::InstanceId,
};
use desktop_app_contract::LaunchRequest;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum OpenMenu {
    Apps,
    Windows,
}

#[derive(Debug, Clone, PartialEq)]
struct WindowMenuEntry {
    instance_id: InstanceId,
    label: String,
    is_foreground: bool,
}

fn window_menu_entries(plans: &[WindowPlan]) -> Vec<WindowMenuEntry> {
    plans
        .iter()
        .map(|plan| WindowMenuEntry {
            instance_id: plan.instance.instance_id,
            label: plan.title.clone(),
            is_foreground: plan.instance.is_foreground,
        })
        .collect()
}

// Reuses the shell's plans so unknown apps are reported once per table change.
fn window_entries_memo(plans: Memo<Vec<WindowPlan>>) -> Memo<Vec<WindowMenuEntry>> {
    create_memo(move |_| plans.with(|plans| window_menu_entries(plans)))
}

/// Menu bar of the Mac skin. Window entries follow the shell's window plans.
#[component]
pub(super) fn GlobalMenuBar(plans: Memo<Vec<WindowPlan>>) -> impl IntoView {
    let runtime = use_desktop_runtime();
    let open_menu = create_rw_signal(None::<OpenMenu>);

    let foreground_app = create_memo(move |_| {
        runtime.instances.with(|table| {
            table
                .foreground_instance()
                .map(|instance| instance.app_id.clone())
        })
    });
    let window_entries = window_entries_memo(plans);
    let toggle = move |menu: OpenMenu| {
        open_menu.update(|open| {
            *open = if *open == Some(menu) { None } else { Some(menu) };
        });
    };

    let escape_listener = window_event_listener(ev::keydown, move |ev| {
        if ev.key() == "Escape" && open_menu.get_untracked().is_some() {
            open_menu.set(None);
        }
    });
    on_cleanup(move || escape_listener.remove());

    view! {
        <nav class="global-menu-bar" role="menubar" aria-label="Desktop menu">
            <span class="global-menu-app-name">
                {move || {
                    foreground_app
                        .get()
                        .map(|app_id| app_title_by_id(&app_id))
                        .unwrap_or_else(|| "Desktop".to_string())
                }}
            </span>
            <div class="global-menu">
                <button
                    role="menuitem"
                    aria-haspopup="true"
                    aria-expanded=move || (open_menu.get() == Some(OpenMenu::Apps)).to_string()
                    on:click=move |ev| {
                        stop_mouse_event(&ev);
                        toggle(OpenMenu::Apps);
                    }
                >
                    "Apps"
                </button>
                <Show when=move || open_menu.get() == Some(OpenMenu::Apps) fallback=|| ()>
                    <div class="global-menu-dropdown" role="menu">
                        <For
                            each=menu_apps
                            key=|app: &AppDescriptor| app.app_id.to_string()
                            let:app
                        >
                            {{
                                let app_id = app.app_id.clone();
                                view! {
                                    <button
                                        role="menuitem"
                                        class="global-menu-item"
                                        on:click=move |ev| {
                                            stop_mouse_event(&ev);
                                            open_menu.set(None);
                                            let bus = runtime.bus.get_value();
                                            bus.request_launch(LaunchRequest::new(app_id.clone()));
                                        }
                                    >
                                        {app.metadata.display_name.clone()}
                                    </button>
                                }
                            }}
                        </For>
                    </div>
                </Show>
            </div>
            <div class="global-menu">
                <button
                    role="menuitem"
                    aria-haspopup="true"
                    aria-expanded=move || (open_menu.get() == Some(OpenMenu::Windows)).to_string()
                    on:click=move |ev| {
                        stop_mouse_event(&ev);
                        toggle(OpenMenu::Windows);
                    }
                >
                    "Windows"
                </button>
                <Show when=move || open_menu.get() == Some(OpenMenu::Windows) fallback=|| ()>
                    <div class="global-menu-dropdown" role="menu">
                        <Show
                            when=move || window_entries.with(|entries| !entries.is_empty())
                            fallback=|| view! { <span class="global-menu-empty">"No open windows"</span> }
                        >
                            <For
                                each=move || window_entries.get()
                                key=|entry: &WindowMenuEntry| (entry.instance_id, entry.is_foreground)
                                let:entry
                            >
                                <button
                                    role="menuitemradio"
                                    class="global-menu-item"
                                    aria-checked=entry.is_foreground.to_string()
                                    on:click=move |ev| {
                                        stop_mouse_event(&ev);
                                        open_menu.set(None);
                                        runtime.bring_instance_to_foreground(entry.instance_id);
                                    }
                                >
                                    {entry.label.clone()}
                                </button>
                            </For>
                        </Show>
                        <Show when=move || foreground_app.with(Option::is_some) fallback=|| ()>
                            <div class="desktop-menu-separator" role="separator" aria-hidden="true"></div>
                            <button
                                role="menuitem"
                                class="global-menu-item"
                                on:click=move |ev| {
                                    stop_mouse_event(&ev);
                                    open_menu.set(None);
                                    if let Some(app_id) = foreground_app.get_untracked() {
                                        runtime.close_all_instances_of_app(&app_id);
                                    }
                                }
                            >
                                {move || {
                                    foreground_app
                                        .get()
                                        .map(|app_id| format!("Quit {}", app_title_by_id(&app_id)))
                                        .unwrap_or_default()
                                }}
                            </button>
                        </Show>
                    </div>
                </Show>
            </div>
        </nav>
    }
}
