//! Desktop shell UI composition and interaction surfaces.

mod desktop_surface;
mod menu_bar;
mod window;

use leptos::*;

use self::{desktop_surface::DesktopSurface, menu_bar::GlobalMenuBar, window::DesktopWindow};

use crate::{
    model::PointerPosition,
    window_manager::{plan_windows, should_show_global_menu, WindowPlan},
};

pub use crate::runtime_context::{use_desktop_runtime, DesktopProvider, DesktopRuntimeContext};

#[component]
/// Renders the desktop surface, the global menu bar, and one window per open instance.
pub fn DesktopShell() -> impl IntoView {
    let runtime = use_desktop_runtime();
    let registry = runtime.registry;
    let base_z_index = runtime.config.with_value(|config| config.base_z_index);
    let skin = runtime.config.with_value(|config| config.skin);

    let plans = create_memo(move |_| {
        runtime
            .instances
            .with(|table| plan_windows(table, registry, base_z_index))
    });
    let show_menu = Signal::derive(move || {
        let has_foreground = runtime
            .instances
            .with(|table| table.foreground_id().is_some());
        should_show_global_menu(skin, has_foreground)
    });

    let pointer_move_listener = window_event_listener(ev::pointermove, move |ev| {
        let interaction = runtime.interaction.get_untracked();
        let pointer = pointer_from_pointer_event(&ev);
        if let Some(drag) = interaction.dragging {
            runtime.set_instance_position(drag.instance_id, drag.position_for(pointer));
        } else if let Some(resize) = interaction.resizing {
            runtime.set_instance_size(resize.instance_id, resize.size_for(pointer));
        }
    });
    let pointer_up_listener = window_event_listener(ev::pointerup, move |_| {
        end_active_pointer_interaction(runtime);
    });
    let pointer_cancel_listener = window_event_listener(ev::pointercancel, move |_| {
        end_active_pointer_interaction(runtime);
    });
    on_cleanup(move || {
        pointer_move_listener.remove();
        pointer_up_listener.remove();
        pointer_cancel_listener.remove();
    });

    view! {
        <div
            id="desktop-shell-root"
            class=format!("desktop-shell skin-{}", skin.css_id())
            data-skin=skin.css_id()
        >
            <Show when=move || show_menu.get() fallback=|| ()>
                <GlobalMenuBar plans=plans />
            </Show>
            <DesktopSurface />
            <div class="desktop-window-layer">
                <For
                    each=move || plans.get()
                    key=|plan: &WindowPlan| plan.instance.instance_id
                    children=move |plan: WindowPlan| {
                        view! { <DesktopWindow instance_id=plan.instance.instance_id plans=plans /> }
                    }
                />
            </div>
        </div>
    }
}

fn stop_mouse_event(ev: &web_sys::MouseEvent) {
    ev.prevent_default();
    ev.stop_propagation();
}

fn pointer_from_pointer_event(ev: &web_sys::PointerEvent) -> PointerPosition {
    PointerPosition {
        x: ev.client_x(),
        y: ev.client_y(),
    }
}

fn end_active_pointer_interaction(runtime: DesktopRuntimeContext) {
    let interaction = runtime.interaction.get_untracked();
    if interaction.dragging.is_some() || interaction.resizing.is_some() {
        runtime.interaction.set(Default::default());
    }
}
