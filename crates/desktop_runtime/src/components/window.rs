use super::*;
use crate::{
    app_runtime::ensure_instance_session,
    model::{DragSession, InstanceId, InteractionState, ResizeSession, WindowPosition, WindowSize},
    window_manager::{focus_on_pointer_down, WindowCallbacks},
};
use desktop_app_contract::{AppHost, AppMountContext};
#[cfg(target_arch = "wasm32")]
use wasm_bindgen::JsCast;

#[cfg(target_arch = "wasm32")]
fn try_set_pointer_capture(ev: &web_sys::PointerEvent) {
    if let Some(target) = ev.current_target() {
        if let Ok(element) = target.dyn_into::<web_sys::Element>() {
            let _ = element.set_pointer_capture(ev.pointer_id());
        }
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn try_set_pointer_capture(_: &web_sys::PointerEvent) {}

fn is_primary_press(ev: &web_sys::PointerEvent) -> bool {
    if ev.pointer_type() == "mouse" {
        ev.button() == 0
    } else {
        ev.is_primary()
    }
}

/// Capture-phase `pointerdown` listener; removed when dropped.
#[cfg(target_arch = "wasm32")]
struct CaptureFocusListener {
    target: web_sys::EventTarget,
    handler: wasm_bindgen::closure::Closure<dyn FnMut(web_sys::PointerEvent)>,
}

#[cfg(target_arch = "wasm32")]
impl Drop for CaptureFocusListener {
    fn drop(&mut self) {
        let _ = self.target.remove_event_listener_with_callback_and_bool(
            "pointerdown",
            self.handler.as_ref().unchecked_ref(),
            true,
        );
    }
}

// Focus must land before any handler inside the window runs, so it listens in the capture phase.
#[cfg(target_arch = "wasm32")]
fn install_capture_focus(
    node_ref: NodeRef<html::Section>,
    runtime: DesktopRuntimeContext,
    instance_id: InstanceId,
) {
    let slot = store_value(None::<CaptureFocusListener>);
    node_ref.on_load(move |section| {
        let target: web_sys::EventTarget = AsRef::<web_sys::EventTarget>::as_ref(&*section).clone();
        let handler = wasm_bindgen::closure::Closure::<dyn FnMut(web_sys::PointerEvent)>::new(
            move |_: web_sys::PointerEvent| {
                focus_on_pointer_down(runtime, instance_id);
            },
        );
        if let Err(err) = target.add_event_listener_with_callback_and_bool(
            "pointerdown",
            handler.as_ref().unchecked_ref(),
            true,
        ) {
            logging::warn!("capture focus listener for {instance_id} failed: {err:?}");
            return;
        }
        slot.set_value(Some(CaptureFocusListener { target, handler }));
    });
}

#[cfg(not(target_arch = "wasm32"))]
fn install_capture_focus(
    _: NodeRef<html::Section>,
    _: DesktopRuntimeContext,
    _: InstanceId,
) {
}

#[component]
pub(super) fn DesktopWindow(instance_id: InstanceId, plans: Memo<Vec<WindowPlan>>) -> impl IntoView {
    let runtime = use_desktop_runtime();
    let callbacks = WindowCallbacks::for_instance(runtime, instance_id);
    let node_ref = create_node_ref::<html::Section>();

    let plan = create_memo(move |_| {
        plans.with(|plans| {
            plans
                .iter()
                .find(|plan| plan.instance.instance_id == instance_id)
                .cloned()
        })
    });
    let Some(initial) = plan.get_untracked() else {
        return ().into_view();
    };
    install_capture_focus(node_ref, runtime, instance_id);

    let descriptor = initial.descriptor.clone();
    let fallback_size = WindowSize {
        width: descriptor.window_defaults.width,
        height: descriptor.window_defaults.height,
    };
    let resizable = descriptor.window_constraints.resizable;
    let has_siblings = Signal::derive(move || plans.with(|plans| plans.len() > 1));
    let position = move || {
        plan.with(|plan| plan.as_ref().and_then(|plan| plan.instance.position))
            .unwrap_or(WindowPosition { x: 0, y: 0 })
    };
    let size = move || {
        plan.with(|plan| plan.as_ref().and_then(|plan| plan.instance.size))
            .unwrap_or(fallback_size)
    };
    let title = move || {
        plan.with(|plan| plan.as_ref().map(|plan| plan.title.clone()))
            .unwrap_or_default()
    };
    let style = move || {
        let position = position();
        let size = size();
        let z_index = plan.with(|plan| plan.as_ref().map(|plan| plan.z_index).unwrap_or_default());
        format!(
            "left:{}px;top:{}px;width:{}px;height:{}px;z-index:{z_index};",
            position.x, position.y, size.width, size.height
        )
    };
    let is_focused =
        move || plan.with(|plan| plan.as_ref().is_some_and(|plan| plan.instance.is_foreground));

    let begin_move = move |ev: web_sys::PointerEvent| {
        if !is_primary_press(&ev) {
            return;
        }
        try_set_pointer_capture(&ev);
        ev.prevent_default();
        runtime.interaction.set(InteractionState {
            dragging: Some(DragSession {
                instance_id,
                pointer_start: pointer_from_pointer_event(&ev),
                origin: untrack(position),
            }),
            resizing: None,
        });
    };
    let begin_resize = move |ev: web_sys::PointerEvent| {
        if !is_primary_press(&ev) {
            return;
        }
        try_set_pointer_capture(&ev);
        ev.prevent_default();
        ev.stop_propagation();
        runtime.interaction.set(InteractionState {
            dragging: None,
            resizing: Some(ResizeSession {
                instance_id,
                pointer_start: pointer_from_pointer_event(&ev),
                origin: untrack(size),
            }),
        });
    };
    // Arrow keys move the window; with Alt they resize it.
    let on_titlebar_keydown = move |ev: web_sys::KeyboardEvent| {
        let step = if ev.shift_key() { 32 } else { 8 };
        let (dx, dy) = match ev.key().as_str() {
            "ArrowLeft" => (-step, 0),
            "ArrowRight" => (step, 0),
            "ArrowUp" => (0, -step),
            "ArrowDown" => (0, step),
            _ => return,
        };
        ev.prevent_default();
        if ev.alt_key() {
            if !resizable {
                return;
            }
            let current = untrack(size);
            callbacks.on_resize.call(WindowSize {
                width: current.width + dx,
                height: current.height + dy,
            });
        } else {
            callbacks.on_move.call(untrack(position).offset(dx, dy));
        }
    };
    let swallow_pointer = |ev: web_sys::PointerEvent| ev.stop_propagation();

    view! {
        <section
            node_ref=node_ref
            class="desktop-window"
            class:focused=is_focused
            style=style
            role="dialog"
            aria-label=title
            data-instance-id=instance_id.to_string()
            data-app-id=descriptor.app_id.to_string()
            on:focusin=move |_| {
                if !untrack(is_focused) {
                    callbacks.on_focus.call(());
                }
            }
        >
            <header
                class="titlebar"
                tabindex="0"
                on:pointerdown=begin_move
                on:keydown=on_titlebar_keydown
            >
                <div class="titlebar-title">
                    <span
                        class=format!("titlebar-app-icon icon-{}", descriptor.metadata.icon)
                        aria-hidden="true"
                    ></span>
                    <span>{title}</span>
                </div>
                <div class="titlebar-controls">
                    <Show when=move || has_siblings.get() fallback=|| ()>
                        <button
                            aria-label="Previous window"
                            on:pointerdown=swallow_pointer
                            on:click=move |ev| {
                                stop_mouse_event(&ev);
                                callbacks.on_navigate_previous.call(());
                            }
                        >
                            "<"
                        </button>
                        <button
                            aria-label="Next window"
                            on:pointerdown=swallow_pointer
                            on:click=move |ev| {
                                stop_mouse_event(&ev);
                                callbacks.on_navigate_next.call(());
                            }
                        >
                            ">"
                        </button>
                    </Show>
                    <button
                        aria-label="Close window"
                        on:pointerdown=swallow_pointer
                        on:click=move |ev| {
                            stop_mouse_event(&ev);
                            callbacks.on_close.call(());
                        }
                    >
                        "x"
                    </button>
                </div>
            </header>
            <div class="window-body">
                <WindowBody instance_id=instance_id />
            </div>
            <Show when=move || resizable fallback=|| ()>
                <div
                    class="window-resize-handle south-east"
                    aria-hidden="true"
                    on:pointerdown=begin_resize
                />
            </Show>
        </section>
    }
    .into_view()
}

#[component]
fn WindowBody(instance_id: InstanceId) -> impl IntoView {
    let runtime = use_desktop_runtime();
    let session = ensure_instance_session(runtime.app_runtime, instance_id);
    let command_sender = Callback::new(move |command| {
        runtime.handle_app_command(instance_id, command);
    });
    let host = AppHost::new(command_sender);
    let contents = runtime
        .instances
        .with_untracked(|table| table.get(instance_id).cloned())
        .and_then(|instance| {
            let descriptor = runtime.registry.get(&instance.app_id)?;
            Some(descriptor.module.mount(AppMountContext {
                app_id: instance.app_id.clone(),
                instance_id: instance.instance_id.0,
                initial_data: instance.initial_data.clone(),
                lifecycle: session.lifecycle.read_only(),
                updates: session.updates,
                host,
            }))
        })
        .unwrap_or_else(|| view! { <p>"Closed"</p> }.into_view());

    view! {
        <div class="window-body-content">
            {contents}
        </div>
    }
}
