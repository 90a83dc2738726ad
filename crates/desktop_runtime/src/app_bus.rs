//! Typed launch and update channels shared by the desktop surface, apps, and window manager.
//!
//! Listeners run synchronously in subscription order. The listener list is snapshotted before
//! each dispatch, so handlers may publish or subscribe re-entrantly.

use std::{
    cell::{Cell, RefCell},
    rc::{Rc, Weak},
};

use desktop_app_contract::{AppUpdate, LaunchRequest, Subscription};

type Listener<T> = Rc<dyn Fn(&T)>;

struct Channel<T> {
    next_listener_id: Cell<u64>,
    listeners: RefCell<Vec<(u64, Listener<T>)>>,
}

impl<T: 'static> Channel<T> {
    fn new() -> Self {
        Self {
            next_listener_id: Cell::new(1),
            listeners: RefCell::new(Vec::new()),
        }
    }

    fn subscribe(self: &Rc<Self>, listener: Listener<T>) -> Subscription {
        let listener_id = self.next_listener_id.get();
        self.next_listener_id.set(listener_id + 1);
        self.listeners.borrow_mut().push((listener_id, listener));

        let channel: Weak<Self> = Rc::downgrade(self);
        Subscription::new(Rc::new(move || {
            if let Some(channel) = channel.upgrade() {
                channel
                    .listeners
                    .borrow_mut()
                    .retain(|(id, _)| *id != listener_id);
            }
        }))
    }

    fn publish(&self, payload: &T) {
        let snapshot: Vec<Listener<T>> = self
            .listeners
            .borrow()
            .iter()
            .map(|(_, listener)| Rc::clone(listener))
            .collect();
        for listener in snapshot {
            listener(payload);
        }
    }

    fn len(&self) -> usize {
        self.listeners.borrow().len()
    }
}

/// Shared handle to the desktop launch and update channels.
///
/// Cloning shares the underlying channels.
#[derive(Clone)]
pub struct DesktopEventBus {
    launch: Rc<Channel<LaunchRequest>>,
    updates: Rc<Channel<AppUpdate>>,
}

impl Default for DesktopEventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl DesktopEventBus {
    /// Creates a bus with no listeners.
    pub fn new() -> Self {
        Self {
            launch: Rc::new(Channel::new()),
            updates: Rc::new(Channel::new()),
        }
    }

    /// Delivers a launch request to every launch listener.
    pub fn request_launch(&self, request: LaunchRequest) {
        self.launch.publish(&request);
    }

    /// Registers a launch listener until the returned handle is dropped.
    pub fn subscribe_launch(&self, listener: impl Fn(&LaunchRequest) + 'static) -> Subscription {
        self.launch.subscribe(Rc::new(listener))
    }

    /// Delivers an update signal to every update listener.
    pub fn publish_update(&self, update: AppUpdate) {
        self.updates.publish(&update);
    }

    /// Registers an update listener until the returned handle is dropped.
    pub fn subscribe_updates(&self, listener: impl Fn(&AppUpdate) + 'static) -> Subscription {
        self.updates.subscribe(Rc::new(listener))
    }

    /// Number of active launch listeners.
    pub fn launch_listener_count(&self) -> usize {
        self.launch.len()
    }

    /// Number of active update listeners.
    pub fn update_listener_count(&self) -> usize {
        self.updates.len()
    }
}

impl std::fmt::Debug for DesktopEventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DesktopEventBus")
            .field("launch_listeners", &self.launch_listener_count())
            .field("update_listeners", &self.update_listener_count())
            .finish()
    }
}
