use desktop_app_contract::ApplicationId;
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct InstanceId(pub u64);

impl std::fmt::Display for InstanceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "instance-{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WindowPosition {
    pub x: i32,
    pub y: i32,
}

impl WindowPosition {
    pub fn offset(self, dx: i32, dy: i32) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WindowSize {
    pub width: i32,
    pub height: i32,
}

impl WindowSize {
    pub fn clamped_min(self, min_width: i32, min_height: i32) -> Self {
        Self {
            width: self.width.max(min_width),
            height: self.height.max(min_height),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppInstance {
    pub instance_id: InstanceId,
    pub app_id: ApplicationId,
    pub is_open: bool,
    pub is_foreground: bool,
    pub position: Option<WindowPosition>,
    pub size: Option<WindowSize>,
    pub initial_data: Value,
    pub title: Option<String>,
    /// Launch sequence number; larger means launched later.
    pub launched_at: u64,
}

/// Authoritative instance table. Only the reducer mutates it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InstanceTable {
    pub(crate) next_instance_id: u64,
    pub(crate) instances: Vec<AppInstance>,
    pub(crate) instance_order: Vec<InstanceId>,
}

impl Default for InstanceTable {
    fn default() -> Self {
        Self {
            next_instance_id: 1,
            instances: Vec::new(),
            instance_order: Vec::new(),
        }
    }
}

impl InstanceTable {
    /// Instances in launch order.
    pub fn instances(&self) -> &[AppInstance] {
        &self.instances
    }

    /// Z-stack, bottom first; the last element is topmost.
    pub fn instance_order(&self) -> &[InstanceId] {
        &self.instance_order
    }

    pub fn len(&self) -> usize {
        self.instances.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instances.is_empty()
    }

    pub fn get(&self, instance_id: InstanceId) -> Option<&AppInstance> {
        self.instances
            .iter()
            .find(|instance| instance.instance_id == instance_id)
    }

    pub fn contains(&self, instance_id: InstanceId) -> bool {
        self.get(instance_id).is_some()
    }

    /// Id the next launch will receive.
    pub fn peek_next_id(&self) -> InstanceId {
        InstanceId(self.next_instance_id)
    }

    pub fn foreground_id(&self) -> Option<InstanceId> {
        self.foreground_instance().map(|instance| instance.instance_id)
    }

    pub fn foreground_instance(&self) -> Option<&AppInstance> {
        self.instances.iter().find(|instance| instance.is_foreground)
    }

    /// Ids of `app_id`'s instances, bottom of the stack first.
    pub fn instances_of_app(&self, app_id: &ApplicationId) -> Vec<InstanceId> {
        self.instance_order
            .iter()
            .copied()
            .filter(|id| {
                self.get(*id)
                    .map(|instance| instance.app_id == *app_id)
                    .unwrap_or(false)
            })
            .collect()
    }

    pub(crate) fn get_mut(&mut self, instance_id: InstanceId) -> Option<&mut AppInstance> {
        self.instances
            .iter_mut()
            .find(|instance| instance.instance_id == instance_id)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LaunchOptions {
    pub app_id: ApplicationId,
    pub initial_data: Value,
    pub title: Option<String>,
    pub position: Option<WindowPosition>,
    pub size: Option<WindowSize>,
}

impl LaunchOptions {
    pub fn new(app_id: ApplicationId) -> Self {
        Self {
            app_id,
            initial_data: Value::Null,
            title: None,
            position: None,
            size: None,
        }
    }

    pub fn with_initial_data(mut self, initial_data: Value) -> Self {
        self.initial_data = initial_data;
        self
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_position(mut self, position: WindowPosition) -> Self {
        self.position = Some(position);
        self
    }

    pub fn with_size(mut self, size: WindowSize) -> Self {
        self.size = Some(size);
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DesktopSkin {
    #[default]
    ClassicMac,
    MacOsX,
    Windows98,
    WindowsXp,
}

impl DesktopSkin {
    pub const fn css_id(self) -> &'static str {
        match self {
            Self::ClassicMac => "classic-mac",
            Self::MacOsX => "mac-os-x",
            Self::Windows98 => "windows-98",
            Self::WindowsXp => "windows-xp",
        }
    }

    /// Skins that keep window chrome in a persistent taskbar strip.
    pub const fn is_chrome_in_taskbar(self) -> bool {
        matches!(self, Self::Windows98 | Self::WindowsXp)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PointerPosition {
    pub x: i32,
    pub y: i32,
}

/// In-progress titlebar drag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DragSession {
    pub instance_id: InstanceId,
    pub pointer_start: PointerPosition,
    pub origin: WindowPosition,
}

impl DragSession {
    pub fn position_for(&self, pointer: PointerPosition) -> WindowPosition {
        self.origin.offset(
            pointer.x - self.pointer_start.x,
            pointer.y - self.pointer_start.y,
        )
    }
}

/// In-progress bottom-right corner resize.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResizeSession {
    pub instance_id: InstanceId,
    pub pointer_start: PointerPosition,
    pub origin: WindowSize,
}

impl ResizeSession {
    pub fn size_for(&self, pointer: PointerPosition) -> WindowSize {
        WindowSize {
            width: self.origin.width + pointer.x - self.pointer_start.x,
            height: self.origin.height + pointer.y - self.pointer_start.y,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InteractionState {
    pub dragging: Option<DragSession>,
    pub resizing: Option<ResizeSession>,
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn drag_offsets_origin_by_pointer_delta() {
        let drag = DragSession {
            instance_id: InstanceId(1),
            pointer_start: PointerPosition { x: 100, y: 100 },
            origin: WindowPosition { x: 40, y: 60 },
        };
        assert_eq!(
            drag.position_for(PointerPosition { x: 130, y: 90 }),
            WindowPosition { x: 70, y: 50 }
        );
    }

    #[test]
    fn resize_grows_from_origin_and_clamps_separately() {
        let resize = ResizeSession {
            instance_id: InstanceId(1),
            pointer_start: PointerPosition { x: 0, y: 0 },
            origin: WindowSize {
                width: 300,
                height: 200,
            },
        };
        let size = resize.size_for(PointerPosition { x: -200, y: 50 });
        assert_eq!(
            size,
            WindowSize {
                width: 100,
                height: 250
            }
        );
        assert_eq!(
            size.clamped_min(220, 140),
            WindowSize {
                width: 220,
                height: 250
            }
        );
    }

    #[test]
    fn instance_ids_display_with_prefix() {
        assert_eq!(InstanceId(12).to_string(), "instance-12");
    }

    #[test]
    fn only_windows_skins_keep_chrome_in_taskbar() {
        assert!(DesktopSkin::Windows98.is_chrome_in_taskbar());
        assert!(DesktopSkin::WindowsXp.is_chrome_in_taskbar());
        assert!(!DesktopSkin::ClassicMac.is_chrome_in_taskbar());
        assert!(!DesktopSkin::MacOsX.is_chrome_in_taskbar());
    }
}
