//! Hotplug events: typed attach/detach records for supported cameras.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::camera::Camera;

/// Kernel action reported when a device appears.
pub const ACTION_ADD: &str = "add";

/// Kernel action reported when a device goes away.
pub const ACTION_REMOVE: &str = "remove";

/// What happened to the camera.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HotplugKind {
    Connected,
    Disconnected,
}

impl HotplugKind {
    /// Every kind, in declaration order.
    pub const ALL: [Self; 2] = [Self::Connected, Self::Disconnected];

    /// Map a kernel action string onto a hotplug kind.
    ///
    /// Returns `None` for every action other than `add` and `remove`; such
    /// notifications never match a filter.
    #[must_use]
    pub fn from_action(action: &str) -> Option<Self> {
        match action {
            ACTION_ADD => Some(Self::Connected),
            ACTION_REMOVE => Some(Self::Disconnected),
            _ => None,
        }
    }
}

impl std::fmt::Display for HotplugKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Connected => f.write_str("connected"),
            Self::Disconnected => f.write_str("disconnected"),
        }
    }
}

/// A supported camera was attached or detached.
///
/// Immutable once constructed and consumed exactly once by the reader of the
/// event stream.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HotplugEvent {
    pub kind: HotplugKind,
    pub camera: Camera,
    pub observed_at: DateTime<Utc>,
}

impl HotplugEvent {
    /// Create an event stamped with the current time.
    #[must_use]
    pub fn new(kind: HotplugKind, camera: Camera) -> Self {
        Self {
            kind,
            camera,
            observed_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::id::CameraId;

    #[test]
    fn should_map_add_to_connected() {
        assert_eq!(HotplugKind::from_action("add"), Some(HotplugKind::Connected));
    }

    #[test]
    fn should_map_remove_to_disconnected() {
        assert_eq!(
            HotplugKind::from_action("remove"),
            Some(HotplugKind::Disconnected)
        );
    }

    #[test]
    fn should_not_map_other_actions() {
        for action in ["change", "bind", "unbind", "move", "online", "", "ADD"] {
            assert_eq!(HotplugKind::from_action(action), None, "action {action:?}");
        }
    }

    #[test]
    fn should_display_snake_case_name() {
        assert_eq!(HotplugKind::Connected.to_string(), "connected");
        assert_eq!(HotplugKind::Disconnected.to_string(), "disconnected");
    }

    #[test]
    fn should_stamp_event_with_current_time() {
        let camera = Camera::builder()
            .id(CameraId::from_device_path("/devices/usb1/1-2"))
            .build()
            .unwrap();
        let before = Utc::now();
        let event = HotplugEvent::new(HotplugKind::Disconnected, camera);
        assert!(event.observed_at >= before);
        assert_eq!(event.kind, HotplugKind::Disconnected);
    }

    #[test]
    fn should_serialize_kind_as_snake_case() {
        let json = serde_json::to_string(&HotplugKind::Connected).unwrap();
        assert_eq!(json, "\"connected\"");
    }
}
