//! Resolver: turns a classified notification into a camera identity.

use crate::camera::{Camera, GOPRO_IP};
use crate::error::ResolutionError;
use crate::hotplug::{HotplugEvent, HotplugKind};
use crate::id::CameraId;
use crate::notification::DeviceNotification;

/// Derive the [`Camera`] a notification refers to.
///
/// The id is the hex SHA-1 of the device path. The well-known camera address
/// is attached only when the action is a connect.
///
/// # Errors
///
/// Returns [`ResolutionError::EmptyDevicePath`] when the notification carries
/// no device path.
pub fn resolve(notification: &DeviceNotification) -> Result<Camera, ResolutionError> {
    if notification.devpath.is_empty() {
        return Err(ResolutionError::EmptyDevicePath);
    }

    let camera = Camera {
        id: CameraId::from_device_path(&notification.devpath),
        address: match HotplugKind::from_action(&notification.action) {
            Some(HotplugKind::Connected) => Some(GOPRO_IP),
            Some(HotplugKind::Disconnected) | None => None,
        },
    };
    Ok(camera)
}

/// Resolve a notification straight into a [`HotplugEvent`].
///
/// # Errors
///
/// Returns [`ResolutionError::UnsupportedAction`] when the action is neither
/// `add` nor `remove`, or any error from [`resolve`].
pub fn resolve_event(notification: &DeviceNotification) -> Result<HotplugEvent, ResolutionError> {
    let kind = HotplugKind::from_action(&notification.action)
        .ok_or_else(|| ResolutionError::UnsupportedAction(notification.action.clone()))?;
    let camera = resolve(notification)?;
    Ok(HotplugEvent::new(kind, camera))
}
