//! Handoff from the monitor thread to the async side.
//!
//! The channel holds a single notification. While the consumer is busy the
//! monitor thread blocks here and stops reading the netlink socket, so the
//! backlog stays in the kernel's socket buffer instead of in process memory.

use tokio::sync::mpsc;

use gopro_domain::notification::DeviceNotification;

/// Capacity of the channel between the monitor thread and the subscriber.
pub(crate) const HANDOFF_CAPACITY: usize = 1;

/// Push notifications to the subscriber in order, blocking while the
/// channel is full.
///
/// Must be called from a plain OS thread, never from inside the runtime.
/// Returns `false` once the subscriber is gone.
pub(crate) fn forward(
    sender: &mpsc::Sender<DeviceNotification>,
    notifications: impl IntoIterator<Item = DeviceNotification>,
) -> bool {
    for notification in notifications {
        tracing::debug!(
            action = %notification.action,
            devpath = %notification.devpath,
            sequence_number = notification.sequence_number,
            "udev event"
        );
        if sender.blocking_send(notification).is_err() {
            return false;
        }
    }
    true
}
