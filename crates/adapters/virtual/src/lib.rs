//! # gopro-adapter-virtual
//!
//! Virtual bus that feeds simulated device notifications to the hotplug
//! monitor, for tests and hardware-less demos.
//!
//! ## Usage
//!
//! | Call | Notification produced |
//! |------|-----------------------|
//! | `handle.plug(devpath)` | `add` on `net`, vendor `2672`, model `0050` |
//! | `handle.unplug(devpath)` | `remove` on `net`, vendor `2672`, model `0050` |
//! | `handle.inject(notification)` | the notification as given |
//!
//! ## Dependency rule
//!
//! Depends on `gopro-app` (port traits) and `gopro-domain` only.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use tokio::sync::mpsc;
use tokio_stream::wrappers::UnboundedReceiverStream;

use gopro_app::CancellationToken;
use gopro_app::ports::{BusEventSource, SubscriptionError};
use gopro_domain::classifier::{GOPRO_VENDOR_ID, HERO8_BLACK_WEBCAM_MODEL_ID, NETWORK_SUBSYSTEM};
use gopro_domain::hotplug::{ACTION_ADD, ACTION_REMOVE};
use gopro_domain::notification::DeviceNotification;

/// Errors raised by the virtual bus handle.
#[derive(Debug, thiserror::Error)]
pub enum VirtualBusError {
    /// The bus (or its subscription) has been dropped.
    #[error("virtual bus is closed")]
    Closed,
}

/// Create a connected bus/handle pair.
#[must_use]
pub fn channel() -> (VirtualBus, VirtualBusHandle) {
    let (sender, receiver) = mpsc::unbounded_channel();
    let bus = VirtualBus {
        receiver: Mutex::new(Some(receiver)),
    };
    let handle = VirtualBusHandle {
        sender,
        sequence: Arc::new(AtomicU64::new(0)),
    };
    (bus, handle)
}

/// Single-consumer [`BusEventSource`] backed by an in-process channel.
#[derive(Debug)]
pub struct VirtualBus {
    receiver: Mutex<Option<mpsc::UnboundedReceiver<DeviceNotification>>>,
}

impl BusEventSource for VirtualBus {
    type Subscription = UnboundedReceiverStream<DeviceNotification>;

    /// Hand out the feed. Notifications keep flowing until every handle is
    /// dropped; cancellation is left to the consumer.
    async fn subscribe(
        &self,
        _cancel: CancellationToken,
    ) -> Result<Self::Subscription, SubscriptionError> {
        let receiver = self
            .receiver
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
            .ok_or(SubscriptionError::AlreadySubscribed)?;
        tracing::debug!("virtual bus subscribed");
        Ok(UnboundedReceiverStream::new(receiver))
    }
}

/// Producer side of a [`VirtualBus`]. Cheap to clone.
#[derive(Debug, Clone)]
pub struct VirtualBusHandle {
    sender: mpsc::UnboundedSender<DeviceNotification>,
    sequence: Arc<AtomicU64>,
}

impl VirtualBusHandle {
    /// Emit a raw notification as-is.
    ///
    /// # Errors
    ///
    /// Returns [`VirtualBusError::Closed`] if the bus has been dropped.
    pub fn inject(&self, notification: DeviceNotification) -> Result<(), VirtualBusError> {
        tracing::debug!(
            action = %notification.action,
            devpath = %notification.devpath,
            sequence_number = notification.sequence_number,
            "injecting notification"
        );
        self.sender
            .send(notification)
            .map_err(|_| VirtualBusError::Closed)
    }

    /// Simulate a HERO8 Black in webcam mode being attached at `devpath`.
    ///
    /// # Errors
    ///
    /// Returns [`VirtualBusError::Closed`] if the bus has been dropped.
    pub fn plug(&self, devpath: &str) -> Result<(), VirtualBusError> {
        self.inject(self.camera_notification(ACTION_ADD, devpath))
    }

    /// Simulate the camera at `devpath` being detached.
    ///
    /// # Errors
    ///
    /// Returns [`VirtualBusError::Closed`] if the bus has been dropped.
    pub fn unplug(&self, devpath: &str) -> Result<(), VirtualBusError> {
        self.inject(self.camera_notification(ACTION_REMOVE, devpath))
    }

    /// Whether the bus side is gone.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.sender.is_closed()
    }

    fn camera_notification(&self, action: &str, devpath: &str) -> DeviceNotification {
        DeviceNotification::builder()
            .action(action)
            .subsystem(NETWORK_SUBSYSTEM)
            .devpath(devpath)
            .sequence_number(self.sequence.fetch_add(1, Ordering::Relaxed) + 1)
            .vendor_id(GOPRO_VENDOR_ID)
            .model_id(HERO8_BLACK_WEBCAM_MODEL_ID)
            .build()
    }
}

#[cfg(test)]
mod tests {
    use tokio_stream::StreamExt;

    use super::*;

    const DEVPATH: &str = "/devices/pci0000:00/0000:00:14.0/usb1/1-2/1-2:1.0/net/usb0";

    #[tokio::test]
    async fn should_deliver_plugged_camera_notification() {
        let (bus, handle) = channel();
        let mut feed = bus.subscribe(CancellationToken::new()).await.unwrap();

        handle.plug(DEVPATH).unwrap();

        let notification = feed.next().await.unwrap();
        assert_eq!(notification.action, "add");
        assert_eq!(notification.subsystem.as_deref(), Some("net"));
        assert_eq!(notification.devpath, DEVPATH);
        assert_eq!(notification.vendor_id(), Some("2672"));
        assert_eq!(notification.model_id(), Some("0050"));
    }

    #[tokio::test]
    async fn should_deliver_remove_when_unplugged() {
        let (bus, handle) = channel();
        let mut feed = bus.subscribe(CancellationToken::new()).await.unwrap();

        handle.unplug(DEVPATH).unwrap();

        let notification = feed.next().await.unwrap();
        assert_eq!(notification.action, "remove");
        assert_eq!(notification.devpath, DEVPATH);
    }

    #[tokio::test]
    async fn should_number_notifications_in_order() {
        let (bus, handle) = channel();
        let mut feed = bus.subscribe(CancellationToken::new()).await.unwrap();

        handle.plug(DEVPATH).unwrap();
        handle.clone().unplug(DEVPATH).unwrap();

        let first = feed.next().await.unwrap();
        let second = feed.next().await.unwrap();
        assert_eq!(first.sequence_number, 1);
        assert_eq!(second.sequence_number, 2);
    }

    #[tokio::test]
    async fn should_pass_injected_notification_through_unchanged() {
        let (bus, handle) = channel();
        let mut feed = bus.subscribe(CancellationToken::new()).await.unwrap();
        let notification = DeviceNotification::builder()
            .action("change")
            .subsystem("usb")
            .devpath("/devices/other")
            .sequence_number(42)
            .vendor_id("046d")
            .build();

        handle.inject(notification.clone()).unwrap();

        assert_eq!(feed.next().await.unwrap(), notification);
    }

    #[tokio::test]
    async fn should_refuse_second_subscription() {
        let (bus, _handle) = channel();
        let _feed = bus.subscribe(CancellationToken::new()).await.unwrap();

        let result = bus.subscribe(CancellationToken::new()).await;

        assert!(matches!(result, Err(SubscriptionError::AlreadySubscribed)));
    }

    #[tokio::test]
    async fn should_end_feed_when_all_handles_dropped() {
        let (bus, handle) = channel();
        let mut feed = bus.subscribe(CancellationToken::new()).await.unwrap();

        handle.plug(DEVPATH).unwrap();
        drop(handle);

        assert!(feed.next().await.is_some());
        assert!(feed.next().await.is_none());
    }

    #[test]
    fn should_report_closed_when_bus_dropped() {
        let (bus, handle) = channel();
        drop(bus);

        assert!(handle.is_closed());
        assert!(matches!(
            handle.plug(DEVPATH),
            Err(VirtualBusError::Closed)
        ));
    }
}
