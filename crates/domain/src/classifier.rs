//! Classifier: decides whether a bus notification concerns a supported
//! camera transition we care about.
//!
//! Three independent, pure checks:
//!
//! | Check | Passes when |
//! |-------|-------------|
//! | [`is_supported_camera`] | vendor is GoPro and the model is allow-listed |
//! | [`is_relevant_subsystem`] | the device sits on the `net` subsystem |
//! | [`is_interesting_action`] | the action maps to a kind in the filter |
//!
//! [`EventFilter::accepts`] requires all three.

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::hotplug::HotplugKind;
use crate::notification::DeviceNotification;

/// USB vendor id assigned to GoPro.
pub const GOPRO_VENDOR_ID: &str = "2672";

/// HERO8 Black running the webcam firmware, which enumerates as a
/// CDC-Ethernet modem.
pub const HERO8_BLACK_WEBCAM_MODEL_ID: &str = "0050";

/// Models the pipeline knows how to drive.
///
/// The HERO8 Black with stock firmware (`0049`) shows up as mass storage and
/// has no webcam endpoint, so it is deliberately absent.
pub const SUPPORTED_MODEL_IDS: &[&str] = &[HERO8_BLACK_WEBCAM_MODEL_ID];

/// Subsystem of network-class devices.
pub const NETWORK_SUBSYSTEM: &str = "net";

/// Whether the notification describes an allow-listed GoPro.
#[must_use]
pub fn is_supported_camera(notification: &DeviceNotification) -> bool {
    if notification.vendor_id() != Some(GOPRO_VENDOR_ID) {
        return false;
    }
    notification
        .model_id()
        .is_some_and(|model| SUPPORTED_MODEL_IDS.contains(&model))
}

/// Whether the notification is for the network-class device of the camera
/// (it also shows up on `usb`, `tty`, … which we ignore).
#[must_use]
pub fn is_relevant_subsystem(notification: &DeviceNotification) -> bool {
    notification.subsystem.as_deref() == Some(NETWORK_SUBSYSTEM)
}

/// Whether the notification's action maps to a kind in `filter`.
#[must_use]
pub fn is_interesting_action(notification: &DeviceNotification, filter: &EventFilter) -> bool {
    HotplugKind::from_action(&notification.action).is_some_and(|kind| filter.contains(kind))
}

/// The set of event kinds a monitor reports.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<HotplugKind>", into = "Vec<HotplugKind>")]
pub struct EventFilter {
    kinds: Vec<HotplugKind>,
}

impl EventFilter {
    /// Build a filter for the given kinds. Duplicates are collapsed.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::EmptyFilter`] when `kinds` is empty, since
    /// such a filter would silently drop every notification.
    pub fn new(kinds: impl IntoIterator<Item = HotplugKind>) -> Result<Self, ValidationError> {
        let mut collected = Vec::new();
        for kind in kinds {
            if !collected.contains(&kind) {
                collected.push(kind);
            }
        }
        if collected.is_empty() {
            return Err(ValidationError::EmptyFilter);
        }
        Ok(Self { kinds: collected })
    }

    #[must_use]
    pub fn contains(&self, kind: HotplugKind) -> bool {
        self.kinds.contains(&kind)
    }

    #[must_use]
    pub fn kinds(&self) -> &[HotplugKind] {
        &self.kinds
    }

    /// Run all three checks. Returns the kind when the notification passes.
    #[must_use]
    pub fn classify(&self, notification: &DeviceNotification) -> Option<HotplugKind> {
        if !is_supported_camera(notification) || !is_relevant_subsystem(notification) {
            return None;
        }
        HotplugKind::from_action(&notification.action).filter(|kind| self.contains(*kind))
    }

    /// Whether the notification passes all three checks.
    #[must_use]
    pub fn accepts(&self, notification: &DeviceNotification) -> bool {
        self.classify(notification).is_some()
    }
}

impl Default for EventFilter {
    fn default() -> Self {
        Self {
            kinds: HotplugKind::ALL.to_vec(),
        }
    }
}

impl TryFrom<Vec<HotplugKind>> for EventFilter {
    type Error = ValidationError;

    fn try_from(kinds: Vec<HotplugKind>) -> Result<Self, Self::Error> {
        Self::new(kinds)
    }
}

impl From<EventFilter> for Vec<HotplugKind> {
    fn from(filter: EventFilter) -> Self {
        filter.kinds
    }
}
