//! Raw device-change notifications as reported by the hardware bus.
//!
//! A [`DeviceNotification`] is an owned snapshot of one bus record. Bus
//! sources produce them; the classifier and resolver only ever read them.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Property carrying the USB vendor id (hex, no prefix).
pub const PROPERTY_VENDOR_ID: &str = "ID_VENDOR_ID";

/// Property carrying the USB model/product id (hex, no prefix).
pub const PROPERTY_MODEL_ID: &str = "ID_MODEL_ID";

/// One device-change record from the bus.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DeviceNotification {
    /// Kernel action (`add`, `remove`, `change`, `bind`, …).
    pub action: String,
    pub subsystem: Option<String>,
    /// Sysfs device path, e.g. `/devices/pci0000:00/usb1/1-2`.
    pub devpath: String,
    /// Bus sequence number; increases monotonically per boot.
    pub sequence_number: u64,
    pub properties: HashMap<String, String>,
}

impl DeviceNotification {
    /// Create a builder for constructing a [`DeviceNotification`].
    #[must_use]
    pub fn builder() -> DeviceNotificationBuilder {
        DeviceNotificationBuilder::default()
    }

    /// Look up a bus property by name.
    #[must_use]
    pub fn property(&self, name: &str) -> Option<&str> {
        self.properties.get(name).map(String::as_str)
    }

    #[must_use]
    pub fn vendor_id(&self) -> Option<&str> {
        self.property(PROPERTY_VENDOR_ID)
    }

    #[must_use]
    pub fn model_id(&self) -> Option<&str> {
        self.property(PROPERTY_MODEL_ID)
    }
}

/// Step-by-step builder for [`DeviceNotification`].
///
/// Every field is optional: bus records are taken as they come, so there is
/// nothing to validate here.
#[derive(Debug, Default)]
pub struct DeviceNotificationBuilder {
    inner: DeviceNotification,
}

impl DeviceNotificationBuilder {
    #[must_use]
    pub fn action(mut self, action: impl Into<String>) -> Self {
        self.inner.action = action.into();
        self
    }

    #[must_use]
    pub fn subsystem(mut self, subsystem: impl Into<String>) -> Self {
        self.inner.subsystem = Some(subsystem.into());
        self
    }

    #[must_use]
    pub fn devpath(mut self, devpath: impl Into<String>) -> Self {
        self.inner.devpath = devpath.into();
        self
    }

    #[must_use]
    pub fn sequence_number(mut self, sequence_number: u64) -> Self {
        self.inner.sequence_number = sequence_number;
        self
    }

    #[must_use]
    pub fn property(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.inner.properties.insert(name.into(), value.into());
        self
    }

    #[must_use]
    pub fn vendor_id(self, vendor_id: impl Into<String>) -> Self {
        self.property(PROPERTY_VENDOR_ID, vendor_id)
    }

    #[must_use]
    pub fn model_id(self, model_id: impl Into<String>) -> Self {
        self.property(PROPERTY_MODEL_ID, model_id)
    }

    #[must_use]
    pub fn build(self) -> DeviceNotification {
        self.inner
    }
}
