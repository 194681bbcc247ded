//! # gopro-adapter-udev
//!
//! Bus event source backed by the Linux udev netlink monitor.
//!
//! ## Responsibilities
//! - Implement the `BusEventSource` port from `gopro-app`
//! - Own one monitor thread per subscription, pre-filtered by subsystem
//! - Hand notifications over one at a time, leaving any backlog in the kernel
//! - Report socket setup failures synchronously from `subscribe`
//!
//! The netlink monitor needs Linux and the `system` feature, which links the
//! system libudev. Without either the crate still builds, but `subscribe`
//! always fails with [`error::UdevError::Unsupported`].

pub mod config;
pub mod error;
#[cfg_attr(not(all(target_os = "linux", feature = "system")), allow(dead_code))]
mod forward;
#[cfg(all(target_os = "linux", feature = "system"))]
mod monitor;

use tokio_stream::wrappers::ReceiverStream;

use gopro_app::CancellationToken;
use gopro_app::ports::{BusEventSource, SubscriptionError};
use gopro_domain::notification::DeviceNotification;

use crate::config::UdevConfig;
#[cfg(not(all(target_os = "linux", feature = "system")))]
use crate::error::UdevError;

/// [`BusEventSource`] reading the kernel's udev netlink group.
#[derive(Debug, Clone, Default)]
pub struct UdevBus {
    config: UdevConfig,
}

impl UdevBus {
    #[must_use]
    pub fn new(config: UdevConfig) -> Self {
        Self { config }
    }

    #[must_use]
    pub fn config(&self) -> &UdevConfig {
        &self.config
    }
}

impl BusEventSource for UdevBus {
    type Subscription = ReceiverStream<DeviceNotification>;

    #[cfg(all(target_os = "linux", feature = "system"))]
    async fn subscribe(
        &self,
        cancel: CancellationToken,
    ) -> Result<Self::Subscription, SubscriptionError> {
        let receiver = monitor::open(&self.config, cancel)
            .await
            .inspect_err(|err| tracing::error!(error = %err, "udev subscription failed"))?;
        Ok(ReceiverStream::new(receiver))
    }

    #[cfg(not(all(target_os = "linux", feature = "system")))]
    async fn subscribe(
        &self,
        _cancel: CancellationToken,
    ) -> Result<Self::Subscription, SubscriptionError> {
        Err(UdevError::Unsupported.into())
    }
}
