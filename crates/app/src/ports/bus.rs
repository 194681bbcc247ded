//! Bus event source port: a live feed of raw device notifications.
//!
//! Implementations wrap the OS hotplug mechanism (udev on Linux) or a
//! scripted in-process feed. The monitor only ever sees this trait, so it can
//! be driven without real hardware.

use std::error::Error as StdError;
use std::future::Future;

use tokio_stream::Stream;

use gopro_domain::notification::DeviceNotification;

use crate::CancellationToken;

/// A source of raw hardware-bus notifications.
pub trait BusEventSource: Send + Sync {
    /// The live notification feed returned by
    /// [`subscribe`](Self::subscribe).
    type Subscription: Stream<Item = DeviceNotification> + Send + Unpin + 'static;

    /// Open a live subscription.
    ///
    /// The source should stop producing once `cancel` fires; notifications it
    /// still emits afterwards are abandoned by the consumer.
    fn subscribe(
        &self,
        cancel: CancellationToken,
    ) -> impl Future<Output = Result<Self::Subscription, SubscriptionError>> + Send;
}

impl<T: BusEventSource> BusEventSource for std::sync::Arc<T> {
    type Subscription = T::Subscription;

    fn subscribe(
        &self,
        cancel: CancellationToken,
    ) -> impl Future<Output = Result<Self::Subscription, SubscriptionError>> + Send {
        (**self).subscribe(cancel)
    }
}

/// The bus subscription could not be opened.
#[derive(Debug, thiserror::Error)]
pub enum SubscriptionError {
    /// The source only supports one live subscription and it is taken.
    #[error("bus source already has an active subscriber")]
    AlreadySubscribed,

    /// The underlying bus mechanism failed.
    #[error("unable to open bus subscription")]
    Backend(#[source] Box<dyn StdError + Send + Sync>),
}

impl SubscriptionError {
    /// Wrap an adapter-specific error.
    pub fn backend(err: impl StdError + Send + Sync + 'static) -> Self {
        Self::Backend(Box::new(err))
    }
}
