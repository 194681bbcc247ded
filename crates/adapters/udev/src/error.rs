//! Udev adapter error types.

use gopro_app::ports::SubscriptionError;

/// Errors raised while opening the udev monitor.
#[derive(Debug, thiserror::Error)]
pub enum UdevError {
    #[error("udev monitoring is not available in this build")]
    Unsupported,

    /// The netlink monitor socket could not be created or filtered.
    #[error("unable to open udev monitor socket")]
    Socket(#[source] std::io::Error),

    #[error("unable to spawn udev monitor thread")]
    Thread(#[source] std::io::Error),

    /// The monitor thread ended without reporting whether it started.
    #[error("udev monitor thread exited during startup")]
    ThreadGone,
}

impl From<UdevError> for SubscriptionError {
    fn from(err: UdevError) -> Self {
        SubscriptionError::backend(err)
    }
}

#[cfg(test)]
mod tests {
    use std::error::Error as _;

    use super::*;

    #[test]
    fn should_wrap_as_backend_subscription_error() {
        let err: SubscriptionError = UdevError::Unsupported.into();
        assert!(matches!(err, SubscriptionError::Backend(_)));
        assert_eq!(
            err.source().unwrap().to_string(),
            "udev monitoring is not available in this build"
        );
    }

    #[test]
    fn should_expose_io_cause_of_socket_error() {
        let err = UdevError::Socket(std::io::Error::from(std::io::ErrorKind::PermissionDenied));
        assert!(err.source().is_some());
    }
}
