//! Common error types used across the workspace.
//!
//! Each layer defines its own typed errors (no `String` variants for
//! wrapped causes). The domain owns the errors raised by pure logic:
//! construction-time validation and identity resolution. IO failures live
//! next to the ports in `gopro-app`.

/// A value could not be constructed because an invariant does not hold.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    /// A camera was built without an identifier.
    #[error("camera id is required")]
    MissingCameraId,

    /// A camera id string is not a 40-character hex SHA-1 digest.
    #[error("camera id must be 40 hex characters, got {0:?}")]
    MalformedCameraId(String),

    /// An event filter that can never accept anything.
    #[error("event filter must contain at least one event kind")]
    EmptyFilter,
}

/// A notification passed classification but no identity could be derived.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ResolutionError {
    #[error("notification has an empty device path")]
    EmptyDevicePath,

    /// The action string maps to neither connect nor disconnect.
    #[error("action {0:?} is not a hotplug transition")]
    UnsupportedAction(String),
}
