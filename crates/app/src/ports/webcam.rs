//! Webcam control port: switch a camera's webcam mode on or off.

use std::error::Error as StdError;
use std::future::Future;

/// The two commands a camera's webcam bridge understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WebcamOperation {
    Start,
    Stop,
}

impl std::fmt::Display for WebcamOperation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Start => f.write_str("start"),
            Self::Stop => f.write_str("stop"),
        }
    }
}

/// Remote control of a camera's webcam mode.
///
/// Both operations are idempotent from the camera's point of view.
/// Implementations keep no per-camera state and do not deduplicate calls.
pub trait WebcamControl: Send + Sync {
    /// Switch webcam streaming on for the camera at `address`
    /// (`host` or `host:port`).
    fn start(&self, address: &str) -> impl Future<Output = Result<(), ControlError>> + Send;

    /// Switch webcam streaming off for the camera at `address`.
    fn stop(&self, address: &str) -> impl Future<Output = Result<(), ControlError>> + Send;
}

impl<T: WebcamControl> WebcamControl for std::sync::Arc<T> {
    fn start(&self, address: &str) -> impl Future<Output = Result<(), ControlError>> + Send {
        (**self).start(address)
    }

    fn stop(&self, address: &str) -> impl Future<Output = Result<(), ControlError>> + Send {
        (**self).stop(address)
    }
}

/// A start/stop call failed for good: retries were exhausted or the failure
/// was not worth retrying.
#[derive(Debug, thiserror::Error)]
#[error("unable to {operation} webcam at {address} after {attempts} attempt(s)")]
pub struct ControlError {
    pub operation: WebcamOperation,
    pub address: String,
    /// Requests actually sent. Zero when the address was rejected up front.
    pub attempts: u32,
    #[source]
    pub source: Box<dyn StdError + Send + Sync>,
}

impl ControlError {
    pub fn new(
        operation: WebcamOperation,
        address: impl Into<String>,
        attempts: u32,
        source: impl StdError + Send + Sync + 'static,
    ) -> Self {
        Self {
            operation,
            address: address.into(),
            attempts,
            source: Box::new(source),
        }
    }
}
