//! Typed camera identifier derived from the device's bus path.
//!
//! The identifier is the lowercase hex SHA-1 of the device path reported by
//! the bus. It is deterministic for a given path, so a `Connected` and a later
//! `Disconnected` for the same attachment carry the same id. It is **not**
//! stable across reboots or re-enumeration: the kernel may hand the same
//! camera a different path, or hand the path to another device.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use sha1::{Digest, Sha1};

use crate::error::ValidationError;

/// Length of a hex encoded SHA-1 digest.
const DIGEST_HEX_LEN: usize = 40;

/// Unique identifier for a [`Camera`](crate::camera::Camera) within one
/// bus-path lifetime.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CameraId(String);

impl CameraId {
    /// Derive the identifier from a device path.
    #[must_use]
    pub fn from_device_path(devpath: &str) -> Self {
        let digest = Sha1::digest(devpath.as_bytes());
        Self(hex::encode(digest))
    }

    /// Borrow the hex digest.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CameraId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for CameraId {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.len() == DIGEST_HEX_LEN && s.bytes().all(|b| b.is_ascii_hexdigit()) {
            Ok(Self(s.to_ascii_lowercase()))
        } else {
            Err(ValidationError::MalformedCameraId(s.to_owned()))
        }
    }
}

impl TryFrom<String> for CameraId {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<CameraId> for String {
    fn from(id: CameraId) -> Self {
        id.0
    }
}
