//! Camera: the identity of a detected GoPro on the bus.

use std::net::{IpAddr, Ipv4Addr};

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::id::CameraId;

/// The address a HERO8 Black in webcam mode serves its control API on.
///
/// The camera runs its own DHCP server on the USB network link and always
/// takes this address for itself.
pub const GOPRO_IP: IpAddr = IpAddr::V4(Ipv4Addr::new(172, 26, 169, 51));

/// A detected camera.
///
/// `address` is only known while the camera is attached: identities produced
/// from a connect carry [`GOPRO_IP`], identities produced from a disconnect
/// carry `None`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Camera {
    pub id: CameraId,
    pub address: Option<IpAddr>,
}

impl Camera {
    /// Create a builder for constructing a [`Camera`].
    #[must_use]
    pub fn builder() -> CameraBuilder {
        CameraBuilder::default()
    }
}

/// Step-by-step builder for [`Camera`].
#[derive(Debug, Default)]
pub struct CameraBuilder {
    id: Option<CameraId>,
    address: Option<IpAddr>,
}

impl CameraBuilder {
    #[must_use]
    pub fn id(mut self, id: CameraId) -> Self {
        self.id = Some(id);
        self
    }

    #[must_use]
    pub fn address(mut self, address: IpAddr) -> Self {
        self.address = Some(address);
        self
    }

    /// Consume the builder and return a [`Camera`].
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::MissingCameraId`] when no id was given.
    pub fn build(self) -> Result<Camera, ValidationError> {
        let id = self.id.ok_or(ValidationError::MissingCameraId)?;
        Ok(Camera {
            id,
            address: self.address,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_id() -> CameraId {
        CameraId::from_device_path("/devices/pci0000:00/usb1/1-2")
    }

    #[test]
    fn should_build_addressable_camera_when_address_provided() {
        let camera = Camera::builder()
            .id(sample_id())
            .address(GOPRO_IP)
            .build()
            .unwrap();
        assert_eq!(camera.address, Some(GOPRO_IP));
    }

    #[test]
    fn should_build_camera_without_address() {
        let camera = Camera::builder().id(sample_id()).build().unwrap();
        assert!(camera.address.is_none());
    }

    #[test]
    fn should_return_validation_error_when_id_is_missing() {
        let result = Camera::builder().address(GOPRO_IP).build();
        assert_eq!(result, Err(ValidationError::MissingCameraId));
    }

    #[test]
    fn should_render_well_known_address() {
        assert_eq!(GOPRO_IP.to_string(), "172.26.169.51");
    }

    #[test]
    fn should_roundtrip_through_serde_json() {
        let camera = Camera::builder()
            .id(sample_id())
            .address(GOPRO_IP)
            .build()
            .unwrap();
        let json = serde_json::to_string(&camera).unwrap();
        let parsed: Camera = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, camera);
    }
}
