//! Camera supervisor: reacts to hotplug events by driving the webcam bridge.
//!
//! Starts the webcam of every camera that connects and remembers it, so that
//! every started camera can be stopped again on shutdown. A camera that
//! disconnects is simply forgotten: it is no longer reachable.

use std::collections::HashMap;
use std::net::IpAddr;

use tokio_stream::{Stream, StreamExt as _};

use gopro_domain::hotplug::{HotplugEvent, HotplugKind};
use gopro_domain::id::CameraId;

use crate::ports::{ControlError, WebcamControl};

/// Tracks which cameras had their webcam started.
pub struct CameraSupervisor<C> {
    control: C,
    started: HashMap<CameraId, IpAddr>,
}

impl<C: WebcamControl> CameraSupervisor<C> {
    pub fn new(control: C) -> Self {
        Self {
            control,
            started: HashMap::new(),
        }
    }

    #[must_use]
    pub fn is_started(&self, id: &CameraId) -> bool {
        self.started.contains_key(id)
    }

    /// Number of cameras currently started.
    #[must_use]
    pub fn started_count(&self) -> usize {
        self.started.len()
    }

    /// React to one hotplug event.
    ///
    /// # Errors
    ///
    /// Returns the [`ControlError`] when starting a newly connected camera
    /// fails. The camera is not recorded as started in that case.
    #[tracing::instrument(skip_all, fields(kind = %event.kind, camera_id = %event.camera.id))]
    pub async fn handle(&mut self, event: &HotplugEvent) -> Result<(), ControlError> {
        match event.kind {
            HotplugKind::Connected => {
                let Some(address) = event.camera.address else {
                    tracing::warn!("connected camera has no address, skipping");
                    return Ok(());
                };
                self.control.start(&host(address)).await?;
                self.started.insert(event.camera.id.clone(), address);
                tracing::info!(%address, "webcam started");
            }
            HotplugKind::Disconnected => {
                if self.started.remove(&event.camera.id).is_some() {
                    tracing::info!("camera went away");
                } else {
                    tracing::debug!("unknown camera went away");
                }
            }
        }
        Ok(())
    }

    /// Consume `events` in order until the stream ends, then stop every
    /// started camera.
    ///
    /// Returns the number of cameras stopped successfully.
    pub async fn run<S>(&mut self, mut events: S) -> usize
    where
        S: Stream<Item = HotplugEvent> + Unpin,
    {
        while let Some(event) = events.next().await {
            if let Err(err) = self.handle(&event).await {
                tracing::error!(
                    error = %err,
                    cause = %err.source,
                    camera_id = %event.camera.id,
                    "failed to start camera"
                );
            }
        }
        self.shutdown().await
    }

    /// Stop every started camera and forget them all.
    ///
    /// Failures are logged, not returned: shutdown carries on with the
    /// remaining cameras. Returns the number stopped successfully.
    #[tracing::instrument(skip_all, fields(count = self.started.len()))]
    pub async fn shutdown(&mut self) -> usize {
        let mut stopped = 0;
        for (id, address) in self.started.drain() {
            match self.control.stop(&host(address)).await {
                Ok(()) => {
                    tracing::info!(camera_id = %id, %address, "webcam stopped");
                    stopped += 1;
                }
                Err(err) => {
                    tracing::error!(
                        error = %err,
                        cause = %err.source,
                        camera_id = %id,
                        "failed to stop camera"
                    );
                }
            }
        }
        stopped
    }
}

/// Render an address as a URL host: IPv6 literals go in brackets.
fn host(address: IpAddr) -> String {
    match address {
        IpAddr::V4(v4) => v4.to_string(),
        IpAddr::V6(v6) => format!("[{v6}]"),
    }
}
