//! # gopro-app
//!
//! Application layer: use-cases and **port definitions** (traits).
//!
//! ## Responsibilities
//! - Define **port traits** that adapters must implement (driven/outbound ports):
//!   - `BusEventSource`: live feed of raw hardware-bus notifications
//!   - `WebcamControl`: start/stop a camera's webcam bridge
//! - Define **driving/inbound** use-cases:
//!   - `HotplugMonitor`: classify and resolve bus notifications into a
//!     cancellable, ordered stream of hotplug events
//!   - `CameraSupervisor`: start cameras as they connect, stop them on shutdown
//! - Provide the cancellation scope shared by callers and background tasks
//!
//! ## Dependency rule
//! Depends on `gopro-domain` only (plus `tokio::sync` for channels and
//! `tokio-util` for the cancellation token).
//! Never imports adapter crates. Adapters depend on *this* crate, not the reverse.

pub mod ports;
pub mod services;

/// Cancellation scope shared between a caller and the tasks it starts.
pub use tokio_util::sync::CancellationToken;
