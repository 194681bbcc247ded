//! Application services: use-case orchestration.
//!
//! Each service is generic over the port traits it needs, keeping the
//! application layer decoupled from concrete adapter implementations.

pub mod camera_supervisor;
pub mod hotplug_monitor;
