//! # gopro-domain
//!
//! Pure domain model for goprod, the GoPro webcam hotplug daemon.
//!
//! ## Responsibilities
//! - Foundational types: typed identifiers, error conventions
//! - Define **Cameras** (identity of a detected device plus its address)
//! - Define **Device notifications** (raw bus records, read-only here)
//! - Define **Hotplug events** (typed connect/disconnect records)
//! - Classify notifications against the supported-hardware allow-list
//! - Resolve classified notifications into camera identities
//!
//! ## Dependency rule
//! This crate has **no internal dependencies**.
//! It must never import anything from `app`, adapters, or external IO crates.
//! All IO boundaries are expressed as traits in the `app` crate (ports).

pub mod error;
pub mod id;

pub mod camera;
pub mod classifier;
pub mod hotplug;
pub mod notification;
pub mod resolver;
