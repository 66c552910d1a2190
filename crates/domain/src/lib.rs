//! # yobridge-domain
//!
//! Pure domain model for the yobridge cloud-to-Home-Assistant bridge.
//!
//! ## Responsibilities
//! - Foundational types: typed identifiers, error conventions, timestamps
//! - Define **Devices** as reported by the vendor inventory and the closed set
//!   of device types the bridge knows how to expose
//! - Define **Discovery** records (config payload + topic binding) announced
//!   on the local bus
//! - Define **Reports** (inbound telemetry events) and the normalized
//!   **State** payloads derived from them
//!
//! ## Dependency rule
//! This crate has **no internal dependencies**.
//! It must never import anything from `app`, adapters, or external IO crates.
//! All IO boundaries are expressed as traits in the `app` crate (ports).

pub mod error;
pub mod id;
pub mod time;

pub mod device;
pub mod discovery;
pub mod report;
pub mod state;
