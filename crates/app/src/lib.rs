//! # yobridge-app
//!
//! Application layer: use-cases and **port definitions** (traits).
//!
//! ## Responsibilities
//! - Define **port traits** that adapters must implement:
//!   - `MessagePublisher`: publish a payload on the local bus
//!   - `MessageHandler`: consume one inbound cloud message
//!   - `InventorySource`: supply the vendor device inventory
//! - Own the in-memory [`registry::DeviceRegistry`]
//! - Provide the use-cases:
//!   - `DiscoveryService`: announce inventory devices and register them
//!   - `ReportService`: translate telemetry reports into state updates
//!
//! ## Dependency rule
//! Depends on `yobridge-domain` only (plus `tokio::sync` for locks).
//! Never imports adapter crates. Adapters depend on *this* crate, not the reverse.

pub mod ports;
pub mod registry;
pub mod services;
