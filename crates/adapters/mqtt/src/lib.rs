//! # yobridge-adapter-mqtt
//!
//! MQTT adapter: both broker connections of the bridge.
//!
//! ## Responsibilities
//! - Connect to the vendor cloud broker (TCP or WebSocket framing) with the
//!   access token as username
//! - Subscribe to `yl-home/{homeId}/+/report` and renew the subscription on
//!   every reconnect
//! - Hand inbound reports to the application's report translator
//! - Publish discovery configs and states on the local broker through
//!   [`MqttPublisher`]
//!
//! ## Dependency rule
//! Same as other adapters: depends on `yobridge-app` and `yobridge-domain`.

mod bridge;
mod client;
mod cloud;
mod config;
mod error;

pub use bridge::Bridge;
pub use client::MqttPublisher;
pub use config::{BridgeConfig, CloudConfig, CloudTransport, LocalConfig, UnknownTransport};
pub use error::MqttError;
