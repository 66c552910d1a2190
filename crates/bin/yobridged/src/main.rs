//! # yobridged, the yobridge daemon
//!
//! Composition root that wires the MQTT adapter to the application services
//! and runs the bridge until interrupted.
//!
//! ## Responsibilities
//! - Parse configuration (config file, env vars)
//! - Initialize structured logging
//! - Construct the device registry and the file inventory source
//! - Start the bridge: local relay, discovery, cloud subscription
//! - Handle graceful shutdown (SIGINT)
//!
//! ## Dependency rule
//! This is the **only** crate that depends on all other crates.
//! It is the wiring layer; no domain logic belongs here.

mod config;
mod inventory;

use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use yobridge_adapter_mqtt::Bridge;
use yobridge_app::registry::DeviceRegistry;

use crate::config::Config;
use crate::inventory::FileInventory;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load()?;

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_new(&config.logging.filter)?)
        .init();

    for warning in &config.override_warnings {
        tracing::warn!("{warning}");
    }

    tracing::info!(
        cloud = %config.cloud.host,
        transport = %config.cloud.transport,
        local = %config.local.host,
        inventory = %config.inventory.path.display(),
        "starting yobridged"
    );

    let registry = Arc::new(DeviceRegistry::new());
    let inventory = FileInventory::new(config.inventory.path.clone());
    let bridge = Bridge::start(&config.bridge(), registry, &inventory).await?;

    let summary = bridge.discovery_summary();
    tracing::info!(
        devices = bridge.registry().len(),
        skipped = summary.skipped,
        "bridge running, press Ctrl+C to stop"
    );

    tokio::signal::ctrl_c().await?;
    tracing::info!("shutdown requested");
    bridge.stop().await;

    Ok(())
}
