//! Bridge lifecycle: connect both brokers, announce the inventory, then
//! relay cloud reports until stopped.

use std::sync::Arc;

use rumqttc::{AsyncClient, QoS};
use tokio::task::JoinHandle;

use yobridge_app::ports::InventorySource;
use yobridge_app::registry::DeviceRegistry;
use yobridge_app::services::discovery_service::{DiscoveryService, DiscoverySummary};
use yobridge_app::services::report_service::ReportService;
use yobridge_domain::report::subscription_topic;

use crate::client::{self, MqttPublisher};
use crate::cloud;
use crate::config::BridgeConfig;
use crate::error::MqttError;

/// A running bridge. Dropping it leaves the background tasks running; call
/// [`Bridge::stop`] to shut down.
pub struct Bridge {
    cloud: AsyncClient,
    relay: AsyncClient,
    cloud_task: JoinHandle<()>,
    relay_task: JoinHandle<()>,
    registry: Arc<DeviceRegistry>,
    summary: DiscoverySummary,
}

impl Bridge {
    /// Connect to both brokers and start relaying.
    ///
    /// Startup order:
    /// 1. connect the local relay and wait for its CONNACK
    /// 2. load the inventory and announce every supported device
    /// 3. connect to the cloud and subscribe to the home's report topic
    ///
    /// # Errors
    ///
    /// Returns an error if either broker cannot be reached or refuses the
    /// connection, or if the inventory cannot be loaded. Nothing keeps
    /// running after a failed start.
    #[tracing::instrument(skip_all, fields(home_id = %config.cloud.home_id))]
    pub async fn start<I>(
        config: &BridgeConfig,
        registry: Arc<DeviceRegistry>,
        inventory: &I,
    ) -> Result<Self, MqttError>
    where
        I: InventorySource + Sync,
    {
        let reconnect_delay = config.cloud.reconnect_delay();

        let (relay, relay_loop) =
            client::connect(config.local.mqtt_options(), config.local.connect_timeout()).await?;
        let relay_task = tokio::spawn(client::run_relay_loop(relay_loop, reconnect_delay));

        match Self::start_cloud(config, &registry, inventory, &relay).await {
            Ok((cloud, cloud_task, summary)) => {
                tracing::info!(devices = registry.len(), "bridge started");
                Ok(Self {
                    cloud,
                    relay,
                    cloud_task,
                    relay_task,
                    registry,
                    summary,
                })
            }
            Err(err) => {
                relay_task.abort();
                Err(err)
            }
        }
    }

    async fn start_cloud<I>(
        config: &BridgeConfig,
        registry: &Arc<DeviceRegistry>,
        inventory: &I,
        relay: &AsyncClient,
    ) -> Result<(AsyncClient, JoinHandle<()>, DiscoverySummary), MqttError>
    where
        I: InventorySource + Sync,
    {
        let publisher = MqttPublisher::new(relay.clone());

        let document = inventory.load().await?;
        let summary = DiscoveryService::new(Arc::clone(registry), publisher.clone())
            .announce_inventory(&document)
            .await?;

        let (cloud, cloud_loop) =
            client::connect(config.cloud.mqtt_options(), config.cloud.connect_timeout()).await?;
        let topic = subscription_topic(&config.cloud.home_id);
        cloud
            .subscribe(topic.as_str(), QoS::AtMostOnce)
            .await
            .map_err(MqttError::Client)?;
        tracing::info!(%topic, "subscribed to cloud reports");

        let handler = ReportService::new(Arc::clone(registry), publisher);
        let cloud_task = tokio::spawn(cloud::run_cloud_loop(
            cloud.clone(),
            cloud_loop,
            topic,
            handler,
            config.cloud.reconnect_delay(),
        ));

        Ok((cloud, cloud_task, summary))
    }

    /// Registry of the devices announced at startup.
    #[must_use]
    pub fn registry(&self) -> &Arc<DeviceRegistry> {
        &self.registry
    }

    /// Outcome of the startup discovery pass.
    #[must_use]
    pub fn discovery_summary(&self) -> DiscoverySummary {
        self.summary
    }

    /// Disconnect from both brokers and stop the background tasks.
    pub async fn stop(self) {
        if let Err(err) = self.cloud.disconnect().await {
            tracing::debug!(%err, "cloud disconnect not delivered");
        }
        if let Err(err) = self.relay.disconnect().await {
            tracing::debug!(%err, "relay disconnect not delivered");
        }
        self.cloud_task.abort();
        self.relay_task.abort();
        tracing::info!("bridge stopped");
    }
}
