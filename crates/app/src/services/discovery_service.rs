//! Discovery service: announces inventory devices on the local bus and
//! registers them.

use std::sync::Arc;

use yobridge_domain::device::DeviceDescriptor;
use yobridge_domain::discovery;
use yobridge_domain::error::{BridgeError, PayloadError};

use crate::ports::MessagePublisher;
use crate::registry::DeviceRegistry;

/// Outcome of one inventory pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DiscoverySummary {
    /// Devices announced and registered.
    pub registered: usize,
    /// Records skipped (malformed or unsupported type).
    pub skipped: usize,
}

/// Application service turning an inventory into discovery announcements.
pub struct DiscoveryService<P> {
    registry: Arc<DeviceRegistry>,
    publisher: P,
}

impl<P: MessagePublisher + Send + Sync> DiscoveryService<P> {
    /// Create a new service writing into `registry` and publishing through
    /// `publisher`.
    pub fn new(registry: Arc<DeviceRegistry>, publisher: P) -> Self {
        Self {
            registry,
            publisher,
        }
    }

    /// Announce every supported device of an inventory document.
    ///
    /// Records that fail to deserialize or carry an unsupported type are
    /// logged and skipped; they never abort the rest of the batch.
    ///
    /// # Errors
    ///
    /// Returns [`BridgeError::MalformedPayload`] when the document has no
    /// `data.devices` array.
    #[tracing::instrument(skip_all)]
    pub async fn announce_inventory(
        &self,
        inventory: &serde_json::Value,
    ) -> Result<DiscoverySummary, BridgeError> {
        let records = inventory
            .pointer("/data/devices")
            .ok_or(PayloadError::MissingField("data.devices"))?
            .as_array()
            .ok_or(PayloadError::InvalidField {
                field: "data.devices",
                expected: "array",
            })?;

        let mut summary = DiscoverySummary::default();
        for record in records {
            let descriptor = match serde_json::from_value::<DeviceDescriptor>(record.clone()) {
                Ok(descriptor) => descriptor,
                Err(err) => {
                    tracing::warn!(%err, %record, "skipping malformed inventory record");
                    summary.skipped += 1;
                    continue;
                }
            };

            match self.announce(descriptor).await {
                Ok(()) => summary.registered += 1,
                Err(BridgeError::UnrecognizedDeviceType(device_type)) => {
                    tracing::info!(%device_type, "ignoring unhandled device type");
                    summary.skipped += 1;
                }
                Err(err) => {
                    tracing::warn!(%err, "skipping inventory record");
                    summary.skipped += 1;
                }
            }
        }

        tracing::info!(
            registered = summary.registered,
            skipped = summary.skipped,
            "discovery complete"
        );
        Ok(summary)
    }

    /// Announce and register a single device.
    ///
    /// A failed config publish is logged and the device is registered anyway,
    /// so its reports are still translated once the local bus recovers.
    ///
    /// # Errors
    ///
    /// Returns [`BridgeError::UnrecognizedDeviceType`] when the device type has
    /// no discovery mapping; nothing is published or registered then.
    #[tracing::instrument(skip(self, descriptor), fields(device_id = %descriptor.device_id))]
    pub async fn announce(&self, descriptor: DeviceDescriptor) -> Result<(), BridgeError> {
        let (config, binding) = discovery::derive(&descriptor)?;

        match config.to_payload() {
            Ok(payload) => {
                if let Err(err) = self.publisher.publish(&binding.config_topic, payload).await {
                    tracing::warn!(%err, topic = %binding.config_topic, "failed to publish discovery config");
                }
            }
            Err(err) => tracing::warn!(%err, "failed to serialize discovery config"),
        }

        tracing::debug!(
            name = %descriptor.name,
            device_type = %descriptor.device_type,
            topic = %binding.config_topic,
            "device announced"
        );
        self.registry.register(descriptor, config, binding).await;
        Ok(())
    }
}
