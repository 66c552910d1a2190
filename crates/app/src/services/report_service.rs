//! Report service: translates vendor telemetry into normalized state
//! updates on the local bus.

use std::sync::Arc;

use yobridge_domain::error::BridgeError;
use yobridge_domain::id::DeviceId;
use yobridge_domain::report::{Reading, TelemetryEvent};
use yobridge_domain::state::StatePayload;
use yobridge_domain::time::Timestamp;

use crate::ports::{MessageHandler, MessagePublisher};
use crate::registry::DeviceRegistry;

/// What a successfully translated report produced.
#[derive(Debug, Clone, PartialEq)]
pub struct Translation {
    pub device_id: DeviceId,
    pub state_topic: String,
    pub payload: StatePayload,
    /// Vendor time of the report, when it carried a usable one.
    pub reported_at: Option<Timestamp>,
    /// Whether the discovery config was republished with a new unit.
    pub config_republished: bool,
}

/// Application service translating telemetry reports.
pub struct ReportService<P> {
    registry: Arc<DeviceRegistry>,
    publisher: P,
}

impl<P: MessagePublisher + Send + Sync> ReportService<P> {
    /// Create a new service reading from `registry` and publishing through
    /// `publisher`.
    pub fn new(registry: Arc<DeviceRegistry>, publisher: P) -> Self {
        Self {
            registry,
            publisher,
        }
    }

    /// Translate one inbound report and publish the resulting state.
    ///
    /// Temperature reports also store the reported unit and republish the
    /// device's discovery config, every time. The device entry stays locked
    /// from lookup to the last publish, so concurrent reports for the same
    /// device cannot interleave their config updates.
    ///
    /// # Errors
    ///
    /// - [`BridgeError::MalformedPayload`] if the payload is not a report or
    ///   lacks a field its event kind needs.
    /// - [`BridgeError::UnknownDevice`] if the device was never discovered.
    /// - [`BridgeError::UnhandledEventKind`] for event kinds with no translation.
    /// - [`BridgeError::Publish`] if the state could not be handed to the bus.
    pub async fn translate(&self, payload: &[u8]) -> Result<Translation, BridgeError> {
        let event = TelemetryEvent::from_slice(payload)?;

        let Some(mut entry) = self.registry.lock(&event.device_id).await else {
            return Err(BridgeError::UnknownDevice(event.device_id));
        };

        let reading = event.reading()?;

        let mut config_republished = false;
        if let Reading::Temperature { unit, .. } = &reading {
            let config = entry.set_unit(unit.as_str());
            match config.to_payload() {
                Ok(bytes) => {
                    match self.publisher.publish(&entry.binding.config_topic, bytes).await {
                        Ok(()) => config_republished = true,
                        Err(err) => tracing::warn!(
                            %err,
                            device_id = %event.device_id,
                            "failed to republish discovery config"
                        ),
                    }
                }
                Err(err) => tracing::warn!(%err, "failed to serialize discovery config"),
            }
        }

        let state = reading.payload();
        let reported_at = event.reported_at();
        self.publisher
            .publish(&entry.binding.state_topic, state.to_bytes())
            .await?;

        Ok(Translation {
            device_id: event.device_id,
            state_topic: entry.binding.state_topic.clone(),
            payload: state,
            reported_at,
            config_republished,
        })
    }
}

impl<P: MessagePublisher + Send + Sync> MessageHandler for ReportService<P> {
    async fn handle_message(&self, topic: &str, payload: &[u8]) {
        tracing::trace!(%topic, payload = %String::from_utf8_lossy(payload), "report received");

        match self.translate(payload).await {
            Ok(translation) => tracing::debug!(
                device_id = %translation.device_id,
                topic = %translation.state_topic,
                state = %translation.payload,
                reported_at = ?translation.reported_at,
                "state published"
            ),
            Err(BridgeError::UnknownDevice(device_id)) => {
                tracing::info!(%device_id, %topic, "skipping ignored device");
            }
            Err(BridgeError::UnhandledEventKind(event)) => {
                tracing::info!(%event, %topic, "unhandled report type");
            }
            Err(err @ BridgeError::MalformedPayload(_)) => {
                let cause = std::error::Error::source(&err).map(ToString::to_string);
                tracing::warn!(%err, ?cause, %topic, "dropping report");
            }
            Err(err) => tracing::warn!(%err, %topic, "failed to translate report"),
        }
    }
}
