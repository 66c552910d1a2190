//! Discovery: the Home Assistant MQTT discovery records for one device.
//!
//! A [`DiscoveryConfig`] is the JSON payload announced on the config topic;
//! a [`TopicBinding`] remembers which topics belong to the device. Both are
//! derived deterministically from a [`DeviceDescriptor`] by [`derive`].

use serde::{Deserialize, Serialize};

use crate::device::{DeviceDescriptor, Platform};
use crate::error::BridgeError;
use crate::id::DeviceId;

/// Root of every discovery topic on the local bus.
pub const DISCOVERY_PREFIX: &str = "homeassistant";

/// Prefix prepended to the vendor device id to form `unique_id`.
pub const UNIQUE_ID_PREFIX: &str = "yo_";

/// Discovery payload for one device.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiscoveryConfig {
    pub name: String,
    pub unique_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub device_class: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit_of_measurement: Option<String>,
    pub state_topic: String,
}

impl DiscoveryConfig {
    /// Replace the unit of measurement, the only mutable field.
    pub fn set_unit(&mut self, unit: impl Into<String>) {
        self.unit_of_measurement = Some(unit.into());
    }

    /// Serialize to the JSON bytes published on the config topic.
    ///
    /// # Errors
    ///
    /// Propagates the serializer error; with only string fields this does
    /// not happen in practice.
    pub fn to_payload(&self) -> Result<Vec<u8>, serde_json::Error> {
        serde_json::to_vec(self)
    }
}

/// The local-bus topics owned by one device. Never mutated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TopicBinding {
    pub device_id: DeviceId,
    pub config_topic: String,
    pub state_topic: String,
}

impl TopicBinding {
    /// Compute the topics for a device announced under `platform`.
    #[must_use]
    pub fn new(platform: Platform, device_id: &DeviceId) -> Self {
        let base = format!("{DISCOVERY_PREFIX}/{platform}/{device_id}");
        Self {
            device_id: device_id.clone(),
            config_topic: format!("{base}/config"),
            state_topic: format!("{base}/state"),
        }
    }
}

/// Build the discovery config and topic binding for a device.
///
/// # Errors
///
/// Returns [`BridgeError::UnrecognizedDeviceType`] when the device type has
/// no discovery profile.
pub fn derive(descriptor: &DeviceDescriptor) -> Result<(DiscoveryConfig, TopicBinding), BridgeError> {
    let profile = descriptor.device_type.profile().ok_or_else(|| {
        BridgeError::UnrecognizedDeviceType(descriptor.device_type.as_str().to_string())
    })?;

    let binding = TopicBinding::new(profile.platform, &descriptor.device_id);
    let config = DiscoveryConfig {
        name: descriptor.name.clone(),
        unique_id: format!("{UNIQUE_ID_PREFIX}{}", descriptor.device_id),
        device_class: profile.device_class.map(str::to_string),
        unit_of_measurement: profile.default_unit.map(str::to_string),
        state_topic: binding.state_topic.clone(),
    };

    Ok((config, binding))
}
