//! Device: a vendor device as listed in the home inventory.
//!
//! The vendor identifies the kind of device with a free-form `type` string.
//! [`DeviceType`] closes that set over the kinds the bridge can expose and
//! keeps everything else as [`DeviceType::Unknown`], which has no
//! [`DeviceProfile`] and is therefore never announced.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::id::DeviceId;

/// Home Assistant platform a device is announced under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Platform {
    BinarySensor,
    Sensor,
}

impl Platform {
    /// Topic segment used by Home Assistant discovery.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::BinarySensor => "binary_sensor",
            Self::Sensor => "sensor",
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How a supported device type maps onto Home Assistant discovery.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeviceProfile {
    pub platform: Platform,
    pub device_class: Option<&'static str>,
    pub default_unit: Option<&'static str>,
}

const DOOR_SENSOR: DeviceProfile = DeviceProfile {
    platform: Platform::BinarySensor,
    device_class: Some("door"),
    default_unit: None,
};

// Configs default to Fahrenheit; the first report resends the real unit.
const TH_SENSOR: DeviceProfile = DeviceProfile {
    platform: Platform::Sensor,
    device_class: None,
    default_unit: Some("°F"),
};

const MOTION_SENSOR: DeviceProfile = DeviceProfile {
    platform: Platform::BinarySensor,
    device_class: Some("motion"),
    default_unit: None,
};

/// Vendor device type.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum DeviceType {
    DoorSensor,
    THSensor,
    MotionSensor,
    /// Any vendor type the bridge does not translate.
    Unknown(String),
}

impl DeviceType {
    /// Parse the vendor `type` string. Never fails; unsupported values
    /// become [`DeviceType::Unknown`].
    #[must_use]
    pub fn parse(value: &str) -> Self {
        match value {
            "DoorSensor" => Self::DoorSensor,
            "THSensor" => Self::THSensor,
            "MotionSensor" => Self::MotionSensor,
            other => Self::Unknown(other.to_string()),
        }
    }

    /// The vendor string for this type.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::DoorSensor => "DoorSensor",
            Self::THSensor => "THSensor",
            Self::MotionSensor => "MotionSensor",
            Self::Unknown(other) => other,
        }
    }

    /// Discovery mapping for this type, `None` for unsupported types.
    #[must_use]
    pub fn profile(&self) -> Option<DeviceProfile> {
        match self {
            Self::DoorSensor => Some(DOOR_SENSOR),
            Self::THSensor => Some(TH_SENSOR),
            Self::MotionSensor => Some(MOTION_SENSOR),
            Self::Unknown(_) => None,
        }
    }
}

impl fmt::Display for DeviceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for DeviceType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for DeviceType {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(Self::parse(&raw))
    }
}

/// A device as described by the vendor inventory. Immutable once created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceDescriptor {
    #[serde(rename = "deviceId")]
    pub device_id: DeviceId,
    pub name: String,
    #[serde(rename = "type")]
    pub device_type: DeviceType,
}

impl DeviceDescriptor {
    /// Create a descriptor from its parts.
    #[must_use]
    pub fn new(
        device_id: impl Into<DeviceId>,
        name: impl Into<String>,
        device_type: DeviceType,
    ) -> Self {
        Self {
            device_id: device_id.into(),
            name: name.into(),
            device_type,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_map_door_sensor_to_binary_sensor_door() {
        let profile = DeviceType::DoorSensor.profile().unwrap();
        assert_eq!(profile.platform, Platform::BinarySensor);
        assert_eq!(profile.device_class, Some("door"));
        assert_eq!(profile.default_unit, None);
    }

    #[test]
    fn should_map_th_sensor_to_sensor_with_fahrenheit_default() {
        let profile = DeviceType::THSensor.profile().unwrap();
        assert_eq!(profile.platform, Platform::Sensor);
        assert_eq!(profile.device_class, None);
        assert_eq!(profile.default_unit, Some("°F"));
    }

    #[test]
    fn should_map_motion_sensor_to_binary_sensor_motion() {
        let profile = DeviceType::MotionSensor.profile().unwrap();
        assert_eq!(profile.platform, Platform::BinarySensor);
        assert_eq!(profile.device_class, Some("motion"));
    }

    #[test]
    fn should_have_no_profile_for_unknown_type() {
        let device_type = DeviceType::parse("Hub");
        assert_eq!(device_type, DeviceType::Unknown("Hub".to_string()));
        assert!(device_type.profile().is_none());
    }

    #[test]
    fn should_parse_vendor_type_case_sensitively() {
        assert_eq!(DeviceType::parse("THSensor"), DeviceType::THSensor);
        assert!(matches!(
            DeviceType::parse("thsensor"),
            DeviceType::Unknown(_)
        ));
    }

    #[test]
    fn should_display_platform_topic_segment() {
        assert_eq!(Platform::BinarySensor.to_string(), "binary_sensor");
        assert_eq!(Platform::Sensor.to_string(), "sensor");
    }

    #[test]
    fn should_deserialize_inventory_record() {
        let json = r#"{"deviceId":"d1","name":"Front Door","type":"DoorSensor","token":"x"}"#;
        let descriptor: DeviceDescriptor = serde_json::from_str(json).unwrap();
        assert_eq!(descriptor.device_id, DeviceId::new("d1"));
        assert_eq!(descriptor.name, "Front Door");
        assert_eq!(descriptor.device_type, DeviceType::DoorSensor);
    }

    #[test]
    fn should_keep_unknown_type_when_deserializing() {
        let json = r#"{"deviceId":"h1","name":"Hub","type":"Hub"}"#;
        let descriptor: DeviceDescriptor = serde_json::from_str(json).unwrap();
        assert_eq!(descriptor.device_type.as_str(), "Hub");
    }

    #[test]
    fn should_reject_record_missing_type() {
        let json = r#"{"deviceId":"d1","name":"Front Door"}"#;
        assert!(serde_json::from_str::<DeviceDescriptor>(json).is_err());
    }
}
