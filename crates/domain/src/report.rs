//! Report: one telemetry event pushed by the vendor cloud.
//!
//! Wire shape: `{"event", "time", "msgid", "data", "deviceId"}`. The `data`
//! object depends on the event kind; only the fields the bridge needs are
//! read, everything else (battery, LoRa info, alarms, …) is ignored.

use std::fmt;

use serde::{Deserialize, Deserializer};

use crate::error::{BridgeError, PayloadError};
use crate::id::{DeviceId, HomeId};
use crate::state::{BinaryState, StatePayload};
use crate::time::{self, Timestamp};

/// Cloud topic carrying the reports of every device in a home.
#[must_use]
pub fn subscription_topic(home_id: &HomeId) -> String {
    format!("yl-home/{home_id}/+/report")
}

/// Kind of telemetry event, taken from the `event` field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventKind {
    DoorAlert,
    ThReport,
    MotionAlert,
    MotionStatusChange,
    Other(String),
}

impl EventKind {
    #[must_use]
    pub fn parse(value: &str) -> Self {
        match value {
            "DoorSensor.Alert" => Self::DoorAlert,
            "THSensor.Report" => Self::ThReport,
            "MotionSensor.Alert" => Self::MotionAlert,
            "MotionSensor.StatusChange" => Self::MotionStatusChange,
            other => Self::Other(other.to_string()),
        }
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::DoorAlert => "DoorSensor.Alert",
            Self::ThReport => "THSensor.Report",
            Self::MotionAlert => "MotionSensor.Alert",
            Self::MotionStatusChange => "MotionSensor.StatusChange",
            Self::Other(other) => other,
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A parsed inbound telemetry event. Consumed and discarded per message.
#[derive(Debug, Clone, Deserialize)]
pub struct TelemetryEvent {
    #[serde(rename = "deviceId")]
    pub device_id: DeviceId,
    pub event: String,
    #[serde(default, deserialize_with = "lenient_millis")]
    pub time: Option<i64>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub msgid: Option<String>,
    #[serde(default)]
    pub data: serde_json::Value,
}

/// Result of normalizing a telemetry event.
#[derive(Debug, Clone, PartialEq)]
pub enum Reading {
    /// A binary sensor state.
    Binary(BinaryState),
    /// A temperature value together with the unit it is expressed in.
    Temperature {
        value: serde_json::Number,
        unit: String,
    },
}

impl Reading {
    /// The payload to publish on the state topic.
    #[must_use]
    pub fn payload(&self) -> StatePayload {
        match self {
            Self::Binary(state) => StatePayload::Binary(*state),
            Self::Temperature { value, .. } => StatePayload::Number(value.clone()),
        }
    }
}

impl TelemetryEvent {
    /// Parse a raw message payload.
    ///
    /// # Errors
    ///
    /// Returns [`PayloadError::Json`] when the bytes are not a JSON object
    /// carrying at least `deviceId` and `event`.
    pub fn from_slice(payload: &[u8]) -> Result<Self, PayloadError> {
        Ok(serde_json::from_slice(payload)?)
    }

    #[must_use]
    pub fn kind(&self) -> EventKind {
        EventKind::parse(&self.event)
    }

    /// Vendor report time, when present and representable.
    #[must_use]
    pub fn reported_at(&self) -> Option<Timestamp> {
        self.time.and_then(time::from_epoch_millis)
    }

    /// Translate the vendor payload into a normalized reading.
    ///
    /// # Errors
    ///
    /// - [`BridgeError::UnhandledEventKind`] for event kinds with no translation.
    /// - [`BridgeError::MalformedPayload`] when `data` lacks a field the
    ///   event kind needs.
    pub fn reading(&self) -> Result<Reading, BridgeError> {
        match self.kind() {
            EventKind::DoorAlert => {
                let state = str_field(&self.data, "state", "data.state")?;
                Ok(Reading::Binary(BinaryState::from_bool(state == "open")))
            }
            EventKind::MotionAlert | EventKind::MotionStatusChange => {
                let state = str_field(&self.data, "state", "data.state")?;
                Ok(Reading::Binary(BinaryState::from_bool(state == "alert")))
            }
            EventKind::ThReport => temperature_reading(&self.data),
            EventKind::Other(kind) => Err(BridgeError::UnhandledEventKind(kind)),
        }
    }
}

/// Temperatures are always reported in Celsius; `mode` is the unit the user
/// picked in the vendor app.
fn temperature_reading(data: &serde_json::Value) -> Result<Reading, BridgeError> {
    let celsius = match data.get("temperature") {
        None | Some(serde_json::Value::Null) => {
            return Err(PayloadError::MissingField("data.temperature").into());
        }
        Some(serde_json::Value::Number(number)) => number.clone(),
        Some(_) => {
            return Err(PayloadError::InvalidField {
                field: "data.temperature",
                expected: "number",
            }
            .into());
        }
    };
    let mode = str_field(data, "mode", "data.mode")?.to_uppercase();

    let value = if mode == "F" {
        let c = celsius.as_f64().ok_or(PayloadError::InvalidField {
            field: "data.temperature",
            expected: "number",
        })?;
        serde_json::Number::from(celsius_to_fahrenheit(c))
    } else {
        celsius
    };

    Ok(Reading::Temperature {
        value,
        unit: format!("°{mode}"),
    })
}

/// Convert to whole degrees Fahrenheit, rounding half to even.
#[must_use]
#[allow(clippy::cast_possible_truncation)]
pub fn celsius_to_fahrenheit(celsius: f64) -> i64 {
    (celsius * 1.8 + 32.0).round_ties_even() as i64
}

// A `time` or `msgid` of an unexpected type reads as absent.
fn lenient_millis<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<i64>, D::Error> {
    Ok(match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::Number(number) => number.as_i64(),
        serde_json::Value::String(text) => text.trim().parse().ok(),
        _ => None,
    })
}

fn lenient_string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
    Ok(match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::String(text) => Some(text),
        serde_json::Value::Number(number) => Some(number.to_string()),
        _ => None,
    })
}

fn str_field<'a>(
    data: &'a serde_json::Value,
    key: &str,
    path: &'static str,
) -> Result<&'a str, PayloadError> {
    match data.get(key) {
        None | Some(serde_json::Value::Null) => Err(PayloadError::MissingField(path)),
        Some(value) => value.as_str().ok_or(PayloadError::InvalidField {
            field: path,
            expected: "string",
        }),
    }
}
