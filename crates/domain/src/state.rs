//! Normalized state payloads published on device state topics.

use std::fmt;

/// On/off state of a binary sensor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryState {
    On,
    Off,
}

impl BinaryState {
    /// `On` when `condition` holds, `Off` otherwise.
    #[must_use]
    pub fn from_bool(condition: bool) -> Self {
        if condition { Self::On } else { Self::Off }
    }

    /// Payload string expected by Home Assistant binary sensors.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::On => "ON",
            Self::Off => "OFF",
        }
    }
}

impl fmt::Display for BinaryState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Payload published to a device's state topic.
#[derive(Debug, Clone, PartialEq)]
pub enum StatePayload {
    /// `"ON"` / `"OFF"` for binary sensors.
    Binary(BinaryState),
    /// Bare number for numeric sensors.
    Number(serde_json::Number),
}

impl StatePayload {
    /// Bytes sent on the wire.
    #[must_use]
    pub fn to_bytes(&self) -> Vec<u8> {
        self.to_string().into_bytes()
    }
}

impl fmt::Display for StatePayload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Binary(state) => state.fmt(f),
            Self::Number(number) => number.fmt(f),
        }
    }
}
