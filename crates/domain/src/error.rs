//! Common error types used across the workspace.
//!
//! [`BridgeError`] is the taxonomy every message-handling path reports into.
//! None of its variants is ever escalated to process termination: callers
//! log them and move on to the next message or inventory record.

use crate::id::DeviceId;

/// Boxed error from an IO collaborator (bus client, file system, …).
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Top-level bridge error.
#[derive(Debug, thiserror::Error)]
pub enum BridgeError {
    /// Telemetry references a device that never went through discovery.
    #[error("unknown device {0}")]
    UnknownDevice(DeviceId),

    /// The device is known but the event kind has no translation.
    #[error("unhandled event kind {0}")]
    UnhandledEventKind(String),

    /// The payload failed to parse or lacks a field its event kind needs.
    #[error("malformed payload")]
    MalformedPayload(#[from] PayloadError),

    /// An inventory record carries a device type with no known mapping.
    #[error("unrecognized device type {0}")]
    UnrecognizedDeviceType(String),

    /// Publishing to the local bus failed.
    #[error("publish failed")]
    Publish(#[source] BoxError),

    /// The device inventory could not be obtained.
    #[error("failed to load device inventory")]
    Inventory(#[source] BoxError),
}

/// Details about why an inbound payload could not be used.
#[derive(Debug, thiserror::Error)]
pub enum PayloadError {
    /// The bytes are not valid JSON for the expected shape.
    #[error("invalid JSON")]
    Json(#[from] serde_json::Error),

    /// A field required by the event kind is absent.
    #[error("missing field `{0}`")]
    MissingField(&'static str),

    /// A field is present but has the wrong JSON type.
    #[error("field `{field}` must be a {expected}")]
    InvalidField {
        /// Dotted path of the offending field.
        field: &'static str,
        /// Human description of the expected type.
        expected: &'static str,
    },
}

impl BridgeError {
    /// Wrap any bus-client error as a [`BridgeError::Publish`].
    pub fn publish(err: impl Into<BoxError>) -> Self {
        Self::Publish(err.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_display_unknown_device_error() {
        let err = BridgeError::UnknownDevice(DeviceId::new("d9"));
        assert_eq!(err.to_string(), "unknown device d9");
    }

    #[test]
    fn should_display_unhandled_event_kind_error() {
        let err = BridgeError::UnhandledEventKind("Hub.Report".to_string());
        assert_eq!(err.to_string(), "unhandled event kind Hub.Report");
    }

    #[test]
    fn should_convert_payload_error_into_malformed_payload() {
        let err: BridgeError = PayloadError::MissingField("data.state").into();
        assert!(matches!(
            err,
            BridgeError::MalformedPayload(PayloadError::MissingField("data.state"))
        ));
        assert_eq!(err.to_string(), "malformed payload");
    }

    #[test]
    fn should_display_invalid_field_error() {
        let err = PayloadError::InvalidField {
            field: "data.temperature",
            expected: "number",
        };
        assert_eq!(err.to_string(), "field `data.temperature` must be a number");
    }

    #[test]
    fn should_keep_source_of_publish_error() {
        let io = std::io::Error::other("broker gone");
        let err = BridgeError::publish(io);
        let source = std::error::Error::source(&err).unwrap();
        assert_eq!(source.to_string(), "broker gone");
    }
}
