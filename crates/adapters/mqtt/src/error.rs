//! MQTT adapter error types.

use rumqttc::ConnectReturnCode;

use yobridge_domain::error::BridgeError;

/// Errors specific to the MQTT adapter.
#[derive(Debug, thiserror::Error)]
pub enum MqttError {
    /// The rumqttc client rejected a request (queue closed, invalid topic, …).
    #[error("MQTT client error")]
    Client(#[source] rumqttc::ClientError),

    /// The network connection to a broker failed.
    #[error("MQTT connection error")]
    Connection(#[source] rumqttc::ConnectionError),

    /// The broker answered the CONNECT with a failure code.
    #[error("MQTT broker refused the connection: {0:?}")]
    Refused(ConnectReturnCode),

    /// No CONNACK arrived within the configured timeout.
    #[error("timed out connecting to {broker}")]
    ConnectTimeout {
        /// `host:port` of the broker.
        broker: String,
    },

    /// A domain-level error (inventory, discovery, …).
    #[error("domain error")]
    Domain(#[source] BridgeError),
}

impl MqttError {
    /// Convert into a [`BridgeError`] for propagation across port boundaries.
    #[must_use]
    pub fn into_domain(self) -> BridgeError {
        match self {
            Self::Domain(err) => err,
            other => BridgeError::Publish(Box::new(other)),
        }
    }
}

impl From<MqttError> for BridgeError {
    fn from(err: MqttError) -> Self {
        err.into_domain()
    }
}

impl From<BridgeError> for MqttError {
    fn from(err: BridgeError) -> Self {
        Self::Domain(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use yobridge_domain::id::DeviceId;

    #[test]
    fn should_display_refused_error_with_code() {
        let err = MqttError::Refused(ConnectReturnCode::NotAuthorized);
        assert_eq!(
            err.to_string(),
            "MQTT broker refused the connection: NotAuthorized"
        );
    }

    #[test]
    fn should_display_timeout_error() {
        let err = MqttError::ConnectTimeout {
            broker: "localhost:1883".to_string(),
        };
        assert_eq!(err.to_string(), "timed out connecting to localhost:1883");
    }

    #[test]
    fn should_convert_adapter_error_to_publish_error() {
        let err: BridgeError = MqttError::Refused(ConnectReturnCode::ServiceUnavailable).into();
        assert!(matches!(err, BridgeError::Publish(_)));
    }

    #[test]
    fn should_convert_domain_error_back_to_domain() {
        let mqtt_err = MqttError::Domain(BridgeError::UnknownDevice(DeviceId::new("d1")));
        let back: BridgeError = mqtt_err.into();
        assert!(matches!(back, BridgeError::UnknownDevice(_)));
    }
}
