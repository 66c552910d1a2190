//! MQTT connection configuration for both sides of the bridge.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use rumqttc::{MqttOptions, Transport};
use serde::Deserialize;

use yobridge_domain::id::HomeId;

/// Framing used to reach the cloud broker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CloudTransport {
    /// Plain MQTT over a TCP stream.
    #[default]
    Tcp,
    /// MQTT over WebSocket frames.
    #[serde(alias = "websocket", alias = "ws")]
    Websockets,
}

impl CloudTransport {
    /// Port the vendor broker listens on for this transport.
    #[must_use]
    pub fn default_port(self) -> u16 {
        match self {
            Self::Tcp => 8003,
            Self::Websockets => 8004,
        }
    }
}

impl fmt::Display for CloudTransport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Tcp => f.write_str("tcp"),
            Self::Websockets => f.write_str("websockets"),
        }
    }
}

/// Error returned when parsing an unknown transport name.
#[derive(Debug, thiserror::Error)]
#[error("unknown transport `{0}` (expected `tcp` or `websockets`)")]
pub struct UnknownTransport(String);

impl FromStr for CloudTransport {
    type Err = UnknownTransport;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "tcp" => Ok(Self::Tcp),
            "websockets" | "websocket" | "ws" => Ok(Self::Websockets),
            _ => Err(UnknownTransport(s.to_string())),
        }
    }
}

/// Connection to the vendor cloud broker.
#[derive(Clone, Deserialize)]
#[serde(default)]
pub struct CloudConfig {
    /// Cloud broker hostname.
    pub host: String,
    /// Broker port; defaults to the transport's port when absent.
    pub port: Option<u16>,
    /// Stream or WebSocket framing.
    pub transport: CloudTransport,
    /// MQTT client identifier issued by the vendor.
    pub client_id: String,
    /// Access token, sent as the MQTT username.
    pub access_token: String,
    /// Home whose reports are subscribed to.
    pub home_id: HomeId,
    /// Keep-alive interval in seconds.
    pub keep_alive_secs: u16,
    /// How long to wait for the first CONNACK at startup, in seconds.
    pub connect_timeout_secs: u16,
    /// Pause after a connection error before polling again, in seconds.
    pub reconnect_delay_secs: u16,
}

impl Default for CloudConfig {
    fn default() -> Self {
        Self {
            host: "api.yosmart.com".to_string(),
            port: None,
            transport: CloudTransport::Tcp,
            client_id: String::new(),
            access_token: String::new(),
            home_id: HomeId::default(),
            keep_alive_secs: 60,
            connect_timeout_secs: 10,
            reconnect_delay_secs: 5,
        }
    }
}

// The access token never reaches the logs.
impl fmt::Debug for CloudConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CloudConfig")
            .field("host", &self.host)
            .field("port", &self.port())
            .field("transport", &self.transport)
            .field("client_id", &self.client_id)
            .field("access_token", &"***")
            .field("home_id", &self.home_id)
            .field("keep_alive_secs", &self.keep_alive_secs)
            .field("connect_timeout_secs", &self.connect_timeout_secs)
            .field("reconnect_delay_secs", &self.reconnect_delay_secs)
            .finish()
    }
}

impl CloudConfig {
    /// Effective broker port.
    #[must_use]
    pub fn port(&self) -> u16 {
        self.port.unwrap_or_else(|| self.transport.default_port())
    }

    #[must_use]
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(u64::from(self.connect_timeout_secs))
    }

    #[must_use]
    pub fn reconnect_delay(&self) -> Duration {
        Duration::from_secs(u64::from(self.reconnect_delay_secs))
    }

    /// Build the `rumqttc` options: clean session, token as username.
    #[must_use]
    pub fn mqtt_options(&self) -> MqttOptions {
        let port = self.port();
        let mut options = match self.transport {
            CloudTransport::Tcp => MqttOptions::new(&self.client_id, &self.host, port),
            CloudTransport::Websockets => {
                let url = format!("ws://{}:{port}/mqtt", self.host);
                let mut options = MqttOptions::new(&self.client_id, url, port);
                options.set_transport(Transport::Ws);
                options
            }
        };
        options
            .set_keep_alive(Duration::from_secs(u64::from(self.keep_alive_secs)))
            .set_clean_session(true)
            .set_credentials(&self.access_token, "");
        options
    }
}

/// Connection to the local Home Assistant broker.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LocalConfig {
    /// Local broker hostname or IP address.
    pub host: String,
    /// Local broker port.
    pub port: u16,
    /// MQTT client identifier; a random one is generated when absent.
    pub client_id: Option<String>,
    /// Keep-alive interval in seconds.
    pub keep_alive_secs: u16,
    /// How long to wait for the first CONNACK at startup, in seconds.
    pub connect_timeout_secs: u16,
}

impl Default for LocalConfig {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: 1883,
            client_id: None,
            keep_alive_secs: 60,
            connect_timeout_secs: 10,
        }
    }
}

impl LocalConfig {
    #[must_use]
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(u64::from(self.connect_timeout_secs))
    }

    /// Build the `rumqttc` options for an unauthenticated connection.
    #[must_use]
    pub fn mqtt_options(&self) -> MqttOptions {
        let client_id = self
            .client_id
            .clone()
            .unwrap_or_else(|| format!("yobridge-relay-{}", uuid::Uuid::new_v4().simple()));
        let mut options = MqttOptions::new(client_id, &self.host, self.port);
        options.set_keep_alive(Duration::from_secs(u64::from(self.keep_alive_secs)));
        options
    }
}

/// Both connections of the bridge.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct BridgeConfig {
    pub cloud: CloudConfig,
    pub local: LocalConfig,
}
