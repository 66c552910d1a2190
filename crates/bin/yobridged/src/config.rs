//! Configuration loading: TOML file with environment variable overrides.
//!
//! Looks for `yobridge.toml` in the working directory, or at the path named
//! by `YOBRIDGE_CONFIG`. Every field except the cloud credentials has a
//! sensible default so the file is optional. Environment variables take
//! precedence over file values.

use std::path::{Path, PathBuf};

use serde::Deserialize;

use yobridge_adapter_mqtt::{BridgeConfig, CloudConfig, LocalConfig};
use yobridge_domain::id::HomeId;

const DEFAULT_CONFIG_PATH: &str = "yobridge.toml";

/// Top-level configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Vendor cloud broker.
    pub cloud: CloudConfig,
    /// Local Home Assistant broker.
    pub local: LocalConfig,
    /// Where the device inventory comes from.
    pub inventory: InventoryConfig,
    /// Logging settings.
    pub logging: LoggingConfig,
    /// Environment overrides that were rejected, reported once logging is up.
    #[serde(skip)]
    pub override_warnings: Vec<String>,
}

/// Device inventory location.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct InventoryConfig {
    /// Path of the JSON document returned by the vendor device-list call.
    pub path: PathBuf,
}

/// Logging configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Filter directive (`RUST_LOG` syntax).
    pub filter: String,
}

impl Config {
    /// Load configuration from `yobridge.toml` (if present) then apply
    /// environment-variable overrides.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML file exists but is malformed, or if the
    /// resulting configuration is missing credentials.
    pub fn load() -> Result<Self, ConfigError> {
        let path = std::env::var("YOBRIDGE_CONFIG").unwrap_or_else(|_| DEFAULT_CONFIG_PATH.into());
        let mut config = Self::from_file(path)?;
        config.apply_overrides(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(content) => toml::from_str(&content).map_err(ConfigError::Parse),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(err) => Err(ConfigError::Io(err)),
        }
    }

    fn apply_overrides(&mut self, var: impl Fn(&str) -> Option<String>) {
        if let Some(val) = var("YOBRIDGE_CLOUD_HOST") {
            self.cloud.host = val;
        }
        if let Some(val) = var("YOBRIDGE_CLIENT_ID") {
            self.cloud.client_id = val;
        }
        if let Some(val) = var("YOBRIDGE_ACCESS_TOKEN") {
            self.cloud.access_token = val;
        }
        if let Some(val) = var("YOBRIDGE_HOME_ID") {
            self.cloud.home_id = HomeId::new(val);
        }
        if let Some(val) = var("YOBRIDGE_TRANSPORT") {
            match val.parse() {
                Ok(transport) => self.cloud.transport = transport,
                Err(err) => self
                    .override_warnings
                    .push(format!("ignoring YOBRIDGE_TRANSPORT: {err}")),
            }
        }
        if let Some(val) = var("YOBRIDGE_LOCAL_HOST") {
            self.local.host = val;
        }
        if let Some(val) = var("YOBRIDGE_LOCAL_PORT") {
            match val.parse() {
                Ok(port) => self.local.port = port,
                Err(err) => self
                    .override_warnings
                    .push(format!("ignoring YOBRIDGE_LOCAL_PORT `{val}`: {err}")),
            }
        }
        if let Some(val) = var("YOBRIDGE_INVENTORY") {
            self.inventory.path = PathBuf::from(val);
        }
        if let Some(val) = var("YOBRIDGE_LOG") {
            self.logging.filter = val;
        }
        if let Some(val) = var("RUST_LOG") {
            self.logging.filter = val;
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.cloud.home_id.is_empty() {
            return Err(ConfigError::Validation("cloud.home_id is required".into()));
        }
        if self.cloud.client_id.trim().is_empty() {
            return Err(ConfigError::Validation("cloud.client_id is required".into()));
        }
        if self.cloud.access_token.trim().is_empty() {
            return Err(ConfigError::Validation(
                "cloud.access_token is required".into(),
            ));
        }
        if self.local.port == 0 {
            return Err(ConfigError::Validation(
                "local.port must be non-zero".into(),
            ));
        }
        Ok(())
    }

    /// Broker settings handed to the MQTT adapter.
    #[must_use]
    pub fn bridge(&self) -> BridgeConfig {
        BridgeConfig {
            cloud: self.cloud.clone(),
            local: self.local.clone(),
        }
    }
}

impl Default for InventoryConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("devices.json"),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "yobridged=info,yobridge=info".to_string(),
        }
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// TOML parse failure.
    #[error("failed to parse config file")]
    Parse(#[from] toml::de::Error),
    /// File I/O failure.
    #[error("failed to read config file")]
    Io(#[from] std::io::Error),
    /// Semantic validation failure.
    #[error("invalid configuration: {0}")]
    Validation(String),
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use yobridge_adapter_mqtt::CloudTransport;

    use super::*;

    fn valid() -> Config {
        let mut config = Config::default();
        config.cloud.client_id = "ua_123".to_string();
        config.cloud.access_token = "token".to_string();
        config.cloud.home_id = HomeId::new("h42");
        config
    }

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn should_produce_sensible_defaults() {
        let config = Config::default();
        assert_eq!(config.cloud.host, "api.yosmart.com");
        assert_eq!(config.cloud.port(), 8003);
        assert_eq!(config.local.host, "localhost");
        assert_eq!(config.local.port, 1883);
        assert_eq!(config.inventory.path, PathBuf::from("devices.json"));
        assert_eq!(config.logging.filter, "yobridged=info,yobridge=info");
    }

    #[test]
    fn should_parse_minimal_toml() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.local.port, 1883);
    }

    #[test]
    fn should_parse_full_toml() {
        let toml = "
            [cloud]
            host = 'mqtt.example.com'
            port = 18003
            transport = 'websockets'
            client_id = 'ua_123'
            access_token = 'token'
            home_id = 'h42'
            keep_alive_secs = 30

            [local]
            host = '192.168.1.10'
            port = 1884
            client_id = 'relay'

            [inventory]
            path = '/etc/yobridge/devices.json'

            [logging]
            filter = 'debug'
        ";
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.cloud.host, "mqtt.example.com");
        assert_eq!(config.cloud.port(), 18003);
        assert_eq!(config.cloud.transport, CloudTransport::Websockets);
        assert_eq!(config.cloud.keep_alive_secs, 30);
        assert_eq!(config.local.host, "192.168.1.10");
        assert_eq!(config.local.port, 1884);
        assert_eq!(
            config.inventory.path,
            PathBuf::from("/etc/yobridge/devices.json")
        );
        assert_eq!(config.logging.filter, "debug");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn should_return_default_when_file_not_found() {
        let config = Config::from_file("nonexistent.toml").unwrap();
        assert_eq!(config.local.port, 1883);
    }

    #[test]
    fn should_report_parse_error_for_invalid_toml() {
        let result: Result<Config, _> = toml::from_str("invalid {{{");
        assert!(result.is_err());
    }

    #[test]
    fn should_apply_overrides_over_file_values() {
        let mut config = valid();
        config.apply_overrides(env(&[
            ("YOBRIDGE_CLOUD_HOST", "cloud.local"),
            ("YOBRIDGE_HOME_ID", "h99"),
            ("YOBRIDGE_TRANSPORT", "ws"),
            ("YOBRIDGE_LOCAL_HOST", "broker"),
            ("YOBRIDGE_LOCAL_PORT", "1884"),
            ("YOBRIDGE_INVENTORY", "inv.json"),
            ("YOBRIDGE_LOG", "trace"),
        ]));
        assert_eq!(config.cloud.host, "cloud.local");
        assert_eq!(config.cloud.home_id, HomeId::new("h99"));
        assert_eq!(config.cloud.transport, CloudTransport::Websockets);
        assert_eq!(config.local.host, "broker");
        assert_eq!(config.local.port, 1884);
        assert_eq!(config.inventory.path, PathBuf::from("inv.json"));
        assert_eq!(config.logging.filter, "trace");
    }

    #[test]
    fn should_prefer_rust_log_over_yobridge_log() {
        let mut config = valid();
        config.apply_overrides(env(&[("YOBRIDGE_LOG", "trace"), ("RUST_LOG", "warn")]));
        assert_eq!(config.logging.filter, "warn");
    }

    #[test]
    fn should_ignore_unparseable_overrides() {
        let mut config = valid();
        config.apply_overrides(env(&[
            ("YOBRIDGE_TRANSPORT", "udp"),
            ("YOBRIDGE_LOCAL_PORT", "not-a-port"),
        ]));
        assert_eq!(config.cloud.transport, CloudTransport::Tcp);
        assert_eq!(config.local.port, 1883);
        assert_eq!(config.override_warnings.len(), 2);
        assert!(config.override_warnings[0].starts_with("ignoring YOBRIDGE_TRANSPORT"));
        assert!(config.override_warnings[1].starts_with("ignoring YOBRIDGE_LOCAL_PORT"));
    }

    #[test]
    fn should_collect_no_warnings_for_valid_overrides() {
        let mut config = valid();
        config.apply_overrides(env(&[
            ("YOBRIDGE_TRANSPORT", "tcp"),
            ("YOBRIDGE_LOCAL_PORT", "1884"),
        ]));
        assert!(config.override_warnings.is_empty());
    }

    #[test]
    fn should_reject_missing_home_id() {
        let mut config = valid();
        config.cloud.home_id = HomeId::default();
        assert!(matches!(config.validate(), Err(ConfigError::Validation(_))));
    }

    #[test]
    fn should_reject_missing_credentials() {
        let mut config = valid();
        config.cloud.access_token = String::new();
        assert!(config.validate().is_err());

        let mut config = valid();
        config.cloud.client_id = " ".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn should_reject_zero_local_port() {
        let mut config = valid();
        config.local.port = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn should_build_bridge_config() {
        let config = valid();
        let bridge = config.bridge();
        assert_eq!(bridge.cloud.client_id, "ua_123");
        assert_eq!(bridge.local.port, 1883);
    }
}
