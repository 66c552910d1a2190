//! Thin helpers over `rumqttc`: connection setup, the local publisher, and
//! the background poll loop of the local relay.

use std::time::Duration;

use rumqttc::{AsyncClient, ConnectReturnCode, Event, EventLoop, MqttOptions, Packet, QoS};

use yobridge_app::ports::MessagePublisher;
use yobridge_domain::error::BridgeError;

use crate::error::MqttError;

/// Capacity of the request queue between a client handle and its event loop.
const REQUEST_CAPACITY: usize = 64;

/// Create a client and drive its event loop until the broker accepts the
/// connection.
///
/// # Errors
///
/// - [`MqttError::Connection`] if the network connection fails.
/// - [`MqttError::Refused`] if the broker rejects the CONNECT.
/// - [`MqttError::ConnectTimeout`] if no CONNACK arrives within `timeout`.
pub(crate) async fn connect(
    options: MqttOptions,
    timeout: Duration,
) -> Result<(AsyncClient, EventLoop), MqttError> {
    let (host, port) = options.broker_address();
    let (client, mut event_loop) = AsyncClient::new(options, REQUEST_CAPACITY);

    match tokio::time::timeout(timeout, wait_for_connack(&mut event_loop)).await {
        Ok(result) => result?,
        Err(_) => {
            return Err(MqttError::ConnectTimeout {
                broker: format!("{host}:{port}"),
            });
        }
    }

    tracing::info!(%host, port, "connected to MQTT broker");
    Ok((client, event_loop))
}

async fn wait_for_connack(event_loop: &mut EventLoop) -> Result<(), MqttError> {
    loop {
        match event_loop.poll().await {
            Ok(Event::Incoming(Packet::ConnAck(ack))) => {
                return match ack.code {
                    ConnectReturnCode::Success => Ok(()),
                    code => Err(MqttError::Refused(code)),
                };
            }
            Ok(event) => tracing::trace!(?event, "MQTT event before CONNACK"),
            Err(err) => return Err(MqttError::Connection(err)),
        }
    }
}

/// [`MessagePublisher`] over a `rumqttc` client: QoS 0, never retained.
#[derive(Clone)]
pub struct MqttPublisher {
    client: AsyncClient,
}

impl MqttPublisher {
    #[must_use]
    pub fn new(client: AsyncClient) -> Self {
        Self { client }
    }
}

impl MessagePublisher for MqttPublisher {
    async fn publish(&self, topic: &str, payload: Vec<u8>) -> Result<(), BridgeError> {
        self.client
            .publish(topic, QoS::AtMostOnce, false, payload)
            .await
            .map_err(|err| MqttError::Client(err).into_domain())
    }
}

/// Keep the local connection alive and surface broker chatter in the logs.
///
/// `rumqttc` reconnects on the next poll after an error.
pub(crate) async fn run_relay_loop(mut event_loop: EventLoop, reconnect_delay: Duration) {
    loop {
        match event_loop.poll().await {
            Ok(Event::Incoming(Packet::ConnAck(_))) => {
                tracing::info!("reconnected to local broker");
            }
            Ok(event) => tracing::debug!(?event, "local broker event"),
            Err(err) => {
                tracing::warn!(%err, "local broker connection error, retrying");
                tokio::time::sleep(reconnect_delay).await;
            }
        }
    }
}
