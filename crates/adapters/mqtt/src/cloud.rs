//! Cloud side: subscription to the home's report topic and the inbound loop.

use std::time::Duration;

use rumqttc::{AsyncClient, Event, EventLoop, Packet, QoS};

use yobridge_app::ports::MessageHandler;

/// Drive the cloud event loop, handing every inbound report to `handler`.
///
/// Messages are handled one at a time in arrival order.
pub(crate) async fn run_cloud_loop<H>(
    client: AsyncClient,
    mut event_loop: EventLoop,
    topic: String,
    handler: H,
    reconnect_delay: Duration,
) where
    H: MessageHandler + Send + Sync,
{
    loop {
        match event_loop.poll().await {
            Ok(event) => handle_event(&client, &topic, &handler, event).await,
            Err(err) => {
                tracing::warn!(%err, "cloud broker connection error, retrying");
                tokio::time::sleep(reconnect_delay).await;
            }
        }
    }
}

/// React to one event of the cloud connection.
///
/// The vendor broker starts each session clean, so the subscription is
/// renewed on every CONNACK after a reconnect.
async fn handle_event<H>(client: &AsyncClient, topic: &str, handler: &H, event: Event)
where
    H: MessageHandler + Sync,
{
    match event {
        Event::Incoming(Packet::ConnAck(_)) => {
            tracing::info!(%topic, "reconnected to cloud broker, resubscribing");
            // `try_subscribe` only queues the request; awaiting here could
            // block on a full queue that only this loop drains.
            if let Err(err) = client.try_subscribe(topic, QoS::AtMostOnce) {
                tracing::warn!(%err, %topic, "failed to queue resubscription");
            }
        }
        Event::Incoming(Packet::Publish(publish)) => {
            tracing::debug!(topic = %publish.topic, bytes = publish.payload.len(), "report received");
            handler
                .handle_message(&publish.topic, &publish.payload)
                .await;
        }
        Event::Incoming(Packet::SubAck(ack)) => {
            tracing::debug!(pkid = ack.pkid, codes = ?ack.return_codes, "subscription acknowledged");
        }
        event => tracing::trace!(?event, "cloud broker event"),
    }
}

#[cfg(test)]
mod tests {
    use std::future::Future;
    use std::sync::Mutex;

    use rumqttc::{ConnAck, ConnectReturnCode, MqttOptions, Publish};

    use super::*;

    const TOPIC: &str = "yl-home/h42/+/report";

    #[derive(Default)]
    struct RecordingHandler {
        received: Mutex<Vec<(String, Vec<u8>)>>,
    }

    impl MessageHandler for RecordingHandler {
        fn handle_message(&self, topic: &str, payload: &[u8]) -> impl Future<Output = ()> + Send {
            self.received
                .lock()
                .unwrap()
                .push((topic.to_string(), payload.to_vec()));
            async {}
        }
    }

    /// A client whose request queue holds `capacity` requests; nothing drains it.
    fn client(capacity: usize) -> (AsyncClient, EventLoop) {
        AsyncClient::new(MqttOptions::new("test", "localhost", 1883), capacity)
    }

    fn connack() -> Event {
        Event::Incoming(Packet::ConnAck(ConnAck::new(
            ConnectReturnCode::Success,
            false,
        )))
    }

    #[tokio::test]
    async fn should_queue_subscription_on_every_connack() {
        let (client, _event_loop) = client(2);
        let handler = RecordingHandler::default();

        handle_event(&client, TOPIC, &handler, connack()).await;
        handle_event(&client, TOPIC, &handler, connack()).await;

        // Both resubscriptions occupy the queue, so a third request is refused.
        assert!(client.try_subscribe(TOPIC, QoS::AtMostOnce).is_err());
        assert!(handler.received.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn should_not_subscribe_on_other_events() {
        let (client, _event_loop) = client(1);
        let handler = RecordingHandler::default();

        handle_event(&client, TOPIC, &handler, Event::Incoming(Packet::PingResp)).await;

        assert!(client.try_subscribe(TOPIC, QoS::AtMostOnce).is_ok());
    }

    #[tokio::test]
    async fn should_dispatch_publish_to_handler() {
        let (client, _event_loop) = client(1);
        let handler = RecordingHandler::default();
        let payload = br#"{"deviceId":"d1","event":"DoorSensor.Alert","data":{"state":"open"}}"#;

        handle_event(
            &client,
            TOPIC,
            &handler,
            Event::Incoming(Packet::Publish(Publish::new(
                "yl-home/h42/d1/report",
                QoS::AtMostOnce,
                payload.to_vec(),
            ))),
        )
        .await;

        assert_eq!(
            *handler.received.lock().unwrap(),
            vec![("yl-home/h42/d1/report".to_string(), payload.to_vec())]
        );
        // Dispatching a report never touches the subscription.
        assert!(client.try_subscribe(TOPIC, QoS::AtMostOnce).is_ok());
    }
}
