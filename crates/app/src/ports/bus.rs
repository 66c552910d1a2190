//! Message bus ports: outbound publishing and inbound message handling.

use std::future::Future;

use yobridge_domain::error::BridgeError;

/// Publishes payloads on the local bus.
///
/// Publishing is fire-and-forget: `Ok` means the message was handed to the
/// bus client, not that the broker acknowledged it.
pub trait MessagePublisher {
    /// Publish `payload` on `topic`.
    fn publish(
        &self,
        topic: &str,
        payload: Vec<u8>,
    ) -> impl Future<Output = Result<(), BridgeError>> + Send;
}

impl<T: MessagePublisher + Send + Sync> MessagePublisher for std::sync::Arc<T> {
    fn publish(
        &self,
        topic: &str,
        payload: Vec<u8>,
    ) -> impl Future<Output = Result<(), BridgeError>> + Send {
        (**self).publish(topic, payload)
    }
}

/// Consumes messages received on a bus subscription.
///
/// A connection has at most one handler. Handlers own their error
/// reporting: nothing is returned to the receive loop, which keeps running
/// whatever happens to a single message.
pub trait MessageHandler {
    /// Handle one inbound message.
    fn handle_message(&self, topic: &str, payload: &[u8]) -> impl Future<Output = ()> + Send;
}

impl<T: MessageHandler + Send + Sync> MessageHandler for std::sync::Arc<T> {
    fn handle_message(&self, topic: &str, payload: &[u8]) -> impl Future<Output = ()> + Send {
        (**self).handle_message(topic, payload)
    }
}
