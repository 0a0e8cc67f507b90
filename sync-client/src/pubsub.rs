//! Publish/subscribe service - broadcast payloads on named channels.

use serde_json::{json, Value};
use std::sync::Arc;
use tidesync_core::Signal;
use tidesync_types::{message_type, ChannelMessage};

use crate::client::{Client, ClientError, NotificationHandler, RpcChannel};
use crate::transport::Transport;

/// Default service name for pub/sub.
pub const PUBSUB_SERVICE: &str = "pubsub";

/// Client-side façade for the pub/sub service.
pub struct PubSub {
    service: String,
    rpc: Arc<dyn RpcChannel>,
    events: Arc<PubSubEvents>,
}

#[derive(Default)]
struct PubSubEvents {
    message_received: Signal<ChannelMessage>,
}

impl NotificationHandler for PubSubEvents {
    fn on_notification(&self, message: &Value) {
        if message_type(message) != Some("message") {
            tracing::error!("unknown message type in pubsub service");
            return;
        }
        match serde_json::from_value::<ChannelMessage>(message.clone()) {
            Ok(msg) => {
                tracing::debug!(channel = %msg.channel, "channel message");
                self.message_received.dispatch(&msg);
            }
            Err(e) => tracing::error!(error = %e, "malformed message in pubsub service"),
        }
    }
}

impl PubSub {
    /// Create a façade calling `service` through `rpc`.
    pub fn new(service: &str, rpc: Arc<dyn RpcChannel>) -> Self {
        Self {
            service: service.to_string(),
            rpc,
            events: Arc::new(PubSubEvents::default()),
        }
    }

    /// Create a façade on [`PUBSUB_SERVICE`] and register its handler.
    pub fn attach<T: Transport + 'static>(client: &Arc<Client<T>>) -> Self {
        let pubsub = Self::new(PUBSUB_SERVICE, client.clone());
        client.register_service(PUBSUB_SERVICE, pubsub.handler());
        pubsub
    }

    /// The notification handler feeding this façade's signal.
    pub fn handler(&self) -> Arc<dyn NotificationHandler> {
        self.events.clone()
    }

    /// Fired for every message on a channel this client subscribed to.
    pub fn message_received(&self) -> &Signal<ChannelMessage> {
        &self.events.message_received
    }

    /// Publish `message` to every subscriber of `channel`.
    pub async fn publish(&self, channel: &str, message: Value) -> Result<(), ClientError> {
        let params = json!({ "channel": channel, "message": message });
        self.rpc
            .call(&self.service, "publish", params)
            .await
            .map(|_| ())
    }

    /// Start receiving messages published on `channel`.
    ///
    /// The server rejects a second subscription to the same channel.
    pub async fn subscribe(&self, channel: &str) -> Result<(), ClientError> {
        self.rpc
            .call(&self.service, "subscribe", json!({ "channel": channel }))
            .await
            .map(|_| ())
    }

    /// Stop receiving messages published on `channel`.
    pub async fn unsubscribe(&self, channel: &str) -> Result<(), ClientError> {
        self.rpc
            .call(&self.service, "unsubscribe", json!({ "channel": channel }))
            .await
            .map(|_| ())
    }
}

impl std::fmt::Debug for PubSub {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PubSub")
            .field("service", &self.service)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ClientConfig;
    use crate::transport::MockTransport;
    use std::sync::Mutex;
    use tidesync_types::Frame;

    async fn setup() -> (Arc<Client<MockTransport>>, MockTransport, PubSub) {
        let transport = MockTransport::new();
        let client = Arc::new(Client::new(ClientConfig::default(), transport.clone()));
        client.connect().await.unwrap();
        let pubsub = PubSub::attach(&client);
        (client, transport, pubsub)
    }

    fn ok(call_id: u64) -> Frame {
        Frame::new(
            PUBSUB_SERVICE,
            json!({"type": "response", "callId": call_id, "data": null}),
        )
    }

    #[tokio::test]
    async fn publish_sends_channel_and_payload() {
        let (_client, transport, pubsub) = setup().await;
        transport.queue_frame(&ok(1));

        pubsub
            .publish("scores", json!({"home": 2, "away": 1}))
            .await
            .unwrap();

        let sent = transport.sent_frames();
        assert_eq!(sent[0].service, "pubsub");
        assert_eq!(sent[0].message["command"], "publish");
        assert_eq!(
            sent[0].message["params"],
            json!({"channel": "scores", "message": {"home": 2, "away": 1}})
        );
    }

    #[tokio::test]
    async fn subscribe_twice_surfaces_server_error() {
        let (_client, transport, pubsub) = setup().await;
        transport.queue_frame(&ok(1));
        transport.queue_frame(&Frame::new(
            PUBSUB_SERVICE,
            json!({"type": "error", "callId": 2, "message": "Already subscribed"}),
        ));

        pubsub.subscribe("news").await.unwrap();
        let err = pubsub.subscribe("news").await.unwrap_err();
        assert!(matches!(err, ClientError::Remote(ref m) if m == "Already subscribed"));
    }

    #[tokio::test]
    async fn unsubscribe_names_channel() {
        let (_client, transport, pubsub) = setup().await;
        transport.queue_frame(&ok(1));

        pubsub.unsubscribe("news").await.unwrap();

        let sent = transport.sent_frames();
        assert_eq!(sent[0].message["command"], "unsubscribe");
        assert_eq!(sent[0].message["params"], json!({"channel": "news"}));
    }

    #[tokio::test]
    async fn channel_message_fires_signal() {
        let (client, transport, pubsub) = setup().await;
        let received = Arc::new(Mutex::new(Vec::new()));
        let sink = received.clone();
        pubsub
            .message_received()
            .subscribe(move |msg: &ChannelMessage| sink.lock().unwrap().push(msg.clone()));

        transport.queue_frame(&Frame::new(
            PUBSUB_SERVICE,
            json!({"type": "message", "channel": "news", "message": "extra!"}),
        ));
        transport.queue_frame(&Frame::new(PUBSUB_SERVICE, json!({"type": "other"})));
        client.run().await.unwrap();

        let received = received.lock().unwrap();
        assert_eq!(received.len(), 1);
        assert_eq!(received[0].channel, "news");
        assert_eq!(received[0].message, json!("extra!"));
    }
}
