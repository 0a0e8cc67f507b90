//! Messaging service - named participants exchanging direct messages.

use serde_json::{json, Value};
use std::sync::Arc;
use tidesync_core::Signal;
use tidesync_types::{message_type, ParticipantMessage};

use crate::client::{Client, ClientError, NotificationHandler, RpcChannel};
use crate::transport::Transport;

/// Default service name for messaging.
pub const MESSAGING_SERVICE: &str = "messaging";

/// Client-side façade for the messaging service.
///
/// RPC methods forward to the server; inbound `message` notifications are
/// published on [`message_received`](Self::message_received).
pub struct Messaging {
    service: String,
    rpc: Arc<dyn RpcChannel>,
    events: Arc<MessagingEvents>,
}

#[derive(Default)]
struct MessagingEvents {
    message_received: Signal<ParticipantMessage>,
}

impl NotificationHandler for MessagingEvents {
    fn on_notification(&self, message: &Value) {
        match message_type(message) {
            Some("message") => match serde_json::from_value(message.clone()) {
                Ok(msg) => {
                    self.message_received.dispatch(&msg);
                }
                Err(e) => {
                    tracing::error!(error = %e, "malformed message in messaging service");
                }
            },
            other => {
                tracing::error!(
                    message_type = other.unwrap_or("<none>"),
                    "unknown message type in messaging service"
                );
            }
        }
    }
}

impl Messaging {
    /// Create a façade calling `service` through `rpc`.
    ///
    /// Notifications only arrive once [`handler`](Self::handler) is
    /// registered with the client; [`attach`](Self::attach) does both.
    pub fn new(service: &str, rpc: Arc<dyn RpcChannel>) -> Self {
        Self {
            service: service.to_string(),
            rpc,
            events: Arc::new(MessagingEvents::default()),
        }
    }

    /// Create a façade on [`MESSAGING_SERVICE`] and register its handler.
    pub fn attach<T: Transport + 'static>(client: &Arc<Client<T>>) -> Self {
        let messaging = Self::new(MESSAGING_SERVICE, client.clone());
        client.register_service(MESSAGING_SERVICE, messaging.handler());
        messaging
    }

    /// The notification handler feeding this façade's signal.
    pub fn handler(&self) -> Arc<dyn NotificationHandler> {
        self.events.clone()
    }

    /// Fired for every message addressed to a participant on this client.
    pub fn message_received(&self) -> &Signal<ParticipantMessage> {
        &self.events.message_received
    }

    /// Register `name` as a participant on this connection.
    pub async fn register_participant(&self, name: &str) -> Result<(), ClientError> {
        self.invoke("registerParticipant", json!({ "name": name }))
            .await
            .map(|_| ())
    }

    /// Unregister a participant previously registered on this connection.
    pub async fn unregister_participant(&self, name: &str) -> Result<(), ClientError> {
        self.invoke("unregisterParticipant", json!({ "name": name }))
            .await
            .map(|_| ())
    }

    /// Names of every registered participant.
    pub async fn list_participants(&self) -> Result<Vec<String>, ClientError> {
        let data = self.invoke("listParticipants", json!({})).await?;
        serde_json::from_value(data)
            .map_err(|e| ClientError::Protocol(format!("participant list: {}", e)))
    }

    /// Send `body` from `sender` (registered here) to `dest`.
    pub async fn send(&self, sender: &str, dest: &str, body: &str) -> Result<(), ClientError> {
        let params = json!({ "sender": sender, "dest": dest, "body": body });
        self.invoke("send", params).await.map(|_| ())
    }

    async fn invoke(&self, command: &str, params: Value) -> Result<Value, ClientError> {
        self.rpc.call(&self.service, command, params).await
    }
}

impl std::fmt::Debug for Messaging {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Messaging")
            .field("service", &self.service)
            .field("message_received", &self.events.message_received)
            .finish()
    }
}
