//! Client - RPC correlation and notification routing over a [`Transport`].
//!
//! Every frame on the wire is addressed to a named service. Outbound, the
//! client wraps calls in [`RpcRequest`]s tagged with a fresh [`CallId`].
//! Inbound, replies are matched to their calls by id and everything else
//! is handed to the [`NotificationHandler`] registered for the service.
//!
//! ```text
//! Façade ──call──→ Client ──Frame──→ Transport ──→ Server
//!                     ↑                                │
//! Handler ←─notify── Client ←──Frame── Transport ←─────┘
//! ```
//!
//! Inbound traffic is only read while someone pumps: [`Client::call`]
//! pumps until its own reply arrives, and [`Client::run`] pumps until the
//! connection closes. Only one task reads at a time; replies it reads on
//! behalf of other callers are buffered for them.
//!
//! # Example
//!
//! ```ignore
//! use tidesync_client::{Client, ClientConfig, MockTransport};
//!
//! let client = Client::new(ClientConfig::default(), MockTransport::new());
//! client.connect().await?;
//! let data = client.call("messaging", "listParticipants", json!({})).await?;
//! ```

use async_trait::async_trait;
use dashmap::{DashMap, DashSet};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock};
use std::time::Duration;
use thiserror::Error;
use tidesync_types::{CallId, Frame, RpcReply, RpcRequest, SyncError};
use tokio::sync::Mutex;

use crate::config::ClientConfig;
use crate::transport::{Transport, TransportError};

/// Client errors.
#[derive(Debug, Error)]
pub enum ClientError {
    /// Transport error.
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    /// Frame could not be encoded or decoded.
    #[error("codec error: {0}")]
    Codec(#[from] SyncError),

    /// Not connected to the server.
    #[error("not connected")]
    NotConnected,

    /// Connection failed.
    #[error("connection failed: {0}")]
    ConnectionFailed(String),

    /// The server answered the call with an error.
    #[error("{0}")]
    Remote(String),

    /// The server sent something the caller could not interpret.
    #[error("protocol error: {0}")]
    Protocol(String),

    /// No reply arrived within the configured call timeout.
    #[error("call {0} timed out")]
    Timeout(CallId),
}

impl ClientError {
    /// Whether this error means the connection has gone away.
    pub fn is_closed(&self) -> bool {
        matches!(
            self,
            ClientError::NotConnected | ClientError::Transport(TransportError::ConnectionClosed)
        )
    }
}

/// Receiver of a service's non-reply messages.
pub trait NotificationHandler: Send + Sync {
    /// Handle one notification body addressed to this service.
    fn on_notification(&self, message: &Value);
}

/// Object-safe view of a client's call path, used by the service façades.
#[async_trait]
pub trait RpcChannel: Send + Sync {
    /// Invoke `command` on `service` and wait for the reply data.
    async fn call(
        &self,
        service: &str,
        command: &str,
        params: Value,
    ) -> Result<Value, ClientError>;
}

type Outcome = Result<Value, String>;

/// Marks a call as outstanding for as long as it is alive.
///
/// Dropping it, including when the call future is cancelled, forgets the
/// call and any reply buffered for it.
struct PendingCall<'a> {
    pending: &'a DashSet<CallId>,
    replies: &'a DashMap<CallId, Outcome>,
    call_id: CallId,
}

impl<'a> PendingCall<'a> {
    fn register(
        pending: &'a DashSet<CallId>,
        replies: &'a DashMap<CallId, Outcome>,
        call_id: CallId,
    ) -> Self {
        pending.insert(call_id);
        Self {
            pending,
            replies,
            call_id,
        }
    }
}

impl Drop for PendingCall<'_> {
    fn drop(&mut self) {
        self.pending.remove(&self.call_id);
        self.replies.remove(&self.call_id);
    }
}

/// A connection to a tidesync server.
pub struct Client<T: Transport> {
    config: ClientConfig,
    transport: T,
    next_call_id: AtomicU64,
    handlers: RwLock<HashMap<String, Arc<dyn NotificationHandler>>>,
    pending: DashSet<CallId>,
    replies: DashMap<CallId, Outcome>,
    inbound: Mutex<()>,
}

impl<T: Transport> Client<T> {
    /// Create a new client. Call ids start at 1.
    pub fn new(config: ClientConfig, transport: T) -> Self {
        Self {
            config,
            transport,
            next_call_id: AtomicU64::new(1),
            handlers: RwLock::new(HashMap::new()),
            pending: DashSet::new(),
            replies: DashMap::new(),
            inbound: Mutex::new(()),
        }
    }

    /// Connect to the configured server address.
    pub async fn connect(&self) -> Result<(), ClientError> {
        let address = &self.config.server.address;
        self.transport
            .connect(address)
            .await
            .map_err(|e| ClientError::ConnectionFailed(e.to_string()))?;
        tracing::info!(address = %address, codec = ?self.config.codec.format, "connected");
        Ok(())
    }

    /// Check if connected.
    pub fn is_connected(&self) -> bool {
        self.transport.is_connected()
    }

    /// Close the connection. Outstanding calls are forgotten.
    pub async fn disconnect(&self) -> Result<(), ClientError> {
        self.transport.close().await?;
        self.pending.clear();
        self.replies.clear();
        tracing::info!("disconnected");
        Ok(())
    }

    /// Route notifications for `service` to `handler`.
    ///
    /// Returns the handler previously registered for the service, if any.
    pub fn register_service(
        &self,
        service: &str,
        handler: Arc<dyn NotificationHandler>,
    ) -> Option<Arc<dyn NotificationHandler>> {
        self.handlers
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(service.to_string(), handler)
    }

    /// Stop routing notifications for `service`.
    pub fn unregister_service(&self, service: &str) -> Option<Arc<dyn NotificationHandler>> {
        self.handlers
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(service)
    }

    /// Encode and send one frame.
    pub async fn send_frame(&self, frame: &Frame) -> Result<(), ClientError> {
        if !self.transport.is_connected() {
            return Err(ClientError::NotConnected);
        }
        let bytes = frame.encode(self.config.codec.format)?;
        self.transport.send(&bytes).await?;
        Ok(())
    }

    /// Invoke `command` on `service` and wait for its reply.
    ///
    /// Notifications that arrive while waiting are dispatched as usual.
    /// An error reply becomes [`ClientError::Remote`]. With a non-zero
    /// `rpc.call_timeout_ms`, waiting longer fails with
    /// [`ClientError::Timeout`].
    pub async fn call(
        &self,
        service: &str,
        command: &str,
        params: Value,
    ) -> Result<Value, ClientError> {
        if !self.transport.is_connected() {
            return Err(ClientError::NotConnected);
        }

        let call_id = CallId::new(self.next_call_id.fetch_add(1, Ordering::Relaxed));
        let request = RpcRequest {
            command: command.to_string(),
            params,
            call_id,
        };
        tracing::debug!(service, command, %call_id, "calling");

        let _pending = PendingCall::register(&self.pending, &self.replies, call_id);
        let outcome = match self.config.rpc.call_timeout_ms {
            0 => self.await_reply(service, &request).await,
            ms => tokio::time::timeout(
                Duration::from_millis(ms),
                self.await_reply(service, &request),
            )
            .await
            .map_err(|_| {
                tracing::warn!(service, command, %call_id, timeout_ms = ms, "call timed out");
                ClientError::Timeout(call_id)
            })?,
        };

        outcome?.map_err(ClientError::Remote)
    }

    async fn await_reply(
        &self,
        service: &str,
        request: &RpcRequest,
    ) -> Result<Outcome, ClientError> {
        self.send_frame(&Frame::new(service, request.to_value()?)).await?;

        let call_id = request.call_id;
        loop {
            if let Some((_, outcome)) = self.replies.remove(&call_id) {
                return Ok(outcome);
            }

            let _reader = self.inbound.lock().await;
            // Another reader may have buffered our reply while we waited
            if let Some((_, outcome)) = self.replies.remove(&call_id) {
                return Ok(outcome);
            }
            match self.read_one(Some(call_id)).await {
                Ok(Some(outcome)) => return Ok(outcome),
                Ok(None) => {}
                Err(ClientError::Codec(e)) => {
                    tracing::warn!(error = %e, %call_id, "dropping undecodable frame");
                }
                Err(e) => return Err(e),
            }
        }
    }

    /// Read and dispatch one inbound frame.
    pub async fn pump(&self) -> Result<(), ClientError> {
        let _reader = self.inbound.lock().await;
        self.read_one(None).await.map(|_| ())
    }

    /// Pump until the connection closes.
    ///
    /// Frames that fail to decode are logged and skipped. Returns `Ok` when
    /// the server closes the connection.
    pub async fn run(&self) -> Result<(), ClientError> {
        loop {
            match self.pump().await {
                Ok(()) => {}
                Err(ClientError::Codec(e)) => {
                    tracing::warn!(error = %e, "dropping undecodable frame");
                }
                Err(e) if e.is_closed() => return Ok(()),
                Err(e) => return Err(e),
            }
        }
    }

    /// Number of replies received for calls that have not collected them.
    pub fn buffered_replies(&self) -> usize {
        self.replies.len()
    }

    /// Get a reference to the underlying transport (for testing).
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// The configuration this client was built with.
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Receive one frame. A reply for `awaiting` is returned instead of
    /// buffered. Callers must hold the inbound lock.
    async fn read_one(&self, awaiting: Option<CallId>) -> Result<Option<Outcome>, ClientError> {
        let bytes = self.transport.recv().await?;
        let frame = Frame::decode(self.config.codec.format, &bytes)?;

        match RpcReply::from_message(&frame.message)? {
            Some(reply) => Ok(self.accept_reply(reply, awaiting)),
            None => {
                self.dispatch(&frame);
                Ok(None)
            }
        }
    }

    fn accept_reply(&self, reply: RpcReply, awaiting: Option<CallId>) -> Option<Outcome> {
        let call_id = reply.call_id();
        if awaiting == Some(call_id) {
            return Some(reply.into_result());
        }
        // At most one buffered reply per outstanding call
        if !self.pending.contains(&call_id) {
            tracing::warn!(%call_id, "reply for unknown call");
            return None;
        }
        self.replies.insert(call_id, reply.into_result());
        None
    }

    fn dispatch(&self, frame: &Frame) {
        let handler = self
            .handlers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&frame.service)
            .cloned();

        match handler {
            Some(handler) => {
                tracing::debug!(service = %frame.service, "routing notification");
                handler.on_notification(&frame.message);
            }
            None => {
                tracing::error!(service = %frame.service, "notification for unknown service");
            }
        }
    }
}

#[async_trait]
impl<T: Transport> RpcChannel for Client<T> {
    async fn call(
        &self,
        service: &str,
        command: &str,
        params: Value,
    ) -> Result<Value, ClientError> {
        Client::call(self, service, command, params).await
    }
}

impl<T: Transport> std::fmt::Debug for Client<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Client")
            .field("config", &self.config)
            .field("pending", &self.pending.len())
            .field("buffered", &self.replies.len())
            .finish_non_exhaustive()
    }
}
