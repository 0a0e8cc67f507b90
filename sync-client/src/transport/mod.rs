//! Transport abstraction for tidesync.
//!
//! The client only needs a connection that moves whole frames: each
//! `send` carries one encoded [`Frame`](tidesync_types::Frame) and each
//! `recv` returns one. How frames are delimited (WebSocket messages,
//! length prefixes) is the transport's business.
//!
//! # Example
//!
//! ```ignore
//! let transport = MockTransport::new();
//! transport.connect("ws://localhost:5800/").await?;
//! transport.send(&frame_bytes).await?;
//! let inbound = transport.recv().await?;
//! ```

mod mock;

pub use mock::MockTransport;

use async_trait::async_trait;
use thiserror::Error;

/// Transport errors.
#[derive(Debug, Error)]
pub enum TransportError {
    /// Connection failed.
    #[error("connection failed: {0}")]
    ConnectionFailed(String),

    /// Not connected.
    #[error("not connected")]
    NotConnected,

    /// Connection closed.
    #[error("connection closed")]
    ConnectionClosed,

    /// Send failed.
    #[error("send failed: {0}")]
    SendFailed(String),

    /// Receive failed.
    #[error("receive failed: {0}")]
    ReceiveFailed(String),
}

/// Frame-oriented, connection-based transport.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Connect to the server at `address`.
    async fn connect(&self, address: &str) -> Result<(), TransportError>;

    /// Send one encoded frame.
    async fn send(&self, frame: &[u8]) -> Result<(), TransportError>;

    /// Receive one encoded frame.
    ///
    /// Waits until a frame is available or the connection closes.
    async fn recv(&self) -> Result<Vec<u8>, TransportError>;

    /// Check if currently connected.
    fn is_connected(&self) -> bool;

    /// Close the connection gracefully.
    async fn close(&self) -> Result<(), TransportError>;
}
