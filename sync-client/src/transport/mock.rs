//! Mock transport for testing.
//!
//! Inbound frames are scripted ahead of time; outbound frames are captured
//! for inspection.

use super::{Transport, TransportError};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tidesync_types::{Codec, Frame};

/// In-memory transport with scripted inbound traffic.
///
/// `recv()` returns queued frames in order and reports
/// [`TransportError::ConnectionClosed`] once the queue is empty. Clones
/// share state, so a test can keep one handle while the client owns another.
#[derive(Debug, Default)]
pub struct MockTransport {
    inner: Arc<Mutex<MockState>>,
}

#[derive(Debug, Default)]
struct MockState {
    connected: bool,
    address: Option<String>,
    outbound: Vec<Vec<u8>>,
    inbound: VecDeque<Vec<u8>>,
    fail_connect: Option<String>,
    fail_send: Option<String>,
    fail_recv: Option<String>,
}

impl MockTransport {
    /// Create a new mock transport.
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue raw bytes for a later `recv()`.
    pub fn queue_inbound(&self, data: Vec<u8>) {
        self.state().inbound.push_back(data);
    }

    /// Queue a JSON-encoded frame for a later `recv()`.
    pub fn queue_frame(&self, frame: &Frame) {
        // Frames built from serde_json values always encode
        if let Ok(bytes) = frame.encode(Codec::Json) {
            self.queue_inbound(bytes);
        }
    }

    /// Raw bytes of every frame sent so far.
    pub fn sent(&self) -> Vec<Vec<u8>> {
        self.state().outbound.clone()
    }

    /// Every sent frame that decodes as JSON.
    pub fn sent_frames(&self) -> Vec<Frame> {
        self.state()
            .outbound
            .iter()
            .filter_map(|bytes| Frame::decode(Codec::Json, bytes).ok())
            .collect()
    }

    /// The most recently sent bytes.
    pub fn last_sent(&self) -> Option<Vec<u8>> {
        self.state().outbound.last().cloned()
    }

    /// Address passed to the last successful `connect()`.
    pub fn connected_address(&self) -> Option<String> {
        self.state().address.clone()
    }

    /// Number of inbound frames not yet received.
    pub fn pending_inbound(&self) -> usize {
        self.state().inbound.len()
    }

    /// Cause the next `connect()` to fail with the given error.
    pub fn fail_next_connect(&self, error: &str) {
        self.state().fail_connect = Some(error.to_string());
    }

    /// Cause the next `send()` to fail with the given error.
    pub fn fail_next_send(&self, error: &str) {
        self.state().fail_send = Some(error.to_string());
    }

    /// Cause the next `recv()` to fail with the given error.
    pub fn fail_next_recv(&self, error: &str) {
        self.state().fail_recv = Some(error.to_string());
    }

    /// Clear all state (frames, queue, connection).
    pub fn reset(&self) {
        *self.state() = MockState::default();
    }

    fn state(&self) -> MutexGuard<'_, MockState> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Clone for MockTransport {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn connect(&self, address: &str) -> Result<(), TransportError> {
        let mut state = self.state();
        if let Some(error) = state.fail_connect.take() {
            return Err(TransportError::ConnectionFailed(error));
        }
        state.connected = true;
        state.address = Some(address.to_string());
        Ok(())
    }

    async fn send(&self, frame: &[u8]) -> Result<(), TransportError> {
        let mut state = self.state();
        if !state.connected {
            return Err(TransportError::NotConnected);
        }
        if let Some(error) = state.fail_send.take() {
            return Err(TransportError::SendFailed(error));
        }
        state.outbound.push(frame.to_vec());
        Ok(())
    }

    async fn recv(&self) -> Result<Vec<u8>, TransportError> {
        let mut state = self.state();
        if !state.connected {
            return Err(TransportError::NotConnected);
        }
        if let Some(error) = state.fail_recv.take() {
            return Err(TransportError::ReceiveFailed(error));
        }
        state
            .inbound
            .pop_front()
            .ok_or(TransportError::ConnectionClosed)
    }

    fn is_connected(&self) -> bool {
        self.state().connected
    }

    async fn close(&self) -> Result<(), TransportError> {
        self.state().connected = false;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn connect_records_address() {
        let transport = MockTransport::new();
        assert!(!transport.is_connected());

        transport.connect("ws://localhost:5800/").await.unwrap();

        assert!(transport.is_connected());
        assert_eq!(
            transport.connected_address(),
            Some("ws://localhost:5800/".to_string())
        );
    }

    #[tokio::test]
    async fn queued_frames_arrive_in_order() {
        let transport = MockTransport::new();
        transport.connect("server").await.unwrap();

        transport.queue_frame(&Frame::new("a", json!({"n": 1})));
        transport.queue_frame(&Frame::new("b", json!({"n": 2})));
        assert_eq!(transport.pending_inbound(), 2);

        let first = Frame::decode(Codec::Json, &transport.recv().await.unwrap()).unwrap();
        let second = Frame::decode(Codec::Json, &transport.recv().await.unwrap()).unwrap();
        assert_eq!(first.service, "a");
        assert_eq!(second.service, "b");
    }

    #[tokio::test]
    async fn empty_queue_reports_closed() {
        let transport = MockTransport::new();
        transport.connect("server").await.unwrap();

        let result = transport.recv().await;
        assert!(matches!(result, Err(TransportError::ConnectionClosed)));
    }

    #[tokio::test]
    async fn sent_frames_are_captured() {
        let transport = MockTransport::new();
        transport.connect("server").await.unwrap();

        let frame = Frame::new("messaging", json!({"command": "send"}));
        transport.send(&frame.encode(Codec::Json).unwrap()).await.unwrap();
        transport.send(b"not a frame").await.unwrap();

        assert_eq!(transport.sent().len(), 2);
        assert_eq!(transport.sent_frames(), vec![frame]);
        assert_eq!(transport.last_sent(), Some(b"not a frame".to_vec()));
    }

    #[tokio::test]
    async fn io_without_connect_fails() {
        let transport = MockTransport::new();
        assert!(matches!(
            transport.send(b"data").await,
            Err(TransportError::NotConnected)
        ));
        assert!(matches!(
            transport.recv().await,
            Err(TransportError::NotConnected)
        ));
    }

    #[tokio::test]
    async fn injected_failures_fire_once() {
        let transport = MockTransport::new();
        transport.fail_next_connect("unreachable");
        assert!(matches!(
            transport.connect("server").await,
            Err(TransportError::ConnectionFailed(_))
        ));
        transport.connect("server").await.unwrap();

        transport.fail_next_send("buffer full");
        assert!(transport.send(b"x").await.is_err());
        transport.send(b"x").await.unwrap();

        transport.queue_inbound(b"y".to_vec());
        transport.fail_next_recv("timeout");
        assert!(matches!(
            transport.recv().await,
            Err(TransportError::ReceiveFailed(_))
        ));
        assert_eq!(transport.recv().await.unwrap(), b"y");
    }

    #[tokio::test]
    async fn clones_share_state_and_reset_clears() {
        let a = MockTransport::new();
        let b = a.clone();
        a.connect("server").await.unwrap();
        assert!(b.is_connected());

        b.send(b"from b").await.unwrap();
        assert_eq!(a.sent().len(), 1);

        a.reset();
        assert!(!b.is_connected());
        assert!(b.sent().is_empty());
        assert!(b.connected_address().is_none());
    }

    #[tokio::test]
    async fn close_disconnects() {
        let transport = MockTransport::new();
        transport.connect("server").await.unwrap();
        transport.close().await.unwrap();
        assert!(!transport.is_connected());
    }
}
