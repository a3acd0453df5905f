// ABOUTME: Per-session SSE transport relaying frames between one client stream and the protocol server
// ABOUTME: Owns the outbound frame queue, the inbound message channel and the close signal
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # SSE Transport
//!
//! One [`SseTransport`] exists per session. Its outbound queue feeds the
//! session's SSE response body; its inbound channel feeds the protocol server
//! through an [`McpChannel`] obtained from [`SseTransport::start`].
//!
//! Posted messages arrive through [`SseTransport::handle_post_message`], which
//! enforces the content type, the body size limit and JSON-RPC 2.0 framing
//! before relaying each message inbound.

use super::session::SessionId;
use crate::config::SseConfig;
use crate::errors::{AppError, AppResult, TransportError};
use axum::body::Body;
use axum::response::sse::Event;
use futures_util::StreamExt;
use http::{header, Request};
use mcp_bridge_core::constants::{protocol, routes};
use serde_json::Value;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::{mpsc, watch};
use tracing::debug;

/// One outbound SSE frame
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SseMessage {
    /// SSE `event:` field
    pub event: String,
    /// SSE `data:` field
    pub data: String,
}

impl SseMessage {
    /// Protocol frame pushed by the server
    #[must_use]
    pub fn message(data: String) -> Self {
        Self {
            event: protocol::MESSAGE_EVENT.to_owned(),
            data,
        }
    }

    /// Convert into an axum SSE event
    #[must_use]
    pub fn into_event(self) -> Event {
        Event::default().event(self.event).data(self.data)
    }
}

#[derive(Debug)]
enum InboundState {
    Idle,
    Connected(mpsc::Sender<Value>),
    Shutdown,
}

/// Per-session SSE transport
#[derive(Debug)]
pub struct SseTransport {
    session_id: SessionId,
    endpoint: String,
    outbound: mpsc::Sender<SseMessage>,
    inbound: Mutex<InboundState>,
    inbound_buffer: usize,
    closed: watch::Sender<bool>,
}

impl SseTransport {
    /// Create a transport with a fresh session id, announcing `messages_path`
    /// as its message endpoint. The returned receiver drains outbound frames.
    #[must_use]
    pub fn new(messages_path: &str, config: &SseConfig) -> (Self, mpsc::Receiver<SseMessage>) {
        let session_id = SessionId::generate();
        let endpoint = format!(
            "{messages_path}?{}={session_id}",
            routes::SESSION_ID_PARAM
        );
        let (outbound, outbound_rx) = mpsc::channel(config.outbound_buffer.max(1));
        let (closed, _) = watch::channel(false);

        let transport = Self {
            session_id,
            endpoint,
            outbound,
            inbound: Mutex::new(InboundState::Idle),
            inbound_buffer: config.inbound_buffer.max(1),
            closed,
        };
        (transport, outbound_rx)
    }

    /// Session id minted at creation
    #[must_use]
    pub const fn session_id(&self) -> &SessionId {
        &self.session_id
    }

    /// Message endpoint announced as the stream's first event
    #[must_use]
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Whether `close` has been called
    #[must_use]
    pub fn is_closed(&self) -> bool {
        *self.closed.borrow()
    }

    /// Whether a protocol server currently holds the inbound side
    #[must_use]
    pub fn is_connected(&self) -> bool {
        matches!(*self.lock_inbound(), InboundState::Connected(_))
    }

    /// Receiver that flips to `true` once the transport is closed
    #[must_use]
    pub fn subscribe_closed(&self) -> watch::Receiver<bool> {
        self.closed.subscribe()
    }

    /// Hand the transport to a protocol server
    ///
    /// # Errors
    ///
    /// Returns an error if the transport was already started or is closed
    pub fn start(self: &Arc<Self>) -> AppResult<McpChannel> {
        let mut inbound = self.lock_inbound();
        match *inbound {
            InboundState::Idle => {}
            InboundState::Connected(_) => {
                return Err(AppError::internal(format!(
                    "Transport for session {} already started",
                    self.session_id
                )));
            }
            InboundState::Shutdown => {
                return Err(AppError::delivery(format!(
                    "Transport for session {} is closed",
                    self.session_id
                )));
            }
        }

        let (sender, receiver) = mpsc::channel(self.inbound_buffer);
        *inbound = InboundState::Connected(sender);
        drop(inbound);

        debug!(session_id = %self.session_id, "Transport started");
        Ok(McpChannel {
            transport: Arc::clone(self),
            inbound: receiver,
            closed: self.closed.subscribe(),
        })
    }

    /// Validate a posted request and relay its message(s) to the protocol server
    ///
    /// # Errors
    ///
    /// Returns a [`TransportError`] if the transport is not connected, the
    /// content type is not JSON, the body is too large or malformed, or the
    /// protocol server has gone away
    pub async fn handle_post_message(&self, request: Request<Body>) -> Result<(), TransportError> {
        let sender = self.inbound_sender()?;

        let content_type = request
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .unwrap_or_default();
        if !is_json_content_type(content_type) {
            return Err(TransportError::UnsupportedContentType(
                content_type.to_owned(),
            ));
        }

        let body = read_body(request.into_body(), protocol::MAXIMUM_MESSAGE_SIZE).await?;
        let messages = parse_messages(&body)?;

        for message in messages {
            sender
                .send(message)
                .await
                .map_err(|_| TransportError::Closed(self.session_id.to_string()))?;
        }
        Ok(())
    }

    /// Queue a protocol frame for the client
    ///
    /// # Errors
    ///
    /// Returns an error if the frame cannot be serialized or the stream is gone
    pub async fn send(&self, frame: &Value) -> AppResult<()> {
        if self.is_closed() {
            return Err(AppError::delivery(format!(
                "Transport for session {} is closed",
                self.session_id
            )));
        }
        let data = serde_json::to_string(frame)?;
        self.outbound
            .send(SseMessage::message(data))
            .await
            .map_err(|_| {
                AppError::delivery(format!(
                    "SSE stream for session {} has ended",
                    self.session_id
                ))
            })
    }

    /// Close the transport: the SSE stream ends and the protocol server's
    /// inbound channel is drained then closed. Idempotent.
    pub fn close(&self) {
        let was_closed = self.closed.send_replace(true);
        *self.lock_inbound() = InboundState::Shutdown;
        if !was_closed {
            debug!(session_id = %self.session_id, "Transport closed");
        }
    }

    fn inbound_sender(&self) -> Result<mpsc::Sender<Value>, TransportError> {
        match &*self.lock_inbound() {
            InboundState::Connected(sender) => Ok(sender.clone()),
            InboundState::Idle => Err(TransportError::NotConnected(self.session_id.to_string())),
            InboundState::Shutdown => Err(TransportError::Closed(self.session_id.to_string())),
        }
    }

    fn lock_inbound(&self) -> MutexGuard<'_, InboundState> {
        self.inbound.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Protocol-server half of a transport
#[derive(Debug)]
pub struct McpChannel {
    transport: Arc<SseTransport>,
    inbound: mpsc::Receiver<Value>,
    closed: watch::Receiver<bool>,
}

impl McpChannel {
    /// Session this channel belongs to
    #[must_use]
    pub fn session_id(&self) -> &SessionId {
        self.transport.session_id()
    }

    /// Shared handle to the underlying transport, for sending from another task
    #[must_use]
    pub const fn transport(&self) -> &Arc<SseTransport> {
        &self.transport
    }

    /// Next message posted by the client; `None` once the transport is closed
    pub async fn recv(&mut self) -> Option<Value> {
        self.inbound.recv().await
    }

    /// Push a frame to the client as an `event: message`
    ///
    /// # Errors
    ///
    /// Returns an error if the stream is closed
    pub async fn send(&self, frame: &Value) -> AppResult<()> {
        self.transport.send(frame).await
    }

    /// Resolves once the transport is closed
    pub async fn closed(&mut self) {
        // A dropped sender means the transport itself is gone
        let _ = self.closed.wait_for(|closed| *closed).await;
    }

    /// Close the transport from the protocol side
    pub fn close(&self) {
        self.transport.close();
    }
}

fn is_json_content_type(value: &str) -> bool {
    value
        .split(';')
        .next()
        .is_some_and(|essence| essence.trim().eq_ignore_ascii_case(protocol::JSON_CONTENT_TYPE))
}

async fn read_body(body: Body, limit: usize) -> Result<Vec<u8>, TransportError> {
    let mut stream = body.into_data_stream();
    let mut buffer = Vec::new();
    while let Some(chunk) = stream.next().await {
        let chunk = chunk.map_err(|e| TransportError::BodyRead(e.to_string()))?;
        if buffer.len() + chunk.len() > limit {
            return Err(TransportError::PayloadTooLarge { limit });
        }
        buffer.extend_from_slice(&chunk);
    }
    Ok(buffer)
}

/// Parse a single JSON-RPC message or a non-empty batch of them
fn parse_messages(body: &[u8]) -> Result<Vec<Value>, TransportError> {
    let value: Value = serde_json::from_slice(body)?;
    match value {
        Value::Array(items) if items.is_empty() => Err(TransportError::InvalidMessage(
            "empty batch".to_owned(),
        )),
        Value::Array(items) => {
            for item in &items {
                check_jsonrpc(item)?;
            }
            Ok(items)
        }
        other => {
            check_jsonrpc(&other)?;
            Ok(vec![other])
        }
    }
}

fn check_jsonrpc(message: &Value) -> Result<(), TransportError> {
    match message.get("jsonrpc").and_then(Value::as_str) {
        Some(protocol::JSONRPC_VERSION) => Ok(()),
        Some(other) => Err(TransportError::InvalidMessage(format!(
            "unsupported jsonrpc version {other}"
        ))),
        None => Err(TransportError::InvalidMessage(
            "missing \"jsonrpc\" member".to_owned(),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn transport() -> (Arc<SseTransport>, mpsc::Receiver<SseMessage>) {
        let (transport, outbound) = SseTransport::new("/__mcp/messages", &SseConfig::default());
        (Arc::new(transport), outbound)
    }

    fn post(content_type: &str, body: &str) -> Request<Body> {
        Request::post("/__mcp/messages")
            .header(header::CONTENT_TYPE, content_type)
            .body(Body::from(body.to_owned()))
            .unwrap()
    }

    #[test]
    fn test_endpoint_carries_session_id() {
        let (transport, _outbound) = transport();
        assert_eq!(
            transport.endpoint(),
            format!("/__mcp/messages?sessionId={}", transport.session_id())
        );
    }

    #[tokio::test]
    async fn test_post_before_start_is_not_connected() {
        let (transport, _outbound) = transport();
        let result = transport
            .handle_post_message(post("application/json", r#"{"jsonrpc":"2.0","method":"ping"}"#))
            .await;
        assert!(matches!(result, Err(TransportError::NotConnected(_))));
    }

    #[tokio::test]
    async fn test_post_relays_message_inbound() {
        let (transport, _outbound) = transport();
        let mut channel = transport.start().unwrap();

        transport
            .handle_post_message(post(
                "application/json; charset=utf-8",
                r#"{"jsonrpc":"2.0","id":1,"method":"ping"}"#,
            ))
            .await
            .unwrap();

        let received = channel.recv().await.unwrap();
        assert_eq!(received["method"], "ping");
    }

    #[tokio::test]
    async fn test_batch_relays_each_message() {
        let (transport, _outbound) = transport();
        let mut channel = transport.start().unwrap();

        transport
            .handle_post_message(post(
                "application/json",
                r#"[{"jsonrpc":"2.0","id":1,"method":"a"},{"jsonrpc":"2.0","id":2,"method":"b"}]"#,
            ))
            .await
            .unwrap();

        assert_eq!(channel.recv().await.unwrap()["method"], "a");
        assert_eq!(channel.recv().await.unwrap()["method"], "b");
    }

    #[tokio::test]
    async fn test_rejects_non_json_content_type() {
        let (transport, _outbound) = transport();
        let _channel = transport.start().unwrap();
        let result = transport.handle_post_message(post("text/plain", "{}")).await;
        assert!(matches!(
            result,
            Err(TransportError::UnsupportedContentType(_))
        ));
    }

    #[tokio::test]
    async fn test_rejects_missing_jsonrpc_member() {
        let (transport, _outbound) = transport();
        let _channel = transport.start().unwrap();
        let result = transport
            .handle_post_message(post("application/json", r#"{"method":"ping"}"#))
            .await;
        assert!(matches!(result, Err(TransportError::InvalidMessage(_))));
    }

    #[tokio::test]
    async fn test_rejects_oversized_body() {
        let (transport, _outbound) = transport();
        let _channel = transport.start().unwrap();
        let body = "x".repeat(protocol::MAXIMUM_MESSAGE_SIZE + 1);
        let result = transport
            .handle_post_message(post("application/json", &body))
            .await;
        assert!(matches!(result, Err(TransportError::PayloadTooLarge { .. })));
    }

    #[tokio::test]
    async fn test_send_queues_message_event() {
        let (transport, mut outbound) = transport();
        transport.send(&json!({"jsonrpc": "2.0", "id": 1, "result": {}})).await.unwrap();

        let frame = outbound.recv().await.unwrap();
        assert_eq!(frame.event, "message");
        assert_eq!(frame.data, r#"{"id":1,"jsonrpc":"2.0","result":{}}"#);
    }

    #[tokio::test]
    async fn test_close_ends_inbound_and_rejects_posts() {
        let (transport, _outbound) = transport();
        let mut channel = transport.start().unwrap();

        channel.close();
        assert!(transport.is_closed());
        assert!(channel.recv().await.is_none());

        let result = transport
            .handle_post_message(post("application/json", r#"{"jsonrpc":"2.0","method":"x"}"#))
            .await;
        assert!(matches!(result, Err(TransportError::Closed(_))));
        assert!(transport.send(&json!({})).await.is_err());
    }

    #[test]
    fn test_start_twice_fails() {
        let (transport, _outbound) = transport();
        let _channel = transport.start().unwrap();
        assert!(transport.start().is_err());
    }
}
