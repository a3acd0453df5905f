// ABOUTME: Shared test utilities and setup functions for integration tests
// ABOUTME: Provides quiet logging, test configuration and in-process protocol servers
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence
#![allow(
    dead_code,
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::must_use_candidate
)]
//! Shared test utilities for `mcp_sse_bridge`

use async_trait::async_trait;
use mcp_sse_bridge::{
    config::BridgeConfig,
    errors::{AppError, AppResult},
    mcp::ProtocolServer,
    server::BridgeServer,
    sse::{McpChannel, SessionId},
};
use serde_json::{json, Value};
use std::sync::{Arc, Once};
use tokio::sync::mpsc;

static INIT_LOGGER: Once = Once::new();

/// Initialize quiet logging for tests (call once per test process)
pub fn init_test_logging() {
    INIT_LOGGER.call_once(|| {
        // Check for TEST_LOG environment variable to control test logging level
        let log_level = match std::env::var("TEST_LOG").as_deref() {
            Ok("TRACE") => tracing::Level::TRACE,
            Ok("DEBUG") => tracing::Level::DEBUG,
            Ok("INFO") => tracing::Level::INFO,
            _ => tracing::Level::WARN, // Default to WARN for quiet tests
        };

        let _ = tracing_subscriber::fmt()
            .with_max_level(log_level)
            .with_test_writer()
            .try_init();
    });
}

/// Default configuration with discovery turned off
pub fn test_config() -> BridgeConfig {
    let mut config = BridgeConfig::default();
    config.discovery.print_url = false;
    config.discovery.update_cursor_config = false;
    config
}

/// Server over `config` with no discovery target
pub fn create_test_server(
    config: BridgeConfig,
    protocol_server: Arc<dyn ProtocolServer>,
) -> BridgeServer {
    init_test_logging();
    BridgeServer::new(config, protocol_server).with_discovery(None)
}

/// Answers every request with `{"result": {"echo": <request>}}`
#[derive(Debug, Default)]
pub struct EchoServer;

#[async_trait]
impl ProtocolServer for EchoServer {
    async fn connect(&self, mut channel: McpChannel) -> AppResult<()> {
        tokio::spawn(async move {
            while let Some(message) = channel.recv().await {
                let reply = json!({
                    "jsonrpc": "2.0",
                    "id": message.get("id").cloned().unwrap_or(Value::Null),
                    "result": { "echo": message },
                });
                if channel.send(&reply).await.is_err() {
                    break;
                }
            }
        });
        Ok(())
    }
}

/// Records connected sessions and every inbound message
pub struct RecordingServer {
    connected: mpsc::UnboundedSender<SessionId>,
    messages: mpsc::UnboundedSender<(SessionId, Value)>,
}

/// Receiving side of a [`RecordingServer`]
pub struct Recordings {
    /// Session ids in connection order
    pub connected: mpsc::UnboundedReceiver<SessionId>,
    /// Inbound messages tagged with their session
    pub messages: mpsc::UnboundedReceiver<(SessionId, Value)>,
}

impl RecordingServer {
    pub fn new() -> (Arc<Self>, Recordings) {
        let (connected_tx, connected_rx) = mpsc::unbounded_channel();
        let (messages_tx, messages_rx) = mpsc::unbounded_channel();
        (
            Arc::new(Self {
                connected: connected_tx,
                messages: messages_tx,
            }),
            Recordings {
                connected: connected_rx,
                messages: messages_rx,
            },
        )
    }
}

#[async_trait]
impl ProtocolServer for RecordingServer {
    async fn connect(&self, mut channel: McpChannel) -> AppResult<()> {
        let session_id = channel.session_id().clone();
        let _ = self.connected.send(session_id.clone());
        let messages = self.messages.clone();
        tokio::spawn(async move {
            while let Some(message) = channel.recv().await {
                let _ = messages.send((session_id.clone(), message));
            }
        });
        Ok(())
    }
}

/// Closes every transport it is handed, right after connecting
#[derive(Debug, Default)]
pub struct ClosingServer;

#[async_trait]
impl ProtocolServer for ClosingServer {
    async fn connect(&self, channel: McpChannel) -> AppResult<()> {
        channel.close();
        Ok(())
    }
}

/// Refuses every connection
#[derive(Debug, Default)]
pub struct FailingServer;

#[async_trait]
impl ProtocolServer for FailingServer {
    async fn connect(&self, _channel: McpChannel) -> AppResult<()> {
        Err(AppError::external_service("test-server", "connection refused"))
    }
}

/// Session id embedded in an endpoint event's data
pub fn session_id_from_endpoint(endpoint: &str) -> String {
    endpoint
        .split_once("sessionId=")
        .map(|(_, id)| id.to_owned())
        .expect("endpoint carries a sessionId")
}
