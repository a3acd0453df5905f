// ABOUTME: Contract between the SSE endpoint and the protocol server behind it
// ABOUTME: The server receives one McpChannel per session and must return promptly
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use crate::errors::AppResult;
use crate::sse::McpChannel;
use async_trait::async_trait;

/// Protocol server attached to every new session
///
/// `connect` runs while the SSE handler is still wiring the response, so
/// long-running work belongs in a spawned task that owns the channel. Once
/// connected the server may push frames through the channel at any time until
/// the transport closes; a returned error is logged and the session is kept
/// until the client disconnects.
#[async_trait]
pub trait ProtocolServer: Send + Sync {
    /// Attach protocol logic to a freshly started transport
    async fn connect(&self, channel: McpChannel) -> AppResult<()>;
}
