// ABOUTME: Application constants for routes, CORS, SSE framing and defaults
// ABOUTME: Shared by the bridge library, the binary and the test suite
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Constants grouped by concern.

/// Route suffixes appended to the configured base path
pub mod routes {
    /// Streaming endpoint suffix
    pub const SSE_SUFFIX: &str = "/sse";
    /// Message endpoint suffix
    pub const MESSAGES_SUFFIX: &str = "/messages";
    /// Query parameter carrying the session id on the message route
    pub const SESSION_ID_PARAM: &str = "sessionId";
}

/// Cross-origin headers attached to every bridge response
pub mod cors {
    /// `Access-Control-Allow-Origin`
    pub const ALLOW_ORIGIN: &str = "*";
    /// `Access-Control-Allow-Methods`
    pub const ALLOW_METHODS: &str = "GET, POST, OPTIONS";
    /// `Access-Control-Allow-Headers`
    pub const ALLOW_HEADERS: &str = "Content-Type";
}

/// SSE event names and JSON-RPC transport limits
pub mod protocol {
    /// First event on every stream, data is the message endpoint
    pub const ENDPOINT_EVENT: &str = "endpoint";
    /// Event name for frames pushed by the protocol server
    pub const MESSAGE_EVENT: &str = "message";
    /// Required `jsonrpc` member value
    pub const JSONRPC_VERSION: &str = "2.0";
    /// Only accepted request content type on the message route
    pub const JSON_CONTENT_TYPE: &str = "application/json";
    /// Maximum accepted message body (4 MiB)
    pub const MAXIMUM_MESSAGE_SIZE: usize = 4 * 1024 * 1024;
}

/// Default values for configuration
pub mod defaults {
    /// Route prefix
    pub const BASE_PATH: &str = "/__mcp";
    /// Host used for binding and the advertised URL
    pub const HOST: &str = "localhost";
    /// Primary listener port
    pub const PORT: u16 = 3456;
    /// Loopback proxy port
    pub const PROXY_PORT: u16 = 3457;
    /// Loopback address the proxy binds to
    pub const PROXY_BIND_ADDRESS: &str = "127.0.0.1";
    /// SSE keep-alive comment interval
    pub const SSE_KEEP_ALIVE_SECS: u64 = 15;
    /// Outbound frame queue capacity per session
    pub const SSE_OUTBOUND_BUFFER: usize = 256;
    /// Inbound message queue capacity per session
    pub const INBOUND_BUFFER: usize = 64;
    /// Entry name used when publishing to client discovery
    pub const SERVER_NAME: &str = "mcp-sse-bridge";
}
