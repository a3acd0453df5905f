// ABOUTME: Main library entry point for the MCP SSE bridge
// ABOUTME: Session registry, SSE transport, entry-point routers and the server assembly
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

#![deny(unsafe_code)]

//! # MCP SSE Bridge
//!
//! Bridges a Model Context Protocol server to many concurrent clients over
//! Server-Sent Events. Each client opens a stream on `{base}/sse`, receives
//! its message endpoint as the first event, and posts JSON-RPC messages to
//! `{base}/messages?sessionId=<id>`. An optional loopback plain-HTTP proxy
//! serves the same routes against the same session registry for clients that
//! cannot validate the primary listener's certificate.
//!
//! ## Example
//!
//! ```rust,no_run
//! use mcp_sse_bridge::config::BridgeConfig;
//! use mcp_sse_bridge::mcp::{StdioCommand, StdioProcessServer};
//! use mcp_sse_bridge::server::{shutdown_signal, BridgeServer};
//! use std::sync::Arc;
//!
//! # async fn run() -> mcp_sse_bridge::errors::AppResult<()> {
//! let config = BridgeConfig::from_env()?;
//! let protocol_server = Arc::new(StdioProcessServer::new(
//!     StdioCommand::new("node").with_args(["server.js"]),
//! ));
//! BridgeServer::new(config, protocol_server)
//!     .run(shutdown_signal())
//!     .await
//! # }
//! ```

/// Environment-first configuration
pub mod config;

/// Client discovery publishing
pub mod discovery;

/// Error types
pub mod errors;

/// Logging setup
pub mod logging;

/// Protocol server contract and implementations
pub mod mcp;

/// Shared HTTP middleware
pub mod middleware;

/// Loopback proxy entry point
pub mod proxy;

/// Server assembly and lifecycle
pub mod server;

/// SSE sessions, transport and routes
pub mod sse;

pub use mcp_bridge_core::constants;
