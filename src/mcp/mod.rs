// ABOUTME: Protocol server integration for the SSE bridge
// ABOUTME: Connector contract, shared resource container and the stdio child-process server
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

/// `ProtocolServer` contract consumed by the SSE endpoint
pub mod connector;
/// Shared resources handed to every route
pub mod resources;
/// Protocol server that bridges each session to a child process over stdio
pub mod stdio;

pub use connector::ProtocolServer;
pub use resources::BridgeResources;
pub use stdio::{StdioCommand, StdioProcessServer};
