// ABOUTME: Configuration management module for the bridge's routes, transport and discovery settings
// ABOUTME: Environment-first loading with validation; the binary layers CLI overrides on top
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence
//! Configuration module for the MCP SSE bridge
//!
//! - **Environment**: `BridgeConfig` and its sections loaded from `MCP_*` variables

/// Environment and server configuration
pub mod environment;

pub use environment::{
    BridgeConfig, DiscoveryConfig, ProxyConfig, RouteConfig, Scheme, SseConfig,
};
