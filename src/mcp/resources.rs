// ABOUTME: Centralized resource container shared by both entry points
// ABOUTME: Holds the configuration, the session registry and the protocol server
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Bridge Resources
//!
//! One container is built per process and shared by `Arc` into the primary
//! and the proxy routers, which is what makes a session opened through either
//! listener addressable through both.

use super::connector::ProtocolServer;
use crate::config::BridgeConfig;
use crate::sse::SessionRegistry;
use std::fmt;
use std::sync::Arc;

/// Shared server resources
#[derive(Clone)]
pub struct BridgeResources {
    /// Immutable configuration
    pub config: Arc<BridgeConfig>,
    /// Process-wide session registry
    pub registry: Arc<SessionRegistry>,
    /// Protocol server connected to each new session
    pub protocol_server: Arc<dyn ProtocolServer>,
}

impl BridgeResources {
    /// Create resources with an empty registry
    #[must_use]
    pub fn new(config: BridgeConfig, protocol_server: Arc<dyn ProtocolServer>) -> Self {
        Self {
            config: Arc::new(config),
            registry: Arc::new(SessionRegistry::new()),
            protocol_server,
        }
    }
}

impl fmt::Debug for BridgeResources {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BridgeResources")
            .field("config", &self.config)
            .field("sessions", &self.registry.len())
            .finish_non_exhaustive()
    }
}
