// ABOUTME: Server-Sent Events session layer: registry, per-session transport and route handlers
// ABOUTME: Shared by the primary and proxy entry points through one registry
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

/// Process-wide session registry and scoped removal guard
pub mod registry;
/// HTTP route handlers for the streaming and message endpoints
pub mod routes;
/// Session identity and metadata
pub mod session;
/// Per-session transport relaying frames in both directions
pub mod transport;

pub use registry::{SessionGuard, SessionRegistry};
pub use routes::{RouteState, SseRoutes};
pub use session::{EntryPoint, Session, SessionId};
pub use transport::{McpChannel, SseMessage, SseTransport};
