// ABOUTME: HTTP middleware shared by the primary and proxy routers
// ABOUTME: Fixed CORS response headers and request-id aware request tracing
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

/// CORS response headers attached to every response
pub mod cors;
/// Request tracing spans with `x-request-id` propagation
pub mod tracing;

pub use cors::with_cors_headers;
pub use tracing::with_request_tracing;
