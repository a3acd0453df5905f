// ABOUTME: Loopback plain-HTTP proxy entry point mirroring the SSE and message routes
// ABOUTME: Lets clients that reject the primary listener's certificate reach the same sessions
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Proxy Entry Point
//!
//! A second listener bound to `127.0.0.1` that serves the same two routes
//! against the same registry as the primary listener. Sessions opened here
//! are addressable through either message route and vice versa. Unmatched
//! paths answer 404 (OPTIONS on any path answers 204), always with CORS
//! headers.

use crate::config::RouteConfig;
use crate::errors::AppError;
use crate::mcp::BridgeResources;
use crate::middleware::{with_cors_headers, with_request_tracing};
use crate::sse::{EntryPoint, SseRoutes};
use axum::response::{IntoResponse, Response};
use axum::Router;
use http::{Method, StatusCode, Uri};
use mcp_bridge_core::constants::defaults;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::sync::Arc;

/// Proxy router factory
pub struct ProxyEntryPoint;

impl ProxyEntryPoint {
    /// Routes served on the proxy listener, with the 404 fallback and middleware
    pub fn router(resources: Arc<BridgeResources>) -> Router {
        let router = SseRoutes::routes(resources, EntryPoint::Proxy).fallback(proxy_fallback);
        with_request_tracing(with_cors_headers(router))
    }

    /// Loopback socket address the proxy binds to
    #[must_use]
    pub fn bind_address(config: &RouteConfig) -> SocketAddr {
        let ip = defaults::PROXY_BIND_ADDRESS
            .parse()
            .unwrap_or(IpAddr::V4(Ipv4Addr::LOCALHOST));
        SocketAddr::new(ip, config.proxy.port)
    }
}

async fn proxy_fallback(method: Method, uri: Uri) -> Response {
    if method == Method::OPTIONS {
        return StatusCode::NO_CONTENT.into_response();
    }
    AppError::not_found(format!("Route {}", uri.path())).into_response()
}
