// ABOUTME: CORS header middleware for the bridge routes
// ABOUTME: Sets the same three allow headers on every response, including errors and 404s
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use axum::Router;
use http::header::{
    ACCESS_CONTROL_ALLOW_HEADERS, ACCESS_CONTROL_ALLOW_METHODS, ACCESS_CONTROL_ALLOW_ORIGIN,
};
use http::HeaderValue;
use mcp_bridge_core::constants::cors;
use tower_http::set_header::SetResponseHeaderLayer;

/// Attach the bridge's CORS headers to every response produced by `router`
///
/// Preflight requests are answered by the handlers themselves (204), so this
/// only stamps headers instead of running a full `CorsLayer` negotiation.
///
/// # Headers
///
/// - `Access-Control-Allow-Origin: *`
/// - `Access-Control-Allow-Methods: GET, POST, OPTIONS`
/// - `Access-Control-Allow-Headers: Content-Type`
pub fn with_cors_headers<S>(router: Router<S>) -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    router
        .layer(SetResponseHeaderLayer::overriding(
            ACCESS_CONTROL_ALLOW_ORIGIN,
            HeaderValue::from_static(cors::ALLOW_ORIGIN),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            ACCESS_CONTROL_ALLOW_METHODS,
            HeaderValue::from_static(cors::ALLOW_METHODS),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            ACCESS_CONTROL_ALLOW_HEADERS,
            HeaderValue::from_static(cors::ALLOW_HEADERS),
        ))
}
