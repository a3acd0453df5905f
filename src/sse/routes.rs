// ABOUTME: Route handlers for the SSE streaming endpoint and the session message endpoint
// ABOUTME: Opens sessions on {base}/sse and delivers posted messages on {base}/messages
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use super::registry::SessionGuard;
use super::session::{EntryPoint, Session};
use super::transport::{SseMessage, SseTransport};
use crate::errors::AppError;
use crate::mcp::BridgeResources;
use axum::body::Body;
use axum::extract::{RawQuery, State};
use axum::response::sse::{Event, KeepAlive, Sse};
use axum::response::{IntoResponse, Response};
use axum::routing::any;
use axum::Router;
use futures_util::stream::Stream;
use http::{Method, Request, StatusCode};
use mcp_bridge_core::constants::{protocol, routes};
use std::convert::Infallible;
use std::sync::Arc;
use tokio::sync::{mpsc, watch};
use tracing::{debug, error, info, warn};
use url::form_urlencoded;

/// Handler state: the shared resources plus the listener the routes serve
#[derive(Clone, Debug)]
pub struct RouteState {
    /// Shared resources (registry, protocol server, config)
    pub resources: Arc<BridgeResources>,
    /// Entry point recorded on sessions created through these routes
    pub entry_point: EntryPoint,
}

/// SSE route builder
pub struct SseRoutes;

impl SseRoutes {
    /// Build the streaming and message routes for one entry point
    pub fn routes(resources: Arc<BridgeResources>, entry_point: EntryPoint) -> Router {
        let sse_path = resources.config.routes.sse_path();
        let messages_path = resources.config.routes.messages_path();
        let state = RouteState {
            resources,
            entry_point,
        };

        Router::new()
            .route(&sse_path, any(handle_sse))
            .route(&messages_path, any(handle_messages))
            .with_state(state)
    }
}

/// Open a session stream
async fn handle_sse(State(state): State<RouteState>, method: Method) -> Response {
    if method == Method::OPTIONS {
        return StatusCode::NO_CONTENT.into_response();
    }

    let resources = &state.resources;
    let messages_path = resources.config.routes.messages_path();
    let (transport, outbound) = SseTransport::new(&messages_path, &resources.config.sse);
    let transport = Arc::new(transport);
    let session = Session::new(Arc::clone(&transport), state.entry_point);

    let guard = match resources.registry.register(session) {
        Ok(guard) => guard,
        Err(e) => return e.into_response(),
    };

    info!(
        session_id = %transport.session_id(),
        entry_point = %state.entry_point,
        "SSE connection established"
    );

    match transport.start() {
        Ok(channel) => {
            if let Err(e) = resources.protocol_server.connect(channel).await {
                error!(
                    session_id = %transport.session_id(),
                    entry_point = %state.entry_point,
                    error = %e,
                    "Failed to connect protocol server"
                );
            }
        }
        Err(e) => {
            error!(session_id = %transport.session_id(), error = %e, "Failed to start transport");
        }
    }

    let stream = session_stream(transport, outbound, guard);
    Sse::new(stream)
        .keep_alive(KeepAlive::new().interval(resources.config.sse.keep_alive_interval()))
        .into_response()
}

/// Event stream for one session
///
/// The guard lives inside the stream, so the session is removed whenever the
/// body is dropped: client disconnect, server close or shutdown.
fn session_stream(
    transport: Arc<SseTransport>,
    mut outbound: mpsc::Receiver<SseMessage>,
    guard: SessionGuard,
) -> impl Stream<Item = Result<Event, Infallible>> + Send {
    let mut closed = transport.subscribe_closed();

    async_stream::stream! {
        let guard = guard;

        yield Ok::<_, Infallible>(Event::default()
            .event(protocol::ENDPOINT_EVENT)
            .data(transport.endpoint()));

        loop {
            let next = tokio::select! {
                biased;
                message = outbound.recv() => message,
                () = wait_until_closed(&mut closed) => None,
            };
            // yield must stay outside select!, the stream macro cannot see inside it
            match next {
                Some(message) => yield Ok(message.into_event()),
                None => break,
            }
        }

        debug!(session_id = %guard.session_id(), "SSE stream finished");
    }
}

async fn wait_until_closed(closed: &mut watch::Receiver<bool>) {
    // A dropped sender means the transport itself is gone
    let _ = closed.wait_for(|closed| *closed).await;
}

/// Deliver one posted message to its session
async fn handle_messages(
    State(state): State<RouteState>,
    RawQuery(query): RawQuery,
    request: Request<Body>,
) -> Response {
    if request.method() == Method::OPTIONS {
        return StatusCode::NO_CONTENT.into_response();
    }
    if request.method() != Method::POST {
        return AppError::method_not_allowed(request.method()).into_response();
    }

    let Some(session_id) = session_id_param(query.as_deref()) else {
        return AppError::invalid_input("Missing sessionId query parameter").into_response();
    };

    let Some(session) = state.resources.registry.lookup(&session_id) else {
        return AppError::not_found(format!("Session {session_id}")).into_response();
    };

    match session.transport.handle_post_message(request).await {
        Ok(()) => (StatusCode::ACCEPTED, "Accepted").into_response(),
        Err(e) => {
            warn!(
                session_id = %session_id,
                entry_point = %state.entry_point,
                error = %e,
                "Failed to deliver message"
            );
            AppError::from(e).into_response()
        }
    }
}

/// First non-empty `sessionId` value of the query string
fn session_id_param(query: Option<&str>) -> Option<String> {
    form_urlencoded::parse(query?.as_bytes())
        .find(|(key, _)| key == routes::SESSION_ID_PARAM)
        .map(|(_, value)| value.into_owned())
        .filter(|value| !value.is_empty())
}
