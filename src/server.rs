// ABOUTME: Process-level assembly of the bridge: listeners, routers, discovery and graceful shutdown
// ABOUTME: One registry and one protocol server shared by the primary and proxy entry points
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Bridge Server
//!
//! [`BridgeServer`] owns the shared [`BridgeResources`] and exposes the
//! primary routes for embedding into a host application, or binds and serves
//! both listeners itself through [`BridgeServer::run`].

use crate::config::BridgeConfig;
use crate::discovery::{ClientDiscovery, CursorMcpConfig};
use crate::errors::{AppError, AppResult, ErrorCode};
use crate::mcp::{BridgeResources, ProtocolServer};
use crate::middleware::{with_cors_headers, with_request_tracing};
use crate::proxy::ProxyEntryPoint;
use crate::sse::{EntryPoint, SessionRegistry, SseRoutes};
use axum::Router;
use std::fmt;
use std::future::{self, Future};
use std::io;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::{TcpListener, ToSocketAddrs};
use tokio::signal;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time;
use tracing::{debug, info, warn};

/// How often sessions are re-closed while listeners drain
const DRAIN_TICK: Duration = Duration::from_millis(100);

/// The MCP SSE bridge
pub struct BridgeServer {
    resources: Arc<BridgeResources>,
    discovery: Option<Arc<dyn ClientDiscovery>>,
}

impl BridgeServer {
    /// Create a server; `protocol_server` is connected to every new session
    #[must_use]
    pub fn new(config: BridgeConfig, protocol_server: Arc<dyn ProtocolServer>) -> Self {
        let discovery: Option<Arc<dyn ClientDiscovery>> = if config.discovery.update_cursor_config
        {
            Some(Arc::new(CursorMcpConfig::new(
                config.discovery.workspace_root.clone(),
            )))
        } else {
            None
        };

        Self {
            resources: Arc::new(BridgeResources::new(config, protocol_server)),
            discovery,
        }
    }

    /// Replace the discovery target (or disable discovery with `None`)
    #[must_use]
    pub fn with_discovery(mut self, discovery: Option<Arc<dyn ClientDiscovery>>) -> Self {
        self.discovery = discovery;
        self
    }

    /// Shared resources
    #[must_use]
    pub const fn resources(&self) -> &Arc<BridgeResources> {
        &self.resources
    }

    /// Process-wide session registry
    #[must_use]
    pub fn registry(&self) -> &Arc<SessionRegistry> {
        &self.resources.registry
    }

    /// Configuration in effect
    #[must_use]
    pub fn config(&self) -> &BridgeConfig {
        &self.resources.config
    }

    /// Primary routes with middleware, ready to merge into a host router
    pub fn primary_router(&self) -> Router {
        let router = SseRoutes::routes(Arc::clone(&self.resources), EntryPoint::Primary);
        with_request_tracing(with_cors_headers(router))
    }

    /// Proxy routes with the 404 fallback and middleware
    pub fn proxy_router(&self) -> Router {
        ProxyEntryPoint::router(Arc::clone(&self.resources))
    }

    /// URL handed to clients
    #[must_use]
    pub fn advertised_url(&self) -> String {
        self.resources.config.routes.advertised_url()
    }

    /// Bind the configured listeners and serve until `shutdown` resolves
    ///
    /// # Errors
    ///
    /// Returns an error if a listener cannot be bound or fails while serving
    pub async fn run<F>(self, shutdown: F) -> AppResult<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let routes = &self.resources.config.routes;
        let primary = bind((routes.host.as_str(), routes.port)).await?;
        let proxy = if routes.proxy_active() {
            Some(bind(ProxyEntryPoint::bind_address(routes)).await?)
        } else {
            if routes.proxy.enabled {
                warn!("Proxy requested but the primary listener is not https, proxy disabled");
            }
            None
        };

        self.serve(primary, proxy, shutdown).await
    }

    /// Serve on already-bound listeners until `shutdown` resolves
    ///
    /// On shutdown both listeners stop accepting, every session is closed so
    /// open streams end, and the call returns once both listeners drained.
    ///
    /// # Errors
    ///
    /// Returns an error if a listener fails while serving
    pub async fn serve<F>(
        self,
        primary: TcpListener,
        proxy: Option<TcpListener>,
        shutdown: F,
    ) -> AppResult<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let url = self.advertised_url();
        if self.resources.config.discovery.print_url {
            info!(url = %url, "MCP SSE bridge available");
        }
        log_listener("primary", &primary);
        if let Some(listener) = &proxy {
            log_listener("proxy", listener);
        }
        self.publish(&url).await;

        let (stop_tx, stop_rx) = watch::channel(false);
        let mut tasks = vec![spawn_listener(primary, self.primary_router(), stop_rx.clone())];
        if let Some(listener) = proxy {
            tasks.push(spawn_listener(listener, self.proxy_router(), stop_rx));
        }

        shutdown.await;
        info!("Shutting down MCP SSE bridge");
        stop_tx.send_replace(true);

        let registry = Arc::clone(&self.resources.registry);
        for task in tasks {
            drain(task, &registry).await?;
        }
        info!("MCP SSE bridge stopped");
        Ok(())
    }

    async fn publish(&self, url: &str) {
        let Some(discovery) = &self.discovery else {
            return;
        };
        let server_name = &self.resources.config.discovery.server_name;
        match discovery.publish(server_name, url).await {
            Ok(true) => {}
            Ok(false) => debug!("Client discovery not updated"),
            Err(e) => warn!(error = %e, "Failed to update client discovery"),
        }
    }
}

async fn bind<A>(addr: A) -> AppResult<TcpListener>
where
    A: ToSocketAddrs + Copy + fmt::Debug,
{
    TcpListener::bind(addr).await.map_err(|e| {
        AppError::new(
            ErrorCode::ResourceUnavailable,
            format!("Failed to bind listener on {addr:?}"),
        )
        .with_source(e)
    })
}

fn log_listener(name: &str, listener: &TcpListener) {
    match listener.local_addr() {
        Ok(addr) => info!(entry_point = name, address = %addr, "Listening"),
        Err(e) => warn!(entry_point = name, error = %e, "Listener has no local address"),
    }
}

fn spawn_listener(
    listener: TcpListener,
    router: Router,
    mut stop: watch::Receiver<bool>,
) -> JoinHandle<io::Result<()>> {
    tokio::spawn(async move {
        axum::serve(listener, router)
            .with_graceful_shutdown(async move {
                let _ = stop.wait_for(|stopped| *stopped).await;
            })
            .await
    })
}

/// Wait for a listener task, closing sessions that race in while it drains
async fn drain(mut task: JoinHandle<io::Result<()>>, registry: &SessionRegistry) -> AppResult<()> {
    let mut ticker = time::interval(DRAIN_TICK);
    let result = loop {
        tokio::select! {
            result = &mut task => break result,
            _ = ticker.tick() => {
                registry.close_all();
            }
        }
    };

    match result {
        Ok(Ok(())) => Ok(()),
        Ok(Err(e)) => Err(AppError::from(e)),
        Err(e) => Err(AppError::internal(format!("Listener task failed: {e}"))),
    }
}

/// Resolves on Ctrl+C or, on unix, SIGTERM
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!(error = %e, "Failed to listen for Ctrl+C");
            future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use signal::unix::{signal as unix_signal, SignalKind};

        match unix_signal(SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "Failed to listen for SIGTERM");
                future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }
}
