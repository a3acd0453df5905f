// ABOUTME: Command-line entry point serving the SSE bridge in front of a stdio MCP server
// ABOUTME: Loads environment configuration, applies CLI overrides and runs until Ctrl+C or SIGTERM
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # MCP SSE Bridge Binary
//!
//! ```bash
//! mcp-sse-bridge --port 3456 -- node ./server.js --stdio
//! ```

use anyhow::Result;
use clap::Parser;
use mcp_sse_bridge::{
    config::{environment::normalize_base_path, BridgeConfig, Scheme},
    logging,
    mcp::{StdioCommand, StdioProcessServer},
    server::{shutdown_signal, BridgeServer},
};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

#[derive(Parser)]
#[command(name = "mcp-sse-bridge", version)]
#[command(about = "Expose a stdio MCP server to SSE clients")]
pub struct Args {
    /// Host to bind and advertise
    #[arg(long)]
    host: Option<String>,

    /// Primary listener port
    #[arg(long)]
    port: Option<u16>,

    /// Route prefix for the /sse and /messages endpoints
    #[arg(long)]
    base_path: Option<String>,

    /// Advertise the primary listener as https (TLS terminated in front)
    #[arg(long)]
    https: bool,

    /// Start the loopback plain-HTTP proxy (requires --https)
    #[arg(long)]
    proxy: bool,

    /// Loopback proxy port
    #[arg(long)]
    proxy_port: Option<u16>,

    /// Do not log the advertised URL
    #[arg(long)]
    no_print_url: bool,

    /// Do not update .cursor/mcp.json
    #[arg(long)]
    no_cursor_config: bool,

    /// Entry name written to discovery files
    #[arg(long)]
    server_name: Option<String>,

    /// Directory containing the .cursor folder
    #[arg(long)]
    workspace_root: Option<PathBuf>,

    /// Working directory of the spawned MCP server
    #[arg(long)]
    cwd: Option<PathBuf>,

    /// MCP server command and its arguments
    #[arg(last = true, required = true)]
    command: Vec<String>,
}

impl Args {
    fn apply(self, config: &mut BridgeConfig) -> StdioCommandArgs {
        let routes = &mut config.routes;
        if let Some(host) = self.host {
            routes.host = host;
        }
        if let Some(port) = self.port {
            routes.port = port;
        }
        if let Some(base_path) = self.base_path {
            routes.base_path = normalize_base_path(&base_path);
        }
        if self.https {
            routes.scheme = Scheme::Https;
        }
        if self.proxy {
            routes.proxy.enabled = true;
        }
        if let Some(proxy_port) = self.proxy_port {
            routes.proxy.port = proxy_port;
        }

        let discovery = &mut config.discovery;
        if self.no_print_url {
            discovery.print_url = false;
        }
        if self.no_cursor_config {
            discovery.update_cursor_config = false;
        }
        if let Some(server_name) = self.server_name {
            discovery.server_name = server_name;
        }
        if let Some(root) = self.workspace_root {
            discovery.workspace_root = root;
        }

        StdioCommandArgs {
            argv: self.command,
            cwd: self.cwd,
        }
    }
}

struct StdioCommandArgs {
    argv: Vec<String>,
    cwd: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    logging::init_from_env()?;

    let mut config = BridgeConfig::from_env()?;
    let child = args.apply(&mut config);
    config.validate()?;

    let mut command = StdioCommand::from_argv(&child.argv)?;
    if let Some(cwd) = child.cwd {
        command = command.with_working_dir(cwd);
    }

    info!(
        program = %command.program,
        args = ?command.args,
        proxy = config.routes.proxy_active(),
        "Starting MCP SSE bridge"
    );

    let server = BridgeServer::new(config, Arc::new(StdioProcessServer::new(command)));
    server.run(shutdown_signal()).await?;
    Ok(())
}
