// ABOUTME: Environment-based configuration for routes, proxy, SSE transport and client discovery
// ABOUTME: Parses MCP_* variables with defaults, normalizes the base path and validates ports and buffers
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use crate::errors::{AppError, AppResult};
use mcp_bridge_core::constants::{defaults, routes};
use serde::{Deserialize, Serialize};
use std::env;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

/// Protocol scheme of the primary listener
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Scheme {
    /// Plain HTTP
    #[default]
    Http,
    /// Encrypted HTTP (TLS terminated in front of the bridge)
    Https,
}

impl Scheme {
    /// URL scheme string
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Http => "http",
            Self::Https => "https",
        }
    }
}

impl fmt::Display for Scheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Loopback plain-HTTP proxy entry point settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProxyConfig {
    /// Whether the proxy was requested
    pub enabled: bool,
    /// Port the proxy listens on (always bound to loopback)
    pub port: u16,
}

impl Default for ProxyConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            port: defaults::PROXY_PORT,
        }
    }
}

/// Route configuration, immutable once the server starts
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RouteConfig {
    /// Route prefix, no trailing slash (empty means root)
    pub base_path: String,
    /// Host used for binding and for the advertised URL
    pub host: String,
    /// Primary listener port
    pub port: u16,
    /// Primary listener scheme
    pub scheme: Scheme,
    /// Proxy entry point settings
    pub proxy: ProxyConfig,
}

impl Default for RouteConfig {
    fn default() -> Self {
        Self {
            base_path: defaults::BASE_PATH.to_owned(),
            host: defaults::HOST.to_owned(),
            port: defaults::PORT,
            scheme: Scheme::Http,
            proxy: ProxyConfig::default(),
        }
    }
}

impl RouteConfig {
    /// Path of the streaming route, e.g. `/__mcp/sse`
    #[must_use]
    pub fn sse_path(&self) -> String {
        format!("{}{}", self.base_path, routes::SSE_SUFFIX)
    }

    /// Path of the message route, e.g. `/__mcp/messages`
    #[must_use]
    pub fn messages_path(&self) -> String {
        format!("{}{}", self.base_path, routes::MESSAGES_SUFFIX)
    }

    /// The proxy only exists to sidestep the primary listener's certificate,
    /// so it runs when requested and the primary scheme is https.
    #[must_use]
    pub fn proxy_active(&self) -> bool {
        self.proxy.enabled && self.scheme == Scheme::Https
    }

    /// Streaming URL of the primary entry point
    #[must_use]
    pub fn primary_url(&self) -> String {
        format!(
            "{}://{}:{}{}",
            self.scheme,
            self.host,
            self.port,
            self.sse_path()
        )
    }

    /// Streaming URL of the proxy entry point
    #[must_use]
    pub fn proxy_url(&self) -> String {
        format!("http://{}:{}{}", self.host, self.proxy.port, self.sse_path())
    }

    /// URL handed to clients: the proxy URL while the proxy is active
    #[must_use]
    pub fn advertised_url(&self) -> String {
        if self.proxy_active() {
            self.proxy_url()
        } else {
            self.primary_url()
        }
    }
}

/// Per-session SSE transport settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SseConfig {
    /// Keep-alive comment interval in seconds
    pub keep_alive_secs: u64,
    /// Outbound frame queue capacity per session
    pub outbound_buffer: usize,
    /// Inbound message queue capacity per session
    pub inbound_buffer: usize,
}

impl Default for SseConfig {
    fn default() -> Self {
        Self {
            keep_alive_secs: defaults::SSE_KEEP_ALIVE_SECS,
            outbound_buffer: defaults::SSE_OUTBOUND_BUFFER,
            inbound_buffer: defaults::INBOUND_BUFFER,
        }
    }
}

impl SseConfig {
    /// Keep-alive interval as a `Duration`
    #[must_use]
    pub const fn keep_alive_interval(&self) -> Duration {
        Duration::from_secs(self.keep_alive_secs)
    }
}

/// Startup URL printing and client discovery settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiscoveryConfig {
    /// Log the advertised URL at startup
    pub print_url: bool,
    /// Publish the advertised URL into `.cursor/mcp.json`
    pub update_cursor_config: bool,
    /// Entry name used in discovery files
    pub server_name: String,
    /// Directory containing the `.cursor` folder
    pub workspace_root: PathBuf,
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            print_url: true,
            update_cursor_config: true,
            server_name: defaults::SERVER_NAME.to_owned(),
            workspace_root: PathBuf::from("."),
        }
    }
}

/// Complete bridge configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct BridgeConfig {
    /// Routes, listeners and proxy
    pub routes: RouteConfig,
    /// SSE transport tuning
    pub sse: SseConfig,
    /// URL printing and discovery
    pub discovery: DiscoveryConfig,
}

impl BridgeConfig {
    /// Load configuration from environment variables
    ///
    /// # Errors
    ///
    /// Returns an error if a variable cannot be parsed or the result fails validation
    pub fn from_env() -> AppResult<Self> {
        let tls_enabled = env_bool("MCP_TLS_ENABLED", false)?;
        let use_https = env_bool("MCP_USE_HTTPS", tls_enabled)?;

        let routes = RouteConfig {
            base_path: normalize_base_path(&env_var_or("MCP_BASE_PATH", defaults::BASE_PATH)),
            host: env_var_or("MCP_HOST", defaults::HOST),
            port: env_parse("MCP_PORT", defaults::PORT)?,
            scheme: if use_https { Scheme::Https } else { Scheme::Http },
            proxy: ProxyConfig {
                enabled: env_bool("MCP_PROXY_ENABLED", false)?,
                port: env_parse("MCP_PROXY_PORT", defaults::PROXY_PORT)?,
            },
        };

        let sse = SseConfig {
            keep_alive_secs: env_parse("MCP_SSE_KEEP_ALIVE_SECS", defaults::SSE_KEEP_ALIVE_SECS)?,
            outbound_buffer: env_parse("MCP_SSE_OUTBOUND_BUFFER", defaults::SSE_OUTBOUND_BUFFER)?,
            inbound_buffer: env_parse("MCP_INBOUND_BUFFER", defaults::INBOUND_BUFFER)?,
        };

        let workspace_root = match env::var("MCP_WORKSPACE_ROOT") {
            Ok(root) => PathBuf::from(root),
            Err(_) => env::current_dir()?,
        };

        let discovery = DiscoveryConfig {
            print_url: env_bool("MCP_PRINT_URL", true)?,
            update_cursor_config: env_bool("MCP_UPDATE_CURSOR_CONFIG", true)?,
            server_name: env_var_or("MCP_SERVER_NAME", defaults::SERVER_NAME),
            workspace_root,
        };

        let config = Self {
            routes,
            sse,
            discovery,
        };
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration values
    ///
    /// # Errors
    ///
    /// Returns an error describing the first invalid value found
    pub fn validate(&self) -> AppResult<()> {
        let routes = &self.routes;
        if !routes.base_path.is_empty() && !routes.base_path.starts_with('/') {
            return Err(AppError::config(format!(
                "Base path must start with '/': {}",
                routes.base_path
            )));
        }
        if routes.base_path.ends_with('/') {
            return Err(AppError::config(format!(
                "Base path must not end with '/': {}",
                routes.base_path
            )));
        }
        if routes.host.is_empty() {
            return Err(AppError::config("Host must not be empty"));
        }
        if routes.port == 0 {
            return Err(AppError::config("Port must be non-zero"));
        }
        if routes.proxy.enabled {
            if routes.proxy.port == 0 {
                return Err(AppError::config("Proxy port must be non-zero"));
            }
            if routes.proxy.port == routes.port {
                return Err(AppError::config(format!(
                    "Proxy port {} must differ from the primary port",
                    routes.proxy.port
                )));
            }
        }
        if self.sse.keep_alive_secs == 0 {
            return Err(AppError::config("SSE keep-alive interval must be non-zero"));
        }
        if self.sse.outbound_buffer == 0 || self.sse.inbound_buffer == 0 {
            return Err(AppError::config("Transport buffers must be non-zero"));
        }
        if self.discovery.server_name.is_empty() {
            return Err(AppError::config("Server name must not be empty"));
        }
        Ok(())
    }
}

/// Trim trailing slashes and make sure a non-empty path is rooted
#[must_use]
pub fn normalize_base_path(raw: &str) -> String {
    let trimmed = raw.trim().trim_end_matches('/');
    if trimmed.is_empty() || trimmed.starts_with('/') {
        trimmed.to_owned()
    } else {
        format!("/{trimmed}")
    }
}

/// Get environment variable or default value
fn env_var_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_owned())
}

/// Parse an optional environment variable, rejecting malformed values
fn env_parse<T>(key: &str, default: T) -> AppResult<T>
where
    T: FromStr,
    T::Err: fmt::Display,
{
    match env::var(key) {
        Ok(value) if value.trim().is_empty() => Ok(default),
        Ok(value) => value
            .trim()
            .parse()
            .map_err(|e| AppError::config(format!("Invalid value '{value}' for {key}: {e}"))),
        Err(_) => Ok(default),
    }
}

/// Boolean variable accepting true/false, 1/0, yes/no and on/off
fn env_bool(key: &str, default: bool) -> AppResult<bool> {
    match env::var(key) {
        Ok(value) if value.trim().is_empty() => Ok(default),
        Ok(value) => parse_bool(key, &value),
        Err(_) => Ok(default),
    }
}

fn parse_bool(key: &str, value: &str) -> AppResult<bool> {
    parse_flag(value.trim())
        .ok_or_else(|| AppError::config(format!("Invalid boolean '{value}' for {key}")))
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}
