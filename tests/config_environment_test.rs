// ABOUTME: Tests for environment-based bridge configuration
// ABOUTME: Verifies defaults, overrides, scheme resolution and validation failures
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

use mcp_sse_bridge::config::{BridgeConfig, Scheme};
use mcp_sse_bridge::errors::ErrorCode;
use serial_test::serial;
use std::env;
use std::path::PathBuf;

const VARIABLES: &[&str] = &[
    "MCP_BASE_PATH",
    "MCP_HOST",
    "MCP_PORT",
    "MCP_USE_HTTPS",
    "MCP_TLS_ENABLED",
    "MCP_PROXY_ENABLED",
    "MCP_PROXY_PORT",
    "MCP_SSE_KEEP_ALIVE_SECS",
    "MCP_SSE_OUTBOUND_BUFFER",
    "MCP_INBOUND_BUFFER",
    "MCP_PRINT_URL",
    "MCP_UPDATE_CURSOR_CONFIG",
    "MCP_SERVER_NAME",
    "MCP_WORKSPACE_ROOT",
];

fn clear_env() {
    for name in VARIABLES {
        env::remove_var(name);
    }
}

#[test]
#[serial]
fn test_defaults_without_environment() {
    clear_env();

    let config = BridgeConfig::from_env().unwrap();
    assert_eq!(config.routes.base_path, "/__mcp");
    assert_eq!(config.routes.host, "localhost");
    assert_eq!(config.routes.port, 3456);
    assert_eq!(config.routes.scheme, Scheme::Http);
    assert!(!config.routes.proxy.enabled);
    assert_eq!(config.routes.proxy.port, 3457);
    assert_eq!(config.sse.keep_alive_secs, 15);
    assert_eq!(config.sse.outbound_buffer, 256);
    assert_eq!(config.sse.inbound_buffer, 64);
    assert!(config.discovery.print_url);
    assert!(config.discovery.update_cursor_config);
    assert_eq!(config.discovery.server_name, "mcp-sse-bridge");
    assert_eq!(config.discovery.workspace_root, env::current_dir().unwrap());
}

#[test]
#[serial]
fn test_overrides_from_environment() {
    clear_env();
    env::set_var("MCP_BASE_PATH", "/mcp/");
    env::set_var("MCP_HOST", "dev.local");
    env::set_var("MCP_PORT", "8443");
    env::set_var("MCP_TLS_ENABLED", "true");
    env::set_var("MCP_PROXY_ENABLED", "1");
    env::set_var("MCP_PROXY_PORT", "8080");
    env::set_var("MCP_SERVER_NAME", "my-tools");
    env::set_var("MCP_WORKSPACE_ROOT", "/tmp/workspace");

    let config = BridgeConfig::from_env().unwrap();
    clear_env();

    assert_eq!(config.routes.base_path, "/mcp");
    assert_eq!(config.routes.scheme, Scheme::Https);
    assert!(config.routes.proxy_active());
    assert_eq!(config.routes.advertised_url(), "http://dev.local:8080/mcp/sse");
    assert_eq!(config.routes.primary_url(), "https://dev.local:8443/mcp/sse");
    assert_eq!(config.discovery.server_name, "my-tools");
    assert_eq!(
        config.discovery.workspace_root,
        PathBuf::from("/tmp/workspace")
    );
}

#[test]
#[serial]
fn test_use_https_overrides_tls_flag() {
    clear_env();
    env::set_var("MCP_TLS_ENABLED", "true");
    env::set_var("MCP_USE_HTTPS", "false");

    let config = BridgeConfig::from_env().unwrap();
    clear_env();

    assert_eq!(config.routes.scheme, Scheme::Http);
}

#[test]
#[serial]
fn test_invalid_port_is_config_error() {
    clear_env();
    env::set_var("MCP_PORT", "not-a-port");

    let error = BridgeConfig::from_env().unwrap_err();
    clear_env();

    assert_eq!(error.code, ErrorCode::ConfigInvalid);
    assert!(error.message.contains("MCP_PORT"));
}

#[test]
#[serial]
fn test_invalid_boolean_is_config_error() {
    clear_env();
    env::set_var("MCP_PROXY_ENABLED", "sometimes");

    let error = BridgeConfig::from_env().unwrap_err();
    clear_env();

    assert_eq!(error.code, ErrorCode::ConfigInvalid);
}

#[test]
#[serial]
fn test_shared_proxy_port_is_rejected() {
    clear_env();
    env::set_var("MCP_PROXY_ENABLED", "true");
    env::set_var("MCP_PORT", "4000");
    env::set_var("MCP_PROXY_PORT", "4000");

    let result = BridgeConfig::from_env();
    clear_env();

    assert!(result.is_err());
}

#[test]
#[serial]
fn test_zero_buffer_is_rejected() {
    clear_env();
    env::set_var("MCP_SSE_OUTBOUND_BUFFER", "0");

    let result = BridgeConfig::from_env();
    clear_env();

    assert!(result.is_err());
}
