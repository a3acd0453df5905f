// ABOUTME: Core types and constants for the MCP SSE bridge
// ABOUTME: Foundation crate with the unified error type and route/transport constants
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

#![deny(unsafe_code)]

//! # MCP Bridge Core
//!
//! Foundation crate shared by the bridge library and binary. It changes
//! rarely, which keeps incremental rebuilds of the main crate cheap.
//!
//! ## Modules
//!
//! - **errors**: Unified error handling with `AppError` and `ErrorCode`
//! - **constants**: Route suffixes, CORS values, SSE event names and defaults

/// Unified error handling system with standard error codes and HTTP responses
pub mod errors;

/// Application constants organized by domain
pub mod constants;
