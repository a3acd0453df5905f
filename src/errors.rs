// ABOUTME: Error types for the bridge library: re-exports of the unified error plus transport failures
// ABOUTME: TransportError covers message-delivery failures and converts into AppError for handlers
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Error Handling
//!
//! [`AppError`] and [`ErrorCode`] live in `mcp-bridge-core`; this module adds
//! the transport-level [`TransportError`] raised by
//! [`SseTransport::handle_post_message`](crate::sse::SseTransport::handle_post_message).

pub use mcp_bridge_core::errors::{AppError, AppResult, ErrorCode};

use thiserror::Error;

/// Failure delivering a posted message into a session's transport
#[derive(Debug, Error)]
pub enum TransportError {
    /// Request `Content-Type` is missing or not `application/json`
    #[error("Unsupported content type: {0}")]
    UnsupportedContentType(String),

    /// Body exceeded the message size limit
    #[error("Message body exceeds {limit} bytes")]
    PayloadTooLarge {
        /// Configured limit in bytes
        limit: usize,
    },

    /// Body could not be read from the connection
    #[error("Failed to read message body: {0}")]
    BodyRead(String),

    /// Body is not valid JSON
    #[error("Invalid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),

    /// Body is JSON but not a JSON-RPC 2.0 message
    #[error("Invalid JSON-RPC message: {0}")]
    InvalidMessage(String),

    /// No protocol server has taken the inbound side yet
    #[error("Transport for session {0} is not connected")]
    NotConnected(String),

    /// Protocol server side has gone away
    #[error("Transport for session {0} is closed")]
    Closed(String),
}

impl TransportError {
    /// Error code used for the HTTP response
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::UnsupportedContentType(_)
            | Self::BodyRead(_)
            | Self::InvalidJson(_)
            | Self::InvalidMessage(_) => ErrorCode::InvalidFormat,
            Self::PayloadTooLarge { .. } => ErrorCode::PayloadTooLarge,
            Self::NotConnected(_) | Self::Closed(_) => ErrorCode::DeliveryFailed,
        }
    }
}

impl From<TransportError> for AppError {
    fn from(error: TransportError) -> Self {
        Self::new(error.code(), error.to_string()).with_source(error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transport_error_status_mapping() {
        let cases = [
            (TransportError::UnsupportedContentType("text/plain".into()), 400),
            (TransportError::PayloadTooLarge { limit: 4 }, 413),
            (TransportError::InvalidMessage("missing jsonrpc".into()), 400),
            (TransportError::NotConnected("abc".into()), 500),
            (TransportError::Closed("abc".into()), 500),
        ];
        for (error, status) in cases {
            assert_eq!(AppError::from(error).http_status(), status);
        }
    }
}
