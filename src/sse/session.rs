// ABOUTME: Session identity and metadata for one open SSE connection
// ABOUTME: SessionId is the sole addressing key shared by both entry points
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use super::transport::SseTransport;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::fmt;
use std::sync::Arc;
use uuid::Uuid;

/// Opaque session identifier (UUID v4), never reused
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(String);

impl SessionId {
    /// Mint a fresh random identifier
    #[must_use]
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Borrow the identifier as a string slice
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Borrow<str> for SessionId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for SessionId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Listener a session was opened through
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryPoint {
    /// Main (possibly encrypted) listener
    Primary,
    /// Loopback plain-HTTP proxy listener
    Proxy,
}

impl EntryPoint {
    /// Lowercase name used in log fields
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Primary => "primary",
            Self::Proxy => "proxy",
        }
    }
}

impl fmt::Display for EntryPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A registered client connection
#[derive(Debug, Clone)]
pub struct Session {
    /// Addressing key, taken from the transport
    pub id: SessionId,
    /// The open stream resource
    pub transport: Arc<SseTransport>,
    /// Entry point the stream was opened through
    pub created_via: EntryPoint,
    /// Time the session was created
    pub created_at: DateTime<Utc>,
}

impl Session {
    /// Wrap a fresh transport, adopting its session id
    #[must_use]
    pub fn new(transport: Arc<SseTransport>, created_via: EntryPoint) -> Self {
        Self {
            id: transport.session_id().clone(),
            transport,
            created_via,
            created_at: Utc::now(),
        }
    }
}
