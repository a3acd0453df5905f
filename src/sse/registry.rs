// ABOUTME: Process-wide session registry shared by the primary and proxy entry points
// ABOUTME: Sharded concurrent map from session id to session, with scoped guards for removal
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use super::session::{Session, SessionId};
use super::transport::SseTransport;
use crate::errors::{AppError, AppResult};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use std::sync::Arc;
use tracing::{debug, info};

/// Single source of truth for which sessions exist
///
/// Lookups never block each other and no shard lock escapes a method call,
/// so callers never hold a lock across an `.await`.
#[derive(Debug, Default)]
pub struct SessionRegistry {
    sessions: DashMap<SessionId, Session>,
}

impl SessionRegistry {
    /// Create an empty registry
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a session under its id
    ///
    /// The returned guard removes the session when dropped; it is moved into
    /// the connection's response stream so every exit path cleans up.
    ///
    /// # Errors
    ///
    /// Returns an internal error if the id is already registered
    pub fn register(self: &Arc<Self>, session: Session) -> AppResult<SessionGuard> {
        let id = session.id.clone();
        let transport = Arc::clone(&session.transport);
        let created_via = session.created_via;

        match self.sessions.entry(id.clone()) {
            Entry::Occupied(_) => {
                return Err(AppError::internal(format!(
                    "Session {id} is already registered"
                )));
            }
            Entry::Vacant(entry) => {
                entry.insert(session);
            }
        }

        info!(session_id = %id, entry_point = %created_via, "Registered SSE session");
        Ok(SessionGuard {
            registry: Arc::clone(self),
            session_id: id,
            transport,
        })
    }

    /// Clone out the session registered under `id`
    #[must_use]
    pub fn lookup(&self, id: &str) -> Option<Session> {
        self.sessions.get(id).map(|entry| entry.value().clone())
    }

    /// Remove a session; absent ids are a no-op
    pub fn remove(&self, id: &str) -> Option<Session> {
        let removed = self.sessions.remove(id).map(|(_, session)| session);
        if let Some(session) = &removed {
            info!(
                session_id = %session.id,
                entry_point = %session.created_via,
                "Removed SSE session"
            );
        }
        removed
    }

    /// Whether `id` is currently registered
    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.sessions.contains_key(id)
    }

    /// Number of live sessions
    #[must_use]
    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    /// Whether no sessions are live
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    /// Signal every registered transport to close, returning how many were signalled
    ///
    /// Sessions leave the registry as their streams end and drop their guards.
    pub fn close_all(&self) -> usize {
        let transports: Vec<Arc<SseTransport>> = self
            .sessions
            .iter()
            .map(|entry| Arc::clone(&entry.value().transport))
            .collect();

        for transport in &transports {
            transport.close();
        }
        debug!(count = transports.len(), "Closed all SSE sessions");
        transports.len()
    }
}

/// Removes its session from the registry and closes the transport on drop
#[derive(Debug)]
pub struct SessionGuard {
    registry: Arc<SessionRegistry>,
    session_id: SessionId,
    transport: Arc<SseTransport>,
}

impl SessionGuard {
    /// Session this guard owns
    #[must_use]
    pub const fn session_id(&self) -> &SessionId {
        &self.session_id
    }
}

impl Drop for SessionGuard {
    fn drop(&mut self) {
        self.transport.close();
        self.registry.remove(self.session_id.as_str());
    }
}
