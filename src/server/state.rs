//! Application state for the chat server

use dashmap::DashMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::config::ChatConfig;
use crate::error::{Error, Result};
use crate::session::ChatSession;

/// Shared application state: one [`ChatSession`] per user session
///
/// Each session sits behind its own async mutex, so operations on one
/// session are serialized (at most one in-flight load or ask) while
/// independent sessions proceed fully in parallel.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: ChatConfig,
    sessions: DashMap<Uuid, Arc<Mutex<ChatSession>>>,
}

impl AppState {
    /// Create new application state
    ///
    /// Configuration is validated here so a server with a missing credential
    /// refuses to start instead of failing on the first session.
    pub fn new(config: ChatConfig) -> Result<Self> {
        config.validate()?;
        tracing::info!(
            llm = %config.llm.model,
            embeddings = %config.embeddings.model,
            "application state initialized"
        );
        Ok(Self {
            inner: Arc::new(AppStateInner {
                config,
                sessions: DashMap::new(),
            }),
        })
    }

    /// Get configuration
    pub fn config(&self) -> &ChatConfig {
        &self.inner.config
    }

    /// Create a new session and return its id
    pub fn create_session(&self) -> Result<Uuid> {
        let session = ChatSession::new(self.inner.config.clone())?;
        let id = session.session_id();
        self.inner.sessions.insert(id, Arc::new(Mutex::new(session)));
        tracing::info!(session_id = %id, total = self.inner.sessions.len(), "session created");
        Ok(id)
    }

    /// Look up a session by id
    pub fn session(&self, id: &Uuid) -> Result<Arc<Mutex<ChatSession>>> {
        self.inner
            .sessions
            .get(id)
            .map(|entry| Arc::clone(entry.value()))
            .ok_or(Error::SessionNotFound(*id))
    }

    /// Drop a session
    pub fn remove_session(&self, id: &Uuid) -> Result<()> {
        self.inner
            .sessions
            .remove(id)
            .map(|_| {
                tracing::info!(session_id = %id, "session removed");
            })
            .ok_or(Error::SessionNotFound(*id))
    }

    /// Number of live sessions
    pub fn session_count(&self) -> usize {
        self.inner.sessions.len()
    }
}
