//! In-Memory Session Registry Implementation

use chrono::Utc;
use dashmap::DashMap;
use std::sync::Arc;

use crate::application::ports::{SessionError, SessionHandle, SessionQueuePort, SessionRegistryPort};
use crate::domain::session::DEFAULT_HISTORY_CAPACITY;

/// 内存会话注册表
pub struct InMemorySessionRegistry {
    sessions: DashMap<String, Arc<SessionHandle>>,
    history_capacity: usize,
}

impl InMemorySessionRegistry {
    pub fn new(history_capacity: usize) -> Self {
        Self {
            sessions: DashMap::new(),
            history_capacity,
        }
    }
}

impl Default for InMemorySessionRegistry {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_CAPACITY)
    }
}

impl SessionRegistryPort for InMemorySessionRegistry {
    fn start(
        &self,
        session_id: &str,
        queue: Arc<dyn SessionQueuePort>,
    ) -> Result<Arc<SessionHandle>, SessionError> {
        match self.sessions.entry(session_id.to_string()) {
            dashmap::mapref::entry::Entry::Occupied(_) => {
                Err(SessionError::AlreadyExists(session_id.to_string()))
            }
            dashmap::mapref::entry::Entry::Vacant(entry) => {
                let handle = Arc::new(SessionHandle::new(
                    session_id,
                    queue,
                    self.history_capacity,
                ));
                entry.insert(handle.clone());
                tracing::info!(session_id = %session_id, "Session started");
                Ok(handle)
            }
        }
    }

    fn get(&self, session_id: &str) -> Result<Arc<SessionHandle>, SessionError> {
        self.sessions
            .get(session_id)
            .map(|s| s.clone())
            .ok_or_else(|| SessionError::NotFound(session_id.to_string()))
    }

    fn is_active(&self, session_id: &str) -> bool {
        self.sessions.contains_key(session_id)
    }

    fn end(&self, session_id: &str) -> Result<(), SessionError> {
        let (_, handle) = self
            .sessions
            .remove(session_id)
            .ok_or_else(|| SessionError::NotFound(session_id.to_string()))?;
        handle.close();
        tracing::debug!(session_id = %session_id, "Session removed from registry");
        Ok(())
    }

    fn get_idle_sessions(&self, idle_timeout_secs: u64) -> Vec<String> {
        let now = Utc::now();
        let timeout = chrono::Duration::seconds(idle_timeout_secs as i64);

        self.sessions
            .iter()
            .filter_map(|entry| {
                let elapsed = now - entry.last_activity();
                if elapsed > timeout {
                    Some(entry.key().clone())
                } else {
                    None
                }
            })
            .collect()
    }

    fn list_all(&self) -> Vec<String> {
        self.sessions.iter().map(|e| e.key().clone()).collect()
    }
}
