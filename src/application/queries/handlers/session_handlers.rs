//! Session Query Handlers

use std::sync::Arc;

use serde::Serialize;

use crate::application::error::ApplicationError;
use crate::application::ports::{SessionHandle, SessionRegistryPort};
use crate::application::queries::{GetSessionState, ListSessions};
use crate::domain::track::Track;

// ============================================================================
// Response DTOs
// ============================================================================

/// 会话状态视图
#[derive(Debug, Clone, Serialize)]
pub struct SessionStateView {
    pub session_id: String,
    pub autoplay_enabled: bool,
    pub last_track: Option<Track>,
    pub history_len: usize,
    pub history_capacity: usize,
    pub pending_count: usize,
    pub started_at: String,
    pub last_activity: String,
}

impl From<&SessionHandle> for SessionStateView {
    fn from(handle: &SessionHandle) -> Self {
        let state = handle.snapshot();
        Self {
            session_id: handle.id().to_string(),
            autoplay_enabled: state.autoplay_enabled(),
            last_track: state.last_track().cloned(),
            history_len: state.played_history().len(),
            history_capacity: state.played_history().capacity(),
            pending_count: handle.queue().pending_count(),
            started_at: handle.started_at().to_rfc3339(),
            last_activity: state.last_activity().to_rfc3339(),
        }
    }
}

// ============================================================================
// Handlers
// ============================================================================

/// GetSessionState Handler
pub struct GetSessionStateHandler {
    registry: Arc<dyn SessionRegistryPort>,
}

impl GetSessionStateHandler {
    pub fn new(registry: Arc<dyn SessionRegistryPort>) -> Self {
        Self { registry }
    }

    pub async fn handle(&self, query: GetSessionState) -> Result<SessionStateView, ApplicationError> {
        let session = self.registry.get(&query.session_id)?;
        Ok(SessionStateView::from(session.as_ref()))
    }
}

/// ListSessions Handler
pub struct ListSessionsHandler {
    registry: Arc<dyn SessionRegistryPort>,
}

impl ListSessionsHandler {
    pub fn new(registry: Arc<dyn SessionRegistryPort>) -> Self {
        Self { registry }
    }

    pub async fn handle(&self, _query: ListSessions) -> Result<Vec<SessionStateView>, ApplicationError> {
        let mut views: Vec<SessionStateView> = self
            .registry
            .list_all()
            .iter()
            // 列举与读取之间会话可能已结束
            .filter_map(|id| self.registry.get(id).ok())
            .map(|session| SessionStateView::from(session.as_ref()))
            .collect();
        views.sort_by(|a, b| a.session_id.cmp(&b.session_id));
        Ok(views)
    }
}
