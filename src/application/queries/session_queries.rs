//! Session Queries

/// 获取会话状态查询
#[derive(Debug, Clone)]
pub struct GetSessionState {
    pub session_id: String,
}

/// 列出所有会话查询
#[derive(Debug, Clone)]
pub struct ListSessions;
