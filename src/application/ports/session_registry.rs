//! Session Registry Port - 会话生命周期管理
//!
//! 定义会话注册表的抽象接口，具体实现在 infrastructure/memory 层
//!
//! 每个会话的可变状态由 SessionHandle 内的单个互斥锁保护，
//! 推荐计算另有一把门锁，保证同一会话同一时刻最多一个推荐在进行

use std::sync::Arc;

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use thiserror::Error;
use tokio_util::sync::{CancellationToken, WaitForCancellationFuture};

use super::SessionQueuePort;
use crate::domain::session::SessionState;
use crate::domain::track::Track;

/// Session Registry 错误
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("Session not found: {0}")]
    NotFound(String),

    #[error("Session already exists: {0}")]
    AlreadyExists(String),

    #[error("Session closed: {0}")]
    Closed(String),
}

/// 推荐门锁守卫，drop 时释放
pub type RecommendationGuard<'a> = tokio::sync::MutexGuard<'a, ()>;

/// 会话句柄
///
/// 注册表中每个会话对应一个，持有状态、队列与取消令牌
pub struct SessionHandle {
    id: String,
    state: Mutex<SessionState>,
    recommend_gate: tokio::sync::Mutex<()>,
    cancel: CancellationToken,
    queue: Arc<dyn SessionQueuePort>,
    started_at: DateTime<Utc>,
}

impl SessionHandle {
    pub fn new(
        id: impl Into<String>,
        queue: Arc<dyn SessionQueuePort>,
        history_capacity: usize,
    ) -> Self {
        Self {
            id: id.into(),
            state: Mutex::new(SessionState::new(history_capacity)),
            recommend_gate: tokio::sync::Mutex::new(()),
            cancel: CancellationToken::new(),
            queue,
            started_at: Utc::now(),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn queue(&self) -> &Arc<dyn SessionQueuePort> {
        &self.queue
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    /// 当前状态快照
    pub fn snapshot(&self) -> SessionState {
        self.state.lock().clone()
    }

    pub fn last_activity(&self) -> DateTime<Utc> {
        self.state.lock().last_activity()
    }

    /// 设置或翻转自动播放开关，返回新值
    pub fn set_autoplay(&self, enabled: Option<bool>) -> Result<bool, SessionError> {
        let mut state = self.state.lock();
        if self.cancel.is_cancelled() {
            return Err(SessionError::Closed(self.id.clone()));
        }
        Ok(match enabled {
            Some(enabled) => state.set_autoplay(enabled),
            None => state.toggle_autoplay(),
        })
    }

    /// 记录开始播放的曲目
    pub fn record_track_started(&self, track: Track) -> Result<(), SessionError> {
        let mut state = self.state.lock();
        if self.cancel.is_cancelled() {
            return Err(SessionError::Closed(self.id.clone()));
        }
        state.record_started(track);
        Ok(())
    }

    /// 写入推荐结果；会话已关闭时丢弃并返回 false
    pub fn commit_recommendation(&self, uri: &str) -> bool {
        let mut state = self.state.lock();
        if self.cancel.is_cancelled() {
            return false;
        }
        state.record_recommended(uri);
        true
    }

    /// 尝试占用推荐门锁；已有推荐在进行时返回 None
    pub fn try_begin_recommendation(&self) -> Option<RecommendationGuard<'_>> {
        self.recommend_gate.try_lock().ok()
    }

    /// 会话关闭时完成的 future
    pub fn cancelled(&self) -> WaitForCancellationFuture<'_> {
        self.cancel.cancelled()
    }

    pub fn is_closed(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// 关闭会话：先取消进行中的计算，再整体清空状态
    pub fn close(&self) {
        self.cancel.cancel();
        self.state.lock().reset();
    }
}

impl std::fmt::Debug for SessionHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionHandle")
            .field("id", &self.id)
            .field("closed", &self.is_closed())
            .field("started_at", &self.started_at)
            .finish()
    }
}

/// Session Registry Port
///
/// 管理播放会话的生命周期，所有状态存储在内存中
pub trait SessionRegistryPort: Send + Sync {
    /// 创建新会话
    fn start(
        &self,
        session_id: &str,
        queue: Arc<dyn SessionQueuePort>,
    ) -> Result<Arc<SessionHandle>, SessionError>;

    /// 获取会话
    fn get(&self, session_id: &str) -> Result<Arc<SessionHandle>, SessionError>;

    /// 检查会话是否存在
    fn is_active(&self, session_id: &str) -> bool;

    /// 结束会话：移出注册表并清空状态
    fn end(&self, session_id: &str) -> Result<(), SessionError>;

    /// 获取空闲超过指定秒数的会话 ID
    fn get_idle_sessions(&self, idle_timeout_secs: u64) -> Vec<String>;

    /// 获取所有会话 ID
    fn list_all(&self) -> Vec<String>;
}
