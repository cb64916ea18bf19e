//! Autoplay Commands - 自动播放相关命令

use crate::domain::track::Track;

/// 为会话推荐下一首命令
#[derive(Debug, Clone)]
pub struct RecommendNextCommand {
    pub session_id: String,
}

impl RecommendNextCommand {
    pub fn new(session_id: impl Into<String>) -> Self {
        Self {
            session_id: session_id.into(),
        }
    }
}

/// 推荐结果
///
/// 对外只有 "选中一首" 与 "没有推荐" 两种结果，其余分支仅用于日志与事件
#[derive(Debug, Clone, PartialEq)]
pub enum RecommendOutcome {
    /// 选中曲目，requester 已设为 System，历史已写入
    Selected(Track),
    /// 自动播放未开启
    Disabled,
    /// 没有可作为种子的曲目
    NoSeed,
    /// 会话不存在
    UnknownSession,
    /// 同一会话已有推荐在进行，本次触发被合并
    InFlight,
    /// 所有扩展级别均无可用候选
    Exhausted { attempts: u32 },
    /// 计算过程中会话被销毁，结果丢弃
    Cancelled,
}

impl RecommendOutcome {
    pub fn into_track(self) -> Option<Track> {
        match self {
            RecommendOutcome::Selected(track) => Some(track),
            _ => None,
        }
    }

    pub fn is_selected(&self) -> bool {
        matches!(self, RecommendOutcome::Selected(_))
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RecommendOutcome::Selected(_) => "selected",
            RecommendOutcome::Disabled => "disabled",
            RecommendOutcome::NoSeed => "no_seed",
            RecommendOutcome::UnknownSession => "unknown_session",
            RecommendOutcome::InFlight => "in_flight",
            RecommendOutcome::Exhausted { .. } => "exhausted",
            RecommendOutcome::Cancelled => "cancelled",
        }
    }
}

/// 设置自动播放命令
///
/// enabled 为 None 时翻转当前值
#[derive(Debug, Clone)]
pub struct SetAutoplayCommand {
    pub session_id: String,
    pub enabled: Option<bool>,
}

/// 设置自动播放响应
#[derive(Debug, Clone)]
pub struct SetAutoplayResponse {
    pub session_id: String,
    pub enabled: bool,
    /// 开启时队列为空，调用方应立即补一首
    pub should_fill: bool,
}
