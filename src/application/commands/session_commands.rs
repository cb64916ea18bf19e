//! Session Commands - 会话相关命令

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::application::ports::SessionQueuePort;
use crate::domain::track::Track;

/// 会话结束原因
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EndReason {
    /// 语音频道已无真人成员
    VoiceChannelEmpty,
    /// 用户主动停止
    Stopped,
    /// 语音频道被删除
    ChannelDeleted,
    /// 机器人被移出服务器
    GuildRemoved,
    /// 长时间无活动
    IdleTimeout,
}

impl EndReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            EndReason::VoiceChannelEmpty => "voice_channel_empty",
            EndReason::Stopped => "stopped",
            EndReason::ChannelDeleted => "channel_deleted",
            EndReason::GuildRemoved => "guild_removed",
            EndReason::IdleTimeout => "idle_timeout",
        }
    }
}

/// 开始会话命令
#[derive(Clone)]
pub struct StartSessionCommand {
    pub session_id: String,
    pub queue: Arc<dyn SessionQueuePort>,
}

/// 开始会话响应
#[derive(Debug, Clone)]
pub struct StartSessionResponse {
    pub session_id: String,
}

/// 结束会话命令
#[derive(Debug, Clone)]
pub struct EndSessionCommand {
    pub session_id: String,
    pub reason: EndReason,
}

/// 结束会话响应
#[derive(Debug, Clone)]
pub struct EndSessionResponse {
    pub session_id: String,
    pub reason: EndReason,
}

/// 曲目开始播放命令
#[derive(Debug, Clone)]
pub struct RecordTrackStartedCommand {
    pub session_id: String,
    pub track: Track,
}
