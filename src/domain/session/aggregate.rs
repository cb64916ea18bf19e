//! Session Context - Aggregate Root

use chrono::{DateTime, Utc};

use super::PlayedHistory;
use crate::domain::track::Track;

/// 播放会话状态聚合根（每个语音会话一份）
///
/// 不变量:
/// - played_history 长度不超过容量
/// - reset 一次性清空所有字段，不存在部分清理
#[derive(Debug, Clone)]
pub struct SessionState {
    autoplay_enabled: bool,
    last_track: Option<Track>,
    played_history: PlayedHistory,
    last_activity: DateTime<Utc>,
}

impl SessionState {
    pub fn new(history_capacity: usize) -> Self {
        Self {
            autoplay_enabled: false,
            last_track: None,
            played_history: PlayedHistory::new(history_capacity),
            last_activity: Utc::now(),
        }
    }

    /// 设置自动播放开关，返回新值
    pub fn set_autoplay(&mut self, enabled: bool) -> bool {
        self.autoplay_enabled = enabled;
        self.touch();
        enabled
    }

    /// 翻转自动播放开关，返回新值
    pub fn toggle_autoplay(&mut self) -> bool {
        let enabled = !self.autoplay_enabled;
        self.set_autoplay(enabled)
    }

    /// 曲目开始播放：记为种子并写入历史
    pub fn record_started(&mut self, track: Track) {
        if track.has_uri() {
            self.played_history.push(track.uri());
        }
        self.last_track = Some(track);
        self.touch();
    }

    /// 记录自动选出的曲目
    pub fn record_recommended(&mut self, uri: &str) -> Option<String> {
        self.touch();
        self.played_history.push(uri)
    }

    /// 清空所有状态
    pub fn reset(&mut self) {
        self.autoplay_enabled = false;
        self.last_track = None;
        self.played_history.clear();
        self.touch();
    }

    fn touch(&mut self) {
        self.last_activity = Utc::now();
    }

    // Getters
    pub fn autoplay_enabled(&self) -> bool {
        self.autoplay_enabled
    }

    pub fn last_track(&self) -> Option<&Track> {
        self.last_track.as_ref()
    }

    pub fn played_history(&self) -> &PlayedHistory {
        &self.played_history
    }

    pub fn last_activity(&self) -> DateTime<Utc> {
        self.last_activity
    }
}

impl Default for SessionState {
    fn default() -> Self {
        Self::new(super::DEFAULT_HISTORY_CAPACITY)
    }
}
