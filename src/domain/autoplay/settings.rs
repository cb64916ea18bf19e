//! Autoplay Context - 可调参数

use std::time::Duration;

/// 自动播放调优参数
#[derive(Debug, Clone, PartialEq)]
pub struct AutoplaySettings {
    /// 近似重复判定的标题重合阈值
    pub similarity_threshold: f64,
    /// 时长相近加分窗口（毫秒）
    pub duration_window_ms: u64,
    /// 最高扩展级别（含），0..=max 共 max + 1 轮
    pub max_escalation: u8,
    /// 会话播放历史容量
    pub history_capacity: usize,
    /// 单条查询超时
    pub query_timeout: Duration,
    /// 搜索来源过滤（如 "spsearch"）
    pub source_filter: Option<String>,
    /// 单条查询返回上限
    pub search_limit: usize,
}

impl Default for AutoplaySettings {
    fn default() -> Self {
        Self {
            similarity_threshold: 0.6,
            duration_window_ms: 60_000,
            max_escalation: 3,
            history_capacity: 100,
            query_timeout: Duration::from_secs(10),
            source_filter: Some("spsearch".to_string()),
            search_limit: 15,
        }
    }
}
