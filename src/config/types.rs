//! Configuration Types
//!
//! 定义所有配置结构体

use serde::Deserialize;
use std::time::Duration;

use crate::domain::autoplay::AutoplaySettings;

/// 应用主配置
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// 曲库（Lavalink）配置
    #[serde(default)]
    pub catalog: CatalogConfig,

    /// 自动播放调优参数
    #[serde(default)]
    pub autoplay: AutoplayConfig,

    /// 后台 Worker 配置
    #[serde(default)]
    pub worker: WorkerConfig,

    /// 日志配置
    #[serde(default)]
    pub log: LogConfig,
}

/// 曲库配置
#[derive(Debug, Clone, Deserialize)]
pub struct CatalogConfig {
    /// Lavalink 节点基础 URL
    #[serde(default = "default_catalog_url")]
    pub base_url: String,

    /// 节点密码
    #[serde(default = "default_catalog_password")]
    pub password: String,

    /// 请求超时时间（秒）
    #[serde(default = "default_catalog_timeout")]
    pub timeout_secs: u64,

    /// 搜索来源前缀，如 spsearch、ytmsearch
    #[serde(default = "default_source_filter")]
    pub source_filter: Option<String>,

    /// 单条查询返回上限
    #[serde(default = "default_search_limit")]
    pub search_limit: usize,
}

fn default_catalog_url() -> String {
    "http://localhost:2333".to_string()
}

fn default_catalog_password() -> String {
    "youshallnotpass".to_string()
}

fn default_catalog_timeout() -> u64 {
    10
}

fn default_source_filter() -> Option<String> {
    Some("spsearch".to_string())
}

fn default_search_limit() -> usize {
    15
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            base_url: default_catalog_url(),
            password: default_catalog_password(),
            timeout_secs: default_catalog_timeout(),
            source_filter: default_source_filter(),
            search_limit: default_search_limit(),
        }
    }
}

/// 自动播放配置
#[derive(Debug, Clone, Deserialize)]
pub struct AutoplayConfig {
    /// 近似重复判定阈值，取值 (0, 1]
    #[serde(default = "default_similarity_threshold")]
    pub similarity_threshold: f64,

    /// 时长相近窗口（毫秒）
    #[serde(default = "default_duration_window")]
    pub duration_window_ms: u64,

    /// 最高扩展级别
    #[serde(default = "default_max_escalation")]
    pub max_escalation: u8,

    /// 播放历史容量
    #[serde(default = "default_history_capacity")]
    pub history_capacity: usize,

    /// 单条查询超时（秒）
    #[serde(default = "default_query_timeout")]
    pub query_timeout_secs: u64,
}

fn default_similarity_threshold() -> f64 {
    0.6
}

fn default_duration_window() -> u64 {
    60_000
}

fn default_max_escalation() -> u8 {
    3
}

fn default_history_capacity() -> usize {
    100
}

fn default_query_timeout() -> u64 {
    10
}

impl Default for AutoplayConfig {
    fn default() -> Self {
        Self {
            similarity_threshold: default_similarity_threshold(),
            duration_window_ms: default_duration_window(),
            max_escalation: default_max_escalation(),
            history_capacity: default_history_capacity(),
            query_timeout_secs: default_query_timeout(),
        }
    }
}

/// Worker 配置
#[derive(Debug, Clone, Deserialize)]
pub struct WorkerConfig {
    /// 最大并发补歌数
    #[serde(default = "default_max_concurrent")]
    pub max_concurrent: usize,

    /// 播放事件通道容量
    #[serde(default = "default_event_buffer")]
    pub event_buffer: usize,

    /// 空闲会话清理间隔（秒），0 表示关闭
    #[serde(default)]
    pub idle_sweep_secs: u64,

    /// 会话空闲多久后被清理（秒）
    #[serde(default = "default_session_idle")]
    pub session_idle_secs: u64,
}

fn default_max_concurrent() -> usize {
    4
}

fn default_event_buffer() -> usize {
    256
}

fn default_session_idle() -> u64 {
    3600 // 1 小时
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            max_concurrent: default_max_concurrent(),
            event_buffer: default_event_buffer(),
            idle_sweep_secs: 0,
            session_idle_secs: default_session_idle(),
        }
    }
}

/// 日志配置
#[derive(Debug, Clone, Deserialize)]
pub struct LogConfig {
    /// 日志级别
    #[serde(default = "default_log_level")]
    pub level: String,

    /// 是否启用 JSON 格式
    #[serde(default)]
    pub json: bool,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

impl From<&AppConfig> for AutoplaySettings {
    fn from(config: &AppConfig) -> Self {
        Self {
            similarity_threshold: config.autoplay.similarity_threshold,
            duration_window_ms: config.autoplay.duration_window_ms,
            max_escalation: config.autoplay.max_escalation,
            history_capacity: config.autoplay.history_capacity,
            query_timeout: Duration::from_secs(config.autoplay.query_timeout_secs),
            source_filter: config
                .catalog
                .source_filter
                .clone()
                .filter(|s| !s.trim().is_empty()),
            search_limit: config.catalog.search_limit,
        }
    }
}
