//! Configuration Loader
//!
//! 实现多源配置加载与合并逻辑
//!
//! 优先级（从高到低）：
//! 1. 环境变量
//! 2. 配置文件（segue.toml）
//! 3. 默认值

use config::{Config, ConfigError as ConfigCrateError, Environment, File};
use std::path::Path;
use thiserror::Error;

use super::types::AppConfig;

/// 配置加载错误
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to load configuration: {0}")]
    LoadError(String),

    #[error("Failed to parse configuration: {0}")]
    ParseError(String),

    #[error("Configuration validation failed: {0}")]
    ValidationError(String),
}

impl From<ConfigCrateError> for ConfigError {
    fn from(err: ConfigCrateError) -> Self {
        ConfigError::LoadError(err.to_string())
    }
}

/// 配置文件搜索路径
const CONFIG_FILE_NAMES: &[&str] = &["segue", "segue.local"];

/// 加载应用配置
///
/// # 环境变量示例
/// - `SEGUE_CATALOG__BASE_URL=http://lavalink:2333`
/// - `SEGUE_AUTOPLAY__SIMILARITY_THRESHOLD=0.9`
/// - `SEGUE_WORKER__IDLE_SWEEP_SECS=300`
pub fn load_config() -> Result<AppConfig, ConfigError> {
    load_config_from_path(None)
}

/// 从指定路径加载配置
///
/// # 参数
/// - `config_path` - 可选的配置文件路径，如果为 None 则使用默认搜索路径
pub fn load_config_from_path(config_path: Option<&Path>) -> Result<AppConfig, ConfigError> {
    let mut builder = Config::builder();

    // 1. 默认值（最低优先级）
    builder = builder
        .set_default("catalog.base_url", "http://localhost:2333")?
        .set_default("catalog.password", "youshallnotpass")?
        .set_default("catalog.timeout_secs", 10)?
        .set_default("catalog.source_filter", "spsearch")?
        .set_default("catalog.search_limit", 15)?
        .set_default("autoplay.similarity_threshold", 0.6)?
        .set_default("autoplay.duration_window_ms", 60_000)?
        .set_default("autoplay.max_escalation", 3)?
        .set_default("autoplay.history_capacity", 100)?
        .set_default("autoplay.query_timeout_secs", 10)?
        .set_default("worker.max_concurrent", 4)?
        .set_default("worker.event_buffer", 256)?
        .set_default("worker.idle_sweep_secs", 0)?
        .set_default("worker.session_idle_secs", 3600)?
        .set_default("log.level", "info")?
        .set_default("log.json", false)?;

    // 2. 配置文件
    if let Some(path) = config_path {
        builder = builder.add_source(File::from(path).required(true));
    } else {
        for name in CONFIG_FILE_NAMES {
            builder = builder.add_source(File::with_name(name).required(false));
        }
    }

    // 3. 环境变量（最高优先级），前缀 SEGUE_，层级分隔符 __
    builder = builder.add_source(
        Environment::with_prefix("SEGUE")
            .prefix_separator("_")
            .separator("__")
            .try_parsing(true),
    );

    let config = builder.build()?;

    let app_config: AppConfig = config.try_deserialize().map_err(|e| {
        ConfigError::ParseError(format!("Failed to deserialize config: {}", e))
    })?;

    validate_config(&app_config)?;

    Ok(app_config)
}

/// 验证配置有效性
pub fn validate_config(config: &AppConfig) -> Result<(), ConfigError> {
    let threshold = config.autoplay.similarity_threshold;
    if !(threshold > 0.0 && threshold <= 1.0) {
        return Err(ConfigError::ValidationError(format!(
            "Similarity threshold must be in (0, 1], got {}",
            threshold
        )));
    }

    if config.autoplay.history_capacity == 0 {
        return Err(ConfigError::ValidationError(
            "History capacity cannot be 0".to_string(),
        ));
    }

    if config.autoplay.query_timeout_secs == 0 {
        return Err(ConfigError::ValidationError(
            "Query timeout cannot be 0".to_string(),
        ));
    }

    if config.catalog.base_url.is_empty() {
        return Err(ConfigError::ValidationError(
            "Catalog URL cannot be empty".to_string(),
        ));
    }

    if config.catalog.search_limit == 0 {
        return Err(ConfigError::ValidationError(
            "Search limit cannot be 0".to_string(),
        ));
    }

    if config.worker.max_concurrent == 0 || config.worker.event_buffer == 0 {
        return Err(ConfigError::ValidationError(
            "Worker concurrency and event buffer must be positive".to_string(),
        ));
    }

    Ok(())
}

/// 打印配置信息（用于启动时日志）
pub fn print_config(config: &AppConfig) {
    tracing::info!("=== Autoplay Configuration ===");
    tracing::info!("Catalog URL: {}", config.catalog.base_url);
    tracing::info!("Catalog Timeout: {}s", config.catalog.timeout_secs);
    tracing::info!("Source Filter: {:?}", config.catalog.source_filter);
    tracing::info!("Search Limit: {}", config.catalog.search_limit);
    tracing::info!("Similarity Threshold: {}", config.autoplay.similarity_threshold);
    tracing::info!("Duration Window: {}ms", config.autoplay.duration_window_ms);
    tracing::info!("Max Escalation: {}", config.autoplay.max_escalation);
    tracing::info!("History Capacity: {}", config.autoplay.history_capacity);
    tracing::info!("Query Timeout: {}s", config.autoplay.query_timeout_secs);
    tracing::info!("Worker Concurrency: {}", config.worker.max_concurrent);
    if config.worker.idle_sweep_secs > 0 {
        tracing::info!(
            "Idle Sweep: every {}s, idle after {}s",
            config.worker.idle_sweep_secs,
            config.worker.session_idle_secs
        );
    }
    tracing::info!("Log Level: {}", config.log.level);
    tracing::info!("==============================");
}
