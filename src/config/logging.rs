//! Logging - tracing 订阅器初始化

use tracing_subscriber::EnvFilter;

use super::types::LogConfig;

/// 默认过滤规则：全局与本 crate 使用同一级别
pub fn default_filter(config: &LogConfig) -> String {
    format!("{},segue={}", config.level, config.level)
}

/// 安装全局 fmt 订阅器
///
/// 优先读取 RUST_LOG，其次使用配置中的日志级别；重复调用时忽略
pub fn init_logging(config: &LogConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_filter(config)));

    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    let result = if config.json {
        builder.json().try_init()
    } else {
        builder.try_init()
    };

    if result.is_err() {
        tracing::debug!("Tracing subscriber already installed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_filter() {
        let config = LogConfig {
            level: "debug".to_string(),
            json: false,
        };
        assert_eq!(default_filter(&config), "debug,segue=debug");
    }

    #[test]
    fn test_init_twice_is_harmless() {
        let config = LogConfig::default();
        init_logging(&config);
        init_logging(&config);
    }
}
