//! Catalog Client Port - 曲库搜索抽象
//!
//! 定义曲库搜索的抽象接口，具体实现在 infrastructure/adapters 层

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::track::Track;

/// 曲库错误
///
/// 对推荐引擎而言均为单条查询的瞬时失败
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("Request timeout")]
    Timeout,

    #[error("Service error: {0}")]
    ServiceError(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

/// 搜索选项
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchOptions {
    /// 来源过滤（如 "spsearch"、"ytmsearch"）
    pub source_filter: Option<String>,
    /// 返回条数上限
    pub limit: usize,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            source_filter: None,
            limit: 15,
        }
    }
}

/// Catalog Client Port
///
/// 外部曲库搜索服务的抽象接口
#[async_trait]
pub trait CatalogClientPort: Send + Sync {
    /// 执行搜索
    ///
    /// 无结果时返回空列表，不返回错误
    async fn search(&self, query: &str, options: &SearchOptions) -> Result<Vec<Track>, CatalogError>;

    /// 检查曲库服务是否可用
    async fn health_check(&self) -> bool {
        true // 默认实现
    }
}
