//! Fake Catalog Client - 用于测试的曲库客户端
//!
//! 按查询词返回预设结果，可注入失败与延迟，并记录所有收到的查询

use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::{HashMap, HashSet};
use std::time::Duration;

use crate::application::ports::{CatalogClientPort, CatalogError, SearchOptions};
use crate::domain::track::Track;

/// Fake Catalog Client
#[derive(Debug, Default)]
pub struct FakeCatalogClient {
    /// 查询词 -> 结果
    responses: HashMap<String, Vec<Track>>,
    /// 未命中时的结果
    fallback: Vec<Track>,
    /// 返回错误的查询词
    failing: HashSet<String>,
    /// 所有查询都返回错误
    fail_all: bool,
    /// 人为延迟的查询词（None 表示全部）
    delayed: HashMap<Option<String>, Duration>,
    /// 收到的查询（按调用顺序）
    calls: Mutex<Vec<String>>,
}

impl FakeCatalogClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// 指定查询词返回的结果
    pub fn with_response(mut self, query: impl Into<String>, tracks: Vec<Track>) -> Self {
        self.responses.insert(query.into(), tracks);
        self
    }

    /// 未单独配置的查询返回的结果
    pub fn with_fallback(mut self, tracks: Vec<Track>) -> Self {
        self.fallback = tracks;
        self
    }

    /// 指定查询词返回服务错误
    pub fn with_failure(mut self, query: impl Into<String>) -> Self {
        self.failing.insert(query.into());
        self
    }

    /// 所有查询都返回服务错误
    pub fn with_failure_for_all(mut self) -> Self {
        self.fail_all = true;
        self
    }

    /// 所有查询延迟
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delayed.insert(None, delay);
        self
    }

    /// 指定查询延迟
    pub fn with_delay_for(mut self, query: impl Into<String>, delay: Duration) -> Self {
        self.delayed.insert(Some(query.into()), delay);
        self
    }

    /// 已收到的查询
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().clone()
    }

    /// 某个查询词被调用的次数
    pub fn call_count(&self, query: &str) -> usize {
        self.calls.lock().iter().filter(|q| q.as_str() == query).count()
    }

    fn delay_for(&self, query: &str) -> Option<Duration> {
        self.delayed
            .get(&Some(query.to_string()))
            .or_else(|| self.delayed.get(&None))
            .copied()
    }
}

#[async_trait]
impl CatalogClientPort for FakeCatalogClient {
    async fn search(&self, query: &str, options: &SearchOptions) -> Result<Vec<Track>, CatalogError> {
        self.calls.lock().push(query.to_string());

        tracing::debug!(
            query = %query,
            source = ?options.source_filter,
            limit = options.limit,
            "FakeCatalogClient: returning scripted result"
        );

        if let Some(delay) = self.delay_for(query) {
            tokio::time::sleep(delay).await;
        }

        if self.fail_all || self.failing.contains(query) {
            return Err(CatalogError::ServiceError(format!("scripted failure: {}", query)));
        }

        let tracks = self
            .responses
            .get(query)
            .unwrap_or(&self.fallback)
            .iter()
            .take(options.limit)
            .cloned()
            .collect();
        Ok(tracks)
    }
}
