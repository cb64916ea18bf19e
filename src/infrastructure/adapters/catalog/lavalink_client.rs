//! Lavalink Catalog Client - 通过 Lavalink REST 接口搜索曲目
//!
//! 实现 CatalogClientPort trait
//!
//! Lavalink v4 API:
//! GET {base_url}/v4/loadtracks?identifier=spsearch:{query}
//! Header: Authorization: {password}
//! Response: {"loadType": "search" | "track" | "playlist" | "empty" | "error", "data": ...}

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;

use crate::application::ports::{CatalogClientPort, CatalogError, SearchOptions};
use crate::config::CatalogConfig;
use crate::domain::track::Track;

/// loadtracks 响应
#[derive(Debug, Deserialize)]
#[serde(tag = "loadType", content = "data", rename_all = "lowercase")]
enum LoadResult {
    Track(LavalinkTrack),
    Playlist(LavalinkPlaylist),
    Search(Vec<LavalinkTrack>),
    Empty(serde::de::IgnoredAny),
    Error(LavalinkException),
}

#[derive(Debug, Deserialize)]
struct LavalinkTrack {
    info: LavalinkTrackInfo,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LavalinkTrackInfo {
    #[serde(default)]
    title: String,
    #[serde(default)]
    author: String,
    #[serde(default)]
    length: u64,
    #[serde(default)]
    is_stream: bool,
    #[serde(default)]
    uri: Option<String>,
    #[serde(default)]
    source_name: String,
}

#[derive(Debug, Deserialize)]
struct LavalinkPlaylist {
    #[serde(default)]
    tracks: Vec<LavalinkTrack>,
}

#[derive(Debug, Deserialize)]
struct LavalinkException {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    severity: String,
}

impl From<LavalinkTrack> for Track {
    fn from(track: LavalinkTrack) -> Self {
        let info = track.info;
        let mut out = Track::new(info.uri.unwrap_or_default(), info.title)
            .with_author(info.author)
            .with_source(info.source_name);
        // 直播流没有有效时长
        if !info.is_stream {
            out = out.with_length_ms(info.length);
        }
        out
    }
}

/// 将 loadtracks 结果转为曲目列表
fn into_tracks(result: LoadResult, limit: usize) -> Result<Vec<Track>, CatalogError> {
    let tracks = match result {
        LoadResult::Track(track) => vec![track],
        LoadResult::Playlist(playlist) => playlist.tracks,
        LoadResult::Search(tracks) => tracks,
        LoadResult::Empty(_) => Vec::new(),
        LoadResult::Error(e) => {
            return Err(CatalogError::ServiceError(format!(
                "{} ({})",
                e.message.unwrap_or_else(|| "unknown error".to_string()),
                e.severity
            )));
        }
    };
    Ok(tracks.into_iter().take(limit).map(Track::from).collect())
}

/// Lavalink 客户端配置
#[derive(Debug, Clone)]
pub struct LavalinkClientConfig {
    /// Lavalink 节点基础 URL
    pub base_url: String,
    /// 节点密码
    pub password: String,
    /// 请求超时时间（秒）
    pub timeout_secs: u64,
}

impl Default for LavalinkClientConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:2333".to_string(),
            password: "youshallnotpass".to_string(),
            timeout_secs: 10,
        }
    }
}

impl LavalinkClientConfig {
    pub fn new(base_url: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            password: password.into(),
            ..Default::default()
        }
    }

    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }
}

impl From<&CatalogConfig> for LavalinkClientConfig {
    fn from(config: &CatalogConfig) -> Self {
        Self::new(config.base_url.clone(), config.password.clone()).with_timeout(config.timeout_secs)
    }
}

/// Lavalink 曲库客户端
pub struct LavalinkCatalogClient {
    client: Client,
    config: LavalinkClientConfig,
}

impl LavalinkCatalogClient {
    /// 创建新的 Lavalink 客户端
    pub fn new(config: LavalinkClientConfig) -> Result<Self, CatalogError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| CatalogError::NetworkError(e.to_string()))?;

        Ok(Self { client, config })
    }

    /// 从应用配置的 catalog 段创建客户端
    pub fn from_config(config: &CatalogConfig) -> Result<Self, CatalogError> {
        Self::new(LavalinkClientConfig::from(config))
    }

    fn load_tracks_url(&self) -> String {
        format!("{}/v4/loadtracks", self.config.base_url.trim_end_matches('/'))
    }

    fn info_url(&self) -> String {
        format!("{}/v4/info", self.config.base_url.trim_end_matches('/'))
    }

    /// 拼接搜索标识，如 "spsearch:daft punk"
    fn identifier(query: &str, options: &SearchOptions) -> String {
        match options.source_filter.as_deref() {
            Some(source) if !source.is_empty() => {
                format!("{}:{}", source.trim_end_matches(':'), query)
            }
            _ => query.to_string(),
        }
    }
}

#[async_trait]
impl CatalogClientPort for LavalinkCatalogClient {
    async fn search(&self, query: &str, options: &SearchOptions) -> Result<Vec<Track>, CatalogError> {
        let identifier = Self::identifier(query, options);

        tracing::debug!(
            url = %self.load_tracks_url(),
            identifier = %identifier,
            "Sending Lavalink loadtracks request"
        );

        let response = self
            .client
            .get(self.load_tracks_url())
            .header("Authorization", &self.config.password)
            .query(&[("identifier", identifier.as_str())])
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    CatalogError::Timeout
                } else if e.is_connect() {
                    CatalogError::NetworkError(format!("Cannot connect to Lavalink: {}", e))
                } else {
                    CatalogError::NetworkError(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(CatalogError::ServiceError(format!(
                "HTTP {}: {}",
                status, error_text
            )));
        }

        let result: LoadResult = response
            .json()
            .await
            .map_err(|e| CatalogError::InvalidResponse(format!("Failed to decode loadtracks: {}", e)))?;

        let tracks = into_tracks(result, options.limit)?;
        tracing::debug!(identifier = %identifier, count = tracks.len(), "Lavalink search completed");
        Ok(tracks)
    }

    async fn health_check(&self) -> bool {
        match self
            .client
            .get(self.info_url())
            .header("Authorization", &self.config.password)
            .timeout(Duration::from_secs(5))
            .send()
            .await
        {
            Ok(response) => response.status().is_success(),
            Err(_) => false,
        }
    }
}
