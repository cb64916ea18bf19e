//! Track Context - Entities

use serde::{Deserialize, Serialize};

/// 曲目请求者
///
/// 用户手动点播，或者由自动播放选出
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum Requester {
    /// 聊天平台用户
    User(String),
    /// 系统自身（自动播放）
    System,
}

impl Requester {
    pub fn is_system(&self) -> bool {
        matches!(self, Requester::System)
    }
}

/// 曲目 - 由曲库搜索返回的可播放条目
///
/// 不变量:
/// - 除 requester 外创建后不可修改
/// - uri 为空视为无效标识，不参与去重与推荐
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Track {
    /// 稳定唯一标识
    uri: String,
    /// 标题（可能带 "(Live)"、"[Remix]" 等注释）
    title: String,
    /// 艺人，可能是逗号或 & 分隔的多个名字
    author: Option<String>,
    /// 时长（毫秒），0 或缺失表示未知
    length_ms: Option<u64>,
    /// 流派
    genre: Option<String>,
    /// 来源曲库标记（如 "spotify"、"youtube"）
    source_name: String,
    /// 点播者
    requester: Option<Requester>,
}

impl Track {
    pub fn new(uri: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            uri: uri.into(),
            title: title.into(),
            author: None,
            length_ms: None,
            genre: None,
            source_name: String::new(),
            requester: None,
        }
    }

    pub fn with_author(mut self, author: impl Into<String>) -> Self {
        let author = author.into();
        self.author = if author.trim().is_empty() {
            None
        } else {
            Some(author)
        };
        self
    }

    pub fn with_length_ms(mut self, length_ms: u64) -> Self {
        self.length_ms = if length_ms == 0 { None } else { Some(length_ms) };
        self
    }

    pub fn with_genre(mut self, genre: impl Into<String>) -> Self {
        let genre = genre.into();
        self.genre = if genre.trim().is_empty() {
            None
        } else {
            Some(genre)
        };
        self
    }

    pub fn with_source(mut self, source_name: impl Into<String>) -> Self {
        self.source_name = source_name.into();
        self
    }

    pub fn with_requester(mut self, requester: Requester) -> Self {
        self.requester = Some(requester);
        self
    }

    /// 选中时写入请求者
    pub fn assign_requester(&mut self, requester: Requester) {
        self.requester = Some(requester);
    }

    pub fn uri(&self) -> &str {
        &self.uri
    }

    /// 是否有可用于去重的标识
    pub fn has_uri(&self) -> bool {
        !self.uri.trim().is_empty()
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn author(&self) -> Option<&str> {
        self.author.as_deref()
    }

    /// 时长，仅在为正数时返回
    pub fn length_ms(&self) -> Option<u64> {
        self.length_ms.filter(|ms| *ms > 0)
    }

    pub fn genre(&self) -> Option<&str> {
        self.genre.as_deref()
    }

    pub fn source_name(&self) -> &str {
        &self.source_name
    }

    pub fn requester(&self) -> Option<&Requester> {
        self.requester.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_metadata_is_absent() {
        let track = Track::new("a", "Song")
            .with_author("  ")
            .with_genre("")
            .with_length_ms(0);
        assert_eq!(track.author(), None);
        assert_eq!(track.genre(), None);
        assert_eq!(track.length_ms(), None);
    }

    #[test]
    fn test_has_uri() {
        assert!(Track::new("spotify:track:1", "x").has_uri());
        assert!(!Track::new("   ", "x").has_uri());
    }

    #[test]
    fn test_assign_requester() {
        let mut track = Track::new("a", "Song").with_requester(Requester::User("42".into()));
        track.assign_requester(Requester::System);
        assert!(track.requester().is_some_and(Requester::is_system));
    }
}
