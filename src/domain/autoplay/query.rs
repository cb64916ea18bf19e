//! Autoplay Context - Query synthesis
//!
//! 根据种子曲目元数据生成有序搜索词，级别越高越宽泛

use crate::domain::track::Track;

/// 级别 >= 1 追加
const TRENDING_QUERY: &str = "popular trending tracks";
/// 级别 >= 2 追加
const BROAD_QUERY: &str = "recommended popular tracks";
/// 永远放在最后的兜底查询
const CATCH_ALL_QUERY: &str = "top hits";

/// 查询扩展级别
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub struct EscalationLevel(u8);

impl EscalationLevel {
    pub const INITIAL: Self = Self(0);

    pub fn new(level: u8) -> Self {
        Self(level)
    }

    pub fn value(&self) -> u8 {
        self.0
    }

    pub fn next(&self) -> Self {
        Self(self.0.saturating_add(1))
    }
}

impl std::fmt::Display for EscalationLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// author 中第一个逗号前的名字
pub fn primary_artist(seed: &Track) -> String {
    seed.author()
        .and_then(|author| author.split(',').next())
        .map(|name| name.trim().to_string())
        .unwrap_or_default()
}

/// 标题第一个 "(" 之前的部分
pub fn core_title(seed: &Track) -> String {
    seed.title()
        .split('(')
        .next()
        .unwrap_or_default()
        .trim()
        .to_string()
}

/// 生成搜索词列表
///
/// 顺序即优先级，但下游并发执行、不按顺序加权；
/// 结果永远非空且不含空字符串
pub fn build_queries(seed: &Track, level: EscalationLevel) -> Vec<String> {
    let artist = primary_artist(seed);
    let title = core_title(seed);
    let genre = seed.genre().map(str::trim).unwrap_or_default();

    let mut queries = Vec::with_capacity(7);

    if !artist.is_empty() && !title.is_empty() {
        queries.push(format!("similar to {} {}", artist, title));
    }
    if !artist.is_empty() {
        queries.push(format!("artist:{}", artist));
    }
    if !genre.is_empty() {
        queries.push(format!("genre:{}", genre));
    }
    if !title.is_empty() {
        queries.push(format!("tracks like {}", title));
    }
    if level.value() >= 1 {
        queries.push(TRENDING_QUERY.to_string());
    }
    if level.value() >= 2 {
        queries.push(BROAD_QUERY.to_string());
    }
    queries.push(CATCH_ALL_QUERY.to_string());

    queries
}
