//! Track Context - Near-duplicate detection
//!
//! 曲库常把同一首歌以不同 uri 返回（重制版、不同发行版），需要单独过滤

use super::{Fingerprint, Track};

/// 近似重复判断
///
/// 缺失 uri 或 uri 与种子相同时无条件视为重复；
/// 否则标题重合率超过阈值且至少有一个相同艺人时视为重复
pub fn is_near_duplicate(candidate: &Track, seed: &Track, threshold: f64) -> bool {
    NearDuplicateFilter::new(seed, threshold).matches(candidate)
}

/// 预先计算好种子指纹的过滤器，批量过滤候选时使用
#[derive(Debug, Clone)]
pub struct NearDuplicateFilter {
    seed_uri: String,
    seed_fingerprint: Fingerprint,
    threshold: f64,
}

impl NearDuplicateFilter {
    pub fn new(seed: &Track, threshold: f64) -> Self {
        Self {
            seed_uri: seed.uri().to_string(),
            seed_fingerprint: Fingerprint::of(seed),
            threshold,
        }
    }

    pub fn matches(&self, candidate: &Track) -> bool {
        if !candidate.has_uri() || candidate.uri() == self.seed_uri {
            return true;
        }

        let fingerprint = Fingerprint::of(candidate);
        let title_overlap = fingerprint.title_overlap(&self.seed_fingerprint);
        let artist_overlap = fingerprint.artist_overlap(&self.seed_fingerprint);

        title_overlap > self.threshold && artist_overlap > 0
    }
}
