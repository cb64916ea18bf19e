//! Autoplay Context - Scoring & selection
//!
//! 评分规则:
//! - 共同艺人: 每个 +5；双方都有艺人但没有共同艺人时 +2
//! - 流派相同（忽略大小写）: +3
//! - 时长差小于窗口: +2
//! - 随机抖动: [0, 2)

use crate::domain::track::{split_artists, Track};

const SHARED_ARTIST_BONUS: f64 = 5.0;
const DISCOVERY_BONUS: f64 = 2.0;
const GENRE_BONUS: f64 = 3.0;
const DURATION_BONUS: f64 = 2.0;
const JITTER_SPAN: f64 = 2.0;

/// 随机源
///
/// 返回 [0, 1) 内的均匀值；测试中可注入固定序列
pub trait JitterSource: Send + Sync {
    fn sample(&self) -> f64;
}

/// 评分明细
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ScoreBreakdown {
    pub shared_artists: usize,
    pub artist_bonus: f64,
    pub genre_bonus: f64,
    pub duration_bonus: f64,
    pub jitter: f64,
}

impl ScoreBreakdown {
    pub fn total(&self) -> f64 {
        self.artist_bonus + self.genre_bonus + self.duration_bonus + self.jitter
    }
}

/// 带分数的候选
#[derive(Debug, Clone)]
pub struct ScoredTrack {
    pub track: Track,
    pub score: ScoreBreakdown,
}

/// 计算不含抖动的确定性得分
pub fn score_candidate(seed: &Track, candidate: &Track, duration_window_ms: u64) -> ScoreBreakdown {
    let mut score = ScoreBreakdown::default();

    let seed_artists = split_artists(seed.author().unwrap_or_default());
    let candidate_artists = split_artists(candidate.author().unwrap_or_default());
    if !seed_artists.is_empty() && !candidate_artists.is_empty() {
        let shared = candidate_artists
            .iter()
            .filter(|name| {
                seed_artists
                    .iter()
                    .any(|seed_name| seed_name.contains(name.as_str()) || name.contains(seed_name.as_str()))
            })
            .count();
        score.shared_artists = shared;
        score.artist_bonus = if shared == 0 {
            DISCOVERY_BONUS
        } else {
            shared as f64 * SHARED_ARTIST_BONUS
        };
    }

    if let (Some(a), Some(b)) = (seed.genre(), candidate.genre()) {
        if a.trim().eq_ignore_ascii_case(b.trim()) {
            score.genre_bonus = GENRE_BONUS;
        }
    }

    if let (Some(a), Some(b)) = (seed.length_ms(), candidate.length_ms()) {
        if a.abs_diff(b) < duration_window_ms {
            score.duration_bonus = DURATION_BONUS;
        }
    }

    score
}

/// 对候选评分并按总分降序排列
pub fn rank_candidates(
    seed: &Track,
    eligible: Vec<Track>,
    duration_window_ms: u64,
    jitter: &dyn JitterSource,
) -> Vec<ScoredTrack> {
    let mut scored: Vec<ScoredTrack> = eligible
        .into_iter()
        .map(|track| {
            let mut score = score_candidate(seed, &track, duration_window_ms);
            score.jitter = jitter.sample().clamp(0.0, 1.0 - f64::EPSILON) * JITTER_SPAN;
            ScoredTrack { track, score }
        })
        .collect();

    scored.sort_by(|a, b| b.score.total().total_cmp(&a.score.total()));
    scored
}

/// 选出得分最高的候选
pub fn select_best(
    seed: &Track,
    eligible: Vec<Track>,
    duration_window_ms: u64,
    jitter: &dyn JitterSource,
) -> Option<ScoredTrack> {
    rank_candidates(seed, eligible, duration_window_ms, jitter)
        .into_iter()
        .next()
}
