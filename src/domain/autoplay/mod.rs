//! Autoplay Context - 自动播放推荐上下文
//!
//! 职责:
//! - 搜索词生成与扩展级别
//! - 候选评分与选择
//! - 调优参数

mod query;
mod scoring;
mod settings;

pub use query::{build_queries, core_title, primary_artist, EscalationLevel};
pub use scoring::{
    rank_candidates, score_candidate, select_best, JitterSource, ScoreBreakdown, ScoredTrack,
};
pub use settings::AutoplaySettings;
