//! Session Context - 播放会话限界上下文
//!
//! 职责:
//! - 自动播放开关
//! - 种子曲目（最近播放）
//! - 有界播放历史

mod aggregate;
mod value_objects;

pub use aggregate::SessionState;
pub use value_objects::{PlayedHistory, DEFAULT_HISTORY_CAPACITY};
