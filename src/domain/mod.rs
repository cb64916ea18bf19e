//! Domain Layer - 领域层
//!
//! 包含三个限界上下文:
//! - Track Context: 曲目、指纹与近似重复判断
//! - Autoplay Context: 搜索词生成、评分与选择
//! - Session Context: 会话状态与播放历史

pub mod autoplay;
pub mod session;
pub mod track;
