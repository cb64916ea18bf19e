//! Segue - 语音频道音乐会话的自动播放推荐引擎
//!
//! 架构设计: DDD + CQRS + Hexagonal Architecture
//!
//! 领域层 (domain/):
//! - Track Context: 曲目、指纹与近似重复判断
//! - Autoplay Context: 搜索词生成、评分与选择
//! - Session Context: 会话状态与有界播放历史
//!
//! 应用层 (application/):
//! - Ports: 端口定义（CatalogClient, SessionQueue, SessionRegistry）
//! - Commands: 推荐编排与会话生命周期命令
//! - Queries: 会话状态查询
//!
//! 基础设施层 (infrastructure/):
//! - Memory: SessionRegistry, SessionQueue 内存实现
//! - Adapters: Lavalink 曲库客户端、Fake 曲库、随机源
//! - Events: 自动播放事件发布
//! - Worker: AutoplayWorker 播放事件处理

pub mod application;
pub mod config;
pub mod domain;
pub mod infrastructure;

pub use application::{RecommendNextHandler, RecommendOutcome};
pub use config::{init_logging, load_config, AppConfig};
pub use domain::autoplay::AutoplaySettings;
pub use domain::track::Track;
