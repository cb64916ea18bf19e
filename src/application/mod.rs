//! 应用层 - 用例编排
//!
//! 包含：
//! - ports: 六边形架构端口定义（CatalogClient、SessionQueue、SessionRegistry）
//! - commands: CQRS 命令及处理器（推荐编排、会话生命周期）
//! - queries: CQRS 查询及处理器
//! - error: 应用层错误定义

pub mod commands;
pub mod error;
pub mod ports;
pub mod queries;

// Re-exports
pub use commands::{
    // Autoplay commands
    RecommendNextCommand,
    RecommendOutcome,
    SetAutoplayCommand,
    SetAutoplayResponse,
    // Session commands
    EndReason,
    EndSessionCommand,
    EndSessionResponse,
    RecordTrackStartedCommand,
    StartSessionCommand,
    StartSessionResponse,
    // Handlers
    handlers::{
        EndSessionHandler, RecommendNextHandler, RecordTrackStartedHandler, SetAutoplayHandler,
        StartSessionHandler,
    },
};

pub use error::ApplicationError;

pub use ports::{
    // Catalog client
    CatalogClientPort,
    CatalogError,
    SearchOptions,
    // Session queue
    SessionQueuePort,
    // Session registry
    RecommendationGuard,
    SessionError,
    SessionHandle,
    SessionRegistryPort,
};

pub use queries::{
    GetSessionState,
    ListSessions,
    // Handlers
    handlers::{GetSessionStateHandler, ListSessionsHandler, SessionStateView},
};
