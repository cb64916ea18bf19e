//! Application Ports - 出站端口定义
//!
//! 定义应用层与基础设施层的抽象接口

mod catalog_client;
mod session_queue;
mod session_registry;

pub use catalog_client::{CatalogClientPort, CatalogError, SearchOptions};
pub use session_queue::SessionQueuePort;
pub use session_registry::{
    RecommendationGuard, SessionError, SessionHandle, SessionRegistryPort,
};
