//! Memory Layer - In-Memory State Management
//!
//! 实现 SessionRegistry 和 SessionQueue，管理播放会话的内存状态

mod session_queue;
mod session_registry;

pub use session_queue::InMemorySessionQueue;
pub use session_registry::InMemorySessionRegistry;
