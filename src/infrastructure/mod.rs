//! Infrastructure Layer - 基础设施层
//!
//! 提供所有端口的具体实现

pub mod adapters;
pub mod events;
pub mod memory;
pub mod worker;

pub use adapters::{FakeCatalogClient, LavalinkCatalogClient, LavalinkClientConfig, ThreadRngJitter};
pub use events::{AutoplayEvent, EventPublisher};
pub use memory::{InMemorySessionQueue, InMemorySessionRegistry};
pub use worker::{AutoplayHandlers, AutoplayWorker, AutoplayWorkerConfig, PlaybackEvent};
