//! Events - 自动播放事件推送

mod publisher;

pub use publisher::{AutoplayEvent, EventPublisher};
