//! Worker Layer - Background Task Processing
//!
//! 实现 AutoplayWorker，处理播放事件并在队列播空时补歌

mod autoplay_worker;

pub use autoplay_worker::{AutoplayHandlers, AutoplayWorker, AutoplayWorkerConfig, PlaybackEvent};
