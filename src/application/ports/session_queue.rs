//! Session Queue Port - 播放队列抽象
//!
//! 播放队列由宿主播放器持有；推荐引擎只读，入队由调用方完成

use std::collections::HashSet;

use crate::domain::track::Track;

/// Session Queue Port
pub trait SessionQueuePort: Send + Sync {
    /// 当前待播放曲目的 uri 集合
    fn currently_queued_uris(&self) -> HashSet<String>;

    /// 上一首播放过的曲目
    fn previous_track(&self) -> Option<Track>;

    /// 待播放曲目数量
    fn pending_count(&self) -> usize;

    /// 追加到队尾
    fn enqueue(&self, track: Track);
}
