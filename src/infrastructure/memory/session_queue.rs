//! In-Memory Session Queue Implementation
//!
//! 供宿主播放器直接使用的简单队列，也用于测试

use parking_lot::Mutex;
use std::collections::{HashSet, VecDeque};

use crate::application::ports::SessionQueuePort;
use crate::domain::track::Track;

#[derive(Debug, Default)]
struct QueueInner {
    pending: VecDeque<Track>,
    current: Option<Track>,
    previous: Option<Track>,
}

/// 内存播放队列
#[derive(Debug, Default)]
pub struct InMemorySessionQueue {
    inner: Mutex<QueueInner>,
}

impl InMemorySessionQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// 以若干待播放曲目初始化
    pub fn with_tracks(tracks: impl IntoIterator<Item = Track>) -> Self {
        let queue = Self::new();
        queue.inner.lock().pending.extend(tracks);
        queue
    }

    /// 切到下一首：当前曲目变为上一首，返回新的当前曲目
    pub fn advance(&self) -> Option<Track> {
        let mut inner = self.inner.lock();
        let next = inner.pending.pop_front();
        if let Some(current) = inner.current.take() {
            inner.previous = Some(current);
        }
        inner.current = next.clone();
        next
    }

    pub fn current(&self) -> Option<Track> {
        self.inner.lock().current.clone()
    }

    /// 待播放曲目快照
    pub fn pending(&self) -> Vec<Track> {
        self.inner.lock().pending.iter().cloned().collect()
    }

    pub fn clear(&self) {
        let mut inner = self.inner.lock();
        inner.pending.clear();
        inner.current = None;
        inner.previous = None;
    }
}

impl SessionQueuePort for InMemorySessionQueue {
    fn currently_queued_uris(&self) -> HashSet<String> {
        self.inner
            .lock()
            .pending
            .iter()
            .filter(|t| t.has_uri())
            .map(|t| t.uri().to_string())
            .collect()
    }

    fn previous_track(&self) -> Option<Track> {
        self.inner.lock().previous.clone()
    }

    fn pending_count(&self) -> usize {
        self.inner.lock().pending.len()
    }

    fn enqueue(&self, track: Track) {
        self.inner.lock().pending.push_back(track);
    }
}
