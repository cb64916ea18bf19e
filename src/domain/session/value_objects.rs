//! Session Context - Value Objects

use std::collections::VecDeque;

/// 默认历史容量
pub const DEFAULT_HISTORY_CAPACITY: usize = 100;

/// 已播放历史 - 有界 FIFO
///
/// 不变量:
/// - 长度永不超过 capacity，溢出时淘汰最旧的条目
/// - capacity 至少为 1
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayedHistory {
    entries: VecDeque<String>,
    capacity: usize,
}

impl PlayedHistory {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// 追加 uri，返回被淘汰的条目
    pub fn push(&mut self, uri: impl Into<String>) -> Option<String> {
        let evicted = if self.entries.len() >= self.capacity {
            self.entries.pop_front()
        } else {
            None
        };
        self.entries.push_back(uri.into());
        evicted
    }

    pub fn contains(&self, uri: &str) -> bool {
        self.entries.iter().any(|entry| entry == uri)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// 从旧到新遍历
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(String::as_str)
    }
}

impl Default for PlayedHistory {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_CAPACITY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_within_capacity() {
        let mut history = PlayedHistory::new(3);
        assert_eq!(history.push("a"), None);
        assert_eq!(history.push("b"), None);
        assert_eq!(history.len(), 2);
        assert!(history.contains("a"));
    }

    #[test]
    fn test_overflow_evicts_oldest() {
        let mut history = PlayedHistory::default();
        for i in 0..100 {
            history.push(format!("uri-{}", i));
        }
        assert_eq!(history.len(), 100);

        let evicted = history.push("uri-100");
        assert_eq!(evicted.as_deref(), Some("uri-0"));
        assert_eq!(history.len(), 100);
        assert!(!history.contains("uri-0"));
        assert!(history.contains("uri-1"));
        assert!(history.contains("uri-100"));
    }

    #[test]
    fn test_zero_capacity_is_clamped() {
        let mut history = PlayedHistory::new(0);
        history.push("a");
        history.push("b");
        assert_eq!(history.capacity(), 1);
        assert_eq!(history.iter().collect::<Vec<_>>(), vec!["b"]);
    }
}
