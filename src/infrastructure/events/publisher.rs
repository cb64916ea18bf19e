//! Event Publisher Implementation
//!
//! 按会话广播自动播放事件，另有一个全局通道汇总所有会话的事件

use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

use crate::application::commands::EndReason;
use crate::domain::track::Track;

const DEFAULT_CHANNEL_CAPACITY: usize = 100;

/// 自动播放事件
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data")]
pub enum AutoplayEvent {
    /// 已选中并入队一首推荐曲目
    TrackRecommended {
        session_id: String,
        uri: String,
        title: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        author: Option<String>,
    },
    /// 本次没有推荐（中性状态，不是错误）
    NoRecommendation { session_id: String, reason: String },
    /// 自动播放开关变化
    AutoplayToggled { session_id: String, enabled: bool },
    /// 会话结束
    SessionEnded { session_id: String, reason: EndReason },
}

impl AutoplayEvent {
    pub fn session_id(&self) -> &str {
        match self {
            AutoplayEvent::TrackRecommended { session_id, .. }
            | AutoplayEvent::NoRecommendation { session_id, .. }
            | AutoplayEvent::AutoplayToggled { session_id, .. }
            | AutoplayEvent::SessionEnded { session_id, .. } => session_id,
        }
    }
}

/// 事件发布器
pub struct EventPublisher {
    /// session_id -> broadcast sender
    session_channels: DashMap<String, broadcast::Sender<AutoplayEvent>>,
    /// 所有会话的事件
    global_channel: broadcast::Sender<AutoplayEvent>,
    capacity: usize,
}

impl EventPublisher {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CHANNEL_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        let (global_tx, _) = broadcast::channel(capacity);
        Self {
            session_channels: DashMap::new(),
            global_channel: global_tx,
            capacity,
        }
    }

    /// 订阅全局事件
    pub fn subscribe_global(&self) -> broadcast::Receiver<AutoplayEvent> {
        self.global_channel.subscribe()
    }

    /// 注册会话的事件通道
    pub fn register_session(&self, session_id: &str) -> broadcast::Receiver<AutoplayEvent> {
        self.session_channels
            .entry(session_id.to_string())
            .or_insert_with(|| broadcast::channel(self.capacity).0)
            .subscribe()
    }

    /// 取消注册会话
    pub fn unregister_session(&self, session_id: &str) {
        self.session_channels.remove(session_id);
    }

    /// 获取会话的事件接收器
    pub fn subscribe(&self, session_id: &str) -> Option<broadcast::Receiver<AutoplayEvent>> {
        self.session_channels.get(session_id).map(|s| s.subscribe())
    }

    pub fn publish_track_recommended(&self, session_id: &str, track: &Track) {
        self.publish(AutoplayEvent::TrackRecommended {
            session_id: session_id.to_string(),
            uri: track.uri().to_string(),
            title: track.title().to_string(),
            author: track.author().map(str::to_string),
        });
    }

    pub fn publish_no_recommendation(&self, session_id: &str, reason: &str) {
        self.publish(AutoplayEvent::NoRecommendation {
            session_id: session_id.to_string(),
            reason: reason.to_string(),
        });
    }

    pub fn publish_autoplay_toggled(&self, session_id: &str, enabled: bool) {
        self.publish(AutoplayEvent::AutoplayToggled {
            session_id: session_id.to_string(),
            enabled,
        });
    }

    pub fn publish_session_ended(&self, session_id: &str, reason: EndReason) {
        self.publish(AutoplayEvent::SessionEnded {
            session_id: session_id.to_string(),
            reason,
        });
    }

    /// 发布到会话通道与全局通道
    fn publish(&self, event: AutoplayEvent) {
        if let Some(sender) = self.session_channels.get(event.session_id()) {
            if let Err(e) = sender.send(event.clone()) {
                tracing::debug!(
                    session_id = %event.session_id(),
                    error = %e,
                    "Failed to publish event (no receivers)"
                );
            }
        }
        // 全局通道没有订阅者是常态
        let _ = self.global_channel.send(event);
    }
}

impl Default for EventPublisher {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_session_and_global_delivery() {
        let publisher = EventPublisher::new();
        let mut session_rx = publisher.register_session("g1");
        let mut global_rx = publisher.subscribe_global();

        publisher.publish_autoplay_toggled("g1", true);

        let expected = AutoplayEvent::AutoplayToggled {
            session_id: "g1".to_string(),
            enabled: true,
        };
        assert_eq!(session_rx.recv().await.unwrap(), expected);
        assert_eq!(global_rx.recv().await.unwrap(), expected);
    }

    #[tokio::test]
    async fn test_unregistered_session_only_reaches_global() {
        let publisher = EventPublisher::new();
        let mut global_rx = publisher.subscribe_global();
        publisher.register_session("g1");
        publisher.unregister_session("g1");
        assert!(publisher.subscribe("g1").is_none());

        publisher.publish_no_recommendation("g1", "exhausted");
        let event = global_rx.recv().await.unwrap();
        assert_eq!(event.session_id(), "g1");
    }

    #[test]
    fn test_event_serialization() {
        let event = AutoplayEvent::SessionEnded {
            session_id: "g1".to_string(),
            reason: EndReason::IdleTimeout,
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["event"], "SessionEnded");
        assert_eq!(json["data"]["reason"], "idle_timeout");

        let track = Track::new("u", "T");
        let publisher = EventPublisher::new();
        let mut rx = publisher.register_session("g2");
        publisher.publish_track_recommended("g2", &track);
        let json = serde_json::to_value(rx.try_recv().unwrap()).unwrap();
        assert!(json["data"].get("author").is_none());
    }
}
