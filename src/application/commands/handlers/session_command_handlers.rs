//! Session Command Handlers - 会话生命周期

use std::sync::Arc;

use crate::application::commands::{
    EndSessionCommand, EndSessionResponse, RecordTrackStartedCommand, SetAutoplayCommand,
    SetAutoplayResponse, StartSessionCommand, StartSessionResponse,
};
use crate::application::error::ApplicationError;
use crate::application::ports::SessionRegistryPort;
use crate::infrastructure::events::EventPublisher;

/// StartSession Handler - 创建会话并注册事件通道
pub struct StartSessionHandler {
    registry: Arc<dyn SessionRegistryPort>,
    event_publisher: Arc<EventPublisher>,
}

impl StartSessionHandler {
    pub fn new(registry: Arc<dyn SessionRegistryPort>, event_publisher: Arc<EventPublisher>) -> Self {
        Self {
            registry,
            event_publisher,
        }
    }

    pub async fn handle(&self, cmd: StartSessionCommand) -> Result<StartSessionResponse, ApplicationError> {
        if cmd.session_id.trim().is_empty() {
            return Err(ApplicationError::validation("Session id must not be empty"));
        }

        self.registry.start(&cmd.session_id, cmd.queue)?;
        self.event_publisher.register_session(&cmd.session_id);

        Ok(StartSessionResponse {
            session_id: cmd.session_id,
        })
    }
}

/// EndSession Handler - 结束会话
///
/// 取消进行中的推荐并整体清空状态
pub struct EndSessionHandler {
    registry: Arc<dyn SessionRegistryPort>,
    event_publisher: Arc<EventPublisher>,
}

impl EndSessionHandler {
    pub fn new(registry: Arc<dyn SessionRegistryPort>, event_publisher: Arc<EventPublisher>) -> Self {
        Self {
            registry,
            event_publisher,
        }
    }

    pub async fn handle(&self, cmd: EndSessionCommand) -> Result<EndSessionResponse, ApplicationError> {
        self.registry.end(&cmd.session_id)?;

        // 先发事件再注销通道，保证订阅者能收到
        self.event_publisher
            .publish_session_ended(&cmd.session_id, cmd.reason);
        self.event_publisher.unregister_session(&cmd.session_id);

        tracing::info!(
            session_id = %cmd.session_id,
            reason = cmd.reason.as_str(),
            "Session ended"
        );

        Ok(EndSessionResponse {
            session_id: cmd.session_id,
            reason: cmd.reason,
        })
    }
}

/// SetAutoplay Handler - 设置或翻转自动播放
pub struct SetAutoplayHandler {
    registry: Arc<dyn SessionRegistryPort>,
    event_publisher: Arc<EventPublisher>,
}

impl SetAutoplayHandler {
    pub fn new(registry: Arc<dyn SessionRegistryPort>, event_publisher: Arc<EventPublisher>) -> Self {
        Self {
            registry,
            event_publisher,
        }
    }

    pub async fn handle(&self, cmd: SetAutoplayCommand) -> Result<SetAutoplayResponse, ApplicationError> {
        let session = self.registry.get(&cmd.session_id)?;
        let enabled = session.set_autoplay(cmd.enabled)?;
        let should_fill = enabled && session.queue().pending_count() == 0;

        self.event_publisher
            .publish_autoplay_toggled(&cmd.session_id, enabled);

        tracing::info!(
            session_id = %cmd.session_id,
            enabled = enabled,
            should_fill = should_fill,
            "Autoplay toggled"
        );

        Ok(SetAutoplayResponse {
            session_id: cmd.session_id,
            enabled,
            should_fill,
        })
    }
}

/// RecordTrackStarted Handler - 记录开始播放的曲目
pub struct RecordTrackStartedHandler {
    registry: Arc<dyn SessionRegistryPort>,
}

impl RecordTrackStartedHandler {
    pub fn new(registry: Arc<dyn SessionRegistryPort>) -> Self {
        Self { registry }
    }

    pub async fn handle(&self, cmd: RecordTrackStartedCommand) -> Result<(), ApplicationError> {
        let session = self.registry.get(&cmd.session_id)?;

        tracing::debug!(
            session_id = %cmd.session_id,
            uri = %cmd.track.uri(),
            "Track started"
        );

        session.record_track_started(cmd.track)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::commands::EndReason;
    use crate::application::ports::SessionQueuePort;
    use crate::domain::track::Track;
    use crate::infrastructure::events::AutoplayEvent;
    use crate::infrastructure::memory::{InMemorySessionQueue, InMemorySessionRegistry};

    fn setup() -> (Arc<InMemorySessionRegistry>, Arc<EventPublisher>) {
        (
            Arc::new(InMemorySessionRegistry::default()),
            Arc::new(EventPublisher::new()),
        )
    }

    async fn start(
        registry: &Arc<InMemorySessionRegistry>,
        publisher: &Arc<EventPublisher>,
        queue: Arc<InMemorySessionQueue>,
    ) {
        StartSessionHandler::new(registry.clone(), publisher.clone())
            .handle(StartSessionCommand {
                session_id: "g1".to_string(),
                queue,
            })
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_start_rejects_duplicates_and_blank_ids() {
        let (registry, publisher) = setup();
        start(&registry, &publisher, Arc::new(InMemorySessionQueue::new())).await;
        assert!(publisher.subscribe("g1").is_some());

        let handler = StartSessionHandler::new(registry.clone(), publisher.clone());
        let dup = handler
            .handle(StartSessionCommand {
                session_id: "g1".to_string(),
                queue: Arc::new(InMemorySessionQueue::new()),
            })
            .await;
        assert!(matches!(dup, Err(ApplicationError::AlreadyExists { .. })));

        let blank = handler
            .handle(StartSessionCommand {
                session_id: " ".to_string(),
                queue: Arc::new(InMemorySessionQueue::new()),
            })
            .await;
        assert!(matches!(blank, Err(ApplicationError::ValidationError(_))));
    }

    #[tokio::test]
    async fn test_set_autoplay_reports_fill_on_empty_queue() {
        let (registry, publisher) = setup();
        let queue = Arc::new(InMemorySessionQueue::new());
        start(&registry, &publisher, queue.clone()).await;
        let mut events = publisher.subscribe("g1").unwrap();

        let handler = SetAutoplayHandler::new(registry.clone(), publisher.clone());
        let resp = handler
            .handle(SetAutoplayCommand {
                session_id: "g1".to_string(),
                enabled: None,
            })
            .await
            .unwrap();
        assert!(resp.enabled);
        assert!(resp.should_fill);
        assert_eq!(
            events.recv().await.unwrap(),
            AutoplayEvent::AutoplayToggled {
                session_id: "g1".to_string(),
                enabled: true,
            }
        );

        queue.enqueue(Track::new("x", "X"));
        let resp = handler
            .handle(SetAutoplayCommand {
                session_id: "g1".to_string(),
                enabled: Some(true),
            })
            .await
            .unwrap();
        assert!(resp.enabled);
        assert!(!resp.should_fill);

        let resp = handler
            .handle(SetAutoplayCommand {
                session_id: "g1".to_string(),
                enabled: None,
            })
            .await
            .unwrap();
        assert!(!resp.enabled);
    }

    #[tokio::test]
    async fn test_end_resets_and_publishes() {
        let (registry, publisher) = setup();
        start(&registry, &publisher, Arc::new(InMemorySessionQueue::new())).await;
        let session = registry.get("g1").unwrap();
        session.set_autoplay(Some(true)).unwrap();

        RecordTrackStartedHandler::new(registry.clone())
            .handle(RecordTrackStartedCommand {
                session_id: "g1".to_string(),
                track: Track::new("a", "A"),
            })
            .await
            .unwrap();
        assert_eq!(session.snapshot().played_history().len(), 1);

        let mut events = publisher.subscribe("g1").unwrap();
        let resp = EndSessionHandler::new(registry.clone(), publisher.clone())
            .handle(EndSessionCommand {
                session_id: "g1".to_string(),
                reason: EndReason::VoiceChannelEmpty,
            })
            .await
            .unwrap();
        assert_eq!(resp.reason, EndReason::VoiceChannelEmpty);

        let state = session.snapshot();
        assert!(!state.autoplay_enabled());
        assert!(state.last_track().is_none());
        assert!(state.played_history().is_empty());
        assert!(!registry.is_active("g1"));
        assert!(publisher.subscribe("g1").is_none());
        assert!(matches!(
            events.recv().await.unwrap(),
            AutoplayEvent::SessionEnded { .. }
        ));
    }

    #[tokio::test]
    async fn test_unknown_session_errors() {
        let (registry, publisher) = setup();
        let end = EndSessionHandler::new(registry.clone(), publisher.clone())
            .handle(EndSessionCommand {
                session_id: "nope".to_string(),
                reason: EndReason::Stopped,
            })
            .await;
        assert!(matches!(end, Err(ApplicationError::NotFound { .. })));

        let record = RecordTrackStartedHandler::new(registry)
            .handle(RecordTrackStartedCommand {
                session_id: "nope".to_string(),
                track: Track::new("a", "A"),
            })
            .await;
        assert!(matches!(record, Err(ApplicationError::NotFound { .. })));
    }
}
