//! Autoplay Worker - 播放事件驱动的补歌任务
//!
//! 消费宿主播放器发来的 PlaybackEvent：
//! - 曲目开始: 记录到会话状态
//! - 曲目结束 / 队列播空 / 开启自动播放: 队列为空时请求推荐并入队一次
//! - 会话结束: 取消进行中的推荐并清空状态

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, Semaphore};

use crate::application::commands::handlers::{
    EndSessionHandler, RecommendNextHandler, RecordTrackStartedHandler, SetAutoplayHandler,
};
use crate::application::commands::{
    EndReason, EndSessionCommand, RecommendOutcome, RecordTrackStartedCommand,
    SetAutoplayCommand,
};
use crate::application::ports::SessionRegistryPort;
use crate::config::WorkerConfig;
use crate::domain::track::Track;
use crate::infrastructure::events::EventPublisher;

/// 宿主播放器发来的事件
#[derive(Debug, Clone)]
pub enum PlaybackEvent {
    /// 曲目开始播放
    TrackStarted { session_id: String, track: Track },
    /// 曲目播放结束
    TrackEnded { session_id: String },
    /// 队列已播空
    QueueDrained { session_id: String },
    /// 用户切换自动播放；None 表示翻转
    AutoplayToggled {
        session_id: String,
        enabled: Option<bool>,
    },
    /// 会话结束
    SessionEnded { session_id: String, reason: EndReason },
}

/// Worker 配置
#[derive(Debug, Clone)]
pub struct AutoplayWorkerConfig {
    /// 最大并发补歌数
    pub max_concurrent: usize,
    /// 空闲会话清理间隔，None 表示关闭
    pub idle_sweep_interval: Option<Duration>,
    /// 会话空闲多久后被清理（秒）
    pub session_idle_secs: u64,
}

impl Default for AutoplayWorkerConfig {
    fn default() -> Self {
        Self {
            max_concurrent: 4,
            idle_sweep_interval: None,
            session_idle_secs: 3600,
        }
    }
}

impl From<&WorkerConfig> for AutoplayWorkerConfig {
    fn from(config: &WorkerConfig) -> Self {
        Self {
            max_concurrent: config.max_concurrent.max(1),
            idle_sweep_interval: (config.idle_sweep_secs > 0)
                .then(|| Duration::from_secs(config.idle_sweep_secs)),
            session_idle_secs: config.session_idle_secs,
        }
    }
}

/// Worker 依赖的用例处理器
#[derive(Clone)]
pub struct AutoplayHandlers {
    pub recommend: Arc<RecommendNextHandler>,
    pub record_started: Arc<RecordTrackStartedHandler>,
    pub set_autoplay: Arc<SetAutoplayHandler>,
    pub end_session: Arc<EndSessionHandler>,
}

impl AutoplayHandlers {
    pub fn new(
        registry: Arc<dyn SessionRegistryPort>,
        event_publisher: Arc<EventPublisher>,
        recommend: Arc<RecommendNextHandler>,
    ) -> Self {
        Self {
            recommend,
            record_started: Arc::new(RecordTrackStartedHandler::new(registry.clone())),
            set_autoplay: Arc::new(SetAutoplayHandler::new(
                registry.clone(),
                event_publisher.clone(),
            )),
            end_session: Arc::new(EndSessionHandler::new(registry, event_publisher)),
        }
    }
}

/// 自动播放 Worker
pub struct AutoplayWorker {
    config: AutoplayWorkerConfig,
    event_receiver: mpsc::Receiver<PlaybackEvent>,
    handlers: AutoplayHandlers,
    registry: Arc<dyn SessionRegistryPort>,
    event_publisher: Arc<EventPublisher>,
    semaphore: Arc<Semaphore>,
}

impl AutoplayWorker {
    pub fn new(
        config: AutoplayWorkerConfig,
        event_receiver: mpsc::Receiver<PlaybackEvent>,
        handlers: AutoplayHandlers,
        registry: Arc<dyn SessionRegistryPort>,
        event_publisher: Arc<EventPublisher>,
    ) -> Self {
        let semaphore = Arc::new(Semaphore::new(config.max_concurrent.max(1)));
        Self {
            config,
            event_receiver,
            handlers,
            registry,
            event_publisher,
            semaphore,
        }
    }

    /// 按配置的缓冲容量创建播放事件通道
    pub fn channel(config: &WorkerConfig) -> (mpsc::Sender<PlaybackEvent>, mpsc::Receiver<PlaybackEvent>) {
        mpsc::channel(config.event_buffer.max(1))
    }

    /// 启动 Worker，事件通道关闭后返回
    pub async fn run(mut self) {
        tracing::info!(
            max_concurrent = self.config.max_concurrent,
            idle_sweep = ?self.config.idle_sweep_interval,
            "AutoplayWorker started"
        );

        let mut sweep = self.config.idle_sweep_interval.map(|period| {
            let mut interval = tokio::time::interval(period);
            interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            interval
        });

        loop {
            let event = match sweep.as_mut() {
                Some(interval) => tokio::select! {
                    event = self.event_receiver.recv() => event,
                    _ = interval.tick() => {
                        self.sweep_idle_sessions().await;
                        continue;
                    }
                },
                None => self.event_receiver.recv().await,
            };

            match event {
                Some(event) => self.dispatch(event).await,
                None => break,
            }
        }

        tracing::info!("AutoplayWorker stopped");
    }

    async fn dispatch(&self, event: PlaybackEvent) {
        match event {
            PlaybackEvent::TrackStarted { session_id, track } => {
                let cmd = RecordTrackStartedCommand {
                    session_id: session_id.clone(),
                    track,
                };
                if let Err(e) = self.handlers.record_started.handle(cmd).await {
                    tracing::warn!(session_id = %session_id, error = %e, "Failed to record started track");
                }
            }
            PlaybackEvent::TrackEnded { session_id } | PlaybackEvent::QueueDrained { session_id } => {
                self.spawn_fill(session_id);
            }
            PlaybackEvent::AutoplayToggled {
                session_id,
                enabled,
            } => {
                let cmd = SetAutoplayCommand {
                    session_id: session_id.clone(),
                    enabled,
                };
                match self.handlers.set_autoplay.handle(cmd).await {
                    Ok(resp) if resp.should_fill => self.spawn_fill(session_id),
                    Ok(_) => {}
                    Err(e) => {
                        tracing::warn!(session_id = %session_id, error = %e, "Failed to toggle autoplay");
                    }
                }
            }
            PlaybackEvent::SessionEnded { session_id, reason } => {
                self.end_session(session_id, reason).await;
            }
        }
    }

    /// 在后台补一首；并发数受信号量限制
    fn spawn_fill(&self, session_id: String) {
        let semaphore = self.semaphore.clone();
        let recommend = self.handlers.recommend.clone();
        let registry = self.registry.clone();
        let event_publisher = self.event_publisher.clone();

        tokio::spawn(async move {
            let Ok(_permit) = semaphore.acquire_owned().await else {
                tracing::error!("Failed to acquire semaphore permit");
                return;
            };
            Self::fill_queue(&session_id, recommend, registry, event_publisher).await;
        });
    }

    /// 队列为空且自动播放开启时推荐并入队
    async fn fill_queue(
        session_id: &str,
        recommend: Arc<RecommendNextHandler>,
        registry: Arc<dyn SessionRegistryPort>,
        event_publisher: Arc<EventPublisher>,
    ) {
        let session = match registry.get(session_id) {
            Ok(session) => session,
            Err(_) => {
                tracing::debug!(session_id = %session_id, "Session gone, skipping fill");
                return;
            }
        };

        // 队列检查、推荐与入队在同一把门锁下完成
        let Some(gate) = session.try_begin_recommendation() else {
            tracing::debug!(session_id = %session_id, "Fill already in flight, coalesced");
            return;
        };

        if session.queue().pending_count() > 0 {
            tracing::debug!(session_id = %session_id, "Queue not empty, skipping fill");
            return;
        }

        match recommend.recommend_gated(&session, &gate).await {
            RecommendOutcome::Selected(track) => {
                if session.is_closed() {
                    tracing::debug!(session_id = %session_id, "Session closed, recommended track dropped");
                    return;
                }
                // 只入队一次
                session.queue().enqueue(track.clone());
                event_publisher.publish_track_recommended(session_id, &track);
            }
            outcome @ (RecommendOutcome::NoSeed | RecommendOutcome::Exhausted { .. }) => {
                event_publisher.publish_no_recommendation(session_id, outcome.as_str());
            }
            outcome => {
                tracing::debug!(session_id = %session_id, outcome = outcome.as_str(), "Fill skipped");
            }
        }
    }

    async fn end_session(&self, session_id: String, reason: EndReason) {
        let cmd = EndSessionCommand {
            session_id: session_id.clone(),
            reason,
        };
        if let Err(e) = self.handlers.end_session.handle(cmd).await {
            tracing::debug!(session_id = %session_id, error = %e, "End session ignored");
        }
    }

    async fn sweep_idle_sessions(&self) {
        let idle = self.registry.get_idle_sessions(self.config.session_idle_secs);
        if idle.is_empty() {
            return;
        }

        tracing::info!(count = idle.len(), "Ending idle sessions");
        for session_id in idle {
            self.end_session(session_id, EndReason::IdleTimeout).await;
        }
    }
}
