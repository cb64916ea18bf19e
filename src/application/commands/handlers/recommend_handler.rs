//! RecommendNext Handler - 自动播放推荐编排
//!
//! 流程: 读会话状态 -> 生成搜索词 -> 并发搜索 -> 过滤 -> 评分选择 -> 写入历史
//!
//! - 单条查询失败或超时只视为该查询无结果
//! - 候选为空时提升扩展级别重试，最多 max_escalation + 1 轮
//! - 同一会话同一时刻只允许一个推荐计算，后来的触发直接合并
//! - 会话在计算中被销毁时丢弃结果，不写入历史

use std::collections::HashSet;
use std::sync::Arc;

use futures_util::future::join_all;

use crate::application::commands::{RecommendNextCommand, RecommendOutcome};
use crate::application::ports::{
    CatalogClientPort, RecommendationGuard, SearchOptions, SessionHandle, SessionRegistryPort,
};
use crate::domain::autoplay::{build_queries, select_best, AutoplaySettings, EscalationLevel, JitterSource};
use crate::domain::session::PlayedHistory;
use crate::domain::track::{NearDuplicateFilter, Requester, Track};

/// 候选过滤条件：种子自身、近似重复、已排队、已播放
struct CandidateFilter<'a> {
    near_duplicate: NearDuplicateFilter,
    history: &'a PlayedHistory,
    queued: HashSet<String>,
}

impl CandidateFilter<'_> {
    fn is_eligible(&self, candidate: &Track) -> bool {
        !self.near_duplicate.matches(candidate)
            && !self.queued.contains(candidate.uri())
            && !self.history.contains(candidate.uri())
    }
}

/// RecommendNext Handler
pub struct RecommendNextHandler {
    registry: Arc<dyn SessionRegistryPort>,
    catalog: Arc<dyn CatalogClientPort>,
    jitter: Arc<dyn JitterSource>,
    settings: AutoplaySettings,
}

impl RecommendNextHandler {
    pub fn new(
        registry: Arc<dyn SessionRegistryPort>,
        catalog: Arc<dyn CatalogClientPort>,
        jitter: Arc<dyn JitterSource>,
        settings: AutoplaySettings,
    ) -> Self {
        Self {
            registry,
            catalog,
            jitter,
            settings,
        }
    }

    /// 推荐下一首，只区分 "有" 和 "没有"
    pub async fn recommend_next(&self, session_id: &str) -> Option<Track> {
        self.handle(RecommendNextCommand::new(session_id))
            .await
            .into_track()
    }

    pub async fn handle(&self, cmd: RecommendNextCommand) -> RecommendOutcome {
        let session = match self.registry.get(&cmd.session_id) {
            Ok(session) => session,
            Err(_) => {
                tracing::debug!(session_id = %cmd.session_id, "Recommendation for unknown session");
                return RecommendOutcome::UnknownSession;
            }
        };

        // 门锁一直持有到本函数返回
        let Some(gate) = session.try_begin_recommendation() else {
            tracing::debug!(session_id = %cmd.session_id, "Recommendation already in flight, coalesced");
            return RecommendOutcome::InFlight;
        };

        self.recommend_gated(&session, &gate).await
    }

    /// 在调用方已持有的门锁内推荐
    ///
    /// 调用方可在同一把门锁下完成推荐前后的检查与入队
    pub async fn recommend_gated(
        &self,
        session: &SessionHandle,
        _gate: &RecommendationGuard<'_>,
    ) -> RecommendOutcome {
        let session_id = session.id();
        let state = session.snapshot();
        if !state.autoplay_enabled() {
            return RecommendOutcome::Disabled;
        }

        let seed = match state
            .last_track()
            .cloned()
            .or_else(|| session.queue().previous_track())
        {
            Some(seed) => seed,
            None => {
                tracing::debug!(session_id = %session_id, "No seed track available");
                return RecommendOutcome::NoSeed;
            }
        };

        let filter = CandidateFilter {
            near_duplicate: NearDuplicateFilter::new(&seed, self.settings.similarity_threshold),
            history: state.played_history(),
            queued: session.queue().currently_queued_uris(),
        };

        let search = self.search_with_escalation(session_id, &seed, &filter);
        let (eligible, attempts) = tokio::select! {
            biased;
            _ = session.cancelled() => {
                tracing::debug!(session_id = %session_id, "Session closed during recommendation");
                return RecommendOutcome::Cancelled;
            }
            result = search => result,
        };

        let Some(best) = select_best(
            &seed,
            eligible,
            self.settings.duration_window_ms,
            self.jitter.as_ref(),
        ) else {
            tracing::info!(
                session_id = %session_id,
                seed = %seed.uri(),
                attempts = attempts,
                "No recommendation available"
            );
            return RecommendOutcome::Exhausted { attempts };
        };

        let mut track = best.track;
        track.assign_requester(Requester::System);

        if !session.commit_recommendation(track.uri()) {
            tracing::debug!(session_id = %session_id, "Session closed before commit, result dropped");
            return RecommendOutcome::Cancelled;
        }

        tracing::info!(
            session_id = %session_id,
            seed = %seed.uri(),
            uri = %track.uri(),
            title = %track.title(),
            score = best.score.total(),
            attempts = attempts,
            "Track recommended"
        );

        RecommendOutcome::Selected(track)
    }

    /// 逐级搜索直到有可用候选；返回候选与已进行的轮数
    async fn search_with_escalation(
        &self,
        session_id: &str,
        seed: &Track,
        filter: &CandidateFilter<'_>,
    ) -> (Vec<Track>, u32) {
        let mut level = EscalationLevel::INITIAL;
        let mut attempts = 0u32;

        loop {
            attempts += 1;
            let queries = build_queries(seed, level);
            let pool = self.search_round(&queries).await;
            let pool_size = pool.len();
            let eligible: Vec<Track> = pool.into_iter().filter(|t| filter.is_eligible(t)).collect();

            tracing::debug!(
                session_id = %session_id,
                level = %level,
                queries = queries.len(),
                pool = pool_size,
                eligible = eligible.len(),
                "Search round completed"
            );

            if !eligible.is_empty() || level.value() >= self.settings.max_escalation {
                return (eligible, attempts);
            }
            level = level.next();
        }
    }

    /// 并发执行一轮查询，合并结果并按 uri 去重
    async fn search_round(&self, queries: &[String]) -> Vec<Track> {
        let options = SearchOptions {
            source_filter: self.settings.source_filter.clone(),
            limit: self.settings.search_limit,
        };

        let results = join_all(queries.iter().map(|q| self.search_isolated(q, &options))).await;

        let mut seen = HashSet::new();
        results
            .into_iter()
            .flatten()
            .filter(|t| t.has_uri() && seen.insert(t.uri().to_string()))
            .collect()
    }

    /// 单条查询：错误与超时都降级为空结果
    async fn search_isolated(&self, query: &str, options: &SearchOptions) -> Vec<Track> {
        match tokio::time::timeout(self.settings.query_timeout, self.catalog.search(query, options)).await {
            Ok(Ok(tracks)) => tracks,
            Ok(Err(e)) => {
                tracing::warn!(query = %query, error = %e, "Catalog query failed");
                Vec::new()
            }
            Err(_) => {
                tracing::warn!(
                    query = %query,
                    timeout_ms = self.settings.query_timeout.as_millis() as u64,
                    "Catalog query timed out"
                );
                Vec::new()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{Duration, Instant};

    use crate::application::ports::SessionQueuePort;
    use crate::infrastructure::adapters::{FakeCatalogClient, FixedJitter};
    use crate::infrastructure::memory::{InMemorySessionQueue, InMemorySessionRegistry};

    struct Fixture {
        registry: Arc<InMemorySessionRegistry>,
        catalog: Arc<FakeCatalogClient>,
        queue: Arc<InMemorySessionQueue>,
        session: Arc<SessionHandle>,
        handler: Arc<RecommendNextHandler>,
    }

    fn seed() -> Track {
        Track::new("a", "Song (Live)")
            .with_author("X, Y")
            .with_length_ms(200_000)
    }

    fn fixture(catalog: FakeCatalogClient, settings: AutoplaySettings) -> Fixture {
        let registry = Arc::new(InMemorySessionRegistry::new(settings.history_capacity));
        let catalog = Arc::new(catalog);
        let queue = Arc::new(InMemorySessionQueue::new());
        let session = registry.start("g1", queue.clone()).unwrap();
        let handler = Arc::new(RecommendNextHandler::new(
            registry.clone(),
            catalog.clone(),
            Arc::new(FixedJitter(0.5)),
            settings,
        ));
        Fixture {
            registry,
            catalog,
            queue,
            session,
            handler,
        }
    }

    fn enabled_fixture(catalog: FakeCatalogClient) -> Fixture {
        let f = fixture(catalog, AutoplaySettings::default());
        f.session.set_autoplay(Some(true)).unwrap();
        f.session.record_track_started(seed()).unwrap();
        f
    }

    #[tokio::test]
    async fn test_disabled_makes_no_catalog_calls() {
        let f = fixture(
            FakeCatalogClient::new().with_fallback(vec![Track::new("b", "B")]),
            AutoplaySettings::default(),
        );
        f.session.record_track_started(seed()).unwrap();

        let outcome = f.handler.handle(RecommendNextCommand::new("g1")).await;
        assert_eq!(outcome, RecommendOutcome::Disabled);
        assert!(f.catalog.calls().is_empty());
    }

    #[tokio::test]
    async fn test_unknown_session() {
        let f = enabled_fixture(FakeCatalogClient::new());
        let outcome = f.handler.handle(RecommendNextCommand::new("missing")).await;
        assert_eq!(outcome, RecommendOutcome::UnknownSession);
        assert!(f.handler.recommend_next("missing").await.is_none());
    }

    #[tokio::test]
    async fn test_scenario_a_excludes_seed_and_prefers_related() {
        let b = Track::new("b", "Other").with_author("X").with_length_ms(205_000);
        let c = Track::new("c", "Far").with_author("Z").with_length_ms(500_000);
        let f = enabled_fixture(
            FakeCatalogClient::new().with_fallback(vec![seed(), b, c]),
        );

        let track = f.handler.recommend_next("g1").await.unwrap();
        assert_eq!(track.uri(), "b");
        assert_eq!(track.requester(), Some(&Requester::System));
        assert!(f.session.snapshot().played_history().contains("b"));
    }

    #[tokio::test]
    async fn test_never_returns_queued_or_played() {
        let f = enabled_fixture(FakeCatalogClient::new().with_fallback(vec![
            Track::new("queued", "Queued").with_author("X"),
            Track::new("played", "Played").with_author("X"),
            Track::new("fresh", "Fresh").with_author("Z"),
        ]));
        f.queue.enqueue(Track::new("queued", "Queued"));
        f.session.record_track_started(Track::new("played", "Played")).unwrap();
        f.session.record_track_started(seed()).unwrap();

        let track = f.handler.recommend_next("g1").await.unwrap();
        assert_eq!(track.uri(), "fresh");
    }

    #[tokio::test]
    async fn test_near_duplicate_under_new_uri_is_excluded() {
        let remaster = Track::new("a2", "Song (Remastered)").with_author("X");
        let other = Track::new("d", "Different Tune").with_author("Q");
        let f = enabled_fixture(FakeCatalogClient::new().with_fallback(vec![remaster, other]));

        let track = f.handler.recommend_next("g1").await.unwrap();
        assert_eq!(track.uri(), "d");
    }

    #[tokio::test]
    async fn test_scenario_b_exhausts_after_four_attempts() {
        let f = enabled_fixture(FakeCatalogClient::new());

        let outcome = f.handler.handle(RecommendNextCommand::new("g1")).await;
        assert_eq!(outcome, RecommendOutcome::Exhausted { attempts: 4 });
        assert_eq!(f.catalog.call_count("top hits"), 4);
        assert!(f.session.snapshot().played_history().len() == 1);
    }

    #[tokio::test]
    async fn test_escalation_reaches_broader_queries() {
        let f = enabled_fixture(
            FakeCatalogClient::new()
                .with_fallback(vec![seed()])
                .with_response("popular trending tracks", vec![Track::new("t", "Trend")]),
        );

        let track = f.handler.recommend_next("g1").await.unwrap();
        assert_eq!(track.uri(), "t");
        assert_eq!(f.catalog.call_count("top hits"), 2);
        assert_eq!(f.catalog.call_count("recommended popular tracks"), 0);
    }

    #[tokio::test]
    async fn test_failed_query_is_isolated() {
        let f = enabled_fixture(
            FakeCatalogClient::new()
                .with_failure("artist:X")
                .with_response("top hits", vec![Track::new("h", "Hit")]),
        );

        let track = f.handler.recommend_next("g1").await.unwrap();
        assert_eq!(track.uri(), "h");
        assert_eq!(f.catalog.call_count("artist:X"), 1);
    }

    #[tokio::test]
    async fn test_every_query_failing_exhausts_all_levels() {
        let f = enabled_fixture(FakeCatalogClient::new().with_failure_for_all());

        let outcome = f.handler.handle(RecommendNextCommand::new("g1")).await;
        assert_eq!(outcome, RecommendOutcome::Exhausted { attempts: 4 });
        // 4 + 5 + 6 + 6 条查询
        assert_eq!(f.catalog.calls().len(), 21);
        assert_eq!(f.session.snapshot().played_history().len(), 1);
    }

    #[tokio::test]
    async fn test_failed_level_escalates_to_trending() {
        let f = enabled_fixture(
            FakeCatalogClient::new()
                .with_failure("similar to X Song")
                .with_failure("artist:X")
                .with_failure("tracks like Song")
                .with_failure("top hits")
                .with_response("popular trending tracks", vec![Track::new("t", "Trend")]),
        );

        let outcome = f.handler.handle(RecommendNextCommand::new("g1")).await;
        assert!(outcome.is_selected());
        assert_eq!(outcome.into_track().map(|t| t.uri().to_string()), Some("t".to_string()));
        assert_eq!(f.catalog.call_count("top hits"), 2);
        assert_eq!(f.catalog.call_count("recommended popular tracks"), 0);
    }

    #[tokio::test]
    async fn test_slow_query_times_out_without_aborting() {
        let settings = AutoplaySettings {
            query_timeout: Duration::from_millis(50),
            ..AutoplaySettings::default()
        };
        let f = fixture(
            FakeCatalogClient::new()
                .with_delay_for("top hits", Duration::from_secs(5))
                .with_response("artist:X", vec![Track::new("b", "B").with_author("X")]),
            settings,
        );
        f.session.set_autoplay(Some(true)).unwrap();
        f.session.record_track_started(seed()).unwrap();

        let started = Instant::now();
        let track = f.handler.recommend_next("g1").await.unwrap();
        assert_eq!(track.uri(), "b");
        assert!(started.elapsed() < Duration::from_secs(2));
    }

    #[tokio::test]
    async fn test_scenario_c_history_stays_capped() {
        let f = fixture(
            FakeCatalogClient::new().with_fallback(vec![Track::new("new", "Fresh")]),
            AutoplaySettings::default(),
        );
        f.session.set_autoplay(Some(true)).unwrap();
        for i in 0..100 {
            f.session
                .record_track_started(Track::new(format!("h{}", i), format!("Hist {}", i)))
                .unwrap();
        }
        assert_eq!(f.session.snapshot().played_history().len(), 100);

        let track = f.handler.recommend_next("g1").await.unwrap();
        assert_eq!(track.uri(), "new");

        let state = f.session.snapshot();
        assert_eq!(state.played_history().len(), 100);
        assert!(!state.played_history().contains("h0"));
        assert!(state.played_history().contains("h1"));
        assert!(state.played_history().contains("new"));
    }

    #[tokio::test]
    async fn test_concurrent_trigger_is_coalesced() {
        let f = enabled_fixture(
            FakeCatalogClient::new()
                .with_fallback(vec![Track::new("b", "B")])
                .with_delay(Duration::from_millis(50)),
        );

        let (first, second) = tokio::join!(
            f.handler.handle(RecommendNextCommand::new("g1")),
            f.handler.handle(RecommendNextCommand::new("g1")),
        );

        assert!(first.is_selected());
        assert_eq!(second, RecommendOutcome::InFlight);
        let state = f.session.snapshot();
        assert_eq!(state.played_history().iter().filter(|u| *u == "b").count(), 1);
    }

    #[tokio::test]
    async fn test_session_end_cancels_in_flight_recommendation() {
        let f = enabled_fixture(
            FakeCatalogClient::new()
                .with_fallback(vec![Track::new("b", "B")])
                .with_delay(Duration::from_millis(500)),
        );

        let handler = f.handler.clone();
        let task = tokio::spawn(async move { handler.handle(RecommendNextCommand::new("g1")).await });

        tokio::time::sleep(Duration::from_millis(20)).await;
        f.registry.end("g1").unwrap();

        let outcome = task.await.unwrap();
        assert_eq!(outcome, RecommendOutcome::Cancelled);
        let state = f.session.snapshot();
        assert!(state.played_history().is_empty());
        assert!(state.last_track().is_none());
    }

    #[tokio::test]
    async fn test_no_seed_and_previous_track_fallback() {
        let f = fixture(
            FakeCatalogClient::new().with_fallback(vec![Track::new("b", "B")]),
            AutoplaySettings::default(),
        );
        f.session.set_autoplay(Some(true)).unwrap();

        let outcome = f.handler.handle(RecommendNextCommand::new("g1")).await;
        assert_eq!(outcome, RecommendOutcome::NoSeed);
        assert!(f.catalog.calls().is_empty());

        // 队列中播放过的上一首可作为种子
        f.queue.enqueue(Track::new("p", "Prev Song"));
        f.queue.enqueue(Track::new("q", "Now Song"));
        f.queue.advance();
        f.queue.advance();
        f.queue.advance();
        assert!(f.queue.previous_track().is_some());

        let track = f.handler.recommend_next("g1").await.unwrap();
        assert_eq!(track.uri(), "b");
        assert_eq!(f.catalog.call_count("tracks like Now Song"), 1);
    }
}
