//! Incremental page probing
//!
//! Requests pages one at a time, strictly in order, because whether to ask
//! for page N+1 depends on what page N contained.

use super::error::AggregationError;
use super::session::{AggregationSession, SessionState};
use crate::client::EntitySource;
use crate::records::normalize_owned;
use futures_util::FutureExt;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

/// Paging parameters for an aggregator
#[derive(Debug, Clone)]
pub struct AggregatorConfig {
    /// Records requested per page
    pub page_size: u32,
    /// Target for a fresh session
    pub initial_target: usize,
    /// Added to the target by each "show more"
    pub show_more_increment: usize,
    /// Pages a single run may request before giving up
    pub max_probe_pages: u32,
}

impl Default for AggregatorConfig {
    fn default() -> Self {
        Self {
            page_size: 12,
            initial_target: 12,
            show_more_increment: 12,
            max_probe_pages: 10,
        }
    }
}

/// How a run ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    /// The session reached a terminal state and may be committed
    Finished(SessionState),
    /// A newer session was issued mid-run; results must be discarded
    Superseded,
}

/// Drives sessions against an entity source
pub struct Aggregator {
    source: Arc<dyn EntitySource>,
    config: AggregatorConfig,
}

impl Aggregator {
    pub fn new(source: Arc<dyn EntitySource>, config: AggregatorConfig) -> Self {
        Self { source, config }
    }

    pub fn config(&self) -> &AggregatorConfig {
        &self.config
    }

    /// Run a session until it is satisfied, exhausted, failed or superseded.
    ///
    /// An exhausted session is returned untouched.
    pub async fn run(&self, session: &mut AggregationSession) -> RunOutcome {
        if session.state() == SessionState::Exhausted {
            return RunOutcome::Finished(SessionState::Exhausted);
        }

        session.begin();
        tracing::debug!(
            session = %session.id(),
            collection = session.collection(),
            from_page = session.next_page(),
            target = session.target(),
            "Aggregation started"
        );

        match self.probe(session).await {
            Ok(Some(state)) => {
                session.finish(state);
                tracing::debug!(
                    session = %session.id(),
                    collection = session.collection(),
                    records = session.records().len(),
                    pages = session.pages_fetched(),
                    state = ?state,
                    "Aggregation finished"
                );
                RunOutcome::Finished(state)
            }
            Ok(None) => {
                tracing::debug!(session = %session.id(), "Aggregation superseded, discarding results");
                RunOutcome::Superseded
            }
            Err(e) => {
                tracing::error!(session = %session.id(), error = %e, "Aggregation failed");
                session.fail(e.to_string());
                RunOutcome::Finished(SessionState::Failed)
            }
        }
    }

    /// `Ok(None)` means the session went stale
    async fn probe(
        &self,
        session: &mut AggregationSession,
    ) -> Result<Option<SessionState>, AggregationError> {
        let page_size = self.config.page_size;
        if page_size == 0 {
            return Err(AggregationError::InvalidPageSize);
        }

        let mut probes = 0;
        while !session.is_satisfied() {
            if probes >= self.config.max_probe_pages {
                tracing::debug!(
                    collection = session.collection(),
                    probes,
                    "Probe limit reached without satisfying target"
                );
                return Ok(Some(SessionState::Exhausted));
            }
            if !session.token().is_current() {
                return Ok(None);
            }

            let page = session.next_page();
            let fetch = self.source.fetch_page(
                session.collection(),
                page,
                page_size,
                session.name_filter(),
            );
            let raw = AssertUnwindSafe(fetch).catch_unwind().await.map_err(|_| {
                AggregationError::SourcePanicked {
                    collection: session.collection().to_string(),
                    page,
                }
            })?;
            probes += 1;

            if !session.token().is_current() {
                return Ok(None);
            }

            let records = normalize_owned(raw);
            let fetched = records.len();
            let next = page
                .checked_add(1)
                .ok_or(AggregationError::CursorOverflow(page))?;
            session.push_page(next, records);

            tracing::trace!(collection = session.collection(), page, fetched, "Page received");

            if fetched < page_size as usize {
                return Ok(Some(SessionState::Exhausted));
            }
        }

        Ok(Some(SessionState::Satisfied))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregator::TokenSource;
    use async_trait::async_trait;
    use serde_json::{json, Value};
    use std::sync::Mutex;

    /// Serves pages with fixed record counts and logs every request
    struct ScriptedPages {
        sizes: Vec<usize>,
        requests: Mutex<Vec<(u32, u32, Option<String>)>>,
    }

    impl ScriptedPages {
        fn new(sizes: &[usize]) -> Arc<Self> {
            Arc::new(Self {
                sizes: sizes.to_vec(),
                requests: Mutex::new(Vec::new()),
            })
        }

        fn pages_requested(&self) -> Vec<u32> {
            self.requests.lock().unwrap().iter().map(|r| r.0).collect()
        }
    }

    #[async_trait]
    impl EntitySource for ScriptedPages {
        async fn fetch_page(
            &self,
            _collection: &str,
            page: u32,
            limit: u32,
            name_filter: Option<&str>,
        ) -> Value {
            self.requests
                .lock()
                .unwrap()
                .push((page, limit, name_filter.map(String::from)));

            let count = self.sizes.get(page as usize - 1).copied().unwrap_or(0);
            let offset = (page as usize - 1) * 100;
            let records: Vec<Value> = (0..count).map(|i| json!({"id": offset + i})).collect();
            json!({ "data": records })
        }

        async fn fetch_by_id(&self, _: &str, _: &str) -> Option<Value> {
            None
        }
    }

    struct PanickingSource;

    #[async_trait]
    impl EntitySource for PanickingSource {
        async fn fetch_page(&self, _: &str, _: u32, _: u32, _: Option<&str>) -> Value {
            panic!("decoder exploded");
        }

        async fn fetch_by_id(&self, _: &str, _: &str) -> Option<Value> {
            None
        }
    }

    fn aggregator(source: Arc<dyn EntitySource>, page_size: u32, max_probe_pages: u32) -> Aggregator {
        Aggregator::new(
            source,
            AggregatorConfig {
                page_size,
                initial_target: 12,
                show_more_increment: 12,
                max_probe_pages,
            },
        )
    }

    #[tokio::test]
    async fn test_stops_on_short_page() {
        let source = ScriptedPages::new(&[5, 5, 3, 5]);
        let agg = aggregator(source.clone(), 5, 10);
        let mut session = AggregationSession::new(TokenSource::new().issue(), "characters", None, 12);

        let outcome = agg.run(&mut session).await;

        assert_eq!(outcome, RunOutcome::Finished(SessionState::Exhausted));
        assert_eq!(session.records().len(), 13);
        assert!(!session.has_more());
        assert_eq!(source.pages_requested(), vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn test_stops_on_empty_page() {
        let source = ScriptedPages::new(&[5, 0]);
        let agg = aggregator(source.clone(), 5, 10);
        let mut session = AggregationSession::new(TokenSource::new().issue(), "characters", None, 12);

        let outcome = agg.run(&mut session).await;

        assert_eq!(outcome, RunOutcome::Finished(SessionState::Exhausted));
        assert_eq!(session.records().len(), 5);
        assert_eq!(source.pages_requested(), vec![1, 2]);
    }

    #[tokio::test]
    async fn test_satisfied_then_show_more_resumes_from_cursor() {
        let source = ScriptedPages::new(&[6, 6, 6, 2]);
        let agg = aggregator(source.clone(), 6, 10);
        let mut session = AggregationSession::new(TokenSource::new().issue(), "clans", None, 12);

        assert_eq!(
            agg.run(&mut session).await,
            RunOutcome::Finished(SessionState::Satisfied)
        );
        assert_eq!(session.records().len(), 12);
        assert!(session.has_more());
        assert_eq!(session.next_page(), 3);

        assert!(session.extend(12));
        assert_eq!(
            agg.run(&mut session).await,
            RunOutcome::Finished(SessionState::Exhausted)
        );
        assert_eq!(session.records().len(), 20);
        assert_eq!(source.pages_requested(), vec![1, 2, 3, 4]);

        // latched: neither extend nor run touches the source again
        assert!(!session.extend(12));
        assert_eq!(
            agg.run(&mut session).await,
            RunOutcome::Finished(SessionState::Exhausted)
        );
        assert_eq!(source.pages_requested().len(), 4);
    }

    #[tokio::test]
    async fn test_probe_cap() {
        let source = ScriptedPages::new(&[2, 2, 2, 2, 2]);
        let agg = aggregator(source.clone(), 2, 3);
        let mut session = AggregationSession::new(TokenSource::new().issue(), "teams", None, 12);

        let outcome = agg.run(&mut session).await;

        assert_eq!(outcome, RunOutcome::Finished(SessionState::Exhausted));
        assert_eq!(session.records().len(), 6);
        assert_eq!(source.pages_requested(), vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn test_name_filter_and_limit_are_forwarded() {
        let source = ScriptedPages::new(&[1]);
        let agg = aggregator(source.clone(), 12, 10);
        let mut session = AggregationSession::new(
            TokenSource::new().issue(),
            "characters",
            Some("itachi".to_string()),
            12,
        );

        agg.run(&mut session).await;

        let requests = source.requests.lock().unwrap().clone();
        assert_eq!(requests, vec![(1, 12, Some("itachi".to_string()))]);
    }

    #[tokio::test]
    async fn test_stale_session_is_not_run() {
        let source = ScriptedPages::new(&[12]);
        let agg = aggregator(source.clone(), 12, 10);
        let tokens = TokenSource::new();
        let mut session = AggregationSession::new(tokens.issue(), "characters", None, 12);
        tokens.issue();

        assert_eq!(agg.run(&mut session).await, RunOutcome::Superseded);
        assert!(source.pages_requested().is_empty());
        assert!(session.records().is_empty());
    }

    #[tokio::test]
    async fn test_invalid_page_size_fails() {
        let source = ScriptedPages::new(&[5]);
        let agg = aggregator(source.clone(), 0, 10);
        let mut session = AggregationSession::new(TokenSource::new().issue(), "characters", None, 12);

        assert_eq!(
            agg.run(&mut session).await,
            RunOutcome::Finished(SessionState::Failed)
        );
        assert!(session.error().is_some());
        assert!(source.pages_requested().is_empty());
    }

    #[tokio::test]
    async fn test_panicking_source_fails_and_resets() {
        let agg = aggregator(Arc::new(PanickingSource), 5, 10);
        let mut session = AggregationSession::new(TokenSource::new().issue(), "akatsuki", None, 12);

        let outcome = agg.run(&mut session).await;

        assert_eq!(outcome, RunOutcome::Finished(SessionState::Failed));
        assert!(session.records().is_empty());
        assert_eq!(session.next_page(), 1);
        assert_eq!(
            session.error(),
            Some("Page source panicked while fetching page 1 of akatsuki")
        );
    }
}
