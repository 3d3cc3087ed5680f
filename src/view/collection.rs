//! Paginated collection view
//!
//! Owns the committed aggregation session for one collection and publishes a
//! [`ViewState`] through a `watch` channel. UI layers drive it with `load`,
//! `search` and `show_more`.
//!
//! Every cycle holds a [`SessionToken`]. A search issues a new token the
//! moment it is typed, so any cycle already in flight becomes stale and its
//! results are dropped when they arrive. Only the session whose token is
//! still current may replace the committed one.

use super::catalogue::{self, CollectionMeta};
use super::state::ViewState;
use crate::aggregator::{
    AggregationSession, Aggregator, AggregatorConfig, RunOutcome, SearchDebouncer, SessionToken,
    TokenSource,
};
use crate::cache::CacheRegistry;
use crate::client::EntitySource;
use chrono::Utc;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tokio::sync::watch;

/// List view over one collection
pub struct CollectionView {
    meta: CollectionMeta,
    aggregator: Aggregator,
    cache: CacheRegistry,
    tokens: TokenSource,
    debouncer: SearchDebouncer,
    session: Mutex<AggregationSession>,
    state_tx: watch::Sender<ViewState>,
}

impl CollectionView {
    /// Create a view; nothing is fetched until [`load`](Self::load)
    pub fn new(
        source: Arc<dyn EntitySource>,
        cache: CacheRegistry,
        collection: &str,
        config: AggregatorConfig,
        search_debounce: Duration,
    ) -> Arc<Self> {
        let meta = catalogue::lookup(collection);
        let tokens = TokenSource::new();
        let session = AggregationSession::new(
            tokens.issue(),
            meta.key.clone(),
            None,
            config.initial_target,
        );

        let (state_tx, _) = watch::channel(ViewState {
            collection: meta.key.clone(),
            title: meta.title.clone(),
            description: meta.description.clone(),
            has_more: true,
            ..Default::default()
        });

        Arc::new(Self {
            meta,
            aggregator: Aggregator::new(source, config),
            cache,
            tokens,
            debouncer: SearchDebouncer::new(search_debounce),
            session: Mutex::new(session),
            state_tx,
        })
    }

    pub fn meta(&self) -> &CollectionMeta {
        &self.meta
    }

    /// Receiver that observes every published state
    pub fn subscribe(&self) -> watch::Receiver<ViewState> {
        self.state_tx.subscribe()
    }

    /// Snapshot of the current state
    pub fn state(&self) -> ViewState {
        self.state_tx.borrow().clone()
    }

    /// Start a fresh cycle for the current search term, immediately
    pub async fn load(&self) {
        self.debouncer.cancel();
        let token = self.tokens.issue();
        let term = self.state_tx.borrow().search.clone();
        self.run_fresh(token, term).await;
    }

    /// Record a new search term and schedule a fresh cycle after the quiet
    /// interval. Any cycle still running for an older term is superseded now.
    pub fn search(self: &Arc<Self>, term: &str) {
        let term = term.to_string();
        let token = self.tokens.issue();
        self.publish(|state| state.search = term.clone());

        tracing::debug!(collection = %self.meta.key, term = %term, "Search scheduled");
        let view = Arc::clone(self);
        self.debouncer.schedule(async move {
            view.run_fresh(token, term).await;
        });
    }

    /// Search without debouncing
    pub async fn search_now(&self, term: &str) {
        self.publish(|state| state.search = term.to_string());
        self.load().await;
    }

    /// Wait for a pending debounced search to finish
    pub async fn settle(&self) {
        self.debouncer.settle().await;
    }

    /// Raise the target by the configured increment and keep loading from
    /// the cursor. No-op while loading, after exhaustion, or while a newer
    /// search is pending.
    pub async fn show_more(&self) {
        let increment = self.aggregator.config().show_more_increment;
        let mut session = {
            let mut slot = self.lock_session();
            if !slot.token().is_current() {
                tracing::debug!(collection = %self.meta.key, "Show more ignored, search pending");
                return;
            }
            if !slot.extend(increment) {
                tracing::debug!(
                    collection = %self.meta.key,
                    state = ?slot.state(),
                    "Show more ignored"
                );
                return;
            }
            slot.clone()
        };

        self.publish(|state| {
            state.loading = true;
            state.error = None;
        });
        let outcome = self.aggregator.run(&mut session).await;
        self.commit(session, outcome).await;
    }

    async fn run_fresh(&self, token: SessionToken, term: String) {
        let mut session = AggregationSession::new(
            token,
            self.meta.key.clone(),
            Some(term),
            self.aggregator.config().initial_target,
        );
        session.begin();

        {
            let mut slot = self.lock_session();
            // A newer cycle may already own the slot
            if !session.token().is_current() || slot.token().value() > session.token().value() {
                return;
            }
            *slot = session.clone();
        }

        self.publish(|state| {
            state.items.clear();
            state.loading = true;
            state.error = None;
            state.has_more = true;
            state.pages_loaded = 0;
        });

        let outcome = self.aggregator.run(&mut session).await;
        self.commit(session, outcome).await;
    }

    /// Replace the committed session if `session` is still the current one
    async fn commit(&self, session: AggregationSession, outcome: RunOutcome) {
        if outcome == RunOutcome::Superseded {
            return;
        }

        {
            let mut slot = self.lock_session();
            if slot.token() != session.token() || !session.token().is_current() {
                tracing::debug!(
                    collection = %self.meta.key,
                    session = %session.id(),
                    "Discarding results of stale session"
                );
                return;
            }
            *slot = session.clone();
        }

        self.cache
            .merge(&self.meta.key, session.records().iter().cloned())
            .await;

        tracing::info!(
            collection = %self.meta.key,
            records = session.records().len(),
            pages = session.pages_fetched(),
            has_more = session.has_more(),
            "Collection view updated"
        );

        self.publish(|state| {
            state.items = session.records().to_vec();
            state.loading = false;
            state.error = session.error().map(String::from);
            state.has_more = session.has_more();
            state.pages_loaded = session.pages_fetched();
            state.loaded_at = Some(Utc::now());
        });
    }

    fn publish(&self, update: impl FnOnce(&mut ViewState)) {
        self.state_tx.send_modify(update);
    }

    fn lock_session(&self) -> MutexGuard<'_, AggregationSession> {
        // Sessions are replaced wholesale, so a poisoned slot is still consistent
        self.session
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
