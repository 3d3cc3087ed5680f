//! Aggregation sessions
//!
//! A session is one load cycle's worth of state: which collection and search
//! term it serves, the page cursor, the target count and everything
//! accumulated so far. A reset never mutates a session; it builds a new one.

use super::token::SessionToken;
use crate::records::EntityRecord;
use uuid::Uuid;

/// Lifecycle of one aggregation cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionState {
    /// Created, nothing requested yet
    #[default]
    Idle,
    /// Probing pages toward the target
    Loading,
    /// Target reached with full pages; more data may exist
    Satisfied,
    /// A page came back empty or short, or the probe cap was hit; latched
    Exhausted,
    /// The loop itself broke; accumulator and cursor were reset
    Failed,
}

impl SessionState {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            SessionState::Satisfied | SessionState::Exhausted | SessionState::Failed
        )
    }
}

/// One aggregation cycle for a collection and optional search term
#[derive(Debug, Clone)]
pub struct AggregationSession {
    id: Uuid,
    token: SessionToken,
    collection: String,
    name_filter: Option<String>,
    next_page: u32,
    target: usize,
    records: Vec<EntityRecord>,
    state: SessionState,
    pages_fetched: u32,
    error: Option<String>,
}

impl AggregationSession {
    /// Fresh session starting at page 1
    pub fn new(
        token: SessionToken,
        collection: impl Into<String>,
        name_filter: Option<String>,
        target: usize,
    ) -> Self {
        let name_filter = name_filter
            .map(|term| term.trim().to_string())
            .filter(|term| !term.is_empty());

        Self {
            id: Uuid::new_v4(),
            token,
            collection: collection.into(),
            name_filter,
            next_page: 1,
            target,
            records: Vec::new(),
            state: SessionState::Idle,
            pages_fetched: 0,
            error: None,
        }
    }

    /// Raise the target for a "show more" and mark the session loading.
    ///
    /// Returns `false` (and changes nothing) when the session is exhausted or
    /// already loading.
    pub fn extend(&mut self, increment: usize) -> bool {
        match self.state {
            SessionState::Exhausted | SessionState::Loading => false,
            _ => {
                self.target = self.target.saturating_add(increment);
                self.state = SessionState::Loading;
                true
            }
        }
    }

    /// Drop everything accumulated and rewind the cursor
    pub(crate) fn fail(&mut self, message: String) {
        self.records.clear();
        self.next_page = 1;
        self.pages_fetched = 0;
        self.state = SessionState::Failed;
        self.error = Some(message);
    }

    pub(crate) fn begin(&mut self) {
        self.state = SessionState::Loading;
        self.error = None;
    }

    pub(crate) fn finish(&mut self, state: SessionState) {
        self.state = state;
    }

    /// Append one page and advance the cursor past it
    pub(crate) fn push_page(&mut self, next_page: u32, records: Vec<EntityRecord>) {
        self.next_page = next_page;
        self.pages_fetched += 1;
        self.records.extend(records);
    }

    /// `true` until the session is exhausted or failed
    pub fn has_more(&self) -> bool {
        !matches!(self.state, SessionState::Exhausted | SessionState::Failed)
    }

    pub fn is_satisfied(&self) -> bool {
        self.records.len() >= self.target
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn token(&self) -> &SessionToken {
        &self.token
    }

    pub fn collection(&self) -> &str {
        &self.collection
    }

    pub fn name_filter(&self) -> Option<&str> {
        self.name_filter.as_deref()
    }

    pub fn next_page(&self) -> u32 {
        self.next_page
    }

    pub fn target(&self) -> usize {
        self.target
    }

    pub fn records(&self) -> &[EntityRecord] {
        &self.records
    }

    pub fn into_records(self) -> Vec<EntityRecord> {
        self.records
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn pages_fetched(&self) -> u32 {
        self.pages_fetched
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }
}
