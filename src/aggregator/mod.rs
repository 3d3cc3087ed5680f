//! Incremental Aggregator
//!
//! Accumulates a target number of records by requesting sequential pages,
//! and knows when there is nothing left to request.
//!
//! ## Architecture
//!
//! - **AggregationSession**: cursor, target and accumulator of one cycle
//! - **Aggregator**: runs a session against an [`EntitySource`](crate::client::EntitySource)
//! - **TokenSource / SessionToken**: supersession of stale cycles
//! - **SearchDebouncer**: quiet-interval scheduling for search input
//!
//! ## State machine
//!
//! `Idle → Loading → {Satisfied, Exhausted, Failed}`. Exhausted is latched
//! until the view starts a new session; a "show more" on a satisfied session
//! raises its target and resumes from the cursor.

mod debounce;
mod error;
mod probe;
mod session;
mod token;

pub use debounce::{SearchDebouncer, DEFAULT_QUIET_INTERVAL};
pub use error::AggregationError;
pub use probe::{Aggregator, AggregatorConfig, RunOutcome};
pub use session::{AggregationSession, SessionState};
pub use token::{SessionToken, TokenSource};
