//! Aggregation error types

use thiserror::Error;

/// Defects in the aggregation loop itself.
///
/// Individual fetch failures are not errors here; they already arrive as
/// empty pages.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AggregationError {
    /// Page size of zero can never make progress
    #[error("Invalid page size: must be greater than zero")]
    InvalidPageSize,

    /// Page cursor ran past `u32::MAX`
    #[error("Page cursor overflow after page {0}")]
    CursorOverflow(u32),

    /// The page source panicked while serving a request
    #[error("Page source panicked while fetching page {page} of {collection}")]
    SourcePanicked { collection: String, page: u32 },
}
