//! Views
//!
//! What UI layers observe and drive:
//!
//! - [`CollectionView`]: paginated, searchable list state for one collection
//! - [`DetailLoader`]: single-entity lookups with a cache fast path
//! - [`catalogue`]: titles and descriptions of the known collections

pub mod catalogue;
mod collection;
mod detail;
mod state;

pub use catalogue::{CollectionMeta, MEMBER_COLLECTION};
pub use collection::CollectionView;
pub use detail::{DetailLoader, DetailView};
pub use state::ViewState;
