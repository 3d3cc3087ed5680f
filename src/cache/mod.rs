//! Identity Cache
//!
//! In-memory, unbounded, append-only record storage used to answer
//! "find by id" without a network round trip.
//!
//! - **IdentityCache**: one collection, merge-if-absent plus lookup
//! - **CacheRegistry**: async-shared map of collection → cache

mod identity;
mod registry;

pub use identity::IdentityCache;
pub use registry::CacheRegistry;
