//! # Dattebayo
//!
//! Client data layer for browsing the Dattebayo entity API: characters,
//! clans, villages, teams, kekkei genkai, tailed beasts, Akatsuki and Kara.
//!
//! ## Modules
//!
//! - [`client`]: HTTP access to the entity API (pages, single records, bulk lookups)
//! - [`records`]: Normalizing arbitrary response shapes into record lists
//! - [`aggregator`]: Incremental page probing until enough records are loaded
//! - [`cache`]: Per-collection identity caches shared between views
//! - [`view`]: List and detail state for UI layers
//! - [`preferences`]: Persisted theme preference
//! - [`config`]: TOML config with environment overrides
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use dattebayo::client::{ApiClient, ClientConfig};
//! use dattebayo::view::CollectionView;
//! use dattebayo::{AggregatorConfig, CacheRegistry};
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = Arc::new(ApiClient::new(ClientConfig::default())?);
//!     let cache = CacheRegistry::new();
//!
//!     let view = CollectionView::new(
//!         client,
//!         cache.clone(),
//!         "clans",
//!         AggregatorConfig::default(),
//!         Duration::from_millis(400),
//!     );
//!
//!     // First page worth of clans
//!     view.load().await;
//!
//!     // Twelve more
//!     view.show_more().await;
//!
//!     for clan in view.state().items {
//!         println!("{}", clan.display_name().unwrap_or("-"));
//!     }
//!
//!     Ok(())
//! }
//! ```

pub mod aggregator;
pub mod cache;
pub mod client;
pub mod config;
pub mod preferences;
pub mod records;
pub mod view;

// Re-export top-level types for convenience
pub use aggregator::{
    AggregationError, AggregationSession, Aggregator, AggregatorConfig, RunOutcome,
    SearchDebouncer, SessionState, SessionToken, TokenSource,
};

pub use cache::{CacheRegistry, IdentityCache};

pub use client::{ApiClient, ClientConfig, EntitySource, FetchError, FetchResult};

pub use records::{normalize, normalize_owned, EntityRecord, IdentityField};

pub use view::{CollectionView, DetailLoader, DetailView, ViewState};

pub use config::Config;
pub use preferences::{PreferenceStore, Theme};
