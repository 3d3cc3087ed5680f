//! Fetch Client
//!
//! Read-only access to the entity REST API.
//!
//! ## Endpoints
//!
//! - `GET {base}/{collection}?page&limit&name`: one page of a collection
//! - `GET {base}/{collection}/{id}`: a single entity
//! - `GET {base}/{collection}`: the unpaginated collection
//!
//! ## Failure policy
//!
//! Every failure (transport, status, timeout, undecodable body) is logged and
//! replaced by an empty value: `[]` for lists, `None` for single lookups. UI
//! layers only ever need to handle "the list is empty".

mod http;
mod error;

pub use http::{ApiClient, ClientConfig, DEFAULT_API_URL};
pub use error::{FetchError, FetchResult};

use async_trait::async_trait;
use futures_util::future::join_all;
use serde_json::Value;

/// Anything that can serve pages and single entities of a collection
#[async_trait]
pub trait EntitySource: Send + Sync {
    /// Fetch one page of `collection`. Never fails; an unusable response is `[]`.
    async fn fetch_page(
        &self,
        collection: &str,
        page: u32,
        limit: u32,
        name_filter: Option<&str>,
    ) -> Value;

    /// Fetch a single entity, `None` when missing or on any failure
    async fn fetch_by_id(&self, collection: &str, id: &str) -> Option<Value>;

    /// Fetch several entities concurrently.
    ///
    /// Each id is an independent lookup; failed or null lookups are dropped
    /// and the survivors keep the input order.
    async fn fetch_by_ids(&self, collection: &str, ids: &[String]) -> Vec<Value> {
        if ids.is_empty() {
            return Vec::new();
        }

        let lookups = ids.iter().map(|id| self.fetch_by_id(collection, id));
        let found: Vec<Value> = join_all(lookups)
            .await
            .into_iter()
            .flatten()
            .filter(|value| !value.is_null())
            .collect();

        tracing::debug!(
            collection,
            requested = ids.len(),
            found = found.len(),
            "Batch lookup complete"
        );
        found
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::time::Duration;

    /// Resolves ids in reverse order of their position and fails id "2"
    struct SlowLookups;

    #[async_trait]
    impl EntitySource for SlowLookups {
        async fn fetch_page(&self, _: &str, _: u32, _: u32, _: Option<&str>) -> Value {
            json!([])
        }

        async fn fetch_by_id(&self, _collection: &str, id: &str) -> Option<Value> {
            let n: u64 = id.parse().ok()?;
            tokio::time::sleep(Duration::from_millis(40 - n * 10)).await;
            match n {
                2 => None,
                _ => Some(json!({"id": n})),
            }
        }
    }

    #[tokio::test]
    async fn test_fetch_by_ids_drops_failures_and_keeps_order() {
        let ids = vec!["1".to_string(), "2".to_string(), "3".to_string()];
        let found = SlowLookups.fetch_by_ids("characters", &ids).await;
        assert_eq!(found, vec![json!({"id": 1}), json!({"id": 3})]);
    }

    #[tokio::test]
    async fn test_fetch_by_ids_empty() {
        assert!(SlowLookups.fetch_by_ids("characters", &[]).await.is_empty());
    }

    #[tokio::test]
    async fn test_fetch_by_ids_drops_null_bodies() {
        struct NullSource;

        #[async_trait]
        impl EntitySource for NullSource {
            async fn fetch_page(&self, _: &str, _: u32, _: u32, _: Option<&str>) -> Value {
                json!([])
            }

            async fn fetch_by_id(&self, _: &str, id: &str) -> Option<Value> {
                Some(if id == "a" { json!({"id": "a"}) } else { Value::Null })
            }
        }

        let ids = vec!["a".to_string(), "b".to_string()];
        assert_eq!(NullSource.fetch_by_ids("clans", &ids).await, vec![json!({"id": "a"})]);
    }
}
