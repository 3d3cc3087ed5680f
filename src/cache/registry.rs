//! Shared per-collection caches
//!
//! One registry lives as long as the service handle. List views merge every
//! committed page into it and detail lookups consult it before touching the
//! network.

use super::IdentityCache;
use crate::records::EntityRecord;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Collection name → identity cache, safe to clone and share
#[derive(Debug, Clone, Default)]
pub struct CacheRegistry {
    caches: Arc<RwLock<HashMap<String, IdentityCache>>>,
}

impl CacheRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Merge records into a collection's cache, creating it on first use
    pub async fn merge<I>(&self, collection: &str, records: I) -> usize
    where
        I: IntoIterator<Item = EntityRecord>,
    {
        let mut caches = self.caches.write().await;
        let added = caches
            .entry(collection.to_string())
            .or_default()
            .merge(records);

        if added > 0 {
            tracing::debug!(collection, added, "Merged records into cache");
        }
        added
    }

    /// Cached record for `id`, cloned out of the lock
    pub async fn find_by_id(&self, collection: &str, id: &str) -> Option<EntityRecord> {
        let caches = self.caches.read().await;
        caches.get(collection)?.find_by_id(id).cloned()
    }

    /// Copy of everything cached for a collection, in insertion order
    pub async fn snapshot(&self, collection: &str) -> Vec<EntityRecord> {
        let caches = self.caches.read().await;
        caches
            .get(collection)
            .map(|cache| cache.records().to_vec())
            .unwrap_or_default()
    }

    pub async fn len(&self, collection: &str) -> usize {
        let caches = self.caches.read().await;
        caches.get(collection).map(IdentityCache::len).unwrap_or(0)
    }

    /// Names of collections that have been populated
    pub async fn collections(&self) -> Vec<String> {
        let caches = self.caches.read().await;
        let mut names: Vec<String> = caches.keys().cloned().collect();
        names.sort();
        names
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_collections_are_isolated() {
        let registry = CacheRegistry::new();
        let naruto = EntityRecord::from_value(json!({"id": 1, "name": "Naruto"}));
        let konoha = EntityRecord::from_value(json!({"id": 1, "name": "Konohagakure"}));

        assert_eq!(registry.merge("characters", vec![naruto]).await, 1);
        assert_eq!(registry.merge("villages", vec![konoha]).await, 1);

        let found = registry.find_by_id("villages", "1").await.unwrap();
        assert_eq!(found.display_name(), Some("Konohagakure"));
        assert_eq!(registry.len("characters").await, 1);
        assert_eq!(registry.collections().await, vec!["characters", "villages"]);
    }

    #[tokio::test]
    async fn test_unknown_collection() {
        let registry = CacheRegistry::new();
        assert!(registry.find_by_id("clans", "1").await.is_none());
        assert!(registry.snapshot("clans").await.is_empty());
        assert_eq!(registry.len("clans").await, 0);
    }

    #[tokio::test]
    async fn test_clones_share_state() {
        let registry = CacheRegistry::new();
        let view = registry.clone();

        view.merge("teams", vec![EntityRecord::new().with("slug", "team-7")])
            .await;
        assert!(registry.find_by_id("teams", "team-7").await.is_some());
    }
}
