//! Detail lookups
//!
//! Cache first, network second. A record found in the shared cache is
//! returned without a request; otherwise the by-id endpoint is consulted and
//! the result merged back into the cache.

use super::catalogue::{self, MEMBER_COLLECTION};
use crate::cache::CacheRegistry;
use crate::client::EntitySource;
use crate::records::EntityRecord;
use serde::Serialize;
use std::sync::Arc;

/// Result of a detail lookup
#[derive(Debug, Clone, Default, Serialize)]
pub struct DetailView {
    pub collection: String,
    pub id: String,
    pub record: Option<EntityRecord>,
    /// Member characters of a clan, team, village, ...
    pub members: Vec<EntityRecord>,
    pub from_cache: bool,
    pub error: Option<String>,
}

impl DetailView {
    pub fn is_found(&self) -> bool {
        self.record.is_some()
    }
}

/// Resolves single entities for detail pages
pub struct DetailLoader {
    source: Arc<dyn EntitySource>,
    cache: CacheRegistry,
}

impl DetailLoader {
    pub fn new(source: Arc<dyn EntitySource>, cache: CacheRegistry) -> Self {
        Self { source, cache }
    }

    /// Look up one entity, preferring the cache
    pub async fn load(&self, collection: &str, id: &str) -> DetailView {
        let mut view = DetailView {
            collection: collection.to_string(),
            id: id.to_string(),
            ..Default::default()
        };

        let id = id.trim();
        if collection.trim().is_empty() || id.is_empty() {
            view.error = Some(format!("Missing {} id", singular(collection)));
            return view;
        }

        if let Some(record) = self.cache.find_by_id(collection, id).await {
            tracing::debug!(collection, id, "Detail served from cache");
            view.record = Some(record);
            view.from_cache = true;
            return view;
        }

        if let Some(value) = self.source.fetch_by_id(collection, id).await {
            let record = EntityRecord::from_value(value);
            self.cache.merge(collection, vec![record.clone()]).await;
            view.record = Some(record);
        } else {
            tracing::debug!(collection, id, "Detail not found");
        }

        view
    }

    /// Look up one entity and resolve its member characters, if the
    /// collection lists any
    pub async fn load_with_members(&self, collection: &str, id: &str) -> DetailView {
        let mut view = self.load(collection, id).await;

        let field = catalogue::lookup(collection).members_field;
        let ids = match (view.record.as_ref(), field) {
            (Some(record), Some(field)) => record.id_list(field),
            _ => Vec::new(),
        };
        if ids.is_empty() {
            return view;
        }

        let members: Vec<EntityRecord> = self
            .source
            .fetch_by_ids(MEMBER_COLLECTION, &ids)
            .await
            .into_iter()
            .map(EntityRecord::from_value)
            .collect();

        tracing::debug!(
            collection,
            id,
            requested = ids.len(),
            resolved = members.len(),
            "Resolved members"
        );

        self.cache
            .merge(MEMBER_COLLECTION, members.iter().cloned())
            .await;
        view.members = members;
        view
    }
}

/// "villages" → "village", for messages only
fn singular(collection: &str) -> &str {
    let collection = collection.trim();
    if collection.is_empty() {
        "entity"
    } else {
        collection.strip_suffix('s').unwrap_or(collection)
    }
}
