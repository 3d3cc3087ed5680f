//! Append-only identity cache for one collection
//!
//! Records are never evicted or replaced. A merge only appends records whose
//! identity is not already present, and lookups scan in insertion order.

use crate::records::{EntityRecord, IdentityField, IDENTITY_FIELDS};

/// Ordered, append-only list of records for a single collection
#[derive(Debug, Clone, Default)]
pub struct IdentityCache {
    records: Vec<EntityRecord>,
}

impl IdentityCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append every record that does not match an existing one.
    ///
    /// Matching uses the `id` → `_id` → `slug` probe only; records without any
    /// identity field are always appended. Returns how many were added.
    pub fn merge<I>(&mut self, records: I) -> usize
    where
        I: IntoIterator<Item = EntityRecord>,
    {
        let mut added = 0;
        for record in records {
            if self.contains_entity(&record) {
                continue;
            }
            self.records.push(record);
            added += 1;
        }
        added
    }

    /// First record whose identity fields or position match `id`
    pub fn find_by_id(&self, id: &str) -> Option<&EntityRecord> {
        self.find_match(id).map(|(_, record)| record)
    }

    /// Like [`find_by_id`](Self::find_by_id) but also reports which field matched
    pub fn find_match(&self, id: &str) -> Option<(IdentityField, &EntityRecord)> {
        self.records
            .iter()
            .enumerate()
            .find_map(|(index, record)| match_kind(record, index, id).map(|kind| (kind, record)))
    }

    pub fn contains_entity(&self, record: &EntityRecord) -> bool {
        self.records
            .iter()
            .any(|existing| existing.same_entity(record).is_some())
    }

    pub fn records(&self) -> &[EntityRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// How `record` at `index` matches a looked-up id, in probe priority order
fn match_kind(record: &EntityRecord, index: usize, id: &str) -> Option<IdentityField> {
    IDENTITY_FIELDS
        .iter()
        .copied()
        .find(|&field| record.identity_value(field).as_deref() == Some(id))
        .or_else(|| (index.to_string() == id).then_some(IdentityField::Index))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(value: serde_json::Value) -> EntityRecord {
        EntityRecord::from_value(value)
    }

    fn sample() -> Vec<EntityRecord> {
        vec![
            record(json!({"id": 1, "name": "Naruto"})),
            record(json!({"_id": "abc", "name": "Sasuke"})),
            record(json!({"slug": "sakura", "name": "Sakura"})),
        ]
    }

    #[test]
    fn test_merge_is_idempotent() {
        let mut cache = IdentityCache::new();
        assert_eq!(cache.merge(sample()), 3);
        assert_eq!(cache.merge(sample()), 0);
        assert_eq!(cache.len(), 3);
    }

    #[test]
    fn test_merge_deduplicates_across_sources() {
        let mut cache = IdentityCache::new();
        cache.merge(sample());

        // same entity as returned by a by-id endpoint, with more fields
        let detailed = record(json!({"id": "1", "name": "Naruto", "rank": "Hokage"}));
        assert_eq!(cache.merge(vec![detailed]), 0);
        assert_eq!(cache.find_by_id("1").and_then(|r| r.str_field("rank")), None);

        let new = record(json!({"id": 4, "name": "Kakashi"}));
        assert_eq!(cache.merge(vec![new]), 1);
        assert_eq!(cache.len(), 4);
    }

    #[test]
    fn test_records_without_identity_always_append() {
        let mut cache = IdentityCache::new();
        let anonymous = record(json!({"name": "Unknown"}));
        cache.merge(vec![anonymous.clone()]);
        cache.merge(vec![anonymous]);
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn test_find_by_each_identity_field() {
        let mut cache = IdentityCache::new();
        cache.merge(sample());

        let (kind, found) = cache.find_match("1").unwrap();
        assert_eq!(kind, IdentityField::Id);
        assert_eq!(found.display_name(), Some("Naruto"));

        let (kind, found) = cache.find_match("abc").unwrap();
        assert_eq!(kind, IdentityField::UnderscoreId);
        assert_eq!(found.display_name(), Some("Sasuke"));

        let (kind, found) = cache.find_match("sakura").unwrap();
        assert_eq!(kind, IdentityField::Slug);
        assert_eq!(found.display_name(), Some("Sakura"));

        assert!(cache.find_by_id("missing").is_none());
    }

    #[test]
    fn test_find_priority_within_record() {
        let mut cache = IdentityCache::new();
        cache.merge(vec![record(json!({"id": "x", "_id": "x", "slug": "x"}))]);
        assert_eq!(cache.find_match("x").map(|(k, _)| k), Some(IdentityField::Id));

        let mut cache = IdentityCache::new();
        cache.merge(vec![record(json!({"_id": "y", "slug": "y"}))]);
        assert_eq!(
            cache.find_match("y").map(|(k, _)| k),
            Some(IdentityField::UnderscoreId)
        );
    }

    #[test]
    fn test_positional_fallback() {
        let mut cache = IdentityCache::new();
        cache.merge(vec![
            record(json!({"name": "first"})),
            record(json!({"name": "second"})),
        ]);

        let (kind, found) = cache.find_match("1").unwrap();
        assert_eq!(kind, IdentityField::Index);
        assert_eq!(found.display_name(), Some("second"));
    }

    #[test]
    fn test_empty_cache() {
        let cache = IdentityCache::new();
        assert!(cache.is_empty());
        assert!(cache.find_by_id("0").is_none());
    }
}
