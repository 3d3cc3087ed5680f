//! Known collections and their display metadata

use serde::Serialize;

/// Display metadata for a collection
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CollectionMeta {
    pub key: String,
    pub title: String,
    pub description: String,
    /// Field listing member character ids, for collections that group characters
    pub members_field: Option<&'static str>,
}

/// Collection that member ids resolve against
pub const MEMBER_COLLECTION: &str = "characters";

// key, title, description, members field
const CATALOGUE: &[(&str, &str, &str, Option<&str>)] = &[
    ("characters", "Characters", "Browse all Naruto characters.", None),
    ("clans", "Clans", "Browse all Naruto clans.", Some("characters")),
    ("villages", "Villages", "Browse all Naruto villages.", Some("characters")),
    ("teams", "Teams", "Browse all Naruto teams.", Some("characters")),
    ("tailed-beasts", "Tailed Beasts", "Browse all tailed beasts.", None),
    ("akatsuki", "Akatsuki", "Browse all Akatsuki members.", Some("characters")),
    ("kekkei-genkai", "Kekkei Genkai", "Browse all Kekkei Genkai.", Some("characters")),
    ("kara", "Kara", "Browse all Kara members.", Some("characters")),
];

/// Metadata for `key`; unknown keys get generic text
pub fn lookup(key: &str) -> CollectionMeta {
    CATALOGUE
        .iter()
        .find(|(k, ..)| *k == key)
        .map(|&(key, title, description, members_field)| CollectionMeta {
            key: key.to_string(),
            title: title.to_string(),
            description: description.to_string(),
            members_field,
        })
        .unwrap_or_else(|| CollectionMeta {
            key: key.to_string(),
            title: "Collection".to_string(),
            description: "Browse all in this collection.".to_string(),
            members_field: None,
        })
}

/// All known collections in display order
pub fn known() -> Vec<CollectionMeta> {
    CATALOGUE.iter().map(|(key, ..)| lookup(key)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_collection() {
        let meta = lookup("tailed-beasts");
        assert_eq!(meta.title, "Tailed Beasts");
        assert_eq!(meta.members_field, None);

        let meta = lookup("clans");
        assert_eq!(meta.members_field, Some("characters"));
        assert_eq!(lookup("kara").members_field, Some("characters"));
    }

    #[test]
    fn test_unknown_collection() {
        let meta = lookup("scrolls");
        assert_eq!(meta.key, "scrolls");
        assert_eq!(meta.title, "Collection");
        assert_eq!(meta.description, "Browse all in this collection.");
    }

    #[test]
    fn test_known_order() {
        let keys: Vec<String> = known().into_iter().map(|m| m.key).collect();
        assert_eq!(keys.first().map(String::as_str), Some("characters"));
        assert_eq!(keys.len(), 8);
    }
}
