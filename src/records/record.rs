//! Open-schema entity records
//!
//! A record is whatever JSON object the API hands back for one entity.
//! Nothing is enforced about its shape; accessors return `Option` and the
//! identity helpers encode the `id` → `_id` → `slug` probe order used by
//! the cache.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// Field name used when a list element is not a JSON object
pub const SCALAR_FIELD: &str = "value";

/// Fields probed, in order, when deriving a record's identity
pub const IDENTITY_FIELDS: [IdentityField; 3] =
    [IdentityField::Id, IdentityField::UnderscoreId, IdentityField::Slug];

/// Which part of a record produced an identity match
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IdentityField {
    Id,
    UnderscoreId,
    Slug,
    /// Positional fallback; only used by lookups, never by merges
    Index,
}

impl IdentityField {
    /// JSON field name, `None` for the positional fallback
    pub fn field_name(&self) -> Option<&'static str> {
        match self {
            IdentityField::Id => Some("id"),
            IdentityField::UnderscoreId => Some("_id"),
            IdentityField::Slug => Some("slug"),
            IdentityField::Index => None,
        }
    }
}

impl fmt::Display for IdentityField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.field_name().unwrap_or("index"))
    }
}

/// One entity (character, clan, village, ...) with an open set of fields
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityRecord(Map<String, Value>);

impl EntityRecord {
    /// Create an empty record
    pub fn new() -> Self {
        Self(Map::new())
    }

    /// Wrap a JSON value; non-objects are stored under [`SCALAR_FIELD`]
    pub fn from_value(value: Value) -> Self {
        match value {
            Value::Object(map) => Self(map),
            other => {
                let mut map = Map::new();
                map.insert(SCALAR_FIELD.to_string(), other);
                Self(map)
            }
        }
    }

    /// Builder-style field setter
    pub fn with(mut self, field: &str, value: impl Into<Value>) -> Self {
        self.0.insert(field.to_string(), value.into());
        self
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.0.get(field)
    }

    /// Field rendered as a string (strings verbatim, numbers and bools via
    /// their JSON text). Nulls, arrays and objects yield `None`.
    pub fn str_field(&self, field: &str) -> Option<String> {
        match self.0.get(field)? {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            Value::Bool(b) => Some(b.to_string()),
            _ => None,
        }
    }

    /// Identity value for one probe field, if present and truthy
    pub fn identity_value(&self, field: IdentityField) -> Option<String> {
        let value = self.0.get(field.field_name()?)?;
        if is_truthy(value) {
            Some(render_key(value))
        } else {
            None
        }
    }

    /// First truthy identity field in probe order
    pub fn identity(&self) -> Option<(IdentityField, String)> {
        IDENTITY_FIELDS
            .iter()
            .find_map(|&field| self.identity_value(field).map(|value| (field, value)))
    }

    /// Whether two records describe the same entity.
    ///
    /// Each probe field is compared independently and only when both sides
    /// carry a truthy value, so a matching `slug` is enough even if `id`s
    /// differ.
    pub fn same_entity(&self, other: &EntityRecord) -> Option<IdentityField> {
        IDENTITY_FIELDS.iter().copied().find(|&field| {
            match (self.identity_value(field), other.identity_value(field)) {
                (Some(a), Some(b)) => a == b,
                _ => false,
            }
        })
    }

    /// `name`, falling back to `title`
    pub fn display_name(&self) -> Option<&str> {
        self.first_str(&["name", "title"])
    }

    /// `alias`, falling back to `nickname`
    pub fn alias(&self) -> Option<&str> {
        self.first_str(&["alias", "nickname"])
    }

    /// Ids listed under an array-valued field (e.g. a clan's `characters`)
    pub fn id_list(&self, field: &str) -> Vec<String> {
        match self.0.get(field) {
            Some(Value::Array(values)) => values
                .iter()
                .filter(|v| !v.is_null())
                .map(|v| match v {
                    Value::Object(map) => {
                        let nested = EntityRecord(map.clone());
                        nested.identity().map(|(_, id)| id).unwrap_or_default()
                    }
                    other => render_key(other),
                })
                .filter(|id| !id.is_empty())
                .collect(),
            _ => Vec::new(),
        }
    }

    /// Case-insensitive client-side search over name/title and alias/nickname.
    /// A blank term matches everything.
    pub fn matches_search(&self, term: &str) -> bool {
        let needle = term.trim().to_lowercase();
        if needle.is_empty() {
            return true;
        }

        let name = self.display_name().unwrap_or_default().to_lowercase();
        let alias = self.alias().unwrap_or_default().to_lowercase();
        name.contains(&needle) || alias.contains(&needle)
    }

    pub fn fields(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    pub fn into_value(self) -> Value {
        Value::Object(self.0)
    }

    // Strings only, and an empty string counts as absent.
    fn first_str(&self, fields: &[&str]) -> Option<&str> {
        fields
            .iter()
            .filter_map(|f| self.0.get(*f).and_then(Value::as_str))
            .find(|s| !s.is_empty())
    }
}

impl From<Map<String, Value>> for EntityRecord {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

impl From<Value> for EntityRecord {
    fn from(value: Value) -> Self {
        Self::from_value(value)
    }
}

/// Loose truthiness: null, `false`, `0` and `""` are absent
fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map(|f| f != 0.0).unwrap_or(true),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// Render an identity value so that `7` and `"7"` compare equal
pub(crate) fn render_key(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
