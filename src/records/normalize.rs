//! Response envelope normalization
//!
//! The API has no schema contract for list responses. A body may be a bare
//! array or an object wrapping the array under some field; this probes the
//! known envelopes in a fixed order so every consumer sees the same list.

use super::EntityRecord;
use serde_json::Value;

/// Envelope fields checked before falling back to "first array field"
pub const ENVELOPE_FIELDS: [&str; 3] = ["data", "results", "items"];

/// Extract the ordered entity list from a raw response body.
///
/// 1. a bare array is returned as-is
/// 2. an object's `data`, `results` or `items` array, in that order
/// 3. an object's first array-valued field in document order
/// 4. otherwise nothing
pub fn normalize(raw: &Value) -> Vec<EntityRecord> {
    extract(raw)
        .map(|values| values.iter().cloned().map(EntityRecord::from_value).collect())
        .unwrap_or_default()
}

/// Owned variant that avoids cloning the list elements
pub fn normalize_owned(raw: Value) -> Vec<EntityRecord> {
    let values = match raw {
        Value::Array(values) => values,
        Value::Object(mut map) => {
            let field = ENVELOPE_FIELDS
                .iter()
                .find(|f| matches!(map.get(**f), Some(Value::Array(_))))
                .map(|f| f.to_string())
                .or_else(|| {
                    map.iter()
                        .find(|(_, v)| v.is_array())
                        .map(|(k, _)| k.clone())
                });

            match field.and_then(|f| map.remove(&f)) {
                Some(Value::Array(values)) => values,
                _ => Vec::new(),
            }
        }
        _ => Vec::new(),
    };

    values.into_iter().map(EntityRecord::from_value).collect()
}

fn extract(raw: &Value) -> Option<&Vec<Value>> {
    match raw {
        Value::Array(values) => Some(values),
        Value::Object(map) => ENVELOPE_FIELDS
            .iter()
            .find_map(|f| map.get(*f).and_then(Value::as_array))
            .or_else(|| map.values().find_map(Value::as_array)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn names(records: &[EntityRecord]) -> Vec<String> {
        records
            .iter()
            .map(|r| r.str_field("name").unwrap_or_default())
            .collect()
    }

    #[test]
    fn test_supported_shapes() {
        let cases = vec![
            (json!([{"name": "a"}, {"name": "b"}]), vec!["a", "b"]),
            (json!({"data": [{"name": "a"}]}), vec!["a"]),
            (json!({"results": [{"name": "b"}]}), vec!["b"]),
            (json!({"items": [{"name": "c"}]}), vec!["c"]),
            (json!({"total": 1, "characters": [{"name": "d"}]}), vec!["d"]),
            (json!({}), vec![]),
        ];

        for (raw, expected) in cases {
            assert_eq!(names(&normalize(&raw)), expected, "shape {}", raw);
            assert_eq!(names(&normalize_owned(raw.clone())), expected, "owned shape {}", raw);
        }
    }

    #[test]
    fn test_envelope_priority() {
        // `items` wins over an earlier unrelated array; `data` wins over `items`
        let raw = json!({"tags": [{"name": "x"}], "items": [{"name": "i"}], "data": [{"name": "d"}]});
        assert_eq!(names(&normalize(&raw)), vec!["d"]);

        let raw = json!({"tags": [{"name": "x"}], "items": [{"name": "i"}]});
        assert_eq!(names(&normalize(&raw)), vec!["i"]);
    }

    #[test]
    fn test_first_array_in_document_order() {
        let raw = json!({"count": 2, "zeta": [{"name": "z"}], "alpha": [{"name": "a"}]});
        assert_eq!(names(&normalize(&raw)), vec!["z"]);
    }

    #[test]
    fn test_non_array_envelope_field_is_skipped() {
        let raw = json!({"data": {"name": "single"}, "list": [{"name": "l"}]});
        assert_eq!(names(&normalize(&raw)), vec!["l"]);
    }

    #[test]
    fn test_scalars_yield_nothing() {
        assert!(normalize(&json!(null)).is_empty());
        assert!(normalize(&json!("characters")).is_empty());
        assert!(normalize(&json!(42)).is_empty());
    }
}
