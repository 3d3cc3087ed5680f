//! Observable view state

use crate::records::EntityRecord;
use chrono::{DateTime, Utc};
use serde::Serialize;

/// Everything a list UI renders, published on every change
#[derive(Debug, Clone, Default, Serialize)]
pub struct ViewState {
    pub collection: String,
    pub title: String,
    pub description: String,
    /// Records accumulated by the committed session, in page order
    pub items: Vec<EntityRecord>,
    /// Current search input (may be ahead of `items` while debouncing)
    pub search: String,
    pub loading: bool,
    pub error: Option<String>,
    pub has_more: bool,
    pub pages_loaded: u32,
    /// When the last session was committed
    pub loaded_at: Option<DateTime<Utc>>,
}

impl ViewState {
    /// Items passing the client-side name/alias filter for the current search
    pub fn visible(&self) -> Vec<&EntityRecord> {
        self.items
            .iter()
            .filter(|record| record.matches_search(&self.search))
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_visible_applies_search() {
        let state = ViewState {
            items: vec![
                EntityRecord::new().with("name", "Gaara"),
                EntityRecord::new().with("name", "Temari"),
                EntityRecord::new().with("name", "Kankuro").with("alias", "Puppet Master"),
            ],
            search: "puppet".to_string(),
            ..Default::default()
        };

        let names: Vec<_> = state
            .visible()
            .into_iter()
            .filter_map(EntityRecord::display_name)
            .collect();
        assert_eq!(names, vec!["Kankuro"]);

        let state = ViewState {
            search: String::new(),
            ..state
        };
        assert_eq!(state.visible().len(), 3);
    }
}
