use serde::{Deserialize, Serialize};

use crate::models::entity::EntityKind;

/// One autocomplete candidate returned by a suggestion provider.
///
/// Read-only projection; never persisted by this crate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Suggestion {
    pub id: String,
    pub entity_type: EntityKind,
    pub label: String,
    /// Secondary line shown under the label (a place's location, an item's
    /// category, an event's date range).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
}

impl Suggestion {
    pub fn new(
        entity_type: EntityKind,
        id: impl Into<String>,
        label: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            entity_type,
            label: label.into(),
            hint: None,
        }
    }

    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}
