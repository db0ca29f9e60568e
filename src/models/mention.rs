use serde::{Deserialize, Serialize};

use crate::models::entity::EntityKind;

/// An inline reference from chapter text to a lore entity.
///
/// The label is a denormalized display copy taken at insertion time; nothing
/// re-syncs it if the entity is later renamed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntityMention {
    pub entity_type: EntityKind,
    pub entity_id: String,
    pub label: String,
}

impl EntityMention {
    pub fn new(
        entity_type: EntityKind,
        entity_id: impl Into<String>,
        label: impl Into<String>,
    ) -> Self {
        Self {
            entity_type,
            entity_id: entity_id.into(),
            label: label.into(),
        }
    }
}

/// Mention frequency for one (entity type, entity id) pair, aggregated over
/// one or more documents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MentionCount {
    pub entity_type: EntityKind,
    pub entity_id: String,
    /// First label encountered in document order for this pair.
    pub label: String,
    pub count: usize,
}
