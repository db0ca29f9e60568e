use serde::{Deserialize, Serialize};

/// Lore entity kinds that chapter text can reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    Character,
    Place,
    Item,
    Event,
}

impl EntityKind {
    /// Attribute value carried in mention markup (`data-entity-type`).
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityKind::Character => "character",
            EntityKind::Place => "place",
            EntityKind::Item => "item",
            EntityKind::Event => "event",
        }
    }

    /// Get all entity kinds.
    pub fn all() -> Vec<EntityKind> {
        vec![
            EntityKind::Character,
            EntityKind::Place,
            EntityKind::Item,
            EntityKind::Event,
        ]
    }

    /// Parse a markup attribute value. `None` for anything unrecognized.
    pub fn parse(value: &str) -> Option<EntityKind> {
        match value {
            "character" => Some(EntityKind::Character),
            "place" => Some(EntityKind::Place),
            "item" => Some(EntityKind::Item),
            "event" => Some(EntityKind::Event),
            _ => None,
        }
    }
}

impl std::fmt::Display for EntityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
