use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::models::entity::EntityKind;

/// Optional entity link attached to an annotation. Denormalized copy of
/// the entity's identity and display name, like a mention's payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnnotationEntityRef {
    pub entity_type: EntityKind,
    pub entity_id: String,
    pub label: String,
}

/// Side-table payload for one annotation id: the free-text note plus an
/// optional entity link. The inline span carries only the id.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnnotationEntry {
    #[serde(default)]
    pub note: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entity: Option<AnnotationEntityRef>,
}

/// An annotation as handed to callers: side-table entry plus its id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Annotation {
    pub id: String,
    #[serde(default)]
    pub note: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entity: Option<AnnotationEntityRef>,
}

impl Annotation {
    pub fn from_entry(id: impl Into<String>, entry: AnnotationEntry) -> Self {
        Self {
            id: id.into(),
            note: entry.note,
            entity: entry.entity,
        }
    }
}

/// The annotation side table for one chapter, keyed by annotation id.
///
/// Serializes to the `annotations` JSON field stored alongside the chapter,
/// so a host can persist it with the document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AnnotationTable(HashMap<String, AnnotationEntry>);

impl AnnotationTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, id: &str) -> Option<&AnnotationEntry> {
        self.0.get(id)
    }

    pub fn insert(&mut self, id: impl Into<String>, entry: AnnotationEntry) {
        self.0.insert(id.into(), entry);
    }

    pub fn remove(&mut self, id: &str) -> Option<AnnotationEntry> {
        self.0.remove(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.0.contains_key(id)
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<(String, AnnotationEntry)> for AnnotationTable {
    fn from_iter<I: IntoIterator<Item = (String, AnnotationEntry)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}
