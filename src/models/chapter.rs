use serde::{Deserialize, Serialize};

use crate::models::annotation::AnnotationTable;

/// A chapter as fetched from the document backend.
///
/// The markup is rich-text HTML owned by the editing surface; this crate
/// parses it on demand and never holds it long-term. The annotation side
/// table rides along as a JSON field on the chapter row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChapterDocument {
    pub id: String,
    pub title: String,
    /// Ordering within the tome. Drafts may not have one yet.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<u32>,
    #[serde(default)]
    pub markup: String,
    #[serde(default, skip_serializing_if = "AnnotationTable::is_empty")]
    pub annotations: AnnotationTable,
}

impl ChapterDocument {
    pub fn new(id: impl Into<String>, title: impl Into<String>, markup: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            position: None,
            markup: markup.into(),
            annotations: AnnotationTable::new(),
        }
    }

    pub fn with_position(mut self, position: u32) -> Self {
        self.position = Some(position);
        self
    }
}

/// Outline-level chapter metadata, known before the chapter body is fetched.
/// Position comes from here even when the fetched document carries one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChapterMeta {
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<u32>,
}

impl ChapterMeta {
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            position: None,
        }
    }

    pub fn with_position(mut self, position: u32) -> Self {
        self.position = Some(position);
        self
    }
}

/// One tome's slice of a corpus outline: its display name and the chapters
/// it contains, in outline order. Supplied by the host; this crate never
/// walks the collection hierarchy itself.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TomeOutline {
    pub tome_id: String,
    pub tome_name: String,
    pub chapters: Vec<ChapterMeta>,
}

impl TomeOutline {
    pub fn new(tome_id: impl Into<String>, tome_name: impl Into<String>) -> Self {
        Self {
            tome_id: tome_id.into(),
            tome_name: tome_name.into(),
            chapters: Vec::new(),
        }
    }

    pub fn with_chapter(mut self, meta: ChapterMeta) -> Self {
        self.chapters.push(meta);
        self
    }
}
