//! Test data builders for chapters, outlines, and lore fixtures.
//!
//! Provides fluent construction of markup-bearing documents with sensible
//! defaults.

use wordweave::markup::encode_mention;
use wordweave::models::{
    ChapterDocument, ChapterMeta, CharacterRecord, EntityKind, EntityMention, PlaceRecord,
    TomeOutline,
};

/// Collection every fixture record belongs to unless overridden.
pub const TEST_COLLECTION: &str = "col-1";

/// Inline mention span for embedding in test markup.
pub fn mention_span(kind: EntityKind, id: &str, label: &str) -> String {
    encode_mention(&EntityMention::new(kind, id, label))
}

/// A character record in the default test collection.
pub fn character(id: &str, first: &str, last: &str) -> CharacterRecord {
    CharacterRecord {
        id: id.to_string(),
        collection_id: TEST_COLLECTION.to_string(),
        firstname: first.to_string(),
        lastname: last.to_string(),
    }
}

/// A place record in the default test collection.
pub fn place(id: &str, name: &str) -> PlaceRecord {
    PlaceRecord {
        id: id.to_string(),
        collection_id: TEST_COLLECTION.to_string(),
        name: name.to_string(),
        location: None,
    }
}

/// Builder for chapter documents assembled from paragraphs.
pub struct ChapterBuilder {
    id: String,
    title: String,
    position: Option<u32>,
    paragraphs: Vec<String>,
}

impl ChapterBuilder {
    /// Create a new chapter builder with the given id and title.
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            position: None,
            paragraphs: Vec::new(),
        }
    }

    /// Set the ordering position.
    pub fn position(mut self, position: u32) -> Self {
        self.position = Some(position);
        self
    }

    /// Append one paragraph of inner markup, wrapped in `<p>` on build.
    pub fn paragraph(mut self, inner: impl Into<String>) -> Self {
        self.paragraphs.push(inner.into());
        self
    }

    /// Build the ChapterDocument.
    pub fn build(self) -> ChapterDocument {
        let markup = self
            .paragraphs
            .iter()
            .map(|p| format!("<p>{}</p>", p))
            .collect::<String>();
        let mut doc = ChapterDocument::new(self.id, self.title, markup);
        doc.position = self.position;
        doc
    }
}

/// Builder for tome outlines.
pub struct OutlineBuilder {
    tome_id: String,
    tome_name: String,
    chapters: Vec<ChapterMeta>,
}

impl OutlineBuilder {
    /// Create a new outline builder with the given tome id and name.
    pub fn new(tome_id: impl Into<String>, tome_name: impl Into<String>) -> Self {
        Self {
            tome_id: tome_id.into(),
            tome_name: tome_name.into(),
            chapters: Vec::new(),
        }
    }

    /// Add a chapter reference with its outline position.
    pub fn chapter(
        mut self,
        id: impl Into<String>,
        title: impl Into<String>,
        position: u32,
    ) -> Self {
        self.chapters
            .push(ChapterMeta::new(id, title).with_position(position));
        self
    }

    /// Build the TomeOutline.
    pub fn build(self) -> TomeOutline {
        let mut outline = TomeOutline::new(self.tome_id, self.tome_name);
        for meta in self.chapters {
            outline = outline.with_chapter(meta);
        }
        outline
    }
}
