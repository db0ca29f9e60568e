use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::error::WeaveError;
use crate::models::ChapterDocument;

/// Read access to chapter documents.
///
/// The corpus outline (tomes and chapter metadata) is supplied by the host;
/// this trait only resolves chapter bodies. A missing id is an error so
/// aggregation failures stay visible instead of silently skewing totals.
#[async_trait]
pub trait ChapterStore: Send + Sync {
    async fn chapter(&self, id: &str) -> Result<ChapterDocument, WeaveError>;
}

/// Chapter store backed by a map, for tests and single-process hosts.
pub struct InMemoryChapterStore {
    chapters: RwLock<HashMap<String, ChapterDocument>>,
}

impl InMemoryChapterStore {
    pub fn new() -> Self {
        Self {
            chapters: RwLock::new(HashMap::new()),
        }
    }

    /// Builder-style insert for test setup.
    pub fn with_chapter(mut self, chapter: ChapterDocument) -> Self {
        self.chapters
            .get_mut()
            .insert(chapter.id.clone(), chapter);
        self
    }

    pub async fn insert(&self, chapter: ChapterDocument) {
        self.chapters
            .write()
            .await
            .insert(chapter.id.clone(), chapter);
    }

    pub async fn remove(&self, id: &str) -> Option<ChapterDocument> {
        self.chapters.write().await.remove(id)
    }
}

impl Default for InMemoryChapterStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ChapterStore for InMemoryChapterStore {
    async fn chapter(&self, id: &str) -> Result<ChapterDocument, WeaveError> {
        self.chapters
            .read()
            .await
            .get(id)
            .cloned()
            .ok_or_else(|| WeaveError::NotFound {
                entity_type: "chapter".to_string(),
                id: id.to_string(),
            })
    }
}
