//! Entity suggestion lookup behind the autocomplete.
//!
//! One query fans out over every entity kind of a collection; each kind
//! contributes up to `limit` rows, the merged list is ordered by label and
//! capped at `limit` again. Matching is a case-insensitive substring test
//! over each kind's name fields.

use async_trait::async_trait;
use tracing::debug;

use crate::error::WeaveError;
use crate::models::lore::{CharacterRecord, EventRecord, ItemRecord, PlaceRecord};
use crate::models::{EntityKind, Suggestion};

/// Hard cap on rows per lookup, whatever the caller asks for.
pub const MAX_SUGGESTIONS: usize = 50;

/// Minimum trimmed query length before a lookup runs.
pub const MIN_QUERY_CHARS: usize = 3;

/// Resolves autocomplete queries to entity suggestions.
#[async_trait]
pub trait SuggestionProvider: Send + Sync {
    /// Suggestions matching `query` within one collection. Queries shorter
    /// than [`MIN_QUERY_CHARS`] after trimming resolve to no rows.
    async fn suggest(
        &self,
        collection_id: &str,
        query: &str,
        limit: usize,
    ) -> Result<Vec<Suggestion>, WeaveError>;
}

/// The lore records of one or more collections, held in memory.
#[derive(Debug, Clone, Default)]
pub struct LoreCatalog {
    pub characters: Vec<CharacterRecord>,
    pub places: Vec<PlaceRecord>,
    pub items: Vec<ItemRecord>,
    pub events: Vec<EventRecord>,
}

impl LoreCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_character(mut self, character: CharacterRecord) -> Self {
        self.characters.push(character);
        self
    }

    pub fn with_place(mut self, place: PlaceRecord) -> Self {
        self.places.push(place);
        self
    }

    pub fn with_item(mut self, item: ItemRecord) -> Self {
        self.items.push(item);
        self
    }

    pub fn with_event(mut self, event: EventRecord) -> Self {
        self.events.push(event);
        self
    }
}

/// [`SuggestionProvider`] over an in-memory [`LoreCatalog`].
pub struct CatalogSuggestionProvider {
    catalog: LoreCatalog,
}

impl CatalogSuggestionProvider {
    pub fn new(catalog: LoreCatalog) -> Self {
        Self { catalog }
    }
}

fn contains_ci(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(needle)
}

fn opt_contains_ci(haystack: &Option<String>, needle: &str) -> bool {
    matches!(haystack, Some(h) if contains_ci(h, needle))
}

#[async_trait]
impl SuggestionProvider for CatalogSuggestionProvider {
    async fn suggest(
        &self,
        collection_id: &str,
        query: &str,
        limit: usize,
    ) -> Result<Vec<Suggestion>, WeaveError> {
        let query = query.trim();
        if query.chars().count() < MIN_QUERY_CHARS {
            return Ok(Vec::new());
        }
        let limit = limit.min(MAX_SUGGESTIONS);
        let needle = query.to_lowercase();

        let mut characters: Vec<&CharacterRecord> = self
            .catalog
            .characters
            .iter()
            .filter(|c| c.collection_id == collection_id)
            .filter(|c| contains_ci(&c.firstname, &needle) || contains_ci(&c.lastname, &needle))
            .collect();
        characters.sort_by_key(|c| (c.lastname.to_lowercase(), c.firstname.to_lowercase()));

        let mut places: Vec<&PlaceRecord> = self
            .catalog
            .places
            .iter()
            .filter(|p| p.collection_id == collection_id)
            .filter(|p| contains_ci(&p.name, &needle) || opt_contains_ci(&p.location, &needle))
            .collect();
        places.sort_by_key(|p| p.name.to_lowercase());

        let mut items: Vec<&ItemRecord> = self
            .catalog
            .items
            .iter()
            .filter(|i| i.collection_id == collection_id)
            .filter(|i| contains_ci(&i.name, &needle) || opt_contains_ci(&i.category, &needle))
            .collect();
        items.sort_by_key(|i| i.name.to_lowercase());

        let mut events: Vec<&EventRecord> = self
            .catalog
            .events
            .iter()
            .filter(|e| e.collection_id == collection_id)
            .filter(|e| contains_ci(&e.name, &needle) || opt_contains_ci(&e.description, &needle))
            .collect();
        // Dated events first in chronological order, undated ones after.
        events.sort_by_key(|e| (e.start_date.is_none(), e.start_date, e.name.to_lowercase()));

        let mut rows: Vec<Suggestion> = Vec::new();
        rows.extend(characters.into_iter().take(limit).map(|c| {
            Suggestion::new(EntityKind::Character, c.id.clone(), c.label())
        }));
        rows.extend(places.into_iter().take(limit).map(|p| {
            let mut s = Suggestion::new(EntityKind::Place, p.id.clone(), p.name.clone());
            if let Some(location) = &p.location {
                s = s.with_hint(location.clone());
            }
            s
        }));
        rows.extend(items.into_iter().take(limit).map(|i| {
            let mut s = Suggestion::new(EntityKind::Item, i.id.clone(), i.name.clone());
            if let Some(category) = &i.category {
                s = s.with_hint(category.clone());
            }
            s
        }));
        rows.extend(events.into_iter().take(limit).map(|e| {
            let mut s = Suggestion::new(EntityKind::Event, e.id.clone(), e.name.clone());
            if let Some(hint) = e.date_hint() {
                s = s.with_hint(hint);
            }
            s
        }));

        rows.sort_by_key(|s| s.label.to_lowercase());
        rows.truncate(limit);
        debug!(query, rows = rows.len(), "suggestion lookup");
        Ok(rows)
    }
}

/// Provider that never suggests anything.
pub struct NoopSuggestionProvider;

#[async_trait]
impl SuggestionProvider for NoopSuggestionProvider {
    async fn suggest(
        &self,
        _collection_id: &str,
        _query: &str,
        _limit: usize,
    ) -> Result<Vec<Suggestion>, WeaveError> {
        Ok(Vec::new())
    }
}
