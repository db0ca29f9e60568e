pub mod analytics;
pub mod annotations;
pub mod autocomplete;
pub mod export;
pub mod gateway;
pub mod suggest;

pub use analytics::{
    corpus_totals, cumulative_progression, document_stats, filter_sort_rows, length_histogram,
    top_entities_by_type, top_vocabulary, AnalyticsConfig, AnalyticsService,
    CachedAnalyticsService, ChapterFacts, ChapterStats, CorpusTotals, DocumentStats,
    HistogramBucket, ProgressionPoint, SortDir, SortKey, TomeRollup, DEFAULT_TOP_ENTITIES,
    DEFAULT_TOP_WORDS,
};
pub use annotations::{AnnotationManager, ClickOutcome, ReconcileReport};
pub use autocomplete::{
    AutocompleteConfig, AutocompleteController, EditorKey, KeyDisposition, SessionEvent,
    SessionPhase,
};
pub use export::{rows_to_csv, CSV_HEADER};
pub use gateway::{EntityGateway, OpenEntity};
pub use suggest::{
    CatalogSuggestionProvider, LoreCatalog, NoopSuggestionProvider, SuggestionProvider,
    MAX_SUGGESTIONS, MIN_QUERY_CHARS,
};
