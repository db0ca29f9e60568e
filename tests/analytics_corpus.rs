//! Corpus analytics end to end: seeded chapters with live mention markup,
//! collected into rows, rolled up, charted, and exported.

mod common;

use std::sync::Arc;

use common::{mention_span, ChapterBuilder, OutlineBuilder};
use insta::assert_snapshot;
use pretty_assertions::assert_eq;
use wordweave::models::{EntityKind, MentionCount, TomeOutline};
use wordweave::repository::InMemoryChapterStore;
use wordweave::services::{
    corpus_totals, cumulative_progression, filter_sort_rows, length_histogram, rows_to_csv,
    top_entities_by_type, top_vocabulary, AnalyticsService, CachedAnalyticsService, ChapterStats,
    SortDir, SortKey, CSV_HEADER, DEFAULT_TOP_ENTITIES,
};

fn alice() -> String {
    mention_span(EntityKind::Character, "c1", "Alice")
}

fn basil() -> String {
    mention_span(EntityKind::Character, "c2", "Basil")
}

fn seeded() -> (Arc<InMemoryChapterStore>, Vec<TomeOutline>) {
    common::init_tracing();
    let store = InMemoryChapterStore::new()
        .with_chapter(
            ChapterBuilder::new("ch-a1", "L'incendie")
                .paragraph(format!("{} regarde le moulin brûler.", alice()))
                .paragraph("Le moulin tombe.")
                .build(),
        )
        .with_chapter(
            // No body title: the outline title fills in.
            ChapterBuilder::new("ch-a2", "")
                .paragraph(format!(
                    "{} court vers {} avec {}.",
                    alice(),
                    mention_span(EntityKind::Place, "p1", "Belharbour"),
                    basil(),
                ))
                .build(),
        )
        .with_chapter(
            ChapterBuilder::new("ch-c1", "Retour")
                .paragraph(format!("{} revient au moulin.", basil()))
                .build(),
        );

    let outlines = vec![
        OutlineBuilder::new("t2", "Crépuscule")
            .chapter("ch-c1", "Retour", 1)
            .build(),
        OutlineBuilder::new("t1", "Aube")
            .chapter("ch-a2", "La fuite", 2)
            .chapter("ch-a1", "Peu importe", 1)
            .build(),
    ];
    (Arc::new(store), outlines)
}

async fn collected() -> Vec<ChapterStats> {
    let (store, outlines) = seeded();
    AnalyticsService::with_defaults(store)
        .collect(&outlines)
        .await
        .expect("collect should succeed")
}

fn count(kind: EntityKind, id: &str, label: &str, count: usize) -> MentionCount {
    MentionCount {
        entity_type: kind,
        entity_id: id.to_string(),
        label: label.to_string(),
        count,
    }
}

// =============================================================================
// COLLECTION
// =============================================================================

#[tokio::test]
async fn test_collect_builds_ordered_rows_from_live_markup() {
    let rows = collected().await;

    let summary: Vec<(&str, &str, Option<u32>, u64)> = rows
        .iter()
        .map(|r| {
            (
                r.tome_name.as_str(),
                r.chapter_title.as_str(),
                r.position,
                r.word_count,
            )
        })
        .collect();
    assert_eq!(
        summary,
        vec![
            ("Aube", "L'incendie", Some(1), 8),
            ("Aube", "La fuite", Some(2), 6),
            ("Crépuscule", "Retour", Some(1), 4),
        ]
    );

    assert_eq!(
        rows[0].entities,
        vec![count(EntityKind::Character, "c1", "Alice", 1)]
    );
    assert_eq!(
        rows[1].entities,
        vec![
            count(EntityKind::Character, "c1", "Alice", 1),
            count(EntityKind::Character, "c2", "Basil", 1),
            count(EntityKind::Place, "p1", "Belharbour", 1),
        ]
    );
    assert_eq!(rows[1].plain_text, "Alice court vers Belharbour avec Basil.");
}

// =============================================================================
// ROLLUPS AND LEADERBOARDS
// =============================================================================

#[tokio::test]
async fn test_corpus_rollups_and_leaderboards() {
    let rows = collected().await;

    let totals = corpus_totals(&rows);
    assert_eq!(totals.total_words, 18);
    assert_eq!(totals.total_chapters, 3);
    assert_eq!(totals.mean_words_per_chapter, 6);
    let tomes: Vec<(&str, u64, usize)> = totals
        .tomes
        .iter()
        .map(|t| (t.tome_name.as_str(), t.words, t.chapters))
        .collect();
    assert_eq!(tomes, vec![("Aube", 14, 2), ("Crépuscule", 4, 1)]);

    let characters = top_entities_by_type(&rows, EntityKind::Character, DEFAULT_TOP_ENTITIES);
    assert_eq!(
        characters,
        vec![
            count(EntityKind::Character, "c1", "Alice", 2),
            count(EntityKind::Character, "c2", "Basil", 2),
        ]
    );
    let places = top_entities_by_type(&rows, EntityKind::Place, DEFAULT_TOP_ENTITIES);
    assert_eq!(places, vec![count(EntityKind::Place, "p1", "Belharbour", 1)]);

    let top = top_vocabulary(&rows, 4);
    let vocabulary: Vec<(&str, usize)> = top.iter().map(|w| (w.word.as_str(), w.count)).collect();
    assert_eq!(
        vocabulary,
        vec![("moulin", 3), ("alice", 2), ("basil", 2), ("belharbour", 1)]
    );
}

// =============================================================================
// CHARTS AND FILTERING
// =============================================================================

#[tokio::test]
async fn test_histogram_progression_and_filtering() {
    let rows = collected().await;
    let lengths: Vec<u64> = rows.iter().map(|r| r.word_count).collect();

    let buckets = length_histogram(&lengths, Some(2));
    let labels: Vec<&str> = buckets.iter().map(|b| b.label.as_str()).collect();
    assert_eq!(labels, vec!["4–6", "6–8"]);
    let histogram_total: usize = buckets.iter().map(|b| b.count).sum();
    assert_eq!(histogram_total, rows.len());

    let progression = cumulative_progression(&rows);
    let points: Vec<(&str, u64)> = progression
        .iter()
        .map(|p| (p.label.as_str(), p.cumulative_words))
        .collect();
    assert_eq!(points, vec![("#1", 8), ("#2", 14), ("#1", 18)]);

    let aube = filter_sort_rows(&rows, "aube", SortKey::Position, SortDir::Asc);
    assert_eq!(aube.len(), 2);
    assert!(aube.iter().all(|r| r.tome_name == "Aube"));

    let heaviest = filter_sort_rows(&rows, "", SortKey::Words, SortDir::Desc);
    let word_counts: Vec<u64> = heaviest.iter().map(|r| r.word_count).collect();
    assert_eq!(word_counts, vec![8, 6, 4]);
}

// =============================================================================
// EXPORT
// =============================================================================

#[tokio::test]
async fn test_csv_export_of_collected_rows() {
    let rows = collected().await;
    let csv = rows_to_csv(&rows);
    assert!(csv.starts_with(CSV_HEADER));
    assert_snapshot!("corpus_csv", csv);
}

// =============================================================================
// CACHING
// =============================================================================

#[tokio::test]
async fn test_cache_invalidation_is_per_chapter() {
    let store = Arc::new(
        InMemoryChapterStore::new()
            .with_chapter(ChapterBuilder::new("ch-x", "Un").paragraph("mot.").build())
            .with_chapter(
                ChapterBuilder::new("ch-y", "Deux")
                    .paragraph("mot mot.")
                    .build(),
            ),
    );
    let outlines = vec![OutlineBuilder::new("t1", "Aube")
        .chapter("ch-x", "Un", 1)
        .chapter("ch-y", "Deux", 2)
        .build()];
    let service = CachedAnalyticsService::with_defaults(store.clone());

    let first = service.collect(&outlines).await.expect("collect");
    assert_eq!(first[0].word_count, 1);
    assert_eq!(first[1].word_count, 2);

    // Both bodies change on disk, only one cache entry is dropped.
    store
        .insert(
            ChapterBuilder::new("ch-x", "Un")
                .paragraph("mot mot mot.")
                .build(),
        )
        .await;
    store
        .insert(
            ChapterBuilder::new("ch-y", "Deux")
                .paragraph("mot mot mot mot.")
                .build(),
        )
        .await;
    service.invalidate("ch-x").await;

    let second = service.collect(&outlines).await.expect("collect");
    assert_eq!(second[0].word_count, 3, "invalidated chapter refetches");
    assert_eq!(second[1].word_count, 2, "untouched chapter stays cached");
}
