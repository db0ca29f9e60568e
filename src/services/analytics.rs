//! Corpus aggregation: per-chapter tallies rolled up into totals,
//! histograms, progressions, and leaderboards.
//!
//! Rows are recomputed on demand from fetched chapter bodies; the only held
//! state is the per-chapter fact cache in [`CachedAnalyticsService`].
//! Everything downstream of a [`ChapterStats`] row is a pure function, so a
//! host can slice the same rows many ways without refetching.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use futures::stream::{self, StreamExt, TryStreamExt};
use moka::future::Cache;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::WeaveError;
use crate::markup::{count_mentions_by_entity, merge_mention_counts};
use crate::models::chapter::{ChapterDocument, ChapterMeta, TomeOutline};
use crate::models::entity::EntityKind;
use crate::models::mention::MentionCount;
use crate::repository::ChapterStore;
use crate::text::{count_words, to_plain_text, top_words, WordCount};
use crate::utils::{compare_ci, fmt_short};

/// Default row cap for entity leaderboards.
pub const DEFAULT_TOP_ENTITIES: usize = 12;
/// Default row cap for the vocabulary leaderboard.
pub const DEFAULT_TOP_WORDS: usize = 40;

/// Tuning for corpus collection and the per-chapter fact cache.
#[derive(Debug, Clone)]
pub struct AnalyticsConfig {
    /// How many chapter fetches run concurrently per tome (default: 8).
    pub fetch_batch_size: usize,
    /// Fact cache TTL in seconds (default: 300 = 5 minutes).
    pub cache_ttl_secs: u64,
    /// Fact cache capacity, in chapters (default: 10 000).
    pub cache_capacity: u64,
}

impl Default for AnalyticsConfig {
    fn default() -> Self {
        Self {
            fetch_batch_size: 8,
            cache_ttl_secs: 300,
            cache_capacity: 10_000,
        }
    }
}

/// Word and entity tallies for a single document body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentStats {
    pub word_count: u64,
    pub entities: Vec<MentionCount>,
}

/// One analytics row: a chapter joined with its tome context and tallies.
///
/// The title comes from the fetched body when it has one, otherwise from
/// the outline. The position always comes from the outline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChapterStats {
    pub tome_id: String,
    pub tome_name: String,
    pub chapter_id: String,
    pub chapter_title: String,
    pub position: Option<u32>,
    pub word_count: u64,
    pub entities: Vec<MentionCount>,
    /// Markup stripped to prose, kept for vocabulary rollups.
    pub plain_text: String,
}

impl ChapterStats {
    fn from_facts(tome: &TomeOutline, meta: &ChapterMeta, facts: ChapterFacts) -> Self {
        let ChapterFacts {
            title,
            word_count,
            entities,
            plain_text,
        } = facts;
        let chapter_title = if title.is_empty() {
            meta.title.clone()
        } else {
            title
        };
        Self {
            tome_id: tome.tome_id.clone(),
            tome_name: tome.tome_name.clone(),
            chapter_id: meta.id.clone(),
            chapter_title,
            position: meta.position,
            word_count,
            entities,
            plain_text,
        }
    }
}

/// Per-chapter derivation: everything a row needs that comes from the
/// fetched body rather than the outline.
#[derive(Debug, Clone)]
pub struct ChapterFacts {
    pub title: String,
    pub word_count: u64,
    pub entities: Vec<MentionCount>,
    pub plain_text: String,
}

impl ChapterFacts {
    fn from_document(doc: &ChapterDocument) -> Self {
        let plain_text = to_plain_text(&doc.markup);
        Self {
            title: doc.title.clone(),
            word_count: count_words(&plain_text) as u64,
            entities: count_mentions_by_entity(&doc.markup),
            plain_text,
        }
    }
}

/// Word and chapter totals for one tome.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TomeRollup {
    pub tome_id: String,
    pub tome_name: String,
    pub words: u64,
    pub chapters: usize,
}

/// Corpus-wide totals with the per-tome rollup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CorpusTotals {
    pub total_words: u64,
    pub total_chapters: usize,
    /// Mean words per chapter, rounded to the nearest integer.
    pub mean_words_per_chapter: u64,
    /// Rollups ordered by tome name ascending.
    pub tomes: Vec<TomeRollup>,
}

/// One histogram bucket with its preformatted range label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HistogramBucket {
    pub label: String,
    pub count: usize,
}

/// One point of the running word-count curve.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressionPoint {
    pub label: String,
    pub cumulative_words: u64,
}

/// Column to order analytics rows by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortKey {
    #[default]
    Position,
    Words,
    Title,
}

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDir {
    #[default]
    Asc,
    Desc,
}

/// Tallies for one document body, independent of any outline context.
pub fn document_stats(doc: &ChapterDocument) -> DocumentStats {
    DocumentStats {
        word_count: count_words(&to_plain_text(&doc.markup)) as u64,
        entities: count_mentions_by_entity(&doc.markup),
    }
}

/// Sum rows into corpus totals and a per-tome rollup. Each tome keeps the
/// name of its first-seen row.
pub fn corpus_totals(rows: &[ChapterStats]) -> CorpusTotals {
    let mut by_tome: HashMap<&str, TomeRollup> = HashMap::new();
    for row in rows {
        let slot = by_tome
            .entry(row.tome_id.as_str())
            .or_insert_with(|| TomeRollup {
                tome_id: row.tome_id.clone(),
                tome_name: row.tome_name.clone(),
                words: 0,
                chapters: 0,
            });
        slot.words += row.word_count;
        slot.chapters += 1;
    }
    let mut tomes: Vec<TomeRollup> = by_tome.into_values().collect();
    tomes.sort_by(|a, b| compare_ci(&a.tome_name, &b.tome_name));

    let total_words: u64 = rows.iter().map(|r| r.word_count).sum();
    let total_chapters = rows.len();
    let mean_words_per_chapter = if total_chapters == 0 {
        0
    } else {
        (total_words as f64 / total_chapters as f64).round() as u64
    };
    CorpusTotals {
        total_words,
        total_chapters,
        mean_words_per_chapter,
        tomes,
    }
}

/// Bucket chapter lengths for a bar chart.
///
/// All-equal values collapse to a single bucket. Otherwise the bucket count
/// defaults to `round(sqrt(n))` clamped to 6..=14, width is `(max-min)`
/// over that count, and each value lands in `floor((v-min)/width)` clamped
/// to the last bucket. Labels are short-number edges joined with an en dash.
pub fn length_histogram(values: &[u64], bins: Option<usize>) -> Vec<HistogramBucket> {
    let Some(&first) = values.first() else {
        return Vec::new();
    };
    let mut min = first;
    let mut max = first;
    for &v in values {
        min = min.min(v);
        max = max.max(v);
    }
    if min == max {
        return vec![HistogramBucket {
            label: fmt_short(min),
            count: values.len(),
        }];
    }

    let bucket_count = bins
        .unwrap_or_else(|| ((values.len() as f64).sqrt().round() as usize).clamp(6, 14))
        .max(1);
    let mut width = (max - min) as f64 / bucket_count as f64;
    if width == 0.0 {
        width = 1.0;
    }

    let edge = |i: usize| fmt_short((min as f64 + i as f64 * width).round() as u64);
    let mut buckets: Vec<HistogramBucket> = (0..bucket_count)
        .map(|i| HistogramBucket {
            label: format!("{}–{}", edge(i), edge(i + 1)),
            count: 0,
        })
        .collect();
    for &v in values {
        let idx = ((((v - min) as f64) / width).floor() as usize).min(bucket_count - 1);
        buckets[idx].count += 1;
    }
    buckets
}

/// Running word total over rows in their given order. Labels are `#n` for
/// positioned rows, else the first ten characters of the title.
pub fn cumulative_progression(rows: &[ChapterStats]) -> Vec<ProgressionPoint> {
    let mut running = 0u64;
    rows.iter()
        .map(|row| {
            running += row.word_count;
            let label = match row.position {
                Some(p) if p != 0 => format!("#{}", p),
                _ => row.chapter_title.chars().take(10).collect(),
            };
            ProgressionPoint {
                label,
                cumulative_words: running,
            }
        })
        .collect()
}

/// Most-mentioned entities of one kind across all rows. Counts for the same
/// entity id are summed, the first-seen label wins, and ties break by label.
pub fn top_entities_by_type(
    rows: &[ChapterStats],
    kind: EntityKind,
    limit: usize,
) -> Vec<MentionCount> {
    let merged = merge_mention_counts(
        rows.iter()
            .flat_map(|r| r.entities.iter().filter(|m| m.entity_type == kind).cloned()),
    );
    merged.into_iter().take(limit).collect()
}

/// Most frequent content words across all rows' prose.
pub fn top_vocabulary(rows: &[ChapterStats], limit: usize) -> Vec<WordCount> {
    let joined = rows
        .iter()
        .map(|r| r.plain_text.as_str())
        .collect::<Vec<_>>()
        .join(" ");
    top_words(&joined, limit)
}

/// Filter rows by a case-insensitive query over chapter title and tome name,
/// then order by the chosen column. Descending reverses the whole
/// comparison, tiebreaks included.
pub fn filter_sort_rows(
    rows: &[ChapterStats],
    query: &str,
    key: SortKey,
    dir: SortDir,
) -> Vec<ChapterStats> {
    let needle = query.trim().to_lowercase();
    let mut out: Vec<ChapterStats> = rows
        .iter()
        .filter(|r| {
            needle.is_empty()
                || r.chapter_title.to_lowercase().contains(&needle)
                || r.tome_name.to_lowercase().contains(&needle)
        })
        .cloned()
        .collect();
    out.sort_by(|a, b| {
        let ord = match key {
            SortKey::Position => a
                .position
                .unwrap_or(0)
                .cmp(&b.position.unwrap_or(0))
                .then_with(|| compare_ci(&a.chapter_title, &b.chapter_title)),
            SortKey::Words => a.word_count.cmp(&b.word_count),
            SortKey::Title => compare_ci(&a.chapter_title, &b.chapter_title),
        };
        match dir {
            SortDir::Asc => ord,
            SortDir::Desc => ord.reverse(),
        }
    });
    out
}

/// Fetches chapter bodies and assembles [`ChapterStats`] rows, one fetch
/// per chapter on every call.
pub struct AnalyticsService {
    store: Arc<dyn ChapterStore>,
    config: AnalyticsConfig,
}

impl AnalyticsService {
    pub fn new(store: Arc<dyn ChapterStore>, config: AnalyticsConfig) -> Self {
        Self { store, config }
    }

    pub fn with_defaults(store: Arc<dyn ChapterStore>) -> Self {
        Self::new(store, AnalyticsConfig::default())
    }

    /// Fetch every chapter in the outline and build its row. Fetches run
    /// concurrently in per-tome batches; rows come back ordered by tome
    /// name, then position. Fetch failures propagate.
    pub async fn collect(&self, outlines: &[TomeOutline]) -> Result<Vec<ChapterStats>, WeaveError> {
        let mut rows = Vec::new();
        for tome in outlines {
            let fetched = stream::iter(tome.chapters.iter().map(|meta| async move {
                let doc = self.store.chapter(&meta.id).await?;
                Ok::<_, WeaveError>((meta, ChapterFacts::from_document(&doc)))
            }))
            .buffered(self.config.fetch_batch_size.max(1))
            .try_collect::<Vec<_>>()
            .await?;
            for (meta, facts) in fetched {
                rows.push(ChapterStats::from_facts(tome, meta, facts));
            }
        }
        sort_rows(&mut rows);
        debug!(rows = rows.len(), "corpus collected");
        Ok(rows)
    }
}

/// [`AnalyticsService`] with a per-chapter fact cache in front of the
/// store, so outline-wide recomputes only refetch cold or expired ids.
pub struct CachedAnalyticsService {
    store: Arc<dyn ChapterStore>,
    facts_cache: Cache<String, ChapterFacts>,
    config: AnalyticsConfig,
}

impl CachedAnalyticsService {
    pub fn new(store: Arc<dyn ChapterStore>, config: AnalyticsConfig) -> Self {
        let facts_cache = Cache::builder()
            .max_capacity(config.cache_capacity)
            .time_to_live(Duration::from_secs(config.cache_ttl_secs))
            .build();
        Self {
            store,
            facts_cache,
            config,
        }
    }

    pub fn with_defaults(store: Arc<dyn ChapterStore>) -> Self {
        Self::new(store, AnalyticsConfig::default())
    }

    /// Trust TTL plus explicit invalidation; callers invalidate on save.
    async fn facts(&self, chapter_id: &str) -> Result<ChapterFacts, WeaveError> {
        if let Some(hit) = self.facts_cache.get(chapter_id).await {
            return Ok(hit);
        }
        let doc = self.store.chapter(chapter_id).await?;
        let facts = ChapterFacts::from_document(&doc);
        self.facts_cache
            .insert(chapter_id.to_string(), facts.clone())
            .await;
        Ok(facts)
    }

    /// Same shape as [`AnalyticsService::collect`], served from the fact
    /// cache where possible.
    pub async fn collect(&self, outlines: &[TomeOutline]) -> Result<Vec<ChapterStats>, WeaveError> {
        let mut rows = Vec::new();
        for tome in outlines {
            let fetched = stream::iter(tome.chapters.iter().map(|meta| async move {
                let facts = self.facts(&meta.id).await?;
                Ok::<_, WeaveError>((meta, facts))
            }))
            .buffered(self.config.fetch_batch_size.max(1))
            .try_collect::<Vec<_>>()
            .await?;
            for (meta, facts) in fetched {
                rows.push(ChapterStats::from_facts(tome, meta, facts));
            }
        }
        sort_rows(&mut rows);
        Ok(rows)
    }

    /// Drop one chapter's cached facts. Call after the chapter is saved.
    pub async fn invalidate(&self, chapter_id: &str) {
        self.facts_cache.invalidate(chapter_id).await;
    }

    pub fn invalidate_all(&self) {
        self.facts_cache.invalidate_all();
    }
}

fn sort_rows(rows: &mut [ChapterStats]) {
    rows.sort_by(|a, b| {
        compare_ci(&a.tome_name, &b.tome_name)
            .then_with(|| a.position.unwrap_or(0).cmp(&b.position.unwrap_or(0)))
    });
}
