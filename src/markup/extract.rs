//! Mention extraction and per-entity grouping over chapter markup.

use std::collections::HashMap;

use crate::markup::codec;
use crate::models::entity::EntityKind;
use crate::models::mention::{EntityMention, MentionCount};
use crate::utils::collate::compare_ci;

/// All mentions in the markup, document order.
pub fn extract_mentions(markup: &str) -> Vec<EntityMention> {
    codec::decode_mentions(markup)
}

/// Group the markup's mentions by (entity type, entity id).
///
/// The first label seen in document order represents the group; an empty
/// first label falls back to the entity id. Sorted by descending count,
/// then ascending label.
pub fn count_mentions_by_entity(markup: &str) -> Vec<MentionCount> {
    let counts = codec::decode_mentions(markup).into_iter().map(|m| {
        let label = if m.label.is_empty() {
            m.entity_id.clone()
        } else {
            m.label
        };
        MentionCount {
            entity_type: m.entity_type,
            entity_id: m.entity_id,
            label,
            count: 1,
        }
    });
    merge_mention_counts(counts)
}

/// Merge already-grouped counts (e.g. one list per chapter) into one table:
/// counts sum per (type, id), the first-seen label sticks. Same sort as
/// [`count_mentions_by_entity`].
pub fn merge_mention_counts<I>(counts: I) -> Vec<MentionCount>
where
    I: IntoIterator<Item = MentionCount>,
{
    let mut grouped: HashMap<(EntityKind, String), MentionCount> = HashMap::new();
    let mut order: Vec<(EntityKind, String)> = Vec::new();
    for count in counts {
        let key = (count.entity_type, count.entity_id.clone());
        match grouped.get_mut(&key) {
            Some(entry) => entry.count += count.count,
            None => {
                order.push(key.clone());
                grouped.insert(key, count);
            }
        }
    }
    // Drain in first-seen order so equal-count, equal-label groups stay stable.
    let mut out: Vec<MentionCount> = order
        .into_iter()
        .filter_map(|key| grouped.remove(&key))
        .collect();
    sort_mention_counts(&mut out);
    out
}

pub(crate) fn sort_mention_counts(counts: &mut [MentionCount]) {
    counts.sort_by(|a, b| {
        b.count
            .cmp(&a.count)
            .then_with(|| compare_ci(&a.label, &b.label))
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn mention_span(kind: &str, id: &str, label: &str) -> String {
        format!(
            r#"<span data-entity-type="{}" data-entity-id="{}" class="wv-entity">{}</span>"#,
            kind, id, label
        )
    }

    #[test]
    fn test_first_label_wins_for_same_entity() {
        let markup = format!(
            "<p>{} and {}</p>",
            mention_span("character", "c1", "Alice"),
            mention_span("character", "c1", "Alice Verne")
        );
        let counts = count_mentions_by_entity(&markup);
        assert_eq!(counts.len(), 1);
        assert_eq!(counts[0].label, "Alice");
        assert_eq!(counts[0].count, 2);
    }

    #[test]
    fn test_empty_first_label_falls_back_to_id() {
        let markup = format!(
            "<p>{}{}</p>",
            mention_span("item", "i3", ""),
            mention_span("item", "i3", "the lantern")
        );
        let counts = count_mentions_by_entity(&markup);
        assert_eq!(counts[0].label, "i3");
        assert_eq!(counts[0].count, 2);
    }

    #[test]
    fn test_same_id_different_types_stay_distinct() {
        let markup = format!(
            "<p>{}{}</p>",
            mention_span("character", "x1", "Ash"),
            mention_span("place", "x1", "Ash")
        );
        let counts = count_mentions_by_entity(&markup);
        assert_eq!(counts.len(), 2);
    }

    #[test]
    fn test_sorted_by_count_then_label() {
        let markup = format!(
            "<p>{}{}{}{}{}</p>",
            mention_span("character", "c2", "Zoé"),
            mention_span("character", "c1", "alice"),
            mention_span("character", "c3", "Basil"),
            mention_span("character", "c3", "Basil"),
            mention_span("character", "c1", "alice"),
        );
        let counts = count_mentions_by_entity(&markup);
        let labels: Vec<&str> = counts.iter().map(|c| c.label.as_str()).collect();
        // Case-insensitive label ordering breaks the 2-2 tie.
        assert_eq!(labels, vec!["alice", "Basil", "Zoé"]);
        assert_eq!(counts[0].count, 2);
        assert_eq!(counts[2].count, 1);
    }

    #[test]
    fn test_merge_across_documents_keeps_first_seen_label() {
        let per_doc = vec![
            MentionCount {
                entity_type: EntityKind::Place,
                entity_id: "p1".to_string(),
                label: "the Harbor".to_string(),
                count: 3,
            },
            MentionCount {
                entity_type: EntityKind::Place,
                entity_id: "p1".to_string(),
                label: "Old Harbor".to_string(),
                count: 2,
            },
            MentionCount {
                entity_type: EntityKind::Place,
                entity_id: "p2".to_string(),
                label: "the Keep".to_string(),
                count: 4,
            },
        ];
        let merged = merge_mention_counts(per_doc);
        assert_eq!(merged.len(), 2);
        assert_eq!(merged[0].entity_id, "p1");
        assert_eq!(merged[0].count, 5);
        assert_eq!(merged[0].label, "the Harbor");
        assert_eq!(merged[1].count, 4);
    }

    #[test]
    fn test_no_mentions_yields_empty() {
        assert!(count_mentions_by_entity("<p>plain prose only</p>").is_empty());
        assert!(count_mentions_by_entity("").is_empty());
    }
}
