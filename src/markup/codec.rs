//! Encode/decode the inline micro-format: mention spans and annotation
//! wrappers.
//!
//! Shapes are fixed by the stored corpus and must not drift:
//!
//! ```text
//! <span data-entity-type="…" data-entity-id="…" class="wv-entity">label</span>
//! <span data-annotation-id="…" [data-entity-type="…" data-entity-id="…"]
//!       class="wv-annotation" title="preview">…content…</span>
//! ```

use tracing::debug;

use crate::markup::dom::{escape_html, Fragment, NodeId};
use crate::models::annotation::Annotation;
use crate::models::entity::EntityKind;
use crate::models::mention::EntityMention;

/// Class marking an inline entity mention span.
pub const MENTION_CLASS: &str = "wv-entity";
/// Class marking an inline annotation wrapper span.
pub const ANNOTATION_CLASS: &str = "wv-annotation";
/// Maximum visible characters in an annotation's tooltip preview.
pub const NOTE_PREVIEW_CHARS: usize = 120;

/// Encode a mention as an inline span. The label is escaped; embedding an
/// unescaped label is a correctness bug, not cosmetics.
pub fn encode_mention(mention: &EntityMention) -> String {
    format!(
        r#"<span data-entity-type="{}" data-entity-id="{}" class="{}">{}</span>"#,
        mention.entity_type.as_str(),
        escape_html(&mention.entity_id),
        MENTION_CLASS,
        escape_html(&mention.label)
    )
}

/// Extract every mention span from markup, in document order.
///
/// Malformed spans (missing or unrecognized type, empty id) are skipped one
/// by one; the decode itself never fails.
pub fn decode_mentions(markup: &str) -> Vec<EntityMention> {
    mentions_in(&Fragment::parse(markup))
}

pub(crate) fn mentions_in(frag: &Fragment) -> Vec<EntityMention> {
    let mut out = Vec::new();
    for id in frag.elements_with_class(MENTION_CLASS) {
        match mention_of(frag, id) {
            Some(mention) => out.push(mention),
            None => debug!("skipping mention span with missing type or id"),
        }
    }
    out
}

fn mention_of(frag: &Fragment, id: NodeId) -> Option<EntityMention> {
    let entity_type = EntityKind::parse(frag.attr(id, "data-entity-type")?)?;
    let entity_id = frag.attr(id, "data-entity-id")?;
    if entity_id.is_empty() {
        return None;
    }
    Some(EntityMention {
        entity_type,
        entity_id: entity_id.to_string(),
        label: frag.text_content_of(id).trim().to_string(),
    })
}

/// Whitespace-collapsed preview of a note, capped at
/// [`NOTE_PREVIEW_CHARS`] visible characters with an ellipsis when cut.
pub fn note_preview(note: &str) -> String {
    let collapsed = note.split_whitespace().collect::<Vec<_>>().join(" ");
    let mut chars = collapsed.chars();
    let head: String = chars.by_ref().take(NOTE_PREVIEW_CHARS).collect();
    if chars.next().is_some() {
        format!("{}…", head)
    } else {
        head
    }
}

/// Wrap selected markup in an annotation span. Returns `None` (no-op) when
/// the selection's text is empty or whitespace-only.
///
/// The content markup is embedded untouched; only the wrapper is new.
pub fn encode_annotation(content_markup: &str, annotation: &Annotation) -> Option<String> {
    let inner = Fragment::parse(content_markup);
    if inner.text_content().trim().is_empty() {
        return None;
    }
    let mut open = format!(
        r#"<span data-annotation-id="{}""#,
        escape_html(&annotation.id)
    );
    if let Some(entity) = &annotation.entity {
        open.push_str(&format!(
            r#" data-entity-type="{}" data-entity-id="{}""#,
            entity.entity_type.as_str(),
            escape_html(&entity.entity_id)
        ));
    }
    open.push_str(&format!(
        r#" class="{}" title="{}">"#,
        ANNOTATION_CLASS,
        escape_html(&note_preview(&annotation.note))
    ));
    Some(format!("{}{}</span>", open, content_markup))
}

/// Annotation ids present inline, in document order. Used to reconcile the
/// markup against the side table.
pub fn decode_annotation_ids(markup: &str) -> Vec<String> {
    annotation_ids_in(&Fragment::parse(markup))
}

pub(crate) fn annotation_ids_in(frag: &Fragment) -> Vec<String> {
    let mut out = Vec::new();
    for id in frag.elements_with_class(ANNOTATION_CLASS) {
        match frag.attr(id, "data-annotation-id") {
            Some(value) if !value.is_empty() => out.push(value.to_string()),
            _ => debug!("skipping annotation span without an id"),
        }
    }
    out
}
