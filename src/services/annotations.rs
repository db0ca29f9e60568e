//! Annotation lifecycle: wrap a selection, edit the note, unwrap.
//!
//! An annotation lives in two places that agree by convention: the inline
//! span carrying `data-annotation-id`, and the chapter's side table keyed
//! by that id. The manager keeps both in step and tolerates drift. A
//! missing side-table entry opens as an empty note, and [`reconcile`]
//! reports divergence without repairing anything on its own.
//!
//! [`reconcile`]: AnnotationManager::reconcile

use std::collections::HashSet;
use std::sync::Arc;

use tracing::{debug, warn};
use uuid::Uuid;

use crate::error::WeaveError;
use crate::markup::{
    decode_annotation_ids, encode_annotation, note_preview, ANNOTATION_CLASS, MENTION_CLASS,
};
use crate::models::annotation::{Annotation, AnnotationEntityRef, AnnotationEntry, AnnotationTable};
use crate::models::entity::EntityKind;
use crate::services::gateway::{EntityGateway, OpenEntity};
use crate::surface::{EditorSurface, NodeId};

/// What a modified click (secondary key held with the primary button)
/// resolved to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClickOutcome {
    /// The click landed inside an annotation span; open this id for editing.
    EditAnnotation(String),
    /// The click landed inside a mention span; an open-entity request was
    /// published on the gateway.
    OpenedEntity(OpenEntity),
    /// Neither hit target applied.
    Ignored,
}

/// Outcome of an inline-vs-table sweep.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReconcileReport {
    /// Inline span ids with no side-table entry, in document order.
    pub missing_from_table: Vec<String>,
    /// Side-table ids with no inline span, sorted.
    pub missing_inline: Vec<String>,
}

impl ReconcileReport {
    pub fn is_clean(&self) -> bool {
        self.missing_from_table.is_empty() && self.missing_inline.is_empty()
    }
}

/// Creates, edits, and deletes annotation spans on an editing surface while
/// keeping the chapter's side table synchronized.
#[derive(Clone)]
pub struct AnnotationManager {
    gateway: Arc<EntityGateway>,
}

impl AnnotationManager {
    pub fn new(gateway: Arc<EntityGateway>) -> Self {
        Self { gateway }
    }

    /// Wrap the current selection in an annotation span and record the note
    /// in the side table. Rejects empty or whitespace-only selections.
    pub fn create(
        &self,
        surface: &mut dyn EditorSurface,
        table: &mut AnnotationTable,
        note: impl Into<String>,
        entity: Option<AnnotationEntityRef>,
    ) -> Result<Annotation, WeaveError> {
        let annotation = Annotation {
            id: Uuid::new_v4().to_string(),
            note: note.into(),
            entity,
        };
        let selected = surface.selected_markup();
        let encoded = encode_annotation(&selected, &annotation).ok_or_else(|| {
            WeaveError::Validation("cannot annotate an empty selection".to_string())
        })?;
        surface.run_transaction(&mut |s| s.splice(&encoded))?;
        table.insert(
            annotation.id.clone(),
            AnnotationEntry {
                note: annotation.note.clone(),
                entity: annotation.entity.clone(),
            },
        );
        debug!(id = %annotation.id, "annotation created");
        Ok(annotation)
    }

    /// Side-table entry for `id`, or the empty default when the table has
    /// drifted from the markup. Opening never fails on drift.
    pub fn open_for_edit(&self, table: &AnnotationTable, id: &str) -> Annotation {
        match table.get(id) {
            Some(entry) => Annotation::from_entry(id, entry.clone()),
            None => {
                warn!(id, "annotation has no side-table entry, opening empty");
                Annotation::from_entry(id, AnnotationEntry::default())
            }
        }
    }

    /// Rewrite the inline span's attributes in place and upsert the side
    /// table. The span is never re-wrapped, so its position in the document
    /// is untouched. A span missing from the markup is logged and skipped;
    /// the note still lands in the table.
    pub fn update(
        &self,
        surface: &mut dyn EditorSurface,
        table: &mut AnnotationTable,
        annotation: &Annotation,
    ) -> Result<(), WeaveError> {
        match surface.find_by_attr("data-annotation-id", &annotation.id) {
            Some(span) => {
                let preview = note_preview(&annotation.note);
                let entity = annotation.entity.clone();
                surface.run_transaction(&mut |s| {
                    match &entity {
                        Some(link) => {
                            s.set_attr(span, "data-entity-type", link.entity_type.as_str())?;
                            s.set_attr(span, "data-entity-id", &link.entity_id)?;
                        }
                        None => {
                            s.remove_attr(span, "data-entity-type")?;
                            s.remove_attr(span, "data-entity-id")?;
                        }
                    }
                    s.set_attr(span, "title", &preview)
                })?;
            }
            None => {
                warn!(id = %annotation.id, "annotation span not in markup, updating table only")
            }
        }
        table.insert(
            annotation.id.clone(),
            AnnotationEntry {
                note: annotation.note.clone(),
                entity: annotation.entity.clone(),
            },
        );
        Ok(())
    }

    /// Unwrap the annotation span, keeping its inner content in the
    /// document, and drop the side-table entry. The unwrap is a single
    /// undo-able transaction; the table row is gone either way, so undoing
    /// the markup change leaves an id that opens as an empty note.
    pub fn delete(
        &self,
        surface: &mut dyn EditorSurface,
        table: &mut AnnotationTable,
        id: &str,
    ) -> Result<(), WeaveError> {
        match surface.find_by_attr("data-annotation-id", id) {
            Some(span) => surface.run_transaction(&mut |s| s.unwrap_node(span))?,
            None => warn!(id, "annotation span not in markup, dropping table entry only"),
        }
        table.remove(id);
        debug!(id, "annotation deleted");
        Ok(())
    }

    /// Route a modified click at `node`. Annotation spans win over mention
    /// spans when the two are nested.
    pub fn handle_modified_click(&self, surface: &dyn EditorSurface, node: NodeId) -> ClickOutcome {
        if let Some(span) = surface.closest_with_class(node, ANNOTATION_CLASS) {
            match surface.attr(span, "data-annotation-id") {
                Some(id) if !id.is_empty() => return ClickOutcome::EditAnnotation(id),
                _ => debug!("annotation span without an id, ignoring"),
            }
        }
        if let Some(span) = surface.closest_with_class(node, MENTION_CLASS) {
            let kind = surface
                .attr(span, "data-entity-type")
                .and_then(|raw| EntityKind::parse(&raw));
            let entity_id = surface
                .attr(span, "data-entity-id")
                .filter(|id| !id.is_empty());
            if let (Some(kind), Some(entity_id)) = (kind, entity_id) {
                self.gateway.open(kind, entity_id.clone());
                return ClickOutcome::OpenedEntity(OpenEntity {
                    entity_type: kind,
                    entity_id,
                });
            }
            debug!("mention span with malformed payload, ignoring");
        }
        ClickOutcome::Ignored
    }

    /// Diff the inline annotation ids against the side table. Reports only,
    /// so a host can decide what drift means for its own persistence.
    pub fn reconcile(&self, markup: &str, table: &AnnotationTable) -> ReconcileReport {
        let inline = decode_annotation_ids(markup);
        let inline_set: HashSet<&str> = inline.iter().map(String::as_str).collect();

        let mut report = ReconcileReport::default();
        let mut seen = HashSet::new();
        for id in &inline {
            if !table.contains(id) && seen.insert(id.as_str()) {
                report.missing_from_table.push(id.clone());
            }
        }
        report.missing_inline = table
            .ids()
            .filter(|id| !inline_set.contains(*id))
            .map(str::to_string)
            .collect();
        report.missing_inline.sort();

        if !report.is_clean() {
            warn!(
                orphans_inline = report.missing_from_table.len(),
                orphans_table = report.missing_inline.len(),
                "annotation markup and side table have drifted"
            );
        }
        report
    }
}
