pub mod annotation;
pub mod chapter;
pub mod entity;
pub mod lore;
pub mod mention;
pub mod suggestion;

pub use annotation::{Annotation, AnnotationEntityRef, AnnotationEntry, AnnotationTable};
pub use chapter::{ChapterDocument, ChapterMeta, TomeOutline};
pub use entity::EntityKind;
pub use lore::{CharacterRecord, EventRecord, ItemRecord, PlaceRecord};
pub use mention::{EntityMention, MentionCount};
pub use suggestion::Suggestion;
