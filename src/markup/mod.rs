//! Chapter markup handling: the tolerant fragment DOM, the mention and
//! annotation span codecs, and mention extraction.

pub mod codec;
pub mod dom;
pub mod extract;

pub use codec::{
    decode_annotation_ids, decode_mentions, encode_annotation, encode_mention, note_preview,
    ANNOTATION_CLASS, MENTION_CLASS,
};
pub use dom::{escape_html, unescape_html, Fragment, NodeId, NodeKind};
pub use extract::{count_mentions_by_entity, extract_mentions, merge_mention_counts};
