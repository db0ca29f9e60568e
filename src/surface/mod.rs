//! The editing surface seam.
//!
//! Controllers never touch a concrete editor. They speak [`EditorSurface`],
//! which models the small slice of a rich-text editor this crate needs:
//! a selection, node-level reads, and transactional mutation. The in-memory
//! [`BufferSurface`] backs every test; hosts bridge the trait to a real
//! editor component.

pub mod buffer;

use crate::error::WeaveError;

pub use crate::markup::dom::NodeId;
pub use buffer::BufferSurface;

/// A point in host viewport coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

/// An axis-aligned rectangle in host viewport coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    pub left: f64,
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
}

/// A caret position: a character offset inside a text node, or a child
/// index inside an element.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Caret {
    pub node: NodeId,
    pub offset: usize,
}

impl Caret {
    pub fn new(node: NodeId, offset: usize) -> Self {
        Self { node, offset }
    }
}

/// A forward selection between two carets. `start` must not come after
/// `end` in document order; a collapsed selection is a bare caret.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SelectionRange {
    pub start: Caret,
    pub end: Caret,
}

impl SelectionRange {
    pub fn new(start: Caret, end: Caret) -> Self {
        Self { start, end }
    }

    pub fn collapsed(caret: Caret) -> Self {
        Self {
            start: caret,
            end: caret,
        }
    }

    pub fn is_collapsed(&self) -> bool {
        self.start == self.end
    }
}

/// The word-character run found around the caret by [`word_at_caret`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WordHit {
    /// Text node holding the run.
    pub node: NodeId,
    /// Character offset of the run's first character.
    pub start: usize,
    /// Character offset one past the run's last character.
    pub end: usize,
    /// The run itself. Empty when the caret touches no word character.
    pub text: String,
}

/// Minimal editor contract for the autocomplete and annotation controllers.
///
/// Reads return owned data so implementations bridging to an out-of-process
/// editor stay possible. Mutations returning `Err` leave the surface
/// unchanged; inside [`EditorSurface::run_transaction`] an error rolls the
/// whole transaction back.
pub trait EditorSurface {
    /// Serialized markup of the whole document.
    fn content(&self) -> String;

    /// The current selection, if any.
    fn selection(&self) -> Option<SelectionRange>;

    /// Replace the selection. Both carets must reference live nodes with
    /// in-range offsets.
    fn set_selection(&mut self, range: SelectionRange) -> Result<(), WeaveError>;

    /// Collapse the selection to its end (`true`) or start (`false`).
    fn collapse_selection(&mut self, to_end: bool);

    /// Serialized markup covered by the selection, without removing it.
    fn selected_markup(&self) -> String;

    /// Plain text covered by the selection.
    fn selected_text(&self) -> String;

    /// Replace the selection with parsed markup. Afterwards the selection
    /// covers the inserted content.
    fn splice(&mut self, markup: &str) -> Result<(), WeaveError>;

    /// Run `edits` atomically: on `Err` every mutation made inside is
    /// rolled back and the error is returned.
    fn run_transaction(
        &mut self,
        edits: &mut dyn FnMut(&mut dyn EditorSurface) -> Result<(), WeaveError>,
    ) -> Result<(), WeaveError>;

    fn is_text_node(&self, node: NodeId) -> bool;

    /// Text of a text node.
    fn text_of(&self, node: NodeId) -> Option<String>;

    fn child_count(&self, node: NodeId) -> usize;

    fn child_at(&self, node: NodeId, index: usize) -> Option<NodeId>;

    /// First element in document order whose attribute `name` equals `value`.
    fn find_by_attr(&self, name: &str, value: &str) -> Option<NodeId>;

    fn attr(&self, node: NodeId, name: &str) -> Option<String>;

    fn set_attr(&mut self, node: NodeId, name: &str, value: &str) -> Result<(), WeaveError>;

    fn remove_attr(&mut self, node: NodeId, name: &str) -> Result<(), WeaveError>;

    /// Replace an element with its children in place.
    fn unwrap_node(&mut self, node: NodeId) -> Result<(), WeaveError>;

    /// Nearest ancestor (the node itself included) carrying `class`.
    fn closest_with_class(&self, node: NodeId, class: &str) -> Option<NodeId>;

    /// Bounding rectangle of the selection in surface-local coordinates.
    fn selection_rect(&self) -> Option<Rect>;

    /// Where the surface sits in the host viewport, when it is framed or
    /// inline-positioned. `None` means selection coordinates are already
    /// viewport coordinates.
    fn frame_rect(&self) -> Option<Rect>;
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

/// The word-character run around the caret.
///
/// When the caret sits in an element rather than a text node, the child
/// just before it stands in, with the caret placed at that text's end;
/// a non-text stand-in means no word. Returns `None` when there is no
/// selection or no usable text node. A caret touching no word character
/// still returns a hit, with an empty run collapsed at the caret.
pub fn word_at_caret(surface: &dyn EditorSurface) -> Option<WordHit> {
    let sel = surface.selection()?;
    let mut node = sel.start.node;
    let mut offset = sel.start.offset;

    if !surface.is_text_node(node) {
        let count = surface.child_count(node);
        if count == 0 || offset == 0 {
            return None;
        }
        let candidate = surface.child_at(node, (offset - 1).min(count - 1))?;
        if !surface.is_text_node(candidate) {
            return None;
        }
        node = candidate;
        offset = surface.text_of(candidate)?.chars().count();
    }

    let text = surface.text_of(node)?;
    let chars: Vec<char> = text.chars().collect();
    let offset = offset.min(chars.len());

    let mut start = offset;
    while start > 0 && is_word_char(chars[start - 1]) {
        start -= 1;
    }
    let mut end = offset;
    while end < chars.len() && is_word_char(chars[end]) {
        end += 1;
    }

    Some(WordHit {
        node,
        start,
        end,
        text: chars[start..end].iter().collect(),
    })
}

/// Viewport point just under the selection, for anchoring a popover.
///
/// Framed surfaces get the selection rectangle translated by the frame
/// origin; `gap` is added below the selection's bottom edge.
pub fn anchor_point(surface: &dyn EditorSurface, gap: f64) -> Option<Point> {
    let rect = surface.selection_rect()?;
    Some(match surface.frame_rect() {
        Some(frame) => Point {
            x: frame.left + rect.left,
            y: frame.top + rect.bottom + gap,
        },
        None => Point {
            x: rect.left,
            y: rect.bottom + gap,
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_word_at_caret_middle_of_word() {
        let mut surface = BufferSurface::new("<p>ice cream castle</p>");
        assert!(surface.place_caret_after("cre"));
        let hit = word_at_caret(&surface).expect("hit");
        assert_eq!(hit.text, "cream");
        assert_eq!((hit.start, hit.end), (4, 9));
    }

    #[test]
    fn test_word_at_caret_at_word_end() {
        let mut surface = BufferSurface::new("<p>ice cream</p>");
        assert!(surface.place_caret_after("cream"));
        let hit = word_at_caret(&surface).expect("hit");
        assert_eq!(hit.text, "cream");
    }

    #[test]
    fn test_word_at_caret_between_words_is_empty() {
        let mut surface = BufferSurface::new("<p>ice cream</p>");
        assert!(surface.place_caret_after("ice "));
        // Caret right before 'c': run extends right only.
        let hit = word_at_caret(&surface).expect("hit");
        assert_eq!(hit.text, "cream");

        assert!(surface.place_caret_after("ice"));
        let hit = word_at_caret(&surface).expect("hit");
        assert_eq!(hit.text, "ice");
    }

    #[test]
    fn test_word_at_caret_on_whitespace_only() {
        let mut surface = BufferSurface::new("<p>a  b</p>");
        // Between the two spaces: no word characters on either side.
        assert!(surface.place_caret_after("a "));
        let hit = word_at_caret(&surface).expect("hit");
        assert_eq!(hit.text, "");
        assert_eq!(hit.start, hit.end);
    }

    #[test]
    fn test_word_at_caret_element_falls_back_to_preceding_text() {
        let mut surface = BufferSurface::new("<p>tavern<br></p>");
        let p = surface.first_element("p").expect("p");
        surface
            .set_selection(SelectionRange::collapsed(Caret::new(p, 1)))
            .expect("selection");
        let hit = word_at_caret(&surface).expect("hit");
        assert_eq!(hit.text, "tavern");
    }

    #[test]
    fn test_word_at_caret_element_with_non_text_candidate() {
        let mut surface = BufferSurface::new("<p><br>after</p>");
        let p = surface.first_element("p").expect("p");
        surface
            .set_selection(SelectionRange::collapsed(Caret::new(p, 1)))
            .expect("selection");
        assert!(word_at_caret(&surface).is_none());
    }

    #[test]
    fn test_word_at_caret_element_offset_zero() {
        let mut surface = BufferSurface::new("<p>text</p>");
        let p = surface.first_element("p").expect("p");
        surface
            .set_selection(SelectionRange::collapsed(Caret::new(p, 0)))
            .expect("selection");
        assert!(word_at_caret(&surface).is_none());
    }

    #[test]
    fn test_word_at_caret_without_selection() {
        let surface = BufferSurface::new("<p>text</p>");
        assert!(word_at_caret(&surface).is_none());
    }

    #[test]
    fn test_word_at_caret_accepts_accents_digits_underscore() {
        let mut surface = BufferSurface::new("<p>voir élyssa_2 demain</p>");
        assert!(surface.place_caret_after("élys"));
        let hit = word_at_caret(&surface).expect("hit");
        assert_eq!(hit.text, "élyssa_2");
    }

    #[test]
    fn test_anchor_point_unframed() {
        let mut surface = BufferSurface::new("<p>hello</p>");
        assert!(surface.place_caret_after("hello"));
        let anchor = anchor_point(&surface, 6.0).expect("anchor");
        let rect = surface.selection_rect().expect("rect");
        assert_eq!(anchor.x, rect.left);
        assert_eq!(anchor.y, rect.bottom + 6.0);
    }

    #[test]
    fn test_anchor_point_translated_by_frame() {
        let mut surface = BufferSurface::new("<p>hello</p>");
        assert!(surface.place_caret_after("hello"));
        let base = anchor_point(&surface, 6.0).expect("anchor");
        surface.set_frame_origin(Some(Point { x: 100.0, y: 40.0 }));
        let framed = anchor_point(&surface, 6.0).expect("anchor");
        assert_eq!(framed.x, base.x + 100.0);
        assert_eq!(framed.y, base.y + 40.0);
    }

    #[test]
    fn test_anchor_point_needs_a_selection() {
        let surface = BufferSurface::new("<p>hello</p>");
        assert!(anchor_point(&surface, 6.0).is_none());
    }
}
