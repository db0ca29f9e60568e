//! In-memory [`EditorSurface`] over a parsed fragment.
//!
//! Backs every controller test and doubles as a reference for bridge
//! implementations. Layout is a fixed-metric approximation (uniform
//! character width, one line per top-level block), which is enough to
//! exercise anchor geometry deterministically. Selections whose endpoints
//! do not resolve to children of one shared parent are rejected.

use crate::error::WeaveError;
use crate::markup::dom::{Fragment, NodeId};

use super::{Caret, EditorSurface, Point, Rect, SelectionRange};

const CHAR_W: f64 = 8.0;
const LINE_H: f64 = 20.0;
const FRAME_W: f64 = 800.0;
const FRAME_H: f64 = 600.0;

struct Snapshot {
    frag: Fragment,
    selection: Option<SelectionRange>,
}

/// An editing surface holding its document in memory.
pub struct BufferSurface {
    frag: Fragment,
    /// Hidden container element; every document node lives under it, so
    /// carets always have a parent to resolve boundaries against.
    root: NodeId,
    selection: Option<SelectionRange>,
    frame_origin: Option<Point>,
    undo_stack: Vec<Snapshot>,
    redo_stack: Vec<Snapshot>,
    tx_depth: usize,
}

impl BufferSurface {
    pub fn new(markup: &str) -> Self {
        let mut frag = Fragment::new();
        let root = frag.new_element("div", Vec::new());
        frag.append_child(None, root);
        let donor = Fragment::parse(markup);
        for id in frag.adopt(&donor) {
            frag.append_child(Some(root), id);
        }
        Self {
            frag,
            root,
            selection: None,
            frame_origin: None,
            undo_stack: Vec::new(),
            redo_stack: Vec::new(),
            tx_depth: 0,
        }
    }

    /// Move the surface within the host viewport, `None` for an unframed
    /// surface whose coordinates are already viewport coordinates.
    pub fn set_frame_origin(&mut self, origin: Option<Point>) {
        self.frame_origin = origin;
    }

    /// First element with the given tag, document order.
    pub fn first_element(&self, tag: &str) -> Option<NodeId> {
        self.frag
            .walk()
            .into_iter()
            .filter(|&id| id != self.root)
            .find(|&id| self.frag.tag(id) == Some(tag))
    }

    /// Collapse the selection just past `needle` in the first text node
    /// containing it.
    pub fn place_caret_after(&mut self, needle: &str) -> bool {
        for id in self.frag.walk() {
            if let Some(text) = self.frag.text(id) {
                if let Some(byte) = text.find(needle) {
                    let offset = text[..byte + needle.len()].chars().count();
                    self.selection = Some(SelectionRange::collapsed(Caret::new(id, offset)));
                    return true;
                }
            }
        }
        false
    }

    /// Select `needle` within the first text node containing it.
    pub fn select_str(&mut self, needle: &str) -> bool {
        for id in self.frag.walk() {
            if let Some(text) = self.frag.text(id) {
                if let Some(byte) = text.find(needle) {
                    let start = text[..byte].chars().count();
                    let end = start + needle.chars().count();
                    self.selection =
                        Some(SelectionRange::new(Caret::new(id, start), Caret::new(id, end)));
                    return true;
                }
            }
        }
        false
    }

    /// Undo the most recent committed transaction.
    pub fn undo(&mut self) -> bool {
        match self.undo_stack.pop() {
            Some(snapshot) => {
                let current = Snapshot {
                    frag: std::mem::replace(&mut self.frag, snapshot.frag),
                    selection: self.selection,
                };
                self.redo_stack.push(current);
                self.selection = snapshot.selection;
                true
            }
            None => false,
        }
    }

    /// Reapply the most recently undone transaction.
    pub fn redo(&mut self) -> bool {
        match self.redo_stack.pop() {
            Some(snapshot) => {
                let current = Snapshot {
                    frag: std::mem::replace(&mut self.frag, snapshot.frag),
                    selection: self.selection,
                };
                self.undo_stack.push(current);
                self.selection = snapshot.selection;
                true
            }
            None => false,
        }
    }

    fn is_attached(&self, node: NodeId) -> bool {
        let mut current = node;
        loop {
            if current == self.root {
                return true;
            }
            match self.frag.parent(current) {
                Some(parent) => current = parent,
                None => return false,
            }
        }
    }

    fn validate_caret(&self, caret: Caret) -> Result<(), WeaveError> {
        if !self.frag.contains(caret.node) || !self.is_attached(caret.node) {
            return Err(WeaveError::Surface(
                "caret references a detached node".to_string(),
            ));
        }
        let limit = if self.frag.is_text(caret.node) {
            self.frag.char_len(caret.node).unwrap_or(0)
        } else {
            self.frag.children(caret.node).len()
        };
        if caret.offset > limit {
            return Err(WeaveError::Surface(format!(
                "caret offset {} out of range (max {})",
                caret.offset, limit
            )));
        }
        Ok(())
    }

    /// Top-level block holding `node`, or `None` for the container itself.
    fn block_of(&self, node: NodeId) -> Option<NodeId> {
        let mut current = node;
        loop {
            let parent = self.frag.parent(current)?;
            if parent == self.root {
                return Some(current);
            }
            current = parent;
        }
    }

    /// Characters between the start of `block` and the caret, document order.
    fn flat_offset(&self, block: NodeId, caret: Caret) -> usize {
        let mut col = 0;
        let mut stack = vec![block];
        while let Some(id) = stack.pop() {
            if id == caret.node {
                if self.frag.is_text(id) {
                    return col + caret.offset;
                }
                let kids = self.frag.children(id);
                let upto = caret.offset.min(kids.len());
                for &kid in &kids[..upto] {
                    col += self.frag.text_content_of(kid).chars().count();
                }
                return col;
            }
            match self.frag.text(id) {
                Some(text) => col += text.chars().count(),
                None => {
                    for &child in self.frag.children(id).iter().rev() {
                        stack.push(child);
                    }
                }
            }
        }
        col
    }

    fn caret_position(&self, caret: Caret) -> Point {
        match self.block_of(caret.node) {
            None => Point {
                x: 0.0,
                y: caret.offset.min(self.frag.children(self.root).len()) as f64 * LINE_H,
            },
            Some(block) => {
                let row = self.frag.sibling_index(block).unwrap_or(0);
                let col = self.flat_offset(block, caret);
                Point {
                    x: col as f64 * CHAR_W,
                    y: row as f64 * LINE_H,
                }
            }
        }
    }
}

struct Carved {
    parent: NodeId,
    gap: usize,
    removed: Vec<NodeId>,
}

/// Resolve a caret to a child boundary of its parent, splitting a text node
/// when the caret falls inside one. The `bool` reports whether a split
/// inserted a sibling.
fn boundary(frag: &mut Fragment, caret: Caret) -> Result<(NodeId, usize, bool), WeaveError> {
    if frag.is_text(caret.node) {
        let len = frag.char_len(caret.node).unwrap_or(0);
        let offset = caret.offset.min(len);
        let parent = frag
            .parent(caret.node)
            .ok_or_else(|| WeaveError::Surface("selection outside the document".to_string()))?;
        let index = frag
            .sibling_index(caret.node)
            .ok_or_else(|| WeaveError::Surface("selection outside the document".to_string()))?;
        if offset == 0 {
            Ok((parent, index, false))
        } else if offset == len {
            Ok((parent, index + 1, false))
        } else {
            frag.split_text(caret.node, offset);
            Ok((parent, index + 1, true))
        }
    } else if frag.is_element(caret.node) {
        let limit = frag.children(caret.node).len();
        Ok((caret.node, caret.offset.min(limit), false))
    } else {
        Err(WeaveError::Surface(
            "selection references a missing node".to_string(),
        ))
    }
}

/// Detach the selected slice, leaving a gap boundary to graft into. The
/// fragment is mutated; callers wanting atomicity work on a clone.
fn carve(frag: &mut Fragment, sel: SelectionRange) -> Result<Carved, WeaveError> {
    // Both carets in one text node: split around the covered characters.
    if sel.start.node == sel.end.node && frag.is_text(sel.start.node) {
        let node = sel.start.node;
        let len = frag.char_len(node).unwrap_or(0);
        let start = sel.start.offset.min(len);
        let end = sel.end.offset.min(len);
        if end < start {
            return Err(WeaveError::Surface(
                "selection end precedes its start".to_string(),
            ));
        }
        let parent = frag
            .parent(node)
            .ok_or_else(|| WeaveError::Surface("selection outside the document".to_string()))?;
        let index = frag
            .sibling_index(node)
            .ok_or_else(|| WeaveError::Surface("selection outside the document".to_string()))?;
        if start == end {
            let gap = if start == 0 {
                index
            } else if start == len {
                index + 1
            } else {
                frag.split_text(node, start);
                index + 1
            };
            return Ok(Carved {
                parent,
                gap,
                removed: Vec::new(),
            });
        }
        if end < len {
            frag.split_text(node, end);
        }
        let (removed, gap) = if start == 0 {
            frag.detach(node);
            (vec![node], index)
        } else {
            let mid = frag
                .split_text(node, start)
                .ok_or_else(|| WeaveError::Surface("text split failed".to_string()))?;
            frag.detach(mid);
            (vec![mid], index + 1)
        };
        return Ok(Carved {
            parent,
            gap,
            removed,
        });
    }

    // Separate nodes: both carets must resolve to boundaries of one parent.
    let (end_parent, mut end_idx, _) = boundary(frag, sel.end)?;
    let (start_parent, start_idx, start_split) = boundary(frag, sel.start)?;
    if start_parent != end_parent {
        return Err(WeaveError::Surface(
            "selection endpoints have different parents".to_string(),
        ));
    }
    if start_split && start_idx <= end_idx {
        end_idx += 1;
    }
    if end_idx < start_idx {
        return Err(WeaveError::Surface(
            "selection end precedes its start".to_string(),
        ));
    }
    let removed: Vec<NodeId> = frag.children(start_parent)[start_idx..end_idx].to_vec();
    for &id in &removed {
        frag.detach(id);
    }
    Ok(Carved {
        parent: start_parent,
        gap: start_idx,
        removed,
    })
}

impl EditorSurface for BufferSurface {
    fn content(&self) -> String {
        self.frag.html_of(self.frag.children(self.root))
    }

    fn selection(&self) -> Option<SelectionRange> {
        self.selection
    }

    fn set_selection(&mut self, range: SelectionRange) -> Result<(), WeaveError> {
        self.validate_caret(range.start)?;
        self.validate_caret(range.end)?;
        self.selection = Some(range);
        Ok(())
    }

    fn collapse_selection(&mut self, to_end: bool) {
        if let Some(sel) = self.selection {
            let caret = if to_end { sel.end } else { sel.start };
            self.selection = Some(SelectionRange::collapsed(caret));
        }
    }

    fn selected_markup(&self) -> String {
        match self.selection {
            Some(sel) => {
                let mut scratch = self.frag.clone();
                match carve(&mut scratch, sel) {
                    Ok(carved) => scratch.html_of(&carved.removed),
                    Err(_) => String::new(),
                }
            }
            None => String::new(),
        }
    }

    fn selected_text(&self) -> String {
        match self.selection {
            Some(sel) => {
                let mut scratch = self.frag.clone();
                match carve(&mut scratch, sel) {
                    Ok(carved) => carved
                        .removed
                        .iter()
                        .map(|&id| scratch.text_content_of(id))
                        .collect(),
                    Err(_) => String::new(),
                }
            }
            None => String::new(),
        }
    }

    fn splice(&mut self, markup: &str) -> Result<(), WeaveError> {
        let sel = self
            .selection
            .ok_or_else(|| WeaveError::Surface("no selection to replace".to_string()))?;
        let mut work = self.frag.clone();
        let carved = carve(&mut work, sel)?;
        let donor = Fragment::parse(markup);
        let imported = work.adopt(&donor);
        for (i, &id) in imported.iter().enumerate() {
            work.insert_child(Some(carved.parent), carved.gap + i, id);
        }
        self.frag = work;
        self.selection = Some(if imported.is_empty() {
            SelectionRange::collapsed(Caret::new(carved.parent, carved.gap))
        } else {
            SelectionRange::new(
                Caret::new(carved.parent, carved.gap),
                Caret::new(carved.parent, carved.gap + imported.len()),
            )
        });
        Ok(())
    }

    fn run_transaction(
        &mut self,
        edits: &mut dyn FnMut(&mut dyn EditorSurface) -> Result<(), WeaveError>,
    ) -> Result<(), WeaveError> {
        if self.tx_depth > 0 {
            return edits(self);
        }
        let snapshot = Snapshot {
            frag: self.frag.clone(),
            selection: self.selection,
        };
        self.tx_depth += 1;
        let result = edits(self);
        self.tx_depth -= 1;
        match result {
            Ok(()) => {
                self.undo_stack.push(snapshot);
                self.redo_stack.clear();
                Ok(())
            }
            Err(err) => {
                self.frag = snapshot.frag;
                self.selection = snapshot.selection;
                Err(err)
            }
        }
    }

    fn is_text_node(&self, node: NodeId) -> bool {
        self.frag.is_text(node)
    }

    fn text_of(&self, node: NodeId) -> Option<String> {
        self.frag.text(node).map(str::to_string)
    }

    fn child_count(&self, node: NodeId) -> usize {
        self.frag.children(node).len()
    }

    fn child_at(&self, node: NodeId, index: usize) -> Option<NodeId> {
        self.frag.children(node).get(index).copied()
    }

    fn find_by_attr(&self, name: &str, value: &str) -> Option<NodeId> {
        self.frag.first_with_attr(name, value)
    }

    fn attr(&self, node: NodeId, name: &str) -> Option<String> {
        self.frag.attr(node, name).map(str::to_string)
    }

    fn set_attr(&mut self, node: NodeId, name: &str, value: &str) -> Result<(), WeaveError> {
        if !self.frag.is_element(node) {
            return Err(WeaveError::Surface(
                "attribute target is not an element".to_string(),
            ));
        }
        self.frag.set_attr(node, name, value);
        Ok(())
    }

    fn remove_attr(&mut self, node: NodeId, name: &str) -> Result<(), WeaveError> {
        if !self.frag.is_element(node) {
            return Err(WeaveError::Surface(
                "attribute target is not an element".to_string(),
            ));
        }
        self.frag.remove_attr(node, name);
        Ok(())
    }

    fn unwrap_node(&mut self, node: NodeId) -> Result<(), WeaveError> {
        if node == self.root {
            return Err(WeaveError::Surface(
                "cannot unwrap the document container".to_string(),
            ));
        }
        if !self.frag.is_element(node) {
            return Err(WeaveError::Surface(
                "unwrap target is not an element".to_string(),
            ));
        }
        if let Some(sel) = self.selection {
            if sel.start.node == node || sel.end.node == node {
                self.selection = None;
            }
        }
        if self.frag.unwrap(node) {
            Ok(())
        } else {
            Err(WeaveError::Surface(
                "unwrap target is not attached".to_string(),
            ))
        }
    }

    fn closest_with_class(&self, node: NodeId, class: &str) -> Option<NodeId> {
        let mut current = Some(node);
        while let Some(id) = current {
            if id == self.root {
                return None;
            }
            if self.frag.has_class(id, class) {
                return Some(id);
            }
            current = self.frag.parent(id);
        }
        None
    }

    fn selection_rect(&self) -> Option<Rect> {
        let sel = self.selection?;
        let a = self.caret_position(sel.start);
        let b = self.caret_position(sel.end);
        Some(Rect {
            left: a.x.min(b.x),
            top: a.y.min(b.y),
            right: a.x.max(b.x),
            bottom: a.y.max(b.y) + LINE_H,
        })
    }

    fn frame_rect(&self) -> Option<Rect> {
        self.frame_origin.map(|origin| Rect {
            left: origin.x,
            top: origin.y,
            right: origin.x + FRAME_W,
            bottom: origin.y + FRAME_H,
        })
    }
}
