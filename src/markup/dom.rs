//! Tolerant HTML fragment tree for the mention/annotation micro-format.
//!
//! Covers the markup the editing surface actually produces: unknown tags pass
//! through untouched, unclosed elements close at end of input, a stray `<`
//! becomes text, comments and doctypes are skipped. Character references for
//! the five escape entities plus numeric references are resolved on parse and
//! re-escaped on serialization. Not a general HTML5 parser.

/// Handle to a node inside a [`Fragment`] arena.
///
/// Ids are only meaningful against the fragment that issued them; a fragment
/// replaced wholesale (undo restore) invalidates previously handed-out ids.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(usize);

#[derive(Debug, Clone, PartialEq)]
pub enum NodeKind {
    Element {
        tag: String,
        /// Attribute (name, value) pairs in source order, first occurrence wins.
        attrs: Vec<(String, String)>,
    },
    Text(String),
}

#[derive(Debug, Clone, PartialEq)]
struct Node {
    kind: NodeKind,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

/// A parsed markup fragment backed by an append-only node arena.
///
/// Detached nodes stay in the arena unreferenced; fragments live for one
/// parse-transform-serialize pass, so nothing reclaims them.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Fragment {
    nodes: Vec<Node>,
    roots: Vec<NodeId>,
}

/// Elements that never have children and serialize without a closing tag.
const VOID_TAGS: [&str; 13] = [
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source", "track",
    "wbr",
];

fn is_void(tag: &str) -> bool {
    VOID_TAGS.contains(&tag)
}

/// Escape `& < > " '` for embedding text in markup.
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}

/// Resolve character references. Unknown entities stay literal.
pub fn unescape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(pos) = rest.find('&') {
        out.push_str(&rest[..pos]);
        rest = &rest[pos..];
        let semi = rest[1..].find(';').filter(|&i| i <= 10);
        match semi.and_then(|i| decode_entity(&rest[1..1 + i]).map(|ch| (ch, i))) {
            Some((ch, i)) => {
                out.push(ch);
                rest = &rest[i + 2..];
            }
            None => {
                out.push('&');
                rest = &rest[1..];
            }
        }
    }
    out.push_str(rest);
    out
}

fn decode_entity(name: &str) -> Option<char> {
    match name {
        "amp" => Some('&'),
        "lt" => Some('<'),
        "gt" => Some('>'),
        "quot" => Some('"'),
        "apos" => Some('\''),
        "nbsp" => Some('\u{a0}'),
        _ => {
            let digits = name.strip_prefix('#')?;
            let code = match digits.strip_prefix(['x', 'X']) {
                Some(hex) => u32::from_str_radix(hex, 16).ok()?,
                None => digits.parse::<u32>().ok()?,
            };
            char::from_u32(code)
        }
    }
}

impl Fragment {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse markup into a fragment. Never fails; malformed input degrades
    /// to text or gets skipped per the module rules.
    pub fn parse(markup: &str) -> Self {
        let mut parser = Parser {
            frag: Fragment::new(),
            stack: Vec::new(),
        };
        let mut rest = markup;
        while !rest.is_empty() {
            match rest.find('<') {
                None => {
                    parser.push_text(rest);
                    break;
                }
                Some(0) => {
                    let after = &rest[1..];
                    if let Some(r) = after.strip_prefix("!--") {
                        rest = match r.find("-->") {
                            Some(i) => &r[i + 3..],
                            None => "",
                        };
                    } else if after.starts_with('!') {
                        rest = match after.find('>') {
                            Some(i) => &after[i + 1..],
                            None => "",
                        };
                    } else if let Some(r) = after.strip_prefix('/') {
                        rest = parser.close_tag(r);
                    } else if after.starts_with(|c: char| c.is_ascii_alphabetic()) {
                        rest = parser.open_tag(after);
                    } else {
                        parser.push_text("<");
                        rest = after;
                    }
                }
                Some(i) => {
                    parser.push_text(&rest[..i]);
                    rest = &rest[i..];
                }
            }
        }
        parser.frag
    }

    pub fn roots(&self) -> &[NodeId] {
        &self.roots
    }

    pub fn contains(&self, id: NodeId) -> bool {
        id.0 < self.nodes.len()
    }

    fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.0)
    }

    fn get_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(id.0)
    }

    pub fn is_text(&self, id: NodeId) -> bool {
        matches!(self.get(id), Some(n) if matches!(n.kind, NodeKind::Text(_)))
    }

    pub fn is_element(&self, id: NodeId) -> bool {
        matches!(self.get(id), Some(n) if matches!(n.kind, NodeKind::Element { .. }))
    }

    pub fn tag(&self, id: NodeId) -> Option<&str> {
        match &self.get(id)?.kind {
            NodeKind::Element { tag, .. } => Some(tag),
            NodeKind::Text(_) => None,
        }
    }

    pub fn text(&self, id: NodeId) -> Option<&str> {
        match &self.get(id)?.kind {
            NodeKind::Text(text) => Some(text),
            NodeKind::Element { .. } => None,
        }
    }

    /// Character count of a text node.
    pub fn char_len(&self, id: NodeId) -> Option<usize> {
        self.text(id).map(|t| t.chars().count())
    }

    pub fn set_text(&mut self, id: NodeId, text: &str) -> bool {
        match self.get_mut(id) {
            Some(node) => match &mut node.kind {
                NodeKind::Text(current) => {
                    *current = text.to_string();
                    true
                }
                NodeKind::Element { .. } => false,
            },
            None => false,
        }
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.get(id)?.parent
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        match self.get(id) {
            Some(node) => &node.children,
            None => &[],
        }
    }

    pub fn attr(&self, id: NodeId, name: &str) -> Option<&str> {
        match &self.get(id)?.kind {
            NodeKind::Element { attrs, .. } => attrs
                .iter()
                .find(|(n, _)| n == name)
                .map(|(_, v)| v.as_str()),
            NodeKind::Text(_) => None,
        }
    }

    pub fn set_attr(&mut self, id: NodeId, name: &str, value: &str) -> bool {
        match self.get_mut(id) {
            Some(node) => match &mut node.kind {
                NodeKind::Element { attrs, .. } => {
                    match attrs.iter_mut().find(|(n, _)| n == name) {
                        Some((_, v)) => *v = value.to_string(),
                        None => attrs.push((name.to_string(), value.to_string())),
                    }
                    true
                }
                NodeKind::Text(_) => false,
            },
            None => false,
        }
    }

    pub fn remove_attr(&mut self, id: NodeId, name: &str) -> bool {
        match self.get_mut(id) {
            Some(node) => match &mut node.kind {
                NodeKind::Element { attrs, .. } => {
                    let before = attrs.len();
                    attrs.retain(|(n, _)| n != name);
                    attrs.len() != before
                }
                NodeKind::Text(_) => false,
            },
            None => false,
        }
    }

    /// Whether the element's class attribute contains `token` as a
    /// whitespace-separated entry.
    pub fn has_class(&self, id: NodeId, token: &str) -> bool {
        match self.attr(id, "class") {
            Some(classes) => classes.split_whitespace().any(|t| t == token),
            None => false,
        }
    }

    pub fn new_text(&mut self, text: &str) -> NodeId {
        self.push_node(Node {
            kind: NodeKind::Text(text.to_string()),
            parent: None,
            children: Vec::new(),
        })
    }

    pub fn new_element(&mut self, tag: &str, attrs: Vec<(String, String)>) -> NodeId {
        self.push_node(Node {
            kind: NodeKind::Element {
                tag: tag.to_string(),
                attrs,
            },
            parent: None,
            children: Vec::new(),
        })
    }

    fn push_node(&mut self, node: Node) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(node);
        id
    }

    /// Insert `child` at `index` (clamped) under `parent`, or at root level
    /// when `parent` is `None`. The child must be detached.
    pub fn insert_child(&mut self, parent: Option<NodeId>, index: usize, child: NodeId) -> bool {
        if !self.contains(child) {
            return false;
        }
        if let Some(p) = parent {
            if !self.contains(p) {
                return false;
            }
        }
        self.nodes[child.0].parent = parent;
        let list = self.sibling_list_mut(parent);
        let index = index.min(list.len());
        list.insert(index, child);
        true
    }

    pub fn append_child(&mut self, parent: Option<NodeId>, child: NodeId) -> bool {
        let index = match parent {
            Some(p) => self.children(p).len(),
            None => self.roots.len(),
        };
        self.insert_child(parent, index, child)
    }

    /// Index of a node within its sibling list (children of its parent, or
    /// the root list).
    pub fn sibling_index(&self, id: NodeId) -> Option<usize> {
        let parent = self.get(id)?.parent;
        let list = match parent {
            Some(p) => &self.get(p)?.children,
            None => &self.roots,
        };
        list.iter().position(|&c| c == id)
    }

    fn sibling_list_mut(&mut self, parent: Option<NodeId>) -> &mut Vec<NodeId> {
        match parent {
            Some(p) => &mut self.nodes[p.0].children,
            None => &mut self.roots,
        }
    }

    /// Detach a node from its sibling list. The node stays in the arena.
    pub fn detach(&mut self, id: NodeId) {
        let parent = match self.get(id) {
            Some(node) => node.parent,
            None => return,
        };
        let list = self.sibling_list_mut(parent);
        list.retain(|&c| c != id);
        if let Some(node) = self.get_mut(id) {
            node.parent = None;
        }
    }

    /// Replace an element with its children in place, preserving their order.
    /// The inverse of wrapping; content reflows into the parent.
    pub fn unwrap(&mut self, id: NodeId) -> bool {
        if !self.is_element(id) {
            return false;
        }
        let index = match self.sibling_index(id) {
            Some(i) => i,
            None => return false,
        };
        let parent = self.nodes[id.0].parent;
        let children = self.nodes[id.0].children.clone();
        for &child in &children {
            self.nodes[child.0].parent = parent;
        }
        let list = self.sibling_list_mut(parent);
        list.splice(index..=index, children.iter().copied());
        let node = &mut self.nodes[id.0];
        node.children.clear();
        node.parent = None;
        true
    }

    /// Split a text node at a character offset. The left part stays in `id`,
    /// the right part becomes a new sibling immediately after it.
    pub fn split_text(&mut self, id: NodeId, char_offset: usize) -> Option<NodeId> {
        let text = self.text(id)?.to_string();
        let byte = text
            .char_indices()
            .map(|(i, _)| i)
            .chain(std::iter::once(text.len()))
            .nth(char_offset)?;
        let (left, right) = text.split_at(byte);
        let left = left.to_string();
        let right = right.to_string();
        let parent = self.parent(id);
        let index = self.sibling_index(id)?;
        self.set_text(id, &left);
        let right_id = self.new_text(&right);
        self.insert_child(parent, index + 1, right_id);
        Some(right_id)
    }

    /// All nodes in document order (depth-first, top to bottom).
    pub fn walk(&self) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack: Vec<NodeId> = self.roots.iter().rev().copied().collect();
        while let Some(id) = stack.pop() {
            out.push(id);
            if let Some(node) = self.get(id) {
                for &child in node.children.iter().rev() {
                    stack.push(child);
                }
            }
        }
        out
    }

    /// Elements carrying `token` in their class attribute, document order.
    pub fn elements_with_class(&self, token: &str) -> Vec<NodeId> {
        self.walk()
            .into_iter()
            .filter(|&id| self.has_class(id, token))
            .collect()
    }

    /// First element (document order) whose attribute `name` equals `value`.
    pub fn first_with_attr(&self, name: &str, value: &str) -> Option<NodeId> {
        self.walk()
            .into_iter()
            .find(|&id| self.attr(id, name) == Some(value))
    }

    /// Concatenated text of the whole fragment, markup stripped. No
    /// separators are inserted between adjacent nodes.
    pub fn text_content(&self) -> String {
        let mut out = String::new();
        self.collect_text(&self.roots, &mut out);
        out
    }

    /// Concatenated text of one subtree.
    pub fn text_content_of(&self, id: NodeId) -> String {
        let mut out = String::new();
        self.collect_text(&[id], &mut out);
        out
    }

    fn collect_text(&self, ids: &[NodeId], out: &mut String) {
        for &id in ids {
            match self.get(id) {
                Some(node) => match &node.kind {
                    NodeKind::Text(text) => out.push_str(text),
                    NodeKind::Element { .. } => self.collect_text(&node.children, out),
                },
                None => {}
            }
        }
    }

    /// Serialize the whole fragment back to markup.
    pub fn to_html(&self) -> String {
        self.html_of(&self.roots)
    }

    /// Serialize a list of subtrees in order.
    pub fn html_of(&self, ids: &[NodeId]) -> String {
        let mut out = String::new();
        for &id in ids {
            self.write_node(id, &mut out);
        }
        out
    }

    fn write_node(&self, id: NodeId, out: &mut String) {
        let node = match self.get(id) {
            Some(node) => node,
            None => return,
        };
        match &node.kind {
            NodeKind::Text(text) => out.push_str(&escape_html(text)),
            NodeKind::Element { tag, attrs } => {
                out.push('<');
                out.push_str(tag);
                for (name, value) in attrs {
                    out.push(' ');
                    out.push_str(name);
                    out.push_str("=\"");
                    out.push_str(&escape_html(value));
                    out.push('"');
                }
                out.push('>');
                if is_void(tag) {
                    return;
                }
                for &child in &node.children {
                    self.write_node(child, out);
                }
                out.push_str("</");
                out.push_str(tag);
                out.push('>');
            }
        }
    }

    /// Import another fragment's nodes into this arena, returning the new ids
    /// of its roots. The imported roots are detached; the caller grafts them
    /// with [`Fragment::insert_child`].
    pub fn adopt(&mut self, other: &Fragment) -> Vec<NodeId> {
        let base = self.nodes.len();
        let remap = |id: NodeId| NodeId(id.0 + base);
        for node in &other.nodes {
            self.nodes.push(Node {
                kind: node.kind.clone(),
                parent: node.parent.map(remap),
                children: node.children.iter().copied().map(remap).collect(),
            });
        }
        other.roots.iter().map(|&r| remap(r)).collect()
    }
}

struct Parser {
    frag: Fragment,
    stack: Vec<NodeId>,
}

impl Parser {
    fn push_text(&mut self, raw: &str) {
        if raw.is_empty() {
            return;
        }
        let text = unescape_html(raw);
        let parent = self.stack.last().copied();
        let list = match parent {
            Some(p) => self.frag.children(p),
            None => self.frag.roots(),
        };
        // Merge with a preceding text sibling so runs split by skipped
        // comments still come out as one node.
        if let Some(&last) = list.last() {
            if let Some(existing) = self.frag.text(last) {
                let merged = format!("{}{}", existing, text);
                self.frag.set_text(last, &merged);
                return;
            }
        }
        let id = self.frag.new_text(&text);
        self.frag.append_child(parent, id);
    }

    /// `rest` starts at the tag name, just past `<`.
    fn open_tag<'a>(&mut self, rest: &'a str) -> &'a str {
        let name_end = rest
            .find(|c: char| c.is_whitespace() || c == '>' || c == '/')
            .unwrap_or(rest.len());
        let tag = rest[..name_end].to_ascii_lowercase();
        let mut rest = &rest[name_end..];
        let mut attrs: Vec<(String, String)> = Vec::new();
        let mut self_closing = false;

        loop {
            rest = rest.trim_start();
            if rest.is_empty() {
                break;
            }
            if let Some(r) = rest.strip_prefix("/>") {
                rest = r;
                self_closing = true;
                break;
            }
            if let Some(r) = rest.strip_prefix('>') {
                rest = r;
                break;
            }
            if let Some(r) = rest.strip_prefix('/') {
                rest = r;
                continue;
            }
            let name_end = rest
                .find(|c: char| c.is_whitespace() || c == '=' || c == '>' || c == '/')
                .unwrap_or(rest.len());
            if name_end == 0 {
                let mut chars = rest.chars();
                chars.next();
                rest = chars.as_str();
                continue;
            }
            let name = rest[..name_end].to_ascii_lowercase();
            rest = rest[name_end..].trim_start();
            let mut value = String::new();
            if let Some(r) = rest.strip_prefix('=') {
                let r = r.trim_start();
                if let Some(q) = r.strip_prefix('"') {
                    match q.find('"') {
                        Some(i) => {
                            value = unescape_html(&q[..i]);
                            rest = &q[i + 1..];
                        }
                        None => {
                            value = unescape_html(q);
                            rest = "";
                        }
                    }
                } else if let Some(q) = r.strip_prefix('\'') {
                    match q.find('\'') {
                        Some(i) => {
                            value = unescape_html(&q[..i]);
                            rest = &q[i + 1..];
                        }
                        None => {
                            value = unescape_html(q);
                            rest = "";
                        }
                    }
                } else {
                    let end = r
                        .find(|c: char| c.is_whitespace() || c == '>')
                        .unwrap_or(r.len());
                    value = unescape_html(&r[..end]);
                    rest = &r[end..];
                }
            }
            if !attrs.iter().any(|(n, _)| n == &name) {
                attrs.push((name, value));
            }
        }

        let id = self.frag.new_element(&tag, attrs);
        let parent = self.stack.last().copied();
        self.frag.append_child(parent, id);
        if !self_closing && !is_void(&tag) {
            self.stack.push(id);
        }
        rest
    }

    /// `rest` starts just past `</`.
    fn close_tag<'a>(&mut self, rest: &'a str) -> &'a str {
        let (inner, rest_after) = match rest.find('>') {
            Some(i) => (&rest[..i], &rest[i + 1..]),
            None => (rest, ""),
        };
        let name = inner
            .split_whitespace()
            .next()
            .unwrap_or("")
            .trim_end_matches('/')
            .to_ascii_lowercase();
        if let Some(pos) = self
            .stack
            .iter()
            .rposition(|&id| self.frag.tag(id) == Some(name.as_str()))
        {
            self.stack.truncate(pos);
        }
        rest_after
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_simple_structure() {
        let frag = Fragment::parse("<p>Hello <b>world</b></p>");
        assert_eq!(frag.roots().len(), 1);
        let p = frag.roots()[0];
        assert_eq!(frag.tag(p), Some("p"));
        assert_eq!(frag.children(p).len(), 2);
        assert_eq!(frag.text(frag.children(p)[0]), Some("Hello "));
        assert_eq!(frag.tag(frag.children(p)[1]), Some("b"));
        assert_eq!(frag.text_content(), "Hello world");
    }

    #[test]
    fn test_parse_attributes_preserve_order_first_wins() {
        let frag = Fragment::parse(r#"<span data-b="2" data-a="1" data-b="3">x</span>"#);
        let span = frag.roots()[0];
        assert_eq!(frag.attr(span, "data-b"), Some("2"));
        assert_eq!(frag.attr(span, "data-a"), Some("1"));
        assert_eq!(
            frag.to_html(),
            r#"<span data-b="2" data-a="1">x</span>"#
        );
    }

    #[test]
    fn test_parse_decodes_entities_in_text_and_attrs() {
        let frag = Fragment::parse(r#"<span title="a &amp; b">Tom &amp; Jerry &#39;s &lt;cat&gt;</span>"#);
        let span = frag.roots()[0];
        assert_eq!(frag.attr(span, "title"), Some("a & b"));
        assert_eq!(frag.text_content(), "Tom & Jerry 's <cat>");
    }

    #[test]
    fn test_parse_numeric_and_unknown_entities() {
        assert_eq!(unescape_html("&#233;t&#xE9;"), "été");
        // Unknown entity stays literal.
        assert_eq!(unescape_html("R&D; &bogus; &"), "R&D; &bogus; &");
    }

    #[test]
    fn test_unclosed_element_closes_at_end() {
        let frag = Fragment::parse("<p>open <em>forever");
        assert_eq!(frag.text_content(), "open forever");
        let p = frag.roots()[0];
        let em = frag.children(p)[1];
        assert_eq!(frag.tag(em), Some("em"));
        assert_eq!(frag.text_content_of(em), "forever");
    }

    #[test]
    fn test_stray_angle_bracket_is_text() {
        let frag = Fragment::parse("3 < 4 and <2");
        assert_eq!(frag.text_content(), "3 < 4 and <2");
    }

    #[test]
    fn test_comments_and_doctype_skipped() {
        let frag = Fragment::parse("<!DOCTYPE html><p>a<!-- hidden -->b</p>");
        assert_eq!(frag.text_content(), "ab");
        // The two runs around the comment merge into one text node.
        let p = frag.roots()[0];
        assert_eq!(frag.children(p).len(), 1);
    }

    #[test]
    fn test_void_elements_have_no_children() {
        let frag = Fragment::parse("<p>a<br>b</p>");
        let p = frag.roots()[0];
        assert_eq!(frag.children(p).len(), 3);
        let br = frag.children(p)[1];
        assert_eq!(frag.tag(br), Some("br"));
        assert!(frag.children(br).is_empty());
        assert_eq!(frag.to_html(), "<p>a<br>b</p>");
    }

    #[test]
    fn test_mismatched_close_ignored() {
        let frag = Fragment::parse("<p>a</div>b</p>");
        assert_eq!(frag.text_content(), "ab");
        assert_eq!(frag.to_html(), "<p>ab</p>");
    }

    #[test]
    fn test_misnested_tags_recover() {
        let frag = Fragment::parse("<b><i>x</b>y</i>");
        assert_eq!(frag.to_html(), "<b><i>x</i></b>y");
    }

    #[test]
    fn test_serializer_escapes_text_and_attrs() {
        let mut frag = Fragment::new();
        let span = frag.new_element(
            "span",
            vec![("title".to_string(), "say \"hi\" & go".to_string())],
        );
        frag.append_child(None, span);
        let text = frag.new_text("a < b");
        frag.append_child(Some(span), text);
        assert_eq!(
            frag.to_html(),
            r#"<span title="say &quot;hi&quot; &amp; go">a &lt; b</span>"#
        );
    }

    #[test]
    fn test_elements_with_class_matches_tokens() {
        let frag = Fragment::parse(
            r#"<p><span class="wv-entity selected">a</span><span class="wv-entityx">b</span><em class="x wv-entity">c</em></p>"#,
        );
        let hits = frag.elements_with_class("wv-entity");
        assert_eq!(hits.len(), 2);
        assert_eq!(frag.text_content_of(hits[0]), "a");
        assert_eq!(frag.text_content_of(hits[1]), "c");
    }

    #[test]
    fn test_first_with_attr_document_order() {
        let frag = Fragment::parse(r#"<p><i data-k="1">x</i></p><p data-k="1">y</p>"#);
        let hit = frag.first_with_attr("data-k", "1").expect("found");
        assert_eq!(frag.tag(hit), Some("i"));
    }

    #[test]
    fn test_unwrap_reflows_children_in_place() {
        let frag_src = r#"<p>a <span data-annotation-id="n1" class="wv-annotation">b <b>c</b></span> d</p>"#;
        let mut frag = Fragment::parse(frag_src);
        let span = frag.elements_with_class("wv-annotation")[0];
        assert!(frag.unwrap(span));
        assert_eq!(frag.to_html(), "<p>a b <b>c</b> d</p>");
        assert_eq!(frag.text_content(), "a b c d");
    }

    #[test]
    fn test_unwrap_root_level_element() {
        let mut frag = Fragment::parse("<span>a<b>b</b></span>");
        let span = frag.roots()[0];
        assert!(frag.unwrap(span));
        assert_eq!(frag.to_html(), "a<b>b</b>");
        assert_eq!(frag.roots().len(), 2);
    }

    #[test]
    fn test_split_text_at_char_offset() {
        let mut frag = Fragment::parse("<p>héllo</p>");
        let p = frag.roots()[0];
        let text = frag.children(p)[0];
        let right = frag.split_text(text, 2).expect("split");
        assert_eq!(frag.text(text), Some("hé"));
        assert_eq!(frag.text(right), Some("llo"));
        assert_eq!(frag.children(p), &[text, right]);
        assert_eq!(frag.to_html(), "<p>héllo</p>");
    }

    #[test]
    fn test_split_text_out_of_range() {
        let mut frag = Fragment::parse("ab");
        let text = frag.roots()[0];
        assert!(frag.split_text(text, 3).is_none());
        assert!(frag.split_text(text, 2).is_some());
    }

    #[test]
    fn test_adopt_and_graft() {
        let mut frag = Fragment::parse("<p>start end</p>");
        let donor = Fragment::parse("<span>mid</span> ");
        let p = frag.roots()[0];
        let imported = frag.adopt(&donor);
        assert_eq!(imported.len(), 2);
        for (i, &id) in imported.iter().enumerate() {
            assert!(frag.insert_child(Some(p), 1 + i, id));
        }
        assert_eq!(frag.to_html(), "<p>start <span>mid</span> end</p>");
    }

    #[test]
    fn test_round_trip_preserves_escaping() {
        let input = r#"<p>Tom &amp; Jerry</p>"#;
        let frag = Fragment::parse(input);
        assert_eq!(frag.to_html(), input);
    }

    #[test]
    fn test_empty_input() {
        let frag = Fragment::parse("");
        assert!(frag.roots().is_empty());
        assert_eq!(frag.text_content(), "");
        assert_eq!(frag.to_html(), "");
    }

    mod prop_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn parse_never_panics(input in ".{0,200}") {
                let _ = Fragment::parse(&input);
            }

            #[test]
            fn serialize_reparse_is_a_fixpoint(input in "[ -~]{0,120}") {
                let first = Fragment::parse(&input).to_html();
                let second = Fragment::parse(&first).to_html();
                prop_assert_eq!(first, second);
            }

            #[test]
            fn escape_unescape_round_trips(text in ".{0,80}") {
                prop_assert_eq!(unescape_html(&escape_html(&text)), text);
            }

            #[test]
            fn text_content_survives_serialization(words in proptest::collection::vec("[a-zA-Z&<>\"' ]{1,12}", 0..6)) {
                let mut frag = Fragment::new();
                let p = frag.new_element("p", vec![]);
                frag.append_child(None, p);
                let joined = words.join(" ");
                let text = frag.new_text(&joined);
                frag.append_child(Some(p), text);
                let back = Fragment::parse(&frag.to_html());
                prop_assert_eq!(back.text_content(), joined);
            }
        }
    }
}
