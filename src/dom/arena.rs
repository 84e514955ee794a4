//! Arena-based DOM for page markup.
//!
//! html5ever parses into this tree; the caption passes query it by tag, read
//! and set attributes, and splice figure markup into it before it is
//! serialized back to text.

use html5ever::{LocalName, QualName, ns};

/// Index of a node in its [`ArenaDom`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ArenaNodeId(u32);

impl ArenaNodeId {
    /// No node: the parent of the root, the sibling of an only child.
    pub const NONE: ArenaNodeId = ArenaNodeId(u32::MAX);

    pub fn is_some(&self) -> bool {
        *self != Self::NONE
    }

    pub fn is_none(&self) -> bool {
        *self == Self::NONE
    }

    fn index(self) -> Option<usize> {
        self.is_some().then_some(self.0 as usize)
    }
}

/// What a node holds.
#[derive(Debug, Clone)]
pub enum ArenaNodeData {
    Document,
    /// Attributes are kept in source order.
    Element { name: QualName, attrs: Vec<Attribute> },
    Text(String),
    Comment(String),
    Doctype { name: String },
}

#[derive(Debug, Clone)]
pub struct Attribute {
    pub name: QualName,
    pub value: String,
}

/// A node plus its tree links. Missing links are [`ArenaNodeId::NONE`].
#[derive(Debug)]
pub struct ArenaNode {
    pub data: ArenaNodeData,
    pub parent: ArenaNodeId,
    pub first_child: ArenaNodeId,
    pub last_child: ArenaNodeId,
    pub prev_sibling: ArenaNodeId,
    pub next_sibling: ArenaNodeId,
}

/// A document tree stored in a single vector.
///
/// Nodes are never freed. A detached node keeps its own subtree and can be
/// inserted again elsewhere; until then it is unreachable from the
/// document.
pub struct ArenaDom {
    nodes: Vec<ArenaNode>,
}

impl Default for ArenaDom {
    fn default() -> Self {
        Self::new()
    }
}

impl ArenaDom {
    /// An empty tree holding only the document node.
    pub fn new() -> Self {
        let mut dom = Self { nodes: Vec::new() };
        dom.push(ArenaNodeData::Document);
        dom
    }

    fn push(&mut self, data: ArenaNodeData) -> ArenaNodeId {
        let id = ArenaNodeId(self.nodes.len() as u32);
        self.nodes.push(ArenaNode {
            data,
            parent: ArenaNodeId::NONE,
            first_child: ArenaNodeId::NONE,
            last_child: ArenaNodeId::NONE,
            prev_sibling: ArenaNodeId::NONE,
            next_sibling: ArenaNodeId::NONE,
        });
        id
    }

    pub fn document(&self) -> ArenaNodeId {
        ArenaNodeId(0)
    }

    pub fn get(&self, id: ArenaNodeId) -> Option<&ArenaNode> {
        self.nodes.get(id.index()?)
    }

    pub fn get_mut(&mut self, id: ArenaNodeId) -> Option<&mut ArenaNode> {
        self.nodes.get_mut(id.index()?)
    }

    pub fn create_element(&mut self, name: QualName, attrs: Vec<Attribute>) -> ArenaNodeId {
        self.push(ArenaNodeData::Element { name, attrs })
    }

    /// Create an element in the HTML namespace.
    pub fn create_html_element(&mut self, local: &str) -> ArenaNodeId {
        self.create_element(html_name(local), Vec::new())
    }

    pub fn create_text(&mut self, text: String) -> ArenaNodeId {
        self.push(ArenaNodeData::Text(text))
    }

    pub fn create_comment(&mut self, text: String) -> ArenaNodeId {
        self.push(ArenaNodeData::Comment(text))
    }

    pub fn create_doctype(&mut self, name: String) -> ArenaNodeId {
        self.push(ArenaNodeData::Doctype { name })
    }

    // ------------------------------------------------------------------
    // Structure
    // ------------------------------------------------------------------

    /// Splice a free node between `prev` and `next` under `parent`.
    fn link(&mut self, node: ArenaNodeId, parent: ArenaNodeId, prev: ArenaNodeId, next: ArenaNodeId) {
        if let Some(n) = self.get_mut(node) {
            n.parent = parent;
            n.prev_sibling = prev;
            n.next_sibling = next;
        }
        match self.get_mut(prev) {
            Some(p) => p.next_sibling = node,
            None => {
                if let Some(p) = self.get_mut(parent) {
                    p.first_child = node;
                }
            }
        }
        match self.get_mut(next) {
            Some(n) => n.prev_sibling = node,
            None => {
                if let Some(p) = self.get_mut(parent) {
                    p.last_child = node;
                }
            }
        }
    }

    /// Make `child` the last child of `parent`. `child` must be detached.
    pub fn append(&mut self, parent: ArenaNodeId, child: ArenaNodeId) {
        let last = self.get(parent).map_or(ArenaNodeId::NONE, |p| p.last_child);
        self.link(child, parent, last, ArenaNodeId::NONE);
    }

    /// Put `node` right before `sibling`. `node` must be detached.
    pub fn insert_before(&mut self, sibling: ArenaNodeId, node: ArenaNodeId) {
        let Some(s) = self.get(sibling) else {
            return;
        };
        let (parent, prev) = (s.parent, s.prev_sibling);
        self.link(node, parent, prev, sibling);
    }

    /// Put `node` right after `sibling`. `node` must be detached.
    pub fn insert_after(&mut self, sibling: ArenaNodeId, node: ArenaNodeId) {
        let Some(s) = self.get(sibling) else {
            return;
        };
        let (parent, next) = (s.parent, s.next_sibling);
        self.link(node, parent, sibling, next);
    }

    /// Deep-copy a node of another tree into this one. The copy is detached.
    pub fn import(&mut self, source: &ArenaDom, node: ArenaNodeId) -> ArenaNodeId {
        let Some(n) = source.get(node) else {
            return ArenaNodeId::NONE;
        };
        let copy = self.push(n.data.clone());
        for child in source.children(node) {
            let child = self.import(source, child);
            self.append(copy, child);
        }
        copy
    }

    /// Append text, extending the last child if it already is text.
    pub fn append_text(&mut self, parent: ArenaNodeId, text: &str) {
        let last = self.get(parent).map_or(ArenaNodeId::NONE, |p| p.last_child);
        if let Some(ArenaNode {
            data: ArenaNodeData::Text(existing),
            ..
        }) = self.get_mut(last)
        {
            existing.push_str(text);
            return;
        }
        let node = self.create_text(text.to_string());
        self.append(parent, node);
    }

    /// Unlink a node from its parent and siblings, keeping its subtree.
    pub fn detach(&mut self, id: ArenaNodeId) {
        let Some(n) = self.get_mut(id) else {
            return;
        };
        let parent = std::mem::replace(&mut n.parent, ArenaNodeId::NONE);
        let prev = std::mem::replace(&mut n.prev_sibling, ArenaNodeId::NONE);
        let next = std::mem::replace(&mut n.next_sibling, ArenaNodeId::NONE);

        match self.get_mut(prev) {
            Some(p) => p.next_sibling = next,
            None => {
                if let Some(p) = self.get_mut(parent) {
                    p.first_child = next;
                }
            }
        }
        match self.get_mut(next) {
            Some(n) => n.prev_sibling = prev,
            None => {
                if let Some(p) = self.get_mut(parent) {
                    p.last_child = prev;
                }
            }
        }
    }

    /// Put `replacement` where `target` is and detach `target`.
    ///
    /// `replacement` may currently live inside `target`'s subtree; it is
    /// detached first so the splice never creates a cycle.
    pub fn replace(&mut self, target: ArenaNodeId, replacement: ArenaNodeId) {
        if target == replacement || self.parent(target).is_none() {
            return;
        }
        self.detach(replacement);
        self.insert_before(target, replacement);
        self.detach(target);
    }

    // ------------------------------------------------------------------
    // Traversal
    // ------------------------------------------------------------------

    /// Parent of a node, `NONE` for the root or detached nodes.
    pub fn parent(&self, id: ArenaNodeId) -> ArenaNodeId {
        self.get(id).map_or(ArenaNodeId::NONE, |n| n.parent)
    }

    fn first_child(&self, id: ArenaNodeId) -> ArenaNodeId {
        self.get(id).map_or(ArenaNodeId::NONE, |n| n.first_child)
    }

    fn next_sibling(&self, id: ArenaNodeId) -> ArenaNodeId {
        self.get(id).map_or(ArenaNodeId::NONE, |n| n.next_sibling)
    }

    pub fn children(&self, parent: ArenaNodeId) -> impl Iterator<Item = ArenaNodeId> + '_ {
        let first = self.first_child(parent);
        std::iter::successors(first.is_some().then_some(first), move |&id| {
            let next = self.next_sibling(id);
            next.is_some().then_some(next)
        })
    }

    /// Children that are elements, skipping text and comments.
    pub fn element_children(&self, parent: ArenaNodeId) -> impl Iterator<Item = ArenaNodeId> + '_ {
        self.children(parent).filter(move |&c| self.is_element(c))
    }

    /// Every node below `root` in document order (pre-order, left to right).
    pub fn descendants(&self, root: ArenaNodeId) -> Vec<ArenaNodeId> {
        let mut out = Vec::new();
        let mut id = self.first_child(root);
        while id.is_some() {
            out.push(id);

            let child = self.first_child(id);
            if child.is_some() {
                id = child;
                continue;
            }

            // Climb until a node with a next sibling, stopping at `root`.
            let mut up = id;
            id = ArenaNodeId::NONE;
            while up.is_some() && up != root {
                let next = self.next_sibling(up);
                if next.is_some() {
                    id = next;
                    break;
                }
                up = self.parent(up);
            }
        }
        out
    }

    /// First element with the given tag in the whole document.
    pub fn find_by_tag(&self, tag: &str) -> Option<ArenaNodeId> {
        self.descendants(self.document())
            .into_iter()
            .find(|&id| self.is_tag(id, tag))
    }

    /// All elements with the given tag under `root`, in document order.
    pub fn elements_by_tag(&self, root: ArenaNodeId, tag: &str) -> Vec<ArenaNodeId> {
        self.descendants(root)
            .into_iter()
            .filter(|&id| self.is_tag(id, tag))
            .collect()
    }

    // ------------------------------------------------------------------
    // Elements and text
    // ------------------------------------------------------------------

    pub fn element_name(&self, id: ArenaNodeId) -> Option<&LocalName> {
        match &self.get(id)?.data {
            ArenaNodeData::Element { name, .. } => Some(&name.local),
            _ => None,
        }
    }

    pub fn is_element(&self, id: ArenaNodeId) -> bool {
        self.element_name(id).is_some()
    }

    pub fn is_tag(&self, id: ArenaNodeId, tag: &str) -> bool {
        self.element_name(id).is_some_and(|n| n.as_ref() == tag)
    }

    fn attrs(&self, id: ArenaNodeId) -> &[Attribute] {
        match self.get(id).map(|n| &n.data) {
            Some(ArenaNodeData::Element { attrs, .. }) => attrs,
            _ => &[],
        }
    }

    pub fn get_attr(&self, id: ArenaNodeId, attr_name: &str) -> Option<&str> {
        self.attrs(id)
            .iter()
            .find(|a| a.name.local.as_ref() == attr_name)
            .map(|a| a.value.as_str())
    }

    /// Set an attribute. An existing value is overwritten in place; a new
    /// attribute goes last.
    pub fn set_attr(&mut self, id: ArenaNodeId, attr_name: &str, value: &str) {
        let Some(ArenaNode {
            data: ArenaNodeData::Element { attrs, .. },
            ..
        }) = self.get_mut(id)
        else {
            return;
        };

        match attrs.iter_mut().find(|a| a.name.local.as_ref() == attr_name) {
            Some(attr) => attr.value = value.to_string(),
            None => attrs.push(Attribute {
                name: QualName::new(None, ns!(), LocalName::from(attr_name)),
                value: value.to_string(),
            }),
        }
    }

    /// Add a class unless the element already has it.
    pub fn add_class(&mut self, id: ArenaNodeId, class: &str) {
        let classes = self.get_attr(id, "class").unwrap_or_default();
        if classes.split_whitespace().any(|c| c == class) {
            return;
        }
        let value = match classes.trim() {
            "" => class.to_string(),
            existing => format!("{existing} {class}"),
        };
        self.set_attr(id, "class", &value);
    }

    /// Content of a text node.
    pub fn text_content(&self, id: ArenaNodeId) -> Option<&str> {
        match &self.get(id)?.data {
            ArenaNodeData::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Concatenated text of every text node under `id`.
    pub fn text(&self, id: ArenaNodeId) -> String {
        self.descendants(id)
            .into_iter()
            .filter_map(|d| self.text_content(d))
            .collect()
    }
}

/// Qualified name for an element in the HTML namespace.
pub fn html_name(local: &str) -> QualName {
    QualName::new(None, ns!(html), LocalName::from(local))
}
