//! Builds an [`ArenaDom`] from html5ever's tree builder.

use std::borrow::Cow;
use std::cell::{Ref, RefCell};

use html5ever::driver::ParseOpts;
use html5ever::tendril::{StrTendril, TendrilSink};
use html5ever::tree_builder::{ElementFlags, NodeOrText, QuirksMode, TreeSink};
use html5ever::{Attribute as Html5Attribute, QualName, parse_document};

use super::arena::{ArenaDom, ArenaNodeData, ArenaNodeId, Attribute};

/// Tree builder target. Node ids double as html5ever handles.
///
/// `TreeSink` methods take `&self`, so the arena sits in a `RefCell`.
#[derive(Default)]
pub struct ArenaSink {
    dom: RefCell<ArenaDom>,
}

impl ArenaSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a complete document.
    pub fn parse(html: &str) -> ArenaDom {
        parse_document(Self::new(), ParseOpts::default())
            .from_utf8()
            .one(html.as_bytes())
    }

    fn insert(&self, parent: ArenaNodeId, child: NodeOrText<ArenaNodeId>) {
        let mut dom = self.dom.borrow_mut();
        match child {
            NodeOrText::AppendNode(node) => dom.append(parent, node),
            NodeOrText::AppendText(text) => dom.append_text(parent, &text),
        }
    }
}

fn convert_attrs(attrs: Vec<Html5Attribute>) -> impl Iterator<Item = Attribute> {
    attrs.into_iter().map(|a| Attribute {
        name: a.name,
        value: a.value.to_string(),
    })
}

impl TreeSink for ArenaSink {
    type Handle = ArenaNodeId;
    type Output = ArenaDom;
    type ElemName<'a>
        = Ref<'a, QualName>
    where
        Self: 'a;

    fn finish(self) -> ArenaDom {
        self.dom.into_inner()
    }

    fn parse_error(&self, _msg: Cow<'static, str>) {}

    fn get_document(&self) -> ArenaNodeId {
        self.dom.borrow().document()
    }

    fn elem_name<'a>(&'a self, target: &'a ArenaNodeId) -> Self::ElemName<'a> {
        static NONE: QualName = QualName {
            prefix: None,
            ns: html5ever::ns!(),
            local: html5ever::local_name!(""),
        };

        // The tree builder drops the name before its next mutating call, so
        // the shared borrow never overlaps a `borrow_mut`.
        Ref::map(self.dom.borrow(), |dom| match dom.get(*target).map(|n| &n.data) {
            Some(ArenaNodeData::Element { name, .. }) => name,
            _ => &NONE,
        })
    }

    fn create_element(&self, name: QualName, attrs: Vec<Html5Attribute>, _: ElementFlags) -> ArenaNodeId {
        let attrs = convert_attrs(attrs).collect();
        self.dom.borrow_mut().create_element(name, attrs)
    }

    fn create_comment(&self, text: StrTendril) -> ArenaNodeId {
        self.dom.borrow_mut().create_comment(text.to_string())
    }

    fn create_pi(&self, _target: StrTendril, data: StrTendril) -> ArenaNodeId {
        self.dom.borrow_mut().create_comment(data.to_string())
    }

    fn append(&self, parent: &ArenaNodeId, child: NodeOrText<ArenaNodeId>) {
        self.insert(*parent, child);
    }

    fn append_based_on_parent_node(
        &self,
        element: &ArenaNodeId,
        prev_element: &ArenaNodeId,
        child: NodeOrText<ArenaNodeId>,
    ) {
        let parent = self.dom.borrow().parent(*element);
        if parent.is_some() {
            self.append_before_sibling(element, child);
        } else {
            self.insert(*prev_element, child);
        }
    }

    fn append_doctype_to_document(&self, name: StrTendril, _: StrTendril, _: StrTendril) {
        let mut dom = self.dom.borrow_mut();
        let doctype = dom.create_doctype(name.to_string());
        let document = dom.document();
        dom.append(document, doctype);
    }

    fn get_template_contents(&self, target: &ArenaNodeId) -> ArenaNodeId {
        *target
    }

    fn same_node(&self, x: &ArenaNodeId, y: &ArenaNodeId) -> bool {
        x == y
    }

    fn set_quirks_mode(&self, _mode: QuirksMode) {}

    fn append_before_sibling(&self, sibling: &ArenaNodeId, new_node: NodeOrText<ArenaNodeId>) {
        let mut dom = self.dom.borrow_mut();
        let node = match new_node {
            NodeOrText::AppendNode(node) => node,
            NodeOrText::AppendText(text) => dom.create_text(text.to_string()),
        };
        dom.detach(node);
        dom.insert_before(*sibling, node);
    }

    fn add_attrs_if_missing(&self, target: &ArenaNodeId, attrs: Vec<Html5Attribute>) {
        let mut dom = self.dom.borrow_mut();
        for attr in convert_attrs(attrs) {
            let name = attr.name.local.to_string();
            if dom.get_attr(*target, &name).is_none() {
                dom.set_attr(*target, &name, &attr.value);
            }
        }
    }

    fn remove_from_parent(&self, target: &ArenaNodeId) {
        self.dom.borrow_mut().detach(*target);
    }

    fn reparent_children(&self, node: &ArenaNodeId, new_parent: &ArenaNodeId) {
        let mut dom = self.dom.borrow_mut();
        let children: Vec<_> = dom.children(*node).collect();
        for child in children {
            dom.detach(child);
            dom.append(*new_parent, child);
        }
    }
}
