//! Markup tree used by both caption passes.
//!
//! Page content is parsed with html5ever into an [`ArenaDom`]; the caption
//! passes work on that tree and [`Markup::to_html`] serializes it back.

mod arena;
mod serialize;
mod tree_sink;

pub use arena::{ArenaDom, ArenaNode, ArenaNodeData, ArenaNodeId, Attribute, html_name};
pub use serialize::{escape_text, serialize_children, serialize_node};
pub use tree_sink::ArenaSink;

/// Parsed page content plus the node whose children make up that content.
pub struct Markup {
    pub dom: ArenaDom,
    /// `<body>` for fragments, the document node for whole documents.
    pub root: ArenaNodeId,
}

impl Markup {
    /// Serialize the content back to text.
    pub fn to_html(&self) -> String {
        serialize_children(&self.dom, self.root)
    }
}

/// Parse page content.
///
/// Rendered pages are usually body fragments; those are parsed inside a
/// minimal document and [`Markup::root`] points at the `<body>`. Content
/// that is already a complete document keeps its doctype, head and body.
pub fn parse_fragment(html: &str) -> Markup {
    if is_whole_document(html) {
        let dom = parse_html(html);
        let root = dom.document();
        return Markup { dom, root };
    }

    let wrapped = format!("<!DOCTYPE html><html><head></head><body>{html}</body></html>");
    let dom = parse_html(&wrapped);
    let root = dom.find_by_tag("body").unwrap_or_else(|| dom.document());
    Markup { dom, root }
}

/// Parse a complete HTML document into an arena DOM.
pub fn parse_html(html: &str) -> ArenaDom {
    ArenaSink::parse(html)
}

fn is_whole_document(html: &str) -> bool {
    let head = html.trim_start().as_bytes();
    let starts_with = |prefix: &[u8]| {
        head.len() >= prefix.len() && head[..prefix.len()].eq_ignore_ascii_case(prefix)
    };
    starts_with(b"<!doctype") || starts_with(b"<html")
}
