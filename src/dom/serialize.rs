//! HTML serializer for the arena DOM.
//!
//! Emits HTML5 syntax: void elements without a closing tag or trailing
//! slash, attribute values double-quoted, text escaped except inside
//! raw-text elements.

use super::arena::{ArenaDom, ArenaNodeData, ArenaNodeId};

const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "basefont", "bgsound", "br", "col", "embed", "frame", "hr", "img", "input",
    "keygen", "link", "meta", "param", "source", "track", "wbr",
];

const RAW_TEXT_ELEMENTS: &[&str] = &[
    "style",
    "script",
    "xmp",
    "iframe",
    "noembed",
    "noframes",
    "plaintext",
    "noscript",
];

/// Serialize the children of `id` (not the node itself).
pub fn serialize_children(dom: &ArenaDom, id: ArenaNodeId) -> String {
    let mut out = String::new();
    for child in dom.children(id) {
        write_node(dom, child, &mut out);
    }
    out
}

/// Serialize a node including its own tag.
pub fn serialize_node(dom: &ArenaDom, id: ArenaNodeId) -> String {
    let mut out = String::new();
    write_node(dom, id, &mut out);
    out
}

fn write_node(dom: &ArenaDom, id: ArenaNodeId, out: &mut String) {
    let Some(node) = dom.get(id) else {
        return;
    };

    match &node.data {
        ArenaNodeData::Document => {
            for child in dom.children(id) {
                write_node(dom, child, out);
            }
        }
        ArenaNodeData::Element { name, attrs } => {
            let tag = name.local.as_ref();
            out.push('<');
            out.push_str(tag);
            for attr in attrs {
                out.push(' ');
                if let Some(prefix) = &attr.name.prefix {
                    out.push_str(prefix.as_ref());
                    out.push(':');
                }
                out.push_str(attr.name.local.as_ref());
                out.push_str("=\"");
                escape_into(&attr.value, true, out);
                out.push('"');
            }
            out.push('>');

            if VOID_ELEMENTS.contains(&tag) {
                return;
            }

            // The parser drops one newline right after these start tags.
            if matches!(tag, "pre" | "textarea" | "listing")
                && let Some(first) = dom.children(id).next()
                && dom.text_content(first).is_some_and(|t| t.starts_with('\n'))
            {
                out.push('\n');
            }

            for child in dom.children(id) {
                write_node(dom, child, out);
            }

            out.push_str("</");
            out.push_str(tag);
            out.push('>');
        }
        ArenaNodeData::Text(text) => {
            let raw = dom
                .element_name(node.parent)
                .is_some_and(|p| RAW_TEXT_ELEMENTS.contains(&p.as_ref()));
            if raw {
                out.push_str(text);
            } else {
                escape_into(text, false, out);
            }
        }
        ArenaNodeData::Comment(text) => {
            out.push_str("<!--");
            out.push_str(text);
            out.push_str("-->");
        }
        ArenaNodeData::Doctype { name } => {
            out.push_str("<!DOCTYPE ");
            out.push_str(name);
            out.push('>');
        }
    }
}

/// Escape text for use as element content.
pub fn escape_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    escape_into(text, false, &mut out);
    out
}

fn escape_into(text: &str, attr_mode: bool, out: &mut String) {
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '\u{00A0}' => out.push_str("&nbsp;"),
            '"' if attr_mode => out.push_str("&quot;"),
            '<' if !attr_mode => out.push_str("&lt;"),
            '>' if !attr_mode => out.push_str("&gt;"),
            c => out.push(c),
        }
    }
}
