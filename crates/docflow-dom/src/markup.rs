//! Serialize a subtree back to markup.
//!
//! Vector graphics are handed to an external rasterizer as text. The
//! serializer escapes attribute values and character data but does not
//! otherwise sanitize: callers must hand the core well-formed vector markup.

use std::fmt::Write;

use crate::{NodeId, NodeKind, StyledTree};

/// Serialize `id` and its descendants as XML-compatible markup.
///
/// `<svg>` roots get the SVG namespace when none is declared, which the
/// common rasterizers require.
#[must_use]
pub fn serialize_subtree(tree: &StyledTree, id: NodeId) -> String {
    let mut out = String::new();
    write_node(tree, id, &mut out, true);
    out
}

fn write_node(tree: &StyledTree, id: NodeId, out: &mut String, is_root: bool) {
    let Some(node) = tree.get(id) else {
        return;
    };
    match &node.kind {
        NodeKind::Text(text) => out.push_str(&escape(text, false)),
        NodeKind::Element(element) => {
            let _ = write!(out, "<{}", element.tag_name);
            if is_root && element.tag_name == "svg" && element.attr("xmlns").is_none() {
                out.push_str(" xmlns=\"http://www.w3.org/2000/svg\"");
            }
            for (name, value) in &element.attrs {
                let _ = write!(out, " {name}=\"{}\"", escape(value, true));
            }
            if node.children.is_empty() {
                out.push_str("/>");
                return;
            }
            out.push('>');
            for &child in &node.children {
                write_node(tree, child, out, false);
            }
            let _ = write!(out, "</{}>", element.tag_name);
        }
    }
}

fn escape(text: &str, attribute: bool) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' if attribute => out.push_str("&quot;"),
            _ => out.push(ch),
        }
    }
    out
}
