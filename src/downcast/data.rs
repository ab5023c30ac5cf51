//! Data serializer: the compact HTML a document is saved as.
//!
//! No whitespace is written between blocks and no editing decorations are
//! added, so the output upcasts back to the same tree.

use super::escape::escape_text;
use super::{marker, DataOptions};
use crate::model::{Document, NodeId, NodeKind};

/// Serialize `node` (the root serializes its children only).
pub fn serialize(doc: &Document, node: NodeId, options: &DataOptions) -> String {
    let mut out = String::new();
    write_node(doc, node, options, &mut out);
    out
}

fn write_node(doc: &Document, node: NodeId, options: &DataOptions, out: &mut String) {
    let Some(kind) = doc.kind(node) else {
        return;
    };
    if kind == NodeKind::Root {
        write_children(doc, node, options, out);
        return;
    }
    if kind == NodeKind::Text {
        // Text is written by its block, which knows where lines start and end.
        out.push_str(&escape_text(doc.text(node), true, true));
        return;
    }
    let Some(marker) = marker(kind) else {
        return;
    };

    out.push('<');
    out.push_str(marker.tag);
    if let Some(class) = marker.class {
        out.push_str(" class=\"");
        out.push_str(class);
        out.push('"');
    }
    out.push('>');
    if kind == NodeKind::SoftBreak {
        return;
    }

    if kind.is_text_block() {
        write_inline(doc, node, options, out);
    } else {
        write_children(doc, node, options, out);
    }

    out.push_str("</");
    out.push_str(marker.tag);
    out.push('>');
}

fn write_children(doc: &Document, node: NodeId, options: &DataOptions, out: &mut String) {
    for &child in doc.children(node) {
        write_node(doc, child, options, out);
    }
}

/// Inline content of a text block.
fn write_inline(doc: &Document, block: NodeId, options: &DataOptions, out: &mut String) {
    if doc.is_empty(block) {
        if options.fill_empty_blocks {
            out.push_str("&nbsp;");
        }
        return;
    }

    let children = doc.children(block);
    for (i, &child) in children.iter().enumerate() {
        match doc.kind(child) {
            Some(NodeKind::Text) => {
                let is_break = |id: Option<&NodeId>| {
                    id.is_none_or(|&c| doc.kind(c) == Some(NodeKind::SoftBreak))
                };
                let at_line_start = is_break(i.checked_sub(1).and_then(|j| children.get(j)));
                let at_line_end = is_break(children.get(i + 1));
                out.push_str(&escape_text(doc.text(child), at_line_start, at_line_end));
            }
            Some(_) => write_node(doc, child, options, out),
            None => {}
        }
    }
}
