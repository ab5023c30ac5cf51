// Element handlers: one arm per HTML element (or element group).
//
// Each handler takes an html5ever node and returns zero or more model
// subtrees. Handlers only build trees; schema fitting happens afterwards.

use std::sync::LazyLock;

use markup5ever_rcdom::{Handle, NodeData};
use regex::Regex;

use super::wrap::{inline_only, wrap};
use super::{State, MAX_DEPTH};
use crate::model::{NodeKind, TreeNode};
use crate::spoiler::{self, SPOILER_CLASS, SPOILER_TAG};

/// ASCII whitespace as HTML defines it. Non-breaking spaces are not included.
static WHITESPACE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[ \t\n\r\x0C]+").expect("compile whitespace regex"));

// ---------------------------------------------------------------------------
// Dispatch
// ---------------------------------------------------------------------------

/// Convert all children of an HTML node.
pub(crate) fn all(state: &mut State, handle: &Handle) -> Vec<TreeNode> {
    if state.depth >= MAX_DEPTH {
        trace!(depth = state.depth, "nesting limit reached, subtree flattened");
        return flatten_text(handle);
    }
    state.depth += 1;
    let children = handle.children.borrow();
    let mut result = Vec::new();
    for child in children.iter() {
        let mut nodes = one(state, child);
        result.append(&mut nodes);
    }
    state.depth -= 1;
    result
}

/// Text of every descendant as one run, walked without recursion. Elements
/// other than phrasing content separate their text with a space.
fn flatten_text(handle: &Handle) -> Vec<TreeNode> {
    let mut text = String::new();
    let mut stack: Vec<Handle> = handle.children.borrow().iter().rev().cloned().collect();
    while let Some(node) = stack.pop() {
        match &node.data {
            NodeData::Text { contents } => text.push_str(&contents.borrow()),
            NodeData::Element { name, .. } => {
                let tag = name.local.as_ref();
                if is_ignored(tag) {
                    continue;
                }
                if !is_phrasing(tag) {
                    text.push(' ');
                }
                stack.extend(node.children.borrow().iter().rev().cloned());
            }
            _ => {}
        }
    }
    let text = WHITESPACE.replace_all(&text, " ");
    if text.trim_matches(' ').is_empty() {
        return vec![];
    }
    vec![TreeNode::text(text.into_owned())]
}

/// Elements whose content never reaches the document.
fn is_ignored(tag: &str) -> bool {
    matches!(
        tag,
        "applet" | "area" | "audio" | "base" | "basefont" | "bgsound" | "canvas" | "datalist"
            | "dialog" | "embed" | "frame" | "frameset" | "head" | "hr" | "iframe" | "img"
            | "input" | "link" | "math" | "meta" | "noembed" | "noframes" | "noscript"
            | "object" | "option" | "optgroup" | "param" | "script" | "select" | "source"
            | "style" | "svg" | "template" | "textarea" | "title" | "track" | "video"
    )
}

fn is_phrasing(tag: &str) -> bool {
    matches!(
        tag,
        "a" | "abbr" | "b" | "bdi" | "bdo" | "cite" | "code" | "data" | "dfn" | "em" | "i"
            | "kbd" | "mark" | "q" | "s" | "samp" | "small" | "span" | "strong" | "sub"
            | "sup" | "time" | "u" | "var"
    )
}

/// Convert the children of an HTML node to inline content only.
pub(crate) fn inline(state: &mut State, handle: &Handle) -> Vec<TreeNode> {
    inline_only(all(state, handle))
}

/// Convert a single HTML node.
pub(crate) fn one(state: &mut State, handle: &Handle) -> Vec<TreeNode> {
    match &handle.data {
        NodeData::Text { contents } => {
            let contents = contents.borrow();
            let text = WHITESPACE.replace_all(&contents, " ");
            if text.is_empty() {
                vec![]
            } else {
                vec![TreeNode::text(text.into_owned())]
            }
        }
        NodeData::Element { name, .. } => {
            let tag = name.local.as_ref();
            dispatch_element(state, handle, tag)
        }
        NodeData::Document => all(state, handle),
        _ => vec![],
    }
}

/// Route an element to its handler based on tag name.
fn dispatch_element(state: &mut State, handle: &Handle, tag: &str) -> Vec<TreeNode> {
    match tag {
        // Spoiler container (only once the plugin registered its kinds)
        _ if tag == SPOILER_TAG
            && has_class(handle, SPOILER_CLASS)
            && state.schema.is_registered(NodeKind::Spoiler) =>
        {
            vec![spoiler::convert::upcast_spoiler(state, handle)]
        }

        // Ignore: return nothing
        _ if is_ignored(tag) => vec![],

        // Text blocks
        "p" => vec![TreeNode::paragraph(inline(state, handle))],
        "h1" | "h2" | "h3" | "h4" | "h5" | "h6" => {
            let level = tag[1..].parse().unwrap_or(1);
            vec![TreeNode::element(
                NodeKind::heading(level),
                inline(state, handle),
            )]
        }

        // Containers
        "blockquote" => {
            let children = all(state, handle);
            vec![TreeNode::element(NodeKind::Quote, wrap(children))]
        }

        "br" => vec![TreeNode::element(NodeKind::SoftBreak, vec![])],

        // Flow wrappers: children wrapped as flow content
        "address" | "article" | "aside" | "body" | "center" | "dd" | "details" | "div"
        | "dl" | "dt" | "fieldset" | "figcaption" | "figure" | "footer" | "form"
        | "header" | "hgroup" | "html" | "legend" | "li" | "main" | "nav" | "ol"
        | "pre" | "section" | "summary" | "table" | "tbody" | "td" | "tfoot" | "th"
        | "thead" | "tr" | "ul" => {
            let children = all(state, handle);
            wrap(children)
        }

        // Inline formatting and unknown elements: recurse into children
        _ => all(state, handle),
    }
}

// ---------------------------------------------------------------------------
// Attribute helpers
// ---------------------------------------------------------------------------

/// Get the value of an attribute on an element node.
pub(crate) fn get_attr(handle: &Handle, name: &str) -> Option<String> {
    if let NodeData::Element { ref attrs, .. } = handle.data {
        for attr in attrs.borrow().iter() {
            if attr.name.local.as_ref() == name {
                return Some(attr.value.to_string());
            }
        }
    }
    None
}

/// Whether an element's `class` attribute lists `class`.
pub(crate) fn has_class(handle: &Handle, class: &str) -> bool {
    get_attr(handle, "class")
        .is_some_and(|value| value.split_ascii_whitespace().any(|c| c == class))
}
