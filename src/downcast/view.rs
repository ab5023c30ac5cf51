//! Editing view: the tree the user interacts with.
//!
//! Every element links back to the model node it renders. Widgets and nested
//! editables carry the decorations an editing surface expects
//! (`contenteditable`, widget classes, placeholders).

use std::collections::BTreeMap;

use super::escape::{escape_attribute, escape_text};
use super::{marker, ViewOptions};
use crate::editor::placeholder::PlaceholderRegistry;
use crate::model::{Document, NodeId, NodeKind};
use crate::spoiler;

pub const WIDGET_CLASS: &str = "ck-widget";
pub const WIDGET_SELECTED_CLASS: &str = "ck-widget_selected";
pub const EDITABLE_CLASS: &str = "ck-editor__editable";
pub const NESTED_EDITABLE_CLASS: &str = "ck-editor__nested-editable";
pub const PLACEHOLDER_CLASS: &str = "ck-placeholder";
pub const PLACEHOLDER_ATTRIBUTE: &str = "data-placeholder";
pub const FILLER_ATTRIBUTE: &str = "data-cke-filler";

/// How an element behaves in the editing surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewRole {
    /// The root editable.
    Editable,
    /// An ordinary block (paragraph, heading, quote).
    Block,
    LineBreak,
    /// An atomic, non-editable unit.
    Widget,
    /// An editable region inside a widget.
    NestedEditable,
    /// Keeps an empty block visible; not part of the content.
    Filler,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewNode {
    Element(ViewElement),
    Text(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewElement {
    pub name: &'static str,
    pub role: ViewRole,
    pub classes: Vec<String>,
    pub attributes: BTreeMap<String, String>,
    /// Model node rendered by this element.
    pub model: Option<NodeId>,
    pub children: Vec<ViewNode>,
}

impl ViewElement {
    pub fn new(name: &'static str, role: ViewRole) -> Self {
        Self {
            name,
            role,
            classes: Vec::new(),
            attributes: BTreeMap::new(),
            model: None,
            children: Vec::new(),
        }
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.classes.iter().any(|c| c == class)
    }

    pub fn add_class(&mut self, class: &str) {
        if !self.has_class(class) {
            self.classes.push(class.to_string());
        }
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }

    pub fn set_attribute(&mut self, name: &str, value: impl Into<String>) {
        self.attributes.insert(name.to_string(), value.into());
    }

    /// Element rendering the model node `model`.
    pub fn find(&self, model: NodeId) -> Option<&ViewElement> {
        if self.model == Some(model) {
            return Some(self);
        }
        self.child_elements().find_map(|child| child.find(model))
    }

    /// Every element (this one included) carrying `class`, in tree order.
    pub fn find_all_by_class(&self, class: &str) -> Vec<&ViewElement> {
        let mut found = Vec::new();
        self.collect_by_class(class, &mut found);
        found
    }

    fn collect_by_class<'a>(&'a self, class: &str, found: &mut Vec<&'a ViewElement>) {
        if self.has_class(class) {
            found.push(self);
        }
        for child in self.child_elements() {
            child.collect_by_class(class, found);
        }
    }

    fn child_elements(&self) -> impl Iterator<Item = &ViewElement> {
        self.children.iter().filter_map(|child| match child {
            ViewNode::Element(element) => Some(element),
            ViewNode::Text(_) => None,
        })
    }

    /// Placeholder text currently shown by this element.
    pub fn placeholder(&self) -> Option<&str> {
        if self.has_class(PLACEHOLDER_CLASS) {
            self.attribute(PLACEHOLDER_ATTRIBUTE)
        } else {
            None
        }
    }

    /// Concatenated text content.
    pub fn text(&self) -> String {
        let mut out = String::new();
        for child in &self.children {
            match child {
                ViewNode::Text(text) => out.push_str(text),
                ViewNode::Element(element) => out.push_str(&element.text()),
            }
        }
        out
    }

    /// HTML of this element, decorations included.
    pub fn to_html(&self) -> String {
        let mut out = String::new();
        self.write_html(&mut out);
        out
    }

    fn write_html(&self, out: &mut String) {
        out.push('<');
        out.push_str(self.name);
        if !self.classes.is_empty() {
            out.push_str(" class=\"");
            out.push_str(&escape_attribute(&self.classes.join(" ")));
            out.push('"');
        }
        for (name, value) in &self.attributes {
            out.push(' ');
            out.push_str(name);
            out.push_str("=\"");
            out.push_str(&escape_attribute(value));
            out.push('"');
        }
        out.push('>');
        if self.name == "br" {
            return;
        }
        for child in &self.children {
            match child {
                ViewNode::Text(text) => out.push_str(&escape_text(text, false, false)),
                ViewNode::Element(element) => element.write_html(out),
            }
        }
        out.push_str("</");
        out.push_str(self.name);
        out.push('>');
    }
}

/// Decorate `element` as a widget: atomic and not editable.
pub fn to_widget(element: &mut ViewElement, label: &str) {
    element.role = ViewRole::Widget;
    element.add_class(WIDGET_CLASS);
    element.set_attribute("contenteditable", "false");
    element.set_attribute("aria-label", label);
}

/// Decorate `element` as an editable region nested in a widget.
pub fn to_widget_editable(element: &mut ViewElement) {
    element.role = ViewRole::NestedEditable;
    element.add_class(EDITABLE_CLASS);
    element.add_class(NESTED_EDITABLE_CLASS);
    element.set_attribute("contenteditable", "true");
}

/// Show `text` as the placeholder of `element`.
pub fn show_placeholder(element: &mut ViewElement, text: &str) {
    element.set_attribute(PLACEHOLDER_ATTRIBUTE, text);
    element.add_class(PLACEHOLDER_CLASS);
}

/// Render the editing view of a whole document.
pub fn render(doc: &Document, placeholders: &PlaceholderRegistry, options: &ViewOptions) -> ViewElement {
    let ctx = RenderContext {
        doc,
        placeholders,
        options,
    };
    let mut root = ViewElement::new("div", ViewRole::Editable);
    root.add_class(EDITABLE_CLASS);
    root.set_attribute("contenteditable", "true");
    root.model = Some(doc.root());
    root.children = render_children(&ctx, doc.root());
    root
}

/// Everything a node needs to decide how it is rendered.
pub(crate) struct RenderContext<'a> {
    pub doc: &'a Document,
    pub placeholders: &'a PlaceholderRegistry,
    pub options: &'a ViewOptions,
}

fn render_children(ctx: &RenderContext, node: NodeId) -> Vec<ViewNode> {
    ctx.doc
        .children(node)
        .iter()
        .filter_map(|&child| render_node(ctx, child))
        .collect()
}

fn render_node(ctx: &RenderContext, node: NodeId) -> Option<ViewNode> {
    let kind = ctx.doc.kind(node)?;
    if kind == NodeKind::Text {
        return Some(ViewNode::Text(ctx.doc.text(node).to_string()));
    }
    let marker = marker(kind)?;

    let role = if kind == NodeKind::SoftBreak {
        ViewRole::LineBreak
    } else {
        ViewRole::Block
    };
    let mut element = ViewElement::new(marker.tag, role);
    if let Some(class) = marker.class {
        element.add_class(class);
    }
    element.model = Some(node);
    element.children = render_children(ctx, node);

    if kind.is_text_block() && ctx.doc.is_empty(node) {
        let mut filler = ViewElement::new("br", ViewRole::Filler);
        filler.set_attribute(FILLER_ATTRIBUTE, "true");
        element.children.push(ViewNode::Element(filler));
    }

    spoiler::convert::decorate_view(ctx, node, kind, &mut element);
    Some(ViewNode::Element(element))
}
