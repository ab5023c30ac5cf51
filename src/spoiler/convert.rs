// Spoiler converters.
//
//   data:  <div class="spoiler">
//            <h3 class="spoiler-title">…</h3>
//            <div class="spoiler-content">…</div>
//          </div>
//
// Upcast repairs what it finds: missing parts are synthesized, and anything
// else inside the container ends up in the content so no text is lost.

use markup5ever_rcdom::Handle;

use super::{
    CONTENT_CLASS, CONTENT_TAG, SPOILER_CLASS, SPOILER_TAG, TITLE_CLASS, TITLE_TAG,
};
use crate::downcast::view::{show_placeholder, to_widget, to_widget_editable, RenderContext};
use crate::downcast::{Marker, ViewElement};
use crate::model::{NodeId, NodeKind, TreeNode};
use crate::upcast::handlers::{all, has_class, inline, one};
use crate::upcast::wrap::wrap;
use crate::upcast::State;

pub(crate) fn marker(kind: NodeKind) -> Option<Marker> {
    let (tag, class) = match kind {
        NodeKind::Spoiler => (SPOILER_TAG, SPOILER_CLASS),
        NodeKind::SpoilerTitle => (TITLE_TAG, TITLE_CLASS),
        NodeKind::SpoilerContent => (CONTENT_TAG, CONTENT_CLASS),
        _ => return None,
    };
    Some(Marker {
        tag,
        class: Some(class),
    })
}

// ---------------------------------------------------------------------------
// Upcast
// ---------------------------------------------------------------------------

/// Convert a spoiler container element.
///
/// The first child with the title class is the title, the first with the
/// content class is the content; every other child is an extra.
pub(crate) fn upcast_spoiler(state: &mut State, handle: &Handle) -> TreeNode {
    let mut title: Option<TreeNode> = None;
    let mut content: Option<TreeNode> = None;
    let mut extras = Vec::new();

    for child in handle.children.borrow().iter() {
        if title.is_none() && has_class(child, TITLE_CLASS) {
            title = Some(TreeNode::element(
                NodeKind::SpoilerTitle,
                inline(state, child),
            ));
        } else if content.is_none() && has_class(child, CONTENT_CLASS) {
            content = Some(TreeNode::element(
                NodeKind::SpoilerContent,
                wrap(all(state, child)),
            ));
        } else {
            extras.extend(one(state, child));
        }
    }

    let mut children: Vec<TreeNode> = title.into_iter().chain(content).collect();
    children.extend(extras);
    normalize_structure(TreeNode::element(NodeKind::Spoiler, children))
}

/// Bring a spoiler subtree into shape: title first, content second, content
/// never empty. Stray children are moved into the content.
pub(crate) fn normalize_structure(spoiler: TreeNode) -> TreeNode {
    let mut title = None;
    let mut content = None;
    let mut stray = Vec::new();

    for child in spoiler.children {
        match child.kind {
            NodeKind::SpoilerTitle if title.is_none() => title = Some(child),
            NodeKind::SpoilerContent if content.is_none() => content = Some(child),
            NodeKind::SpoilerTitle | NodeKind::SpoilerContent => stray.extend(child.children),
            _ => stray.push(child),
        }
    }

    let title = title.unwrap_or_else(|| TreeNode::element(NodeKind::SpoilerTitle, vec![]));
    let mut content =
        content.unwrap_or_else(|| TreeNode::element(NodeKind::SpoilerContent, vec![]));
    content.children.extend(wrap(stray));
    if content.children.is_empty() {
        content.children.push(TreeNode::empty_paragraph());
    }

    TreeNode::element(NodeKind::Spoiler, vec![title, content])
}

/// Replacement for a spoiler where none is allowed: its title as a
/// paragraph (when it has text), then its content blocks.
pub(crate) fn unwrap_spoiler(spoiler: TreeNode) -> Vec<TreeNode> {
    let mut blocks = Vec::new();
    for child in spoiler.children {
        match child.kind {
            NodeKind::SpoilerTitle => {
                if !child.is_empty() {
                    blocks.push(TreeNode::paragraph(child.children));
                }
            }
            NodeKind::SpoilerContent => blocks.extend(child.children),
            _ => blocks.push(child),
        }
    }
    blocks
}

// ---------------------------------------------------------------------------
// Editing view
// ---------------------------------------------------------------------------

/// Widget decorations for spoiler elements; other kinds are left alone.
pub(crate) fn decorate_view(
    ctx: &RenderContext,
    node: NodeId,
    kind: NodeKind,
    element: &mut ViewElement,
) {
    let doc = ctx.doc;
    match kind {
        NodeKind::Spoiler => {
            to_widget(element, &ctx.options.widget_label);
            if doc.selection().selected_element(doc) == Some(node) {
                element.add_class(crate::downcast::view::WIDGET_SELECTED_CLASS);
            }
        }
        NodeKind::SpoilerTitle => {
            to_widget_editable(element);
            if doc.is_empty(node) {
                show_placeholder(element, &ctx.options.title_placeholder);
            }
        }
        NodeKind::SpoilerContent => {
            to_widget_editable(element);
            if ctx.placeholders.is_visible(doc, node) {
                show_placeholder(element, &ctx.options.content_placeholder);
            }
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::downcast::view::render;
    use crate::downcast::ViewOptions;
    use crate::editor::placeholder::PlaceholderRegistry;
    use crate::model::{Document, Selection};
    use pretty_assertions::assert_eq;

    fn canonical() -> TreeNode {
        TreeNode::element(
            NodeKind::Spoiler,
            vec![
                TreeNode::element(NodeKind::SpoilerTitle, vec![]),
                TreeNode::element(NodeKind::SpoilerContent, vec![TreeNode::empty_paragraph()]),
            ],
        )
    }

    #[test]
    fn test_normalize_reorders_and_fills() {
        let messy = TreeNode::element(
            NodeKind::Spoiler,
            vec![
                TreeNode::element(NodeKind::SpoilerContent, vec![]),
                TreeNode::text("loose"),
                TreeNode::element(NodeKind::SpoilerTitle, vec![TreeNode::text("T")]),
            ],
        );
        assert_eq!(
            normalize_structure(messy),
            TreeNode::element(
                NodeKind::Spoiler,
                vec![
                    TreeNode::element(NodeKind::SpoilerTitle, vec![TreeNode::text("T")]),
                    TreeNode::element(
                        NodeKind::SpoilerContent,
                        vec![TreeNode::paragraph(vec![TreeNode::text("loose")])]
                    ),
                ]
            )
        );
        assert_eq!(
            normalize_structure(TreeNode::element(NodeKind::Spoiler, vec![])),
            canonical()
        );
    }

    #[test]
    fn test_unwrap_spoiler_drops_empty_title() {
        assert_eq!(unwrap_spoiler(canonical()), vec![TreeNode::empty_paragraph()]);
    }

    #[test]
    fn test_view_decorations() {
        let doc = Document::from_children(vec![canonical()]);
        let content = doc.nodes_of_kind(NodeKind::SpoilerContent)[0];
        let mut placeholders = PlaceholderRegistry::new();
        placeholders.enable(content);

        let view = render(&doc, &placeholders, &ViewOptions::default());
        let spoiler = view.find_all_by_class(SPOILER_CLASS)[0];
        assert!(spoiler.has_class("ck-widget"));
        assert!(!spoiler.has_class("ck-widget_selected"));
        assert_eq!(spoiler.attribute("contenteditable"), Some("false"));
        assert_eq!(spoiler.attribute("aria-label"), Some("Spoiler"));

        let title = view.find_all_by_class(TITLE_CLASS)[0];
        assert_eq!(title.attribute("contenteditable"), Some("true"));
        assert_eq!(title.placeholder(), Some("Spoiler title"));

        let content_view = view.find(content).unwrap();
        assert!(content_view.has_class("ck-editor__nested-editable"));
        assert_eq!(content_view.placeholder(), Some("Spoiler content"));
    }

    #[test]
    fn test_selected_widget() {
        let mut doc = Document::from_children(vec![canonical()]);
        let spoiler = doc.child(doc.root(), 0).unwrap();
        let selection = Selection::on_node(&doc, spoiler).unwrap();
        let schema = crate::spoiler_schema();
        let mut changes = Vec::new();
        crate::model::Writer::new(&mut doc, &schema, &mut changes)
            .set_selection(selection)
            .unwrap();

        let view = render(&doc, &PlaceholderRegistry::new(), &ViewOptions::default());
        let element = view.find(spoiler).unwrap();
        assert!(element.has_class("ck-widget_selected"));
        let content = view.find_all_by_class(CONTENT_CLASS)[0];
        assert_eq!(content.placeholder(), None);
    }
}
