// Spoiler plugin: a collapsible block made of a title and a content region.
//
//   spoiler (object)
//   ├── spoilerTitle    inline content, like a paragraph
//   └── spoilerContent  block content, no spoilers or quotes at any depth
//
// `convert` maps it to and from HTML and the editing view, `keys` adapts
// Enter/Delete at its boundaries, `postfix` removes spoilers emptied by an
// edit, and `command` inserts new ones.

pub mod command;
pub(crate) mod convert;
pub mod keys;
pub mod postfix;

use std::rc::Rc;

use crate::editor::actions::Priority;
use crate::editor::{Editor, Plugin, PostCommitTask};
use crate::model::{Document, NodeId, NodeKind};
use crate::schema::{Schema, SchemaContext, SchemaItem};

pub use command::InsertSpoilerCommand;
pub use keys::SpoilerKeys;
pub use postfix::SpoilerPostFixer;

pub const SPOILER_TAG: &str = "div";
pub const SPOILER_CLASS: &str = "spoiler";
pub const TITLE_TAG: &str = "h3";
pub const TITLE_CLASS: &str = "spoiler-title";
pub const CONTENT_TAG: &str = "div";
pub const CONTENT_CLASS: &str = "spoiler-content";

/// Name of the insert command.
pub const INSERT_SPOILER: &str = "insertSpoiler";
/// Name of the toolbar item bound to the insert command.
pub const TOOLBAR_ITEM: &str = "spoiler";

/// Register the spoiler kinds and their nesting rules.
pub fn register_schema(schema: &mut Schema) {
    schema.register(
        NodeKind::Spoiler,
        SchemaItem::new().allow_where(NodeKind::Paragraph).object(),
    );
    schema.register(
        NodeKind::SpoilerTitle,
        SchemaItem::new()
            .allow_in(NodeKind::Spoiler)
            .allow_content_of(NodeKind::Paragraph),
    );
    schema.register(
        NodeKind::SpoilerContent,
        SchemaItem::new()
            .allow_in(NodeKind::Spoiler)
            .allow_content_of(NodeKind::Root),
    );
    schema.add_child_check(forbid_in_content);
}

/// No spoilers or quotes anywhere inside a spoiler content.
fn forbid_in_content(ctx: &SchemaContext, child: NodeKind) -> Option<bool> {
    let forbidden = matches!(child, NodeKind::Spoiler | NodeKind::Quote);
    (forbidden && ctx.contains(NodeKind::SpoilerContent)).then_some(false)
}

pub fn title_of(doc: &Document, spoiler: NodeId) -> Option<NodeId> {
    doc.children(spoiler)
        .iter()
        .copied()
        .find(|&c| doc.kind(c) == Some(NodeKind::SpoilerTitle))
}

pub fn content_of(doc: &Document, spoiler: NodeId) -> Option<NodeId> {
    doc.children(spoiler)
        .iter()
        .copied()
        .find(|&c| doc.kind(c) == Some(NodeKind::SpoilerContent))
}

/// A spoiler with an empty title and a content holding one empty block.
pub fn is_spoiler_empty(doc: &Document, spoiler: NodeId) -> bool {
    let title_empty = title_of(doc, spoiler).is_none_or(|title| doc.is_empty(title));
    let content_empty = content_of(doc, spoiler).is_none_or(|content| {
        match doc.children(content) {
            [] => true,
            [only] => doc.is_empty(*only),
            _ => false,
        }
    });
    title_empty && content_empty
}

/// Registers the spoiler schema, converters, command, key handlers,
/// post-fixer and toolbar item.
#[derive(Debug, Clone, Copy, Default)]
pub struct SpoilerPlugin;

impl Plugin for SpoilerPlugin {
    fn name(&self) -> &'static str {
        "Spoiler"
    }

    fn init(&self, editor: &mut Editor) {
        register_schema(editor.schema_mut());
        editor.add_command(INSERT_SPOILER, Rc::new(InsertSpoilerCommand));
        editor.add_key_handler(Priority::High, Rc::new(SpoilerKeys));
        editor.add_post_fixer(Rc::new(SpoilerPostFixer));
        let label = editor.options().view.button_label.clone();
        editor.add_toolbar_item(TOOLBAR_ITEM, label, INSERT_SPOILER);
    }

    /// Loaded spoilers with a blank content show their placeholder.
    fn after_data_load(&self, editor: &mut Editor) {
        let doc = editor.document();
        let blank: Vec<NodeId> = doc
            .nodes_of_kind(NodeKind::SpoilerContent)
            .into_iter()
            .filter(|&content| crate::editor::placeholder::is_blank(doc, content))
            .collect();
        for content in blank {
            editor.enqueue(PostCommitTask::EnablePlaceholder(content));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::TreeNode;
    use crate::Options;

    fn spoiler(title: &str, blocks: Vec<TreeNode>) -> TreeNode {
        let title = if title.is_empty() {
            vec![]
        } else {
            vec![TreeNode::text(title)]
        };
        TreeNode::element(
            NodeKind::Spoiler,
            vec![
                TreeNode::element(NodeKind::SpoilerTitle, title),
                TreeNode::element(NodeKind::SpoilerContent, blocks),
            ],
        )
    }

    #[test]
    fn test_schema_rules() {
        let schema = crate::spoiler_schema();
        let root = SchemaContext::root();
        assert!(schema.check_child(&root, NodeKind::Spoiler));
        assert!(!schema.check_child(&root, NodeKind::SpoilerTitle));

        let in_spoiler = root.child(NodeKind::Spoiler);
        assert!(schema.check_child(&in_spoiler, NodeKind::SpoilerTitle));
        assert!(schema.check_child(&in_spoiler, NodeKind::SpoilerContent));
        assert!(!schema.check_child(&in_spoiler, NodeKind::Paragraph));

        let title = in_spoiler.child(NodeKind::SpoilerTitle);
        assert!(schema.check_child(&title, NodeKind::Text));
        assert!(schema.check_child(&title, NodeKind::SoftBreak));
        assert!(!schema.check_child(&title, NodeKind::Paragraph));

        let content = in_spoiler.child(NodeKind::SpoilerContent);
        assert!(schema.check_child(&content, NodeKind::Paragraph));
        assert!(schema.check_child(&content, NodeKind::Heading(4)));
        assert!(!schema.check_child(&content, NodeKind::Spoiler));
        assert!(!schema.check_child(&content, NodeKind::Quote));

        let deep = content.child(NodeKind::Paragraph);
        assert!(!schema.check_child(&deep, NodeKind::Spoiler));
    }

    #[test]
    fn test_spoiler_in_quote() {
        let schema = crate::spoiler_schema();
        let quote = SchemaContext::root().child(NodeKind::Quote);
        assert!(schema.check_child(&quote, NodeKind::Spoiler));
        assert!(schema.is_object(NodeKind::Spoiler));
        assert!(schema.is_limit(NodeKind::Spoiler));
    }

    #[test]
    fn test_is_spoiler_empty() {
        let doc = Document::from_children(vec![
            spoiler("", vec![TreeNode::empty_paragraph()]),
            spoiler("t", vec![TreeNode::empty_paragraph()]),
            spoiler("", vec![TreeNode::empty_paragraph(), TreeNode::empty_paragraph()]),
            spoiler("", vec![TreeNode::paragraph(vec![TreeNode::text("x")])]),
        ]);
        let spoilers = doc.nodes_of_kind(NodeKind::Spoiler);
        let empty: Vec<bool> = spoilers.iter().map(|&s| is_spoiler_empty(&doc, s)).collect();
        assert_eq!(empty, vec![true, false, false, false]);
    }

    #[test]
    fn test_plugin_registers_everything() {
        let editor = Editor::with_spoiler(Options::default());
        assert!(editor.has_plugin("Spoiler"));
        assert!(editor.schema().is_registered(NodeKind::Spoiler));
        assert!(editor.is_command_enabled(INSERT_SPOILER));
        let item = editor.toolbar_item(TOOLBAR_ITEM).unwrap();
        assert_eq!(item.label, "Insert spoiler");
        assert!(item.is_enabled);
    }

    #[test]
    fn test_loaded_blank_contents_show_placeholder() {
        let mut editor = Editor::with_spoiler(Options::default());
        editor.set_data(r#"<div class="spoiler"><h3 class="spoiler-title">T</h3></div>"#);
        let content = editor.document().nodes_of_kind(NodeKind::SpoilerContent)[0];
        assert!(editor.placeholders().is_active(content));
    }
}
