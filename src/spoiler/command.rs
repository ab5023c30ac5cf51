//! The `insertSpoiler` command.

use crate::editor::typing::insert_block;
use crate::editor::{Command, Editor, PostCommitTask};
use crate::error::SpoilerError;
use crate::model::{Document, NodeKind, Position, Selection, TreeNode};
use crate::schema::Schema;

use super::{content_of, title_of};

/// A canonical new spoiler: empty title, content with one empty paragraph.
pub fn create_spoiler() -> TreeNode {
    TreeNode::element(
        NodeKind::Spoiler,
        vec![
            TreeNode::element(NodeKind::SpoilerTitle, vec![]),
            TreeNode::element(
                NodeKind::SpoilerContent,
                vec![TreeNode::empty_paragraph()],
            ),
        ],
    )
}

/// Inserts a spoiler at the selection and puts the caret in its title.
#[derive(Debug, Clone, Copy, Default)]
pub struct InsertSpoilerCommand;

impl Command for InsertSpoilerCommand {
    fn is_enabled(&self, doc: &Document, schema: &Schema) -> bool {
        let first = doc.selection().first(doc);
        schema
            .find_allowed_parent(doc, first, NodeKind::Spoiler)
            .is_some()
    }

    /// On while the selection is inside a spoiler.
    fn value(&self, doc: &Document) -> bool {
        let first = doc.selection().first(doc);
        doc.find_ancestor(first.parent, NodeKind::Spoiler).is_some()
    }

    fn execute(&self, editor: &mut Editor) -> Result<(), SpoilerError> {
        let spoiler = editor.change(|writer| {
            let spoiler = insert_block(writer, &create_spoiler())?;
            let title =
                title_of(writer.document(), spoiler).ok_or(SpoilerError::UnknownNode(spoiler))?;
            writer.set_selection(Selection::collapsed(Position::at_start(title)))?;
            Ok(spoiler)
        })?;
        trace!(spoiler = spoiler.index(), "spoiler inserted");

        if let Some(content) = content_of(editor.document(), spoiler) {
            editor.enqueue(PostCommitTask::EnablePlaceholder(content));
        }
        Ok(())
    }
}
