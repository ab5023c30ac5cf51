//! Cleanup after removals: restore lost parts, refill emptied contents,
//! drop emptied spoilers.

use crate::editor::PostFixer;
use crate::error::SpoilerError;
use crate::model::{Change, ChangeKind, NodeId, NodeKind, Position, TreeNode, Writer};

use super::{content_of, is_spoiler_empty, title_of};

/// Post-fixer registered by the spoiler plugin.
#[derive(Debug, Clone, Copy, Default)]
pub struct SpoilerPostFixer;

impl PostFixer for SpoilerPostFixer {
    fn fix(&self, writer: &mut Writer, changes: &[Change]) -> Result<bool, SpoilerError> {
        let doc = writer.document();
        let mut touched: Vec<NodeId> = Vec::new();
        for change in changes {
            if change.kind != ChangeKind::Remove || !doc.contains(change.parent) {
                continue;
            }
            if let Some(spoiler) = doc.find_ancestor(change.parent, NodeKind::Spoiler) {
                if !touched.contains(&spoiler) {
                    touched.push(spoiler);
                }
            }
        }

        let mut fixed = false;
        for spoiler in touched {
            let doc = writer.document();
            if !doc.contains(spoiler) || doc.parent(spoiler).is_none() {
                continue;
            }
            fixed |= restore_parts(writer, spoiler)?;
            if let Some(content) = content_of(writer.document(), spoiler) {
                if writer.document().children(content).is_empty() {
                    writer.insert(&TreeNode::empty_paragraph(), Position::at_start(content))?;
                    fixed = true;
                }
            }
            if is_spoiler_empty(writer.document(), spoiler) {
                trace!(spoiler = spoiler.index(), "empty spoiler removed");
                writer.remove(spoiler)?;
                fixed = true;
            }
        }
        Ok(fixed)
    }
}

/// Put back a title or content removed from the spoiler.
fn restore_parts(writer: &mut Writer, spoiler: NodeId) -> Result<bool, SpoilerError> {
    let mut fixed = false;
    if title_of(writer.document(), spoiler).is_none() {
        trace!(spoiler = spoiler.index(), "title restored");
        let title = TreeNode::element(NodeKind::SpoilerTitle, vec![]);
        writer.insert(&title, Position::at_start(spoiler))?;
        fixed = true;
    }
    if content_of(writer.document(), spoiler).is_none() {
        trace!(spoiler = spoiler.index(), "content restored");
        let content = TreeNode::element(NodeKind::SpoilerContent, vec![TreeNode::empty_paragraph()]);
        let end = writer.document().max_offset(spoiler);
        writer.insert(&content, Position::new(spoiler, end))?;
        fixed = true;
    }
    Ok(fixed)
}
