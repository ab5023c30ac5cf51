// Default editing behavior: what happens to an action no handler claimed.

use super::actions::{Direction, EditorAction};
use super::PostFixer;
use crate::error::SpoilerError;
use crate::model::{Change, NodeId, NodeKind, Position, Selection, TreeNode, Writer};

type Result<T> = std::result::Result<T, SpoilerError>;

/// Apply the host's default behavior for `action`.
pub(crate) fn apply_default(writer: &mut Writer, action: &EditorAction) -> Result<()> {
    match action {
        EditorAction::InsertText(text) => insert_text(writer, text),
        EditorAction::EnterHard => enter(writer),
        EditorAction::EnterSoft => soft_break(writer),
        EditorAction::Delete { direction } => delete(writer, *direction),
        EditorAction::SelectionChanged => Ok(()),
    }
}

/// Delete a non-collapsed selection. Returns the caret afterwards, or `None`
/// when the range could not be deleted.
fn collapse(writer: &mut Writer) -> Result<Option<Position>> {
    let selection = writer.document().selection();
    if !selection.is_collapsed() && !writer.delete_content(selection)? {
        return Ok(None);
    }
    Ok(Some(writer.document().selection().anchor))
}

/// The caret's position, if it sits in a text block.
fn caret_in_text_block(writer: &mut Writer) -> Result<Option<Position>> {
    let Some(pos) = collapse(writer)? else {
        return Ok(None);
    };
    let in_text_block = writer
        .document()
        .kind(pos.parent)
        .is_some_and(NodeKind::is_text_block);
    Ok(in_text_block.then_some(pos))
}

fn insert_text(writer: &mut Writer, text: &str) -> Result<()> {
    let Some(pos) = caret_in_text_block(writer)? else {
        return Ok(());
    };
    writer.insert_text(pos, text)?;
    let caret = Position::new(pos.parent, pos.offset + text.chars().count());
    writer.set_selection(Selection::collapsed(caret))
}

fn enter(writer: &mut Writer) -> Result<()> {
    let Some(pos) = caret_in_text_block(writer)? else {
        return Ok(());
    };
    if writer.document().kind(pos.parent) == Some(NodeKind::SpoilerTitle) {
        return Ok(());
    }
    let block = writer.split(pos)?;
    writer.set_selection(Selection::collapsed(Position::at_start(block)))
}

fn soft_break(writer: &mut Writer) -> Result<()> {
    let Some(pos) = caret_in_text_block(writer)? else {
        return Ok(());
    };
    let soft_break = TreeNode::element(NodeKind::SoftBreak, vec![]);
    writer.insert(&soft_break, pos)?;
    writer.set_selection(Selection::collapsed(Position::new(pos.parent, pos.offset + 1)))
}

fn delete(writer: &mut Writer, direction: Direction) -> Result<()> {
    let selection = writer.document().selection();
    if !selection.is_collapsed() {
        writer.delete_content(selection)?;
        return Ok(());
    }
    let pos = selection.anchor;
    let doc = writer.document();
    if !doc.kind(pos.parent).is_some_and(NodeKind::is_text_block) {
        return Ok(());
    }

    match direction {
        Direction::Backward if !pos.is_at_start() => {
            writer.remove_range(pos.parent, pos.offset - 1, pos.offset)?;
            writer.set_selection(Selection::collapsed(Position::new(pos.parent, pos.offset - 1)))
        }
        Direction::Forward if !pos.is_at_end(doc) => {
            writer.remove_range(pos.parent, pos.offset, pos.offset + 1)?;
            writer.set_selection(Selection::collapsed(pos))
        }
        _ => delete_at_boundary(writer, pos.parent, direction),
    }
}

/// Delete at the edge of a text block: merge with the neighbouring block,
/// select a neighbouring object, or step into a neighbouring container.
fn delete_at_boundary(writer: &mut Writer, block: NodeId, direction: Direction) -> Result<()> {
    let doc = writer.document();
    let sibling = match direction {
        Direction::Backward => doc.previous_sibling(block),
        Direction::Forward => doc.next_sibling(block),
    };
    let Some(sibling) = sibling else {
        return Ok(());
    };
    let Some(sibling_kind) = doc.kind(sibling) else {
        return Ok(());
    };
    let in_spoiler = doc
        .parent(block)
        .and_then(|p| doc.kind(p))
        .is_some_and(|k| k == NodeKind::Spoiler);

    if sibling_kind.is_text_block() && !in_spoiler {
        return match direction {
            Direction::Backward => {
                let caret = Position::at_end(doc, sibling);
                writer.merge(sibling, block)?;
                writer.set_selection(Selection::collapsed(caret))
            }
            Direction::Forward => {
                let caret = Position::at_end(doc, block);
                writer.merge(block, sibling)?;
                writer.set_selection(Selection::collapsed(caret))
            }
        };
    }

    if writer.schema().is_object(sibling_kind) {
        if let Some(selection) = Selection::on_node(doc, sibling) {
            writer.set_selection(selection)?;
        }
        return Ok(());
    }

    let target = match direction {
        Direction::Backward => doc
            .last_text_block(sibling)
            .map(|b| Position::at_end(doc, b)),
        Direction::Forward => doc.first_text_block(sibling).map(Position::at_start),
    };
    match target {
        Some(caret) => writer.set_selection(Selection::collapsed(caret)),
        None => Ok(()),
    }
}

/// Insert a block element at the selection.
///
/// An empty text block is replaced; at the start or end of a text block the
/// element goes before or after it; in the middle the block is split.
pub(crate) fn insert_block(writer: &mut Writer, tree: &TreeNode) -> Result<NodeId> {
    let pos = match collapse(writer)? {
        Some(pos) => pos,
        None => {
            let doc = writer.document();
            doc.selection().first(doc)
        }
    };
    insert_block_at(writer, tree, pos)
}

fn insert_block_at(writer: &mut Writer, tree: &TreeNode, pos: Position) -> Result<NodeId> {
    let doc = writer.document();
    let block = pos.parent;
    if !doc.kind(block).is_some_and(NodeKind::is_text_block) {
        return writer.insert(tree, pos);
    }
    let before = Position::before(doc, block).ok_or(SpoilerError::Detached(block))?;

    if doc.is_empty(block) {
        let id = writer.insert(tree, before)?;
        writer.remove(block)?;
        return Ok(id);
    }
    if pos.is_at_start() {
        return writer.insert(tree, before);
    }
    if pos.is_at_end(doc) {
        let after = Position::new(before.parent, before.offset + 1);
        return writer.insert(tree, after);
    }
    writer.split(pos)?;
    writer.insert(tree, Position::new(before.parent, before.offset + 1))
}

/// Keeps a paragraph in an otherwise empty root so the caret has a home.
#[derive(Debug, Default)]
pub struct RootPostFixer;

impl PostFixer for RootPostFixer {
    fn fix(&self, writer: &mut Writer, _changes: &[Change]) -> Result<bool> {
        let root = writer.document().root();
        if !writer.document().children(root).is_empty() {
            return Ok(false);
        }
        writer.insert(&TreeNode::empty_paragraph(), Position::at_start(root))?;
        trace!("root was empty, paragraph added");
        Ok(true)
    }
}
