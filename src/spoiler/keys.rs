//! Enter/Delete/selection behavior at spoiler boundaries.

use crate::editor::actions::{EditorAction, Handling};
use crate::editor::{Editor, KeyHandler, PostCommitTask};
use crate::error::SpoilerError;
use crate::model::{Document, NodeId, NodeKind, Position, Selection, TreeNode};

use super::{content_of, is_spoiler_empty};

type Result<T> = std::result::Result<T, SpoilerError>;

/// Where the selection sits relative to a spoiler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Place {
    /// The spoiler itself is selected.
    OnSpoiler(NodeId),
    InTitle(NodeId),
    /// Inside the content; the block is the content's direct child holding
    /// the selection.
    InContent { spoiler: NodeId, block: NodeId },
}

fn locate(doc: &Document) -> Option<Place> {
    let selection = doc.selection();
    if let Some(node) = selection.selected_element(doc) {
        if doc.kind(node) == Some(NodeKind::Spoiler) {
            return Some(Place::OnSpoiler(node));
        }
    }

    let parent = selection.first(doc).parent;
    if doc.kind(parent) == Some(NodeKind::SpoilerTitle) {
        return doc.parent(parent).map(Place::InTitle);
    }
    let content = doc.find_ancestor(parent, NodeKind::SpoilerContent)?;
    let spoiler = doc.parent(content)?;
    let block = if parent == content {
        doc.node_at_offset(content, selection.first(doc).offset)?
    } else {
        std::iter::once(parent)
            .chain(doc.ancestors(parent))
            .find(|&n| doc.parent(n) == Some(content))?
    };
    Some(Place::InContent { spoiler, block })
}

/// Caret position at the start of the content's first block.
fn content_start(doc: &Document, spoiler: NodeId) -> Option<Position> {
    let content = content_of(doc, spoiler)?;
    doc.first_text_block(content).map(Position::at_start)
}

/// Key handler registered by the spoiler plugin.
#[derive(Debug, Clone, Copy, Default)]
pub struct SpoilerKeys;

impl KeyHandler for SpoilerKeys {
    fn handle(&self, editor: &mut Editor, action: &EditorAction) -> Result<Handling> {
        let Some(place) = locate(editor.document()) else {
            return Ok(Handling::NotHandled);
        };
        let collapsed = editor.selection().is_collapsed();

        let handled = match (action, place) {
            (EditorAction::SelectionChanged, Place::OnSpoiler(spoiler)) => {
                trace!(spoiler = spoiler.index(), "selection moved into content");
                move_to_content(editor, spoiler)?
            }
            (EditorAction::EnterHard, Place::InTitle(spoiler)) => {
                trace!(spoiler = spoiler.index(), "enter in title");
                move_to_content(editor, spoiler)?
            }
            (EditorAction::EnterSoft, Place::InTitle(spoiler)) => {
                trace!(spoiler = spoiler.index(), "paragraph before spoiler");
                paragraph_beside(editor, spoiler, false, None)?
            }
            (EditorAction::EnterHard, Place::InContent { spoiler, block }) if collapsed => {
                leave_content(editor, spoiler, block)?
            }
            (EditorAction::Delete { .. }, Place::InTitle(spoiler))
                if is_spoiler_empty(editor.document(), spoiler) =>
            {
                trace!(spoiler = spoiler.index(), "empty spoiler deleted");
                editor.change(|writer| writer.remove(spoiler))?;
                true
            }
            (EditorAction::Delete { .. }, Place::InContent { spoiler, .. }) => {
                if let Some(content) = content_of(editor.document(), spoiler) {
                    editor.enqueue(PostCommitTask::RefreshPlaceholder(content));
                }
                false
            }
            _ => false,
        };

        if !handled {
            return Ok(Handling::NotHandled);
        }
        editor.enqueue(PostCommitTask::ScrollToSelection);
        Ok(Handling::Handled)
    }
}

fn move_to_content(editor: &mut Editor, spoiler: NodeId) -> Result<bool> {
    let Some(caret) = content_start(editor.document(), spoiler) else {
        return Ok(false);
    };
    editor.set_selection(Selection::collapsed(caret))?;
    Ok(true)
}

/// Insert an empty paragraph next to the spoiler and put the caret there.
/// `remove` names a block that goes away in the same batch.
fn paragraph_beside(
    editor: &mut Editor,
    spoiler: NodeId,
    after: bool,
    remove: Option<NodeId>,
) -> Result<bool> {
    editor.change(|writer| {
        let doc = writer.document();
        let at = if after {
            Position::after(doc, spoiler)
        } else {
            Position::before(doc, spoiler)
        }
        .ok_or(SpoilerError::Detached(spoiler))?;

        let paragraph = writer.insert(&TreeNode::empty_paragraph(), at)?;
        writer.set_selection(Selection::collapsed(Position::at_start(paragraph)))?;
        if let Some(block) = remove {
            writer.remove(block)?;
        }
        Ok(true)
    })
}

/// Enter in the last, empty block of a content leaves the spoiler and drops
/// the block. An emptied content is refilled, or the whole spoiler removed,
/// by the post-fixer.
fn leave_content(editor: &mut Editor, spoiler: NodeId, block: NodeId) -> Result<bool> {
    let doc = editor.document();
    let is_last_empty = doc.kind(block).is_some_and(NodeKind::is_text_block)
        && doc.is_empty(block)
        && doc.next_sibling(block).is_none();
    if !is_last_empty {
        return Ok(false);
    }
    trace!(spoiler = spoiler.index(), "enter leaves spoiler");
    paragraph_beside(editor, spoiler, true, Some(block))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::editor::actions::{Key, KeyCombo};
    use crate::editor::ViewEvent;
    use crate::Options;
    use pretty_assertions::assert_eq;

    const LOADED: &str = concat!(
        r#"<div class="spoiler"><h3 class="spoiler-title">T</h3>"#,
        r#"<div class="spoiler-content"><p>one</p><p></p></div></div>"#
    );

    fn editor(html: &str) -> Editor {
        let mut editor = Editor::with_spoiler(Options::default());
        editor.set_data(html);
        editor
    }

    fn caret_in(editor: &mut Editor, kind: NodeKind, nth: usize, offset: usize) -> NodeId {
        let node = editor.document().nodes_of_kind(kind)[nth];
        editor
            .set_selection(Selection::collapsed(Position::new(node, offset)))
            .unwrap();
        node
    }

    fn spoiler_of(editor: &Editor) -> NodeId {
        editor.document().nodes_of_kind(NodeKind::Spoiler)[0]
    }

    #[test]
    fn test_enter_in_title_moves_to_content() {
        let mut editor = editor(LOADED);
        caret_in(&mut editor, NodeKind::SpoilerTitle, 0, 0);
        let version = editor.document().version();

        let handling = editor.handle_key(&KeyCombo::new(Key::Enter)).unwrap();
        assert_eq!(handling, Handling::Handled);

        let first = editor.document().nodes_of_kind(NodeKind::Paragraph)[0];
        assert_eq!(editor.selection(), Selection::collapsed(Position::at_start(first)));
        assert_eq!(editor.document().version(), version);
        assert_eq!(editor.get_data(), LOADED);
    }

    #[test]
    fn test_shift_enter_in_title_adds_paragraph_before() {
        let mut editor = editor(LOADED);
        caret_in(&mut editor, NodeKind::SpoilerTitle, 0, 1);
        editor.handle_key(&KeyCombo::shift(Key::Enter)).unwrap();

        let doc = editor.document();
        let first = doc.child(doc.root(), 0).unwrap();
        assert_eq!(doc.kind(first), Some(NodeKind::Paragraph));
        assert_eq!(editor.selection(), Selection::collapsed(Position::at_start(first)));
        assert!(editor.get_data().starts_with(r#"<p></p><div class="spoiler">"#));
    }

    #[test]
    fn test_enter_in_last_empty_block_leaves_spoiler() {
        let mut editor = editor(LOADED);
        let spoiler = spoiler_of(&editor);
        let content = content_of(editor.document(), spoiler).unwrap();
        let last = editor.document().child(content, 1).unwrap();
        editor
            .set_selection(Selection::collapsed(Position::at_start(last)))
            .unwrap();

        editor.handle_key(&KeyCombo::new(Key::Enter)).unwrap();
        assert_eq!(
            editor.get_data(),
            concat!(
                r#"<div class="spoiler"><h3 class="spoiler-title">T</h3>"#,
                r#"<div class="spoiler-content"><p>one</p></div></div><p></p>"#
            )
        );
        let doc = editor.document();
        let after = doc.child(doc.root(), 1).unwrap();
        assert_eq!(editor.selection(), Selection::collapsed(Position::at_start(after)));
    }

    #[test]
    fn test_enter_in_only_empty_block_refills_content() {
        let mut editor = editor(
            r#"<div class="spoiler"><h3 class="spoiler-title">T</h3><div class="spoiler-content"><p></p></div></div>"#,
        );
        let only = caret_in(&mut editor, NodeKind::Paragraph, 0, 0);
        editor.handle_key(&KeyCombo::new(Key::Enter)).unwrap();
        assert!(!editor.document().contains(only));
        assert_eq!(
            editor.get_data(),
            r#"<div class="spoiler"><h3 class="spoiler-title">T</h3><div class="spoiler-content"><p></p></div></div><p></p>"#
        );
    }

    #[test]
    fn test_enter_twice_in_new_spoiler_removes_it() {
        let mut editor = editor("<p>before</p>");
        caret_in(&mut editor, NodeKind::Paragraph, 0, 6);
        editor.execute(crate::spoiler::INSERT_SPOILER).unwrap();
        editor.handle_key(&KeyCombo::new(Key::Enter)).unwrap();
        editor.handle_key(&KeyCombo::new(Key::Enter)).unwrap();

        assert!(editor.document().nodes_of_kind(NodeKind::Spoiler).is_empty());
        assert_eq!(editor.get_data(), "<p>before</p><p></p>");
        let doc = editor.document();
        let after = doc.child(doc.root(), 1).unwrap();
        assert_eq!(editor.selection(), Selection::collapsed(Position::at_start(after)));
    }

    #[test]
    fn test_enter_in_non_empty_block_splits() {
        let mut editor = editor(LOADED);
        caret_in(&mut editor, NodeKind::Paragraph, 0, 1);
        let handling = editor.handle_key(&KeyCombo::new(Key::Enter)).unwrap();
        assert_eq!(handling, Handling::NotHandled);
        assert_eq!(
            editor.get_data(),
            concat!(
                r#"<div class="spoiler"><h3 class="spoiler-title">T</h3>"#,
                r#"<div class="spoiler-content"><p>o</p><p>ne</p><p></p></div></div>"#
            )
        );
    }

    #[test]
    fn test_delete_in_empty_spoiler_removes_it() {
        let mut editor = editor("<p>before</p>");
        let paragraph = editor.document().nodes_of_kind(NodeKind::Paragraph)[0];
        editor
            .set_selection(Selection::collapsed(Position::new(paragraph, 6)))
            .unwrap();
        editor.execute(crate::spoiler::INSERT_SPOILER).unwrap();
        assert_eq!(editor.document().nodes_of_kind(NodeKind::Spoiler).len(), 1);

        let handling = editor.handle_key(&KeyCombo::new(Key::Backspace)).unwrap();
        assert_eq!(handling, Handling::Handled);
        assert_eq!(editor.get_data(), "<p>before</p>");
        assert!(editor
            .take_view_events()
            .iter()
            .any(|e| matches!(e, ViewEvent::ScrollToSelection(_))));
    }

    #[test]
    fn test_delete_in_titled_spoiler_is_default() {
        let mut editor = editor(LOADED);
        caret_in(&mut editor, NodeKind::SpoilerTitle, 0, 1);
        let handling = editor.handle_key(&KeyCombo::new(Key::Backspace)).unwrap();
        assert_eq!(handling, Handling::NotHandled);
        assert!(editor.get_data().contains(r#"<h3 class="spoiler-title"></h3>"#));
    }

    #[test]
    fn test_delete_in_content_refreshes_placeholder() {
        let mut editor = editor(
            r#"<div class="spoiler"><h3 class="spoiler-title">T</h3><div class="spoiler-content"><p>x</p></div></div>"#,
        );
        let content = editor.document().nodes_of_kind(NodeKind::SpoilerContent)[0];
        assert!(!editor.placeholders().is_active(content));

        caret_in(&mut editor, NodeKind::Paragraph, 0, 1);
        let handling = editor.handle_key(&KeyCombo::new(Key::Backspace)).unwrap();
        assert_eq!(handling, Handling::NotHandled);
        assert!(editor.placeholders().is_active(content));
        assert!(editor.placeholders().is_visible(editor.document(), content));
    }

    #[test]
    fn test_selected_spoiler_redirects_to_content() {
        let mut editor = editor(&format!("{LOADED}<p>after</p>"));
        let spoiler = spoiler_of(&editor);
        let selection = Selection::on_node(editor.document(), spoiler).unwrap();
        editor.set_selection(selection).unwrap();

        let first = editor.document().nodes_of_kind(NodeKind::Paragraph)[0];
        assert_eq!(editor.selection(), Selection::collapsed(Position::at_start(first)));
    }
}
