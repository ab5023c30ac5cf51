// Mutation API for the document.
//
// Every structural edit goes through a `Writer` so it can be recorded as a
// `Change` (post-fixers inspect these) and so the selection follows the edit.

use super::{plain_text, Document, Node, NodeId, NodeKind, Position, Selection, TreeNode};
use crate::error::SpoilerError;
use crate::schema::Schema;

type Result<T> = std::result::Result<T, SpoilerError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeKind {
    Insert,
    Remove,
}

/// One recorded edit: `length` units at `offset` inside `parent`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Change {
    pub kind: ChangeKind,
    pub parent: NodeId,
    pub offset: usize,
    pub length: usize,
    /// Model name of the inserted or removed node (`$text` for text runs).
    pub name: &'static str,
}

/// Short-lived handle for mutating a document within one change block.
pub struct Writer<'a> {
    doc: &'a mut Document,
    schema: &'a Schema,
    changes: &'a mut Vec<Change>,
}

impl<'a> Writer<'a> {
    pub fn new(doc: &'a mut Document, schema: &'a Schema, changes: &'a mut Vec<Change>) -> Self {
        Self {
            doc,
            schema,
            changes,
        }
    }

    pub fn document(&self) -> &Document {
        &*self.doc
    }

    pub fn schema(&self) -> &Schema {
        self.schema
    }

    /// Insert a copy of `tree` at `pos`, splitting a text node if needed.
    ///
    /// Returns the new node. A text tree is routed to `insert_text` and, since
    /// text merges with its neighbours, the parent is returned instead.
    pub fn insert(&mut self, tree: &TreeNode, pos: Position) -> Result<NodeId> {
        if tree.kind == NodeKind::Text {
            self.insert_text(pos, &tree.text)?;
            return Ok(pos.parent);
        }
        self.validate(pos)?;
        self.check_allowed(pos.parent, tree.kind)?;

        let index = self.ensure_boundary(pos.parent, pos.offset);
        let id = self.doc.build(tree);
        self.doc.attach(pos.parent, index, id);
        self.shift_after(pos.parent, pos.offset, 1);
        self.record(ChangeKind::Insert, pos.parent, pos.offset, 1, tree.kind.name());
        trace!(kind = tree.kind.name(), offset = pos.offset, "insert");
        Ok(id)
    }

    /// Insert `text` at `pos`, which must lie in a block that accepts text.
    ///
    /// Tabs, line breaks and non-breaking spaces are stored as plain spaces.
    pub fn insert_text(&mut self, pos: Position, text: &str) -> Result<()> {
        self.validate(pos)?;
        self.check_allowed(pos.parent, NodeKind::Text)?;
        let text = plain_text(text);
        let text = text.as_str();
        let length = text.chars().count();
        if length == 0 {
            return Ok(());
        }

        let (index, inner) = self.doc.locate(pos.parent, pos.offset);
        let previous = index
            .checked_sub(1)
            .and_then(|i| self.doc.child(pos.parent, i))
            .filter(|&c| inner == 0 && self.doc.kind(c) == Some(NodeKind::Text));
        let target = if inner > 0 {
            self.doc.child(pos.parent, index)
        } else {
            previous
        };

        match target.and_then(|id| self.doc.node_mut(id)) {
            Some(node) => {
                let at = if inner > 0 {
                    byte_index(&node.text, inner)
                } else {
                    node.text.len()
                };
                node.text.insert_str(at, text);
            }
            None => {
                let id = self.doc.alloc(NodeKind::Text, text.to_string());
                self.doc.attach(pos.parent, index, id);
                self.doc.normalize_text(pos.parent);
            }
        }

        self.shift_after(pos.parent, pos.offset, length);
        self.record(ChangeKind::Insert, pos.parent, pos.offset, length, "$text");
        Ok(())
    }

    /// Remove `node` and its subtree.
    ///
    /// A selection end inside the removed subtree moves to where the node was.
    pub fn remove(&mut self, node: NodeId) -> Result<()> {
        let kind = self.doc.kind(node).ok_or(SpoilerError::UnknownNode(node))?;
        let parent = self.doc.parent(node).ok_or(SpoilerError::Detached(node))?;
        let start = self
            .doc
            .start_offset(node)
            .ok_or(SpoilerError::Detached(node))?;
        let size = self.doc.offset_size(node);

        self.remove_span(parent, start, start + size);
        self.record(ChangeKind::Remove, parent, start, size, kind.name());
        trace!(kind = kind.name(), offset = start, "remove");
        Ok(())
    }

    /// Remove everything between two offsets of `parent`.
    pub fn remove_range(&mut self, parent: NodeId, start: usize, end: usize) -> Result<()> {
        self.validate(Position::new(parent, start))?;
        self.validate(Position::new(parent, end))?;
        if start >= end {
            return Ok(());
        }
        let name = match self.doc.node_at_offset(parent, start) {
            Some(child) if self.doc.offset_size(child) == end - start => {
                self.doc.kind(child).map_or("$text", NodeKind::name)
            }
            _ => "$text",
        };
        self.remove_span(parent, start, end);
        self.record(ChangeKind::Remove, parent, start, end - start, name);
        Ok(())
    }

    /// Move the children of `second` to the end of `first`, then remove `second`.
    pub fn merge(&mut self, first: NodeId, second: NodeId) -> Result<()> {
        if !self.doc.contains(first) {
            return Err(SpoilerError::UnknownNode(first));
        }
        if !self.doc.contains(second) {
            return Err(SpoilerError::UnknownNode(second));
        }
        let base = self.doc.max_offset(first);
        let moved = self.doc.max_offset(second);

        let children = self
            .doc
            .node_mut(second)
            .map(|node| std::mem::take(&mut node.children))
            .unwrap_or_default();
        for &child in &children {
            if let Some(node) = self.doc.node_mut(child) {
                node.parent = Some(first);
            }
        }
        if let Some(node) = self.doc.node_mut(first) {
            node.children.extend(children);
        }
        self.doc.normalize_text(first);
        self.map_positions(|pos| {
            if pos.parent == second {
                Position::new(first, base + pos.offset)
            } else {
                pos
            }
        });
        if moved > 0 {
            self.record(ChangeKind::Insert, first, base, moved, "$text");
        }
        self.remove(second)
    }

    /// Split the element containing `pos` in two. Content after `pos` moves
    /// into a new sibling of the same kind, which is returned.
    pub fn split(&mut self, pos: Position) -> Result<NodeId> {
        self.validate(pos)?;
        let element = pos.parent;
        let kind = self
            .doc
            .kind(element)
            .ok_or(SpoilerError::UnknownNode(element))?;
        let grandparent = self
            .doc
            .parent(element)
            .ok_or(SpoilerError::Detached(element))?;
        let element_start = self
            .doc
            .start_offset(element)
            .ok_or(SpoilerError::Detached(element))?;

        let index = self.ensure_boundary(element, pos.offset);
        let moved = self.doc.max_offset(element) - pos.offset;
        let tail = self
            .doc
            .node_mut(element)
            .map(|node| node.children.split_off(index))
            .unwrap_or_default();

        let new = self.doc.alloc(kind, String::new());
        for &child in &tail {
            if let Some(node) = self.doc.node_mut(child) {
                node.parent = Some(new);
            }
        }
        if let Some(node) = self.doc.node_mut(new) {
            node.children = tail;
        }

        let new_index = self.doc.index_in_parent(element).map_or(0, |i| i + 1);
        self.doc.attach(grandparent, new_index, new);
        self.shift_after(grandparent, element_start, 1);
        self.map_positions(|p| {
            if p.parent == element && p.offset > pos.offset {
                Position::new(new, p.offset - pos.offset)
            } else {
                p
            }
        });

        if moved > 0 {
            self.record(ChangeKind::Remove, element, pos.offset, moved, "$text");
        }
        self.record(ChangeKind::Insert, grandparent, element_start + 1, 1, kind.name());
        Ok(new)
    }

    pub fn set_selection(&mut self, selection: Selection) -> Result<()> {
        self.validate(selection.anchor)?;
        self.validate(selection.focus)?;
        self.doc.selection = selection;
        Ok(())
    }

    /// Delete the content of a selection and collapse it.
    ///
    /// Handles a range inside one element, and a range across sibling text
    /// blocks (which are merged). Returns `false` for anything else, including
    /// ends inside a fixed-structure element whose parts must not be removed.
    pub fn delete_content(&mut self, selection: Selection) -> Result<bool> {
        if selection.is_collapsed() {
            return Ok(false);
        }
        let first = selection.first(self.doc);
        let last = selection.last(self.doc);
        let settled = [first.parent, last.parent]
            .iter()
            .all(|&id| self.doc.kind(id).is_some_and(NodeKind::accepts_selection));
        if !settled {
            return Ok(false);
        }

        if first.parent == last.parent {
            self.remove_range(first.parent, first.offset, last.offset)?;
            self.set_selection(Selection::collapsed(first))?;
            return Ok(true);
        }

        let both_text_blocks = [first.parent, last.parent]
            .iter()
            .all(|&id| self.doc.kind(id).is_some_and(NodeKind::is_text_block));
        let container = self.doc.parent(first.parent);
        if !both_text_blocks || container.is_none() || container != self.doc.parent(last.parent) {
            return Ok(false);
        }
        let (Some(first_index), Some(last_index)) = (
            self.doc.index_in_parent(first.parent),
            self.doc.index_in_parent(last.parent),
        ) else {
            return Ok(false);
        };

        self.remove_range(last.parent, 0, last.offset)?;
        let end = self.doc.max_offset(first.parent);
        self.remove_range(first.parent, first.offset, end)?;
        if let Some(container) = container {
            let between: Vec<NodeId> = self.doc.children(container)[first_index + 1..last_index].to_vec();
            for node in between {
                self.remove(node)?;
            }
        }
        self.merge(first.parent, last.parent)?;
        self.set_selection(Selection::collapsed(first))?;
        Ok(true)
    }

    // -----------------------------------------------------------------------
    // Internals
    // -----------------------------------------------------------------------

    fn validate(&self, pos: Position) -> Result<()> {
        if !self.doc.contains(pos.parent) {
            return Err(SpoilerError::UnknownNode(pos.parent));
        }
        if pos.offset > self.doc.max_offset(pos.parent) {
            return Err(SpoilerError::InvalidPosition {
                parent: pos.parent,
                offset: pos.offset,
            });
        }
        Ok(())
    }

    fn check_allowed(&self, parent: NodeId, child: NodeKind) -> Result<()> {
        if self.schema.check_child_of(self.doc, parent, child) {
            return Ok(());
        }
        Err(SpoilerError::NotAllowed {
            parent: self.doc.kind(parent).unwrap_or(NodeKind::Root),
            child,
        })
    }

    fn record(&mut self, kind: ChangeKind, parent: NodeId, offset: usize, length: usize, name: &'static str) {
        self.changes.push(Change {
            kind,
            parent,
            offset,
            length,
            name,
        });
    }

    /// Make `offset` fall between two children of `parent`, splitting a text
    /// node if it falls inside one. Returns the child index at `offset`.
    fn ensure_boundary(&mut self, parent: NodeId, offset: usize) -> usize {
        let (index, inner) = self.doc.locate(parent, offset);
        if inner == 0 {
            return index;
        }
        let Some(child) = self.doc.child(parent, index) else {
            return index;
        };
        let right = match self.doc.node_mut(child) {
            Some(Node { text, .. }) => {
                let at = byte_index(text, inner);
                text.split_off(at)
            }
            None => return index,
        };
        let id = self.doc.alloc(NodeKind::Text, right);
        self.doc.attach(parent, index + 1, id);
        index + 1
    }

    /// Detach and free everything between `start` and `end` in `parent`.
    fn remove_span(&mut self, parent: NodeId, start: usize, end: usize) {
        let first = self.ensure_boundary(parent, start);
        let last = self.ensure_boundary(parent, end);
        let removed: Vec<NodeId> = self.doc.children(parent)[first..last].to_vec();

        let length = end - start;
        let inside_removed: Vec<bool> = [self.doc.selection.anchor, self.doc.selection.focus]
            .iter()
            .map(|pos| removed.iter().any(|&r| self.doc.is_inside(pos.parent, r)))
            .collect();
        let mut ends = [self.doc.selection.anchor, self.doc.selection.focus];
        for (pos, inside) in ends.iter_mut().zip(inside_removed) {
            if inside {
                *pos = Position::new(parent, start);
            } else if pos.parent == parent && pos.offset > start {
                pos.offset = if pos.offset >= end {
                    pos.offset - length
                } else {
                    start
                };
            }
        }
        self.doc.selection = Selection::range(ends[0], ends[1]);

        for node in removed {
            self.doc.detach(node);
            self.doc.free(node);
        }
        self.doc.normalize_text(parent);
    }

    /// Shift selection offsets after an insertion of `length` units at `offset`.
    fn shift_after(&mut self, parent: NodeId, offset: usize, length: usize) {
        self.map_positions(|pos| {
            if pos.parent == parent && pos.offset > offset {
                Position::new(parent, pos.offset + length)
            } else {
                pos
            }
        });
    }

    fn map_positions(&mut self, f: impl Fn(Position) -> Position) {
        let selection = self.doc.selection;
        self.doc.selection = Selection::range(f(selection.anchor), f(selection.focus));
    }
}

fn byte_index(text: &str, chars: usize) -> usize {
    text.char_indices().nth(chars).map_or(text.len(), |(i, _)| i)
}
