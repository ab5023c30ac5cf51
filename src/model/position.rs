use std::cmp::Ordering;

use super::{Document, NodeId, NodeKind};

/// A point in the document: an offset inside `parent`.
///
/// Inside a text block offsets count characters of text nodes and one unit
/// per other inline node. Inside any other element they count children.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Position {
    pub parent: NodeId,
    pub offset: usize,
}

impl Position {
    pub fn new(parent: NodeId, offset: usize) -> Self {
        Self { parent, offset }
    }

    pub fn at_start(parent: NodeId) -> Self {
        Self::new(parent, 0)
    }

    pub fn at_end(doc: &Document, parent: NodeId) -> Self {
        Self::new(parent, doc.max_offset(parent))
    }

    /// Position right before `node` in its parent.
    pub fn before(doc: &Document, node: NodeId) -> Option<Self> {
        Some(Self::new(doc.parent(node)?, doc.start_offset(node)?))
    }

    /// Position right after `node` in its parent.
    pub fn after(doc: &Document, node: NodeId) -> Option<Self> {
        let before = Self::before(doc, node)?;
        Some(Self::new(before.parent, before.offset + doc.offset_size(node)))
    }

    pub fn is_at_start(&self) -> bool {
        self.offset == 0
    }

    pub fn is_at_end(&self, doc: &Document) -> bool {
        self.offset >= doc.max_offset(self.parent)
    }
}

/// Anchor and focus; collapsed when they are equal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Selection {
    pub anchor: Position,
    pub focus: Position,
}

impl Selection {
    pub fn collapsed(pos: Position) -> Self {
        Self {
            anchor: pos,
            focus: pos,
        }
    }

    pub fn range(anchor: Position, focus: Position) -> Self {
        Self { anchor, focus }
    }

    /// Selection spanning exactly one node (an "object selection").
    pub fn on_node(doc: &Document, node: NodeId) -> Option<Self> {
        Some(Self::range(
            Position::before(doc, node)?,
            Position::after(doc, node)?,
        ))
    }

    pub fn is_collapsed(&self) -> bool {
        self.anchor == self.focus
    }

    /// Earlier of the two ends in document order.
    pub fn first(&self, doc: &Document) -> Position {
        match doc.compare_positions(self.anchor, self.focus) {
            Ordering::Greater => self.focus,
            _ => self.anchor,
        }
    }

    /// Later of the two ends in document order.
    pub fn last(&self, doc: &Document) -> Position {
        match doc.compare_positions(self.anchor, self.focus) {
            Ordering::Greater => self.anchor,
            _ => self.focus,
        }
    }

    /// The element this selection spans, if it spans exactly one.
    pub fn selected_element(&self, doc: &Document) -> Option<NodeId> {
        let first = self.first(doc);
        let last = self.last(doc);
        if first.parent != last.parent || last.offset != first.offset + 1 {
            return None;
        }
        let node = doc.node_at_offset(first.parent, first.offset)?;
        (doc.kind(node)? != NodeKind::Text).then_some(node)
    }
}
