// Document model: an arena of nodes with stable identities.
//
// Nodes are addressed by `NodeId`. A parent owns its children through its
// `children` list; the `parent` back-reference is only used for traversal.
// Removing a node frees its whole subtree and its ids go stale: queries on a
// stale id return `None` (or an empty slice), writer operations return
// `SpoilerError::UnknownNode`. Freed slots are reused, each reuse under a new
// generation, so a stale id never resolves to the node that took its slot.

pub(crate) mod position;
pub(crate) mod writer;

use std::cmp::Ordering;

pub use position::{Position, Selection};
pub use writer::{Change, ChangeKind, Writer};

/// Handle of a node in a `Document`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId {
    index: usize,
    generation: u32,
}

impl NodeId {
    /// Raw arena index, stable for the life of the node.
    pub fn index(self) -> usize {
        self.index
    }
}

/// Kind of a document node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum NodeKind {
    // Document
    Root,

    // Blocks
    Paragraph,
    /// Heading with a level in `1..=6`.
    Heading(u8),
    Quote,

    // Spoiler
    Spoiler,
    SpoilerTitle,
    SpoilerContent,

    // Inline
    SoftBreak,
    Text,
}

impl NodeKind {
    /// Heading of the given level, clamped to `1..=6`.
    pub fn heading(level: u8) -> Self {
        NodeKind::Heading(level.clamp(1, 6))
    }

    /// Model name of this kind.
    pub fn name(self) -> &'static str {
        match self {
            NodeKind::Root => "$root",
            NodeKind::Paragraph => "paragraph",
            NodeKind::Heading(1) => "heading1",
            NodeKind::Heading(2) => "heading2",
            NodeKind::Heading(3) => "heading3",
            NodeKind::Heading(4) => "heading4",
            NodeKind::Heading(5) => "heading5",
            NodeKind::Heading(_) => "heading6",
            NodeKind::Quote => "blockQuote",
            NodeKind::Spoiler => "spoiler",
            NodeKind::SpoilerTitle => "spoilerTitle",
            NodeKind::SpoilerContent => "spoilerContent",
            NodeKind::SoftBreak => "softBreak",
            NodeKind::Text => "$text",
        }
    }

    /// Whether this kind holds inline content (text and soft breaks).
    pub fn is_text_block(self) -> bool {
        matches!(
            self,
            NodeKind::Paragraph | NodeKind::Heading(_) | NodeKind::SpoilerTitle
        )
    }

    /// Whether this kind is inline content.
    pub fn is_inline(self) -> bool {
        matches!(self, NodeKind::Text | NodeKind::SoftBreak)
    }

    /// Whether this kind holds a free-form list of blocks.
    pub fn holds_blocks(self) -> bool {
        matches!(
            self,
            NodeKind::Root | NodeKind::Quote | NodeKind::SpoilerContent
        )
    }

    /// Whether a selection end may sit directly inside this kind.
    pub fn accepts_selection(self) -> bool {
        self.is_text_block() || self.holds_blocks()
    }

    /// Whether this kind may appear where a generic block may.
    pub fn is_block(self) -> bool {
        matches!(
            self,
            NodeKind::Paragraph | NodeKind::Heading(_) | NodeKind::Quote | NodeKind::Spoiler
        )
    }
}

/// A node stored in the document arena.
#[derive(Debug, Clone)]
pub struct Node {
    kind: NodeKind,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    text: String,
}

impl Node {
    pub fn kind(&self) -> NodeKind {
        self.kind
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    /// Text value; empty for elements.
    pub fn text(&self) -> &str {
        &self.text
    }
}

/// An owned, detached subtree.
///
/// Converters produce it, commands insert it, and tests compare it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeNode {
    pub kind: NodeKind,
    pub text: String,
    pub children: Vec<TreeNode>,
}

impl TreeNode {
    pub fn element(kind: NodeKind, children: Vec<TreeNode>) -> Self {
        Self {
            kind,
            text: String::new(),
            children,
        }
    }

    pub fn text(value: impl Into<String>) -> Self {
        Self {
            kind: NodeKind::Text,
            text: value.into(),
            children: Vec::new(),
        }
    }

    pub fn paragraph(children: Vec<TreeNode>) -> Self {
        Self::element(NodeKind::Paragraph, children)
    }

    pub fn empty_paragraph() -> Self {
        Self::paragraph(Vec::new())
    }

    /// Same rule as `Document::is_empty`.
    pub fn is_empty(&self) -> bool {
        match self.kind {
            NodeKind::Text => self.text.is_empty(),
            NodeKind::SoftBreak => false,
            _ => self.children.iter().all(TreeNode::is_empty),
        }
    }

    /// Concatenated text of all descendants.
    pub fn text_content(&self) -> String {
        let mut out = String::new();
        collect_text(self, &mut out);
        out
    }
}

/// Model text holds plain spaces only: tabs, line breaks, form feeds and
/// non-breaking spaces become `' '`. The mapping is one char for one char, so
/// offsets computed on the input stay valid.
pub(crate) fn plain_text(value: &str) -> String {
    value
        .chars()
        .map(|c| match c {
            '\t' | '\n' | '\r' | '\u{c}' | '\u{a0}' => ' ',
            other => other,
        })
        .collect()
}

fn collect_text(node: &TreeNode, out: &mut String) {
    if node.kind == NodeKind::Text {
        out.push_str(&node.text);
    }
    for child in &node.children {
        collect_text(child, out);
    }
}

#[derive(Debug, Clone)]
struct Slot {
    generation: u32,
    node: Option<Node>,
}

/// The document tree plus its selection.
#[derive(Debug, Clone)]
pub struct Document {
    nodes: Vec<Slot>,
    vacant: Vec<usize>,
    root: NodeId,
    selection: Selection,
    version: u64,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    /// An empty document: a root holding one empty paragraph, caret inside it.
    pub fn new() -> Self {
        Self::from_children(Vec::new())
    }

    /// Build a document from root children. An empty list gets one empty paragraph.
    pub fn from_children(children: Vec<TreeNode>) -> Self {
        let root = NodeId {
            index: 0,
            generation: 0,
        };
        let mut doc = Self {
            nodes: Vec::new(),
            vacant: Vec::new(),
            root,
            selection: Selection::collapsed(Position::new(root, 0)),
            version: 0,
        };
        doc.alloc(NodeKind::Root, String::new());

        let children = if children.is_empty() {
            vec![TreeNode::empty_paragraph()]
        } else {
            children
        };
        for child in &children {
            let id = doc.build(child);
            doc.attach(root, usize::MAX, id);
        }
        doc.selection = Selection::collapsed(doc.caret_near(Position::new(root, 0)));
        doc
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn selection(&self) -> Selection {
        self.selection
    }

    /// Incremented once per committed batch that changed the tree.
    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes
            .get(id.index)
            .filter(|slot| slot.generation == id.generation)
            .and_then(|slot| slot.node.as_ref())
    }

    /// Number of arena slots, live or vacant.
    pub fn capacity(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the node is still part of the document.
    pub fn contains(&self, id: NodeId) -> bool {
        self.get(id).is_some()
    }

    pub fn kind(&self, id: NodeId) -> Option<NodeKind> {
        self.get(id).map(Node::kind)
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.get(id).and_then(Node::parent)
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.get(id).map_or(&[], Node::children)
    }

    pub fn child(&self, id: NodeId, index: usize) -> Option<NodeId> {
        self.children(id).get(index).copied()
    }

    pub fn text(&self, id: NodeId) -> &str {
        self.get(id).map_or("", Node::text)
    }

    pub fn index_in_parent(&self, id: NodeId) -> Option<usize> {
        let parent = self.parent(id)?;
        self.children(parent).iter().position(|&c| c == id)
    }

    pub fn previous_sibling(&self, id: NodeId) -> Option<NodeId> {
        let parent = self.parent(id)?;
        let index = self.index_in_parent(id)?;
        index.checked_sub(1).and_then(|i| self.child(parent, i))
    }

    pub fn next_sibling(&self, id: NodeId) -> Option<NodeId> {
        let parent = self.parent(id)?;
        let index = self.index_in_parent(id)?;
        self.child(parent, index + 1)
    }

    /// Ancestors from the parent up to the root.
    pub fn ancestors(&self, id: NodeId) -> Ancestors<'_> {
        Ancestors {
            doc: self,
            next: self.parent(id),
        }
    }

    /// Nearest node of `kind`, starting with `id` itself.
    pub fn find_ancestor(&self, id: NodeId, kind: NodeKind) -> Option<NodeId> {
        if self.kind(id)? == kind {
            return Some(id);
        }
        self.ancestors(id).find(|&a| self.kind(a) == Some(kind))
    }

    /// Whether `id` is `ancestor` or lies inside it.
    pub fn is_inside(&self, id: NodeId, ancestor: NodeId) -> bool {
        id == ancestor || self.ancestors(id).any(|a| a == ancestor)
    }

    /// A text node is empty when its value is; a soft break never is; any
    /// other element is empty when all of its children are.
    pub fn is_empty(&self, id: NodeId) -> bool {
        match self.get(id) {
            None => true,
            Some(node) => match node.kind {
                NodeKind::Text => node.text.is_empty(),
                NodeKind::SoftBreak => false,
                _ => node.children.iter().all(|&c| self.is_empty(c)),
            },
        }
    }

    /// Model units the node occupies in its parent: chars for text, 1 otherwise.
    pub fn offset_size(&self, id: NodeId) -> usize {
        match self.get(id) {
            Some(node) if node.kind == NodeKind::Text => node.text.chars().count(),
            Some(_) => 1,
            None => 0,
        }
    }

    /// Largest valid offset inside `id`.
    pub fn max_offset(&self, id: NodeId) -> usize {
        self.children(id).iter().map(|&c| self.offset_size(c)).sum()
    }

    /// Offset at which `id` starts inside its parent.
    pub fn start_offset(&self, id: NodeId) -> Option<usize> {
        let parent = self.parent(id)?;
        let mut offset = 0;
        for &child in self.children(parent) {
            if child == id {
                return Some(offset);
            }
            offset += self.offset_size(child);
        }
        None
    }

    /// Element starting exactly at `offset` inside `parent`.
    pub fn node_at_offset(&self, parent: NodeId, offset: usize) -> Option<NodeId> {
        let (index, inner) = self.locate(parent, offset);
        if inner != 0 {
            return None;
        }
        self.child(parent, index)
            .filter(|&c| self.kind(c) != Some(NodeKind::Text))
    }

    /// Concatenated text of all descendants.
    pub fn text_content(&self, id: NodeId) -> String {
        self.subtree(id)
            .map(|tree| tree.text_content())
            .unwrap_or_default()
    }

    /// Owned copy of the subtree rooted at `id`.
    pub fn subtree(&self, id: NodeId) -> Option<TreeNode> {
        let node = self.get(id)?;
        Some(TreeNode {
            kind: node.kind,
            text: node.text.clone(),
            children: node
                .children
                .iter()
                .filter_map(|&c| self.subtree(c))
                .collect(),
        })
    }

    /// Owned copies of the root's children.
    pub fn to_trees(&self) -> Vec<TreeNode> {
        self.children(self.root)
            .iter()
            .filter_map(|&c| self.subtree(c))
            .collect()
    }

    /// Descendants of `id` in document order, `id` excluded.
    pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack: Vec<NodeId> = self.children(id).iter().rev().copied().collect();
        while let Some(next) = stack.pop() {
            out.push(next);
            stack.extend(self.children(next).iter().rev());
        }
        out
    }

    /// Every node of `kind`, in document order.
    pub fn nodes_of_kind(&self, kind: NodeKind) -> Vec<NodeId> {
        self.descendants(self.root)
            .into_iter()
            .filter(|&id| self.kind(id) == Some(kind))
            .collect()
    }

    /// First text block in `id` (inclusive), depth first.
    pub fn first_text_block(&self, id: NodeId) -> Option<NodeId> {
        if self.kind(id)?.is_text_block() {
            return Some(id);
        }
        self.children(id)
            .iter()
            .find_map(|&c| self.first_text_block(c))
    }

    /// Last text block in `id` (inclusive), depth first.
    pub fn last_text_block(&self, id: NodeId) -> Option<NodeId> {
        if self.kind(id)?.is_text_block() {
            return Some(id);
        }
        self.children(id)
            .iter()
            .rev()
            .find_map(|&c| self.last_text_block(c))
    }

    /// Closest caret position to `pos`: `pos` itself inside a text block,
    /// otherwise the start of the next text block, otherwise the end of the
    /// previous one.
    pub fn caret_near(&self, pos: Position) -> Position {
        if self.kind(pos.parent).is_some_and(NodeKind::is_text_block) {
            return pos;
        }
        let children = self.children(pos.parent);
        let split = pos.offset.min(children.len());
        if let Some(block) = children[split..]
            .iter()
            .find_map(|&c| self.first_text_block(c))
        {
            return Position::at_start(block);
        }
        if let Some(block) = children[..split]
            .iter()
            .rev()
            .find_map(|&c| self.last_text_block(c))
        {
            return Position::at_end(self, block);
        }
        pos
    }

    /// Document order of two positions.
    pub fn compare_positions(&self, a: Position, b: Position) -> Ordering {
        self.path(a).cmp(&self.path(b))
    }

    fn path(&self, pos: Position) -> Vec<usize> {
        let mut path = vec![pos.offset];
        let mut current = pos.parent;
        while let Some(index) = self.index_in_parent(current) {
            path.push(index);
            match self.parent(current) {
                Some(parent) => current = parent,
                None => break,
            }
        }
        path.reverse();
        path
    }

    /// Child index and inner char offset for `offset` inside `parent`.
    ///
    /// An inner offset of zero means the position sits right before the child
    /// at the returned index (which may equal the child count).
    pub(crate) fn locate(&self, parent: NodeId, offset: usize) -> (usize, usize) {
        let mut acc = 0;
        for (index, &child) in self.children(parent).iter().enumerate() {
            if acc == offset {
                return (index, 0);
            }
            let size = self.offset_size(child);
            if offset < acc + size {
                return (index, offset - acc);
            }
            acc += size;
        }
        (self.children(parent).len(), 0)
    }

    pub(crate) fn is_valid_position(&self, pos: Position) -> bool {
        self.contains(pos.parent) && pos.offset <= self.max_offset(pos.parent)
    }

    /// Keep the selection attached: stale positions fall back to the start of
    /// the document, a collapsed caret outside any text block moves into the
    /// nearest one, and a range with an end inside a fixed-structure element
    /// (a spoiler between its title and content) selects that element whole.
    pub(crate) fn fix_selection(&mut self) {
        let selection = self.selection;
        let start = Selection::collapsed(self.caret_near(Position::new(self.root, 0)));
        if !self.is_valid_position(selection.anchor) || !self.is_valid_position(selection.focus) {
            self.selection = start;
            return;
        }
        if selection.is_collapsed() {
            self.selection = Selection::collapsed(self.caret_near(selection.anchor));
            return;
        }
        let stray = [selection.anchor, selection.focus]
            .into_iter()
            .map(|pos| pos.parent)
            .find(|&parent| !self.kind(parent).is_some_and(NodeKind::accepts_selection));
        if let Some(element) = stray {
            self.selection = Selection::on_node(self, element).unwrap_or(start);
        }
    }

    pub(crate) fn bump_version(&mut self) {
        self.version += 1;
    }

    // -----------------------------------------------------------------------
    // Arena primitives (used by `Writer`)
    // -----------------------------------------------------------------------

    fn node_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes
            .get_mut(id.index)
            .filter(|slot| slot.generation == id.generation)
            .and_then(|slot| slot.node.as_mut())
    }

    fn alloc(&mut self, kind: NodeKind, text: String) -> NodeId {
        let node = Node {
            kind,
            parent: None,
            children: Vec::new(),
            text,
        };
        if let Some(index) = self.vacant.pop() {
            let slot = &mut self.nodes[index];
            slot.node = Some(node);
            return NodeId {
                index,
                generation: slot.generation,
            };
        }
        self.nodes.push(Slot {
            generation: 0,
            node: Some(node),
        });
        NodeId {
            index: self.nodes.len() - 1,
            generation: 0,
        }
    }

    fn build(&mut self, tree: &TreeNode) -> NodeId {
        let id = self.alloc(tree.kind, plain_text(&tree.text));
        for child in &tree.children {
            let child_id = self.build(child);
            self.attach(id, usize::MAX, child_id);
        }
        id
    }

    /// Attach a detached node at child `index` (clamped) of `parent`.
    fn attach(&mut self, parent: NodeId, index: usize, child: NodeId) {
        let Some(parent_node) = self.node_mut(parent) else {
            return;
        };
        let index = index.min(parent_node.children.len());
        parent_node.children.insert(index, child);
        if let Some(child_node) = self.node_mut(child) {
            child_node.parent = Some(parent);
        }
    }

    /// Detach a node from its parent, returning where it was.
    fn detach(&mut self, child: NodeId) -> Option<(NodeId, usize)> {
        let parent = self.parent(child)?;
        let index = self.index_in_parent(child)?;
        if let Some(parent_node) = self.node_mut(parent) {
            parent_node.children.remove(index);
        }
        if let Some(child_node) = self.node_mut(child) {
            child_node.parent = None;
        }
        Some((parent, index))
    }

    /// Free a detached subtree.
    fn free(&mut self, id: NodeId) {
        let children = self.children(id).to_vec();
        for child in children {
            self.free(child);
        }
        if let Some(slot) = self.nodes.get_mut(id.index) {
            if slot.generation == id.generation && slot.node.take().is_some() {
                slot.generation = slot.generation.wrapping_add(1);
                self.vacant.push(id.index);
            }
        }
    }

    /// Merge adjacent text children and drop empty ones.
    fn normalize_text(&mut self, parent: NodeId) {
        let children = self.children(parent).to_vec();
        let mut previous_text: Option<NodeId> = None;
        for child in children {
            if self.kind(child) != Some(NodeKind::Text) {
                previous_text = None;
                continue;
            }
            if self.text(child).is_empty() {
                self.detach(child);
                self.free(child);
                continue;
            }
            match previous_text {
                Some(previous) => {
                    let tail = self.text(child).to_string();
                    if let Some(node) = self.node_mut(previous) {
                        node.text.push_str(&tail);
                    }
                    self.detach(child);
                    self.free(child);
                }
                None => previous_text = Some(child),
            }
        }
    }
}

/// Iterator over the ancestors of a node.
pub struct Ancestors<'a> {
    doc: &'a Document,
    next: Option<NodeId>,
}

impl Iterator for Ancestors<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let current = self.next?;
        self.next = self.doc.parent(current);
        Some(current)
    }
}
