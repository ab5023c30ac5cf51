//! Content rules: which node kinds may appear where.
//!
//! Each registered kind has a `SchemaItem`. Placement is resolved through
//! `allow_in` (explicit parents), `allow_where` (inherit another kind's
//! parents) and `allow_content_of` (inherit another kind's children).
//! Child checks run first and can veto or force a decision for a context.

use std::collections::HashMap;

use crate::model::{Document, NodeId, NodeKind, Position};

/// Inheritance chains longer than this are treated as cycles.
const MAX_RULE_DEPTH: usize = 16;

/// Registration rules for one node kind.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SchemaItem {
    pub allow_in: Vec<NodeKind>,
    pub allow_where: Option<NodeKind>,
    pub allow_content_of: Option<NodeKind>,
    /// Self-contained unit, selected and deleted as a whole.
    pub is_object: bool,
    /// Boundary that structure-changing operations do not cross.
    pub is_limit: bool,
}

impl SchemaItem {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn allow_in(mut self, parent: NodeKind) -> Self {
        self.allow_in.push(parent);
        self
    }

    pub fn allow_where(mut self, kind: NodeKind) -> Self {
        self.allow_where = Some(kind);
        self
    }

    pub fn allow_content_of(mut self, kind: NodeKind) -> Self {
        self.allow_content_of = Some(kind);
        self
    }

    pub fn object(mut self) -> Self {
        self.is_object = true;
        self
    }

    pub fn limit(mut self) -> Self {
        self.is_limit = true;
        self
    }
}

/// Ancestor chain of a would-be insertion point, outermost first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaContext {
    kinds: Vec<NodeKind>,
}

impl SchemaContext {
    /// Context of the document root.
    pub fn root() -> Self {
        Self {
            kinds: vec![NodeKind::Root],
        }
    }

    /// Context inside `node`: the node and its ancestors.
    pub fn of(doc: &Document, node: NodeId) -> Self {
        let mut kinds: Vec<NodeKind> = doc
            .ancestors(node)
            .filter_map(|id| doc.kind(id))
            .collect();
        kinds.reverse();
        if let Some(kind) = doc.kind(node) {
            kinds.push(kind);
        }
        Self { kinds }
    }

    /// This context extended with one more level.
    pub fn child(&self, kind: NodeKind) -> Self {
        let mut kinds = self.kinds.clone();
        kinds.push(kind);
        Self { kinds }
    }

    /// Innermost kind.
    pub fn last(&self) -> Option<NodeKind> {
        self.kinds.last().copied()
    }

    pub fn ends_with(&self, kind: NodeKind) -> bool {
        self.last() == Some(kind)
    }

    pub fn contains(&self, kind: NodeKind) -> bool {
        self.kinds.contains(&kind)
    }
}

/// Extra rule consulted before the registered items.
///
/// Returning `Some` decides the check; `None` defers to the next rule.
pub type ChildCheck = fn(&SchemaContext, NodeKind) -> Option<bool>;

#[derive(Debug, Clone, Default)]
pub struct Schema {
    items: HashMap<NodeKind, SchemaItem>,
    child_checks: Vec<ChildCheck>,
}

impl Schema {
    /// An empty schema with nothing registered.
    pub fn new() -> Self {
        Self::default()
    }

    /// Rules of the host editor: root, paragraphs, headings, quotes and text.
    pub fn host() -> Self {
        let mut schema = Self::new();
        schema.register(NodeKind::Root, SchemaItem::new().limit());
        schema.register(
            NodeKind::Paragraph,
            SchemaItem::new().allow_in(NodeKind::Root),
        );
        for level in 1..=6 {
            schema.register(
                NodeKind::Heading(level),
                SchemaItem::new()
                    .allow_where(NodeKind::Paragraph)
                    .allow_content_of(NodeKind::Paragraph),
            );
        }
        schema.register(
            NodeKind::Quote,
            SchemaItem::new()
                .allow_where(NodeKind::Paragraph)
                .allow_content_of(NodeKind::Root),
        );
        schema.register(NodeKind::Text, SchemaItem::new().allow_in(NodeKind::Paragraph));
        schema.register(
            NodeKind::SoftBreak,
            SchemaItem::new().allow_where(NodeKind::Text),
        );
        schema.add_child_check(|ctx, child| {
            (child == NodeKind::Quote && ctx.contains(NodeKind::Quote)).then_some(false)
        });
        schema
    }

    pub fn register(&mut self, kind: NodeKind, item: SchemaItem) {
        self.items.insert(kind, item);
    }

    pub fn is_registered(&self, kind: NodeKind) -> bool {
        self.items.contains_key(&kind)
    }

    pub fn item(&self, kind: NodeKind) -> Option<&SchemaItem> {
        self.items.get(&kind)
    }

    pub fn add_child_check(&mut self, check: ChildCheck) {
        self.child_checks.push(check);
    }

    pub fn is_object(&self, kind: NodeKind) -> bool {
        self.item(kind).is_some_and(|item| item.is_object)
    }

    /// Objects are limits too.
    pub fn is_limit(&self, kind: NodeKind) -> bool {
        self.item(kind)
            .is_some_and(|item| item.is_limit || item.is_object)
    }

    /// Whether `child` may be placed at the end of `ctx`.
    pub fn check_child(&self, ctx: &SchemaContext, child: NodeKind) -> bool {
        if !self.is_registered(child) {
            return false;
        }
        let Some(parent) = ctx.last() else {
            return false;
        };
        if let Some(decision) = self.child_checks.iter().find_map(|check| check(ctx, child)) {
            return decision;
        }
        self.allowed_in(parent, child, 0)
    }

    /// Whether `child` may be placed directly inside `parent`.
    pub fn check_child_of(&self, doc: &Document, parent: NodeId, child: NodeKind) -> bool {
        self.check_child(&SchemaContext::of(doc, parent), child)
    }

    /// Nearest element at or above `pos` that accepts `kind`, without
    /// crossing a limit.
    pub fn find_allowed_parent(
        &self,
        doc: &Document,
        pos: Position,
        kind: NodeKind,
    ) -> Option<NodeId> {
        let mut current = Some(pos.parent);
        while let Some(node) = current {
            if self.check_child_of(doc, node, kind) {
                return Some(node);
            }
            if self.is_limit(doc.kind(node)?) {
                return None;
            }
            current = doc.parent(node);
        }
        None
    }

    fn allowed_in(&self, parent: NodeKind, child: NodeKind, depth: usize) -> bool {
        if depth > MAX_RULE_DEPTH {
            return false;
        }
        let Some(item) = self.item(child) else {
            return false;
        };
        if item.allow_in.contains(&parent) {
            return true;
        }
        if let Some(like) = item.allow_where {
            if self.allowed_in(parent, like, depth + 1) {
                return true;
            }
        }
        // A parent that takes the content of another kind accepts what that kind accepts.
        match self.item(parent).and_then(|p| p.allow_content_of) {
            Some(source) if source != parent => self.allowed_in(source, child, depth + 1),
            _ => false,
        }
    }
}
