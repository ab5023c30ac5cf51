// Shared utilities for the upcast module.

use crate::model::{NodeKind, TreeNode};

/// Remove leading and trailing soft breaks and whitespace-only text.
pub(crate) fn drop_surrounding_breaks(mut nodes: Vec<TreeNode>) -> Vec<TreeNode> {
    fn is_droppable_edge(n: &TreeNode) -> bool {
        n.kind == NodeKind::SoftBreak || is_blank_text(n)
    }

    let start = nodes
        .iter()
        .position(|n| !is_droppable_edge(n))
        .unwrap_or(nodes.len());
    if start > 0 {
        nodes.drain(..start);
    }

    while nodes.last().is_some_and(is_droppable_edge) {
        nodes.pop();
    }

    nodes
}

/// Check if a list of nodes contains only whitespace-only text.
pub(crate) fn is_whitespace_only(nodes: &[TreeNode]) -> bool {
    nodes.iter().all(is_blank_text)
}

/// Text made of ASCII spaces only. A non-breaking space is content.
fn is_blank_text(n: &TreeNode) -> bool {
    n.kind == NodeKind::Text && n.text.chars().all(|c| c == ' ')
}
