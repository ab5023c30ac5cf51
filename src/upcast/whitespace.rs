// Whitespace normalization for converted trees.
//
// Post-processing pass that merges adjacent text nodes, trims spaces at the
// edges of text blocks and around soft breaks, and resolves non-breaking
// spaces: a block holding nothing but one is an empty-block filler, anywhere
// else it is an ordinary space.

use crate::model::{NodeKind, TreeNode};

const NBSP: char = '\u{a0}';

/// Run whitespace post-processing on a list of subtrees.
pub(crate) fn post_process_whitespace(nodes: &mut [TreeNode]) {
    for node in nodes.iter_mut() {
        process(node);
    }
}

fn process(node: &mut TreeNode) {
    for child in node.children.iter_mut() {
        process(child);
    }

    merge_adjacent_text(&mut node.children);

    if node.kind.is_text_block() {
        trim_around_breaks(&mut node.children);
        trim_container(&mut node.children);
        node.children.retain(|child| !is_empty_text(child));

        if is_filler(&node.children) {
            node.children.clear();
        }
        for child in node.children.iter_mut() {
            if child.kind == NodeKind::Text {
                child.text = child.text.replace(NBSP, " ");
            }
        }
    }
}

/// Merge adjacent Text nodes into a single node. A space at the seam is kept once.
fn merge_adjacent_text(children: &mut Vec<TreeNode>) {
    let mut i = 0;
    while i + 1 < children.len() {
        if is_text(&children[i]) && is_text(&children[i + 1]) {
            let next = children.remove(i + 1);
            let current = &mut children[i].text;
            let tail = if current.ends_with(' ') {
                next.text.trim_start_matches(' ')
            } else {
                next.text.as_str()
            };
            current.push_str(tail);
        } else {
            i += 1;
        }
    }
}

/// Trim spaces from the first and last text children.
fn trim_container(children: &mut [TreeNode]) {
    if let Some(first) = children.first_mut().filter(|n| is_text(n)) {
        first.text = first.text.trim_start_matches(' ').to_string();
    }
    if let Some(last) = children.last_mut().filter(|n| is_text(n)) {
        last.text = last.text.trim_end_matches(' ').to_string();
    }
}

/// Soft breaks start a new line: spaces next to them are dropped.
fn trim_around_breaks(children: &mut [TreeNode]) {
    for i in 0..children.len() {
        if children[i].kind != NodeKind::SoftBreak {
            continue;
        }
        if i > 0 && is_text(&children[i - 1]) {
            let before = &mut children[i - 1];
            before.text = before.text.trim_end_matches(' ').to_string();
        }
        if let Some(after) = children.get_mut(i + 1) {
            if is_text(after) {
                after.text = after.text.trim_start_matches(' ').to_string();
            }
        }
    }
}

fn is_filler(children: &[TreeNode]) -> bool {
    matches!(children, [only] if is_text(only) && only.text == NBSP.to_string())
}

fn is_text(node: &TreeNode) -> bool {
    node.kind == NodeKind::Text
}

fn is_empty_text(node: &TreeNode) -> bool {
    is_text(node) && node.text.is_empty()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn paragraph(children: Vec<TreeNode>) -> Vec<TreeNode> {
        let mut nodes = vec![TreeNode::paragraph(children)];
        post_process_whitespace(&mut nodes);
        nodes
    }

    #[test]
    fn test_merge_and_trim() {
        let nodes = paragraph(vec![
            TreeNode::text(" a "),
            TreeNode::text(" b"),
            TreeNode::text(" "),
        ]);
        assert_eq!(nodes, vec![TreeNode::paragraph(vec![TreeNode::text("a b")])]);
    }

    #[test]
    fn test_filler_becomes_empty() {
        let nodes = paragraph(vec![TreeNode::text(" \u{a0} ")]);
        assert_eq!(nodes, vec![TreeNode::empty_paragraph()]);
    }

    #[test]
    fn test_nbsp_becomes_space() {
        let nodes = paragraph(vec![TreeNode::text("\u{a0}a\u{a0}\u{a0}b")]);
        assert_eq!(
            nodes,
            vec![TreeNode::paragraph(vec![TreeNode::text(" a  b")])]
        );
    }

    #[test]
    fn test_spaces_around_breaks() {
        let nodes = paragraph(vec![
            TreeNode::text("a "),
            TreeNode::element(NodeKind::SoftBreak, vec![]),
            TreeNode::text(" b"),
        ]);
        assert_eq!(
            nodes,
            vec![TreeNode::paragraph(vec![
                TreeNode::text("a"),
                TreeNode::element(NodeKind::SoftBreak, vec![]),
                TreeNode::text("b"),
            ])]
        );
    }
}
