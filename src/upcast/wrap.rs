// Implicit paragraph detection and schema fitting.
//
// When a flow container has mixed inline + block children, inline runs are
// wrapped in implicit paragraphs. After conversion, every subtree is fitted
// against the schema: nodes that are not allowed where they ended up are
// unwrapped into content that is.

use super::util::{drop_surrounding_breaks, is_whitespace_only};
use crate::model::{NodeKind, TreeNode};
use crate::schema::{Schema, SchemaContext};
use crate::spoiler::convert::{normalize_structure, unwrap_spoiler};

/// Wrap mixed content: inline runs become paragraphs, blocks pass through.
pub(crate) fn wrap(nodes: Vec<TreeNode>) -> Vec<TreeNode> {
    let mut result = Vec::new();
    let mut inline_run: Vec<TreeNode> = Vec::new();

    for node in nodes {
        if node.kind.is_inline() {
            inline_run.push(node);
        } else {
            flush_run(&mut inline_run, &mut result);
            result.push(node);
        }
    }
    flush_run(&mut inline_run, &mut result);

    result
}

fn flush_run(run: &mut Vec<TreeNode>, result: &mut Vec<TreeNode>) {
    if run.is_empty() {
        return;
    }
    let run = drop_surrounding_breaks(std::mem::take(run));
    if !is_whitespace_only(&run) {
        result.push(TreeNode::paragraph(run));
    }
}

/// Flatten blocks into inline content, separating block texts with a space.
pub(crate) fn inline_only(nodes: Vec<TreeNode>) -> Vec<TreeNode> {
    let mut result = Vec::new();
    let mut after_block = false;

    for node in nodes {
        if node.kind.is_inline() {
            if after_block && !result.is_empty() {
                result.push(TreeNode::text(" "));
            }
            after_block = false;
            result.push(node);
            continue;
        }
        let inner = inline_only(node.children);
        if is_whitespace_only(&inner) {
            continue;
        }
        if !result.is_empty() {
            result.push(TreeNode::text(" "));
        }
        result.extend(inner);
        after_block = true;
    }

    result
}

/// Fit `nodes` into `ctx`, unwrapping whatever the schema rejects there.
pub(crate) fn fit(schema: &Schema, ctx: &SchemaContext, nodes: Vec<TreeNode>) -> Vec<TreeNode> {
    let mut result = Vec::new();

    for node in nodes {
        if schema.check_child(ctx, node.kind) {
            result.push(fit_node(schema, ctx, node));
            continue;
        }
        if node.kind.is_inline() {
            // Kept only where a paragraph can hold it; wrapped below.
            if schema.check_child(ctx, NodeKind::Paragraph) {
                result.push(node);
            }
            continue;
        }
        trace!(kind = node.kind.name(), "unwrapping disallowed node");
        let replacement = unwrap_disallowed(node);
        result.extend(fit(schema, ctx, replacement));
    }

    let has_stray_inline = result.iter().any(|n| n.kind.is_inline());
    if has_stray_inline
        && !schema.check_child(ctx, NodeKind::Text)
        && schema.check_child(ctx, NodeKind::Paragraph)
    {
        return wrap(result);
    }
    result
}

/// Fit the children of an allowed node.
fn fit_node(schema: &Schema, ctx: &SchemaContext, node: TreeNode) -> TreeNode {
    if node.kind.is_inline() {
        return node;
    }
    let children = fit(schema, &ctx.child(node.kind), node.children);
    let node = TreeNode {
        children,
        ..node
    };
    if node.kind == NodeKind::Spoiler {
        normalize_structure(node)
    } else {
        node
    }
}

/// Replacement content for a node that is not allowed where it is.
fn unwrap_disallowed(node: TreeNode) -> Vec<TreeNode> {
    match node.kind {
        NodeKind::Spoiler => unwrap_spoiler(node),
        _ => node.children,
    }
}
