// HTML tree → document model transform
//
// Parses HTML via html5ever and walks the resulting tree, dispatching each
// element to a handler that produces model subtrees. The result is cleaned up
// (whitespace) and then fitted against the schema before it becomes a
// document.

pub(crate) mod handlers;
pub(crate) mod util;
pub(crate) mod whitespace;
pub(crate) mod wrap;

use html5ever::parse_document;
use html5ever::tendril::TendrilSink;
use html5ever::tree_builder::TreeBuilderOpts;
use html5ever::ParseOpts;
use markup5ever_rcdom::RcDom;

use crate::model::TreeNode;
use crate::schema::{Schema, SchemaContext};

/// Elements nested deeper than this are dropped.
pub(crate) const MAX_DEPTH: usize = 256;

/// Transformation state threaded through all handlers.
pub(crate) struct State<'a> {
    /// Decides which markers are recognized (spoiler kinds may be unregistered).
    pub schema: &'a Schema,
    /// Current element nesting depth.
    pub depth: usize,
}

impl<'a> State<'a> {
    fn new(schema: &'a Schema) -> Self {
        Self { schema, depth: 0 }
    }
}

/// Parse an HTML string and transform it into root-level model subtrees.
pub(crate) fn transform(html: &str, schema: &Schema) -> Vec<TreeNode> {
    let dom = parse_html(html);
    let mut state = State::new(schema);

    let children = handlers::all(&mut state, &dom.document);
    let mut children = wrap::wrap(children);
    whitespace::post_process_whitespace(&mut children);
    let children = wrap::fit(schema, &SchemaContext::root(), children);

    trace!(blocks = children.len(), "upcast");
    children
}

/// Parse an HTML string into an html5ever RcDom.
fn parse_html(html: &str) -> RcDom {
    let opts = ParseOpts {
        tree_builder: TreeBuilderOpts {
            drop_doctype: true,
            ..Default::default()
        },
        ..Default::default()
    };
    parse_document(RcDom::default(), opts)
        .from_utf8()
        .one(html.as_bytes())
}
