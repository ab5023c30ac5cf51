// Document model → HTML and view serializers.
//
// `data` writes the compact HTML that is saved and exported. `view` builds
// the editing surface: the same markers plus widget decorations, placeholders
// and links back to model nodes.

pub mod data;
pub(crate) mod escape;
pub mod view;

pub use view::{ViewElement, ViewNode, ViewRole};

use crate::model::NodeKind;
use crate::spoiler;

/// Data serializer configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DataOptions {
    /// Write empty text blocks as `<p>&nbsp;</p>` rather than `<p></p>`.
    pub fill_empty_blocks: bool,
}

/// Editing view configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewOptions {
    /// Accessible label of the spoiler widget.
    pub widget_label: String,
    pub title_placeholder: String,
    pub content_placeholder: String,
    /// Label of the insert toolbar button.
    pub button_label: String,
}

impl Default for ViewOptions {
    fn default() -> Self {
        Self {
            widget_label: "Spoiler".to_string(),
            title_placeholder: "Spoiler title".to_string(),
            content_placeholder: "Spoiler content".to_string(),
            button_label: "Insert spoiler".to_string(),
        }
    }
}

/// Element name and class an element kind is written with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Marker {
    pub tag: &'static str,
    pub class: Option<&'static str>,
}

impl Marker {
    const fn tag(tag: &'static str) -> Self {
        Self { tag, class: None }
    }
}

const HEADING_TAGS: [&str; 6] = ["h1", "h2", "h3", "h4", "h5", "h6"];

/// Marker of an element kind. Root and text have none.
pub(crate) fn marker(kind: NodeKind) -> Option<Marker> {
    match kind {
        NodeKind::Root | NodeKind::Text => None,
        NodeKind::Paragraph => Some(Marker::tag("p")),
        NodeKind::Heading(level) => {
            let index = usize::from(level.clamp(1, 6)) - 1;
            Some(Marker::tag(HEADING_TAGS[index]))
        }
        NodeKind::Quote => Some(Marker::tag("blockquote")),
        NodeKind::SoftBreak => Some(Marker::tag("br")),
        NodeKind::Spoiler | NodeKind::SpoilerTitle | NodeKind::SpoilerContent => {
            spoiler::convert::marker(kind)
        }
    }
}
