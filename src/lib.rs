// spoiler-block: a collapsible spoiler block for a rich-text document model.
//
// Architecture:
//   HTML string → html5ever parse → upcast → document model (arena) → downcast → HTML / view tree
//                                              ↑
//                 key actions → handler chain → writer batch → post-fixers
//
// The spoiler is a compound node (title + content). The schema, converters,
// key handlers and post-fixer in `spoiler` keep it well-formed across all
// three representations; `editor` is the minimal host they plug into.

/// Debug-level event, compiled out unless the `tracing` feature is enabled.
macro_rules! trace {
    ($($arg:tt)*) => {
        #[cfg(feature = "tracing")]
        tracing::debug!($($arg)*);
    };
}

pub mod downcast;
pub mod editor;
mod error;
pub mod model;
pub mod schema;
pub mod spoiler;
mod upcast;

pub use downcast::view::{ViewElement, ViewNode, ViewRole};
pub use downcast::{DataOptions, ViewOptions};
pub use editor::actions::{Direction, EditorAction, Handling, Key, KeyCombo, Modifiers, Priority};
pub use editor::Editor;
pub use error::SpoilerError;
pub use model::{Document, NodeId, NodeKind, Position, Selection, TreeNode};
pub use schema::Schema;
pub use spoiler::SpoilerPlugin;

/// Conversion and editing options.
#[derive(Debug, Clone, Default)]
pub struct Options {
    /// Data (save/export) serializer options.
    pub data: DataOptions,
    /// Editing view options: labels and placeholder texts.
    pub view: ViewOptions,
}

impl Options {
    /// Create a new Options with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Write empty text blocks as `<p>&nbsp;</p>` instead of `<p></p>`.
    pub fn with_fill_empty_blocks(mut self, fill: bool) -> Self {
        self.data.fill_empty_blocks = fill;
        self
    }

    /// Set the accessible label of the spoiler widget.
    pub fn with_widget_label(mut self, label: impl Into<String>) -> Self {
        self.view.widget_label = label.into();
        self
    }

    /// Set the placeholder shown in an empty spoiler title.
    pub fn with_title_placeholder(mut self, text: impl Into<String>) -> Self {
        self.view.title_placeholder = text.into();
        self
    }

    /// Set the placeholder shown in an empty spoiler content.
    pub fn with_content_placeholder(mut self, text: impl Into<String>) -> Self {
        self.view.content_placeholder = text.into();
        self
    }

    /// Set the label of the "insert spoiler" toolbar button.
    pub fn with_button_label(mut self, label: impl Into<String>) -> Self {
        self.view.button_label = label.into();
        self
    }
}

/// The host schema with the spoiler kinds registered.
pub fn spoiler_schema() -> Schema {
    let mut schema = Schema::host();
    spoiler::register_schema(&mut schema);
    schema
}

/// Parse HTML into a document, repairing malformed spoilers on the way.
///
/// # Examples
///
/// ```
/// use spoiler_block::{html_to_document, NodeKind};
///
/// let doc = html_to_document(r#"<div class="spoiler"><h3 class="spoiler-title">Plot</h3></div>"#);
/// assert_eq!(doc.nodes_of_kind(NodeKind::SpoilerContent).len(), 1);
/// ```
pub fn html_to_document(html: &str) -> Document {
    let schema = spoiler_schema();
    Document::from_children(upcast::transform(html, &schema))
}

/// Serialize a document to its data (save/export) HTML.
pub fn document_to_html(doc: &Document, options: &Options) -> String {
    downcast::data::serialize(doc, doc.root(), &options.data)
}

/// Upcast then data-downcast an HTML string using default options.
///
/// # Examples
///
/// ```
/// let html = spoiler_block::normalize(r#"<div class="spoiler"></div>"#);
/// assert_eq!(
///     html,
///     r#"<div class="spoiler"><h3 class="spoiler-title"></h3><div class="spoiler-content"><p></p></div></div>"#
/// );
/// ```
pub fn normalize(html: &str) -> String {
    normalize_with(html, &Options::default())
}

/// Upcast then data-downcast an HTML string with custom options.
pub fn normalize_with(html: &str, options: &Options) -> String {
    document_to_html(&html_to_document(html), options)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_empty() {
        assert_eq!(normalize(""), "<p></p>");
    }

    #[test]
    fn test_normalize_simple_paragraph() {
        assert_eq!(normalize("<p>Hello, world!</p>"), "<p>Hello, world!</p>");
    }

    #[test]
    fn test_options_builder() {
        let options = Options::new()
            .with_fill_empty_blocks(true)
            .with_widget_label("Spoiler block")
            .with_title_placeholder("Title")
            .with_content_placeholder("Body");

        assert!(options.data.fill_empty_blocks);
        assert_eq!(options.view.widget_label, "Spoiler block");
        assert_eq!(options.view.title_placeholder, "Title");
        assert_eq!(options.view.content_placeholder, "Body");
    }

    #[test]
    fn test_default_options() {
        let options = Options::default();
        assert!(!options.data.fill_empty_blocks);
        assert_eq!(options.view.widget_label, "Spoiler");
        assert_eq!(options.view.button_label, "Insert spoiler");
    }

    #[test]
    fn test_spoiler_schema_registers_spoiler_kinds() {
        let schema = spoiler_schema();
        assert!(schema.is_registered(NodeKind::Spoiler));
        assert!(schema.is_registered(NodeKind::SpoilerTitle));
        assert!(schema.is_registered(NodeKind::SpoilerContent));
        assert!(!Schema::host().is_registered(NodeKind::Spoiler));
    }
}
