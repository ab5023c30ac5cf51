// Minimal editing host.
//
// The editor owns the document, the schema and every extension point a
// plugin can hook into: commands, the key-handler chain, post-fixers, the
// post-commit queue, placeholders and toolbar items.
//
// Batch lifecycle:
//   change(f) → writer records changes → post-fixers loop until quiet →
//   selection repair → placeholder sync → post-commit queue drained →
//   SelectionChanged dispatched if the selection moved

pub mod actions;
pub mod placeholder;
pub(crate) mod typing;

use std::collections::{BTreeMap, VecDeque};
use std::fmt;
use std::rc::Rc;

use actions::{EditorAction, Handling, KeyCombo, Priority};
use placeholder::PlaceholderRegistry;

use crate::downcast::{self, ViewElement};
use crate::error::SpoilerError;
use crate::model::{Change, Document, NodeId, Selection, TreeNode, Writer};
use crate::schema::Schema;
use crate::spoiler::SpoilerPlugin;
use crate::{upcast, Options};

pub use typing::RootPostFixer;

type Result<T> = std::result::Result<T, SpoilerError>;

/// Upper bound on post-fixer rounds per batch.
const MAX_FIXER_ROUNDS: usize = 32;

/// An editor extension. `init` runs once, when the plugin is added.
pub trait Plugin {
    fn name(&self) -> &'static str;

    fn init(&self, editor: &mut Editor);

    /// Called after `Editor::set_data` replaced the document.
    fn after_data_load(&self, _editor: &mut Editor) {}
}

pub trait Command {
    fn is_enabled(&self, doc: &Document, schema: &Schema) -> bool;

    fn execute(&self, editor: &mut Editor) -> Result<()>;

    /// On/off state shown by a toolbar button bound to this command.
    fn value(&self, _doc: &Document) -> bool {
        false
    }
}

/// One link of the key-action chain.
pub trait KeyHandler {
    fn handle(&self, editor: &mut Editor, action: &EditorAction) -> Result<Handling>;
}

/// Repair pass run after every batch.
///
/// Returns `true` when it changed the document, which triggers another round.
pub trait PostFixer {
    fn fix(&self, writer: &mut Writer, changes: &[Change]) -> Result<bool>;
}

/// Visual side effect deferred until the current batch has settled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PostCommitTask {
    /// Turn on the placeholder of a region.
    EnablePlaceholder(NodeId),
    /// Turn the placeholder of a region on if it is blank, off otherwise.
    RefreshPlaceholder(NodeId),
    ScrollToSelection,
}

/// Requests for the view layer, collected with `Editor::take_view_events`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewEvent {
    ScrollToSelection(Selection),
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct ToolbarItem {
    label: String,
    command: String,
}

/// Current state of a toolbar item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolbarState {
    pub label: String,
    pub is_enabled: bool,
    pub is_on: bool,
}

pub struct Editor {
    document: Document,
    schema: Schema,
    options: Options,
    commands: BTreeMap<String, Rc<dyn Command>>,
    key_handlers: Vec<(Priority, Rc<dyn KeyHandler>)>,
    post_fixers: Vec<Rc<dyn PostFixer>>,
    post_commit: VecDeque<PostCommitTask>,
    placeholders: PlaceholderRegistry,
    toolbar: BTreeMap<String, ToolbarItem>,
    view_events: Vec<ViewEvent>,
    plugins: Vec<Rc<dyn Plugin>>,
}

impl fmt::Debug for Editor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Editor")
            .field("document", &self.document)
            .field("options", &self.options)
            .field("commands", &self.commands.keys().collect::<Vec<_>>())
            .field("key_handlers", &self.key_handlers.len())
            .field("post_fixers", &self.post_fixers.len())
            .field("post_commit", &self.post_commit)
            .field("placeholders", &self.placeholders)
            .field("toolbar", &self.toolbar.keys().collect::<Vec<_>>())
            .field(
                "plugins",
                &self.plugins.iter().map(|p| p.name()).collect::<Vec<_>>(),
            )
            .finish()
    }
}

impl Editor {
    /// A host editor without plugins: paragraphs, headings and quotes.
    pub fn new(options: Options) -> Self {
        Self {
            document: Document::new(),
            schema: Schema::host(),
            options,
            commands: BTreeMap::new(),
            key_handlers: Vec::new(),
            post_fixers: vec![Rc::new(RootPostFixer)],
            post_commit: VecDeque::new(),
            placeholders: PlaceholderRegistry::new(),
            toolbar: BTreeMap::new(),
            view_events: Vec::new(),
            plugins: Vec::new(),
        }
    }

    /// A host editor with the spoiler plugin loaded.
    pub fn with_spoiler(options: Options) -> Self {
        let mut editor = Self::new(options);
        editor.use_plugin(SpoilerPlugin);
        editor
    }

    pub fn use_plugin<P: Plugin + 'static>(&mut self, plugin: P) -> &mut Self {
        let plugin: Rc<dyn Plugin> = Rc::new(plugin);
        plugin.init(self);
        trace!(plugin = plugin.name(), "plugin loaded");
        self.plugins.push(plugin);
        self
    }

    pub fn has_plugin(&self, name: &str) -> bool {
        self.plugins.iter().any(|p| p.name() == name)
    }

    // -----------------------------------------------------------------------
    // Accessors
    // -----------------------------------------------------------------------

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn schema_mut(&mut self) -> &mut Schema {
        &mut self.schema
    }

    pub fn options(&self) -> &Options {
        &self.options
    }

    pub fn selection(&self) -> Selection {
        self.document.selection()
    }

    pub fn placeholders(&self) -> &PlaceholderRegistry {
        &self.placeholders
    }

    // -----------------------------------------------------------------------
    // Data
    // -----------------------------------------------------------------------

    /// Replace the document with the upcast of `html`.
    pub fn set_data(&mut self, html: &str) {
        self.document = Document::from_children(upcast::transform(html, &self.schema));
        self.placeholders.clear();
        self.post_commit.clear();
        trace!(nodes = self.document.descendants(self.document.root()).len(), "data loaded");

        for plugin in self.plugins.clone() {
            plugin.after_data_load(self);
        }
        self.flush_post_commit();
    }

    /// Data HTML of the current document.
    pub fn get_data(&self) -> String {
        downcast::data::serialize(&self.document, self.document.root(), &self.options.data)
    }

    /// Editing view of the current document.
    pub fn view(&self) -> ViewElement {
        downcast::view::render(&self.document, &self.placeholders, &self.options.view)
    }

    // -----------------------------------------------------------------------
    // Batches
    // -----------------------------------------------------------------------

    /// Run `f` as one batch, then settle the document.
    ///
    /// Changes made before `f` failed are kept and settled like any other.
    pub fn change<R>(&mut self, f: impl FnOnce(&mut Writer) -> Result<R>) -> Result<R> {
        let selection_before = self.document.selection();
        let mut changes = Vec::new();
        let result = {
            let mut writer = Writer::new(&mut self.document, &self.schema, &mut changes);
            f(&mut writer)
        };
        self.commit(changes)?;
        let value = result?;

        if self.document.selection() != selection_before {
            self.dispatch(EditorAction::SelectionChanged)?;
        }
        Ok(value)
    }

    fn commit(&mut self, changes: Vec<Change>) -> Result<()> {
        if !changes.is_empty() {
            let fixers = self.post_fixers.clone();
            let mut all = changes;
            for _ in 0..MAX_FIXER_ROUNDS {
                let mut round = Vec::new();
                let mut fixed = false;
                {
                    let mut writer = Writer::new(&mut self.document, &self.schema, &mut round);
                    for fixer in &fixers {
                        fixed |= fixer.fix(&mut writer, &all)?;
                    }
                }
                all.extend(round);
                if !fixed {
                    break;
                }
            }
            self.document.bump_version();
        }

        self.document.fix_selection();
        self.placeholders.sync(&self.document);
        self.flush_post_commit();
        Ok(())
    }

    pub fn enqueue(&mut self, task: PostCommitTask) {
        self.post_commit.push_back(task);
    }

    fn flush_post_commit(&mut self) {
        while let Some(task) = self.post_commit.pop_front() {
            match task {
                PostCommitTask::EnablePlaceholder(region) => {
                    if self.document.contains(region) {
                        self.placeholders.enable(region);
                    }
                }
                PostCommitTask::RefreshPlaceholder(region) => {
                    if !self.document.contains(region) {
                        continue;
                    }
                    if placeholder::is_blank(&self.document, region) {
                        self.placeholders.enable(region);
                    } else {
                        self.placeholders.disable(region);
                    }
                }
                PostCommitTask::ScrollToSelection => {
                    let selection = self.document.selection();
                    self.view_events.push(ViewEvent::ScrollToSelection(selection));
                }
            }
        }
    }

    /// View requests produced since the last call.
    pub fn take_view_events(&mut self) -> Vec<ViewEvent> {
        std::mem::take(&mut self.view_events)
    }

    // -----------------------------------------------------------------------
    // Input
    // -----------------------------------------------------------------------

    /// Offer `action` to the handler chain; run the default behavior when no
    /// handler claims it.
    pub fn dispatch(&mut self, action: EditorAction) -> Result<Handling> {
        let handlers: Vec<Rc<dyn KeyHandler>> =
            self.key_handlers.iter().map(|(_, h)| Rc::clone(h)).collect();
        for handler in handlers {
            if handler.handle(self, &action)? == Handling::Handled {
                self.flush_post_commit();
                return Ok(Handling::Handled);
            }
        }

        if action != EditorAction::SelectionChanged {
            self.change(|writer| typing::apply_default(writer, &action))?;
        }
        self.flush_post_commit();
        Ok(Handling::NotHandled)
    }

    /// Map a key combination to an action and dispatch it.
    pub fn handle_key(&mut self, combo: &KeyCombo) -> Result<Handling> {
        match EditorAction::from_key(combo) {
            Some(action) => self.dispatch(action),
            None => Ok(Handling::NotHandled),
        }
    }

    pub fn type_text(&mut self, text: &str) -> Result<Handling> {
        self.dispatch(EditorAction::InsertText(text.to_string()))
    }

    pub fn set_selection(&mut self, selection: Selection) -> Result<()> {
        self.change(|writer| writer.set_selection(selection))
    }

    /// Insert a block at the selection with block-insertion semantics.
    pub fn insert_content(&mut self, tree: TreeNode) -> Result<NodeId> {
        self.change(|writer| typing::insert_block(writer, &tree))
    }

    // -----------------------------------------------------------------------
    // Commands and toolbar
    // -----------------------------------------------------------------------

    pub fn execute(&mut self, name: &str) -> Result<()> {
        let command = self
            .commands
            .get(name)
            .cloned()
            .ok_or_else(|| SpoilerError::UnknownCommand(name.to_string()))?;
        if !command.is_enabled(&self.document, &self.schema) {
            return Err(SpoilerError::CommandDisabled(name.to_string()));
        }
        trace!(command = name, "execute");
        command.execute(self)?;
        self.flush_post_commit();
        Ok(())
    }

    pub fn is_command_enabled(&self, name: &str) -> bool {
        self.commands
            .get(name)
            .is_some_and(|c| c.is_enabled(&self.document, &self.schema))
    }

    pub fn command_value(&self, name: &str) -> bool {
        self.commands
            .get(name)
            .is_some_and(|c| c.value(&self.document))
    }

    pub fn toolbar_item(&self, name: &str) -> Option<ToolbarState> {
        let item = self.toolbar.get(name)?;
        Some(ToolbarState {
            label: item.label.clone(),
            is_enabled: self.is_command_enabled(&item.command),
            is_on: self.command_value(&item.command),
        })
    }

    /// Click a toolbar item: execute its bound command.
    pub fn activate_toolbar_item(&mut self, name: &str) -> Result<()> {
        let command = self
            .toolbar
            .get(name)
            .map(|item| item.command.clone())
            .ok_or_else(|| SpoilerError::UnknownCommand(name.to_string()))?;
        self.execute(&command)
    }

    // -----------------------------------------------------------------------
    // Registration
    // -----------------------------------------------------------------------

    pub fn add_command(&mut self, name: impl Into<String>, command: Rc<dyn Command>) {
        self.commands.insert(name.into(), command);
    }

    /// Handlers run by descending priority, then in registration order.
    pub fn add_key_handler(&mut self, priority: Priority, handler: Rc<dyn KeyHandler>) {
        let index = self
            .key_handlers
            .iter()
            .position(|(p, _)| *p < priority)
            .unwrap_or(self.key_handlers.len());
        self.key_handlers.insert(index, (priority, handler));
    }

    pub fn add_post_fixer(&mut self, fixer: Rc<dyn PostFixer>) {
        self.post_fixers.push(fixer);
    }

    pub fn add_toolbar_item(
        &mut self,
        name: impl Into<String>,
        label: impl Into<String>,
        command: impl Into<String>,
    ) {
        self.toolbar.insert(
            name.into(),
            ToolbarItem {
                label: label.into(),
                command: command.into(),
            },
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{NodeKind, Position};
    use actions::Key;
    use pretty_assertions::assert_eq;
    use std::cell::RefCell;

    struct Recorder {
        name: &'static str,
        log: Rc<RefCell<Vec<&'static str>>>,
        result: Handling,
    }

    impl KeyHandler for Recorder {
        fn handle(&self, _editor: &mut Editor, _action: &EditorAction) -> Result<Handling> {
            self.log.borrow_mut().push(self.name);
            Ok(self.result)
        }
    }

    #[test]
    fn test_host_editor_types_text() {
        let mut editor = Editor::new(Options::default());
        editor.type_text("Hi").unwrap();
        assert_eq!(editor.get_data(), "<p>Hi</p>");
    }

    #[test]
    fn test_host_editor_without_spoiler() {
        let mut editor = Editor::new(Options::default());
        editor.set_data(r#"<div class="spoiler"><p>x</p></div>"#);
        assert_eq!(editor.get_data(), "<p>x</p>");
        assert_eq!(
            editor.execute("insertSpoiler"),
            Err(SpoilerError::UnknownCommand("insertSpoiler".into()))
        );
    }

    #[test]
    fn test_handler_chain_order() {
        let mut editor = Editor::new(Options::default());
        let log = Rc::new(RefCell::new(Vec::new()));
        let recorder = |name, result| {
            Rc::new(Recorder {
                name,
                log: Rc::clone(&log),
                result,
            })
        };
        editor.add_key_handler(Priority::Low, recorder("low", Handling::Handled));
        editor.add_key_handler(Priority::Normal, recorder("normal-1", Handling::NotHandled));
        editor.add_key_handler(Priority::High, recorder("high", Handling::NotHandled));
        editor.add_key_handler(Priority::Normal, recorder("normal-2", Handling::NotHandled));

        let handling = editor.handle_key(&KeyCombo::new(Key::Enter)).unwrap();
        assert_eq!(handling, Handling::Handled);
        assert_eq!(*log.borrow(), vec!["high", "normal-1", "normal-2", "low"]);
    }

    #[test]
    fn test_root_never_left_empty() {
        let mut editor = Editor::new(Options::default());
        editor.set_data("<p>a</p>");
        let paragraph = editor.document().child(editor.document().root(), 0).unwrap();
        editor.change(|writer| writer.remove(paragraph)).unwrap();
        assert_eq!(editor.get_data(), "<p></p>");
        let doc = editor.document();
        let fresh = doc.child(doc.root(), 0).unwrap();
        assert_eq!(doc.kind(fresh), Some(NodeKind::Paragraph));
        assert_eq!(editor.selection(), Selection::collapsed(Position::at_start(fresh)));
    }

    #[test]
    fn test_version_counts_batches() {
        let mut editor = Editor::new(Options::default());
        let before = editor.document().version();
        editor.type_text("a").unwrap();
        editor.type_text("b").unwrap();
        assert_eq!(editor.document().version(), before + 2);
    }

    #[test]
    fn test_failed_batch_reports_error() {
        let mut editor = Editor::new(Options::default());
        let root = editor.document().root();
        let result = editor.change(|writer| writer.insert_text(Position::new(root, 0), "x"));
        assert!(matches!(result, Err(SpoilerError::NotAllowed { .. })));
        assert_eq!(editor.get_data(), "<p></p>");
    }
}
