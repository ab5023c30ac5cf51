// Regression tests — every bug found becomes a test case here.
// Never delete a test from this file.

use pretty_assertions::assert_eq;
use spoiler_block::spoiler::INSERT_SPOILER;
use spoiler_block::{
    html_to_document, normalize, Editor, Key, KeyCombo, NodeKind, Options, Position, Selection,
};

/// Pathologically deep markup must not overflow the stack; the subtree past
/// the nesting limit keeps its text as one paragraph.
#[test]
fn deep_nesting_does_not_overflow() {
    let depth = 5_000;
    let html = format!("{}deep{}", "<div>".repeat(depth), "</div>".repeat(depth));
    let out = normalize(&html);
    assert_eq!(out, "<p>deep</p>");
}

/// Text past the nesting limit is flattened, block boundaries become spaces.
#[test]
fn text_past_nesting_limit_is_kept() {
    let depth = 400;
    let html = format!(
        "{}<p>one</p><p><b>tw</b>o</p><script>skip()</script>{}",
        "<div>".repeat(depth),
        "</div>".repeat(depth)
    );
    assert_eq!(normalize(&html), "<p>one two</p>");
}

/// Tabs, line breaks and non-breaking spaces typed into the editor come back
/// unchanged after a save and reload.
#[test]
fn typed_whitespace_survives_reload() {
    for typed in ["a\tb", "a\nb", "a\r\nb", "a\u{a0}b", "a  b"] {
        let mut editor = Editor::with_spoiler(Options::default());
        editor.type_text(typed).unwrap();
        let saved = html_to_document(&editor.get_data());
        assert_eq!(saved.to_trees(), editor.document().to_trees(), "typed {typed:?}");
    }
}

/// A range between a spoiler's title and content is widened to the whole
/// spoiler, so Backspace can never delete the title alone.
#[test]
fn range_inside_spoiler_never_deletes_title() {
    let mut editor = Editor::with_spoiler(Options::default());
    let html = r#"<div class="spoiler"><h3 class="spoiler-title">Plot</h3><div class="spoiler-content"><p>x</p></div></div>"#;
    editor.set_data(html);
    let spoiler = editor.document().nodes_of_kind(NodeKind::Spoiler)[0];
    editor
        .set_selection(Selection::range(
            Position::new(spoiler, 0),
            Position::new(spoiler, 1),
        ))
        .unwrap();
    editor.handle_key(&KeyCombo::new(Key::Backspace)).unwrap();

    let doc = editor.document();
    let parts: Vec<NodeKind> = doc
        .children(spoiler)
        .iter()
        .filter_map(|&c| doc.kind(c))
        .collect();
    assert_eq!(parts, vec![NodeKind::SpoilerTitle, NodeKind::SpoilerContent]);
    assert_eq!(editor.get_data(), html);
}

/// Removing a title through the writer gets it back on commit.
#[test]
fn removed_title_is_restored() {
    let mut editor = Editor::with_spoiler(Options::default());
    editor.set_data(r#"<div class="spoiler"><h3 class="spoiler-title">Plot</h3><div class="spoiler-content"><p>x</p></div></div>"#);
    let title = editor.document().nodes_of_kind(NodeKind::SpoilerTitle)[0];
    editor.change(|writer| writer.remove(title)).unwrap();
    assert_eq!(
        editor.get_data(),
        r#"<div class="spoiler"><h3 class="spoiler-title"></h3><div class="spoiler-content"><p>x</p></div></div>"#
    );
}

/// Enter twice in a fresh spoiler leaves it; the emptied spoiler goes away.
#[test]
fn enter_twice_in_fresh_spoiler_removes_it() {
    let mut editor = Editor::with_spoiler(Options::default());
    editor.execute(INSERT_SPOILER).unwrap();
    editor.handle_key(&KeyCombo::new(Key::Enter)).unwrap();
    editor.handle_key(&KeyCombo::new(Key::Enter)).unwrap();
    assert!(editor.document().nodes_of_kind(NodeKind::Spoiler).is_empty());
    assert_eq!(editor.get_data(), "<p></p>");
}

/// Spoiler markup nested inside a spoiler content is flattened, at any depth.
#[test]
fn spoiler_inside_content_is_unwrapped() {
    let html = concat!(
        r#"<div class="spoiler"><h3 class="spoiler-title">A</h3><div class="spoiler-content">"#,
        r#"<blockquote><div class="spoiler"><h3 class="spoiler-title">B</h3>"#,
        r#"<div class="spoiler-content"><p>c</p></div></div></blockquote>"#,
        r#"</div></div>"#,
    );
    assert_eq!(
        normalize(html),
        r#"<div class="spoiler"><h3 class="spoiler-title">A</h3><div class="spoiler-content"><p>B</p><p>c</p></div></div>"#
    );
}

/// A second title element is an extra, not a replacement title.
#[test]
fn second_title_goes_to_content() {
    let html = concat!(
        r#"<div class="spoiler"><h3 class="spoiler-title">One</h3>"#,
        r#"<h3 class="spoiler-title">Two</h3></div>"#,
    );
    assert_eq!(
        normalize(html),
        r#"<div class="spoiler"><h3 class="spoiler-title">One</h3><div class="spoiler-content"><h3>Two</h3></div></div>"#
    );
}

/// Markup-like text in the title is escaped, never re-parsed as elements.
#[test]
fn title_text_is_escaped() {
    let html = r#"<div class="spoiler"><h3 class="spoiler-title">a &lt;b&gt; &amp; c</h3></div>"#;
    assert!(normalize(html).contains(r#"<h3 class="spoiler-title">a &lt;b&gt; &amp; c</h3>"#));
}

/// Enter at the end of a title must not split it into a second title.
#[test]
fn enter_never_splits_title() {
    let mut editor = Editor::with_spoiler(Options::default());
    editor.set_data(r#"<div class="spoiler"><h3 class="spoiler-title">Plot</h3><div class="spoiler-content"><p>x</p></div></div>"#);
    let title = editor.document().nodes_of_kind(NodeKind::SpoilerTitle)[0];
    editor
        .set_selection(Selection::collapsed(Position::new(title, 2)))
        .unwrap();
    editor.handle_key(&KeyCombo::new(Key::Enter)).unwrap();
    assert_eq!(editor.document().nodes_of_kind(NodeKind::SpoilerTitle).len(), 1);
    assert_eq!(editor.document().text_content(title), "Plot");
}

/// Backspace at the start of a content must not merge its first block into
/// the title.
#[test]
fn backspace_at_content_start_keeps_title() {
    let mut editor = Editor::with_spoiler(Options::default());
    let html = r#"<div class="spoiler"><h3 class="spoiler-title">Plot</h3><div class="spoiler-content"><p>x</p></div></div>"#;
    editor.set_data(html);
    let block = editor.document().nodes_of_kind(NodeKind::Paragraph)[0];
    editor
        .set_selection(Selection::collapsed(Position::at_start(block)))
        .unwrap();
    editor.handle_key(&KeyCombo::new(Key::Backspace)).unwrap();
    assert_eq!(editor.get_data(), html);
}

/// Removing the only block of a content leaves the content with an empty
/// paragraph instead of an invalid empty region.
#[test]
fn removed_only_block_is_replaced() {
    let mut editor = Editor::with_spoiler(Options::default());
    editor.set_data(r#"<div class="spoiler"><h3 class="spoiler-title">Plot</h3><div class="spoiler-content"><p>x</p></div></div>"#);
    let block = editor.document().nodes_of_kind(NodeKind::Paragraph)[0];
    editor.change(|writer| writer.remove(block)).unwrap();
    assert_eq!(
        editor.get_data(),
        r#"<div class="spoiler"><h3 class="spoiler-title">Plot</h3><div class="spoiler-content"><p></p></div></div>"#
    );
}
