// Shared test helpers for spoiler-block.

use std::fs;
use std::path::Path;

use serde::Deserialize;
use spoiler_block::Options;

/// A fixture's input HTML, expected data HTML and options.
pub struct Fixture {
    pub html: String,
    pub expected: String,
    pub options: Options,
}

/// Optional per-fixture settings from `index.json`.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct FixtureConfig {
    fill_empty_blocks: bool,
}

/// Load a test fixture.
///
/// Fixture directories contain `index.html`, `expected.html`, and optionally
/// `index.json`.
pub fn load_fixture(name: &str) -> Fixture {
    let base = Path::new(env!("CARGO_MANIFEST_DIR")).join("test-fixtures").join(name);
    let html = fs::read_to_string(base.join("index.html"))
        .unwrap_or_else(|_| panic!("Missing fixture: {}/index.html", name));
    let expected = fs::read_to_string(base.join("expected.html"))
        .unwrap_or_else(|_| panic!("Missing fixture: {}/expected.html", name));

    let config = match fs::read_to_string(base.join("index.json")) {
        Ok(json) => serde_json::from_str::<FixtureConfig>(&json)
            .unwrap_or_else(|e| panic!("Bad fixture config {}/index.json: {e}", name)),
        Err(_) => FixtureConfig::default(),
    };

    let options = Options::new().with_fill_empty_blocks(config.fill_empty_blocks);

    Fixture {
        html,
        expected: expected.trim_end_matches('\n').to_string(),
        options,
    }
}
