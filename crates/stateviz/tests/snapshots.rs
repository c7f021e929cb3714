//! Snapshot tests for Mermaid output
//!
//! Each `tests/fixtures/<name>.kt` source is rendered and compared against
//! `tests/fixtures/<name>.md`. To update fixtures after changing rendering,
//! run the tests with UPDATE_FIXTURES=1

use stateviz::render;
use std::fs;
use std::path::Path;

/// Render a fixture source and compare it to its expected diagram
fn assert_fixture(name: &str) {
    let fixtures = Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures");
    let source_path = fixtures.join(format!("{}.kt", name));
    let fixture_path = fixtures.join(format!("{}.md", name));

    let source = fs::read_to_string(&source_path)
        .unwrap_or_else(|_| panic!("Source not found: {}", source_path.display()));
    let output = render(&source).expect("render should succeed");

    if std::env::var("UPDATE_FIXTURES").is_ok() {
        fs::write(&fixture_path, &output).expect("failed to write fixture");
        println!("Updated fixture: {}", fixture_path.display());
        return;
    }

    let expected = fs::read_to_string(&fixture_path).unwrap_or_else(|_| {
        panic!(
            "Fixture not found: {}\nRun with UPDATE_FIXTURES=1 to create it.\n\nActual output:\n{}",
            fixture_path.display(),
            output
        )
    });

    if output != expected {
        panic!(
            "Snapshot mismatch for '{}'!\n\n=== Expected ===\n{}\n=== Actual ===\n{}\nRun with UPDATE_FIXTURES=1 to update.",
            name, expected, output
        );
    }
}

#[test]
fn test_matter_typed_dsl() {
    assert_fixture("matter");
}

#[test]
fn test_traffic_light_string_dsl() {
    assert_fixture("traffic_light");
}

#[test]
fn test_two_machines_in_one_file() {
    assert_fixture("two_machines");
}
