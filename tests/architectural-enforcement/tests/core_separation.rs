//! Integration Test: Core Separation
//!
//! **Policy**: `orgbot-core` is headless. It must not depend on terminal UI
//! crates, and its production code must propagate errors rather than
//! unwrap them.

use std::fs;

use architectural_enforcement::{
    assert_no_violations, rust_files, scan_production, workspace_root, Violation,
};

const UI_CRATES: [&str; 2] = ["ratatui", "crossterm"];

#[test]
fn test_core_manifest_has_no_ui_crates() {
    let manifest_path = workspace_root().join("assistant/core/Cargo.toml");
    let manifest = fs::read_to_string(&manifest_path).unwrap();

    let violations: Vec<_> = manifest
        .lines()
        .enumerate()
        .filter(|(_, line)| {
            let name = line.split('=').next().unwrap_or("").trim();
            UI_CRATES.contains(&name)
        })
        .map(|(idx, line)| Violation {
            path: manifest_path.clone(),
            line: idx + 1,
            text: line.trim().to_string(),
        })
        .collect();

    assert_no_violations("UI crates in the core manifest", &violations);
}

#[test]
fn test_core_sources_do_not_use_ui_crates() {
    let violations: Vec<_> = rust_files("assistant/core/src")
        .into_iter()
        .flat_map(|path| {
            scan_production(&path, |code| {
                UI_CRATES
                    .iter()
                    .any(|krate| code.contains(&format!("{krate}::")))
            })
        })
        .collect();

    assert_no_violations("UI crate paths in core sources", &violations);
}

#[test]
fn test_no_unwrap_in_core_production_code() {
    let violations: Vec<_> = rust_files("assistant/core/src")
        .into_iter()
        .flat_map(|path| {
            scan_production(&path, |code| {
                code.contains(".unwrap()") || code.contains(".expect(")
            })
        })
        .collect();

    assert_no_violations("unwrap()/expect() in core production code", &violations);
}
