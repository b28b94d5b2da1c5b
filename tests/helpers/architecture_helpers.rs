//! Source scanning for the layer dependency checks.

use std::fs;
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

/// Every top-level module of the crate, in dependency order.
pub const LAYERS: &[&str] = &["base", "syntax", "annotation", "semantic", "project", "ide"];

/// Rust sources under `dir`.
pub fn rust_files(dir: &Path) -> Vec<PathBuf> {
    WalkDir::new(dir)
        .into_iter()
        .filter_map(Result::ok)
        .filter(|entry| entry.file_type().is_file())
        .map(|entry| entry.into_path())
        .filter(|path| path.extension().is_some_and(|ext| ext == "rs"))
        .collect()
}

/// Non-test code lines of a file, with their 1-based line numbers. Comment
/// lines and everything from an inline `#[cfg(test)] mod ... {` on are
/// dropped.
pub fn code_lines(content: &str) -> Vec<(usize, &str)> {
    let lines: Vec<&str> = content.lines().collect();
    let end = lines
        .windows(2)
        .position(|pair| {
            let next = pair[1].trim();
            pair[0].trim() == "#[cfg(test)]" && next.starts_with("mod ") && next.ends_with('{')
        })
        .unwrap_or(lines.len());
    lines[..end]
        .iter()
        .enumerate()
        .filter(|(_, line)| !line.trim_start().starts_with("//"))
        .map(|(index, line)| (index + 1, *line))
        .collect()
}

/// Uses of `crate::<module>` in `dir` where `module` is neither `layer`
/// itself nor one of `allowed`.
pub fn collect_layer_violations(dir: &Path, allowed: &[&str], layer: &str) -> Vec<String> {
    let mut violations = Vec::new();
    for path in rust_files(dir) {
        if path.file_name().is_some_and(|name| name == "tests.rs") {
            continue;
        }
        let Ok(content) = fs::read_to_string(&path) else {
            continue;
        };
        for (number, line) in code_lines(&content) {
            for module in LAYERS {
                if *module == layer || allowed.contains(module) {
                    continue;
                }
                if line.contains(&format!("crate::{module}")) {
                    violations.push(format!("  {}:{number} uses {module}", path.display()));
                }
            }
        }
    }
    violations
}

pub fn format_violation_list<T: std::fmt::Display>(items: &[T]) -> String {
    items
        .iter()
        .map(|item| format!("  - {item}"))
        .collect::<Vec<_>>()
        .join("\n")
}
