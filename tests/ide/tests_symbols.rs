use luasema::ide::{SymbolKind, document_symbols, workspace_symbols};

use crate::helpers::workspace_helpers::memory_workspace;

#[test]
fn test_workspace_query_spans_files() {
    let ws = memory_workspace(&[
        ("a.lua", "---@class Point\nlocal Point = {}\n"),
        ("b.lua", "local pointer = 1\nlocal other = 2\n"),
    ]);
    let found: Vec<(String, SymbolKind, String)> = workspace_symbols(&ws, "point")
        .into_iter()
        .map(|s| (s.name.to_string(), s.kind, s.file.to_string()))
        .collect();
    assert_eq!(
        found,
        vec![
            ("Point".to_string(), SymbolKind::Class, "a.lua".to_string()),
            ("Point".to_string(), SymbolKind::Variable, "a.lua".to_string()),
            ("pointer".to_string(), SymbolKind::Variable, "b.lua".to_string()),
        ]
    );
}

#[test]
fn test_nested_locals_are_not_document_symbols() {
    let ws = memory_workspace(&[("a.lua", "local function outer()\n  local inner = 1\nend\n")]);
    let names: Vec<String> = document_symbols(&ws, "a.lua")
        .into_iter()
        .map(|s| s.name.to_string())
        .collect();
    assert_eq!(names, vec!["outer".to_string()]);
}
