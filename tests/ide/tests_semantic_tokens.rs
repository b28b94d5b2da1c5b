use luasema::ide::{TokenType, color_file};

use crate::helpers::workspace_helpers::memory_workspace;

#[test]
fn test_shadowed_global_is_not_colored() {
    let ws = memory_workspace(&[
        ("lib.lua", "function greet() end\n"),
        ("main.lua", "greet()\nlocal greet = 1\nprint(greet)\n"),
    ]);
    let tokens: Vec<_> = color_file(&ws, "main.lua")
        .into_iter()
        .map(|t| (t.line, t.col, t.length, t.token_type))
        .collect();
    assert_eq!(tokens, vec![(0, 0, 5, TokenType::GlobalFunction)]);
}

#[test]
fn test_tokens_are_sorted_and_unique() {
    let src = "---@type Item[]\nItems = {}\nprint(Items)\n";
    let ws = memory_workspace(&[("main.lua", src), ("item.lua", "---@class Item\nlocal Item = {}\n")]);
    let tokens = color_file(&ws, "main.lua");
    let keys: Vec<(usize, usize)> = tokens.iter().map(|t| (t.line, t.col)).collect();
    let mut sorted = keys.clone();
    sorted.sort();
    sorted.dedup();
    assert_eq!(keys, sorted);
    assert_eq!(tokens[0].token_type, TokenType::AnnotationType);
    assert_eq!((tokens[0].col, tokens[0].length), (9, 4));
}
