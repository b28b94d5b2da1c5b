use luasema::ide::hover;

use crate::helpers::workspace_helpers::{memory_workspace, position_of};

#[test]
fn test_global_function_from_another_file() {
    let ws = memory_workspace(&[
        ("lib.lua", "function greet(name, greeting) end\n"),
        ("main.lua", "greet('you')\n"),
    ]);
    let result = hover(&ws, "main.lua", 0, 2).expect("hover");
    assert!(
        result.contents.contains("global function greet(name, greeting)"),
        "{}",
        result.contents
    );
    let var = result.symbol.and_then(|s| s.var).expect("declared");
    assert_eq!(var.file.as_ref(), "lib.lua");
}

#[test]
fn test_inherited_class_field() {
    let types = "---@class Entity\n---@field id integer\n\n---@class Player : Entity\n---@field name string\n";
    let main = "---@type Player\nlocal p = nil\nprint(p.id)\n";
    let ws = memory_workspace(&[("types.lua", types), ("main.lua", main)]);
    let at = position_of(main, 2, "id", 0);
    let result = hover(&ws, "main.lua", at.line, at.column).expect("hover");
    assert!(result.contents.contains("id : integer"), "{}", result.contents);
    let symbol = result.symbol.expect("symbol");
    assert_eq!(symbol.owner_class.as_deref(), Some("Entity"));
}

#[test]
fn test_class_hover_lists_fields() {
    let main = "---@class Pair\n---@field left any\n---@field right any\nlocal Pair = {}\n\n---@type Pair\nlocal p = nil\n";
    let ws = memory_workspace(&[("main.lua", main)]);
    let result = hover(&ws, "main.lua", 5, 10).expect("hover");
    assert!(
        result.contents.contains("class Pair\n  left : any\n  right : any"),
        "{}",
        result.contents
    );
    assert!(result.symbol.is_none());
}
