use luasema::ide::{Analysis, goto_definition, goto_type_definition};

use crate::helpers::workspace_helpers::{memory_workspace, position_of};

const UTIL: &str = "local M = {}\nfunction M.run() end\nreturn M\n";
const MAIN: &str = "local util = require('util')\nutil.run()\n";

#[test]
fn test_member_of_required_module() {
    let ws = memory_workspace(&[("util.lua", UTIL), ("main.lua", MAIN)]);
    let at = position_of(MAIN, 1, "run", 1);
    let result = goto_definition(&ws, "main.lua", at.line, at.column);
    assert_eq!(result.targets.len(), 1);
    assert_eq!(result.targets[0].file.as_ref(), "util.lua");
    assert_eq!(result.targets[0].span.start.line, 1);
}

#[test]
fn test_required_local_goes_to_its_declaration() {
    let ws = memory_workspace(&[("util.lua", UTIL), ("main.lua", MAIN)]);
    let result = goto_definition(&ws, "main.lua", 1, 2);
    assert_eq!(result.targets[0].file.as_ref(), "main.lua");
    assert_eq!(result.targets[0].span.start.line, 0);
    assert_eq!(result.targets[0].span.start.column, 6);
}

#[test]
fn test_type_definition_across_files() {
    let types = "---@class Vector\n---@field x number\nlocal Vector = {}\n";
    let main = "---@type Vector\nlocal v = nil\nprint(v.x)\n";
    let ws = memory_workspace(&[("types.lua", types), ("main.lua", main)]);
    let at = position_of(main, 2, "v", 0);
    let result = goto_type_definition(&ws, "main.lua", at.line, at.column);
    assert_eq!(result.targets[0].file.as_ref(), "types.lua");
    assert_eq!(result.targets[0].name, "Vector");
}

#[test]
fn test_snapshot_is_unaffected_by_later_edits() {
    let ws = memory_workspace(&[("a.lua", "local value = 1\nprint(value)\n")]);
    let analysis = Analysis::new(&ws);
    ws.open_document(std::path::Path::new("a.lua"), "\n\nlocal value = 1\nprint(value)\n");

    let old = analysis.goto_definition("a.lua", 1, 7);
    assert_eq!(old.targets[0].span.start.line, 0);
    let new = goto_definition(&ws, "a.lua", 3, 7);
    assert_eq!(new.targets[0].span.start.line, 2);
}
