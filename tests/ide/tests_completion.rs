use luasema::ide::{CompletionKind, completion};

use crate::helpers::workspace_helpers::memory_workspace;

fn labels(items: &[luasema::ide::CompletionItem]) -> Vec<&str> {
    items.iter().map(|item| item.label.as_ref()).collect()
}

#[test]
fn test_members_of_required_module() {
    let ws = memory_workspace(&[
        ("util.lua", "local M = {}\nfunction M.run() end\nM.version = 2\nreturn M\n"),
        ("main.lua", "local util = require('util')\n\n"),
    ]);
    let items = completion(&ws, "main.lua", 1, 0, &["util", ""]);
    let mut names = labels(&items);
    names.sort_unstable();
    assert_eq!(names, vec!["run", "version"]);
    let kind_of = |label: &str| items.iter().find(|item| item.label.as_ref() == label).map(|item| item.kind);
    assert_eq!(kind_of("run"), Some(CompletionKind::Function));
    assert_eq!(kind_of("version"), Some(CompletionKind::Variable));
}

#[test]
fn test_project_globals_are_offered() {
    let ws = memory_workspace(&[
        ("lib.lua", "function shared_helper() end\n"),
        ("main.lua", "local mine = 1\n\n"),
    ]);
    let items = completion(&ws, "main.lua", 1, 0, &[]);
    let helper = items
        .iter()
        .find(|item| item.label.as_ref() == "shared_helper")
        .expect("global from lib.lua");
    assert_eq!(helper.kind, CompletionKind::Function);
    assert_eq!(items[0].label.as_ref(), "mine");
}

#[test]
fn test_unresolved_prefix_offers_nothing() {
    let ws = memory_workspace(&[("main.lua", "\n")]);
    assert!(completion(&ws, "main.lua", 0, 0, &["nothing", ""]).is_empty());
}
