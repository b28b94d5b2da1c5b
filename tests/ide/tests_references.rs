use luasema::ide::find_references;

use crate::helpers::workspace_helpers::memory_workspace;

fn sites(ws: &luasema::Workspace, file: &str, line: usize, col: usize) -> Vec<(String, usize, usize, bool)> {
    find_references(ws, file, line, col)
        .references
        .into_iter()
        .map(|r| (r.file.to_string(), r.span.start.line, r.span.start.column, r.is_definition))
        .collect()
}

#[test]
fn test_global_read_in_several_files() {
    let ws = memory_workspace(&[
        ("a.lua", "Counter = 0\n"),
        ("b.lua", "print(Counter)\n"),
        ("c.lua", "local c = Counter\n"),
    ]);
    let expected = vec![
        ("a.lua".to_string(), 0, 0, true),
        ("b.lua".to_string(), 0, 6, false),
        ("c.lua".to_string(), 0, 10, false),
    ];
    assert_eq!(sites(&ws, "c.lua", 0, 12), expected);
    assert_eq!(sites(&ws, "a.lua", 0, 2), expected);
}

#[test]
fn test_shadowing_local_is_a_different_symbol() {
    let ws = memory_workspace(&[
        ("a.lua", "Name = 'x'\n"),
        ("b.lua", "local Name = 'y'\nprint(Name)\n"),
    ]);
    assert_eq!(sites(&ws, "a.lua", 0, 0), vec![("a.lua".to_string(), 0, 0, true)]);
    assert_eq!(
        sites(&ws, "b.lua", 1, 7),
        vec![("b.lua".to_string(), 0, 6, true), ("b.lua".to_string(), 1, 6, false)]
    );
}
