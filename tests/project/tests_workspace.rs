//! Full analysis, file events and diagnostics on a temporary directory.

use std::fs;

use luasema::project::{AnalysisConfig, FileEvent, Workspace};
use luasema::semantic::FileStatus;
use luasema::semantic::diagnostics::codes;
use rstest::rstest;

use crate::helpers::workspace_helpers::{disk_workspace, key, write_file};

fn codes_for(ws: &Workspace, file: &str) -> Vec<String> {
    ws.diagnostics(file)
        .into_iter()
        .filter_map(|d| d.code.map(|c| c.to_string()))
        .collect()
}

#[test]
fn test_repeated_full_analysis_is_idempotent() {
    let (dir, ws) = disk_workspace(
        &[
            ("main.lua", "local util = require('util')\nutil.run()\n"),
            ("util.lua", "local M = {}\nfunction M.run() end\nreturn M\n"),
        ],
        AnalysisConfig::default().with_workers(2),
    );
    let first = ws.run_full_analysis();
    assert_eq!(first.built.len(), 2);
    let before = ws.all_diagnostics();
    let snapshot = ws.analysis();

    let second = ws.run_full_analysis();
    assert!(second.built.is_empty());
    assert_eq!(second.unchanged, 2);
    assert!(!second.tables_rebuilt);
    assert_eq!(ws.all_diagnostics(), before);

    let main = key(dir.path(), "main.lua");
    assert_eq!(
        ws.analysis().file(&main).map(|f| f.content_hash),
        snapshot.file(&main).map(|f| f.content_hash)
    );
}

#[test]
fn test_duplicate_type_across_files() {
    let (dir, ws) = disk_workspace(
        &[
            ("a.lua", "---@class Foo\nlocal Foo = {}\n"),
            ("b.lua", "---@class Foo\nlocal Other = {}\n"),
        ],
        AnalysisConfig::default(),
    );
    ws.run_full_analysis();

    let a = key(dir.path(), "a.lua");
    let b = key(dir.path(), "b.lua");
    assert_eq!(ws.analysis().type_entries("Foo").len(), 2);

    for (file, other) in [(&a, &b), (&b, &a)] {
        let found: Vec<_> = ws
            .diagnostics(file)
            .into_iter()
            .filter(|d| d.code.as_deref() == Some(codes::DUPLICATE_TYPE))
            .collect();
        assert_eq!(found.len(), 1, "{file}");
        assert_eq!(found[0].related.len(), 1);
        assert_eq!(&found[0].related[0].file, other);
    }
}

#[test]
fn test_deleting_an_import_target_reports_it() {
    let (dir, ws) = disk_workspace(
        &[
            ("main.lua", "local helper = require('helper')\n"),
            ("helper.lua", "return {}\n"),
        ],
        AnalysisConfig::default(),
    );
    ws.run_full_analysis();
    let main = key(dir.path(), "main.lua");
    assert!(codes_for(&ws, &main).is_empty());

    let helper = dir.path().join("helper.lua");
    fs::remove_file(&helper).expect("remove");
    let report = ws.handle_file_events(&[FileEvent::Deleted(helper)]);
    assert_eq!(report.removed, vec![key(dir.path(), "helper.lua")]);
    assert!(report.tables_rebuilt);

    let diagnostics = ws.diagnostics(&main);
    assert_eq!(diagnostics.len(), 1);
    assert_eq!(diagnostics[0].code.as_deref(), Some(codes::UNRESOLVED_IMPORT));
    assert_eq!(diagnostics[0].message.as_ref(), "module not found: 'helper'");
}

#[test]
fn test_created_file_resolves_pending_import() {
    let (dir, ws) = disk_workspace(&[("main.lua", "local late = require('late')\n")], AnalysisConfig::default());
    ws.run_full_analysis();
    let main = key(dir.path(), "main.lua");
    assert_eq!(codes_for(&ws, &main), vec![codes::UNRESOLVED_IMPORT.to_string()]);

    let late = write_file(dir.path(), "late.lua", "return { value = 1 }\n");
    let report = ws.handle_file_events(&[FileEvent::Created(late)]);
    assert_eq!(report.built, vec![key(dir.path(), "late.lua")]);
    assert!(codes_for(&ws, &main).is_empty());
}

#[rstest]
#[case::exact(true)]
#[case::suffix(false)]
fn test_entry_file_scopes_globals(#[case] absolute: bool) {
    let dir = tempfile::tempdir().expect("tempdir");
    write_file(dir.path(), "app/main.lua", "local m = require('app.model')\n");
    write_file(dir.path(), "app/model.lua", "Model = {}\nreturn Model\n");
    write_file(dir.path(), "tools/script.lua", "Script = 1\n");

    let main = key(dir.path(), "app/main.lua");
    let entry = if absolute { main.to_string() } else { "main.lua".to_string() };
    let ws = Workspace::new(AnalysisConfig::default().with_entry_files([entry]));
    ws.load_directory(dir.path()).expect("load");
    ws.run_full_analysis();

    let index = ws.analysis();
    let script = key(dir.path(), "tools/script.lua");
    assert_eq!(index.projects().len(), 1);
    assert!(index.global(&main, "Model").is_some());
    assert!(index.global(&main, "Script").is_none());
    assert!(index.global(&script, "Script").is_some());
}

#[test]
fn test_syntax_error_file_reports_and_keeps_going() {
    let (dir, ws) = disk_workspace(
        &[("bad.lua", "Bad = { debug = \n"), ("good.lua", "Good = 1\n")],
        AnalysisConfig::default(),
    );
    ws.run_full_analysis();
    let bad = key(dir.path(), "bad.lua");
    assert_eq!(ws.file_status(&bad), Some(FileStatus::SyntaxError));
    assert_eq!(codes_for(&ws, &bad), vec![codes::SYNTAX_ERROR.to_string()]);
    let good = key(dir.path(), "good.lua");
    assert!(ws.analysis().global(&good, "Good").is_some());
}

#[test]
fn test_non_source_events_are_ignored() {
    let (dir, ws) = disk_workspace(&[("a.lua", "A = 1\n")], AnalysisConfig::default());
    ws.run_full_analysis();
    let notes = write_file(dir.path(), "notes.txt", "hello\n");
    let report = ws.handle_file_events(&[FileEvent::Created(notes)]);
    assert!(report.built.is_empty());
    assert!(!report.tables_rebuilt);
}
