//! In-memory and on-disk workspaces.

use std::fs;
use std::path::{Path, PathBuf};

use luasema::project::{AnalysisConfig, Workspace, file_path};
use luasema::{FilePath, Position};
use tempfile::TempDir;

/// A workspace fed from unsaved buffers.
pub fn memory_workspace(files: &[(&str, &str)]) -> Workspace {
    let ws = Workspace::new(AnalysisConfig::default().with_workers(2));
    for (path, text) in files {
        ws.open_document(Path::new(path), text);
    }
    ws
}

/// A workspace loaded from a temporary directory. Keep the `TempDir`
/// alive for as long as the workspace is used.
pub fn disk_workspace(files: &[(&str, &str)], config: AnalysisConfig) -> (TempDir, Workspace) {
    let dir = tempfile::tempdir().expect("tempdir");
    for (name, text) in files {
        write_file(dir.path(), name, text);
    }
    let ws = Workspace::new(config);
    ws.load_directory(dir.path()).expect("load directory");
    (dir, ws)
}

pub fn write_file(dir: &Path, name: &str, text: &str) -> PathBuf {
    let path = dir.join(name);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("mkdir");
    }
    fs::write(&path, text).expect("write");
    path
}

/// Index key of `name` inside `dir`.
pub fn key(dir: &Path, name: &str) -> FilePath {
    file_path(&dir.join(name))
}

/// Position of the first occurrence of `needle` on `line`, offset by
/// `within` bytes into the match.
pub fn position_of(source: &str, line: usize, needle: &str, within: usize) -> Position {
    let text = source.lines().nth(line).expect("line");
    let column = text.find(needle).expect("needle on line");
    Position::new(line, column + within)
}
