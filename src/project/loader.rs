//! Source discovery and reading.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{debug, warn};
use walkdir::WalkDir;

use super::error::WorkspaceError;
use crate::base::FilePath;

pub const SOURCE_EXTENSION: &str = "lua";

/// Every `*.lua` file under `root`, sorted.
///
/// Unreadable subdirectories are skipped; a missing root is an error.
pub fn discover_files(root: &Path) -> Result<Vec<PathBuf>, WorkspaceError> {
    if !root.is_dir() {
        return Err(WorkspaceError::DirectoryNotFound(root.to_path_buf()));
    }

    let mut files = Vec::new();
    for entry in WalkDir::new(root).follow_links(true) {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) if err.depth() == 0 => {
                return Err(WorkspaceError::Walk {
                    root: root.to_path_buf(),
                    source: err,
                });
            }
            Err(err) => {
                warn!(%err, "skipping unreadable entry");
                continue;
            }
        };
        if entry.file_type().is_file() && has_source_extension(entry.path()) {
            files.push(entry.into_path());
        }
    }
    files.sort();
    debug!(root = %root.display(), files = files.len(), "discovered sources");
    Ok(files)
}

pub fn has_source_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case(SOURCE_EXTENSION))
}

/// Key a file is known by in every table: its path with forward slashes.
pub fn file_path(path: &Path) -> FilePath {
    Arc::from(path.to_string_lossy().replace('\\', "/"))
}

pub fn read_source(path: &str) -> Result<String, WorkspaceError> {
    std::fs::read_to_string(path).map_err(|source| WorkspaceError::Read {
        path: path.to_string(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_discovers_nested_sources_only() {
        let dir = tempfile::tempdir().expect("tempdir");
        fs::create_dir_all(dir.path().join("lib/net")).expect("mkdir");
        fs::write(dir.path().join("main.lua"), "").expect("write");
        fs::write(dir.path().join("lib/net/http.lua"), "").expect("write");
        fs::write(dir.path().join("README.md"), "").expect("write");

        let files = discover_files(dir.path()).expect("discover");
        let names: Vec<String> = files
            .iter()
            .map(|p| {
                p.strip_prefix(dir.path())
                    .expect("prefix")
                    .to_string_lossy()
                    .replace('\\', "/")
            })
            .collect();
        assert_eq!(names, vec!["lib/net/http.lua", "main.lua"]);
    }

    #[test]
    fn test_missing_root() {
        let err = discover_files(Path::new("/definitely/not/here")).expect_err("missing");
        assert!(matches!(err, WorkspaceError::DirectoryNotFound(_)));
    }

    #[test]
    fn test_file_path_uses_forward_slashes() {
        assert_eq!(file_path(Path::new("a\\b.lua")).as_ref(), "a/b.lua");
    }

    #[test]
    fn test_read_error_names_the_file() {
        let err = read_source("/nope/missing.lua").expect_err("missing");
        assert!(err.to_string().contains("/nope/missing.lua"));
    }
}
