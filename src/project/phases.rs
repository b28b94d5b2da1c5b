//! The startup phases.
//!
//! ```text
//! phase 1  FileUnit ──parallel──► FileOutcome ──Mutex──► outcome map
//! phase 2  entry file ──parallel──► import closure ──► project GlobalTable
//! phase 3  files no project reached ──► residual GlobalTable
//! ```
//!
//! Each phase only reads what the previous one produced; the orchestrator
//! owns applying the results to the index.

use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Instant;

use parking_lot::Mutex;
use rustc_hash::{FxHashMap, FxHashSet};
use smol_str::SmolStr;
use tracing::{debug, trace, warn};

use super::loader::read_source;
use super::parallel::parallel_map;
use crate::base::FilePath;
use crate::semantic::{FileResult, GlobalTable, SemanticIndex, build_file, content_hash};

// ============================================================================
// PHASE 1
// ============================================================================

/// Where phase 1 takes a file's content from.
#[derive(Debug, Clone)]
pub enum Source {
    Disk,
    /// A buffer already analysed by the live-edit path.
    Cached(Arc<FileResult>),
}

/// One unit of phase-1 work.
#[derive(Debug, Clone)]
pub struct FileUnit {
    pub path: FilePath,
    pub source: Source,
    /// Content hash of the last first pass over this file.
    pub previous_hash: Option<u64>,
}

/// What phase 1 did with one file.
#[derive(Debug, Clone)]
pub enum FileOutcome {
    /// Same content as last time; the previous result stays.
    Unchanged(FilePath),
    Built(Arc<FileResult>),
    ReadError { path: FilePath, message: String },
}

impl FileOutcome {
    pub fn path(&self) -> &FilePath {
        match self {
            FileOutcome::Unchanged(path) | FileOutcome::ReadError { path, .. } => path,
            FileOutcome::Built(file) => &file.path,
        }
    }
}

fn analyse_unit(unit: FileUnit, frame_funcs: &[SmolStr]) -> FileOutcome {
    let FileUnit {
        path,
        source,
        previous_hash,
    } = unit;

    let text = match source {
        Source::Cached(file) => {
            if previous_hash == Some(file.content_hash) {
                return FileOutcome::Unchanged(path);
            }
            return FileOutcome::Built(file);
        }
        Source::Disk => match read_source(&path) {
            Ok(text) => text,
            Err(err) => {
                return FileOutcome::ReadError {
                    path,
                    message: err.to_string(),
                };
            }
        },
    };

    if previous_hash == Some(content_hash(&text)) {
        trace!(file = %path, "content unchanged");
        return FileOutcome::Unchanged(path);
    }
    FileOutcome::Built(Arc::new(build_file(path, &text, frame_funcs)))
}

/// Phase 1 over `units` on at most `workers` threads.
pub fn first_pass(
    units: Vec<FileUnit>,
    frame_funcs: &[SmolStr],
    workers: usize,
) -> FxHashMap<FilePath, FileOutcome> {
    let start = Instant::now();
    let count = units.len();
    let outcomes: Mutex<FxHashMap<FilePath, FileOutcome>> = Mutex::new(FxHashMap::default());

    parallel_map(units, workers, |unit| {
        let outcome = analyse_unit(unit, frame_funcs);
        outcomes.lock().insert(outcome.path().clone(), outcome);
    });

    let outcomes = outcomes.into_inner();
    debug!(files = count, elapsed = ?start.elapsed(), "phase 1 done");
    outcomes
}

// ============================================================================
// PHASE 2
// ============================================================================

/// Files reachable from `entry` through import edges, `entry` first.
pub fn project_files(index: &SemanticIndex, entry: &FilePath) -> Vec<FilePath> {
    let mut seen: FxHashSet<FilePath> = FxHashSet::default();
    let mut order = Vec::new();
    let mut queue = VecDeque::from([entry.clone()]);

    while let Some(path) = queue.pop_front() {
        if !seen.insert(path.clone()) {
            continue;
        }
        let Some(file) = index.file(&path) else {
            continue;
        };
        order.push(path.clone());
        for refer in &file.imports {
            if index.is_ignored_module(&refer.module) {
                continue;
            }
            match index.resolve_module(&path, refer) {
                Some(target) => queue.push_back(target),
                None => trace!(file = %path, module = %refer.module, "import edge unresolved"),
            }
        }
    }
    order
}

/// Global table of the project rooted at `entry`.
pub fn build_project(index: &SemanticIndex, entry: &FilePath) -> GlobalTable {
    let mut files = project_files(index, entry);
    files.sort();
    let mut table = GlobalTable::new(Some(entry.clone()));
    table.merge(files.iter().filter_map(|p| index.file(p)).map(|f| f.as_ref()));
    table
}

/// Phase 2: one project table per entry file the index knows.
pub fn second_pass(index: &SemanticIndex, entries: Vec<FilePath>, workers: usize) -> Vec<GlobalTable> {
    let start = Instant::now();
    let entries: Vec<FilePath> = entries
        .into_iter()
        .filter(|entry| {
            let known = index.file(entry).is_some();
            if !known {
                warn!(entry = %entry, "project entry not in workspace");
            }
            known
        })
        .collect();
    let projects = parallel_map(entries, workers, |entry| build_project(index, &entry));
    debug!(projects = projects.len(), elapsed = ?start.elapsed(), "phase 2 done");
    projects
}

// ============================================================================
// PHASE 3
// ============================================================================

/// Phase 3: every file no project reached, merged into one table.
pub fn third_pass(index: &SemanticIndex, projects: &[GlobalTable]) -> GlobalTable {
    let paths: Vec<FilePath> = index
        .sorted_paths()
        .into_iter()
        .filter(|path| !projects.iter().any(|p| p.contains_file(path)))
        .collect();
    let mut residual = GlobalTable::new(None);
    residual.merge(paths.iter().filter_map(|p| index.file(p)).map(|f| f.as_ref()));
    debug!(files = residual.files.len(), globals = residual.len(), "phase 3 done");
    residual
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::semantic::FileStatus;

    fn index(files: &[(&str, &str)]) -> SemanticIndex {
        let mut index = SemanticIndex::new();
        for (path, src) in files {
            index.insert_file(Arc::new(build_file(Arc::from(*path), src, &[])));
        }
        index
    }

    #[test]
    fn test_first_pass_skips_unchanged_content() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("a.lua");
        std::fs::write(&path, "x = 1\n").expect("write");
        let path: FilePath = Arc::from(path.to_string_lossy().as_ref());

        let unit = |previous_hash| FileUnit {
            path: path.clone(),
            source: Source::Disk,
            previous_hash,
        };
        let first = first_pass(vec![unit(None)], &[], 2);
        let Some(FileOutcome::Built(file)) = first.get(&path) else {
            panic!("expected a build");
        };
        assert_eq!(file.status, FileStatus::Ok);

        let second = first_pass(vec![unit(Some(file.content_hash))], &[], 2);
        assert!(matches!(second.get(&path), Some(FileOutcome::Unchanged(_))));
    }

    #[test]
    fn test_first_pass_reports_read_errors() {
        let path: FilePath = Arc::from("/missing/dir/a.lua");
        let outcomes = first_pass(
            vec![FileUnit {
                path: path.clone(),
                source: Source::Disk,
                previous_hash: None,
            }],
            &[],
            1,
        );
        assert!(matches!(outcomes.get(&path), Some(FileOutcome::ReadError { .. })));
    }

    #[test]
    fn test_cached_source_is_used_as_is() {
        let cached = Arc::new(build_file(Arc::from("buf.lua"), "local a = 1\n", &[]));
        let unit = FileUnit {
            path: cached.path.clone(),
            source: Source::Cached(cached.clone()),
            previous_hash: None,
        };
        let outcomes = first_pass(vec![unit], &[], 1);
        match outcomes.get("buf.lua") {
            Some(FileOutcome::Built(file)) => assert!(Arc::ptr_eq(file, &cached)),
            other => panic!("unexpected outcome: {other:?}"),
        }
    }

    #[test]
    fn test_project_closure_is_transitive() {
        let index = index(&[
            ("/p/main.lua", "local a = require('a')\n"),
            ("/p/a.lua", "local b = require('b')\nreturn {}\n"),
            ("/p/b.lua", "B = 1\nreturn {}\n"),
            ("/p/other.lua", "O = 1\n"),
        ]);
        let files = project_files(&index, &Arc::from("/p/main.lua"));
        let files: Vec<&str> = files.iter().map(|f| f.as_ref()).collect();
        assert_eq!(files, vec!["/p/main.lua", "/p/a.lua", "/p/b.lua"]);
    }

    #[test]
    fn test_residual_takes_unreached_files() {
        let index = index(&[
            ("/p/main.lua", "local a = require('a')\n"),
            ("/p/a.lua", "A = 1\nreturn {}\n"),
            ("/p/tool.lua", "T = 1\n"),
        ]);
        let projects = second_pass(&index, vec![Arc::from("/p/main.lua"), Arc::from("/p/gone.lua")], 2);
        assert_eq!(projects.len(), 1);
        assert!(projects[0].global("A").is_some());
        assert!(projects[0].global("T").is_none());

        let residual = third_pass(&index, &projects);
        assert_eq!(residual.files, vec![FilePath::from("/p/tool.lua")]);
        assert!(residual.global("T").is_some());
    }
}
