//! The orchestrator: owns every file's first-pass result and runs the phases.
//!
//! ```text
//! add_files / open_document / events
//!     ↓
//! phase 1 (changed files only) → apply outcomes
//!     ↓
//! phases 2-3 (all projects, or only those containing changed files)
//!     ↓
//! type map rebuild → checks → snapshot swap
//! ```
//!
//! Queries read an `Arc<SemanticIndex>` snapshot. A rebuild works on a copy
//! and swaps it in, so readers only ever wait for the swap itself.

use std::collections::BTreeSet;
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use parking_lot::{Mutex, RwLock};
use rustc_hash::FxHashMap;
use tracing::{debug, info, warn};

use super::checks::check_workspace;
use super::config::AnalysisConfig;
use super::error::WorkspaceError;
use super::events::{EventPlan, FileEvent};
use super::loader::{discover_files, file_path};
use super::lru::LruCache;
use super::phases::{FileOutcome, FileUnit, Source, first_pass, second_pass, third_pass};
use crate::base::FilePath;
use crate::semantic::{Diagnostic, FileResult, FileStatus, GlobalTable, SemanticIndex, build_file};

/// What one analysis run did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AnalysisReport {
    /// Files phase 1 rebuilt.
    pub built: Vec<FilePath>,
    pub unchanged: usize,
    pub read_errors: Vec<FilePath>,
    pub removed: Vec<FilePath>,
    /// Whether phases 2-3 ran.
    pub tables_rebuilt: bool,
}

#[derive(Debug, Default)]
struct State {
    known: BTreeSet<FilePath>,
    /// Newest first-pass result per file, broken or not.
    latest: FxHashMap<FilePath, Arc<FileResult>>,
    statuses: FxHashMap<FilePath, FileStatus>,
    /// The file set changed since the last table rebuild.
    structural: bool,
}

pub struct Workspace {
    config: AnalysisConfig,
    state: Mutex<State>,
    index: RwLock<Arc<SemanticIndex>>,
    diagnostics: RwLock<FxHashMap<FilePath, Vec<Diagnostic>>>,
    /// Last clean analysis of each open buffer.
    live: LruCache<FilePath, Arc<FileResult>>,
}

impl Workspace {
    pub fn new(config: AnalysisConfig) -> Self {
        let index = SemanticIndex::new()
            .with_system_vars(config.system_vars.iter().cloned())
            .with_ignored_modules(config.ignored_modules.iter().cloned());
        Self {
            live: LruCache::new(config.lru_capacity),
            config,
            state: Mutex::new(State {
                structural: true,
                ..Default::default()
            }),
            index: RwLock::new(Arc::new(index)),
            diagnostics: RwLock::new(FxHashMap::default()),
        }
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    /// Current snapshot for queries.
    pub fn analysis(&self) -> Arc<SemanticIndex> {
        self.index.read().clone()
    }

    pub fn files(&self) -> Vec<FilePath> {
        self.state.lock().known.iter().cloned().collect()
    }

    pub fn file_status(&self, path: &str) -> Option<FileStatus> {
        self.state.lock().statuses.get(path).copied()
    }

    // ========================================================================
    // File set
    // ========================================================================

    /// Register files for the next analysis; returns how many were new.
    pub fn add_files<I, P>(&self, paths: I) -> usize
    where
        I: IntoIterator<Item = P>,
        P: AsRef<Path>,
    {
        let mut state = self.state.lock();
        let mut added = 0;
        for path in paths {
            if state.known.insert(file_path(path.as_ref())) {
                added += 1;
            }
        }
        if added > 0 {
            state.structural = true;
        }
        added
    }

    /// Register every source file under `root`.
    pub fn load_directory(&self, root: &Path) -> Result<usize, WorkspaceError> {
        let files = discover_files(root)?;
        Ok(self.add_files(files))
    }

    /// Open an unsaved buffer; it shadows the file on disk while cached.
    pub fn open_document(&self, path: &Path, text: &str) -> FileStatus {
        self.on_live_edit(path, text)
    }

    // ========================================================================
    // Analysis
    // ========================================================================

    /// Phase 1 over every known file, then phases 2-3 when anything changed.
    pub fn run_full_analysis(&self) -> AnalysisReport {
        let start = Instant::now();
        let mut state = self.state.lock();
        let paths: Vec<FilePath> = state.known.iter().cloned().collect();
        let mut next = (*self.analysis()).clone();

        let mut report = self.rebuild_files(&mut state, &mut next, paths);
        let changed = !report.built.is_empty() || !report.read_errors.is_empty();
        if state.structural || changed {
            self.rebuild_tables(&mut next, None);
            state.structural = false;
            report.tables_rebuilt = true;
        }
        self.finish(&state, next);
        info!(
            built = report.built.len(),
            unchanged = report.unchanged,
            read_errors = report.read_errors.len(),
            elapsed = ?start.elapsed(),
            "full analysis"
        );
        report
    }

    /// Re-analyse after created, changed or deleted files.
    ///
    /// Creations and deletions rebuild every project table; content edits
    /// only rebuild the projects that contain the edited files.
    pub fn handle_file_events(&self, events: &[FileEvent]) -> AnalysisReport {
        let plan = EventPlan::from_events(events);
        if plan.is_empty() {
            return AnalysisReport::default();
        }

        let mut state = self.state.lock();
        let mut next = (*self.analysis()).clone();

        for path in &plan.removed {
            state.known.remove(path);
            state.latest.remove(path);
            state.statuses.remove(path);
            self.live.remove(path);
            next.remove_file(path);
            debug!(file = %path, "removed");
        }
        for path in &plan.rebuild {
            state.known.insert(path.clone());
        }

        let mut report = self.rebuild_files(&mut state, &mut next, plan.rebuild.clone());
        report.removed = plan.removed;

        if plan.structural || state.structural || !report.read_errors.is_empty() {
            self.rebuild_tables(&mut next, None);
            state.structural = false;
            report.tables_rebuilt = true;
        } else if !report.built.is_empty() {
            self.rebuild_tables(&mut next, Some(report.built.as_slice()));
            report.tables_rebuilt = true;
        }
        self.finish(&state, next);
        report
    }

    /// Phase 1 on an unsaved buffer. A clean result is cached and becomes
    /// what every query sees; a broken one only updates the diagnostics and
    /// the last good state stays in place.
    pub fn on_live_edit(&self, path: &Path, text: &str) -> FileStatus {
        let path = file_path(path);
        let mut state = self.state.lock();
        let is_new = state.known.insert(path.clone());

        let file = Arc::new(build_file(
            path.clone(),
            text,
            &self.config.frame_import_funcs,
        ));
        let status = file.status;
        state.statuses.insert(path.clone(), status);
        state.latest.insert(path.clone(), file.clone());

        let mut next = (*self.analysis()).clone();
        let replace = file.is_ok() || next.file(&path).is_none();
        if file.is_ok() {
            if let Some((evicted, _)) = self.live.put(path.clone(), file.clone()) {
                debug!(file = %evicted, "buffer evicted from edit cache");
            }
        } else {
            debug!(file = %path, "broken buffer, keeping last good state");
        }

        if replace {
            next.insert_file(file);
            if is_new || state.structural {
                self.rebuild_tables(&mut next, None);
                state.structural = false;
            } else {
                self.rebuild_tables(&mut next, Some(std::slice::from_ref(&path)));
            }
        }
        self.finish(&state, next);
        status
    }

    // ========================================================================
    // Diagnostics
    // ========================================================================

    pub fn diagnostics(&self, path: &str) -> Vec<Diagnostic> {
        self.diagnostics.read().get(path).cloned().unwrap_or_default()
    }

    /// Every diagnostic, ordered by file.
    pub fn all_diagnostics(&self) -> Vec<Diagnostic> {
        let diagnostics = self.diagnostics.read();
        let mut files: Vec<&FilePath> = diagnostics.keys().collect();
        files.sort();
        files
            .into_iter()
            .flat_map(|file| diagnostics[file].iter().cloned())
            .collect()
    }

    // ========================================================================
    // Internals
    // ========================================================================

    fn rebuild_files(
        &self,
        state: &mut State,
        next: &mut SemanticIndex,
        paths: Vec<FilePath>,
    ) -> AnalysisReport {
        let units: Vec<FileUnit> = paths
            .into_iter()
            .map(|path| FileUnit {
                source: match self.live.get(&path) {
                    Some(cached) => Source::Cached(cached),
                    None => Source::Disk,
                },
                previous_hash: state.latest.get(&path).map(|f| f.content_hash),
                path,
            })
            .collect();

        let outcomes = first_pass(
            units,
            &self.config.frame_import_funcs,
            self.config.worker_count(),
        );
        let mut outcomes: Vec<FileOutcome> = outcomes.into_values().collect();
        outcomes.sort_by(|a, b| a.path().cmp(b.path()));

        let mut report = AnalysisReport::default();
        for outcome in outcomes {
            match outcome {
                FileOutcome::Unchanged(_) => report.unchanged += 1,
                FileOutcome::Built(file) => {
                    let path = file.path.clone();
                    state.statuses.insert(path.clone(), file.status);
                    state.latest.insert(path.clone(), file.clone());
                    let keep_previous =
                        !file.is_ok() && next.file(&path).is_some_and(|prev| prev.is_ok());
                    if keep_previous {
                        debug!(file = %path, "syntax error, keeping last good state");
                    } else {
                        next.insert_file(file);
                    }
                    report.built.push(path);
                }
                FileOutcome::ReadError { path, message } => {
                    warn!(file = %path, %message, "unreadable file excluded");
                    state.statuses.insert(path.clone(), FileStatus::ReadError);
                    state.latest.remove(&path);
                    next.remove_file(&path);
                    report.read_errors.push(path);
                }
            }
        }
        report
    }

    /// Phases 2-3. With `changed`, only projects containing one of those
    /// files are rebuilt; the residual table is always recomputed.
    fn rebuild_tables(&self, next: &mut SemanticIndex, changed: Option<&[FilePath]>) {
        let entries = self.entry_files(next);
        let projects = match changed {
            None => second_pass(next, entries, self.config.worker_count()),
            Some(changed) => {
                let previous: Vec<GlobalTable> = next.projects().to_vec();
                let stale: Vec<FilePath> = previous
                    .iter()
                    .filter(|t| changed.iter().any(|path| t.contains_file(path)))
                    .filter_map(|t| t.entry.clone())
                    .collect();
                let mut rebuilt = second_pass(next, stale, self.config.worker_count());
                let mut projects = Vec::with_capacity(previous.len());
                for table in previous {
                    let at = rebuilt.iter().position(|t| t.entry == table.entry);
                    match at {
                        Some(at) => projects.push(rebuilt.swap_remove(at)),
                        None if changed.iter().any(|path| table.contains_file(path)) => {}
                        None => projects.push(table),
                    }
                }
                projects
            }
        };
        let residual = third_pass(next, &projects);
        next.set_projects(projects);
        next.set_residual(residual);
    }

    /// Configured entry files as workspace paths. An entry that is not a
    /// known path matches a known file ending with it.
    fn entry_files(&self, index: &SemanticIndex) -> Vec<FilePath> {
        let paths = index.sorted_paths();
        self.config
            .entry_files
            .iter()
            .filter_map(|entry| {
                let entry = file_path(entry);
                if index.file(&entry).is_some() {
                    return Some(entry);
                }
                let suffix = format!("/{}", entry.trim_start_matches("./"));
                let found = paths.iter().find(|p| p.ends_with(&suffix)).cloned();
                if found.is_none() {
                    warn!(entry = %entry, "entry file not found");
                }
                found
            })
            .collect()
    }

    /// Type map, checks, then publish the new snapshot.
    fn finish(&self, state: &State, mut next: SemanticIndex) {
        next.rebuild_type_map();
        let mut collector = check_workspace(&next, &state.latest);
        let mut grouped: FxHashMap<FilePath, Vec<Diagnostic>> = FxHashMap::default();
        for diagnostic in collector.take() {
            grouped
                .entry(diagnostic.file.clone())
                .or_default()
                .push(diagnostic);
        }
        *self.index.write() = Arc::new(next);
        *self.diagnostics.write() = grouped;
    }
}

impl std::fmt::Debug for Workspace {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Workspace")
            .field("files", &self.state.lock().known.len())
            .field("buffers", &self.live.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::semantic::diagnostics::codes;
    use std::fs;

    fn write(dir: &Path, name: &str, text: &str) -> std::path::PathBuf {
        let path = dir.join(name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("mkdir");
        }
        fs::write(&path, text).expect("write");
        path
    }

    fn key(path: &Path) -> FilePath {
        file_path(path)
    }

    #[test]
    fn test_second_run_is_a_no_op() {
        let dir = tempfile::tempdir().expect("tempdir");
        write(dir.path(), "a.lua", "A = 1\n");
        let ws = Workspace::new(AnalysisConfig::default().with_workers(2));
        ws.load_directory(dir.path()).expect("load");

        let first = ws.run_full_analysis();
        assert_eq!(first.built.len(), 1);
        assert!(first.tables_rebuilt);

        let second = ws.run_full_analysis();
        assert!(second.built.is_empty());
        assert_eq!(second.unchanged, 1);
        assert!(!second.tables_rebuilt);
    }

    #[test]
    fn test_entry_project_and_residual() {
        let dir = tempfile::tempdir().expect("tempdir");
        let main = write(dir.path(), "main.lua", "local m = require('m')\n");
        write(dir.path(), "m.lua", "Shared = 1\nreturn {}\n");
        let tool = write(dir.path(), "tool.lua", "Tool = 1\n");
        let ws = Workspace::new(AnalysisConfig::default().with_entry_files(["main.lua"]));
        ws.load_directory(dir.path()).expect("load");
        ws.run_full_analysis();

        let index = ws.analysis();
        assert_eq!(index.projects().len(), 1);
        assert!(index.global(&key(&main), "Shared").is_some());
        assert!(index.global(&key(&main), "Tool").is_none());
        assert!(index.global(&key(&tool), "Tool").is_some());
    }

    #[test]
    fn test_read_error_is_a_status_not_a_diagnostic() {
        let ws = Workspace::new(AnalysisConfig::default());
        ws.add_files(["/no/such/file.lua"]);
        let report = ws.run_full_analysis();
        assert_eq!(report.read_errors.len(), 1);
        assert_eq!(ws.file_status("/no/such/file.lua"), Some(FileStatus::ReadError));
        assert!(ws.all_diagnostics().is_empty());
        assert!(ws.analysis().file("/no/such/file.lua").is_none());
    }

    #[test]
    fn test_broken_live_edit_keeps_last_good_state() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = write(dir.path(), "a.lua", "Config = { debug = true }\n");
        let ws = Workspace::new(AnalysisConfig::default());
        ws.load_directory(dir.path()).expect("load");
        ws.run_full_analysis();

        let status = ws.on_live_edit(&path, "Config = { debug = \n");
        assert_eq!(status, FileStatus::SyntaxError);
        let index = ws.analysis();
        let file = index.file(&key(&path)).expect("file");
        assert!(file.is_ok());
        assert!(file.globals.contains_key("Config"));

        let codes: Vec<_> = ws
            .diagnostics(&key(&path))
            .into_iter()
            .filter_map(|d| d.code)
            .collect();
        assert_eq!(codes, vec![Arc::<str>::from(codes::SYNTAX_ERROR)]);
    }

    #[test]
    fn test_clean_live_edit_shadows_disk() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = write(dir.path(), "a.lua", "Old = 1\n");
        let ws = Workspace::new(AnalysisConfig::default());
        ws.load_directory(dir.path()).expect("load");
        ws.run_full_analysis();

        assert_eq!(ws.open_document(&path, "New = 1\n"), FileStatus::Ok);
        ws.run_full_analysis();
        let index = ws.analysis();
        assert!(index.global(&key(&path), "New").is_some());
        assert!(index.global(&key(&path), "Old").is_none());
    }

    #[test]
    fn test_content_edit_rebuilds_only_its_project() {
        let dir = tempfile::tempdir().expect("tempdir");
        let a = write(dir.path(), "a/main.lua", "A = 1\n");
        write(dir.path(), "b/main.lua", "B = 1\n");
        let config = AnalysisConfig::default().with_entry_files(["a/main.lua", "b/main.lua"]);
        let ws = Workspace::new(config);
        ws.load_directory(dir.path()).expect("load");
        ws.run_full_analysis();

        fs::write(&a, "A2 = 1\n").expect("write");
        let report = ws.handle_file_events(&[FileEvent::Changed(a.clone())]);
        assert_eq!(report.built, vec![key(&a)]);
        assert!(report.tables_rebuilt);

        let index = ws.analysis();
        assert_eq!(index.projects().len(), 2);
        assert!(index.global(&key(&a), "A2").is_some());
        assert!(index.global(&key(&a), "A").is_none());
    }
}
