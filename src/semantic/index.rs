//! Workspace-wide view over per-file results: project global tables, the
//! residual table, the merged type map and module lookup.
//!
//! The index is rebuilt by the project layer; the resolver only reads it.

use std::sync::Arc;

use indexmap::IndexMap;
use rustc_hash::{FxHashMap, FxHashSet};
use smol_str::SmolStr;
use tracing::debug;

use super::file_result::FileResult;
use super::refer::ReferInfo;
use super::var_info::VarRef;
use crate::annotation::CreateTypeEntry;
use crate::base::FilePath;

// ============================================================================
// GLOBAL TYPE MAP
// ============================================================================

/// One declaration of a class or alias somewhere in the workspace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GlobalTypeEntry {
    pub file: FilePath,
    pub entry: CreateTypeEntry,
}

/// Type name to every declaration across all files, in file-path order.
pub type GlobalTypeMap = IndexMap<SmolStr, Vec<GlobalTypeEntry>>;

// ============================================================================
// GLOBAL TABLE
// ============================================================================

/// The winning declaration of one global name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GlobalEntry {
    pub var: VarRef,
    pub dominance: (usize, usize, usize),
}

/// Merged globals of one project, or of the residual files.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GlobalTable {
    /// Entry file of the project; `None` for the residual table.
    pub entry: Option<FilePath>,
    pub files: Vec<FilePath>,
    file_set: FxHashSet<FilePath>,
    globals: FxHashMap<SmolStr, GlobalEntry>,
    /// Members other files assigned under a global they never declared.
    overlays: FxHashMap<VarRef, Vec<VarRef>>,
}

impl GlobalTable {
    pub fn new(entry: Option<FilePath>) -> Self {
        Self {
            entry,
            ..Default::default()
        }
    }

    /// Merge `files` in the given order.
    ///
    /// For a name declared in several files the candidate replaces the current
    /// winner only when it is strictly shallower by function depth, scope depth
    /// then line. An exact tie keeps the file merged first.
    pub fn merge<'a>(&mut self, files: impl IntoIterator<Item = &'a FileResult>) {
        let files: Vec<&FileResult> = files.into_iter().filter(|f| f.is_ok()).collect();
        for file in &files {
            if self.file_set.insert(file.path.clone()) {
                self.files.push(file.path.clone());
            }
            for name in file.globals.keys() {
                let Some(id) = file.best_global(name) else {
                    continue;
                };
                let candidate = GlobalEntry {
                    var: VarRef::new(file.path.clone(), id),
                    dominance: file.var(id).dominance(),
                };
                match self.globals.get(name) {
                    Some(current) if candidate.dominance >= current.dominance => {}
                    _ => {
                        self.globals.insert(name.clone(), candidate);
                    }
                }
            }
        }

        for file in &files {
            for (name, id) in &file.undefined {
                if let Some(winner) = self.globals.get(name) {
                    if winner.var.file == file.path {
                        continue;
                    }
                    self.overlays
                        .entry(winner.var.clone())
                        .or_default()
                        .push(VarRef::new(file.path.clone(), *id));
                }
            }
        }
    }

    pub fn contains_file(&self, path: &str) -> bool {
        self.file_set.contains(path)
    }

    pub fn global(&self, name: &str) -> Option<&VarRef> {
        self.globals.get(name).map(|g| &g.var)
    }

    pub fn globals(&self) -> impl Iterator<Item = (&SmolStr, &VarRef)> {
        self.globals.iter().map(|(name, g)| (name, &g.var))
    }

    pub fn overlays(&self, var: &VarRef) -> &[VarRef] {
        self.overlays.get(var).map_or(&[], Vec::as_slice)
    }

    pub fn len(&self) -> usize {
        self.globals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.globals.is_empty()
    }
}

// ============================================================================
// SEMANTIC INDEX
// ============================================================================

/// Everything the resolver can see.
#[derive(Debug, Clone, Default)]
pub struct SemanticIndex {
    files: FxHashMap<FilePath, Arc<FileResult>>,
    /// Files grouped by the last path segment, for module lookup.
    by_file_name: FxHashMap<SmolStr, Vec<FilePath>>,
    projects: Vec<GlobalTable>,
    residual: GlobalTable,
    type_map: GlobalTypeMap,
    system_vars: FxHashSet<SmolStr>,
    ignored_modules: FxHashSet<SmolStr>,
}

impl SemanticIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_system_vars<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<SmolStr>,
    {
        self.system_vars = names.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_ignored_modules<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<SmolStr>,
    {
        self.ignored_modules = names.into_iter().map(Into::into).collect();
        self
    }

    // ------------------------------------------------------------------------
    // Files
    // ------------------------------------------------------------------------

    /// Add or replace a file. Tables and the type map are rebuilt separately.
    pub fn insert_file(&mut self, file: Arc<FileResult>) {
        let path = file.path.clone();
        if self.files.insert(path.clone(), file).is_none() {
            self.by_file_name
                .entry(file_name(&path))
                .or_default()
                .push(path);
        }
    }

    pub fn remove_file(&mut self, path: &str) -> Option<Arc<FileResult>> {
        let removed = self.files.remove(path)?;
        if let Some(bucket) = self.by_file_name.get_mut(file_name(path).as_str()) {
            bucket.retain(|p| p.as_ref() != path);
        }
        Some(removed)
    }

    pub fn file(&self, path: &str) -> Option<&Arc<FileResult>> {
        self.files.get(path)
    }

    pub fn files(&self) -> impl Iterator<Item = &Arc<FileResult>> {
        self.files.values()
    }

    /// File paths in a stable order.
    pub fn sorted_paths(&self) -> Vec<FilePath> {
        let mut paths: Vec<FilePath> = self.files.keys().cloned().collect();
        paths.sort();
        paths
    }

    pub fn file_count(&self) -> usize {
        self.files.len()
    }

    // ------------------------------------------------------------------------
    // Global tables
    // ------------------------------------------------------------------------

    pub fn set_projects(&mut self, projects: Vec<GlobalTable>) {
        self.projects = projects;
    }

    pub fn set_residual(&mut self, residual: GlobalTable) {
        self.residual = residual;
    }

    pub fn projects(&self) -> &[GlobalTable] {
        &self.projects
    }

    pub fn residual(&self) -> &GlobalTable {
        &self.residual
    }

    /// Tables whose globals are visible from `path`: every project containing
    /// it, else the residual table.
    pub fn tables_for(&self, path: &str) -> Vec<&GlobalTable> {
        let tables: Vec<&GlobalTable> = self
            .projects
            .iter()
            .filter(|t| t.contains_file(path))
            .collect();
        if tables.is_empty() {
            vec![&self.residual]
        } else {
            tables
        }
    }

    /// Winning declaration of global `name` as seen from `path`.
    pub fn global(&self, path: &str, name: &str) -> Option<VarRef> {
        self.tables_for(path)
            .into_iter()
            .find_map(|t| t.global(name).cloned())
    }

    /// Undefined-map members attached to `var` in the tables visible from `path`.
    pub fn overlays(&self, path: &str, var: &VarRef) -> Vec<VarRef> {
        self.tables_for(path)
            .into_iter()
            .flat_map(|t| t.overlays(var).iter().cloned())
            .collect()
    }

    pub fn is_system_var(&self, name: &str) -> bool {
        self.system_vars.contains(name)
    }

    pub fn system_vars(&self) -> impl Iterator<Item = &SmolStr> {
        self.system_vars.iter()
    }

    // ------------------------------------------------------------------------
    // Type map
    // ------------------------------------------------------------------------

    /// Rebuild the merged type map from every readable file.
    pub fn rebuild_type_map(&mut self) {
        let mut map = GlobalTypeMap::new();
        for path in self.sorted_paths() {
            let Some(file) = self.files.get(&path) else {
                continue;
            };
            let mut names: Vec<&SmolStr> = file.annotate.create_types.keys().collect();
            names.sort();
            for name in names {
                for entry in &file.annotate.create_types[name] {
                    map.entry(name.clone()).or_default().push(GlobalTypeEntry {
                        file: path.clone(),
                        entry: *entry,
                    });
                }
            }
        }
        debug!(types = map.len(), "type map rebuilt");
        self.type_map = map;
    }

    pub fn type_map(&self) -> &GlobalTypeMap {
        &self.type_map
    }

    pub fn type_entries(&self, name: &str) -> &[GlobalTypeEntry] {
        self.type_map.get(name).map_or(&[], Vec::as_slice)
    }

    // ------------------------------------------------------------------------
    // Modules
    // ------------------------------------------------------------------------

    pub fn is_ignored_module(&self, module: &str) -> bool {
        self.ignored_modules.contains(module)
    }

    /// Workspace file an import names, as seen from `from`.
    ///
    /// Candidates are matched as path suffixes; among several matches the
    /// one sharing the longest directory prefix with `from` wins.
    pub fn resolve_module(&self, from: &str, refer: &ReferInfo) -> Option<FilePath> {
        for candidate in refer.candidate_paths() {
            let Some(bucket) = self.by_file_name.get(file_name(&candidate).as_str()) else {
                continue;
            };
            let best = bucket
                .iter()
                .filter(|path| is_path_suffix(path, &candidate))
                .max_by_key(|path| (shared_dirs(from, path), std::cmp::Reverse(path.len())));
            if let Some(best) = best {
                return Some(best.clone());
            }
        }
        None
    }
}

fn file_name(path: &str) -> SmolStr {
    SmolStr::new(path.rsplit(['/', '\\']).next().unwrap_or(path))
}

fn is_path_suffix(path: &str, candidate: &str) -> bool {
    let path = path.replace('\\', "/");
    path == candidate
        || path
            .strip_suffix(candidate)
            .is_some_and(|rest| rest.ends_with('/'))
}

/// Number of leading directory segments two paths share.
fn shared_dirs(a: &str, b: &str) -> usize {
    let dirs = |p: &str| -> Vec<String> {
        let normalized = p.replace('\\', "/");
        let mut parts: Vec<String> = normalized.split('/').map(str::to_string).collect();
        parts.pop();
        parts
    };
    dirs(a)
        .iter()
        .zip(dirs(b).iter())
        .take_while(|(x, y)| x == y)
        .count()
}
