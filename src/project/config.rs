//! Analysis settings.
//!
//! Loading these from a workspace file is the client's job; the library only
//! consumes the resolved values.

use std::path::PathBuf;

use smol_str::SmolStr;

/// Names the runtime provides without a declaration.
pub const DEFAULT_SYSTEM_VARS: &[&str] = &[
    "_VERSION",
    "_ENV",
    "_G",
    "self",
    "assert",
    "collectgarbage",
    "dofile",
    "error",
    "getmetatable",
    "ipairs",
    "load",
    "loadfile",
    "loadstring",
    "next",
    "pairs",
    "pcall",
    "print",
    "rawequal",
    "rawget",
    "rawlen",
    "rawset",
    "require",
    "select",
    "setmetatable",
    "tonumber",
    "tostring",
    "type",
    "xpcall",
    "coroutine",
    "debug",
    "io",
    "math",
    "os",
    "package",
    "string",
    "table",
    "utf8",
];

/// Buffers kept by the edit-time cache.
pub const DEFAULT_LRU_CAPACITY: usize = 20;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalysisConfig {
    /// Project entry files; each one roots a project global table.
    pub entry_files: Vec<PathBuf>,
    /// Functions that import a module like `require` but expose its globals.
    pub frame_import_funcs: Vec<SmolStr>,
    pub system_vars: Vec<SmolStr>,
    pub lru_capacity: usize,
    /// Worker count; `None` uses the available parallelism.
    pub workers: Option<usize>,
    /// Module strings that are never resolved or reported.
    pub ignored_modules: Vec<SmolStr>,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            entry_files: Vec::new(),
            frame_import_funcs: vec![SmolStr::new_static("import")],
            system_vars: DEFAULT_SYSTEM_VARS
                .iter()
                .map(|name| SmolStr::new_static(name))
                .collect(),
            lru_capacity: DEFAULT_LRU_CAPACITY,
            workers: None,
            ignored_modules: Vec::new(),
        }
    }
}

impl AnalysisConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_entry_files<I, P>(mut self, files: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        self.entry_files = files.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_frame_import_funcs<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<SmolStr>,
    {
        self.frame_import_funcs = names.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_system_vars<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<SmolStr>,
    {
        self.system_vars = names.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_lru_capacity(mut self, capacity: usize) -> Self {
        self.lru_capacity = capacity;
        self
    }

    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = Some(workers.max(1));
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

    /// Worker count for parallel phases.
    pub fn worker_count(&self) -> usize {
        self.workers.unwrap_or_else(|| {
            std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(1)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AnalysisConfig::default();
        assert!(config.entry_files.is_empty());
        assert_eq!(config.frame_import_funcs, vec![SmolStr::new("import")]);
        assert!(config.system_vars.iter().any(|v| v == "print"));
        assert_eq!(config.lru_capacity, DEFAULT_LRU_CAPACITY);
        assert!(config.worker_count() >= 1);
    }

    #[test]
    fn test_builder_setters() {
        let config = AnalysisConfig::new()
            .with_entry_files(["main.lua"])
            .with_workers(0)
            .with_lru_capacity(3)
            .with_ignored_modules(["ffi"]);
        assert_eq!(config.entry_files, vec![PathBuf::from("main.lua")]);
        assert_eq!(config.worker_count(), 1);
        assert_eq!(config.lru_capacity, 3);
        assert_eq!(config.ignored_modules, vec![SmolStr::new("ffi")]);
    }
}
