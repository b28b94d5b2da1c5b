//! Project orchestration: discovery, the analysis phases, change events and
//! the edit-time cache.
//!
//! ```text
//! Workspace
//!   ├── phase 1  first pass per file          (parallel, content-hash skip)
//!   ├── phase 2  project tables per entry     (parallel, import closure)
//!   ├── phase 3  residual table
//!   └── checks   diagnostics after every rebuild
//! ```
//!
//! Phases 4 and 5 (references, coloring) are on-demand queries in
//! [`crate::ide`].

mod checks;
mod config;
mod error;
mod events;
mod loader;
mod lru;
mod parallel;
mod phases;
mod workspace;

pub use checks::check_workspace;
pub(crate) use checks::referenced_names;
pub use config::{AnalysisConfig, DEFAULT_LRU_CAPACITY, DEFAULT_SYSTEM_VARS};
pub use error::WorkspaceError;
pub use events::{EventPlan, FileEvent};
pub use loader::{discover_files, file_path, has_source_extension, read_source};
pub use lru::LruCache;
pub use parallel::parallel_map;
pub use phases::{FileOutcome, FileUnit, Source, build_project, first_pass, project_files, second_pass, third_pass};
pub use workspace::{AnalysisReport, Workspace};
