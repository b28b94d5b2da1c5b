use std::path::PathBuf;

use thiserror::Error;

/// Failures the orchestrator reports to its caller.
///
/// Per-file problems during a phase are not errors: they become a
/// [`FileStatus`](crate::semantic::FileStatus) or a diagnostic.
#[derive(Debug, Error)]
pub enum WorkspaceError {
    #[error("directory not found: {}", .0.display())]
    DirectoryNotFound(PathBuf),

    #[error("failed to read {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to walk {}: {source}", root.display())]
    Walk {
        root: PathBuf,
        #[source]
        source: walkdir::Error,
    },

    #[error("file is not part of the workspace: {0}")]
    UnknownFile(String),
}
