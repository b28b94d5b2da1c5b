//! Workspace orchestration against real files.

pub mod tests_workspace;
