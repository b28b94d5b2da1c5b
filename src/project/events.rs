//! File-change events and what they make the orchestrator redo.

use std::path::{Path, PathBuf};

use indexmap::IndexMap;

use super::loader::{file_path, has_source_extension};
use crate::base::FilePath;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileEvent {
    Created(PathBuf),
    Changed(PathBuf),
    Deleted(PathBuf),
}

impl FileEvent {
    pub fn path(&self) -> &Path {
        match self {
            FileEvent::Created(path) | FileEvent::Changed(path) | FileEvent::Deleted(path) => path,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Change {
    Created,
    Changed,
    Deleted,
}

/// A batch of events reduced to the work it needs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EventPlan {
    /// Files phase 1 must run on again.
    pub rebuild: Vec<FilePath>,
    pub removed: Vec<FilePath>,
    /// Files appeared or disappeared, so import graphs may differ.
    pub structural: bool,
}

impl EventPlan {
    /// Coalesce `events` per file, the last one winning except that a change
    /// right after a creation is still a creation.
    pub fn from_events(events: &[FileEvent]) -> Self {
        let mut changes: IndexMap<FilePath, Change> = IndexMap::new();
        for event in events {
            if !has_source_extension(event.path()) {
                continue;
            }
            let change = match event {
                FileEvent::Created(_) => Change::Created,
                FileEvent::Changed(_) => Change::Changed,
                FileEvent::Deleted(_) => Change::Deleted,
            };
            let path = file_path(event.path());
            let merged = match (changes.get(&path), change) {
                (Some(Change::Created), Change::Changed) => Change::Created,
                (_, change) => change,
            };
            changes.insert(path, merged);
        }

        let mut plan = EventPlan::default();
        for (path, change) in changes {
            match change {
                Change::Created => {
                    plan.structural = true;
                    plan.rebuild.push(path);
                }
                Change::Changed => plan.rebuild.push(path),
                Change::Deleted => {
                    plan.structural = true;
                    plan.removed.push(path);
                }
            }
        }
        plan
    }

    pub fn is_empty(&self) -> bool {
        self.rebuild.is_empty() && self.removed.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_edits_are_not_structural() {
        let plan = EventPlan::from_events(&[
            FileEvent::Changed("a.lua".into()),
            FileEvent::Changed("a.lua".into()),
        ]);
        assert_eq!(plan.rebuild, vec![FilePath::from("a.lua")]);
        assert!(!plan.structural);
    }

    #[test]
    fn test_create_then_change_stays_created() {
        let plan = EventPlan::from_events(&[
            FileEvent::Created("a.lua".into()),
            FileEvent::Changed("a.lua".into()),
        ]);
        assert_eq!(plan.rebuild.len(), 1);
        assert!(plan.structural);
    }

    #[test]
    fn test_last_event_wins() {
        let plan = EventPlan::from_events(&[
            FileEvent::Changed("a.lua".into()),
            FileEvent::Deleted("a.lua".into()),
            FileEvent::Changed("notes.txt".into()),
        ]);
        assert!(plan.rebuild.is_empty());
        assert_eq!(plan.removed, vec![FilePath::from("a.lua")]);
        assert!(plan.structural);
    }
}
