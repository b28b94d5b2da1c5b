//! Foundation types shared by every layer.
//!
//! - [`Position`], [`Span`] - 0-indexed line/column locations
//! - [`FilePath`] - shared, cheaply clonable file path key
//! - [`VarId`], [`ScopeId`], [`FuncId`] - per-file arena indices
//!
//! This module has NO dependencies on other crate modules.

mod ids;
mod position;

pub use ids::{FuncId, ScopeId, VarId};
pub use position::{Position, Span};

/// File paths are the identity of a file across every phase.
pub type FilePath = std::sync::Arc<str>;
