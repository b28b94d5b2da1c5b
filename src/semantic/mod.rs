//! Semantic model: per-file symbol tables, the workspace index and the
//! resolution engine.
//!
//! ```text
//! ParsedChunk + AnnotateFile
//!     ↓
//! builder (first pass) → FileResult: VarInfo / ScopeInfo / FuncInfo arenas
//!     ↓
//! SemanticIndex ← project tables, residual table, type map
//!     ↓
//! Resolver → Symbol
//! ```
//!
//! Variables live in per-file arenas addressed by [`VarId`](crate::base::VarId);
//! cross-file references are [`VarRef`] handles, so cyclic tables never own
//! each other.

mod builder;
pub mod diagnostics;
mod file_result;
mod func_info;
mod index;
mod refer;
pub mod resolver;
mod scope;
mod var_info;

pub use builder::{build_file, content_hash};
pub use diagnostics::{Diagnostic, DiagnosticCollector, RelatedInfo, Severity};
pub use file_result::{ExprKey, FileResult, FileStatus, expr_key};
pub use func_info::FuncInfo;
pub use index::{GlobalEntry, GlobalTable, GlobalTypeEntry, GlobalTypeMap, SemanticIndex};
pub use refer::{ReferInfo, ReferKind};
pub use resolver::{ChainPart, Resolver, Symbol, SymbolSource, TypeDecl};
pub use scope::ScopeInfo;
pub use var_info::{ForIter, ForKind, LuaType, VarInfo, VarRef};
