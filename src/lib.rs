//! # lua-sema
//!
//! Semantic-analysis core for a Lua language server: a doc-comment
//! annotation type system, cross-file symbol and type resolution, and a
//! multi-phase concurrent project orchestrator.
//!
//! ## Module Structure (dependency order)
//!
//! ```text
//! ide        → definition, hover, completion, references, coloring, symbols
//!   ↓
//! project    → Workspace orchestrator, phases 1-3, events, LRU cache
//!   ↓
//! semantic   → VarInfo arena, scopes, first-pass builder, resolver, checks
//!   ↓
//! annotation → doc-comment lexer, parser, Type algebra, fragment store
//!   ↓
//! syntax     → Lua lexer, AST, parser, comment extraction
//!   ↓
//! base       → Position / Span, arena ids
//! ```
//!
//! ## Usage
//!
//! ```no_run
//! use std::path::Path;
//! use luasema::ide::{hover, find_references};
//! use luasema::project::{AnalysisConfig, Workspace};
//!
//! let ws = Workspace::new(AnalysisConfig::default().with_entry_files(["main.lua"]));
//! ws.load_directory(Path::new("./scripts")).expect("scripts directory");
//! ws.run_full_analysis();
//!
//! for diagnostic in ws.all_diagnostics() {
//!     println!("{}: {}", diagnostic.file, diagnostic.message);
//! }
//! let info = hover(&ws, "scripts/main.lua", 3, 10);
//! let refs = find_references(&ws, "scripts/main.lua", 3, 10);
//! ```

// ============================================================================
// MODULES (dependency order: base → syntax → annotation → semantic → project → ide)
// ============================================================================

/// Foundation types: Position, Span, arena ids
pub mod base;

/// Host-language collaborator: lexer, AST, parser, comment blocks
pub mod syntax;

/// Doc-comment annotations: lexer, parser, Type algebra, fragments
pub mod annotation;

/// Per-file symbol tables, the global index and the resolver
pub mod semantic;

/// Workspace orchestration: discovery, phases, events, edit cache
pub mod project;

/// IDE features: goto-definition, hover, completion, references, coloring
pub mod ide;

// Re-export foundation types
pub use base::{FilePath, Position, Span};
pub use project::{AnalysisConfig, Workspace};
pub use semantic::{Diagnostic, Severity, Symbol};
