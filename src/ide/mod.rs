//! IDE features: high-level queries for a language-server front end.
//!
//! Each function corresponds to one editor request and returns plain data;
//! conversion to protocol types happens at the server boundary.
//!
//! ```text
//! Workspace ──analysis()──► Analysis (index snapshot)
//!                             ├── goto_definition / goto_type_definition
//!                             ├── hover
//!                             ├── completion
//!                             ├── signature_help
//!                             ├── find_references   (phase 4, parallel)
//!                             ├── color_file        (phase 5)
//!                             └── document / workspace symbols
//! ```
//!
//! The free functions take a [`Workspace`](crate::project::Workspace) and
//! query its current snapshot; hold an [`Analysis`] to run several queries
//! against the same one.

mod analysis;
mod completion;
mod cursor;
mod goto;
mod hover;
mod references;
mod semantic_tokens;
mod signature_help;
mod symbols;

pub use analysis::Analysis;
pub use completion::{CompletionItem, CompletionKind, completion};
pub use goto::{GotoResult, GotoTarget, goto_definition, goto_type_definition};
pub use hover::{HoverResult, hover};
pub use references::{Reference, ReferenceResult, find_references};
pub use semantic_tokens::{SemanticToken, TokenType, color_file};
pub use signature_help::{ParameterInfo, SignatureHelp, SignatureInfo, signature_help};
pub use symbols::{SymbolInfo, SymbolKind, document_symbols, workspace_symbols};
