//! Host-language syntax: lexer, syntax tree and parser.
//!
//! ```text
//! Source Text
//!     ↓
//! Lexer (logos) → Tokens + comment lines
//!     ↓
//! Parser → Block tree (Arc-shared expressions) + CommentBlocks
//!     ↓
//! semantic / annotation layers
//! ```

pub mod ast;
mod comment;
mod lexer;
mod parser;

pub use comment::{CommentBlock, group_comments};
pub use lexer::{CommentLine, LineIndex, Token, TokenKind, tokenize};
pub use parser::{ParsedChunk, SyntaxError, parse_chunk};

pub use crate::base::{Position, Span};
