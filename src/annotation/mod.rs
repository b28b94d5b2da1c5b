//! Doc-comment annotation language.
//!
//! ```text
//! CommentBlock (from syntax)
//!     ↓
//! AnnotateLexer (logos) → one token of lookahead per line
//!     ↓
//! parser → Fragment of AnnotateStatements, Type trees
//!     ↓
//! AnnotateFile → FragmentInfo per block + CreateTypeMap
//! ```
//!
//! A malformed line never aborts its block: it is kept as `NotValid` and its
//! [`AnnotateError`] is collected.

mod ast;
mod error;
mod fragment;
mod lexer;
mod parser;
mod type_utils;

pub use ast::{
    AliasStatement, AnnotateLine, AnnotateStatement, ArrayType, ClassStatement, ConstType,
    EnumMarker, FieldColon, FieldStatement, FuncParam, FuncType, Fragment, GenericParam,
    GenericStatement, MultiType, NormalType, ParamStatement, ReturnStatement, TableType, Type,
    TypeStatement, Visibility,
};
pub use error::AnnotateError;
pub use fragment::{
    AliasInfo, AnnotateFile, ClassInfo, CreateKind, CreateTypeEntry, CreateTypeMap, FragmentInfo,
    ReturnSlot, TypeSlot, VarSite,
};
pub use lexer::{AnnotateLexer, AnnotateToken, AnnotateTokenKind, LineHead};
pub use parser::{parse_fragment, parse_line};
pub use type_utils::{
    AnnotateHit, SelfParam, array_element, colored_spans, first_func, first_normal_name,
    func_signature, names_with_spans, normal_names, statement_at, table_key_value, type_at,
};

/// Names every annotation may use without declaring them.
pub const DEFAULT_TYPES: &[&str] = &[
    "number",
    "any",
    "string",
    "boolean",
    "nil",
    "thread",
    "userdata",
    "lightuserdata",
    "integer",
    "void",
    "table",
    "function",
];

pub fn is_default_type(name: &str) -> bool {
    DEFAULT_TYPES.contains(&name)
}
