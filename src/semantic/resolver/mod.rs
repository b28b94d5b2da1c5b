//! Symbol resolution: what an expression or name evaluates to.
//!
//! ```text
//! Name     → local (declared before use) → file global → project/residual
//!            global → built-in
//! Index    → prefix symbol, then class field (parents, aliases) → array or
//!            table element → sub-member → import target
//! Call     → require/dofile/frame edge → setmetatable merge → @return
//!            (one-hop generics) → fun(...) type → structural return
//! ```
//!
//! An annotation on a declaration always wins over the structural value. Every
//! query carries a visited set over (file, expression) so self-referential
//! tables and mutually returning functions end in "not found" instead of
//! recursing forever.

mod annotate;
mod call;
mod expr;
mod member;

use rustc_hash::FxHashSet;
use smol_str::SmolStr;

use super::file_result::FileResult;
use super::index::SemanticIndex;
use super::var_info::VarRef;
use crate::annotation::Type;
use crate::base::{FilePath, Position, Span};
use crate::syntax::ast::ExprRef;

pub use annotate::TypeDecl;

/// Nesting limit for one query, on top of the visited sets.
const MAX_DEPTH: usize = 96;

// ============================================================================
// SYMBOL
// ============================================================================

/// Which evidence produced a symbol's type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SymbolSource {
    /// A doc-comment annotation.
    Annotation,
    /// The assigned expression.
    Structural,
    /// A configured system variable.
    Builtin,
}

/// Result of one resolution. Never stored.
#[derive(Debug, Clone, PartialEq)]
pub struct Symbol {
    pub name: SmolStr,
    pub var: Option<VarRef>,
    pub ty: Option<Type>,
    /// File the type was written in; names inside `ty` resolve from there.
    pub ty_file: Option<FilePath>,
    pub source: SymbolSource,
    /// Class that declares this field.
    pub owner_class: Option<SmolStr>,
    /// Where the symbol is declared.
    pub decl: Option<(FilePath, Span)>,
    pub comment: Option<String>,
    /// Prototype variables merged in through `setmetatable`.
    pub merged: Vec<VarRef>,
    /// A frame import: members are the target file's globals.
    pub module: Option<FilePath>,
}

impl Symbol {
    fn new(name: impl Into<SmolStr>, source: SymbolSource) -> Self {
        Self {
            name: name.into(),
            var: None,
            ty: None,
            ty_file: None,
            source,
            owner_class: None,
            decl: None,
            comment: None,
            merged: Vec::new(),
            module: None,
        }
    }

    pub fn builtin(name: impl Into<SmolStr>) -> Self {
        Self::new(name, SymbolSource::Builtin)
    }

    /// A symbol typed by an annotation written in `file`.
    pub fn annotated(name: impl Into<SmolStr>, ty: Type, file: FilePath) -> Self {
        let mut symbol = Self::new(name, SymbolSource::Annotation);
        symbol.ty = Some(ty);
        symbol.ty_file = Some(file);
        symbol
    }

    pub fn is_annotated(&self) -> bool {
        self.ty.is_some()
    }

    /// Both symbols name the same declaration.
    pub fn same_declaration(&self, other: &Symbol) -> bool {
        match (&self.var, &other.var) {
            (Some(a), Some(b)) => a == b,
            _ => self.decl.is_some() && self.decl == other.decl,
        }
    }
}

/// One part of a dotted chain such as `a.b().c`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChainPart {
    pub name: SmolStr,
    /// The part is called: `b()` in `a.b().c`.
    pub is_call: bool,
}

impl ChainPart {
    pub fn name(name: impl Into<SmolStr>) -> Self {
        Self {
            name: name.into(),
            is_call: false,
        }
    }

    pub fn call(name: impl Into<SmolStr>) -> Self {
        Self {
            name: name.into(),
            is_call: true,
        }
    }
}

// ============================================================================
// RESOLVER
// ============================================================================

type ExprVisit = (FilePath, Span, u8, usize);

/// Resolves expressions against a [`SemanticIndex`].
///
/// Each public entry point starts a fresh query.
pub struct Resolver<'a> {
    index: &'a SemanticIndex,
    visited: FxHashSet<ExprVisit>,
    visited_members: FxHashSet<(VarRef, SmolStr)>,
    depth: usize,
}

impl<'a> Resolver<'a> {
    pub fn new(index: &'a SemanticIndex) -> Self {
        Self {
            index,
            visited: FxHashSet::default(),
            visited_members: FxHashSet::default(),
            depth: 0,
        }
    }

    pub fn index(&self) -> &'a SemanticIndex {
        self.index
    }

    fn reset(&mut self) {
        self.visited.clear();
        self.visited_members.clear();
        self.depth = 0;
    }

    fn file(&self, path: &str) -> Option<&'a FileResult> {
        self.index.file(path).map(|f| f.as_ref())
    }

    /// Resolve the `ret_index`-th value of `expr` in `file`.
    pub fn resolve_expr(&mut self, file: &str, expr: &ExprRef, ret_index: usize) -> Option<Symbol> {
        self.reset();
        let file = self.file(file)?;
        self.expr_symbol(file, expr, ret_index)
    }

    /// Resolve a bare name as seen from `position`.
    pub fn resolve_name(&mut self, file: &str, name: &str, position: Position) -> Option<Symbol> {
        self.reset();
        let file = self.file(file)?;
        self.name_symbol(file, name, position)
    }

    /// Symbol for a declared variable.
    pub fn resolve_var(&mut self, var: &VarRef) -> Option<Symbol> {
        self.reset();
        self.var_symbol(var)
    }

    /// Resolve a dotted chain, returning the final symbol and every
    /// intermediate one in order (`a`, `a.b`, `a.b.c`).
    pub fn resolve_chain(
        &mut self,
        file: &str,
        parts: &[ChainPart],
        position: Position,
    ) -> (Option<Symbol>, Vec<Symbol>) {
        self.reset();
        let mut steps = Vec::with_capacity(parts.len());
        let Some(file) = self.file(file) else {
            return (None, steps);
        };
        let Some((first, rest)) = parts.split_first() else {
            return (None, steps);
        };

        let mut current = match self.name_symbol(file, &first.name, position) {
            Some(symbol) => symbol,
            None => return (None, steps),
        };
        if first.is_call {
            current = match self.call_result(&current, 0) {
                Some(symbol) => symbol,
                None => return (None, steps),
            };
        }
        steps.push(current.clone());

        for part in rest {
            // each step is its own query over an already resolved symbol
            self.visited.clear();
            self.visited_members.clear();
            let next = self.member_symbol(&current, &part.name).and_then(|member| {
                if part.is_call {
                    self.call_result(&member, 0)
                } else {
                    Some(member)
                }
            });
            match next {
                Some(symbol) => {
                    steps.push(symbol.clone());
                    current = symbol;
                }
                None => {
                    tracing::trace!(part = %part.name, "chain broken");
                    return (None, steps);
                }
            }
        }
        (Some(current), steps)
    }

    /// Member `name` of an already resolved symbol.
    pub fn member(&mut self, symbol: &Symbol, name: &str) -> Option<Symbol> {
        self.reset();
        self.member_symbol(symbol, name)
    }

    /// Every member name of a symbol with its resolution, for completion.
    pub fn members(&mut self, symbol: &Symbol) -> indexmap::IndexMap<SmolStr, Symbol> {
        self.reset();
        let mut out = indexmap::IndexMap::new();
        self.collect_members(symbol, &mut out);
        out
    }

    /// Declaration of type `name` as seen from `file` at `line`.
    pub fn type_decl(&self, file: &str, name: &str, line: usize) -> Option<TypeDecl> {
        self.find_type(file, name, line)
    }

    /// Run `f` one level deeper; `None` once the limit is reached.
    fn nested<T>(&mut self, f: impl FnOnce(&mut Self) -> Option<T>) -> Option<T> {
        if self.depth >= MAX_DEPTH {
            tracing::warn!(depth = self.depth, "resolution depth limit reached");
            return None;
        }
        self.depth += 1;
        let out = f(self);
        self.depth -= 1;
        out
    }
}
