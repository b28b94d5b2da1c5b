//! Per-file output of the first pass.

use indexmap::IndexMap;
use rustc_hash::FxHashMap;
use smol_str::SmolStr;

use super::func_info::FuncInfo;
use super::refer::ReferInfo;
use super::scope::ScopeInfo;
use super::var_info::VarInfo;
use crate::annotation::AnnotateFile;
use crate::base::{FilePath, FuncId, Position, ScopeId, Span, VarId};
use crate::syntax::SyntaxError;
use crate::syntax::ast::{Block, Expr};

/// Identity of an expression node inside one file.
pub type ExprKey = (Span, u8);

pub fn expr_key(expr: &Expr) -> ExprKey {
    (expr.span, expr.tag())
}

/// Outcome of the first pass over a file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FileStatus {
    Ok,
    SyntaxError,
    ReadError,
}

/// Scopes, variables, functions, globals and annotations of one file.
///
/// The chunk is function 0 and its body is scope 0.
#[derive(Debug, Clone, PartialEq)]
pub struct FileResult {
    pub path: FilePath,
    pub content_hash: u64,
    pub status: FileStatus,
    pub chunk: Block,
    pub vars: Vec<VarInfo>,
    pub scopes: Vec<ScopeInfo>,
    pub funcs: Vec<FuncInfo>,
    /// Every global declaration of a name, in source order.
    pub globals: IndexMap<SmolStr, Vec<VarId>>,
    /// Members assigned under a root name this file never declares.
    pub undefined: IndexMap<SmolStr, VarId>,
    pub imports: Vec<ReferInfo>,
    /// Anonymous variables of table constructors and function expressions.
    pub expr_vars: FxHashMap<ExprKey, VarId>,
    pub annotate: AnnotateFile,
    pub syntax_errors: Vec<SyntaxError>,
}

impl FileResult {
    pub const MAIN_FUNC: FuncId = FuncId::new(0);
    pub const ROOT_SCOPE: ScopeId = ScopeId::new(0);

    pub fn is_ok(&self) -> bool {
        self.status == FileStatus::Ok
    }

    pub fn var(&self, id: VarId) -> &VarInfo {
        &self.vars[id.index()]
    }

    pub fn func(&self, id: FuncId) -> &FuncInfo {
        &self.funcs[id.index()]
    }

    pub fn scope(&self, id: ScopeId) -> &ScopeInfo {
        &self.scopes[id.index()]
    }

    pub fn expr_var(&self, expr: &Expr) -> Option<VarId> {
        self.expr_vars.get(&expr_key(expr)).copied()
    }

    /// Innermost scope containing `position`.
    pub fn scope_at(&self, position: Position) -> Option<ScopeId> {
        let mut current = Self::ROOT_SCOPE;
        self.scopes.get(current.index())?;
        'descend: loop {
            for child in &self.scope(current).children {
                if self.scope(*child).contains(position) {
                    current = *child;
                    continue 'descend;
                }
            }
            return Some(current);
        }
    }

    /// Local `name` visible at `position`, innermost first.
    pub fn lookup_local(&self, name: &str, position: Position) -> Option<VarId> {
        let mut scope = self.scope_at(position);
        while let Some(id) = scope {
            let info = self.scope(id);
            if let Some(vars) = info.locals.get(name) {
                let visible = vars
                    .iter()
                    .rev()
                    .find(|v| self.var(**v).visible_from <= position);
                if let Some(var) = visible {
                    return Some(*var);
                }
            }
            scope = info.parent;
        }
        None
    }

    /// Locals visible at `position`, innermost declaration of each name.
    pub fn visible_locals(&self, position: Position) -> IndexMap<SmolStr, VarId> {
        let mut out = IndexMap::new();
        let mut scope = self.scope_at(position);
        while let Some(id) = scope {
            let info = self.scope(id);
            for (name, vars) in &info.locals {
                if out.contains_key(name) {
                    continue;
                }
                let visible = vars
                    .iter()
                    .rev()
                    .find(|v| self.var(**v).visible_from <= position);
                if let Some(var) = visible {
                    out.insert(name.clone(), *var);
                }
            }
            scope = info.parent;
        }
        out
    }

    /// The declaration of global `name` that wins inside this file: the
    /// shallowest by function depth, scope depth then line; ties go to the
    /// later declaration.
    pub fn best_global(&self, name: &str) -> Option<VarId> {
        let mut best: Option<VarId> = None;
        for id in self.globals.get(name)? {
            let replace = match best {
                Some(current) => self.var(*id).dominance() <= self.var(current).dominance(),
                None => true,
            };
            if replace {
                best = Some(*id);
            }
        }
        best
    }

    /// Value list of the chunk's final non-nil `return`.
    pub fn module_return(&self) -> Option<&[crate::syntax::ast::ExprRef]> {
        self.funcs.get(Self::MAIN_FUNC.index())?.last_return()
    }
}
