//! Names, variables and expression kinds.

use tracing::trace;

use super::{Resolver, Symbol, SymbolSource};
use crate::annotation::{array_element, table_key_value};
use crate::base::Position;
use crate::semantic::file_result::{FileResult, expr_key};
use crate::semantic::var_info::{LuaType, VarRef};
use crate::syntax::ast::{BinOp, ExprKind, ExprRef};

impl<'a> Resolver<'a> {
    /// Structural or annotated symbol of a declared variable.
    pub(super) fn var_symbol(&mut self, var: &VarRef) -> Option<Symbol> {
        let file = self.file(&var.file)?;
        let info = file.vars.get(var.id.index())?;

        let mut symbol = Symbol::new(info.name.clone(), SymbolSource::Structural);
        symbol.var = Some(var.clone());
        symbol.decl = Some((file.path.clone(), info.span));

        if let Some(annotation) = self.var_annotation(file, var.id) {
            symbol.ty = Some(annotation.ty);
            symbol.ty_file = Some(file.path.clone());
            symbol.source = SymbolSource::Annotation;
            symbol.comment = annotation.comment;
        } else if let Some(element) = self.for_var_type(file, info) {
            symbol.ty = element.ty;
            symbol.ty_file = element.ty_file;
            symbol.source = SymbolSource::Annotation;
        } else if let Some(value) = self.assigned_value(file, var) {
            if value.ty.is_some() {
                symbol.ty = value.ty;
                symbol.ty_file = value.ty_file;
                symbol.source = value.source;
                symbol.comment = value.comment;
            }
        }
        Some(symbol)
    }

    /// Typed value a name was assigned from: `local x = make()`,
    /// `local y = x`. The visited sets are restored afterwards so a caller
    /// that walks the same expression for members still reaches it; entries
    /// of the enclosing walk stay in place and keep cycles finite.
    fn assigned_value(&mut self, file: &'a FileResult, var: &VarRef) -> Option<Symbol> {
        let info = file.vars.get(var.id.index())?;
        if info.anonymous || info.lua_type != LuaType::Reference {
            return None;
        }
        let refer = info.refer_expr.as_ref()?;
        let visited = self.visited.clone();
        let visited_members = self.visited_members.clone();
        let value = self.nested(|r| r.expr_symbol(file, refer, info.ret_index));
        self.visited = visited;
        self.visited_members = visited_members;
        value
    }

    /// Local declared before `position`, else file global, else project or
    /// residual global, else a built-in.
    pub(super) fn name_symbol(
        &mut self,
        file: &'a FileResult,
        name: &str,
        position: Position,
    ) -> Option<Symbol> {
        if let Some(id) = file.lookup_local(name, position) {
            return self.var_symbol(&VarRef::new(file.path.clone(), id));
        }
        if let Some(symbol) = self.global_symbol(file, name) {
            return Some(symbol);
        }
        if self.index.is_system_var(name) {
            trace!(name, "built-in");
            return Some(Symbol::builtin(name));
        }
        None
    }

    /// Global `name` seen from `file`, ignoring locals.
    pub(super) fn global_symbol(&mut self, file: &'a FileResult, name: &str) -> Option<Symbol> {
        if let Some(id) = file.best_global(name) {
            return self.var_symbol(&VarRef::new(file.path.clone(), id));
        }
        let var = self.index.global(&file.path, name)?;
        self.var_symbol(&var)
    }

    /// The `ret_index`-th value of `expr`.
    pub(super) fn expr_symbol(
        &mut self,
        file: &'a FileResult,
        expr: &ExprRef,
        ret_index: usize,
    ) -> Option<Symbol> {
        let (span, tag) = expr_key(expr);
        if !self
            .visited
            .insert((file.path.clone(), span, tag, ret_index))
        {
            trace!(file = %file.path, %span, "already visited");
            return None;
        }
        self.nested(|r| r.expr_symbol_inner(file, expr, ret_index))
    }

    fn expr_symbol_inner(
        &mut self,
        file: &'a FileResult,
        expr: &ExprRef,
        ret_index: usize,
    ) -> Option<Symbol> {
        match &expr.kind {
            ExprKind::Name(name) => self.name_symbol(file, name, expr.span.start),
            ExprKind::Paren(inner) => self.expr_symbol(file, inner, 0),
            ExprKind::Binary {
                op: BinOp::Or,
                lhs,
                ..
            } => self.expr_symbol(file, lhs, 0),
            ExprKind::Binary {
                op: BinOp::And,
                rhs,
                ..
            } => self.expr_symbol(file, rhs, 0),
            ExprKind::Table(_) | ExprKind::Function(_) => {
                let id = file.expr_var(expr)?;
                self.var_symbol(&VarRef::new(file.path.clone(), id))
            }
            ExprKind::Index { prefix, key } => self.index_symbol(file, prefix, key),
            ExprKind::Call(_) => self.call_symbol(file, expr, ret_index),
            ExprKind::Nil
            | ExprKind::True
            | ExprKind::False
            | ExprKind::Vararg
            | ExprKind::Number(_)
            | ExprKind::String(_)
            | ExprKind::Binary { .. }
            | ExprKind::Unary { .. } => None,
        }
    }

    fn index_symbol(&mut self, file: &'a FileResult, prefix: &ExprRef, key: &ExprRef) -> Option<Symbol> {
        // `_G.x` only sees globals
        if let Some(root) = prefix.as_name() {
            if root == "_G" && file.lookup_local("_G", prefix.span.start).is_none() {
                let name = key.key_text()?;
                return self.global_symbol(file, &name);
            }
        }

        let owner = self.expr_symbol(file, prefix, 0)?;
        match &key.kind {
            ExprKind::String(_) | ExprKind::Number(_) => {
                let name = key.key_text()?;
                self.member_symbol(&owner, &name)
            }
            _ => self.element_symbol(&owner),
        }
    }

    /// Value behind a dynamic key: array element or table value type.
    pub(super) fn element_symbol(&mut self, owner: &Symbol) -> Option<Symbol> {
        let ty = owner.ty.as_ref()?;
        let ty_file = owner.ty_file.clone()?;
        let (element, element_file) = self.through_aliases(ty, &ty_file, |t| {
            array_element(t)
                .cloned()
                .or_else(|| table_key_value(t).map(|(_, value)| value.clone()))
        })?;
        Some(Symbol::annotated(owner.name.clone(), element, element_file))
    }
}
