//! First pass: build scopes, variables, functions and globals of one file.
//!
//! The walk is sequential, so a local is only in its scope's table once its
//! declaring statement has been visited. Every table constructor and function
//! expression gets an anonymous variable here; later phases never add
//! variables to a file.

use std::hash::{Hash, Hasher};
use std::sync::Arc;

use indexmap::IndexMap;
use rustc_hash::{FxHashMap, FxHasher};
use smol_str::SmolStr;
use tracing::trace;

use super::file_result::{ExprKey, FileResult, FileStatus, expr_key};
use super::func_info::FuncInfo;
use super::refer::ReferInfo;
use super::scope::ScopeInfo;
use super::var_info::{ForIter, ForKind, LuaType, VarInfo};
use crate::annotation::{AnnotateFile, VarSite};
use crate::base::{FilePath, FuncId, Position, ScopeId, Span, VarId};
use crate::syntax::ast::{Block, Expr, ExprKind, ExprRef, FuncBody, Stat, TableConstructor};
use crate::syntax::parse_chunk;

/// Stable hash of a file's text, used to skip unchanged files.
pub fn content_hash(text: &str) -> u64 {
    let mut hasher = FxHasher::default();
    text.hash(&mut hasher);
    hasher.finish()
}

/// Parse `text` and run the first pass over it.
///
/// `frame_funcs` names extra functions that import a module like `require`.
pub fn build_file(path: FilePath, text: &str, frame_funcs: &[SmolStr]) -> FileResult {
    let parsed = parse_chunk(text);
    let status = if parsed.ok() {
        FileStatus::Ok
    } else {
        FileStatus::SyntaxError
    };

    let mut builder = FileBuilder::new(frame_funcs, parsed.block.span);
    builder.block(&parsed.block);

    let mut annotate = AnnotateFile::build(&parsed.comments);
    annotate.relate_variables(std::mem::take(&mut builder.sites));

    trace!(
        file = %path,
        vars = builder.vars.len(),
        scopes = builder.scopes.len(),
        "first pass built"
    );

    FileResult {
        path,
        content_hash: content_hash(text),
        status,
        chunk: parsed.block,
        vars: builder.vars,
        scopes: builder.scopes,
        funcs: builder.funcs,
        globals: builder.globals,
        undefined: builder.undefined,
        imports: builder.imports,
        expr_vars: builder.expr_vars,
        annotate,
        syntax_errors: parsed.errors,
    }
}

struct FileBuilder<'a> {
    frame_funcs: &'a [SmolStr],
    vars: Vec<VarInfo>,
    scopes: Vec<ScopeInfo>,
    funcs: Vec<FuncInfo>,
    globals: IndexMap<SmolStr, Vec<VarId>>,
    undefined: IndexMap<SmolStr, VarId>,
    imports: Vec<ReferInfo>,
    expr_vars: FxHashMap<ExprKey, VarId>,
    sites: Vec<VarSite>,
    scope: ScopeId,
    func: FuncId,
}

/// Value taken by the i-th name of `names = exprs`.
struct Assigned {
    expr: Option<ExprRef>,
    ret_index: usize,
    anon: Option<VarId>,
}

impl<'a> FileBuilder<'a> {
    fn new(frame_funcs: &'a [SmolStr], span: Span) -> Self {
        let main = FuncInfo {
            span,
            params: Vec::new(),
            is_vararg: true,
            returns: Vec::new(),
            is_method: false,
            name: None,
            level: 0,
            scope: FileResult::ROOT_SCOPE,
        };
        Self {
            frame_funcs,
            vars: Vec::new(),
            scopes: vec![ScopeInfo::new(span, None, FileResult::MAIN_FUNC, 0)],
            funcs: vec![main],
            globals: IndexMap::new(),
            undefined: IndexMap::new(),
            imports: Vec::new(),
            expr_vars: FxHashMap::default(),
            sites: Vec::new(),
            scope: FileResult::ROOT_SCOPE,
            func: FileResult::MAIN_FUNC,
        }
    }

    // =========================================================================
    // Arenas
    // =========================================================================

    fn push_scope(&mut self, span: Span) -> ScopeId {
        let id = ScopeId::new(self.scopes.len());
        let level = self.scopes[self.scope.index()].level + 1;
        self.scopes
            .push(ScopeInfo::new(span, Some(self.scope), self.func, level));
        self.scopes[self.scope.index()].children.push(id);
        self.scope = id;
        id
    }

    fn pop_scope(&mut self) {
        if let Some(parent) = self.scopes[self.scope.index()].parent {
            self.scope = parent;
        }
    }

    fn new_var(&self, name: impl Into<SmolStr>, span: Span) -> VarInfo {
        let mut var = VarInfo::new(name, span, self.scope);
        var.func_level = self.funcs[self.func.index()].level;
        var.scope_level = self.scopes[self.scope.index()].level;
        var
    }

    fn add_var(&mut self, var: VarInfo) -> VarId {
        let id = VarId::new(self.vars.len());
        self.vars.push(var);
        id
    }

    fn add_site(&mut self, id: VarId, index: usize) {
        let span = self.vars[id.index()].span;
        self.sites.push(VarSite {
            id,
            line: span.start.line,
            column: span.start.column,
            index,
        });
    }

    fn declare_local(&mut self, mut var: VarInfo) -> VarId {
        var.is_local = true;
        let name = var.name.clone();
        let id = self.add_var(var);
        self.scopes[self.scope.index()]
            .locals
            .entry(name)
            .or_default()
            .push(id);
        id
    }

    fn lookup_local(&self, name: &str) -> Option<VarId> {
        let mut scope = Some(self.scope);
        while let Some(id) = scope {
            let info = &self.scopes[id.index()];
            if let Some(var) = info.locals.get(name).and_then(|v| v.last()) {
                return Some(*var);
            }
            scope = info.parent;
        }
        None
    }

    /// Copy what an anonymous table or function variable knows onto a named one.
    fn inherit(&mut self, target: VarId, anon: Option<VarId>) {
        let Some(anon) = anon else {
            return;
        };
        let (func, members) = {
            let source = &self.vars[anon.index()];
            (source.func, source.sub_members.clone())
        };
        let var = &mut self.vars[target.index()];
        if var.func.is_none() {
            var.func = func;
        }
        for (name, id) in members {
            var.sub_members.entry(name).or_insert(id);
        }
    }

    fn refer_info(&self, expr: &ExprRef) -> Option<ReferInfo> {
        match &expr.kind {
            ExprKind::Call(call) => ReferInfo::from_call(call, expr.span, self.frame_funcs),
            ExprKind::Paren(inner) => self.refer_info(inner),
            _ => None,
        }
    }

    fn assigned(exprs: &[ExprRef], anons: &[Option<VarId>], index: usize) -> Assigned {
        if let Some(expr) = exprs.get(index) {
            return Assigned {
                expr: Some(expr.clone()),
                ret_index: 0,
                anon: anons.get(index).copied().flatten(),
            };
        }
        match exprs.last() {
            Some(last) if matches!(last.kind, ExprKind::Call(_) | ExprKind::Vararg) => Assigned {
                expr: Some(last.clone()),
                ret_index: index + 1 - exprs.len(),
                anon: None,
            },
            _ => Assigned {
                expr: None,
                ret_index: 0,
                anon: None,
            },
        }
    }

    fn set_value(&mut self, id: VarId, value: &Assigned) {
        if let Some(expr) = &value.expr {
            let refer = self.refer_info(expr);
            let var = &mut self.vars[id.index()];
            var.lua_type = LuaType::of_expr(expr);
            var.refer_expr = Some(expr.clone());
            var.ret_index = value.ret_index;
            var.refer_info = refer;
        }
        self.inherit(id, value.anon);
    }

    // =========================================================================
    // Statements
    // =========================================================================

    fn block(&mut self, block: &Block) {
        for stat in &block.stats {
            self.stat(stat);
        }
        if let Some(ret) = &block.ret {
            for expr in &ret.exprs {
                self.visit_expr(expr);
            }
            self.funcs[self.func.index()].returns.push(ret.exprs.clone());
        }
    }

    fn scoped_block(&mut self, block: &Block, span: Span) {
        self.push_scope(span);
        self.block(block);
        self.pop_scope();
    }

    fn stat(&mut self, stat: &Stat) {
        match stat {
            Stat::Local { names, exprs, span } => {
                let anons: Vec<_> = exprs.iter().map(|e| self.visit_expr(e)).collect();
                for (index, local) in names.iter().enumerate() {
                    let mut var = self.new_var(local.name.clone(), local.span);
                    var.visible_from = span.end;
                    var.index = index;
                    var.is_const = local.attrib.as_deref() == Some("const");
                    let id = self.declare_local(var);
                    self.set_value(id, &Self::assigned(exprs, &anons, index));
                    self.add_site(id, index);
                }
            }
            Stat::Assign { targets, exprs, .. } => {
                let anons: Vec<_> = exprs.iter().map(|e| self.visit_expr(e)).collect();
                for target in targets {
                    self.visit_target_parts(target);
                }
                for (index, target) in targets.iter().enumerate() {
                    let value = Self::assigned(exprs, &anons, index);
                    self.assign(target, &value, index);
                }
            }
            Stat::Call(expr) => {
                self.visit_expr(expr);
            }
            Stat::LocalFunction {
                name,
                name_span,
                func,
            } => {
                let var = self.new_var(name.clone(), *name_span);
                let id = self.declare_local(var);
                let expr = Expr::new(ExprKind::Function(func.clone()), func.span);
                let anon = self.function_var(&expr, func, Some(name.clone()), None);
                self.set_value(
                    id,
                    &Assigned {
                        expr: Some(expr),
                        ret_index: 0,
                        anon: Some(anon),
                    },
                );
                self.add_site(id, 0);
            }
            Stat::Function {
                target,
                is_method,
                func,
            } => {
                self.visit_target_parts(target);
                let owner = match (&target.kind, is_method) {
                    (ExprKind::Index { prefix, .. }, true) => Some(prefix.clone()),
                    _ => None,
                };
                let expr = Expr::new(ExprKind::Function(func.clone()), func.span);
                let anon = self.function_var(&expr, func, dotted_name(target), owner);
                let value = Assigned {
                    expr: Some(expr),
                    ret_index: 0,
                    anon: Some(anon),
                };
                self.assign(target, &value, 0);
            }
            Stat::Do(block) => self.scoped_block(block, block.span),
            Stat::While { cond, block } => {
                self.visit_expr(cond);
                self.scoped_block(block, block.span);
            }
            Stat::Repeat { block, cond } => {
                self.push_scope(block.span.cover(cond.span));
                self.block(block);
                self.visit_expr(cond);
                self.pop_scope();
            }
            Stat::If {
                clauses,
                else_block,
                ..
            } => {
                for (cond, block) in clauses {
                    self.visit_expr(cond);
                    self.scoped_block(block, block.span);
                }
                if let Some(block) = else_block {
                    self.scoped_block(block, block.span);
                }
            }
            Stat::NumericFor {
                var,
                var_span,
                start,
                limit,
                step,
                block,
                span,
            } => {
                self.visit_expr(start);
                self.visit_expr(limit);
                if let Some(step) = step {
                    self.visit_expr(step);
                }
                self.push_scope(*span);
                let mut info = self.new_var(var.clone(), *var_span);
                info.lua_type = LuaType::Number;
                self.declare_local(info);
                self.block(block);
                self.pop_scope();
            }
            Stat::GenericFor {
                names,
                exprs,
                block,
                span,
            } => {
                for expr in exprs {
                    self.visit_expr(expr);
                }
                let for_iter = exprs.first().and_then(|e| for_iter(e));
                self.push_scope(*span);
                for (index, (name, name_span)) in names.iter().enumerate() {
                    let mut var = self.new_var(name.clone(), *name_span);
                    var.index = index;
                    match &for_iter {
                        Some(iter) => var.for_iter = Some(iter.clone()),
                        None => {
                            if let Some(first) = exprs.first() {
                                var = var.with_refer(first.clone(), index);
                            }
                        }
                    }
                    self.declare_local(var);
                }
                self.block(block);
                self.pop_scope();
            }
            Stat::Break(_) | Stat::Goto(..) | Stat::Label(..) => {}
        }
    }

    /// Assign `value` to a name or member target.
    fn assign(&mut self, target: &ExprRef, value: &Assigned, index: usize) {
        match &target.kind {
            ExprKind::Name(name) => {
                if let Some(local) = self.lookup_local(name) {
                    if self.vars[local.index()].refer_expr.is_none() {
                        self.set_value(local, value);
                    } else {
                        self.inherit(local, value.anon);
                    }
                    return;
                }
                let var = self.new_var(name.clone(), target.span);
                let id = self.add_var(var);
                self.set_value(id, value);
                self.globals.entry(name.clone()).or_default().push(id);
                self.add_site(id, index);
            }
            ExprKind::Index { prefix, key } => {
                let Some(key_name) = member_key(key) else {
                    return;
                };
                if prefix.as_name().is_some_and(|n| n == "_G") && self.lookup_local("_G").is_none()
                {
                    let mut var = self.new_var(key_name.clone(), key.span);
                    var.via_g = true;
                    let id = self.add_var(var);
                    self.set_value(id, value);
                    self.globals.entry(key_name).or_default().push(id);
                    self.add_site(id, index);
                    return;
                }
                let Some(owner) = self.member_owner(prefix, 0) else {
                    return;
                };
                match self.vars[owner.index()].sub_members.get(&key_name).copied() {
                    Some(existing) => {
                        if self.vars[existing.index()].refer_expr.is_none() {
                            self.set_value(existing, value);
                        } else {
                            self.inherit(existing, value.anon);
                        }
                    }
                    None => {
                        let var = self.new_var(key_name.clone(), key.span);
                        let id = self.add_var(var);
                        self.set_value(id, value);
                        self.vars[owner.index()].sub_members.insert(key_name, id);
                        self.add_site(id, index);
                    }
                }
            }
            _ => {}
        }
    }

    /// Variable that receives members assigned through `prefix`.
    fn member_owner(&mut self, prefix: &ExprRef, depth: usize) -> Option<VarId> {
        if depth > 16 {
            return None;
        }
        match &prefix.kind {
            ExprKind::Paren(inner) => self.member_owner(inner, depth + 1),
            ExprKind::Name(name) => {
                if let Some(local) = self.lookup_local(name) {
                    let var = &self.vars[local.index()];
                    // `self` in a method body stands for the method owner
                    if var.is_param && name == "self" {
                        if let Some(owner) = var.refer_expr.clone() {
                            return self.member_owner(&owner, depth + 1);
                        }
                    }
                    return Some(local);
                }
                if let Some(global) = self.globals.get(name).and_then(|v| v.last()) {
                    return Some(*global);
                }
                if let Some(undefined) = self.undefined.get(name) {
                    return Some(*undefined);
                }
                let var = self.new_var(name.clone(), prefix.span);
                let id = self.add_var(var);
                self.undefined.insert(name.clone(), id);
                Some(id)
            }
            ExprKind::Index { prefix: inner, key } => {
                let key_name = member_key(key)?;
                let owner = self.member_owner(inner, depth + 1)?;
                if let Some(existing) = self.vars[owner.index()].sub_members.get(&key_name) {
                    return Some(*existing);
                }
                let var = self.new_var(key_name.clone(), key.span);
                let id = self.add_var(var);
                self.vars[owner.index()].sub_members.insert(key_name, id);
                Some(id)
            }
            _ => None,
        }
    }

    // =========================================================================
    // Expressions
    // =========================================================================

    /// Visit sub-expressions of an assignment target without declaring anything.
    fn visit_target_parts(&mut self, target: &ExprRef) {
        if let ExprKind::Index { prefix, key } = &target.kind {
            self.visit_expr(prefix);
            self.visit_expr(key);
        }
    }

    /// Visit an expression; returns the anonymous variable of a table
    /// constructor or function expression.
    fn visit_expr(&mut self, expr: &ExprRef) -> Option<VarId> {
        match &expr.kind {
            ExprKind::Paren(inner) | ExprKind::Unary { expr: inner, .. } => {
                self.visit_expr(inner);
                None
            }
            ExprKind::Binary { lhs, rhs, .. } => {
                self.visit_expr(lhs);
                self.visit_expr(rhs);
                None
            }
            ExprKind::Index { prefix, key } => {
                self.visit_expr(prefix);
                self.visit_expr(key);
                None
            }
            ExprKind::Call(call) => {
                self.visit_expr(&call.callee);
                for arg in &call.args {
                    self.visit_expr(arg);
                }
                if let Some(refer) = ReferInfo::from_call(call, expr.span, self.frame_funcs) {
                    self.imports.push(refer);
                }
                None
            }
            ExprKind::Table(table) => Some(self.table_var(expr, table)),
            ExprKind::Function(body) => Some(self.function_var(expr, body, None, None)),
            ExprKind::Nil
            | ExprKind::True
            | ExprKind::False
            | ExprKind::Vararg
            | ExprKind::Number(_)
            | ExprKind::String(_)
            | ExprKind::Name(_) => None,
        }
    }

    fn table_var(&mut self, expr: &ExprRef, table: &TableConstructor) -> VarId {
        let mut members = IndexMap::new();
        for field in &table.fields {
            if let Some(key) = &field.key {
                self.visit_expr(key);
            }
            let nested = self.visit_expr(&field.value);
            let Some(key) = &field.key else {
                continue;
            };
            let Some(name) = member_key(key) else {
                continue;
            };
            let mut var = self.new_var(name.clone(), key.span).with_refer(field.value.clone(), 0);
            var.refer_info = self.refer_info(&field.value);
            let id = self.add_var(var);
            self.inherit(id, nested);
            members.insert(name, id);
            self.add_site(id, 0);
        }

        let mut anon = self.new_var("", expr.span).with_refer(expr.clone(), 0);
        anon.anonymous = true;
        anon.sub_members = members;
        let id = self.add_var(anon);
        self.expr_vars.insert(expr_key(expr), id);
        id
    }

    fn function_var(
        &mut self,
        expr: &ExprRef,
        body: &Arc<FuncBody>,
        name: Option<SmolStr>,
        owner: Option<ExprRef>,
    ) -> VarId {
        let func = self.function(body, name, owner);
        let mut anon = self.new_var("", expr.span).with_refer(expr.clone(), 0);
        anon.anonymous = true;
        anon.func = Some(func);
        let id = self.add_var(anon);
        self.expr_vars.insert(expr_key(expr), id);
        id
    }

    fn function(
        &mut self,
        body: &Arc<FuncBody>,
        name: Option<SmolStr>,
        owner: Option<ExprRef>,
    ) -> FuncId {
        let id = FuncId::new(self.funcs.len());
        let level = self.funcs[self.func.index()].level + 1;
        let is_method = owner.is_some();
        self.funcs.push(FuncInfo {
            span: body.span,
            params: Vec::new(),
            is_vararg: body.is_vararg,
            returns: Vec::new(),
            is_method,
            name,
            level,
            scope: ScopeId::new(self.scopes.len()),
        });

        let outer_func = self.func;
        self.func = id;
        self.push_scope(body.span);

        let mut params = Vec::with_capacity(body.params.len());
        for (index, (param, span)) in body.params.iter().enumerate() {
            let mut var = self.new_var(param.clone(), *span);
            var.is_param = true;
            var.index = index;
            var.visible_from = Position::new(body.span.start.line, body.span.start.column);
            if index == 0 && param == "self" {
                if let Some(owner) = &owner {
                    var = var.with_refer(owner.clone(), 0);
                }
            }
            params.push(self.declare_local(var));
        }
        self.funcs[id.index()].params = params;

        self.block(&body.block);
        self.pop_scope();
        self.func = outer_func;
        id
    }
}

/// `a.b.c` for a name or dotted index chain.
fn dotted_name(expr: &Expr) -> Option<SmolStr> {
    match &expr.kind {
        ExprKind::Name(name) => Some(name.clone()),
        ExprKind::Index { prefix, key } => {
            let prefix = dotted_name(prefix)?;
            let key = member_key(key)?;
            Some(SmolStr::new(format!("{prefix}.{key}")))
        }
        _ => None,
    }
}

/// Member name of a constant key: `a.b`, `a["b"]`, `a[1]`.
fn member_key(key: &Expr) -> Option<SmolStr> {
    match &key.kind {
        ExprKind::String(_) | ExprKind::Number(_) => key.key_text(),
        _ => None,
    }
}

/// `ipairs(t)` / `pairs(t)` as the iterator of a generic `for`.
fn for_iter(expr: &ExprRef) -> Option<ForIter> {
    let ExprKind::Call(call) = &expr.kind else {
        return None;
    };
    let kind = match call.simple_callee()?.as_str() {
        "ipairs" => ForKind::Ipairs,
        "pairs" => ForKind::Pairs,
        _ => return None,
    };
    Some(ForIter {
        kind,
        expr: call.args.first()?.clone(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn build(src: &str) -> FileResult {
        build_file(Arc::from("test.lua"), src, &[SmolStr::new_static("import")])
    }

    fn member<'f>(file: &'f FileResult, var: VarId, name: &str) -> &'f VarInfo {
        let id = file.var(var).sub_members[name];
        file.var(id)
    }

    #[test]
    fn test_locals_respect_declaration_order() {
        let file = build("local a = 1\nlocal a = a\nprint(a)\n");
        let first = file.lookup_local("a", Position::new(1, 10)).expect("outer a");
        assert_eq!(file.var(first).span.start.line, 0);
        let second = file.lookup_local("a", Position::new(2, 6)).expect("inner a");
        assert_eq!(file.var(second).span.start.line, 1);
    }

    #[test]
    fn test_block_scopes_end() {
        let file = build("do\n  local x = 1\nend\nprint(x)\n");
        assert!(file.lookup_local("x", Position::new(1, 13)).is_some());
        assert!(file.lookup_local("x", Position::new(3, 6)).is_none());
    }

    #[test]
    fn test_globals_and_g_prefix() {
        let file = build("g = 1\n_G.h = {}\nfunction f() end\n");
        assert_eq!(file.globals.len(), 3);
        let h = file.best_global("h").expect("h");
        assert!(file.var(h).via_g);
        let f = file.best_global("f").expect("f");
        assert!(file.var(f).func.is_some());
    }

    #[test]
    fn test_table_members_materialized() {
        let file = build("local t = { a = 1, b = { c = 2 }, [1] = 3, 'x' }\n");
        let t = file.lookup_local("t", Position::new(1, 0)).expect("t");
        assert_eq!(file.var(t).sub_members.len(), 3);
        let b = file.var(t).sub_members["b"];
        assert!(file.var(b).sub_members.contains_key("c"));
        assert_eq!(file.expr_vars.len(), 2);
    }

    #[test]
    fn test_member_assignment_and_methods() {
        let src = "local M = {}\nM.x = 1\nfunction M.f() end\nfunction M:g()\n  self.y = 2\nend\nreturn M\n";
        let file = build(src);
        let m = file.lookup_local("M", Position::new(6, 0)).expect("M");
        let keys: Vec<_> = file.var(m).sub_members.keys().map(|k| k.as_str()).collect();
        assert_eq!(keys, vec!["x", "f", "y", "g"]);
        let g = member(&file, m, "g");
        let func = file.func(g.func.expect("g func"));
        assert!(func.is_method);
        assert_eq!(func.name.as_deref(), Some("M.g"));
        assert!(file.module_return().is_some());
    }

    #[test]
    fn test_undefined_root_collects_members() {
        let file = build("Foo.bar = 1\nFoo.baz.qux = 2\n");
        let foo = file.undefined["Foo"];
        assert!(file.var(foo).sub_members.contains_key("bar"));
        assert!(member(&file, foo, "baz").sub_members.contains_key("qux"));
        assert!(file.globals.is_empty());
    }

    #[test]
    fn test_imports_recorded() {
        let file = build("local a = require('x.y')\nimport('z')\nlocal c = require(dyn)\n");
        assert_eq!(file.imports.len(), 2);
        let a = file.lookup_local("a", Position::new(1, 0)).expect("a");
        assert!(file.var(a).refer_info.is_some());
    }

    #[test]
    fn test_multi_value_assignment_indices() {
        let file = build("local a, b, c = 1, f()\n");
        let b = file.lookup_local("b", Position::new(1, 0)).expect("b");
        let c = file.lookup_local("c", Position::new(1, 0)).expect("c");
        assert_eq!(file.var(b).ret_index, 0);
        assert_eq!(file.var(c).ret_index, 1);
        assert_eq!(file.var(c).index, 2);
    }

    #[test]
    fn test_for_loop_vars() {
        let file = build("for i, v in ipairs(list) do\n  print(v)\nend\nfor k in next, t do end\n");
        let v = file.lookup_local("v", Position::new(1, 2)).expect("v");
        assert!(matches!(file.var(v).for_iter, Some(ForIter { kind: ForKind::Ipairs, .. })));
        assert_eq!(file.var(v).index, 1);
        let k = file.lookup_local("k", Position::new(3, 20)).expect("k");
        assert!(file.var(k).for_iter.is_none());
    }

    #[test]
    fn test_self_param_refers_to_owner() {
        let file = build("local A = {}\nfunction A:m()\n  return self\nend\n");
        let self_var = file.lookup_local("self", Position::new(2, 4)).expect("self");
        let var = file.var(self_var);
        assert!(var.is_param);
        assert_eq!(var.refer_expr.as_ref().and_then(|e| e.as_name()).map(|n| n.as_str()), Some("A"));
    }

    #[test]
    fn test_annotation_related_to_local() {
        let file = build("---@class Point\nlocal P = {}\n");
        let class = file
            .annotate
            .class(&file.annotate.create_types["Point"][0])
            .expect("class");
        assert_eq!(class.related_var, file.lookup_local("P", Position::new(2, 0)));
    }

    #[test]
    fn test_rebuild_is_identical() {
        let src = "local a = { x = 1 }\n---@type number\nlocal n = 1\n";
        assert_eq!(build(src), build(src));
    }

    #[test]
    fn test_syntax_error_status() {
        let file = build("local a = \n");
        assert_eq!(file.status, FileStatus::SyntaxError);
        assert!(!file.syntax_errors.is_empty());
    }
}
