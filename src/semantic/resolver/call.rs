//! Function calls: import edges, `setmetatable`, and return values.

use tracing::{trace, warn};

use super::{Resolver, Symbol, SymbolSource};
use crate::annotation::{FuncType, Type, first_func};
use crate::base::{FilePath, FuncId, Span};
use crate::semantic::file_result::FileResult;
use crate::semantic::refer::ReferInfo;
use crate::semantic::var_info::{LuaType, VarRef};
use crate::syntax::ast::{ExprKind, ExprRef};

/// Hops allowed when looking for the function behind a callee.
const FUNC_HOPS: usize = 16;

/// A function body and the line its declaration starts on.
struct FuncSite<'f> {
    file: &'f FileResult,
    func: FuncId,
    decl_line: usize,
}

impl<'a> Resolver<'a> {
    pub(super) fn call_symbol(
        &mut self,
        file: &'a FileResult,
        expr: &ExprRef,
        ret_index: usize,
    ) -> Option<Symbol> {
        let ExprKind::Call(call) = &expr.kind else {
            return None;
        };

        if let Some(refer) = file.imports.iter().find(|r| r.span == expr.span) {
            return self.import_symbol(file, refer, ret_index);
        }

        let is_setmetatable = call.simple_callee().is_some_and(|n| n == "setmetatable")
            && file.lookup_local("setmetatable", expr.span.start).is_none();
        if is_setmetatable && call.args.len() == 2 {
            return self.setmetatable_symbol(file, &call.args[0], &call.args[1]);
        }

        let callee = match &call.method {
            Some((method, _)) => {
                let receiver = self.expr_symbol(file, &call.callee, 0)?;
                self.member_symbol(&receiver, method)?
            }
            None => self.expr_symbol(file, &call.callee, 0)?,
        };

        // the receiver of `a:m()` binds to the first parameter
        let mut args: Vec<ExprRef> = Vec::with_capacity(call.args.len() + 1);
        if call.method.is_some() {
            args.push(call.callee.clone());
        }
        args.extend(call.args.iter().cloned());

        self.returned(&callee, ret_index, Some((file, &args)))
    }

    /// Function body a callee stands for: its file, id and the line its
    /// declaration starts on.
    pub fn function_decl(&mut self, callee: &Symbol) -> Option<(FilePath, FuncId, usize)> {
        self.reset();
        let site = self.function_of(callee)?;
        Some((site.file.path.clone(), site.func, site.decl_line))
    }

    /// The `fun(...)` type a symbol is annotated with, through aliases.
    pub fn annotated_func(&self, symbol: &Symbol) -> Option<FuncType> {
        let (ty, ty_file) = (symbol.ty.as_ref()?, symbol.ty_file.as_ref()?);
        self.through_aliases(ty, ty_file, |t| first_func(t).cloned())
            .map(|(func, _)| func)
    }

    /// Value of calling `callee` without knowing the arguments.
    pub(super) fn call_result(&mut self, callee: &Symbol, ret_index: usize) -> Option<Symbol> {
        self.returned(callee, ret_index, None)
    }

    fn import_symbol(
        &mut self,
        file: &'a FileResult,
        refer: &ReferInfo,
        ret_index: usize,
    ) -> Option<Symbol> {
        if self.index.is_ignored_module(&refer.module) {
            return None;
        }
        let Some(target_path) = self.index.resolve_module(&file.path, refer) else {
            trace!(module = %refer.module, "import target not found");
            return None;
        };
        let target = self.file(&target_path)?;

        if refer.returns_module_value() {
            if let Some(exprs) = target.module_return() {
                let expr = exprs.get(ret_index)?;
                return self.expr_symbol(target, expr, 0);
            }
        }
        let mut symbol = Symbol::new(refer.module.clone(), SymbolSource::Structural);
        symbol.decl = Some((target_path.clone(), Span::default()));
        symbol.module = Some(target_path);
        Some(symbol)
    }

    /// `setmetatable(t, mt)`: the annotated side of `t` and `mt.__index`
    /// wins, the left one on a tie; the other side's members stay reachable.
    fn setmetatable_symbol(
        &mut self,
        file: &'a FileResult,
        table: &ExprRef,
        meta: &ExprRef,
    ) -> Option<Symbol> {
        let left = self.expr_symbol(file, table, 0);
        let meta = self.expr_symbol(file, meta, 0);
        let proto = meta
            .as_ref()
            .and_then(|m| self.nested(|r| r.member_symbol(m, "__index")));

        let mut winner = match (left, proto) {
            (Some(left), Some(proto)) => {
                let (mut winner, other) = if proto.is_annotated() && !left.is_annotated() {
                    (proto, left)
                } else {
                    (left, proto)
                };
                if let Some(var) = other.var {
                    if winner.var.as_ref() != Some(&var) {
                        winner.merged.push(var);
                    }
                }
                winner.merged.extend(other.merged);
                winner
            }
            (Some(only), None) | (None, Some(only)) => only,
            (None, None) => return None,
        };

        // keeps `__call` reachable for calls on the result
        if let Some(meta_var) = meta.and_then(|m| m.var) {
            if winner.var.as_ref() != Some(&meta_var) && !winner.merged.contains(&meta_var) {
                winner.merged.push(meta_var);
            }
        }
        Some(winner)
    }

    /// The `ret_index`-th return value of calling `callee`.
    ///
    /// `@return` of the function's declaration first (a generic return type
    /// takes the argument bound to the parameter of that type), then a
    /// `fun(...)` annotation on the callee, then the structural return.
    fn returned(
        &mut self,
        callee: &Symbol,
        ret_index: usize,
        site: Option<(&'a FileResult, &[ExprRef])>,
    ) -> Option<Symbol> {
        let func = self.function_of(callee);

        if let Some(func) = &func {
            if let Some(found) = self.annotated_return(func, &callee.name, ret_index, site) {
                return Some(found);
            }
        }

        if let (Some(ty), Some(ty_file)) = (&callee.ty, &callee.ty_file) {
            let ret = self.through_aliases(ty, ty_file, |t| {
                first_func(t).and_then(|f| f.returns.get(ret_index).cloned())
            });
            if let Some((ty, file)) = ret {
                return Some(Symbol::annotated(callee.name.clone(), ty, file));
            }
        }

        match func {
            Some(func) => {
                let expr = func.file.func(func.func).return_expr(ret_index)?.clone();
                self.nested(|r| r.expr_symbol(func.file, &expr, 0))
            }
            None => {
                let call = self.nested(|r| r.member_symbol(callee, "__call"))?;
                if call.var.is_some() && call.var == callee.var {
                    return None;
                }
                self.nested(|r| r.returned(&call, ret_index, None))
            }
        }
    }

    fn annotated_return(
        &mut self,
        func: &FuncSite<'a>,
        name: &str,
        ret_index: usize,
        site: Option<(&'a FileResult, &[ExprRef])>,
    ) -> Option<Symbol> {
        let fragment = func
            .file
            .annotate
            .fragment_above(func.decl_line)
            .or_else(|| {
                let line = func.file.func(func.func).span.start.line;
                func.file.annotate.fragment_above(line)
            })?;
        let slot = fragment.returns.get(ret_index)?;

        let generic = match &slot.ty {
            Type::Normal(normal) if fragment.is_generic(&normal.name) => Some(normal.name.clone()),
            _ => None,
        };
        let Some(generic) = generic else {
            let mut symbol = Symbol::annotated(name, slot.ty.clone(), func.file.path.clone());
            symbol.comment = Some(slot.comment.clone()).filter(|c| !c.is_empty());
            return Some(symbol);
        };

        // one hop: the argument passed for the parameter typed `T`
        let (site_file, args) = site?;
        let param = fragment.params.iter().find(|p| match &p.ty {
            Type::Normal(normal) => normal.name == generic,
            _ => false,
        })?;
        let info = func.file.func(func.func);
        let position = info
            .params
            .iter()
            .position(|id| func.file.var(*id).name == param.name)?;
        let arg = args.get(position)?.clone();
        trace!(generic = %generic, param = %param.name, "generic substituted");
        self.nested(|r| r.expr_symbol(site_file, &arg, 0))
    }

    /// Function body a symbol stands for, following plain reassignments.
    fn function_of(&mut self, symbol: &Symbol) -> Option<FuncSite<'a>> {
        let mut var: VarRef = symbol.var.clone()?;
        for _ in 0..FUNC_HOPS {
            let file = self.file(&var.file)?;
            let info = file.vars.get(var.id.index())?;
            if let Some(func) = info.func {
                return Some(FuncSite {
                    file,
                    func,
                    decl_line: info.span.start.line,
                });
            }
            if info.anonymous || info.lua_type != LuaType::Reference {
                return None;
            }
            let refer = info.refer_expr.as_ref()?;
            let next = self.nested(|r| r.expr_symbol(file, refer, info.ret_index))?;
            var = next.var?;
        }
        warn!(name = %symbol.name, "function lookup gave up");
        None
    }
}
