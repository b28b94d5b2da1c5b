//! Declared variables, table members and functions.

use indexmap::IndexMap;
use smol_str::SmolStr;

use super::refer::ReferInfo;
use crate::base::{FilePath, FuncId, Position, ScopeId, Span, VarId};
use crate::syntax::ast::{BinOp, Expr, ExprKind, ExprRef};

/// Structural kind of the expression a variable was assigned from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum LuaType {
    Nil,
    Boolean,
    Number,
    String,
    Table,
    Function,
    /// Another name, index or call; only resolution can tell.
    Reference,
    #[default]
    Any,
}

impl LuaType {
    pub fn of_expr(expr: &Expr) -> Self {
        match &expr.kind {
            ExprKind::Nil => LuaType::Nil,
            ExprKind::True | ExprKind::False => LuaType::Boolean,
            ExprKind::Number(_) => LuaType::Number,
            ExprKind::String(_) => LuaType::String,
            ExprKind::Table(_) => LuaType::Table,
            ExprKind::Function(_) => LuaType::Function,
            ExprKind::Binary { op: BinOp::Concat, .. } => LuaType::String,
            ExprKind::Binary {
                op: BinOp::Or | BinOp::And,
                ..
            } => LuaType::Reference,
            ExprKind::Binary { op, .. } => match op {
                BinOp::Lt | BinOp::Gt | BinOp::Le | BinOp::Ge | BinOp::Ne | BinOp::Eq => {
                    LuaType::Boolean
                }
                _ => LuaType::Number,
            },
            ExprKind::Unary { .. } => LuaType::Any,
            ExprKind::Paren(inner) => LuaType::of_expr(inner),
            ExprKind::Name(_) | ExprKind::Index { .. } | ExprKind::Call(_) => LuaType::Reference,
            ExprKind::Vararg => LuaType::Any,
        }
    }

    pub fn display(self) -> &'static str {
        match self {
            LuaType::Nil => "nil",
            LuaType::Boolean => "boolean",
            LuaType::Number => "number",
            LuaType::String => "string",
            LuaType::Table => "table",
            LuaType::Function => "function",
            LuaType::Reference | LuaType::Any => "any",
        }
    }
}

/// Iterator function of a generic `for`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ForKind {
    Ipairs,
    Pairs,
}

/// `for k, v in ipairs(expr)` / `pairs(expr)`
#[derive(Debug, Clone, PartialEq)]
pub struct ForIter {
    pub kind: ForKind,
    pub expr: ExprRef,
}

/// One declared variable or table member.
#[derive(Debug, Clone, PartialEq)]
pub struct VarInfo {
    pub name: SmolStr,
    /// Location of the declaring name.
    pub span: Span,
    /// Lookups from positions before this one do not see the variable.
    pub visible_from: Position,
    pub refer_expr: Option<ExprRef>,
    pub lua_type: LuaType,
    /// Function this variable is defined as.
    pub func: Option<FuncId>,
    pub sub_members: IndexMap<SmolStr, VarId>,
    pub refer_info: Option<ReferInfo>,
    pub scope: ScopeId,
    pub func_level: usize,
    pub scope_level: usize,
    /// Position in the declaring name list: `local a, b` gives 0 and 1.
    pub index: usize,
    /// Which value of `refer_expr` is taken when it yields several.
    pub ret_index: usize,
    pub is_param: bool,
    pub is_local: bool,
    /// Declared through `_G.name`.
    pub via_g: bool,
    pub is_const: bool,
    pub for_iter: Option<ForIter>,
    /// Synthesized for a table constructor or function expression.
    pub anonymous: bool,
}

impl VarInfo {
    pub fn new(name: impl Into<SmolStr>, span: Span, scope: ScopeId) -> Self {
        Self {
            name: name.into(),
            span,
            visible_from: span.start,
            refer_expr: None,
            lua_type: LuaType::Any,
            func: None,
            sub_members: IndexMap::new(),
            refer_info: None,
            scope,
            func_level: 0,
            scope_level: 0,
            index: 0,
            ret_index: 0,
            is_param: false,
            is_local: false,
            via_g: false,
            is_const: false,
            for_iter: None,
            anonymous: false,
        }
    }

    pub fn with_refer(mut self, expr: ExprRef, ret_index: usize) -> Self {
        self.lua_type = LuaType::of_expr(&expr);
        self.refer_expr = Some(expr);
        self.ret_index = ret_index;
        self
    }

    pub fn is_for_var(&self) -> bool {
        self.for_iter.is_some()
    }

    /// Ordering key for picking among same-named globals: shallower wins.
    pub fn dominance(&self) -> (usize, usize, usize) {
        (self.func_level, self.scope_level, self.span.start.line)
    }
}

/// A variable in a specific file.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct VarRef {
    pub file: FilePath,
    pub id: VarId,
}

impl VarRef {
    pub fn new(file: FilePath, id: VarId) -> Self {
        Self { file, id }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::syntax::parse_chunk;
    use crate::syntax::ast::Stat;

    fn first_value(src: &str) -> ExprRef {
        let parsed = parse_chunk(src);
        match &parsed.block.stats[0] {
            Stat::Local { exprs, .. } => exprs[0].clone(),
            other => panic!("{other:?}"),
        }
    }

    #[test]
    fn test_structural_kinds() {
        assert_eq!(LuaType::of_expr(&first_value("local a = 'x' .. 1")), LuaType::String);
        assert_eq!(LuaType::of_expr(&first_value("local a = (1)")), LuaType::Number);
        assert_eq!(LuaType::of_expr(&first_value("local a = b or {}")), LuaType::Reference);
        assert_eq!(LuaType::of_expr(&first_value("local a = 1 < 2")), LuaType::Boolean);
        assert_eq!(LuaType::of_expr(&first_value("local a = function() end")), LuaType::Function);
    }

    #[test]
    fn test_dominance_prefers_shallow() {
        let mut outer = VarInfo::new("g", Span::on_line(10, 0, 1), ScopeId::new(0));
        let mut inner = VarInfo::new("g", Span::on_line(2, 0, 1), ScopeId::new(1));
        inner.func_level = 1;
        outer.func_level = 0;
        assert!(outer.dominance() < inner.dominance());
    }
}
