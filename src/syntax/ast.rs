//! Host-language syntax tree.
//!
//! Expressions are shared through [`ExprRef`] so that variables recorded in
//! phase 1 can keep a handle on the expression they were assigned from
//! without copying subtrees.

use std::sync::Arc;

use smol_str::SmolStr;

use crate::base::Span;

/// Shared handle to an expression node.
pub type ExprRef = Arc<Expr>;

/// An expression with its source span.
#[derive(Debug, Clone, PartialEq)]
pub struct Expr {
    pub kind: ExprKind,
    pub span: Span,
}

impl Expr {
    pub fn new(kind: ExprKind, span: Span) -> ExprRef {
        Arc::new(Self { kind, span })
    }

    /// The identifier if this is a plain name reference.
    pub fn as_name(&self) -> Option<&SmolStr> {
        match &self.kind {
            ExprKind::Name(name) => Some(name),
            _ => None,
        }
    }

    /// The literal text if this is a string literal.
    pub fn as_str(&self) -> Option<&SmolStr> {
        match &self.kind {
            ExprKind::String(value) => Some(value),
            _ => None,
        }
    }

    /// Small tag that tells expression kinds apart when two nodes share a span.
    pub fn tag(&self) -> u8 {
        match &self.kind {
            ExprKind::Nil => 0,
            ExprKind::True => 1,
            ExprKind::False => 2,
            ExprKind::Vararg => 3,
            ExprKind::Number(_) => 4,
            ExprKind::String(_) => 5,
            ExprKind::Name(_) => 6,
            ExprKind::Paren(_) => 7,
            ExprKind::Binary { .. } => 8,
            ExprKind::Unary { .. } => 9,
            ExprKind::Table(_) => 10,
            ExprKind::Index { .. } => 11,
            ExprKind::Call(_) => 12,
            ExprKind::Function(_) => 13,
        }
    }

    /// Key text used for member lookups: `a.b` and `a["b"]` give `b`,
    /// numeric keys give their literal text.
    pub fn key_text(&self) -> Option<SmolStr> {
        match &self.kind {
            ExprKind::String(s) | ExprKind::Name(s) | ExprKind::Number(s) => Some(s.clone()),
            ExprKind::True => Some(SmolStr::new_static("true")),
            ExprKind::False => Some(SmolStr::new_static("false")),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ExprKind {
    Nil,
    True,
    False,
    Vararg,
    Number(SmolStr),
    String(SmolStr),
    Name(SmolStr),
    Paren(ExprRef),
    Binary {
        op: BinOp,
        lhs: ExprRef,
        rhs: ExprRef,
    },
    Unary {
        op: UnOp,
        expr: ExprRef,
    },
    Table(TableConstructor),
    /// `prefix.key` or `prefix[key]`; for the dotted form `key` is a string
    /// literal spanning the field name.
    Index {
        prefix: ExprRef,
        key: ExprRef,
    },
    Call(CallExpr),
    Function(Arc<FuncBody>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinOp {
    Or,
    And,
    Lt,
    Gt,
    Le,
    Ge,
    Ne,
    Eq,
    BitOr,
    BitXor,
    BitAnd,
    Shl,
    Shr,
    Concat,
    Add,
    Sub,
    Mul,
    Div,
    IDiv,
    Mod,
    Pow,
}

impl BinOp {
    /// Left and right binding priorities.
    pub fn priority(self) -> (u8, u8) {
        match self {
            BinOp::Or => (1, 1),
            BinOp::And => (2, 2),
            BinOp::Lt | BinOp::Gt | BinOp::Le | BinOp::Ge | BinOp::Ne | BinOp::Eq => (3, 3),
            BinOp::BitOr => (4, 4),
            BinOp::BitXor => (5, 5),
            BinOp::BitAnd => (6, 6),
            BinOp::Shl | BinOp::Shr => (7, 7),
            BinOp::Concat => (9, 8),
            BinOp::Add | BinOp::Sub => (10, 10),
            BinOp::Mul | BinOp::Div | BinOp::IDiv | BinOp::Mod => (11, 11),
            BinOp::Pow => (14, 13),
        }
    }
}

/// Priority of every unary operator.
pub const UNARY_PRIORITY: u8 = 12;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UnOp {
    Not,
    Neg,
    Len,
    BitNot,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct TableConstructor {
    pub fields: Vec<TableField>,
}

/// One table constructor entry. `key` is `None` for positional values.
#[derive(Debug, Clone, PartialEq)]
pub struct TableField {
    pub key: Option<ExprRef>,
    pub value: ExprRef,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CallExpr {
    pub callee: ExprRef,
    /// `callee:method(args)`
    pub method: Option<(SmolStr, Span)>,
    pub args: Vec<ExprRef>,
}

impl CallExpr {
    /// Name of the called function for a plain `name(args)` call.
    pub fn simple_callee(&self) -> Option<&SmolStr> {
        if self.method.is_some() {
            return None;
        }
        self.callee.as_name()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FuncBody {
    pub params: Vec<(SmolStr, Span)>,
    pub is_vararg: bool,
    pub block: Block,
    /// From the `function` keyword to the closing `end`.
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Block {
    pub stats: Vec<Stat>,
    pub ret: Option<ReturnStat>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReturnStat {
    pub exprs: Vec<ExprRef>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LocalName {
    pub name: SmolStr,
    pub span: Span,
    /// `<const>` / `<close>` attribute
    pub attrib: Option<SmolStr>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Stat {
    Local {
        names: Vec<LocalName>,
        exprs: Vec<ExprRef>,
        span: Span,
    },
    Assign {
        targets: Vec<ExprRef>,
        exprs: Vec<ExprRef>,
        span: Span,
    },
    Call(ExprRef),
    LocalFunction {
        name: SmolStr,
        name_span: Span,
        func: Arc<FuncBody>,
    },
    /// `function a.b:c() end`; `target` is the name or index chain `a.b.c`.
    Function {
        target: ExprRef,
        is_method: bool,
        func: Arc<FuncBody>,
    },
    Do(Block),
    While {
        cond: ExprRef,
        block: Block,
    },
    Repeat {
        block: Block,
        cond: ExprRef,
    },
    If {
        clauses: Vec<(ExprRef, Block)>,
        else_block: Option<Block>,
        span: Span,
    },
    NumericFor {
        var: SmolStr,
        var_span: Span,
        start: ExprRef,
        limit: ExprRef,
        step: Option<ExprRef>,
        block: Block,
        span: Span,
    },
    GenericFor {
        names: Vec<(SmolStr, Span)>,
        exprs: Vec<ExprRef>,
        block: Block,
        span: Span,
    },
    Break(Span),
    Goto(SmolStr, Span),
    Label(SmolStr, Span),
}

/// Visit every expression reachable from `expr`, parents before children.
/// Function bodies are not entered.
pub fn walk_expr(expr: &ExprRef, f: &mut dyn FnMut(&ExprRef)) {
    f(expr);
    match &expr.kind {
        ExprKind::Paren(inner) | ExprKind::Unary { expr: inner, .. } => walk_expr(inner, f),
        ExprKind::Binary { lhs, rhs, .. } => {
            walk_expr(lhs, f);
            walk_expr(rhs, f);
        }
        ExprKind::Table(table) => {
            for field in &table.fields {
                if let Some(key) = &field.key {
                    walk_expr(key, f);
                }
                walk_expr(&field.value, f);
            }
        }
        ExprKind::Index { prefix, key } => {
            walk_expr(prefix, f);
            walk_expr(key, f);
        }
        ExprKind::Call(call) => {
            walk_expr(&call.callee, f);
            for arg in &call.args {
                walk_expr(arg, f);
            }
        }
        ExprKind::Nil
        | ExprKind::True
        | ExprKind::False
        | ExprKind::Vararg
        | ExprKind::Number(_)
        | ExprKind::String(_)
        | ExprKind::Name(_)
        | ExprKind::Function(_) => {}
    }
}

/// Visit every expression in a block, including nested function bodies.
pub fn walk_block_exprs(block: &Block, f: &mut dyn FnMut(&ExprRef)) {
    fn visit(expr: &ExprRef, f: &mut dyn FnMut(&ExprRef)) {
        walk_expr(expr, &mut |e| {
            f(e);
            if let ExprKind::Function(body) = &e.kind {
                walk_block_exprs(&body.block, f);
            }
        });
    }
    for stat in &block.stats {
        match stat {
            Stat::Local { exprs, .. } => exprs.iter().for_each(|e| visit(e, f)),
            Stat::Assign { targets, exprs, .. } => {
                targets.iter().for_each(|e| visit(e, f));
                exprs.iter().for_each(|e| visit(e, f));
            }
            Stat::Call(call) => visit(call, f),
            Stat::LocalFunction { func, .. } => walk_block_exprs(&func.block, f),
            Stat::Function { target, func, .. } => {
                visit(target, f);
                walk_block_exprs(&func.block, f);
            }
            Stat::Do(inner) => walk_block_exprs(inner, f),
            Stat::While { cond, block } | Stat::Repeat { block, cond } => {
                visit(cond, f);
                walk_block_exprs(block, f);
            }
            Stat::If {
                clauses,
                else_block,
                ..
            } => {
                for (cond, body) in clauses {
                    visit(cond, f);
                    walk_block_exprs(body, f);
                }
                if let Some(body) = else_block {
                    walk_block_exprs(body, f);
                }
            }
            Stat::NumericFor {
                start,
                limit,
                step,
                block,
                ..
            } => {
                visit(start, f);
                visit(limit, f);
                if let Some(step) = step {
                    visit(step, f);
                }
                walk_block_exprs(block, f);
            }
            Stat::GenericFor { exprs, block, .. } => {
                exprs.iter().for_each(|e| visit(e, f));
                walk_block_exprs(block, f);
            }
            Stat::Break(_) | Stat::Goto(..) | Stat::Label(..) => {}
        }
    }
    if let Some(ret) = &block.ret {
        ret.exprs.iter().for_each(|e| visit(e, f));
    }
}
