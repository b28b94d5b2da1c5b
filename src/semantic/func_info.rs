use smol_str::SmolStr;

use crate::base::{ScopeId, Span, VarId};
use crate::syntax::ast::{ExprKind, ExprRef};

/// A function body: the chunk itself or any `function` expression.
#[derive(Debug, Clone, PartialEq)]
pub struct FuncInfo {
    pub span: Span,
    /// Parameters in order; methods start with the implicit `self`.
    pub params: Vec<VarId>,
    pub is_vararg: bool,
    /// Expression lists of every `return` in the body, in source order.
    pub returns: Vec<Vec<ExprRef>>,
    pub is_method: bool,
    /// Dotted name the function was declared under, e.g. `M.util:run`.
    pub name: Option<SmolStr>,
    pub level: usize,
    pub scope: ScopeId,
}

impl FuncInfo {
    /// Value list of the last `return` whose first value is not `nil`.
    pub fn last_return(&self) -> Option<&[ExprRef]> {
        self.returns
            .iter()
            .rev()
            .find(|exprs| exprs.first().is_some_and(|e| !matches!(e.kind, ExprKind::Nil)))
            .map(Vec::as_slice)
    }

    /// First non-`nil` return value at `index`.
    pub fn return_expr(&self, index: usize) -> Option<&ExprRef> {
        self.returns
            .iter()
            .filter_map(|exprs| exprs.get(index))
            .find(|e| !matches!(e.kind, ExprKind::Nil))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::syntax::parse_chunk;

    fn returns_of(src: &str) -> FuncInfo {
        let parsed = parse_chunk(src);
        let ret = parsed.block.ret.expect("return");
        FuncInfo {
            span: Span::default(),
            params: Vec::new(),
            is_vararg: false,
            returns: vec![vec![crate::syntax::ast::Expr::new(ExprKind::Nil, Span::default())], ret.exprs],
            is_method: false,
            name: None,
            level: 0,
            scope: ScopeId::new(0),
        }
    }

    #[test]
    fn test_nil_returns_are_skipped() {
        let func = returns_of("return 1, 'x'");
        assert!(matches!(func.last_return().map(|r| &r[0].kind), Some(ExprKind::Number(_))));
        assert!(matches!(func.return_expr(0).map(|e| &e.kind), Some(ExprKind::Number(_))));
        assert!(matches!(func.return_expr(1).map(|e| &e.kind), Some(ExprKind::String(_))));
        assert!(func.return_expr(2).is_none());
    }
}
