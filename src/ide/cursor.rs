//! What sits under the cursor, and what it resolves to.

use smol_str::SmolStr;

use crate::annotation::{AnnotateHit, statement_at};
use crate::base::{Position, Span, VarId};
use crate::semantic::{FileResult, Resolver, Symbol, VarRef};
use crate::syntax::ast::{ExprKind, ExprRef, walk_block_exprs};

#[derive(Debug, Clone)]
pub(crate) enum CursorTarget {
    /// A name, or the key of `a.b` / `a["b"]`; `span` covers the word.
    Expr { expr: ExprRef, span: Span },
    /// The method name of `a:m()`.
    Method {
        receiver: ExprRef,
        name: SmolStr,
        span: Span,
    },
    /// A variable's own declaration (local, parameter, table field).
    Declaration(VarId),
    /// Something inside a doc-comment annotation.
    Annotation { hit: AnnotateHit, line: usize },
}

impl CursorTarget {
    pub(crate) fn span(&self, file: &FileResult) -> Span {
        match self {
            CursorTarget::Expr { span, .. } | CursorTarget::Method { span, .. } => *span,
            CursorTarget::Declaration(id) => file.var(*id).span,
            CursorTarget::Annotation { hit, .. } => match hit {
                AnnotateHit::TypeName(_, span) | AnnotateHit::Declared { span, .. } => *span,
            },
        }
    }
}

/// A resolvable site in a file: a name, member key or method name.
#[derive(Debug, Clone)]
pub(crate) struct Site {
    pub(crate) name: SmolStr,
    pub(crate) span: Span,
    pub(crate) target: CursorTarget,
}

/// Every expression site of a file, in walk order.
pub(crate) fn expr_sites(file: &FileResult) -> Vec<Site> {
    let mut sites = Vec::new();
    walk_block_exprs(&file.chunk, &mut |expr: &ExprRef| match &expr.kind {
        ExprKind::Name(name) => sites.push(Site {
            name: name.clone(),
            span: expr.span,
            target: CursorTarget::Expr {
                expr: expr.clone(),
                span: expr.span,
            },
        }),
        ExprKind::Index { key, .. } => {
            if let ExprKind::String(name) | ExprKind::Number(name) = &key.kind {
                sites.push(Site {
                    name: name.clone(),
                    span: key.span,
                    target: CursorTarget::Expr {
                        expr: expr.clone(),
                        span: key.span,
                    },
                });
            }
        }
        ExprKind::Call(call) => {
            if let Some((name, span)) = &call.method {
                sites.push(Site {
                    name: name.clone(),
                    span: *span,
                    target: CursorTarget::Method {
                        receiver: call.callee.clone(),
                        name: name.clone(),
                        span: *span,
                    },
                });
            }
        }
        _ => {}
    });
    sites
}

/// Named declarations that are not undefined-root placeholders.
pub(crate) fn declarations(file: &FileResult) -> impl Iterator<Item = (VarId, &SmolStr, Span)> {
    file.vars.iter().enumerate().filter_map(move |(index, var)| {
        let id = VarId::new(index);
        let placeholder = file.undefined.get(&var.name) == Some(&id);
        (!var.anonymous && !placeholder && !var.name.is_empty()).then_some((id, &var.name, var.span))
    })
}

pub(crate) fn target_at(file: &FileResult, position: Position) -> Option<CursorTarget> {
    if let Some(info) = file.annotate.fragment_covering(position.line) {
        let hit = info
            .fragment
            .statement_at(position.line)
            .and_then(|stmt| statement_at(stmt, position.column));
        return hit.map(|hit| CursorTarget::Annotation {
            hit,
            line: position.line,
        });
    }

    let innermost = expr_sites(file)
        .into_iter()
        .filter(|site| site.span.contains(position))
        .min_by_key(|site| width(site.span));
    if let Some(site) = innermost {
        return Some(site.target);
    }

    declarations(file)
        .filter(|(_, _, span)| span.contains(position))
        .min_by_key(|(_, _, span)| width(*span))
        .map(|(id, _, _)| CursorTarget::Declaration(id))
}

fn width(span: Span) -> (usize, usize) {
    (
        span.end.line - span.start.line,
        span.end.column.abs_diff(span.start.column),
    )
}

/// Resolve a non-annotation target.
pub(crate) fn resolve_target(
    resolver: &mut Resolver<'_>,
    file: &FileResult,
    target: &CursorTarget,
) -> Option<Symbol> {
    match target {
        CursorTarget::Expr { expr, .. } => resolver.resolve_expr(&file.path, expr, 0),
        CursorTarget::Method { receiver, name, .. } => {
            let owner = resolver.resolve_expr(&file.path, receiver, 0)?;
            resolver.member(&owner, name)
        }
        CursorTarget::Declaration(id) => {
            resolver.resolve_var(&VarRef::new(file.path.clone(), *id))
        }
        CursorTarget::Annotation { .. } => None,
    }
}
