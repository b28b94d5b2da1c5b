//! Go-to-definition implementation.

use smol_str::SmolStr;

use super::cursor::{CursorTarget, resolve_target, target_at};
use crate::annotation::{AnnotateHit, first_normal_name};
use crate::base::{FilePath, Position, Span};
use crate::project::Workspace;
use crate::semantic::{Resolver, SemanticIndex, Symbol, TypeDecl};

use super::Analysis;

/// Result of a go-to-definition request.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct GotoResult {
    /// The targets to jump to.
    pub targets: Vec<GotoTarget>,
}

impl GotoResult {
    /// Create an empty result (no targets found).
    pub fn empty() -> Self {
        Self::default()
    }

    /// Create a result with a single target.
    pub fn single(target: GotoTarget) -> Self {
        Self {
            targets: vec![target],
        }
    }

    /// Check if any targets were found.
    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }
}

/// A target location for go-to-definition.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GotoTarget {
    /// The file containing the target.
    pub file: FilePath,
    pub span: Span,
    /// The symbol or type name.
    pub name: SmolStr,
}

/// Find the definition of whatever is under `line`/`col` in `file`.
///
/// Variables and members jump to their declaration; annotated class fields
/// to the `@field` line; a type name inside an annotation to its `@class`
/// or `@alias`.
pub fn goto_definition(ws: &Workspace, file: &str, line: usize, col: usize) -> GotoResult {
    Analysis::new(ws).goto_definition(file, line, col)
}

/// Go to the declared type of the symbol under the cursor.
///
/// `local v ---@type Foo` jumps from any use of `v` to `---@class Foo`.
pub fn goto_type_definition(ws: &Workspace, file: &str, line: usize, col: usize) -> GotoResult {
    let analysis = Analysis::new(ws);
    let index = analysis.index();
    let Some(result) = index.file(file) else {
        return GotoResult::empty();
    };
    let Some(target) = target_at(result, Position::new(line, col)) else {
        return GotoResult::empty();
    };
    let mut resolver = Resolver::new(index);
    match &target {
        CursorTarget::Annotation {
            hit: AnnotateHit::TypeName(name, _),
            line,
        } => type_target(&resolver, file, name, *line),
        CursorTarget::Annotation { .. } => None,
        _ => resolve_target(&mut resolver, result, &target)
            .and_then(|symbol| declared_type(&resolver, &symbol)),
    }
    .map_or_else(GotoResult::empty, GotoResult::single)
}

pub(crate) fn goto_in(index: &SemanticIndex, file: &str, position: Position) -> GotoResult {
    let Some(result) = index.file(file) else {
        return GotoResult::empty();
    };
    let Some(target) = target_at(result, position) else {
        return GotoResult::empty();
    };
    let mut resolver = Resolver::new(index);

    if let CursorTarget::Annotation { hit, line } = &target {
        return match hit {
            AnnotateHit::TypeName(name, _) => type_target(&resolver, file, name, *line),
            // the cursor already sits on the declaration
            AnnotateHit::Declared { .. } => None,
        }
        .map_or_else(GotoResult::empty, GotoResult::single);
    }

    let Some(symbol) = resolve_target(&mut resolver, result, &target) else {
        tracing::trace!(file, ?position, "nothing to go to");
        return GotoResult::empty();
    };
    match &symbol.decl {
        Some((decl_file, span)) => GotoResult::single(GotoTarget {
            file: decl_file.clone(),
            span: *span,
            name: symbol.name.clone(),
        }),
        None => declared_type(&resolver, &symbol).map_or_else(GotoResult::empty, GotoResult::single),
    }
}

fn type_target(resolver: &Resolver<'_>, file: &str, name: &SmolStr, line: usize) -> Option<GotoTarget> {
    let TypeDecl { file, entry } = resolver.type_decl(file, name, line)?;
    Some(GotoTarget {
        file,
        span: entry.span,
        name: name.clone(),
    })
}

fn declared_type(resolver: &Resolver<'_>, symbol: &Symbol) -> Option<GotoTarget> {
    let ty = symbol.ty.as_ref()?;
    let ty_file = symbol.ty_file.as_ref()?;
    let name = first_normal_name(ty)?;
    type_target(resolver, ty_file, name, ty.span().start.line)
}
