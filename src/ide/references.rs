//! Find references implementation (phase 4).
//!
//! The cursor is resolved once; every file is then searched in parallel.
//! A file only resolves sites whose text matches the target name, so the
//! expensive resolution runs on a small candidate set.

use smol_str::SmolStr;

use super::Analysis;
use super::cursor::{CursorTarget, declarations, expr_sites, resolve_target, target_at};
use crate::annotation::{AnnotateHit, AnnotateStatement};
use crate::base::{FilePath, Position, Span};
use crate::project::{Workspace, parallel_map, referenced_names};
use crate::semantic::{FileResult, Resolver, SemanticIndex, Symbol, TypeDecl, VarRef};

/// Result of a find-references request.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ReferenceResult {
    /// All references found, ordered by file and position.
    pub references: Vec<Reference>,
}

impl ReferenceResult {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.references.is_empty()
    }

    pub fn len(&self) -> usize {
        self.references.len()
    }
}

/// A reference to a symbol.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub struct Reference {
    pub file: FilePath,
    pub span: Span,
    /// Whether this is the declaration (vs a use).
    pub is_definition: bool,
}

/// What is being searched for.
enum Needle {
    Symbol(Symbol),
    Type { name: SmolStr, decl: TypeDecl },
}

/// Find every reference to the symbol under `line`/`col`, across all files.
pub fn find_references(ws: &Workspace, file: &str, line: usize, col: usize) -> ReferenceResult {
    Analysis::new(ws).find_references(file, line, col)
}

pub(crate) fn references_in(
    index: &SemanticIndex,
    workers: usize,
    file: &str,
    position: Position,
) -> ReferenceResult {
    let Some(needle) = needle_at(index, file, position) else {
        return ReferenceResult::empty();
    };

    let paths = index.sorted_paths();
    let started = std::time::Instant::now();
    let per_file = parallel_map(paths, workers, |path| match index.file(&path) {
        Some(result) => match &needle {
            Needle::Symbol(symbol) => symbol_refs(index, result, symbol),
            Needle::Type { name, decl } => type_refs(index, result, name, decl),
        },
        None => Vec::new(),
    });

    let mut references: Vec<Reference> = per_file.into_iter().flatten().collect();
    let declaration = match &needle {
        Needle::Symbol(symbol) => symbol.decl.clone(),
        Needle::Type { decl, .. } => Some((decl.file.clone(), decl.entry.span)),
    };
    if let Some((file, span)) = declaration {
        references.push(Reference {
            file,
            span,
            is_definition: true,
        });
    }
    references.sort();
    // a declaration site is also found as a plain site; keep the definition
    references.dedup_by(|later, earlier| {
        if later.file == earlier.file && later.span == earlier.span {
            earlier.is_definition |= later.is_definition;
            true
        } else {
            false
        }
    });
    tracing::debug!(
        found = references.len(),
        elapsed_ms = started.elapsed().as_millis() as u64,
        "reference search"
    );
    ReferenceResult { references }
}

fn needle_at(index: &SemanticIndex, file: &str, position: Position) -> Option<Needle> {
    let result = index.file(file)?;
    let target = target_at(result, position)?;
    let mut resolver = Resolver::new(index);

    let CursorTarget::Annotation { hit, line } = &target else {
        let symbol = resolve_target(&mut resolver, result, &target)?;
        return (!symbol.name.is_empty()).then_some(Needle::Symbol(symbol));
    };
    match hit {
        AnnotateHit::TypeName(name, _) => {
            let decl = resolver.type_decl(file, name, *line)?;
            Some(Needle::Type {
                name: name.clone(),
                decl,
            })
        }
        AnnotateHit::Declared { span, .. } => declared_needle(index, result, *line, *span),
    }
}

/// A `@class`/`@alias` name or a `@field` name under the cursor.
fn declared_needle(index: &SemanticIndex, file: &FileResult, line: usize, span: Span) -> Option<Needle> {
    let stmt = file.annotate.fragment_covering(line)?.fragment.statement_at(line)?;
    match stmt {
        AnnotateStatement::Class(class) if class.span == span => {
            type_needle(index, &file.path, &class.name, span)
        }
        AnnotateStatement::Alias(alias) if alias.span == span => {
            type_needle(index, &file.path, &alias.name, span)
        }
        AnnotateStatement::Field(field) if field.span == span => {
            let mut symbol = Symbol::annotated(field.name.clone(), field.ty.clone(), file.path.clone());
            symbol.decl = Some((file.path.clone(), span));
            Some(Needle::Symbol(symbol))
        }
        _ => None,
    }
}

fn type_needle(index: &SemanticIndex, file: &FilePath, name: &SmolStr, span: Span) -> Option<Needle> {
    let entry = index
        .type_entries(name)
        .iter()
        .find(|entry| entry.file == *file && entry.entry.span == span)?;
    Some(Needle::Type {
        name: name.clone(),
        decl: TypeDecl {
            file: entry.file.clone(),
            entry: entry.entry.clone(),
        },
    })
}

fn symbol_refs(index: &SemanticIndex, file: &FileResult, symbol: &Symbol) -> Vec<Reference> {
    let mut resolver = Resolver::new(index);
    let mut out = Vec::new();

    for site in expr_sites(file).into_iter().filter(|site| site.name == symbol.name) {
        let found = resolve_target(&mut resolver, file, &site.target);
        if found.is_some_and(|found| found.same_declaration(symbol)) {
            out.push(Reference {
                file: file.path.clone(),
                span: site.span,
                is_definition: false,
            });
        }
    }
    for (id, _, span) in declarations(file).filter(|(_, name, _)| **name == symbol.name) {
        let var = VarRef::new(file.path.clone(), id);
        let found = resolver.resolve_var(&var);
        if found.is_some_and(|found| found.same_declaration(symbol)) {
            out.push(Reference {
                file: file.path.clone(),
                span,
                is_definition: symbol.var.as_ref() == Some(&var),
            });
        }
    }
    out
}

fn type_refs(index: &SemanticIndex, file: &FileResult, name: &SmolStr, decl: &TypeDecl) -> Vec<Reference> {
    let resolver = Resolver::new(index);
    let mut out = Vec::new();
    for info in file.annotate.fragments.values() {
        for line in &info.fragment.lines {
            for (_, span) in referenced_names(&line.stmt)
                .into_iter()
                .filter(|(used, _)| used == name)
            {
                if resolver.type_decl(&file.path, name, line.line).as_ref() == Some(decl) {
                    out.push(Reference {
                        file: file.path.clone(),
                        span,
                        is_definition: false,
                    });
                }
            }
        }
    }
    out
}
