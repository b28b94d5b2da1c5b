//! Workspace checks run after every rebuild.
//!
//! All findings are advisory. They are recomputed from scratch, so an edit
//! that fixes a problem anywhere clears it everywhere.

use std::sync::Arc;

use rustc_hash::FxHashMap;
use smol_str::SmolStr;

use crate::annotation::{AnnotateStatement, FragmentInfo, Type, is_default_type};
use crate::base::{FilePath, Span};
use crate::semantic::{DiagnosticCollector, FileResult, SemanticIndex};
use crate::syntax::ast::{ExprKind, ExprRef, walk_block_exprs};

/// Run every check. `latest` holds the newest first-pass result of each
/// file, which may be broken while the index still serves the last good one.
pub fn check_workspace(
    index: &SemanticIndex,
    latest: &FxHashMap<FilePath, Arc<FileResult>>,
) -> DiagnosticCollector {
    let mut out = DiagnosticCollector::new();

    for path in index.sorted_paths() {
        let Some(file) = index.file(&path) else {
            continue;
        };
        let newest = latest.get(&path).unwrap_or(file);
        for error in &newest.syntax_errors {
            out.syntax_error(&path, error);
        }
        for error in &newest.annotate.errors {
            out.annotate_error(&path, error);
        }
        check_imports(index, file, &mut out);
        check_type_names(index, file, &mut out);
        check_enum_values(file, &mut out);
    }
    check_duplicate_types(index, &mut out);
    out
}

fn check_imports(index: &SemanticIndex, file: &FileResult, out: &mut DiagnosticCollector) {
    for refer in &file.imports {
        if index.is_ignored_module(&refer.module) {
            continue;
        }
        if index.resolve_module(&file.path, refer).is_none() {
            out.unresolved_import(&file.path, &refer.module, refer.span);
        }
    }
}

fn check_type_names(index: &SemanticIndex, file: &FileResult, out: &mut DiagnosticCollector) {
    for info in file.annotate.fragments.values() {
        for line in &info.fragment.lines {
            for (name, span) in referenced_names(&line.stmt) {
                if !is_known_type(index, info, &name) {
                    out.undefined_type(&file.path, &name, span);
                }
            }
        }
    }
}

/// Type names a statement refers to, excluding the one it declares.
pub(crate) fn referenced_names(stmt: &AnnotateStatement) -> Vec<(SmolStr, Span)> {
    let mut names: Vec<(SmolStr, Span)> = Vec::new();
    for ty in stmt.types() {
        free_names(ty, &mut Vec::new(), &mut names);
    }
    match stmt {
        AnnotateStatement::Class(class) => names.extend(class.parents.iter().cloned()),
        AnnotateStatement::Generic(generic) => {
            names.extend(generic.params.iter().filter_map(|p| p.parent.clone()))
        }
        _ => {}
    }
    names
}

/// Names in `ty` not bound by the generics of an enclosing `fun<T>`.
fn free_names(ty: &Type, bound: &mut Vec<SmolStr>, out: &mut Vec<(SmolStr, Span)>) {
    match ty {
        Type::Normal(normal) => {
            if !bound.contains(&normal.name) {
                out.push((normal.name.clone(), normal.span));
            }
        }
        Type::Multi(multi) => multi.types.iter().for_each(|t| free_names(t, bound, out)),
        Type::Array(array) => free_names(&array.element, bound, out),
        Type::Table(table) => {
            if let Some(key) = &table.key {
                free_names(key, bound, out);
            }
            if let Some(value) = &table.value {
                free_names(value, bound, out);
            }
        }
        Type::Func(func) => {
            let outer = bound.len();
            bound.extend(func.generics.iter().map(|(name, _)| name.clone()));
            func.params.iter().for_each(|p| free_names(&p.ty, bound, out));
            func.returns.iter().for_each(|r| free_names(r, bound, out));
            bound.truncate(outer);
        }
        Type::Const(_) | Type::NotValid(_) => {}
    }
}

fn is_known_type(index: &SemanticIndex, info: &FragmentInfo, name: &str) -> bool {
    name == "..."
        || is_default_type(name)
        || info.is_generic(name)
        || !index.type_entries(name).is_empty()
}

fn check_duplicate_types(index: &SemanticIndex, out: &mut DiagnosticCollector) {
    for (name, entries) in index.type_map() {
        if entries.len() < 2 {
            continue;
        }
        for (i, entry) in entries.iter().enumerate() {
            let others: Vec<(FilePath, Span)> = entries
                .iter()
                .enumerate()
                .filter(|(j, _)| *j != i)
                .map(|(_, other)| (other.file.clone(), other.entry.span))
                .collect();
            out.duplicate_type(&entry.file, name, entry.entry.span, &others);
        }
    }
}

/// Repeated literal values in the table an `@enum start` / `@enum end` pair
/// encloses.
fn check_enum_values(file: &FileResult, out: &mut DiagnosticCollector) {
    for &(start, end) in &file.annotate.enum_ranges {
        let mut table: Option<ExprRef> = None;
        walk_block_exprs(&file.chunk, &mut |expr: &ExprRef| {
            let inside = expr.span.start.line > start && expr.span.end.line < end;
            if table.is_none() && inside && matches!(expr.kind, ExprKind::Table(_)) {
                table = Some(expr.clone());
            }
        });
        let Some(table) = table else {
            continue;
        };
        let ExprKind::Table(ctor) = &table.kind else {
            continue;
        };

        let mut seen: FxHashMap<SmolStr, Span> = FxHashMap::default();
        for field in &ctor.fields {
            let value = match &field.value.kind {
                ExprKind::Number(v) | ExprKind::String(v) => v.clone(),
                _ => continue,
            };
            match seen.get(&value) {
                Some(first) => {
                    out.duplicate_enum_value(&file.path, &value, field.value.span, *first)
                }
                None => {
                    seen.insert(value, field.value.span);
                }
            }
        }
    }
}
