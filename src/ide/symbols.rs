//! Document and workspace symbols.
//!
//! Workspace search is a plain case-insensitive substring filter; ranking
//! is left to the client.

use smol_str::SmolStr;

use crate::base::{FilePath, Span, VarId};
use crate::project::{Workspace, parallel_map};
use crate::semantic::{FileResult, LuaType};

use super::Analysis;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SymbolKind {
    Class,
    Alias,
    Function,
    Variable,
    Field,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SymbolInfo {
    pub name: SmolStr,
    /// Table or class the symbol is a member of.
    pub container: Option<SmolStr>,
    pub kind: SymbolKind,
    pub file: FilePath,
    pub span: Span,
}

/// Declarations of one file in source order: globals, top-level locals and
/// their members, annotated classes with their fields, aliases.
pub fn document_symbols(ws: &Workspace, file: &str) -> Vec<SymbolInfo> {
    Analysis::new(ws)
        .index()
        .file(file)
        .map(|result| file_symbols(result))
        .unwrap_or_default()
}

/// Symbols of every file whose name contains `query`, ignoring case. An
/// empty query matches everything.
pub fn workspace_symbols(ws: &Workspace, query: &str) -> Vec<SymbolInfo> {
    let analysis = Analysis::new(ws);
    let index = analysis.index();
    let query = query.to_lowercase();
    let per_file = parallel_map(index.sorted_paths(), ws.config().worker_count(), |path| {
        let Some(result) = index.file(&path) else {
            return Vec::new();
        };
        file_symbols(result)
            .into_iter()
            .filter(|symbol| symbol.name.to_lowercase().contains(&query))
            .collect::<Vec<_>>()
    });
    let mut results: Vec<SymbolInfo> = per_file.into_iter().flatten().collect();
    results.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.file.cmp(&b.file)));
    results
}

pub(crate) fn file_symbols(file: &FileResult) -> Vec<SymbolInfo> {
    let mut out = Vec::new();
    let mut seen: Vec<VarId> = Vec::new();

    let top_level = file
        .vars
        .iter()
        .enumerate()
        .map(|(index, _)| VarId::new(index))
        .filter(|id| {
            let info = file.var(*id);
            let is_global = file.globals.get(&info.name).is_some_and(|ids| ids.contains(id));
            let is_top_local =
                info.is_local && !info.is_param && file.scope(info.scope).parent.is_none();
            !info.anonymous && (is_global || is_top_local)
        });
    for id in top_level {
        let info = file.var(id);
        seen.push(id);
        out.push(var_symbol(file, id, None));
        for (name, member) in &info.sub_members {
            if seen.contains(member) || file.var(*member).anonymous {
                continue;
            }
            seen.push(*member);
            let mut symbol = var_symbol(file, *member, Some(info.name.clone()));
            symbol.name = name.clone();
            if symbol.kind == SymbolKind::Variable {
                symbol.kind = SymbolKind::Field;
            }
            out.push(symbol);
        }
    }

    for info in file.annotate.fragments.values() {
        for class in &info.classes {
            out.push(SymbolInfo {
                name: class.name().clone(),
                container: None,
                kind: SymbolKind::Class,
                file: file.path.clone(),
                span: class.stmt.span,
            });
            for (name, field) in &class.fields {
                out.push(SymbolInfo {
                    name: name.clone(),
                    container: Some(class.name().clone()),
                    kind: SymbolKind::Field,
                    file: file.path.clone(),
                    span: field.span,
                });
            }
        }
        for alias in &info.aliases {
            out.push(SymbolInfo {
                name: alias.stmt.name.clone(),
                container: None,
                kind: SymbolKind::Alias,
                file: file.path.clone(),
                span: alias.stmt.span,
            });
        }
    }

    out.sort_by_key(|symbol| symbol.span.start);
    out
}

fn var_symbol(file: &FileResult, id: VarId, container: Option<SmolStr>) -> SymbolInfo {
    let info = file.var(id);
    let kind = if info.func.is_some() || info.lua_type == LuaType::Function {
        SymbolKind::Function
    } else {
        SymbolKind::Variable
    };
    SymbolInfo {
        name: info.name.clone(),
        container,
        kind,
        file: file.path.clone(),
        span: info.span,
    }
}
