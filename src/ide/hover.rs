//! Hover information implementation.

use std::fmt::Write as _;

use super::cursor::{CursorTarget, resolve_target, target_at};
use super::Analysis;
use crate::annotation::{AnnotateHit, ClassInfo, first_normal_name};
use crate::base::{FuncId, Position, Span};
use crate::project::Workspace;
use crate::semantic::{FileResult, Resolver, SemanticIndex, Symbol, SymbolSource, TypeDecl};

/// Result of a hover request.
#[derive(Clone, Debug)]
pub struct HoverResult {
    /// The hover content (markdown).
    pub contents: String,
    /// The hovered symbol, for follow-up reference lookups. `None` inside
    /// annotations.
    pub symbol: Option<Symbol>,
    /// The hovered range.
    pub span: Span,
}

/// Hover text for whatever is under `line`/`col` in `file`.
pub fn hover(ws: &Workspace, file: &str, line: usize, col: usize) -> Option<HoverResult> {
    Analysis::new(ws).hover(file, line, col)
}

pub(crate) fn hover_in(index: &SemanticIndex, file: &str, position: Position) -> Option<HoverResult> {
    let result = index.file(file)?;
    let target = target_at(result, position)?;
    let span = target.span(result);
    let mut resolver = Resolver::new(index);

    if let CursorTarget::Annotation { hit, line } = &target {
        let contents = match hit {
            AnnotateHit::TypeName(name, _) => match resolver.type_decl(file, name, *line) {
                Some(decl) => type_contents(index, &decl, name),
                None => format!("```lua\n{name}\n```"),
            },
            AnnotateHit::Declared { notice, comment, .. } => {
                with_comment(format!("```lua\n{notice}\n```"), Some(comment))
            }
        };
        return Some(HoverResult {
            contents,
            symbol: None,
            span,
        });
    }

    let symbol = resolve_target(&mut resolver, result, &target)?;
    let mut contents = format!("```lua\n{}\n```", symbol_signature(index, &symbol));
    if let Some(class) = annotated_class(&resolver, index, &symbol) {
        contents.push_str("\n\n```lua\n");
        contents.push_str(&class_body(class));
        contents.push_str("\n```");
    }
    Some(HoverResult {
        contents: with_comment(contents, symbol.comment.as_ref()),
        symbol: Some(symbol),
        span,
    })
}

/// One-line display of a symbol: its annotated type, its function
/// signature, or the structural kind of its value.
fn symbol_signature(index: &SemanticIndex, symbol: &Symbol) -> String {
    if let Some(ty) = &symbol.ty {
        return format!("{} : {}", symbol.name, ty);
    }
    if let Some(module) = &symbol.module {
        return format!("module {} : \"{}\"", symbol.name, module);
    }
    if symbol.source == SymbolSource::Builtin {
        return format!("builtin {}", symbol.name);
    }
    let Some(var) = &symbol.var else {
        return symbol.name.to_string();
    };
    let Some(file) = index.file(&var.file) else {
        return symbol.name.to_string();
    };
    let info = file.var(var.id);
    let scope = if info.is_local || info.is_param { "local" } else { "global" };
    match info.func {
        Some(func) => format!("{scope} function {}", func_params(file, func, &symbol.name)),
        None => format!("{scope} {} : {}", symbol.name, info.lua_type.display()),
    }
}

fn func_params(file: &FileResult, func: FuncId, name: &str) -> String {
    let func = file.func(func);
    let mut params: Vec<&str> = func
        .params
        .iter()
        .map(|id| file.var(*id).name.as_str())
        .filter(|param| !(func.is_method && *param == "self"))
        .collect();
    if func.is_vararg {
        params.push("...");
    }
    format!("{name}({})", params.join(", "))
}

fn annotated_class<'a>(
    resolver: &Resolver<'a>,
    index: &'a SemanticIndex,
    symbol: &Symbol,
) -> Option<&'a ClassInfo> {
    let ty = symbol.ty.as_ref()?;
    let name = first_normal_name(ty)?;
    let decl = resolver.type_decl(symbol.ty_file.as_ref()?, name, ty.span().start.line)?;
    index.file(&decl.file)?.annotate.class(&decl.entry)
}

fn type_contents(index: &SemanticIndex, decl: &TypeDecl, name: &str) -> String {
    let Some(file) = index.file(&decl.file) else {
        return format!("```lua\n{name}\n```");
    };
    if let Some(class) = file.annotate.class(&decl.entry) {
        let text = format!("```lua\n{}\n```", class_body(class));
        return with_comment(text, Some(&class.stmt.comment));
    }
    if let Some(alias) = file.annotate.alias(&decl.entry) {
        let text = match &alias.stmt.ty {
            Some(ty) => format!("```lua\nalias {name} = {ty}\n```"),
            None => format!("```lua\nalias {name}\n```"),
        };
        return with_comment(text, Some(&alias.stmt.comment));
    }
    format!("```lua\n{name}\n```")
}

/// `class Name : Parent` followed by one `field : Type` line per field.
fn class_body(class: &ClassInfo) -> String {
    let mut out = format!("class {}", class.name());
    if !class.stmt.parents.is_empty() {
        let parents: Vec<&str> = class.stmt.parents.iter().map(|(p, _)| p.as_str()).collect();
        let _ = write!(out, " : {}", parents.join(", "));
    }
    for (name, field) in &class.fields {
        let _ = write!(out, "\n  {} : {}", name, field.ty);
    }
    out
}

fn with_comment(mut contents: String, comment: Option<&String>) -> String {
    if let Some(comment) = comment.map(|c| c.trim()).filter(|c| !c.is_empty()) {
        contents.push_str("\n\n---\n");
        contents.push_str(comment);
    }
    contents
}
