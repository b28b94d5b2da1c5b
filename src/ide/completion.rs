//! Completion suggestions implementation.

use std::sync::Arc;

use indexmap::IndexMap;
use smol_str::SmolStr;

use super::Analysis;
use crate::annotation::{DEFAULT_TYPES, Type};
use crate::base::Position;
use crate::project::Workspace;
use crate::semantic::{
    ChainPart, FileResult, LuaType, Resolver, SemanticIndex, Symbol, SymbolSource, VarInfo, VarRef,
};

/// Kind of completion item.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CompletionKind {
    Variable,
    Function,
    Field,
    Module,
    Builtin,
    /// A class or alias name inside an annotation.
    Type,
}

impl CompletionKind {
    /// Convert to LSP completion item kind number.
    pub fn to_lsp(&self) -> u32 {
        match self {
            CompletionKind::Variable => 6,
            CompletionKind::Function => 3,
            CompletionKind::Field => 5,
            CompletionKind::Module => 9,
            CompletionKind::Builtin => 14,
            CompletionKind::Type => 7,
        }
    }
}

/// A completion suggestion.
#[derive(Clone, Debug)]
pub struct CompletionItem {
    /// The text to insert.
    pub label: Arc<str>,
    pub kind: CompletionKind,
    /// Type or signature, shown after the label.
    pub detail: Option<Arc<str>>,
    /// Doc comment, shown in the popup.
    pub documentation: Option<Arc<str>>,
    /// Sort priority (lower = higher priority).
    pub sort_priority: u32,
}

impl CompletionItem {
    pub fn new(label: impl Into<Arc<str>>, kind: CompletionKind) -> Self {
        Self {
            label: label.into(),
            kind,
            detail: None,
            documentation: None,
            sort_priority: 100,
        }
    }

    pub fn with_detail(mut self, detail: impl Into<Arc<str>>) -> Self {
        self.detail = Some(detail.into());
        self
    }

    pub fn with_documentation(mut self, doc: impl Into<Arc<str>>) -> Self {
        self.documentation = Some(doc.into());
        self
    }

    pub fn with_priority(mut self, priority: u32) -> Self {
        self.sort_priority = priority;
        self
    }

    fn from_symbol(index: &SemanticIndex, label: &str, symbol: &Symbol) -> Self {
        let var = symbol.var.as_ref().and_then(|var| var_info(index, var));
        let is_function = matches!(symbol.ty, Some(Type::Func(_)))
            || var.is_some_and(|info| info.func.is_some() || info.lua_type == LuaType::Function);
        let kind = if symbol.source == SymbolSource::Builtin {
            CompletionKind::Builtin
        } else if symbol.module.is_some() {
            CompletionKind::Module
        } else if is_function {
            CompletionKind::Function
        } else if symbol.owner_class.is_some() {
            CompletionKind::Field
        } else {
            CompletionKind::Variable
        };

        let mut item = Self::new(label, kind);
        if let Some(ty) = &symbol.ty {
            item.detail = Some(Arc::from(ty.to_string()));
        } else if let Some(info) = var {
            item.detail = Some(Arc::from(info.lua_type.display()));
        }
        if let Some(comment) = symbol.comment.as_deref().filter(|c| !c.is_empty()) {
            item.documentation = Some(Arc::from(comment));
        }
        item
    }
}

fn var_info<'a>(index: &'a SemanticIndex, var: &VarRef) -> Option<&'a VarInfo> {
    index.file(&var.file)?.vars.get(var.id.index())
}

/// Completion at `line`/`col` after the dotted `prefix_parts`.
///
/// With no prefix every visible name is offered: locals first, then the
/// file's globals, the project's globals and the built-ins. A part written
/// as `name()` is treated as a call, so `["make()", ""]` completes members
/// of what `make` returns. Inside an annotation the declared type names are
/// offered instead.
pub fn completion(
    ws: &Workspace,
    file: &str,
    line: usize,
    col: usize,
    prefix_parts: &[&str],
) -> Vec<CompletionItem> {
    Analysis::new(ws).completion(file, line, col, prefix_parts)
}

pub(crate) fn completion_in(
    index: &SemanticIndex,
    file: &str,
    position: Position,
    prefix_parts: &[&str],
) -> Vec<CompletionItem> {
    let Some(result) = index.file(file) else {
        return Vec::new();
    };
    let mut items: IndexMap<SmolStr, CompletionItem> = IndexMap::new();

    if result.annotate.fragment_covering(position.line).is_some() {
        type_names(index, &mut items);
    } else if prefix_parts.is_empty() {
        visible_names(index, result, position, &mut items);
    } else {
        member_names(index, file, position, prefix_parts, &mut items);
    }

    let mut items: Vec<CompletionItem> = items.into_values().collect();
    items.sort_by_key(|item| item.sort_priority);
    items
}

fn visible_names(
    index: &SemanticIndex,
    file: &FileResult,
    position: Position,
    items: &mut IndexMap<SmolStr, CompletionItem>,
) {
    let mut resolver = Resolver::new(index);
    let mut offer = |name: &SmolStr, var: VarRef, priority: u32| {
        if items.contains_key(name) {
            return;
        }
        if let Some(symbol) = resolver.resolve_var(&var) {
            let item = CompletionItem::from_symbol(index, name, &symbol).with_priority(priority);
            items.insert(name.clone(), item);
        }
    };

    for (name, id) in file.visible_locals(position) {
        offer(&name, VarRef::new(file.path.clone(), id), 0);
    }
    for name in file.globals.keys() {
        if let Some(id) = file.best_global(name) {
            offer(name, VarRef::new(file.path.clone(), id), 10);
        }
    }
    for table in index.tables_for(&file.path) {
        for (name, var) in table.globals() {
            offer(name, var.clone(), 20);
        }
    }
    for name in index.system_vars() {
        if !items.contains_key(name) {
            let item = CompletionItem::new(name.as_str(), CompletionKind::Builtin).with_priority(30);
            items.insert(name.clone(), item);
        }
    }
}

fn member_names(
    index: &SemanticIndex,
    file: &str,
    position: Position,
    prefix_parts: &[&str],
    items: &mut IndexMap<SmolStr, CompletionItem>,
) {
    let parts: Vec<ChainPart> = prefix_parts
        .iter()
        .filter(|part| !part.is_empty())
        .map(|part| match part.strip_suffix("()") {
            Some(name) => ChainPart::call(name),
            None => ChainPart::name(*part),
        })
        .collect();
    let mut resolver = Resolver::new(index);
    let (Some(owner), _) = resolver.resolve_chain(file, &parts, position) else {
        tracing::trace!(file, parts = prefix_parts.len(), "completion prefix did not resolve");
        return;
    };
    for (name, symbol) in resolver.members(&owner) {
        let item = CompletionItem::from_symbol(index, &name, &symbol).with_priority(0);
        items.insert(name, item);
    }
}

fn type_names(index: &SemanticIndex, items: &mut IndexMap<SmolStr, CompletionItem>) {
    let mut names: Vec<&SmolStr> = index.type_map().keys().collect();
    names.sort();
    for name in names {
        let item = CompletionItem::new(name.as_str(), CompletionKind::Type).with_priority(0);
        items.insert(name.clone(), item);
    }
    for name in DEFAULT_TYPES {
        items
            .entry(SmolStr::new(name))
            .or_insert_with(|| CompletionItem::new(*name, CompletionKind::Type).with_priority(10));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::project::AnalysisConfig;
    use std::path::Path;

    fn workspace(files: &[(&str, &str)]) -> Workspace {
        let ws = Workspace::new(AnalysisConfig::default());
        for (path, text) in files {
            ws.open_document(Path::new(path), text);
        }
        ws
    }

    fn labels(items: &[CompletionItem]) -> Vec<&str> {
        items.iter().map(|item| item.label.as_ref()).collect()
    }

    #[test]
    fn test_visible_names_in_priority_order() {
        let ws = workspace(&[
            ("lib.lua", "Shared = 1\n"),
            ("a.lua", "Mine = 2\nlocal inner = 3\n\n"),
        ]);
        let items = completion(&ws, "a.lua", 2, 0, &[]);
        let labels = labels(&items);
        let pos = |label: &str| labels.iter().position(|l| *l == label).unwrap();
        assert!(pos("inner") < pos("Mine"));
        assert!(pos("Mine") < pos("Shared"));
        assert!(pos("Shared") < pos("print"));
    }

    #[test]
    fn test_local_not_visible_before_declaration() {
        let ws = workspace(&[("a.lua", "\nlocal later = 1\n")]);
        let items = completion(&ws, "a.lua", 0, 0, &[]);
        assert!(!labels(&items).contains(&"later"));
    }

    #[test]
    fn test_members_of_annotated_class_with_parent() {
        let src = "---@class Base\n---@field id number\n\n---@class Child : Base\n---@field name string\n\n---@type Child\nlocal c = nil\n\n";
        let ws = workspace(&[("a.lua", src)]);
        let items = completion(&ws, "a.lua", 8, 0, &["c", ""]);
        assert_eq!(labels(&items), vec!["name", "id"]);
        assert_eq!(items[0].kind, CompletionKind::Field);
        assert_eq!(items[0].detail.as_deref(), Some("string"));
    }

    #[test]
    fn test_members_through_call() {
        let src = "local function make()\n  return { size = 1, grow = function() end }\nend\n\n";
        let ws = workspace(&[("a.lua", src)]);
        let items = completion(&ws, "a.lua", 3, 0, &["make()"]);
        assert_eq!(labels(&items), vec!["size", "grow"]);
        assert_eq!(items[1].kind, CompletionKind::Function);
    }

    #[test]
    fn test_type_names_inside_annotation() {
        let ws = workspace(&[("a.lua", "---@class Widget\nlocal Widget = {}\n---@type \nlocal w = nil\n")]);
        let items = completion(&ws, "a.lua", 2, 9, &[]);
        let labels = labels(&items);
        assert_eq!(labels[0], "Widget");
        assert!(labels.contains(&"number"));
    }
}
