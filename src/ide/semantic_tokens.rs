//! Semantic tokens: global names and annotation type names (phase 5).

use super::Analysis;
use super::cursor::{CursorTarget, expr_sites};
use crate::annotation::{AnnotateStatement, colored_spans};
use crate::base::Span;
use crate::project::Workspace;
use crate::semantic::{FileResult, LuaType, SemanticIndex, VarRef};
use crate::syntax::ast::ExprKind;

/// Token type for semantic highlighting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenType {
    GlobalVariable,
    GlobalFunction,
    /// A user-declared type name inside a doc-comment annotation.
    AnnotationType,
}

impl TokenType {
    /// Convert to LSP token type index.
    pub fn to_lsp_index(self) -> u32 {
        match self {
            TokenType::GlobalVariable => 0,
            TokenType::GlobalFunction => 1,
            TokenType::AnnotationType => 2,
        }
    }
}

/// A semantic token for syntax highlighting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SemanticToken {
    /// Line number (0-indexed)
    pub line: usize,
    /// Column number (0-indexed)
    pub col: usize,
    /// Length of the token in bytes
    pub length: usize,
    pub token_type: TokenType,
}

impl SemanticToken {
    fn new(span: Span, token_type: TokenType) -> Option<Self> {
        // names never span lines; anything else is a degenerate span
        if span.start.line != span.end.line || span.end.column <= span.start.column {
            return None;
        }
        Some(Self {
            line: span.start.line,
            col: span.start.column,
            length: span.end.column - span.start.column,
            token_type,
        })
    }
}

/// Tokens for `file`, sorted by position.
///
/// Uses of names that resolve to a global declaration (not a local, not a
/// built-in) are colored as variables or functions; type names written in
/// annotations are colored as types.
pub fn color_file(ws: &Workspace, file: &str) -> Vec<SemanticToken> {
    Analysis::new(ws).color_file(file)
}

pub(crate) fn color_in(index: &SemanticIndex, file: &str) -> Vec<SemanticToken> {
    let Some(result) = index.file(file) else {
        return Vec::new();
    };
    let mut tokens: Vec<SemanticToken> = global_tokens(index, result)
        .into_iter()
        .chain(annotation_tokens(result))
        .collect();
    tokens.sort_by_key(|t| (t.line, t.col));
    tokens.dedup_by_key(|t| (t.line, t.col));
    tokens
}

fn global_tokens(index: &SemanticIndex, file: &FileResult) -> Vec<SemanticToken> {
    let mut tokens = Vec::new();
    for site in expr_sites(file) {
        let CursorTarget::Expr { expr, span } = &site.target else {
            continue;
        };
        if !matches!(expr.kind, ExprKind::Name(_)) {
            continue;
        }
        if file.lookup_local(&site.name, span.start).is_some() {
            continue;
        }
        let var = match file.best_global(&site.name) {
            Some(id) => VarRef::new(file.path.clone(), id),
            None => match index.global(&file.path, &site.name) {
                Some(var) => var,
                None => continue,
            },
        };
        let Some(info) = index.file(&var.file).and_then(|f| f.vars.get(var.id.index())) else {
            continue;
        };
        let token_type = if info.func.is_some() || info.lua_type == LuaType::Function {
            TokenType::GlobalFunction
        } else {
            TokenType::GlobalVariable
        };
        tokens.extend(SemanticToken::new(*span, token_type));
    }
    tokens
}

fn annotation_tokens(file: &FileResult) -> Vec<SemanticToken> {
    let mut spans = Vec::new();
    for info in file.annotate.fragments.values() {
        for stmt in info.fragment.statements() {
            if let AnnotateStatement::Class(class) = stmt {
                spans.push(class.span);
                spans.extend(class.parents.iter().map(|(_, span)| *span));
            }
            for ty in stmt.types() {
                spans.extend(colored_spans(ty));
            }
        }
    }
    spans
        .into_iter()
        .filter_map(|span| SemanticToken::new(span, TokenType::AnnotationType))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::project::AnalysisConfig;
    use std::path::Path;

    fn tokens(files: &[(&str, &str)], target: &str) -> Vec<(usize, usize, usize, TokenType)> {
        let ws = Workspace::new(AnalysisConfig::default());
        for (path, text) in files {
            ws.open_document(Path::new(path), text);
        }
        color_file(&ws, target)
            .into_iter()
            .map(|t| (t.line, t.col, t.length, t.token_type))
            .collect()
    }

    #[test]
    fn test_globals_and_functions() {
        let src = "Count = 0\nfunction bump() Count = Count + 1 end\nlocal x = Count\nbump()\nprint(x)\n";
        assert_eq!(
            tokens(&[("a.lua", src)], "a.lua"),
            vec![
                (0, 0, 5, TokenType::GlobalVariable),
                (1, 9, 4, TokenType::GlobalFunction),
                (1, 16, 5, TokenType::GlobalVariable),
                (1, 24, 5, TokenType::GlobalVariable),
                (2, 10, 5, TokenType::GlobalVariable),
                (3, 0, 4, TokenType::GlobalFunction),
            ]
        );
    }

    #[test]
    fn test_globals_from_other_files() {
        let result = tokens(&[("lib.lua", "Shared = {}\n"), ("a.lua", "print(Shared)\n")], "a.lua");
        assert_eq!(result, vec![(0, 6, 6, TokenType::GlobalVariable)]);
    }

    #[test]
    fn test_annotation_type_names() {
        let src = "---@class Vec : Base\n---@field x number\nlocal Vec = {}\n";
        let result = tokens(&[("a.lua", src)], "a.lua");
        assert_eq!(
            result,
            vec![
                (0, 10, 3, TokenType::AnnotationType),
                (0, 16, 4, TokenType::AnnotationType),
                (1, 12, 6, TokenType::AnnotationType),
            ]
        );
    }
}
