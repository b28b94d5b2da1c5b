//! Diagnostics: advisory findings of every analysis phase.
//!
//! Nothing here ever stops analysis. Each phase turns its failures into
//! [`Diagnostic`] values and the workspace merges them per file on demand.

use std::sync::Arc;

use crate::annotation::AnnotateError;
use crate::base::{FilePath, Span};
use crate::syntax::SyntaxError;

// ============================================================================
// DIAGNOSTIC TYPES
// ============================================================================

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Severity {
    Error,
    Warning,
    Info,
    Hint,
}

impl Severity {
    /// LSP severity number.
    pub fn to_lsp(&self) -> u32 {
        match self {
            Severity::Error => 1,
            Severity::Warning => 2,
            Severity::Info => 3,
            Severity::Hint => 4,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Diagnostic {
    pub file: FilePath,
    pub span: Span,
    pub severity: Severity,
    /// Stable code from [`codes`].
    pub code: Option<Arc<str>>,
    pub message: Arc<str>,
    pub related: Vec<RelatedInfo>,
}

/// Another location that explains a diagnostic.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RelatedInfo {
    pub file: FilePath,
    pub span: Span,
    pub message: Arc<str>,
}

impl RelatedInfo {
    pub fn new(file: FilePath, span: Span, message: impl Into<Arc<str>>) -> Self {
        Self {
            file,
            span,
            message: message.into(),
        }
    }
}

impl Diagnostic {
    pub fn error(file: FilePath, span: Span, message: impl Into<Arc<str>>) -> Self {
        Self::new(file, span, Severity::Error, message)
    }

    pub fn warning(file: FilePath, span: Span, message: impl Into<Arc<str>>) -> Self {
        Self::new(file, span, Severity::Warning, message)
    }

    fn new(file: FilePath, span: Span, severity: Severity, message: impl Into<Arc<str>>) -> Self {
        Self {
            file,
            span,
            severity,
            code: None,
            message: message.into(),
            related: Vec::new(),
        }
    }

    pub fn with_code(mut self, code: impl Into<Arc<str>>) -> Self {
        self.code = Some(code.into());
        self
    }

    pub fn with_related(mut self, info: RelatedInfo) -> Self {
        self.related.push(info);
        self
    }
}

// ============================================================================
// DIAGNOSTIC CODES
// ============================================================================

/// - **E0001-E0099**: source and import errors
/// - **W0001-W0099**: annotation findings
pub mod codes {
    /// Host-language syntax error.
    pub const SYNTAX_ERROR: &str = "E0001";
    /// Import whose module string matches no workspace file.
    pub const UNRESOLVED_IMPORT: &str = "E0002";

    /// Malformed annotation line.
    pub const ANNOTATE_SYNTAX: &str = "W0001";
    /// Annotation names a type nobody declares.
    pub const UNDEFINED_TYPE: &str = "W0002";
    /// Class or alias declared more than once.
    pub const DUPLICATE_TYPE: &str = "W0003";
    /// Same value twice inside an `@enum` block.
    pub const DUPLICATE_ENUM_VALUE: &str = "W0004";
}

// ============================================================================
// DIAGNOSTIC COLLECTOR
// ============================================================================

#[derive(Clone, Debug, Default)]
pub struct DiagnosticCollector {
    diagnostics: Vec<Diagnostic>,
}

impl DiagnosticCollector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, diagnostic: Diagnostic) {
        self.diagnostics.push(diagnostic);
    }

    pub fn syntax_error(&mut self, file: &FilePath, error: &SyntaxError) {
        self.add(
            Diagnostic::error(file.clone(), error.span, error.message.clone())
                .with_code(codes::SYNTAX_ERROR),
        );
    }

    pub fn annotate_error(&mut self, file: &FilePath, error: &AnnotateError) {
        self.add(
            Diagnostic::warning(file.clone(), error.span(), error.to_string())
                .with_code(codes::ANNOTATE_SYNTAX),
        );
    }

    pub fn unresolved_import(&mut self, file: &FilePath, module: &str, span: Span) {
        self.add(
            Diagnostic::error(file.clone(), span, format!("module not found: '{module}'"))
                .with_code(codes::UNRESOLVED_IMPORT),
        );
    }

    pub fn undefined_type(&mut self, file: &FilePath, name: &str, span: Span) {
        self.add(
            Diagnostic::warning(
                file.clone(),
                span,
                format!("annotate type '{name}' not define"),
            )
            .with_code(codes::UNDEFINED_TYPE),
        );
    }

    /// One declaration of a type that is also declared at `others`.
    pub fn duplicate_type(
        &mut self,
        file: &FilePath,
        name: &str,
        span: Span,
        others: &[(FilePath, Span)],
    ) {
        let mut diag = Diagnostic::warning(
            file.clone(),
            span,
            format!("duplicate annotate type '{name}'"),
        )
        .with_code(codes::DUPLICATE_TYPE);
        for (other_file, other_span) in others {
            diag = diag.with_related(RelatedInfo::new(
                other_file.clone(),
                *other_span,
                format!("'{name}' also declared here"),
            ));
        }
        self.add(diag);
    }

    pub fn duplicate_enum_value(&mut self, file: &FilePath, value: &str, span: Span, first: Span) {
        self.add(
            Diagnostic::warning(file.clone(), span, format!("duplicate enum value '{value}'"))
                .with_code(codes::DUPLICATE_ENUM_VALUE)
                .with_related(RelatedInfo::new(file.clone(), first, "first use of the value")),
        );
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn diagnostics_for_file(&self, file: &str) -> Vec<&Diagnostic> {
        self.diagnostics
            .iter()
            .filter(|d| d.file.as_ref() == file)
            .collect()
    }

    /// Take ownership, leaving the collector empty.
    pub fn take(&mut self) -> Vec<Diagnostic> {
        std::mem::take(&mut self.diagnostics)
    }

    pub fn len(&self) -> usize {
        self.diagnostics.len()
    }

    pub fn is_empty(&self) -> bool {
        self.diagnostics.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn path(p: &str) -> FilePath {
        Arc::from(p)
    }

    #[test]
    fn test_diagnostic_builder() {
        let diag = Diagnostic::error(path("a.lua"), Span::on_line(1, 2, 5), "boom")
            .with_code(codes::SYNTAX_ERROR);
        assert_eq!(diag.severity, Severity::Error);
        assert_eq!(diag.code.as_deref(), Some("E0001"));
        assert_eq!(diag.span.end.column, 5);
    }

    #[test]
    fn test_collector_counts_and_files() {
        let mut collector = DiagnosticCollector::new();
        collector.unresolved_import(&path("a.lua"), "m", Span::default());
        collector.undefined_type(&path("b.lua"), "Foo", Span::default());
        collector.undefined_type(&path("b.lua"), "Bar", Span::default());
        let severities: Vec<Severity> = collector.diagnostics().iter().map(|d| d.severity).collect();
        assert_eq!(severities, vec![Severity::Error, Severity::Warning, Severity::Warning]);
        assert_eq!(collector.diagnostics_for_file("b.lua").len(), 2);
        assert_eq!(collector.take().len(), 3);
        assert!(collector.is_empty());
    }

    #[test]
    fn test_duplicate_type_lists_other_locations() {
        let mut collector = DiagnosticCollector::new();
        collector.duplicate_type(
            &path("a.lua"),
            "Foo",
            Span::on_line(0, 10, 13),
            &[(path("b.lua"), Span::on_line(3, 10, 13))],
        );
        let diag = &collector.diagnostics()[0];
        assert_eq!(diag.related.len(), 1);
        assert_eq!(diag.related[0].file.as_ref(), "b.lua");
    }

    #[test]
    fn test_severity_to_lsp() {
        assert_eq!(Severity::Error.to_lsp(), 1);
        assert_eq!(Severity::Hint.to_lsp(), 4);
    }
}
