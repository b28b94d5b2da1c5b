//! Annotation syntax errors.

use thiserror::Error;

use crate::base::Span;

/// A malformed annotation line. The line becomes a `NotValid` statement and
/// parsing continues with the next one.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AnnotateError {
    #[error("annotate warn : syntax error near '{token}'")]
    Syntax { token: String, span: Span },

    #[error("annotate warn : not find annotate type near '{token}'")]
    MissingType { token: String, span: Span },
}

impl AnnotateError {
    /// From the offending column to the end of the line.
    pub fn span(&self) -> Span {
        match self {
            AnnotateError::Syntax { span, .. } | AnnotateError::MissingType { span, .. } => *span,
        }
    }

    pub fn token(&self) -> &str {
        match self {
            AnnotateError::Syntax { token, .. } | AnnotateError::MissingType { token, .. } => token,
        }
    }
}
