//! Logos-based lexer for one doc-comment line
//!
//! The lexer works on the text after the leading `--` of a comment. A line is
//! an annotation when it reads `-@...`; `-|` marks an alias continuation line.
//! One token of lookahead is kept.

use logos::Logos;

use super::error::AnnotateError;
use crate::base::Span;
use crate::syntax::CommentLine;

/// Annotation token kinds
#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[logos(skip r"[ \t\r\f]+")]
pub enum AnnotateTokenKind {
    // =========================================================================
    // PUNCTUATION
    // =========================================================================
    #[token(",")]
    Comma,
    #[token(":")]
    Colon,
    #[token("...")]
    Vararg,
    #[token("(")]
    LParen,
    #[token(")")]
    RParen,
    #[token("[")]
    LBracket,
    #[token("]")]
    RBracket,
    #[token("|")]
    Pipe,
    #[token("<")]
    Lt,
    #[token(">")]
    Gt,
    #[token("@")]
    At,
    #[token("?")]
    Question,
    #[token("#")]
    Hash,

    #[regex(r#"'[^']*'"#)]
    #[regex(r#""[^"]*""#)]
    String,

    // =========================================================================
    // KEYWORDS
    // =========================================================================
    #[token("fun")]
    Fun,
    #[token("table")]
    Table,
    #[token("type")]
    Type,
    #[token("param")]
    Param,
    #[token("field")]
    Field,
    #[token("class")]
    Class,
    #[token("return")]
    Return,
    #[token("overload")]
    Overload,
    #[token("alias")]
    Alias,
    #[token("generic")]
    Generic,
    #[token("public")]
    Public,
    #[token("protected")]
    Protected,
    #[token("private")]
    Private,
    #[token("vararg")]
    VarargKw,
    #[token("const")]
    Const,
    #[token("enum")]
    Enum,

    #[regex(r"[A-Za-z0-9_][A-Za-z0-9_.]*")]
    Identifier,

    /// Anything the lexer does not recognise; covers the rest of the line.
    Other,
    Eof,
}

impl AnnotateTokenKind {
    pub fn is_keyword(self) -> bool {
        matches!(
            self,
            AnnotateTokenKind::Fun
                | AnnotateTokenKind::Table
                | AnnotateTokenKind::Type
                | AnnotateTokenKind::Param
                | AnnotateTokenKind::Field
                | AnnotateTokenKind::Class
                | AnnotateTokenKind::Return
                | AnnotateTokenKind::Overload
                | AnnotateTokenKind::Alias
                | AnnotateTokenKind::Generic
                | AnnotateTokenKind::Public
                | AnnotateTokenKind::Protected
                | AnnotateTokenKind::Private
                | AnnotateTokenKind::VarargKw
                | AnnotateTokenKind::Const
                | AnnotateTokenKind::Enum
        )
    }
}

/// A token with its kind, text and single-line span
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnnotateToken<'a> {
    pub kind: AnnotateTokenKind,
    pub text: &'a str,
    pub span: Span,
    end: usize,
}

/// How a comment line starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineHead {
    /// `---@...`
    Statement,
    /// `---|...`
    Continuation,
}

/// Tokenizer over one annotation line.
#[derive(Debug, Clone)]
pub struct AnnotateLexer<'a> {
    text: &'a str,
    line: usize,
    base_col: usize,
    pos: usize,
    peeked: Option<AnnotateToken<'a>>,
    last: Option<AnnotateToken<'a>>,
}

impl<'a> AnnotateLexer<'a> {
    /// Lex `text`, whose first byte sits at `line:column`.
    pub fn new(text: &'a str, line: usize, column: usize) -> Self {
        Self {
            text,
            line,
            base_col: column,
            pos: 0,
            peeked: None,
            last: None,
        }
    }

    /// Lexer for a comment line, positioned after its `-@` / `-|` head.
    pub fn for_comment(comment: &'a CommentLine) -> Option<(Self, LineHead)> {
        let mut lexer = Self::new(&comment.text, comment.line, comment.column);
        let head = if comment.text.starts_with("-@") {
            LineHead::Statement
        } else if comment.text.starts_with("-|") {
            LineHead::Continuation
        } else {
            return None;
        };
        lexer.pos = 2;
        Some((lexer, head))
    }

    pub fn line(&self) -> usize {
        self.line
    }

    fn scan(&self, from: usize) -> AnnotateToken<'a> {
        let rest = &self.text[from..];
        let mut lex = AnnotateTokenKind::lexer(rest);
        match lex.next() {
            Some(Ok(kind)) => {
                let range = lex.span();
                self.token(kind, from + range.start, from + range.end)
            }
            Some(Err(())) => {
                let start = from + lex.span().start;
                self.token(AnnotateTokenKind::Other, start, self.text.len())
            }
            None => {
                let end = self.text.len();
                let start = end - rest.trim_start().len();
                self.token(AnnotateTokenKind::Eof, start, end)
            }
        }
    }

    fn token(&self, kind: AnnotateTokenKind, start: usize, end: usize) -> AnnotateToken<'a> {
        AnnotateToken {
            kind,
            text: &self.text[start..end],
            span: Span::on_line(self.line, self.base_col + start, self.base_col + end),
            end,
        }
    }

    /// Look at the next token without consuming it.
    pub fn peek(&mut self) -> AnnotateToken<'a> {
        match self.peeked {
            Some(token) => token,
            None => {
                let token = self.scan(self.pos);
                self.peeked = Some(token);
                token
            }
        }
    }

    pub fn peek_kind(&mut self) -> AnnotateTokenKind {
        self.peek().kind
    }

    pub fn next_token(&mut self) -> AnnotateToken<'a> {
        let token = self.peeked.take().unwrap_or_else(|| self.scan(self.pos));
        if token.kind != AnnotateTokenKind::Eof {
            self.pos = token.end;
        }
        self.last = Some(token);
        token
    }

    /// Span of the last consumed token, or of the lookahead before any token was consumed.
    pub fn now_span(&mut self) -> Span {
        match self.last {
            Some(token) => token.span,
            None => self.peek().span,
        }
    }

    /// Span where the lookahead token starts.
    pub fn head_span(&mut self) -> Span {
        self.peek().span
    }

    pub fn expect(&mut self, kind: AnnotateTokenKind) -> Result<AnnotateToken<'a>, AnnotateError> {
        let token = self.next_token();
        if token.kind == kind {
            Ok(token)
        } else {
            Err(self.error_near(token))
        }
    }

    pub fn eat(&mut self, kind: AnnotateTokenKind) -> bool {
        if self.peek_kind() == kind {
            self.next_token();
            true
        } else {
            false
        }
    }

    pub fn identifier(&mut self) -> Result<AnnotateToken<'a>, AnnotateError> {
        self.expect(AnnotateTokenKind::Identifier)
    }

    /// Class and field names may reuse keywords.
    pub fn field_name(&mut self) -> Result<AnnotateToken<'a>, AnnotateError> {
        let token = self.next_token();
        if token.kind == AnnotateTokenKind::Identifier || token.kind.is_keyword() {
            Ok(token)
        } else {
            Err(self.error_near(token))
        }
    }

    /// Parameter names may also be `...`.
    pub fn param_name(&mut self) -> Result<AnnotateToken<'a>, AnnotateError> {
        let token = self.next_token();
        if token.kind == AnnotateTokenKind::Identifier
            || token.kind == AnnotateTokenKind::Vararg
            || token.kind.is_keyword()
        {
            Ok(token)
        } else {
            Err(self.error_near(token))
        }
    }

    /// The rest of the line after the last consumed token, with a leading
    /// `@` or `#` removed. This is a statement's trailing free-text comment.
    pub fn remaining_comment(&mut self) -> (String, Span) {
        let rest = &self.text[self.pos..];
        let trimmed = rest.trim_start();
        let start = self.pos + (rest.len() - trimmed.len());
        let end = self.text.len();
        let text = trimmed
            .strip_prefix('@')
            .or_else(|| trimmed.strip_prefix('#'))
            .unwrap_or(trimmed);
        self.peeked = None;
        self.pos = end;
        (
            text.to_string(),
            Span::on_line(self.line, self.base_col + start, self.base_col + end),
        )
    }

    pub fn error_near(&self, token: AnnotateToken<'a>) -> AnnotateError {
        AnnotateError::Syntax {
            token: token.text.to_string(),
            span: self.error_span(),
        }
    }

    pub fn error_span(&self) -> Span {
        Span::on_line(
            self.line,
            self.base_col + self.pos,
            self.base_col + self.text.len().max(self.pos),
        )
    }
}
