//! Logos-based lexer for the host scripting language
//!
//! Produces significant tokens for the parser and keeps comments aside as
//! [`CommentLine`]s so the annotation layer can read doc-comments.

use logos::Logos;

use crate::base::{Position, Span};

/// A token with its kind, text, and span
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token<'a> {
    pub kind: TokenKind,
    pub text: &'a str,
    pub span: Span,
}

/// One physical comment line: the text after the leading `--`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommentLine {
    pub text: String,
    pub line: usize,
    /// Column where `text` starts (just past `--`).
    pub column: usize,
    /// Whether the comment is the first token on its line.
    pub head: bool,
}

/// Byte offset to line/column conversion.
#[derive(Debug, Clone)]
pub struct LineIndex {
    line_starts: Vec<usize>,
}

impl LineIndex {
    pub fn new(text: &str) -> Self {
        let mut line_starts = vec![0];
        line_starts.extend(
            text.bytes()
                .enumerate()
                .filter(|(_, b)| *b == b'\n')
                .map(|(i, _)| i + 1),
        );
        Self { line_starts }
    }

    pub fn position(&self, offset: usize) -> Position {
        let line = match self.line_starts.binary_search(&offset) {
            Ok(line) => line,
            Err(next) => next - 1,
        };
        Position::new(line, offset - self.line_starts[line])
    }

    pub fn span(&self, range: std::ops::Range<usize>) -> Span {
        Span::new(self.position(range.start), self.position(range.end))
    }
}

/// Output of [`tokenize`]
#[derive(Debug, Clone, Default)]
pub struct Tokens<'a> {
    pub tokens: Vec<Token<'a>>,
    pub comments: Vec<CommentLine>,
    /// Spans of text the lexer could not recognise.
    pub errors: Vec<Span>,
}

/// Tokenize a whole source text.
pub fn tokenize(input: &str) -> Tokens<'_> {
    let index = LineIndex::new(input);
    let mut out = Tokens::default();
    let mut lexer = LogosToken::lexer(input);
    let mut last_code_line: Option<usize> = None;

    while let Some(result) = lexer.next() {
        let range = lexer.span();
        let text = lexer.slice();
        let span = index.span(range.clone());
        match result {
            Ok(LogosToken::Comment) => {
                push_comment(&mut out.comments, text, span, last_code_line);
            }
            Ok(LogosToken::Shebang) => {}
            Ok(token) => {
                last_code_line = Some(span.end.line);
                out.tokens.push(Token {
                    kind: token.into(),
                    text,
                    span,
                });
            }
            Err(()) => out.errors.push(span),
        }
    }
    out
}

fn push_comment(
    comments: &mut Vec<CommentLine>,
    text: &str,
    span: Span,
    last_code_line: Option<usize>,
) {
    let head = last_code_line != Some(span.start.line);
    let body = &text[2..];
    if long_bracket_level(body).is_some() {
        // Long comments never carry annotations; they only break comment runs.
        for (i, line) in body.lines().enumerate() {
            comments.push(CommentLine {
                text: format!("[{line}"),
                line: span.start.line + i,
                column: if i == 0 { span.start.column + 2 } else { 0 },
                head: head && i == 0,
            });
        }
        return;
    }
    comments.push(CommentLine {
        text: body.trim_end_matches('\r').to_string(),
        line: span.start.line,
        column: span.start.column + 2,
        head,
    });
}

/// Number of `=` in an opening long bracket `[==[` at the start of `text`.
fn long_bracket_level(text: &str) -> Option<usize> {
    let rest = text.strip_prefix('[')?;
    let level = rest.bytes().take_while(|b| *b == b'=').count();
    (rest.as_bytes().get(level) == Some(&b'[')).then_some(level)
}

/// Consume the body of a long bracket whose opening bracket has `level` `=`.
fn bump_long_bracket(lex: &mut logos::Lexer<'_, LogosToken>, level: usize) -> bool {
    let close = format!("]{}]", "=".repeat(level));
    match lex.remainder().find(&close) {
        Some(pos) => {
            lex.bump(pos + close.len());
            true
        }
        None => false,
    }
}

fn lex_long_string(lex: &mut logos::Lexer<'_, LogosToken>) -> bool {
    let level = lex.slice().len() - 2;
    bump_long_bracket(lex, level)
}

fn lex_comment(lex: &mut logos::Lexer<'_, LogosToken>) -> bool {
    if let Some(level) = long_bracket_level(lex.remainder()) {
        lex.bump(level + 2);
        return bump_long_bracket(lex, level);
    }
    let len = lex.remainder().find('\n').unwrap_or(lex.remainder().len());
    lex.bump(len);
    true
}

/// Significant token kinds seen by the parser.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    Name,
    Number,
    String,
    LongString,
    // keywords
    And,
    Break,
    Do,
    Else,
    Elseif,
    End,
    False,
    For,
    Function,
    Goto,
    If,
    In,
    Local,
    Nil,
    Not,
    Or,
    Repeat,
    Return,
    Then,
    True,
    Until,
    While,
    // punctuation
    Plus,
    Minus,
    Star,
    Slash,
    SlashSlash,
    Percent,
    Caret,
    Hash,
    Amp,
    Tilde,
    Pipe,
    Shl,
    Shr,
    EqEq,
    TildeEq,
    LtEq,
    GtEq,
    Lt,
    Gt,
    Eq,
    LParen,
    RParen,
    LBrace,
    RBrace,
    LBracket,
    RBracket,
    ColonColon,
    Semicolon,
    Colon,
    Comma,
    Dot,
    DotDot,
    Ellipsis,
}

/// Logos token enum - maps to [`TokenKind`]
#[derive(Logos, Debug, Clone, Copy, PartialEq)]
#[logos(skip r"[ \t\r\n\f]+")]
pub enum LogosToken {
    // =========================================================================
    // TRIVIA
    // =========================================================================
    #[token("--", lex_comment)]
    Comment,

    #[token("#!", |lex| { let n = lex.remainder().find('\n').unwrap_or(lex.remainder().len()); lex.bump(n); }, priority = 3)]
    Shebang,

    // =========================================================================
    // LITERALS
    // =========================================================================
    #[regex(r"[A-Za-z_][A-Za-z0-9_]*")]
    Name,

    #[regex(r"0[xX][0-9a-fA-F]*(\.[0-9a-fA-F]*)?([pP][+-]?[0-9]+)?")]
    #[regex(r"[0-9]+(\.[0-9]*)?([eE][+-]?[0-9]+)?")]
    #[regex(r"\.[0-9]+([eE][+-]?[0-9]+)?")]
    Number,

    #[regex(r#""([^"\\\n]|\\(.|\n))*""#)]
    #[regex(r#"'([^'\\\n]|\\(.|\n))*'"#)]
    String,

    #[regex(r"\[=*\[", lex_long_string)]
    LongString,

    // =========================================================================
    // KEYWORDS
    // =========================================================================
    #[token("and")]
    And,
    #[token("break")]
    Break,
    #[token("do")]
    Do,
    #[token("else")]
    Else,
    #[token("elseif")]
    Elseif,
    #[token("end")]
    End,
    #[token("false")]
    False,
    #[token("for")]
    For,
    #[token("function")]
    Function,
    #[token("goto")]
    Goto,
    #[token("if")]
    If,
    #[token("in")]
    In,
    #[token("local")]
    Local,
    #[token("nil")]
    Nil,
    #[token("not")]
    Not,
    #[token("or")]
    Or,
    #[token("repeat")]
    Repeat,
    #[token("return")]
    Return,
    #[token("then")]
    Then,
    #[token("true")]
    True,
    #[token("until")]
    Until,
    #[token("while")]
    While,

    // =========================================================================
    // MULTI-CHARACTER PUNCTUATION
    // =========================================================================
    #[token("...")]
    Ellipsis,
    #[token("..")]
    DotDot,
    #[token("::")]
    ColonColon,
    #[token("//")]
    SlashSlash,
    #[token("==")]
    EqEq,
    #[token("~=")]
    TildeEq,
    #[token("<=")]
    LtEq,
    #[token(">=")]
    GtEq,
    #[token("<<")]
    Shl,
    #[token(">>")]
    Shr,

    // =========================================================================
    // SINGLE-CHARACTER PUNCTUATION
    // =========================================================================
    #[token("+")]
    Plus,
    #[token("-")]
    Minus,
    #[token("*")]
    Star,
    #[token("/")]
    Slash,
    #[token("%")]
    Percent,
    #[token("^")]
    Caret,
    #[token("#")]
    Hash,
    #[token("&")]
    Amp,
    #[token("~")]
    Tilde,
    #[token("|")]
    Pipe,
    #[token("<")]
    Lt,
    #[token(">")]
    Gt,
    #[token("=")]
    Eq,
    #[token("(")]
    LParen,
    #[token(")")]
    RParen,
    #[token("{")]
    LBrace,
    #[token("}")]
    RBrace,
    #[token("[")]
    LBracket,
    #[token("]")]
    RBracket,
    #[token(";")]
    Semicolon,
    #[token(":")]
    Colon,
    #[token(",")]
    Comma,
    #[token(".")]
    Dot,
}

impl From<LogosToken> for TokenKind {
    fn from(token: LogosToken) -> Self {
        match token {
            // Comments and shebangs are filtered before conversion; treat a stray one as a name.
            LogosToken::Comment | LogosToken::Shebang | LogosToken::Name => TokenKind::Name,
            LogosToken::Number => TokenKind::Number,
            LogosToken::String => TokenKind::String,
            LogosToken::LongString => TokenKind::LongString,
            LogosToken::And => TokenKind::And,
            LogosToken::Break => TokenKind::Break,
            LogosToken::Do => TokenKind::Do,
            LogosToken::Else => TokenKind::Else,
            LogosToken::Elseif => TokenKind::Elseif,
            LogosToken::End => TokenKind::End,
            LogosToken::False => TokenKind::False,
            LogosToken::For => TokenKind::For,
            LogosToken::Function => TokenKind::Function,
            LogosToken::Goto => TokenKind::Goto,
            LogosToken::If => TokenKind::If,
            LogosToken::In => TokenKind::In,
            LogosToken::Local => TokenKind::Local,
            LogosToken::Nil => TokenKind::Nil,
            LogosToken::Not => TokenKind::Not,
            LogosToken::Or => TokenKind::Or,
            LogosToken::Repeat => TokenKind::Repeat,
            LogosToken::Return => TokenKind::Return,
            LogosToken::Then => TokenKind::Then,
            LogosToken::True => TokenKind::True,
            LogosToken::Until => TokenKind::Until,
            LogosToken::While => TokenKind::While,
            LogosToken::Ellipsis => TokenKind::Ellipsis,
            LogosToken::DotDot => TokenKind::DotDot,
            LogosToken::ColonColon => TokenKind::ColonColon,
            LogosToken::SlashSlash => TokenKind::SlashSlash,
            LogosToken::EqEq => TokenKind::EqEq,
            LogosToken::TildeEq => TokenKind::TildeEq,
            LogosToken::LtEq => TokenKind::LtEq,
            LogosToken::GtEq => TokenKind::GtEq,
            LogosToken::Shl => TokenKind::Shl,
            LogosToken::Shr => TokenKind::Shr,
            LogosToken::Plus => TokenKind::Plus,
            LogosToken::Minus => TokenKind::Minus,
            LogosToken::Star => TokenKind::Star,
            LogosToken::Slash => TokenKind::Slash,
            LogosToken::Percent => TokenKind::Percent,
            LogosToken::Caret => TokenKind::Caret,
            LogosToken::Hash => TokenKind::Hash,
            LogosToken::Amp => TokenKind::Amp,
            LogosToken::Tilde => TokenKind::Tilde,
            LogosToken::Pipe => TokenKind::Pipe,
            LogosToken::Lt => TokenKind::Lt,
            LogosToken::Gt => TokenKind::Gt,
            LogosToken::Eq => TokenKind::Eq,
            LogosToken::LParen => TokenKind::LParen,
            LogosToken::RParen => TokenKind::RParen,
            LogosToken::LBrace => TokenKind::LBrace,
            LogosToken::RBrace => TokenKind::RBrace,
            LogosToken::LBracket => TokenKind::LBracket,
            LogosToken::RBracket => TokenKind::RBracket,
            LogosToken::Semicolon => TokenKind::Semicolon,
            LogosToken::Colon => TokenKind::Colon,
            LogosToken::Comma => TokenKind::Comma,
            LogosToken::Dot => TokenKind::Dot,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(input: &str) -> Vec<TokenKind> {
        tokenize(input).tokens.iter().map(|t| t.kind).collect()
    }

    #[test]
    fn test_keywords_win_over_names() {
        assert_eq!(
            kinds("local function endless end"),
            vec![
                TokenKind::Local,
                TokenKind::Function,
                TokenKind::Name,
                TokenKind::End
            ]
        );
    }

    #[test]
    fn test_long_string_with_level() {
        let tokens = tokenize("x = [==[a ]] b]==] y");
        let kinds: Vec<_> = tokens.tokens.iter().map(|t| t.kind).collect();
        assert_eq!(
            kinds,
            vec![
                TokenKind::Name,
                TokenKind::Eq,
                TokenKind::LongString,
                TokenKind::Name
            ]
        );
        assert_eq!(tokens.tokens[2].text, "[==[a ]] b]==]");
    }

    #[test]
    fn test_comments_are_split_from_tokens() {
        let tokens = tokenize("---@type number\nlocal a = 1 -- trailing\n");
        assert_eq!(tokens.comments.len(), 2);
        assert_eq!(tokens.comments[0].text, "-@type number");
        assert_eq!(tokens.comments[0].line, 0);
        assert_eq!(tokens.comments[0].column, 2);
        assert!(tokens.comments[0].head);
        assert!(!tokens.comments[1].head);
        assert_eq!(tokens.tokens.len(), 4);
    }

    #[test]
    fn test_long_comment_is_skipped() {
        let tokens = tokenize("--[[ a\n b ]] local x");
        assert_eq!(
            tokens.tokens.iter().map(|t| t.kind).collect::<Vec<_>>(),
            vec![TokenKind::Local, TokenKind::Name]
        );
        assert_eq!(tokens.tokens[1].span.start.line, 1);
    }

    #[test]
    fn test_numbers_and_dots() {
        assert_eq!(
            kinds("a..b ... 1.5 .5 0x1F"),
            vec![
                TokenKind::Name,
                TokenKind::DotDot,
                TokenKind::Name,
                TokenKind::Ellipsis,
                TokenKind::Number,
                TokenKind::Number,
                TokenKind::Number
            ]
        );
    }

    #[test]
    fn test_line_index_positions() {
        let index = LineIndex::new("ab\ncd\n");
        assert_eq!(index.position(0), Position::new(0, 0));
        assert_eq!(index.position(3), Position::new(1, 0));
        assert_eq!(index.position(4), Position::new(1, 1));
    }
}
