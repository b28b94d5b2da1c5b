//! Recursive descent parser for the host scripting language
//!
//! Builds the [`Block`] tree from tokens. The first syntax error stops the
//! parse; the statements completed before it are kept.

use std::sync::Arc;

use smol_str::SmolStr;
use thiserror::Error;

use super::ast::*;
use super::comment::{CommentBlock, group_comments};
use super::lexer::{Token, TokenKind, tokenize};
use crate::base::{Position, Span};

/// A syntax error with location and message
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{span}: {message}")]
pub struct SyntaxError {
    pub message: String,
    pub span: Span,
}

impl SyntaxError {
    pub fn new(message: impl Into<String>, span: Span) -> Self {
        Self {
            message: message.into(),
            span,
        }
    }
}

/// Parse result: the chunk, its comment blocks and any errors
#[derive(Debug, Clone, Default)]
pub struct ParsedChunk {
    pub block: Block,
    pub comments: Vec<CommentBlock>,
    pub errors: Vec<SyntaxError>,
}

impl ParsedChunk {
    /// Check if parsing succeeded without errors
    pub fn ok(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Parse a whole source file.
pub fn parse_chunk(input: &str) -> ParsedChunk {
    let lexed = tokenize(input);
    let mut errors: Vec<SyntaxError> = lexed
        .errors
        .iter()
        .map(|span| SyntaxError::new("unexpected symbol", *span))
        .collect();

    let mut parser = Parser::new(&lexed.tokens);
    let block = parser.chunk(&mut errors);

    ParsedChunk {
        block,
        comments: group_comments(lexed.comments),
        errors,
    }
}

type PResult<T> = Result<T, SyntaxError>;

/// The parser state
struct Parser<'t, 'a> {
    tokens: &'t [Token<'a>],
    pos: usize,
    prev_end: Position,
}

impl<'t, 'a> Parser<'t, 'a> {
    fn new(tokens: &'t [Token<'a>]) -> Self {
        Self {
            tokens,
            pos: 0,
            prev_end: Position::default(),
        }
    }

    // =========================================================================
    // Token inspection
    // =========================================================================

    fn current(&self) -> Option<&'t Token<'a>> {
        self.tokens.get(self.pos)
    }

    fn at(&self, kind: TokenKind) -> bool {
        self.current().is_some_and(|t| t.kind == kind)
    }

    fn nth(&self, n: usize) -> Option<TokenKind> {
        self.tokens.get(self.pos + n).map(|t| t.kind)
    }

    fn start(&self) -> Position {
        self.current().map_or(self.prev_end, |t| t.span.start)
    }

    fn span_from(&self, start: Position) -> Span {
        Span::new(start, self.prev_end)
    }

    fn error_here(&self, message: &str) -> SyntaxError {
        match self.current() {
            Some(token) => SyntaxError::new(format!("{message} near '{}'", token.text), token.span),
            None => SyntaxError::new(
                format!("{message} near <eof>"),
                Span::new(self.prev_end, self.prev_end),
            ),
        }
    }

    // =========================================================================
    // Token consumption
    // =========================================================================

    fn bump(&mut self) -> Option<&'t Token<'a>> {
        let token = self.current()?;
        self.prev_end = token.span.end;
        self.pos += 1;
        Some(token)
    }

    fn eat(&mut self, kind: TokenKind) -> bool {
        if self.at(kind) {
            self.bump();
            true
        } else {
            false
        }
    }

    fn expect(&mut self, kind: TokenKind, what: &str) -> PResult<&'t Token<'a>> {
        if self.at(kind) {
            self.bump().ok_or_else(|| self.error_here(what))
        } else {
            Err(self.error_here(&format!("'{what}' expected")))
        }
    }

    fn expect_name(&mut self) -> PResult<(SmolStr, Span)> {
        let token = self.expect(TokenKind::Name, "<name>")?;
        Ok((SmolStr::new(token.text), token.span))
    }

    // =========================================================================
    // Blocks and statements
    // =========================================================================

    fn chunk(&mut self, errors: &mut Vec<SyntaxError>) -> Block {
        let start = self.start();
        let mut block = Block::default();
        let result = self.block_body(&mut block).and_then(|()| match self.current() {
            Some(_) => Err(self.error_here("'<eof>' expected")),
            None => Ok(()),
        });
        if let Err(err) = result {
            errors.push(err);
        }
        block.span = self.span_from(start);
        block
    }

    fn block(&mut self) -> PResult<Block> {
        let start = self.start();
        let mut block = Block::default();
        self.block_body(&mut block)?;
        block.span = self.span_from(start);
        Ok(block)
    }

    fn block_body(&mut self, block: &mut Block) -> PResult<()> {
        loop {
            match self.current().map(|t| t.kind) {
                None
                | Some(TokenKind::End)
                | Some(TokenKind::Else)
                | Some(TokenKind::Elseif)
                | Some(TokenKind::Until) => return Ok(()),
                Some(TokenKind::Return) => {
                    block.ret = Some(self.return_stat()?);
                    return Ok(());
                }
                Some(TokenKind::Semicolon) => {
                    self.bump();
                }
                Some(_) => {
                    let stat = self.statement()?;
                    block.stats.push(stat);
                }
            }
        }
    }

    fn return_stat(&mut self) -> PResult<ReturnStat> {
        let start = self.start();
        self.bump();
        let exprs = match self.current().map(|t| t.kind) {
            None
            | Some(TokenKind::End)
            | Some(TokenKind::Else)
            | Some(TokenKind::Elseif)
            | Some(TokenKind::Until)
            | Some(TokenKind::Semicolon) => Vec::new(),
            Some(_) => self.expr_list()?,
        };
        self.eat(TokenKind::Semicolon);
        Ok(ReturnStat {
            exprs,
            span: self.span_from(start),
        })
    }

    fn statement(&mut self) -> PResult<Stat> {
        let start = self.start();
        let Some(kind) = self.nth(0) else {
            return Err(self.error_here("statement expected"));
        };
        match kind {
            TokenKind::If => self.if_stat(start),
            TokenKind::While => {
                self.bump();
                let cond = self.expr()?;
                self.expect(TokenKind::Do, "do")?;
                let block = self.block()?;
                self.expect(TokenKind::End, "end")?;
                Ok(Stat::While { cond, block })
            }
            TokenKind::Do => {
                self.bump();
                let block = self.block()?;
                self.expect(TokenKind::End, "end")?;
                Ok(Stat::Do(block))
            }
            TokenKind::For => self.for_stat(start),
            TokenKind::Repeat => {
                self.bump();
                let block = self.block()?;
                self.expect(TokenKind::Until, "until")?;
                let cond = self.expr()?;
                Ok(Stat::Repeat { block, cond })
            }
            TokenKind::Function => self.function_stat(start),
            TokenKind::Local => {
                self.bump();
                if self.at(TokenKind::Function) {
                    let fn_start = self.start();
                    self.bump();
                    let (name, name_span) = self.expect_name()?;
                    let func = self.func_body(fn_start, false)?;
                    Ok(Stat::LocalFunction {
                        name,
                        name_span,
                        func,
                    })
                } else {
                    self.local_stat(start)
                }
            }
            TokenKind::ColonColon => {
                self.bump();
                let (name, span) = self.expect_name()?;
                self.expect(TokenKind::ColonColon, "::")?;
                Ok(Stat::Label(name, span))
            }
            TokenKind::Break => {
                self.bump();
                Ok(Stat::Break(self.span_from(start)))
            }
            TokenKind::Goto if self.nth(1) == Some(TokenKind::Name) => {
                self.bump();
                let (name, _) = self.expect_name()?;
                Ok(Stat::Goto(name, self.span_from(start)))
            }
            _ => self.expr_stat(start),
        }
    }

    fn if_stat(&mut self, start: Position) -> PResult<Stat> {
        let mut clauses = Vec::new();
        let mut else_block = None;
        // `if` and every `elseif` share the same clause shape
        loop {
            self.bump();
            let cond = self.expr()?;
            self.expect(TokenKind::Then, "then")?;
            let body = self.block()?;
            clauses.push((cond, body));
            if !self.at(TokenKind::Elseif) {
                break;
            }
        }
        if self.eat(TokenKind::Else) {
            else_block = Some(self.block()?);
        }
        self.expect(TokenKind::End, "end")?;
        Ok(Stat::If {
            clauses,
            else_block,
            span: self.span_from(start),
        })
    }

    fn for_stat(&mut self, start: Position) -> PResult<Stat> {
        self.bump();
        let (first, first_span) = self.expect_name()?;
        if self.eat(TokenKind::Eq) {
            let from = self.expr()?;
            self.expect(TokenKind::Comma, ",")?;
            let limit = self.expr()?;
            let step = if self.eat(TokenKind::Comma) {
                Some(self.expr()?)
            } else {
                None
            };
            self.expect(TokenKind::Do, "do")?;
            let block = self.block()?;
            self.expect(TokenKind::End, "end")?;
            return Ok(Stat::NumericFor {
                var: first,
                var_span: first_span,
                start: from,
                limit,
                step,
                block,
                span: self.span_from(start),
            });
        }

        let mut names = vec![(first, first_span)];
        while self.eat(TokenKind::Comma) {
            names.push(self.expect_name()?);
        }
        self.expect(TokenKind::In, "in")?;
        let exprs = self.expr_list()?;
        self.expect(TokenKind::Do, "do")?;
        let block = self.block()?;
        self.expect(TokenKind::End, "end")?;
        Ok(Stat::GenericFor {
            names,
            exprs,
            block,
            span: self.span_from(start),
        })
    }

    fn function_stat(&mut self, start: Position) -> PResult<Stat> {
        self.bump();
        let (name, span) = self.expect_name()?;
        let mut target = Expr::new(ExprKind::Name(name), span);
        let mut is_method = false;
        loop {
            let separator = self.nth(0);
            if separator != Some(TokenKind::Dot) && separator != Some(TokenKind::Colon) {
                break;
            }
            self.bump();
            let (field, field_span) = self.expect_name()?;
            let key = Expr::new(ExprKind::String(field), field_span);
            let span = target.span.cover(field_span);
            target = Expr::new(ExprKind::Index { prefix: target, key }, span);
            if separator == Some(TokenKind::Colon) {
                is_method = true;
                break;
            }
        }
        let func = self.func_body(start, is_method)?;
        Ok(Stat::Function {
            target,
            is_method,
            func,
        })
    }

    fn local_stat(&mut self, start: Position) -> PResult<Stat> {
        let mut names = Vec::new();
        loop {
            let (name, span) = self.expect_name()?;
            let attrib = if self.eat(TokenKind::Lt) {
                let (attrib, _) = self.expect_name()?;
                self.expect(TokenKind::Gt, ">")?;
                Some(attrib)
            } else {
                None
            };
            names.push(LocalName { name, span, attrib });
            if !self.eat(TokenKind::Comma) {
                break;
            }
        }
        let exprs = if self.eat(TokenKind::Eq) {
            self.expr_list()?
        } else {
            Vec::new()
        };
        Ok(Stat::Local {
            names,
            exprs,
            span: self.span_from(start),
        })
    }

    fn expr_stat(&mut self, start: Position) -> PResult<Stat> {
        let first = self.suffixed_expr()?;
        if self.at(TokenKind::Eq) || self.at(TokenKind::Comma) {
            let mut targets = vec![first];
            while self.eat(TokenKind::Comma) {
                targets.push(self.suffixed_expr()?);
            }
            for target in &targets {
                if !matches!(target.kind, ExprKind::Name(_) | ExprKind::Index { .. }) {
                    return Err(SyntaxError::new("syntax error: cannot assign", target.span));
                }
            }
            self.expect(TokenKind::Eq, "=")?;
            let exprs = self.expr_list()?;
            return Ok(Stat::Assign {
                targets,
                exprs,
                span: self.span_from(start),
            });
        }
        if matches!(first.kind, ExprKind::Call(_)) {
            Ok(Stat::Call(first))
        } else {
            Err(SyntaxError::new("syntax error near expression", first.span))
        }
    }

    // =========================================================================
    // Expressions
    // =========================================================================

    fn expr_list(&mut self) -> PResult<Vec<ExprRef>> {
        let mut exprs = vec![self.expr()?];
        while self.eat(TokenKind::Comma) {
            exprs.push(self.expr()?);
        }
        Ok(exprs)
    }

    fn expr(&mut self) -> PResult<ExprRef> {
        self.sub_expr(0)
    }

    /// Binary expressions whose operators bind tighter than `limit`.
    fn sub_expr(&mut self, limit: u8) -> PResult<ExprRef> {
        let start = self.start();
        let mut lhs = match self.current().and_then(|t| unary_op(t.kind)) {
            Some(op) => {
                self.bump();
                let expr = self.sub_expr(UNARY_PRIORITY)?;
                Expr::new(ExprKind::Unary { op, expr }, self.span_from(start))
            }
            None => self.simple_expr()?,
        };
        while let Some(op) = self.current().and_then(|t| binary_op(t.kind)) {
            let (left, right) = op.priority();
            if left <= limit {
                break;
            }
            self.bump();
            let rhs = self.sub_expr(right)?;
            lhs = Expr::new(ExprKind::Binary { op, lhs, rhs }, self.span_from(start));
        }
        Ok(lhs)
    }

    fn simple_expr(&mut self) -> PResult<ExprRef> {
        let Some(token) = self.current() else {
            return Err(self.error_here("unexpected symbol"));
        };
        let span = token.span;
        let kind = match token.kind {
            TokenKind::Number => ExprKind::Number(SmolStr::new(token.text)),
            TokenKind::String => ExprKind::String(unquote(token.text)),
            TokenKind::LongString => ExprKind::String(long_string_value(token.text)),
            TokenKind::Nil => ExprKind::Nil,
            TokenKind::True => ExprKind::True,
            TokenKind::False => ExprKind::False,
            TokenKind::Ellipsis => ExprKind::Vararg,
            TokenKind::LBrace => return self.table_constructor(),
            TokenKind::Function => {
                let start = span.start;
                self.bump();
                let func = self.func_body(start, false)?;
                let span = func.span;
                return Ok(Expr::new(ExprKind::Function(func), span));
            }
            _ => return self.suffixed_expr(),
        };
        self.bump();
        Ok(Expr::new(kind, span))
    }

    fn primary_expr(&mut self) -> PResult<ExprRef> {
        let start = self.start();
        match self.nth(0) {
            Some(TokenKind::Name) => {
                let (name, span) = self.expect_name()?;
                Ok(Expr::new(ExprKind::Name(name), span))
            }
            Some(TokenKind::LParen) => {
                self.bump();
                let inner = self.expr()?;
                self.expect(TokenKind::RParen, ")")?;
                Ok(Expr::new(ExprKind::Paren(inner), self.span_from(start)))
            }
            _ => Err(self.error_here("unexpected symbol")),
        }
    }

    fn suffixed_expr(&mut self) -> PResult<ExprRef> {
        let start = self.start();
        let mut expr = self.primary_expr()?;
        loop {
            match self.nth(0) {
                Some(TokenKind::Dot) => {
                    self.bump();
                    let (field, field_span) = self.expect_name()?;
                    let key = Expr::new(ExprKind::String(field), field_span);
                    expr = Expr::new(
                        ExprKind::Index { prefix: expr, key },
                        self.span_from(start),
                    );
                }
                Some(TokenKind::LBracket) => {
                    self.bump();
                    let key = self.expr()?;
                    self.expect(TokenKind::RBracket, "]")?;
                    expr = Expr::new(
                        ExprKind::Index { prefix: expr, key },
                        self.span_from(start),
                    );
                }
                Some(TokenKind::Colon) => {
                    self.bump();
                    let method = self.expect_name()?;
                    let args = self.call_args()?;
                    let call = CallExpr {
                        callee: expr,
                        method: Some(method),
                        args,
                    };
                    expr = Expr::new(ExprKind::Call(call), self.span_from(start));
                }
                Some(TokenKind::LParen)
                | Some(TokenKind::String)
                | Some(TokenKind::LongString)
                | Some(TokenKind::LBrace) => {
                    let args = self.call_args()?;
                    let call = CallExpr {
                        callee: expr,
                        method: None,
                        args,
                    };
                    expr = Expr::new(ExprKind::Call(call), self.span_from(start));
                }
                _ => return Ok(expr),
            }
        }
    }

    fn call_args(&mut self) -> PResult<Vec<ExprRef>> {
        match self.nth(0) {
            Some(TokenKind::String) | Some(TokenKind::LongString) => Ok(vec![self.simple_expr()?]),
            Some(TokenKind::LBrace) => Ok(vec![self.table_constructor()?]),
            Some(TokenKind::LParen) => {
                self.bump();
                if self.eat(TokenKind::RParen) {
                    return Ok(Vec::new());
                }
                let args = self.expr_list()?;
                self.expect(TokenKind::RParen, ")")?;
                Ok(args)
            }
            _ => Err(self.error_here("function arguments expected")),
        }
    }

    fn table_constructor(&mut self) -> PResult<ExprRef> {
        let start = self.start();
        self.expect(TokenKind::LBrace, "{")?;
        let mut table = TableConstructor::default();
        while !self.at(TokenKind::RBrace) {
            let field = match self.nth(0) {
                Some(TokenKind::LBracket) => {
                    self.bump();
                    let key = self.expr()?;
                    self.expect(TokenKind::RBracket, "]")?;
                    self.expect(TokenKind::Eq, "=")?;
                    TableField {
                        key: Some(key),
                        value: self.expr()?,
                    }
                }
                Some(TokenKind::Name) if self.nth(1) == Some(TokenKind::Eq) => {
                    let (name, span) = self.expect_name()?;
                    self.bump();
                    TableField {
                        key: Some(Expr::new(ExprKind::String(name), span)),
                        value: self.expr()?,
                    }
                }
                _ => TableField {
                    key: None,
                    value: self.expr()?,
                },
            };
            table.fields.push(field);
            if !self.eat(TokenKind::Comma) && !self.eat(TokenKind::Semicolon) {
                break;
            }
        }
        self.expect(TokenKind::RBrace, "}")?;
        Ok(Expr::new(ExprKind::Table(table), self.span_from(start)))
    }

    /// Parameter list and body; the `function` keyword is already consumed.
    fn func_body(&mut self, start: Position, is_method: bool) -> PResult<Arc<FuncBody>> {
        self.expect(TokenKind::LParen, "(")?;
        let mut params = Vec::new();
        let mut is_vararg = false;
        if is_method {
            params.push((SmolStr::new_static("self"), Span::new(start, start)));
        }
        if !self.at(TokenKind::RParen) {
            loop {
                if self.eat(TokenKind::Ellipsis) {
                    is_vararg = true;
                    break;
                }
                params.push(self.expect_name()?);
                if !self.eat(TokenKind::Comma) {
                    break;
                }
            }
        }
        self.expect(TokenKind::RParen, ")")?;
        let block = self.block()?;
        self.expect(TokenKind::End, "end")?;
        Ok(Arc::new(FuncBody {
            params,
            is_vararg,
            block,
            span: self.span_from(start),
        }))
    }
}

fn unary_op(kind: TokenKind) -> Option<UnOp> {
    Some(match kind {
        TokenKind::Not => UnOp::Not,
        TokenKind::Minus => UnOp::Neg,
        TokenKind::Hash => UnOp::Len,
        TokenKind::Tilde => UnOp::BitNot,
        _ => return None,
    })
}

fn binary_op(kind: TokenKind) -> Option<BinOp> {
    Some(match kind {
        TokenKind::Or => BinOp::Or,
        TokenKind::And => BinOp::And,
        TokenKind::Lt => BinOp::Lt,
        TokenKind::Gt => BinOp::Gt,
        TokenKind::LtEq => BinOp::Le,
        TokenKind::GtEq => BinOp::Ge,
        TokenKind::TildeEq => BinOp::Ne,
        TokenKind::EqEq => BinOp::Eq,
        TokenKind::Pipe => BinOp::BitOr,
        TokenKind::Tilde => BinOp::BitXor,
        TokenKind::Amp => BinOp::BitAnd,
        TokenKind::Shl => BinOp::Shl,
        TokenKind::Shr => BinOp::Shr,
        TokenKind::DotDot => BinOp::Concat,
        TokenKind::Plus => BinOp::Add,
        TokenKind::Minus => BinOp::Sub,
        TokenKind::Star => BinOp::Mul,
        TokenKind::Slash => BinOp::Div,
        TokenKind::SlashSlash => BinOp::IDiv,
        TokenKind::Percent => BinOp::Mod,
        TokenKind::Caret => BinOp::Pow,
        _ => return None,
    })
}

/// Strip quotes from a short string literal and decode simple escapes.
fn unquote(text: &str) -> SmolStr {
    let inner = &text[1..text.len().saturating_sub(1).max(1)];
    if !inner.contains('\\') {
        return SmolStr::new(inner);
    }
    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some('r') => out.push('\r'),
            Some(other) => out.push(other),
            None => {}
        }
    }
    SmolStr::new(out)
}

fn long_string_value(text: &str) -> SmolStr {
    let level = text[1..].bytes().take_while(|b| *b == b'=').count();
    let open = level + 2;
    let body = &text[open..text.len().saturating_sub(open).max(open)];
    SmolStr::new(body.strip_prefix('\n').unwrap_or(body))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_ok(src: &str) -> Block {
        let parsed = parse_chunk(src);
        assert!(parsed.ok(), "unexpected errors: {:?}", parsed.errors);
        parsed.block
    }

    #[test]
    fn test_local_with_require() {
        let block = parse_ok("local m = require(\"m\")\n");
        let Stat::Local { names, exprs, .. } = &block.stats[0] else {
            panic!("expected local");
        };
        assert_eq!(names[0].name, "m");
        let ExprKind::Call(call) = &exprs[0].kind else {
            panic!("expected call");
        };
        assert_eq!(call.simple_callee().map(|s| s.as_str()), Some("require"));
        assert_eq!(call.args[0].as_str().map(|s| s.as_str()), Some("m"));
    }

    #[test]
    fn test_concat_is_right_associative() {
        let block = parse_ok("x = a .. b .. c");
        let Stat::Assign { exprs, .. } = &block.stats[0] else {
            panic!("expected assignment");
        };
        let ExprKind::Binary { op, lhs, rhs } = &exprs[0].kind else {
            panic!("expected binary");
        };
        assert_eq!(*op, BinOp::Concat);
        assert!(lhs.as_name().is_some());
        assert!(matches!(rhs.kind, ExprKind::Binary { op: BinOp::Concat, .. }));
    }

    #[test]
    fn test_and_binds_tighter_than_or() {
        let block = parse_ok("x = a or b and c");
        let Stat::Assign { exprs, .. } = &block.stats[0] else {
            panic!("expected assignment");
        };
        let ExprKind::Binary { op, rhs, .. } = &exprs[0].kind else {
            panic!("expected binary");
        };
        assert_eq!(*op, BinOp::Or);
        assert!(matches!(rhs.kind, ExprKind::Binary { op: BinOp::And, .. }));
    }

    #[test]
    fn test_method_function_gets_self() {
        let block = parse_ok("function A.b:c(x) return x end");
        let Stat::Function {
            target,
            is_method,
            func,
        } = &block.stats[0]
        else {
            panic!("expected function");
        };
        assert!(*is_method);
        assert!(matches!(target.kind, ExprKind::Index { .. }));
        let names: Vec<_> = func.params.iter().map(|(n, _)| n.as_str()).collect();
        assert_eq!(names, vec!["self", "x"]);
        assert_eq!(func.block.ret.as_ref().map(|r| r.exprs.len()), Some(1));
    }

    #[test]
    fn test_table_constructor_fields() {
        let block = parse_ok("local t = { a = 1, [2] = 'x', 3; f = function() end }");
        let Stat::Local { exprs, .. } = &block.stats[0] else {
            panic!("expected local");
        };
        let ExprKind::Table(table) = &exprs[0].kind else {
            panic!("expected table");
        };
        assert_eq!(table.fields.len(), 4);
        assert!(table.fields[2].key.is_none());
        assert_eq!(
            table.fields[0].key.as_ref().and_then(|k| k.key_text()).as_deref(),
            Some("a")
        );
    }

    #[test]
    fn test_generic_for_and_if() {
        let src = "for k, v in pairs(t) do if k then break elseif v then x() else y() end end";
        let block = parse_ok(src);
        let Stat::GenericFor { names, block, .. } = &block.stats[0] else {
            panic!("expected for");
        };
        assert_eq!(names.len(), 2);
        let Stat::If {
            clauses,
            else_block,
            ..
        } = &block.stats[0]
        else {
            panic!("expected if");
        };
        assert_eq!(clauses.len(), 2);
        assert!(else_block.is_some());
    }

    #[test]
    fn test_error_keeps_earlier_statements() {
        let parsed = parse_chunk("local a = 1\nlocal b = = 2\n");
        assert!(!parsed.ok());
        assert_eq!(parsed.block.stats.len(), 1);
        assert_eq!(parsed.errors[0].span.start.line, 1);
    }

    #[test]
    fn test_spans_are_zero_indexed() {
        let block = parse_ok("\n  local abc = 1");
        let Stat::Local { names, span, .. } = &block.stats[0] else {
            panic!("expected local");
        };
        assert_eq!(names[0].span, Span::on_line(1, 8, 11));
        assert_eq!(span.start, Position::new(1, 2));
    }

    #[test]
    fn test_string_call_and_long_string() {
        let block = parse_ok("require 'a.b'\nx = [[\nhello]]");
        let Stat::Call(call) = &block.stats[0] else {
            panic!("expected call");
        };
        let ExprKind::Call(call) = &call.kind else {
            panic!("expected call expr");
        };
        assert_eq!(call.args[0].as_str().map(|s| s.as_str()), Some("a.b"));
        let Stat::Assign { exprs, .. } = &block.stats[1] else {
            panic!("expected assignment");
        };
        assert_eq!(exprs[0].as_str().map(|s| s.as_str()), Some("hello"));
    }
}
