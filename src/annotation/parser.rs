//! Recursive descent parser for annotation lines.
//!
//! Each comment line is parsed on its own. A malformed line yields an
//! [`AnnotateError`] and is kept as [`AnnotateStatement::NotValid`]; the
//! remaining lines of the block are still parsed.

use smol_str::SmolStr;
use tracing::trace;

use super::ast::*;
use super::error::AnnotateError;
use super::lexer::{AnnotateLexer, AnnotateTokenKind as K, LineHead};
use crate::syntax::CommentBlock;

type ParseResult<T> = Result<T, AnnotateError>;

/// Parse every annotation line of a comment block.
pub fn parse_fragment(block: &CommentBlock) -> (Fragment, Vec<AnnotateError>) {
    let mut fragment = Fragment::default();
    let mut errors = Vec::new();

    for comment in &block.lines {
        let Some((mut lexer, head)) = AnnotateLexer::for_comment(comment) else {
            continue;
        };

        match head {
            LineHead::Continuation => {
                if let Some(literal) = parse_alias_continuation(&mut lexer) {
                    extend_last_alias(&mut fragment, literal);
                }
            }
            LineHead::Statement => match parse_line(&mut lexer) {
                Ok(Some(stmt)) => fragment.lines.push(AnnotateLine {
                    line: comment.line,
                    stmt,
                }),
                Ok(None) => {}
                Err(err) => {
                    trace!(line = comment.line, %err, "annotation line rejected");
                    fragment.lines.push(AnnotateLine {
                        line: comment.line,
                        stmt: AnnotateStatement::NotValid(err.span()),
                    });
                    errors.push(err);
                }
            },
        }
    }

    (fragment, errors)
}

/// Parse one `@...` line. Returns `Ok(None)` for tags this layer does not model.
pub fn parse_line(lexer: &mut AnnotateLexer<'_>) -> ParseResult<Option<AnnotateStatement>> {
    let stmt = match lexer.peek_kind() {
        K::Type => parse_type_stmt(lexer)?,
        K::Alias => parse_alias(lexer)?,
        K::Class => parse_class(lexer)?,
        K::Overload => parse_overload(lexer)?,
        K::Field => parse_field(lexer)?,
        K::Param => parse_param(lexer)?,
        K::Return => parse_return(lexer)?,
        K::Generic => parse_generic(lexer)?,
        K::VarargKw => parse_vararg(lexer)?,
        K::Enum => parse_enum(lexer)?,
        _ => return Ok(None),
    };
    Ok(Some(stmt))
}

// ============================================================================
// STATEMENTS
// ============================================================================

fn parse_type_stmt(lexer: &mut AnnotateLexer<'_>) -> ParseResult<AnnotateStatement> {
    lexer.expect(K::Type)?;
    let mut stmt = TypeStatement {
        types: Vec::new(),
        consts: Vec::new(),
        enums: Vec::new(),
        comment: String::new(),
    };

    loop {
        // `const enum` and `enum const` are both accepted
        let mut is_const = false;
        let mut is_enum = false;
        loop {
            if !is_const && lexer.eat(K::Const) {
                is_const = true;
            } else if !is_enum && lexer.eat(K::Enum) {
                is_enum = true;
            } else {
                break;
            }
        }

        stmt.types.push(parse_one_type(lexer)?);
        stmt.consts.push(is_const);
        stmt.enums.push(is_enum);

        if !lexer.eat(K::Comma) {
            break;
        }
    }

    stmt.comment = lexer.remaining_comment().0;
    Ok(AnnotateStatement::Type(stmt))
}

fn parse_alias(lexer: &mut AnnotateLexer<'_>) -> ParseResult<AnnotateStatement> {
    lexer.expect(K::Alias)?;
    let name = lexer.identifier()?;
    let mut stmt = AliasStatement {
        name: name.text.into(),
        span: name.span,
        ty: None,
        comment: String::new(),
    };

    match lexer.peek_kind() {
        // literal alternatives follow on `---|` lines
        K::Eof => {}
        K::At => stmt.comment = lexer.remaining_comment().0,
        _ => {
            stmt.ty = Some(parse_one_type(lexer)?);
            stmt.comment = lexer.remaining_comment().0;
        }
    }
    Ok(AnnotateStatement::Alias(stmt))
}

fn parse_class(lexer: &mut AnnotateLexer<'_>) -> ParseResult<AnnotateStatement> {
    lexer.expect(K::Class)?;
    let name = lexer.field_name()?;
    let mut parents = Vec::new();
    if lexer.eat(K::Colon) {
        loop {
            let parent = lexer.field_name()?;
            parents.push((SmolStr::new(parent.text), parent.span));
            if !lexer.eat(K::Comma) {
                break;
            }
        }
    }
    Ok(AnnotateStatement::Class(ClassStatement {
        name: name.text.into(),
        span: name.span,
        parents,
        comment: lexer.remaining_comment().0,
    }))
}

fn parse_overload(lexer: &mut AnnotateLexer<'_>) -> ParseResult<AnnotateStatement> {
    lexer.expect(K::Overload)?;
    let ty = parse_fun_type(lexer)?;
    let comment = lexer.remaining_comment().0;
    Ok(AnnotateStatement::Overload { ty, comment })
}

fn parse_field(lexer: &mut AnnotateLexer<'_>) -> ParseResult<AnnotateStatement> {
    lexer.expect(K::Field)?;
    let visibility = match lexer.peek_kind() {
        K::Public => Visibility::Public,
        K::Protected => Visibility::Protected,
        K::Private => Visibility::Private,
        _ => Visibility::Public,
    };
    if matches!(lexer.peek_kind(), K::Public | K::Protected | K::Private) {
        lexer.next_token();
    }

    let name = lexer.field_name()?;
    let colon = lexer.eat(K::Colon);
    let ty = parse_one_type(lexer)?;
    Ok(AnnotateStatement::Field(FieldStatement {
        visibility,
        name: name.text.into(),
        span: name.span,
        colon,
        ty,
        comment: lexer.remaining_comment().0,
    }))
}

fn parse_param(lexer: &mut AnnotateLexer<'_>) -> ParseResult<AnnotateStatement> {
    lexer.expect(K::Param)?;
    let is_const = lexer.eat(K::Const);
    let name = lexer.param_name()?;
    let optional = lexer.eat(K::Question);
    let ty = parse_one_type(lexer)?;
    Ok(AnnotateStatement::Param(ParamStatement {
        name: name.text.into(),
        span: name.span,
        is_const,
        optional,
        ty,
        comment: lexer.remaining_comment().0,
    }))
}

fn parse_return(lexer: &mut AnnotateLexer<'_>) -> ParseResult<AnnotateStatement> {
    lexer.expect(K::Return)?;
    let mut types = Vec::new();
    let mut optionals = Vec::new();
    loop {
        types.push(parse_one_type(lexer)?);
        optionals.push(lexer.eat(K::Question));
        if !lexer.eat(K::Comma) {
            break;
        }
    }
    Ok(AnnotateStatement::Return(ReturnStatement {
        types,
        optionals,
        comment: lexer.remaining_comment().0,
    }))
}

fn parse_generic(lexer: &mut AnnotateLexer<'_>) -> ParseResult<AnnotateStatement> {
    lexer.expect(K::Generic)?;
    let mut params = Vec::new();
    loop {
        let name = lexer.identifier()?;
        let parent = if lexer.eat(K::Colon) {
            let parent = lexer.identifier()?;
            Some((SmolStr::new(parent.text), parent.span))
        } else {
            None
        };
        params.push(GenericParam {
            name: name.text.into(),
            span: name.span,
            parent,
        });
        if !lexer.eat(K::Comma) {
            break;
        }
    }
    Ok(AnnotateStatement::Generic(GenericStatement {
        params,
        comment: lexer.remaining_comment().0,
    }))
}

fn parse_vararg(lexer: &mut AnnotateLexer<'_>) -> ParseResult<AnnotateStatement> {
    lexer.expect(K::VarargKw)?;
    let ty = parse_one_type(lexer)?;
    let comment = lexer.remaining_comment().0;
    Ok(AnnotateStatement::Vararg { ty, comment })
}

fn parse_enum(lexer: &mut AnnotateLexer<'_>) -> ParseResult<AnnotateStatement> {
    lexer.expect(K::Enum)?;
    let token = lexer.identifier()?;
    let marker = match token.text {
        "start" => EnumMarker::Start,
        "end" => EnumMarker::End,
        _ => return Err(lexer.error_near(token)),
    };
    lexer.remaining_comment();
    Ok(AnnotateStatement::Enum {
        marker,
        span: token.span,
    })
}

/// `---| 'literal' # comment`
fn parse_alias_continuation(lexer: &mut AnnotateLexer<'_>) -> Option<Type> {
    if lexer.peek_kind() != K::String {
        return None;
    }
    let token = lexer.next_token();
    let (literal, quoted) = split_quotes(strip_outer_quotes(token.text));
    let comment = lexer.remaining_comment().0;
    Some(Type::Const(ConstType {
        literal: literal.into(),
        quoted,
        comment: comment.trim_start().to_string(),
        span: token.span,
    }))
}

fn extend_last_alias(fragment: &mut Fragment, literal: Type) {
    let alias = fragment.lines.iter_mut().rev().find_map(|l| match &mut l.stmt {
        AnnotateStatement::Alias(alias) => Some(alias),
        _ => None,
    });
    let Some(alias) = alias else {
        return;
    };
    alias.ty = Some(match alias.ty.take() {
        Some(existing) => Type::union(vec![existing, literal]),
        None => literal,
    });
}

// ============================================================================
// TYPES
// ============================================================================

/// Alternatives separated by `|`.
pub(crate) fn parse_one_type(lexer: &mut AnnotateLexer<'_>) -> ParseResult<Type> {
    let mut types = vec![parse_single_type(lexer)?];
    while lexer.eat(K::Pipe) {
        types.push(parse_single_type(lexer)?);
    }
    Ok(Type::union(types))
}

/// One alternative, with any number of `[]` suffixes.
fn parse_single_type(lexer: &mut AnnotateLexer<'_>) -> ParseResult<Type> {
    let begin = lexer.head_span();
    let mut ty = match lexer.peek_kind() {
        K::LParen => {
            lexer.next_token();
            let inner = parse_one_type(lexer)?;
            lexer.expect(K::RParen)?;
            inner
        }
        K::Fun => parse_fun_type(lexer)?,
        K::Table => parse_table_type(lexer)?,
        K::Identifier => {
            let token = lexer.next_token();
            Type::normal(token.text, token.span)
        }
        K::Vararg => {
            let token = lexer.next_token();
            Type::normal("...", token.span)
        }
        K::String => {
            let token = lexer.next_token();
            let (literal, quoted) = split_quotes(strip_outer_quotes(token.text));
            Type::Const(ConstType {
                literal: literal.into(),
                quoted,
                comment: String::new(),
                span: token.span,
            })
        }
        _ => {
            let token = lexer.peek();
            return Err(AnnotateError::MissingType {
                token: token.text.to_string(),
                span: lexer.error_span(),
            });
        }
    };

    while lexer.peek_kind() == K::LBracket {
        lexer.next_token();
        let close = lexer.expect(K::RBracket)?;
        ty = Type::Array(ArrayType {
            element: Box::new(ty),
            span: begin.cover(close.span),
        });
    }
    Ok(ty)
}

/// `fun<T>(a: A, b?: B, ...): R1, R2`
fn parse_fun_type(lexer: &mut AnnotateLexer<'_>) -> ParseResult<Type> {
    let fun = lexer.expect(K::Fun)?;
    let mut generics = Vec::new();
    if lexer.eat(K::Lt) {
        loop {
            let name = lexer.identifier()?;
            generics.push((SmolStr::new(name.text), name.span));
            if !lexer.eat(K::Comma) {
                break;
            }
        }
        lexer.expect(K::Gt)?;
    }

    lexer.expect(K::LParen)?;
    let mut params = Vec::new();
    if lexer.peek_kind() != K::RParen {
        loop {
            let name = lexer.param_name()?;
            let optional = lexer.eat(K::Question);
            let ty = if lexer.eat(K::Colon) {
                parse_one_type(lexer)?
            } else {
                Type::Normal(NormalType {
                    name: SmolStr::new_static("any"),
                    span: name.span,
                    colored: false,
                })
            };
            params.push(FuncParam {
                name: name.text.into(),
                span: name.span,
                optional,
                ty,
            });
            if !lexer.eat(K::Comma) {
                break;
            }
        }
    }
    let close = lexer.expect(K::RParen)?;
    let mut span = fun.span.cover(close.span);

    let mut returns = Vec::new();
    if lexer.eat(K::Colon) {
        loop {
            let ty = parse_one_type(lexer)?;
            span = span.cover(ty.span());
            returns.push(ty);
            // optional marker on a return slot carries no extra meaning here
            lexer.eat(K::Question);
            if !lexer.eat(K::Comma) {
                break;
            }
        }
    }

    Ok(Type::Func(FuncType {
        generics,
        params,
        returns,
        span,
    }))
}

/// `table` or `table<K, V>`
fn parse_table_type(lexer: &mut AnnotateLexer<'_>) -> ParseResult<Type> {
    let table = lexer.expect(K::Table)?;
    if !lexer.eat(K::Lt) {
        return Ok(Type::Table(TableType {
            key: None,
            value: None,
            empty: true,
            span: table.span,
        }));
    }
    let key = parse_one_type(lexer)?;
    lexer.expect(K::Comma)?;
    let value = parse_one_type(lexer)?;
    let close = lexer.expect(K::Gt)?;
    Ok(Type::Table(TableType {
        key: Some(Box::new(key)),
        value: Some(Box::new(value)),
        empty: false,
        span: table.span.cover(close.span),
    }))
}

fn strip_outer_quotes(text: &str) -> &str {
    text.get(1..text.len().saturating_sub(1)).unwrap_or("")
}

/// Strip one more pair of quotes; `'"r"'` is the quoted literal `r`.
fn split_quotes(text: &str) -> (&str, bool) {
    if text.len() > 2
        && ((text.starts_with('\'') && text.ends_with('\''))
            || (text.starts_with('"') && text.ends_with('"')))
    {
        (&text[1..text.len() - 1], true)
    } else {
        (text, false)
    }
}
