//! Annotation statements and the recursive [`Type`] value.

use smol_str::SmolStr;

use crate::base::Span;

// ============================================================================
// TYPES
// ============================================================================

/// A type expression from a doc comment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Type {
    /// A named type: `number`, `MyClass`, `...`
    Normal(NormalType),
    /// `A | B | C`, never nested and always holding two or more alternatives.
    Multi(MultiType),
    /// `T[]`
    Array(ArrayType),
    /// `table` or `table<K, V>`
    Table(TableType),
    /// `fun<T>(a: A, b?: B): R`
    Func(FuncType),
    /// A literal such as `'left'` or `"right"`
    Const(ConstType),
    NotValid(Span),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalType {
    pub name: SmolStr,
    pub span: Span,
    /// Typed by the user (as opposed to a defaulted parameter type); colored by the editor.
    pub colored: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MultiType {
    pub types: Vec<Type>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArrayType {
    pub element: Box<Type>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableType {
    pub key: Option<Box<Type>>,
    pub value: Option<Box<Type>>,
    /// Written as bare `table`.
    pub empty: bool,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FuncParam {
    pub name: SmolStr,
    pub span: Span,
    pub optional: bool,
    pub ty: Type,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FuncType {
    pub generics: Vec<(SmolStr, Span)>,
    pub params: Vec<FuncParam>,
    pub returns: Vec<Type>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConstType {
    pub literal: SmolStr,
    /// The literal was written as a quoted string.
    pub quoted: bool,
    /// Trailing `# comment` on an alias continuation line.
    pub comment: String,
    pub span: Span,
}

impl Type {
    pub fn normal(name: impl Into<SmolStr>, span: Span) -> Self {
        Type::Normal(NormalType {
            name: name.into(),
            span,
            colored: true,
        })
    }

    pub fn span(&self) -> Span {
        match self {
            Type::Normal(t) => t.span,
            Type::Multi(t) => t.span,
            Type::Array(t) => t.span,
            Type::Table(t) => t.span,
            Type::Func(t) => t.span,
            Type::Const(t) => t.span,
            Type::NotValid(span) => *span,
        }
    }

    pub fn as_func(&self) -> Option<&FuncType> {
        match self {
            Type::Func(func) => Some(func),
            _ => None,
        }
    }

    /// Join alternatives into a union, flattening nested unions. A single
    /// alternative is returned unchanged.
    pub fn union(types: Vec<Type>) -> Type {
        let mut flat = Vec::with_capacity(types.len());
        for ty in types {
            match ty {
                Type::Multi(multi) => flat.extend(multi.types),
                other => flat.push(other),
            }
        }
        if flat.len() == 1 {
            if let Some(single) = flat.pop() {
                return single;
            }
        }
        let span = match (flat.first(), flat.last()) {
            (Some(first), Some(last)) => first.span().cover(last.span()),
            _ => Span::default(),
        };
        Type::Multi(MultiType { types: flat, span })
    }
}

// ============================================================================
// STATEMENTS
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Visibility {
    #[default]
    Public,
    Protected,
    Private,
}

/// How a field is meant to be called.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FieldColon {
    #[default]
    Plain,
    /// `@field name: fun()` marks a method called with `:`.
    Colon,
    /// A `fun(self: Owner, ...)` field: callable with `:` and `self` is hidden.
    HiddenSelf,
}

/// `@type A, B`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeStatement {
    pub types: Vec<Type>,
    pub consts: Vec<bool>,
    pub enums: Vec<bool>,
    pub comment: String,
}

/// `@alias Name Type`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AliasStatement {
    pub name: SmolStr,
    pub span: Span,
    /// `None` until continuation lines supply literal alternatives.
    pub ty: Option<Type>,
    pub comment: String,
}

/// `@class Name : Parent1, Parent2`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassStatement {
    pub name: SmolStr,
    pub span: Span,
    pub parents: Vec<(SmolStr, Span)>,
    pub comment: String,
}

/// `@field [visibility] name[:] Type`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldStatement {
    pub visibility: Visibility,
    pub name: SmolStr,
    pub span: Span,
    pub colon: bool,
    pub ty: Type,
    pub comment: String,
}

impl FieldStatement {
    /// Call style of this field on an instance of `owner`.
    pub fn colon_kind(&self, owner: &str) -> FieldColon {
        if self.colon {
            return FieldColon::Colon;
        }
        if let Type::Func(func) = &self.ty {
            if let Some(first) = func.params.first() {
                if first.name == "self" {
                    if let Type::Normal(normal) = &first.ty {
                        if normal.name == owner {
                            return FieldColon::HiddenSelf;
                        }
                    }
                }
            }
        }
        FieldColon::Plain
    }
}

/// `@param [const] name[?] Type`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParamStatement {
    pub name: SmolStr,
    pub span: Span,
    pub is_const: bool,
    pub optional: bool,
    pub ty: Type,
    pub comment: String,
}

/// `@return A[?], B`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReturnStatement {
    pub types: Vec<Type>,
    pub optionals: Vec<bool>,
    pub comment: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenericParam {
    pub name: SmolStr,
    pub span: Span,
    pub parent: Option<(SmolStr, Span)>,
}

/// `@generic T [: Parent], K`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenericStatement {
    pub params: Vec<GenericParam>,
    pub comment: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnumMarker {
    Start,
    End,
}

/// One parsed annotation line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnnotateStatement {
    Type(TypeStatement),
    Alias(AliasStatement),
    Class(ClassStatement),
    Field(FieldStatement),
    Param(ParamStatement),
    Return(ReturnStatement),
    Generic(GenericStatement),
    Vararg { ty: Type, comment: String },
    Overload { ty: Type, comment: String },
    Enum { marker: EnumMarker, span: Span },
    NotValid(Span),
}

impl AnnotateStatement {
    /// Every type written in the statement, in source order.
    pub fn types(&self) -> Vec<&Type> {
        match self {
            AnnotateStatement::Type(stmt) => stmt.types.iter().collect(),
            AnnotateStatement::Alias(stmt) => stmt.ty.iter().collect(),
            AnnotateStatement::Field(stmt) => vec![&stmt.ty],
            AnnotateStatement::Param(stmt) => vec![&stmt.ty],
            AnnotateStatement::Return(stmt) => stmt.types.iter().collect(),
            AnnotateStatement::Vararg { ty, .. } | AnnotateStatement::Overload { ty, .. } => {
                vec![ty]
            }
            AnnotateStatement::Class(_)
            | AnnotateStatement::Generic(_)
            | AnnotateStatement::Enum { .. }
            | AnnotateStatement::NotValid(_) => Vec::new(),
        }
    }
}

/// A statement with the source line it was written on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnnotateLine {
    pub line: usize,
    pub stmt: AnnotateStatement,
}

/// One comment block worth of annotation statements, in line order.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Fragment {
    pub lines: Vec<AnnotateLine>,
}

impl Fragment {
    pub fn statements(&self) -> impl Iterator<Item = &AnnotateStatement> {
        self.lines.iter().map(|l| &l.stmt)
    }

    /// The statement written on `line`, if any.
    pub fn statement_at(&self, line: usize) -> Option<&AnnotateStatement> {
        self.lines.iter().find(|l| l.line == line).map(|l| &l.stmt)
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn n(name: &str, col: usize) -> Type {
        Type::normal(name, Span::on_line(0, col, col + name.len()))
    }

    #[test]
    fn test_union_flattens_nested() {
        let inner = Type::union(vec![n("a", 0), n("b", 2)]);
        let outer = Type::union(vec![inner, n("c", 4)]);
        match outer {
            Type::Multi(multi) => {
                assert_eq!(multi.types.len(), 3);
                assert_eq!(multi.span, Span::on_line(0, 0, 5));
            }
            other => panic!("expected union, got {other:?}"),
        }
    }

    #[test]
    fn test_union_of_one_is_identity() {
        assert_eq!(Type::union(vec![n("a", 0)]), n("a", 0));
    }

    #[test]
    fn test_hidden_self_field() {
        let func = Type::Func(FuncType {
            generics: Vec::new(),
            params: vec![FuncParam {
                name: "self".into(),
                span: Span::default(),
                optional: false,
                ty: n("Foo", 0),
            }],
            returns: Vec::new(),
            span: Span::default(),
        });
        let field = FieldStatement {
            visibility: Visibility::Public,
            name: "run".into(),
            span: Span::default(),
            colon: false,
            ty: func,
            comment: String::new(),
        };
        assert_eq!(field.colon_kind("Foo"), FieldColon::HiddenSelf);
        assert_eq!(field.colon_kind("Bar"), FieldColon::Plain);
    }
}
