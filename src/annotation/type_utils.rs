//! Structural queries over [`Type`].
//!
//! Every function here is total: an unexpected shape yields an empty result.

use std::fmt;

use smol_str::SmolStr;

use super::ast::{AnnotateStatement, FuncType, Type};
use crate::base::Span;

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Type::Normal(normal) => f.write_str(&normal.name),
            Type::Multi(multi) => {
                let mut first = true;
                for ty in &multi.types {
                    let text = ty.to_string();
                    if text.is_empty() {
                        continue;
                    }
                    if !first {
                        f.write_str(" | ")?;
                    }
                    first = false;
                    f.write_str(&text)?;
                }
                Ok(())
            }
            Type::Array(array) => match array.element.as_ref() {
                Type::Multi(_) | Type::Func(_) => write!(f, "({})[]", array.element),
                element => write!(f, "{element}[]"),
            },
            Type::Table(table) => match (&table.key, &table.value) {
                (Some(key), Some(value)) if !table.empty => write!(f, "table<{key}, {value}>"),
                _ => f.write_str("table"),
            },
            Type::Func(func) => {
                f.write_str("function(")?;
                for (index, param) in func.params.iter().enumerate() {
                    if index > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}: {}", param.name, param.ty)?;
                }
                f.write_str(")")?;
                write_returns(f, &func.returns, ": ")
            }
            Type::Const(c) if c.quoted => write!(f, "\"{}\"", c.literal),
            Type::Const(c) => f.write_str(&c.literal),
            Type::NotValid(_) => Ok(()),
        }
    }
}

fn write_returns(f: &mut fmt::Formatter<'_>, returns: &[Type], lead: &str) -> fmt::Result {
    for (index, ret) in returns.iter().enumerate() {
        f.write_str(if index == 0 { lead } else { ", " })?;
        write!(f, "{ret}")?;
    }
    Ok(())
}

/// How to print the first parameter of a method-like function type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelfParam {
    Keep,
    /// Called with `:`, the first parameter is implied.
    Drop,
    /// Declared as a colon field; print an explicit `self`.
    Add,
}

/// Signature text used by hover and completion details.
pub fn func_signature(func: &FuncType, self_param: SelfParam) -> String {
    let mut parts: Vec<String> = Vec::new();
    if self_param == SelfParam::Add {
        parts.push("self".to_string());
    }
    for (index, param) in func.params.iter().enumerate() {
        if self_param == SelfParam::Drop && index == 0 {
            continue;
        }
        parts.push(format!("{} : {}", param.name, param.ty));
    }
    let mut out = format!("function({})", parts.join(", "));
    for (index, ret) in func.returns.iter().enumerate() {
        out.push_str(if index == 0 { " : " } else { ", " });
        out.push_str(&ret.to_string());
    }
    out
}

/// The first plain name of a type: `Foo` for `Foo` or `Foo|nil`.
pub fn first_normal_name(ty: &Type) -> Option<&SmolStr> {
    match ty {
        Type::Normal(normal) => Some(&normal.name),
        Type::Multi(multi) => multi.types.first().and_then(first_normal_name),
        _ => None,
    }
}

/// Leaf names of a type in left-to-right order, used to look up declared
/// classes. Tables and functions contribute `table` and `function`; arrays
/// and literals contribute nothing.
pub fn normal_names(ty: &Type) -> Vec<SmolStr> {
    let mut out = Vec::new();
    collect_normal_names(ty, &mut out);
    out
}

fn collect_normal_names(ty: &Type, out: &mut Vec<SmolStr>) {
    match ty {
        Type::Normal(normal) => out.push(normal.name.clone()),
        Type::Multi(multi) => multi.types.iter().for_each(|t| collect_normal_names(t, out)),
        Type::Table(_) => out.push(SmolStr::new_static("table")),
        Type::Func(_) => out.push(SmolStr::new_static("function")),
        Type::Array(_) | Type::Const(_) | Type::NotValid(_) => {}
    }
}

/// First function type among the alternatives.
pub fn first_func(ty: &Type) -> Option<&FuncType> {
    match ty {
        Type::Func(func) => Some(func),
        Type::Multi(multi) => multi.types.iter().find_map(first_func),
        _ => None,
    }
}

/// Element type of the first array alternative.
pub fn array_element(ty: &Type) -> Option<&Type> {
    match ty {
        Type::Array(array) => Some(&array.element),
        Type::Multi(multi) => multi.types.iter().find_map(array_element),
        _ => None,
    }
}

/// Key and value types of the first non-empty `table<K, V>` alternative.
pub fn table_key_value(ty: &Type) -> Option<(&Type, &Type)> {
    match ty {
        Type::Table(table) => match (&table.key, &table.value) {
            (Some(key), Some(value)) => Some((key.as_ref(), value.as_ref())),
            _ => None,
        },
        Type::Multi(multi) => multi.types.iter().find_map(table_key_value),
        _ => None,
    }
}

/// Spans of user-written type names, for syntax coloring.
pub fn colored_spans(ty: &Type) -> Vec<Span> {
    let mut out = Vec::new();
    visit_names(ty, &mut |name, span, colored| {
        if colored && name != "..." {
            out.push(span);
        }
    });
    out
}

/// Every type name with its span, including those nested in arrays, tables
/// and function signatures.
pub fn names_with_spans(ty: &Type) -> Vec<(SmolStr, Span)> {
    let mut out = Vec::new();
    visit_names(ty, &mut |name, span, _| out.push((name.clone(), span)));
    out
}

fn visit_names(ty: &Type, f: &mut dyn FnMut(&SmolStr, Span, bool)) {
    match ty {
        Type::Normal(normal) => f(&normal.name, normal.span, normal.colored),
        Type::Multi(multi) => multi.types.iter().for_each(|t| visit_names(t, f)),
        Type::Array(array) => visit_names(&array.element, f),
        Type::Table(table) => {
            if let Some(key) = &table.key {
                visit_names(key, f);
            }
            if let Some(value) = &table.value {
                visit_names(value, f);
            }
        }
        Type::Func(func) => {
            func.params.iter().for_each(|p| visit_names(&p.ty, f));
            func.returns.iter().for_each(|r| visit_names(r, f));
        }
        Type::Const(_) | Type::NotValid(_) => {}
    }
}

/// What sits under a column inside an annotation line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnnotateHit {
    /// A type name that can be looked up.
    TypeName(SmolStr, Span),
    /// A name being declared, with a short notice (`class name`, `param name`...)
    /// and the statement's comment.
    Declared {
        notice: &'static str,
        span: Span,
        comment: String,
    },
}

/// Most specific node of `ty` whose span contains `col`.
pub fn type_at(ty: &Type, col: usize) -> Option<AnnotateHit> {
    match ty {
        Type::Normal(normal) if contains(normal.span, col) => {
            Some(AnnotateHit::TypeName(normal.name.clone(), normal.span))
        }
        Type::Normal(_) | Type::Const(_) | Type::NotValid(_) => None,
        Type::Multi(multi) => multi.types.iter().find_map(|t| type_at(t, col)),
        Type::Array(array) => type_at(&array.element, col),
        Type::Table(table) => table
            .key
            .as_deref()
            .and_then(|k| type_at(k, col))
            .or_else(|| table.value.as_deref().and_then(|v| type_at(v, col))),
        Type::Func(func) => {
            if let Some(param) = func.params.iter().find(|p| contains(p.span, col)) {
                return Some(AnnotateHit::Declared {
                    notice: "function param",
                    span: param.span,
                    comment: String::new(),
                });
            }
            func.params
                .iter()
                .find_map(|p| type_at(&p.ty, col))
                .or_else(|| func.returns.iter().find_map(|r| type_at(r, col)))
        }
    }
}

/// Like [`type_at`], for a whole statement: declared names first, then types.
pub fn statement_at(stmt: &AnnotateStatement, col: usize) -> Option<AnnotateHit> {
    let declared = |notice, span, comment: &str| {
        contains(span, col).then(|| AnnotateHit::Declared {
            notice,
            span,
            comment: comment.to_string(),
        })
    };
    let parent_at = |parents: &[(SmolStr, Span)]| {
        parents
            .iter()
            .find(|(_, span)| contains(*span, col))
            .map(|(name, span)| AnnotateHit::TypeName(name.clone(), *span))
    };

    match stmt {
        AnnotateStatement::Alias(alias) => declared("alias name", alias.span, &alias.comment)
            .or_else(|| alias.ty.as_ref().and_then(|t| type_at(t, col))),
        AnnotateStatement::Class(class) => {
            declared("class name", class.span, &class.comment).or_else(|| parent_at(&class.parents))
        }
        AnnotateStatement::Field(field) => {
            declared("field name", field.span, &field.comment).or_else(|| type_at(&field.ty, col))
        }
        AnnotateStatement::Param(param) => {
            declared("param name", param.span, &param.comment).or_else(|| type_at(&param.ty, col))
        }
        AnnotateStatement::Generic(generic) => generic.params.iter().find_map(|p| {
            declared("generic name", p.span, &generic.comment).or_else(|| {
                p.parent
                    .as_ref()
                    .filter(|(_, span)| contains(*span, col))
                    .map(|(name, span)| AnnotateHit::TypeName(name.clone(), *span))
            })
        }),
        AnnotateStatement::Type(_)
        | AnnotateStatement::Return(_)
        | AnnotateStatement::Vararg { .. }
        | AnnotateStatement::Overload { .. } => {
            stmt.types().into_iter().find_map(|t| type_at(t, col))
        }
        AnnotateStatement::Enum { .. } | AnnotateStatement::NotValid(_) => None,
    }
}

fn contains(span: Span, col: usize) -> bool {
    span.start.column <= col && col <= span.end.column
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::annotation::parser::parse_fragment;
    use crate::syntax::{group_comments, tokenize};
    use rstest::rstest;

    fn stmt(src: &str) -> AnnotateStatement {
        let blocks = group_comments(tokenize(src).comments);
        let (fragment, errors) = parse_fragment(&blocks[0]);
        assert!(errors.is_empty(), "{errors:?}");
        fragment.lines[0].stmt.clone()
    }

    fn ty(src: &str) -> Type {
        stmt(&format!("---@type {src}")).types()[0].clone()
    }

    #[rstest]
    #[case("number", "number")]
    #[case("string|number[]", "string | number[]")]
    #[case("table<string,  Foo>", "table<string, Foo>")]
    #[case("table", "table")]
    #[case("fun(a:number, b):string, nil", "function(a: number, b: any): string, nil")]
    #[case("'\"r\"' | 'w'", "\"r\" | w")]
    fn test_display(#[case] src: &str, #[case] expected: &str) {
        assert_eq!(ty(src).to_string(), expected);
    }

    #[rstest]
    #[case("(string|number)[]", "(string | number)[]")]
    #[case("string|number[]", "string | number[]")]
    #[case("((A|B)[])[]", "(A | B)[][]")]
    #[case("table<string, (Foo|nil)[]>", "table<string, (Foo | nil)[]>")]
    #[case("(fun(): string)[]", "(function(): string)[]")]
    fn test_display_keeps_array_grouping(#[case] src: &str, #[case] expected: &str) {
        assert_eq!(ty(src).to_string(), expected);
    }

    #[rstest]
    #[case("(string|number)[]")]
    #[case("Foo | Bar[] | nil")]
    #[case("string[][]")]
    #[case("table<string, (A|B)[]>[]")]
    fn test_printed_type_parses_back(#[case] src: &str) {
        let first = ty(src);
        let printed = first.to_string();
        let again = ty(&printed);
        assert_eq!(again.to_string(), printed);
        assert_eq!(std::mem::discriminant(&again), std::mem::discriminant(&first));
        assert_eq!(normal_names(&again), normal_names(&first));
    }

    #[test]
    fn test_func_signature_self_modes() {
        let t = ty("fun(self: A, x: number): A");
        let func = t.as_func().expect("func");
        assert_eq!(func_signature(func, SelfParam::Drop), "function(x : number) : A");
        assert_eq!(
            func_signature(func, SelfParam::Add),
            "function(self, self : A, x : number) : A"
        );
    }

    #[test]
    fn test_normal_names_order() {
        let names = normal_names(&ty("a | (b | c) | fun() | table | d[]"));
        assert_eq!(names, vec!["a", "b", "c", "function", "table"]);
        assert_eq!(first_normal_name(&ty("Foo|nil")).map(|s| s.as_str()), Some("Foo"));
    }

    #[test]
    fn test_array_and_table_parts() {
        let t = ty("nil | Item[]");
        assert!(matches!(array_element(&t), Some(Type::Normal(n)) if n.name == "Item"));
        let t = ty("table<string, Item>");
        let (k, v) = table_key_value(&t).expect("table");
        assert_eq!(k.to_string(), "string");
        assert_eq!(v.to_string(), "Item");
        assert!(table_key_value(&ty("table")).is_none());
    }

    #[test]
    fn test_type_at_column() {
        // ---@type fun(a: Foo): Bar
        // 0123456789012345678901234
        let t = ty("fun(a: Foo): Bar");
        assert_eq!(
            type_at(&t, 17),
            Some(AnnotateHit::TypeName("Foo".into(), Span::on_line(0, 16, 19)))
        );
        assert!(matches!(
            type_at(&t, 13),
            Some(AnnotateHit::Declared { notice: "function param", .. })
        ));
        assert!(matches!(type_at(&t, 23), Some(AnnotateHit::TypeName(n, _)) if n == "Bar"));
    }

    #[test]
    fn test_statement_at_class() {
        let s = stmt("---@class B : A @doc");
        assert!(matches!(
            statement_at(&s, 10),
            Some(AnnotateHit::Declared { notice: "class name", ref comment, .. }) if comment == "doc"
        ));
        assert!(matches!(statement_at(&s, 14), Some(AnnotateHit::TypeName(n, _)) if n == "A"));
    }

    #[test]
    fn test_names_with_spans_descends() {
        let names: Vec<_> = names_with_spans(&ty("table<K, fun(x: X): R[]>"))
            .into_iter()
            .map(|(n, _)| n)
            .collect();
        assert_eq!(names, vec!["K", "X", "R"]);
        assert!(colored_spans(&ty("fun(a)")).is_empty());
    }
}
