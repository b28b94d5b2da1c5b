//! Annotation lookups: type declarations, annotated variables, aliases and
//! `for` loop element types.

use rustc_hash::FxHashSet;
use smol_str::SmolStr;

use super::{Resolver, Symbol};
use crate::annotation::{
    AliasInfo, ClassInfo, CreateTypeEntry, Type, array_element, first_normal_name,
    table_key_value,
};
use crate::base::{FilePath, VarId};
use crate::semantic::file_result::FileResult;
use crate::semantic::var_info::{ForKind, VarInfo};

/// Where a class or alias is declared.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeDecl {
    pub file: FilePath,
    pub entry: CreateTypeEntry,
}

/// Annotation attached to a variable declaration.
pub(super) struct VarAnnotation {
    pub ty: Type,
    pub comment: Option<String>,
}

const ALIAS_HOPS: usize = 16;

impl<'a> Resolver<'a> {
    /// Same-file declaration first (nearest above `line`, else below), then
    /// the first one in the workspace type map.
    pub(super) fn find_type(&self, file: &str, name: &str, line: usize) -> Option<TypeDecl> {
        if let Some(result) = self.file(file) {
            if let Some(entry) = result.annotate.best_create_type(name, line) {
                return Some(TypeDecl {
                    file: result.path.clone(),
                    entry: *entry,
                });
            }
        }
        self.index.type_entries(name).first().map(|e| TypeDecl {
            file: e.file.clone(),
            entry: e.entry,
        })
    }

    pub(super) fn class_of(&self, decl: &TypeDecl) -> Option<&'a ClassInfo> {
        self.file(&decl.file)?.annotate.class(&decl.entry)
    }

    pub(super) fn alias_of(&self, decl: &TypeDecl) -> Option<&'a AliasInfo> {
        self.file(&decl.file)?.annotate.alias(&decl.entry)
    }

    /// The type an alias named by `ty` stands for.
    fn alias_target(&self, ty: &Type, file: &str) -> Option<(Type, FilePath)> {
        let name = first_normal_name(ty)?;
        let decl = self.find_type(file, name, ty.span().start.line)?;
        let alias = self.alias_of(&decl)?;
        Some((alias.stmt.ty.clone()?, decl.file))
    }

    /// Apply `f` to `ty`, then to whatever aliases it names, until one answers.
    pub(super) fn through_aliases<T>(
        &self,
        ty: &Type,
        file: &FilePath,
        f: impl Fn(&Type) -> Option<T>,
    ) -> Option<(T, FilePath)> {
        let mut current = (ty.clone(), file.clone());
        let mut seen: FxHashSet<SmolStr> = FxHashSet::default();
        for _ in 0..ALIAS_HOPS {
            if let Some(found) = f(&current.0) {
                return Some((found, current.1));
            }
            let name = first_normal_name(&current.0)?.clone();
            if !seen.insert(name) {
                return None;
            }
            current = self.alias_target(&current.0, &current.1)?;
        }
        None
    }

    /// `@param`, `@type` or `@class` annotation of a declaration.
    pub(super) fn var_annotation(&self, file: &FileResult, id: VarId) -> Option<VarAnnotation> {
        let info = file.var(id);
        if info.is_param {
            let scope = file.scope(info.scope);
            let func = file.func(scope.func);
            let fragment = file.annotate.fragment_above(func.span.start.line)?;
            let param = fragment.param(&info.name)?;
            return Some(VarAnnotation {
                ty: param.ty.clone(),
                comment: non_empty(&param.comment),
            });
        }

        let fragment = file.annotate.fragment_above(info.span.start.line)?;
        if let Some(slot) = fragment.types.get(info.index) {
            return Some(VarAnnotation {
                ty: slot.ty.clone(),
                comment: non_empty(&slot.comment),
            });
        }
        if let Some(class) = fragment.classes.iter().find(|c| c.related_var == Some(id)) {
            return Some(VarAnnotation {
                ty: Type::normal(class.name().clone(), class.stmt.span),
                comment: non_empty(&class.stmt.comment),
            });
        }
        fragment
            .aliases
            .iter()
            .find(|a| a.related_var == Some(id))
            .map(|alias| VarAnnotation {
                ty: Type::normal(alias.stmt.name.clone(), alias.stmt.span),
                comment: non_empty(&alias.stmt.comment),
            })
    }

    /// Element type of a `for k, v in ipairs(t)` / `pairs(t)` variable.
    pub(super) fn for_var_type(&mut self, file: &'a FileResult, info: &VarInfo) -> Option<Symbol> {
        let iter = info.for_iter.as_ref()?;
        let source = self.nested(|r| r.expr_symbol(file, &iter.expr, 0))?;
        let ty = source.ty.as_ref()?;
        let ty_file = source.ty_file.clone().unwrap_or_else(|| file.path.clone());

        let (found, found_file) = match (iter.kind, info.index) {
            (ForKind::Ipairs, 0) => (Type::normal("integer", info.span), file.path.clone()),
            (ForKind::Ipairs, _) => {
                self.through_aliases(ty, &ty_file, |t| array_element(t).cloned())?
            }
            (ForKind::Pairs, index) => self.through_aliases(ty, &ty_file, |t| {
                if let Some((key, value)) = table_key_value(t) {
                    return Some(if index == 0 { key.clone() } else { value.clone() });
                }
                array_element(t).map(|element| {
                    if index == 0 {
                        Type::normal("integer", element.span())
                    } else {
                        element.clone()
                    }
                })
            })?,
        };
        Some(Symbol::annotated(info.name.clone(), found, found_file))
    }
}

fn non_empty(comment: &str) -> Option<String> {
    let trimmed = comment.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}
