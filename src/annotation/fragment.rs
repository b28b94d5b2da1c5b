//! Per-file annotation store.
//!
//! [`AnnotateFile`] keeps one [`FragmentInfo`] per head comment block, keyed
//! by the block's last line, and a [`CreateTypeMap`] of the classes and
//! aliases the file declares.

use std::collections::BTreeMap;

use indexmap::IndexMap;
use rustc_hash::FxHashMap;
use smol_str::SmolStr;
use tracing::warn;

use super::ast::*;
use super::error::AnnotateError;
use super::parser::parse_fragment;
use super::type_utils::first_normal_name;
use crate::base::{Span, VarId};
use crate::syntax::CommentBlock;

// ============================================================================
// FRAGMENT INFO
// ============================================================================

/// A `@class` with the `@field`s that follow it in the same block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassInfo {
    pub stmt: ClassStatement,
    pub line: usize,
    pub fields: IndexMap<SmolStr, FieldStatement>,
    /// Variable declared on the line after the block, if the class was attached to one.
    pub related_var: Option<VarId>,
}

impl ClassInfo {
    pub fn name(&self) -> &SmolStr {
        &self.stmt.name
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AliasInfo {
    pub stmt: AliasStatement,
    pub line: usize,
    pub related_var: Option<VarId>,
}

/// One entry of a `@type` list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeSlot {
    pub ty: Type,
    pub comment: String,
    pub is_const: bool,
    pub is_enum: bool,
}

/// One entry of a `@return` list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReturnSlot {
    pub ty: Type,
    pub optional: bool,
    pub comment: String,
}

/// Typed view of one comment block.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FragmentInfo {
    pub first_line: usize,
    pub last_line: usize,
    pub classes: Vec<ClassInfo>,
    pub aliases: Vec<AliasInfo>,
    pub types: Vec<TypeSlot>,
    pub params: Vec<ParamStatement>,
    pub returns: Vec<ReturnSlot>,
    pub generics: Vec<GenericParam>,
    pub overloads: Vec<Type>,
    pub vararg: Option<Type>,
    pub enum_markers: Vec<(EnumMarker, Span)>,
    pub fragment: Fragment,
}

impl FragmentInfo {
    pub fn from_fragment(fragment: Fragment, first_line: usize, last_line: usize) -> Self {
        let mut info = FragmentInfo {
            first_line,
            last_line,
            ..Default::default()
        };

        for line in &fragment.lines {
            match &line.stmt {
                AnnotateStatement::Class(class) => info.classes.push(ClassInfo {
                    stmt: class.clone(),
                    line: line.line,
                    fields: IndexMap::new(),
                    related_var: None,
                }),
                AnnotateStatement::Field(field) => match info.classes.last_mut() {
                    Some(class) => {
                        class.fields.insert(field.name.clone(), field.clone());
                    }
                    None => warn!(line = line.line, field = %field.name, "field without class"),
                },
                AnnotateStatement::Alias(alias) => info.aliases.push(AliasInfo {
                    stmt: alias.clone(),
                    line: line.line,
                    related_var: None,
                }),
                AnnotateStatement::Type(stmt) => {
                    for (index, ty) in stmt.types.iter().enumerate() {
                        info.types.push(TypeSlot {
                            ty: ty.clone(),
                            comment: stmt.comment.clone(),
                            is_const: stmt.consts.get(index).copied().unwrap_or(false),
                            is_enum: stmt.enums.get(index).copied().unwrap_or(false),
                        });
                    }
                }
                AnnotateStatement::Param(param) => info.params.push(param.clone()),
                AnnotateStatement::Return(ret) => {
                    for (index, ty) in ret.types.iter().enumerate() {
                        info.returns.push(ReturnSlot {
                            ty: ty.clone(),
                            optional: ret.optionals.get(index).copied().unwrap_or(false),
                            comment: ret.comment.clone(),
                        });
                    }
                }
                AnnotateStatement::Generic(generic) => {
                    info.generics.extend(generic.params.iter().cloned())
                }
                AnnotateStatement::Overload { ty, .. } => info.overloads.push(ty.clone()),
                AnnotateStatement::Vararg { ty, .. } => info.vararg = Some(ty.clone()),
                AnnotateStatement::Enum { marker, span } => info.enum_markers.push((*marker, *span)),
                AnnotateStatement::NotValid(_) => {}
            }
        }

        info.fragment = fragment;
        info
    }

    pub fn param(&self, name: &str) -> Option<&ParamStatement> {
        self.params.iter().find(|p| p.name == name)
    }

    pub fn is_generic(&self, name: &str) -> bool {
        self.generics.iter().any(|g| g.name == name)
    }

    pub fn contains_line(&self, line: usize) -> bool {
        self.first_line <= line && line <= self.last_line
    }
}

// ============================================================================
// CREATE TYPE MAP
// ============================================================================

/// Where a class or alias is declared inside its fragment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CreateKind {
    Class(usize),
    Alias(usize),
}

/// One declaration of a type name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CreateTypeEntry {
    /// Key of the declaring fragment.
    pub last_line: usize,
    pub kind: CreateKind,
    pub span: Span,
}

/// Type name to every declaration of it in one file, in source order.
pub type CreateTypeMap = FxHashMap<SmolStr, Vec<CreateTypeEntry>>;

/// A variable declaration offered to [`AnnotateFile::relate_variables`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VarSite {
    pub id: VarId,
    pub line: usize,
    pub column: usize,
    /// Position in a multi-assignment: `local a, b = ...` gives 0 and 1.
    pub index: usize,
}

// ============================================================================
// ANNOTATE FILE
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AnnotateFile {
    pub fragments: BTreeMap<usize, FragmentInfo>,
    pub create_types: CreateTypeMap,
    pub errors: Vec<AnnotateError>,
    /// Paired `@enum start` / `@enum end` lines.
    pub enum_ranges: Vec<(usize, usize)>,
}

impl AnnotateFile {
    /// Parse every head comment block of a file.
    pub fn build(blocks: &[CommentBlock]) -> Self {
        let mut file = AnnotateFile::default();
        for block in blocks.iter().filter(|b| b.head) {
            let (fragment, errors) = parse_fragment(block);
            file.errors.extend(errors);
            if fragment.is_empty() {
                continue;
            }
            let info = FragmentInfo::from_fragment(fragment, block.first_line(), block.last_line());
            file.fragments.insert(info.last_line, info);
        }
        file.index_create_types();
        file.pair_enum_markers();
        file
    }

    fn index_create_types(&mut self) {
        for (last_line, info) in &self.fragments {
            for (index, class) in info.classes.iter().enumerate() {
                self.create_types
                    .entry(class.stmt.name.clone())
                    .or_default()
                    .push(CreateTypeEntry {
                        last_line: *last_line,
                        kind: CreateKind::Class(index),
                        span: class.stmt.span,
                    });
            }
            for (index, alias) in info.aliases.iter().enumerate() {
                self.create_types
                    .entry(alias.stmt.name.clone())
                    .or_default()
                    .push(CreateTypeEntry {
                        last_line: *last_line,
                        kind: CreateKind::Alias(index),
                        span: alias.stmt.span,
                    });
            }
        }
    }

    fn pair_enum_markers(&mut self) {
        let mut stack: Vec<usize> = Vec::new();
        for info in self.fragments.values() {
            for (marker, span) in &info.enum_markers {
                match marker {
                    EnumMarker::Start => stack.push(span.start.line),
                    EnumMarker::End => match stack.pop() {
                        Some(start) => self.enum_ranges.push((start, span.start.line)),
                        None => warn!(line = span.start.line, "enum end without start"),
                    },
                }
            }
        }
        for line in stack {
            warn!(line, "enum start without end");
        }
    }

    /// The fragment whose block ends on `last_line`.
    pub fn fragment(&self, last_line: usize) -> Option<&FragmentInfo> {
        self.fragments.get(&last_line)
    }

    /// The fragment directly above a declaration on `line`.
    pub fn fragment_above(&self, line: usize) -> Option<&FragmentInfo> {
        line.checked_sub(1).and_then(|l| self.fragments.get(&l))
    }

    /// The fragment whose comment block covers `line`.
    pub fn fragment_covering(&self, line: usize) -> Option<&FragmentInfo> {
        self.fragments
            .range(line..)
            .next()
            .map(|(_, info)| info)
            .filter(|info| info.contains_line(line))
    }

    pub fn class(&self, entry: &CreateTypeEntry) -> Option<&ClassInfo> {
        match entry.kind {
            CreateKind::Class(index) => self.fragments.get(&entry.last_line)?.classes.get(index),
            CreateKind::Alias(_) => None,
        }
    }

    pub fn alias(&self, entry: &CreateTypeEntry) -> Option<&AliasInfo> {
        match entry.kind {
            CreateKind::Alias(index) => self.fragments.get(&entry.last_line)?.aliases.get(index),
            CreateKind::Class(_) => None,
        }
    }

    /// Nearest declaration of `name` at or above `line`, else the nearest below.
    pub fn best_create_type(&self, name: &str, line: usize) -> Option<&CreateTypeEntry> {
        let entries = self.create_types.get(name)?;
        let above = entries
            .iter()
            .filter(|e| e.last_line <= line)
            .max_by_key(|e| e.last_line);
        above.or_else(|| {
            entries
                .iter()
                .filter(|e| e.last_line > line)
                .min_by_key(|e| e.last_line)
        })
    }

    /// True when any `@type` in the file carries the `enum` modifier.
    pub fn has_enum_type(&self) -> bool {
        self.fragments
            .values()
            .any(|info| info.types.iter().any(|slot| slot.is_enum))
    }

    /// Attach classes and aliases to the variables they annotate.
    ///
    /// The first variable on the line after a block takes the block's first
    /// unrelated class, else its first unrelated alias. Otherwise a `@type Name`
    /// at the variable's assignment index relates the best declaration of
    /// `Name` in this file.
    pub fn relate_variables(&mut self, mut sites: Vec<VarSite>) {
        sites.sort_by_key(|s| (s.line, s.column));

        for site in sites {
            let Some(key) = site.line.checked_sub(1) else {
                continue;
            };
            let Some(info) = self.fragments.get_mut(&key) else {
                continue;
            };

            if let Some(class) = info.classes.iter_mut().find(|c| c.related_var.is_none()) {
                class.related_var = Some(site.id);
                continue;
            }
            if let Some(alias) = info.aliases.iter_mut().find(|a| a.related_var.is_none()) {
                alias.related_var = Some(site.id);
                continue;
            }

            let Some(name) = info
                .types
                .get(site.index)
                .and_then(|slot| first_normal_name(&slot.ty))
                .cloned()
            else {
                continue;
            };
            let Some(entry) = self.best_create_type(&name, site.line).copied() else {
                continue;
            };
            let Some(info) = self.fragments.get_mut(&entry.last_line) else {
                continue;
            };
            let related = match entry.kind {
                CreateKind::Class(index) => info.classes.get_mut(index).map(|c| &mut c.related_var),
                CreateKind::Alias(index) => info.aliases.get_mut(index).map(|a| &mut a.related_var),
            };
            if let Some(slot) = related {
                if slot.is_none() {
                    *slot = Some(site.id);
                }
            }
        }
    }
}
