//! Member lookup on a resolved symbol.
//!
//! Order: annotated class field (parents depth-first, aliases followed),
//! array or table element type, concrete sub-member of the variable (its
//! overlays and setmetatable prototypes included), then whatever the
//! variable was assigned from, which covers import edges.

use indexmap::IndexMap;
use rustc_hash::FxHashSet;
use smol_str::SmolStr;

use super::{Resolver, Symbol};
use crate::annotation::{ClassInfo, Type, array_element, is_default_type, normal_names, table_key_value};
use crate::base::FilePath;
use crate::semantic::var_info::VarRef;

const ALL_MEMBERS: &str = "*";

impl<'a> Resolver<'a> {
    pub(super) fn member_symbol(&mut self, owner: &Symbol, name: &str) -> Option<Symbol> {
        if let (Some(ty), Some(ty_file)) = (&owner.ty, &owner.ty_file) {
            let mut seen = FxHashSet::default();
            if let Some(found) = self.type_member(ty, ty_file, name, &mut seen) {
                return Some(found);
            }
        }
        if let Some(module) = &owner.module {
            let target = self.file(module)?;
            if let Some(id) = target.best_global(name) {
                return self.var_symbol(&VarRef::new(target.path.clone(), id));
            }
        }
        if let Some(var) = &owner.var {
            if let Some(found) = self.var_member(var, name) {
                return Some(found);
            }
        }
        owner
            .merged
            .iter()
            .find_map(|var| self.var_member(var, name))
    }

    /// Field of a class named by `ty`, else its element type.
    fn type_member(
        &mut self,
        ty: &Type,
        ty_file: &FilePath,
        name: &str,
        seen: &mut FxHashSet<SmolStr>,
    ) -> Option<Symbol> {
        let line = ty.span().start.line;
        for type_name in normal_names(ty) {
            if is_default_type(&type_name) || !seen.insert(type_name.clone()) {
                continue;
            }
            let Some(decl) = self.find_type(ty_file, &type_name, line) else {
                continue;
            };
            if let Some(class) = self.class_of(&decl) {
                if let Some(found) = self.class_member(class, &decl.file, name, seen) {
                    return Some(found);
                }
            } else if let Some(alias_ty) = self.alias_of(&decl).and_then(|a| a.stmt.ty.clone()) {
                if let Some(found) = self.type_member(&alias_ty, &decl.file, name, seen) {
                    return Some(found);
                }
            }
        }

        let (element, file) = self.through_aliases(ty, ty_file, |t| {
            array_element(t)
                .cloned()
                .or_else(|| table_key_value(t).map(|(_, value)| value.clone()))
        })?;
        Some(Symbol::annotated(name, element, file))
    }

    fn class_member(
        &mut self,
        class: &'a ClassInfo,
        class_file: &FilePath,
        name: &str,
        seen: &mut FxHashSet<SmolStr>,
    ) -> Option<Symbol> {
        if let Some(field) = class.fields.get(name) {
            let mut symbol = Symbol::annotated(name, field.ty.clone(), class_file.clone());
            symbol.owner_class = Some(class.name().clone());
            symbol.decl = Some((class_file.clone(), field.span));
            symbol.comment = Some(field.comment.clone()).filter(|c| !c.is_empty());
            return Some(symbol);
        }
        if let Some(id) = class.related_var {
            let var = VarRef::new(class_file.clone(), id);
            if let Some(mut found) = self.var_member(&var, name) {
                found.owner_class.get_or_insert_with(|| class.name().clone());
                return Some(found);
            }
        }
        for (parent, span) in &class.stmt.parents {
            if !seen.insert(parent.clone()) {
                continue;
            }
            let Some(decl) = self.find_type(class_file, parent, span.start.line) else {
                continue;
            };
            let found = match self.class_of(&decl) {
                Some(parent_class) => self.class_member(parent_class, &decl.file, name, seen),
                None => self
                    .alias_of(&decl)
                    .and_then(|a| a.stmt.ty.clone())
                    .and_then(|ty| self.type_member(&ty, &decl.file, name, seen)),
            };
            if found.is_some() {
                return found;
            }
        }
        None
    }

    /// Concrete member of a variable.
    fn var_member(&mut self, var: &VarRef, name: &str) -> Option<Symbol> {
        if !self
            .visited_members
            .insert((var.clone(), SmolStr::new(name)))
        {
            return None;
        }
        let file = self.file(&var.file)?;
        let info = file.vars.get(var.id.index())?;

        if let Some(id) = info.sub_members.get(name) {
            return self.var_symbol(&VarRef::new(file.path.clone(), *id));
        }
        for overlay in self.index.overlays(&var.file, var) {
            let Some(other) = self.file(&overlay.file) else {
                continue;
            };
            if let Some(id) = other.var(overlay.id).sub_members.get(name) {
                return self.var_symbol(&VarRef::new(other.path.clone(), *id));
            }
        }

        if info.anonymous {
            return None;
        }
        let refer = info.refer_expr.as_ref()?;
        let ret_index = info.ret_index;
        let value = self.nested(|r| r.expr_symbol(file, refer, ret_index))?;
        self.nested(|r| r.member_symbol(&value, name))
    }

    // ========================================================================
    // Completion
    // ========================================================================

    pub(super) fn collect_members(&mut self, owner: &Symbol, out: &mut IndexMap<SmolStr, Symbol>) {
        if let (Some(ty), Some(ty_file)) = (&owner.ty, &owner.ty_file) {
            let mut seen = FxHashSet::default();
            self.collect_type_members(ty, ty_file, &mut seen, out);
        }
        if let Some(module) = &owner.module {
            if let Some(target) = self.file(module) {
                for name in target.globals.keys() {
                    if out.contains_key(name) {
                        continue;
                    }
                    if let Some(id) = target.best_global(name) {
                        if let Some(symbol) = self.var_symbol(&VarRef::new(target.path.clone(), id)) {
                            out.insert(name.clone(), symbol);
                        }
                    }
                }
            }
        }
        let mut vars: Vec<VarRef> = owner.var.iter().cloned().collect();
        vars.extend(owner.merged.iter().cloned());
        for var in vars {
            self.collect_var_members(&var, out);
        }
    }

    fn collect_type_members(
        &mut self,
        ty: &Type,
        ty_file: &FilePath,
        seen: &mut FxHashSet<SmolStr>,
        out: &mut IndexMap<SmolStr, Symbol>,
    ) {
        let line = ty.span().start.line;
        for type_name in normal_names(ty) {
            if is_default_type(&type_name) || !seen.insert(type_name.clone()) {
                continue;
            }
            let Some(decl) = self.find_type(ty_file, &type_name, line) else {
                continue;
            };
            if let Some(class) = self.class_of(&decl) {
                self.collect_class_members(class, &decl.file, seen, out);
            } else if let Some(alias_ty) = self.alias_of(&decl).and_then(|a| a.stmt.ty.clone()) {
                self.collect_type_members(&alias_ty, &decl.file, seen, out);
            }
        }
    }

    fn collect_class_members(
        &mut self,
        class: &'a ClassInfo,
        class_file: &FilePath,
        seen: &mut FxHashSet<SmolStr>,
        out: &mut IndexMap<SmolStr, Symbol>,
    ) {
        for (name, field) in &class.fields {
            if out.contains_key(name) {
                continue;
            }
            let mut symbol = Symbol::annotated(name.clone(), field.ty.clone(), class_file.clone());
            symbol.owner_class = Some(class.name().clone());
            symbol.decl = Some((class_file.clone(), field.span));
            symbol.comment = Some(field.comment.clone()).filter(|c| !c.is_empty());
            out.insert(name.clone(), symbol);
        }
        if let Some(id) = class.related_var {
            self.collect_var_members(&VarRef::new(class_file.clone(), id), out);
        }
        for (parent, span) in &class.stmt.parents {
            if !seen.insert(parent.clone()) {
                continue;
            }
            let Some(decl) = self.find_type(class_file, parent, span.start.line) else {
                continue;
            };
            if let Some(parent_class) = self.class_of(&decl) {
                self.collect_class_members(parent_class, &decl.file, seen, out);
            }
        }
    }

    fn collect_var_members(&mut self, var: &VarRef, out: &mut IndexMap<SmolStr, Symbol>) {
        if !self
            .visited_members
            .insert((var.clone(), SmolStr::new_static(ALL_MEMBERS)))
        {
            return;
        }
        let Some(file) = self.file(&var.file) else {
            return;
        };
        let Some(info) = file.vars.get(var.id.index()) else {
            return;
        };

        let mut members: Vec<(SmolStr, VarRef)> = info
            .sub_members
            .iter()
            .map(|(name, id)| (name.clone(), VarRef::new(file.path.clone(), *id)))
            .collect();
        for overlay in self.index.overlays(&var.file, var) {
            if let Some(other) = self.file(&overlay.file) {
                members.extend(
                    other
                        .var(overlay.id)
                        .sub_members
                        .iter()
                        .map(|(name, id)| (name.clone(), VarRef::new(other.path.clone(), *id))),
                );
            }
        }
        for (name, member) in members {
            if out.contains_key(&name) {
                continue;
            }
            if let Some(symbol) = self.var_symbol(&member) {
                out.insert(name, symbol);
            }
        }

        if info.anonymous {
            return;
        }
        if let Some(refer) = &info.refer_expr {
            if let Some(value) = self.nested(|r| r.expr_symbol(file, refer, info.ret_index)) {
                self.collect_members(&value, out);
            }
        }
    }
}
