use rustc_hash::FxHashMap;
use smol_str::SmolStr;

use crate::base::{FuncId, Position, ScopeId, Span, VarId};

/// A lexical block with the locals declared directly in it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScopeInfo {
    pub span: Span,
    pub parent: Option<ScopeId>,
    pub children: Vec<ScopeId>,
    /// Every local of a name in declaration order; shadowing re-declarations append.
    pub locals: FxHashMap<SmolStr, Vec<VarId>>,
    pub func: FuncId,
    pub level: usize,
}

impl ScopeInfo {
    pub fn new(span: Span, parent: Option<ScopeId>, func: FuncId, level: usize) -> Self {
        Self {
            span,
            parent,
            children: Vec::new(),
            locals: FxHashMap::default(),
            func,
            level,
        }
    }

    pub fn contains(&self, position: Position) -> bool {
        self.parent.is_none() || self.span.contains(position)
    }
}
