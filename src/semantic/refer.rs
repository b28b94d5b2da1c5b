//! Cross-file import edges.

use smol_str::SmolStr;

use crate::base::Span;
use crate::syntax::ast::{CallExpr, ExprKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReferKind {
    Require,
    Dofile,
    Loadfile,
    /// A configured framework import function; exposes the target's globals.
    Frame,
}

/// An import/require call and the module string it names.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ReferInfo {
    pub kind: ReferKind,
    pub func_name: SmolStr,
    pub module: SmolStr,
    /// The whole call expression.
    pub span: Span,
}

impl ReferInfo {
    /// Recognise `require("a.b")`, `dofile("x.lua")`, `loadfile(...)` and
    /// frame import calls. The module must be a string literal.
    pub fn from_call(call: &CallExpr, span: Span, frame_funcs: &[SmolStr]) -> Option<Self> {
        let func_name = call.simple_callee()?;
        let kind = match func_name.as_str() {
            "require" => ReferKind::Require,
            "dofile" => ReferKind::Dofile,
            "loadfile" => ReferKind::Loadfile,
            name if frame_funcs.iter().any(|f| f == name) => ReferKind::Frame,
            _ => return None,
        };
        let module = match &call.args.first()?.kind {
            ExprKind::String(module) => module.clone(),
            _ => return None,
        };
        Some(Self {
            kind,
            func_name: func_name.clone(),
            module,
            span,
        })
    }

    /// Workspace-relative paths the module may live at, most specific first.
    pub fn candidate_paths(&self) -> Vec<String> {
        match self.kind {
            ReferKind::Require | ReferKind::Frame => {
                let base = self
                    .module
                    .trim_end_matches(".lua")
                    .replace('.', "/")
                    .replace('\\', "/");
                vec![format!("{base}.lua"), format!("{base}/init.lua")]
            }
            ReferKind::Dofile | ReferKind::Loadfile => {
                let path = self.module.replace('\\', "/");
                vec![path.trim_start_matches("./").to_string()]
            }
        }
    }

    /// The import returns the target file's final `return` value.
    pub fn returns_module_value(&self) -> bool {
        !matches!(self.kind, ReferKind::Frame)
    }
}
