//! `Analysis`: a consistent read-only snapshot for IDE queries.
//!
//! The [`Workspace`] owns all mutable state. An `Analysis` holds one
//! published index snapshot, so a batch of queries sees the same tables
//! even while an edit swaps in a newer one.
//!
//! ```ignore
//! let ws = Workspace::new(AnalysisConfig::default());
//! ws.open_document(Path::new("main.lua"), "local t = {}\n");
//!
//! let analysis = Analysis::new(&ws);
//! let hover = analysis.hover("main.lua", 0, 6);
//! let refs = analysis.find_references("main.lua", 0, 6);
//! ```

use std::sync::Arc;

use crate::base::Position;
use crate::project::Workspace;
use crate::semantic::SemanticIndex;

use super::{
    CompletionItem, GotoResult, HoverResult, ReferenceResult, SemanticToken, SignatureHelp,
    completion, goto, hover, references, semantic_tokens, signature_help,
};

#[derive(Clone)]
pub struct Analysis {
    index: Arc<SemanticIndex>,
    workers: usize,
}

impl Analysis {
    pub fn new(ws: &Workspace) -> Self {
        Self {
            index: ws.analysis(),
            workers: ws.config().worker_count(),
        }
    }

    pub fn from_index(index: Arc<SemanticIndex>, workers: usize) -> Self {
        Self {
            index,
            workers: workers.max(1),
        }
    }

    pub fn index(&self) -> &SemanticIndex {
        &self.index
    }

    pub fn goto_definition(&self, file: &str, line: usize, col: usize) -> GotoResult {
        goto::goto_in(&self.index, file, Position::new(line, col))
    }

    pub fn hover(&self, file: &str, line: usize, col: usize) -> Option<HoverResult> {
        hover::hover_in(&self.index, file, Position::new(line, col))
    }

    /// Completion after `prefix_parts` (`["a", "b"]` for `a.b.`); an empty
    /// prefix offers every visible name.
    pub fn completion(
        &self,
        file: &str,
        line: usize,
        col: usize,
        prefix_parts: &[&str],
    ) -> Vec<CompletionItem> {
        completion::completion_in(&self.index, file, Position::new(line, col), prefix_parts)
    }

    /// Signature help inside the argument list open at `line`/`col` of
    /// `text`, the editor's current contents of `file`.
    pub fn signature_help(
        &self,
        file: &str,
        text: &str,
        line: usize,
        col: usize,
    ) -> Option<SignatureHelp> {
        signature_help::signature_help_in(&self.index, file, text, Position::new(line, col))
    }

    pub fn find_references(&self, file: &str, line: usize, col: usize) -> ReferenceResult {
        references::references_in(&self.index, self.workers, file, Position::new(line, col))
    }

    pub fn color_file(&self, file: &str) -> Vec<SemanticToken> {
        semantic_tokens::color_in(&self.index, file)
    }
}

impl std::fmt::Debug for Analysis {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Analysis")
            .field("files", &self.index.file_count())
            .field("workers", &self.workers)
            .finish()
    }
}
