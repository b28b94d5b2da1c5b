//! Editor features over small multi-file workspaces.

pub mod tests_completion;
pub mod tests_goto;
pub mod tests_hover;
pub mod tests_references;
pub mod tests_semantic_tokens;
pub mod tests_signature_help;
pub mod tests_symbols;
