//! Source layout checks.

pub mod tests_layers;
