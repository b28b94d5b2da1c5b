//! Layer dependency checks.
//!
//! ```text
//! ide
//!   ↓
//! project
//!   ↓
//! semantic
//!   ↓
//! annotation
//!   ↓
//! syntax
//!   ↓
//! base
//! ```
//!
//! A layer may only name the layers below it. Test modules are exempt.

use std::path::Path;

use rstest::rstest;

use crate::helpers::architecture_helpers::{LAYERS, collect_layer_violations, format_violation_list};

fn layer_dir(layer: &str) -> std::path::PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("src").join(layer)
}

#[rstest]
#[case::base("base", &[])]
#[case::syntax("syntax", &["base"])]
#[case::annotation("annotation", &["base", "syntax"])]
#[case::semantic("semantic", &["base", "syntax", "annotation"])]
#[case::project("project", &["base", "syntax", "annotation", "semantic"])]
fn test_layer_only_depends_downward(#[case] layer: &str, #[case] allowed: &[&str]) {
    let violations = collect_layer_violations(&layer_dir(layer), allowed, layer);
    assert!(
        violations.is_empty(),
        "\n{layer} may only depend on {allowed:?}.\nViolations:\n{}\n",
        violations.join("\n")
    );
}

#[test]
fn test_every_layer_exists() {
    let missing: Vec<&&str> = LAYERS.iter().filter(|layer| !layer_dir(layer).is_dir()).collect();
    assert!(
        missing.is_empty(),
        "\nMissing layer directories:\n{}\n",
        format_violation_list(&missing)
    );
}

#[test]
fn test_lib_declares_layers_in_order() {
    let lib = std::fs::read_to_string(Path::new(env!("CARGO_MANIFEST_DIR")).join("src/lib.rs"))
        .expect("src/lib.rs");
    let positions: Vec<usize> = LAYERS
        .iter()
        .map(|layer| {
            lib.find(&format!("pub mod {layer};"))
                .unwrap_or_else(|| panic!("lib.rs does not declare {layer}"))
        })
        .collect();
    let mut sorted = positions.clone();
    sorted.sort_unstable();
    assert_eq!(positions, sorted);
}
