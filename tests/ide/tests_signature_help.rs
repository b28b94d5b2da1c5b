use luasema::ide::signature_help;
use rstest::rstest;

use crate::helpers::workspace_helpers::memory_workspace;

const LIB: &str = "\
---@param path string
---@param mode? string
---@overload fun(path: string, mode: string, flags: integer): boolean
function open_file(path, mode) end
";

#[rstest]
#[case::first_argument("open_file(", 0, 0)]
#[case::second_argument("open_file(\"a\", ", 0, 1)]
#[case::only_the_overload_fits("open_file(\"a\", \"r\", ", 1, 2)]
fn test_global_function_from_another_file(
    #[case] typing: &str,
    #[case] active_signature: usize,
    #[case] active_parameter: usize,
) {
    let ws = memory_workspace(&[("lib.lua", LIB), ("main.lua", "open_file(\"a\", \"r\")\n")]);
    let help = signature_help(&ws, "main.lua", typing, 0, typing.len()).expect("signature help");

    let labels: Vec<&str> = help.signatures.iter().map(|s| s.label.as_str()).collect();
    assert_eq!(
        labels,
        vec![
            "function open_file(path : string, mode? : string)",
            "function open_file(path : string, mode : string, flags : integer) : boolean",
        ]
    );
    assert_eq!(help.active_signature, active_signature);
    assert_eq!(help.active_parameter, active_parameter);
}

#[test]
fn test_nested_call_picks_the_inner_function() {
    let main = "local function pair(a, b) end\nopen_file(pair(1, 2), \"r\")\n";
    let ws = memory_workspace(&[("lib.lua", LIB), ("main.lua", main)]);
    let typing = "local function pair(a, b) end\nopen_file(pair(1, ";
    let help = signature_help(&ws, "main.lua", typing, 1, 18).expect("signature help");
    assert_eq!(help.signatures.len(), 1);
    assert_eq!(help.signatures[0].label, "function pair(a, b)");
    assert_eq!(help.active_parameter, 1);
}
