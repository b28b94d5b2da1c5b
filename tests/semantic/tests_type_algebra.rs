//! Type algebra over parsed annotation text.

use luasema::annotation::{Type, normal_names, parse_fragment};
use luasema::syntax::{group_comments, tokenize};
use rstest::rstest;

fn parse_type(src: &str) -> Type {
    let text = format!("---@type {src}\n");
    let blocks = group_comments(tokenize(&text).comments);
    let (fragment, errors) = parse_fragment(&blocks[0]);
    assert!(errors.is_empty(), "{errors:?}");
    fragment.lines[0].stmt.types()[0].clone()
}

#[rstest]
#[case("A|B|C", &["A", "B", "C"])]
#[case("(A|B)|C", &["A", "B", "C"])]
#[case("A|(B|(C))", &["A", "B", "C"])]
#[case("string|number[]", &["string"])]
#[case("(string|number)[]", &[])]
#[case("Foo|nil", &["Foo", "nil"])]
fn test_union_flattening(#[case] src: &str, #[case] expected: &[&str]) {
    let names = normal_names(&parse_type(src));
    let names: Vec<&str> = names.iter().map(|name| name.as_str()).collect();
    assert_eq!(names, expected);
}

#[test]
fn test_array_postfix_binds_tighter_than_union() {
    let loose = parse_type("string|number[]");
    let grouped = parse_type("(string|number)[]");
    assert_ne!(loose.to_string(), grouped.to_string());
    assert!(matches!(grouped, Type::Array(_)));
    assert!(matches!(loose, Type::Multi(_)));
}
