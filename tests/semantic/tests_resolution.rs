//! Cross-file resolution scenarios.

use luasema::Position;
use luasema::semantic::{ChainPart, Resolver, SemanticIndex, Symbol, SymbolSource};

use crate::helpers::workspace_helpers::memory_workspace;

fn chain(index: &SemanticIndex, file: &str, parts: &[&str], line: usize) -> Option<Symbol> {
    let parts: Vec<ChainPart> = parts
        .iter()
        .map(|part| match part.strip_suffix("()") {
            Some(name) => ChainPart::call(name),
            None => ChainPart::name(*part),
        })
        .collect();
    Resolver::new(index)
        .resolve_chain(file, &parts, Position::new(line, 0))
        .0
}

fn type_name(symbol: &Symbol) -> String {
    symbol.ty.as_ref().map(ToString::to_string).unwrap_or_default()
}

#[test]
fn test_annotation_takes_precedence_over_table_literal() {
    let ws = memory_workspace(&[(
        "a.lua",
        "---@class Foo\n---@field name string\nlocal Foo = {}\n\n---@type Foo\nlocal v = { other = 1 }\n\n",
    )]);
    let index = ws.analysis();
    let symbol = chain(&index, "a.lua", &["v"], 6).expect("v resolves");
    assert_eq!(symbol.source, SymbolSource::Annotation);
    assert_eq!(type_name(&symbol), "Foo");
    let field = chain(&index, "a.lua", &["v", "name"], 6).expect("annotated field");
    assert_eq!(type_name(&field), "string");
}

#[test]
fn test_self_referential_metatable_terminates() {
    let src = "local a = {}\na.__index = a\nsetmetatable(a, a)\nlocal b = { __index = b }\nlocal c = setmetatable({}, a)\n\n";
    let ws = memory_workspace(&[("a.lua", src)]);
    let index = ws.analysis();
    assert!(chain(&index, "a.lua", &["a"], 5).is_some());
    assert!(chain(&index, "a.lua", &["b"], 5).is_some());
    assert!(chain(&index, "a.lua", &["c", "missing"], 5).is_none());
    assert!(chain(&index, "a.lua", &["a", "__index", "__index", "__index"], 5).is_some());
}

#[test]
fn test_inherited_field_reports_owning_class() {
    let src = "---@class B : A\nlocal B = {}\n\n---@class A\n---@field x number\nlocal A = {}\n\n---@type B\nlocal v = nil\n\n";
    let ws = memory_workspace(&[("types.lua", src)]);
    let index = ws.analysis();
    let field = chain(&index, "types.lua", &["v", "x"], 9).expect("x via parent");
    assert_eq!(field.owner_class.as_deref(), Some("A"));
    assert_eq!(type_name(&field), "number");
}

#[test]
fn test_inheritance_across_files() {
    let ws = memory_workspace(&[
        ("base.lua", "---@class Animal\n---@field legs integer\nlocal Animal = {}\n"),
        ("dog.lua", "---@class Dog : Animal\nlocal Dog = {}\n\n---@type Dog\nlocal rex = nil\n\n"),
    ]);
    let index = ws.analysis();
    let field = chain(&index, "dog.lua", &["rex", "legs"], 5).expect("legs");
    assert_eq!(field.owner_class.as_deref(), Some("Animal"));
    assert_eq!(field.decl.as_ref().map(|(file, _)| file.as_ref()), Some("base.lua"));
}

#[test]
fn test_import_round_trip() {
    let ws = memory_workspace(&[
        ("m.lua", "return {greet = function() end}\n"),
        ("main.lua", "local m = require(\"m\")\n\n"),
    ]);
    let index = ws.analysis();
    let symbol = chain(&index, "main.lua", &["m", "greet"], 1).expect("m.greet");
    let var = symbol.var.expect("declared member");
    assert_eq!(var.file.as_ref(), "m.lua");

    let module = index.file("m.lua").expect("m.lua");
    let func = module.var(var.id).func.expect("greet defines a function");
    assert_eq!(module.func(func).span.start.line, 0);
}

#[test]
fn test_require_result_through_call_chain() {
    let ws = memory_workspace(&[
        ("lib/factory.lua", "local M = {}\nfunction M.make()\n  return { size = 1 }\nend\nreturn M\n"),
        ("main.lua", "local factory = require('lib.factory')\n\n"),
    ]);
    let index = ws.analysis();
    let size = chain(&index, "main.lua", &["factory", "make()", "size"], 1).expect("size");
    assert_eq!(size.var.expect("var").file.as_ref(), "lib/factory.lua");
}

#[test]
fn test_generic_return_single_hop() {
    let src = "---@generic T\n---@param v T\n---@return T\nlocal function id(v) return v end\n\n---@class Box\nlocal Box = {}\n\n---@type Box\nlocal b = nil\nlocal same = id(b)\n\n";
    let ws = memory_workspace(&[("a.lua", src)]);
    let index = ws.analysis();
    let symbol = chain(&index, "a.lua", &["same"], 11).expect("same");
    assert_eq!(type_name(&symbol), "Box");
}

#[test]
fn test_builtin_names() {
    let ws = memory_workspace(&[("a.lua", "\n")]);
    let index = ws.analysis();
    let symbol = chain(&index, "a.lua", &["print"], 0).expect("print");
    assert_eq!(symbol.source, SymbolSource::Builtin);
    assert!(chain(&index, "a.lua", &["not_a_builtin"], 0).is_none());
}
