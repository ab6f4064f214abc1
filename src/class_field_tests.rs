//! Class field hoisting and `event` sugar.

use crate::error::ErrorKind;
use crate::transform::{transform, transform_plain};

const HEADER: &str = "const { _VV, _VVT, _VVD } = require('flare/ctr');";

fn jsx(src: &str) -> String {
    let out = transform(src, "class.jsx", false).unwrap();
    out.strip_prefix(HEADER).unwrap_or(&out).to_string()
}

fn jsx_err(src: &str) -> crate::error::TransformError {
    transform(src, "class.jsx", false).unwrap_err()
}

// ═══════════════════════════════════════════════════════════════════════════════
// HOISTING
// ═══════════════════════════════════════════════════════════════════════════════

#[test]
fn test_field_is_hoisted_after_body() {
    assert_eq!(
        jsx("class A { x = 1 + 1; f(){} }"),
        "class A { /*x = 1 + 1*/ f(){} }\
         \nObject.assign(A.prototype, {\n  x: 1 + 1,\n});\n"
    );
}

#[test]
fn test_fields_keep_declaration_order() {
    let out = jsx("class A {\n  b = 2;\n  a = 1;\n  b = 3;\n}");
    assert!(
        out.ends_with("\nObject.assign(A.prototype, {\n  b: 3,\n  a: 1,\n});\n"),
        "{out}"
    );
}

#[test]
fn test_field_without_initializer_is_undefined() {
    assert_eq!(
        jsx("class A { x; }"),
        "class A { /*x*/ }\nObject.assign(A.prototype, {\n  x: undefined,\n});\n"
    );
}

#[test]
fn test_field_value_is_parsed_as_expression() {
    let out = jsx("class A { v = <b>{n}</b>; h = () => this.v; }");
    assert!(out.contains(r#"/*v = _VV("b", [], [_VVD(n)])*/"#), "{out}");
    assert!(out.contains(r#"  v: _VV("b", [], [_VVD(n)]),"#), "{out}");
    assert!(out.contains("  h: () => this.v,"), "{out}");
}

#[test]
fn test_glued_comparison_in_value() {
    let out = jsx("class A { x = c ? a<b:d }");
    assert!(out.starts_with("class A { /*x = c ? a<b:d*/ }"), "{out}");
    assert!(out.contains("  x: c ? a<b:d,"), "{out}");
}

#[test]
fn test_class_after_element_statement() {
    for element in ["<a/>", "<a></a>"] {
        let out = jsx(&format!("const v = {element}\nclass B {{ x = 1 }}"));
        assert!(
            out.ends_with("\nObject.assign(B.prototype, {\n  x: 1,\n});\n"),
            "{out}"
        );
    }
}

#[test]
fn test_comment_close_in_value_is_escaped() {
    let out = jsx("class A { r = /a*/g; }");
    assert!(out.starts_with(r"class A { /*r = /a*\/g*/ }"), "{out}");
    assert!(out.contains("  r: /a*/g,"), "{out}");
}

#[test]
fn test_multiline_value_keeps_lines() {
    let src = "class A {\n  x = [\n    1,\n    2\n  ];\n  f() {}\n}";
    let out = jsx(src);
    let line = out.lines().nth(5).unwrap();
    assert_eq!(line, "  f() {}");
}

#[test]
fn test_implicit_member_end() {
    let out = jsx("class A {\n  x = 1\n  y = 2\n}");
    assert!(out.contains("  x: 1,\n  y: 2,"), "{out}");
}

#[test]
fn test_several_classes() {
    let out = jsx("class A { a = 1; }\nclass B { m() {} }\nclass C { c = 3; }");
    assert!(
        out.ends_with(
            "\nObject.assign(A.prototype, {\n  a: 1,\n});\
             \nObject.assign(C.prototype, {\n  c: 3,\n});\n"
        ),
        "{out}"
    );
}

#[test]
fn test_extends_and_methods_pass_through() {
    let out = jsx("class A extends mix(B, C) { get v() { return 1 } async *g() {} 'q'() {} [k]() {} }");
    assert_eq!(
        out,
        "class A extends mix(B, C) { get v() { return 1 } async *g() {} 'q'() {} [k]() {} }\n"
    );
}

// ═══════════════════════════════════════════════════════════════════════════════
// STATIC
// ═══════════════════════════════════════════════════════════════════════════════

#[test]
fn test_static_fields_hoist_onto_class() {
    assert_eq!(
        jsx("class A { static count = 0; static make() {} y = 1; }"),
        "class A { /*static count = 0*/ static make() {} /*y = 1*/ }\
         \nObject.assign(A.prototype, {\n  y: 1,\n});\
         \nObject.assign(A, {\n  count: 0,\n});\n"
    );
}

#[test]
fn test_static_block_passes_through() {
    assert_eq!(jsx("class A { static { init() } }"), "class A { static { init() } }\n");
}

// ═══════════════════════════════════════════════════════════════════════════════
// EVENT SUGAR
// ═══════════════════════════════════════════════════════════════════════════════

#[test]
fn test_event_declaration() {
    let out = jsx("class A { event onClick; }");
    assert_eq!(
        out,
        "class A { get onClick() { return this.getNoticer('Click') }\
         set onClick(func) { this.addDefaultListener('Click', func) }\
         triggerClick(ev,is_ev) { return this.$trigger('Click',ev,is_ev) } }\n"
    );
}

#[test]
fn test_event_without_semicolon() {
    let out = jsx("class A {\n  event onChange\n  m() {}\n}");
    assert!(out.contains("triggerChange(ev,is_ev)"), "{out}");
    assert_eq!(out.lines().nth(2), Some("  m() {}"));
}

#[test]
fn test_bad_event_name() {
    let err = jsx_err("class A { event click; }");
    assert_eq!(err.kind, ErrorKind::Structural);
    assert!(err.message.contains("click"), "{}", err.message);
}

#[test]
fn test_event_as_method_name() {
    assert_eq!(jsx("class A { event() {} }"), "class A { event() {} }\n");
}

// ═══════════════════════════════════════════════════════════════════════════════
// WHERE FIELDS ARE ALLOWED
// ═══════════════════════════════════════════════════════════════════════════════

#[test]
fn test_field_in_nested_class_is_an_error() {
    let err = jsx_err("function f() {\n  class A { x = 1; }\n}");
    assert_eq!(err.line, 2);
}

#[test]
fn test_field_in_class_expression_is_an_error() {
    jsx_err("x = class { y = 1; };");
    jsx_err("x = class B { y = 1; };");
}

#[test]
fn test_private_field_is_an_error() {
    let err = jsx_err("class A { #x = 1; }");
    assert!(err.message.contains("Private"), "{}", err.message);
}

#[test]
fn test_computed_field_is_an_error() {
    jsx_err("class A { [k] = 1; }");
}

#[test]
fn test_exported_class_hoists() {
    let out = jsx("export class A { x = 1; }");
    assert!(out.starts_with("/*export*/ class A { /*x = 1*/ }"), "{out}");
    assert!(
        out.ends_with("\nObject.assign(A.prototype, {\n  x: 1,\n});\nexports.A = A;\n"),
        "{out}"
    );
}

#[test]
fn test_plain_mode_leaves_classes_alone() {
    let src = "class A { m() { return 1 } }";
    assert_eq!(transform_plain(src, "c.js", false).unwrap(), format!("{src}\n"));
}
