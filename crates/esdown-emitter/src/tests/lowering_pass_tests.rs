use super::*;
use crate::transform_context::{LoweringOptions, UnsupportedContextPolicy};
use esdown_binder::BinderState;
use esdown_common::{Diagnostic, DiagnosticCategory, diagnostic_codes};
use esdown_parser::ParserState;

fn lower_with(source: &str, options: LoweringOptions) -> (String, Vec<Diagnostic>) {
    let mut parser = ParserState::new("test.js".to_string(), source.to_string());
    let root = parser.parse_source_file();
    assert!(!parser.has_errors(), "{:?}", parser.get_diagnostics());
    let arena = parser.into_arena();
    let mut binder = BinderState::new();
    binder.bind_source_file(&arena, root);
    let ctx = TransformContext::new("test.js", source, options);
    let ctx = LoweringPass::new(&arena, &mut binder, ctx).run(root);
    (ctx.buffer.apply(), ctx.diagnostics.into_diagnostics())
}

fn lower(source: &str) -> String {
    let (output, diagnostics) = lower_with(source, LoweringOptions::default());
    assert!(diagnostics.is_empty(), "{diagnostics:?}");
    output
}

#[test]
fn test_source_without_patterns_is_unchanged() {
    let source = "var a = 1;\nfunction f(x) { return x + a; }\n";
    assert_eq!(lower(source), source);
}

#[test]
fn test_program_temp_is_declared_once() {
    assert_eq!(
        lower("let {a, b} = foo();"),
        "var _a;\nlet a = (_a = foo()).a, b = _a.b;"
    );
}

#[test]
fn test_var_declaration_without_temp() {
    assert_eq!(lower("var {a, b} = foo();"), "var a = (b = foo()).a, b = b.b;");
    assert_eq!(lower("var [a] = arr;"), "var a = arr[0];");
    assert_eq!(lower("var {} = foo();"), "var _a = foo();");
}

#[test]
fn test_mixed_declarators() {
    assert_eq!(
        lower("var x = 1, {a} = o, y = 2;"),
        "var x = 1, a = o.a, y = 2;"
    );
    assert_eq!(
        lower("var {a} = o, {b, c} = f();"),
        "var a = o.a, b = (c = f()).b, c = c.c;"
    );
}

#[test]
fn test_temp_is_reused_by_later_sites() {
    assert_eq!(
        lower("let {a, b} = f();\nlet {c, d} = g();"),
        "var _a;\nlet a = (_a = f()).a, b = _a.b;\nlet c = (_a = g()).c, d = _a.d;"
    );
}

#[test]
fn test_nested_levels_declare_every_temp() {
    assert_eq!(
        lower("let {a: {b, c}, d} = f();"),
        "var _a, _b;\nlet b = (_b = (_a = f()).a).b, c = _b.c, d = _a.d;"
    );
}

#[test]
fn test_swap_assignment() {
    assert_eq!(
        lower("[a, b] = [b, a];"),
        "var _a;\n(a = (_a = [b, a])[0], b = _a[1], _a);"
    );
}

#[test]
fn test_assignment_inside_expressions() {
    assert_eq!(lower("({a, b} = obj);"), "(a = obj.a, b = obj.b, obj);");
    assert_eq!(lower("x = [a, b] = c;"), "x = (a = c[0], b = c[1], c);");
    assert_eq!(lower("f([a] = c, 1);"), "f((a = c[0], c), 1);");
}

#[test]
fn test_function_scope_temps() {
    let source = "function f() {\n  let {a, b} = g();\n  return a + b;\n}";
    assert_eq!(
        lower(source),
        "function f() {\n  var _a;\n  let a = (_a = g()).a, b = _a.b;\n  return a + b;\n}"
    );
}

#[test]
fn test_function_and_program_temps_are_separate() {
    let source = "let {a, b} = f();\nfunction g() {\n  let {c, d} = h();\n}";
    assert_eq!(
        lower(source),
        "var _a;\nlet a = (_a = f()).a, b = _a.b;\nfunction g() {\n  var _a;\n  let c = (_a = h()).c, d = _a.d;\n}"
    );
}

#[test]
fn test_temp_declaration_follows_directives() {
    assert_eq!(
        lower("\"use strict\";\nlet {a, b} = g();"),
        "\"use strict\";\nvar _a;\nlet a = (_a = g()).a, b = _a.b;"
    );
}

#[test]
fn test_temp_declarations_can_be_disabled() {
    let options = LoweringOptions {
        temp_declarations: false,
        ..LoweringOptions::default()
    };
    let (output, diagnostics) = lower_with("let {a, b} = foo();", options);
    assert_eq!(output, "let a = (_a = foo()).a, b = _a.b;");
    assert!(diagnostics.is_empty());
}

#[test]
fn test_site_nested_in_value_is_lowered_first() {
    assert_eq!(
        lower("var {a, b} = ({c, d} = f());"),
        "var _a;\nvar a = (b = (c = (_a = f()).c, d = _a.d, _a)).a, b = b.b;"
    );
}

#[test]
fn test_site_in_computed_key_keeps_its_temp() {
    assert_eq!(
        lower("let {[([x, y] = f(), \"k\")]: a, b} = g();"),
        "var _a, _b;\nlet a = (_b = g())[((x = (_a = f())[0], y = _a[1], _a), \"k\")], b = _b.b;"
    );
}

#[test]
fn test_missing_initializer_is_reported_and_left_alone() {
    let source = "var x = 1;\nvar {a};\nvar {b} = o;";
    let (output, diagnostics) = lower_with(source, LoweringOptions::default());
    assert_eq!(output, "var x = 1;\nvar {a};\nvar b = o.b;");
    assert_eq!(diagnostics.len(), 1);
    assert_eq!(diagnostics[0].category, DiagnosticCategory::Error);
    assert_eq!(
        diagnostics[0].code,
        diagnostic_codes::DESTRUCTURING_MUST_HAVE_AN_INITIALIZER
    );
    assert_eq!(diagnostics[0].line, 2);
    assert_eq!(
        diagnostics[0].message_text,
        "destructuring must have an initializer"
    );
}

#[test]
fn test_loop_head_is_left_unchanged_with_warning() {
    let source = "for (var [k, v] of entries) {\n  let {a, b} = v;\n}";
    let (output, diagnostics) = lower_with(source, LoweringOptions::default());
    assert_eq!(
        output,
        "for (var [k, v] of entries) {\n  let a = v.a, b = v.b;\n}"
    );
    assert_eq!(diagnostics.len(), 1);
    assert_eq!(diagnostics[0].category, DiagnosticCategory::Warning);
    assert_eq!(
        diagnostics[0].message_text,
        "destructuring in a for-of head is not lowered; the pattern is left unchanged"
    );
}

#[test]
fn test_unsupported_context_policy_error() {
    let options = LoweringOptions {
        unsupported_context: UnsupportedContextPolicy::Error,
        ..LoweringOptions::default()
    };
    let source = "function f({a}) {}";
    let (output, diagnostics) = lower_with(source, options);
    assert_eq!(output, source);
    assert_eq!(diagnostics.len(), 1);
    assert_eq!(diagnostics[0].category, DiagnosticCategory::Error);
    assert_eq!(
        diagnostics[0].code,
        diagnostic_codes::DESTRUCTURING_CONTEXT_NOT_SUPPORTED
    );
    assert_eq!(
        diagnostics[0].message_text,
        "destructuring in a parameter list is not lowered; the pattern is left unchanged"
    );
}

#[test]
fn test_lowering_is_idempotent() {
    let once = lower("let {a: [b, ...c], d} = f();\n[x, y] = [y, x];");
    assert_eq!(lower(&once), once);
}

#[test]
fn test_sites_inside_switch_clauses() {
    assert_eq!(
        lower("switch (x) { case 1: var {a, b} = f(); break; default: [c, d] = e; }"),
        "switch (x) { case 1: var a = (b = f()).a, b = b.b; break; default: (c = e[0], d = e[1], e); }"
    );
}

#[test]
fn test_sites_inside_try_statements() {
    assert_eq!(
        lower("try {\n  let {a, b} = f();\n} catch (err) {\n  [x, y] = err;\n} finally {\n  done();\n}"),
        "var _a;\ntry {\n  let a = (_a = f()).a, b = _a.b;\n} catch (err) {\n  (x = err[0], y = err[1], err);\n} finally {\n  done();\n}"
    );
}

#[test]
fn test_sites_inside_loops_and_labels() {
    assert_eq!(
        lower("outer: do { var [x] = next(); if (x | 0) continue outer; } while (x);"),
        "outer: do { var x = next()[0]; if (x | 0) continue outer; } while (x);"
    );
}

#[test]
fn test_accessor_body_gets_its_own_temps() {
    assert_eq!(
        lower("var o = { get p() { let {a, b} = f(); return a + b; }, set p(v) { ({c: this.c} = v); } };"),
        "var o = { get p() { var _a; let a = (_a = f()).a, b = _a.b; return a + b; }, set p(v) { (this.c = v.c, v); } };"
    );
}

#[test]
fn test_bitwise_and_regular_expression_code_is_untouched() {
    let source = "var x = a | 0, m = ~b >>> 1;\nflags &= ~MASK;\nvar r = /[/]+/g.test(s) / 2;\n";
    assert_eq!(lower(source), source);
}

#[test]
fn test_leading_byte_order_mark_is_preserved() {
    assert_eq!(lower("\u{FEFF}var {a, b} = c();"), "\u{FEFF}var a = (b = c()).a, b = b.b;");
}
