use super::*;
use esdown_binder::BinderState;
use esdown_parser::ParserState;

struct Fixture {
    arena: NodeArena,
    binder: BinderState,
    buffer: AlterationBuffer,
}

fn fixture(source: &str) -> Fixture {
    let mut parser = ParserState::new("test.js".to_string(), source.to_string());
    let root = parser.parse_source_file();
    assert!(!parser.has_errors(), "{:?}", parser.get_diagnostics());
    let arena = parser.into_arena();
    let mut binder = BinderState::new();
    binder.bind_source_file(&arena, root);
    Fixture {
        arena,
        binder,
        buffer: AlterationBuffer::new(source),
    }
}

/// Top-level patterns, in source order.
fn sites(arena: &NodeArena) -> Vec<NodeIndex> {
    let mut found: Vec<(u32, NodeIndex)> = arena
        .iter()
        .filter(|(index, node)| node.is_pattern() && classify_site(arena, *index) != PatternSite::Nested)
        .map(|(index, node)| (node.pos, index))
        .collect();
    found.sort();
    found.into_iter().map(|(_, index)| index).collect()
}

fn lower_first(source: &str) -> Result<LoweredSite, LoweringError> {
    let mut fx = fixture(source);
    let pattern = sites(&fx.arena)[0];
    DestructuringLowering::new(&fx.arena, &mut fx.binder, &fx.buffer).lower_site(pattern, false)
}

fn texts(site: &LoweredSite) -> Vec<&str> {
    site.bindings.iter().map(|b| b.text.as_str()).collect()
}

#[test]
fn test_array_element_from_identifier() {
    let site = lower_first("var [a] = arr;").expect("lowered");
    assert_eq!(site.render(), "var a = arr[0]");
    assert_eq!(site.replacement_text(), "a = arr[0]");
    assert_eq!(site.temps_allocated, 0);
    assert_eq!(site.start, 4);
    assert_eq!(site.end, 13);
}

#[test]
fn test_call_value_is_evaluated_once_through_a_temp() {
    let site = lower_first("let {a, b} = foo();").expect("lowered");
    assert_eq!(texts(&site), vec!["a = (_a = foo()).a", "b = _a.b"]);
    assert_eq!(site.render(), "let a = (_a = foo()).a, b = _a.b");
    assert_eq!(site.temps_allocated, 1);
    assert_eq!(site.context, SiteContext::Declaration(VariableKind::Let));
}

#[test]
fn test_var_reuses_last_bound_name() {
    let site = lower_first("var {a, b} = foo();").expect("lowered");
    assert_eq!(site.replacement_text(), "a = (b = foo()).a, b = b.b");
    assert_eq!(site.temps_allocated, 0);
}

#[test]
fn test_nested_object_pattern() {
    let site = lower_first("var {a: {b}} = obj;").expect("lowered");
    assert_eq!(site.replacement_text(), "b = obj.a.b");

    let site = lower_first("let {a: {b, c}} = obj;").expect("lowered");
    assert_eq!(site.replacement_text(), "b = (_a = obj.a).b, c = _a.c");
}

#[test]
fn test_rest_element_slices() {
    let site = lower_first("var [a, ...rest] = arr;").expect("lowered");
    assert_eq!(site.replacement_text(), "a = arr[0], rest = arr.slice(1)");

    let site = lower_first("var [, , ...r] = a;").expect("lowered");
    assert_eq!(site.replacement_text(), "r = a.slice(2)");
}

#[test]
fn test_holes_are_skipped() {
    let site = lower_first("var [, b] = arr;").expect("lowered");
    assert_eq!(site.replacement_text(), "b = arr[1]");
}

#[test]
fn test_empty_declaration_pattern_still_evaluates_value() {
    let site = lower_first("var {} = foo();").expect("lowered");
    assert_eq!(site.render(), "var _a = foo()");

    let site = lower_first("var [,] = foo();").expect("lowered");
    assert_eq!(site.render(), "var _a = foo()");
}

#[test]
fn test_property_key_forms() {
    let site = lower_first("var {[k]: v, \"a-b\": x, 0: z, \"ok\": y} = o;").expect("lowered");
    assert_eq!(
        texts(&site),
        vec!["v = o[k]", "x = o[\"a-b\"]", "z = o[0]", "y = o.ok"]
    );
}

#[test]
fn test_computed_keys_disable_local_reuse() {
    let site = lower_first("var {[k]: a, b} = f();").expect("lowered");
    assert_eq!(site.replacement_text(), "a = (_a = f())[k], b = _a.b");
}

#[test]
fn test_rebound_identifier_value_is_copied() {
    let site = lower_first("var {x, a} = a;").expect("lowered");
    assert_eq!(site.replacement_text(), "x = (a = a).x, a = a.a");

    let site = lower_first("let {a, b} = a;").expect("lowered");
    assert_eq!(site.replacement_text(), "a = (_a = a).a, b = _a.b");
}

#[test]
fn test_low_precedence_value_is_wrapped_for_access() {
    let site = lower_first("var {a} = x || y;").expect("lowered");
    assert_eq!(site.replacement_text(), "a = (x || y).a");
}

#[test]
fn test_assignment_carries_trailing_result() {
    let site = lower_first("[a, b] = c;").expect("lowered");
    assert_eq!(site.context, SiteContext::Assignment);
    assert!(site.parenthesize);
    assert_eq!(site.replacement_text(), "(a = c[0], b = c[1], c)");
    let last = site.bindings.last().expect("trailing");
    assert!(last.is_trailing_expression_result);
}

#[test]
fn test_parenthesized_assignment_is_not_wrapped_again() {
    let site = lower_first("({a, b} = obj);").expect("lowered");
    assert!(!site.parenthesize);
    assert_eq!(site.replacement_text(), "a = obj.a, b = obj.b, obj");
}

#[test]
fn test_assignment_never_reuses_a_target() {
    let site = lower_first("[a, b] = [b, a];").expect("lowered");
    assert_eq!(site.replacement_text(), "(a = (_a = [b, a])[0], b = _a[1], _a)");
}

#[test]
fn test_member_targets() {
    let site = lower_first("[this.x, o[k]] = pair;").expect("lowered");
    assert_eq!(
        site.replacement_text(),
        "(this.x = pair[0], o[k] = pair[1], pair)"
    );
}

#[test]
fn test_empty_assignment_patterns() {
    let site = lower_first("({} = f());").expect("lowered");
    assert_eq!(site.replacement_text(), "f()");

    let site = lower_first("[[], a] = f();").expect("lowered");
    assert_eq!(site.replacement_text(), "((_a = f())[0], a = _a[1], _a)");
}

#[test]
fn test_missing_initializer() {
    assert_eq!(lower_first("var {a};"), Err(LoweringError::MissingInitializer));
}

#[test]
fn test_unsupported_contexts() {
    assert_eq!(
        lower_first("for (var [k, v] of m) {}"),
        Err(LoweringError::UnsupportedContext {
            context: "a for-of head"
        })
    );
    assert_eq!(
        lower_first("for ({a} in o) {}"),
        Err(LoweringError::UnsupportedContext {
            context: "a for-in head"
        })
    );
    assert_eq!(
        lower_first("function f([a]) {}"),
        Err(LoweringError::UnsupportedContext {
            context: "a parameter list"
        })
    );
}

#[test]
fn test_temps_are_released_between_sites() {
    let mut fx = fixture("let {a, b} = f();\nlet {c, d} = g();");
    let found = sites(&fx.arena);
    let first = DestructuringLowering::new(&fx.arena, &mut fx.binder, &fx.buffer)
        .lower_site(found[0], false)
        .expect("first");
    let second = DestructuringLowering::new(&fx.arena, &mut fx.binder, &fx.buffer)
        .lower_site(found[1], false)
        .expect("second");
    assert_eq!(first.replacement_text(), "a = (_a = f()).a, b = _a.b");
    assert_eq!(second.replacement_text(), "c = (_a = g()).c, d = _a.d");
    assert_eq!(fx.binder.declared_temps(esdown_binder::ScopeId::ROOT), vec!["_a".to_string()]);
}

#[test]
fn test_retained_temps_are_not_reused() {
    let mut fx = fixture("let {a, b} = f();\nlet {c, d} = g();");
    let found = sites(&fx.arena);
    DestructuringLowering::new(&fx.arena, &mut fx.binder, &fx.buffer)
        .lower_site(found[0], true)
        .expect("first");
    let second = DestructuringLowering::new(&fx.arena, &mut fx.binder, &fx.buffer)
        .lower_site(found[1], false)
        .expect("second");
    assert_eq!(second.replacement_text(), "c = (_b = g()).c, d = _b.d");
}

#[test]
fn test_sibling_levels_share_a_released_temp() {
    let site = lower_first("let {a: {b, c}, d: {e, f}} = g();").expect("lowered");
    assert_eq!(
        site.replacement_text(),
        "b = (_b = (_a = g()).a).b, c = _b.c, e = (_b = _a.d).e, f = _b.f"
    );
    assert_eq!(site.temps_allocated, 3);
}

#[test]
fn test_temp_names_avoid_file_identifiers() {
    let site = lower_first("let {_a, b} = f();").expect("lowered");
    assert_eq!(site.replacement_text(), "_a = (_b = f())._a, b = _b.b");
}

#[test]
fn test_nested_rest_pattern() {
    let site = lower_first("var [a, ...[b, c]] = arr;").expect("lowered");
    assert_eq!(
        site.replacement_text(),
        "a = arr[0], b = (c = arr.slice(1))[0], c = c[1]"
    );
}

#[test]
fn test_non_pattern_is_an_internal_error() {
    let mut fx = fixture("var a = 1;");
    let identifier = fx
        .arena
        .iter()
        .find(|(_, node)| node.is_identifier())
        .map(|(index, _)| index)
        .expect("identifier");
    let result = DestructuringLowering::new(&fx.arena, &mut fx.binder, &fx.buffer)
        .lower_site(identifier, false);
    assert!(matches!(result, Err(ref e) if e.is_internal()));
}

#[test]
fn test_escaped_string_keys_use_the_cooked_name() {
    let site = lower_first(r#"var {"ab": q, r} = o;"#).expect("lowered");
    assert_eq!(site.replacement_text(), "q = o.ab, r = o.r");

    let site = lower_first(r#"var {"\x41\u{62}": a, "c\
d": e} = o;"#)
    .expect("lowered");
    assert_eq!(texts(&site), vec!["a = o.Ab", "e = o.cd"]);
}

#[test]
fn test_escaped_key_that_is_not_a_name_keeps_its_source_text() {
    let site = lower_first(r#"var {"1x": a, "\x2d": b} = o;"#).expect("lowered");
    assert_eq!(texts(&site), vec![r#"a = o["1x"]"#, r#"b = o["\x2d"]"#]);
}

#[test]
fn test_undecodable_key_falls_back_to_brackets() {
    let site = lower_first(r#"var {"\uD800": a, "\u{110000}": b} = o;"#).expect("lowered");
    assert_eq!(texts(&site), vec![r#"a = o["\uD800"]"#, r#"b = o["\u{110000}"]"#]);
}

#[test]
fn test_regular_expression_value_needs_no_parens() {
    let site = lower_first("var {source} = /ab+c/g;").expect("lowered");
    assert_eq!(site.replacement_text(), "source = /ab+c/g.source");
}

#[test]
fn test_bitwise_value_is_wrapped_for_access() {
    let site = lower_first("var {a} = b | c;").expect("lowered");
    assert_eq!(site.replacement_text(), "a = (b | c).a");
}
