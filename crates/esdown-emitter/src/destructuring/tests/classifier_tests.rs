use super::*;
use esdown_parser::ParserState;

fn parse(source: &str) -> NodeArena {
    let mut parser = ParserState::new("test.js".to_string(), source.to_string());
    parser.parse_source_file();
    assert!(!parser.has_errors(), "{:?}", parser.get_diagnostics());
    parser.into_arena()
}

fn patterns(arena: &NodeArena) -> Vec<NodeIndex> {
    arena
        .iter()
        .filter(|(_, node)| node.is_pattern())
        .map(|(index, _)| index)
        .collect()
}

#[test]
fn test_pattern_predicates() {
    let arena = parse("var {a} = o, [b] = p;");
    let found = patterns(&arena);
    assert_eq!(found.len(), 2);
    assert!(is_object_pattern(&arena, found[0]));
    assert!(!is_array_pattern(&arena, found[0]));
    assert!(is_array_pattern(&arena, found[1]));
    assert!(!is_pattern(&arena, NodeIndex::NONE));
}

#[test]
fn test_declaration_kind() {
    let arena = parse("const {a} = o;");
    let declaration = arena.parent(patterns(&arena)[0]);
    assert_eq!(declaration_kind(&arena, declaration), Some(VariableKind::Const));
    assert!(is_var_const_let_declaration(&arena, declaration));
}

#[test]
fn test_loop_heads() {
    let arena = parse("for (let [k, v] of m) {}\nfor ({a} in o) {}\nfor (var [i] = x; ;) {}");
    let found = patterns(&arena);
    assert_eq!(found.len(), 3);

    let declaration = arena.parent(found[0]);
    assert_eq!(for_in_or_for_of_head(&arena, declaration), Some(true));
    assert_eq!(for_in_or_for_of_head(&arena, found[1]), Some(false));
    assert!(is_for_in_or_for_of_head(&arena, found[1]));

    let classic = arena.parent(found[2]);
    assert!(!is_for_in_or_for_of_head(&arena, classic));
}

#[test]
fn test_parameter_patterns() {
    let arena = parse("function f({a}, b) {}\nvar g = function ([c]) {};\nvar {d} = o;");
    let found = patterns(&arena);
    assert!(is_parameter_pattern(&arena, found[0]));
    assert!(is_parameter_pattern(&arena, found[1]));
    assert!(!is_parameter_pattern(&arena, found[2]));
}

#[test]
fn test_computed_keys_at_any_depth() {
    let arena = parse("var {a: [{[k]: b}]} = o;");
    let outer = *patterns(&arena).last().expect("pattern");
    assert!(has_computed_keys(&arena, outer));

    let arena = parse("var {a: [{k: b}]} = o;");
    let outer = *patterns(&arena).last().expect("pattern");
    assert!(!has_computed_keys(&arena, outer));
}

#[test]
fn test_identifier_names() {
    assert!(is_identifier_name("abc"));
    assert!(is_identifier_name("_$1"));
    assert!(!is_identifier_name("a-b"));
    assert!(!is_identifier_name("1a"));
    assert!(!is_identifier_name(""));
}

#[test]
fn test_value_parenthesization() {
    let arena = parse("x = a; x = a.b; x = f(); x = a || b; x = new F; x = 1;");
    let values: Vec<NodeIndex> = arena
        .iter()
        .filter_map(|(_, node)| match &node.data {
            NodeData::Assignment { right, .. } => Some(*right),
            _ => None,
        })
        .collect();
    let wrapped: Vec<bool> = values
        .iter()
        .map(|&value| needs_parens_for_access(&arena, value))
        .collect();
    assert_eq!(wrapped, vec![false, false, false, true, true, true]);
}
