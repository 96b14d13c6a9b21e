use super::*;

#[test]
fn test_line_map_handles_mixed_line_endings() {
    let source = "a\nb\r\nc\rd";
    let map = LineMap::build(source);
    assert_eq!(map.line_count(), 4);
    assert_eq!(map.line_of(0), 1);
    assert_eq!(map.line_of(2), 2);
    assert_eq!(map.line_of(5), 3);
    assert_eq!(map.line_of(7), 4);
}

#[test]
fn test_position_of_reports_one_based_column() {
    let map = LineMap::build("var a;\n  var {b} = c;");
    let pos = map.position_of(11);
    assert_eq!(pos, Position { line: 2, column: 5 });
    assert_eq!(map.line_start_of(11), 7);
}

#[test]
fn test_format_message_substitutes_placeholders() {
    let text = format_message(
        diagnostic_messages::DESTRUCTURING_CONTEXT_NOT_SUPPORTED,
        &["a for-of head"],
    );
    assert_eq!(
        text,
        "destructuring in a for-of head is not lowered; the pattern is left unchanged"
    );
}

#[test]
fn test_diagnostic_bag_tracks_errors() {
    let mut bag = DiagnosticBag::new();
    bag.report(Diagnostic::warning("a.js", 0, 1, 1, "w", 2002));
    assert!(!bag.has_errors());
    bag.report(Diagnostic::error(
        "a.js",
        4,
        3,
        1,
        diagnostic_messages::DESTRUCTURING_MUST_HAVE_AN_INITIALIZER,
        diagnostic_codes::DESTRUCTURING_MUST_HAVE_AN_INITIALIZER,
    ));
    assert!(bag.has_errors());
    assert_eq!(bag.len(), 2);
    assert_eq!(bag.diagnostics()[1].code, 2001);
}
