use super::*;

#[test]
fn test_lower_source_rewrites_sites() {
    let result = lower_source(
        "a.js",
        "var [a, ...rest] = arr;\nlet {x, y} = point();\n",
        &LoweringOptions::default(),
    );
    assert_eq!(
        result.output.as_deref(),
        Some("var _a;\nvar a = arr[0], rest = arr.slice(1);\nlet x = (_a = point()).x, y = _a.y;\n")
    );
    assert!(result.diagnostics.is_empty());
    assert_eq!(result.edits, 3);
    assert!(!result.has_errors());
}

#[test]
fn test_parse_errors_produce_no_output() {
    let source = "var {a} = ;";
    let result = lower_source("bad.js", source, &LoweringOptions::default());
    assert_eq!(result.output, None);
    assert!(result.has_errors());
    assert!(!result.changed(source));
    assert_eq!(result.diagnostics[0].file, "bad.js");
}

#[test]
fn test_missing_initializer_keeps_output() {
    let source = "var {a};\n";
    let result = lower_source("a.js", source, &LoweringOptions::default());
    assert_eq!(result.output.as_deref(), Some(source));
    assert!(result.has_errors());
    assert!(!result.changed(source));
}

#[test]
fn test_unsupported_context_is_a_warning_by_default() {
    let source = "for (const [k, v] of m) {}\n";
    let result = lower_source("a.js", source, &LoweringOptions::default());
    assert!(!result.has_errors());
    assert_eq!(result.diagnostics.len(), 1);
    assert_eq!(result.diagnostics[0].category, DiagnosticCategory::Warning);

    let strict = LoweringOptions {
        unsupported_context: UnsupportedContextPolicy::Error,
        ..LoweringOptions::default()
    };
    let result = lower_source("a.js", source, &strict);
    assert!(result.has_errors());
    assert_eq!(result.output.as_deref(), Some(source));
}

#[test]
fn test_second_run_makes_no_edits() {
    let source = "let {a: [b, c], d} = f();\n[p, q] = [q, p];\n";
    let first = lower_source("a.js", source, &LoweringOptions::default());
    let lowered = first.output.expect("output");
    assert!(first.edits > 0);

    let second = lower_source("a.js", &lowered, &LoweringOptions::default());
    assert_eq!(second.edits, 0);
    assert_eq!(second.output.as_deref(), Some(lowered.as_str()));
}

#[test]
fn test_lower_sources_keeps_input_order() {
    let inputs = vec![
        SourceInput::new("one.js", "var [a] = x;"),
        SourceInput::new("two.js", "var {b} = y;"),
        SourceInput::new("three.js", "var c = ;"),
    ];
    let results = lower_sources(&inputs, &LoweringOptions::default());
    let names: Vec<&str> = results.iter().map(|r| r.file_name.as_str()).collect();
    assert_eq!(names, vec!["one.js", "two.js", "three.js"]);
    assert_eq!(results[0].output.as_deref(), Some("var a = x[0];"));
    assert_eq!(results[1].output.as_deref(), Some("var b = y.b;"));
    assert_eq!(results[2].output, None);
}

#[test]
fn test_unicode_escaped_key_reads_the_decoded_property() {
    let result = lower_source("p.js", "var {\"a\\u0062\": q, r} = o;", &LoweringOptions::default());
    assert_eq!(result.output.as_deref(), Some("var q = o.ab, r = o.r;"));
}

#[test]
fn test_ordinary_es5_statements_are_accepted() {
    let source = "switch (x) { case 1: var {a, b} = f(); break; }\ntry { g(); } catch (e) {}\nvar r = /ab+c/g, n = a | 0;\n";
    let result = lower_source("p.js", source, &LoweringOptions::default());
    assert!(result.diagnostics.is_empty(), "{:?}", result.diagnostics);
    assert_eq!(
        result.output.as_deref(),
        Some("switch (x) { case 1: var a = (b = f()).a, b = b.b; break; }\ntry { g(); } catch (e) {}\nvar r = /ab+c/g, n = a | 0;\n")
    );
}

#[test]
fn test_source_with_byte_order_mark() {
    let result = lower_source("bom.js", "\u{FEFF}var {a, b} = c();", &LoweringOptions::default());
    assert!(!result.has_errors(), "{:?}", result.diagnostics);
    assert_eq!(result.output.as_deref(), Some("\u{FEFF}var a = (b = c()).a, b = b.b;"));
}
