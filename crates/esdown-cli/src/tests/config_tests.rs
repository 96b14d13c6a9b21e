use crate::config::*;
use esdown_core::UnsupportedContextPolicy;
use std::path::Path;

#[test]
fn test_parse_config_with_comments_and_trailing_commas() {
    let source = r#"{
        // lower everything under src
        "files": ["src/a.js", "src/b.js",],
        /* strict about loops */
        "unsupportedContext": "error",
        "outDir": "dist/es5",
    }"#;
    let config = parse_config(source).expect("config should parse");
    assert_eq!(
        config.files,
        Some(vec!["src/a.js".to_string(), "src/b.js".to_string()])
    );
    assert_eq!(config.unsupported_context.as_deref(), Some("error"));
    assert_eq!(config.out_dir.as_deref(), Some("dist/es5"));
    assert_eq!(config.temp_declarations, None);
}

#[test]
fn test_comment_markers_inside_strings_are_kept() {
    let config = parse_config(r#"{"outDir": "a//b/*c*/"}"#).expect("config should parse");
    assert_eq!(config.out_dir.as_deref(), Some("a//b/*c*/"));
}

#[test]
fn test_boolean_accepts_strings() {
    let config = parse_config(r#"{"tempDeclarations": "false"}"#).expect("string bool");
    assert_eq!(config.temp_declarations, Some(false));

    let config = parse_config(r#"{"tempDeclarations": true}"#).expect("bool");
    assert_eq!(config.temp_declarations, Some(true));

    assert!(parse_config(r#"{"tempDeclarations": "maybe"}"#).is_err());
    assert!(parse_config(r#"{"tempDeclarations": "yes"}"#).is_err());
    assert!(parse_config(r#"{"tempDeclarations": 1}"#).is_err());
}

#[test]
fn test_single_quoted_keys_and_values() {
    let source = "{'outDir': 'dist', 'files': ['a.js', 'b.js',], 'tempDeclarations': 'true',}";
    let config = parse_config(source).expect("config should parse");
    assert_eq!(config.out_dir.as_deref(), Some("dist"));
    assert_eq!(
        config.files,
        Some(vec!["a.js".to_string(), "b.js".to_string()])
    );
    assert_eq!(config.temp_declarations, Some(true));
}

#[test]
fn test_single_quoted_string_with_quotes_inside() {
    let config = parse_config(r#"{'outDir': 'say "hi"'}"#).expect("double quote inside");
    assert_eq!(config.out_dir.as_deref(), Some(r#"say "hi""#));

    let config = parse_config(r"{'outDir': 'it\'s'}").expect("escaped single quote");
    assert_eq!(config.out_dir.as_deref(), Some("it's"));
}

#[test]
fn test_trailing_comma_before_comment() {
    let source = "{\"outDir\": \"dist\", // last one\n}";
    let config = parse_config(source).expect("config should parse");
    assert_eq!(config.out_dir.as_deref(), Some("dist"));
}

#[test]
fn test_parse_error_line_survives_comments() {
    let source = "{\n/* one\ntwo */\n\"outDir\": 1}";
    let err = parse_config(source).expect_err("outDir must be a string");
    assert!(format!("{err:#}").contains("line 4"), "{err:#}");
}

#[test]
fn test_resolve_options_joins_paths() {
    let config = EsdownConfig {
        unsupported_context: Some("warn".to_string()),
        temp_declarations: Some(false),
        out_dir: Some("out".to_string()),
        files: Some(vec!["lib/x.js".to_string()]),
    };
    let resolved = resolve_options(&config, Path::new("/project")).expect("valid");
    assert_eq!(
        resolved.lowering.unsupported_context,
        UnsupportedContextPolicy::Warn
    );
    assert!(!resolved.lowering.temp_declarations);
    assert_eq!(resolved.out_dir, Some(Path::new("/project/out").to_path_buf()));
    assert_eq!(resolved.files, vec![Path::new("/project/lib/x.js").to_path_buf()]);
}

#[test]
fn test_resolve_options_rejects_unknown_policy() {
    let config = EsdownConfig {
        unsupported_context: Some("ignore".to_string()),
        ..EsdownConfig::default()
    };
    assert!(resolve_options(&config, Path::new("/project")).is_err());
}

#[test]
fn test_find_config_walks_up() {
    let dir = tempfile::tempdir().expect("temp dir");
    let nested = dir.path().join("src").join("deep");
    std::fs::create_dir_all(&nested).expect("create dirs");
    std::fs::write(dir.path().join(CONFIG_FILE_NAME), "{}").expect("write config");

    assert_eq!(find_config(&nested), Some(dir.path().join(CONFIG_FILE_NAME)));
}

#[test]
fn test_resolve_config_path_accepts_directory() {
    let dir = tempfile::tempdir().expect("temp dir");
    std::fs::write(dir.path().join(CONFIG_FILE_NAME), "{}").expect("write config");

    let resolved = resolve_config_path(Path::new("/"), Some(dir.path())).expect("resolves");
    assert_eq!(resolved, Some(dir.path().join(CONFIG_FILE_NAME)));

    let missing = dir.path().join("nope.json");
    assert!(resolve_config_path(Path::new("/"), Some(&missing)).is_err());
}
