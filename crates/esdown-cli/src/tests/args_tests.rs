use clap::Parser;

use crate::args::{CliArgs, ReportFormat, UnsupportedContext};
use esdown_core::UnsupportedContextPolicy;

#[test]
fn test_parses_defaults() {
    let args = CliArgs::try_parse_from(["esdown"]).expect("default args should parse");

    assert!(args.out_dir.is_none());
    assert!(args.config.is_none());
    assert_eq!(args.unsupported_context, None);
    assert!(!args.no_temp_declarations);
    assert!(!args.check);
    assert_eq!(args.pretty, None);
    assert_eq!(args.format, ReportFormat::Text);
    assert!(args.files.is_empty());
}

#[test]
fn test_parses_common_flags() {
    let args = CliArgs::try_parse_from([
        "esdown",
        "--out-dir",
        "dist",
        "--config",
        "configs/esdown.json",
        "--unsupported-context",
        "ERROR",
        "--no-temp-declarations",
        "--check",
        "--pretty",
        "false",
        "--format",
        "json",
        "src/a.js",
        "src/b.js",
    ])
    .expect("flagged args should parse");

    assert_eq!(args.out_dir.as_deref(), Some(std::path::Path::new("dist")));
    assert_eq!(
        args.config.as_deref(),
        Some(std::path::Path::new("configs/esdown.json"))
    );
    assert_eq!(args.unsupported_context, Some(UnsupportedContext::Error));
    assert!(args.no_temp_declarations);
    assert!(args.check);
    assert_eq!(args.pretty, Some(false));
    assert_eq!(args.format, ReportFormat::Json);
    assert_eq!(
        args.files,
        vec![
            std::path::PathBuf::from("src/a.js"),
            std::path::PathBuf::from("src/b.js")
        ]
    );
}

#[test]
fn test_out_dir_camel_case_alias() {
    let args = CliArgs::try_parse_from(["esdown", "--outDir", "out", "a.js"]).expect("alias");
    assert_eq!(args.out_dir.as_deref(), Some(std::path::Path::new("out")));
}

#[test]
fn test_rejects_unknown_policy() {
    assert!(CliArgs::try_parse_from(["esdown", "--unsupported-context", "ignore"]).is_err());
}

#[test]
fn test_policy_conversion() {
    assert_eq!(
        UnsupportedContext::Warn.to_policy(),
        UnsupportedContextPolicy::Warn
    );
    assert_eq!(
        UnsupportedContext::Error.to_policy(),
        UnsupportedContextPolicy::Error
    );
}
