use crate::args::CliArgs;
use crate::driver::*;
use clap::Parser;
use std::fs;
use std::path::{Path, PathBuf};

fn args(extra: &[&str]) -> CliArgs {
    let mut argv = vec!["esdown"];
    argv.extend_from_slice(extra);
    CliArgs::try_parse_from(argv).expect("args should parse")
}

fn write(root: &Path, relative: &str, text: &str) -> PathBuf {
    let path = root.join(relative);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("create dirs");
    }
    fs::write(&path, text).expect("write file");
    path
}

#[test]
fn test_single_file_goes_to_stdout() {
    let dir = tempfile::tempdir().expect("temp dir");
    write(dir.path(), "a.js", "var [x, y] = pair;\n");

    let result = run(&args(&["a.js"]), dir.path()).expect("run");
    assert_eq!(result.stdout, "var x = pair[0], y = pair[1];\n");
    assert!(result.written.is_empty());
    assert!(!result.has_errors());
    assert_eq!(result.changed, vec![dir.path().join("a.js")]);
}

#[test]
fn test_directory_is_mirrored_into_out_dir() {
    let dir = tempfile::tempdir().expect("temp dir");
    write(dir.path(), "src/a.js", "var {a} = o;\n");
    write(dir.path(), "src/lib/b.js", "let {b, c} = f();\n");
    write(dir.path(), "src/readme.txt", "var {a} = o;\n");

    let result = run(&args(&["--out-dir", "dist", "src"]), dir.path()).expect("run");
    assert!(result.stdout.is_empty());
    assert_eq!(result.written.len(), 2);

    let a = fs::read_to_string(dir.path().join("dist/a.js")).expect("a.js written");
    assert_eq!(a, "var a = o.a;\n");
    let b = fs::read_to_string(dir.path().join("dist/lib/b.js")).expect("b.js written");
    assert_eq!(b, "var _a;\nlet b = (_a = f()).b, c = _a.c;\n");
    assert!(!dir.path().join("dist/readme.txt").exists());
}

#[test]
fn test_check_mode_writes_nothing() {
    let dir = tempfile::tempdir().expect("temp dir");
    write(dir.path(), "a.js", "var {a} = o;\n");
    write(dir.path(), "b.js", "var a = o.a;\n");

    let result = run(&args(&["--check", "--out-dir", "dist", "a.js", "b.js"]), dir.path())
        .expect("run");
    assert_eq!(result.changed, vec![dir.path().join("a.js")]);
    assert!(result.written.is_empty());
    assert!(result.stdout.is_empty());
    assert!(!dir.path().join("dist").exists());
}

#[test]
fn test_config_file_supplies_files_and_options() {
    let dir = tempfile::tempdir().expect("temp dir");
    write(
        dir.path(),
        "esdown.json",
        r#"{
            // loops are not allowed here
            "files": ["src/loop.js"],
            "unsupportedContext": "error",
        }"#,
    );
    write(dir.path(), "src/loop.js", "for (var [k, v] of m) {}\n");

    let result = run(&args(&[]), dir.path()).expect("run");
    assert!(result.has_errors());
    assert_eq!(result.stdout, "for (var [k, v] of m) {}\n");
}

#[test]
fn test_flags_override_config() {
    let dir = tempfile::tempdir().expect("temp dir");
    write(
        dir.path(),
        "conf/esdown.json",
        r#"{"unsupportedContext": "error", "tempDeclarations": true}"#,
    );
    write(dir.path(), "a.js", "let {a, b} = f();\nfor (var [k] in o) {}\n");

    let result = run(
        &args(&[
            "--config",
            "conf",
            "--unsupported-context",
            "warn",
            "--no-temp-declarations",
            "a.js",
        ]),
        dir.path(),
    )
    .expect("run");
    assert!(!result.has_errors());
    assert_eq!(result.diagnostics.len(), 1);
    assert_eq!(
        result.stdout,
        "let a = (_a = f()).a, b = _a.b;\nfor (var [k] in o) {}\n"
    );
}

#[test]
fn test_parse_error_skips_output() {
    let dir = tempfile::tempdir().expect("temp dir");
    write(dir.path(), "bad.js", "var {a} = ;\n");
    write(dir.path(), "good.js", "var [b] = c;\n");

    let result = run(&args(&["--out-dir", "out", "bad.js", "good.js"]), dir.path()).expect("run");
    assert!(result.has_errors());
    assert!(!dir.path().join("out/bad.js").exists());
    assert_eq!(
        fs::read_to_string(dir.path().join("out/good.js")).expect("good.js written"),
        "var b = c[0];\n"
    );
    assert_eq!(result.sources.len(), 2);
}

#[test]
fn test_missing_input_is_an_error() {
    let dir = tempfile::tempdir().expect("temp dir");
    let err = run(&args(&["missing.js"]), dir.path()).expect_err("missing input");
    assert!(err.to_string().contains("input not found"));
}

#[test]
fn test_no_inputs_is_an_error() {
    let dir = tempfile::tempdir().expect("temp dir");
    assert!(run(&args(&[]), dir.path()).is_err());
}

#[test]
fn test_collect_inputs_sorts_directory_entries() {
    let dir = tempfile::tempdir().expect("temp dir");
    write(dir.path(), "b.js", "");
    write(dir.path(), "a.js", "");
    write(dir.path(), "sub/c.js", "");

    let inputs = collect_inputs(&[dir.path().to_path_buf()], dir.path()).expect("collect");
    let relative: Vec<PathBuf> = inputs.into_iter().map(|input| input.relative).collect();
    assert_eq!(
        relative,
        vec![
            PathBuf::from("a.js"),
            PathBuf::from("b.js"),
            PathBuf::from("sub/c.js")
        ]
    );
}

#[test]
fn test_listed_files_keep_their_directories() {
    let dir = tempfile::tempdir().expect("temp dir");
    write(dir.path(), "a/x.js", "var [p] = q;\n");
    write(dir.path(), "b/x.js", "var {r} = s;\n");

    let result = run(&args(&["--out-dir", "dist", "a/x.js", "b/x.js"]), dir.path()).expect("run");
    assert_eq!(result.written.len(), 2);
    assert_eq!(
        fs::read_to_string(dir.path().join("dist/a/x.js")).expect("a/x.js written"),
        "var p = q[0];\n"
    );
    assert_eq!(
        fs::read_to_string(dir.path().join("dist/b/x.js")).expect("b/x.js written"),
        "var r = s.r;\n"
    );
}

#[test]
fn test_several_files_on_stdout_are_labelled() {
    let dir = tempfile::tempdir().expect("temp dir");
    write(dir.path(), "a.js", "var [x] = p;\n");
    write(dir.path(), "lib/b.js", "var {y} = q;\n");

    let result = run(&args(&["a.js", "lib/b.js"]), dir.path()).expect("run");
    assert_eq!(
        result.stdout,
        "// a.js\nvar x = p[0];\n// lib/b.js\nvar y = q.y;\n"
    );
}

#[test]
fn test_colliding_output_paths_are_rejected() {
    let dir = tempfile::tempdir().expect("temp dir");
    write(dir.path(), "one/x.js", "");
    write(dir.path(), "two/x.js", "");

    let err = run(&args(&["--out-dir", "dist", "one", "two"]), dir.path())
        .expect_err("both directories hold x.js");
    assert!(err.to_string().contains("both map to output path x.js"), "{err}");
    assert!(!dir.path().join("dist").exists());
}

#[test]
fn test_file_outside_base_uses_its_name() {
    let project = tempfile::tempdir().expect("temp dir");
    let elsewhere = tempfile::tempdir().expect("temp dir");
    let file = write(elsewhere.path(), "deep/z.js", "");

    let inputs = collect_inputs(&[file.clone()], project.path()).expect("collect");
    assert_eq!(
        inputs,
        vec![InputFile {
            path: file,
            relative: PathBuf::from("z.js"),
        }]
    );
}
