use anyhow::{Context, Result, bail};
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use walkdir::WalkDir;

use crate::args::CliArgs;
use crate::config::{self, ResolvedOptions};
use esdown_common::Diagnostic;
use esdown_core::{SourceInput, lower_sources};

/// An input file and its path below `--out-dir`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputFile {
    pub path: PathBuf,
    pub relative: PathBuf,
}

#[derive(Debug, Default)]
pub struct RunResult {
    pub diagnostics: Vec<Diagnostic>,
    /// File name and text of every input, for diagnostic snippets.
    pub sources: Vec<(String, String)>,
    pub written: Vec<PathBuf>,
    /// Inputs whose lowered text differs from the source.
    pub changed: Vec<PathBuf>,
    /// Lowered text when no output directory is set. With several inputs,
    /// each file's text follows a `// <path>` line.
    pub stdout: String,
}

impl RunResult {
    pub fn has_errors(&self) -> bool {
        self.diagnostics.iter().any(Diagnostic::is_error)
    }
}

/// Config file values with command-line flags applied on top.
pub fn resolve_options(args: &CliArgs, cwd: &Path) -> Result<ResolvedOptions> {
    let mut resolved = match config::resolve_config_path(cwd, args.config.as_deref())? {
        Some(path) => {
            debug!(config = %path.display(), "using config file");
            let loaded = config::load_config(&path)?;
            let base_dir = path.parent().unwrap_or(cwd);
            config::resolve_options(&loaded, base_dir)
                .with_context(|| format!("invalid config: {}", path.display()))?
        }
        None => ResolvedOptions::default(),
    };

    if let Some(policy) = args.unsupported_context {
        resolved.lowering.unsupported_context = policy.to_policy();
    }
    if args.no_temp_declarations {
        resolved.lowering.temp_declarations = false;
    }
    if let Some(out_dir) = &args.out_dir {
        resolved.out_dir = Some(cwd.join(out_dir));
    }
    if !args.files.is_empty() {
        resolved.files = args.files.iter().map(|file| cwd.join(file)).collect();
    }
    Ok(resolved)
}

/// Expand directories into the `.js` files below them, in name order.
///
/// Files found in a directory keep their path below it. A file named
/// directly keeps its path below `base` when it lies there, and its bare
/// name otherwise. Two inputs that would land on the same output path are
/// an error.
pub fn collect_inputs(paths: &[PathBuf], base: &Path) -> Result<Vec<InputFile>> {
    let mut inputs: Vec<InputFile> = Vec::new();
    for path in paths {
        if path.is_dir() {
            for entry in WalkDir::new(path).sort_by_file_name() {
                let entry =
                    entry.with_context(|| format!("failed to walk {}", path.display()))?;
                let is_js = entry.path().extension().is_some_and(|ext| ext == "js");
                if !entry.file_type().is_file() || !is_js {
                    continue;
                }
                let relative = entry
                    .path()
                    .strip_prefix(path)
                    .unwrap_or(entry.path())
                    .to_path_buf();
                push_input(&mut inputs, entry.path().to_path_buf(), relative)?;
            }
        } else if path.is_file() {
            let relative = match path.strip_prefix(base) {
                Ok(below) => below.to_path_buf(),
                Err(_) => path
                    .file_name()
                    .map(PathBuf::from)
                    .unwrap_or_else(|| path.clone()),
            };
            push_input(&mut inputs, path.clone(), relative)?;
        } else {
            bail!("input not found: {}", path.display());
        }
    }
    Ok(inputs)
}

fn push_input(inputs: &mut Vec<InputFile>, path: PathBuf, relative: PathBuf) -> Result<()> {
    if let Some(earlier) = inputs.iter().find(|input| input.relative == relative) {
        if earlier.path == path {
            return Ok(());
        }
        bail!(
            "{} and {} both map to output path {}",
            earlier.path.display(),
            path.display(),
            relative.display()
        );
    }
    inputs.push(InputFile { path, relative });
    Ok(())
}

pub fn run(args: &CliArgs, cwd: &Path) -> Result<RunResult> {
    let options = resolve_options(args, cwd)?;
    if options.files.is_empty() {
        bail!("no input files; pass files on the command line or list them in esdown.json");
    }
    let inputs = collect_inputs(&options.files, cwd)?;
    let label_stdout = inputs.len() > 1;

    let mut sources = Vec::with_capacity(inputs.len());
    for input in &inputs {
        let text = std::fs::read_to_string(&input.path)
            .with_context(|| format!("failed to read {}", input.path.display()))?;
        sources.push(SourceInput::new(input.path.display().to_string(), text));
    }

    let outputs = lower_sources(&sources, &options.lowering);

    let mut result = RunResult::default();
    for ((input, source), lowered) in inputs.iter().zip(&sources).zip(outputs) {
        if lowered.changed(&source.text) {
            result.changed.push(input.path.clone());
        }
        result.diagnostics.extend(lowered.diagnostics);

        let Some(output) = lowered.output else {
            continue;
        };
        if args.check {
            continue;
        }
        match &options.out_dir {
            Some(out_dir) => {
                let target = out_dir.join(&input.relative);
                if let Some(parent) = target.parent() {
                    std::fs::create_dir_all(parent)
                        .with_context(|| format!("failed to create {}", parent.display()))?;
                }
                std::fs::write(&target, output)
                    .with_context(|| format!("failed to write {}", target.display()))?;
                result.written.push(target);
            }
            None => {
                if label_stdout {
                    result
                        .stdout
                        .push_str(&format!("// {}\n", input.relative.display()));
                }
                result.stdout.push_str(&output);
            }
        }
    }

    result.sources = sources
        .into_iter()
        .map(|source| (source.file_name, source.text))
        .collect();

    info!(
        files = inputs.len(),
        changed = result.changed.len(),
        diagnostics = result.diagnostics.len(),
        "esdown run finished"
    );
    Ok(result)
}
