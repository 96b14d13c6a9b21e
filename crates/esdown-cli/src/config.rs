use anyhow::{Context, Result, bail};
use serde::de::Error as _;
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use std::iter::Peekable;
use std::path::{Path, PathBuf};
use std::str::Chars;

use esdown_core::{LoweringOptions, UnsupportedContextPolicy};

pub const CONFIG_FILE_NAME: &str = "esdown.json";

/// `tempDeclarations` may be written as a bool or as `"true"` / `"false"`.
fn deserialize_flag<'de, D>(deserializer: D) -> Result<Option<bool>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Bool(flag)) => Ok(Some(flag)),
        Some(Value::String(text)) if text == "true" => Ok(Some(true)),
        Some(Value::String(text)) if text == "false" => Ok(Some(false)),
        Some(other) => Err(D::Error::custom(format!(
            "expected true or false, got {other}"
        ))),
    }
}

#[derive(Debug, Clone, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct EsdownConfig {
    #[serde(default)]
    pub unsupported_context: Option<String>,
    #[serde(default, deserialize_with = "deserialize_flag")]
    pub temp_declarations: Option<bool>,
    #[serde(default)]
    pub out_dir: Option<String>,
    #[serde(default)]
    pub files: Option<Vec<String>>,
}

/// Options after the config file is resolved against its directory.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolvedOptions {
    pub lowering: LoweringOptions,
    pub out_dir: Option<PathBuf>,
    pub files: Vec<PathBuf>,
}

/// Parse esdown.json. Comments, trailing commas and single-quoted strings
/// are accepted.
pub fn parse_config(source: &str) -> Result<EsdownConfig> {
    let config =
        serde_json::from_str(&to_strict_json(source)).context("failed to parse esdown.json")?;
    Ok(config)
}

pub fn load_config(path: &Path) -> Result<EsdownConfig> {
    let source = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read config: {}", path.display()))?;
    parse_config(&source).with_context(|| format!("failed to parse config: {}", path.display()))
}

/// Resolve relative paths in `config` against `base_dir`.
pub fn resolve_options(config: &EsdownConfig, base_dir: &Path) -> Result<ResolvedOptions> {
    let mut lowering = LoweringOptions::default();

    if let Some(policy) = config.unsupported_context.as_deref() {
        let Some(policy) = UnsupportedContextPolicy::parse(policy) else {
            bail!("unsupportedContext must be \"warn\" or \"error\", got \"{policy}\"");
        };
        lowering.unsupported_context = policy;
    }
    if let Some(temp_declarations) = config.temp_declarations {
        lowering.temp_declarations = temp_declarations;
    }

    Ok(ResolvedOptions {
        lowering,
        out_dir: config.out_dir.as_ref().map(|dir| base_dir.join(dir)),
        files: config
            .files
            .iter()
            .flatten()
            .map(|file| base_dir.join(file))
            .collect(),
    })
}

/// Nearest esdown.json in `cwd` or one of its ancestors.
pub fn find_config(cwd: &Path) -> Option<PathBuf> {
    cwd.ancestors()
        .map(|dir| dir.join(CONFIG_FILE_NAME))
        .find(|candidate| candidate.is_file())
}

/// Config path from `--config`, or discovered from `cwd` when absent.
pub fn resolve_config_path(cwd: &Path, explicit: Option<&Path>) -> Result<Option<PathBuf>> {
    let Some(explicit) = explicit else {
        return Ok(find_config(cwd));
    };

    let mut candidate = if explicit.is_absolute() {
        explicit.to_path_buf()
    } else {
        cwd.join(explicit)
    };
    if candidate.is_dir() {
        candidate = candidate.join(CONFIG_FILE_NAME);
    }
    if !candidate.is_file() {
        bail!("config file not found: {}", candidate.display());
    }
    Ok(Some(candidate))
}

/// Rewrite relaxed JSON as strict JSON in one pass. Comments are dropped
/// (their line breaks kept, so parse errors point at the right line),
/// trailing commas are removed and single-quoted strings are re-quoted.
fn to_strict_json(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();
    // Byte offset in `out` of a comma that may turn out to be trailing.
    let mut pending_comma: Option<usize> = None;

    while let Some(ch) = chars.next() {
        match ch {
            '"' | '\'' => {
                pending_comma = None;
                copy_string(ch, &mut chars, &mut out);
            }
            '/' if chars.peek() == Some(&'/') => {
                if chars.by_ref().any(|c| c == '\n') {
                    out.push('\n');
                }
            }
            '/' if chars.peek() == Some(&'*') => {
                chars.next();
                let mut previous = '\0';
                for c in chars.by_ref() {
                    if previous == '*' && c == '/' {
                        break;
                    }
                    if c == '\n' {
                        out.push('\n');
                    }
                    previous = c;
                }
            }
            ',' => {
                pending_comma = Some(out.len());
                out.push(',');
            }
            '}' | ']' => {
                if let Some(at) = pending_comma.take() {
                    out.remove(at);
                }
                out.push(ch);
            }
            c if c.is_whitespace() => out.push(c),
            c => {
                pending_comma = None;
                out.push(c);
            }
        }
    }
    out
}

/// Copy the rest of a string opened by `quote`, emitting it double-quoted.
fn copy_string(quote: char, chars: &mut Peekable<Chars<'_>>, out: &mut String) {
    out.push('"');
    while let Some(ch) = chars.next() {
        match ch {
            '\\' => match chars.next() {
                Some('\'') => out.push('\''),
                Some(escaped) => {
                    out.push('\\');
                    out.push(escaped);
                }
                None => out.push('\\'),
            },
            c if c == quote => break,
            // Only reachable inside a single-quoted string.
            '"' => out.push_str("\\\""),
            c => out.push(c),
        }
    }
    out.push('"');
}
