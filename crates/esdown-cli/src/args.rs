use clap::{Parser, ValueEnum};
use std::path::PathBuf;

use esdown_core::UnsupportedContextPolicy;

/// CLI arguments for the esdown binary.
#[derive(Parser, Debug)]
#[command(
    name = "esdown",
    version,
    about = "Lower ES6 destructuring patterns to ES5 assignments"
)]
pub struct CliArgs {
    /// Write lowered files under this directory instead of printing them.
    #[arg(long = "out-dir", alias = "outDir")]
    pub out_dir: Option<PathBuf>,

    /// Path to esdown.json or a directory containing it.
    #[arg(short = 'c', long)]
    pub config: Option<PathBuf>,

    /// How to report patterns in for-in/for-of heads and parameter lists.
    #[arg(long = "unsupported-context", value_enum, ignore_case = true)]
    pub unsupported_context: Option<UnsupportedContext>,

    /// Do not insert `var` declarations for synthesized temporaries.
    #[arg(long = "no-temp-declarations")]
    pub no_temp_declarations: bool,

    /// Report files that would change without writing anything.
    #[arg(long)]
    pub check: bool,

    /// Enable color in diagnostic output.
    #[arg(long)]
    pub pretty: Option<bool>,

    /// Diagnostic report format.
    #[arg(long, value_enum, default_value_t = ReportFormat::Text)]
    pub format: ReportFormat,

    /// Input files, or directories searched for `.js` files.
    #[arg(value_name = "FILES")]
    pub files: Vec<PathBuf>,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, ValueEnum)]
pub enum UnsupportedContext {
    #[value(alias = "warning")]
    Warn,
    Error,
}

impl UnsupportedContext {
    pub fn to_policy(self) -> UnsupportedContextPolicy {
        match self {
            UnsupportedContext::Warn => UnsupportedContextPolicy::Warn,
            UnsupportedContext::Error => UnsupportedContextPolicy::Error,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, ValueEnum)]
pub enum ReportFormat {
    #[default]
    Text,
    Json,
}
