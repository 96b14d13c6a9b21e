//! Diagnostic logging for the esdown binary.
//!
//! Logging stays off unless `ESDOWN_LOG` (or, failing that, `RUST_LOG`)
//! holds a filter such as `debug` or `esdown_emitter=trace`.
//! `ESDOWN_LOG_FORMAT` selects the rendering: `text` (the default), `tree`
//! to nest unwinding events under their file span, or `json`.
//!
//! ```bash
//! ESDOWN_LOG=debug esdown app.js
//! ESDOWN_LOG=esdown_emitter=trace ESDOWN_LOG_FORMAT=tree esdown app.js
//! ```
//!
//! Events go to stderr; stdout is reserved for lowered code.

use std::io::IsTerminal;
use std::str::FromStr;

use tracing_subscriber::prelude::*;
use tracing_subscriber::util::TryInitError;
use tracing_subscriber::{EnvFilter, fmt};

pub const FILTER_VAR: &str = "ESDOWN_LOG";
pub const FALLBACK_FILTER_VAR: &str = "RUST_LOG";
pub const FORMAT_VAR: &str = "ESDOWN_LOG_FORMAT";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    #[default]
    Text,
    Tree,
    Json,
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "" | "text" => Ok(LogFormat::Text),
            "tree" => Ok(LogFormat::Tree),
            "json" => Ok(LogFormat::Json),
            other => Err(other.to_string()),
        }
    }
}

/// Logging requested through the environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogSettings {
    /// Filter directives, in `EnvFilter` syntax.
    pub filter: String,
    pub format: LogFormat,
    /// A format name that was not recognized; text output is used instead.
    pub unknown_format: Option<String>,
}

impl LogSettings {
    pub fn from_env() -> Option<LogSettings> {
        LogSettings::from_vars(|name| std::env::var(name).ok())
    }

    /// Settings from a variable lookup, or `None` when no filter is set.
    pub fn from_vars(lookup: impl Fn(&str) -> Option<String>) -> Option<LogSettings> {
        let filter = lookup(FILTER_VAR)
            .or_else(|| lookup(FALLBACK_FILTER_VAR))
            .map(|filter| filter.trim().to_string())
            .filter(|filter| !filter.is_empty())?;

        let (format, unknown_format) = match lookup(FORMAT_VAR).as_deref().map(str::parse) {
            None => (LogFormat::Text, None),
            Some(Ok(format)) => (format, None),
            Some(Err(name)) => (LogFormat::Text, Some(name)),
        };
        Some(LogSettings {
            filter,
            format,
            unknown_format,
        })
    }

    /// Invalid directives are skipped rather than rejected.
    pub fn env_filter(&self) -> EnvFilter {
        EnvFilter::builder().parse_lossy(&self.filter)
    }

    /// Install the global subscriber. Exactly one of the output layers is
    /// present; the others are `None`.
    pub fn install(&self) -> Result<(), TryInitError> {
        let tree = (self.format == LogFormat::Tree).then(|| {
            tracing_tree::HierarchicalLayer::new(2)
                .with_indent_lines(true)
                .with_deferred_spans(true)
                .with_targets(true)
        });
        let json = (self.format == LogFormat::Json)
            .then(|| fmt::layer().json().with_writer(std::io::stderr));
        let text = (self.format == LogFormat::Text).then(|| {
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_ansi(std::io::stderr().is_terminal())
        });

        tracing_subscriber::registry()
            .with(self.env_filter())
            .with(tree)
            .with(json)
            .with(text)
            .try_init()
    }
}

/// Start logging if the environment asks for it.
pub fn init_tracing() {
    let Some(settings) = LogSettings::from_env() else {
        return;
    };
    if settings.install().is_err() {
        return;
    }
    if let Some(name) = &settings.unknown_format {
        tracing::warn!(format = %name, "unknown ESDOWN_LOG_FORMAT; using text output");
    }
}
