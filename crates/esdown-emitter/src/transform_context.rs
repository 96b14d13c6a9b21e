//! Per-run state of the lowering pass: options, the alteration buffer and
//! collected diagnostics.

use crate::alter::AlterationBuffer;
use crate::error::LoweringError;
use esdown_common::{
    Diagnostic, DiagnosticBag, DiagnosticSink, LineMap, diagnostic_codes, diagnostic_messages,
    format_message,
};
use tracing::error;

/// How patterns in unsupported positions (loop heads, parameters) are reported.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum UnsupportedContextPolicy {
    /// Leave the pattern unchanged and report a warning.
    #[default]
    Warn,
    /// Leave the pattern unchanged and report an error.
    Error,
}

impl UnsupportedContextPolicy {
    pub fn parse(text: &str) -> Option<Self> {
        match text.to_ascii_lowercase().as_str() {
            "warn" | "warning" => Some(UnsupportedContextPolicy::Warn),
            "error" => Some(UnsupportedContextPolicy::Error),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            UnsupportedContextPolicy::Warn => "warn",
            UnsupportedContextPolicy::Error => "error",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LoweringOptions {
    pub unsupported_context: UnsupportedContextPolicy,
    /// Insert `var _a, ...;` for synthesized temporaries at the top of each
    /// hoist scope. Turn off when another tool declares them.
    pub temp_declarations: bool,
}

impl Default for LoweringOptions {
    fn default() -> Self {
        LoweringOptions {
            unsupported_context: UnsupportedContextPolicy::Warn,
            temp_declarations: true,
        }
    }
}

/// Fresh state for lowering one file.
pub struct TransformContext {
    file_name: String,
    line_map: LineMap,
    pub buffer: AlterationBuffer,
    pub options: LoweringOptions,
    pub diagnostics: DiagnosticBag,
}

impl TransformContext {
    pub fn new(file_name: impl Into<String>, source: &str, options: LoweringOptions) -> Self {
        TransformContext {
            file_name: file_name.into(),
            line_map: LineMap::build(source),
            buffer: AlterationBuffer::new(source),
            options,
            diagnostics: DiagnosticBag::new(),
        }
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    /// Report a site that was not rewritten. `start..end` is the span shown
    /// to the user.
    pub fn report(&mut self, start: u32, end: u32, failure: &LoweringError) {
        let line = self.line_map.line_of(start);
        let length = end.saturating_sub(start);
        let diagnostic = match failure {
            LoweringError::MissingInitializer => Diagnostic::error(
                self.file_name.as_str(),
                start,
                length,
                line,
                diagnostic_messages::DESTRUCTURING_MUST_HAVE_AN_INITIALIZER,
                diagnostic_codes::DESTRUCTURING_MUST_HAVE_AN_INITIALIZER,
            ),
            LoweringError::UnsupportedContext { context } => {
                let message = format_message(
                    diagnostic_messages::DESTRUCTURING_CONTEXT_NOT_SUPPORTED,
                    &[*context],
                );
                let code = diagnostic_codes::DESTRUCTURING_CONTEXT_NOT_SUPPORTED;
                match self.options.unsupported_context {
                    UnsupportedContextPolicy::Warn => Diagnostic::warning(
                        self.file_name.as_str(),
                        start,
                        length,
                        line,
                        message,
                        code,
                    ),
                    UnsupportedContextPolicy::Error => Diagnostic::error(
                        self.file_name.as_str(),
                        start,
                        length,
                        line,
                        message,
                        code,
                    ),
                }
            }
            internal => {
                error!(
                    file = %self.file_name,
                    line,
                    error = %internal,
                    "destructuring site skipped"
                );
                Diagnostic::error(
                    self.file_name.as_str(),
                    start,
                    length,
                    line,
                    format_message(
                        diagnostic_messages::INTERNAL_LOWERING_FAULT,
                        &[&internal.to_string()],
                    ),
                    diagnostic_codes::INTERNAL_LOWERING_FAULT,
                )
            }
        };
        self.diagnostics.report(diagnostic);
    }
}
