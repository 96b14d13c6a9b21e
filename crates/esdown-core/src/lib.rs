//! One-call entry points for lowering destructuring in JavaScript source.
//!
//! Each run parses, binds and lowers a single file with its own arena,
//! binder and alteration buffer; `lower_sources` fans independent files
//! out over rayon.

pub use esdown_common::{Diagnostic, DiagnosticCategory};
pub use esdown_emitter::{LoweringOptions, UnsupportedContextPolicy};

use esdown_binder::BinderState;
use esdown_emitter::{LoweringPass, TransformContext};
use esdown_parser::ParserState;
use tracing::{debug, info_span};

/// Result of lowering one file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LowerOutput {
    pub file_name: String,
    /// Lowered text; `None` when the file failed to parse.
    pub output: Option<String>,
    /// Parse diagnostics, or the lowering pass's diagnostics.
    pub diagnostics: Vec<Diagnostic>,
    /// Replacements and insertions applied to the source.
    pub edits: usize,
}

impl LowerOutput {
    pub fn has_errors(&self) -> bool {
        self.diagnostics.iter().any(Diagnostic::is_error)
    }

    /// True when the output differs from `source`.
    pub fn changed(&self, source: &str) -> bool {
        self.output.as_deref().is_some_and(|output| output != source)
    }
}

/// A named source text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceInput {
    pub file_name: String,
    pub text: String,
}

impl SourceInput {
    pub fn new(file_name: impl Into<String>, text: impl Into<String>) -> Self {
        SourceInput {
            file_name: file_name.into(),
            text: text.into(),
        }
    }
}

/// Lower every destructuring site in `source`.
pub fn lower_source(file_name: &str, source: &str, options: &LoweringOptions) -> LowerOutput {
    let _span = info_span!("lower_source", file = file_name).entered();

    let mut parser = ParserState::new(file_name.to_string(), source.to_string());
    let root = parser.parse_source_file();
    if parser.has_errors() {
        let diagnostics = parser.take_diagnostics();
        debug!(errors = diagnostics.len(), "parse failed; no output");
        return LowerOutput {
            file_name: file_name.to_string(),
            output: None,
            diagnostics,
            edits: 0,
        };
    }
    let arena = parser.into_arena();

    let mut binder = BinderState::new();
    binder.bind_source_file(&arena, root);

    let ctx = TransformContext::new(file_name, source, options.clone());
    let ctx = LoweringPass::new(&arena, &mut binder, ctx).run(root);
    let edits = ctx.buffer.len();

    LowerOutput {
        file_name: file_name.to_string(),
        output: Some(ctx.buffer.apply()),
        diagnostics: ctx.diagnostics.into_diagnostics(),
        edits,
    }
}

/// Lower independent files in parallel. Results keep the input order.
pub fn lower_sources(inputs: &[SourceInput], options: &LoweringOptions) -> Vec<LowerOutput> {
    use rayon::iter::{IntoParallelRefIterator, ParallelIterator};

    inputs
        .par_iter()
        .map(|input| lower_source(&input.file_name, &input.text, options))
        .collect()
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod lib_tests;
