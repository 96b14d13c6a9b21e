//! Diagnostic codes, message templates and the sink the lowering pass
//! reports into.

use crate::{Diagnostic, DiagnosticCategory};

pub mod diagnostic_codes {
    // Scanner / parser (1xxx)
    pub const UNEXPECTED_CHARACTER: u32 = 1001;
    pub const UNTERMINATED_STRING_LITERAL: u32 = 1002;
    pub const UNTERMINATED_COMMENT: u32 = 1003;
    pub const EXPECTED_TOKEN: u32 = 1005;
    pub const SETTER_PARAMETER_COUNT: u32 = 1049;
    pub const GETTER_HAS_PARAMETERS: u32 = 1054;
    pub const EXPRESSION_EXPECTED: u32 = 1109;
    pub const INVALID_DESTRUCTURING_TARGET: u32 = 1110;
    pub const REST_ELEMENT_MUST_BE_LAST: u32 = 1111;
    pub const UNSUPPORTED_SYNTAX: u32 = 1112;
    pub const MAXIMUM_NESTING_DEPTH_EXCEEDED: u32 = 1113;
    pub const INVALID_ASSIGNMENT_TARGET: u32 = 1114;
    pub const LINE_BREAK_NOT_PERMITTED: u32 = 1142;
    pub const UNTERMINATED_REGULAR_EXPRESSION_LITERAL: u32 = 1161;
    pub const CATCH_OR_FINALLY_EXPECTED: u32 = 1472;

    // Lowering (2xxx)
    pub const DESTRUCTURING_MUST_HAVE_AN_INITIALIZER: u32 = 2001;
    pub const DESTRUCTURING_CONTEXT_NOT_SUPPORTED: u32 = 2002;
    pub const INTERNAL_LOWERING_FAULT: u32 = 2003;
}

pub mod diagnostic_messages {
    pub const UNEXPECTED_CHARACTER: &str = "Invalid character '{0}'.";
    pub const UNTERMINATED_STRING_LITERAL: &str = "Unterminated string literal.";
    pub const UNTERMINATED_COMMENT: &str = "'*/' expected.";
    pub const EXPECTED_TOKEN: &str = "'{0}' expected.";
    pub const SETTER_PARAMETER_COUNT: &str = "A 'set' accessor must have exactly one parameter.";
    pub const GETTER_HAS_PARAMETERS: &str = "A 'get' accessor cannot have parameters.";
    pub const EXPRESSION_EXPECTED: &str = "Expression expected.";
    pub const INVALID_DESTRUCTURING_TARGET: &str = "Invalid destructuring assignment target.";
    pub const REST_ELEMENT_MUST_BE_LAST: &str = "A rest element must be last in a destructuring pattern.";
    pub const UNSUPPORTED_SYNTAX: &str = "'{0}' is not supported by this lowering pass.";
    pub const MAXIMUM_NESTING_DEPTH_EXCEEDED: &str = "Maximum nesting depth exceeded.";
    pub const INVALID_ASSIGNMENT_TARGET: &str =
        "The left-hand side of an assignment expression must be a variable or a property access.";
    pub const LINE_BREAK_NOT_PERMITTED: &str = "Line break not permitted here.";
    pub const UNTERMINATED_REGULAR_EXPRESSION_LITERAL: &str = "Unterminated regular expression literal.";
    pub const CATCH_OR_FINALLY_EXPECTED: &str = "'catch' or 'finally' expected.";

    pub const DESTRUCTURING_MUST_HAVE_AN_INITIALIZER: &str = "destructuring must have an initializer";
    pub const DESTRUCTURING_CONTEXT_NOT_SUPPORTED: &str =
        "destructuring in {0} is not lowered; the pattern is left unchanged";
    pub const INTERNAL_LOWERING_FAULT: &str = "internal error while lowering destructuring: {0}";
}

/// Receiver for diagnostics produced while lowering one file.
///
/// Failures are local: reporting never aborts the traversal.
pub trait DiagnosticSink {
    fn report(&mut self, diagnostic: Diagnostic);
}

/// Default sink: collects diagnostics in report order.
#[derive(Debug, Default, Clone)]
pub struct DiagnosticBag {
    diagnostics: Vec<Diagnostic>,
}

impl DiagnosticBag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn into_diagnostics(self) -> Vec<Diagnostic> {
        self.diagnostics
    }

    pub fn has_errors(&self) -> bool {
        self.diagnostics
            .iter()
            .any(|d| d.category == DiagnosticCategory::Error)
    }

    pub fn len(&self) -> usize {
        self.diagnostics.len()
    }

    pub fn is_empty(&self) -> bool {
        self.diagnostics.is_empty()
    }
}

impl DiagnosticSink for DiagnosticBag {
    fn report(&mut self, diagnostic: Diagnostic) {
        self.diagnostics.push(diagnostic);
    }
}

impl DiagnosticSink for Vec<Diagnostic> {
    fn report(&mut self, diagnostic: Diagnostic) {
        self.push(diagnostic);
    }
}
