use std::fmt;

/// Why a destructuring site was not rewritten.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LoweringError {
    /// A declaration pattern without an initializer.
    MissingInitializer,
    /// A pattern in a position the pass leaves alone (loop heads, parameters).
    UnsupportedContext { context: &'static str },
    /// An edit outside the source text or off a character boundary.
    InvalidRange { start: u32, end: u32 },
    /// An edit that partially overlaps, or lands inside, an earlier replacement.
    OverlappingEdit { start: u32, end: u32 },
    /// A broken invariant inside the unwinder. The site is skipped.
    Internal(String),
}

impl LoweringError {
    /// True for failures that indicate a bug rather than unsupported input.
    pub fn is_internal(&self) -> bool {
        matches!(
            self,
            LoweringError::InvalidRange { .. }
                | LoweringError::OverlappingEdit { .. }
                | LoweringError::Internal(_)
        )
    }
}

impl fmt::Display for LoweringError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoweringError::MissingInitializer => {
                write!(f, "destructuring must have an initializer")
            }
            LoweringError::UnsupportedContext { context } => {
                write!(f, "destructuring in {context} is not lowered")
            }
            LoweringError::InvalidRange { start, end } => {
                write!(f, "invalid edit range {start}..{end}")
            }
            LoweringError::OverlappingEdit { start, end } => {
                write!(f, "edit {start}..{end} overlaps an earlier replacement")
            }
            LoweringError::Internal(message) => write!(f, "{message}"),
        }
    }
}

impl std::error::Error for LoweringError {}
