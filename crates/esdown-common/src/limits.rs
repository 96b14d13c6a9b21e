//! Centralized recursion limits for the esdown pipeline.
//!
//! The parser, binder and lowering pass are all recursive over the tree.
//! These limits keep pathological input from overflowing the stack; each
//! stage reports or skips instead of crashing when a limit is hit.

/// Maximum nesting of expressions and statements the parser will descend into.
///
/// ```javascript
/// x = ((((((((((((((((((((((((1))))))))))))))))))))))));
/// ```
pub const MAX_PARSE_DEPTH: u32 = 500;

/// Maximum depth for AST traversal in the binder and the lowering visitor.
pub const MAX_AST_DEPTH: u32 = 500;

/// Maximum depth for binding pattern recursion.
///
/// ```javascript
/// var { a: { b: { c: { d: x } } } } = obj;
/// ```
pub const MAX_BINDING_PATTERN_DEPTH: u32 = 100;
