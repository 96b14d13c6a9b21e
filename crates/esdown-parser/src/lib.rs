//! Parser for the ES2015 subset handled by esdown.
//!
//! This crate provides:
//! - `ScannerState` - tokenizer with automatic-semicolon-insertion support
//! - `ParserState` - recursive-descent parser producing a `NodeArena`
//! - `NodeArena` / `NodeIndex` - index-based AST storage with parent links

pub mod node;
pub use node::{
    AccessorKind, FunctionData, Node, NodeArena, NodeData, NodeIndex, NodeList, Operator,
    VariableKind, node_children,
};

pub mod scanner;
pub use scanner::{ScannerState, SyntaxKind};

pub mod parser;
pub use parser::{ParseFailure, ParserState};
