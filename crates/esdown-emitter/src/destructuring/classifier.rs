//! Shape predicates over destructuring patterns and their surroundings.

use esdown_parser::{NodeArena, NodeData, NodeIndex, VariableKind};

pub fn is_object_pattern(arena: &NodeArena, node: NodeIndex) -> bool {
    matches!(
        arena.get(node).map(|n| &n.data),
        Some(NodeData::ObjectPattern { .. })
    )
}

pub fn is_array_pattern(arena: &NodeArena, node: NodeIndex) -> bool {
    matches!(
        arena.get(node).map(|n| &n.data),
        Some(NodeData::ArrayPattern { .. })
    )
}

pub fn is_pattern(arena: &NodeArena, node: NodeIndex) -> bool {
    is_object_pattern(arena, node) || is_array_pattern(arena, node)
}

/// Keyword of the list a `VariableDeclaration` belongs to.
pub fn declaration_kind(arena: &NodeArena, declaration: NodeIndex) -> Option<VariableKind> {
    match arena.parent_node(declaration).map(|n| &n.data) {
        Some(NodeData::VariableDeclarationList { kind, .. }) => Some(*kind),
        _ => None,
    }
}

pub fn is_var_const_let_declaration(arena: &NodeArena, declaration: NodeIndex) -> bool {
    declaration_kind(arena, declaration).is_some()
}

/// True when `node` (a declaration list, a declaration inside one, or an
/// assignment-form pattern) is the head of a for-in or for-of loop.
/// Returns the loop flavor as `Some(is_of)`.
pub fn for_in_or_for_of_head(arena: &NodeArena, node: NodeIndex) -> Option<bool> {
    let mut head = node;
    if matches!(
        arena.get(head).map(|n| &n.data),
        Some(NodeData::VariableDeclaration { .. })
    ) {
        head = arena.parent(head);
    }
    match arena.parent_node(head).map(|n| &n.data) {
        Some(NodeData::ForInOfStatement {
            is_of, initializer, ..
        }) if *initializer == head => Some(*is_of),
        _ => None,
    }
}

pub fn is_for_in_or_for_of_head(arena: &NodeArena, node: NodeIndex) -> bool {
    for_in_or_for_of_head(arena, node).is_some()
}

/// True for a pattern written directly in a function's parameter list.
pub fn is_parameter_pattern(arena: &NodeArena, pattern: NodeIndex) -> bool {
    match arena.parent_node(pattern).map(|n| &n.data) {
        Some(NodeData::FunctionDeclaration(func)) | Some(NodeData::FunctionExpression(func)) => {
            func.parameters.nodes.contains(&pattern)
        }
        _ => false,
    }
}

/// True when any property key in the pattern (at any depth) is computed.
pub fn has_computed_keys(arena: &NodeArena, pattern: NodeIndex) -> bool {
    let mut stack = vec![pattern];
    while let Some(index) = stack.pop() {
        match arena.get(index).map(|n| &n.data) {
            Some(NodeData::ObjectPattern { properties: list })
            | Some(NodeData::ArrayPattern { elements: list }) => {
                stack.extend(list.nodes.iter().copied().filter(|i| i.is_some()));
            }
            Some(NodeData::BindingProperty {
                computed, value, ..
            }) => {
                if *computed {
                    return true;
                }
                stack.push(*value);
            }
            Some(NodeData::RestElement { argument }) => stack.push(*argument),
            _ => {}
        }
    }
    false
}

/// True when `text` can follow a `.` in a member access.
pub fn is_identifier_name(text: &str) -> bool {
    let mut chars = text.chars();
    let Some(first) = chars.next() else {
        return false;
    };
    let start_ok = first == '_' || first == '$' || first.is_alphabetic();
    start_ok && chars.all(|c| c == '_' || c == '$' || c.is_alphanumeric())
}

/// Whether the value text must be parenthesized before a member accessor
/// is appended to it.
pub fn needs_parens_for_access(arena: &NodeArena, node: NodeIndex) -> bool {
    !matches!(
        arena.get(node).map(|n| &n.data),
        Some(
            NodeData::Identifier { .. }
                | NodeData::PropertyAccess { .. }
                | NodeData::ElementAccess { .. }
                | NodeData::Call { .. }
                | NodeData::Parenthesized { .. }
                | NodeData::ArrayLiteral { .. }
                | NodeData::ObjectLiteral { .. }
                | NodeData::StringLiteral { .. }
                | NodeData::RegularExpressionLiteral { .. }
                | NodeData::KeywordLiteral { .. }
        )
    )
}

pub fn is_sequence(arena: &NodeArena, node: NodeIndex) -> bool {
    matches!(
        arena.get(node).map(|n| &n.data),
        Some(NodeData::Sequence { .. })
    )
}

#[cfg(test)]
#[path = "tests/classifier_tests.rs"]
mod classifier_tests;
