//! `var _a, _b;` declarations for synthesized temporaries.

use crate::alter::AlterationBuffer;
use crate::error::LoweringError;
use esdown_parser::{NodeArena, NodeData, NodeIndex, NodeList};

fn is_directive(arena: &NodeArena, statement: NodeIndex) -> bool {
    let Some(NodeData::ExpressionStatement { expression }) = arena.get(statement).map(|n| &n.data)
    else {
        return false;
    };
    matches!(
        arena.get(*expression).map(|n| &n.data),
        Some(NodeData::StringLiteral { .. })
    )
}

/// Insert one declaration of `temps` before the first statement of `body`
/// that is not part of the directive prologue.
pub(crate) fn insert_temp_declaration(
    arena: &NodeArena,
    buffer: &mut AlterationBuffer,
    body: &NodeList,
    temps: &[String],
) -> Result<(), LoweringError> {
    if temps.is_empty() {
        return Ok(());
    }
    let declaration = format!("var {};", temps.join(", "));

    let first_statement = body
        .nodes
        .iter()
        .copied()
        .find(|&statement| !is_directive(arena, statement))
        .and_then(|statement| arena.get(statement));

    match first_statement {
        Some(statement) => {
            let offset = statement.pos;
            let source = buffer.source();
            let line_start = source
                .get(..offset as usize)
                .and_then(|before| before.rfind(['\n', '\r']))
                .map_or(0, |i| i + 1);
            let indent = source.get(line_start..offset as usize).unwrap_or_default();
            let text = if indent.chars().all(|c| c == ' ' || c == '\t') {
                format!("{declaration}\n{indent}")
            } else {
                format!("{declaration} ")
            };
            buffer.insert(offset, &text)
        }
        None => {
            // Only directives (or nothing) in the body: declare after them.
            let offset = body
                .nodes
                .last()
                .and_then(|&last| arena.get(last))
                .map_or(0, |last| last.end);
            let text = if offset == 0 {
                format!("{declaration}\n")
            } else {
                format!("\n{declaration}")
            };
            buffer.insert(offset, &text)
        }
    }
}
