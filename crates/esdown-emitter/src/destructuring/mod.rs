//! Destructuring sites: context dispatch and assembly.
//!
//! A site is a top-level object/array pattern in a variable declarator or
//! on the left of `=`. `DestructuringLowering::lower_site` turns one site
//! into a list of `FlattenedBinding`s (via the unwinder) and renders the
//! replacement text for its declarator or assignment range. Nested
//! patterns are never sites of their own.

pub mod classifier;
mod unwinder;

use crate::alter::AlterationBuffer;
use crate::error::LoweringError;
use esdown_binder::ScopeQueries;
use esdown_parser::{NodeArena, NodeData, NodeIndex, Operator, VariableKind};
use tracing::debug;
use unwinder::Unwinder;

/// Syntactic position of a site.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SiteContext {
    /// `var|let|const <pattern> = <init>`
    Declaration(VariableKind),
    /// `<pattern> = <value>`
    Assignment,
}

/// One unit of the comma-joined output.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FlattenedBinding {
    pub text: String,
    /// The final element of an assignment, carrying the expression's value.
    pub is_trailing_expression_result: bool,
}

impl FlattenedBinding {
    pub fn binding(text: String) -> Self {
        FlattenedBinding {
            text,
            is_trailing_expression_result: false,
        }
    }

    pub fn trailing(text: String) -> Self {
        FlattenedBinding {
            text,
            is_trailing_expression_result: true,
        }
    }
}

/// A lowered site, ready to be written back.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LoweredSite {
    pub context: SiteContext,
    /// Range of the declarator or assignment expression being replaced.
    pub start: u32,
    pub end: u32,
    pub bindings: Vec<FlattenedBinding>,
    /// Wrap the assignment form in parentheses.
    pub parenthesize: bool,
    /// Temporaries acquired from the hoist scope.
    pub temps_allocated: usize,
}

impl LoweredSite {
    fn joined(&self) -> String {
        self.bindings
            .iter()
            .map(|binding| binding.text.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// The site as a standalone construct: `var a = o.a, b = o.b` for
    /// declarations, `(a = o.a, b = o.b, o)` for assignments.
    pub fn render(&self) -> String {
        match self.context {
            SiteContext::Declaration(kind) => format!("{} {}", kind.as_str(), self.joined()),
            SiteContext::Assignment => self.replacement_text(),
        }
    }

    /// Text that replaces `start..end`. The declaration keyword is already
    /// present in the source and is not repeated.
    pub fn replacement_text(&self) -> String {
        let joined = self.joined();
        if self.parenthesize {
            format!("({joined})")
        } else {
            joined
        }
    }
}

/// Where a pattern sits, as far as lowering is concerned.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PatternSite {
    Declaration {
        declaration: NodeIndex,
        kind: VariableKind,
        initializer: NodeIndex,
    },
    Assignment {
        assignment: NodeIndex,
        value: NodeIndex,
    },
    /// For-in/for-of head; `is_of` tells which.
    LoopHead { is_of: bool },
    Parameter,
    /// Inside another pattern; handled by the enclosing site.
    Nested,
    Other,
}

impl PatternSite {
    pub fn unsupported_context(self) -> Option<&'static str> {
        match self {
            PatternSite::LoopHead { is_of: false } => Some("a for-in head"),
            PatternSite::LoopHead { is_of: true } => Some("a for-of head"),
            PatternSite::Parameter => Some("a parameter list"),
            _ => None,
        }
    }
}

/// Classify the position of a pattern node.
pub fn classify_site(arena: &NodeArena, pattern: NodeIndex) -> PatternSite {
    let parent = arena.parent(pattern);
    match arena.get(parent).map(|n| &n.data) {
        Some(NodeData::VariableDeclaration { name, initializer }) if *name == pattern => {
            if let Some(is_of) = classifier::for_in_or_for_of_head(arena, parent) {
                return PatternSite::LoopHead { is_of };
            }
            match classifier::declaration_kind(arena, parent) {
                Some(kind) => PatternSite::Declaration {
                    declaration: parent,
                    kind,
                    initializer: *initializer,
                },
                None => PatternSite::Other,
            }
        }
        Some(NodeData::Assignment {
            left,
            operator: Operator::Assign,
            right,
        }) if *left == pattern => PatternSite::Assignment {
            assignment: parent,
            value: *right,
        },
        Some(NodeData::ForInOfStatement { .. }) => match classifier::for_in_or_for_of_head(arena, pattern) {
            Some(is_of) => PatternSite::LoopHead { is_of },
            None => PatternSite::Other,
        },
        Some(NodeData::FunctionDeclaration(_)) | Some(NodeData::FunctionExpression(_))
            if classifier::is_parameter_pattern(arena, pattern) =>
        {
            PatternSite::Parameter
        }
        Some(
            NodeData::BindingProperty { .. }
            | NodeData::ArrayPattern { .. }
            | NodeData::RestElement { .. },
        ) => PatternSite::Nested,
        _ => PatternSite::Other,
    }
}

/// Lowers one destructuring site against the current buffer contents.
pub struct DestructuringLowering<'a, S: ScopeQueries + ?Sized> {
    arena: &'a NodeArena,
    scopes: &'a mut S,
    buffer: &'a AlterationBuffer,
}

impl<'a, S: ScopeQueries + ?Sized> DestructuringLowering<'a, S> {
    pub fn new(arena: &'a NodeArena, scopes: &'a mut S, buffer: &'a AlterationBuffer) -> Self {
        DestructuringLowering {
            arena,
            scopes,
            buffer,
        }
    }

    /// Lower the site rooted at `pattern`.
    ///
    /// With `retain_temps`, temporaries are not returned to the scope's free
    /// list afterwards; used for sites nested inside another site's pattern,
    /// whose temporaries may be live while the enclosing site runs.
    pub fn lower_site(
        &mut self,
        pattern: NodeIndex,
        retain_temps: bool,
    ) -> Result<LoweredSite, LoweringError> {
        if !classifier::is_pattern(self.arena, pattern) {
            return Err(LoweringError::Internal(format!(
                "node {} is not a destructuring pattern",
                pattern.0
            )));
        }
        let site = classify_site(self.arena, pattern);
        if let Some(context) = site.unsupported_context() {
            return Err(LoweringError::UnsupportedContext { context });
        }

        let (context, range_node, value) = match site {
            PatternSite::Declaration {
                declaration,
                kind,
                initializer,
            } => {
                if initializer.is_none() {
                    return Err(LoweringError::MissingInitializer);
                }
                (SiteContext::Declaration(kind), declaration, initializer)
            }
            PatternSite::Assignment { assignment, value } => {
                (SiteContext::Assignment, assignment, value)
            }
            other => {
                return Err(LoweringError::Internal(format!(
                    "pattern {} is not a lowerable site ({other:?})",
                    pattern.0
                )));
            }
        };

        let Some(range) = self.arena.get(range_node) else {
            return Err(LoweringError::Internal("site node missing".to_string()));
        };
        let (start, end) = (range.pos, range.end);

        let scope = self.scopes.closest_hoist_scope(self.arena, pattern);
        let mut unwinder = Unwinder::new(
            self.arena,
            &mut *self.scopes,
            self.buffer,
            scope,
            context,
            pattern,
            retain_temps,
        );
        unwinder.unwind(pattern, value)?;
        let (bindings, temps_allocated) = unwinder.finish();

        let parenthesize = context == SiteContext::Assignment
            && !matches!(
                self.arena.parent_node(range_node).map(|n| &n.data),
                Some(NodeData::Parenthesized { .. })
            );

        debug!(
            start,
            context = ?context,
            bindings = bindings.len(),
            temps = temps_allocated,
            "lowered destructuring site"
        );

        Ok(LoweredSite {
            context,
            start,
            end,
            bindings,
            parenthesize,
            temps_allocated,
        })
    }
}

#[cfg(test)]
#[path = "tests/destructuring_tests.rs"]
mod destructuring_tests;
