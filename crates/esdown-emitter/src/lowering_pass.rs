//! Lowering pass: one traversal of the tree that rewrites every
//! destructuring site.
//!
//! # Order
//!
//! Expressions a site reads (the initializer or right-hand side, computed
//! keys, member targets) are visited before the site itself, so nested
//! sites are rewritten first and the enclosing site reads their lowered
//! text back through `AlterationBuffer::get`. Pattern nodes are never
//! visited as sites of their own; the unwinder consumes them.
//!
//! Temporary declarations for a function scope are inserted as soon as the
//! function body has been visited, before any enclosing site can cover the
//! function's text with a replacement.

use crate::destructuring::{DestructuringLowering, PatternSite, classifier, classify_site};
use crate::temp_declarations::insert_temp_declaration;
use crate::transform_context::TransformContext;
use esdown_binder::ScopeQueries;
use esdown_common::limits::MAX_AST_DEPTH;
use esdown_parser::{NodeArena, NodeData, NodeIndex, NodeList, Operator};
use tracing::{debug, error, warn};

pub struct LoweringPass<'a, S: ScopeQueries + ?Sized> {
    arena: &'a NodeArena,
    scopes: &'a mut S,
    ctx: TransformContext,
    /// Current recursion depth for stack overflow protection
    visit_depth: u32,
    /// > 0 while visiting expressions inside a pattern being lowered.
    pattern_expression_depth: u32,
    sites_lowered: usize,
}

impl<'a, S: ScopeQueries + ?Sized> LoweringPass<'a, S> {
    pub fn new(arena: &'a NodeArena, scopes: &'a mut S, ctx: TransformContext) -> Self {
        LoweringPass {
            arena,
            scopes,
            ctx,
            visit_depth: 0,
            pattern_expression_depth: 0,
            sites_lowered: 0,
        }
    }

    /// Lower every site under `source_file` and return the context holding
    /// the edits and diagnostics.
    pub fn run(mut self, source_file: NodeIndex) -> TransformContext {
        self.visit(source_file);
        if let Some(NodeData::SourceFile { statements }) =
            self.arena.get(source_file).map(|n| &n.data)
        {
            self.declare_temps(source_file, statements);
        }
        debug!(
            file = %self.ctx.file_name(),
            sites = self.sites_lowered,
            edits = self.ctx.buffer.len(),
            replacements = self.ctx.buffer.replacement_count(),
            diagnostics = self.ctx.diagnostics.len(),
            "lowering pass finished"
        );
        self.ctx
    }

    fn visit(&mut self, idx: NodeIndex) {
        if self.visit_depth >= MAX_AST_DEPTH {
            warn!(node = idx.0, "lowering depth limit reached; subtree left unchanged");
            return;
        }
        self.visit_depth += 1;

        let Some(node) = self.arena.get(idx) else {
            self.visit_depth -= 1;
            return;
        };

        match &node.data {
            NodeData::VariableDeclaration { name, initializer }
                if classifier::is_pattern(self.arena, *name) =>
            {
                self.visit(*initializer);
                self.visit_pattern_expressions(*name);
                self.lower(*name);
            }
            NodeData::Assignment {
                left,
                operator: Operator::Assign,
                right,
            } if classifier::is_pattern(self.arena, *left) => {
                self.visit(*right);
                self.visit_pattern_expressions(*left);
                self.lower(*left);
            }
            NodeData::ForInOfStatement {
                initializer,
                expression,
                statement,
                ..
            } => {
                if classifier::is_pattern(self.arena, *initializer) {
                    self.visit_pattern_expressions(*initializer);
                    self.lower(*initializer);
                } else {
                    self.visit(*initializer);
                }
                self.visit(*expression);
                self.visit(*statement);
            }
            NodeData::FunctionDeclaration(func) | NodeData::FunctionExpression(func) => {
                for &parameter in &func.parameters.nodes {
                    if classifier::is_pattern(self.arena, parameter) {
                        self.visit_pattern_expressions(parameter);
                        self.lower(parameter);
                    }
                }
                self.visit(func.body);
                if let Some(NodeData::Block { statements }) =
                    self.arena.get(func.body).map(|n| &n.data)
                {
                    self.declare_temps(idx, statements);
                }
            }
            NodeData::ObjectPattern { .. } | NodeData::ArrayPattern { .. } => {
                self.visit_pattern_expressions(idx);
            }
            _ => {
                for child in self.arena.children(idx) {
                    self.visit(child);
                }
            }
        }

        self.visit_depth -= 1;
    }

    /// Visit computed keys and member-access targets inside a pattern.
    fn visit_pattern_expressions(&mut self, pattern: NodeIndex) {
        self.pattern_expression_depth += 1;
        let mut stack = vec![pattern];
        while let Some(index) = stack.pop() {
            match self.arena.get(index).map(|n| &n.data) {
                Some(NodeData::ObjectPattern { properties: list })
                | Some(NodeData::ArrayPattern { elements: list }) => {
                    stack.extend(list.nodes.iter().rev().copied().filter(|i| i.is_some()));
                }
                Some(NodeData::BindingProperty {
                    key,
                    computed,
                    value,
                }) => {
                    if *computed {
                        self.visit(*key);
                    }
                    stack.push(*value);
                }
                Some(NodeData::RestElement { argument }) => stack.push(*argument),
                Some(NodeData::Identifier { .. }) | None => {}
                Some(_) => self.visit(index),
            }
        }
        self.pattern_expression_depth -= 1;
    }

    /// Lower one site, or report why it stays unchanged.
    fn lower(&mut self, pattern: NodeIndex) {
        let retain_temps = self.pattern_expression_depth > 0;
        let lowered = DestructuringLowering::new(self.arena, &mut *self.scopes, &self.ctx.buffer)
            .lower_site(pattern, retain_temps);

        let outcome = lowered.and_then(|site| {
            let text = site.replacement_text();
            self.ctx.buffer.replace(site.start, site.end, &text)
        });

        if let Err(failure) = outcome {
            let (start, end) = self.report_span(pattern);
            if failure.is_internal() {
                error!(start, error = %failure, "internal lowering failure");
            } else if matches!(
                classify_site(self.arena, pattern),
                PatternSite::LoopHead { .. } | PatternSite::Parameter
            ) {
                warn!(start, error = %failure, "destructuring left unchanged");
            }
            self.ctx.report(start, end, &failure);
            return;
        }
        self.sites_lowered += 1;
    }

    /// Span shown for a failed site: the declarator when there is one.
    fn report_span(&self, pattern: NodeIndex) -> (u32, u32) {
        let node = match classify_site(self.arena, pattern) {
            PatternSite::Declaration { declaration, .. } => declaration,
            _ => pattern,
        };
        self.arena.get(node).map_or((0, 0), |n| (n.pos, n.end))
    }

    fn declare_temps(&mut self, scope_node: NodeIndex, statements: &NodeList) {
        if !self.ctx.options.temp_declarations {
            return;
        }
        let scope = self.scopes.closest_hoist_scope(self.arena, scope_node);
        let temps = self.scopes.declared_temps(scope);
        if let Err(failure) =
            insert_temp_declaration(self.arena, &mut self.ctx.buffer, statements, &temps)
        {
            let (start, end) = self.arena.get(scope_node).map_or((0, 0), |n| (n.pos, n.end));
            self.ctx.report(start, end, &failure);
        }
    }
}

#[cfg(test)]
#[path = "tests/lowering_pass_tests.rs"]
mod lowering_pass_tests;
