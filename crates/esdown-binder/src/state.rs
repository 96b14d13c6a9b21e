//! Hoist-scope construction.

use crate::temp_names::TempRegistry;
use crate::{ScopeId, ScopeQueries};
use esdown_common::limits::MAX_AST_DEPTH;
use esdown_parser::{NodeArena, NodeData, NodeIndex};
use rustc_hash::{FxHashMap, FxHashSet};
use smallvec::SmallVec;
use tracing::{debug, trace, warn};

/// The program or one function body.
#[derive(Debug)]
pub struct HoistScope {
    /// `SourceFile`, `FunctionDeclaration` or `FunctionExpression` node.
    pub node: NodeIndex,
    pub parent: Option<ScopeId>,
    /// Names declared by `var`/`let`/`const`, function declarations and
    /// parameters directly in this scope.
    pub declared_names: FxHashSet<String>,
    temps: TempRegistry,
}

impl HoistScope {
    fn new(node: NodeIndex, parent: Option<ScopeId>) -> Self {
        HoistScope {
            node,
            parent,
            declared_names: FxHashSet::default(),
            temps: TempRegistry::new(),
        }
    }

    pub fn temps(&self) -> &TempRegistry {
        &self.temps
    }
}

#[derive(Debug, Default)]
pub struct BinderState {
    scopes: Vec<HoistScope>,
    scope_of_node: FxHashMap<NodeIndex, ScopeId>,
    /// Every identifier spelled in the file; temporaries never take these names.
    file_identifiers: FxHashSet<String>,
}

impl BinderState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind one parsed file. The root scope is always `ScopeId::ROOT`.
    pub fn bind_source_file(&mut self, arena: &NodeArena, root: NodeIndex) {
        self.scopes.clear();
        self.scope_of_node.clear();
        self.file_identifiers.clear();

        for (_, node) in arena.iter() {
            if let NodeData::Identifier { text } = &node.data {
                self.file_identifiers.insert(text.clone());
            }
        }

        let root_scope = self.push_scope(root, None);
        self.bind_node(arena, root, root_scope, 0);

        debug!(
            scopes = self.scopes.len(),
            identifiers = self.file_identifiers.len(),
            "bound source file"
        );
    }

    fn push_scope(&mut self, node: NodeIndex, parent: Option<ScopeId>) -> ScopeId {
        let id = ScopeId(self.scopes.len() as u32);
        self.scopes.push(HoistScope::new(node, parent));
        self.scope_of_node.insert(node, id);
        id
    }

    fn declare(&mut self, scope: ScopeId, name: &str) {
        if let Some(hoist) = self.scopes.get_mut(scope.0 as usize) {
            hoist.declared_names.insert(name.to_string());
        }
    }

    fn declare_pattern(&mut self, arena: &NodeArena, scope: ScopeId, node: NodeIndex) {
        for name in pattern_bound_names(arena, node) {
            self.declare(scope, &name);
        }
    }

    fn bind_node(&mut self, arena: &NodeArena, index: NodeIndex, scope: ScopeId, depth: u32) {
        if depth > MAX_AST_DEPTH {
            warn!(node = index.0, "binder depth limit reached; skipping subtree");
            return;
        }
        let Some(node) = arena.get(index) else {
            return;
        };

        let child_scope = match &node.data {
            NodeData::FunctionDeclaration(func) => {
                if let Some(name) = arena.identifier_text(func.name) {
                    self.declare(scope, name);
                }
                let inner = self.push_scope(index, Some(scope));
                for &parameter in &func.parameters.nodes {
                    self.declare_pattern(arena, inner, parameter);
                }
                inner
            }
            NodeData::FunctionExpression(func) => {
                let inner = self.push_scope(index, Some(scope));
                if let Some(name) = arena.identifier_text(func.name) {
                    self.declare(inner, name);
                }
                for &parameter in &func.parameters.nodes {
                    self.declare_pattern(arena, inner, parameter);
                }
                inner
            }
            NodeData::VariableDeclaration { name, .. } => {
                self.declare_pattern(arena, scope, *name);
                scope
            }
            _ => scope,
        };

        for child in arena.children(index) {
            self.bind_node(arena, child, child_scope, depth + 1);
        }
    }

    #[cfg(test)]
    pub(crate) fn scopes(&self) -> &[HoistScope] {
        &self.scopes
    }

    pub fn scope(&self, id: ScopeId) -> Option<&HoistScope> {
        self.scopes.get(id.0 as usize)
    }

    #[cfg(test)]
    pub(crate) fn is_file_identifier(&self, name: &str) -> bool {
        self.file_identifiers.contains(name)
    }

    /// Slot of `id` in `scopes`, creating a detached root scope if nothing
    /// was bound yet.
    fn scope_slot(&mut self, id: ScopeId) -> usize {
        if self.scopes.is_empty() {
            self.scopes.push(HoistScope::new(NodeIndex::NONE, None));
        }
        let slot = id.0 as usize;
        if slot < self.scopes.len() { slot } else { 0 }
    }
}

impl ScopeQueries for BinderState {
    fn closest_hoist_scope(&self, arena: &NodeArena, node: NodeIndex) -> ScopeId {
        let mut current = node;
        while current.is_some() {
            if let Some(&scope) = self.scope_of_node.get(&current) {
                return scope;
            }
            current = arena.parent(current);
        }
        ScopeId::ROOT
    }

    fn acquire_temp(&mut self, scope: ScopeId) -> String {
        let slot = self.scope_slot(scope);
        let name = self.scopes[slot].temps.acquire(&self.file_identifiers);
        trace!(scope = slot, name = %name, "acquired temporary");
        name
    }

    fn release_temp(&mut self, scope: ScopeId, name: &str) {
        let slot = self.scope_slot(scope);
        if !self.scopes[slot].temps.release(name) {
            warn!(scope = slot, name, "released a temporary that was not in use");
        }
    }

    fn claim_name(&mut self, scope: ScopeId) -> String {
        let slot = self.scope_slot(scope);
        self.scopes[slot].temps.claim(&self.file_identifiers)
    }

    fn declared_temps(&self, scope: ScopeId) -> Vec<String> {
        self.scope(scope)
            .map(|hoist| hoist.temps.declared().to_vec())
            .unwrap_or_default()
    }

    fn node_variable_names(&self, arena: &NodeArena, node: NodeIndex) -> Vec<String> {
        pattern_bound_names(arena, node)
    }
}

/// Identifiers bound by a pattern, in source order. Member-access targets
/// bind no name.
pub fn pattern_bound_names(arena: &NodeArena, node: NodeIndex) -> Vec<String> {
    let mut names = Vec::new();
    let mut stack: SmallVec<[NodeIndex; 8]> = SmallVec::new();
    stack.push(node);
    while let Some(index) = stack.pop() {
        let Some(current) = arena.get(index) else {
            continue;
        };
        match &current.data {
            NodeData::Identifier { text } => names.push(text.clone()),
            NodeData::ObjectPattern { properties: list } | NodeData::ArrayPattern { elements: list } => {
                stack.extend(list.nodes.iter().rev().copied().filter(|i| i.is_some()));
            }
            NodeData::BindingProperty { value, .. } => stack.push(*value),
            NodeData::RestElement { argument } => stack.push(*argument),
            _ => {}
        }
    }
    names
}

#[cfg(test)]
#[path = "tests/state_tests.rs"]
mod state_tests;
