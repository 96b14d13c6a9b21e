//! Binder for the esdown lowering pass.
//!
//! Builds the hoist-scope tree of a parsed file (the program plus one scope
//! per function), records the names declared in each scope and every
//! identifier spelled anywhere in the file, and owns the per-scope registry
//! of synthesized temporaries.

mod state;
pub use state::{BinderState, HoistScope, pattern_bound_names};

mod temp_names;
pub use temp_names::{TempRegistry, temp_name};

use esdown_parser::{NodeArena, NodeIndex};

/// Identifier of a hoist scope within one `BinderState`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ScopeId(pub u32);

impl ScopeId {
    /// The program scope. Always present after binding.
    pub const ROOT: ScopeId = ScopeId(0);
}

/// Scope questions the lowering pass asks while rewriting one site.
pub trait ScopeQueries {
    /// Nearest enclosing function body or program of `node`.
    fn closest_hoist_scope(&self, arena: &NodeArena, node: NodeIndex) -> ScopeId;

    /// Take a temporary name from the scope's free list, or mint a new one.
    /// Every name ever handed out is declared once at the top of the scope.
    fn acquire_temp(&mut self, scope: ScopeId) -> String;

    /// Return a temporary to the scope's free list.
    fn release_temp(&mut self, scope: ScopeId, name: &str);

    /// Mint a unique name that is never handed out again and is not added
    /// to the scope's temporary declarations; the caller declares it.
    fn claim_name(&mut self, scope: ScopeId) -> String;

    /// Every temporary handed out in `scope`, in minting order.
    fn declared_temps(&self, scope: ScopeId) -> Vec<String>;

    /// Names bound by a pattern (or a single identifier), in source order.
    fn node_variable_names(&self, arena: &NodeArena, node: NodeIndex) -> Vec<String>;
}
