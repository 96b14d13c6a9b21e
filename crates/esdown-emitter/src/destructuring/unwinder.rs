//! Depth-first unwinding of a pattern into flat bindings.
//!
//! Each pattern level reads its value through one reference. The reference
//! is the value itself when it can be re-read safely, the value inlined once
//! when only one binding reads it, or a name assigned on first read: either
//! the last name the level declares (`var` only) or a temporary from the
//! hoist scope.

use super::classifier;
use super::{FlattenedBinding, SiteContext};
use crate::alter::AlterationBuffer;
use crate::error::LoweringError;
use esdown_binder::{ScopeId, ScopeQueries};
use esdown_common::limits::MAX_BINDING_PATTERN_DEPTH;
use esdown_parser::{NodeArena, NodeData, NodeIndex, VariableKind};
use rustc_hash::FxHashSet;
use tracing::trace;

/// Value a level reads from.
enum LevelValue {
    /// The site's right-hand side, read through the buffer.
    Source(NodeIndex),
    /// An access off the parent level's reference: `_a.b`, `o[0]`, `o.slice(1)`.
    Derived(String),
}

enum ValueShape {
    Identifier,
    /// Safe to append an accessor to; not safe to evaluate twice.
    Access,
    Opaque { wrap_for_access: bool, is_sequence: bool },
}

enum Element {
    Hole,
    Property { accessor: String, target: NodeIndex },
    Item { index: usize, target: NodeIndex },
    Rest { index: usize, target: NodeIndex },
}

impl Element {
    fn target(&self) -> Option<NodeIndex> {
        match self {
            Element::Hole => None,
            Element::Property { target, .. }
            | Element::Item { target, .. }
            | Element::Rest { target, .. } => Some(*target),
        }
    }

    fn accessor(&self) -> String {
        match self {
            Element::Hole => String::new(),
            Element::Property { accessor, .. } => accessor.clone(),
            Element::Item { index, .. } => format!("[{index}]"),
            Element::Rest { index, .. } => format!(".slice({index})"),
        }
    }
}

enum Holder {
    Temp,
    Local,
}

/// How a level reads its value.
enum Reads {
    /// Re-readable text (an identifier).
    Repeatable(String),
    /// Text that may be read exactly once.
    Once(Option<String>),
    /// `(name = value)` on first read, `name` afterwards.
    Assigned {
        first: Option<String>,
        name: String,
        holder: Holder,
    },
}

impl Reads {
    fn next_use(&mut self) -> Result<String, LoweringError> {
        match self {
            Reads::Repeatable(text) => Ok(text.clone()),
            Reads::Once(slot) => slot.take().ok_or_else(|| {
                LoweringError::Internal("single-use value was read twice".to_string())
            }),
            Reads::Assigned { first, name, .. } => {
                Ok(first.take().unwrap_or_else(|| name.clone()))
            }
        }
    }

    fn check_consumed(&self) -> Result<(), LoweringError> {
        match self {
            Reads::Assigned { first: Some(_), .. } => Err(LoweringError::Internal(
                "temporary assignment was never emitted".to_string(),
            )),
            _ => Ok(()),
        }
    }

    fn kind(&self) -> &'static str {
        match self {
            Reads::Repeatable(_) => "direct",
            Reads::Once(_) => "inline",
            Reads::Assigned {
                holder: Holder::Local,
                ..
            } => "local",
            Reads::Assigned {
                holder: Holder::Temp,
                ..
            } => "temp",
        }
    }
}

pub(super) struct Unwinder<'a, S: ScopeQueries + ?Sized> {
    arena: &'a NodeArena,
    scopes: &'a mut S,
    buffer: &'a AlterationBuffer,
    scope: ScopeId,
    context: SiteContext,
    retain_temps: bool,
    /// Local-name reuse is off when a computed key could read the name.
    has_computed_keys: bool,
    /// Local names currently holding an enclosing level's reference.
    reserved: FxHashSet<String>,
    bindings: Vec<FlattenedBinding>,
    temps_allocated: usize,
}

impl<'a, S: ScopeQueries + ?Sized> Unwinder<'a, S> {
    pub(super) fn new(
        arena: &'a NodeArena,
        scopes: &'a mut S,
        buffer: &'a AlterationBuffer,
        scope: ScopeId,
        context: SiteContext,
        pattern: NodeIndex,
        retain_temps: bool,
    ) -> Self {
        Unwinder {
            arena,
            scopes,
            buffer,
            scope,
            context,
            retain_temps,
            has_computed_keys: classifier::has_computed_keys(arena, pattern),
            reserved: FxHashSet::default(),
            bindings: Vec::new(),
            temps_allocated: 0,
        }
    }

    pub(super) fn unwind(&mut self, pattern: NodeIndex, value: NodeIndex) -> Result<(), LoweringError> {
        self.unwind_level(pattern, LevelValue::Source(value), true, 0)
    }

    pub(super) fn finish(self) -> (Vec<FlattenedBinding>, usize) {
        (self.bindings, self.temps_allocated)
    }

    fn node_text(&self, node: NodeIndex) -> Result<String, LoweringError> {
        let Some(n) = self.arena.get(node) else {
            return Err(LoweringError::Internal(format!("missing node {}", node.0)));
        };
        Ok(self.buffer.get(n.pos, n.end))
    }

    fn value_text(&self, value: LevelValue) -> Result<(String, ValueShape), LoweringError> {
        match value {
            LevelValue::Derived(text) => Ok((text, ValueShape::Access)),
            LevelValue::Source(node) => {
                if let Some(name) = self.arena.identifier_text(node) {
                    return Ok((name.to_string(), ValueShape::Identifier));
                }
                let text = self.node_text(node)?;
                let shape = ValueShape::Opaque {
                    wrap_for_access: classifier::needs_parens_for_access(self.arena, node),
                    is_sequence: classifier::is_sequence(self.arena, node),
                };
                Ok((text, shape))
            }
        }
    }

    fn elements(&self, pattern: NodeIndex) -> Result<Vec<Element>, LoweringError> {
        match self.arena.get(pattern).map(|n| &n.data) {
            Some(NodeData::ObjectPattern { properties }) => properties
                .nodes
                .iter()
                .map(|&property| self.property_element(property))
                .collect(),
            Some(NodeData::ArrayPattern { elements }) => {
                let count = elements.nodes.len();
                let mut out = Vec::with_capacity(count);
                for (index, &element) in elements.nodes.iter().enumerate() {
                    if element.is_none() {
                        out.push(Element::Hole);
                        continue;
                    }
                    match self.arena.get(element).map(|n| &n.data) {
                        Some(NodeData::RestElement { argument }) => {
                            if index + 1 != count {
                                return Err(LoweringError::Internal(
                                    "rest element is not last".to_string(),
                                ));
                            }
                            out.push(Element::Rest {
                                index,
                                target: *argument,
                            });
                        }
                        _ => out.push(Element::Item {
                            index,
                            target: element,
                        }),
                    }
                }
                Ok(out)
            }
            _ => Err(LoweringError::Internal(format!(
                "node {} is not a pattern",
                pattern.0
            ))),
        }
    }

    fn property_element(&self, property: NodeIndex) -> Result<Element, LoweringError> {
        let Some(NodeData::BindingProperty {
            key,
            computed,
            value,
        }) = self.arena.get(property).map(|n| &n.data)
        else {
            return Err(LoweringError::Internal(format!(
                "node {} is not a binding property",
                property.0
            )));
        };
        let accessor = self.property_accessor(*key, *computed, *value)?;
        Ok(Element::Property {
            accessor,
            target: *value,
        })
    }

    fn property_accessor(
        &self,
        key: NodeIndex,
        computed: bool,
        value: NodeIndex,
    ) -> Result<String, LoweringError> {
        if key.is_none() {
            return match self.arena.identifier_text(value) {
                Some(name) => Ok(format!(".{name}")),
                None => Err(LoweringError::Internal(
                    "shorthand property without an identifier".to_string(),
                )),
            };
        }
        if computed {
            return Ok(format!("[{}]", self.node_text(key)?));
        }
        match self.arena.get(key).map(|n| &n.data) {
            Some(NodeData::Identifier { text }) => Ok(format!(".{text}")),
            Some(NodeData::StringLiteral { value: Some(value) })
                if classifier::is_identifier_name(value) =>
            {
                Ok(format!(".{value}"))
            }
            Some(NodeData::StringLiteral { .. }) | Some(NodeData::NumericLiteral { .. }) => {
                Ok(format!("[{}]", self.node_text(key)?))
            }
            _ => Err(LoweringError::Internal(format!(
                "unexpected property key {}",
                key.0
            ))),
        }
    }

    fn target_text(&self, target: NodeIndex) -> Result<String, LoweringError> {
        match self.arena.identifier_text(target) {
            Some(name) => Ok(name.to_string()),
            None => self.node_text(target),
        }
    }

    /// Last name the level binds directly, if it may serve as the level's
    /// reference.
    fn local_free_candidate(&self, pattern: NodeIndex, elements: &[Element]) -> Option<String> {
        if self.context != SiteContext::Declaration(VariableKind::Var) || self.has_computed_keys {
            return None;
        }
        let last = elements.iter().rev().find_map(Element::target)?;
        let name = self.arena.identifier_text(last)?;
        let names = self.scopes.node_variable_names(self.arena, pattern);
        let declared_once = names.iter().filter(|n| n.as_str() == name).count() == 1;
        if declared_once && !self.reserved.contains(name) {
            Some(name.to_string())
        } else {
            None
        }
    }

    fn resolve_reference(
        &mut self,
        pattern: NodeIndex,
        elements: &[Element],
        value: LevelValue,
        consumers: usize,
    ) -> Result<Reads, LoweringError> {
        let (text, shape) = self.value_text(value)?;
        let is_sequence = match shape {
            ValueShape::Identifier => {
                let rebound = consumers > 1
                    && self
                        .scopes
                        .node_variable_names(self.arena, pattern)
                        .iter()
                        .any(|name| *name == text);
                if !rebound {
                    return Ok(Reads::Repeatable(text));
                }
                false
            }
            ValueShape::Access if consumers <= 1 => return Ok(Reads::Once(Some(text))),
            ValueShape::Opaque {
                wrap_for_access, ..
            } if consumers <= 1 => {
                let text = if wrap_for_access {
                    format!("({text})")
                } else {
                    text
                };
                return Ok(Reads::Once(Some(text)));
            }
            ValueShape::Access => false,
            ValueShape::Opaque { is_sequence, .. } => is_sequence,
        };

        let assigned = if is_sequence {
            format!("({text})")
        } else {
            text
        };
        if let Some(local) = self.local_free_candidate(pattern, elements) {
            self.reserved.insert(local.clone());
            return Ok(Reads::Assigned {
                first: Some(format!("({local} = {assigned})")),
                name: local,
                holder: Holder::Local,
            });
        }
        let temp = self.scopes.acquire_temp(self.scope);
        self.temps_allocated += 1;
        Ok(Reads::Assigned {
            first: Some(format!("({temp} = {assigned})")),
            name: temp,
            holder: Holder::Temp,
        })
    }

    fn release(&mut self, reads: &Reads) {
        match reads {
            Reads::Assigned {
                name,
                holder: Holder::Temp,
                ..
            } if !self.retain_temps => self.scopes.release_temp(self.scope, name),
            Reads::Assigned {
                name,
                holder: Holder::Local,
                ..
            } => {
                self.reserved.remove(name);
            }
            _ => {}
        }
    }

    fn unwind_level(
        &mut self,
        pattern: NodeIndex,
        value: LevelValue,
        is_top: bool,
        depth: u32,
    ) -> Result<(), LoweringError> {
        if depth >= MAX_BINDING_PATTERN_DEPTH {
            return Err(LoweringError::Internal(
                "destructuring pattern nested too deeply".to_string(),
            ));
        }

        let elements = self.elements(pattern)?;
        let bound = elements.iter().filter(|e| e.target().is_some()).count();
        let trailing = is_top && self.context == SiteContext::Assignment;

        if bound == 0 {
            return self.empty_level(value, is_top);
        }

        let consumers = bound + usize::from(trailing);
        let mut reads = self.resolve_reference(pattern, &elements, value, consumers)?;
        trace!(depth, consumers, reference = reads.kind(), "unwinding level");

        let result = self.unwind_elements(&elements, &mut reads, trailing, depth);
        self.release(&reads);
        result?;
        reads.check_consumed()
    }

    fn unwind_elements(
        &mut self,
        elements: &[Element],
        reads: &mut Reads,
        trailing: bool,
        depth: u32,
    ) -> Result<(), LoweringError> {
        for element in elements {
            let Some(target) = element.target() else {
                continue;
            };
            let source = format!("{}{}", reads.next_use()?, element.accessor());
            if classifier::is_pattern(self.arena, target) {
                self.unwind_level(target, LevelValue::Derived(source), false, depth + 1)?;
            } else {
                let target_text = self.target_text(target)?;
                self.bindings
                    .push(FlattenedBinding::binding(format!("{target_text} = {source}")));
            }
        }
        if trailing {
            let result = reads.next_use()?;
            self.bindings.push(FlattenedBinding::trailing(result));
        }
        Ok(())
    }

    /// A pattern that binds nothing still evaluates its value once.
    fn empty_level(&mut self, value: LevelValue, is_top: bool) -> Result<(), LoweringError> {
        let (text, shape) = self.value_text(value)?;
        let text = match shape {
            ValueShape::Opaque {
                is_sequence: true, ..
            } => format!("({text})"),
            _ => text,
        };
        match self.context {
            SiteContext::Declaration(_) => {
                let name = self.scopes.claim_name(self.scope);
                self.bindings
                    .push(FlattenedBinding::binding(format!("{name} = {text}")));
            }
            SiteContext::Assignment if is_top => {
                self.bindings.push(FlattenedBinding::trailing(text));
            }
            SiteContext::Assignment => self.bindings.push(FlattenedBinding::binding(text)),
        }
        Ok(())
    }
}
