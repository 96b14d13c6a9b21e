//! AST node storage.
//!
//! Nodes live contiguously in a `NodeArena` and reference each other by
//! `NodeIndex`. The tree is read-only once parsing finishes. Parent links are
//! kept in a side table of the arena rather than inside the nodes, so a node
//! never owns or points back at its parent.

use smallvec::SmallVec;

/// Index of a node in its `NodeArena`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeIndex(pub u32);

impl NodeIndex {
    pub const NONE: NodeIndex = NodeIndex(u32::MAX);

    pub fn is_none(self) -> bool {
        self == Self::NONE
    }

    pub fn is_some(self) -> bool {
        self != Self::NONE
    }
}

/// An ordered list of child nodes. `NodeIndex::NONE` entries mark array holes.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct NodeList {
    pub nodes: Vec<NodeIndex>,
}

impl NodeList {
    pub fn new(nodes: Vec<NodeIndex>) -> Self {
        NodeList { nodes }
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

/// Declaration keyword of a variable declaration list.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum VariableKind {
    Var,
    Let,
    Const,
}

impl VariableKind {
    pub fn as_str(self) -> &'static str {
        match self {
            VariableKind::Var => "var",
            VariableKind::Let => "let",
            VariableKind::Const => "const",
        }
    }
}

/// Binary, assignment and unary operators.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Operator {
    Assign,
    AddAssign,
    SubtractAssign,
    MultiplyAssign,
    DivideAssign,
    RemainderAssign,
    LeftShiftAssign,
    RightShiftAssign,
    UnsignedRightShiftAssign,
    BitwiseAndAssign,
    BitwiseOrAssign,
    BitwiseXorAssign,
    LogicalOr,
    LogicalAnd,
    BitwiseOr,
    BitwiseXor,
    BitwiseAnd,
    Equal,
    NotEqual,
    StrictEqual,
    StrictNotEqual,
    LessThan,
    GreaterThan,
    LessThanEqual,
    GreaterThanEqual,
    InstanceOf,
    In,
    LeftShift,
    RightShift,
    UnsignedRightShift,
    Add,
    Subtract,
    Multiply,
    Divide,
    Remainder,
    Not,
    BitwiseNot,
    Negate,
    Plus,
    TypeOf,
    Void,
    Delete,
    Increment,
    Decrement,
}

/// `get` or `set` in an object literal.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AccessorKind {
    Get,
    Set,
}

/// Data shared by function declarations and function expressions.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FunctionData {
    /// Identifier, or `NONE` for anonymous function expressions.
    pub name: NodeIndex,
    /// Identifiers or binding patterns.
    pub parameters: NodeList,
    /// Always a `Block`.
    pub body: NodeIndex,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum NodeData {
    SourceFile {
        statements: NodeList,
    },

    // Statements
    VariableStatement {
        declaration_list: NodeIndex,
    },
    VariableDeclarationList {
        kind: VariableKind,
        declarations: NodeList,
    },
    VariableDeclaration {
        /// Identifier or binding pattern.
        name: NodeIndex,
        initializer: NodeIndex,
    },
    FunctionDeclaration(FunctionData),
    ExpressionStatement {
        expression: NodeIndex,
    },
    Block {
        statements: NodeList,
    },
    IfStatement {
        condition: NodeIndex,
        then_statement: NodeIndex,
        else_statement: NodeIndex,
    },
    ForStatement {
        /// Variable declaration list, expression, or `NONE`.
        initializer: NodeIndex,
        condition: NodeIndex,
        incrementor: NodeIndex,
        statement: NodeIndex,
    },
    ForInOfStatement {
        is_of: bool,
        /// Variable declaration list, binding pattern or assignment target.
        initializer: NodeIndex,
        expression: NodeIndex,
        statement: NodeIndex,
    },
    WhileStatement {
        condition: NodeIndex,
        statement: NodeIndex,
    },
    DoStatement {
        statement: NodeIndex,
        condition: NodeIndex,
    },
    SwitchStatement {
        expression: NodeIndex,
        /// `CaseClause` nodes.
        clauses: NodeList,
    },
    CaseClause {
        /// `NONE` for the `default` clause.
        expression: NodeIndex,
        statements: NodeList,
    },
    TryStatement {
        try_block: NodeIndex,
        /// `CatchClause` or `NONE`.
        catch_clause: NodeIndex,
        finally_block: NodeIndex,
    },
    CatchClause {
        /// Identifier.
        variable: NodeIndex,
        block: NodeIndex,
    },
    ThrowStatement {
        expression: NodeIndex,
    },
    LabeledStatement {
        label: NodeIndex,
        statement: NodeIndex,
    },
    WithStatement {
        expression: NodeIndex,
        statement: NodeIndex,
    },
    ReturnStatement {
        expression: NodeIndex,
    },
    BreakStatement {
        label: NodeIndex,
    },
    ContinueStatement {
        label: NodeIndex,
    },
    DebuggerStatement,
    EmptyStatement,

    // Expressions
    Identifier {
        text: String,
    },
    NumericLiteral {
        text: String,
    },
    StringLiteral {
        /// Cooked value, without quotes. `None` when an escape sequence
        /// could not be decoded.
        value: Option<String>,
    },
    RegularExpressionLiteral {
        /// Source text including slashes and flags.
        text: String,
    },
    /// `this`, `null`, `true`, `false`.
    KeywordLiteral {
        text: &'static str,
    },
    ArrayLiteral {
        elements: NodeList,
    },
    ObjectLiteral {
        properties: NodeList,
    },
    /// `key: value` inside an object literal.
    PropertyAssignment {
        key: NodeIndex,
        computed: bool,
        initializer: NodeIndex,
    },
    /// `get key() {}` or `set key(v) {}` inside an object literal. The
    /// parameter list and body are held by a `FunctionExpression`.
    AccessorProperty {
        kind: AccessorKind,
        key: NodeIndex,
        computed: bool,
        function: NodeIndex,
    },
    /// `name` inside an object literal.
    ShorthandPropertyAssignment {
        name: NodeIndex,
    },
    SpreadElement {
        expression: NodeIndex,
    },
    PropertyAccess {
        expression: NodeIndex,
        name: NodeIndex,
    },
    ElementAccess {
        expression: NodeIndex,
        argument: NodeIndex,
    },
    Call {
        expression: NodeIndex,
        arguments: NodeList,
    },
    New {
        expression: NodeIndex,
        arguments: NodeList,
    },
    Parenthesized {
        expression: NodeIndex,
    },
    Sequence {
        expressions: NodeList,
    },
    Assignment {
        left: NodeIndex,
        operator: Operator,
        right: NodeIndex,
    },
    Binary {
        left: NodeIndex,
        operator: Operator,
        right: NodeIndex,
    },
    Conditional {
        condition: NodeIndex,
        when_true: NodeIndex,
        when_false: NodeIndex,
    },
    PrefixUnary {
        operator: Operator,
        operand: NodeIndex,
    },
    PostfixUnary {
        operand: NodeIndex,
        operator: Operator,
    },
    FunctionExpression(FunctionData),

    // Patterns
    ObjectPattern {
        /// `BindingProperty` nodes.
        properties: NodeList,
    },
    ArrayPattern {
        /// Targets, nested patterns, `RestElement`, or `NONE` for holes.
        elements: NodeList,
    },
    BindingProperty {
        /// Identifier, string or numeric literal, or any expression when computed.
        /// `NONE` for shorthand properties, whose key is the target's own name.
        key: NodeIndex,
        computed: bool,
        /// Target or nested pattern.
        value: NodeIndex,
    },
    RestElement {
        argument: NodeIndex,
    },
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Node {
    /// Byte offset of the first token of the node.
    pub pos: u32,
    /// Byte offset just past the last token of the node.
    pub end: u32,
    pub data: NodeData,
}

impl Node {
    pub fn is_pattern(&self) -> bool {
        matches!(
            self.data,
            NodeData::ObjectPattern { .. } | NodeData::ArrayPattern { .. }
        )
    }

    pub fn is_identifier(&self) -> bool {
        matches!(self.data, NodeData::Identifier { .. })
    }

    pub fn width(&self) -> u32 {
        self.end.saturating_sub(self.pos)
    }
}

/// Arena-based storage for AST nodes.
#[derive(Debug, Default)]
pub struct NodeArena {
    nodes: Vec<Node>,
    parents: Vec<NodeIndex>,
}

impl NodeArena {
    pub fn new() -> NodeArena {
        NodeArena::default()
    }

    /// Add a node and record it as the parent of its children.
    pub fn add(&mut self, pos: u32, end: u32, data: NodeData) -> NodeIndex {
        let index = NodeIndex(self.nodes.len() as u32);
        let node = Node { pos, end, data };
        for child in node_children(&node) {
            if let Some(slot) = self.parents.get_mut(child.0 as usize) {
                *slot = index;
            }
        }
        self.nodes.push(node);
        self.parents.push(NodeIndex::NONE);
        index
    }

    /// Replace the data of an existing node, keeping its range and parent.
    ///
    /// Used by the parser when an object/array literal turns out to be an
    /// assignment target.
    pub fn reinterpret(&mut self, index: NodeIndex, data: NodeData) {
        let Some(node) = self.nodes.get_mut(index.0 as usize) else {
            return;
        };
        node.data = data;
        let children = node_children(node);
        for child in children {
            if let Some(slot) = self.parents.get_mut(child.0 as usize) {
                *slot = index;
            }
        }
    }

    /// Get a node by index
    pub fn get(&self, index: NodeIndex) -> Option<&Node> {
        if index.is_none() {
            None
        } else {
            self.nodes.get(index.0 as usize)
        }
    }

    /// Parent of a node, or `NONE` for the root.
    pub fn parent(&self, index: NodeIndex) -> NodeIndex {
        if index.is_none() {
            return NodeIndex::NONE;
        }
        self.parents
            .get(index.0 as usize)
            .copied()
            .unwrap_or(NodeIndex::NONE)
    }

    pub fn parent_node(&self, index: NodeIndex) -> Option<&Node> {
        self.get(self.parent(index))
    }

    pub fn children(&self, index: NodeIndex) -> SmallVec<[NodeIndex; 4]> {
        self.get(index).map(node_children).unwrap_or_default()
    }

    pub fn identifier_text(&self, index: NodeIndex) -> Option<&str> {
        match &self.get(index)?.data {
            NodeData::Identifier { text } => Some(text),
            _ => None,
        }
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (NodeIndex, &Node)> {
        self.nodes
            .iter()
            .enumerate()
            .map(|(i, node)| (NodeIndex(i as u32), node))
    }
}

fn push_some(out: &mut SmallVec<[NodeIndex; 4]>, index: NodeIndex) {
    if index.is_some() {
        out.push(index);
    }
}

fn push_list(out: &mut SmallVec<[NodeIndex; 4]>, list: &NodeList) {
    for &index in &list.nodes {
        push_some(out, index);
    }
}

/// Children of a node in source order. Holes are skipped.
pub fn node_children(node: &Node) -> SmallVec<[NodeIndex; 4]> {
    let mut out = SmallVec::new();
    match &node.data {
        NodeData::SourceFile { statements } | NodeData::Block { statements } => {
            push_list(&mut out, statements)
        }
        NodeData::VariableStatement { declaration_list } => push_some(&mut out, *declaration_list),
        NodeData::VariableDeclarationList { declarations, .. } => {
            push_list(&mut out, declarations)
        }
        NodeData::VariableDeclaration { name, initializer } => {
            push_some(&mut out, *name);
            push_some(&mut out, *initializer);
        }
        NodeData::FunctionDeclaration(func) | NodeData::FunctionExpression(func) => {
            push_some(&mut out, func.name);
            push_list(&mut out, &func.parameters);
            push_some(&mut out, func.body);
        }
        NodeData::ExpressionStatement { expression }
        | NodeData::ReturnStatement { expression }
        | NodeData::ThrowStatement { expression }
        | NodeData::SpreadElement { expression }
        | NodeData::Parenthesized { expression } => push_some(&mut out, *expression),
        NodeData::IfStatement {
            condition,
            then_statement,
            else_statement,
        } => {
            push_some(&mut out, *condition);
            push_some(&mut out, *then_statement);
            push_some(&mut out, *else_statement);
        }
        NodeData::ForStatement {
            initializer,
            condition,
            incrementor,
            statement,
        } => {
            push_some(&mut out, *initializer);
            push_some(&mut out, *condition);
            push_some(&mut out, *incrementor);
            push_some(&mut out, *statement);
        }
        NodeData::ForInOfStatement {
            initializer,
            expression,
            statement,
            ..
        } => {
            push_some(&mut out, *initializer);
            push_some(&mut out, *expression);
            push_some(&mut out, *statement);
        }
        NodeData::WhileStatement {
            condition,
            statement,
        } => {
            push_some(&mut out, *condition);
            push_some(&mut out, *statement);
        }
        NodeData::DoStatement {
            statement,
            condition,
        } => {
            push_some(&mut out, *statement);
            push_some(&mut out, *condition);
        }
        NodeData::SwitchStatement {
            expression,
            clauses,
        } => {
            push_some(&mut out, *expression);
            push_list(&mut out, clauses);
        }
        NodeData::CaseClause {
            expression,
            statements,
        } => {
            push_some(&mut out, *expression);
            push_list(&mut out, statements);
        }
        NodeData::TryStatement {
            try_block,
            catch_clause,
            finally_block,
        } => {
            push_some(&mut out, *try_block);
            push_some(&mut out, *catch_clause);
            push_some(&mut out, *finally_block);
        }
        NodeData::CatchClause { variable, block } => {
            push_some(&mut out, *variable);
            push_some(&mut out, *block);
        }
        NodeData::LabeledStatement { label, statement } => {
            push_some(&mut out, *label);
            push_some(&mut out, *statement);
        }
        NodeData::WithStatement {
            expression,
            statement,
        } => {
            push_some(&mut out, *expression);
            push_some(&mut out, *statement);
        }
        NodeData::BreakStatement { label } | NodeData::ContinueStatement { label } => {
            push_some(&mut out, *label)
        }
        NodeData::DebuggerStatement
        | NodeData::EmptyStatement
        | NodeData::Identifier { .. }
        | NodeData::NumericLiteral { .. }
        | NodeData::StringLiteral { .. }
        | NodeData::RegularExpressionLiteral { .. }
        | NodeData::KeywordLiteral { .. } => {}
        NodeData::ArrayLiteral { elements } | NodeData::ArrayPattern { elements } => {
            push_list(&mut out, elements)
        }
        NodeData::ObjectLiteral { properties } | NodeData::ObjectPattern { properties } => {
            push_list(&mut out, properties)
        }
        NodeData::PropertyAssignment {
            key, initializer, ..
        } => {
            push_some(&mut out, *key);
            push_some(&mut out, *initializer);
        }
        NodeData::AccessorProperty { key, function, .. } => {
            push_some(&mut out, *key);
            push_some(&mut out, *function);
        }
        NodeData::ShorthandPropertyAssignment { name } => push_some(&mut out, *name),
        NodeData::PropertyAccess { expression, name } => {
            push_some(&mut out, *expression);
            push_some(&mut out, *name);
        }
        NodeData::ElementAccess {
            expression,
            argument,
        } => {
            push_some(&mut out, *expression);
            push_some(&mut out, *argument);
        }
        NodeData::Call {
            expression,
            arguments,
        }
        | NodeData::New {
            expression,
            arguments,
        } => {
            push_some(&mut out, *expression);
            push_list(&mut out, arguments);
        }
        NodeData::Sequence { expressions } => push_list(&mut out, expressions),
        NodeData::Assignment { left, right, .. } | NodeData::Binary { left, right, .. } => {
            push_some(&mut out, *left);
            push_some(&mut out, *right);
        }
        NodeData::Conditional {
            condition,
            when_true,
            when_false,
        } => {
            push_some(&mut out, *condition);
            push_some(&mut out, *when_true);
            push_some(&mut out, *when_false);
        }
        NodeData::PrefixUnary { operand, .. } | NodeData::PostfixUnary { operand, .. } => {
            push_some(&mut out, *operand)
        }
        NodeData::BindingProperty { key, value, .. } => {
            push_some(&mut out, *key);
            push_some(&mut out, *value);
        }
        NodeData::RestElement { argument } => push_some(&mut out, *argument),
    }
    out
}
