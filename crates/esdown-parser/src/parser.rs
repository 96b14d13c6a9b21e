//! Recursive-descent parser producing a `NodeArena`.
//!
//! Object and array literals on the left of `=` (and in for-in/for-of heads)
//! are reinterpreted in place as `ObjectPattern` / `ArrayPattern` nodes, so
//! every destructuring site looks the same to later phases regardless of
//! whether it came from a declaration or an assignment.

use crate::node::{
    AccessorKind, FunctionData, NodeArena, NodeData, NodeIndex, NodeList, Operator, VariableKind,
};
use crate::scanner::{ScannerState, SyntaxKind};
use esdown_common::limits::MAX_PARSE_DEPTH;
use esdown_common::{Diagnostic, LineMap, diagnostic_codes, diagnostic_messages, format_message};
use tracing::debug;

/// Marker for a parse failure; the diagnostic has already been recorded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParseFailure;

type ParseResult<T> = Result<T, ParseFailure>;

pub struct ParserState {
    file_name: String,
    scanner: ScannerState,
    arena: NodeArena,
    line_map: LineMap,
    parse_diagnostics: Vec<Diagnostic>,
    recursion_depth: u32,
    /// False while parsing a for-statement initializer, where `in` starts a for-in head.
    allow_in: bool,
    prev_token_end: u32,
}

impl ParserState {
    pub fn new(file_name: String, source_text: String) -> Self {
        let line_map = LineMap::build(&source_text);
        ParserState {
            file_name,
            scanner: ScannerState::new(source_text),
            arena: NodeArena::new(),
            line_map,
            parse_diagnostics: Vec::new(),
            recursion_depth: 0,
            allow_in: true,
            prev_token_end: 0,
        }
    }

    pub fn get_arena(&self) -> &NodeArena {
        &self.arena
    }

    pub fn into_arena(self) -> NodeArena {
        self.arena
    }

    pub fn source_text(&self) -> &str {
        self.scanner.source_text()
    }

    pub fn line_map(&self) -> &LineMap {
        &self.line_map
    }

    pub fn get_diagnostics(&self) -> &[Diagnostic] {
        &self.parse_diagnostics
    }

    pub fn take_diagnostics(&mut self) -> Vec<Diagnostic> {
        std::mem::take(&mut self.parse_diagnostics)
    }

    pub fn has_errors(&self) -> bool {
        self.parse_diagnostics.iter().any(Diagnostic::is_error)
    }

    // =========================================================================
    // Token helpers
    // =========================================================================

    fn token(&self) -> SyntaxKind {
        self.scanner.token()
    }

    fn token_start(&self) -> u32 {
        self.scanner.token_start()
    }

    fn next_token(&mut self) -> SyntaxKind {
        self.prev_token_end = self.scanner.token_end();
        let token = self.scanner.scan();
        for diag in self.scanner.take_diagnostics() {
            let line = self.line_map.line_of(diag.pos);
            self.parse_diagnostics.push(Diagnostic::error(
                self.file_name.clone(),
                diag.pos,
                diag.length,
                line,
                diag.message,
                diag.code,
            ));
        }
        token
    }

    fn is_token(&self, kind: SyntaxKind) -> bool {
        self.token() == kind
    }

    /// True for the contextual keyword `of`.
    fn is_of_keyword(&self) -> bool {
        self.is_token(SyntaxKind::Identifier) && self.scanner.token_text() == "of"
    }

    fn parse_optional(&mut self, kind: SyntaxKind) -> bool {
        if self.is_token(kind) {
            self.next_token();
            true
        } else {
            false
        }
    }

    fn parse_expected(&mut self, kind: SyntaxKind) -> ParseResult<()> {
        if self.parse_optional(kind) {
            return Ok(());
        }
        let message = format_message(diagnostic_messages::EXPECTED_TOKEN, &[kind.text()]);
        Err(self.error_at_current(diagnostic_codes::EXPECTED_TOKEN, message))
    }

    /// Consume a statement terminator, applying automatic semicolon insertion.
    fn parse_semicolon(&mut self) -> ParseResult<()> {
        if self.parse_optional(SyntaxKind::SemicolonToken) {
            return Ok(());
        }
        if self.is_token(SyntaxKind::CloseBraceToken)
            || self.is_token(SyntaxKind::EndOfFileToken)
            || self.scanner.has_preceding_line_break()
        {
            return Ok(());
        }
        self.parse_expected(SyntaxKind::SemicolonToken)
    }

    fn error_at(&mut self, start: u32, length: u32, code: u32, message: String) -> ParseFailure {
        let line = self.line_map.line_of(start);
        self.parse_diagnostics.push(Diagnostic::error(
            self.file_name.clone(),
            start,
            length,
            line,
            message,
            code,
        ));
        ParseFailure
    }

    fn error_at_current(&mut self, code: u32, message: String) -> ParseFailure {
        // The scanner already reported invalid characters.
        if self.is_token(SyntaxKind::Unknown) {
            return ParseFailure;
        }
        let start = self.token_start();
        let length = self.scanner.token_end().saturating_sub(start);
        self.error_at(start, length, code, message)
    }

    fn error_at_node(&mut self, node: NodeIndex, code: u32, message: String) -> ParseFailure {
        let (start, length) = self
            .arena
            .get(node)
            .map_or((self.token_start(), 0), |n| (n.pos, n.width()));
        self.error_at(start, length, code, message)
    }

    fn unsupported(&mut self, what: &str) -> ParseFailure {
        let message = format_message(diagnostic_messages::UNSUPPORTED_SYNTAX, &[what]);
        self.error_at_current(diagnostic_codes::UNSUPPORTED_SYNTAX, message)
    }

    fn finish_node(&mut self, pos: u32, data: NodeData) -> NodeIndex {
        let end = self.prev_token_end.max(pos);
        self.arena.add(pos, end, data)
    }

    fn guarded<T>(&mut self, f: impl FnOnce(&mut Self) -> ParseResult<T>) -> ParseResult<T> {
        if self.recursion_depth >= MAX_PARSE_DEPTH {
            return Err(self.error_at_current(
                diagnostic_codes::MAXIMUM_NESTING_DEPTH_EXCEEDED,
                diagnostic_messages::MAXIMUM_NESTING_DEPTH_EXCEEDED.to_string(),
            ));
        }
        self.recursion_depth += 1;
        let result = f(self);
        self.recursion_depth -= 1;
        result
    }

    fn with_allow_in<T>(
        &mut self,
        allow_in: bool,
        f: impl FnOnce(&mut Self) -> ParseResult<T>,
    ) -> ParseResult<T> {
        let saved = self.allow_in;
        self.allow_in = allow_in;
        let result = f(self);
        self.allow_in = saved;
        result
    }

    // =========================================================================
    // Source file and statements
    // =========================================================================

    /// Parse the whole source text. On a syntax error parsing stops; the
    /// returned file holds the statements parsed so far and `has_errors()`
    /// is true.
    pub fn parse_source_file(&mut self) -> NodeIndex {
        self.next_token();
        let mut statements = Vec::new();
        while !self.is_token(SyntaxKind::EndOfFileToken) {
            match self.parse_statement() {
                Ok(statement) => statements.push(statement),
                Err(ParseFailure) => break,
            }
        }
        let end = self.scanner.source_text().len() as u32;
        debug!(
            file = %self.file_name,
            statements = statements.len(),
            nodes = self.arena.len(),
            errors = self.parse_diagnostics.len(),
            "parsed source file"
        );
        self.arena.add(
            0,
            end,
            NodeData::SourceFile {
                statements: NodeList::new(statements),
            },
        )
    }

    fn parse_statement(&mut self) -> ParseResult<NodeIndex> {
        self.guarded(|p| p.parse_statement_worker())
    }

    fn parse_statement_worker(&mut self) -> ParseResult<NodeIndex> {
        let pos = self.token_start();
        match self.token() {
            SyntaxKind::OpenBraceToken => self.parse_block(),
            SyntaxKind::VarKeyword | SyntaxKind::LetKeyword | SyntaxKind::ConstKeyword => {
                let declaration_list = self.parse_variable_declaration_list()?;
                self.parse_semicolon()?;
                Ok(self.finish_node(pos, NodeData::VariableStatement { declaration_list }))
            }
            SyntaxKind::FunctionKeyword => {
                let func = self.parse_function(true)?;
                Ok(self.finish_node(pos, NodeData::FunctionDeclaration(func)))
            }
            SyntaxKind::IfKeyword => self.parse_if_statement(),
            SyntaxKind::ForKeyword => self.parse_for_statement(),
            SyntaxKind::SwitchKeyword => self.parse_switch_statement(),
            SyntaxKind::TryKeyword => self.parse_try_statement(),
            SyntaxKind::WhileKeyword => {
                self.next_token();
                self.parse_expected(SyntaxKind::OpenParenToken)?;
                let condition = self.parse_expression()?;
                self.parse_expected(SyntaxKind::CloseParenToken)?;
                let statement = self.parse_statement()?;
                Ok(self.finish_node(
                    pos,
                    NodeData::WhileStatement {
                        condition,
                        statement,
                    },
                ))
            }
            SyntaxKind::ReturnKeyword => {
                self.next_token();
                let expression = if self.is_token(SyntaxKind::SemicolonToken)
                    || self.is_token(SyntaxKind::CloseBraceToken)
                    || self.is_token(SyntaxKind::EndOfFileToken)
                    || self.scanner.has_preceding_line_break()
                {
                    NodeIndex::NONE
                } else {
                    self.parse_expression()?
                };
                self.parse_semicolon()?;
                Ok(self.finish_node(pos, NodeData::ReturnStatement { expression }))
            }
            SyntaxKind::DoKeyword => {
                self.next_token();
                let statement = self.parse_statement()?;
                self.parse_expected(SyntaxKind::WhileKeyword)?;
                self.parse_expected(SyntaxKind::OpenParenToken)?;
                let condition = self.parse_expression()?;
                self.parse_expected(SyntaxKind::CloseParenToken)?;
                // The semicolon after `do ... while (...)` is always optional.
                self.parse_optional(SyntaxKind::SemicolonToken);
                Ok(self.finish_node(
                    pos,
                    NodeData::DoStatement {
                        statement,
                        condition,
                    },
                ))
            }
            SyntaxKind::WithKeyword => {
                self.next_token();
                self.parse_expected(SyntaxKind::OpenParenToken)?;
                let expression = self.parse_expression()?;
                self.parse_expected(SyntaxKind::CloseParenToken)?;
                let statement = self.parse_statement()?;
                Ok(self.finish_node(
                    pos,
                    NodeData::WithStatement {
                        expression,
                        statement,
                    },
                ))
            }
            SyntaxKind::ThrowKeyword => {
                self.next_token();
                if self.scanner.has_preceding_line_break() {
                    return Err(self.error_at_current(
                        diagnostic_codes::LINE_BREAK_NOT_PERMITTED,
                        diagnostic_messages::LINE_BREAK_NOT_PERMITTED.to_string(),
                    ));
                }
                let expression = self.parse_expression()?;
                self.parse_semicolon()?;
                Ok(self.finish_node(pos, NodeData::ThrowStatement { expression }))
            }
            SyntaxKind::BreakKeyword | SyntaxKind::ContinueKeyword => {
                let is_break = self.is_token(SyntaxKind::BreakKeyword);
                self.next_token();
                let label = if self.is_token(SyntaxKind::Identifier)
                    && !self.scanner.has_preceding_line_break()
                {
                    self.parse_identifier()?
                } else {
                    NodeIndex::NONE
                };
                self.parse_semicolon()?;
                let data = if is_break {
                    NodeData::BreakStatement { label }
                } else {
                    NodeData::ContinueStatement { label }
                };
                Ok(self.finish_node(pos, data))
            }
            SyntaxKind::DebuggerKeyword => {
                self.next_token();
                self.parse_semicolon()?;
                Ok(self.finish_node(pos, NodeData::DebuggerStatement))
            }
            SyntaxKind::SemicolonToken => {
                self.next_token();
                Ok(self.finish_node(pos, NodeData::EmptyStatement))
            }
            _ => {
                let expression = self.parse_expression()?;
                if self.is_token(SyntaxKind::ColonToken)
                    && self.arena.identifier_text(expression).is_some()
                {
                    self.next_token();
                    let statement = self.parse_statement()?;
                    return Ok(self.finish_node(
                        pos,
                        NodeData::LabeledStatement {
                            label: expression,
                            statement,
                        },
                    ));
                }
                self.parse_semicolon()?;
                Ok(self.finish_node(pos, NodeData::ExpressionStatement { expression }))
            }
        }
    }

    fn parse_block(&mut self) -> ParseResult<NodeIndex> {
        let pos = self.token_start();
        self.parse_expected(SyntaxKind::OpenBraceToken)?;
        let mut statements = Vec::new();
        while !self.is_token(SyntaxKind::CloseBraceToken) {
            if self.is_token(SyntaxKind::EndOfFileToken) {
                self.parse_expected(SyntaxKind::CloseBraceToken)?;
            }
            statements.push(self.parse_statement()?);
        }
        self.next_token();
        Ok(self.finish_node(
            pos,
            NodeData::Block {
                statements: NodeList::new(statements),
            },
        ))
    }

    fn parse_if_statement(&mut self) -> ParseResult<NodeIndex> {
        let pos = self.token_start();
        self.next_token();
        self.parse_expected(SyntaxKind::OpenParenToken)?;
        let condition = self.parse_expression()?;
        self.parse_expected(SyntaxKind::CloseParenToken)?;
        let then_statement = self.parse_statement()?;
        let else_statement = if self.parse_optional(SyntaxKind::ElseKeyword) {
            self.parse_statement()?
        } else {
            NodeIndex::NONE
        };
        Ok(self.finish_node(
            pos,
            NodeData::IfStatement {
                condition,
                then_statement,
                else_statement,
            },
        ))
    }

    fn parse_for_statement(&mut self) -> ParseResult<NodeIndex> {
        let pos = self.token_start();
        self.next_token();
        self.parse_expected(SyntaxKind::OpenParenToken)?;

        let initializer = match self.token() {
            SyntaxKind::SemicolonToken => NodeIndex::NONE,
            SyntaxKind::VarKeyword | SyntaxKind::LetKeyword | SyntaxKind::ConstKeyword => {
                self.with_allow_in(false, |p| p.parse_variable_declaration_list())?
            }
            _ => self.with_allow_in(false, |p| p.parse_expression())?,
        };

        let is_in = self.is_token(SyntaxKind::InKeyword);
        if initializer.is_some() && (is_in || self.is_of_keyword()) {
            let initializer = self.to_for_in_of_target(initializer)?;
            self.next_token();
            let expression = if is_in {
                self.parse_expression()?
            } else {
                self.parse_assignment_expression()?
            };
            self.parse_expected(SyntaxKind::CloseParenToken)?;
            let statement = self.parse_statement()?;
            return Ok(self.finish_node(
                pos,
                NodeData::ForInOfStatement {
                    is_of: !is_in,
                    initializer,
                    expression,
                    statement,
                },
            ));
        }

        self.parse_expected(SyntaxKind::SemicolonToken)?;
        let condition = if self.is_token(SyntaxKind::SemicolonToken) {
            NodeIndex::NONE
        } else {
            self.parse_expression()?
        };
        self.parse_expected(SyntaxKind::SemicolonToken)?;
        let incrementor = if self.is_token(SyntaxKind::CloseParenToken) {
            NodeIndex::NONE
        } else {
            self.parse_expression()?
        };
        self.parse_expected(SyntaxKind::CloseParenToken)?;
        let statement = self.parse_statement()?;
        Ok(self.finish_node(
            pos,
            NodeData::ForStatement {
                initializer,
                condition,
                incrementor,
                statement,
            },
        ))
    }

    fn parse_switch_statement(&mut self) -> ParseResult<NodeIndex> {
        let pos = self.token_start();
        self.next_token();
        self.parse_expected(SyntaxKind::OpenParenToken)?;
        let expression = self.parse_expression()?;
        self.parse_expected(SyntaxKind::CloseParenToken)?;
        self.parse_expected(SyntaxKind::OpenBraceToken)?;

        let mut clauses = Vec::new();
        while !self.is_token(SyntaxKind::CloseBraceToken) {
            let clause_pos = self.token_start();
            let test = match self.token() {
                SyntaxKind::CaseKeyword => {
                    self.next_token();
                    self.parse_expression()?
                }
                SyntaxKind::DefaultKeyword => {
                    self.next_token();
                    NodeIndex::NONE
                }
                SyntaxKind::EndOfFileToken => {
                    self.parse_expected(SyntaxKind::CloseBraceToken)?;
                    return Err(ParseFailure);
                }
                _ => {
                    let message = format_message(diagnostic_messages::EXPECTED_TOKEN, &["case"]);
                    return Err(self.error_at_current(diagnostic_codes::EXPECTED_TOKEN, message));
                }
            };
            self.parse_expected(SyntaxKind::ColonToken)?;
            let mut statements = Vec::new();
            while !matches!(
                self.token(),
                SyntaxKind::CaseKeyword
                    | SyntaxKind::DefaultKeyword
                    | SyntaxKind::CloseBraceToken
                    | SyntaxKind::EndOfFileToken
            ) {
                statements.push(self.parse_statement()?);
            }
            clauses.push(self.finish_node(
                clause_pos,
                NodeData::CaseClause {
                    expression: test,
                    statements: NodeList::new(statements),
                },
            ));
        }
        self.next_token();
        Ok(self.finish_node(
            pos,
            NodeData::SwitchStatement {
                expression,
                clauses: NodeList::new(clauses),
            },
        ))
    }

    fn parse_try_statement(&mut self) -> ParseResult<NodeIndex> {
        let pos = self.token_start();
        self.next_token();
        let try_block = self.parse_block()?;

        let catch_clause = if self.is_token(SyntaxKind::CatchKeyword) {
            let catch_pos = self.token_start();
            self.next_token();
            self.parse_expected(SyntaxKind::OpenParenToken)?;
            if matches!(
                self.token(),
                SyntaxKind::OpenBraceToken | SyntaxKind::OpenBracketToken
            ) {
                return Err(self.unsupported("destructuring in a catch clause"));
            }
            let variable = self.parse_identifier()?;
            self.parse_expected(SyntaxKind::CloseParenToken)?;
            let block = self.parse_block()?;
            self.finish_node(catch_pos, NodeData::CatchClause { variable, block })
        } else {
            NodeIndex::NONE
        };
        let finally_block = if self.parse_optional(SyntaxKind::FinallyKeyword) {
            self.parse_block()?
        } else {
            NodeIndex::NONE
        };

        if catch_clause.is_none() && finally_block.is_none() {
            return Err(self.error_at_current(
                diagnostic_codes::CATCH_OR_FINALLY_EXPECTED,
                diagnostic_messages::CATCH_OR_FINALLY_EXPECTED.to_string(),
            ));
        }
        Ok(self.finish_node(
            pos,
            NodeData::TryStatement {
                try_block,
                catch_clause,
                finally_block,
            },
        ))
    }

    /// Validate the head of a for-in/for-of loop, turning literals into patterns.
    fn to_for_in_of_target(&mut self, initializer: NodeIndex) -> ParseResult<NodeIndex> {
        let is_declaration = matches!(
            self.arena.get(initializer).map(|n| &n.data),
            Some(NodeData::VariableDeclarationList { .. })
        );
        if is_declaration {
            Ok(initializer)
        } else {
            self.to_assignment_target(initializer)
        }
    }

    // =========================================================================
    // Declarations
    // =========================================================================

    fn parse_variable_declaration_list(&mut self) -> ParseResult<NodeIndex> {
        let pos = self.token_start();
        let kind = match self.token() {
            SyntaxKind::LetKeyword => VariableKind::Let,
            SyntaxKind::ConstKeyword => VariableKind::Const,
            _ => VariableKind::Var,
        };
        self.next_token();

        let mut declarations = vec![self.parse_variable_declaration()?];
        while self.parse_optional(SyntaxKind::CommaToken) {
            declarations.push(self.parse_variable_declaration()?);
        }
        Ok(self.finish_node(
            pos,
            NodeData::VariableDeclarationList {
                kind,
                declarations: NodeList::new(declarations),
            },
        ))
    }

    fn parse_variable_declaration(&mut self) -> ParseResult<NodeIndex> {
        let pos = self.token_start();
        let name = self.parse_binding_element()?;
        let initializer = if self.parse_optional(SyntaxKind::EqualsToken) {
            self.parse_assignment_expression()?
        } else {
            NodeIndex::NONE
        };
        Ok(self.finish_node(pos, NodeData::VariableDeclaration { name, initializer }))
    }

    fn parse_function(&mut self, require_name: bool) -> ParseResult<FunctionData> {
        self.parse_expected(SyntaxKind::FunctionKeyword)?;
        let name = if self.is_token(SyntaxKind::Identifier) {
            self.parse_identifier()?
        } else if require_name {
            let message = format_message(diagnostic_messages::EXPECTED_TOKEN, &["identifier"]);
            return Err(self.error_at_current(diagnostic_codes::EXPECTED_TOKEN, message));
        } else {
            NodeIndex::NONE
        };
        self.parse_signature_and_body(name)
    }

    /// Parameter list and body of a function or accessor.
    fn parse_signature_and_body(&mut self, name: NodeIndex) -> ParseResult<FunctionData> {
        self.parse_expected(SyntaxKind::OpenParenToken)?;
        let mut parameters = Vec::new();
        while !self.is_token(SyntaxKind::CloseParenToken) {
            if self.is_token(SyntaxKind::DotDotDotToken) {
                return Err(self.unsupported("rest parameter"));
            }
            parameters.push(self.parse_binding_element()?);
            if self.is_token(SyntaxKind::EqualsToken) {
                return Err(self.unsupported("parameter default value"));
            }
            if !self.is_token(SyntaxKind::CloseParenToken) {
                self.parse_expected(SyntaxKind::CommaToken)?;
            }
        }
        self.next_token();

        let body = self.with_allow_in(true, |p| p.parse_block())?;
        Ok(FunctionData {
            name,
            parameters: NodeList::new(parameters),
            body,
        })
    }

    // =========================================================================
    // Binding patterns (declaration form)
    // =========================================================================

    /// Identifier or nested binding pattern.
    fn parse_binding_element(&mut self) -> ParseResult<NodeIndex> {
        self.guarded(|p| match p.token() {
            SyntaxKind::OpenBraceToken => p.parse_object_binding_pattern(),
            SyntaxKind::OpenBracketToken => p.parse_array_binding_pattern(),
            _ => p.parse_identifier(),
        })
    }

    fn reject_pattern_default(&mut self) -> ParseResult<()> {
        if self.is_token(SyntaxKind::EqualsToken) {
            return Err(self.unsupported("default value in a destructuring pattern"));
        }
        Ok(())
    }

    fn parse_object_binding_pattern(&mut self) -> ParseResult<NodeIndex> {
        let pos = self.token_start();
        self.parse_expected(SyntaxKind::OpenBraceToken)?;
        let mut properties = Vec::new();
        while !self.is_token(SyntaxKind::CloseBraceToken) {
            let prop_pos = self.token_start();
            if self.is_token(SyntaxKind::DotDotDotToken) {
                return Err(self.unsupported("object rest element"));
            }
            let (key, computed) = self.parse_property_key()?;
            let (key, value) = if self.parse_optional(SyntaxKind::ColonToken) {
                (key, self.parse_binding_element()?)
            } else if !computed && self.is_shorthand_key(key) {
                (NodeIndex::NONE, key)
            } else {
                self.parse_expected(SyntaxKind::ColonToken)?;
                return Err(ParseFailure);
            };
            self.reject_pattern_default()?;
            properties.push(self.finish_node(
                prop_pos,
                NodeData::BindingProperty {
                    key,
                    computed,
                    value,
                },
            ));
            if !self.is_token(SyntaxKind::CloseBraceToken) {
                self.parse_expected(SyntaxKind::CommaToken)?;
            }
        }
        self.next_token();
        Ok(self.finish_node(
            pos,
            NodeData::ObjectPattern {
                properties: NodeList::new(properties),
            },
        ))
    }

    fn parse_array_binding_pattern(&mut self) -> ParseResult<NodeIndex> {
        let pos = self.token_start();
        self.parse_expected(SyntaxKind::OpenBracketToken)?;
        let mut elements = Vec::new();
        while !self.is_token(SyntaxKind::CloseBracketToken) {
            if self.parse_optional(SyntaxKind::CommaToken) {
                elements.push(NodeIndex::NONE);
                continue;
            }
            if self.is_token(SyntaxKind::DotDotDotToken) {
                let rest_pos = self.token_start();
                self.next_token();
                let argument = self.parse_binding_element()?;
                elements.push(self.finish_node(rest_pos, NodeData::RestElement { argument }));
                if !self.is_token(SyntaxKind::CloseBracketToken) {
                    return Err(self.error_at_current(
                        diagnostic_codes::REST_ELEMENT_MUST_BE_LAST,
                        diagnostic_messages::REST_ELEMENT_MUST_BE_LAST.to_string(),
                    ));
                }
                break;
            }
            elements.push(self.parse_binding_element()?);
            self.reject_pattern_default()?;
            if !self.is_token(SyntaxKind::CloseBracketToken) {
                self.parse_expected(SyntaxKind::CommaToken)?;
            }
        }
        self.next_token();
        Ok(self.finish_node(
            pos,
            NodeData::ArrayPattern {
                elements: NodeList::new(elements),
            },
        ))
    }

    /// Property key in an object literal or object pattern. Returns the key
    /// node and whether it was computed (`[expr]`).
    fn parse_property_key(&mut self) -> ParseResult<(NodeIndex, bool)> {
        let pos = self.token_start();
        match self.token() {
            SyntaxKind::OpenBracketToken => {
                self.next_token();
                let expression = self.with_allow_in(true, |p| p.parse_assignment_expression())?;
                self.parse_expected(SyntaxKind::CloseBracketToken)?;
                Ok((expression, true))
            }
            SyntaxKind::StringLiteral => {
                let value = self.scanner.string_value();
                self.next_token();
                Ok((self.finish_node(pos, NodeData::StringLiteral { value }), false))
            }
            SyntaxKind::NumericLiteral => {
                let text = self.scanner.token_text().to_string();
                self.next_token();
                Ok((self.finish_node(pos, NodeData::NumericLiteral { text }), false))
            }
            _ => Ok((self.parse_identifier_name()?, false)),
        }
    }

    /// Shorthand properties must be plain identifiers, not keywords.
    fn is_shorthand_key(&self, key: NodeIndex) -> bool {
        self.arena
            .identifier_text(key)
            .is_some_and(|text| SyntaxKind::keyword(text).is_none())
    }

    /// `get` or `set` followed by a property name starts an accessor;
    /// otherwise it is an ordinary key.
    fn accessor_kind(&mut self) -> Option<AccessorKind> {
        if !self.is_token(SyntaxKind::Identifier) {
            return None;
        }
        let kind = match self.scanner.token_text() {
            "get" => AccessorKind::Get,
            "set" => AccessorKind::Set,
            _ => return None,
        };
        let snapshot = self.scanner.save_state();
        let next = self.scanner.scan();
        self.scanner.restore_state(snapshot);
        let starts_key = next.is_keyword()
            || matches!(
                next,
                SyntaxKind::Identifier
                    | SyntaxKind::StringLiteral
                    | SyntaxKind::NumericLiteral
                    | SyntaxKind::OpenBracketToken
            );
        starts_key.then_some(kind)
    }

    fn parse_accessor_property(&mut self, pos: u32, kind: AccessorKind) -> ParseResult<NodeIndex> {
        self.next_token();
        let (key, computed) = self.parse_property_key()?;
        let function_pos = self.token_start();
        let func = self.parse_signature_and_body(NodeIndex::NONE)?;
        let parameter_count = func.parameters.len();
        let function = self.finish_node(function_pos, NodeData::FunctionExpression(func));
        match kind {
            AccessorKind::Get if parameter_count != 0 => {
                return Err(self.error_at_node(
                    function,
                    diagnostic_codes::GETTER_HAS_PARAMETERS,
                    diagnostic_messages::GETTER_HAS_PARAMETERS.to_string(),
                ));
            }
            AccessorKind::Set if parameter_count != 1 => {
                return Err(self.error_at_node(
                    function,
                    diagnostic_codes::SETTER_PARAMETER_COUNT,
                    diagnostic_messages::SETTER_PARAMETER_COUNT.to_string(),
                ));
            }
            _ => {}
        }
        Ok(self.finish_node(
            pos,
            NodeData::AccessorProperty {
                kind,
                key,
                computed,
                function,
            },
        ))
    }

    fn parse_identifier(&mut self) -> ParseResult<NodeIndex> {
        if !self.is_token(SyntaxKind::Identifier) {
            let message = format_message(diagnostic_messages::EXPECTED_TOKEN, &["identifier"]);
            return Err(self.error_at_current(diagnostic_codes::EXPECTED_TOKEN, message));
        }
        self.parse_identifier_name()
    }

    /// Identifier or keyword used as a property name.
    fn parse_identifier_name(&mut self) -> ParseResult<NodeIndex> {
        let token = self.token();
        if token != SyntaxKind::Identifier && !token.is_keyword() {
            let message = format_message(diagnostic_messages::EXPECTED_TOKEN, &["identifier"]);
            return Err(self.error_at_current(diagnostic_codes::EXPECTED_TOKEN, message));
        }
        let pos = self.token_start();
        let text = self.scanner.token_text().to_string();
        self.next_token();
        Ok(self.finish_node(pos, NodeData::Identifier { text }))
    }

    // =========================================================================
    // Expressions
    // =========================================================================

    fn parse_expression(&mut self) -> ParseResult<NodeIndex> {
        let pos = self.token_start();
        let first = self.parse_assignment_expression()?;
        if !self.is_token(SyntaxKind::CommaToken) {
            return Ok(first);
        }
        let mut expressions = vec![first];
        while self.parse_optional(SyntaxKind::CommaToken) {
            expressions.push(self.parse_assignment_expression()?);
        }
        Ok(self.finish_node(
            pos,
            NodeData::Sequence {
                expressions: NodeList::new(expressions),
            },
        ))
    }

    fn parse_assignment_expression(&mut self) -> ParseResult<NodeIndex> {
        self.guarded(|p| p.parse_assignment_expression_worker())
    }

    fn parse_assignment_expression_worker(&mut self) -> ParseResult<NodeIndex> {
        let pos = self.token_start();
        let left = self.parse_conditional_expression()?;
        let Some(operator) = assignment_operator(self.token()) else {
            return Ok(left);
        };

        let left = if operator == Operator::Assign {
            self.to_assignment_target(left)?
        } else if self.is_simple_target(left) {
            left
        } else {
            return Err(self.error_at_node(
                left,
                diagnostic_codes::INVALID_ASSIGNMENT_TARGET,
                diagnostic_messages::INVALID_ASSIGNMENT_TARGET.to_string(),
            ));
        };
        self.next_token();
        let right = self.parse_assignment_expression()?;
        Ok(self.finish_node(
            pos,
            NodeData::Assignment {
                left,
                operator,
                right,
            },
        ))
    }

    fn parse_conditional_expression(&mut self) -> ParseResult<NodeIndex> {
        let pos = self.token_start();
        let condition = self.parse_binary_expression(0)?;
        if !self.parse_optional(SyntaxKind::QuestionToken) {
            return Ok(condition);
        }
        let when_true = self.with_allow_in(true, |p| p.parse_assignment_expression())?;
        self.parse_expected(SyntaxKind::ColonToken)?;
        let when_false = self.parse_assignment_expression()?;
        Ok(self.finish_node(
            pos,
            NodeData::Conditional {
                condition,
                when_true,
                when_false,
            },
        ))
    }

    fn parse_binary_expression(&mut self, min_precedence: u8) -> ParseResult<NodeIndex> {
        let pos = self.token_start();
        let mut left = self.parse_unary_expression()?;
        loop {
            let token = self.token();
            if token == SyntaxKind::InKeyword && !self.allow_in {
                break;
            }
            let Some((operator, precedence)) = binary_operator(token) else {
                break;
            };
            if precedence <= min_precedence {
                break;
            }
            self.next_token();
            let right = self.guarded(|p| p.parse_binary_expression(precedence))?;
            left = self.finish_node(
                pos,
                NodeData::Binary {
                    left,
                    operator,
                    right,
                },
            );
        }
        Ok(left)
    }

    fn parse_unary_expression(&mut self) -> ParseResult<NodeIndex> {
        let pos = self.token_start();
        let operator = match self.token() {
            SyntaxKind::ExclamationToken => Some(Operator::Not),
            SyntaxKind::TildeToken => Some(Operator::BitwiseNot),
            SyntaxKind::MinusToken => Some(Operator::Negate),
            SyntaxKind::PlusToken => Some(Operator::Plus),
            SyntaxKind::TypeOfKeyword => Some(Operator::TypeOf),
            SyntaxKind::VoidKeyword => Some(Operator::Void),
            SyntaxKind::DeleteKeyword => Some(Operator::Delete),
            SyntaxKind::PlusPlusToken => Some(Operator::Increment),
            SyntaxKind::MinusMinusToken => Some(Operator::Decrement),
            _ => None,
        };
        if let Some(operator) = operator {
            self.next_token();
            let operand = self.guarded(|p| p.parse_unary_expression())?;
            return Ok(self.finish_node(pos, NodeData::PrefixUnary { operator, operand }));
        }

        let operand = self.parse_left_hand_side_expression()?;
        let postfix = match self.token() {
            SyntaxKind::PlusPlusToken => Some(Operator::Increment),
            SyntaxKind::MinusMinusToken => Some(Operator::Decrement),
            _ => None,
        };
        match postfix {
            Some(operator) if !self.scanner.has_preceding_line_break() => {
                self.next_token();
                Ok(self.finish_node(pos, NodeData::PostfixUnary { operand, operator }))
            }
            _ => Ok(operand),
        }
    }

    fn parse_left_hand_side_expression(&mut self) -> ParseResult<NodeIndex> {
        let pos = self.token_start();
        let mut expression = if self.is_token(SyntaxKind::NewKeyword) {
            self.parse_new_expression()?
        } else {
            self.parse_primary_expression()?
        };
        loop {
            match self.token() {
                SyntaxKind::DotToken | SyntaxKind::OpenBracketToken => {
                    expression = self.parse_member_suffix(pos, expression)?;
                }
                SyntaxKind::OpenParenToken => {
                    let arguments = self.parse_arguments()?;
                    expression = self.finish_node(
                        pos,
                        NodeData::Call {
                            expression,
                            arguments,
                        },
                    );
                }
                _ => return Ok(expression),
            }
        }
    }

    fn parse_member_suffix(&mut self, pos: u32, expression: NodeIndex) -> ParseResult<NodeIndex> {
        if self.parse_optional(SyntaxKind::DotToken) {
            let name = self.parse_identifier_name()?;
            return Ok(self.finish_node(pos, NodeData::PropertyAccess { expression, name }));
        }
        self.parse_expected(SyntaxKind::OpenBracketToken)?;
        let argument = self.with_allow_in(true, |p| p.parse_expression())?;
        self.parse_expected(SyntaxKind::CloseBracketToken)?;
        Ok(self.finish_node(
            pos,
            NodeData::ElementAccess {
                expression,
                argument,
            },
        ))
    }

    fn parse_new_expression(&mut self) -> ParseResult<NodeIndex> {
        let pos = self.token_start();
        self.next_token();
        let callee_pos = self.token_start();
        let mut expression = if self.is_token(SyntaxKind::NewKeyword) {
            self.guarded(|p| p.parse_new_expression())?
        } else {
            self.parse_primary_expression()?
        };
        while matches!(
            self.token(),
            SyntaxKind::DotToken | SyntaxKind::OpenBracketToken
        ) {
            expression = self.parse_member_suffix(callee_pos, expression)?;
        }
        let arguments = if self.is_token(SyntaxKind::OpenParenToken) {
            self.parse_arguments()?
        } else {
            NodeList::default()
        };
        Ok(self.finish_node(
            pos,
            NodeData::New {
                expression,
                arguments,
            },
        ))
    }

    fn parse_arguments(&mut self) -> ParseResult<NodeList> {
        self.parse_expected(SyntaxKind::OpenParenToken)?;
        let mut arguments = Vec::new();
        self.with_allow_in(true, |p| {
            while !p.is_token(SyntaxKind::CloseParenToken) {
                if p.is_token(SyntaxKind::DotDotDotToken) {
                    return Err(p.unsupported("spread argument"));
                }
                arguments.push(p.parse_assignment_expression()?);
                if !p.is_token(SyntaxKind::CloseParenToken) {
                    p.parse_expected(SyntaxKind::CommaToken)?;
                }
            }
            Ok(())
        })?;
        self.next_token();
        Ok(NodeList::new(arguments))
    }

    fn parse_primary_expression(&mut self) -> ParseResult<NodeIndex> {
        let pos = self.token_start();
        match self.token() {
            SyntaxKind::Identifier => self.parse_identifier(),
            SyntaxKind::NumericLiteral => {
                let text = self.scanner.token_text().to_string();
                self.next_token();
                Ok(self.finish_node(pos, NodeData::NumericLiteral { text }))
            }
            SyntaxKind::StringLiteral => {
                let value = self.scanner.string_value();
                self.next_token();
                Ok(self.finish_node(pos, NodeData::StringLiteral { value }))
            }
            SyntaxKind::SlashToken | SyntaxKind::SlashEqualsToken => {
                self.scanner.re_scan_slash_token();
                let text = self.scanner.token_text().to_string();
                self.next_token();
                Ok(self.finish_node(pos, NodeData::RegularExpressionLiteral { text }))
            }
            SyntaxKind::ThisKeyword
            | SyntaxKind::NullKeyword
            | SyntaxKind::TrueKeyword
            | SyntaxKind::FalseKeyword => {
                let text = self.token().text();
                self.next_token();
                Ok(self.finish_node(pos, NodeData::KeywordLiteral { text }))
            }
            SyntaxKind::OpenParenToken => {
                self.next_token();
                let expression = self.with_allow_in(true, |p| p.parse_expression())?;
                self.parse_expected(SyntaxKind::CloseParenToken)?;
                Ok(self.finish_node(pos, NodeData::Parenthesized { expression }))
            }
            SyntaxKind::OpenBracketToken => self.parse_array_literal(),
            SyntaxKind::OpenBraceToken => self.parse_object_literal(),
            SyntaxKind::FunctionKeyword => {
                let func = self.parse_function(false)?;
                Ok(self.finish_node(pos, NodeData::FunctionExpression(func)))
            }
            _ => Err(self.error_at_current(
                diagnostic_codes::EXPRESSION_EXPECTED,
                diagnostic_messages::EXPRESSION_EXPECTED.to_string(),
            )),
        }
    }

    fn parse_array_literal(&mut self) -> ParseResult<NodeIndex> {
        let pos = self.token_start();
        self.parse_expected(SyntaxKind::OpenBracketToken)?;
        let mut elements = Vec::new();
        self.with_allow_in(true, |p| {
            while !p.is_token(SyntaxKind::CloseBracketToken) {
                if p.parse_optional(SyntaxKind::CommaToken) {
                    elements.push(NodeIndex::NONE);
                    continue;
                }
                let element_pos = p.token_start();
                let element = if p.parse_optional(SyntaxKind::DotDotDotToken) {
                    let expression = p.parse_assignment_expression()?;
                    p.finish_node(element_pos, NodeData::SpreadElement { expression })
                } else {
                    p.parse_assignment_expression()?
                };
                elements.push(element);
                if !p.is_token(SyntaxKind::CloseBracketToken) {
                    p.parse_expected(SyntaxKind::CommaToken)?;
                }
            }
            Ok(())
        })?;
        self.next_token();
        Ok(self.finish_node(
            pos,
            NodeData::ArrayLiteral {
                elements: NodeList::new(elements),
            },
        ))
    }

    fn parse_object_literal(&mut self) -> ParseResult<NodeIndex> {
        let pos = self.token_start();
        self.parse_expected(SyntaxKind::OpenBraceToken)?;
        let mut properties = Vec::new();
        self.with_allow_in(true, |p| {
            while !p.is_token(SyntaxKind::CloseBraceToken) {
                let prop_pos = p.token_start();
                if p.is_token(SyntaxKind::DotDotDotToken) {
                    return Err(p.unsupported("object spread"));
                }
                if let Some(kind) = p.accessor_kind() {
                    properties.push(p.parse_accessor_property(prop_pos, kind)?);
                    if !p.is_token(SyntaxKind::CloseBraceToken) {
                        p.parse_expected(SyntaxKind::CommaToken)?;
                    }
                    continue;
                }
                let (key, computed) = p.parse_property_key()?;
                let property = if p.parse_optional(SyntaxKind::ColonToken) {
                    let initializer = p.parse_assignment_expression()?;
                    p.finish_node(
                        prop_pos,
                        NodeData::PropertyAssignment {
                            key,
                            computed,
                            initializer,
                        },
                    )
                } else if !computed && p.is_shorthand_key(key) {
                    if p.is_token(SyntaxKind::EqualsToken) {
                        return Err(p.unsupported("default value in a destructuring pattern"));
                    }
                    p.finish_node(prop_pos, NodeData::ShorthandPropertyAssignment { name: key })
                } else if p.is_token(SyntaxKind::OpenParenToken) {
                    return Err(p.unsupported("method definition"));
                } else {
                    p.parse_expected(SyntaxKind::ColonToken)?;
                    return Err(ParseFailure);
                };
                properties.push(property);
                if !p.is_token(SyntaxKind::CloseBraceToken) {
                    p.parse_expected(SyntaxKind::CommaToken)?;
                }
            }
            Ok(())
        })?;
        self.next_token();
        Ok(self.finish_node(
            pos,
            NodeData::ObjectLiteral {
                properties: NodeList::new(properties),
            },
        ))
    }

    // =========================================================================
    // Assignment targets
    // =========================================================================

    fn is_simple_target(&self, node: NodeIndex) -> bool {
        match self.arena.get(node).map(|n| &n.data) {
            Some(NodeData::Identifier { .. })
            | Some(NodeData::PropertyAccess { .. })
            | Some(NodeData::ElementAccess { .. }) => true,
            Some(NodeData::Parenthesized { expression }) => self.is_simple_target(*expression),
            _ => false,
        }
    }

    /// Turn the left side of `=` into an assignment target. Object and array
    /// literals become patterns; everything else must be a simple target.
    fn to_assignment_target(&mut self, node: NodeIndex) -> ParseResult<NodeIndex> {
        let data = self.arena.get(node).map(|n| n.data.clone());
        match data {
            Some(NodeData::ArrayLiteral { elements }) => {
                self.guarded(|p| p.array_literal_to_pattern(node, elements))
            }
            Some(NodeData::ObjectLiteral { properties }) => {
                self.guarded(|p| p.object_literal_to_pattern(node, properties))
            }
            Some(NodeData::ObjectPattern { .. }) | Some(NodeData::ArrayPattern { .. }) => Ok(node),
            _ if self.is_simple_target(node) => Ok(node),
            _ => Err(self.error_at_node(
                node,
                diagnostic_codes::INVALID_DESTRUCTURING_TARGET,
                diagnostic_messages::INVALID_DESTRUCTURING_TARGET.to_string(),
            )),
        }
    }

    fn array_literal_to_pattern(
        &mut self,
        node: NodeIndex,
        elements: NodeList,
    ) -> ParseResult<NodeIndex> {
        let count = elements.nodes.len();
        for (i, &element) in elements.nodes.iter().enumerate() {
            if element.is_none() {
                continue;
            }
            let spread = match self.arena.get(element).map(|n| &n.data) {
                Some(NodeData::SpreadElement { expression }) => Some(*expression),
                _ => None,
            };
            match spread {
                Some(expression) => {
                    if i + 1 != count {
                        return Err(self.error_at_node(
                            element,
                            diagnostic_codes::REST_ELEMENT_MUST_BE_LAST,
                            diagnostic_messages::REST_ELEMENT_MUST_BE_LAST.to_string(),
                        ));
                    }
                    let argument = self.to_assignment_target(expression)?;
                    self.arena
                        .reinterpret(element, NodeData::RestElement { argument });
                }
                None => {
                    self.to_assignment_target(element)?;
                }
            }
        }
        self.arena
            .reinterpret(node, NodeData::ArrayPattern { elements });
        Ok(node)
    }

    fn object_literal_to_pattern(
        &mut self,
        node: NodeIndex,
        properties: NodeList,
    ) -> ParseResult<NodeIndex> {
        for &property in &properties.nodes {
            let data = self.arena.get(property).map(|n| n.data.clone());
            match data {
                Some(NodeData::PropertyAssignment {
                    key,
                    computed,
                    initializer,
                }) => {
                    let value = self.to_assignment_target(initializer)?;
                    self.arena.reinterpret(
                        property,
                        NodeData::BindingProperty {
                            key,
                            computed,
                            value,
                        },
                    );
                }
                Some(NodeData::ShorthandPropertyAssignment { name }) => {
                    self.arena.reinterpret(
                        property,
                        NodeData::BindingProperty {
                            key: NodeIndex::NONE,
                            computed: false,
                            value: name,
                        },
                    );
                }
                _ => {
                    return Err(self.error_at_node(
                        property,
                        diagnostic_codes::INVALID_DESTRUCTURING_TARGET,
                        diagnostic_messages::INVALID_DESTRUCTURING_TARGET.to_string(),
                    ));
                }
            }
        }
        self.arena
            .reinterpret(node, NodeData::ObjectPattern { properties });
        Ok(node)
    }
}

fn assignment_operator(token: SyntaxKind) -> Option<Operator> {
    Some(match token {
        SyntaxKind::EqualsToken => Operator::Assign,
        SyntaxKind::PlusEqualsToken => Operator::AddAssign,
        SyntaxKind::MinusEqualsToken => Operator::SubtractAssign,
        SyntaxKind::AsteriskEqualsToken => Operator::MultiplyAssign,
        SyntaxKind::SlashEqualsToken => Operator::DivideAssign,
        SyntaxKind::PercentEqualsToken => Operator::RemainderAssign,
        SyntaxKind::LessThanLessThanEqualsToken => Operator::LeftShiftAssign,
        SyntaxKind::GreaterThanGreaterThanEqualsToken => Operator::RightShiftAssign,
        SyntaxKind::GreaterThanGreaterThanGreaterThanEqualsToken => {
            Operator::UnsignedRightShiftAssign
        }
        SyntaxKind::AmpersandEqualsToken => Operator::BitwiseAndAssign,
        SyntaxKind::BarEqualsToken => Operator::BitwiseOrAssign,
        SyntaxKind::CaretEqualsToken => Operator::BitwiseXorAssign,
        _ => return None,
    })
}

fn binary_operator(token: SyntaxKind) -> Option<(Operator, u8)> {
    Some(match token {
        SyntaxKind::BarBarToken => (Operator::LogicalOr, 1),
        SyntaxKind::AmpersandAmpersandToken => (Operator::LogicalAnd, 2),
        SyntaxKind::BarToken => (Operator::BitwiseOr, 3),
        SyntaxKind::CaretToken => (Operator::BitwiseXor, 4),
        SyntaxKind::AmpersandToken => (Operator::BitwiseAnd, 5),
        SyntaxKind::EqualsEqualsToken => (Operator::Equal, 6),
        SyntaxKind::ExclamationEqualsToken => (Operator::NotEqual, 6),
        SyntaxKind::EqualsEqualsEqualsToken => (Operator::StrictEqual, 6),
        SyntaxKind::ExclamationEqualsEqualsToken => (Operator::StrictNotEqual, 6),
        SyntaxKind::LessThanToken => (Operator::LessThan, 7),
        SyntaxKind::GreaterThanToken => (Operator::GreaterThan, 7),
        SyntaxKind::LessThanEqualsToken => (Operator::LessThanEqual, 7),
        SyntaxKind::GreaterThanEqualsToken => (Operator::GreaterThanEqual, 7),
        SyntaxKind::InstanceOfKeyword => (Operator::InstanceOf, 7),
        SyntaxKind::InKeyword => (Operator::In, 7),
        SyntaxKind::LessThanLessThanToken => (Operator::LeftShift, 8),
        SyntaxKind::GreaterThanGreaterThanToken => (Operator::RightShift, 8),
        SyntaxKind::GreaterThanGreaterThanGreaterThanToken => (Operator::UnsignedRightShift, 8),
        SyntaxKind::PlusToken => (Operator::Add, 9),
        SyntaxKind::MinusToken => (Operator::Subtract, 9),
        SyntaxKind::AsteriskToken => (Operator::Multiply, 10),
        SyntaxKind::SlashToken => (Operator::Divide, 10),
        SyntaxKind::PercentToken => (Operator::Remainder, 10),
        _ => return None,
    })
}

#[cfg(test)]
#[path = "tests/parser_tests.rs"]
mod parser_tests;
