// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Command-mode parsing.
//!
//! A command statement is a bareword name followed by arguments: options,
//! literals, interpolated strings, arrays, and sub-expression invocations.
//! Pipeline operators (`|`, `&&`, `||`) at command boundaries fold the
//! accumulated command into the left side of a `BinaryExpression`, with
//! `&&` binding tighter than `|` and `||`.
//!
//! The parser is the authority for two re-interpretations the lexer leaves
//! open:
//!
//! - a `-` operator adjacent to a bareword in an argument slot is a flag
//!   cluster, expanded to one single-letter `OptionKey` per character
//! - a bareword starting with a sigil (`~ @ % ^`), or a `*`/`!` operator
//!   adjacent to a literal, becomes a `PrefixExpression`

use ecow::EcoString;

use crate::ast::{NodeId, NodeKind};

use super::{Context, Parser};
use super::super::error::ParseErrorKind;
use super::super::grammar::{self, split_flag_cluster};
use super::super::token::{OptionPrefix, Token, TokenKind, TokenTag};
use super::super::Span;

/// Returns true when `b` starts exactly where `a` ended, with no
/// intervening bytes.
pub(super) fn adjacent(a: Span, b: Span) -> bool {
    a.end() == b.start()
}

impl Parser<'_> {
    /// Parses a command statement, folding any trailing pipeline.
    pub(super) fn parse_command_statement(&mut self) -> NodeId {
        let left = self.parse_single_command();
        self.parse_command_pipeline(left, 0)
    }

    /// Pratt loop over the pipeline operators joining commands.
    fn parse_command_pipeline(&mut self, mut left: NodeId, min_bp: u8) -> NodeId {
        loop {
            self.skip_trivia();
            let op = match self.lexer.peek().kind() {
                TokenKind::Operator(op) if grammar::is_pipeline_operator(op) => op.clone(),
                _ => break,
            };
            let Some(bp) = grammar::binding_power(&op) else {
                break;
            };
            if bp.left < min_bp {
                break;
            }

            let start = self
                .tree
                .node(left)
                .span()
                .map_or_else(|| self.current_start(), Span::start);
            let token = self.advance();
            let operator = self.tree.alloc(
                NodeKind::OperatorToken {
                    operator: op.clone(),
                },
                Some(token.span()),
            );

            self.skip_trivia();
            if self.is_at_end() || self.at_end_of_statement() || self.at_command_terminator() {
                return self.error_node(
                    ParseErrorKind::MissingExpression(op),
                    Some(left),
                    self.span_from(start),
                );
            }

            let next = self.parse_single_command();
            let right = self.parse_command_pipeline(next, bp.right);
            left = self.tree.alloc(
                NodeKind::BinaryExpression {
                    left,
                    operator,
                    right,
                },
                Some(self.span_from(start)),
            );
        }
        left
    }

    /// Returns true at a pipeline operator.
    fn at_pipeline_operator(&mut self) -> bool {
        matches!(
            self.lexer.peek().kind(),
            TokenKind::Operator(op) if grammar::is_pipeline_operator(op)
        )
    }

    /// Returns true at a closer that ends a command in the current context.
    pub(super) fn at_command_terminator(&mut self) -> bool {
        if self.at_special('}') {
            return true;
        }
        match self.contexts.last().copied() {
            Some(Context::Parens | Context::Inner) => self.at_special(')'),
            Some(Context::Call) => self.at_special(')') || self.at_special(','),
            Some(Context::Array) => self.at_special(']') || self.at_special(','),
            Some(Context::Object) => self.at_special(','),
            None => false,
        }
    }

    /// Parses one command: name plus arguments, no pipeline.
    fn parse_single_command(&mut self) -> NodeId {
        self.skip_trivia();
        let start = self.current_start();

        let TokenKind::String {
            value,
            quotes: None,
            ..
        } = self.lexer.peek().kind().clone()
        else {
            // An unterminated literal is its own diagnostic, not a
            // generic unexpected-token.
            if self
                .lexer
                .peek()
                .has_flag(super::super::token::TokenFlags::UNTERMINATED_STRING)
            {
                let token = self.advance();
                return match token.kind() {
                    TokenKind::InterpolatedString { .. } => self.interpolated_string_node(&token),
                    _ => self.string_node_from_token(&token),
                };
            }
            let span = self.current_span();
            let text = EcoString::from(self.lexer.peek().kind().to_string());
            if !self.is_at_end() && !self.at_end_of_statement() && !self.at_command_terminator() {
                self.advance();
            }
            let id = self.error_node(ParseErrorKind::UnexpectedToken(text), None, span);
            self.synchronize();
            return id;
        };

        let name_token = self.advance();

        // Explicit call form: name immediately followed by `(`.
        if self.at_special('(') && adjacent(name_token.span(), self.current_span()) {
            return self.parse_call_form(&name_token, &value);
        }

        let name = self.tree.alloc(
            NodeKind::String {
                text: value,
                quotes: None,
                unterminated: false,
            },
            Some(name_token.span()),
        );
        let command = self
            .tree
            .alloc(NodeKind::CommandName { name }, Some(name_token.span()));

        let mut children = Vec::new();
        let mut unterminated = false;
        loop {
            self.skip_trivia();
            if self.is_at_end() {
                // End of input is a normal statement end at top level, but
                // cuts the command short when a closer is still pending.
                unterminated = !self.contexts.is_empty();
                break;
            }
            if self.at_end_of_statement()
                || self.at_pipeline_operator()
                || self.at_command_terminator()
            {
                break;
            }
            self.parse_argument_into(&mut children);
        }

        self.tree.alloc(
            NodeKind::CommandStatement {
                command,
                children,
                unterminated,
            },
            Some(self.span_from(start)),
        )
    }

    /// Parses one argument slot, which may contribute several nodes (a
    /// single-dash flag cluster expands to one `OptionKey` per letter).
    fn parse_argument_into(&mut self, children: &mut Vec<NodeId>) {
        if self.at_operator("-") {
            let dash = self.advance();
            if let TokenKind::String {
                value,
                quotes: None,
                ..
            } = self.lexer.peek().kind().clone()
            {
                let cluster_adjacent = adjacent(dash.span(), self.current_span());
                if cluster_adjacent && value.bytes().all(|b| b.is_ascii_alphanumeric()) {
                    let cluster = self.advance();
                    let base = cluster.span().start();
                    for (i, flag) in split_flag_cluster(&value).into_iter().enumerate() {
                        let offset = u32::try_from(i).unwrap_or(u32::MAX);
                        children.push(self.tree.alloc(
                            NodeKind::OptionKey {
                                flag,
                                prefix: OptionPrefix::Short,
                            },
                            Some(Span::new(base + offset, base + offset + 1)),
                        ));
                    }
                    return;
                }
            }
            // A lone dash degrades into a bareword argument.
            children.push(self.tree.alloc(
                NodeKind::String {
                    text: "-".into(),
                    quotes: None,
                    unterminated: false,
                },
                Some(dash.span()),
            ));
            return;
        }
        let node = self.parse_argument_node();
        children.push(node);
    }

    /// Parses a single-node argument.
    fn parse_argument_node(&mut self) -> NodeId {
        let start = self.current_start();
        let kind = self.lexer.peek().kind().clone();
        match kind {
            TokenKind::Option { value, prefix } => {
                let token = self.advance();
                let option = self.tree.alloc(
                    NodeKind::OptionKey {
                        flag: value,
                        prefix,
                    },
                    Some(token.span()),
                );
                // A long option adjacent to a value reduces to a pair.
                if prefix == OptionPrefix::Long && self.at_option_value() {
                    let expression = self.parse_argument_node();
                    return self.tree.alloc(
                        NodeKind::OptionExpression { option, expression },
                        Some(self.span_from(start)),
                    );
                }
                option
            }

            TokenKind::Operator(op) if op == "*" || op == "!" => {
                let token = self.advance();
                if self.at_option_value() && adjacent(token.span(), self.current_span()) {
                    let prefix = self.tree.alloc(
                        NodeKind::PrefixToken {
                            value: if op == "*" { '*' } else { '!' },
                        },
                        Some(token.span()),
                    );
                    let expression = self.parse_argument_node();
                    return self.tree.alloc(
                        NodeKind::PrefixExpression { prefix, expression },
                        Some(self.span_from(start)),
                    );
                }
                // A bare sigil degrades into a bareword argument.
                self.tree.alloc(
                    NodeKind::String {
                        text: op,
                        quotes: None,
                        unterminated: false,
                    },
                    Some(token.span()),
                )
            }

            TokenKind::String { value, quotes, .. } => {
                let token = self.advance();
                if quotes.is_none() {
                    if self.at_special('(') && adjacent(token.span(), self.current_span()) {
                        return self.parse_call_form(&token, &value);
                    }
                    if let Some(node) = self.split_sigil_bareword(&token, &value) {
                        return node;
                    }
                    return self.tree.alloc(
                        NodeKind::String {
                            text: value,
                            quotes: None,
                            unterminated: false,
                        },
                        Some(token.span()),
                    );
                }
                self.string_node_from_token(&token)
            }

            TokenKind::InterpolatedString { .. } => {
                let token = self.advance();
                self.interpolated_string_node(&token)
            }

            TokenKind::Number { value, raw } => {
                let token = self.advance();
                self.tree
                    .alloc(NodeKind::Number { value, raw }, Some(token.span()))
            }

            TokenKind::Boolean { value } => {
                let token = self.advance();
                self.tree
                    .alloc(NodeKind::Boolean { value }, Some(token.span()))
            }

            TokenKind::Identifier(name) => {
                let token = self.advance();
                if name.is_empty() {
                    return self.parse_empty_identifier(&token);
                }
                let node = self
                    .tree
                    .alloc(NodeKind::Identifier { name }, Some(token.span()));
                self.check_trailing_dot(node, token.span())
            }

            TokenKind::PropertyAccess { .. } => {
                let token = self.advance();
                let chain = self.property_chain_node(&token);
                self.check_trailing_dot(chain, token.span())
            }

            TokenKind::Special('[') => self.parse_array_literal(),
            TokenKind::Special('(') => self.parse_parenthesized(),

            // A `.` with nothing to attach to never forms a chain.
            TokenKind::Special('.') => {
                let token = self.advance();
                self.error_node(ParseErrorKind::InvalidPropertyAccess, None, token.span())
            }

            _ => {
                let span = self.current_span();
                let text = EcoString::from(self.lexer.peek().kind().to_string());
                self.advance();
                self.error_node(ParseErrorKind::UnexpectedToken(text), None, span)
            }
        }
    }

    /// Returns true if the current token can open an option's value or a
    /// prefix's operand.
    fn at_option_value(&mut self) -> bool {
        if self.is_at_end()
            || self.at_end_of_statement()
            || self.at_pipeline_operator()
            || self.at_command_terminator()
        {
            return false;
        }
        self.lexer.is_next_of_any_kind(&[
            TokenTag::String,
            TokenTag::InterpolatedString,
            TokenTag::Number,
            TokenTag::Boolean,
            TokenTag::Identifier,
            TokenTag::PropertyAccess,
        ]) || self.at_special('[')
            || self.at_special('(')
    }

    /// Wraps `expression` when a stray `.` immediately follows it. The
    /// scanner only attaches `.name` runs, so a dot left behind means the
    /// property access was malformed (`$x.`, `$x.(`), not merely
    /// unexpected.
    pub(super) fn check_trailing_dot(&mut self, expression: NodeId, span: Span) -> NodeId {
        if self.at_special('.') && adjacent(span, self.current_span()) {
            let dot = self.advance();
            return self.error_node(
                ParseErrorKind::InvalidPropertyAccess,
                Some(expression),
                span.merge(dot.span()),
            );
        }
        expression
    }

    /// Splits a bareword opening with a sigil (`~ @ % ^`) into a
    /// `PrefixExpression`. `*` and `!` never reach here; they lex as
    /// operators and are handled in [`Parser::parse_argument_node`].
    fn split_sigil_bareword(&mut self, token: &Token, value: &EcoString) -> Option<NodeId> {
        let first = *value.as_bytes().first()?;
        if !grammar::is_prefix_byte(first) || value.len() < 2 {
            return None;
        }
        let span = token.span();
        let prefix = self.tree.alloc(
            NodeKind::PrefixToken {
                value: first as char,
            },
            Some(Span::new(span.start(), span.start() + 1)),
        );
        let rest = EcoString::from(&value[1..]);
        let expression = self.tree.alloc(
            NodeKind::String {
                text: rest,
                quotes: None,
                unterminated: false,
            },
            Some(Span::new(span.start() + 1, span.end())),
        );
        Some(self.tree.alloc(
            NodeKind::PrefixExpression { prefix, expression },
            Some(span),
        ))
    }

    // ========================================================================
    // Sub-expression invocations
    // ========================================================================

    /// Parses `$( ... )` after its empty-named `$` identifier token has
    /// been consumed. A `$` with neither a name nor a `(` is an invalid
    /// variable name.
    pub(super) fn parse_empty_identifier(&mut self, token: &Token) -> NodeId {
        if self.at_special('(') && adjacent(token.span(), self.current_span()) {
            return self.parse_inner_expression(token.span().start());
        }
        self.error_node(ParseErrorKind::InvalidVariableName, None, token.span())
    }

    /// Parses the body of `$( ... )`: a command (with pipelines), a
    /// variable statement, or a plain expression.
    fn parse_inner_expression(&mut self, start: u32) -> NodeId {
        self.advance(); // (
        self.contexts.push(Context::Inner);
        self.skip_trivia();

        let kind = self.lexer.peek().kind().clone();
        let expression = match kind {
            TokenKind::String { quotes: None, .. } => self.parse_command_statement(),
            TokenKind::Identifier(ref name) if !name.is_empty() => {
                self.parse_identifier_statement_inner()
            }
            _ => self.parse_expression(0),
        };

        self.skip_trivia();
        let closed = self.eat_special(')');
        self.contexts.pop();

        let inner = self.tree.alloc(
            NodeKind::InnerExpression { expression },
            Some(self.span_from(start)),
        );
        if closed {
            inner
        } else {
            self.error_node(ParseErrorKind::Unclosed(')'), Some(inner), self.span_from(start))
        }
    }

    /// Parses `$name = expression` or a plain value expression inside
    /// `$( ... )`.
    fn parse_identifier_statement_inner(&mut self) -> NodeId {
        let start = self.current_start();
        let token = self.advance();
        let TokenKind::Identifier(name) = token.kind().clone() else {
            unreachable!("caller checked the token kind");
        };
        let identifier = self
            .tree
            .alloc(NodeKind::Identifier { name }, Some(token.span()));
        self.skip_trivia();

        if self.at_operator("=") {
            self.advance(); // =
            self.skip_trivia();
            let expression = self.parse_expression(0);
            let declaration = self.tree.alloc(
                NodeKind::VariableDeclaration {
                    identifier,
                    expression,
                },
                Some(self.span_from(start)),
            );
            return self.tree.alloc(
                NodeKind::VariableStatement { declaration },
                Some(self.span_from(start)),
            );
        }
        self.parse_binary_rest(identifier, 0)
    }

    /// Parses the explicit call form `name(arg, arg)` into an
    /// `InnerExpression` wrapping a `CommandStatement`. Arguments are
    /// comma-separated expressions.
    pub(super) fn parse_call_form(&mut self, name_token: &Token, name_text: &EcoString) -> NodeId {
        let start = name_token.span().start();
        let name = self.tree.alloc(
            NodeKind::String {
                text: name_text.clone(),
                quotes: None,
                unterminated: false,
            },
            Some(name_token.span()),
        );
        let command = self
            .tree
            .alloc(NodeKind::CommandName { name }, Some(name_token.span()));

        self.advance(); // (
        self.contexts.push(Context::Call);

        let mut children = Vec::new();
        let mut closed = false;
        loop {
            self.skip_trivia();
            if self.at_end_of_statement() {
                self.advance();
                continue;
            }
            if self.eat_special(')') {
                closed = true;
                break;
            }
            if self.is_at_end() {
                break;
            }
            children.push(self.parse_expression(0));
            self.skip_trivia();
            if self.eat_special(',') {
                continue;
            }
            if self.eat_special(')') {
                closed = true;
                break;
            }
            if !self.is_at_end() && !self.at_end_of_statement() {
                let token = self.advance();
                let text = EcoString::from(token.kind().to_string());
                let id =
                    self.error_node(ParseErrorKind::UnexpectedToken(text), None, token.span());
                children.push(id);
            }
        }
        self.contexts.pop();

        let statement = self.tree.alloc(
            NodeKind::CommandStatement {
                command,
                children,
                unterminated: !closed,
            },
            Some(self.span_from(start)),
        );
        let inner = self.tree.alloc(
            NodeKind::InnerExpression {
                expression: statement,
            },
            Some(self.span_from(start)),
        );
        if closed {
            inner
        } else {
            self.error_node(
                ParseErrorKind::Unclosed(')'),
                Some(inner),
                self.span_from(start),
            )
        }
    }

    // ========================================================================
    // Token-to-node builders shared with expression mode
    // ========================================================================

    /// Builds a `String` node from a quoted string token, wrapping
    /// unterminated literals in an `Invalid` node.
    pub(super) fn string_node_from_token(&mut self, token: &Token) -> NodeId {
        let TokenKind::String {
            value,
            quotes,
            closed,
        } = token.kind().clone()
        else {
            unreachable!("caller checked the token kind");
        };
        let node = self.tree.alloc(
            NodeKind::String {
                text: value,
                quotes,
                unterminated: !closed,
            },
            Some(token.span()),
        );
        if closed {
            node
        } else {
            self.error_node(ParseErrorKind::UnterminatedString, Some(node), token.span())
        }
    }

    /// Builds an `InterpolatedString` node with alternating `String` and
    /// `Identifier` children from an interpolated token.
    pub(super) fn interpolated_string_node(&mut self, token: &Token) -> NodeId {
        let TokenKind::InterpolatedString {
            values,
            variables,
            quotes,
            closed,
        } = token.kind().clone()
        else {
            unreachable!("caller checked the token kind");
        };

        let mut nodes = Vec::new();
        for (i, variable) in variables.iter().enumerate() {
            if let Some(chunk) = values.get(i) {
                nodes.push(self.tree.alloc(
                    NodeKind::String {
                        text: chunk.clone(),
                        quotes: None,
                        unterminated: false,
                    },
                    None,
                ));
            }
            nodes.push(self.tree.alloc(
                NodeKind::Identifier {
                    name: variable.clone(),
                },
                None,
            ));
        }
        if values.len() == variables.len() + 1 {
            if let Some(tail) = values.last() {
                nodes.push(self.tree.alloc(
                    NodeKind::String {
                        text: tail.clone(),
                        quotes: None,
                        unterminated: false,
                    },
                    None,
                ));
            }
        }

        let node = self.tree.alloc(
            NodeKind::InterpolatedString {
                values: nodes,
                quotes,
            },
            Some(token.span()),
        );
        if closed {
            node
        } else {
            self.error_node(ParseErrorKind::UnterminatedString, Some(node), token.span())
        }
    }

    /// Builds the node chain for `$name.prop.prop`: property segments
    /// become `PropertyAccessExpression` links, all-digit segments become
    /// `ArrayIndexExpression` links.
    pub(super) fn property_chain_node(&mut self, token: &Token) -> NodeId {
        let TokenKind::PropertyAccess { name, properties } = token.kind().clone() else {
            unreachable!("caller checked the token kind");
        };

        let start = token.span().start();
        let name_len = u32::try_from(name.len()).unwrap_or(u32::MAX);
        let mut cursor = start + 1 + name_len; // past `$name`
        let mut expression = self.tree.alloc(
            NodeKind::Identifier { name },
            Some(Span::new(start, cursor)),
        );

        for property in properties {
            let prop_len = u32::try_from(property.len()).unwrap_or(u32::MAX);
            let segment = Span::new(cursor + 1, cursor + 1 + prop_len); // past `.`
            cursor = segment.end();
            let outer = Span::new(start, cursor);

            if !property.is_empty() && property.bytes().all(|b| b.is_ascii_digit()) {
                let value = property.parse::<f64>().unwrap_or_default();
                let index = self.tree.alloc(
                    NodeKind::Number {
                        value,
                        raw: property,
                    },
                    Some(segment),
                );
                expression = self.tree.alloc(
                    NodeKind::ArrayIndexExpression { expression, index },
                    Some(outer),
                );
            } else {
                let name = self
                    .tree
                    .alloc(NodeKind::Identifier { name: property }, Some(segment));
                expression = self.tree.alloc(
                    NodeKind::PropertyAccessExpression { expression, name },
                    Some(outer),
                );
            }
        }
        expression
    }
}
