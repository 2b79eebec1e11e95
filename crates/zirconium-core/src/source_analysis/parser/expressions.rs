// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Expression-mode parsing (Pratt precedence).
//!
//! Used inside `(...)`, on the right of `=`, inside array and object
//! literals, as `if`/`for` conditions, and inside `$(...)`. Binary
//! operators come from the grammar's binding-power table; all levels are
//! left-associative with ties broken by token order.

use ecow::EcoString;

use crate::ast::{NodeId, NodeKind};

use super::commands::adjacent;
use super::{Context, Parser};
use super::super::error::ParseErrorKind;
use super::super::grammar;
use super::super::token::TokenKind;
use super::super::Span;

impl Parser<'_> {
    /// Parses an expression with the given minimum binding power.
    pub(super) fn parse_expression(&mut self, min_bp: u8) -> NodeId {
        self.skip_trivia();
        let left = self.parse_prefix_expression();
        self.parse_binary_rest(left, min_bp)
    }

    /// Continues a Pratt loop over binary operators after `left`.
    pub(super) fn parse_binary_rest(&mut self, mut left: NodeId, min_bp: u8) -> NodeId {
        loop {
            self.skip_trivia();
            let op = match self.lexer.peek().kind() {
                TokenKind::Operator(op) => op.clone(),
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
            if self.at_expression_end() {
                return self.error_node(
                    ParseErrorKind::MissingExpression(op),
                    Some(left),
                    self.span_from(start),
                );
            }

            let right = self.parse_expression(bp.right);
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

    /// Returns true where no expression can start: a terminator, a closer
    /// for the current context, or end of input.
    fn at_expression_end(&mut self) -> bool {
        if self.is_at_end() || self.at_end_of_statement() {
            return true;
        }
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

    /// Parses one prefix production.
    fn parse_prefix_expression(&mut self) -> NodeId {
        let kind = self.lexer.peek().kind().clone();
        match kind {
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

            TokenKind::String { value, quotes, .. } => {
                let token = self.advance();
                if quotes.is_none() {
                    if self.at_special('(') && adjacent(token.span(), self.current_span()) {
                        return self.parse_call_form(&token, &value);
                    }
                    // In expression position a bareword is a plain string.
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

            TokenKind::Special('(') => self.parse_parenthesized(),
            TokenKind::Special('[') => self.parse_array_literal(),
            TokenKind::Special('{') => self.parse_object_literal(),

            // A `.` with nothing to attach to never forms a chain.
            TokenKind::Special('.') => {
                let token = self.advance();
                self.error_node(ParseErrorKind::InvalidPropertyAccess, None, token.span())
            }

            TokenKind::Operator(op) if grammar::UNARY_OPERATORS.contains(&op.as_str()) => {
                let token = self.advance();
                self.skip_trivia();
                if self.at_expression_end() {
                    return self.error_node(
                        ParseErrorKind::MissingExpression(op),
                        None,
                        token.span(),
                    );
                }
                let expression = self.parse_prefix_expression();
                let span = self.span_from(token.span().start());
                self.tree.alloc(
                    NodeKind::UnaryExpression {
                        operator: op,
                        expression,
                    },
                    Some(span),
                )
            }

            _ => {
                let span = self.current_span();
                let text = EcoString::from(self.lexer.peek().kind().to_string());
                if self.at_expression_end() {
                    // The offending token stays unconsumed for the caller,
                    // so anchor the wrapper to text already consumed.
                    let anchor = self.span_from(self.last_span.start());
                    return self.error_node(ParseErrorKind::MissingExpression(text), None, anchor);
                }
                self.advance();
                self.error_node(ParseErrorKind::UnexpectedToken(text), None, span)
            }
        }
    }

    /// Parses `( expression )`.
    pub(super) fn parse_parenthesized(&mut self) -> NodeId {
        let start = self.current_start();
        self.advance(); // (
        self.contexts.push(Context::Parens);
        self.skip_trivia();

        let expression = self.parse_expression(0);

        self.skip_trivia();
        let closed = self.eat_special(')');
        self.contexts.pop();

        let node = self.tree.alloc(
            NodeKind::ParenthesizedExpression { expression },
            Some(self.span_from(start)),
        );
        if closed {
            node
        } else {
            self.error_node(ParseErrorKind::Unclosed(')'), Some(node), self.span_from(start))
        }
    }

    /// Parses `[ expr, expr, ... ]`. Newlines inside the brackets are
    /// element separators' whitespace, not statement terminators.
    pub(super) fn parse_array_literal(&mut self) -> NodeId {
        let start = self.current_start();
        self.advance(); // [
        self.contexts.push(Context::Array);

        let mut values = Vec::new();
        let mut closed = false;
        loop {
            self.skip_trivia();
            if self.at_end_of_statement() {
                self.advance();
                continue;
            }
            if self.eat_special(']') {
                closed = true;
                break;
            }
            if self.is_at_end() {
                break;
            }

            values.push(self.parse_expression(0));

            self.skip_trivia();
            if self.eat_special(',') {
                continue;
            }
            if self.eat_special(']') {
                closed = true;
                break;
            }
            if self.at_end_of_statement() {
                continue;
            }
            if !self.is_at_end() {
                let token = self.advance();
                let text = EcoString::from(token.kind().to_string());
                let id =
                    self.error_node(ParseErrorKind::UnexpectedToken(text), None, token.span());
                values.push(id);
            }
        }
        self.contexts.pop();

        let node = self.tree.alloc(
            NodeKind::ArrayLiteral { values },
            Some(self.span_from(start)),
        );
        if closed {
            node
        } else {
            self.error_node(ParseErrorKind::Unclosed(']'), Some(node), self.span_from(start))
        }
    }

    /// Parses `{ key: value, ... }` (expression position only; `{` at
    /// statement start always opens a block).
    fn parse_object_literal(&mut self) -> NodeId {
        let start = self.current_start();
        self.advance(); // {
        self.contexts.push(Context::Object);

        let mut values = Vec::new();
        let mut closed = false;
        loop {
            self.skip_trivia();
            if self.at_end_of_statement() {
                self.advance();
                continue;
            }
            if self.eat_special('}') {
                closed = true;
                break;
            }
            if self.is_at_end() {
                break;
            }

            if let Some(assignment) = self.parse_property_assignment() {
                values.push(assignment);
            }

            self.skip_trivia();
            if self.eat_special(',') {
                continue;
            }
            if self.eat_special('}') {
                closed = true;
                break;
            }
            if self.at_end_of_statement() {
                continue;
            }
            if !self.is_at_end() {
                let token = self.advance();
                let text = EcoString::from(token.kind().to_string());
                let id =
                    self.error_node(ParseErrorKind::UnexpectedToken(text), None, token.span());
                values.push(id);
            }
        }
        self.contexts.pop();

        let node = self.tree.alloc(
            NodeKind::ObjectLiteral { values },
            Some(self.span_from(start)),
        );
        if closed {
            node
        } else {
            self.error_node(ParseErrorKind::Unclosed('}'), Some(node), self.span_from(start))
        }
    }

    /// Parses one `key: value` pair of an object literal.
    fn parse_property_assignment(&mut self) -> Option<NodeId> {
        let start = self.current_start();
        let kind = self.lexer.peek().kind().clone();
        let name = match kind {
            TokenKind::String { value, quotes, .. } => {
                let token = self.advance();
                self.tree.alloc(
                    NodeKind::String {
                        text: value,
                        quotes,
                        unterminated: false,
                    },
                    Some(token.span()),
                )
            }
            TokenKind::Identifier(name) if !name.is_empty() => {
                let token = self.advance();
                self.tree
                    .alloc(NodeKind::Identifier { name }, Some(token.span()))
            }
            _ => {
                let token = self.advance();
                let text = EcoString::from(token.kind().to_string());
                return Some(self.error_node(
                    ParseErrorKind::UnexpectedToken(text),
                    None,
                    token.span(),
                ));
            }
        };

        self.skip_trivia();
        if !self.eat_special(':') {
            // Anchor to the key; the token that should have been `:` is
            // left for the enclosing literal to consume.
            let span = self.span_from(self.last_span.start());
            return Some(self.error_node(
                ParseErrorKind::MissingExpression(":".into()),
                Some(name),
                span,
            ));
        }

        self.skip_trivia();
        let initializer = self.parse_expression(0);
        Some(self.tree.alloc(
            NodeKind::PropertyAssignment { name, initializer },
            Some(self.span_from(start)),
        ))
    }
}
