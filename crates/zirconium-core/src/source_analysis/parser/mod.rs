// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Recursive descent parser for Zirconium source code.
//!
//! Statements are parsed top-down; expressions use Pratt precedence (see
//! [`expressions`]). The parser is built for tooling:
//!
//! - **Error recovery is mandatory** - a parse always produces a `Source`
//!   root, with `Invalid` nodes standing in for unparseable input
//! - **Multiple errors** - every problem is reported, not just the first
//! - **Precise spans** - nodes carry the byte range of the tokens that
//!   produced them
//! - **Synchronization points** - recovery resumes at statement boundaries
//!   and closing delimiters
//!
//! # Command mode and expression mode
//!
//! At statement start a bareword opens a command, and subsequent tokens are
//! arguments and options. Inside `(...)`, `$(...)`, `[...]`, object
//! literals, and the right-hand side of `=`, the same tokens are Pratt
//! expressions. The parser flips between the two at each decision point;
//! the lexer stays context-free.
//!
//! # Usage
//!
//! ```
//! use zirconium_core::source_analysis::parse;
//!
//! let result = parse("cmd hello 1337");
//! assert!(result.errors.is_empty());
//! ```

use ecow::EcoString;

use crate::ast::{NodeId, NodeKind, Tree};

use super::error::{NodeError, ParseErrorKind};
use super::grammar::{self, Keyword};
use super::lexer::{Lexer, LexerOptions};
use super::token::{Token, TokenFlags, TokenKind, TokenTag};
use super::Span;

mod commands;
mod expressions;

#[cfg(test)]
mod property_tests;

/// The outcome of a parse: the tree, its root, and every diagnostic.
///
/// A non-empty `errors` vector means "compiled with diagnostics"; the tree
/// is still complete and walkable.
#[derive(Debug, Clone)]
pub struct ParseResult {
    /// The arena owning every node of this parse.
    pub tree: Tree,
    /// The `Source` root.
    pub root: NodeId,
    /// Accumulated diagnostics, in source order of discovery.
    pub errors: Vec<NodeError>,
}

impl ParseResult {
    /// Returns true if the parse produced no diagnostics.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Parses a source string with default lexer options.
///
/// This is the main entry point. It always returns a [`ParseResult`], even
/// for malformed input; check [`ParseResult::errors`].
///
/// # Examples
///
/// ```
/// use zirconium_core::ast::NodeKind;
/// use zirconium_core::source_analysis::parse;
///
/// let result = parse("$x = 42");
/// let NodeKind::Source { children } = result.tree.kind(result.root) else {
///     unreachable!()
/// };
/// assert_eq!(children.len(), 1);
/// ```
#[must_use]
pub fn parse(source: &str) -> ParseResult {
    parse_with_options(source, LexerOptions::default())
}

/// Parses a source string with explicit lexer options.
#[must_use]
pub fn parse_with_options(source: &str, options: LexerOptions) -> ParseResult {
    let mut parser = Parser::new(Lexer::with_options(source, options));
    let root = parser.parse_source();
    ParseResult {
        tree: parser.tree,
        root,
        errors: parser.errors,
    }
}

/// Checks whether source text looks syntactically complete for line-based
/// input.
///
/// Embedding hosts with consoles or chat boxes use this to decide whether
/// to evaluate the buffer or show a continuation prompt. It reports
/// incomplete when:
///
/// - a `{`, `[`, or `(` has no matching closer
/// - a string literal is unterminated
/// - the last significant token is a binary operator expecting an operand
/// - the input ends in a `\` line continuation
///
/// Extra closers (`}` alone) count as complete so the evaluator reports
/// the syntax error instead of waiting forever.
///
/// # Examples
///
/// ```
/// use zirconium_core::source_analysis::is_input_complete;
///
/// assert!(is_input_complete("cmd one two"));
/// assert!(!is_input_complete("if $x {"));
/// assert!(!is_input_complete("$x = 1 +"));
/// ```
#[must_use]
pub fn is_input_complete(source: &str) -> bool {
    if source.trim().is_empty() {
        return true;
    }

    let tokens = super::lexer::lex(source);

    let mut paren_depth: i32 = 0;
    let mut bracket_depth: i32 = 0;
    let mut brace_depth: i32 = 0;
    let mut last_kind: Option<&TokenKind> = None;

    for token in &tokens {
        if token.has_flag(TokenFlags::UNTERMINATED_STRING) {
            return false;
        }
        match token.kind() {
            TokenKind::Special('(') => paren_depth += 1,
            TokenKind::Special(')') => paren_depth -= 1,
            TokenKind::Special('[') => bracket_depth += 1,
            TokenKind::Special(']') => bracket_depth -= 1,
            TokenKind::Special('{') => brace_depth += 1,
            TokenKind::Special('}') => brace_depth -= 1,
            _ => {}
        }
        if !token.kind().is_trivia() {
            last_kind = Some(token.kind());
        }
    }

    if paren_depth > 0 || bracket_depth > 0 || brace_depth > 0 {
        return false;
    }

    match last_kind {
        // A trailing operator still wants its right operand.
        Some(TokenKind::Operator(op)) if grammar::binding_power(op).is_some() => false,
        // A trailing backslash asks for the next line.
        Some(TokenKind::Special('\\')) => false,
        _ => true,
    }
}

/// The parsing context the parser is currently inside, used to decide
/// which closing tokens terminate a command or expression.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum Context {
    /// Inside `[ ... ]`.
    Array,
    /// Inside an object literal `{ ... }`.
    Object,
    /// Inside `( ... )`.
    Parens,
    /// Inside the argument list of `name( ... )`.
    Call,
    /// Inside `$( ... )`.
    Inner,
}

/// The parser state.
pub(super) struct Parser<'src> {
    /// Token source.
    pub(super) lexer: Lexer<'src>,
    /// The arena nodes are allocated into.
    pub(super) tree: Tree,
    /// Accumulated diagnostics.
    pub(super) errors: Vec<NodeError>,
    /// Stack of enclosing contexts.
    pub(super) contexts: Vec<Context>,
    /// Span of the most recently consumed token, for node span stamping.
    pub(super) last_span: Span,
}

impl<'src> Parser<'src> {
    fn new(lexer: Lexer<'src>) -> Self {
        Self {
            lexer,
            tree: Tree::new(),
            errors: Vec::new(),
            contexts: Vec::new(),
            last_span: Span::point(0),
        }
    }

    // ========================================================================
    // Token Management
    // ========================================================================

    /// Consumes the current token and remembers its span.
    pub(super) fn advance(&mut self) -> Token {
        let token = self.lexer.next();
        if !token.kind().is_eof() {
            self.last_span = token.span();
        }
        token
    }

    /// Returns true at end of input.
    pub(super) fn is_at_end(&mut self) -> bool {
        !self.lexer.has_next()
    }

    /// Returns true if the current token has the given tag.
    pub(super) fn at(&mut self, tag: TokenTag) -> bool {
        self.lexer.is_next_of_kind(tag)
    }

    /// Returns true at the given punctuation character.
    pub(super) fn at_special(&mut self, c: char) -> bool {
        self.lexer.peek().kind().is_special(c)
    }

    /// Returns true at the given operator spelling.
    pub(super) fn at_operator(&mut self, op: &str) -> bool {
        self.lexer.peek().kind().is_operator(op)
    }

    /// Returns true at a statement terminator.
    pub(super) fn at_end_of_statement(&mut self) -> bool {
        self.at(TokenTag::EndOfStatement)
    }

    /// Returns true at the given keyword.
    pub(super) fn at_keyword(&mut self, keyword: Keyword) -> bool {
        matches!(self.lexer.peek().kind(), TokenKind::Keyword(k) if *k == keyword)
    }

    /// Consumes the current token if it is the given punctuation.
    pub(super) fn eat_special(&mut self, c: char) -> bool {
        if self.at_special(c) {
            self.advance();
            true
        } else {
            false
        }
    }

    /// Byte offset where the current token starts.
    pub(super) fn current_start(&mut self) -> u32 {
        self.lexer.peek().span().start()
    }

    /// Span of the current token.
    pub(super) fn current_span(&mut self) -> Span {
        self.lexer.peek().span()
    }

    /// Span from `start` through the last consumed token.
    pub(super) fn span_from(&self, start: u32) -> Span {
        Span::new(start, self.last_span.end().max(start))
    }

    /// Skips whitespace/comment tokens and `\`-newline line continuations.
    ///
    /// This is the only place `\` is recognised outside string escapes: a
    /// `\` punctuation token immediately followed by a newline swallows
    /// both, so the newline never terminates the statement. A `\` followed
    /// by anything else is left in the stream and reported by whatever
    /// production consumes it, so its `Invalid` node lands in the tree.
    pub(super) fn skip_trivia(&mut self) {
        loop {
            if self.at(TokenTag::Whitespace) || self.at(TokenTag::Comment) {
                self.advance();
                continue;
            }
            if self.at_special('\\')
                && matches!(
                    self.lexer.peek_second().kind(),
                    TokenKind::EndOfStatement('\n')
                )
            {
                self.advance(); // backslash
                self.advance(); // newline
                continue;
            }
            break;
        }
    }

    // ========================================================================
    // Error Handling & Recovery
    // ========================================================================

    /// Allocates an `Invalid` node and records the matching diagnostic.
    pub(super) fn error_node(
        &mut self,
        kind: ParseErrorKind,
        expression: Option<NodeId>,
        span: Span,
    ) -> NodeId {
        let id = self.tree.invalid(expression, kind.to_string(), Some(span));
        self.errors.push(NodeError::new(id, &kind));
        id
    }

    /// Advances to a safe recovery point: a statement terminator, a closing
    /// delimiter, or end of input. The recovery token itself is left for
    /// the caller.
    pub(super) fn synchronize(&mut self) {
        while !self.is_at_end() {
            if self.at_end_of_statement() {
                return;
            }
            if self.at_special('}') || self.at_special(')') || self.at_special(']') {
                return;
            }
            self.advance();
        }
    }

    // ========================================================================
    // Statements
    // ========================================================================

    /// Parses the whole input into a `Source` root.
    fn parse_source(&mut self) -> NodeId {
        let mut children = Vec::new();
        loop {
            self.skip_trivia();
            if self.is_at_end() {
                break;
            }
            if self.at_end_of_statement() {
                self.advance();
                continue;
            }
            // A stray closer at top level has no production; report it and
            // keep the wrapper as a child so post-walks can find it.
            if self.at_special('}') || self.at_special(')') || self.at_special(']') {
                let token = self.advance();
                let text = EcoString::from(token.kind().to_string());
                let id =
                    self.error_node(ParseErrorKind::UnexpectedToken(text), None, token.span());
                children.push(id);
                continue;
            }
            children.push(self.parse_statement());
        }
        let span = Span::new(0, self.last_span.end());
        self.tree.alloc(NodeKind::Source { children }, Some(span))
    }

    /// Parses one statement, dispatching on the current token.
    pub(super) fn parse_statement(&mut self) -> NodeId {
        self.skip_trivia();
        if self.at_keyword(Keyword::Function) {
            return self.parse_function_declaration();
        }
        if self.at_keyword(Keyword::If) {
            return self.parse_if_statement();
        }
        if self.at_keyword(Keyword::For) {
            return self.parse_for_in_statement();
        }
        if self.at_special('{') {
            return self.parse_block();
        }
        if self.at(TokenTag::Identifier) {
            return self.parse_identifier_statement();
        }
        if self.at(TokenTag::PropertyAccess) {
            let token = self.advance();
            let chain = self.property_chain_node(&token);
            let chain = self.check_trailing_dot(chain, token.span());
            return self.parse_binary_rest(chain, 0);
        }
        if self.at_keyword(Keyword::Else) || self.at_keyword(Keyword::In) {
            let token = self.advance();
            let text = EcoString::from(token.kind().to_string());
            let id = self.error_node(ParseErrorKind::UnexpectedToken(text), None, token.span());
            self.synchronize();
            return id;
        }
        self.parse_command_statement()
    }

    /// Parses a statement opening with `$name`: a variable statement when
    /// `=` follows, otherwise an expression statement (compound
    /// assignments, comparisons, pipelines over values).
    fn parse_identifier_statement(&mut self) -> NodeId {
        let start = self.current_start();
        let token = self.advance();
        let TokenKind::Identifier(name) = token.kind().clone() else {
            unreachable!("caller checked the token tag");
        };

        if name.is_empty() {
            let head = self.parse_empty_identifier(&token);
            return self.parse_binary_rest(head, 0);
        }

        let identifier = self.tree.alloc(
            NodeKind::Identifier { name },
            Some(token.span()),
        );
        let checked = self.check_trailing_dot(identifier, token.span());
        if checked != identifier {
            return self.parse_binary_rest(checked, 0);
        }
        self.skip_trivia();

        if self.at_operator("=") {
            self.advance(); // =
            self.skip_trivia();
            if self.at_end_of_statement() || self.is_at_end() {
                return self.error_node(
                    ParseErrorKind::MissingExpression("=".into()),
                    Some(identifier),
                    self.span_from(start),
                );
            }
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

    /// Parses `{ statements }`, or the `:`-led single-statement form.
    pub(super) fn parse_block(&mut self) -> NodeId {
        let start = self.current_start();
        if self.eat_special(':') {
            self.skip_trivia();
            let statement = self.parse_statement();
            return self.tree.alloc(
                NodeKind::Block {
                    statements: vec![statement],
                },
                Some(self.span_from(start)),
            );
        }

        self.advance(); // {
        let mut statements = Vec::new();
        loop {
            self.skip_trivia();
            if self.at_end_of_statement() {
                self.advance();
                continue;
            }
            if self.eat_special('}') {
                break;
            }
            if self.is_at_end() {
                let block = self.tree.alloc(
                    NodeKind::Block { statements },
                    Some(self.span_from(start)),
                );
                return self.error_node(
                    ParseErrorKind::Unclosed('}'),
                    Some(block),
                    self.span_from(start),
                );
            }
            statements.push(self.parse_statement());
        }
        self.tree.alloc(
            NodeKind::Block { statements },
            Some(self.span_from(start)),
        )
    }

    /// Parses a branch of an `if`: `{ ... }` or `: statement`.
    fn parse_branch(&mut self) -> Option<NodeId> {
        self.skip_trivia();
        if self.at_special('{') || self.at_special(':') {
            return Some(self.parse_block());
        }
        None
    }

    /// Parses `if condition branch [else branch]`.
    fn parse_if_statement(&mut self) -> NodeId {
        let start = self.current_start();
        self.advance(); // if
        self.skip_trivia();

        // Error wrappers stand in for missing pieces, so they stay
        // reachable from the statement.
        let condition = if self.at_special('{')
            || self.at_special(':')
            || self.at_end_of_statement()
            || self.is_at_end()
        {
            Some(self.error_node(
                ParseErrorKind::MissingExpression("if".into()),
                None,
                self.span_from(start),
            ))
        } else {
            Some(self.parse_expression(0))
        };

        let then_statement = match self.parse_branch() {
            Some(branch) => Some(branch),
            None => {
                let text = EcoString::from(self.lexer.peek().kind().to_string());
                let span = self.span_from(start);
                let id = self.error_node(ParseErrorKind::UnexpectedToken(text), None, span);
                self.synchronize();
                Some(id)
            }
        };

        self.skip_trivia();
        let else_statement = if self.at_keyword(Keyword::Else) {
            self.advance(); // else
            self.skip_trivia();
            if self.at_keyword(Keyword::If) {
                Some(self.parse_if_statement())
            } else if let Some(branch) = self.parse_branch() {
                Some(branch)
            } else if self.at_end_of_statement() || self.is_at_end() {
                let id = self.error_node(
                    ParseErrorKind::MissingExpression("else".into()),
                    None,
                    self.span_from(start),
                );
                Some(id)
            } else {
                Some(self.parse_statement())
            }
        } else {
            None
        };

        self.tree.alloc(
            NodeKind::IfStatement {
                condition,
                then_statement,
                else_statement,
            },
            Some(self.span_from(start)),
        )
    }

    /// Parses `for $item in expression { ... }`.
    fn parse_for_in_statement(&mut self) -> NodeId {
        let start = self.current_start();
        self.advance(); // for
        self.skip_trivia();

        let TokenKind::Identifier(name) = self.lexer.peek().kind().clone() else {
            let text = EcoString::from(self.lexer.peek().kind().to_string());
            let span = self.span_from(start);
            let id = self.error_node(ParseErrorKind::UnexpectedToken(text), None, span);
            self.synchronize();
            return id;
        };
        let token = self.advance();
        let initializer = self
            .tree
            .alloc(NodeKind::Identifier { name }, Some(token.span()));

        self.skip_trivia();
        if !self.at_keyword(Keyword::In) {
            let text = EcoString::from(self.lexer.peek().kind().to_string());
            let span = self.span_from(start);
            let id = self.error_node(
                ParseErrorKind::UnexpectedToken(text),
                Some(initializer),
                span,
            );
            self.synchronize();
            return id;
        }
        self.advance(); // in

        self.skip_trivia();
        if self.at_special('{') || self.at_end_of_statement() || self.is_at_end() {
            let id = self.error_node(
                ParseErrorKind::MissingExpression("in".into()),
                Some(initializer),
                self.span_from(start),
            );
            self.synchronize();
            return id;
        }
        let expression = self.parse_expression(0);

        self.skip_trivia();
        let statement = if self.at_special('{') || self.at_special(':') {
            self.parse_block()
        } else {
            let text = EcoString::from(self.lexer.peek().kind().to_string());
            let span = self.span_from(start);
            let id = self.error_node(ParseErrorKind::UnexpectedToken(text), None, span);
            self.synchronize();
            id
        };

        self.tree.alloc(
            NodeKind::ForInStatement {
                initializer,
                expression,
                statement,
            },
            Some(self.span_from(start)),
        )
    }

    /// Parses `function name(parameters) { body }`.
    fn parse_function_declaration(&mut self) -> NodeId {
        let start = self.current_start();
        self.advance(); // function
        self.skip_trivia();

        let TokenKind::Identifier(name) = self.lexer.peek().kind().clone() else {
            let text = EcoString::from(self.lexer.peek().kind().to_string());
            let span = self.span_from(start);
            let id = self.error_node(ParseErrorKind::UnexpectedToken(text), None, span);
            self.synchronize();
            return id;
        };
        let token = self.advance();
        let name = self
            .tree
            .alloc(NodeKind::Identifier { name }, Some(token.span()));

        self.skip_trivia();
        if !self.eat_special('(') {
            let text = EcoString::from(self.lexer.peek().kind().to_string());
            let span = self.span_from(start);
            let id = self.error_node(ParseErrorKind::UnexpectedToken(text), Some(name), span);
            self.synchronize();
            return id;
        }

        let parameters = self.parse_parameter_list();

        self.skip_trivia();
        let body = if self.at_special('{') {
            self.parse_block()
        } else {
            let text = EcoString::from(self.lexer.peek().kind().to_string());
            let span = self.span_from(start);
            let id = self.error_node(ParseErrorKind::UnexpectedToken(text), None, span);
            self.synchronize();
            id
        };

        self.tree.alloc(
            NodeKind::FunctionDeclaration {
                name,
                parameters,
                body,
            },
            Some(self.span_from(start)),
        )
    }

    /// Parses `$name[: type], ...` up to and including the closing `)`.
    fn parse_parameter_list(&mut self) -> Vec<NodeId> {
        let mut parameters = Vec::new();
        loop {
            self.skip_trivia();
            if self.eat_special(')') {
                break;
            }
            if self.is_at_end() {
                let span = self.span_from(self.last_span.start());
                let id = self.error_node(ParseErrorKind::Unclosed(')'), None, span);
                parameters.push(id);
                break;
            }

            if let TokenKind::Identifier(name) = self.lexer.peek().kind().clone() {
                let token = self.advance();
                let param_start = token.span().start();
                let name = self
                    .tree
                    .alloc(NodeKind::Identifier { name }, Some(token.span()));

                self.skip_trivia();
                let type_reference = if self.eat_special(':') {
                    self.skip_trivia();
                    self.parse_type_reference()
                } else {
                    None
                };

                parameters.push(self.tree.alloc(
                    NodeKind::Parameter {
                        name,
                        type_reference,
                    },
                    Some(self.span_from(param_start)),
                ));

                self.skip_trivia();
                if self.eat_special(',') {
                    continue;
                }
            } else {
                let token = self.advance();
                let text = EcoString::from(token.kind().to_string());
                let id =
                    self.error_node(ParseErrorKind::UnexpectedToken(text), None, token.span());
                parameters.push(id);
            }
        }
        parameters
    }

    /// Parses a type annotation after `:` in a parameter list.
    ///
    /// Always returns a node so problems stay attached to the parameter:
    /// a missing or unknown type name comes back as an `Invalid` wrapper.
    fn parse_type_reference(&mut self) -> Option<NodeId> {
        let kind = self.lexer.peek().kind().clone();
        let text = match kind {
            TokenKind::String { value, quotes: None, .. } => value,
            TokenKind::Identifier(value) if !value.is_empty() => value,
            _ => {
                // Point at the `:` just consumed; the offending token
                // belongs to the parameter list, not the annotation.
                let span = self.span_from(self.last_span.start());
                return Some(self.error_node(
                    ParseErrorKind::MissingExpression(":".into()),
                    None,
                    span,
                ));
            }
        };
        let token = self.advance();
        let known = grammar::TYPE_KEYWORDS.contains(&text.as_str());
        let unknown = EcoString::from(text.as_str());
        let type_name = self
            .tree
            .alloc(NodeKind::Identifier { name: text }, Some(token.span()));
        let type_reference = self
            .tree
            .alloc(NodeKind::TypeReference { type_name }, Some(token.span()));
        if known {
            Some(type_reference)
        } else {
            Some(self.error_node(
                ParseErrorKind::UnexpectedToken(unknown),
                Some(type_reference),
                token.span(),
            ))
        }
    }
}
