// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Abstract Syntax Tree (AST) definitions for Zirconium.
//!
//! The tree is arena-backed: a [`Tree`] owns a flat vector of [`Node`]s and
//! every reference between nodes is a [`NodeId`]. Parent links are plain
//! data (`Option<NodeId>`), wired automatically when a composite node is
//! allocated, so sibling walks and span offsetting never fight the
//! ownership system. Dropping the [`Tree`] frees the whole parse.
//!
//! # Design Philosophy
//!
//! - **All nodes can carry spans** - required for diagnostics and tooling
//! - **Error recovery** - the parser produces [`NodeKind::Invalid`] nodes
//!   flagged with [`NodeFlags::HAS_ERROR`] instead of failing
//! - **Tagged variants over inheritance** - downstream code dispatches on
//!   [`NodeKind`] with exhaustive matches, or narrows with [`Node::is`]
//!
//! # Example
//!
//! ```
//! use zirconium_core::ast::{NodeKind, NodeTag, Tree};
//! use zirconium_core::source_analysis::Span;
//!
//! // Source: cmd hello
//! let mut tree = Tree::new();
//! let name = tree.alloc(
//!     NodeKind::String {
//!         text: "cmd".into(),
//!         quotes: None,
//!         unterminated: false,
//!     },
//!     Some(Span::new(0, 3)),
//! );
//! let command_name = tree.alloc(NodeKind::CommandName { name }, Some(Span::new(0, 3)));
//! let arg = tree.alloc(
//!     NodeKind::String {
//!         text: "hello".into(),
//!         quotes: None,
//!         unterminated: false,
//!     },
//!     Some(Span::new(4, 9)),
//! );
//! let command = tree.alloc(
//!     NodeKind::CommandStatement {
//!         command: command_name,
//!         children: vec![arg],
//!         unterminated: false,
//!     },
//!     Some(Span::new(0, 9)),
//! );
//! assert!(tree.node(command).is(NodeTag::CommandStatement));
//! assert_eq!(tree.node(arg).parent(), Some(command));
//! ```

use std::collections::HashMap;

use ecow::EcoString;

use crate::source_analysis::{OptionPrefix, QuoteKind, Span};

/// Index of a node inside its [`Tree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(u32);

impl NodeId {
    /// Creates an id from a raw index. Only meaningful against the tree
    /// that produced the index.
    #[must_use]
    pub const fn from_raw(raw: u32) -> Self {
        Self(raw)
    }

    /// Returns the raw index.
    #[must_use]
    pub const fn as_raw(self) -> u32 {
        self.0
    }

    const fn index(self) -> usize {
        self.0 as usize
    }
}

/// Bitset of annotations on a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct NodeFlags(u16);

impl NodeFlags {
    /// No annotations.
    pub const NONE: Self = Self(0);
    /// The node is an `Invalid` wrapper or contains a syntax problem.
    pub const HAS_ERROR: Self = Self(1 << 0);

    /// Returns true if every flag in `other` is set.
    #[must_use]
    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    /// Sets the flags in `other`.
    pub const fn insert(&mut self, other: Self) {
        self.0 |= other.0;
    }
}

/// The closed set of node variants.
///
/// Terminals carry their own data; composites reference children by
/// [`NodeId`]. The variant order groups terminals first, then composites,
/// mirroring how the parser produces them.
#[derive(Debug, Clone, PartialEq)]
pub enum NodeKind {
    // === Terminals ===
    /// A string literal or bareword.
    String {
        /// Content with escapes resolved.
        text: EcoString,
        /// Quote character, or `None` for a bareword.
        quotes: Option<QuoteKind>,
        /// True when the closing quote was missing.
        unterminated: bool,
    },

    /// A numeric literal.
    Number {
        /// The parsed value.
        value: f64,
        /// The literal as written, preserved for rendering.
        raw: EcoString,
    },

    /// `true` or `false`.
    Boolean {
        /// The literal value.
        value: bool,
    },

    /// A variable or function name.
    Identifier {
        /// The name without the `$` sigil.
        name: EcoString,
    },

    /// An operator in expression position, e.g. the `&&` of a pipeline.
    OperatorToken {
        /// The operator spelling.
        operator: EcoString,
    },

    /// A sigil attached to a literal: `~ @ % ^ * !`.
    PrefixToken {
        /// The sigil character.
        value: char,
    },

    /// An explicit statement terminator kept in the tree.
    EndOfStatement,

    /// A command option name: `--flag` or `-f`.
    OptionKey {
        /// The option name without dashes.
        flag: EcoString,
        /// The dash prefix it was written with.
        prefix: OptionPrefix,
    },

    // === Composites ===
    /// The root of a parse; owns every statement.
    Source {
        /// Top-level statements in source order.
        children: Vec<NodeId>,
    },

    /// A brace-delimited scope, or the single-statement `:` form.
    Block {
        /// Statements in source order.
        statements: Vec<NodeId>,
    },

    /// A command invocation: name plus arguments.
    CommandStatement {
        /// The [`NodeKind::CommandName`] child.
        command: NodeId,
        /// Arguments: options, option pairs, and positional values.
        children: Vec<NodeId>,
        /// True when end of input arrived before a terminator.
        unterminated: bool,
    },

    /// The name position of a command.
    CommandName {
        /// The [`NodeKind::String`] bareword naming the command.
        name: NodeId,
    },

    /// `if condition ... else ...`; `else_statement` may be another
    /// `IfStatement` (else-if chain). Branches are optional so a broken
    /// conditional still produces a node.
    IfStatement {
        /// The condition expression.
        condition: Option<NodeId>,
        /// The then-branch block or statement.
        then_statement: Option<NodeId>,
        /// The else-branch: block, statement, or chained `IfStatement`.
        else_statement: Option<NodeId>,
    },

    /// `for $item in expression { ... }`.
    ForInStatement {
        /// The loop variable.
        initializer: NodeId,
        /// The iterated expression.
        expression: NodeId,
        /// The loop body.
        statement: NodeId,
    },

    /// `function name(parameters) { ... }`.
    FunctionDeclaration {
        /// The function name.
        name: NodeId,
        /// The [`NodeKind::Parameter`] list.
        parameters: Vec<NodeId>,
        /// The body block.
        body: NodeId,
    },

    /// A declared parameter, optionally typed.
    Parameter {
        /// The parameter name.
        name: NodeId,
        /// Optional [`NodeKind::TypeReference`].
        type_reference: Option<NodeId>,
    },

    /// A type annotation: `string`, `number`, `boolean`.
    TypeReference {
        /// The type name identifier.
        type_name: NodeId,
    },

    /// The binding inside a variable statement.
    VariableDeclaration {
        /// The assigned variable.
        identifier: NodeId,
        /// The right-hand expression.
        expression: NodeId,
    },

    /// `$name = expression` in statement position.
    VariableStatement {
        /// The [`NodeKind::VariableDeclaration`] child.
        declaration: NodeId,
    },

    /// `left op right`, including command pipelines (`a | b`, `a && b`).
    BinaryExpression {
        /// Left operand.
        left: NodeId,
        /// The [`NodeKind::OperatorToken`] child.
        operator: NodeId,
        /// Right operand.
        right: NodeId,
    },

    /// A prefixed operator expression, e.g. `!$enabled`.
    UnaryExpression {
        /// The operator spelling.
        operator: EcoString,
        /// The operand.
        expression: NodeId,
    },

    /// A quoted string with `$name` substitutions, decomposed into
    /// alternating [`NodeKind::String`] and [`NodeKind::Identifier`]
    /// children.
    InterpolatedString {
        /// Alternating text chunks and variable references.
        values: Vec<NodeId>,
        /// The quote character the literal was written with.
        quotes: QuoteKind,
    },

    /// `[ a, b, c ]`.
    ArrayLiteral {
        /// Element expressions in source order.
        values: Vec<NodeId>,
    },

    /// `{ key: value, ... }` (expression position only).
    ObjectLiteral {
        /// The [`NodeKind::PropertyAssignment`] children.
        values: Vec<NodeId>,
    },

    /// One `key: value` pair of an object literal.
    PropertyAssignment {
        /// The key: an identifier or string.
        name: NodeId,
        /// The value expression.
        initializer: NodeId,
    },

    /// `$base.name` after resolution into a chain.
    PropertyAccessExpression {
        /// The receiver: identifier, property access, or array index.
        expression: NodeId,
        /// The accessed property name.
        name: NodeId,
    },

    /// `$base.0` — numeric access into an array.
    ArrayIndexExpression {
        /// The receiver.
        expression: NodeId,
        /// The [`NodeKind::Number`] index.
        index: NodeId,
    },

    /// `( expression )`.
    ParenthesizedExpression {
        /// The inner expression.
        expression: NodeId,
    },

    /// A sub-expression invocation: `$(cmd ...)` or `name(arg, arg)`.
    InnerExpression {
        /// The invoked command, binary pipeline, or assignment.
        expression: NodeId,
    },

    /// A sigil applied to a literal: `~path`, `@name`, `*all`.
    PrefixExpression {
        /// The [`NodeKind::PrefixToken`] child.
        prefix: NodeId,
        /// The prefixed literal.
        expression: NodeId,
    },

    /// A long option paired with its value: `--flag value`.
    OptionExpression {
        /// The [`NodeKind::OptionKey`] child.
        option: NodeId,
        /// The option's value expression.
        expression: NodeId,
    },

    /// A best-effort wrapper around input the parser had no production
    /// for. Always flagged with [`NodeFlags::HAS_ERROR`].
    Invalid {
        /// The recovered sub-tree, when one exists.
        expression: Option<NodeId>,
        /// Human-readable description of the problem.
        message: EcoString,
    },
}

/// Fieldless discriminant of [`NodeKind`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[allow(missing_docs, reason = "variants mirror NodeKind one-to-one")]
pub enum NodeTag {
    String,
    Number,
    Boolean,
    Identifier,
    OperatorToken,
    PrefixToken,
    EndOfStatement,
    OptionKey,
    Source,
    Block,
    CommandStatement,
    CommandName,
    IfStatement,
    ForInStatement,
    FunctionDeclaration,
    Parameter,
    TypeReference,
    VariableDeclaration,
    VariableStatement,
    BinaryExpression,
    UnaryExpression,
    InterpolatedString,
    ArrayLiteral,
    ObjectLiteral,
    PropertyAssignment,
    PropertyAccessExpression,
    ArrayIndexExpression,
    ParenthesizedExpression,
    InnerExpression,
    PrefixExpression,
    OptionExpression,
    Invalid,
}

impl NodeKind {
    /// Returns the fieldless discriminant of this kind.
    #[must_use]
    pub const fn tag(&self) -> NodeTag {
        match self {
            Self::String { .. } => NodeTag::String,
            Self::Number { .. } => NodeTag::Number,
            Self::Boolean { .. } => NodeTag::Boolean,
            Self::Identifier { .. } => NodeTag::Identifier,
            Self::OperatorToken { .. } => NodeTag::OperatorToken,
            Self::PrefixToken { .. } => NodeTag::PrefixToken,
            Self::EndOfStatement => NodeTag::EndOfStatement,
            Self::OptionKey { .. } => NodeTag::OptionKey,
            Self::Source { .. } => NodeTag::Source,
            Self::Block { .. } => NodeTag::Block,
            Self::CommandStatement { .. } => NodeTag::CommandStatement,
            Self::CommandName { .. } => NodeTag::CommandName,
            Self::IfStatement { .. } => NodeTag::IfStatement,
            Self::ForInStatement { .. } => NodeTag::ForInStatement,
            Self::FunctionDeclaration { .. } => NodeTag::FunctionDeclaration,
            Self::Parameter { .. } => NodeTag::Parameter,
            Self::TypeReference { .. } => NodeTag::TypeReference,
            Self::VariableDeclaration { .. } => NodeTag::VariableDeclaration,
            Self::VariableStatement { .. } => NodeTag::VariableStatement,
            Self::BinaryExpression { .. } => NodeTag::BinaryExpression,
            Self::UnaryExpression { .. } => NodeTag::UnaryExpression,
            Self::InterpolatedString { .. } => NodeTag::InterpolatedString,
            Self::ArrayLiteral { .. } => NodeTag::ArrayLiteral,
            Self::ObjectLiteral { .. } => NodeTag::ObjectLiteral,
            Self::PropertyAssignment { .. } => NodeTag::PropertyAssignment,
            Self::PropertyAccessExpression { .. } => NodeTag::PropertyAccessExpression,
            Self::ArrayIndexExpression { .. } => NodeTag::ArrayIndexExpression,
            Self::ParenthesizedExpression { .. } => NodeTag::ParenthesizedExpression,
            Self::InnerExpression { .. } => NodeTag::InnerExpression,
            Self::PrefixExpression { .. } => NodeTag::PrefixExpression,
            Self::OptionExpression { .. } => NodeTag::OptionExpression,
            Self::Invalid { .. } => NodeTag::Invalid,
        }
    }

    /// Returns this kind's children, in source order.
    #[must_use]
    pub fn child_ids(&self) -> Vec<NodeId> {
        match self {
            Self::String { .. }
            | Self::Number { .. }
            | Self::Boolean { .. }
            | Self::Identifier { .. }
            | Self::OperatorToken { .. }
            | Self::PrefixToken { .. }
            | Self::EndOfStatement
            | Self::OptionKey { .. } => Vec::new(),

            Self::Source { children } => children.clone(),
            Self::Block { statements } => statements.clone(),
            Self::CommandStatement {
                command, children, ..
            } => {
                let mut ids = vec![*command];
                ids.extend_from_slice(children);
                ids
            }
            Self::CommandName { name } => vec![*name],
            Self::IfStatement {
                condition,
                then_statement,
                else_statement,
            } => [condition, then_statement, else_statement]
                .into_iter()
                .flatten()
                .copied()
                .collect(),
            Self::ForInStatement {
                initializer,
                expression,
                statement,
            } => vec![*initializer, *expression, *statement],
            Self::FunctionDeclaration {
                name,
                parameters,
                body,
            } => {
                let mut ids = vec![*name];
                ids.extend_from_slice(parameters);
                ids.push(*body);
                ids
            }
            Self::Parameter {
                name,
                type_reference,
            } => {
                let mut ids = vec![*name];
                ids.extend(type_reference.iter().copied());
                ids
            }
            Self::TypeReference { type_name } => vec![*type_name],
            Self::VariableDeclaration {
                identifier,
                expression,
            } => vec![*identifier, *expression],
            Self::VariableStatement { declaration } => vec![*declaration],
            Self::BinaryExpression {
                left,
                operator,
                right,
            } => vec![*left, *operator, *right],
            Self::UnaryExpression { expression, .. } => vec![*expression],
            Self::InterpolatedString { values, .. } => values.clone(),
            Self::ArrayLiteral { values } | Self::ObjectLiteral { values } => values.clone(),
            Self::PropertyAssignment { name, initializer } => vec![*name, *initializer],
            Self::PropertyAccessExpression { expression, name } => vec![*expression, *name],
            Self::ArrayIndexExpression { expression, index } => vec![*expression, *index],
            Self::ParenthesizedExpression { expression }
            | Self::InnerExpression { expression } => vec![*expression],
            Self::PrefixExpression { prefix, expression } => vec![*prefix, *expression],
            Self::OptionExpression { option, expression } => vec![*option, *expression],
            Self::Invalid { expression, .. } => expression.iter().copied().collect(),
        }
    }

    /// Returns true for kinds that own children.
    #[must_use]
    pub const fn is_composite(&self) -> bool {
        !matches!(
            self,
            Self::String { .. }
                | Self::Number { .. }
                | Self::Boolean { .. }
                | Self::Identifier { .. }
                | Self::OperatorToken { .. }
                | Self::PrefixToken { .. }
                | Self::EndOfStatement
                | Self::OptionKey { .. }
        )
    }

    /// A short name for debug output.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self.tag() {
            NodeTag::String => "String",
            NodeTag::Number => "Number",
            NodeTag::Boolean => "Boolean",
            NodeTag::Identifier => "Identifier",
            NodeTag::OperatorToken => "OperatorToken",
            NodeTag::PrefixToken => "PrefixToken",
            NodeTag::EndOfStatement => "EndOfStatement",
            NodeTag::OptionKey => "OptionKey",
            NodeTag::Source => "Source",
            NodeTag::Block => "Block",
            NodeTag::CommandStatement => "CommandStatement",
            NodeTag::CommandName => "CommandName",
            NodeTag::IfStatement => "IfStatement",
            NodeTag::ForInStatement => "ForInStatement",
            NodeTag::FunctionDeclaration => "FunctionDeclaration",
            NodeTag::Parameter => "Parameter",
            NodeTag::TypeReference => "TypeReference",
            NodeTag::VariableDeclaration => "VariableDeclaration",
            NodeTag::VariableStatement => "VariableStatement",
            NodeTag::BinaryExpression => "BinaryExpression",
            NodeTag::UnaryExpression => "UnaryExpression",
            NodeTag::InterpolatedString => "InterpolatedString",
            NodeTag::ArrayLiteral => "ArrayLiteral",
            NodeTag::ObjectLiteral => "ObjectLiteral",
            NodeTag::PropertyAssignment => "PropertyAssignment",
            NodeTag::PropertyAccessExpression => "PropertyAccessExpression",
            NodeTag::ArrayIndexExpression => "ArrayIndexExpression",
            NodeTag::ParenthesizedExpression => "ParenthesizedExpression",
            NodeTag::InnerExpression => "InnerExpression",
            NodeTag::PrefixExpression => "PrefixExpression",
            NodeTag::OptionExpression => "OptionExpression",
            NodeTag::Invalid => "Invalid",
        }
    }
}

/// One allocated node: kind plus tree-positional data.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    kind: NodeKind,
    parent: Option<NodeId>,
    span: Option<Span>,
    flags: NodeFlags,
}

impl Node {
    /// Returns the node's kind.
    #[must_use]
    pub const fn kind(&self) -> &NodeKind {
        &self.kind
    }

    /// Returns the parent id, if the node has been adopted.
    #[must_use]
    pub const fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    /// Returns the node's span, when the parser stamped one.
    #[must_use]
    pub const fn span(&self) -> Option<Span> {
        self.span
    }

    /// Returns the flag bitset.
    #[must_use]
    pub const fn flags(&self) -> NodeFlags {
        self.flags
    }

    /// Returns true if this node has the given kind. The supported way to
    /// narrow a variant outside an exhaustive match.
    #[must_use]
    pub const fn is(&self, tag: NodeTag) -> bool {
        self.kind.tag() as u32 == tag as u32
    }
}

/// The arena owning a parsed tree.
///
/// Allocation wires parent links: `alloc` sets `parent` on every child the
/// new kind references. Nodes are immutable after allocation except for
/// parent adoption and flags.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Tree {
    nodes: Vec<Node>,
}

impl Tree {
    /// Creates an empty arena.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of allocated nodes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Returns true if nothing has been allocated.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Returns the node for `id`.
    ///
    /// # Panics
    ///
    /// Panics if `id` comes from a different tree.
    #[must_use]
    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.index()]
    }

    /// Returns the kind for `id`.
    #[must_use]
    pub fn kind(&self, id: NodeId) -> &NodeKind {
        &self.nodes[id.index()].kind
    }

    /// Allocates a node and adopts its children.
    #[expect(
        clippy::cast_possible_truncation,
        reason = "trees with over 4 billion nodes are not supported"
    )]
    pub fn alloc(&mut self, kind: NodeKind, span: Option<Span>) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        for child in kind.child_ids() {
            self.nodes[child.index()].parent = Some(id);
        }
        let flags = if matches!(kind, NodeKind::Invalid { .. }) {
            NodeFlags::HAS_ERROR
        } else {
            NodeFlags::NONE
        };
        self.nodes.push(Node {
            kind,
            parent: None,
            span,
            flags,
        });
        id
    }

    /// Allocates an [`NodeKind::Invalid`] wrapper around a best-effort
    /// sub-tree.
    pub fn invalid(
        &mut self,
        expression: Option<NodeId>,
        message: impl Into<EcoString>,
        span: Option<Span>,
    ) -> NodeId {
        self.alloc(
            NodeKind::Invalid {
                expression,
                message: message.into(),
            },
            span,
        )
    }

    /// Stamps or replaces the span of `id`.
    pub fn set_span(&mut self, id: NodeId, span: Span) {
        self.nodes[id.index()].span = Some(span);
    }

    /// Sets additional flags on `id`.
    pub fn add_flag(&mut self, id: NodeId, flags: NodeFlags) {
        self.nodes[id.index()].flags.insert(flags);
    }

    /// Returns the children of `id` in source order.
    #[must_use]
    pub fn children(&self, id: NodeId) -> Vec<NodeId> {
        self.kind(id).child_ids()
    }

    /// Returns the sibling after `id` in its parent's child list.
    #[must_use]
    pub fn next_sibling(&self, id: NodeId) -> Option<NodeId> {
        let parent = self.node(id).parent()?;
        let siblings = self.children(parent);
        let index = siblings.iter().position(|&c| c == id)?;
        siblings.get(index + 1).copied()
    }

    /// Returns the sibling before `id` in its parent's child list.
    #[must_use]
    pub fn previous_sibling(&self, id: NodeId) -> Option<NodeId> {
        let parent = self.node(id).parent()?;
        let siblings = self.children(parent);
        let index = siblings.iter().position(|&c| c == id)?;
        index.checked_sub(1).and_then(|i| siblings.get(i)).copied()
    }

    /// Shifts every span in the subtree rooted at `id` by `delta`.
    ///
    /// Used when splicing a sub-parse into a larger source.
    pub fn offset_positions(&mut self, id: NodeId, delta: i64) {
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            if let Some(span) = self.nodes[current.index()].span {
                self.nodes[current.index()].span = Some(span.offset(delta));
            }
            stack.extend(self.children(current));
        }
    }

    /// Collects every node in the subtree rooted at `id` that carries
    /// [`NodeFlags::HAS_ERROR`], in depth-first source order.
    #[must_use]
    pub fn errors_in(&self, id: NodeId) -> Vec<NodeId> {
        let mut found = Vec::new();
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            if self.node(current).flags().contains(NodeFlags::HAS_ERROR) {
                found.push(current);
            }
            let mut children = self.children(current);
            children.reverse();
            stack.extend(children);
        }
        found
    }

    /// Applies a variable map to an interpolated string, producing the
    /// concatenation of its text chunks and substituted values in order.
    ///
    /// Unknown variables substitute as empty text. Returns `None` when
    /// `id` is not an [`NodeKind::InterpolatedString`].
    #[must_use]
    pub fn flatten_interpolated_string(
        &self,
        id: NodeId,
        variables: &HashMap<EcoString, EcoString>,
    ) -> Option<EcoString> {
        let NodeKind::InterpolatedString { values, .. } = self.kind(id) else {
            return None;
        };
        let mut out = String::new();
        for &value in values {
            match self.kind(value) {
                NodeKind::String { text, .. } => out.push_str(text),
                NodeKind::Identifier { name } => {
                    if let Some(substituted) = variables.get(name) {
                        out.push_str(substituted);
                    }
                }
                _ => {}
            }
        }
        Some(EcoString::from(out))
    }
}
