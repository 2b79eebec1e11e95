// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Error types for the Zirconium front-end.
//!
//! The scanner never fails: malformed input degrades into flagged tokens
//! and barewords. The parser converts every failure into an `Invalid` node
//! plus a [`NodeError`] and keeps going, so a parse always yields a full
//! tree. Callers treat a non-empty error list as "compiled with
//! diagnostics" and may refuse to execute.

use ecow::EcoString;
use thiserror::Error;

use crate::ast::NodeId;

/// The kind of syntax error the parser can report.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseErrorKind {
    /// A string literal reached end of input without its closing quote.
    #[error("unterminated string literal")]
    UnterminatedString,

    /// `$` was not followed by an identifier character.
    #[error("invalid variable name after '$'")]
    InvalidVariableName,

    /// A token with no production in the current context.
    #[error("unexpected token '{0}'")]
    UnexpectedToken(EcoString),

    /// An operator or keyword expected a right-hand expression.
    #[error("expected an expression after '{0}'")]
    MissingExpression(EcoString),

    /// A matching closer was not found before end of input.
    #[error("missing closing '{0}'")]
    Unclosed(char),

    /// `.` not followed by an identifier, or chained on a non-indexable.
    #[error("invalid property access")]
    InvalidPropertyAccess,
}

/// A diagnostic tied to the node the parser emitted while recovering.
///
/// The node's span localises the problem; tooling renders the pair as
/// `file:start..end: message`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeError {
    /// The `Invalid` (or best-effort) node carrying the problem.
    pub node: NodeId,
    /// Human-readable description.
    pub message: EcoString,
}

impl NodeError {
    /// Creates an error from a structured kind.
    #[must_use]
    pub fn new(node: NodeId, kind: &ParseErrorKind) -> Self {
        Self {
            node,
            message: EcoString::from(kind.to_string()),
        }
    }

    /// Creates an error with a free-form message.
    #[must_use]
    pub fn with_message(node: NodeId, message: impl Into<EcoString>) -> Self {
        Self {
            node,
            message: message.into(),
        }
    }
}

impl std::fmt::Display for NodeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message)
    }
}
