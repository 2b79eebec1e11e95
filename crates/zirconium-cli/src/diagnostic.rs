// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Diagnostic presentation using miette.
//!
//! Converts zirconium-core parse diagnostics into miette-formatted errors
//! with source context, an arrow at the offending span, and the
//! `file:start..end` location tooling expects.

use miette::{Diagnostic, SourceSpan};
use zirconium_core::prelude::{NodeError, Span, Tree};

/// A parse diagnostic with rich terminal formatting.
#[derive(Debug, Diagnostic, thiserror::Error)]
#[error("{message}")]
#[diagnostic(code(zirconium::parse))]
pub struct ParseDiagnostic {
    /// Human-readable error message.
    pub message: String,
    /// Source code for context.
    #[source_code]
    pub src: miette::NamedSource<String>,
    /// Location of the error.
    #[label("here")]
    pub span: SourceSpan,
}

impl ParseDiagnostic {
    /// Builds a diagnostic from a core [`NodeError`], pulling the span off
    /// the node it references.
    pub fn from_node_error(
        error: &NodeError,
        tree: &Tree,
        source_path: &str,
        source: &str,
    ) -> Self {
        let span = tree
            .node(error.node)
            .span()
            .unwrap_or_else(|| Span::point(0));
        Self {
            message: error.message.to_string(),
            src: miette::NamedSource::new(source_path, source.to_string()),
            span: span.into(),
        }
    }
}
