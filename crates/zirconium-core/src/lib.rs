// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Zirconium front-end core.
//!
//! Zirconium (Zr) is a small shell-inspired embedded scripting language:
//! POSIX-style command invocation (`cmd --flag value arg`) blended with
//! expression- and block-oriented programming (assignment, `if`/`else`,
//! `for ... in`, functions, arrays, object literals, interpolated strings,
//! pipelines).
//!
//! This crate contains the front end:
//! - Lexical analysis (tokenization with spans and flag retro-annotation)
//! - Parsing (error-tolerant AST construction)
//! - Rendering (source reconstruction and debug pretty-printing)
//!
//! A parse is a pure function from a source string to a tree plus a
//! diagnostics vector; nothing here blocks, prints, or shares state.
//!
//! # Example
//!
//! ```
//! use zirconium_core::prelude::*;
//!
//! let result = parse(r#"greet --loud "Hello, $player!""#);
//! assert!(result.is_clean());
//! let rendered = render(&result.tree, result.root);
//! assert_eq!(rendered, r#"greet --loud "Hello, $player!""#);
//! ```

pub mod ast;
pub mod render;
pub mod source_analysis;

/// Re-export of commonly used types.
pub mod prelude {
    pub use crate::ast::{Node, NodeFlags, NodeId, NodeKind, NodeTag, Tree};
    pub use crate::render::{pretty_print, render};
    pub use crate::source_analysis::{
        LexerOptions, NodeError, ParseResult, Span, is_input_complete, parse, parse_with_options,
    };
}
