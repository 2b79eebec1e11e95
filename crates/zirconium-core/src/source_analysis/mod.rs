// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Parsing infrastructure for Zirconium source code.
//!
//! This module contains the text stream, grammar tables, lexer, and parser.
//!
//! # Lexical Analysis
//!
//! The [`Lexer`] converts source text into a stream of [`Token`]s. Each
//! token carries its byte range via [`Span`] and a [`TokenFlags`] bitset.
//! Whitespace and comments are skipped unless [`LexerOptions`] asks for
//! them as tokens.
//!
//! ```
//! use zirconium_core::source_analysis::{Lexer, TokenKind};
//!
//! let tokens: Vec<_> = Lexer::new("cmd --all 3").collect();
//! assert_eq!(tokens.len(), 3); // cmd, --all, 3
//! ```
//!
//! # Parsing
//!
//! The [`parse`] function builds a `Source` tree from raw text. Binary
//! operator precedence uses Pratt parsing (see [`parser`] internals for the
//! binding-power table).
//!
//! # Error Handling
//!
//! The lexer uses error recovery: malformed input degrades into flagged
//! tokens and barewords rather than stopping the scan. The parser converts
//! every failure into an `Invalid` node plus a [`NodeError`] and resumes at
//! the next safe point, so a parse always returns a complete tree.

pub mod grammar;

mod error;
mod lexer;
mod parser;
mod span;
mod text_stream;
mod token;


pub use error::{NodeError, ParseErrorKind};
pub use lexer::{Lexer, LexerOptions, lex, lex_with_eof};
pub use parser::{ParseResult, is_input_complete, parse, parse_with_options};
pub use span::Span;
pub use text_stream::TextStream;
pub use token::{OptionPrefix, QuoteKind, Token, TokenFlags, TokenKind, TokenTag};
