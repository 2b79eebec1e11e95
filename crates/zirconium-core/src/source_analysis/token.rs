// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Token types for Zirconium lexical analysis.
//!
//! Each token carries a [`TokenKind`], a [`Span`], and a [`TokenFlags`]
//! bitset. Flags stay mutable after emission: the scanner retro-annotates
//! a token when the *following* token reveals something about it (a `:`
//! marks the preceding token as a label; an identifier right after the
//! `function` keyword is a function name).

use ecow::EcoString;

use super::Span;
use super::grammar::Keyword;

/// The quote character a string literal was written with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QuoteKind {
    /// `"..."`
    Double,
    /// `'...'`
    Single,
}

impl QuoteKind {
    /// Returns the quote character.
    #[must_use]
    pub const fn as_char(self) -> char {
        match self {
            Self::Double => '"',
            Self::Single => '\'',
        }
    }
}

/// The dash prefix of a command option.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OptionPrefix {
    /// `--long`
    Long,
    /// `-f`
    Short,
}

impl OptionPrefix {
    /// Returns the prefix's source spelling.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Long => "--",
            Self::Short => "-",
        }
    }
}

/// Bitset of post-emission annotations on a token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct TokenFlags(u8);

impl TokenFlags {
    /// No annotations.
    pub const NONE: Self = Self(0);
    /// A string literal reached end of input before its closing quote.
    pub const UNTERMINATED_STRING: Self = Self(1 << 0);
    /// A quoted string containing `$name` substitutions.
    pub const INTERPOLATED: Self = Self(1 << 1);
    /// The token immediately precedes a `:`.
    pub const LABEL: Self = Self(1 << 2);
    /// An identifier emitted right after the `function` keyword.
    pub const FUNCTION_NAME: Self = Self(1 << 3);

    /// Returns true if every flag in `other` is set.
    #[must_use]
    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    /// Sets the flags in `other`.
    pub const fn insert(&mut self, other: Self) {
        self.0 |= other.0;
    }

    /// Returns true if no flags are set.
    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }
}

impl std::ops::BitOr for TokenFlags {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

/// The kind of token, not including source location or flags.
///
/// Tokens are cheap to clone: string data lives in [`EcoString`].
#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    /// A quoted string or a bareword. Barewords have no `quotes` and their
    /// `value` equals the raw source text.
    String {
        /// The string content with escapes resolved.
        value: EcoString,
        /// The quote character, or `None` for a bareword.
        quotes: Option<QuoteKind>,
        /// False when end of input arrived before the closing quote.
        closed: bool,
    },

    /// A quoted string containing `$name` substitutions, split into text
    /// chunks and variable names. Chunks alternate with variables; a
    /// trailing chunk is optional, so
    /// `values.len()` is `variables.len()` or `variables.len() + 1`.
    InterpolatedString {
        /// The text chunks between substitutions.
        values: Vec<EcoString>,
        /// The variable names, in order of appearance.
        variables: Vec<EcoString>,
        /// The quote character.
        quotes: QuoteKind,
        /// False when end of input arrived before the closing quote.
        closed: bool,
    },

    /// A numeric literal: `1337`, `3.14`.
    Number {
        /// The parsed value.
        value: f64,
        /// The literal as written in source.
        raw: EcoString,
    },

    /// `true` or `false`.
    Boolean {
        /// The literal value.
        value: bool,
    },

    /// A reserved word: `if`, `else`, `for`, `in`, `function`.
    Keyword(Keyword),

    /// A `$name` variable reference (also carries function names, which the
    /// scanner classifies by their position after `function`).
    Identifier(EcoString),

    /// A `$name.prop.prop` chain.
    PropertyAccess {
        /// The head variable name.
        name: EcoString,
        /// The property segments after each `.`.
        properties: Vec<EcoString>,
    },

    /// A `--long` command option.
    Option {
        /// The option name without dashes.
        value: EcoString,
        /// The dash prefix.
        prefix: OptionPrefix,
    },

    /// A maximal run of operator characters: `&&`, `>=`, `+=`, `-`, ...
    Operator(EcoString),

    /// Single-character punctuation: `( ) , { } [ ] . : \`.
    Special(char),

    /// A statement terminator: `;` or newline.
    EndOfStatement(char),

    /// A run of spaces/tabs (emitted only when configured; never newlines).
    Whitespace(EcoString),

    /// A `# ...` comment without its leading `#` (emitted only when
    /// configured).
    Comment(EcoString),

    /// End of input.
    Eof,
}

/// Fieldless discriminant of [`TokenKind`], for kind tests without
/// constructing a sample payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenTag {
    /// [`TokenKind::String`]
    String,
    /// [`TokenKind::InterpolatedString`]
    InterpolatedString,
    /// [`TokenKind::Number`]
    Number,
    /// [`TokenKind::Boolean`]
    Boolean,
    /// [`TokenKind::Keyword`]
    Keyword,
    /// [`TokenKind::Identifier`]
    Identifier,
    /// [`TokenKind::PropertyAccess`]
    PropertyAccess,
    /// [`TokenKind::Option`]
    Option,
    /// [`TokenKind::Operator`]
    Operator,
    /// [`TokenKind::Special`]
    Special,
    /// [`TokenKind::EndOfStatement`]
    EndOfStatement,
    /// [`TokenKind::Whitespace`]
    Whitespace,
    /// [`TokenKind::Comment`]
    Comment,
    /// [`TokenKind::Eof`]
    Eof,
}

impl TokenKind {
    /// Returns the fieldless discriminant of this kind.
    #[must_use]
    pub const fn tag(&self) -> TokenTag {
        match self {
            Self::String { .. } => TokenTag::String,
            Self::InterpolatedString { .. } => TokenTag::InterpolatedString,
            Self::Number { .. } => TokenTag::Number,
            Self::Boolean { .. } => TokenTag::Boolean,
            Self::Keyword(_) => TokenTag::Keyword,
            Self::Identifier(_) => TokenTag::Identifier,
            Self::PropertyAccess { .. } => TokenTag::PropertyAccess,
            Self::Option { .. } => TokenTag::Option,
            Self::Operator(_) => TokenTag::Operator,
            Self::Special(_) => TokenTag::Special,
            Self::EndOfStatement(_) => TokenTag::EndOfStatement,
            Self::Whitespace(_) => TokenTag::Whitespace,
            Self::Comment(_) => TokenTag::Comment,
            Self::Eof => TokenTag::Eof,
        }
    }

    /// Returns true if this token produces a value by itself.
    #[must_use]
    pub const fn is_literal(&self) -> bool {
        matches!(
            self,
            Self::String { .. }
                | Self::InterpolatedString { .. }
                | Self::Number { .. }
                | Self::Boolean { .. }
        )
    }

    /// Returns true for whitespace and comment tokens.
    #[must_use]
    pub const fn is_trivia(&self) -> bool {
        matches!(self, Self::Whitespace(_) | Self::Comment(_))
    }

    /// Returns true if this is the end-of-input marker.
    #[must_use]
    pub const fn is_eof(&self) -> bool {
        matches!(self, Self::Eof)
    }

    /// Returns true for the given operator spelling.
    #[must_use]
    pub fn is_operator(&self, op: &str) -> bool {
        matches!(self, Self::Operator(value) if value == op)
    }

    /// Returns true for the given punctuation character.
    #[must_use]
    pub const fn is_special(&self, c: char) -> bool {
        matches!(self, Self::Special(value) if *value == c)
    }

    /// Returns the string content if this token carries one.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String { value, .. }
            | Self::Identifier(value)
            | Self::PropertyAccess { name: value, .. }
            | Self::Option { value, .. }
            | Self::Operator(value)
            | Self::Whitespace(value)
            | Self::Comment(value) => Some(value),
            Self::Number { raw, .. } => Some(raw),
            Self::Keyword(kw) => Some(kw.as_str()),
            Self::Boolean { value } => Some(if *value { "true" } else { "false" }),
            Self::InterpolatedString { .. }
            | Self::Special(_)
            | Self::EndOfStatement(_)
            | Self::Eof => None,
        }
    }
}

impl std::fmt::Display for TokenKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::String {
                value,
                quotes: Some(q),
                ..
            } => write!(f, "{q}{value}{q}", q = q.as_char()),
            Self::String { value, .. }
            | Self::Identifier(value)
            | Self::Operator(value) => write!(f, "{value}"),
            Self::InterpolatedString {
                values,
                variables,
                quotes,
                ..
            } => {
                write!(f, "{}", quotes.as_char())?;
                for (i, chunk) in values.iter().enumerate() {
                    write!(f, "{chunk}")?;
                    if let Some(name) = variables.get(i) {
                        write!(f, "${name}")?;
                    }
                }
                write!(f, "{}", quotes.as_char())
            }
            Self::Number { raw, .. } => write!(f, "{raw}"),
            Self::Boolean { value } => write!(f, "{value}"),
            Self::Keyword(kw) => write!(f, "{kw}"),
            Self::PropertyAccess { name, properties } => {
                write!(f, "${name}")?;
                for prop in properties {
                    write!(f, ".{prop}")?;
                }
                Ok(())
            }
            Self::Option { value, prefix } => write!(f, "{}{value}", prefix.as_str()),
            Self::Special(c) => write!(f, "{c}"),
            Self::EndOfStatement('\n') => write!(f, "<newline>"),
            Self::EndOfStatement(c) => write!(f, "{c}"),
            Self::Whitespace(text) => write!(f, "{text}"),
            Self::Comment(text) => write!(f, "#{text}"),
            Self::Eof => write!(f, "<eof>"),
        }
    }
}

/// A token with its source location and flags.
///
/// # Examples
///
/// ```
/// use zirconium_core::source_analysis::{Span, Token, TokenFlags, TokenKind};
///
/// let token = Token::new(TokenKind::Identifier("player".into()), Span::new(0, 7));
/// assert_eq!(token.span().len(), 7);
/// assert!(!token.has_flag(TokenFlags::LABEL));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    kind: TokenKind,
    span: Span,
    flags: TokenFlags,
}

impl Token {
    /// Creates a token with no flags.
    #[must_use]
    pub const fn new(kind: TokenKind, span: Span) -> Self {
        Self {
            kind,
            span,
            flags: TokenFlags::NONE,
        }
    }

    /// Creates a token with flags.
    #[must_use]
    pub const fn with_flags(kind: TokenKind, span: Span, flags: TokenFlags) -> Self {
        Self { kind, span, flags }
    }

    /// Returns the kind of this token.
    #[must_use]
    pub const fn kind(&self) -> &TokenKind {
        &self.kind
    }

    /// Consumes the token and returns its kind.
    #[must_use]
    pub fn into_kind(self) -> TokenKind {
        self.kind
    }

    /// Returns the source span of this token.
    #[must_use]
    pub const fn span(&self) -> Span {
        self.span
    }

    /// Returns the flag bitset.
    #[must_use]
    pub const fn flags(&self) -> TokenFlags {
        self.flags
    }

    /// Returns true if every flag in `flag` is set.
    #[must_use]
    pub const fn has_flag(&self, flag: TokenFlags) -> bool {
        self.flags.contains(flag)
    }

    /// Sets additional flags. Scans retro-annotate already-emitted tokens
    /// through this.
    pub const fn add_flag(&mut self, flag: TokenFlags) {
        self.flags.insert(flag);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_are_a_bitset() {
        let mut flags = TokenFlags::NONE;
        assert!(flags.is_empty());
        flags.insert(TokenFlags::LABEL);
        flags.insert(TokenFlags::INTERPOLATED);
        assert!(flags.contains(TokenFlags::LABEL));
        assert!(flags.contains(TokenFlags::INTERPOLATED));
        assert!(!flags.contains(TokenFlags::FUNCTION_NAME));
        assert!(flags.contains(TokenFlags::LABEL | TokenFlags::INTERPOLATED));
    }

    #[test]
    fn token_kind_display() {
        assert_eq!(
            TokenKind::String {
                value: "hello".into(),
                quotes: Some(QuoteKind::Double),
                closed: true,
            }
            .to_string(),
            "\"hello\""
        );
        assert_eq!(
            TokenKind::String {
                value: "bare".into(),
                quotes: None,
                closed: true,
            }
            .to_string(),
            "bare"
        );
        assert_eq!(
            TokenKind::Number {
                value: 3.14,
                raw: "3.14".into(),
            }
            .to_string(),
            "3.14"
        );
        assert_eq!(TokenKind::Keyword(Keyword::Function).to_string(), "function");
        assert_eq!(
            TokenKind::PropertyAccess {
                name: "player".into(),
                properties: vec!["stats".into(), "health".into()],
            }
            .to_string(),
            "$player.stats.health"
        );
        assert_eq!(
            TokenKind::Option {
                value: "test".into(),
                prefix: OptionPrefix::Long,
            }
            .to_string(),
            "--test"
        );
        assert_eq!(TokenKind::EndOfStatement('\n').to_string(), "<newline>");
        assert_eq!(TokenKind::Eof.to_string(), "<eof>");
    }

    #[test]
    fn interpolated_display_reinterleaves() {
        let kind = TokenKind::InterpolatedString {
            values: vec!["Hello, ".into(), "!".into()],
            variables: vec!["player".into()],
            quotes: QuoteKind::Double,
            closed: true,
        };
        assert_eq!(kind.to_string(), "\"Hello, $player!\"");
    }

    #[test]
    fn predicates() {
        assert!(
            TokenKind::Number {
                value: 1.0,
                raw: "1".into(),
            }
            .is_literal()
        );
        assert!(!TokenKind::Identifier("x".into()).is_literal());
        assert!(TokenKind::Whitespace("  ".into()).is_trivia());
        assert!(TokenKind::Comment(" note".into()).is_trivia());
        assert!(TokenKind::Eof.is_eof());
        assert!(TokenKind::Operator("&&".into()).is_operator("&&"));
        assert!(!TokenKind::Operator("&&".into()).is_operator("||"));
        assert!(TokenKind::Special('(').is_special('('));
    }

    #[test]
    fn retro_annotation_mutates_flags() {
        let mut token = Token::new(TokenKind::Identifier("x".into()), Span::new(0, 2));
        assert!(token.flags().is_empty());
        token.add_flag(TokenFlags::LABEL);
        assert!(token.has_flag(TokenFlags::LABEL));
    }

    #[test]
    fn tags_match_kinds() {
        assert_eq!(TokenKind::Eof.tag(), TokenTag::Eof);
        assert_eq!(
            TokenKind::Operator("+".into()).tag(),
            TokenTag::Operator
        );
        assert_ne!(
            TokenKind::Identifier("x".into()).tag(),
            TokenTag::String
        );
    }
}
