// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Lexical analysis for Zirconium source code.
//!
//! The scanner converts source text into a stream of [`Token`]s. It is
//! hand-written for full control over error recovery and the context
//! games Zirconium plays: the same bytes mean different things in command
//! and expression position, and the parser needs look-back to resolve them.
//!
//! # Design Principles
//!
//! - **Error recovery**: never fail on malformed input; unterminated
//!   strings carry [`TokenFlags::UNTERMINATED_STRING`] and stray bytes
//!   degrade into barewords
//! - **Precise spans**: every token carries its exact byte range
//! - **Retro-annotation**: emission is delayed by one token so a `:` can
//!   mark the preceding token as a label before the parser sees it
//!
//! # Example
//!
//! ```
//! use zirconium_core::source_analysis::{lex, TokenKind};
//!
//! let tokens = lex("cmd hello 1337");
//! assert_eq!(tokens.len(), 3);
//! assert!(matches!(tokens[2].kind(), TokenKind::Number { .. }));
//! ```

use std::collections::VecDeque;

use ecow::EcoString;

use super::grammar::{self, Keyword, boolean_from_str};
use super::text_stream::TextStream;
use super::token::{OptionPrefix, QuoteKind, Token, TokenFlags, TokenKind, TokenTag};
use super::Span;

/// Configuration for a [`Lexer`].
#[derive(Debug, Clone, Default)]
pub struct LexerOptions {
    /// Emit `Comment` tokens instead of discarding `# ...` runs.
    pub parse_comments_as_tokens: bool,
    /// Emit `Whitespace` tokens for spaces and tabs (never newlines).
    pub parse_whitespace_as_tokens: bool,
    /// Reserved identifier set for host integrations. Carried as data;
    /// tokenisation does not consult it.
    pub command_names: Vec<EcoString>,
}

/// A pull-based scanner over Zirconium source.
///
/// `peek` memoises the current token and `next` consumes it. Previously
/// emitted tokens are retained so `prev`/`prev_skip_whitespace` can look
/// back; the history is append-only and bounded only by input size.
///
/// Internally the scanner stays one token ahead of delivery, so a flag
/// written backwards by a later scan (`Label`, `FunctionName`) is always
/// settled before the annotated token is handed out.
#[derive(Debug)]
pub struct Lexer<'src> {
    stream: TextStream<'src>,
    options: LexerOptions,
    /// Scanned but undelivered tokens (always ends in `Eof` once input is
    /// exhausted).
    lookahead: VecDeque<Token>,
    /// Delivered tokens, append-only.
    history: Vec<Token>,
    reached_eof: bool,
}

impl<'src> Lexer<'src> {
    /// Creates a scanner with default options.
    #[must_use]
    pub fn new(source: &'src str) -> Self {
        Self::with_options(source, LexerOptions::default())
    }

    /// Creates a scanner with explicit options.
    #[must_use]
    pub fn with_options(source: &'src str, options: LexerOptions) -> Self {
        Self {
            stream: TextStream::new(source),
            options,
            lookahead: VecDeque::new(),
            history: Vec::new(),
            reached_eof: false,
        }
    }

    /// Returns the current token without consuming it.
    pub fn peek(&mut self) -> &Token {
        self.fill(2);
        // fill() always leaves at least the Eof token buffered
        &self.lookahead[0]
    }

    /// Returns the token after the current one without consuming anything.
    ///
    /// Past the end of input this returns the `Eof` token, like
    /// [`Lexer::peek`].
    pub fn peek_second(&mut self) -> &Token {
        self.fill(3);
        self.lookahead.get(1).unwrap_or(&self.lookahead[0])
    }

    /// Consumes and returns the current token.
    ///
    /// Once the end of input is reached, repeatedly returns `Eof`.
    pub fn next(&mut self) -> Token {
        self.fill(2);
        if self.lookahead[0].kind().is_eof() {
            return self.lookahead[0].clone();
        }
        let token = self.lookahead.pop_front().unwrap_or_else(|| {
            Token::new(TokenKind::Eof, Span::point(self.eof_offset()))
        });
        self.history.push(token.clone());
        token
    }

    /// Returns the token delivered `offset` steps back (1 = most recent).
    #[must_use]
    pub fn prev(&self, offset: usize) -> Option<&Token> {
        if offset == 0 {
            return None;
        }
        self.history.len().checked_sub(offset).map(|i| &self.history[i])
    }

    /// Like [`Lexer::prev`], but whitespace tokens do not count as steps.
    #[must_use]
    pub fn prev_skip_whitespace(&self, offset: usize) -> Option<&Token> {
        let mut remaining = offset;
        for token in self.history.iter().rev() {
            if matches!(token.kind(), TokenKind::Whitespace(_)) {
                continue;
            }
            remaining = remaining.checked_sub(1)?;
            if remaining == 0 {
                return Some(token);
            }
        }
        None
    }

    /// Returns true if the current token has the given kind.
    pub fn is_next_of_kind(&mut self, tag: TokenTag) -> bool {
        self.peek().kind().tag() == tag
    }

    /// Returns true if the current token has any of the given kinds.
    pub fn is_next_of_any_kind(&mut self, tags: &[TokenTag]) -> bool {
        let current = self.peek().kind().tag();
        tags.contains(&current)
    }

    /// Returns true until the end-of-input token becomes current.
    pub fn has_next(&mut self) -> bool {
        !self.peek().kind().is_eof()
    }

    /// Returns the scanner options.
    #[must_use]
    pub fn options(&self) -> &LexerOptions {
        &self.options
    }

    // ========================================================================
    // Buffering
    // ========================================================================

    #[expect(
        clippy::cast_possible_truncation,
        reason = "source files over 4GB are not supported"
    )]
    fn eof_offset(&self) -> u32 {
        self.stream.pos() as u32
    }

    /// Ensures `n` tokens are buffered (or input is exhausted). Staying a
    /// token ahead of delivery is what makes retro-annotation reliable.
    fn fill(&mut self, n: usize) {
        while self.lookahead.len() < n && !self.reached_eof {
            self.scan_token();
        }
    }

    /// Writes a flag onto the most recent non-trivia token, wherever it
    /// currently lives.
    fn annotate_previous(&mut self, flag: TokenFlags) {
        for token in self.lookahead.iter_mut().rev() {
            if !token.kind().is_trivia() {
                token.add_flag(flag);
                return;
            }
        }
        for token in self.history.iter_mut().rev() {
            if !token.kind().is_trivia() {
                token.add_flag(flag);
                return;
            }
        }
    }

    /// Returns the kind of the most recently scanned non-trivia token.
    fn previous_scanned_kind(&self) -> Option<&TokenKind> {
        self.lookahead
            .iter()
            .rev()
            .map(Token::kind)
            .find(|kind| !kind.is_trivia())
            .or_else(|| {
                self.history
                    .iter()
                    .rev()
                    .map(Token::kind)
                    .find(|kind| !kind.is_trivia())
            })
    }

    // ========================================================================
    // Scanning
    // ========================================================================

    fn span_from(&self, start: usize) -> Span {
        (start..self.stream.pos()).into()
    }

    fn push(&mut self, kind: TokenKind, span: Span) {
        self.lookahead.push_back(Token::new(kind, span));
    }

    fn push_flagged(&mut self, kind: TokenKind, span: Span, flags: TokenFlags) {
        self.lookahead.push_back(Token::with_flags(kind, span, flags));
    }

    /// Scans one token into the buffer, skipping trivia unless configured
    /// to emit it.
    fn scan_token(&mut self) {
        loop {
            let start = self.stream.pos();
            let Some(byte) = self.stream.peek() else {
                self.push(TokenKind::Eof, Span::point(self.eof_offset()));
                self.reached_eof = true;
                return;
            };

            match byte {
                // Newlines are never whitespace; they terminate statements.
                b' ' | b'\t' | b'\r' => {
                    self.stream.bump_while(|b| matches!(b, b' ' | b'\t' | b'\r'));
                    if self.options.parse_whitespace_as_tokens {
                        let span = self.span_from(start);
                        let text = EcoString::from(self.stream.slice(span));
                        self.push(TokenKind::Whitespace(text), span);
                        return;
                    }
                }
                b'#' => {
                    self.stream.bump();
                    let content_start = self.stream.pos();
                    self.stream.bump_while(|b| b != b'\n');
                    if self.options.parse_comments_as_tokens {
                        let text =
                            EcoString::from(self.stream.slice((content_start..self.stream.pos()).into()));
                        self.push(TokenKind::Comment(text), self.span_from(start));
                        return;
                    }
                }
                b'$' => {
                    self.scan_variable(start);
                    return;
                }
                b'"' | b'\'' => {
                    self.scan_quoted(start, byte);
                    return;
                }
                b'-' if self.stream.peek_at(1) == Some(b'-')
                    && self
                        .stream
                        .peek_at(2)
                        .is_some_and(|b| grammar::is_identifier_byte(b) || b == b'-') =>
                {
                    self.scan_long_option(start);
                    return;
                }
                b'0'..=b'9' => {
                    self.scan_number(start);
                    return;
                }
                _ if grammar::is_operator_byte(byte) => {
                    self.stream.bump_while(grammar::is_operator_byte);
                    let span = self.span_from(start);
                    let text = EcoString::from(self.stream.slice(span));
                    self.push(TokenKind::Operator(text), span);
                    return;
                }
                b';' | b'\n' => {
                    self.stream.bump();
                    self.push(TokenKind::EndOfStatement(byte as char), self.span_from(start));
                    return;
                }
                _ if grammar::is_punctuation_byte(byte) => {
                    self.stream.bump();
                    if byte == b':' {
                        self.annotate_previous(TokenFlags::LABEL);
                    }
                    self.push(TokenKind::Special(byte as char), self.span_from(start));
                    return;
                }
                _ => {
                    self.scan_bareword(start);
                    return;
                }
            }
        }
    }

    /// Scans `$name` or `$name.prop.prop`.
    ///
    /// A `$` with no identifier run produces an empty-named `Identifier`;
    /// the parser decides whether that is an inner expression (`$(`) or an
    /// invalid variable name.
    fn scan_variable(&mut self, start: usize) {
        self.stream.bump(); // $
        let name_start = self.stream.pos();
        self.stream.bump_while(grammar::is_identifier_byte);
        let name = EcoString::from(self.stream.slice((name_start..self.stream.pos()).into()));

        if name.is_empty() {
            self.push(TokenKind::Identifier(name), self.span_from(start));
            return;
        }

        let mut properties: Vec<EcoString> = Vec::new();
        while self.stream.peek() == Some(b'.')
            && self.stream.peek_at(1).is_some_and(grammar::is_identifier_byte)
        {
            self.stream.bump(); // .
            let prop_start = self.stream.pos();
            self.stream.bump_while(grammar::is_identifier_byte);
            properties.push(EcoString::from(
                self.stream.slice((prop_start..self.stream.pos()).into()),
            ));
        }

        let span = self.span_from(start);
        if properties.is_empty() {
            self.push(TokenKind::Identifier(name), span);
        } else {
            self.push(TokenKind::PropertyAccess { name, properties }, span);
        }
    }

    /// Scans a quoted string, splitting `$name` interpolations into text
    /// chunks and variable names. `\` escapes the next byte.
    fn scan_quoted(&mut self, start: usize, quote: u8) {
        self.stream.bump(); // opening quote
        let quotes = if quote == b'"' {
            QuoteKind::Double
        } else {
            QuoteKind::Single
        };

        let mut buf: Vec<u8> = Vec::new();
        let mut values: Vec<EcoString> = Vec::new();
        let mut variables: Vec<EcoString> = Vec::new();
        let mut closed = false;

        loop {
            match self.stream.peek() {
                None => break,
                Some(b) if b == quote => {
                    self.stream.bump();
                    closed = true;
                    break;
                }
                Some(b'\\') => {
                    self.stream.bump();
                    if let Some(escaped) = self.stream.bump() {
                        buf.push(escaped);
                    }
                }
                Some(b'$') if self.stream.peek_at(1).is_some_and(grammar::is_identifier_byte) => {
                    self.stream.bump(); // $
                    values.push(chunk(&buf));
                    buf.clear();
                    let var_start = self.stream.pos();
                    self.stream.bump_while(grammar::is_identifier_byte);
                    variables.push(EcoString::from(
                        self.stream.slice((var_start..self.stream.pos()).into()),
                    ));
                }
                Some(b) => {
                    self.stream.bump();
                    buf.push(b);
                }
            }
        }

        let span = self.span_from(start);
        let mut flags = TokenFlags::NONE;
        if !closed {
            flags.insert(TokenFlags::UNTERMINATED_STRING);
        }

        if variables.is_empty() {
            self.push_flagged(
                TokenKind::String {
                    value: chunk(&buf),
                    quotes: Some(quotes),
                    closed,
                },
                span,
                flags,
            );
        } else {
            if !buf.is_empty() {
                values.push(chunk(&buf));
            }
            flags.insert(TokenFlags::INTERPOLATED);
            self.push_flagged(
                TokenKind::InterpolatedString {
                    values,
                    variables,
                    quotes,
                    closed,
                },
                span,
                flags,
            );
        }
    }

    /// Scans `--name`. Single-dash flag clusters are left to the parser,
    /// which sees a `-` operator adjacent to a bareword and knows whether
    /// it sits in an argument slot.
    fn scan_long_option(&mut self, start: usize) {
        self.stream.bump(); // -
        self.stream.bump(); // -
        let name_start = self.stream.pos();
        self.stream
            .bump_while(|b| grammar::is_identifier_byte(b) || b == b'-');
        let value = EcoString::from(self.stream.slice((name_start..self.stream.pos()).into()));
        self.push(
            TokenKind::Option {
                value,
                prefix: OptionPrefix::Long,
            },
            self.span_from(start),
        );
    }

    /// Scans an integer or decimal literal. At most one `.` participates,
    /// and only with a digit on both sides; `_` is not part of numbers.
    fn scan_number(&mut self, start: usize) {
        self.stream.bump_while(|b| b.is_ascii_digit());
        if self.stream.peek() == Some(b'.')
            && self.stream.peek_at(1).is_some_and(|b| b.is_ascii_digit())
        {
            self.stream.bump(); // .
            self.stream.bump_while(|b| b.is_ascii_digit());
        }
        let span = self.span_from(start);
        let raw = EcoString::from(self.stream.slice(span));
        let value = raw.parse::<f64>().unwrap_or_default();
        self.push(TokenKind::Number { value, raw }, span);
    }

    /// Scans a bareword and classifies it: keyword, boolean literal,
    /// function name (when the previous token is the `function` keyword),
    /// or plain string.
    fn scan_bareword(&mut self, start: usize) {
        self.stream.bump();
        self.stream.bump_while(|b| {
            !matches!(b, b' ' | b'\t' | b'\r' | b'"' | b'\'')
                && !grammar::is_end_of_statement_byte(b)
                && !grammar::is_punctuation_byte(b)
        });
        let span = self.span_from(start);
        let text = EcoString::from(self.stream.slice(span));

        if let Some(keyword) = Keyword::from_str(&text) {
            self.push(TokenKind::Keyword(keyword), span);
            return;
        }
        if let Some(value) = boolean_from_str(&text) {
            self.push(TokenKind::Boolean { value }, span);
            return;
        }
        if matches!(
            self.previous_scanned_kind(),
            Some(TokenKind::Keyword(Keyword::Function))
        ) {
            self.push_flagged(
                TokenKind::Identifier(text),
                span,
                TokenFlags::FUNCTION_NAME,
            );
            return;
        }
        self.push(
            TokenKind::String {
                value: text,
                quotes: None,
                closed: true,
            },
            span,
        );
    }
}

/// Builds a text chunk from accumulated bytes, tolerating stray non-UTF-8.
fn chunk(buf: &[u8]) -> EcoString {
    EcoString::from(String::from_utf8_lossy(buf).as_ref())
}

impl Iterator for Lexer<'_> {
    type Item = Token;

    fn next(&mut self) -> Option<Self::Item> {
        if self.has_next() {
            Some(Lexer::next(self))
        } else {
            None
        }
    }
}

/// Lexes source into a vector of tokens, excluding the EOF marker.
#[must_use]
pub fn lex(source: &str) -> Vec<Token> {
    Lexer::new(source).collect()
}

/// Lexes source into a vector of tokens, including the EOF marker.
#[must_use]
pub fn lex_with_eof(source: &str) -> Vec<Token> {
    let mut lexer = Lexer::new(source);
    let mut tokens = Vec::new();
    loop {
        let token = lexer.next();
        let is_eof = token.kind().is_eof();
        tokens.push(token);
        if is_eof {
            break;
        }
    }
    tokens
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(source: &str) -> Vec<TokenKind> {
        lex(source).into_iter().map(Token::into_kind).collect()
    }

    fn bareword(text: &str) -> TokenKind {
        TokenKind::String {
            value: text.into(),
            quotes: None,
            closed: true,
        }
    }

    #[test]
    fn lex_empty_and_trivia_only() {
        assert!(lex("").is_empty());
        assert!(lex("   \t  ").is_empty());
        assert!(lex("# just a comment").is_empty());
    }

    #[test]
    fn newline_is_a_statement_terminator_not_whitespace() {
        assert_eq!(
            kinds("a\nb"),
            vec![
                bareword("a"),
                TokenKind::EndOfStatement('\n'),
                bareword("b"),
            ]
        );
    }

    #[test]
    fn lex_command_with_arguments() {
        assert_eq!(
            kinds("cmd hello 1337"),
            vec![
                bareword("cmd"),
                bareword("hello"),
                TokenKind::Number {
                    value: 1337.0,
                    raw: "1337".into(),
                },
            ]
        );
    }

    #[test]
    fn lex_decimal_number() {
        assert_eq!(
            kinds("3.14"),
            vec![TokenKind::Number {
                value: 3.14,
                raw: "3.14".into(),
            }]
        );
        // A second dot does not join the number.
        assert_eq!(
            kinds("1.2.3"),
            vec![
                TokenKind::Number {
                    value: 1.2,
                    raw: "1.2".into(),
                },
                TokenKind::Special('.'),
                TokenKind::Number {
                    value: 3.0,
                    raw: "3".into(),
                },
            ]
        );
    }

    #[test]
    fn underscore_is_not_part_of_numbers() {
        assert_eq!(
            kinds("1_000"),
            vec![
                TokenKind::Number {
                    value: 1.0,
                    raw: "1".into(),
                },
                bareword("_000"),
            ]
        );
    }

    #[test]
    fn lex_keywords_and_booleans() {
        assert_eq!(
            kinds("if else for in function true false"),
            vec![
                TokenKind::Keyword(Keyword::If),
                TokenKind::Keyword(Keyword::Else),
                TokenKind::Keyword(Keyword::For),
                TokenKind::Keyword(Keyword::In),
                TokenKind::Keyword(Keyword::Function),
                TokenKind::Boolean { value: true },
                TokenKind::Boolean { value: false },
            ]
        );
    }

    #[test]
    fn lex_variables() {
        assert_eq!(
            kinds("$player $x_1"),
            vec![
                TokenKind::Identifier("player".into()),
                TokenKind::Identifier("x_1".into()),
            ]
        );
    }

    #[test]
    fn lex_property_access() {
        assert_eq!(
            kinds("$player.stats.health"),
            vec![TokenKind::PropertyAccess {
                name: "player".into(),
                properties: vec!["stats".into(), "health".into()],
            }]
        );
        // A trailing dot stays a Special token.
        assert_eq!(
            kinds("$player."),
            vec![
                TokenKind::Identifier("player".into()),
                TokenKind::Special('.'),
            ]
        );
    }

    #[test]
    fn dollar_without_name_is_empty_identifier() {
        let tokens = lex("$ x");
        assert_eq!(tokens[0].kind(), &TokenKind::Identifier("".into()));
        assert_eq!(tokens[0].span(), Span::new(0, 1));
    }

    #[test]
    fn lex_quoted_strings() {
        assert_eq!(
            kinds(r#""hello" 'world'"#),
            vec![
                TokenKind::String {
                    value: "hello".into(),
                    quotes: Some(QuoteKind::Double),
                    closed: true,
                },
                TokenKind::String {
                    value: "world".into(),
                    quotes: Some(QuoteKind::Single),
                    closed: true,
                },
            ]
        );
    }

    #[test]
    fn escapes_take_the_next_byte_literally() {
        assert_eq!(
            kinds(r#""it\"s \\ \$x""#),
            vec![TokenKind::String {
                value: "it\"s \\ $x".into(),
                quotes: Some(QuoteKind::Double),
                closed: true,
            }]
        );
    }

    #[test]
    fn lex_interpolated_string() {
        assert_eq!(
            kinds(r#""Hello, $player!""#),
            vec![TokenKind::InterpolatedString {
                values: vec!["Hello, ".into(), "!".into()],
                variables: vec!["player".into()],
                quotes: QuoteKind::Double,
                closed: true,
            }]
        );
        let tokens = lex(r#""Hello, $player!""#);
        assert!(tokens[0].has_flag(TokenFlags::INTERPOLATED));
    }

    #[test]
    fn interpolation_chunk_shape() {
        // Leading variable: chunk count equals variable count.
        assert_eq!(
            kinds(r#""$a$b""#),
            vec![TokenKind::InterpolatedString {
                values: vec!["".into(), "".into()],
                variables: vec!["a".into(), "b".into()],
                quotes: QuoteKind::Double,
                closed: true,
            }]
        );
        // Dollar not followed by an identifier stays literal text.
        assert_eq!(
            kinds(r#""cost: $ 5""#),
            vec![TokenKind::String {
                value: "cost: $ 5".into(),
                quotes: Some(QuoteKind::Double),
                closed: true,
            }]
        );
    }

    #[test]
    fn unterminated_string_is_flagged_not_fatal() {
        let tokens = lex("\"abc");
        assert_eq!(tokens.len(), 1);
        assert!(tokens[0].has_flag(TokenFlags::UNTERMINATED_STRING));
        assert!(matches!(
            tokens[0].kind(),
            TokenKind::String { closed: false, .. }
        ));
        assert_eq!(tokens[0].span(), Span::new(0, 4));
    }

    #[test]
    fn lex_long_option() {
        assert_eq!(
            kinds("cmd --test --dry-run"),
            vec![
                bareword("cmd"),
                TokenKind::Option {
                    value: "test".into(),
                    prefix: OptionPrefix::Long,
                },
                TokenKind::Option {
                    value: "dry-run".into(),
                    prefix: OptionPrefix::Long,
                },
            ]
        );
    }

    #[test]
    fn short_flag_cluster_is_operator_plus_bareword() {
        // The parser, not the scanner, expands clusters; see the
        // command-mode tests.
        assert_eq!(
            kinds("-kEwL"),
            vec![TokenKind::Operator("-".into()), bareword("kEwL")]
        );
    }

    #[test]
    fn operators_assemble_greedily() {
        assert_eq!(
            kinds("a && b || c >= 1 += !="),
            vec![
                bareword("a"),
                TokenKind::Operator("&&".into()),
                bareword("b"),
                TokenKind::Operator("||".into()),
                bareword("c"),
                TokenKind::Operator(">=".into()),
                TokenKind::Number {
                    value: 1.0,
                    raw: "1".into(),
                },
                TokenKind::Operator("+=".into()),
                TokenKind::Operator("!=".into()),
            ]
        );
    }

    #[test]
    fn punctuation_and_terminators() {
        assert_eq!(
            kinds("( ) , { } [ ] . : \\ ;"),
            vec![
                TokenKind::Special('('),
                TokenKind::Special(')'),
                TokenKind::Special(','),
                TokenKind::Special('{'),
                TokenKind::Special('}'),
                TokenKind::Special('['),
                TokenKind::Special(']'),
                TokenKind::Special('.'),
                TokenKind::Special(':'),
                TokenKind::Special('\\'),
                TokenKind::EndOfStatement(';'),
            ]
        );
    }

    #[test]
    fn colon_retro_annotates_label() {
        let tokens = lex("key: value");
        assert!(tokens[0].has_flag(TokenFlags::LABEL));
        assert_eq!(tokens[1].kind(), &TokenKind::Special(':'));
        assert!(!tokens[2].has_flag(TokenFlags::LABEL));
    }

    #[test]
    fn label_flag_settles_before_delivery() {
        // Pull tokens one at a time; the flag must already be present on
        // the token when it is handed out.
        let mut lexer = Lexer::new("key: value");
        let first = lexer.next();
        assert!(first.has_flag(TokenFlags::LABEL));
    }

    #[test]
    fn function_name_is_flagged_identifier() {
        let tokens = lex("function greet($name)");
        assert_eq!(tokens[0].kind(), &TokenKind::Keyword(Keyword::Function));
        assert_eq!(tokens[1].kind(), &TokenKind::Identifier("greet".into()));
        assert!(tokens[1].has_flag(TokenFlags::FUNCTION_NAME));
    }

    #[test]
    fn comments_discarded_by_default_emitted_on_request() {
        assert_eq!(
            kinds("cmd # trailing note\nnext"),
            vec![
                bareword("cmd"),
                TokenKind::EndOfStatement('\n'),
                bareword("next"),
            ]
        );

        let options = LexerOptions {
            parse_comments_as_tokens: true,
            ..LexerOptions::default()
        };
        let tokens: Vec<_> = Lexer::with_options("cmd # note", options)
            .map(Token::into_kind)
            .collect();
        assert_eq!(
            tokens,
            vec![bareword("cmd"), TokenKind::Comment(" note".into())]
        );
    }

    #[test]
    fn whitespace_tokens_on_request() {
        let options = LexerOptions {
            parse_whitespace_as_tokens: true,
            ..LexerOptions::default()
        };
        let tokens: Vec<_> = Lexer::with_options("a b", options)
            .map(Token::into_kind)
            .collect();
        assert_eq!(
            tokens,
            vec![
                bareword("a"),
                TokenKind::Whitespace(" ".into()),
                bareword("b"),
            ]
        );
    }

    #[test]
    fn prev_looks_back_through_history() {
        let mut lexer = Lexer::new("a b c");
        lexer.next();
        lexer.next();
        assert_eq!(lexer.prev(1).and_then(|t| t.kind().as_str()), Some("b"));
        assert_eq!(lexer.prev(2).and_then(|t| t.kind().as_str()), Some("a"));
        assert_eq!(lexer.prev(3), None);
    }

    #[test]
    fn prev_skip_whitespace_ignores_whitespace_tokens() {
        let options = LexerOptions {
            parse_whitespace_as_tokens: true,
            ..LexerOptions::default()
        };
        let mut lexer = Lexer::with_options("a b", options);
        lexer.next(); // a
        lexer.next(); // whitespace
        lexer.next(); // b
        assert_eq!(
            lexer.prev_skip_whitespace(2).and_then(|t| t.kind().as_str()),
            Some("a")
        );
    }

    #[test]
    fn peek_second_looks_one_token_further() {
        let mut lexer = Lexer::new("one two");
        assert_eq!(lexer.peek().kind().as_str(), Some("one"));
        assert_eq!(lexer.peek_second().kind().as_str(), Some("two"));
        lexer.next();
        assert!(lexer.peek_second().kind().is_eof());
        lexer.next();
        assert!(lexer.peek_second().kind().is_eof());
    }

    #[test]
    fn peek_memoises_and_next_consumes() {
        let mut lexer = Lexer::new("one two");
        assert_eq!(lexer.peek().kind().as_str(), Some("one"));
        assert_eq!(lexer.peek().kind().as_str(), Some("one"));
        assert_eq!(lexer.next().kind().as_str(), Some("one"));
        assert!(lexer.is_next_of_kind(TokenTag::String));
        assert!(lexer.is_next_of_any_kind(&[TokenTag::Number, TokenTag::String]));
        assert!(lexer.has_next());
        lexer.next();
        assert!(!lexer.has_next());
        assert!(lexer.next().kind().is_eof());
    }

    #[test]
    fn spans_reproduce_source_text() {
        let source = r#"cmd --test "Hello, $player!" 42"#;
        for token in lex(source) {
            let span = token.span();
            assert!(span.end() as usize <= source.len());
            assert!(span.start() <= span.end());
            if !token.kind().is_trivia() {
                let text = &source[span.as_range()];
                assert!(!text.is_empty(), "empty span for {:?}", token.kind());
            }
        }
    }

    #[test]
    fn stray_bytes_become_barewords() {
        assert_eq!(kinds("~home @tag %var ^top"), vec![
            bareword("~home"),
            bareword("@tag"),
            bareword("%var"),
            bareword("^top"),
        ]);
    }

    #[test]
    fn non_ascii_passes_through_barewords_and_strings() {
        assert_eq!(kinds("héllo"), vec![bareword("héllo")]);
        assert_eq!(
            kinds("\"héllo\""),
            vec![TokenKind::String {
                value: "héllo".into(),
                quotes: Some(QuoteKind::Double),
                closed: true,
            }]
        );
    }
}
