// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Static grammar tables for Zirconium.
//!
//! Everything the scanner and parser dispatch on lives here: character
//! classes, reserved words, and the operator precedence table. All tables
//! are immutable data.

use ecow::EcoString;

/// Characters that assemble into operator runs (`&&`, `>=`, `+=`, ...).
pub const OPERATOR_CHARS: &[u8] = b"&|=><-+/*!";

/// Statement terminators.
pub const END_OF_STATEMENT: &[u8] = b";\n";

/// Single-character punctuation emitted as `Special` tokens.
pub const PUNCTUATION: &[u8] = b"(),{}[].:\\";

/// Sigil characters hosts attach to literals (`~path`, `@name`, ...).
///
/// Only recognised as a prefix when immediately preceding a literal inside
/// an argument slot; anywhere else they are ordinary bareword bytes.
pub const PREFIX_CHARS: &[u8] = b"~@%^*!";

/// Operators valid in unary position.
pub const UNARY_OPERATORS: &[&str] = &["!"];

/// Reserved type names accepted in parameter annotations.
pub const TYPE_KEYWORDS: &[&str] = &["string", "number", "boolean"];

/// Returns true for bytes that may appear in an identifier.
#[must_use]
pub const fn is_identifier_byte(byte: u8) -> bool {
    byte.is_ascii_alphanumeric() || byte == b'_'
}

/// Returns true for bytes that assemble into operator runs.
#[must_use]
pub fn is_operator_byte(byte: u8) -> bool {
    OPERATOR_CHARS.contains(&byte)
}

/// Returns true for statement-terminator bytes.
#[must_use]
pub fn is_end_of_statement_byte(byte: u8) -> bool {
    END_OF_STATEMENT.contains(&byte)
}

/// Returns true for punctuation bytes.
#[must_use]
pub fn is_punctuation_byte(byte: u8) -> bool {
    PUNCTUATION.contains(&byte)
}

/// Returns true for prefix sigil bytes.
#[must_use]
pub fn is_prefix_byte(byte: u8) -> bool {
    PREFIX_CHARS.contains(&byte)
}

/// Returns true for the operators that join commands into pipelines.
#[must_use]
pub fn is_pipeline_operator(op: &str) -> bool {
    matches!(op, "|" | "&&" | "||")
}

/// A reserved word.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Keyword {
    /// `if`
    If,
    /// `else`
    Else,
    /// `for`
    For,
    /// `in`
    In,
    /// `function`
    Function,
}

impl Keyword {
    /// Classifies a bareword as a keyword, if it is one.
    #[must_use]
    pub fn from_str(word: &str) -> Option<Self> {
        match word {
            "if" => Some(Self::If),
            "else" => Some(Self::Else),
            "for" => Some(Self::For),
            "in" => Some(Self::In),
            "function" => Some(Self::Function),
            _ => None,
        }
    }

    /// Returns the keyword's source spelling.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::If => "if",
            Self::Else => "else",
            Self::For => "for",
            Self::In => "in",
            Self::Function => "function",
        }
    }
}

impl std::fmt::Display for Keyword {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Classifies a bareword as a boolean literal, if it is one.
#[must_use]
pub fn boolean_from_str(word: &str) -> Option<bool> {
    match word {
        "true" => Some(true),
        "false" => Some(false),
        _ => None,
    }
}

// ============================================================================
// Pratt Parsing for Binary Operator Precedence
// ============================================================================

/// Binding power for binary operators (Pratt parsing).
///
/// Higher values bind tighter. Left- and right binding powers differ for
/// associativity: left-associative operators have `left < right`.
#[derive(Debug, Clone, Copy)]
pub struct BindingPower {
    /// How tightly this operator binds to its left operand.
    pub left: u8,
    /// How tightly this operator binds to its right operand.
    pub right: u8,
}

impl BindingPower {
    /// Creates a left-associative binding power.
    const fn left_assoc(precedence: u8) -> Self {
        Self {
            left: precedence,
            right: precedence + 1,
        }
    }
}

/// Gets the binding power for a binary operator.
///
/// Returns `None` for unknown operators, which the parser treats as end of
/// expression (useful for error recovery).
///
/// # Precedence Levels (lowest to highest)
///
/// | Level | Operators             |
/// |-------|-----------------------|
/// | 1     | `!` `=` `+=` `-=`     |
/// | 2     | `\|` `\|\|`           |
/// | 3     | `&&`                  |
/// | 7     | `<` `>` `>=` `<=` `==` `!=` |
/// | 10    | `+` `-`               |
/// | 20    | `*` `/` `%`           |
///
/// Every level is left-associative; ties break by token order. Note that
/// `&&` binds tighter than `|`, so `a | b && c` pipes `a` into the
/// conjunction of `b` and `c`.
#[must_use]
pub fn binding_power(op: &str) -> Option<BindingPower> {
    // Each precedence is scaled by 2 so left/right pairs never collide
    // across levels.
    match op {
        "!" | "=" | "+=" | "-=" => Some(BindingPower::left_assoc(2)),
        "|" | "||" => Some(BindingPower::left_assoc(4)),
        "&&" => Some(BindingPower::left_assoc(6)),
        "<" | ">" | ">=" | "<=" | "==" | "!=" => Some(BindingPower::left_assoc(14)),
        "+" | "-" => Some(BindingPower::left_assoc(20)),
        "*" | "/" | "%" => Some(BindingPower::left_assoc(40)),
        _ => None,
    }
}

/// Expands a single-dash letter run into per-letter flag names.
///
/// `-kEwL` is shorthand for `-k -E -w -L`; the parser calls this when it
/// sees a `-` operator adjacent to a bareword in an argument slot.
#[must_use]
pub fn split_flag_cluster(cluster: &str) -> Vec<EcoString> {
    cluster
        .chars()
        .map(|c| EcoString::from(c.to_string()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keyword_round_trip() {
        for word in ["if", "else", "for", "in", "function"] {
            let kw = Keyword::from_str(word).unwrap();
            assert_eq!(kw.as_str(), word);
        }
        assert_eq!(Keyword::from_str("while"), None);
        assert_eq!(Keyword::from_str("string"), None);
    }

    #[test]
    fn booleans() {
        assert_eq!(boolean_from_str("true"), Some(true));
        assert_eq!(boolean_from_str("false"), Some(false));
        assert_eq!(boolean_from_str("True"), None);
    }

    #[test]
    fn character_classes_are_disjoint_enough() {
        // `!` and `*` are both operators and prefix sigils; the parser
        // resolves them by argument position.
        for byte in OPERATOR_CHARS {
            assert!(!is_punctuation_byte(*byte));
            assert!(!is_end_of_statement_byte(*byte));
        }
        for byte in PUNCTUATION {
            assert!(!is_end_of_statement_byte(*byte));
        }
    }

    #[test]
    fn precedence_ordering() {
        let bp = |op| binding_power(op).unwrap().left;
        assert!(bp("=") < bp("|"));
        assert!(bp("|") < bp("&&"));
        assert!(bp("||") < bp("&&"));
        assert!(bp("&&") < bp("=="));
        assert!(bp("==") < bp("+"));
        assert!(bp("+") < bp("*"));
        assert_eq!(bp("|"), bp("||"));
        assert!(binding_power("=>").is_none());
    }

    #[test]
    fn left_associativity() {
        let bp = binding_power("+").unwrap();
        assert!(bp.left < bp.right);
    }

    #[test]
    fn flag_cluster_splits_per_letter() {
        let flags = split_flag_cluster("kEwL");
        assert_eq!(flags, vec!["k", "E", "w", "L"]);
        for flag in &flags {
            assert_eq!(flag.len(), 1);
        }
    }
}
