// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! AST rendering: source reconstruction and debug pretty-printing.
//!
//! [`render`] walks a tree and re-emits text close to the original source.
//! It is near-fidelity, not byte-exact: whitespace runs collapse, comments
//! are gone, and both sub-expression invocation forms come back in the
//! `$(...)` spelling. The guarantee that matters is structural: parsing
//! the rendered text yields an equivalent tree.
//!
//! [`pretty_print`] emits one line per node with indentation reflecting
//! depth, for debugging and the `zr ast` command.

use std::fmt::Write as _;

use crate::ast::{NodeId, NodeKind, Tree};
use crate::source_analysis::QuoteKind;

/// Renders a node (usually a `Source` root) back to source text.
///
/// # Examples
///
/// ```
/// use zirconium_core::source_analysis::parse;
/// use zirconium_core::render::render;
///
/// let result = parse("cmd   --test   42");
/// assert_eq!(render(&result.tree, result.root), "cmd --test 42");
/// ```
#[must_use]
pub fn render(tree: &Tree, id: NodeId) -> String {
    let mut renderer = Renderer {
        tree,
        out: String::new(),
        indent: 0,
    };
    renderer.node(id);
    renderer.out
}

/// Pretty-prints nodes as an indented tree, one line per node.
///
/// `prefix` seeds the indentation of the outermost nodes; each level of
/// depth adds two spaces.
#[must_use]
pub fn pretty_print(tree: &Tree, nodes: &[NodeId], prefix: &str) -> String {
    let mut out = String::new();
    for &id in nodes {
        pretty_print_into(tree, id, prefix, &mut out);
    }
    out
}

fn pretty_print_into(tree: &Tree, id: NodeId, prefix: &str, out: &mut String) {
    let kind = tree.kind(id);
    let _ = write!(out, "{prefix}{}", kind.name());
    let detail = node_detail(kind);
    if !detail.is_empty() {
        let _ = write!(out, " {detail}");
    }
    out.push('\n');

    let child_prefix = format!("{prefix}  ");
    for child in tree.children(id) {
        pretty_print_into(tree, child, &child_prefix, out);
    }
}

/// A short payload summary for one pretty-printed line.
fn node_detail(kind: &NodeKind) -> String {
    match kind {
        NodeKind::String { text, .. } => format!("{text:?}"),
        NodeKind::Number { raw, .. } => raw.to_string(),
        NodeKind::Boolean { value } => value.to_string(),
        NodeKind::Identifier { name } => format!("${name}"),
        NodeKind::OperatorToken { operator } => operator.to_string(),
        NodeKind::PrefixToken { value } => value.to_string(),
        NodeKind::OptionKey { flag, prefix } => format!("{}{flag}", prefix.as_str()),
        NodeKind::UnaryExpression { operator, .. } => operator.to_string(),
        NodeKind::Invalid { message, .. } => format!("({message})"),
        _ => String::new(),
    }
}

struct Renderer<'tree> {
    tree: &'tree Tree,
    out: String,
    indent: usize,
}

impl Renderer<'_> {
    fn push_indent(&mut self) {
        for _ in 0..self.indent {
            self.out.push_str("    ");
        }
    }

    fn node(&mut self, id: NodeId) {
        match self.tree.kind(id).clone() {
            NodeKind::Source { children } => {
                for (i, child) in children.iter().enumerate() {
                    if i > 0 {
                        self.out.push('\n');
                    }
                    self.node(*child);
                }
            }

            NodeKind::Block { statements } => {
                self.out.push_str("{\n");
                self.indent += 1;
                for statement in statements {
                    self.push_indent();
                    self.node(statement);
                    self.out.push('\n');
                }
                self.indent -= 1;
                self.push_indent();
                self.out.push('}');
            }

            NodeKind::CommandStatement {
                command, children, ..
            } => {
                self.node(command);
                for child in children {
                    self.out.push(' ');
                    self.node(child);
                }
            }

            NodeKind::CommandName { name } => self.bare_text(name),

            NodeKind::IfStatement {
                condition,
                then_statement,
                else_statement,
            } => {
                self.out.push_str("if");
                if let Some(condition) = condition {
                    self.out.push(' ');
                    self.node(condition);
                }
                if let Some(then_statement) = then_statement {
                    self.out.push(' ');
                    self.node(then_statement);
                }
                if let Some(else_statement) = else_statement {
                    self.out.push_str(" else ");
                    self.node(else_statement);
                }
            }

            NodeKind::ForInStatement {
                initializer,
                expression,
                statement,
            } => {
                self.out.push_str("for ");
                self.node(initializer);
                self.out.push_str(" in ");
                self.node(expression);
                self.out.push(' ');
                self.node(statement);
            }

            NodeKind::FunctionDeclaration {
                name,
                parameters,
                body,
            } => {
                self.out.push_str("function ");
                self.bare_text(name);
                self.out.push('(');
                for (i, parameter) in parameters.iter().enumerate() {
                    if i > 0 {
                        self.out.push_str(", ");
                    }
                    self.node(*parameter);
                }
                self.out.push_str(") ");
                self.node(body);
            }

            NodeKind::Parameter {
                name,
                type_reference,
            } => {
                self.node(name);
                if let Some(type_reference) = type_reference {
                    self.out.push_str(": ");
                    self.node(type_reference);
                }
            }

            NodeKind::TypeReference { type_name } => self.bare_text(type_name),

            NodeKind::VariableStatement { declaration } => self.node(declaration),

            NodeKind::VariableDeclaration {
                identifier,
                expression,
            } => {
                self.node(identifier);
                self.out.push_str(" = ");
                self.node(expression);
            }

            NodeKind::BinaryExpression {
                left,
                operator,
                right,
            } => {
                self.node(left);
                self.out.push(' ');
                self.node(operator);
                self.out.push(' ');
                self.node(right);
            }

            NodeKind::UnaryExpression {
                operator,
                expression,
            } => {
                self.out.push_str(&operator);
                self.node(expression);
            }

            NodeKind::InterpolatedString { values, quotes } => {
                self.out.push(quotes.as_char());
                for value in values {
                    match self.tree.kind(value) {
                        NodeKind::String { text, .. } => {
                            let escaped = escape_into(text, quotes);
                            self.out.push_str(&escaped);
                        }
                        NodeKind::Identifier { name } => {
                            self.out.push('$');
                            self.out.push_str(name);
                        }
                        _ => {}
                    }
                }
                self.out.push(quotes.as_char());
            }

            NodeKind::ArrayLiteral { values } => {
                self.out.push('[');
                for (i, value) in values.iter().enumerate() {
                    if i > 0 {
                        self.out.push_str(", ");
                    }
                    self.node(*value);
                }
                self.out.push(']');
            }

            NodeKind::ObjectLiteral { values } => {
                self.out.push('{');
                for (i, value) in values.iter().enumerate() {
                    if i > 0 {
                        self.out.push(',');
                    }
                    self.out.push(' ');
                    self.node(*value);
                }
                if !values.is_empty() {
                    self.out.push(' ');
                }
                self.out.push('}');
            }

            NodeKind::PropertyAssignment { name, initializer } => {
                self.bare_key(name);
                self.out.push_str(": ");
                self.node(initializer);
            }

            NodeKind::PropertyAccessExpression { expression, name } => {
                self.node(expression);
                self.out.push('.');
                self.bare_text(name);
            }

            NodeKind::ArrayIndexExpression { expression, index } => {
                self.node(expression);
                self.out.push('.');
                self.bare_text(index);
            }

            NodeKind::ParenthesizedExpression { expression } => {
                self.out.push('(');
                self.node(expression);
                self.out.push(')');
            }

            NodeKind::InnerExpression { expression } => {
                self.out.push_str("$(");
                self.node(expression);
                self.out.push(')');
            }

            NodeKind::PrefixExpression { prefix, expression } => {
                self.node(prefix);
                self.node(expression);
            }

            NodeKind::OptionExpression { option, expression } => {
                self.node(option);
                self.out.push(' ');
                self.node(expression);
            }

            NodeKind::OptionKey { flag, prefix } => {
                self.out.push_str(prefix.as_str());
                self.out.push_str(&flag);
            }

            NodeKind::String {
                text,
                quotes,
                ..
            } => match quotes {
                Some(q) => {
                    self.out.push(q.as_char());
                    let escaped = escape_into(&text, q);
                    self.out.push_str(&escaped);
                    self.out.push(q.as_char());
                }
                None => self.out.push_str(&text),
            },

            NodeKind::Number { raw, .. } => self.out.push_str(&raw),

            NodeKind::Boolean { value } => {
                self.out.push_str(if value { "true" } else { "false" });
            }

            NodeKind::Identifier { name } => {
                self.out.push('$');
                self.out.push_str(&name);
            }

            NodeKind::OperatorToken { operator } => self.out.push_str(&operator),

            NodeKind::PrefixToken { value } => self.out.push(value),

            NodeKind::EndOfStatement => self.out.push(';'),

            NodeKind::Invalid { expression, .. } => {
                if let Some(expression) = expression {
                    self.node(expression);
                }
            }
        }
    }

    /// Emits the raw text of a terminal without any sigil or quoting
    /// (command names, function names, type names, property names).
    fn bare_text(&mut self, id: NodeId) {
        match self.tree.kind(id) {
            NodeKind::String { text, .. } => self.out.push_str(text),
            NodeKind::Identifier { name } => self.out.push_str(name),
            NodeKind::Number { raw, .. } => self.out.push_str(raw),
            _ => {}
        }
    }

    /// Emits an object-literal key: barewords stay bare, quoted strings
    /// keep their quotes, identifiers keep their sigil.
    fn bare_key(&mut self, id: NodeId) {
        if let NodeKind::String {
            quotes: None, text, ..
        } = self.tree.kind(id)
        {
            self.out.push_str(text);
        } else {
            self.node(id);
        }
    }
}

/// Re-escapes string content for quoting: the quote character itself,
/// backslashes, and `$` (so flattened text never re-interpolates).
fn escape_into(text: &str, quotes: QuoteKind) -> String {
    let quote = quotes.as_char();
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        if c == quote || c == '\\' || c == '$' {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

#[cfg(test)]
mod tests {
    use crate::source_analysis::parse;

    use super::*;

    fn roundtrip(source: &str) -> String {
        let result = parse(source);
        assert!(
            result.errors.is_empty(),
            "parse errors for {source:?}: {:?}",
            result.errors
        );
        render(&result.tree, result.root)
    }

    #[test]
    fn render_command() {
        assert_eq!(roundtrip("cmd hello 1337"), "cmd hello 1337");
        assert_eq!(roundtrip("cmd   hello    1337"), "cmd hello 1337");
    }

    #[test]
    fn render_options() {
        assert_eq!(roundtrip("cmd --test value"), "cmd --test value");
        assert_eq!(roundtrip("cmd -kEwL"), "cmd -k -E -w -L");
    }

    #[test]
    fn render_strings() {
        assert_eq!(roundtrip(r#"say "hello there""#), r#"say "hello there""#);
        assert_eq!(roundtrip("say 'single'"), "say 'single'");
        assert_eq!(roundtrip(r#"say "it\"s""#), r#"say "it\"s""#);
    }

    #[test]
    fn render_interpolated_string() {
        assert_eq!(
            roundtrip(r#"say "Hello, $player!""#),
            r#"say "Hello, $player!""#
        );
    }

    #[test]
    fn render_pipeline() {
        assert_eq!(roundtrip("a one && b two"), "a one && b two");
        assert_eq!(roundtrip("a | b | c"), "a | b | c");
    }

    #[test]
    fn render_variable_statement() {
        assert_eq!(
            roundtrip(r#"$x = [ "a", 1, true ]"#),
            r#"$x = ["a", 1, true]"#
        );
        assert_eq!(roundtrip("$x = { a: 1 }"), "$x = { a: 1 }");
    }

    #[test]
    fn render_if_else() {
        assert_eq!(
            roundtrip("if $ok { yes } else { no }"),
            "if $ok {\n    yes\n} else {\n    no\n}"
        );
    }

    #[test]
    fn render_for_and_function() {
        assert_eq!(
            roundtrip("for $item in $list { use $item }"),
            "for $item in $list {\n    use $item\n}"
        );
        assert_eq!(
            roundtrip("function greet($name: string) { say $name }"),
            "function greet($name: string) {\n    say $name\n}"
        );
    }

    #[test]
    fn render_property_access_and_index() {
        assert_eq!(roundtrip("show $player.stats.health"), "show $player.stats.health");
        assert_eq!(roundtrip("show $list.0"), "show $list.0");
    }

    #[test]
    fn render_inner_expression() {
        assert_eq!(roundtrip("use $(inner one)"), "use $(inner one)");
        // The call form renders in canonical inner-expression spelling.
        assert_eq!(roundtrip("use max(1, 2)"), "use $(max 1 2)");
    }

    #[test]
    fn render_prefix_expression() {
        assert_eq!(roundtrip("cmd @target ~home"), "cmd @target ~home");
    }

    #[test]
    fn pretty_print_indents_by_depth() {
        let result = parse("cmd hello");
        let printed = pretty_print(&result.tree, &[result.root], "");
        let lines: Vec<&str> = printed.lines().collect();
        assert_eq!(lines[0], "Source");
        assert_eq!(lines[1], "  CommandStatement");
        assert_eq!(lines[2], "    CommandName");
        assert_eq!(lines[3], "      String \"cmd\"");
        assert_eq!(lines[4], "    String \"hello\"");
    }

    #[test]
    fn pretty_print_accepts_a_prefix() {
        let result = parse("cmd");
        let printed = pretty_print(&result.tree, &[result.root], "> ");
        assert!(printed.starts_with("> Source"));
    }
}
