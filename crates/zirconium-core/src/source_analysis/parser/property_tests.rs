// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Property-based tests for the Zirconium parser.
//!
//! 1. **Parser never panics** — arbitrary input always produces a tree
//! 2. **Root is always `Source`** — even for garbage input
//! 3. **Span containment** — a node's span encloses its descendants'
//! 4. **Render idempotence** — for inputs that parse cleanly,
//!    `parse(render(parse(s)))` yields the same rendered text

use proptest::prelude::*;

use crate::ast::{NodeTag, Tree};
use crate::render::render;
use crate::source_analysis::parse;

/// Inputs that should parse without diagnostics.
const VALID_PROGRAMS: &[&str] = &[
    "cmd hello 1337",
    "cmd --test \"Hello, $player!\"",
    "cmd -kEwL",
    "cmd one && cmd --number two",
    "$x = [ \"a\", 1, true ]",
    "if $value { echo \"yes\" } else { echo \"no\" }",
    "for $item in $list { use $item }",
    "function greet($name: string) { say $name }",
    "$x = { a: 1, b: \"two\" }",
    "show $player.stats.health",
    "use $(get target)",
    "a | b && c",
    "$x = (1 + 2) * 3",
    "cmd @target ~home",
    "one; two; three",
];

fn valid_program() -> impl Strategy<Value = String> {
    prop::sample::select(VALID_PROGRAMS).prop_map(str::to_string)
}

/// Asserts that spans nest: every node's span lies inside the span of its
/// nearest spanned ancestor.
fn assert_span_containment(tree: &Tree, root: crate::ast::NodeId) {
    let Some(root_span) = tree.node(root).span() else {
        return;
    };
    let mut stack = vec![(root, root_span)];
    while let Some((id, outer)) = stack.pop() {
        let effective = match tree.node(id).span() {
            Some(span) => {
                assert!(
                    outer.contains(span),
                    "span {span:?} of {} escapes {outer:?}",
                    tree.kind(id).name(),
                );
                span
            }
            None => outer,
        };
        for child in tree.children(id) {
            stack.push((child, effective));
        }
    }
}

proptest! {
    /// Property 1: the parser never panics on arbitrary input.
    #[test]
    fn parser_never_panics(input in "\\PC{0,300}") {
        let _result = parse(&input);
    }

    /// Property 2: the root is always a `Source`, whatever the input.
    #[test]
    fn root_is_always_source(input in "\\PC{0,300}") {
        let result = parse(&input);
        prop_assert!(result.tree.node(result.root).is(NodeTag::Source));
    }

    /// Property 3: spans nest for arbitrary input.
    #[test]
    fn spans_nest(input in "\\PC{0,300}") {
        let result = parse(&input);
        assert_span_containment(&result.tree, result.root);
    }

    /// Property 3b: every recorded error points at a node in the tree.
    #[test]
    fn errors_reference_allocated_nodes(input in "\\PC{0,300}") {
        let result = parse(&input);
        for error in &result.errors {
            prop_assert!((error.node.as_raw() as usize) < result.tree.len());
        }
    }

    /// Property 4: rendering then reparsing is a fixed point for clean
    /// programs.
    #[test]
    fn render_reparse_is_idempotent(program in valid_program()) {
        let first = parse(&program);
        prop_assert!(first.errors.is_empty(), "seed program failed: {program:?}");

        let rendered = render(&first.tree, first.root);
        let second = parse(&rendered);
        prop_assert!(
            second.errors.is_empty(),
            "rendered program failed: {rendered:?}",
        );

        let rerendered = render(&second.tree, second.root);
        prop_assert_eq!(rendered, rerendered);
    }

    /// Statement sequencing survives joining programs with newlines.
    #[test]
    fn newline_joined_programs_parse_cleanly(
        programs in prop::collection::vec(valid_program(), 1..4)
    ) {
        let source = programs.join("\n");
        let result = parse(&source);
        prop_assert!(result.errors.is_empty(), "failed: {source:?}");
    }
}
