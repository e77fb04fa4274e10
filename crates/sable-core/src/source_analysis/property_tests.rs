// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Property-based tests for the lexer and grouper.
//!
//! These check the universal invariants of the front-end over arbitrary
//! input: the lexer never panics and tags every lexeme with an in-bounds
//! line, and every token tree the grouper produces is well-shaped.

use proptest::prelude::*;

use super::{Lexeme, TokenNode, group, lex};

/// Counts source lines the way the lexer does (1 + newlines).
fn line_count(source: &str) -> u32 {
    1 + u32::try_from(source.matches('\n').count()).unwrap_or(u32::MAX - 1)
}

/// Asserts the token-node shape invariant recursively: children are empty or
/// delimited by `{`/`}` sentinels.
fn assert_well_shaped(node: &TokenNode) {
    if !node.children.is_empty() {
        assert!(
            node.children.first().is_some_and(|n| n.is_sentinel("{")),
            "block must open with a {{ sentinel"
        );
        assert!(
            node.children.last().is_some_and(|n| n.is_sentinel("}")),
            "block must close with a }} sentinel"
        );
    }
    for child in &node.children {
        assert_well_shaped(child);
    }
}

proptest! {
    #[test]
    fn lexer_never_panics(source in "\\PC*") {
        let _ = lex(&source);
    }

    #[test]
    fn lexeme_lines_are_in_bounds(source in "\\PC*") {
        let bound = line_count(&source);
        for lexeme in lex(&source) {
            prop_assert!(lexeme.line() >= 1);
            prop_assert!(lexeme.line() <= bound);
        }
    }

    #[test]
    fn lexemes_preserve_source_order_of_lines(source in "[a-z \\n;{}()=+]*") {
        let lexemes = lex(&source);
        for pair in lexemes.windows(2) {
            prop_assert!(pair[0].line() <= pair[1].line());
        }
    }

    #[test]
    fn grouper_always_produces_well_shaped_trees(source in "[a-z0-9 \\n;{}()=+,\"]*") {
        let tree = group(lex(&source));
        for child in &tree.children {
            assert_well_shaped(child);
        }
    }

    #[test]
    fn grouper_preserves_non_brace_lexemes(tokens in prop::collection::vec("[a-z]{1,4}", 0..20)) {
        // Statements built from plain identifiers + terminators survive
        // grouping verbatim, in order.
        let lexemes: Vec<Lexeme> = tokens
            .iter()
            .enumerate()
            .map(|(i, t)| Lexeme::new(t.as_str(), u32::try_from(i).unwrap() + 1))
            .chain(std::iter::once(Lexeme::new(";", 99)))
            .collect();
        let tree = group(lexemes);
        prop_assert_eq!(tree.children.len(), 1);
        prop_assert_eq!(tree.children[0].statement.len(), tokens.len() + 1);
    }
}
