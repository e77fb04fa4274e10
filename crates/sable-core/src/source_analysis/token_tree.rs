// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! The token tree: a hierarchical grouping of lexemes.
//!
//! Before real parsing, the flat lexeme stream is folded into a tree of
//! [`TokenNode`]s, split on `;` statement terminators and `{…}` block
//! scopes. The parsers then walk this tree instead of juggling raw lexemes.
//!
//! # Shape
//!
//! - A **statement node** is a leaf whose `statement` holds the lexemes of
//!   one "line", terminated by `;`.
//! - A **block node** carries the (unterminated) header statement that
//!   preceded its `{` (e.g. `fn main ( )`), and its `children` open with a
//!   `{` sentinel node, close with a `}` sentinel node, and hold the
//!   statement/block nodes between.
//!
//! The tree is built with an explicit stack of open scopes; nodes carry no
//! parent pointers.
//!
//! # Example
//!
//! ```
//! use sable_core::source_analysis::{group, lex};
//!
//! let tree = group(lex("module main; fn main(){ writeln(\"hi\"); }"));
//! assert_eq!(tree.children.len(), 2);
//! assert_eq!(tree.children[0].statement_text(), "module main ;");
//! assert!(tree.children[1].is_block());
//! ```

use ecow::EcoString;
use serde::Serialize;

use super::Lexeme;
use super::classifier::is_attribute_keyword;

/// A node of the token tree.
///
/// Either a leaf statement, a `{`/`}` block sentinel, or a block scope whose
/// `statement` is the header that preceded the opening brace.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct TokenNode {
    /// The flat lexemes of one statement (possibly empty for bare blocks).
    pub statement: Vec<Lexeme>,
    /// Child nodes for block scopes; empty for leaf statements.
    pub children: Vec<TokenNode>,
}

impl TokenNode {
    /// Creates a leaf statement node.
    #[must_use]
    pub fn statement(statement: Vec<Lexeme>) -> Self {
        Self {
            statement,
            children: Vec::new(),
        }
    }

    /// Creates a `{` or `}` block sentinel node.
    #[must_use]
    pub fn sentinel(text: &str, line: u32) -> Self {
        Self {
            statement: vec![Lexeme::new(text, line)],
            children: Vec::new(),
        }
    }

    /// Returns `true` if this node is the given block sentinel.
    #[must_use]
    pub fn is_sentinel(&self, text: &str) -> bool {
        self.children.is_empty() && self.statement.len() == 1 && self.statement[0].is(text)
    }

    /// Returns `true` if this node is a block scope.
    #[must_use]
    pub fn is_block(&self) -> bool {
        !self.children.is_empty()
    }

    /// The text of the `i`-th statement lexeme, if present.
    #[must_use]
    pub fn word(&self, i: usize) -> Option<&str> {
        self.statement.get(i).map(Lexeme::as_str)
    }

    /// The source line this node starts on.
    #[must_use]
    pub fn line(&self) -> u32 {
        self.statement
            .first()
            .map(Lexeme::line)
            .or_else(|| self.children.first().map(TokenNode::line))
            .unwrap_or(1)
    }

    /// The statement rendered as space-joined text (diagnostics and tests).
    #[must_use]
    pub fn statement_text(&self) -> EcoString {
        let mut text = String::new();
        for (i, lexeme) in self.statement.iter().enumerate() {
            if i > 0 {
                text.push(' ');
            }
            text.push_str(lexeme.as_str());
        }
        text.into()
    }

    /// The child nodes between the `{`/`}` sentinels of a block scope.
    #[must_use]
    pub fn inner_children(&self) -> &[TokenNode] {
        let mut inner = self.children.as_slice();
        if inner.first().is_some_and(|n| n.is_sentinel("{")) {
            inner = &inner[1..];
        }
        if inner.last().is_some_and(|n| n.is_sentinel("}")) {
            inner = &inner[..inner.len() - 1];
        }
        inner
    }
}

/// Groups a lexeme stream into a token tree.
///
/// The returned root node has an empty statement; its children are the
/// top-level statement and block nodes in source order.
#[must_use]
pub fn group(lexemes: Vec<Lexeme>) -> TokenNode {
    Grouper::new().run(lexemes)
}

/// Tree-building state: an accumulator statement plus a stack of open scopes.
struct Grouper {
    /// Open scopes; index 0 is the root.
    stack: Vec<TokenNode>,
    /// Lexemes of the statement currently being accumulated.
    accumulator: Vec<Lexeme>,
    /// String-absorption mode: collected text and start line.
    absorbing: Option<(String, u32)>,
}

impl Grouper {
    fn new() -> Self {
        Self {
            stack: vec![TokenNode::default()],
            accumulator: Vec::new(),
            absorbing: None,
        }
    }

    fn run(mut self, lexemes: Vec<Lexeme>) -> TokenNode {
        let mut last_line = 1;
        let mut iter = lexemes.into_iter().peekable();

        while let Some(lexeme) = iter.next() {
            last_line = lexeme.line();

            // Defensive: a stray `"` toggles string absorption, concatenating
            // every intervening lexeme into one preserved string lexeme.
            if let Some((mut text, line)) = self.absorbing.take() {
                text.push_str(lexeme.as_str());
                if lexeme.is("\"") {
                    self.accumulator.push(Lexeme::new(text, line));
                } else {
                    self.absorbing = Some((text, line));
                }
                continue;
            }

            match lexeme.as_str() {
                "\"" => self.absorbing = Some((String::from("\""), lexeme.line())),
                ";" => {
                    self.accumulator.push(lexeme);
                    self.close_statement();
                }
                "{" => {
                    let header = std::mem::take(&mut self.accumulator);
                    let mut block = TokenNode::statement(header);
                    block.children.push(TokenNode::sentinel("{", lexeme.line()));
                    self.stack.push(block);
                }
                "}" => self.close_scope(lexeme.line()),
                _ if iter.peek().is_some_and(|next| next.is(":"))
                    && self.is_attribute_prefix(&lexeme) =>
                {
                    // Attribute statement: `public:` or `@Ctor(args):`. The
                    // trailing colon joins the statement, which then ends.
                    self.accumulator.push(lexeme);
                    if let Some(colon) = iter.next() {
                        self.accumulator.push(colon);
                    }
                    self.close_statement();
                }
                _ => self.accumulator.push(lexeme),
            }
        }

        // Unterminated trailing statement and unclosed scopes are preserved
        // so the parsers can diagnose them.
        if self.absorbing.is_some() || !self.accumulator.is_empty() {
            if let Some((text, line)) = self.absorbing.take() {
                self.accumulator.push(Lexeme::new(text, line));
            }
            self.close_statement();
        }
        while self.stack.len() > 1 {
            self.close_scope(last_line);
        }
        self.stack.pop().unwrap_or_default()
    }

    /// The attribute heuristic of the grouper: a bare attribute keyword with
    /// an empty accumulator, or an accumulator that began with `@`.
    fn is_attribute_prefix(&self, current: &Lexeme) -> bool {
        (self.accumulator.is_empty() && is_attribute_keyword(current.as_str()))
            || self
                .accumulator
                .first()
                .is_some_and(|first| first.as_str().starts_with('@'))
    }

    fn close_statement(&mut self) {
        let statement = std::mem::take(&mut self.accumulator);
        let node = TokenNode::statement(statement);
        self.current().children.push(node);
    }

    fn close_scope(&mut self, line: u32) {
        if !self.accumulator.is_empty() {
            self.close_statement();
        }
        if self.stack.len() == 1 {
            // Stray `}` at top level: nothing to close, drop it.
            return;
        }
        let mut block = self.stack.pop().expect("scope stack underflow");
        block.children.push(TokenNode::sentinel("}", line));
        self.current().children.push(block);
    }

    fn current(&mut self) -> &mut TokenNode {
        self.stack.last_mut().expect("scope stack is never empty")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source_analysis::lex;

    fn group_source(source: &str) -> TokenNode {
        group(lex(source))
    }

    #[test]
    fn group_empty() {
        let tree = group_source("");
        assert!(tree.statement.is_empty());
        assert!(tree.children.is_empty());
    }

    #[test]
    fn group_single_statement() {
        let tree = group_source("module main;");
        assert_eq!(tree.children.len(), 1);
        let node = &tree.children[0];
        assert_eq!(node.statement_text(), "module main ;");
        assert!(node.children.is_empty());
        assert!(node.statement.last().is_some_and(Lexeme::is_terminator));
    }

    #[test]
    fn group_block_with_header() {
        let tree = group_source("fn main(){ writeln(\"hi\"); }");
        assert_eq!(tree.children.len(), 1);

        let block = &tree.children[0];
        assert_eq!(block.statement_text(), "fn main ( )");
        assert!(block.is_block());
        assert!(block.children.first().is_some_and(|n| n.is_sentinel("{")));
        assert!(block.children.last().is_some_and(|n| n.is_sentinel("}")));
        assert_eq!(block.inner_children().len(), 1);
        assert_eq!(
            block.inner_children()[0].statement_text(),
            "writeln ( \"hi\" ) ;"
        );
    }

    #[test]
    fn group_nested_blocks() {
        let tree = group_source("fn f(){ if x { y(); } }");
        let outer = &tree.children[0];
        let inner = &outer.inner_children()[0];
        assert_eq!(inner.statement_text(), "if x");
        assert!(inner.is_block());
        assert_eq!(inner.inner_children()[0].statement_text(), "y ( ) ;");
    }

    #[test]
    fn group_bare_block_has_empty_statement() {
        let tree = group_source("fn f(){ { x(); } }");
        let outer = &tree.children[0];
        let bare = &outer.inner_children()[0];
        assert!(bare.statement.is_empty());
        assert!(bare.is_block());
    }

    #[test]
    fn group_attribute_keyword_statement() {
        let tree = group_source("public: var x = 1;");
        assert_eq!(tree.children.len(), 2);
        assert_eq!(tree.children[0].statement_text(), "public :");
        assert_eq!(tree.children[1].statement_text(), "var x = 1 ;");
    }

    #[test]
    fn group_constructor_attribute_statement() {
        let tree = group_source("@Remote(server): fn f();");
        assert_eq!(tree.children.len(), 2);
        assert_eq!(tree.children[0].statement_text(), "@ Remote ( server ) :");
    }

    #[test]
    fn group_colon_without_attribute_context_stays_inline() {
        // A type spread's colon must not terminate the statement.
        let tree = group_source("var ptr:int x = 0;");
        assert_eq!(tree.children.len(), 1);
        assert_eq!(tree.children[0].statement_text(), "var ptr : int x = 0 ;");
    }

    #[test]
    fn group_stray_quote_absorbs_lexemes() {
        let lexemes = vec![
            Lexeme::new("\"", 1),
            Lexeme::new("broken", 1),
            Lexeme::new("text", 1),
            Lexeme::new("\"", 1),
            Lexeme::new(";", 1),
        ];
        let tree = group(lexemes);
        assert_eq!(tree.children.len(), 1);
        assert_eq!(tree.children[0].statement[0].as_str(), "\"brokentext\"");
    }

    #[test]
    fn group_unclosed_scope_is_closed_at_eof() {
        let tree = group_source("fn f(){ x();");
        assert_eq!(tree.children.len(), 1);
        let block = &tree.children[0];
        assert!(block.children.last().is_some_and(|n| n.is_sentinel("}")));
    }

    #[test]
    fn group_stray_close_brace_is_dropped() {
        let tree = group_source("} var x = 1;");
        assert_eq!(tree.children.len(), 1);
        assert_eq!(tree.children[0].statement_text(), "var x = 1 ;");
    }

    #[test]
    fn group_unterminated_trailing_statement_is_kept() {
        let tree = group_source("var x = 1");
        assert_eq!(tree.children.len(), 1);
        assert_eq!(tree.children[0].statement_text(), "var x = 1");
    }

    #[test]
    fn group_do_while_shape() {
        let tree = group_source("do { i++; } while(i<10);");
        assert_eq!(tree.children.len(), 2);
        assert_eq!(tree.children[0].statement_text(), "do");
        assert!(tree.children[0].is_block());
        assert_eq!(tree.children[1].statement_text(), "while ( i < 10 ) ;");
    }

    #[test]
    fn node_invariants_hold_for_wellformed_input() {
        fn check(node: &TokenNode) {
            if !node.children.is_empty() {
                assert!(node.children.first().is_some_and(|n| n.is_sentinel("{")));
                assert!(node.children.last().is_some_and(|n| n.is_sentinel("}")));
            }
            for child in &node.children {
                check(child);
            }
        }
        let tree = group_source("module m; fn f(){ if a { b(); } else { c(); } }");
        for child in &tree.children {
            check(child);
        }
    }
}
