// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Control-flow parsing: if/else, switch, for, foreach, while, do-while.
//!
//! Conditions are parsed in forced-boolean mode, so mathematical operators
//! inside them surface as "Illegal symbol" diagnostics. Loop bodies install
//! `break` and `continue` scope-state handlers; switch arm bodies install
//! `break` only. Every parser reports a diagnostic and returns `None` on
//! malformed syntax, leaving the surrounding scope walk to continue.

use ecow::EcoString;

use crate::ast::{
    ElseStatement, ForStatement, ForeachRange, ForeachStatement, IfStatement, ScopeEntry,
    ScopeState, SwitchCase, SwitchStatement, WhileStatement,
};
use crate::source_analysis::{Lexeme, TokenNode};

use super::scope::PendingDo;
use super::{Parser, split_top_level, strip_terminator};

impl Parser {
    // ========================================================================
    // Conditionals
    // ========================================================================

    /// Parses `if <expr> { body }`.
    pub(crate) fn parse_if(&mut self, node: &TokenNode) -> Option<IfStatement> {
        self.parse_if_parts(&node.statement[1..], node)
    }

    fn parse_if_parts(
        &mut self,
        condition_tokens: &[Lexeme],
        node: &TokenNode,
    ) -> Option<IfStatement> {
        let line = node.line();
        if !node.is_block() {
            self.report(line, "Missing scope from if declaration.");
            return None;
        }
        let condition_tokens = strip_terminator(condition_tokens);
        if condition_tokens.is_empty() {
            self.report(line, "Missing expression from if declaration.");
            return None;
        }
        let condition = self.parse_expression(condition_tokens, true)?;
        let body = self.parse_scope(node);

        Some(IfStatement {
            condition,
            body,
            line,
        })
    }

    /// Parses `else { body }` or `else if <expr> { body }`.
    pub(crate) fn parse_else(&mut self, node: &TokenNode) -> Option<ElseStatement> {
        let line = node.line();

        // `else if …` recurses into the if parser.
        if node.word(1) == Some("if") {
            let nested = self.parse_if_parts(&node.statement[2..], node)?;
            return Some(ElseStatement {
                if_branch: Some(Box::new(nested)),
                body: Vec::new(),
                line,
            });
        }

        if node.statement.len() > 1 {
            self.report(line, "Invalid else declaration.");
            return None;
        }
        if !node.is_block() {
            self.report(line, "Missing scope from else declaration.");
            return None;
        }

        Some(ElseStatement {
            if_branch: None,
            body: self.parse_scope(node),
            line,
        })
    }

    // ========================================================================
    // Switch
    // ========================================================================

    /// Parses `switch <expr> { arms… }`.
    ///
    /// Arms are `case v;`, `case v, v;`, `case a .. b;`, `default;`, and
    /// `final;`, each followed by a scoped body with a `break` handler
    /// installed. `default` and `final` may appear at most once.
    pub(crate) fn parse_switch(&mut self, node: &TokenNode) -> Option<SwitchStatement> {
        let line = node.line();
        if !node.is_block() {
            self.report(line, "Missing scope from switch declaration.");
            return None;
        }
        let condition_tokens = &node.statement[1..];
        if condition_tokens.is_empty() {
            self.report(line, "Missing expression from switch declaration.");
            return None;
        }
        let expression = self.parse_expression(condition_tokens, true)?;

        let mut cases = Vec::new();
        let mut default_case: Option<Vec<ScopeEntry>> = None;
        let mut final_case: Option<Vec<ScopeEntry>> = None;

        let children = node.inner_children();
        let mut i = 0;
        while i < children.len() {
            let arm = &children[i];
            let arm_line = arm.line();

            // Each arm statement is followed by its scoped body.
            let body_node = children.get(i + 1).filter(|next| next.is_block());

            match arm.word(0) {
                Some("case") => {
                    let tokens = strip_terminator(&arm.statement);
                    let Some((values, is_range)) = self.parse_case_values(&tokens[1..], arm_line)
                    else {
                        i += 1;
                        continue;
                    };
                    let Some(body_node) = body_node else {
                        self.report(arm_line, "Missing scope from case declaration.");
                        i += 1;
                        continue;
                    };
                    let body = self.parse_breakable_body(body_node);
                    cases.push(SwitchCase {
                        values,
                        is_range,
                        body,
                        line: arm_line,
                    });
                    i += 2;
                }
                Some("default") => {
                    if default_case.is_some() {
                        self.report(arm_line, "Only one default statement is allowed per switch.");
                        i += 1;
                        continue;
                    }
                    let Some(body_node) = body_node else {
                        self.report(arm_line, "Missing scope from default declaration.");
                        i += 1;
                        continue;
                    };
                    default_case = Some(self.parse_breakable_body(body_node));
                    i += 2;
                }
                Some("final") => {
                    if final_case.is_some() {
                        self.report(arm_line, "Only one final statement is allowed per switch.");
                        i += 1;
                        continue;
                    }
                    let Some(body_node) = body_node else {
                        self.report(arm_line, "Missing scope from final declaration.");
                        i += 1;
                        continue;
                    };
                    final_case = Some(self.parse_breakable_body(body_node));
                    i += 2;
                }
                _ => {
                    self.report(arm_line, "Invalid declaration in switch statement.");
                    i += 1;
                }
            }
        }

        Some(SwitchStatement {
            expression,
            cases,
            default_case,
            final_case,
            line,
        })
    }

    /// Parses the value list of a `case` arm: a comma list or an `a .. b`
    /// range (inclusive low, exclusive high).
    fn parse_case_values(
        &mut self,
        tokens: &[Lexeme],
        line: u32,
    ) -> Option<(Vec<EcoString>, bool)> {
        if tokens.is_empty() {
            self.report(line, "Missing value from case declaration.");
            return None;
        }

        // Spaced range: `1 .. 5`.
        if tokens.iter().any(|t| t.is("..")) {
            let parts = split_top_level(tokens, "..");
            if parts.len() != 2 || parts[0].len() != 1 || parts[1].len() != 1 {
                self.report(line, "Invalid range in case declaration.");
                return None;
            }
            return Some((
                vec![parts[0][0].as_str().into(), parts[1][0].as_str().into()],
                true,
            ));
        }

        // Glued range: `1..5` arrives as one lexeme.
        if let [token] = tokens {
            if let Some((low, high)) = token.as_str().split_once("..") {
                if low.is_empty() || high.is_empty() {
                    self.report(line, "Invalid range in case declaration.");
                    return None;
                }
                return Some((vec![low.into(), high.into()], true));
            }
        }

        let mut values = Vec::new();
        for group in split_top_level(tokens, ",") {
            let [value] = group else {
                self.report(line, "Invalid case declaration.");
                return None;
            };
            values.push(EcoString::from(value.as_str()));
        }
        Some((values, false))
    }

    // ========================================================================
    // Loops
    // ========================================================================

    /// Parses `for init , cond , post { body }`.
    pub(crate) fn parse_for(&mut self, node: &TokenNode) -> Option<ForStatement> {
        let line = node.line();
        if !node.is_block() {
            self.report(line, "Missing scope from for declaration.");
            return None;
        }

        let parts = split_top_level(&node.statement[1..], ",");
        let [init, condition, post] = parts.as_slice() else {
            self.report(line, "Invalid for declaration.");
            return None;
        };

        let initializer = self.parse_variable_tokens(init)?;
        let condition = self.parse_expression(condition, true)?;
        let post = self.parse_assignment(post)?;
        let body = self.parse_loop_body(node);

        Some(ForStatement {
            initializer,
            condition,
            post,
            body,
            line,
        })
    }

    /// Parses `foreach index [, index2] , range-or-collection { body }`.
    pub(crate) fn parse_foreach(&mut self, node: &TokenNode) -> Option<ForeachStatement> {
        let line = node.line();
        if !node.is_block() {
            self.report(line, "Missing scope from foreach declaration.");
            return None;
        }

        let parts = split_top_level(&node.statement[1..], ",");
        if parts.len() < 2 || parts.len() > 3 {
            self.report(line, "Invalid foreach declaration.");
            return None;
        }
        let iterated_tokens = parts[parts.len() - 1];
        let indices = &parts[..parts.len() - 1];

        let mut names = Vec::new();
        for index in indices {
            let [name] = *index else {
                self.report(line, "Missing index from foreach declaration.");
                return None;
            };
            if !self.validate_identifier(name.as_str(), name.line()) {
                return None;
            }
            names.push(EcoString::from(name.as_str()));
        }

        let iterated = self.parse_foreach_range(iterated_tokens, line)?;
        let body = self.parse_loop_body(node);

        Some(ForeachStatement {
            index: names[0].clone(),
            second_index: names.get(1).cloned(),
            iterated,
            body,
            line,
        })
    }

    /// Parses the iterable of a foreach: `A`, `A .. B`, or glued `A..B`.
    fn parse_foreach_range(&mut self, tokens: &[Lexeme], line: u32) -> Option<ForeachRange> {
        match tokens {
            [] => {
                self.report(line, "Missing range from foreach declaration.");
                None
            }
            [token] => match token.as_str().split_once("..") {
                Some((low, high)) if !low.is_empty() && !high.is_empty() => {
                    Some(ForeachRange::Range {
                        low: low.into(),
                        high: high.into(),
                    })
                }
                Some(_) => {
                    self.report(line, "Invalid range in foreach declaration.");
                    None
                }
                None => Some(ForeachRange::Collection(token.as_str().into())),
            },
            [low, dots, high] if dots.is("..") => Some(ForeachRange::Range {
                low: low.as_str().into(),
                high: high.as_str().into(),
            }),
            _ => {
                self.report(line, "Invalid range in foreach declaration.");
                None
            }
        }
    }

    /// Parses `while <cond> { body }`, or closes a pending `do` into a
    /// do-while when the statement is the `;`-terminated closer form.
    pub(crate) fn parse_while(
        &mut self,
        node: &TokenNode,
        pending_do: &mut Option<PendingDo>,
    ) -> Option<WhileStatement> {
        let line = node.line();
        let condition_tokens = strip_terminator(&node.statement[1..]);
        if condition_tokens.is_empty() {
            self.report(line, "Missing expression from while declaration.");
            return None;
        }
        let condition = self.parse_expression(condition_tokens, true)?;

        if let Some((body, do_line)) = pending_do.take() {
            if node.is_block() {
                // A block-bodied while cannot close the do; the do is
                // unterminated and the while parses on its own.
                self.report(do_line, "Missing while statement from do-while declaration.");
            } else {
                return Some(WhileStatement {
                    condition,
                    body,
                    is_do: true,
                    line,
                });
            }
        }

        if !node.is_block() {
            self.report(line, "Missing scope from while declaration.");
            return None;
        }

        Some(WhileStatement {
            condition,
            body: self.parse_loop_body(node),
            is_do: false,
            line,
        })
    }

    /// Parses a `do { body }` block, caching the body for the next `while`.
    pub(crate) fn parse_do(&mut self, node: &TokenNode) -> Option<PendingDo> {
        let line = node.line();
        if !node.is_block() {
            self.report(line, "Missing scope from do-while declaration.");
            return None;
        }
        if node.statement.len() > 1 {
            self.report(line, "Invalid do-while declaration.");
            return None;
        }
        Some((self.parse_loop_body(node), line))
    }

    // ========================================================================
    // Body helpers
    // ========================================================================

    /// Parses a loop body with `break` and `continue` handlers installed.
    fn parse_loop_body(&mut self, node: &TokenNode) -> Vec<ScopeEntry> {
        self.install_handler("break", ScopeState::Break);
        self.install_handler("continue", ScopeState::Continue);
        let body = self.parse_scope(node);
        self.remove_handler("continue");
        self.remove_handler("break");
        body
    }

    /// Parses a switch-arm body with only a `break` handler installed.
    fn parse_breakable_body(&mut self, node: &TokenNode) -> Vec<ScopeEntry> {
        self.install_handler("break", ScopeState::Break);
        let body = self.parse_scope(node);
        self.remove_handler("break");
        body
    }
}
