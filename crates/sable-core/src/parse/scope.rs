// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Scope parsing: brace-delimited bodies.
//!
//! A scope is a block [`TokenNode`] whose children sit between `{`/`}`
//! sentinels. Each child statement is classified and dispatched; statements
//! no production claims are resolved by probing: function call first when
//! the statement begins `identifier (`, assignment otherwise, with the
//! probes' diagnostics queued and only committed when both fail.
//!
//! # Scope-state handlers
//!
//! Keywords like `break` and `continue` are legal only inside constructs
//! that installed a matching handler (loops install both, switches install
//! `break`). A handled keyword produces a [`ScopeEntry`] carrying the
//! handler's [`ScopeState`] and no item; unhandled, it is diagnosed.
//!
//! # Pending `do` bodies
//!
//! A `do` block is parsed immediately and cached locally; the next `while`
//! statement at the same level consumes it as a do-while. A cached body
//! that is not consumed by the next statement (or by the end of the scope)
//! raises "Missing while statement from do-while declaration.".

use crate::ast::{ReturnStatement, ScopeEntry, ScopeItem, ScopeState};
use crate::source_analysis::{Production, TokenNode, classify};

use super::{Parser, strip_terminator};

/// A parsed-but-unconsumed `do` body, waiting for its `while`.
pub(crate) type PendingDo = (Vec<ScopeEntry>, u32);

impl Parser {
    /// Parses a block node's children into scope entries.
    pub(crate) fn parse_scope(&mut self, node: &TokenNode) -> Vec<ScopeEntry> {
        let mut entries = Vec::new();
        let mut pending_do: Option<PendingDo> = None;

        for child in node.inner_children() {
            let production = classify(child);

            if pending_do.is_some() && production != Production::While {
                let (_, do_line) = pending_do.take().expect("pending do");
                self.report(do_line, "Missing while statement from do-while declaration.");
            }

            match production {
                Production::Return => {
                    if let Some(entry) = self.parse_return(child) {
                        entries.push(entry);
                    }
                }
                Production::Variable => {
                    if let Some(variable) = self.parse_variable(child) {
                        entries.push(ScopeEntry::item(
                            ScopeItem::Variable(variable),
                            child.line(),
                        ));
                    }
                }
                Production::If => {
                    if let Some(statement) = self.parse_if(child) {
                        entries.push(ScopeEntry::item(ScopeItem::If(statement), child.line()));
                    }
                }
                Production::Else => {
                    if let Some(statement) = self.parse_else(child) {
                        entries.push(ScopeEntry::item(ScopeItem::Else(statement), child.line()));
                    }
                }
                Production::Switch => {
                    if let Some(statement) = self.parse_switch(child) {
                        entries.push(ScopeEntry::item(
                            ScopeItem::Switch(statement),
                            child.line(),
                        ));
                    }
                }
                Production::For => {
                    if let Some(statement) = self.parse_for(child) {
                        entries.push(ScopeEntry::item(ScopeItem::For(statement), child.line()));
                    }
                }
                Production::Foreach => {
                    if let Some(statement) = self.parse_foreach(child) {
                        entries.push(ScopeEntry::item(
                            ScopeItem::Foreach(statement),
                            child.line(),
                        ));
                    }
                }
                Production::While => {
                    if let Some(statement) = self.parse_while(child, &mut pending_do) {
                        entries.push(ScopeEntry::item(ScopeItem::While(statement), child.line()));
                    }
                }
                Production::Do => pending_do = self.parse_do(child),
                Production::Empty => {
                    if child.is_block() {
                        let body = self.parse_scope(child);
                        entries.push(ScopeEntry::item(ScopeItem::Scope(body), child.line()));
                    }
                }
                Production::Attribute => self.parse_attribute_statement(child),
                Production::Unknown => {
                    if let Some(entry) = self.parse_scope_statement(child) {
                        entries.push(entry);
                    }
                }
                _ => self.report(child.line(), "Invalid declaration."),
            }
        }

        if let Some((_, do_line)) = pending_do {
            self.report(do_line, "Missing while statement from do-while declaration.");
        }

        entries
    }

    /// Parses `return [expr] ;`, setting the return scope state.
    fn parse_return(&mut self, node: &TokenNode) -> Option<ScopeEntry> {
        let line = node.line();
        let tokens = strip_terminator(&node.statement);

        let expression = if tokens.len() > 1 {
            Some(self.parse_expression(&tokens[1..], false)?)
        } else {
            None
        };

        Some(ScopeEntry {
            item: Some(ScopeItem::Return(ReturnStatement { expression, line })),
            state: ScopeState::Return,
            line,
        })
    }

    /// Resolves an unclassified statement: scope-state handlers first, then
    /// the call/assignment probes.
    fn parse_scope_statement(&mut self, node: &TokenNode) -> Option<ScopeEntry> {
        let tokens = &node.statement;
        let line = node.line();

        // A lone keyword with an installed handler terminates the containing
        // control flow; without one it is an error, not an expression.
        if tokens.len() == 2 && tokens[1].is_terminator() {
            let word = tokens[0].as_str();
            if let Some(state) = self.handler_state(word) {
                return Some(ScopeEntry::state(state, line));
            }
            if matches!(word, "break" | "continue" | "end") {
                self.report(line, format!("'{word}' is not allowed in this scope."));
                return None;
            }
        }

        // Probe order: a statement beginning `identifier (` is tried as a
        // function call first; anything else as an assignment first.
        let call_first = tokens.get(1).is_some_and(|t| t.is("("));
        if call_first {
            if let Some(call) = self.speculate(|p| p.parse_function_call(tokens, false)) {
                self.clear_queued();
                return Some(ScopeEntry::item(ScopeItem::Call(call), line));
            }
            if let Some(assignment) = self.speculate(|p| p.parse_assignment(tokens)) {
                self.clear_queued();
                return Some(ScopeEntry::item(ScopeItem::Assignment(assignment), line));
            }
        } else {
            if let Some(assignment) = self.speculate(|p| p.parse_assignment(tokens)) {
                self.clear_queued();
                return Some(ScopeEntry::item(ScopeItem::Assignment(assignment), line));
            }
            if let Some(call) = self.speculate(|p| p.parse_function_call(tokens, false)) {
                self.clear_queued();
                return Some(ScopeEntry::item(ScopeItem::Call(call), line));
            }
        }

        if !self.flush_queued() {
            self.report(line, "Invalid declaration.");
        }
        None
    }
}
