// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Recursive descent parsing over the grouped token tree.
//!
//! The [`Parser`] walks [`TokenNode`]s produced by the grouper and builds a
//! [`Module`] AST. It is designed for error tolerance rather than early
//! exit: every declaration parser reports faults to the [`Diagnostics`]
//! context and returns `None`, and the module walk continues at the next
//! top-level node so one pass surfaces as many diagnostics as possible.
//!
//! # Speculation
//!
//! Some inputs are resolved by probing several productions (a statement that
//! might be a function call or an assignment; an alias target that might be
//! a type or an expression). Probes run inside [`Parser::speculate`], which
//! routes diagnostics to the queued channel; the caller then commits the
//! errors with `flush_queued` or discards them with `clear_queued`.
//!
//! # Usage
//!
//! ```
//! use sable_core::parse::parse_source;
//!
//! let (module, diagnostics) = parse_source(
//!     "main.sb",
//!     "module main; fn main(){ writeln(\"Hello\"); }",
//! );
//! assert!(!diagnostics.has_errors());
//! assert_eq!(module.functions.len(), 1);
//! ```

use std::collections::HashMap;

use ecow::EcoString;

use crate::ast::{Attribute, Module, ScopeState};
use crate::diagnostics::Diagnostics;
use crate::source_analysis::{Lexeme, TokenNode, group, lex};

mod control_flow;
mod declarations;
mod expression;
mod scope;
mod types;

/// Words that cannot be used as declared identifiers.
const RESERVED_WORDS: &[&str] = &[
    "module", "import", "include", "internal", "alias", "fn", "var", "enum", "if", "else",
    "switch", "case", "default", "final", "for", "foreach", "while", "do", "return", "break",
    "continue", "end", "ptr", "const", "immutable", "mut", "public", "private", "protected",
    "package", "static", "shared", "this", "struct", "ref", "interface", "template", "traits",
    "void", "true", "false",
];

/// Parses a complete source file into a module AST.
///
/// This is the main entry point: it lexes, groups, and parses in one step
/// and returns the module together with the diagnostics context. The module
/// is always returned; check [`Diagnostics::has_errors`] before trusting it.
#[must_use]
pub fn parse_source(source: &str, text: &str) -> (Module, Diagnostics) {
    tracing::debug!(source, bytes = text.len(), "parsing source");
    let tree = group(lex(text));
    let (module, diagnostics) = parse_tree(source, &tree);
    tracing::debug!(
        source,
        errors = diagnostics.emitted().len(),
        "parse complete"
    );
    (module, diagnostics)
}

/// Parses an already-grouped token tree into a module AST.
#[must_use]
pub fn parse_tree(source: &str, tree: &TokenNode) -> (Module, Diagnostics) {
    let mut parser = Parser::new(source);
    let module = parser.parse_module(tree);
    (module, parser.diagnostics)
}

/// The parser context.
///
/// Owns every piece of mutable parse state: the diagnostics context, the
/// pending-attributes slot, and the scope-state handler stack. One context
/// is created per compilation; nothing is process-wide.
pub struct Parser {
    /// Label of the source file being parsed (for diagnostics).
    source: EcoString,
    /// Accumulated diagnostics.
    diagnostics: Diagnostics,
    /// Attributes buffered until the next declaration claims them.
    pending_attributes: Vec<Attribute>,
    /// Scope-state handlers keyed by keyword, with reference counts so
    /// nested constructs can coexist.
    scope_handlers: HashMap<EcoString, (ScopeState, usize)>,
    /// Depth of speculative probing; diagnostics queue instead of emitting
    /// while this is non-zero.
    speculation_depth: u32,
}

impl Parser {
    /// Creates a parser context for the given source label.
    #[must_use]
    pub fn new(source: impl Into<EcoString>) -> Self {
        Self {
            source: source.into(),
            diagnostics: Diagnostics::new(),
            pending_attributes: Vec::new(),
            scope_handlers: HashMap::new(),
            speculation_depth: 0,
        }
    }

    /// Read access to the accumulated diagnostics.
    #[must_use]
    pub fn diagnostics(&self) -> &Diagnostics {
        &self.diagnostics
    }

    // ========================================================================
    // Diagnostics plumbing
    // ========================================================================

    /// Reports a fault: emitted immediately, or queued inside a speculative
    /// probe.
    pub(crate) fn report(&mut self, line: u32, message: impl Into<EcoString>) {
        if self.speculation_depth > 0 {
            self.diagnostics.queue(self.source.clone(), line, message);
        } else {
            self.diagnostics.emit(self.source.clone(), line, message);
        }
    }

    /// Runs a probe with diagnostics routed to the queued channel.
    ///
    /// The caller decides afterwards whether to commit the queue
    /// (`flush_queued`) or discard it (`clear_queued`).
    pub(crate) fn speculate<T>(&mut self, probe: impl FnOnce(&mut Self) -> T) -> T {
        self.speculation_depth += 1;
        let result = probe(self);
        self.speculation_depth -= 1;
        result
    }

    /// Commits queued diagnostics; returns whether any were present.
    pub(crate) fn flush_queued(&mut self) -> bool {
        self.diagnostics.flush_queued()
    }

    /// Discards queued diagnostics.
    pub(crate) fn clear_queued(&mut self) {
        self.diagnostics.clear_queued();
    }

    // ========================================================================
    // Pending attributes
    // ========================================================================

    /// Buffers an attribute for the next declaration.
    pub(crate) fn push_pending_attribute(&mut self, attribute: Attribute) {
        self.pending_attributes.push(attribute);
    }

    /// Claims all buffered attributes for the declaration being parsed.
    pub(crate) fn take_pending_attributes(&mut self) -> Vec<Attribute> {
        std::mem::take(&mut self.pending_attributes)
    }

    // ========================================================================
    // Scope-state handlers
    // ========================================================================

    /// Installs a scope-state handler for `keyword` (reference counted).
    pub(crate) fn install_handler(&mut self, keyword: &str, state: ScopeState) {
        let entry = self
            .scope_handlers
            .entry(EcoString::from(keyword))
            .or_insert((state, 0));
        entry.1 += 1;
    }

    /// Removes one reference to the handler for `keyword`.
    pub(crate) fn remove_handler(&mut self, keyword: &str) {
        if let Some(entry) = self.scope_handlers.get_mut(keyword) {
            entry.1 -= 1;
            if entry.1 == 0 {
                self.scope_handlers.remove(keyword);
            }
        }
    }

    /// The state an installed handler maps `keyword` to, if any.
    pub(crate) fn handler_state(&self, keyword: &str) -> Option<ScopeState> {
        self.scope_handlers.get(keyword).map(|&(state, _)| state)
    }

    // ========================================================================
    // Identifier validation
    // ========================================================================

    /// Validates a declared identifier, reporting a diagnostic on failure.
    pub(crate) fn validate_identifier(&mut self, name: &str, line: u32) -> bool {
        if RESERVED_WORDS.contains(&name) {
            self.report(
                line,
                format!("Invalid identifier '{name}': reserved keyword."),
            );
            return false;
        }
        if !is_identifier(name) {
            self.report(line, format!("Invalid identifier '{name}'."));
            return false;
        }
        true
    }

    /// Validates a dotted path identifier (module names, import targets).
    pub(crate) fn validate_path(&mut self, path: &str, line: u32) -> bool {
        if path.is_empty() || path.split('.').any(|segment| !is_identifier(segment)) {
            self.report(line, format!("Invalid identifier '{path}'."));
            return false;
        }
        true
    }
}

/// Returns `true` if `name` is a well-formed identifier: a letter or `_`
/// followed by letters, digits, or `_`.
fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    let Some(first) = chars.next() else {
        return false;
    };
    (first.is_ascii_alphabetic() || first == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Splits a token slice on a separator at bracket depth zero.
///
/// Depth is tracked over `()`, `[]`, and `{}` so separators inside nested
/// groups stay put. Empty head/tail groups are preserved so callers can
/// diagnose missing parts.
pub(crate) fn split_top_level<'a>(tokens: &'a [Lexeme], separator: &str) -> Vec<&'a [Lexeme]> {
    let mut groups = Vec::new();
    let mut depth = 0_i32;
    let mut start = 0;
    for (i, token) in tokens.iter().enumerate() {
        match token.as_str() {
            "(" | "[" | "{" => depth += 1,
            ")" | "]" | "}" => depth -= 1,
            text if text == separator && depth == 0 => {
                groups.push(&tokens[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    groups.push(&tokens[start..]);
    groups
}

/// Finds the index of the closing bracket matching the opener at `open`.
pub(crate) fn find_matching(tokens: &[Lexeme], open: usize) -> Option<usize> {
    let (open_text, close_text) = match tokens.get(open)?.as_str() {
        "(" => ("(", ")"),
        "[" => ("[", "]"),
        "{" => ("{", "}"),
        _ => return None,
    };
    let mut depth = 0_u32;
    for (i, token) in tokens.iter().enumerate().skip(open) {
        if token.is(open_text) {
            depth += 1;
        } else if token.is(close_text) {
            depth -= 1;
            if depth == 0 {
                return Some(i);
            }
        }
    }
    None
}

/// Joins token texts with single spaces.
pub(crate) fn join_texts(tokens: &[Lexeme]) -> EcoString {
    let mut text = String::new();
    for (i, token) in tokens.iter().enumerate() {
        if i > 0 {
            text.push(' ');
        }
        text.push_str(token.as_str());
    }
    text.into()
}

/// Strips a trailing `;` terminator, if present.
pub(crate) fn strip_terminator(tokens: &[Lexeme]) -> &[Lexeme] {
    match tokens.last() {
        Some(last) if last.is_terminator() => &tokens[..tokens.len() - 1],
        _ => tokens,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{
        AttributeKind, CallArgument, ExpressionToken, ScopeItem, ScopeState, TypeKind,
    };

    fn parse_ok(source: &str) -> Module {
        let (module, diagnostics) = parse_source("test.sb", source);
        assert!(
            !diagnostics.has_errors(),
            "expected no errors, got: {:?}",
            diagnostics.emitted()
        );
        module
    }

    fn parse_err(source: &str) -> Vec<String> {
        let (_module, diagnostics) = parse_source("test.sb", source);
        assert!(diagnostics.has_errors(), "expected errors for: {source}");
        diagnostics
            .emitted()
            .iter()
            .map(|d| d.message.to_string())
            .collect()
    }

    // ========================================================================
    // End-to-end scenarios
    // ========================================================================

    #[test]
    fn scenario_hello_world() {
        let module = parse_ok("module main; fn main(){ writeln(\"Hello\"); }");
        assert_eq!(module.name, "main");
        assert_eq!(module.functions.len(), 1);

        let function = &module.functions[0];
        assert_eq!(function.name, "main");
        assert_eq!(function.return_type.base, "void");
        assert!(function.parameters.is_empty());

        let body = function.body.as_ref().expect("body");
        assert_eq!(body.len(), 1);
        match body[0].item.as_ref().expect("item") {
            ScopeItem::Call(call) => {
                assert_eq!(call.identifier, "writeln");
                assert_eq!(call.arguments.len(), 1);
                assert_eq!(call.arguments[0].text(), "\"Hello\"");
            }
            other => panic!("expected call, got {other:?}"),
        }
    }

    #[test]
    fn scenario_chained_call() {
        let module = parse_ok("module m; fn f(){ a.b().c(1,2).d(); }");
        let body = module.functions[0].body.as_ref().expect("body");
        match body[0].item.as_ref().expect("item") {
            ScopeItem::Call(call) => {
                assert_eq!(call.identifier, "a");
                assert!(call.arguments.is_empty());
                let chain: Vec<&str> = call.chain.iter().map(|c| c.identifier.as_str()).collect();
                assert_eq!(chain, ["b", "c", "d"]);
                assert_eq!(call.chain[1].arguments.len(), 2);
                assert_eq!(call.chain[1].arguments[0].text(), "1");
                assert_eq!(call.chain[1].arguments[1].text(), "2");
            }
            other => panic!("expected call, got {other:?}"),
        }
    }

    #[test]
    fn scenario_bad_operator_mode() {
        let messages = parse_err("module m; fn f(){ if x + y { g(); } }");
        let illegal: Vec<&String> = messages
            .iter()
            .filter(|m| m.contains("Illegal symbol '+'"))
            .collect();
        assert_eq!(illegal.len(), 1, "messages: {messages:?}");
    }

    #[test]
    fn scenario_unbalanced_brackets() {
        let (module, diagnostics) = parse_source("test.sb", "module m; var x = (1 + 2;");
        assert!(diagnostics.has_errors());
        assert!(
            diagnostics
                .emitted()
                .iter()
                .any(|d| d.message.contains("Missing ')' from expression.")),
            "got: {:?}",
            diagnostics.emitted()
        );
        assert!(module.variables.is_empty());
    }

    #[test]
    fn scenario_associative_array() {
        let module = parse_ok("module m; var map = [\"a\": 1, \"b\": 2];");
        let variable = &module.variables[0];
        let array = variable
            .expression
            .as_ref()
            .expect("expression")
            .as_array()
            .expect("array literal");
        assert!(array.is_associative);
        assert_eq!(array.values.len(), 2);
        assert!(array.values.iter().all(|entry| entry.len() == 2));
    }

    #[test]
    fn scenario_do_while() {
        let module = parse_ok("module m; fn f(){ do { i++; } while(i<10); }");
        let body = module.functions[0].body.as_ref().expect("body");
        assert_eq!(body.len(), 1);
        match body[0].item.as_ref().expect("item") {
            ScopeItem::While(while_loop) => {
                assert!(while_loop.is_do);
                assert_eq!(while_loop.body.len(), 1);
                assert!(matches!(
                    while_loop.body[0].item,
                    Some(ScopeItem::Assignment(_))
                ));
            }
            other => panic!("expected while, got {other:?}"),
        }
    }

    #[test]
    fn scenario_do_without_while() {
        let messages = parse_err("module m; fn f(){ do { i++; } g(); }");
        assert!(
            messages
                .iter()
                .any(|m| m == "Missing while statement from do-while declaration."),
            "got: {messages:?}"
        );
    }

    #[test]
    fn scenario_duplicate_module() {
        let messages = parse_err("module x; module x;");
        let duplicates: Vec<&String> = messages
            .iter()
            .filter(|m| *m == "Only one module statement is allowed per module.")
            .collect();
        assert_eq!(duplicates.len(), 1);
    }

    #[test]
    fn scenario_composite_type() {
        let module = parse_ok("module m; var ptr:int[10]:const foo = x;");
        let variable = &module.variables[0];
        assert_eq!(variable.name, "foo");

        let type_info = variable.type_info.as_ref().expect("type");
        assert!(type_info.is_pointer);
        assert_eq!(type_info.base, "int");
        assert_eq!(type_info.kind, TypeKind::StaticArray(10));
        assert_eq!(type_info.mutability, Some(crate::ast::Mutability::Const));
    }

    // ========================================================================
    // Module-level walk
    // ========================================================================

    #[test]
    fn module_collects_declarations_in_source_order() {
        let module = parse_ok(
            "module app;\n\
             import io;\n\
             include \"stdio.h\";\n\
             var counter = 0;\n\
             enum max = 100;\n\
             alias number = int;\n\
             internal fn helper();\n\
             fn main(){ }",
        );
        assert_eq!(module.name, "app");
        assert_eq!(module.imports.len(), 1);
        assert_eq!(module.includes.len(), 1);
        assert_eq!(module.variables.len(), 1);
        assert_eq!(module.enums.len(), 1);
        assert_eq!(module.aliases.len(), 1);
        assert_eq!(module.internal_functions.len(), 1);
        assert_eq!(module.functions.len(), 1);
    }

    #[test]
    fn module_attributes_are_claimed_by_next_declaration() {
        let module = parse_ok("module m; public: static: fn f(){ } fn g(){ }");
        let f = &module.functions[0];
        assert_eq!(f.attributes.len(), 2);
        assert!(matches!(
            &f.attributes[0].kind,
            AttributeKind::Keyword(k) if k == "public"
        ));
        assert!(module.functions[1].attributes.is_empty());
    }

    #[test]
    fn module_constructor_attribute() {
        let module = parse_ok("module m; @Remote(server, cached): fn f(){ }");
        let f = &module.functions[0];
        assert_eq!(f.attributes.len(), 1);
        match &f.attributes[0].kind {
            AttributeKind::Constructor { name, arguments } => {
                assert_eq!(name, "Remote");
                assert_eq!(arguments.as_slice(), ["server", "cached"]);
            }
            AttributeKind::Keyword(_) => panic!("expected constructor attribute"),
        }
    }

    #[test]
    fn module_continues_past_bad_declarations() {
        let (module, diagnostics) = parse_source("test.sb", "module m; ???; fn f(){ }");
        assert!(diagnostics.has_errors());
        assert_eq!(module.functions.len(), 1, "parse continues after fault");
    }

    #[test]
    fn unsupported_declarations_are_reported() {
        let messages = parse_err("module m; struct S { }");
        assert!(
            messages.iter().any(|m| m.contains("not supported")),
            "got: {messages:?}"
        );
    }

    // ========================================================================
    // Helpers
    // ========================================================================

    #[test]
    fn split_top_level_respects_depth() {
        let tokens = lex("f(a, b), c");
        let groups = split_top_level(&tokens, ",");
        assert_eq!(groups.len(), 2);
        assert_eq!(join_texts(groups[0]), "f ( a , b )");
        assert_eq!(join_texts(groups[1]), "c");
    }

    #[test]
    fn split_top_level_keeps_empty_groups() {
        let tokens = lex(", a");
        let groups = split_top_level(&tokens, ",");
        assert_eq!(groups.len(), 2);
        assert!(groups[0].is_empty());
    }

    #[test]
    fn find_matching_brackets() {
        let tokens = lex("( a ( b ) c ) d");
        assert_eq!(find_matching(&tokens, 0), Some(6));
        assert_eq!(find_matching(&tokens, 2), Some(4));
        assert_eq!(find_matching(&tokens, 7), None);

        let unbalanced = lex("( a");
        assert_eq!(find_matching(&unbalanced, 0), None);
    }

    #[test]
    fn is_identifier_rules() {
        assert!(is_identifier("foo"));
        assert!(is_identifier("_private"));
        assert!(is_identifier("x1"));
        assert!(!is_identifier(""));
        assert!(!is_identifier("1x"));
        assert!(!is_identifier("a.b"));
        assert!(!is_identifier("+"));
    }

    #[test]
    fn validate_identifier_rejects_reserved_words() {
        let mut parser = Parser::new("test.sb");
        assert!(!parser.validate_identifier("while", 1));
        assert!(parser.diagnostics().has_errors());
    }

    #[test]
    fn handler_stack_reference_counts() {
        let mut parser = Parser::new("test.sb");
        parser.install_handler("break", ScopeState::Break);
        parser.install_handler("break", ScopeState::Break);
        parser.remove_handler("break");
        assert_eq!(parser.handler_state("break"), Some(ScopeState::Break));
        parser.remove_handler("break");
        assert_eq!(parser.handler_state("break"), None);
    }

    // ========================================================================
    // Larger integration
    // ========================================================================

    #[test]
    fn full_program_parses_clean() {
        let module = parse_ok(
            "module demo;\n\
             import collections : map, set;\n\
             include \"math.h\";\n\
             \n\
             enum Color : int { red = 0; green = 1; blue = 2; }\n\
             \n\
             fn int sum(int a, int b){\n\
                 return a + b;\n\
             }\n\
             \n\
             fn main(){\n\
                 var int total = 0;\n\
                 for var i = 0 , i < 10 , i++ {\n\
                     total += i;\n\
                 }\n\
                 while total > 0 {\n\
                     total -= 1;\n\
                     if total == 5 {\n\
                         break;\n\
                     }\n\
                 }\n\
                 foreach i , 0 .. 10 {\n\
                     writeln(i);\n\
                 }\n\
                 switch total {\n\
                     case 0; { writeln(\"zero\"); }\n\
                     case 1, 2; { writeln(\"small\"); }\n\
                     case 3 .. 9; { writeln(\"mid\"); }\n\
                     default; { writeln(\"big\"); }\n\
                 }\n\
             }",
        );
        assert_eq!(module.name, "demo");
        assert_eq!(module.imports[0].members.as_slice(), ["map", "set"]);
        assert_eq!(module.enums[0].members.len(), 3);
        assert_eq!(module.functions.len(), 2);

        let main = &module.functions[1];
        let body = main.body.as_ref().expect("body");
        assert!(matches!(
            body.iter().map(|e| e.item.as_ref()).collect::<Vec<_>>()[..],
            [
                Some(ScopeItem::Variable(_)),
                Some(ScopeItem::For(_)),
                Some(ScopeItem::While(_)),
                Some(ScopeItem::Foreach(_)),
                Some(ScopeItem::Switch(_)),
            ]
        ));
    }

    #[test]
    fn expression_tokens_capture_calls() {
        let module = parse_ok("module m; var x = f(1) + 2;");
        let expression = module.variables[0]
            .expression
            .as_ref()
            .expect("expression")
            .as_tokens()
            .expect("token expression");
        assert!(expression.is_mathematical);
        assert!(matches!(&expression.tokens[0], ExpressionToken::Call(c) if c.identifier == "f"));
    }

    #[test]
    fn call_with_array_literal_argument() {
        let module = parse_ok("module m; fn f(){ push([1, 2, 3]); }");
        let body = module.functions[0].body.as_ref().expect("body");
        match body[0].item.as_ref().expect("item") {
            ScopeItem::Call(call) => {
                assert_eq!(call.arguments.len(), 1);
                assert!(matches!(&call.arguments[0], CallArgument::Array(a) if a.values.len() == 3));
            }
            other => panic!("expected call, got {other:?}"),
        }
    }

    #[test]
    fn break_outside_loop_is_diagnosed() {
        let messages = parse_err("module m; fn f(){ break; }");
        assert!(
            messages.iter().any(|m| m.contains("'break'")),
            "got: {messages:?}"
        );
    }

    #[test]
    fn continue_inside_loop_sets_state() {
        let module = parse_ok("module m; fn f(){ while x > 0 { continue; } }");
        let body = module.functions[0].body.as_ref().expect("body");
        let Some(ScopeItem::While(while_loop)) = &body[0].item else {
            panic!("expected while");
        };
        assert_eq!(while_loop.body[0].state, ScopeState::Continue);
        assert!(while_loop.body[0].item.is_none());
    }
}
