// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Expression parsing and validation.
//!
//! Right-hand expressions arrive as flat, `;`-terminated lexeme sequences.
//! Parsing proceeds in three steps:
//!
//! 1. A sequence opening with `[` is an **array literal**: entries split on
//!    top-level commas, with a `:` before the first comma marking the literal
//!    associative.
//! 2. Otherwise the sequence is classified **mathematical** or **boolean**
//!    from the operators actually present (callers may force boolean), and
//!    walked into [`ExpressionToken`]s. An identifier directly followed by
//!    `(` opens a function-call capture: the whole call sub-sequence,
//!    including a one-time `(…)(…)` template/value pair and any `).`-joined
//!    chain, becomes a single token.
//! 3. A **shunting-yard pass** over the linearized tokens (calls replaced by
//!    synthetic atoms) validates operator legality for the chosen mode and
//!    bracket balance. Its RPN output is discarded; only the diagnostics
//!    matter. Each operator belonging to the opposite mode produces exactly
//!    one "Illegal symbol" diagnostic.
//!
//! Assignment statements (`x += y;`, `i++;`) are parsed here too, since
//! their right-hand side goes through the same expression pipeline.

use ecow::EcoString;

use crate::ast::{
    ArrayLiteral, AssignmentExpression, CallArgument, Expression, ExpressionToken, FunctionCall,
    TokenExpression,
};
use crate::source_analysis::Lexeme;

use super::{Parser, find_matching, join_texts, split_top_level, strip_terminator};

/// Operator associativity for the shunting-yard tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Assoc {
    Left,
    Right,
}

/// Mathematical-mode operators: `(text, precedence, associativity)`.
/// Higher precedence binds tighter.
const MATH_OPERATORS: &[(&str, u8, Assoc)] = &[
    ("+", 1, Assoc::Left),
    ("-", 1, Assoc::Left),
    ("*", 2, Assoc::Left),
    ("/", 2, Assoc::Left),
    ("%", 2, Assoc::Left),
    ("^", 3, Assoc::Right),
    ("<<", 3, Assoc::Right),
    (">>", 3, Assoc::Right),
    ("|", 3, Assoc::Right),
    ("~", 3, Assoc::Right),
    ("&", 3, Assoc::Right),
    ("^^", 3, Assoc::Right),
];

/// Boolean-mode operators. `~` is concatenation and is valid in both modes.
const BOOLEAN_OPERATORS: &[(&str, u8, Assoc)] = &[
    ("||", 1, Assoc::Right),
    ("&&", 2, Assoc::Right),
    ("~", 3, Assoc::Left),
    (">", 4, Assoc::Right),
    (">=", 4, Assoc::Right),
    ("<=", 4, Assoc::Right),
    ("<", 4, Assoc::Right),
    ("!=", 4, Assoc::Right),
    ("!", 4, Assoc::Right),
    ("!!", 4, Assoc::Right),
    ("==", 4, Assoc::Right),
];

/// Operators that force boolean mode when present.
const BOOLEAN_MARKERS: &[&str] = &["||", "&&", ">", ">=", "<=", "<", "!=", "!", "!!", "=="];

/// The recognized assignment operators, including the unary pair.
const ASSIGNMENT_OPERATORS: &[&str] = &[
    "=", "+=", "-=", "*=", "/=", "%=", "^=", ":=", "~=", "|=", "@=", "++", "--",
];

fn lookup(table: &[(&str, u8, Assoc)], op: &str) -> Option<(u8, Assoc)> {
    table
        .iter()
        .find(|(text, _, _)| *text == op)
        .map(|&(_, precedence, assoc)| (precedence, assoc))
}

/// One element of the linear validation stream fed to the shunting-yard.
enum ValidationToken {
    /// An operand (identifier, literal, or synthetic call atom).
    Operand,
    /// A candidate operator.
    Operator(EcoString),
    /// An opening bracket.
    Open(char),
    /// A closing bracket.
    Close(char),
}

impl Parser {
    // ========================================================================
    // Expressions
    // ========================================================================

    /// Parses a right-hand expression from a (possibly `;`-terminated)
    /// lexeme sequence.
    ///
    /// `force_boolean` puts the shunting-yard in boolean mode regardless of
    /// the operators present (used by `if`/`while`/`for`/`switch`).
    pub(crate) fn parse_expression(
        &mut self,
        tokens: &[Lexeme],
        force_boolean: bool,
    ) -> Option<Expression> {
        let tokens = strip_terminator(tokens);
        let Some(first) = tokens.first() else {
            self.report(1, "Missing expression from declaration.");
            return None;
        };
        let line = first.line();

        if first.is("[") {
            return self.parse_array_literal(tokens).map(Expression::Array);
        }

        let is_mathematical = !force_boolean && !contains_boolean_operator(tokens);

        let mut expression_tokens = Vec::new();
        let mut validation = Vec::new();
        let mut i = 0;
        while i < tokens.len() {
            if is_call_start(tokens, i) {
                let Some(end) = self.call_extent(tokens, i) else {
                    return None;
                };
                let call = self.parse_function_call(&tokens[i..end], true)?;
                expression_tokens.push(ExpressionToken::Call(call));
                validation.push((ValidationToken::Operand, tokens[i].line()));
                i = end;
                continue;
            }

            let token = &tokens[i];
            validation.push((classify_validation_token(token), token.line()));
            expression_tokens.push(ExpressionToken::Atom(token.clone()));
            i += 1;
        }

        if !self.validate_shunting_yard(&validation, is_mathematical, line) {
            return None;
        }

        Some(Expression::Tokens(TokenExpression {
            tokens: expression_tokens,
            is_mathematical,
            line,
        }))
    }

    /// Parses an array or associative-array literal.
    pub(crate) fn parse_array_literal(&mut self, tokens: &[Lexeme]) -> Option<ArrayLiteral> {
        let tokens = strip_terminator(tokens);
        let line = tokens.first().map_or(1, Lexeme::line);

        if tokens.first().is_none_or(|t| !t.is("[")) {
            self.report(line, "Missing '[' from array literal.");
            return None;
        }
        match find_matching(tokens, 0) {
            Some(end) if end == tokens.len() - 1 => {}
            Some(_) => {
                self.report(line, "Invalid array literal declaration.");
                return None;
            }
            None => {
                self.report(line, "Missing ']' from array literal.");
                return None;
            }
        }

        let inner = &tokens[1..tokens.len() - 1];
        if inner.is_empty() {
            return Some(ArrayLiteral {
                is_associative: false,
                values: Vec::new(),
                line,
            });
        }

        let groups = split_top_level(inner, ",");

        // A `:` before the first `,` marks the literal associative.
        let is_associative = groups[0].iter().any(|t| t.is(":"));

        let mut values = Vec::new();
        for group in &groups {
            if is_associative {
                let parts = split_top_level(group, ":");
                if parts.len() != 2 || parts[0].len() != 1 || parts[1].len() != 1 {
                    let entry_line = group.first().map_or(line, |t| t.line());
                    self.report(entry_line, "Invalid associative array entry.");
                    return None;
                }
                values.push(vec![parts[0][0].clone(), parts[1][0].clone()]);
            } else {
                if group.is_empty() {
                    self.report(line, "Missing value from array literal.");
                    return None;
                }
                values.push(group.to_vec());
            }
        }

        Some(ArrayLiteral {
            is_associative,
            values,
            line,
        })
    }

    // ========================================================================
    // Function calls
    // ========================================================================

    /// Parses a function-call statement or sub-sequence.
    ///
    /// Accepts `name(args)` and `name(template)(args)`, with array-literal
    /// arguments absorbed atomically and `).`-joined chains flattened onto
    /// the root call. A dotted identifier (`a.b(…)`) produces a degenerate
    /// head call whose chain starts with the called segment.
    ///
    /// `relaxed_end` skips the trailing `;` requirement (expression captures
    /// and chain remainders).
    pub(crate) fn parse_function_call(
        &mut self,
        tokens: &[Lexeme],
        relaxed_end: bool,
    ) -> Option<FunctionCall> {
        let line = tokens.first().map_or(1, Lexeme::line);
        let had_terminator = tokens.last().is_some_and(Lexeme::is_terminator);
        let tokens = strip_terminator(tokens);

        if !relaxed_end && !had_terminator {
            self.report(line, "Missing ';' from function call declaration.");
            return None;
        }
        let Some(identifier) = tokens.first() else {
            self.report(line, "Missing identifier from function call declaration.");
            return None;
        };
        if tokens.get(1).is_none_or(|t| !t.is("(")) {
            self.report(line, "Missing '(' from function call declaration.");
            return None;
        }

        // First argument group.
        let Some(close) = find_matching(tokens, 1) else {
            self.report(line, "Missing ')' from function call declaration.");
            return None;
        };
        let first_group = &tokens[2..close];
        let mut next = close + 1;

        let mut template_arguments = Vec::new();
        let mut arguments = self.parse_call_arguments(first_group)?;

        // A second `(…)` promotes the first group to template arguments.
        if tokens.get(next).is_some_and(|t| t.is("(")) {
            let Some(second_close) = find_matching(tokens, next) else {
                self.report(line, "Missing ')' from function call declaration.");
                return None;
            };
            template_arguments = split_top_level(first_group, ",")
                .iter()
                .filter(|group| !group.is_empty())
                .map(|group| join_texts(group))
                .collect();
            arguments = self.parse_call_arguments(&tokens[next + 1..second_close])?;
            next = second_close + 1;

            if tokens.get(next).is_some_and(|t| t.is("(")) {
                self.report(line, "Too many argument lists in function call declaration.");
                return None;
            }
        }

        // Chained calls: `) . identifier ( …`.
        let mut chain = Vec::new();
        if tokens.get(next).is_some_and(|t| t.is(".")) {
            let remainder = &tokens[next + 1..];
            let mut sub = self.parse_function_call(remainder, true)?;
            let sub_chain = std::mem::take(&mut sub.chain);
            chain.push(sub);
            chain.extend(sub_chain);
        } else if next != tokens.len() {
            self.report(line, "Invalid function call declaration.");
            return None;
        }

        // A dotted identifier is a chain head: `a.b(…)` is the degenerate
        // call `a` with `b(…)` first in its chain.
        let segments: Vec<&str> = identifier.as_str().split('.').collect();
        if segments.iter().any(|segment| segment.is_empty()) {
            self.report(line, "Missing identifier from function call declaration.");
            return None;
        }

        let callee = FunctionCall {
            identifier: segments[segments.len() - 1].into(),
            template_arguments,
            arguments,
            chain: Vec::new(),
            line,
        };

        if segments.len() == 1 {
            let mut root = callee;
            root.chain = chain;
            return Some(root);
        }

        let mut root = FunctionCall::degenerate(segments[0], line);
        for segment in &segments[1..segments.len() - 1] {
            root.chain.push(FunctionCall::degenerate(*segment, line));
        }
        root.chain.push(callee);
        root.chain.extend(chain);
        Some(root)
    }

    /// Parses a comma-separated argument list into [`CallArgument`]s.
    fn parse_call_arguments(&mut self, tokens: &[Lexeme]) -> Option<Vec<CallArgument>> {
        if tokens.is_empty() {
            return Some(Vec::new());
        }
        let mut arguments = Vec::new();
        for group in split_top_level(tokens, ",") {
            let Some(first) = group.first() else {
                let line = tokens.first().map_or(1, Lexeme::line);
                self.report(line, "Missing argument from function call declaration.");
                return None;
            };
            if first.is("[") {
                arguments.push(CallArgument::Array(self.parse_array_literal(group)?));
            } else {
                arguments.push(CallArgument::Raw(group.to_vec()));
            }
        }
        Some(arguments)
    }

    /// Computes the exclusive end index of the call capture starting at
    /// `start`, spanning template/value groups and any `).`-joined chain.
    fn call_extent(&mut self, tokens: &[Lexeme], start: usize) -> Option<usize> {
        let line = tokens[start].line();
        let Some(mut close) = find_matching(tokens, start + 1) else {
            self.report(line, "Missing ')' from expression.");
            return None;
        };
        // Template/value pair.
        if tokens.get(close + 1).is_some_and(|t| t.is("(")) {
            let Some(second) = find_matching(tokens, close + 1) else {
                self.report(line, "Missing ')' from expression.");
                return None;
            };
            close = second;
        }
        // Chain links.
        while tokens.get(close + 1).is_some_and(|t| t.is("."))
            && tokens.get(close + 3).is_some_and(|t| t.is("("))
        {
            let Some(link_close) = find_matching(tokens, close + 3) else {
                self.report(line, "Missing ')' from expression.");
                return None;
            };
            close = link_close;
        }
        Some(close + 1)
    }

    // ========================================================================
    // Assignments
    // ========================================================================

    /// Parses an assignment statement: `lhs <op> rhs ;` or unary `lhs ++ ;`.
    pub(crate) fn parse_assignment(
        &mut self,
        tokens: &[Lexeme],
    ) -> Option<AssignmentExpression> {
        let line = tokens.first().map_or(1, Lexeme::line);
        let tokens = strip_terminator(tokens);

        let mut depth = 0_i32;
        let mut split = None;
        for (i, token) in tokens.iter().enumerate() {
            match token.as_str() {
                "(" | "[" | "{" => depth += 1,
                ")" | "]" | "}" => depth -= 1,
                text if depth == 0 && ASSIGNMENT_OPERATORS.contains(&text) => {
                    split = Some((i, EcoString::from(text)));
                    break;
                }
                _ => {}
            }
        }

        let Some((index, operator)) = split else {
            self.report(line, "Missing assignment operator from declaration.");
            return None;
        };

        let left_hand = tokens[..index].to_vec();
        let right_hand = tokens[index + 1..].to_vec();

        if left_hand.is_empty() {
            self.report(line, "Missing left-hand side from assignment declaration.");
            return None;
        }

        if operator == "++" || operator == "--" {
            if !right_hand.is_empty() {
                self.report(line, "Invalid assignment declaration.");
                return None;
            }
            return Some(AssignmentExpression {
                left_hand,
                operator,
                right_hand,
                right_hand_expression: None,
                line,
            });
        }

        if right_hand.is_empty() {
            self.report(line, "Missing expression from assignment declaration.");
            return None;
        }
        let right_hand_expression = self.parse_expression(&right_hand, false)?;

        Some(AssignmentExpression {
            left_hand,
            operator,
            right_hand,
            right_hand_expression: Some(right_hand_expression),
            line,
        })
    }

    // ========================================================================
    // Shunting-yard validation
    // ========================================================================

    /// Validates operator legality and bracket balance for the chosen mode.
    ///
    /// The RPN output is discarded; only diagnostics matter. Returns `false`
    /// if any fault was found.
    fn validate_shunting_yard(
        &mut self,
        stream: &[(ValidationToken, u32)],
        mathematical: bool,
        expression_line: u32,
    ) -> bool {
        let (table, opposite) = if mathematical {
            (MATH_OPERATORS, BOOLEAN_OPERATORS)
        } else {
            (BOOLEAN_OPERATORS, MATH_OPERATORS)
        };

        enum StackEntry {
            Operator(u8),
            Open(char),
        }

        let mut stack: Vec<StackEntry> = Vec::new();
        let mut ok = true;

        for (token, token_line) in stream {
            match token {
                ValidationToken::Operand => {}
                ValidationToken::Open(bracket) => stack.push(StackEntry::Open(*bracket)),
                ValidationToken::Close(bracket) => {
                    let open = matching_open(*bracket);
                    loop {
                        match stack.pop() {
                            Some(StackEntry::Operator(_)) => {}
                            Some(StackEntry::Open(o)) if o == open => break,
                            Some(StackEntry::Open(o)) => {
                                self.report(
                                    *token_line,
                                    format!("Missing '{}' from expression.", matching_close(o)),
                                );
                                ok = false;
                                break;
                            }
                            None => {
                                self.report(
                                    *token_line,
                                    format!("Missing '{open}' from expression."),
                                );
                                ok = false;
                                break;
                            }
                        }
                    }
                }
                ValidationToken::Operator(op) => {
                    if let Some((precedence, assoc)) = lookup(table, op) {
                        while let Some(StackEntry::Operator(top)) = stack.last() {
                            let pops = match assoc {
                                Assoc::Left => *top >= precedence,
                                Assoc::Right => *top > precedence,
                            };
                            if pops {
                                stack.pop();
                            } else {
                                break;
                            }
                        }
                        stack.push(StackEntry::Operator(precedence));
                    } else if lookup(opposite, op).is_some() {
                        self.report(
                            *token_line,
                            format!("Illegal symbol '{op}' found in expression."),
                        );
                        ok = false;
                    }
                    // Symbols in neither table pass through as operands
                    // (qualified-symbol atoms).
                }
            }
        }

        while let Some(entry) = stack.pop() {
            if let StackEntry::Open(bracket) = entry {
                self.report(
                    expression_line,
                    format!("Missing '{}' from expression.", matching_close(bracket)),
                );
                ok = false;
            }
        }
        ok
    }
}

const fn matching_close(open: char) -> char {
    match open {
        '(' => ')',
        _ => ']',
    }
}

const fn matching_open(close: char) -> char {
    match close {
        ')' => '(',
        _ => '[',
    }
}

/// Classifies a lexeme for the validation stream.
fn classify_validation_token(token: &Lexeme) -> ValidationToken {
    match token.as_str() {
        "(" => ValidationToken::Open('('),
        "[" => ValidationToken::Open('['),
        ")" => ValidationToken::Close(')'),
        "]" => ValidationToken::Close(']'),
        text if is_operator_text(text) => ValidationToken::Operator(text.into()),
        _ => ValidationToken::Operand,
    }
}

fn is_operator_text(text: &str) -> bool {
    lookup(MATH_OPERATORS, text).is_some() || lookup(BOOLEAN_OPERATORS, text).is_some()
}

/// Returns `true` if any boolean-only operator appears in the sequence.
fn contains_boolean_operator(tokens: &[Lexeme]) -> bool {
    tokens
        .iter()
        .any(|token| BOOLEAN_MARKERS.contains(&token.as_str()))
}

/// Returns `true` if position `i` opens a function call: an identifier-like
/// lexeme immediately followed by `(`.
fn is_call_start(tokens: &[Lexeme], i: usize) -> bool {
    let Some(token) = tokens.get(i) else {
        return false;
    };
    let identifier_like = token
        .as_str()
        .chars()
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_');
    identifier_like && tokens.get(i + 1).is_some_and(|t| t.is("("))
}
