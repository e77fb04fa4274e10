// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! The smallest unit of Sable source text.
//!
//! A [`Lexeme`] is a chunk of source (identifier, number, string, character,
//! symbol, or comment) tagged with the 1-indexed line its first character was
//! seen on. Lexemes are designed to be cheap to clone ([`EcoString`] payload)
//! because the grouper and parsers copy them into the token tree and AST.

use ecow::EcoString;
use serde::Serialize;

/// A line-tagged chunk of source text.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Lexeme {
    text: EcoString,
    line: u32,
}

impl Lexeme {
    /// Creates a new lexeme.
    #[must_use]
    pub fn new(text: impl Into<EcoString>, line: u32) -> Self {
        Self {
            text: text.into(),
            line,
        }
    }

    /// The text of this lexeme.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// The 1-indexed line this lexeme started on.
    #[must_use]
    pub const fn line(&self) -> u32 {
        self.line
    }

    /// Returns `true` if this lexeme's text equals `text`.
    #[must_use]
    pub fn is(&self, text: &str) -> bool {
        self.text == text
    }

    /// Returns `true` if this is the `;` statement terminator.
    #[must_use]
    pub fn is_terminator(&self) -> bool {
        self.text == ";"
    }

    /// Returns `true` if this is a double-quoted string literal
    /// (quotes preserved by the lexer).
    #[must_use]
    pub fn is_string_literal(&self) -> bool {
        self.text.len() >= 2 && self.text.starts_with('"') && self.text.ends_with('"')
    }

    /// Returns `true` if the text parses as an unsigned integer literal.
    #[must_use]
    pub fn is_unsigned_integer(&self) -> bool {
        !self.text.is_empty() && self.text.chars().all(|c| c.is_ascii_digit())
    }
}

impl std::fmt::Display for Lexeme {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.text)
    }
}
