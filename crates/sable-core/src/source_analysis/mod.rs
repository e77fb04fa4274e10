// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Lexical and structural analysis for Sable source code.
//!
//! This module covers everything before real parsing:
//!
//! # Lexing
//!
//! The [`Lexer`] converts source text into a flat list of line-tagged
//! [`Lexeme`]s. Whitespace is dropped; comments are dropped unless requested
//! via [`lex_with_comments`].
//!
//! ```
//! use sable_core::source_analysis::lex;
//!
//! let lexemes = lex("var x = 1;");
//! let texts: Vec<&str> = lexemes.iter().map(|l| l.as_str()).collect();
//! assert_eq!(texts, ["var", "x", "=", "1", ";"]);
//! ```
//!
//! # Grouping
//!
//! [`group`] folds the lexemes into a hierarchical [`TokenNode`] tree, split
//! on `;` statement terminators and `{…}` block scopes. The parsers walk this
//! tree rather than the raw lexeme stream.
//!
//! # Classification
//!
//! [`classify`] maps the leading lexemes of a grouped statement to a
//! [`Production`] tag that selects the declaration parser to run.

mod classifier;
mod lexeme;
mod lexer;
mod token_tree;

#[cfg(test)]
mod property_tests;

pub use classifier::{Production, classify};
pub use lexeme::Lexeme;
pub use lexer::{Lexer, lex, lex_with_comments};
pub use token_tree::{TokenNode, group};
