// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Sable compiler core.
//!
//! This crate contains the front-end of the Sable compiler:
//! - Lexical analysis (line-tagged lexemes)
//! - Statement grouping (the token tree split on `;` and `{…}`)
//! - Parsing (recursive descent over the grouped tree, producing a module AST)
//! - Diagnostics (immediate and speculative error channels)
//!
//! The front-end is deliberately free of process-wide state: every parse
//! threads an explicit [`Diagnostics`](diagnostics::Diagnostics) context, so
//! callers may compile files on separate threads with separate contexts.
//!
//! # Pipeline
//!
//! ```
//! use sable_core::parse_source;
//!
//! let (module, diagnostics) = parse_source("main.sb", "module main;");
//! assert!(!diagnostics.has_errors());
//! assert_eq!(module.name.as_str(), "main");
//! ```

pub mod ast;
pub mod diagnostics;
pub mod parse;
pub mod project;
pub mod source_analysis;
pub mod unparse;

pub use parse::parse_source;

/// Re-export commonly used types.
pub mod prelude {
    pub use crate::ast::{Expression, Function, Module, ScopeItem, ScopeState, TypeInfo};
    pub use crate::diagnostics::{Diagnostic, Diagnostics};
    pub use crate::parse::parse_source;
    pub use crate::source_analysis::{Lexeme, TokenNode, lex};
}
