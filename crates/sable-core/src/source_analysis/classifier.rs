// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Production classification for grouped statements.
//!
//! The classifier inspects the first one to three lexemes of a statement and
//! returns the [`Production`] tag that selects which declaration parser to
//! run. Two-word keys (`static this`, `static if`, `static else`,
//! `ref struct`) concatenate the first two lexemes; `shared static this`
//! uses three. Everything unrecognized falls through to
//! [`Production::Unknown`], which the scope parser resolves by probing
//! function-call and assignment productions.

use super::TokenNode;

/// Bare keywords that introduce an attribute statement.
pub(crate) const ATTRIBUTE_KEYWORDS: &[&str] = &[
    "public",
    "private",
    "protected",
    "package",
    "static",
    "immutable",
    "const",
    "mut",
];

/// Returns `true` if `word` is one of the bare attribute keywords.
#[must_use]
pub(crate) fn is_attribute_keyword(word: &str) -> bool {
    ATTRIBUTE_KEYWORDS.contains(&word)
}

/// The production a statement's leading lexemes select.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Production {
    /// `module <identifier> ;`
    Module,
    /// `import <identifier> [: members] ;`
    Import,
    /// `include "<path>" ;`
    Include,
    /// `internal fn … ;` forward declaration.
    Internal,
    /// `alias <name> = … ;`
    Alias,
    /// `this(…)` constructor (later phase).
    This,
    /// `static this(…)` / `shared static this(…)` (later phase).
    StaticThis,
    /// `fn …` function declaration.
    Function,
    /// `struct …` / `ref struct …` (later phase).
    Struct,
    /// `interface …` (later phase).
    Interface,
    /// `template …` (later phase).
    Template,
    /// `traits …` (later phase).
    Traits,
    /// `static if …` (later phase).
    StaticIf,
    /// `static else …` (later phase).
    StaticElse,
    /// `var …` variable declaration.
    Variable,
    /// Access modifier, mutability, `static`, or `@…:` prefix.
    Attribute,
    /// `enum …` declaration.
    Enum,
    /// `return [expr] ;`
    Return,
    /// `if <expr> { … }`
    If,
    /// `else { … }` / `else if …`
    Else,
    /// `switch <expr> { … }`
    Switch,
    /// `for init , cond , post { … }`
    For,
    /// `foreach index [, index2] , range { … }`
    Foreach,
    /// `while <cond> { … }`
    While,
    /// `do { … }`
    Do,
    /// No statement lexemes (bare block or empty node).
    Empty,
    /// Anything else: resolved by probing call/assignment productions.
    Unknown,
}

/// Classifies a grouped statement by its leading lexemes.
#[must_use]
pub fn classify(node: &TokenNode) -> Production {
    let Some(first) = node.word(0) else {
        return Production::Empty;
    };

    // Three-word key.
    if first == "shared" && node.word(1) == Some("static") && node.word(2) == Some("this") {
        return Production::StaticThis;
    }

    // Two-word keys take priority over the bare-keyword map ("static" alone
    // is an attribute, "static this" is not).
    match (first, node.word(1)) {
        ("static", Some("this")) => return Production::StaticThis,
        ("static", Some("if")) => return Production::StaticIf,
        ("static", Some("else")) => return Production::StaticElse,
        ("ref", Some("struct")) => return Production::Struct,
        _ => {}
    }

    match first {
        // A stray `;` groups into a statement of its own; treat as empty.
        ";" => Production::Empty,
        "module" => Production::Module,
        "import" => Production::Import,
        "include" => Production::Include,
        "internal" => Production::Internal,
        "alias" => Production::Alias,
        "this" => Production::This,
        "fn" => Production::Function,
        "struct" => Production::Struct,
        "interface" => Production::Interface,
        "template" => Production::Template,
        "traits" => Production::Traits,
        "var" => Production::Variable,
        "enum" => Production::Enum,
        "return" => Production::Return,
        "if" => Production::If,
        "else" => Production::Else,
        "switch" => Production::Switch,
        "for" => Production::For,
        "foreach" => Production::Foreach,
        "while" => Production::While,
        "do" => Production::Do,
        word if is_attribute_keyword(word) || word.starts_with('@') => Production::Attribute,
        _ => Production::Unknown,
    }
}
