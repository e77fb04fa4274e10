// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Type-expression parsing.
//!
//! A type spread arrives from the lexer already split on the three markers
//! `:`, `[`, `]` (brackets kept, colons dropped during the walk). The parser
//! walks left to right, accumulating [`TypeEntry`]s (a new base name or a
//! `ptr` prefix begins another entry), then resolves the collected entries
//! into a [`TypeKind`] on close-out:
//!
//! - one entry, no brackets → scalar or pointer
//! - one entry plus `[ ]` → dynamic array
//! - one entry plus `[ N ]` → static array
//! - two entries plus brackets → associative array `V[K]`
//!
//! Grammar rules enforced here, each with its own diagnostic: `ptr` precedes
//! the base and appears once per entry; mutability keywords follow a base;
//! only one array level; the size is an unsigned integer literal; one
//! optional trailing mutability may follow the closing `]`.

use crate::ast::{Mutability, TypeEntry, TypeInfo, TypeKind};
use crate::source_analysis::Lexeme;

use super::Parser;

/// Incremental state of one entry being accumulated.
#[derive(Default)]
struct PendingEntry {
    is_pointer: bool,
    base: Option<ecow::EcoString>,
    mutability: Option<Mutability>,
}

impl PendingEntry {
    fn pointer() -> Self {
        Self {
            is_pointer: true,
            ..Self::default()
        }
    }

    fn with_base(base: &str) -> Self {
        Self {
            base: Some(base.into()),
            ..Self::default()
        }
    }
}

impl Parser {
    /// Parses a composite type spread into a [`TypeInfo`].
    ///
    /// Reports a diagnostic and returns `None` on malformed input.
    pub(crate) fn parse_type(&mut self, tokens: &[Lexeme]) -> Option<TypeInfo> {
        let line = tokens.first().map_or(1, Lexeme::line);
        if tokens.is_empty() {
            self.report(line, "Missing type from declaration.");
            return None;
        }

        let mut entries: Vec<TypeEntry> = Vec::new();
        let mut current: Option<PendingEntry> = None;
        let mut seen_open = false;
        let mut seen_close = false;
        let mut size: Option<u64> = None;
        let mut outer_mutability: Option<Mutability> = None;

        for token in tokens {
            let word = token.as_str();
            match word {
                ":" => {}
                "[" => {
                    if seen_open {
                        self.report(token.line(), "Only one array level is allowed per type.");
                        return None;
                    }
                    seen_open = true;
                }
                "]" => seen_close = true,
                "ptr" => {
                    if seen_close {
                        self.report(token.line(), "Unknown attribute 'ptr' after type.");
                        return None;
                    }
                    match current.take() {
                        Some(pending) if pending.base.is_none() => {
                            // A second `ptr` before any base.
                            self.report(token.line(), "Only one pointer is allowed per type.");
                            return None;
                        }
                        Some(pending) => {
                            entries.push(finish_entry(pending));
                            current = Some(PendingEntry::pointer());
                        }
                        None => current = Some(PendingEntry::pointer()),
                    }
                }
                _ if Mutability::from_keyword(word).is_some() => {
                    let mutability = Mutability::from_keyword(word);
                    if seen_close {
                        if outer_mutability.is_some() {
                            self.report(token.line(), format!("Unknown attribute '{word}' after type."));
                            return None;
                        }
                        outer_mutability = mutability;
                    } else {
                        match current.as_mut() {
                            Some(pending) if pending.base.is_some() => {
                                pending.mutability = mutability;
                            }
                            _ => {
                                self.report(token.line(), "Mutability attribute must follow a type.");
                                return None;
                            }
                        }
                    }
                }
                _ if word.starts_with(|c: char| c.is_ascii_digit()) || word == "-" => {
                    // Numeric tokens are only meaningful as an array size.
                    if !seen_open || seen_close {
                        self.report(token.line(), "Array size must be an unsigned integer.");
                        return None;
                    }
                    if size.is_some() {
                        self.report(token.line(), "Only one size is allowed per array type.");
                        return None;
                    }
                    let Ok(parsed) = word.parse::<u64>() else {
                        self.report(token.line(), "Array size must be an unsigned integer.");
                        return None;
                    };
                    size = Some(parsed);
                }
                _ => {
                    if seen_close {
                        self.report(token.line(), format!("Unknown attribute '{word}' after type."));
                        return None;
                    }
                    match current.as_mut() {
                        Some(pending) if pending.base.is_none() => {
                            pending.base = Some(word.into());
                        }
                        Some(_) => {
                            // A new base begins another entry.
                            entries.push(finish_entry(current.take().expect("pending entry")));
                            current = Some(PendingEntry::with_base(word));
                        }
                        None => current = Some(PendingEntry::with_base(word)),
                    }
                }
            }
        }

        if seen_open && !seen_close {
            self.report(line, "Missing ']' from type declaration.");
            return None;
        }
        if let Some(pending) = current.take() {
            entries.push(finish_entry(pending));
        }

        if entries.iter().any(|entry| entry.base.is_empty()) {
            self.report(line, "Missing type after 'ptr'.");
            return None;
        }
        if entries.is_empty() {
            self.report(line, "Missing type from declaration.");
            return None;
        }
        if entries.len() > 2 || (entries.len() == 2 && !seen_open) {
            self.report(line, "Too many types in type declaration.");
            return None;
        }
        if entries.len() == 2 && size.is_some() {
            self.report(line, "Only one size is allowed per array type.");
            return None;
        }

        // Close-out: resolve the entry list into a flat kind. Two entries
        // plus an array level reclassify as associative, dropping the
        // dynamic/static distinction.
        let kind = if seen_open {
            if entries.len() == 2 {
                TypeKind::Associative
            } else if let Some(size) = size {
                TypeKind::StaticArray(size)
            } else {
                TypeKind::DynamicArray
            }
        } else if entries[0].is_pointer {
            TypeKind::Pointer
        } else {
            TypeKind::Scalar
        };

        let first = &entries[0];
        Some(TypeInfo {
            mutability: outer_mutability.or(first.mutability),
            is_pointer: first.is_pointer,
            base: first.base.clone(),
            entries,
            kind,
            line,
        })
    }
}

fn finish_entry(pending: PendingEntry) -> TypeEntry {
    TypeEntry {
        is_pointer: pending.is_pointer,
        base: pending.base.unwrap_or_default(),
        mutability: pending.mutability,
    }
}
