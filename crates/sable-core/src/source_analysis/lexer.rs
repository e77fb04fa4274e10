// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Lexical analysis for Sable source code.
//!
//! The lexer is hand-written for exact control over the language's symbol
//! policy. It converts source text into an ordered list of [`Lexeme`]s, each
//! tagged with the 1-indexed line its first character was seen on.
//!
//! # Scanning policy
//!
//! - Stray `\r` outside literals is dropped; `\n` advances the line counter.
//! - String (`"…"`) and character (`'…'`) literals keep their surrounding
//!   quotes as a single lexeme; a backslash escapes the next character.
//! - `//` and `/* … */` comments are dropped unless comment inclusion is
//!   requested via [`lex_with_comments`].
//! - Two adjacent symbol characters merge into one compound lexeme (`==`,
//!   `<=`, `>>`, `||`, `&&`, `^^`, `!!`, `+=`, `:=`, …) unless either is a
//!   structural bracket or comma: `(` `)` `{` `}` `]` `,`.
//! - `.` is not a symbol: it stays glued to identifier/number accumulation
//!   (`a.b`, `1..10`, `3.5`), except directly after a `)` lexeme, where it
//!   is emitted alone so method chains (`foo().bar()`) stay separable.
//! - Everything else accumulates into an identifier/number lexeme, flushed
//!   at the next symbol or whitespace.
//!
//! # Example
//!
//! ```
//! use sable_core::source_analysis::lex;
//!
//! let texts: Vec<String> = lex("if x <= 10 { y++; }")
//!     .iter()
//!     .map(ToString::to_string)
//!     .collect();
//! assert_eq!(texts, ["if", "x", "<=", "10", "{", "y", "++", ";", "}"]);
//! ```

use std::iter::Peekable;
use std::str::Chars;

use ecow::EcoString;

use super::Lexeme;

/// A lexer that tokenizes Sable source code.
///
/// The lexer never fails: malformed input (say, an unterminated string)
/// still produces a lexeme carrying the text seen so far, and the grouper
/// and parsers surface the fault as a diagnostic.
pub struct Lexer<'src> {
    /// Remaining characters of the source text.
    chars: Peekable<Chars<'src>>,
    /// Current 1-indexed line.
    line: u32,
    /// Identifier/number accumulator.
    buffer: String,
    /// Line the accumulator started on.
    buffer_line: u32,
    /// Lexemes produced so far.
    lexemes: Vec<Lexeme>,
    /// Whether comment lexemes are emitted.
    include_comments: bool,
}

/// Structural characters that never participate in compound symbols.
const fn is_structural(c: char) -> bool {
    matches!(c, '(' | ')' | '{' | '}' | ']' | ',')
}

/// Returns `true` for characters lexed as symbols.
///
/// `.` is deliberately absent (glued to identifiers), as are `_` and the
/// quote characters.
const fn is_symbol_char(c: char) -> bool {
    matches!(
        c,
        '!' | '#'
            | '$'
            | '%'
            | '&'
            | '('
            | ')'
            | '*'
            | '+'
            | ','
            | '-'
            | '/'
            | ':'
            | ';'
            | '<'
            | '='
            | '>'
            | '?'
            | '@'
            | '['
            | '\\'
            | ']'
            | '^'
            | '`'
            | '{'
            | '|'
            | '}'
            | '~'
    )
}

impl<'src> Lexer<'src> {
    /// Creates a new lexer for the given source text.
    #[must_use]
    pub fn new(source: &'src str) -> Self {
        Self {
            chars: source.chars().peekable(),
            line: 1,
            buffer: String::new(),
            buffer_line: 1,
            lexemes: Vec::new(),
            include_comments: false,
        }
    }

    /// Requests comment lexemes in the output.
    #[must_use]
    pub fn with_comments(mut self) -> Self {
        self.include_comments = true;
        self
    }

    /// Runs the lexer to completion.
    #[must_use]
    pub fn run(mut self) -> Vec<Lexeme> {
        while let Some(&c) = self.chars.peek() {
            match c {
                '\n' => {
                    self.flush();
                    self.line += 1;
                    self.chars.next();
                }
                '\r' => {
                    // Stray carriage returns outside literals are dropped.
                    self.flush();
                    self.chars.next();
                }
                c if c.is_whitespace() => {
                    self.flush();
                    self.chars.next();
                }
                '"' | '\'' => {
                    self.flush();
                    self.lex_quoted(c);
                }
                '/' => {
                    self.flush();
                    match self.peek_at(1) {
                        Some('/') => self.lex_line_comment(),
                        Some('*') => self.lex_block_comment(),
                        _ => self.lex_symbol('/'),
                    }
                }
                '.' if self.buffer.is_empty() && self.last_is_close_paren() => {
                    // Method-chaining dot: `foo().bar` is emitted alone.
                    self.chars.next();
                    self.push(".", self.line);
                }
                c if is_symbol_char(c) => {
                    self.flush();
                    self.lex_symbol(c);
                }
                c => {
                    if self.buffer.is_empty() {
                        self.buffer_line = self.line;
                    }
                    self.buffer.push(c);
                    self.chars.next();
                }
            }
        }
        self.flush();
        self.lexemes
    }

    /// Peeks `n` characters ahead without consuming (`n == 0` is the next
    /// character).
    fn peek_at(&self, n: usize) -> Option<char> {
        self.chars.clone().nth(n)
    }

    /// Returns `true` if the most recent lexeme is a `)`.
    fn last_is_close_paren(&self) -> bool {
        self.lexemes.last().is_some_and(|l| l.is(")"))
    }

    /// Flushes the identifier/number accumulator, if non-empty.
    fn flush(&mut self) {
        if !self.buffer.is_empty() {
            let text = std::mem::take(&mut self.buffer);
            let line = self.buffer_line;
            self.push(text, line);
        }
    }

    fn push(&mut self, text: impl Into<EcoString>, line: u32) {
        self.lexemes.push(Lexeme::new(text, line));
    }

    /// Lexes a quoted literal (string or character), quotes preserved.
    ///
    /// A backslash escapes the following character, so `\"` does not close a
    /// string. Newlines inside the literal advance the line counter but the
    /// lexeme keeps the line of its opening quote.
    fn lex_quoted(&mut self, quote: char) {
        let line = self.line;
        let mut text = String::new();
        text.push(quote);
        self.chars.next();

        while let Some(&c) = self.chars.peek() {
            match c {
                '\\' => {
                    text.push(c);
                    self.chars.next();
                    if let Some(escaped) = self.chars.next() {
                        if escaped == '\n' {
                            self.line += 1;
                        }
                        text.push(escaped);
                    }
                }
                c if c == quote => {
                    text.push(c);
                    self.chars.next();
                    break;
                }
                '\n' => {
                    self.line += 1;
                    text.push(c);
                    self.chars.next();
                }
                _ => {
                    text.push(c);
                    self.chars.next();
                }
            }
        }
        self.push(text, line);
    }

    /// Lexes a line comment: `// …` up to (not including) the newline.
    fn lex_line_comment(&mut self) {
        let line = self.line;
        let mut text = String::new();
        while let Some(&c) = self.chars.peek() {
            if c == '\n' {
                break;
            }
            text.push(c);
            self.chars.next();
        }
        if self.include_comments {
            self.push(text, line);
        }
    }

    /// Lexes a block comment: `/* … */`, possibly spanning lines.
    fn lex_block_comment(&mut self) {
        let line = self.line;
        let mut text = String::from("/*");
        self.chars.next(); // /
        self.chars.next(); // *

        while let Some(&c) = self.chars.peek() {
            if c == '*' && self.peek_at(1) == Some('/') {
                text.push_str("*/");
                self.chars.next();
                self.chars.next();
                break;
            }
            if c == '\n' {
                self.line += 1;
            }
            text.push(c);
            self.chars.next();
        }
        if self.include_comments {
            self.push(text, line);
        }
    }

    /// Lexes a symbol, merging two adjacent symbol characters into one
    /// compound lexeme unless either is structural.
    fn lex_symbol(&mut self, first: char) {
        let line = self.line;
        self.chars.next();

        if let Some(&second) = self.chars.peek() {
            if is_symbol_char(second) && !is_structural(first) && !is_structural(second) {
                self.chars.next();
                let mut text = String::new();
                text.push(first);
                text.push(second);
                self.push(text, line);
                return;
            }
        }
        self.push(String::from(first), line);
    }
}

/// Convenience function to lex source into lexemes, dropping comments.
#[must_use]
pub fn lex(source: &str) -> Vec<Lexeme> {
    Lexer::new(source).run()
}

/// Convenience function to lex source into lexemes, keeping comments.
#[must_use]
pub fn lex_with_comments(source: &str) -> Vec<Lexeme> {
    Lexer::new(source).with_comments().run()
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Helper to lex and extract just the lexeme texts.
    fn lex_texts(source: &str) -> Vec<String> {
        lex(source).iter().map(ToString::to_string).collect()
    }

    #[test]
    fn lex_empty() {
        assert!(lex("").is_empty());
        assert!(lex("   \t  ").is_empty());
        assert!(lex("// just a comment").is_empty());
    }

    #[test]
    fn lex_identifiers_and_numbers() {
        assert_eq!(
            lex_texts("foo bar_baz 42 3.5 _x"),
            vec!["foo", "bar_baz", "42", "3.5", "_x"]
        );
    }

    #[test]
    fn lex_dot_glues_to_identifiers() {
        assert_eq!(lex_texts("a.b.c"), vec!["a.b.c"]);
        assert_eq!(lex_texts("1..10"), vec!["1..10"]);
        assert_eq!(lex_texts("1 .. 10"), vec!["1", "..", "10"]);
    }

    #[test]
    fn lex_dot_after_close_paren_is_its_own_symbol() {
        assert_eq!(
            lex_texts("a.b().c(1,2).d();"),
            vec!["a.b", "(", ")", ".", "c", "(", "1", ",", "2", ")", ".", "d", "(", ")", ";"]
        );
    }

    #[test]
    fn lex_compound_symbols() {
        assert_eq!(
            lex_texts("== <= >= != && || ^^ !! << >> := += -= ~= |= @="),
            vec![
                "==", "<=", ">=", "!=", "&&", "||", "^^", "!!", "<<", ">>", ":=", "+=", "-=",
                "~=", "|=", "@="
            ]
        );
    }

    #[test]
    fn lex_structural_chars_never_merge() {
        assert_eq!(lex_texts("(("), vec!["(", "("]);
        assert_eq!(lex_texts("))"), vec![")", ")"]);
        assert_eq!(lex_texts("{}"), vec!["{", "}"]);
        assert_eq!(lex_texts("[]"), vec!["[", "]"]);
        assert_eq!(lex_texts("()"), vec!["(", ")"]);
        assert_eq!(lex_texts(",,"), vec![",", ","]);
    }

    #[test]
    fn lex_bracket_open_merges_with_nothing_after_exclusion() {
        // `[` is a symbol but `]` is excluded from merging, so `a[]` splits.
        assert_eq!(lex_texts("a[]"), vec!["a", "[", "]"]);
        assert_eq!(lex_texts("a[10]"), vec!["a", "[", "10", "]"]);
    }

    #[test]
    fn lex_type_spread() {
        assert_eq!(
            lex_texts("ptr:int[10]:const foo"),
            vec!["ptr", ":", "int", "[", "10", "]", ":", "const", "foo"]
        );
    }

    #[test]
    fn lex_strings_keep_quotes() {
        assert_eq!(lex_texts("\"hello\""), vec!["\"hello\""]);
        assert_eq!(
            lex_texts("writeln(\"Hello World\");"),
            vec!["writeln", "(", "\"Hello World\"", ")", ";"]
        );
    }

    #[test]
    fn lex_string_escape_continuation() {
        assert_eq!(lex_texts(r#""it \"quoted\"""#), vec![r#""it \"quoted\"""#]);
    }

    #[test]
    fn lex_character_literals() {
        assert_eq!(lex_texts("'a' '\\n'"), vec!["'a'", "'\\n'"]);
    }

    #[test]
    fn lex_unterminated_string_keeps_text() {
        assert_eq!(lex_texts("\"oops"), vec!["\"oops"]);
    }

    #[test]
    fn lex_line_numbers() {
        let lexemes = lex("a\nb\n\nc");
        let lines: Vec<u32> = lexemes.iter().map(Lexeme::line).collect();
        assert_eq!(lines, vec![1, 2, 4]);
    }

    #[test]
    fn lex_crlf_line_endings() {
        let lexemes = lex("a\r\nb");
        let lines: Vec<u32> = lexemes.iter().map(Lexeme::line).collect();
        assert_eq!(lines, vec![1, 2]);
    }

    #[test]
    fn lex_multiline_string_advances_line_counter() {
        let lexemes = lex("\"one\ntwo\" x");
        assert_eq!(lexemes[0].line(), 1);
        assert_eq!(lexemes[1].as_str(), "x");
        assert_eq!(lexemes[1].line(), 2);
    }

    #[test]
    fn lex_comments_dropped_by_default() {
        assert_eq!(lex_texts("a // trailing\nb"), vec!["a", "b"]);
        assert_eq!(lex_texts("a /* inline */ b"), vec!["a", "b"]);
    }

    #[test]
    fn lex_comments_included_on_request() {
        let texts: Vec<String> = lex_with_comments("a // note\nb")
            .iter()
            .map(ToString::to_string)
            .collect();
        assert_eq!(texts, vec!["a", "// note", "b"]);
    }

    #[test]
    fn lex_block_comment_spans_lines() {
        let lexemes = lex("/* one\ntwo */ x");
        assert_eq!(lexemes.len(), 1);
        assert_eq!(lexemes[0].as_str(), "x");
        assert_eq!(lexemes[0].line(), 2);
    }

    #[test]
    fn lex_slash_alone_is_a_symbol() {
        assert_eq!(lex_texts("a / b"), vec!["a", "/", "b"]);
        assert_eq!(lex_texts("a /= b"), vec!["a", "/=", "b"]);
    }

    #[test]
    fn lex_attribute_prefix() {
        assert_eq!(
            lex_texts("@Remote(server):"),
            vec!["@", "Remote", "(", "server", ")", ":"]
        );
    }

    #[test]
    fn lex_hello_world() {
        assert_eq!(
            lex_texts("module main;\nfn main(){\n\twriteln(\"Hello\");\n}"),
            vec![
                "module", "main", ";", "fn", "main", "(", ")", "{", "writeln", "(", "\"Hello\"",
                ")", ";", "}"
            ]
        );
    }

    #[test]
    fn lex_three_adjacent_symbols_merge_pairwise() {
        assert_eq!(lex_texts(">>>"), vec![">>", ">"]);
        assert_eq!(lex_texts("<<="), vec!["<<", "="]);
    }
}
