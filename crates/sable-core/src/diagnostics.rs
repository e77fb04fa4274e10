// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Error accumulation for the Sable front-end.
//!
//! Diagnostics are plain data, never exceptions: parsers record faults here
//! and signal failure to their caller by returning `None`. The context offers
//! two channels:
//!
//! - **Immediate**: [`Diagnostics::emit`] appends to the emitted list and
//!   sets the sticky has-errors bit.
//! - **Queued**: [`Diagnostics::queue`] buffers speculatively. A parser
//!   probing one of several productions queues its faults; once the caller
//!   knows which production the input really was, it either
//!   [`Diagnostics::flush_queued`] (commit: surface the errors) or
//!   [`Diagnostics::clear_queued`] (fall back to another production).
//!
//! Rendering follows the fixed `source(line) Error: message` layout, with the
//! path separator normalized to the host convention.
//!
//! # Example
//!
//! ```
//! use sable_core::diagnostics::Diagnostics;
//!
//! let mut diagnostics = Diagnostics::new();
//! diagnostics.queue("main.sb", 3, "Missing ';' from declaration.");
//! assert!(!diagnostics.has_errors());
//!
//! diagnostics.flush_queued();
//! assert!(diagnostics.has_errors());
//! assert_eq!(
//!     diagnostics.emitted()[0].to_string(),
//!     "main.sb(3) Error: Missing ';' from declaration."
//! );
//! ```

use ecow::EcoString;

/// A single front-end error: a source label, a 1-indexed line, and a message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    /// Label of the offending source file (as given to the parser).
    pub source: EcoString,
    /// 1-indexed line the fault was observed on.
    pub line: u32,
    /// Human-readable message.
    pub message: EcoString,
}

impl Diagnostic {
    /// Creates a new diagnostic.
    #[must_use]
    pub fn new(source: impl Into<EcoString>, line: u32, message: impl Into<EcoString>) -> Self {
        Self {
            source: source.into(),
            line,
            message: message.into(),
        }
    }
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}({}) Error: {}",
            host_source(&self.source),
            self.line,
            self.message
        )
    }
}

/// Normalizes the source label's path separator to the host convention.
fn host_source(source: &str) -> EcoString {
    if cfg!(windows) {
        source.replace('/', "\\").into()
    } else {
        EcoString::from(source)
    }
}

/// Per-compilation diagnostic context.
///
/// Owns the emitted list, the speculative queue, and the sticky has-errors
/// bit. One context is created per compilation and threaded through every
/// parse entry point; nothing here is process-wide.
#[derive(Debug, Clone, Default)]
pub struct Diagnostics {
    emitted: Vec<Diagnostic>,
    queued: Vec<Diagnostic>,
    has_errors: bool,
}

impl Diagnostics {
    /// Creates an empty context.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Emits an error immediately, setting the has-errors bit.
    pub fn emit(&mut self, source: impl Into<EcoString>, line: u32, message: impl Into<EcoString>) {
        self.has_errors = true;
        self.emitted.push(Diagnostic::new(source, line, message));
    }

    /// Queues a speculative error without setting the has-errors bit.
    pub fn queue(
        &mut self,
        source: impl Into<EcoString>,
        line: u32,
        message: impl Into<EcoString>,
    ) {
        self.queued.push(Diagnostic::new(source, line, message));
    }

    /// Emits all queued errors in FIFO order.
    ///
    /// Returns whether any were present; if so, the has-errors bit is set.
    pub fn flush_queued(&mut self) -> bool {
        if self.queued.is_empty() {
            return false;
        }
        self.has_errors = true;
        self.emitted.append(&mut self.queued);
        true
    }

    /// Discards all queued errors.
    pub fn clear_queued(&mut self) {
        self.queued.clear();
    }

    /// Returns `true` if any errors are queued.
    #[must_use]
    pub fn has_queued(&self) -> bool {
        !self.queued.is_empty()
    }

    /// Returns `true` if any error has been emitted or flushed.
    #[must_use]
    pub fn has_errors(&self) -> bool {
        self.has_errors
    }

    /// The emitted errors, in source order.
    #[must_use]
    pub fn emitted(&self) -> &[Diagnostic] {
        &self.emitted
    }

    /// Consumes the context and returns the emitted errors.
    #[must_use]
    pub fn into_emitted(self) -> Vec<Diagnostic> {
        self.emitted
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn emit_sets_has_errors() {
        let mut diagnostics = Diagnostics::new();
        assert!(!diagnostics.has_errors());

        diagnostics.emit("a.sb", 1, "bad");
        assert!(diagnostics.has_errors());
        assert_eq!(diagnostics.emitted().len(), 1);
    }

    #[test]
    fn queue_does_not_set_has_errors() {
        let mut diagnostics = Diagnostics::new();
        diagnostics.queue("a.sb", 1, "maybe bad");

        assert!(!diagnostics.has_errors());
        assert!(diagnostics.has_queued());
        assert!(diagnostics.emitted().is_empty());
    }

    #[test]
    fn flush_queued_commits_in_fifo_order() {
        let mut diagnostics = Diagnostics::new();
        diagnostics.queue("a.sb", 1, "first");
        diagnostics.queue("a.sb", 2, "second");

        assert!(diagnostics.flush_queued());
        assert!(diagnostics.has_errors());
        assert!(!diagnostics.has_queued());
        assert_eq!(diagnostics.emitted()[0].message, "first");
        assert_eq!(diagnostics.emitted()[1].message, "second");
    }

    #[test]
    fn flush_queued_on_empty_queue_is_a_no_op() {
        let mut diagnostics = Diagnostics::new();
        assert!(!diagnostics.flush_queued());
        assert!(!diagnostics.has_errors());
    }

    #[test]
    fn clear_queued_discards_without_committing() {
        let mut diagnostics = Diagnostics::new();
        diagnostics.queue("a.sb", 1, "speculative");
        diagnostics.clear_queued();

        assert!(!diagnostics.has_queued());
        assert!(!diagnostics.has_errors());
        assert!(diagnostics.emitted().is_empty());
    }

    #[test]
    fn display_layout() {
        let diagnostic = Diagnostic::new("src/main.sb", 12, "Missing ')' from expression.");
        let rendered = diagnostic.to_string();
        if cfg!(windows) {
            assert_eq!(rendered, "src\\main.sb(12) Error: Missing ')' from expression.");
        } else {
            assert_eq!(rendered, "src/main.sb(12) Error: Missing ')' from expression.");
        }
    }

    #[test]
    fn emitted_preserves_source_order() {
        let mut diagnostics = Diagnostics::new();
        diagnostics.emit("a.sb", 1, "one");
        diagnostics.queue("a.sb", 2, "two");
        diagnostics.flush_queued();
        diagnostics.emit("a.sb", 3, "three");

        let lines: Vec<u32> = diagnostics.emitted().iter().map(|d| d.line).collect();
        assert_eq!(lines, vec![1, 2, 3]);
    }
}
