//! Data-quality warnings raised while parsing banks and scoring results.
//!
//! Parsers and scorers never log directly; they report into a
//! [`DiagnosticSink`] supplied by the caller.

use std::fmt;
use std::sync::Mutex;

use serde::Serialize;

/// A recoverable data-quality problem. The affected unit was skipped or degraded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Diagnostic {
    /// A sheet had no rows and contributes no category.
    EmptyCategory { category: String },
    /// A sheet's row count is not a multiple of 5; the tail was ignored.
    RemainderDropped {
        category: String,
        rows: usize,
        dropped: usize,
    },
    /// A block had no usable prompt and was skipped.
    MissingPrompt { category: String, index: usize },
    /// A block was emitted with fewer than four responses.
    ShortResponses {
        category: String,
        index: usize,
        found: usize,
    },
    /// A results row was left unscored.
    UnscoredRow { row: usize, reason: String },
    /// Labels and answer strings differ in length; only the common prefix was scored.
    TruncatedRow {
        row: usize,
        labels: usize,
        correct: usize,
        given: usize,
        scored: usize,
    },
    /// A file could not be copied into the working area.
    CopyFailed { file: String, reason: String },
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Diagnostic::EmptyCategory { category } => {
                write!(f, "sheet '{category}' is empty, skipping")
            }
            Diagnostic::RemainderDropped {
                category,
                rows,
                dropped,
            } => write!(
                f,
                "sheet '{category}' has {rows} rows, expected a multiple of 5; \
                 {dropped} trailing row(s) dropped"
            ),
            Diagnostic::MissingPrompt { category, index } => {
                write!(f, "empty question in sheet '{category}' at index {index}")
            }
            Diagnostic::ShortResponses {
                category,
                index,
                found,
            } => write!(
                f,
                "question in sheet '{category}' at index {index} has only {found} responses (expected 4)"
            ),
            Diagnostic::UnscoredRow { row, reason } => {
                write!(f, "row {row} left unscored: {reason}")
            }
            Diagnostic::TruncatedRow {
                row,
                labels,
                correct,
                given,
                scored,
            } => write!(
                f,
                "row {row} has {labels} question labels, {correct} correct answers and \
                 {given} given answers; scoring the first {scored}"
            ),
            Diagnostic::CopyFailed { file, reason } => {
                write!(f, "failed to copy {file}: {reason}")
            }
        }
    }
}

/// Receiver for [`Diagnostic`]s.
pub trait DiagnosticSink: Send + Sync {
    fn report(&self, diagnostic: Diagnostic);
}

/// Forwards every diagnostic to `tracing` at WARN level.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl DiagnosticSink for TracingSink {
    fn report(&self, diagnostic: Diagnostic) {
        tracing::warn!("{diagnostic}");
    }
}

/// Keeps every diagnostic in memory, for tests and for the `validate` command.
#[derive(Debug, Default)]
pub struct CollectingSink {
    items: Mutex<Vec<Diagnostic>>,
}

impl CollectingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything reported so far.
    pub fn diagnostics(&self) -> Vec<Diagnostic> {
        self.items
            .lock()
            .map(|items| items.clone())
            .unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.items.lock().map(|items| items.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl DiagnosticSink for CollectingSink {
    fn report(&self, diagnostic: Diagnostic) {
        if let Ok(mut items) = self.items.lock() {
            items.push(diagnostic);
        }
    }
}
