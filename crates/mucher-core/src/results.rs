//! Column layout of the results table.
//!
//! The results spreadsheet is the serial listing produced at generation time
//! with two columns appended by hand:
//!
//! | columns          | content                          |
//! |------------------|----------------------------------|
//! | `0..=2`          | variant metadata (ignored)       |
//! | `3..len-3`       | one question label per question  |
//! | `len-3`          | correct answers, one char each   |
//! | `len-2`          | given answers, `-` = unanswered  |
//! | `len-1`          | student identifier               |
//!
//! [`ResultsSchema`] is the only place that knows these offsets.

use std::fmt;

use crate::model::ResponseRecord;
use crate::workbook::Cell;

/// Why a results row could not be decoded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RowDefect {
    TooFewColumns { found: usize, required: usize },
    GivenAnswersNotText,
    CorrectAnswersNotText,
}

impl fmt::Display for RowDefect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RowDefect::TooFewColumns { found, required } => {
                write!(f, "only {found} columns, expected at least {required}")
            }
            RowDefect::GivenAnswersNotText => write!(f, "given answers are not text"),
            RowDefect::CorrectAnswersNotText => write!(f, "correct answers are not text"),
        }
    }
}

/// Lengths of a row whose labels and answer strings disagree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LengthMismatch {
    pub labels: usize,
    pub correct: usize,
    pub given: usize,
}

impl LengthMismatch {
    /// Questions that can still be scored: the common prefix.
    pub fn scored(&self) -> usize {
        self.labels.min(self.correct).min(self.given)
    }
}

/// A decoded row, plus the lengths it had if they had to be cut down.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedRow {
    pub record: ResponseRecord,
    pub mismatch: Option<LengthMismatch>,
}

/// Offsets of the results table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResultsSchema {
    /// Leading metadata columns.
    pub metadata_columns: usize,
    /// Trailing columns: correct answers, given answers, student id.
    pub trailing_columns: usize,
}

impl Default for ResultsSchema {
    fn default() -> Self {
        Self {
            metadata_columns: 3,
            trailing_columns: 3,
        }
    }
}

impl ResultsSchema {
    /// Narrowest row that can be decoded.
    pub fn min_columns(&self) -> usize {
        self.metadata_columns + self.trailing_columns
    }

    /// Student identifier of a row, even one that cannot be decoded.
    pub fn student_id(&self, row: &[Cell]) -> String {
        row.last()
            .and_then(Cell::to_trimmed_string)
            .unwrap_or_default()
    }

    /// Decode one row into a [`ResponseRecord`].
    ///
    /// Answer strings are trimmed. When labels and answers still differ in
    /// length, the record keeps only their common prefix and the original
    /// lengths are returned in [`DecodedRow::mismatch`].
    pub fn decode(&self, row: &[Cell]) -> Result<DecodedRow, RowDefect> {
        let required = self.min_columns();
        if row.len() < required {
            return Err(RowDefect::TooFewColumns {
                found: row.len(),
                required,
            });
        }

        let tail = row.len() - self.trailing_columns;
        let given = row[tail + 1]
            .as_text()
            .ok_or(RowDefect::GivenAnswersNotText)?
            .trim();
        let correct = row[tail]
            .as_text()
            .ok_or(RowDefect::CorrectAnswersNotText)?
            .trim();

        let mut category_labels: Vec<String> = row[self.metadata_columns..tail]
            .iter()
            .map(|cell| cell.to_trimmed_string().unwrap_or_default())
            .collect();

        let lengths = LengthMismatch {
            labels: category_labels.len(),
            correct: correct.chars().count(),
            given: given.chars().count(),
        };
        let scored = lengths.scored();
        let mismatch = (lengths.labels != scored
            || lengths.correct != scored
            || lengths.given != scored)
            .then_some(lengths);
        category_labels.truncate(scored);

        Ok(DecodedRow {
            record: ResponseRecord {
                student_id: row[tail + 2].to_trimmed_string().unwrap_or_default(),
                category_labels,
                correct_answers: correct.chars().take(scored).collect(),
                given_answers: given.chars().take(scored).collect(),
            },
            mismatch,
        })
    }
}
