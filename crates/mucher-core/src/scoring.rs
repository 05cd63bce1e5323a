//! Answer-sheet scoring.
//!
//! Each record is scored on its own and yields its own [`CategoryTally`];
//! the batch folds them together with [`CategoryTally::merge`].

use serde::{Deserialize, Serialize};

use crate::diagnostics::{Diagnostic, DiagnosticSink};
use crate::model::{AnswerCounts, CategoryTally, GradingPolicy, Outcome, ResponseRecord};
use crate::results::{DecodedRow, ResultsSchema};
use crate::workbook::Table;

/// Marker for an unanswered question.
pub const NO_ANSWER: char = '-';

/// Length of the positional suffix the randomizer appends to category names.
const LABEL_SUFFIX_LEN: usize = 2;

/// Category a question label belongs to: the label without its 2-character suffix.
///
/// Labels shorter than the suffix are their own category.
pub fn category_key(label: &str) -> &str {
    let chars = label.chars().count();
    if chars < LABEL_SUFFIX_LEN {
        return label;
    }
    match label.char_indices().nth(chars - LABEL_SUFFIX_LEN) {
        Some((cut, _)) => &label[..cut],
        None => label,
    }
}

/// Compare one answer against the key.
pub fn classify(correct: char, given: char) -> Outcome {
    if given == NO_ANSWER {
        Outcome::Missing
    } else if given == correct {
        Outcome::Correct
    } else {
        Outcome::Incorrect
    }
}

/// Score and tally for a single record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordScore {
    pub total: i64,
    pub counts: AnswerCounts,
    pub tally: CategoryTally,
}

/// Score one record. Inputs are not modified.
pub fn score_record(record: &ResponseRecord, policy: &GradingPolicy) -> RecordScore {
    let mut total = 0i64;
    let mut counts = AnswerCounts::default();
    let mut tally = CategoryTally::new();

    for ((correct, given), label) in record
        .correct_answers
        .chars()
        .zip(record.given_answers.chars())
        .zip(&record.category_labels)
    {
        let outcome = classify(correct, given);
        total += policy.points_for(outcome);
        counts.record(outcome);
        tally.record(category_key(label), outcome);
    }

    RecordScore {
        total,
        counts,
        tally,
    }
}

/// Per-row scores and the merged tally for a whole results table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GradingOutcome {
    /// One entry per data row; `None` when the row could not be scored.
    pub scores: Vec<Option<i64>>,
    pub tally: CategoryTally,
}

impl GradingOutcome {
    pub fn graded_rows(&self) -> usize {
        self.scores.iter().filter(|s| s.is_some()).count()
    }

    pub fn unscored_rows(&self) -> usize {
        self.scores.len() - self.graded_rows()
    }
}

/// Score every row of `table`. Undecodable rows are reported and left blank.
pub fn grade_table(
    table: &Table,
    schema: &ResultsSchema,
    policy: &GradingPolicy,
    sink: &dyn DiagnosticSink,
) -> GradingOutcome {
    let mut outcome = GradingOutcome::default();

    for (row_idx, row) in table.rows.iter().enumerate() {
        match schema.decode(row) {
            Ok(DecodedRow { record, mismatch }) => {
                if let Some(lengths) = mismatch {
                    sink.report(Diagnostic::TruncatedRow {
                        row: row_idx,
                        labels: lengths.labels,
                        correct: lengths.correct,
                        given: lengths.given,
                        scored: lengths.scored(),
                    });
                }
                let scored = score_record(&record, policy);
                tracing::debug!(
                    "row {row_idx} ({}): {} points",
                    record.student_id,
                    scored.total
                );
                outcome.tally.merge(&scored.tally);
                outcome.scores.push(Some(scored.total));
            }
            Err(defect) => {
                sink.report(Diagnostic::UnscoredRow {
                    row: row_idx,
                    reason: defect.to_string(),
                });
                outcome.scores.push(None);
            }
        }
    }

    outcome
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::CollectingSink;
    use crate::workbook::Cell;

    fn record(labels: &[&str], correct: &str, given: &str) -> ResponseRecord {
        ResponseRecord {
            student_id: "s1".into(),
            category_labels: labels.iter().map(|l| l.to_string()).collect(),
            correct_answers: correct.into(),
            given_answers: given.into(),
        }
    }

    fn results_row(labels: &[&str], correct: &str, given: Cell, id: &str) -> Vec<Cell> {
        let mut row = vec![Cell::Number(1.0), Cell::Number(10.0), "A".into()];
        row.extend(labels.iter().map(|l| Cell::from(*l)));
        row.push(correct.into());
        row.push(given);
        row.push(id.into());
        row
    }

    #[test]
    fn category_key_strips_two_chars() {
        assert_eq!(category_key("Algebra01"), "Algebra");
        assert_eq!(category_key("Xy"), "");
        assert_eq!(category_key("X"), "X");
        assert_eq!(category_key(""), "");
        assert_eq!(category_key("Città12"), "Città");
    }

    #[test]
    fn scenario_mixed_answers() {
        let policy = GradingPolicy {
            points_correct: 4,
            points_missing: 1,
            points_incorrect: 0,
        };
        let r = record(&["Alg00", "Geo10", "His20", "Bio30"], "ABCD", "A-CX");
        let scored = score_record(&r, &policy);

        assert_eq!(scored.total, 9);
        assert_eq!(scored.tally.get("Alg").unwrap().correct, 1);
        assert_eq!(scored.tally.get("Geo").unwrap().missing, 1);
        assert_eq!(scored.tally.get("His").unwrap().correct, 1);
        assert_eq!(scored.tally.get("Bio").unwrap().incorrect, 1);
    }

    #[test]
    fn score_matches_count_identity() {
        let policy = GradingPolicy {
            points_correct: 3,
            points_missing: 0,
            points_incorrect: -1,
        };
        let r = record(
            &["A00", "A01", "B00", "B01", "C00", "C01"],
            "ABCDAB",
            "AB-DCC",
        );
        let scored = score_record(&r, &policy);

        assert_eq!(scored.counts.total() as usize, r.given_answers.len());
        assert_eq!(scored.total, scored.counts.points(&policy));
        assert_eq!(scored.counts.missing, 1);
        assert_eq!(scored.tally.get("B").unwrap().missing, 1);
    }

    #[test]
    fn dash_never_counts_as_correct() {
        let r = record(&["Q00"], "-", "-");
        let scored = score_record(&r, &GradingPolicy::default());
        assert_eq!(scored.counts.missing, 1);
        assert_eq!(scored.total, 1);
    }

    #[test]
    fn numeric_given_answers_row_is_unscored_and_batch_continues() {
        let table = Table {
            header: vec![],
            rows: vec![
                results_row(&["Alg00", "Geo00"], "AB", Cell::Number(12.0), "s1"),
                results_row(&["Alg01", "Geo01"], "AB", "AB".into(), "s2"),
            ],
        };
        let sink = CollectingSink::new();
        let outcome = grade_table(
            &table,
            &ResultsSchema::default(),
            &GradingPolicy::default(),
            &sink,
        );

        assert_eq!(outcome.scores, vec![None, Some(8)]);
        assert_eq!(outcome.tally.total().total(), 2);
        assert_eq!(outcome.unscored_rows(), 1);
        assert!(matches!(
            sink.diagnostics()[0],
            Diagnostic::UnscoredRow { row: 0, .. }
        ));
    }

    #[test]
    fn grading_is_idempotent() {
        let table = Table {
            header: vec![],
            rows: vec![
                results_row(&["Alg00", "Geo00"], "AB", "A-".into(), "s1"),
                results_row(&["Geo01", "Alg01"], "CD", "DD".into(), "s2"),
                vec![Cell::Empty; 4],
            ],
        };
        let sink = CollectingSink::new();
        let schema = ResultsSchema::default();
        let policy = GradingPolicy::default();

        let first = grade_table(&table, &schema, &policy, &sink);
        let second = grade_table(&table, &schema, &policy, &sink);
        assert_eq!(first, second);
    }

    #[test]
    fn tally_totals_equal_graded_entries() {
        let table = Table {
            header: vec![],
            rows: vec![
                results_row(&["Alg00", "Geo00", "Alg01"], "ABC", "A-X".into(), "s1"),
                results_row(&["Geo01", "Alg02", "Geo02"], "DDA", "DDA".into(), "s2"),
            ],
        };
        let sink = CollectingSink::new();
        let outcome = grade_table(
            &table,
            &ResultsSchema::default(),
            &GradingPolicy::default(),
            &sink,
        );

        assert_eq!(outcome.tally.get("Alg").unwrap().total(), 3);
        assert_eq!(outcome.tally.get("Geo").unwrap().total(), 3);
        let names: Vec<&str> = outcome.tally.iter().map(|(name, _)| name).collect();
        assert_eq!(names, vec!["Alg", "Geo"]);
    }

    #[test]
    fn trailing_space_in_given_answers_still_scores() {
        let table = Table {
            header: vec![],
            rows: vec![results_row(
                &["Alg00", "Geo10", "His20", "Bio30"],
                "ABCD",
                "A-CX ".into(),
                "rossi",
            )],
        };
        let sink = CollectingSink::new();
        let outcome = grade_table(
            &table,
            &ResultsSchema::default(),
            &GradingPolicy::default(),
            &sink,
        );

        assert_eq!(outcome.scores, vec![Some(9)]);
        assert!(sink.is_empty());
    }

    #[test]
    fn short_given_answers_score_the_common_prefix() {
        let table = Table {
            header: vec![],
            rows: vec![results_row(
                &["Alg00", "Geo10", "His20"],
                "ABC",
                "AB".into(),
                "s1",
            )],
        };
        let sink = CollectingSink::new();
        let outcome = grade_table(
            &table,
            &ResultsSchema::default(),
            &GradingPolicy::default(),
            &sink,
        );

        assert_eq!(outcome.scores, vec![Some(8)]);
        assert_eq!(outcome.tally.total().total(), 2);
        assert!(outcome.tally.get("His").is_none());
        assert_eq!(
            sink.diagnostics(),
            vec![Diagnostic::TruncatedRow {
                row: 0,
                labels: 3,
                correct: 3,
                given: 2,
                scored: 2,
            }]
        );
    }
}
