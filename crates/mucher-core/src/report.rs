//! Grading reports: the per-category chart series and its JSON persistence.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::model::{AnswerCounts, CategoryTally, GradingPolicy};
use crate::scoring::GradingOutcome;

/// Stacked-bar series: one entry per category, in tally order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategorySeries {
    pub categories: Vec<String>,
    pub correct: Vec<u32>,
    pub missing: Vec<u32>,
    pub incorrect: Vec<u32>,
}

impl CategorySeries {
    /// Project a tally into parallel series. Zero-total categories are kept.
    pub fn from_tally(tally: &CategoryTally) -> Self {
        let mut series = Self::default();
        for (category, counts) in tally.iter() {
            series.categories.push(category.to_string());
            series.correct.push(counts.correct);
            series.missing.push(counts.missing);
            series.incorrect.push(counts.incorrect);
        }
        series
    }

    pub fn len(&self) -> usize {
        self.categories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }

    /// Counters for the category at `index`.
    pub fn counts(&self, index: usize) -> Option<AnswerCounts> {
        Some(AnswerCounts {
            correct: *self.correct.get(index)?,
            missing: *self.missing.get(index)?,
            incorrect: *self.incorrect.get(index)?,
        })
    }

    /// Largest stacked bar height, for chart scaling.
    pub fn max_total(&self) -> u32 {
        (0..self.len())
            .filter_map(|i| self.counts(i))
            .map(|c| c.total())
            .max()
            .unwrap_or(0)
    }
}

/// A student's score as it appears in the report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StudentScore {
    /// Zero-based data row in the results table.
    pub row: usize,
    pub student_id: String,
    /// `None` when the row was left unscored.
    pub score: Option<i64>,
}

/// Everything produced by one grading run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GradeReport {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    /// The results table that was graded.
    pub results_file: PathBuf,
    pub policy: GradingPolicy,
    pub graded_rows: usize,
    pub unscored_rows: usize,
    pub students: Vec<StudentScore>,
    pub series: CategorySeries,
    pub duration_ms: u64,
}

impl GradeReport {
    /// Assemble a report from a grading outcome.
    ///
    /// `student_ids` must be parallel to `outcome.scores`.
    pub fn new(
        results_file: &Path,
        policy: GradingPolicy,
        outcome: &GradingOutcome,
        student_ids: Vec<String>,
        duration_ms: u64,
    ) -> Self {
        let students = outcome
            .scores
            .iter()
            .zip(student_ids)
            .enumerate()
            .map(|(row, (score, student_id))| StudentScore {
                row,
                student_id,
                score: *score,
            })
            .collect();

        Self {
            id: Uuid::new_v4(),
            created_at: Utc::now(),
            results_file: results_file.to_path_buf(),
            policy,
            graded_rows: outcome.graded_rows(),
            unscored_rows: outcome.unscored_rows(),
            students,
            series: CategorySeries::from_tally(&outcome.tally),
            duration_ms,
        }
    }

    /// Save the report as JSON to a file.
    pub fn save_json(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self).context("failed to serialize report")?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, json)
            .with_context(|| format!("failed to write report to {}", path.display()))?;
        Ok(())
    }

    /// Load a report from a JSON file.
    pub fn load_json(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read report from {}", path.display()))?;
        let report: GradeReport =
            serde_json::from_str(&content).context("failed to parse report JSON")?;
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Outcome;

    fn tally() -> CategoryTally {
        let mut t = CategoryTally::new();
        t.record("Zoology", Outcome::Correct);
        t.record("Zoology", Outcome::Incorrect);
        t.record("Anatomy", Outcome::Missing);
        t
    }

    #[test]
    fn series_preserves_tally_order() {
        let series = CategorySeries::from_tally(&tally());
        assert_eq!(series.categories, vec!["Zoology", "Anatomy"]);
        assert_eq!(series.correct, vec![1, 0]);
        assert_eq!(series.missing, vec![0, 1]);
        assert_eq!(series.incorrect, vec![1, 0]);
        assert_eq!(series.max_total(), 2);
    }

    #[test]
    fn zero_total_categories_are_kept() {
        let tally: CategoryTally = serde_json::from_str(
            r#"{"Botany": {"correct": 0, "missing": 0, "incorrect": 0},
                "Ecology": {"correct": 2, "missing": 0, "incorrect": 1}}"#,
        )
        .unwrap();
        let series = CategorySeries::from_tally(&tally);
        assert_eq!(series.categories, vec!["Botany", "Ecology"]);
        assert_eq!(series.counts(0).unwrap().total(), 0);

        let series = CategorySeries::from_tally(&CategoryTally::default());
        assert!(series.is_empty());
        assert_eq!(series.max_total(), 0);
    }

    #[test]
    fn json_roundtrip() {
        let outcome = GradingOutcome {
            scores: vec![Some(9), None],
            tally: tally(),
        };
        let report = GradeReport::new(
            Path::new("results.xlsx"),
            GradingPolicy::default(),
            &outcome,
            vec!["rossi".into(), "bianchi".into()],
            12,
        );
        assert_eq!(report.graded_rows, 1);
        assert_eq!(report.unscored_rows, 1);

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.json");
        report.save_json(&path).unwrap();
        let loaded = GradeReport::load_json(&path).unwrap();

        assert_eq!(loaded.series, report.series);
        assert_eq!(loaded.students[1].score, None);
        assert_eq!(loaded.students[0].student_id, "rossi");
    }
}
