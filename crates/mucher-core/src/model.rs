//! Core data model types for mucher.
//!
//! A generation run owns a [`QuestionBank`] and a [`VariantSpec`]; a grading
//! run owns its [`ResponseRecord`]s and the [`CategoryTally`] built from them.

use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::MucherError;

/// Number of responses that follow every prompt in the bank.
pub const RESPONSES_PER_QUESTION: usize = 4;

/// Rows per question block: one prompt followed by its responses.
pub const ROWS_PER_BLOCK: usize = RESPONSES_PER_QUESTION + 1;

/// One multiple-choice question parsed from the bank.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionBlock {
    /// Position of the block within its category (`rows / 5`).
    pub index: usize,
    /// The question text.
    pub prompt: String,
    /// Usable responses in bank order. Normally four.
    pub responses: Vec<String>,
}

impl QuestionBlock {
    /// Returns `true` if all four responses are present.
    pub fn is_complete(&self) -> bool {
        self.responses.len() == RESPONSES_PER_QUESTION
    }

    /// File name the randomizer expects for this block: `<category>-<index>`.
    pub fn file_name(&self, category: &str) -> String {
        format!("{category}-{}", self.index)
    }

    /// Render the block in the randomizer's dot-delimited record format.
    ///
    /// Every field, including the last response, is followed by `\n.\n`.
    pub fn to_record(&self) -> String {
        let mut record = String::with_capacity(
            self.prompt.len() + self.responses.iter().map(|r| r.len() + 3).sum::<usize>() + 3,
        );
        record.push_str(&self.prompt);
        record.push_str("\n.\n");
        for response in &self.responses {
            record.push_str(response);
            record.push_str("\n.\n");
        }
        record
    }
}

/// Parsed question bank: categories in sheet order, each with its blocks.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct QuestionBank {
    categories: IndexMap<String, Vec<QuestionBlock>>,
}

impl QuestionBank {
    pub(crate) fn insert(&mut self, category: String, blocks: Vec<QuestionBlock>) {
        self.categories.insert(category, blocks);
    }

    /// Category names in the order they appear in the bank.
    pub fn category_names(&self) -> Vec<String> {
        self.categories.keys().cloned().collect()
    }

    /// Blocks parsed for `category`, if the category exists.
    pub fn blocks(&self, category: &str) -> Option<&[QuestionBlock]> {
        self.categories.get(category).map(Vec::as_slice)
    }

    /// Iterate `(category, blocks)` pairs in bank order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[QuestionBlock])> {
        self.categories
            .iter()
            .map(|(name, blocks)| (name.as_str(), blocks.as_slice()))
    }

    /// Number of categories.
    pub fn len(&self) -> usize {
        self.categories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }

    /// Total number of blocks across all categories.
    pub fn block_count(&self) -> usize {
        self.categories.values().map(Vec::len).sum()
    }
}

/// Parameters handed to the randomizer for one generation run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VariantSpec {
    seed: i64,
    serial_start: i64,
    usage_per_category: u32,
    variant_count: u32,
    categories: Vec<String>,
}

impl VariantSpec {
    /// Build a spec, rejecting zero usage or zero variants.
    pub fn new(
        seed: i64,
        serial_start: i64,
        usage_per_category: u32,
        variant_count: u32,
        categories: Vec<String>,
    ) -> Result<Self, MucherError> {
        if usage_per_category == 0 {
            return Err(MucherError::InvalidSetting {
                field: "usage_per_category",
                message: "must be at least 1".into(),
            });
        }
        if variant_count == 0 {
            return Err(MucherError::InvalidSetting {
                field: "num_tests",
                message: "must be at least 1".into(),
            });
        }
        Ok(Self {
            seed,
            serial_start,
            usage_per_category,
            variant_count,
            categories,
        })
    }

    pub fn seed(&self) -> i64 {
        self.seed
    }

    pub fn serial_start(&self) -> i64 {
        self.serial_start
    }

    pub fn usage_per_category(&self) -> u32 {
        self.usage_per_category
    }

    pub fn variant_count(&self) -> u32 {
        self.variant_count
    }

    pub fn categories(&self) -> &[String] {
        &self.categories
    }
}

/// Points awarded per answer outcome. Values may be negative.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GradingPolicy {
    pub points_correct: i64,
    pub points_missing: i64,
    pub points_incorrect: i64,
}

impl GradingPolicy {
    /// Points for a single answer outcome.
    pub fn points_for(&self, outcome: Outcome) -> i64 {
        match outcome {
            Outcome::Correct => self.points_correct,
            Outcome::Missing => self.points_missing,
            Outcome::Incorrect => self.points_incorrect,
        }
    }
}

impl Default for GradingPolicy {
    fn default() -> Self {
        Self {
            points_correct: 4,
            points_missing: 1,
            points_incorrect: 0,
        }
    }
}

/// One student's answer sheet, decoded from a results row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResponseRecord {
    pub student_id: String,
    /// Question labels as generated by the randomizer (`<category><suffix>`).
    pub category_labels: Vec<String>,
    /// One character per question.
    pub correct_answers: String,
    /// One character per question, `-` when unanswered.
    pub given_answers: String,
}

/// How a single answer compares to the key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    Correct,
    Missing,
    Incorrect,
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Correct => write!(f, "correct"),
            Outcome::Missing => write!(f, "missing"),
            Outcome::Incorrect => write!(f, "incorrect"),
        }
    }
}

/// Correct / missing / incorrect counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnswerCounts {
    pub correct: u32,
    pub missing: u32,
    pub incorrect: u32,
}

impl AnswerCounts {
    pub fn record(&mut self, outcome: Outcome) {
        match outcome {
            Outcome::Correct => self.correct += 1,
            Outcome::Missing => self.missing += 1,
            Outcome::Incorrect => self.incorrect += 1,
        }
    }

    pub fn merge(&mut self, other: &AnswerCounts) {
        self.correct += other.correct;
        self.missing += other.missing;
        self.incorrect += other.incorrect;
    }

    pub fn total(&self) -> u32 {
        self.correct + self.missing + self.incorrect
    }

    /// Score implied by these counts under `policy`.
    pub fn points(&self, policy: &GradingPolicy) -> i64 {
        policy.points_correct * i64::from(self.correct)
            + policy.points_missing * i64::from(self.missing)
            + policy.points_incorrect * i64::from(self.incorrect)
    }
}

/// Per-category answer counts for one grading run.
///
/// Categories keep first-seen order. [`merge`](Self::merge) only adds counts,
/// so merging per-student tallies in any order yields the same counts.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CategoryTally {
    categories: IndexMap<String, AnswerCounts>,
}

impl CategoryTally {
    pub fn new() -> Self {
        Self::default()
    }

    /// Count one answer for `category`, creating the category if needed.
    pub fn record(&mut self, category: &str, outcome: Outcome) {
        self.categories
            .entry(category.to_string())
            .or_default()
            .record(outcome);
    }

    /// Fold another tally into this one.
    pub fn merge(&mut self, other: &CategoryTally) {
        for (category, counts) in &other.categories {
            self.categories
                .entry(category.clone())
                .or_default()
                .merge(counts);
        }
    }

    pub fn get(&self, category: &str) -> Option<&AnswerCounts> {
        self.categories.get(category)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &AnswerCounts)> {
        self.categories.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.categories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }

    /// Sum of all counters across categories.
    pub fn total(&self) -> AnswerCounts {
        let mut total = AnswerCounts::default();
        for counts in self.categories.values() {
            total.merge(counts);
        }
        total
    }
}
