pub mod create;
pub mod grade;
pub mod init;
pub mod validate;

use clap::Args;

use mucher_core::config::ExamConfig;

/// Scoring overrides shared by `create` (for the template legend) and `grade`.
#[derive(Args, Debug, Default)]
pub struct PointsArgs {
    /// Points for a correct answer
    #[arg(long, allow_negative_numbers = true)]
    pub points_correct: Option<i64>,

    /// Points for an unanswered question
    #[arg(long, allow_negative_numbers = true)]
    pub points_missing: Option<i64>,

    /// Points for a wrong answer
    #[arg(long, allow_negative_numbers = true)]
    pub points_incorrect: Option<i64>,
}

impl PointsArgs {
    pub fn apply(&self, config: &mut ExamConfig) {
        if let Some(p) = self.points_correct {
            config.points_correct = p;
        }
        if let Some(p) = self.points_missing {
            config.points_missing = p;
        }
        if let Some(p) = self.points_incorrect {
            config.points_incorrect = p;
        }
    }
}
