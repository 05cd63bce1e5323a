//! The `mucher create` command.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use clap::Args;

use mucher_core::config::ExamConfig;
use mucher_runner::{GenerationPipeline, PipelineStage, StageObserver};

use super::PointsArgs;

#[derive(Args, Debug)]
pub struct CreateArgs {
    /// Question bank workbook
    #[arg(long)]
    pub question_file: Option<PathBuf>,

    /// Number of variants to generate
    #[arg(long)]
    pub num_tests: Option<u32>,

    /// Serial number of the first variant
    #[arg(long, allow_negative_numbers = true)]
    pub serial_start: Option<i64>,

    /// Questions drawn from each category per variant
    #[arg(long)]
    pub usage: Option<u32>,

    /// Randomizer seed
    #[arg(long, allow_negative_numbers = true)]
    pub seed: Option<i64>,

    /// Results spreadsheet to create
    #[arg(long)]
    pub results_file: Option<PathBuf>,

    /// Output directory
    #[arg(long)]
    pub output_dir: Option<PathBuf>,

    /// Custom LaTeX template
    #[arg(long)]
    pub template: Option<PathBuf>,

    /// Directory of images to copy next to the template
    #[arg(long)]
    pub assets_dir: Option<PathBuf>,

    /// Keep the working area after the run
    #[arg(long)]
    pub keep_temp: bool,

    #[command(flatten)]
    pub points: PointsArgs,
}

impl CreateArgs {
    pub fn apply(&self, config: &mut ExamConfig) {
        if let Some(path) = &self.question_file {
            config.question_file = path.clone();
        }
        if let Some(n) = self.num_tests {
            config.num_tests = n;
        }
        if let Some(n) = self.serial_start {
            config.serial_start = n;
        }
        if let Some(n) = self.usage {
            config.usage_per_category = n;
        }
        if let Some(n) = self.seed {
            config.seed = n;
        }
        if let Some(path) = &self.results_file {
            config.results_file = path.clone();
        }
        if let Some(path) = &self.output_dir {
            config.output_dir = path.clone();
        }
        if let Some(path) = &self.template {
            config.template_file = Some(path.clone());
        }
        if let Some(path) = &self.assets_dir {
            config.assets_dir = Some(path.clone());
        }
        if self.keep_temp {
            config.cleanup_temp = false;
        }
        self.points.apply(config);
    }
}

/// Console progress reporter.
struct ConsoleObserver;

impl StageObserver for ConsoleObserver {
    fn stage_completed(&self, stage: PipelineStage) {
        if !matches!(stage, PipelineStage::Init | PipelineStage::Done) {
            eprintln!("  done: {stage}");
        }
    }
}

pub async fn execute(config: &ExamConfig) -> Result<()> {
    eprintln!(
        "mucher v{}: {} variant(s) from {}",
        env!("CARGO_PKG_VERSION"),
        config.num_tests,
        config.question_file.display()
    );

    let pipeline = GenerationPipeline::from_config(config).with_observer(Arc::new(ConsoleObserver));
    let summary = pipeline.run(config).await?;

    println!(
        "\nCreated {} variant(s) from {} categories ({} question blocks{}).",
        summary.artifacts.variants,
        summary.categories.len(),
        summary.blocks_written,
        if summary.incomplete_blocks > 0 {
            format!(", {} incomplete", summary.incomplete_blocks)
        } else {
            String::new()
        }
    );
    println!("Exam:    {}", summary.artifacts.pdf.display());
    println!("Source:  {}", summary.artifacts.tex.display());
    println!("Results: {}", summary.artifacts.results.display());
    if let Some(dir) = &summary.retained_work_area {
        println!("Working area kept at {}", dir.display());
    }

    Ok(())
}
