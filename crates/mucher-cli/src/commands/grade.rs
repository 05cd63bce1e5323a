//! The `mucher grade` command.

use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::Result;
use clap::Args;

use mucher_core::config::ExamConfig;
use mucher_core::diagnostics::TracingSink;
use mucher_core::error::MucherError;
use mucher_core::report::GradeReport;
use mucher_core::results::ResultsSchema;
use mucher_core::scoring::{grade_table, GradingOutcome};
use mucher_core::workbook::{read_table, write_table, Cell, Table};
use mucher_report::html::write_html_report;

use super::PointsArgs;

/// Header of the column appended to the graded table.
const SCORE_HEADER: &str = "score";

#[derive(Args, Debug)]
pub struct GradeArgs {
    /// Results spreadsheet filled in with the students' answers
    #[arg(long)]
    pub results_file: Option<PathBuf>,

    /// Output directory
    #[arg(long)]
    pub output_dir: Option<PathBuf>,

    /// Report formats: json, html, all, none
    #[arg(long, default_value = "all")]
    pub format: String,

    #[command(flatten)]
    pub points: PointsArgs,
}

impl GradeArgs {
    pub fn apply(&self, config: &mut ExamConfig) {
        if let Some(path) = &self.results_file {
            config.results_file = path.clone();
        }
        if let Some(path) = &self.output_dir {
            config.output_dir = path.clone();
        }
        self.points.apply(config);
    }
}

/// The input table with a score column appended; unscored rows get a blank.
fn graded_table(table: &Table, outcome: &GradingOutcome) -> Table {
    let mut header = table.header.clone();
    header.resize(table.width(), Cell::Empty);
    header.push(Cell::Text(SCORE_HEADER.into()));

    let rows = table
        .rows
        .iter()
        .zip(&outcome.scores)
        .map(|(row, score)| {
            let mut row = row.clone();
            row.resize(table.width(), Cell::Empty);
            row.push(score.map(|s| Cell::Number(s as f64)).unwrap_or_default());
            row
        })
        .collect();

    Table { header, rows }
}

pub fn execute(config: &ExamConfig, format: &str) -> Result<()> {
    let start = Instant::now();
    let results_path = config.results_file.as_path();

    let table = read_table(results_path)?;
    if table.rows.is_empty() {
        return Err(MucherError::EmptyResults {
            path: results_path.to_path_buf(),
        }
        .into());
    }

    let schema = ResultsSchema::default();
    let policy = config.grading_policy();
    let outcome = grade_table(&table, &schema, &policy, &TracingSink);

    let graded_path = config.graded_output_path(results_path);
    write_table(&graded_path, &graded_table(&table, &outcome))?;
    eprintln!("Graded results: {}", graded_path.display());

    let student_ids = table.rows.iter().map(|row| schema.student_id(row)).collect();
    let report = GradeReport::new(
        results_path,
        policy,
        &outcome,
        student_ids,
        start.elapsed().as_millis() as u64,
    );

    print_summary(&report);
    save_reports(&report, config, results_path, format)?;

    Ok(())
}

fn save_reports(
    report: &GradeReport,
    config: &ExamConfig,
    results_path: &Path,
    format: &str,
) -> Result<()> {
    let stem = results_path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "results".to_string());

    let formats: Vec<&str> = match format {
        "all" => vec!["json", "html"],
        "none" => vec![],
        other => other.split(',').map(str::trim).collect(),
    };

    for fmt in &formats {
        match *fmt {
            "json" => {
                let path = config.output_dir.join(format!("{stem}_report.json"));
                report.save_json(&path)?;
                eprintln!("Report saved to: {}", path.display());
            }
            "html" => {
                let path = config.output_dir.join(format!("{stem}_report.html"));
                write_html_report(report, &path)?;
                eprintln!("HTML report: {}", path.display());
            }
            _ => {
                eprintln!("Unknown format: {fmt}");
            }
        }
    }
    Ok(())
}

fn print_summary(report: &GradeReport) {
    use comfy_table::{Cell, Table};

    let mut table = Table::new();
    table.set_header(vec!["Category", "Correct", "Missing", "Incorrect"]);

    for (i, category) in report.series.categories.iter().enumerate() {
        if let Some(counts) = report.series.counts(i) {
            table.add_row(vec![
                Cell::new(category),
                Cell::new(counts.correct),
                Cell::new(counts.missing),
                Cell::new(counts.incorrect),
            ]);
        }
    }

    println!("{table}");
    println!(
        "{} row(s) graded, {} unscored.",
        report.graded_rows, report.unscored_rows
    );
}
