//! The `mucher init` command.

use std::path::Path;

use anyhow::{Context, Result};

use mucher_core::config::DEFAULT_CONFIG_FILE;

pub fn execute(force: bool) -> Result<()> {
    let path = Path::new(DEFAULT_CONFIG_FILE);
    if path.exists() && !force {
        println!("{DEFAULT_CONFIG_FILE} already exists, skipping.");
        return Ok(());
    }

    std::fs::write(path, SAMPLE_CONFIG)
        .with_context(|| format!("failed to write {DEFAULT_CONFIG_FILE}"))?;
    println!("Created {DEFAULT_CONFIG_FILE}");

    println!("\nNext steps:");
    println!("  1. Put one category per sheet in questionario.xlsx (5 rows per question)");
    println!("  2. Run: mucher validate");
    println!("  3. Run: mucher create");
    println!("  4. Fill in the answers in elaborati.xlsx, then run: mucher grade");

    Ok(())
}

pub(crate) const SAMPLE_CONFIG: &str = r#"# mucher configuration

# Question bank: one sheet per category, first column only.
# Each question is 5 rows: the prompt, then its 4 responses.
question_file = "questionario.xlsx"

# Variants to generate and the serial number of the first one.
num_tests = 30
serial_start = 10

# Questions drawn from each category in every variant.
usage_per_category = 1
seed = 42

# Scoring, also printed in the exam header.
points_correct = 4
points_missing = 1
points_incorrect = 0

# Results spreadsheet written by `create` and read by `grade`.
results_file = "elaborati.xlsx"
output_dir = "."

# Set to false to keep the working area for debugging.
cleanup_temp = true

# template_file = "exam.tex"
# assets_dir = "images"

randomizer_program = "much"
compiler_program = "pdflatex"
# tool_timeout_secs = 300
"#;
