//! Quick grade example: minimal programmatic usage of mucher-core.
//!
//! Parses an in-memory question bank, prints the randomizer description for
//! it, then grades a small results table and prints the category series.
//! No external tools or files are needed.
//!
//! ```bash
//! cargo run -p mucher-core --example quick_grade
//! ```

use std::path::Path;

use mucher_core::bank::parse_bank;
use mucher_core::description::build_description;
use mucher_core::diagnostics::CollectingSink;
use mucher_core::model::{GradingPolicy, VariantSpec};
use mucher_core::report::GradeReport;
use mucher_core::results::ResultsSchema;
use mucher_core::scoring::grade_table;
use mucher_core::workbook::{Cell, Sheet, Table};

fn sheet(name: &str, cells: &[&str]) -> Sheet {
    Sheet::single_column(name, cells.iter().map(|c| Cell::from(*c)).collect())
}

fn results_row(labels: &[&str], correct: &str, given: &str, student: &str) -> Vec<Cell> {
    let mut row = vec![Cell::Number(1.0), Cell::Number(10.0), "A".into()];
    row.extend(labels.iter().map(|l| Cell::from(*l)));
    row.extend([Cell::from(correct), Cell::from(given), Cell::from(student)]);
    row
}

fn main() -> anyhow::Result<()> {
    let sink = CollectingSink::new();

    // One category per sheet, five rows per question
    let sheets = vec![
        sheet(
            "Zoology",
            &["Which animal is a mammal?", "Whale", "Shark", "Trout", "Eel"],
        ),
        sheet(
            "Anatomy",
            &["Largest bone?", "Femur", "Tibia", "Ulna", "Radius", "dangling row"],
        ),
    ];
    let bank = parse_bank(&sheets, &sink)?;
    println!(
        "Parsed {} categories, {} blocks",
        bank.len(),
        bank.block_count()
    );

    let spec = VariantSpec::new(42, 10, 1, 5, bank.category_names())?;
    println!("\nRandomizer description:\n{}", build_description(&spec));

    let table = Table {
        header: vec![],
        rows: vec![
            results_row(&["Zoology00", "Anatomy00"], "AA", "AA", "rossi"),
            results_row(&["Anatomy00", "Zoology00"], "AA", "-B", "bianchi"),
        ],
    };
    let schema = ResultsSchema::default();
    let policy = GradingPolicy::default();
    let outcome = grade_table(&table, &schema, &policy, &sink);

    let ids = table.rows.iter().map(|row| schema.student_id(row)).collect();
    let report = GradeReport::new(Path::new("in-memory"), policy, &outcome, ids, 0);

    println!("Scores:");
    for student in &report.students {
        match student.score {
            Some(score) => println!("  {}: {score}", student.student_id),
            None => println!("  {}: unscored", student.student_id),
        }
    }

    println!("\nCategories:");
    for (i, category) in report.series.categories.iter().enumerate() {
        if let Some(counts) = report.series.counts(i) {
            println!(
                "  {category}: {} correct, {} missing, {} incorrect",
                counts.correct, counts.missing, counts.incorrect
            );
        }
    }

    for diagnostic in sink.diagnostics() {
        println!("warning: {diagnostic}");
    }
    Ok(())
}
