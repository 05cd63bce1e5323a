//! The `mucher validate` command.

use anyhow::Result;
use comfy_table::{Cell, Table};

use mucher_core::bank::load_bank;
use mucher_core::config::ExamConfig;
use mucher_core::description::build_description;
use mucher_core::diagnostics::CollectingSink;

pub fn execute(config: &ExamConfig) -> Result<()> {
    let sink = CollectingSink::new();
    let bank = load_bank(&config.question_file, &sink)?;
    let spec = config.variant_spec(bank.category_names())?;

    println!(
        "Question bank: {} ({} categories, {} blocks)",
        config.question_file.display(),
        bank.len(),
        bank.block_count()
    );

    let mut table = Table::new();
    table.set_header(vec!["Category", "Blocks", "Incomplete"]);
    let mut short_categories = Vec::new();
    for (category, blocks) in bank.iter() {
        let incomplete = blocks.iter().filter(|b| !b.is_complete()).count();
        table.add_row(vec![
            Cell::new(category),
            Cell::new(blocks.len()),
            Cell::new(incomplete),
        ]);
        if blocks.len() < spec.usage_per_category() as usize {
            short_categories.push((category, blocks.len()));
        }
    }
    println!("{table}");

    let warnings = sink.diagnostics();
    for w in &warnings {
        println!("  WARNING: {w}");
    }
    for (category, count) in &short_categories {
        println!(
            "  WARNING: category '{category}' has {count} block(s), fewer than usage_per_category = {}",
            spec.usage_per_category()
        );
    }

    let total = warnings.len() + short_categories.len();
    if total == 0 {
        println!("Question bank valid.");
    } else {
        println!("\n{total} warning(s) found.");
    }

    tracing::debug!("description:\n{}", build_description(&spec));
    Ok(())
}
