//! Moving a finished run's outputs out of the working area.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use mucher_core::config::ExamConfig;
use mucher_core::traits::{CompiledDocument, RandomizerArtifacts};
use mucher_core::workbook::{write_table, Cell, Table};

/// Files a generation run leaves in the output directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollectedArtifacts {
    pub pdf: PathBuf,
    pub tex: PathBuf,
    /// Results skeleton built from the serial listing.
    pub results: PathBuf,
    /// Number of variants listed in the serials file.
    pub variants: usize,
}

/// Parse the randomizer's serial listing.
///
/// The first line is a header and is skipped; every other non-blank line is
/// one variant, fields separated by whitespace. The header row of the table
/// is the positional column index.
pub fn serials_to_table(listing: &str) -> Table {
    let rows: Vec<Vec<Cell>> = listing
        .lines()
        .skip(1)
        .filter(|line| !line.trim().is_empty())
        .map(|line| line.split_whitespace().map(Cell::from_token).collect())
        .collect();

    let width = rows.iter().map(Vec::len).max().unwrap_or(0);
    let header = (0..width).map(|i| Cell::Number(i as f64)).collect();
    Table { header, rows }
}

fn copy_out(source: &Path, output_dir: &Path) -> Result<PathBuf> {
    let name = source
        .file_name()
        .with_context(|| format!("{} has no file name", source.display()))?;
    let target = output_dir.join(name);
    std::fs::copy(source, &target).with_context(|| {
        format!(
            "failed to copy {} to {}",
            source.display(),
            target.display()
        )
    })?;
    tracing::info!("created {}", target.display());
    Ok(target)
}

/// Copy the document and its source to `output_dir` and write the results
/// skeleton.
pub fn collect_artifacts(
    config: &ExamConfig,
    template: &Path,
    generated: &RandomizerArtifacts,
    document: &CompiledDocument,
) -> Result<CollectedArtifacts> {
    std::fs::create_dir_all(&config.output_dir).with_context(|| {
        format!(
            "failed to create output directory {}",
            config.output_dir.display()
        )
    })?;

    let pdf = copy_out(&document.pdf, &config.output_dir)?;
    let tex = copy_out(template, &config.output_dir)?;

    let listing = std::fs::read_to_string(&generated.serials)
        .with_context(|| format!("failed to read {}", generated.serials.display()))?;
    let table = serials_to_table(&listing);
    let results = config.results_output_path();
    write_table(&results, &table)?;
    tracing::info!(
        "created {} ({} variants)",
        results.display(),
        table.rows.len()
    );

    Ok(CollectedArtifacts {
        pdf,
        tex,
        results,
        variants: table.rows.len(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serials_skip_header_and_type_cells() {
        let table = serials_to_table(
            "Serial Form Q1 Q2\n10 A Zoology01 Anatomy00\n11 B Anatomy01 Zoology00\n\n",
        );
        assert_eq!(table.rows.len(), 2);
        assert_eq!(
            table.header,
            vec![
                Cell::Number(0.0),
                Cell::Number(1.0),
                Cell::Number(2.0),
                Cell::Number(3.0),
            ]
        );
        assert_eq!(table.rows[0][0], Cell::Number(10.0));
        assert_eq!(table.rows[1][2], Cell::from("Anatomy01"));
    }

    #[test]
    fn header_only_listing_is_empty() {
        let table = serials_to_table("Serial\n");
        assert!(table.rows.is_empty());
        assert!(table.header.is_empty());
    }
}
