//! Question-bank parser.
//!
//! Each sheet is one category. Its first column is read in chunks of five
//! rows: a prompt followed by four responses.

use std::path::Path;

use anyhow::Result;

use crate::diagnostics::{Diagnostic, DiagnosticSink};
use crate::error::MucherError;
use crate::model::{QuestionBank, QuestionBlock, ROWS_PER_BLOCK};
use crate::workbook::{self, Cell, Sheet};

/// Read and parse a bank workbook.
pub fn load_bank(path: &Path, sink: &dyn DiagnosticSink) -> Result<QuestionBank> {
    tracing::info!("parsing questions from {}", path.display());
    let sheets = workbook::read_sheets(path)?;
    let bank = parse_bank(&sheets, sink).map_err(|err| match err {
        MucherError::EmptyBank { .. } => MucherError::EmptyBank {
            path: path.to_path_buf(),
        },
        other => other,
    })?;
    tracing::info!(
        "parsed {} question categories ({} blocks)",
        bank.len(),
        bank.block_count()
    );
    Ok(bank)
}

/// Parse in-memory sheets into a [`QuestionBank`].
///
/// Sheets without rows are skipped. Fails with [`MucherError::EmptyBank`]
/// when no sheet yields a block.
pub fn parse_bank(
    sheets: &[Sheet],
    sink: &dyn DiagnosticSink,
) -> Result<QuestionBank, MucherError> {
    let mut bank = QuestionBank::default();

    for sheet in sheets {
        if sheet.rows.is_empty() {
            sink.report(Diagnostic::EmptyCategory {
                category: sheet.name.clone(),
            });
            continue;
        }

        let blocks = parse_category(sheet, sink);
        if blocks.is_empty() {
            continue;
        }
        bank.insert(sheet.name.clone(), blocks);
    }

    if bank.is_empty() {
        return Err(MucherError::EmptyBank {
            path: Default::default(),
        });
    }
    Ok(bank)
}

/// Split one sheet into blocks of five rows.
pub fn parse_category(sheet: &Sheet, sink: &dyn DiagnosticSink) -> Vec<QuestionBlock> {
    let cells: Vec<Option<&Cell>> = sheet.rows.iter().map(|row| row.first()).collect();

    let remainder = cells.len() % ROWS_PER_BLOCK;
    if remainder != 0 {
        sink.report(Diagnostic::RemainderDropped {
            category: sheet.name.clone(),
            rows: cells.len(),
            dropped: remainder,
        });
    }

    cells
        .chunks_exact(ROWS_PER_BLOCK)
        .enumerate()
        .filter_map(|(index, chunk)| {
            let Some(prompt) = chunk[0].and_then(Cell::to_trimmed_string) else {
                sink.report(Diagnostic::MissingPrompt {
                    category: sheet.name.clone(),
                    index,
                });
                return None;
            };

            let responses: Vec<String> = chunk[1..]
                .iter()
                .filter_map(|cell| cell.and_then(Cell::to_trimmed_string))
                .collect();

            let block = QuestionBlock {
                index,
                prompt,
                responses,
            };
            if !block.is_complete() {
                sink.report(Diagnostic::ShortResponses {
                    category: sheet.name.clone(),
                    index,
                    found: block.responses.len(),
                });
            }
            Some(block)
        })
        .collect()
}
