//! Spreadsheet input and output.
//!
//! Workbooks are read with `calamine` (xlsx, xls, ods) and written with
//! `rust_xlsxwriter`. Everything past this module sees only [`Cell`]s.

use std::path::Path;

use anyhow::{Context, Result};
use calamine::{open_workbook_auto, Data, Reader};
use serde::{Deserialize, Serialize};

use crate::error::{ensure_input_file, MucherError};

/// A single spreadsheet value.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Cell {
    #[default]
    Empty,
    Text(String),
    Number(f64),
    Bool(bool),
}

impl Cell {
    /// The raw string, only if the cell holds text.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Cell::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Trimmed textual rendering, or `None` for blank cells.
    ///
    /// Integral numbers render without a fractional part (`12`, not `12.0`).
    pub fn to_trimmed_string(&self) -> Option<String> {
        let text = match self {
            Cell::Empty => return None,
            Cell::Text(s) => s.trim().to_string(),
            Cell::Number(n) => format_number(*n),
            Cell::Bool(b) => if *b { "TRUE" } else { "FALSE" }.to_string(),
        };
        if text.is_empty() {
            None
        } else {
            Some(text)
        }
    }

    /// Parse a whitespace-delimited token: integers and floats become numbers.
    pub fn from_token(token: &str) -> Cell {
        if let Ok(n) = token.parse::<i64>() {
            Cell::Number(n as f64)
        } else if let Ok(n) = token.parse::<f64>() {
            Cell::Number(n)
        } else {
            Cell::Text(token.to_string())
        }
    }
}

fn format_number(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        n.to_string()
    }
}

impl From<Data> for Cell {
    fn from(value: Data) -> Self {
        match value {
            Data::Empty | Data::Error(_) => Cell::Empty,
            Data::String(s) => Cell::Text(s),
            Data::Int(i) => Cell::Number(i as f64),
            Data::Float(f) => Cell::Number(f),
            Data::Bool(b) => Cell::Bool(b),
            other => Cell::Text(other.to_string()),
        }
    }
}

impl From<&str> for Cell {
    fn from(value: &str) -> Self {
        Cell::Text(value.to_string())
    }
}

/// A named sheet and its rows.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Sheet {
    pub name: String,
    pub rows: Vec<Vec<Cell>>,
}

impl Sheet {
    pub fn new(name: impl Into<String>, rows: Vec<Vec<Cell>>) -> Self {
        Self {
            name: name.into(),
            rows,
        }
    }

    /// Build a single-column sheet, one cell per row.
    pub fn single_column(name: impl Into<String>, cells: Vec<Cell>) -> Self {
        Self::new(name, cells.into_iter().map(|c| vec![c]).collect())
    }
}

/// A table whose first row is a header.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Table {
    pub header: Vec<Cell>,
    pub rows: Vec<Vec<Cell>>,
}

impl Table {
    /// Number of columns, taken from the widest of header and rows.
    pub fn width(&self) -> usize {
        self.rows
            .iter()
            .map(Vec::len)
            .chain(std::iter::once(self.header.len()))
            .max()
            .unwrap_or(0)
    }
}

fn unreadable(path: &Path, err: impl std::fmt::Display) -> MucherError {
    MucherError::UnreadableWorkbook {
        path: path.to_path_buf(),
        message: err.to_string(),
    }
}

/// Read every sheet of a workbook, in workbook order.
pub fn read_sheets(path: &Path) -> Result<Vec<Sheet>> {
    ensure_input_file(path)?;
    let mut workbook = open_workbook_auto(path).map_err(|e| unreadable(path, e))?;

    let mut sheets = Vec::new();
    for name in workbook.sheet_names() {
        let range = workbook
            .worksheet_range(&name)
            .map_err(|e| unreadable(path, format!("sheet '{name}': {e}")))?;
        // Ranges start at the first used cell; pad back to A1 so row and
        // column positions match the sheet.
        let (skip_rows, skip_cols) = range
            .start()
            .map(|(r, c)| (r as usize, c as usize))
            .unwrap_or((0, 0));
        let mut rows: Vec<Vec<Cell>> = vec![Vec::new(); skip_rows];
        rows.extend(range.rows().map(|row| {
            std::iter::repeat(Cell::Empty)
                .take(skip_cols)
                .chain(row.iter().cloned().map(Cell::from))
                .collect()
        }));
        sheets.push(Sheet::new(name, rows));
    }

    tracing::debug!("read {} sheet(s) from {}", sheets.len(), path.display());
    Ok(sheets)
}

/// Read the first sheet of a workbook as a header plus data rows.
pub fn read_table(path: &Path) -> Result<Table> {
    let sheets = read_sheets(path)?;
    let Some(first) = sheets.into_iter().next() else {
        return Err(MucherError::EmptyResults {
            path: path.to_path_buf(),
        }
        .into());
    };

    let mut rows = first.rows.into_iter();
    let header = rows.next().unwrap_or_default();
    Ok(Table {
        header,
        rows: rows.collect(),
    })
}

/// Write a table to a new `.xlsx` file, header first.
pub fn write_table(path: &Path, table: &Table) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }

    let mut workbook = rust_xlsxwriter::Workbook::new();
    let worksheet = workbook.add_worksheet();

    for (r, row) in std::iter::once(&table.header)
        .chain(table.rows.iter())
        .enumerate()
    {
        let r = u32::try_from(r).context("too many rows for a worksheet")?;
        for (c, cell) in row.iter().enumerate() {
            let c = u16::try_from(c).context("too many columns for a worksheet")?;
            match cell {
                Cell::Empty => {}
                Cell::Text(s) => {
                    worksheet.write_string(r, c, s)?;
                }
                Cell::Number(n) => {
                    worksheet.write_number(r, c, *n)?;
                }
                Cell::Bool(b) => {
                    worksheet.write_boolean(r, c, *b)?;
                }
            }
        }
    }

    workbook
        .save(path)
        .with_context(|| format!("failed to write workbook {}", path.display()))?;
    tracing::debug!("wrote {} row(s) to {}", table.rows.len(), path.display());
    Ok(())
}
