//! Error taxonomy for generation and grading runs.
//!
//! Structural data problems (short blocks, malformed result rows) are not
//! errors: they go through the [`DiagnosticSink`](crate::diagnostics::DiagnosticSink)
//! and the affected unit is degraded. Everything here aborts the current run.

use std::path::PathBuf;

use thiserror::Error;

/// Fatal errors for a generation or grading run.
#[derive(Debug, Error)]
pub enum MucherError {
    /// An input file does not exist.
    #[error("input file not found: {}", path.display())]
    InputNotFound { path: PathBuf },

    /// An input path exists but is not a regular file.
    #[error("path is not a file: {}", path.display())]
    NotAFile { path: PathBuf },

    /// A workbook could not be opened or one of its sheets could not be read.
    #[error("cannot read workbook {}: {message}", path.display())]
    UnreadableWorkbook { path: PathBuf, message: String },

    /// The question bank has no usable category.
    #[error("question bank has no categories: {}", path.display())]
    EmptyBank { path: PathBuf },

    /// The results table has no data rows.
    #[error("results file is empty: {}", path.display())]
    EmptyResults { path: PathBuf },

    /// A generation or grading parameter is out of range.
    #[error("invalid setting `{field}`: {message}")]
    InvalidSetting { field: &'static str, message: String },

    /// An external executable could not be started.
    #[error("`{tool}` is not installed or not in PATH")]
    ToolNotFound { tool: String },

    /// An external executable exited unsuccessfully.
    #[error("`{tool}` failed ({status}): {output}")]
    ToolFailed {
        tool: String,
        status: String,
        output: String,
    },

    /// An external executable did not produce an artifact it is expected to produce.
    #[error("`{tool}` did not produce {artifact}: {output}")]
    MissingArtifact {
        tool: String,
        artifact: String,
        output: String,
    },

    /// An external executable ran past its deadline.
    #[error("`{tool}` timed out after {secs}s")]
    ToolTimedOut { tool: String, secs: u64 },
}

impl MucherError {
    /// Returns `true` for problems with the user's inputs or settings.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            MucherError::InputNotFound { .. }
                | MucherError::NotAFile { .. }
                | MucherError::UnreadableWorkbook { .. }
                | MucherError::EmptyBank { .. }
                | MucherError::EmptyResults { .. }
                | MucherError::InvalidSetting { .. }
        )
    }

    /// Returns `true` for failures of the randomizer or the document compiler.
    pub fn is_external_tool(&self) -> bool {
        matches!(
            self,
            MucherError::ToolNotFound { .. }
                | MucherError::ToolFailed { .. }
                | MucherError::MissingArtifact { .. }
                | MucherError::ToolTimedOut { .. }
        )
    }
}

/// Check that `path` names an existing regular file.
pub fn ensure_input_file(path: &std::path::Path) -> Result<(), MucherError> {
    if !path.exists() {
        return Err(MucherError::InputNotFound {
            path: path.to_path_buf(),
        });
    }
    if !path.is_file() {
        return Err(MucherError::NotAFile {
            path: path.to_path_buf(),
        });
    }
    tracing::debug!("validated input file: {}", path.display());
    Ok(())
}
