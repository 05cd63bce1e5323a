//! Adapter for the `pdflatex` document compiler.

use std::path::Path;
use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;

use mucher_core::error::MucherError;
use mucher_core::traits::{CompiledDocument, DocumentCompiler};

use crate::process::run_tool;

/// Runs `pdflatex` in non-interactive mode.
pub struct PdfLatex {
    program: String,
    timeout: Option<Duration>,
}

impl PdfLatex {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            timeout: None,
        }
    }

    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }
}

impl Default for PdfLatex {
    fn default() -> Self {
        Self::new("pdflatex")
    }
}

#[async_trait]
impl DocumentCompiler for PdfLatex {
    fn name(&self) -> &str {
        &self.program
    }

    async fn compile(&self, work_area: &Path, template_file: &str) -> Result<CompiledDocument> {
        let output = run_tool(
            &self.program,
            &["-interaction=nonstopmode", template_file],
            None,
            work_area,
            self.timeout,
        )
        .await?;

        // pdflatex exits non-zero on recoverable errors while still writing
        // the document; only the document counts.
        let pdf = work_area.join(template_file).with_extension("pdf");
        if !pdf.is_file() {
            return Err(MucherError::MissingArtifact {
                tool: self.program.clone(),
                artifact: pdf
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_default(),
                output: output.combined(),
            }
            .into());
        }
        if !output.status.success() {
            tracing::warn!(
                "{} exited with {} but produced {}",
                self.program,
                output.status,
                pdf.display()
            );
        }

        Ok(CompiledDocument {
            pdf,
            log: output.combined(),
        })
    }
}
