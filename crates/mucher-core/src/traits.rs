//! Interfaces to the external tools the generation pipeline drives.
//!
//! Implemented by `mucher-runner` for the real `much` and `pdflatex`
//! executables, and by fakes in tests.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Files the randomizer leaves in the working area.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RandomizerArtifacts {
    /// Generated LaTeX body included by the exam template.
    pub content: PathBuf,
    /// Serial listing: one header line, then one row per variant.
    pub serials: PathBuf,
    /// Captured stdout/stderr of the run.
    #[serde(default)]
    pub log: String,
}

/// The compiled exam document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompiledDocument {
    pub pdf: PathBuf,
    #[serde(default)]
    pub log: String,
}

/// Produces randomized variants from block files and a description script.
#[async_trait]
pub trait Randomizer: Send + Sync {
    /// Tool name for messages (e.g. "much").
    fn name(&self) -> &str;

    /// Run inside `work_area`, reading the script named `description_file`.
    async fn run(
        &self,
        work_area: &Path,
        description_file: &str,
    ) -> anyhow::Result<RandomizerArtifacts>;
}

/// Compiles the exam template into a printable document.
#[async_trait]
pub trait DocumentCompiler: Send + Sync {
    fn name(&self) -> &str;

    /// Compile `template_file` inside `work_area`.
    async fn compile(
        &self,
        work_area: &Path,
        template_file: &str,
    ) -> anyhow::Result<CompiledDocument>;
}
