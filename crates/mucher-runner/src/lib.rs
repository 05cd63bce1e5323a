//! mucher-runner: Exam generation pipeline.
//!
//! Writes the template and question blocks into a scoped working area, runs
//! the `much` randomizer and `pdflatex` on them, and collects the resulting
//! document and results skeleton.

pub mod artifacts;
pub mod latex;
pub mod much;
pub mod process;
pub mod template;
pub mod work_area;

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};

use mucher_core::bank::load_bank;
use mucher_core::config::ExamConfig;
use mucher_core::description::{build_description, DESCRIPTION_FILE};
use mucher_core::diagnostics::{Diagnostic, DiagnosticSink, TracingSink};
use mucher_core::model::QuestionBank;
use mucher_core::traits::{DocumentCompiler, Randomizer};

use crate::artifacts::{collect_artifacts, CollectedArtifacts};
use crate::latex::PdfLatex;
use crate::much::MuchRandomizer;
use crate::template::{load_template, TEMPLATE_FILE};
use crate::work_area::WorkArea;

/// Image types copied next to the template.
const IMAGE_EXTENSIONS: [&str; 4] = ["jpg", "jpeg", "png", "gif"];

/// Steps of a generation run, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum PipelineStage {
    Init,
    TemplateWritten,
    QuestionsParsed,
    DescriptionWritten,
    AuxFilesCopied,
    VariantsGenerated,
    DocumentCompiled,
    ArtifactsCollected,
    Done,
}

impl fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PipelineStage::Init => "init",
            PipelineStage::TemplateWritten => "template",
            PipelineStage::QuestionsParsed => "question parsing",
            PipelineStage::DescriptionWritten => "description",
            PipelineStage::AuxFilesCopied => "auxiliary files",
            PipelineStage::VariantsGenerated => "variant generation",
            PipelineStage::DocumentCompiled => "document compilation",
            PipelineStage::ArtifactsCollected => "artifact collection",
            PipelineStage::Done => "done",
        };
        f.write_str(name)
    }
}

/// Notified after each stage completes.
pub trait StageObserver: Send + Sync {
    fn stage_completed(&self, stage: PipelineStage);
}

/// Observer that ignores every notification.
pub struct NoopObserver;

impl StageObserver for NoopObserver {
    fn stage_completed(&self, _stage: PipelineStage) {}
}

/// A generation run that stopped before [`PipelineStage::Done`].
#[derive(Debug)]
pub struct GenerationAborted {
    /// The stage that failed.
    pub stage: PipelineStage,
    pub reason: anyhow::Error,
}

impl GenerationAborted {
    fn at(stage: PipelineStage) -> impl FnOnce(anyhow::Error) -> Self {
        move |reason| Self { stage, reason }
    }
}

impl fmt::Display for GenerationAborted {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "generation aborted during {}", self.stage)
    }
}

impl std::error::Error for GenerationAborted {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(self.reason.as_ref())
    }
}

/// What a successful run produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationSummary {
    /// Categories handed to the randomizer, in bank order.
    pub categories: Vec<String>,
    pub blocks_written: usize,
    /// Blocks written with fewer than four responses.
    pub incomplete_blocks: usize,
    pub artifacts: CollectedArtifacts,
    /// Set when the working area was kept on disk.
    pub retained_work_area: Option<PathBuf>,
}

/// Runs generation with a pluggable randomizer and compiler.
pub struct GenerationPipeline {
    randomizer: Box<dyn Randomizer>,
    compiler: Box<dyn DocumentCompiler>,
    sink: Arc<dyn DiagnosticSink>,
    observer: Arc<dyn StageObserver>,
}

impl GenerationPipeline {
    pub fn new(randomizer: Box<dyn Randomizer>, compiler: Box<dyn DocumentCompiler>) -> Self {
        Self {
            randomizer,
            compiler,
            sink: Arc::new(TracingSink),
            observer: Arc::new(NoopObserver),
        }
    }

    /// Pipeline driving the local `much` and `pdflatex` executables named in `config`.
    pub fn from_config(config: &ExamConfig) -> Self {
        let timeout = config.tool_timeout_secs.map(Duration::from_secs);
        Self::new(
            Box::new(MuchRandomizer::new(&config.randomizer_program).with_timeout(timeout)),
            Box::new(PdfLatex::new(&config.compiler_program).with_timeout(timeout)),
        )
    }

    pub fn with_sink(mut self, sink: Arc<dyn DiagnosticSink>) -> Self {
        self.sink = sink;
        self
    }

    pub fn with_observer(mut self, observer: Arc<dyn StageObserver>) -> Self {
        self.observer = observer;
        self
    }

    /// Run every stage. The working area is released whether or not the run
    /// succeeds, unless `config.cleanup_temp` is off.
    pub async fn run(&self, config: &ExamConfig) -> Result<GenerationSummary, GenerationAborted> {
        let area = WorkArea::acquire(!config.cleanup_temp)
            .map_err(GenerationAborted::at(PipelineStage::Init))?;
        self.observer.stage_completed(PipelineStage::Init);

        let outcome = self.run_in(&area, config).await;
        let retained = area.finish();

        match outcome {
            Ok(mut summary) => {
                summary.retained_work_area = retained;
                self.observer.stage_completed(PipelineStage::Done);
                tracing::info!(
                    "generated {} variant(s) from {} categories",
                    summary.artifacts.variants,
                    summary.categories.len()
                );
                Ok(summary)
            }
            Err(aborted) => {
                tracing::error!("{aborted}: {:#}", aborted.reason);
                Err(aborted)
            }
        }
    }

    async fn run_in(
        &self,
        area: &WorkArea,
        config: &ExamConfig,
    ) -> Result<GenerationSummary, GenerationAborted> {
        use PipelineStage::*;

        let template = load_template(config.template_file.as_deref(), &config.grading_policy())
            .and_then(|text| area.write_file(TEMPLATE_FILE, &text))
            .map_err(GenerationAborted::at(TemplateWritten))?;
        self.completed(TemplateWritten);

        let bank = load_bank(&config.question_file, self.sink.as_ref())
            .map_err(GenerationAborted::at(QuestionsParsed))?;
        let (blocks_written, incomplete_blocks) =
            write_blocks(area, &bank).map_err(GenerationAborted::at(QuestionsParsed))?;
        self.completed(QuestionsParsed);

        let categories = bank.category_names();
        config
            .variant_spec(categories.clone())
            .map_err(anyhow::Error::from)
            .and_then(|spec| area.write_file(DESCRIPTION_FILE, &build_description(&spec)))
            .map_err(GenerationAborted::at(DescriptionWritten))?;
        self.completed(DescriptionWritten);

        // Images live next to the bank unless an assets directory is configured.
        let assets = config.assets_dir.clone().unwrap_or_else(|| {
            match config.question_file.parent() {
                Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
                _ => PathBuf::from("."),
            }
        });
        copy_images(area, &assets, self.sink.as_ref());
        self.completed(AuxFilesCopied);

        tracing::info!("running {}", self.randomizer.name());
        let generated = self
            .randomizer
            .run(area.path(), DESCRIPTION_FILE)
            .await
            .map_err(GenerationAborted::at(VariantsGenerated))?;
        tracing::debug!("{} output:\n{}", self.randomizer.name(), generated.log);
        self.completed(VariantsGenerated);

        tracing::info!("running {}", self.compiler.name());
        let document = self
            .compiler
            .compile(area.path(), TEMPLATE_FILE)
            .await
            .map_err(GenerationAborted::at(DocumentCompiled))?;
        tracing::debug!("{} output:\n{}", self.compiler.name(), document.log);
        self.completed(DocumentCompiled);

        let artifacts = collect_artifacts(config, &template, &generated, &document)
            .map_err(GenerationAborted::at(ArtifactsCollected))?;
        self.completed(ArtifactsCollected);

        Ok(GenerationSummary {
            categories,
            blocks_written,
            incomplete_blocks,
            artifacts,
            retained_work_area: None,
        })
    }

    fn completed(&self, stage: PipelineStage) {
        tracing::debug!("stage completed: {stage}");
        self.observer.stage_completed(stage);
    }
}

/// Write one file per block. Returns (written, incomplete).
fn write_blocks(area: &WorkArea, bank: &QuestionBank) -> Result<(usize, usize)> {
    let mut written = 0;
    let mut incomplete = 0;
    for (category, blocks) in bank.iter() {
        for block in blocks {
            area.write_file(&block.file_name(category), &block.to_record())
                .with_context(|| format!("failed to write block {} of '{category}'", block.index))?;
            written += 1;
            if !block.is_complete() {
                incomplete += 1;
            }
        }
    }
    tracing::info!(
        "wrote {written} question block(s) for {} categories",
        bank.len()
    );
    Ok((written, incomplete))
}

fn is_image(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| {
            IMAGE_EXTENSIONS
                .iter()
                .any(|known| ext.eq_ignore_ascii_case(known))
        })
        .unwrap_or(false)
}

/// Copy the images in `dir` into the area. Failures are reported, not fatal.
fn copy_images(area: &WorkArea, dir: &Path, sink: &dyn DiagnosticSink) {
    let entries = match std::fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) => {
            sink.report(Diagnostic::CopyFailed {
                file: dir.display().to_string(),
                reason: e.to_string(),
            });
            return;
        }
    };

    let mut copied = 0;
    for path in entries.filter_map(|e| e.ok()).map(|e| e.path()) {
        if !path.is_file() || !is_image(&path) {
            continue;
        }
        match area.copy_in(&path) {
            Ok(_) => copied += 1,
            Err(e) => sink.report(Diagnostic::CopyFailed {
                file: path.display().to_string(),
                reason: format!("{e:#}"),
            }),
        }
    }
    tracing::debug!("copied {copied} image(s) from {}", dir.display());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn image_extensions_are_case_insensitive() {
        assert!(is_image(Path::new("figure.PNG")));
        assert!(is_image(Path::new("a/b/photo.jpeg")));
        assert!(!is_image(Path::new("notes.txt")));
        assert!(!is_image(Path::new("png")));
    }

    #[test]
    fn stages_are_ordered() {
        assert!(PipelineStage::Init < PipelineStage::TemplateWritten);
        assert!(PipelineStage::DocumentCompiled < PipelineStage::ArtifactsCollected);
        assert_eq!(
            PipelineStage::VariantsGenerated.to_string(),
            "variant generation"
        );
    }

    #[test]
    fn unreadable_assets_dir_is_a_warning() {
        let area = WorkArea::acquire(false).unwrap();
        let sink = mucher_core::diagnostics::CollectingSink::new();
        copy_images(&area, Path::new("/nonexistent/assets"), &sink);
        assert!(matches!(
            sink.diagnostics()[0],
            Diagnostic::CopyFailed { .. }
        ));
        area.finish();
    }
}
