//! Exam configuration.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::error::MucherError;
use crate::model::{GradingPolicy, VariantSpec};

/// File searched in the current directory when no `--config` is given.
pub const DEFAULT_CONFIG_FILE: &str = "mucher.toml";

/// Settings for both the generation and the grading run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExamConfig {
    /// Question bank workbook.
    #[serde(default = "default_question_file")]
    pub question_file: PathBuf,
    /// Number of variants to generate.
    #[serde(default = "default_num_tests")]
    pub num_tests: u32,
    /// Serial number of the first variant.
    #[serde(default = "default_serial_start")]
    pub serial_start: i64,
    /// Questions drawn from each category per variant.
    #[serde(default = "default_usage")]
    pub usage_per_category: u32,
    #[serde(default = "default_seed")]
    pub seed: i64,
    #[serde(default = "default_points_correct")]
    pub points_correct: i64,
    #[serde(default = "default_points_missing")]
    pub points_missing: i64,
    #[serde(default)]
    pub points_incorrect: i64,
    /// Results workbook, written at generation time and read back for grading.
    #[serde(default = "default_results_file")]
    pub results_file: PathBuf,
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
    /// Remove the working area once a generation run ends.
    #[serde(default = "default_cleanup")]
    pub cleanup_temp: bool,
    /// Custom LaTeX template; the built-in one is used when unset.
    #[serde(default)]
    pub template_file: Option<PathBuf>,
    /// Directory whose images are copied next to the template.
    #[serde(default)]
    pub assets_dir: Option<PathBuf>,
    #[serde(default = "default_randomizer")]
    pub randomizer_program: String,
    #[serde(default = "default_compiler")]
    pub compiler_program: String,
    /// Per-tool timeout; tools may run indefinitely when unset.
    #[serde(default)]
    pub tool_timeout_secs: Option<u64>,
}

fn default_question_file() -> PathBuf {
    PathBuf::from("questionario.xlsx")
}
fn default_num_tests() -> u32 {
    30
}
fn default_serial_start() -> i64 {
    10
}
fn default_usage() -> u32 {
    1
}
fn default_seed() -> i64 {
    42
}
fn default_points_correct() -> i64 {
    4
}
fn default_points_missing() -> i64 {
    1
}
fn default_results_file() -> PathBuf {
    PathBuf::from("elaborati.xlsx")
}
fn default_output_dir() -> PathBuf {
    PathBuf::from(".")
}
fn default_cleanup() -> bool {
    true
}
fn default_randomizer() -> String {
    "much".to_string()
}
fn default_compiler() -> String {
    "pdflatex".to_string()
}

impl Default for ExamConfig {
    fn default() -> Self {
        Self {
            question_file: default_question_file(),
            num_tests: default_num_tests(),
            serial_start: default_serial_start(),
            usage_per_category: default_usage(),
            seed: default_seed(),
            points_correct: default_points_correct(),
            points_missing: default_points_missing(),
            points_incorrect: 0,
            results_file: default_results_file(),
            output_dir: default_output_dir(),
            cleanup_temp: default_cleanup(),
            template_file: None,
            assets_dir: None,
            randomizer_program: default_randomizer(),
            compiler_program: default_compiler(),
            tool_timeout_secs: None,
        }
    }
}

impl ExamConfig {
    /// Variant parameters for the given categories.
    pub fn variant_spec(&self, categories: Vec<String>) -> Result<VariantSpec, MucherError> {
        VariantSpec::new(
            self.seed,
            self.serial_start,
            self.usage_per_category,
            self.num_tests,
            categories,
        )
    }

    pub fn grading_policy(&self) -> GradingPolicy {
        GradingPolicy {
            points_correct: self.points_correct,
            points_missing: self.points_missing,
            points_incorrect: self.points_incorrect,
        }
    }

    /// Where the results skeleton lands after generation.
    pub fn results_output_path(&self) -> PathBuf {
        match self.results_file.file_name() {
            Some(name) => self.output_dir.join(name),
            None => self.output_dir.join(default_results_file()),
        }
    }

    /// Where the graded copy of `results` is written.
    pub fn graded_output_path(&self, results: &Path) -> PathBuf {
        let stem = results
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "results".to_string());
        self.output_dir.join(format!("{stem}_graded.xlsx"))
    }

    /// Write the configuration as TOML.
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self).context("failed to serialize config")?;
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        std::fs::write(path, content)
            .with_context(|| format!("failed to write config: {}", path.display()))?;
        Ok(())
    }
}

/// Load configuration from `./mucher.toml`, or defaults when it is absent.
pub fn load_config() -> Result<ExamConfig> {
    load_config_from(None)
}

/// Load config from an explicit path, or search the default location.
pub fn load_config_from(path: Option<&Path>) -> Result<ExamConfig> {
    let config_path = match path {
        Some(p) if p.exists() => Some(p.to_path_buf()),
        Some(p) => anyhow::bail!("config file not found: {}", p.display()),
        None => {
            let local = PathBuf::from(DEFAULT_CONFIG_FILE);
            local.exists().then_some(local)
        }
    };

    match config_path {
        Some(path) => {
            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("failed to read config: {}", path.display()))?;
            let config = toml::from_str::<ExamConfig>(&content)
                .with_context(|| format!("failed to parse config: {}", path.display()))?;
            tracing::debug!("loaded config from {}", path.display());
            Ok(config)
        }
        None => Ok(ExamConfig::default()),
    }
}
