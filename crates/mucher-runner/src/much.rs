//! Adapter for the `much` randomizer.

use std::path::Path;
use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;

use mucher_core::error::MucherError;
use mucher_core::traits::{RandomizerArtifacts, Randomizer};

use crate::process::run_tool;

/// Generated LaTeX body.
pub const CONTENT_FILE: &str = "mc-output.tex";
/// Serial listing, one row per variant.
pub const SERIALS_FILE: &str = "mc-serials.txt";

/// Runs `much` as a child process.
///
/// `much` is interactive: it asks for a command (`c` to create) and then
/// for the description file name, both answered on stdin.
pub struct MuchRandomizer {
    program: String,
    timeout: Option<Duration>,
}

impl MuchRandomizer {
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

impl Default for MuchRandomizer {
    fn default() -> Self {
        Self::new("much")
    }
}

#[async_trait]
impl Randomizer for MuchRandomizer {
    fn name(&self) -> &str {
        &self.program
    }

    async fn run(&self, work_area: &Path, description_file: &str) -> Result<RandomizerArtifacts> {
        let answers = format!("c\n{description_file}\n");
        let output = run_tool(
            &self.program,
            &[],
            Some(answers.as_bytes()),
            work_area,
            self.timeout,
        )
        .await?;

        if !output.status.success() {
            return Err(MucherError::ToolFailed {
                tool: self.program.clone(),
                status: output.status.to_string(),
                output: output.combined(),
            }
            .into());
        }

        for artifact in [CONTENT_FILE, SERIALS_FILE] {
            if !work_area.join(artifact).is_file() {
                return Err(MucherError::MissingArtifact {
                    tool: self.program.clone(),
                    artifact: artifact.to_string(),
                    output: output.combined(),
                }
                .into());
            }
        }

        Ok(RandomizerArtifacts {
            content: work_area.join(CONTENT_FILE),
            serials: work_area.join(SERIALS_FILE),
            log: output.combined(),
        })
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use std::os::unix::fs::PermissionsExt;

    fn script(dir: &Path, body: &str) -> String {
        let path = dir.join("fake-much");
        std::fs::write(&path, format!("#!/bin/sh\n{body}\n")).unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
        path.to_string_lossy().into_owned()
    }

    #[tokio::test]
    async fn reads_description_name_from_stdin() {
        let bin = tempfile::tempdir().unwrap();
        let work = tempfile::tempdir().unwrap();
        let program = script(
            bin.path(),
            r#"read cmd; read file
[ "$cmd" = "c" ] || exit 3
cp "$file" mc-output.tex
printf 'header\n1 10 A\n' > mc-serials.txt"#,
        );
        std::fs::write(work.path().join("description"), "create 1;\n").unwrap();

        let artifacts = MuchRandomizer::new(program)
            .run(work.path(), "description")
            .await
            .unwrap();
        assert_eq!(
            std::fs::read_to_string(&artifacts.content).unwrap(),
            "create 1;\n"
        );
        assert!(artifacts.serials.ends_with(SERIALS_FILE));
    }

    #[tokio::test]
    async fn nonzero_exit_surfaces_stderr() {
        let bin = tempfile::tempdir().unwrap();
        let work = tempfile::tempdir().unwrap();
        let program = script(bin.path(), "echo 'bad description' >&2; exit 2");

        let err = MuchRandomizer::new(program)
            .run(work.path(), "description")
            .await
            .unwrap_err();
        match err.downcast_ref::<MucherError>() {
            Some(MucherError::ToolFailed { output, .. }) => {
                assert!(output.contains("bad description"))
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn missing_serials_is_fatal() {
        let bin = tempfile::tempdir().unwrap();
        let work = tempfile::tempdir().unwrap();
        let program = script(bin.path(), "touch mc-output.tex");

        let err = MuchRandomizer::new(program)
            .run(work.path(), "description")
            .await
            .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<MucherError>(),
            Some(MucherError::MissingArtifact { artifact, .. }) if artifact == SERIALS_FILE
        ));
    }

    #[tokio::test]
    async fn missing_binary_is_tool_not_found() {
        let work = tempfile::tempdir().unwrap();
        let err = MuchRandomizer::new("/nonexistent/much")
            .run(work.path(), "description")
            .await
            .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<MucherError>(),
            Some(MucherError::ToolNotFound { .. })
        ));
    }
}
