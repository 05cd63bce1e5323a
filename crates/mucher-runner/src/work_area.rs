//! Scoped working area for a generation run.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tempfile::TempDir;

/// A temporary directory holding the template, block files, description
/// script and tool outputs of one run.
///
/// Release it with [`WorkArea::finish`] on every exit path. An area that is
/// only dropped is still removed, but removal failures go unreported and
/// retention is ignored.
pub struct WorkArea {
    dir: TempDir,
    retain: bool,
}

impl WorkArea {
    /// Create a fresh working area. With `retain` set, [`finish`](Self::finish)
    /// keeps the directory on disk.
    pub fn acquire(retain: bool) -> Result<Self> {
        let dir = tempfile::Builder::new()
            .prefix("mucher-")
            .tempdir()
            .context("failed to create working area")?;
        tracing::debug!("acquired working area {}", dir.path().display());
        Ok(Self { dir, retain })
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn retains(&self) -> bool {
        self.retain
    }

    /// Write `content` to `name` inside the area.
    pub fn write_file(&self, name: &str, content: &str) -> Result<PathBuf> {
        let path = self.dir.path().join(name);
        std::fs::write(&path, content).with_context(|| format!("failed to write {name}"))?;
        tracing::debug!("wrote {}", path.display());
        Ok(path)
    }

    /// Copy `source` into the area under its own file name.
    pub fn copy_in(&self, source: &Path) -> Result<PathBuf> {
        let name = source
            .file_name()
            .with_context(|| format!("{} has no file name", source.display()))?;
        let target = self.dir.path().join(name);
        std::fs::copy(source, &target)
            .with_context(|| format!("failed to copy {}", source.display()))?;
        tracing::debug!("copied {} into working area", source.display());
        Ok(target)
    }

    /// Release the area. Returns the directory when it was retained.
    pub fn finish(self) -> Option<PathBuf> {
        if self.retain {
            let path = self.dir.keep();
            tracing::info!("working area kept at {}", path.display());
            return Some(path);
        }

        let path = self.dir.path().to_path_buf();
        if let Err(e) = self.dir.close() {
            tracing::warn!("failed to remove working area {}: {e}", path.display());
        } else {
            tracing::debug!("removed working area {}", path.display());
        }
        None
    }
}
