//! Per-run workspace management.

use crate::{Error, Result};
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Isolated temporary directory for one pipeline run.
///
/// Every transient artifact a run produces (downloaded sources, staged step
/// outputs, concat manifests) lives under this directory, which is removed
/// when the workspace is dropped — on success and failure paths alike.
///
/// # Example
///
/// ```
/// use clipforge_av::Workspace;
///
/// let ws = Workspace::new()?;
/// let out = ws.step_output(0);
/// assert!(out.starts_with(ws.dir()));
/// # Ok::<(), clipforge_av::Error>(())
/// ```
pub struct Workspace {
    temp_dir: TempDir,
}

impl Workspace {
    /// Create a new workspace backed by a fresh temporary directory.
    pub fn new() -> Result<Self> {
        let temp_dir = TempDir::with_prefix("clipforge-run-")
            .map_err(|e| Error::Workspace(e.to_string()))?;
        Ok(Self { temp_dir })
    }

    /// The workspace directory path.
    pub fn dir(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Path for a named file inside the workspace.
    pub fn file(&self, name: &str) -> PathBuf {
        self.temp_dir.path().join(name)
    }

    /// Staged output path for the step at the given enabled-sequence index.
    pub fn step_output(&self, index: usize) -> PathBuf {
        self.file(&format!("step-{}.mp4", index))
    }

    /// Clean up without waiting for drop (discard all artifacts).
    pub fn cleanup(self) {
        drop(self.temp_dir);
    }
}
