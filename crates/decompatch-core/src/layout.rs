//! Workspace directory layout.

use std::io;
use std::path::{Path, PathBuf};

use crate::config::WorkspaceConfig;

/// Resolved workspace directories.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Layout {
    pub root: PathBuf,
    pub work_dir: PathBuf,
    pub downloads_dir: PathBuf,
    pub decompiled_dir: PathBuf,
    pub project_dir: PathBuf,
    pub patches_dir: PathBuf,
}

impl Layout {
    /// Resolve every configured directory against the workspace root.
    pub fn from_config(config: &WorkspaceConfig) -> Self {
        let root = config.root.clone();
        Self {
            work_dir: root.join(&config.work_dir),
            downloads_dir: root.join(&config.downloads_dir),
            decompiled_dir: root.join(&config.decompiled_dir),
            project_dir: root.join(&config.project_dir),
            patches_dir: root.join(&config.patches_dir),
            root,
        }
    }

    /// Create the fixed directories. Safe to call repeatedly.
    ///
    /// The project directory is left alone: `setup` owns its creation.
    pub fn ensure_dirs(&self) -> io::Result<()> {
        for dir in [
            &self.work_dir,
            &self.downloads_dir,
            &self.decompiled_dir,
            &self.patches_dir,
        ] {
            std::fs::create_dir_all(dir)?;
        }
        Ok(())
    }

    /// Remove the scratch work directory; a missing directory is not an error.
    pub fn remove_work_dir(&self) -> io::Result<()> {
        match std::fs::remove_dir_all(&self.work_dir) {
            Err(e) if e.kind() != io::ErrorKind::NotFound => Err(e),
            _ => Ok(()),
        }
    }

    /// Local path of the downloaded artifact.
    pub fn artifact_path(&self, file_name: &str) -> PathBuf {
        self.downloads_dir.join(file_name)
    }

    /// Whether the project directory exists and carries git metadata.
    pub fn is_project_repository(&self) -> bool {
        is_repository(&self.project_dir)
    }
}

/// A directory is treated as a repository when it has a `.git` subfolder.
pub fn is_repository(dir: &Path) -> bool {
    dir.is_dir() && dir.join(".git").is_dir()
}
