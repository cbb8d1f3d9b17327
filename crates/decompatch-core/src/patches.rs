//! Numbered patch series stored on disk (`NNNN-description.patch`).
//!
//! Stored patches are never renumbered. A fresh `format-patch` export always
//! starts at `0001`, so reconciliation moves only the exported files whose
//! index is past the end of the stored series.

use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::debug;

pub const PATCH_EXTENSION: &str = "patch";

/// Errors from patch series bookkeeping.
#[derive(Debug, Error)]
pub enum PatchError {
    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("patch file name has no numeric index: {0}")]
    BadName(String),

    #[error("patch series is not numbered contiguously: expected index {expected}, found {found}")]
    NonContiguous { expected: u32, found: String },

    #[error("refusing to overwrite existing patch {}", .0.display())]
    AlreadyExists(PathBuf),
}

fn io_err(path: &Path) -> impl FnOnce(io::Error) -> PatchError + '_ {
    move |source| PatchError::Io {
        path: path.to_path_buf(),
        source,
    }
}

/// Leading number of a patch file name: `0003-fix-spawn.patch` -> `3`.
pub fn parse_index(file_name: &str) -> Option<u32> {
    let (prefix, _) = file_name.split_once('-')?;
    if prefix.is_empty() || !prefix.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    prefix.parse().ok()
}

/// Names from `candidates` whose index exceeds `existing`, in index order.
pub fn select_new<S: AsRef<str>>(
    existing: usize,
    candidates: &[S],
) -> Result<Vec<String>, PatchError> {
    let mut selected = Vec::new();
    for name in candidates {
        let name = name.as_ref();
        let index = parse_index(name).ok_or_else(|| PatchError::BadName(name.to_string()))?;
        if index as usize <= existing {
            debug!(patch = name, "already captured, skipping");
            continue;
        }
        selected.push((index, name.to_string()));
    }
    selected.sort();
    Ok(selected.into_iter().map(|(_, name)| name).collect())
}

/// `*.patch` file names in `dir`, sorted. A missing directory is empty.
pub fn list_patch_names(dir: &Path) -> Result<Vec<String>, PatchError> {
    let entries = match std::fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(io_err(dir)(e)),
    };

    let mut names = Vec::new();
    for entry in entries {
        let entry = entry.map_err(io_err(dir))?;
        let path = entry.path();
        if !path.is_file() || path.extension().and_then(|e| e.to_str()) != Some(PATCH_EXTENSION) {
            continue;
        }
        if let Some(name) = path.file_name().and_then(|n| n.to_str()) {
            names.push(name.to_string());
        }
    }
    names.sort();
    Ok(names)
}

/// The patches currently stored in a directory.
#[derive(Debug, Clone)]
pub struct PatchSeries {
    dir: PathBuf,
    names: Vec<String>,
}

impl PatchSeries {
    pub fn load(dir: impl Into<PathBuf>) -> Result<Self, PatchError> {
        let dir = dir.into();
        let names = list_patch_names(&dir)?;
        Ok(Self { dir, names })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// File names in application order.
    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Full paths in application order.
    pub fn paths(&self) -> impl Iterator<Item = PathBuf> + '_ {
        self.names.iter().map(|n| self.dir.join(n))
    }

    /// Ensure stored patches are numbered `1..=len` with no gaps.
    pub fn check_contiguous(&self) -> Result<(), PatchError> {
        for (expected, name) in (1u32..).zip(&self.names) {
            let index = parse_index(name).ok_or_else(|| PatchError::BadName(name.clone()))?;
            if index != expected {
                return Err(PatchError::NonContiguous {
                    expected,
                    found: name.clone(),
                });
            }
        }
        Ok(())
    }

    /// Move patches from a fresh export into this series, skipping indices
    /// already stored. Returns the paths of the moved files.
    pub fn merge_export(&mut self, export_dir: &Path) -> Result<Vec<PathBuf>, PatchError> {
        self.check_contiguous()?;

        let exported = list_patch_names(export_dir)?;
        let new = select_new(self.len(), &exported)?;

        std::fs::create_dir_all(&self.dir).map_err(io_err(&self.dir))?;
        let mut moved = Vec::with_capacity(new.len());
        for name in new {
            let target = self.dir.join(&name);
            if target.exists() {
                return Err(PatchError::AlreadyExists(target));
            }
            move_file(&export_dir.join(&name), &target)?;
            debug!(patch = %name, "captured new patch");
            self.names.push(name);
            moved.push(target);
        }
        self.names.sort();
        Ok(moved)
    }
}

/// Rename, falling back to copy + remove across filesystems.
fn move_file(from: &Path, to: &Path) -> Result<(), PatchError> {
    if std::fs::rename(from, to).is_ok() {
        return Ok(());
    }
    std::fs::copy(from, to).map_err(io_err(to))?;
    std::fs::remove_file(from).map_err(io_err(from))
}
