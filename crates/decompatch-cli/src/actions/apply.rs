use std::path::Path;

use anyhow::{Context, Result};
use decompatch_core::{Config, Error, GitError, Layout, PatchSeries, Repository};

use super::open_project;

/// Result of replaying the patch series.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApplyOutcome {
    /// Every stored patch applied.
    Clean { applied: usize },
    /// `patch` failed; the repository is left mid-`am` for manual resolution.
    Conflict { patch: String, applied: usize },
}

impl ApplyOutcome {
    pub const fn is_clean(&self) -> bool {
        matches!(self, Self::Clean { .. })
    }
}

/// Replay the stored patch series onto the project repository.
pub fn apply_patches(config: &Config) -> Result<ApplyOutcome> {
    let layout = Layout::from_config(&config.workspace);
    let repo = open_project(config, &layout)?;
    apply_feature_patches(&repo, &layout.patches_dir)
}

/// Abort any unfinished `git am`, then apply every patch in name order with
/// `am --3way`, stopping at the first failure.
pub fn apply_feature_patches(repo: &Repository, patches_dir: &Path) -> Result<ApplyOutcome> {
    match repo.abort_am() {
        Ok(true) => tracing::info!("aborted an unfinished patch application"),
        Ok(false) => {}
        Err(e @ GitError::RebaseInProgress(_)) => {
            return Err(Error::Precondition(e.to_string()).into());
        }
        Err(e) => return Err(e).context("Failed to abort previous patch application"),
    }

    let series = PatchSeries::load(patches_dir)?;
    if series.is_empty() {
        tracing::info!("no feature patches in {}", series.dir().display());
    }

    for (applied, (name, path)) in series.names().iter().zip(series.paths()).enumerate() {
        match repo.am_three_way(&path) {
            Ok(()) => tracing::info!("applied {name}"),
            Err(e @ GitError::Failed { .. }) => {
                tracing::warn!("Failed to apply patch {name}: {e}");
                tracing::warn!(
                    "Please resolve the conflict manually in {} (git am --continue or \
                     git am --skip) and then run makeFeaturePatches",
                    repo.path().display()
                );
                return Ok(ApplyOutcome::Conflict {
                    patch: name.clone(),
                    applied,
                });
            }
            Err(e) => return Err(e.into()),
        }
    }

    tracing::info!("applied {} patch(es)", series.len());
    Ok(ApplyOutcome::Clean {
        applied: series.len(),
    })
}
