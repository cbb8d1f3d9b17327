use anyhow::{Context, Result};
use decompatch_core::{Config, Error, Layout, PatchSeries};

use super::open_project;

/// Prefix of the scratch directory (inside the work dir) holding a fresh export.
pub const EXPORT_DIR_PREFIX: &str = "decompatch-patches-";

/// Export commits since the baseline and store the ones not captured yet.
///
/// Returns the number of patch files added to the patches directory.
pub fn make_feature_patches(config: &Config) -> Result<usize> {
    let layout = Layout::from_config(&config.workspace);
    let repo = open_project(config, &layout)?;

    let tag = &config.git.baseline_tag;
    if !repo.tag_exists(tag)? {
        return Err(Error::Precondition(format!(
            "tag {tag} not found in {}; the project was not created by setup",
            layout.project_dir.display()
        ))
        .into());
    }

    // Removed on drop, including when export or merge fails.
    std::fs::create_dir_all(&layout.work_dir)
        .with_context(|| format!("failed to create {}", layout.work_dir.display()))?;
    let export = tempfile::Builder::new()
        .prefix(EXPORT_DIR_PREFIX)
        .tempdir_in(&layout.work_dir)
        .context("failed to create temporary patch directory")?;

    let range = format!("{tag}..HEAD");
    let out = repo.format_patch(&range, export.path())?;
    tracing::info!("git format-patch output:\n{}", out.trim());

    let mut series = PatchSeries::load(&layout.patches_dir)?;
    let moved = series.merge_export(export.path())?;
    for path in &moved {
        tracing::debug!("new patch {}", path.display());
    }
    tracing::info!("Patches created, files copied: {}", moved.len());
    Ok(moved.len())
}
