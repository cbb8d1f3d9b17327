//! The three workflow actions: `setup`, `makeFeaturePatches`, `applyPatches`.

mod apply;
mod make_patches;
mod setup;

use anyhow::Result;
use decompatch_core::{Config, Error, Layout, Repository};

pub use apply::{ApplyOutcome, apply_feature_patches, apply_patches};
pub use make_patches::{EXPORT_DIR_PREFIX, make_feature_patches};
pub use setup::{INITIAL_COMMIT_MESSAGE, setup};

/// Bind to the project repository, failing if `setup` has not run.
pub fn open_project(config: &Config, layout: &Layout) -> Result<Repository> {
    if !layout.is_project_repository() {
        return Err(Error::Precondition(format!(
            "Project directory {} does not exist or is not a git repository. \
             Please run setup first.",
            layout.project_dir.display()
        ))
        .into());
    }
    Ok(Repository::open(&layout.project_dir, &config.git)?)
}
