use anyhow::{Context, Result};
use decompatch_core::{Config, Error, Layout, Repository};

use super::apply::{ApplyOutcome, apply_feature_patches};
use crate::{acquire, decompile, project};

/// Subject of the commit holding the pristine decompiled tree.
pub const INITIAL_COMMIT_MESSAGE: &str = "Initial decompilation";

/// Build the project repository from scratch and replay the stored patches.
///
/// Refuses to run when the project directory already exists.
pub fn setup(config: &Config) -> Result<ApplyOutcome> {
    let layout = Layout::from_config(&config.workspace);
    if layout.project_dir.exists() {
        return Err(Error::Precondition(format!(
            "Project directory {} already exists. Please delete the folder and run setup again.",
            layout.project_dir.display()
        ))
        .into());
    }

    tracing::info!("removing stale work directory {}", layout.work_dir.display());
    layout
        .remove_work_dir()
        .with_context(|| format!("failed to remove {}", layout.work_dir.display()))?;
    layout
        .ensure_dirs()
        .context("failed to create workspace directories")?;

    let artifact = layout.artifact_path(&config.artifact.file_name);
    acquire::ensure_artifact(&config.artifact, &artifact)?;
    decompile::decompile(&config.decompiler, &artifact, &layout.decompiled_dir)?;

    tracing::info!(
        layout = %config.project.layout,
        "initializing project in {}",
        layout.project_dir.display()
    );
    let src = project::init_project(&config.project, &layout.project_dir)?;
    project::replace_sources(&src, &layout.decompiled_dir)?;
    project::write_gitignore(&layout.project_dir, &config.project.ignore)?;

    let repo = Repository::init(&layout.project_dir, &config.git)?;
    repo.add(&[".gitignore"])?;
    repo.add_all()?;
    repo.commit(INITIAL_COMMIT_MESSAGE)?;
    repo.tag(&config.git.baseline_tag)?;
    tracing::info!(
        tag = %config.git.baseline_tag,
        "baseline committed in {}",
        layout.project_dir.display()
    );

    tracing::info!("Applying patches");
    apply_feature_patches(&repo, &layout.patches_dir)
}
