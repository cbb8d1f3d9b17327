//! Artifact acquisition: fetch the server artifact unless it is already present.

use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use decompatch_core::config::{ArtifactConfig, ArtifactSource};

use crate::cmd::{expand_template, run_cmd};

/// Whether an artifact is already usable. Empty files are leftovers.
pub fn is_present(path: &Path) -> bool {
    std::fs::metadata(path).is_ok_and(|m| m.is_file() && m.len() > 0)
}

/// Sibling path used while the artifact is still being written.
pub fn partial_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(".part");
    path.with_file_name(name)
}

/// Make sure the artifact exists at `dest`, downloading it if needed.
///
/// Returns `true` when a download took place.
pub fn ensure_artifact(config: &ArtifactConfig, dest: &Path) -> Result<bool> {
    if is_present(dest) {
        tracing::info!("artifact already present at {}", dest.display());
        return Ok(false);
    }

    let Some(source) = &config.source else {
        bail!(
            "artifact {} is missing and no [artifact] source is configured; \
             place the file there or configure a url or command",
            dest.display()
        );
    };

    if let Some(parent) = dest.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }

    let part = partial_path(dest);
    let result = match source {
        ArtifactSource::Url(url) => download(url, &part),
        ArtifactSource::Command(template) => fetch_with_command(template, &part),
    };
    if let Err(e) = result {
        let _ = std::fs::remove_file(&part);
        return Err(e);
    }

    if !is_present(&part) {
        let _ = std::fs::remove_file(&part);
        bail!("downloader produced no artifact at {}", part.display());
    }
    std::fs::rename(&part, dest)
        .with_context(|| format!("failed to move artifact into {}", dest.display()))?;
    tracing::info!("artifact saved to {}", dest.display());
    Ok(true)
}

fn download(url: &str, part: &Path) -> Result<()> {
    tracing::info!("downloading {url}");

    // reqwest is built with `rustls-no-provider`; the `Err` case only means a
    // provider is already installed.
    let _ = rustls::crypto::ring::default_provider().install_default();

    let client = reqwest::blocking::Client::builder()
        .user_agent(concat!("decompatch/", env!("CARGO_PKG_VERSION")))
        .build()
        .context("failed to build HTTP client")?;

    let mut response = client
        .get(url)
        .send()
        .with_context(|| format!("request to {url} failed"))?
        .error_for_status()
        .with_context(|| format!("download of {url} failed"))?;

    let mut file =
        File::create(part).with_context(|| format!("failed to create {}", part.display()))?;
    let bytes = response
        .copy_to(&mut file)
        .with_context(|| format!("failed to write {}", part.display()))?;
    file.flush()?;
    tracing::debug!(bytes, "download finished");
    Ok(())
}

fn fetch_with_command(template: &[String], part: &Path) -> Result<()> {
    let (program, args) = expand_template(template, &[("output", part)])?;
    run_cmd("running artifact downloader", &program, &args, None)?;
    Ok(())
}
