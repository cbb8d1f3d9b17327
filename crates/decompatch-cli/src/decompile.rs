//! Decompilation through an external decompiler process.

use std::path::Path;

use anyhow::{Context, Result, bail};
use decompatch_core::config::DecompilerConfig;

use crate::cmd::{expand_template, run_cmd};

/// Decompile `artifact` into `output`, which must end up non-empty.
pub fn decompile(config: &DecompilerConfig, artifact: &Path, output: &Path) -> Result<()> {
    if !artifact.is_file() {
        bail!("artifact not found: {}", artifact.display());
    }
    std::fs::create_dir_all(output)
        .with_context(|| format!("failed to create {}", output.display()))?;

    let (program, args) =
        expand_template(&config.command, &[("input", artifact), ("output", output)])?;
    let description = format!("decompiling {}", artifact.display());
    let stdout = run_cmd(&description, &program, &args, None)?;
    tracing::debug!("decompiler output:\n{}", stdout.trim());

    let produced = std::fs::read_dir(output)
        .with_context(|| format!("failed to read {}", output.display()))?
        .next()
        .is_some();
    if !produced {
        bail!("decompiler produced no output in {}", output.display());
    }
    tracing::info!("decompiled sources written to {}", output.display());
    Ok(())
}

#[cfg(all(test, unix))]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn sh(script: &str) -> DecompilerConfig {
        DecompilerConfig {
            command: vec![
                "sh".into(),
                "-c".into(),
                script.into(),
                "decompile".into(),
                "{input}".into(),
                "{output}".into(),
            ],
        }
    }

    #[test]
    fn decompiler_receives_paths() {
        let dir = tempfile::tempdir().unwrap();
        let jar = dir.path().join("server.jar");
        std::fs::write(&jar, b"PK").unwrap();
        let out = dir.path().join("decompiled");

        decompile(&sh("cp \"$1\" \"$2\"/copied.bin"), &jar, &out).unwrap();
        assert_eq!(std::fs::read(out.join("copied.bin")).unwrap(), b"PK");
    }

    #[test]
    fn empty_output_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let jar = dir.path().join("server.jar");
        std::fs::write(&jar, b"PK").unwrap();

        let err = decompile(&sh("true"), &jar, &dir.path().join("out")).unwrap_err();
        assert!(err.to_string().contains("no output"));
    }

    #[test]
    fn missing_artifact_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = decompile(&sh("true"), &dir.path().join("x.jar"), dir.path()).unwrap_err();
        assert!(err.to_string().contains("artifact not found"));
    }

    #[test]
    fn decompiler_failure_propagates() {
        let dir = tempfile::tempdir().unwrap();
        let jar = dir.path().join("server.jar");
        std::fs::write(&jar, b"PK").unwrap();
        let err = decompile(&sh("echo 'bad class file' >&2; exit 2"), &jar, &dir.path().join("o"))
            .unwrap_err();
        assert!(err.to_string().contains("bad class file"));
    }
}
