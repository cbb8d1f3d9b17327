//! Project tree initialisation.

use std::io;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use decompatch_core::config::{ProjectConfig, ProjectLayout};

use crate::cmd::run_cmd;

/// Directory inside the project that receives the decompiled sources.
pub fn source_dir(layout: ProjectLayout, project_dir: &Path) -> PathBuf {
    match layout {
        ProjectLayout::Plain => project_dir.join("src"),
        ProjectLayout::Maven => project_dir.join("src").join("main").join("java"),
    }
}

/// Arguments for a non-interactive quickstart `archetype:generate`.
pub fn maven_args(group_id: &str, artifact_id: &str) -> Vec<String> {
    vec![
        "archetype:generate".to_string(),
        format!("-DgroupId={group_id}"),
        format!("-DartifactId={artifact_id}"),
        "-DarchetypeArtifactId=maven-archetype-quickstart".to_string(),
        "-DinteractiveMode=false".to_string(),
    ]
}

/// Create the project skeleton and return its source directory.
pub fn init_project(config: &ProjectConfig, project_dir: &Path) -> Result<PathBuf> {
    match config.layout {
        ProjectLayout::Plain => {
            let src = source_dir(ProjectLayout::Plain, project_dir);
            std::fs::create_dir_all(&src)
                .with_context(|| format!("failed to create {}", src.display()))?;
        }
        ProjectLayout::Maven => init_maven(config, project_dir)?,
    }
    Ok(source_dir(config.layout, project_dir))
}

fn init_maven(config: &ProjectConfig, project_dir: &Path) -> Result<()> {
    let artifact_id = project_dir
        .file_name()
        .and_then(|n| n.to_str())
        .with_context(|| format!("project directory has no usable name: {}", project_dir.display()))?;
    let parent = match project_dir.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => PathBuf::from("."),
    };
    std::fs::create_dir_all(&parent)
        .with_context(|| format!("failed to create {}", parent.display()))?;

    let args = maven_args(&config.group_id, artifact_id);
    let description = format!("initializing Maven project in {}", project_dir.display());
    run_cmd(&description, &config.maven_command, &args, Some(&parent))?;

    if !project_dir.is_dir() {
        bail!(
            "Maven did not create the project directory {}",
            project_dir.display()
        );
    }
    tracing::info!("Maven project initialized");
    Ok(())
}

/// Replace `src_dir` with a copy of `decompiled`.
pub fn replace_sources(src_dir: &Path, decompiled: &Path) -> Result<()> {
    match std::fs::remove_dir_all(src_dir) {
        Err(e) if e.kind() != io::ErrorKind::NotFound => {
            return Err(e).with_context(|| format!("failed to remove {}", src_dir.display()));
        }
        _ => {}
    }
    copy_dir_all(decompiled, src_dir).with_context(|| {
        format!(
            "failed to copy {} into {}",
            decompiled.display(),
            src_dir.display()
        )
    })
}

/// Recursively copy a directory tree.
pub fn copy_dir_all(from: &Path, to: &Path) -> io::Result<()> {
    std::fs::create_dir_all(to)?;
    for entry in std::fs::read_dir(from)? {
        let entry = entry?;
        let target = to.join(entry.file_name());
        if entry.file_type()?.is_dir() {
            copy_dir_all(&entry.path(), &target)?;
        } else {
            std::fs::copy(entry.path(), &target)?;
        }
    }
    Ok(())
}

/// Write the project's `.gitignore`.
pub fn write_gitignore(project_dir: &Path, entries: &[String]) -> Result<()> {
    let path = project_dir.join(".gitignore");
    let mut content = entries.join("\n");
    content.push('\n');
    std::fs::write(&path, content).with_context(|| format!("failed to write {}", path.display()))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn source_dir_per_layout() {
        let project = Path::new("/ws/project");
        assert_eq!(
            source_dir(ProjectLayout::Plain, project),
            PathBuf::from("/ws/project/src")
        );
        assert_eq!(
            source_dir(ProjectLayout::Maven, project),
            PathBuf::from("/ws/project/src/main/java")
        );
    }

    #[test]
    fn maven_args_name_the_project_directory() {
        let args = maven_args("dev.example", "project");
        assert_eq!(args[0], "archetype:generate");
        assert!(args.contains(&"-DgroupId=dev.example".to_string()));
        assert!(args.contains(&"-DartifactId=project".to_string()));
        assert!(args.contains(&"-DinteractiveMode=false".to_string()));
        assert!(args.contains(&"-DarchetypeArtifactId=maven-archetype-quickstart".to_string()));
    }

    #[test]
    fn maven_layout_fails_without_maven() {
        let dir = tempfile::tempdir().unwrap();
        let config = ProjectConfig {
            layout: ProjectLayout::Maven,
            maven_command: "no-such-mvn-binary".into(),
            ..ProjectConfig::default()
        };
        let err = init_project(&config, &dir.path().join("project")).unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("failed to execute: no-such-mvn-binary"), "{msg}");
        assert!(msg.contains("archetype:generate"), "{msg}");
        assert!(!dir.path().join("project").exists());
    }

    #[test]
    fn plain_layout_creates_src() {
        let dir = tempfile::tempdir().unwrap();
        let config = ProjectConfig {
            layout: ProjectLayout::Plain,
            ..ProjectConfig::default()
        };
        let project = dir.path().join("project");
        let src = init_project(&config, &project).unwrap();
        assert_eq!(src, project.join("src"));
        assert!(src.is_dir());
    }

    #[test]
    fn replace_sources_drops_skeleton_files() {
        let dir = tempfile::tempdir().unwrap();
        let src = dir.path().join("src");
        std::fs::create_dir_all(src.join("dev/example")).unwrap();
        std::fs::write(src.join("dev/example/App.java"), "class App {}").unwrap();

        let decompiled = dir.path().join("decompiled");
        std::fs::create_dir_all(decompiled.join("com/game")).unwrap();
        std::fs::write(decompiled.join("com/game/Server.java"), "class Server {}").unwrap();

        replace_sources(&src, &decompiled).unwrap();
        assert!(!src.join("dev").exists());
        assert_eq!(
            std::fs::read_to_string(src.join("com/game/Server.java")).unwrap(),
            "class Server {}"
        );
    }

    #[test]
    fn gitignore_lists_entries() {
        let dir = tempfile::tempdir().unwrap();
        write_gitignore(dir.path(), &ProjectConfig::default().ignore).unwrap();
        let content = std::fs::read_to_string(dir.path().join(".gitignore")).unwrap();
        assert_eq!(content, "target/\n.idea/\nout/\n*.iml\n*.class\n");
    }
}
