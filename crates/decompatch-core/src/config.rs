//! Configuration resolution for decompatch.
//!
//! Resolution order:
//! 1. Built-in defaults
//! 2. TOML file (`$DECOMPATCH_CONFIG`, else `./decompatch.toml` when present)
//! 3. Environment variables

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

/// Name of the config file looked up in the current directory.
pub const CONFIG_FILE_NAME: &str = "decompatch.toml";

/// Environment variable naming an explicit config file.
pub const CONFIG_ENV: &str = "DECOMPATCH_CONFIG";

/// Complete decompatch configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct Config {
    #[serde(default)]
    pub workspace: WorkspaceConfig,
    #[serde(default)]
    pub artifact: ArtifactConfig,
    #[serde(default)]
    pub decompiler: DecompilerConfig,
    #[serde(default)]
    pub project: ProjectConfig,
    #[serde(default)]
    pub git: GitConfig,
}

/// Directory layout of the workspace. Relative paths resolve against `root`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct WorkspaceConfig {
    pub root: PathBuf,
    /// Scratch directory wiped at the start of every `setup`.
    pub work_dir: PathBuf,
    pub downloads_dir: PathBuf,
    pub decompiled_dir: PathBuf,
    pub project_dir: PathBuf,
    pub patches_dir: PathBuf,
}

impl Default for WorkspaceConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("."),
            work_dir: PathBuf::from("work"),
            downloads_dir: PathBuf::from("downloads"),
            decompiled_dir: PathBuf::from("work/decompiled"),
            project_dir: PathBuf::from("project"),
            patches_dir: PathBuf::from("patches"),
        }
    }
}

/// Where the server artifact comes from.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ArtifactSource {
    /// Plain HTTP(S) download.
    Url(String),
    /// External downloader; `{output}` is replaced by the destination path.
    Command(Vec<String>),
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ArtifactConfig {
    /// File name of the artifact inside the downloads directory.
    pub file_name: String,
    /// `None` means the artifact must be placed in the downloads directory by hand.
    pub source: Option<ArtifactSource>,
}

impl Default for ArtifactConfig {
    fn default() -> Self {
        Self {
            file_name: "server.jar".to_string(),
            source: None,
        }
    }
}

/// External decompiler invocation. `{input}` and `{output}` are substituted.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct DecompilerConfig {
    pub command: Vec<String>,
}

impl Default for DecompilerConfig {
    fn default() -> Self {
        Self {
            command: ["java", "-jar", "vineflower.jar", "{input}", "{output}"]
                .into_iter()
                .map(String::from)
                .collect(),
        }
    }
}

/// How the project tree is initialised before the decompiled sources are copied in.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum ProjectLayout {
    /// Bare `project/src` directory.
    Plain,
    /// `mvn archetype:generate` quickstart; sources live in `src/main/java`.
    #[default]
    Maven,
}

impl std::fmt::Display for ProjectLayout {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Plain => write!(f, "plain"),
            Self::Maven => write!(f, "maven"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ProjectConfig {
    pub layout: ProjectLayout,
    /// Maven `groupId` for the generated project.
    pub group_id: String,
    pub maven_command: String,
    /// Entries written to the project's `.gitignore`.
    pub ignore: Vec<String>,
}

impl Default for ProjectConfig {
    fn default() -> Self {
        Self {
            layout: ProjectLayout::default(),
            group_id: "dev.decompatch".to_string(),
            maven_command: "mvn".to_string(),
            ignore: ["target/", ".idea/", "out/", "*.iml", "*.class"]
                .into_iter()
                .map(String::from)
                .collect(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct GitConfig {
    pub program: String,
    pub baseline_tag: String,
    /// When both are set they are passed as `-c user.name=… -c user.email=…`.
    pub user_name: Option<String>,
    pub user_email: Option<String>,
}

impl Default for GitConfig {
    fn default() -> Self {
        Self {
            program: "git".to_string(),
            baseline_tag: "baseline".to_string(),
            user_name: None,
            user_email: None,
        }
    }
}

impl Config {
    /// Parse a config from TOML text.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Reject configurations no action could run with.
    pub fn validate(&self) -> Result<()> {
        if self.artifact.file_name.trim().is_empty() {
            return Err(Error::Config("artifact.file_name must not be empty".into()));
        }
        if let Some(ArtifactSource::Command(cmd)) = &self.artifact.source {
            if cmd.is_empty() {
                return Err(Error::Config("artifact.source.command must not be empty".into()));
            }
            if !cmd.iter().any(|a| a.contains("{output}")) {
                return Err(Error::Config(
                    "artifact.source.command must reference {output}".into(),
                ));
            }
        }
        if let Some(ArtifactSource::Url(url)) = &self.artifact.source {
            if url.trim().is_empty() {
                return Err(Error::Config("artifact.source.url must not be empty".into()));
            }
        }
        if self.decompiler.command.is_empty() {
            return Err(Error::Config("decompiler.command must not be empty".into()));
        }
        if !self.decompiler.command.iter().any(|a| a.contains("{output}")) {
            return Err(Error::Config("decompiler.command must reference {output}".into()));
        }
        if self.git.program.trim().is_empty() {
            return Err(Error::Config("git.program must not be empty".into()));
        }
        if self.git.baseline_tag.trim().is_empty() {
            return Err(Error::Config("git.baseline_tag must not be empty".into()));
        }
        if self.project.layout == ProjectLayout::Maven && self.project.group_id.trim().is_empty()
        {
            return Err(Error::Config("project.group_id must not be empty".into()));
        }
        Ok(())
    }
}

/// Path of the config file to read: `$DECOMPATCH_CONFIG` or `./decompatch.toml`.
pub fn config_path() -> PathBuf {
    std::env::var_os(CONFIG_ENV).map_or_else(|| PathBuf::from(CONFIG_FILE_NAME), PathBuf::from)
}

/// Load configuration with defaults, file and environment overrides applied.
///
/// An explicitly named file (`$DECOMPATCH_CONFIG`) must exist; the implicit
/// `./decompatch.toml` is optional.
pub fn load_config() -> Result<Config> {
    let explicit = std::env::var_os(CONFIG_ENV).is_some();
    let path = config_path();

    let mut config = if explicit || path.exists() {
        tracing::debug!(path = %path.display(), "loading config file");
        load_config_file(&path)?
    } else {
        Config::default()
    };

    apply_env_overrides(&mut config);
    config.validate()?;
    Ok(config)
}

/// Read and parse a single TOML config file.
pub fn load_config_file(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        Error::Config(format!("Failed to read config file {}: {}", path.display(), e))
    })?;
    toml::from_str(&content).map_err(|e| {
        Error::Config(format!("Failed to parse config file {}: {}", path.display(), e))
    })
}

fn apply_env_overrides(config: &mut Config) {
    if let Some(val) = std::env::var_os("DECOMPATCH_ROOT") {
        config.workspace.root = PathBuf::from(val);
    }
    if let Ok(val) = std::env::var("DECOMPATCH_GIT") {
        config.git.program = val;
    }
}
