//! Thin wrapper around the `git` binary.
//!
//! Every call blocks until git exits. A nonzero exit becomes
//! [`GitError::Failed`] carrying the exit status and captured output.

use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use std::process::Command;

use thiserror::Error;
use tracing::debug;

use crate::config::GitConfig;
use crate::layout::is_repository;

/// Message git prints for `am --abort` when no session exists.
///
/// Only consulted as a fallback: [`Repository::am_in_progress`] is checked first.
const NOTHING_TO_RESUME: &str = "Resolve operation not in progress";

/// Errors from git invocations.
#[derive(Debug, Error)]
pub enum GitError {
    #[error("failed to execute {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("git {command} failed ({}): {}", format_status(*.status), summarize(.stderr, .stdout))]
    Failed {
        command: String,
        /// `None` when git was terminated by a signal.
        status: Option<i32>,
        stdout: String,
        stderr: String,
    },

    #[error("not a git repository: {}", .0.display())]
    NotARepository(PathBuf),

    #[error("a rebase is in progress in {}; finish or abort it first", .0.display())]
    RebaseInProgress(PathBuf),
}

impl GitError {
    /// Captured stderr followed by stdout, for diagnostics.
    pub fn output(&self) -> Option<String> {
        match self {
            Self::Failed { stdout, stderr, .. } => Some(format!("{stderr}{stdout}")),
            _ => None,
        }
    }

    /// Whether this is git refusing `am --abort` because nothing is being applied.
    pub fn is_nothing_to_resume(&self) -> bool {
        self.output()
            .is_some_and(|text| text.contains(NOTHING_TO_RESUME))
    }
}

fn format_status(status: Option<i32>) -> String {
    status.map_or_else(|| "killed by signal".to_string(), |code| format!("exit {code}"))
}

fn summarize(stderr: &str, stdout: &str) -> String {
    let stderr = stderr.trim();
    if stderr.is_empty() {
        stdout.trim().to_string()
    } else {
        stderr.to_string()
    }
}

/// A working directory driven through the `git` binary.
#[derive(Debug, Clone)]
pub struct Repository {
    path: PathBuf,
    program: String,
    identity: Option<(String, String)>,
}

impl Repository {
    /// Bind to an existing repository. Rejects directories without `.git`.
    pub fn open(path: impl Into<PathBuf>, config: &GitConfig) -> Result<Self, GitError> {
        let path = path.into();
        if !is_repository(&path) {
            return Err(GitError::NotARepository(path));
        }
        Ok(Self::bind(path, config))
    }

    /// Run `git init` in an existing directory and bind to it.
    pub fn init(path: impl Into<PathBuf>, config: &GitConfig) -> Result<Self, GitError> {
        let repo = Self::bind(path.into(), config);
        repo.execute(["init"])?;
        Ok(repo)
    }

    fn bind(path: PathBuf, config: &GitConfig) -> Self {
        let identity = match (&config.user_name, &config.user_email) {
            (Some(name), Some(email)) => Some((name.clone(), email.clone())),
            _ => None,
        };
        Self {
            path,
            program: config.program.clone(),
            identity,
        }
    }

    /// The working directory.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Run an arbitrary git subcommand and return its stdout.
    pub fn execute<I, S>(&self, args: I) -> Result<String, GitError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        let args: Vec<S> = args.into_iter().collect();
        let command = args
            .iter()
            .map(|a| a.as_ref().to_string_lossy())
            .collect::<Vec<_>>()
            .join(" ");

        let mut cmd = Command::new(&self.program);
        if let Some((name, email)) = &self.identity {
            cmd.arg("-c")
                .arg(format!("user.name={name}"))
                .arg("-c")
                .arg(format!("user.email={email}"));
        }
        cmd.args(&args).current_dir(&self.path);

        debug!(repo = %self.path.display(), "exec: {} {command}", self.program);
        let start = std::time::Instant::now();
        let output = cmd.output().map_err(|source| GitError::Spawn {
            program: self.program.clone(),
            source,
        })?;

        let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).into_owned();
            debug!(
                elapsed_ms = start.elapsed().as_millis(),
                status = %output.status,
                stderr = %stderr.trim(),
                "git {command} failed"
            );
            return Err(GitError::Failed {
                command,
                status: output.status.code(),
                stdout,
                stderr,
            });
        }
        debug!(elapsed_ms = start.elapsed().as_millis(), "git {command} completed");
        Ok(stdout)
    }

    /// Stage the given paths.
    pub fn add(&self, paths: &[&str]) -> Result<(), GitError> {
        self.execute(["add", "--"].iter().copied().chain(paths.iter().copied()))?;
        Ok(())
    }

    /// Stage every change in the working tree, including deletions.
    pub fn add_all(&self) -> Result<(), GitError> {
        self.execute(["add", "-A"])?;
        Ok(())
    }

    pub fn commit(&self, message: &str) -> Result<(), GitError> {
        self.execute(["commit", "-q", "-m", message])?;
        Ok(())
    }

    /// Create a lightweight tag at `HEAD`.
    pub fn tag(&self, name: &str) -> Result<(), GitError> {
        self.execute(["tag", name])?;
        Ok(())
    }

    pub fn tag_exists(&self, name: &str) -> Result<bool, GitError> {
        let refname = format!("refs/tags/{name}");
        match self.execute(["rev-parse", "--verify", "--quiet", refname.as_str()]) {
            Ok(_) => Ok(true),
            Err(GitError::Failed { status: Some(1), .. }) => Ok(false),
            Err(e) => Err(e),
        }
    }

    /// Export `range` as numbered patch files into `out_dir`.
    ///
    /// Returns git's listing of written files.
    pub fn format_patch(&self, range: &str, out_dir: &Path) -> Result<String, GitError> {
        self.execute([
            OsStr::new("format-patch"),
            OsStr::new("--no-stat"),
            OsStr::new("--minimal"),
            OsStr::new("-N"),
            OsStr::new("-o"),
            out_dir.as_os_str(),
            OsStr::new(range),
        ])
    }

    /// Apply one mailbox patch, falling back to a three-way merge.
    pub fn am_three_way(&self, patch: &Path) -> Result<(), GitError> {
        self.execute([OsStr::new("am"), OsStr::new("--3way"), patch.as_os_str()])?;
        Ok(())
    }

    /// Resolve a path inside the git directory (`rev-parse --git-path`).
    fn git_path(&self, name: &str) -> Result<PathBuf, GitError> {
        let out = self.execute(["rev-parse", "--git-path", name])?;
        Ok(self.path.join(out.trim()))
    }

    /// Whether a `git am` session is waiting to be resolved.
    ///
    /// git keeps its session state in `rebase-apply/`; the `applying` marker
    /// distinguishes `am` from a `rebase` using the same directory.
    pub fn am_in_progress(&self) -> Result<bool, GitError> {
        Ok(self.git_path("rebase-apply")?.join("applying").exists())
    }

    /// Whether a `git rebase` is stopped, with either backend.
    pub fn rebase_in_progress(&self) -> Result<bool, GitError> {
        if self.git_path("rebase-merge")?.is_dir() {
            return Ok(true);
        }
        let apply_dir = self.git_path("rebase-apply")?;
        Ok(apply_dir.is_dir() && !apply_dir.join("applying").exists())
    }

    /// Abort a pending `git am`. Returns whether a session was aborted.
    ///
    /// A stopped rebase is not ours to abort and fails with
    /// [`GitError::RebaseInProgress`].
    pub fn abort_am(&self) -> Result<bool, GitError> {
        if self.rebase_in_progress()? {
            return Err(GitError::RebaseInProgress(self.path.clone()));
        }
        if !self.am_in_progress()? {
            debug!(repo = %self.path.display(), "no patch application in progress");
            return Ok(false);
        }
        match self.execute(["am", "--abort"]) {
            Ok(_) => Ok(true),
            Err(e) if e.is_nothing_to_resume() => Ok(false),
            Err(e) => Err(e),
        }
    }
}
