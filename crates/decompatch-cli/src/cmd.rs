use std::path::Path;
use std::process::Command;

use anyhow::{Context, Result, bail};

/// Execute a command with logging and return its stdout. Logs the full command
/// line at debug level and a human-friendly description at info level.
///
/// A nonzero exit fails with the exit status and captured output.
pub fn run_cmd<S: AsRef<str>>(
    description: &str,
    program: &str,
    args: &[S],
    cwd: Option<&Path>,
) -> Result<String> {
    let args: Vec<&str> = args.iter().map(AsRef::as_ref).collect();
    let cmd_line = format!("{program} {}", args.join(" "));
    tracing::info!("{description}");
    tracing::debug!("exec: {cmd_line}");

    let mut command = Command::new(program);
    command.args(&args);
    if let Some(dir) = cwd {
        command.current_dir(dir);
    }
    let output = command
        .output()
        .with_context(|| format!("failed to execute: {cmd_line}"))?;

    let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        tracing::error!("command failed: {cmd_line}\nstderr: {stderr}");
        let detail = if stderr.trim().is_empty() {
            stdout.trim()
        } else {
            stderr.trim()
        };
        bail!("{description} failed ({}): {detail}", output.status);
    }
    Ok(stdout)
}

/// Split a configured command template into program and arguments,
/// substituting `{name}` placeholders with paths.
pub fn expand_template(template: &[String], vars: &[(&str, &Path)]) -> Result<(String, Vec<String>)> {
    let Some((program, rest)) = template.split_first() else {
        bail!("command template is empty");
    };
    let expand = |part: &String| {
        vars.iter().fold(part.clone(), |acc, (name, path)| {
            acc.replace(&format!("{{{name}}}"), &path.to_string_lossy())
        })
    };
    Ok((expand(program), rest.iter().map(expand).collect()))
}
