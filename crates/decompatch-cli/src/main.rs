use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use decompatch::actions;
use decompatch_core::config::load_config;
use decompatch_core::tracing_init::init_tracing;

const DEFAULT_LOG_FILTER: &str = "decompatch=info,decompatch_core=info";

/// Decompile a server artifact into a git project and keep feature patches
/// against the pristine baseline.
#[derive(Debug, Parser)]
#[command(name = "decompatch", version, about)]
struct Cli {
    #[command(subcommand)]
    action: Action,
}

#[derive(Debug, Clone, Copy, Subcommand)]
enum Action {
    /// Download, decompile and seed the project repository, then apply patches
    Setup,
    /// Capture commits made since the baseline as numbered patch files
    #[command(name = "makeFeaturePatches")]
    MakeFeaturePatches,
    /// Replay the stored patch series onto the project repository
    #[command(name = "applyPatches")]
    ApplyPatches,
}

fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let _ = e.print();
            // Usage errors exit 1; --help and --version are not errors.
            return if e.use_stderr() {
                ExitCode::FAILURE
            } else {
                ExitCode::SUCCESS
            };
        }
    };

    init_tracing(DEFAULT_LOG_FILTER);

    match run(cli.action) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            tracing::error!("{e:#}");
            ExitCode::FAILURE
        }
    }
}

/// Run one action. `Ok(false)` means a patch did not apply.
fn run(action: Action) -> Result<bool> {
    let config = load_config().context("failed to load configuration")?;
    tracing::debug!(?action, root = %config.workspace.root.display(), "starting");

    match action {
        Action::Setup => Ok(actions::setup(&config)?.is_clean()),
        Action::MakeFeaturePatches => {
            actions::make_feature_patches(&config)?;
            Ok(true)
        }
        Action::ApplyPatches => Ok(actions::apply_patches(&config)?.is_clean()),
    }
}
