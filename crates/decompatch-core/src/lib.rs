//! `decompatch` Core Library
//!
//! Shared functionality for the `decompatch` workflow:
//! - Configuration loading and validation
//! - Workspace directory layout
//! - Thin wrapper around the `git` binary
//! - Numbered patch series bookkeeping
//! - Common error types

pub mod config;
pub mod error;
pub mod git;
pub mod layout;
pub mod patches;
pub mod tracing_init;

pub use config::Config;
pub use error::{Error, Result};
pub use git::{GitError, Repository};
pub use layout::Layout;
pub use patches::{PatchError, PatchSeries};
