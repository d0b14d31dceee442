//! Shared utilities for CLI commands

use anyhow::{Context, Result};
use chm_core::Config;
use std::fmt;

use crate::cli::GlobalArgs;

/// Error type representing a non-zero process exit code.
///
/// The message has already been printed when this is returned.
#[derive(Debug)]
pub(crate) struct ExitCode(pub(crate) i32);

impl fmt::Display for ExitCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "")
    }
}

impl std::error::Error for ExitCode {}

/// Load the config file named by `--config`, or an empty config
pub(crate) fn load_config(global: &GlobalArgs) -> Result<Config> {
    match &global.config {
        Some(path) => Config::load(path)
            .with_context(|| format!("Failed to load config from {}", path.display())),
        None => Ok(Config::default()),
    }
}
