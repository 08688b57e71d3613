// Command handlers module
pub mod config;
pub mod connections;
pub mod info;
pub mod processes;
pub mod snapshot;
pub mod upload;
pub mod watch;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::ArgMatches;

use crate::core::config::{Config, LoadedConfig};

/// Load settings from `--config` or the default location
pub fn load_config(matches: &ArgMatches) -> Result<LoadedConfig> {
    match config_path_arg(matches) {
        Some(path) => Config::load_from(&path)
            .with_context(|| format!("Failed to load settings from {}", path.display())),
        None => Config::load().context("Failed to load settings"),
    }
}

fn config_path_arg(matches: &ArgMatches) -> Option<PathBuf> {
    matches
        .try_get_one::<String>("config")
        .ok()
        .flatten()
        .map(PathBuf::from)
}

/// Build the tokio runtime used by commands that need async I/O
pub fn build_runtime() -> Result<tokio::runtime::Runtime> {
    tokio::runtime::Builder::new_multi_thread()
        .worker_threads(2)
        .enable_all()
        .thread_name("sysmon-worker")
        .build()
        .context("Failed to start async runtime")
}
