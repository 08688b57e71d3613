// sysmon library - public API

// Re-export error types
pub mod error;
pub use error::{MonitorError, Result};

// Module declarations
pub mod commands;
pub mod core;
pub mod platform;
pub mod sinks;
pub mod ui;

// Re-export commonly used types
pub use core::config::Config;
pub use core::system_monitor::{Alert, History, Monitor, Sample, Sampler, ThresholdConfig};

/// Initialize logging to stderr. `RUST_LOG` overrides the default level.
pub fn init_logging(verbose: bool) {
    let level = if verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .init();
}

/// Initialize logging appended to `path`
pub fn init_logging_to_file(path: &std::path::Path, verbose: bool) -> Result<()> {
    let file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)?;

    let level = if verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .target(env_logger::Target::Pipe(Box::new(file)))
        .init();
    Ok(())
}
