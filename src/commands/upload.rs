//! One-off upload of a file to the configured cloud endpoint.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::ArgMatches;
use colored::Colorize;

use crate::core::config::Config;
use crate::sinks::{CloudTarget, CloudUploader};

/// Cloud target from settings, with an optional endpoint override
pub fn cloud_target(config: &Config, endpoint_override: Option<&String>) -> Result<CloudTarget> {
    let endpoint = endpoint_override
        .cloned()
        .or_else(|| config.cloud_endpoint.clone())
        .context("No cloud endpoint configured (set 'cloud_endpoint' or pass --endpoint)")?;

    Ok(CloudTarget::new(endpoint, config.cloud_token.clone()))
}

pub fn execute(matches: &ArgMatches) -> Result<()> {
    let config = super::load_config(matches)?.config;

    let file = matches
        .get_one::<String>("file")
        .map(PathBuf::from)
        .context("File argument is required")?;
    let key = match matches.get_one::<String>("key") {
        Some(key) => key.clone(),
        None => file
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .context("Cannot derive an object key from the file name")?,
    };

    let target = cloud_target(&config, matches.get_one::<String>("endpoint"))?;
    let data =
        std::fs::read(&file).with_context(|| format!("Failed to read {}", file.display()))?;

    let runtime = super::build_runtime()?;
    let outcome = runtime.block_on(async {
        let uploader = CloudUploader::new(target, config.upload_timeout())?;
        Ok::<_, crate::error::MonitorError>(uploader.spawn(key, data).wait().await)
    })?;

    match outcome.result {
        Ok(()) => {
            println!(
                "{} Uploaded {} ({} bytes)",
                "✓".green(),
                outcome.key,
                outcome.bytes
            );
            Ok(())
        }
        Err(e) => Err(e).with_context(|| format!("Failed to upload {}", outcome.key)),
    }
}
