use anyhow::{Context, Result};
use clap::ArgMatches;
use colored::Colorize;

use crate::core::config::{Config, CLOUD_TOKEN, KNOWN_KEYS};

pub fn execute(matches: &ArgMatches) -> Result<()> {
    match matches.subcommand() {
        Some(("show", sub_matches)) => show(sub_matches),
        Some(("path", sub_matches)) => path(sub_matches),
        Some(("set", sub_matches)) => set(sub_matches),
        Some(("reset", sub_matches)) => reset(sub_matches),
        _ => {
            println!("Use 'sysmon config --help' for more information.");
            Ok(())
        }
    }
}

fn show(matches: &ArgMatches) -> Result<()> {
    let loaded = super::load_config(matches)?;

    println!("{} {}", "Settings file:".bold(), loaded.path.display());

    let mut shown = loaded.config.clone();
    if shown.cloud_token.is_some() {
        shown.cloud_token = Some("<hidden>".to_string());
    }
    println!("{}", serde_json::to_string_pretty(&shown)?);

    if !loaded.issues.is_empty() {
        println!("\n{}", "Problems found (defaults applied):".yellow().bold());
        for issue in &loaded.issues {
            println!("  {}", issue);
        }
    }
    Ok(())
}

fn path(matches: &ArgMatches) -> Result<()> {
    let loaded = super::load_config(matches)?;
    println!("{}", loaded.path.display());
    Ok(())
}

fn set(matches: &ArgMatches) -> Result<()> {
    let key = matches
        .get_one::<String>("key")
        .context("Key argument is required")?;
    let value = matches
        .get_one::<String>("value")
        .context("Value argument is required")?;

    if !KNOWN_KEYS.contains(&key.as_str()) {
        anyhow::bail!(
            "Unknown setting '{}'. Known settings: {}",
            key,
            KNOWN_KEYS.join(", ")
        );
    }

    let mut loaded = super::load_config(matches)?;
    loaded
        .config
        .set(key, value)
        .with_context(|| format!("Rejected value for '{}'", key))?;
    loaded
        .config
        .save_to(&loaded.path)
        .with_context(|| format!("Failed to write {}", loaded.path.display()))?;

    let shown = if key == CLOUD_TOKEN { "<hidden>" } else { value.as_str() };
    println!("{} {} = {}", "✓".green(), key, shown);
    Ok(())
}

fn reset(matches: &ArgMatches) -> Result<()> {
    let loaded = super::load_config(matches)?;
    Config::default()
        .save_to(&loaded.path)
        .with_context(|| format!("Failed to write {}", loaded.path.display()))?;

    println!("{} Settings reset to defaults", "✓".green());
    Ok(())
}
