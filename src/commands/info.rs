use anyhow::Result;
use clap::ArgMatches;
use colored::Colorize;

use crate::core::system_monitor::{Sampler, SamplerConfig};
use crate::ui::print_overview;

pub fn execute(matches: &ArgMatches) -> Result<()> {
    let config = super::load_config(matches)?.config;
    let mut sampler = Sampler::with_config(SamplerConfig {
        collect_gpu: false,
        collect_temperature: false,
        ..config.sampler_config()
    });

    let overview = sampler.system_overview();

    if matches.get_flag("json") {
        println!("{}", serde_json::to_string_pretty(&overview)?);
        return Ok(());
    }

    print_overview(&overview);
    println!(
        "  {}",
        format!("(disk totals for {})", sampler.disk_mount().display()).dimmed()
    );
    Ok(())
}
