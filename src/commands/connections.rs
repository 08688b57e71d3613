use anyhow::Result;
use clap::ArgMatches;

use crate::core::system_monitor::{Sampler, SamplerConfig};
use crate::ui::print_connections;

pub fn execute(matches: &ArgMatches) -> Result<()> {
    let config = super::load_config(matches)?.config;
    let limit = matches
        .get_one::<usize>("count")
        .copied()
        .unwrap_or(config.max_connections);

    let sampler = Sampler::with_config(SamplerConfig {
        collect_gpu: false,
        collect_temperature: false,
        ..config.sampler_config()
    });
    let established = sampler.active_connections(limit);

    if matches.get_flag("json") {
        println!("{}", serde_json::to_string_pretty(&established)?);
    } else {
        print_connections(&established);
    }
    Ok(())
}
