//! Single sample, printed once.

use anyhow::Result;
use clap::ArgMatches;

use crate::core::system_monitor::{evaluate_alerts, Sampler};
use crate::ui::{print_alerts, print_sample};

pub fn execute(matches: &ArgMatches) -> Result<()> {
    let loaded = super::load_config(matches)?;
    let config = loaded.config;
    let json_output = matches.get_flag("json");

    let mut sampler = Sampler::with_config(config.sampler_config());

    // CPU usage needs two refreshes spaced by at least this interval
    std::thread::sleep(sysinfo::MINIMUM_CPU_UPDATE_INTERVAL);
    let sample = sampler.sample();

    if json_output {
        println!("{}", serde_json::to_string_pretty(&sample)?);
        return Ok(());
    }

    let thresholds = config.thresholds();
    print_sample(&sample, &thresholds);
    print_alerts(&evaluate_alerts(&sample, &thresholds));
    Ok(())
}
