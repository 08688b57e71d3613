use anyhow::Result;
use clap::ArgMatches;

use crate::core::system_monitor::Sampler;
use crate::ui::print_processes;

pub fn execute(matches: &ArgMatches) -> Result<()> {
    let config = super::load_config(matches)?.config;
    let limit = matches
        .get_one::<usize>("count")
        .copied()
        .unwrap_or(config.max_processes);

    let mut sampler = Sampler::with_config(config.sampler_config());

    // Per-process CPU usage is a delta between two refreshes
    sampler.top_processes(0);
    std::thread::sleep(sysinfo::MINIMUM_CPU_UPDATE_INTERVAL);
    let processes = sampler.top_processes(limit);

    if matches.get_flag("json") {
        println!("{}", serde_json::to_string_pretty(&processes)?);
    } else {
        print_processes(&processes);
    }
    Ok(())
}
