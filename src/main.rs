use anyhow::Result;
use clap::{Arg, ArgAction, Command};
use std::path::PathBuf;

use sysmon::commands;

fn json_flag() -> Arg {
    Arg::new("json")
        .long("json")
        .help("Print machine-readable JSON instead of a table")
        .action(ArgAction::SetTrue)
}

fn count_arg() -> Arg {
    Arg::new("count")
        .short('n')
        .long("count")
        .value_name("N")
        .help("Number of entries to show (default: from settings)")
        .value_parser(clap::value_parser!(usize))
}

fn main() -> Result<()> {
    let matches = Command::new("sysmon")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Samples system metrics, raises threshold alerts and keeps a rolling history")
        .disable_version_flag(true)
        .arg(
            Arg::new("version")
                .short('v')
                .short_alias('V')
                .long("version")
                .help("Print version information")
                .action(ArgAction::SetTrue)
        )
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .value_name("FILE")
                .help("Settings file to use instead of the default location")
                .global(true)
        )
        .arg(
            Arg::new("verbose")
                .long("verbose")
                .help("Enable debug logging")
                .action(ArgAction::SetTrue)
                .global(true)
        )
        .arg(
            Arg::new("log-file")
                .long("log-file")
                .value_name("FILE")
                .help("Append log output to FILE instead of stderr")
                .global(true)
        )
        .subcommand(
            Command::new("watch")
                .about("Sample continuously and raise alerts until Ctrl-C")
                .arg(
                    Arg::new("interval")
                        .short('i')
                        .long("interval")
                        .value_name("MS")
                        .help("Sampling interval in milliseconds (default: from settings)")
                        .value_parser(clap::value_parser!(u64))
                )
                .arg(
                    Arg::new("capacity")
                        .long("capacity")
                        .value_name("N")
                        .help("Number of samples kept in history (default: from settings)")
                        .value_parser(clap::value_parser!(usize))
                )
                .arg(
                    Arg::new("export")
                        .short('e')
                        .long("export")
                        .value_name("FILE")
                        .help("Export the history to FILE (.csv or .json) on exit")
                )
                .arg(
                    Arg::new("persist")
                        .long("persist")
                        .value_name("FILE")
                        .help("Rewrite the history to FILE (.csv or .json) while running")
                )
                .arg(
                    Arg::new("persist-every")
                        .long("persist-every")
                        .value_name("N")
                        .help("Persist after every N samples (default: 1)")
                        .value_parser(clap::value_parser!(u64))
                        .requires("persist")
                )
                .arg(
                    Arg::new("upload")
                        .long("upload")
                        .help("Upload each persisted file to the configured cloud endpoint")
                        .action(ArgAction::SetTrue)
                        .requires("persist")
                )
                .arg(
                    Arg::new("notifications")
                        .long("notifications")
                        .help("Print the notification log on exit")
                        .action(ArgAction::SetTrue)
                )
                .arg(
                    Arg::new("quiet")
                        .short('q')
                        .long("quiet")
                        .help("Do not print samples, only log alerts")
                        .action(ArgAction::SetTrue)
                )
                .arg(json_flag().help("Print one JSON object per sample"))
        )
        .subcommand(
            Command::new("snapshot")
                .about("Take one sample and evaluate alerts")
                .arg(json_flag())
        )
        .subcommand(
            Command::new("processes")
                .about("Show the processes using the most CPU")
                .arg(count_arg())
                .arg(json_flag())
        )
        .subcommand(
            Command::new("connections")
                .about("Show established network connections")
                .arg(count_arg())
                .arg(json_flag())
        )
        .subcommand(
            Command::new("info")
                .about("Show static system information")
                .arg(json_flag())
        )
        .subcommand(
            Command::new("config")
                .about("Inspect or change settings (use 'sysmon config --help' for subcommands)")
                .subcommand_required(true)
                .arg_required_else_help(true)
                .subcommand(Command::new("show").about("Print the effective settings"))
                .subcommand(Command::new("path").about("Print the settings file location"))
                .subcommand(
                    Command::new("set")
                        .about("Change one setting")
                        .arg(
                            Arg::new("key")
                                .help("Setting name, e.g. cpu_threshold")
                                .required(true)
                                .index(1)
                        )
                        .arg(
                            Arg::new("value")
                                .help("New value")
                                .required(true)
                                .index(2)
                        )
                )
                .subcommand(Command::new("reset").about("Restore default settings"))
        )
        .subcommand(
            Command::new("upload")
                .about("Upload a file to the configured cloud endpoint")
                .arg(
                    Arg::new("file")
                        .help("File to upload")
                        .required(true)
                        .index(1)
                )
                .arg(
                    Arg::new("key")
                        .short('k')
                        .long("key")
                        .value_name("KEY")
                        .help("Object key (default: the file name)")
                )
                .arg(
                    Arg::new("endpoint")
                        .long("endpoint")
                        .value_name("URL")
                        .help("Override the configured endpoint")
                )
        )
        .get_matches();

    if matches.get_flag("version") {
        println!("sysmon version {}", env!("CARGO_PKG_VERSION"));
        return Ok(());
    }

    let verbose = matches.get_flag("verbose");
    match matches.get_one::<String>("log-file") {
        Some(path) => sysmon::init_logging_to_file(&PathBuf::from(path), verbose)?,
        None => sysmon::init_logging(verbose),
    }

    match matches.subcommand() {
        Some(("watch", sub_matches)) => commands::watch::execute(sub_matches)?,
        Some(("snapshot", sub_matches)) => commands::snapshot::execute(sub_matches)?,
        Some(("processes", sub_matches)) => commands::processes::execute(sub_matches)?,
        Some(("connections", sub_matches)) => commands::connections::execute(sub_matches)?,
        Some(("info", sub_matches)) => commands::info::execute(sub_matches)?,
        Some(("config", sub_matches)) => commands::config::execute(sub_matches)?,
        Some(("upload", sub_matches)) => commands::upload::execute(sub_matches)?,
        _ => {
            println!("Welcome to sysmon!");
            println!("Use 'sysmon --help' for more information.");
        }
    }

    Ok(())
}
