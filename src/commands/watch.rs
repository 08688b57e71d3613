//! Continuous monitoring command.
//!
//! Samples on a fixed interval until Ctrl-C, printing each sample and
//! raising alerts. Optionally persists the history while running, uploads
//! each persisted file, and exports the final history on exit.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::ArgMatches;
use colored::Colorize;
use parking_lot::RwLock;
use tokio::sync::broadcast;

use crate::core::system_monitor::{DriverOptions, MonitorDriver, PersistPolicy, Sampler};
use crate::sinks::{
    export_history, CloudUploader, ConsoleNotifier, FanoutNotifier, LogNotifier, Notifier,
};
use crate::ui::{print_notifications, print_sample};

/// Execute the watch command
pub fn execute(matches: &ArgMatches) -> Result<()> {
    let config = super::load_config(matches)?.config;

    let interval = matches
        .get_one::<u64>("interval")
        .copied()
        .map(Duration::from_millis)
        .unwrap_or_else(|| config.interval());
    let capacity = matches
        .get_one::<usize>("capacity")
        .copied()
        .unwrap_or(config.history_capacity);
    let export_path = matches.get_one::<String>("export").map(PathBuf::from);
    let persist_path = matches.get_one::<String>("persist").map(PathBuf::from);
    let persist_every = matches.get_one::<u64>("persist-every").copied().unwrap_or(1);
    let upload = matches.get_flag("upload");
    let json_output = matches.get_flag("json");
    let quiet = matches.get_flag("quiet");
    let show_notifications = matches.get_flag("notifications");

    if interval.is_zero() {
        anyhow::bail!("Interval must be greater than zero");
    }

    let thresholds = Arc::new(RwLock::new(config.thresholds()));

    let notifier: Box<dyn Notifier> = if quiet || json_output {
        Box::new(LogNotifier)
    } else {
        Box::new(FanoutNotifier::new(vec![
            Box::new(LogNotifier),
            Box::new(ConsoleNotifier),
        ]))
    };

    let runtime = super::build_runtime()?;

    let uploader = if upload {
        if persist_path.is_none() {
            anyhow::bail!("--upload requires --persist <file>");
        }
        let target = super::upload::cloud_target(&config, None)?;
        Some(CloudUploader::new(target, config.upload_timeout())?)
    } else {
        None
    };

    let options = DriverOptions {
        interval,
        persist: persist_path.map(|path| PersistPolicy {
            path,
            every: persist_every,
        }),
        uploader,
    };

    let mut sampler = Sampler::with_config(config.sampler_config());
    // Prime CPU counters so the first sample is meaningful
    sampler.sample();
    std::thread::sleep(sysinfo::MINIMUM_CPU_UPDATE_INTERVAL);

    let driver = MonitorDriver::new(sampler, capacity, thresholds.clone(), notifier, options);
    let notifications = driver.notifications();
    let mut snapshots = driver.subscribe();

    let (shutdown_tx, shutdown_rx) = broadcast::channel::<()>(1);
    let ctrlc_tx = shutdown_tx.clone();
    ctrlc::set_handler(move || {
        let _ = ctrlc_tx.send(());
    })
    .context("Failed to install Ctrl-C handler")?;

    if !quiet && !json_output {
        println!(
            "{} every {} ms, history of {} samples. Press Ctrl-C to stop.",
            "Monitoring".bold().green(),
            interval.as_millis(),
            capacity.max(1)
        );
    }

    // Display works on snapshot copies and never touches the monitor itself
    let display_thresholds = thresholds.clone();
    let display = runtime.spawn(async move {
        while snapshots.changed().await.is_ok() {
            let history = snapshots.borrow_and_update().clone();
            let Some(sample) = history.latest() else {
                continue;
            };

            if json_output {
                match serde_json::to_string(sample) {
                    Ok(line) => println!("{}", line),
                    Err(e) => log::error!("Failed to serialize sample: {}", e),
                }
            } else if !quiet {
                println!();
                print_sample(sample, &display_thresholds.read());
            }
        }
    });

    let report = runtime.block_on(async move {
        let report = driver.run(shutdown_rx).await;
        let _ = display.await;
        report
    });

    log::info!(
        "Stopped after {} samples, {} alerts, {} uploads ok, {} uploads failed",
        report.samples,
        report.alerts,
        report.uploads_succeeded,
        report.uploads_failed
    );

    if !json_output {
        println!(
            "\n{} {} samples, {} alerts",
            "Stopped:".bold(),
            report.samples,
            report.alerts
        );
        if report.uploads_succeeded + report.uploads_failed > 0 {
            println!(
                "  uploads: {} ok, {} failed",
                report.uploads_succeeded, report.uploads_failed
            );
        }
        if show_notifications {
            print_notifications(notifications.lock().iter());
        }
    }

    if let Some(path) = export_path {
        export_history(&path, &report.history)
            .with_context(|| format!("Failed to export history to {}", path.display()))?;
        if !json_output {
            println!(
                "{} Saved {} samples to {}",
                "✓".green(),
                report.history.len(),
                path.display()
            );
        }
    }

    Ok(())
}
