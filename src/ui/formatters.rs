use colored::*;
use humansize::{format_size, BINARY};

use crate::core::system_monitor::{
    Alert, ConnectionInfo, Notification, ProcessInfo, Sample, SystemOverview, ThresholdConfig,
};

const BAR_WIDTH: usize = 30;

/// Format a byte count in binary units (KiB, MiB, GiB)
pub fn format_bytes(bytes: u64) -> String {
    format_size(bytes, BINARY)
}

/// Create a usage bar, red above `threshold` and yellow within 10 points of it
pub fn usage_bar(usage_percent: f32, threshold: f32, width: usize) -> String {
    let clamped = usage_percent.clamp(0.0, 100.0);
    let filled = ((clamped / 100.0) * width as f32).round() as usize;
    let empty = width.saturating_sub(filled);

    let bar = format!("{}{}", "█".repeat(filled), "░".repeat(empty));

    let colored_bar = if usage_percent > threshold {
        bar.red()
    } else if usage_percent > threshold - 10.0 {
        bar.yellow()
    } else {
        bar.green()
    };

    format!("[{}]", colored_bar)
}

fn print_section_header(title: &str) {
    println!("\n{}", title.bold().green());
    println!("{}", "-".repeat(title.len()));
}

pub fn print_sample(sample: &Sample, thresholds: &ThresholdConfig) {
    println!(
        "{}",
        sample
            .timestamp
            .with_timezone(&chrono::Local)
            .format("%Y-%m-%d %H:%M:%S")
            .to_string()
            .dimmed()
    );

    println!(
        "  {:<8} {} {:>5.1}%",
        "CPU",
        usage_bar(sample.cpu_percent, thresholds.cpu, BAR_WIDTH),
        sample.cpu_percent
    );
    println!(
        "  {:<8} {} {:>5.1}%  {} / {}",
        "Memory",
        usage_bar(sample.memory.percent, thresholds.memory, BAR_WIDTH),
        sample.memory.percent,
        format_bytes(sample.memory.used_bytes),
        format_bytes(sample.memory.total_bytes)
    );
    println!(
        "  {:<8} {} {:>5.1}%  {} / {}",
        "Disk",
        usage_bar(sample.disk.percent, thresholds.disk, BAR_WIDTH),
        sample.disk.percent,
        format_bytes(sample.disk.used_bytes),
        format_bytes(sample.disk.total_bytes)
    );

    match sample.gpu {
        Some(ref gpu) => {
            println!(
                "  {:<8} {} {:>5.1}%",
                "GPU",
                usage_bar(gpu.usage_percent, thresholds.gpu, BAR_WIDTH),
                gpu.usage_percent
            );
            if let Some(memory_percent) = gpu.memory_percent() {
                println!(
                    "  {:<8} {} {:>5.1}%  {} / {}",
                    "GPU Mem",
                    usage_bar(memory_percent, thresholds.gpu_memory, BAR_WIDTH),
                    memory_percent,
                    format_bytes(gpu.memory_used_bytes),
                    format_bytes(gpu.memory_total_bytes)
                );
            }
            if let Some(temp) = gpu.temperature_celsius {
                println!("  {:<8} {:.0}°C", "GPU Temp", temp);
            }
        }
        None => println!("  {:<8} {}", "GPU", "not available".dimmed()),
    }

    match sample.cpu_temperature {
        Some(temp) => println!("  {:<8} {:.1}°C", "CPU Temp", temp),
        None => println!("  {:<8} {}", "CPU Temp", "not available".dimmed()),
    }
}

pub fn print_alerts(alerts: &[Alert]) {
    for alert in alerts {
        println!("  {} {}", alert.title().red().bold(), alert.message);
    }
}

pub fn print_processes(processes: &[ProcessInfo]) {
    print_section_header("Processes");

    if processes.is_empty() {
        println!("  {}", "No processes found".dimmed());
        return;
    }

    println!(
        "  {:>8}  {:<28} {:>8}  {:>12}",
        "PID".bold(),
        "Name".bold(),
        "CPU (%)".bold(),
        "Memory".bold()
    );
    for proc in processes {
        println!(
            "  {:>8}  {:<28} {:>8.1}  {:>12}",
            proc.pid,
            truncate(&proc.name, 28),
            proc.cpu_percent,
            format_bytes(proc.memory_bytes)
        );
    }
}

pub fn print_connections(connections: &[ConnectionInfo]) {
    print_section_header("Network");

    if connections.is_empty() {
        println!("  {}", "No established connections".dimmed());
        return;
    }

    println!(
        "  {:<46} {:<46} {:<12} {:>8}",
        "Local Address".bold(),
        "Remote Address".bold(),
        "Status".bold(),
        "PID".bold()
    );
    for conn in connections {
        let remote = conn
            .remote_address
            .map(|a| a.to_string())
            .unwrap_or_else(|| "N/A".to_string());
        let pid = conn
            .pid
            .map(|p| p.to_string())
            .unwrap_or_else(|| "-".to_string());
        println!(
            "  {:<46} {:<46} {:<12} {:>8}",
            conn.local_address.to_string(),
            remote,
            conn.status.as_str(),
            pid
        );
    }
}

pub fn print_overview(overview: &SystemOverview) {
    print_section_header("System Info");

    println!("  OS: {} {}", overview.os_name, overview.os_version);
    println!("  Kernel: {}", overview.kernel_version);
    println!("  Hostname: {}", overview.hostname);
    match overview.physical_cores {
        Some(cores) => println!("  CPU Cores: {}", cores),
        None => println!("  CPU Cores: unknown"),
    }
    println!("  Logical CPUs: {}", overview.logical_cpus);
    println!("  Total Memory: {}", format_bytes(overview.total_memory_bytes));
    println!("  Total Disk: {}", format_bytes(overview.total_disk_bytes));
}

pub fn print_notifications<'a>(notifications: impl IntoIterator<Item = &'a Notification>) {
    print_section_header("Notifications");

    let mut any = false;
    for notification in notifications {
        any = true;
        println!("  {}", notification);
    }
    if !any {
        println!("  {}", "No notifications".dimmed());
    }
}

fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        text.to_string()
    } else {
        let cut: String = text.chars().take(max.saturating_sub(1)).collect();
        format!("{}…", cut)
    }
}
