use std::net::SocketAddr;

use sysmon::core::system_monitor::{
    evaluate_alerts, pick_cpu_temperature, select_established, select_top_processes, AlertKind,
    ConnectionInfo, ConnectionStatus, DiskUsage, GpuUsage, MemoryUsage, Monitor, NotificationLog,
    ProcessInfo, Sample, ThresholdConfig,
};

fn sample(cpu: f32, memory: f32, disk: f32) -> Sample {
    Sample {
        timestamp: chrono::Utc::now(),
        cpu_percent: cpu,
        memory: MemoryUsage {
            percent: memory,
            used_bytes: 0,
            total_bytes: 0,
        },
        disk: DiskUsage {
            percent: disk,
            used_bytes: 0,
            total_bytes: 0,
        },
        gpu: None,
        cpu_temperature: None,
    }
}

#[test]
fn test_history_keeps_most_recent_samples() {
    let mut monitor = Monitor::new(3);
    let thresholds = ThresholdConfig::default();

    for cpu in [10.0, 20.0, 30.0, 40.0] {
        assert!(monitor.record(sample(cpu, 0.0, 0.0), &thresholds).is_empty());
    }

    let cpu: Vec<f32> = monitor.history().iter().map(|s| s.cpu_percent).collect();
    assert_eq!(cpu, [20.0, 30.0, 40.0]);
    assert!(monitor.history().is_full());
}

#[test]
fn test_alerts_in_fixed_order_and_logged() {
    let mut monitor = Monitor::new(10);
    let thresholds = ThresholdConfig::default();

    let mut high = sample(95.0, 85.0, 81.0);
    high.gpu = Some(GpuUsage {
        usage_percent: 99.0,
        memory_used_bytes: 7 * 1024 * 1024 * 1024,
        memory_total_bytes: 8 * 1024 * 1024 * 1024,
        temperature_celsius: Some(70.0),
    });

    let alerts = monitor.record(high, &thresholds);
    let kinds: Vec<AlertKind> = alerts.iter().map(|a| a.kind).collect();
    assert_eq!(kinds, AlertKind::ALL);
    assert_eq!(alerts[0].message, "CPU usage is high: 95.0%");

    let mut log = NotificationLog::new();
    for alert in &alerts {
        log.push(alert);
    }
    assert_eq!(log.len(), 5);
    assert_eq!(log.filter(AlertKind::GpuMemory).len(), 1);
    assert_eq!(log.filter(AlertKind::GpuMemory)[0].title, "GPU Memory Alert");
}

#[test]
fn test_value_equal_to_threshold_does_not_alert() {
    let thresholds = ThresholdConfig::default();
    assert!(evaluate_alerts(&sample(80.0, 80.0, 80.0), &thresholds).is_empty());
    assert_eq!(evaluate_alerts(&sample(80.1, 0.0, 0.0), &thresholds).len(), 1);
}

#[test]
fn test_top_processes_and_connections_selection() {
    let processes = vec![
        ProcessInfo {
            pid: 1,
            name: "init".into(),
            cpu_percent: 0.5,
            memory_bytes: 1024,
        },
        ProcessInfo {
            pid: 42,
            name: "build".into(),
            cpu_percent: 180.0,
            memory_bytes: 4096,
        },
        ProcessInfo {
            pid: 7,
            name: "editor".into(),
            cpu_percent: 12.0,
            memory_bytes: 2048,
        },
    ];
    let top = select_top_processes(processes, 2);
    let pids: Vec<u32> = top.iter().map(|p| p.pid).collect();
    assert_eq!(pids, [42, 7]);

    let local: SocketAddr = "127.0.0.1:5000".parse().unwrap();
    let remote: SocketAddr = "10.0.0.2:443".parse().unwrap();
    let connections = vec![
        ConnectionInfo {
            local_address: local,
            remote_address: None,
            status: ConnectionStatus::Listen,
            pid: Some(10),
        },
        ConnectionInfo {
            local_address: local,
            remote_address: Some(remote),
            status: ConnectionStatus::Established,
            pid: Some(11),
        },
    ];
    let established = select_established(connections, 10);
    assert_eq!(established.len(), 1);
    assert_eq!(established[0].remote_address, Some(remote));
}

#[test]
fn test_cpu_temperature_prefers_coretemp() {
    let readings = [
        ("acpitz temp1", Some(45.0)),
        ("k10temp Tctl", Some(60.0)),
        ("coretemp Package id 0", Some(52.0)),
    ];
    assert_eq!(pick_cpu_temperature(readings), Some(52.0));
    assert_eq!(pick_cpu_temperature([("nvme Composite", Some(40.0))]), None);
}
