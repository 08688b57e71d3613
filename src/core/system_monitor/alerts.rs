//! Alert system for monitoring critical conditions.
//!
//! Evaluates a sample against configured thresholds and generates alerts.
//! A metric alerts on every evaluation where it is strictly above its
//! threshold; there is no suppression between consecutive evaluations.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::metrics::Sample;

/// Per-metric alert thresholds, in percent
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ThresholdConfig {
    pub cpu: f32,
    pub memory: f32,
    pub disk: f32,
    pub gpu: f32,
    pub gpu_memory: f32,
}

impl Default for ThresholdConfig {
    fn default() -> Self {
        Self {
            cpu: 80.0,
            memory: 80.0,
            disk: 80.0,
            gpu: 80.0,
            gpu_memory: 80.0,
        }
    }
}

impl ThresholdConfig {
    pub fn get(&self, kind: AlertKind) -> f32 {
        match kind {
            AlertKind::Cpu => self.cpu,
            AlertKind::Memory => self.memory,
            AlertKind::Disk => self.disk,
            AlertKind::Gpu => self.gpu,
            AlertKind::GpuMemory => self.gpu_memory,
        }
    }
}

/// Metric an alert refers to. Declaration order is evaluation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertKind {
    Cpu,
    Memory,
    Disk,
    Gpu,
    GpuMemory,
}

impl AlertKind {
    pub const ALL: [AlertKind; 5] = [
        AlertKind::Cpu,
        AlertKind::Memory,
        AlertKind::Disk,
        AlertKind::Gpu,
        AlertKind::GpuMemory,
    ];

    /// Notification title
    pub fn title(&self) -> &'static str {
        match self {
            AlertKind::Cpu => "CPU Alert",
            AlertKind::Memory => "Memory Alert",
            AlertKind::Disk => "Disk Alert",
            AlertKind::Gpu => "GPU Alert",
            AlertKind::GpuMemory => "GPU Memory Alert",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            AlertKind::Cpu => "cpu",
            AlertKind::Memory => "memory",
            AlertKind::Disk => "disk",
            AlertKind::Gpu => "gpu",
            AlertKind::GpuMemory => "gpu_memory",
        }
    }
}

impl std::fmt::Display for AlertKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for AlertKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        AlertKind::ALL
            .into_iter()
            .find(|kind| kind.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unknown alert kind '{}'", s))
    }
}

/// An individual alert
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Alert {
    pub kind: AlertKind,
    pub message: String,
    pub value: f32,
    pub threshold: f32,
    pub timestamp: DateTime<Utc>,
}

impl Alert {
    pub fn title(&self) -> &'static str {
        self.kind.title()
    }
}

const BYTES_PER_MB: f64 = 1024.0 * 1024.0;

/// Evaluate a sample and generate alerts in fixed metric order
pub fn evaluate_alerts(sample: &Sample, thresholds: &ThresholdConfig) -> Vec<Alert> {
    let mut alerts = Vec::new();

    let mut check = |kind: AlertKind, value: f32, message: String| {
        let threshold = thresholds.get(kind);
        if value > threshold {
            alerts.push(Alert {
                kind,
                message,
                value,
                threshold,
                timestamp: sample.timestamp,
            });
        }
    };

    check(
        AlertKind::Cpu,
        sample.cpu_percent,
        format!("CPU usage is high: {:.1}%", sample.cpu_percent),
    );
    check(
        AlertKind::Memory,
        sample.memory.percent,
        format!("Memory usage is high: {:.1}%", sample.memory.percent),
    );
    check(
        AlertKind::Disk,
        sample.disk.percent,
        format!("Disk usage is high: {:.1}%", sample.disk.percent),
    );

    if let Some(ref gpu) = sample.gpu {
        check(
            AlertKind::Gpu,
            gpu.usage_percent,
            format!("GPU usage is high: {:.1}%", gpu.usage_percent),
        );

        if let Some(memory_percent) = gpu.memory_percent() {
            check(
                AlertKind::GpuMemory,
                memory_percent,
                format!(
                    "GPU memory usage is high: {:.0} MB / {:.0} MB",
                    gpu.memory_used_bytes as f64 / BYTES_PER_MB,
                    gpu.memory_total_bytes as f64 / BYTES_PER_MB
                ),
            );
        }
    }

    alerts
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::system_monitor::{DiskUsage, GpuUsage, MemoryUsage};

    fn sample_with_cpu(cpu: f32) -> Sample {
        Sample {
            cpu_percent: cpu,
            ..Default::default()
        }
    }

    fn gpu(usage: f32, used_mb: u64, total_mb: u64) -> GpuUsage {
        GpuUsage {
            usage_percent: usage,
            memory_used_bytes: used_mb * 1024 * 1024,
            memory_total_bytes: total_mb * 1024 * 1024,
            temperature_celsius: None,
        }
    }

    #[test]
    fn test_cpu_alert() {
        let thresholds = ThresholdConfig {
            cpu: 80.0,
            ..Default::default()
        };

        let alerts = evaluate_alerts(&sample_with_cpu(85.0), &thresholds);
        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].kind, AlertKind::Cpu);
        assert_eq!(alerts[0].value, 85.0);
        assert_eq!(alerts[0].threshold, 80.0);
        assert_eq!(alerts[0].title(), "CPU Alert");
        assert_eq!(alerts[0].message, "CPU usage is high: 85.0%");
    }

    #[test]
    fn test_threshold_is_strict() {
        let thresholds = ThresholdConfig {
            cpu: 80.0,
            ..Default::default()
        };
        assert!(evaluate_alerts(&sample_with_cpu(80.0), &thresholds).is_empty());
    }

    #[test]
    fn test_no_alerts() {
        let alerts = evaluate_alerts(&Sample::default(), &ThresholdConfig::default());
        assert!(alerts.is_empty());
    }

    #[test]
    fn test_alerts_in_fixed_order() {
        let thresholds = ThresholdConfig {
            cpu: 10.0,
            memory: 10.0,
            disk: 10.0,
            gpu: 10.0,
            gpu_memory: 10.0,
        };
        let sample = Sample {
            cpu_percent: 50.0,
            memory: MemoryUsage {
                percent: 50.0,
                ..Default::default()
            },
            disk: DiskUsage {
                percent: 50.0,
                ..Default::default()
            },
            gpu: Some(gpu(50.0, 500, 1000)),
            ..Default::default()
        };

        let kinds: Vec<_> = evaluate_alerts(&sample, &thresholds)
            .into_iter()
            .map(|a| a.kind)
            .collect();
        assert_eq!(kinds, AlertKind::ALL.to_vec());
    }

    #[test]
    fn test_gpu_absent_never_alerts() {
        let thresholds = ThresholdConfig {
            gpu: 0.0,
            gpu_memory: 0.0,
            ..Default::default()
        };
        let alerts = evaluate_alerts(&sample_with_cpu(5.0), &thresholds);
        assert!(alerts.is_empty());
    }

    #[test]
    fn test_gpu_memory_ratio() {
        let thresholds = ThresholdConfig {
            gpu_memory: 80.0,
            ..Default::default()
        };
        let sample = Sample {
            gpu: Some(gpu(0.0, 7000, 8000)),
            ..Default::default()
        };

        let alerts = evaluate_alerts(&sample, &thresholds);
        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].kind, AlertKind::GpuMemory);
        assert_eq!(alerts[0].value, 87.5);
        assert_eq!(alerts[0].message, "GPU memory usage is high: 7000 MB / 8000 MB");
    }

    #[test]
    fn test_gpu_memory_zero_total_not_triggered() {
        let thresholds = ThresholdConfig {
            gpu_memory: 0.0,
            ..Default::default()
        };
        let sample = Sample {
            gpu: Some(gpu(0.0, 100, 0)),
            ..Default::default()
        };
        assert!(evaluate_alerts(&sample, &thresholds).is_empty());
    }

    #[test]
    fn test_alert_kind_parse() {
        assert_eq!("gpu_memory".parse::<AlertKind>(), Ok(AlertKind::GpuMemory));
        assert_eq!("CPU".parse::<AlertKind>(), Ok(AlertKind::Cpu));
        assert!("network".parse::<AlertKind>().is_err());
    }
}
