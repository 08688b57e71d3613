use std::net::SocketAddr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One timestamped snapshot of system metrics
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    pub timestamp: DateTime<Utc>,
    pub cpu_percent: f32,
    pub memory: MemoryUsage,
    pub disk: DiskUsage,
    pub gpu: Option<GpuUsage>,
    pub cpu_temperature: Option<f32>, // °C
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct MemoryUsage {
    pub percent: f32,
    pub used_bytes: u64,
    pub total_bytes: u64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct DiskUsage {
    pub percent: f32,
    pub used_bytes: u64,
    pub total_bytes: u64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct GpuUsage {
    pub usage_percent: f32,
    pub memory_used_bytes: u64,
    pub memory_total_bytes: u64,
    pub temperature_celsius: Option<f32>,
}

impl GpuUsage {
    /// Memory usage as a percentage, `None` when the device reports no memory
    pub fn memory_percent(&self) -> Option<f32> {
        if self.memory_total_bytes == 0 {
            return None;
        }
        Some((self.memory_used_bytes as f64 / self.memory_total_bytes as f64 * 100.0) as f32)
    }
}

/// Compute `used / total` as a percentage, 0 when total is 0
pub(crate) fn percent_of(used: u64, total: u64) -> f32 {
    if total > 0 {
        (used as f64 / total as f64 * 100.0) as f32
    } else {
        0.0
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessInfo {
    pub pid: u32,
    pub name: String,
    pub cpu_percent: f32,
    pub memory_bytes: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConnectionInfo {
    pub local_address: SocketAddr,
    pub remote_address: Option<SocketAddr>,
    pub status: ConnectionStatus,
    pub pid: Option<u32>,
}

/// TCP socket state as reported by the kernel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConnectionStatus {
    Established,
    SynSent,
    SynRecv,
    FinWait1,
    FinWait2,
    TimeWait,
    Close,
    CloseWait,
    LastAck,
    Listen,
    Closing,
    Unknown,
}

impl ConnectionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConnectionStatus::Established => "ESTABLISHED",
            ConnectionStatus::SynSent => "SYN_SENT",
            ConnectionStatus::SynRecv => "SYN_RECV",
            ConnectionStatus::FinWait1 => "FIN_WAIT1",
            ConnectionStatus::FinWait2 => "FIN_WAIT2",
            ConnectionStatus::TimeWait => "TIME_WAIT",
            ConnectionStatus::Close => "CLOSE",
            ConnectionStatus::CloseWait => "CLOSE_WAIT",
            ConnectionStatus::LastAck => "LAST_ACK",
            ConnectionStatus::Listen => "LISTEN",
            ConnectionStatus::Closing => "CLOSING",
            ConnectionStatus::Unknown => "UNKNOWN",
        }
    }
}

impl std::fmt::Display for ConnectionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Static host description
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SystemOverview {
    pub os_name: String,
    pub os_version: String,
    pub kernel_version: String,
    pub hostname: String,
    pub physical_cores: Option<usize>,
    pub logical_cpus: usize,
    pub total_memory_bytes: u64,
    pub total_disk_bytes: u64,
}
