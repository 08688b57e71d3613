//! System monitoring core functionality.
//!
//! The pipeline is `Sampler::sample` -> `Monitor::record` -> alerts. The
//! sampler reads OS state, the monitor keeps a bounded history and checks
//! thresholds, and the runtime drives both from a ticker.

pub mod alerts;
pub mod connections;
mod gpu;
mod history;
mod metrics;
mod monitor;
pub mod notifications;
pub mod runtime;
mod sampler;

pub use alerts::{evaluate_alerts, Alert, AlertKind, ThresholdConfig};
pub use connections::select_established;
pub use gpu::GpuProvider;
pub use history::{History, HistoryDocument, HistoryRow, DEFAULT_HISTORY_SIZE};
pub use metrics::{
    ConnectionInfo, ConnectionStatus, DiskUsage, GpuUsage, MemoryUsage, ProcessInfo, Sample,
    SystemOverview,
};
pub use monitor::Monitor;
pub use notifications::{Notification, NotificationLog};
pub use runtime::{DriverOptions, DriverReport, MonitorDriver, PersistPolicy, SharedThresholds};
pub use sampler::{pick_cpu_temperature, select_top_processes, SampleSource, Sampler, SamplerConfig};
