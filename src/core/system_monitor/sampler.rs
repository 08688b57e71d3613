use std::cmp::Ordering;
use std::path::{Path, PathBuf};

use sysinfo::{
    Components, CpuRefreshKind, Disks, MemoryRefreshKind, ProcessRefreshKind, ProcessesToUpdate,
    RefreshKind, System,
};

use crate::platform::gpu::get_gpu_provider;

use super::connections::{collect_connections, select_established};
use super::gpu::GpuProvider;
use super::metrics::*;

/// Sensor chips whose first reading is reported as the CPU temperature
const CPU_SENSOR_CHIPS: [&str; 2] = ["coretemp", "k10temp"];

/// Anything that can produce a [`Sample`] on demand
pub trait SampleSource: Send {
    fn sample(&mut self) -> Sample;
}

/// Configuration for the sampler
#[derive(Debug, Clone)]
pub struct SamplerConfig {
    pub disk_mount: PathBuf,
    pub collect_gpu: bool,
    pub collect_temperature: bool,
}

impl Default for SamplerConfig {
    fn default() -> Self {
        Self {
            disk_mount: default_disk_mount(),
            collect_gpu: true,
            collect_temperature: true,
        }
    }
}

fn default_disk_mount() -> PathBuf {
    if cfg!(windows) {
        PathBuf::from("C:\\")
    } else {
        PathBuf::from("/")
    }
}

/// Collects system metrics from the OS
pub struct Sampler {
    system: System,
    components: Components,
    disks: Disks,
    gpu_provider: Option<Box<dyn GpuProvider>>,
    config: SamplerConfig,
}

impl Sampler {
    /// Create a new Sampler with default configuration
    pub fn new() -> Self {
        Self::with_config(SamplerConfig::default())
    }

    /// Create a new Sampler with custom configuration
    pub fn with_config(config: SamplerConfig) -> Self {
        let refresh_kind = RefreshKind::nothing()
            .with_cpu(CpuRefreshKind::nothing().with_cpu_usage())
            .with_memory(MemoryRefreshKind::nothing().with_ram());

        let system = System::new_with_specifics(refresh_kind);
        let components = Components::new_with_refreshed_list();
        let disks = Disks::new_with_refreshed_list();

        // Try to initialize GPU provider (graceful failure)
        let gpu_provider = if config.collect_gpu {
            match get_gpu_provider() {
                Ok(provider) => {
                    log::info!("GPU monitoring enabled: {}", provider.name());
                    Some(provider)
                }
                Err(e) => {
                    log::info!("GPU monitoring disabled: {}", e);
                    None
                }
            }
        } else {
            None
        };

        Self {
            system,
            components,
            disks,
            gpu_provider,
            config,
        }
    }

    /// Attach a specific GPU provider, replacing any detected one
    pub fn with_gpu_provider(mut self, provider: Box<dyn GpuProvider>) -> Self {
        self.gpu_provider = Some(provider);
        self
    }

    /// Take one snapshot. Unavailable GPU or temperature data yields `None`.
    pub fn sample(&mut self) -> Sample {
        self.system.refresh_cpu_usage();
        self.system.refresh_memory();

        Sample {
            timestamp: chrono::Utc::now(),
            cpu_percent: self.system.global_cpu_usage(),
            memory: self.collect_memory(),
            disk: self.collect_disk(),
            gpu: self.collect_gpu(),
            cpu_temperature: self.collect_cpu_temperature(),
        }
    }

    /// Up to `limit` processes by descending CPU usage
    pub fn top_processes(&mut self, limit: usize) -> Vec<ProcessInfo> {
        self.system.refresh_processes_specifics(
            ProcessesToUpdate::All,
            true,
            ProcessRefreshKind::nothing().with_cpu().with_memory(),
        );

        // Processes that exited since the last refresh were dropped above
        let mut processes: Vec<ProcessInfo> = self
            .system
            .processes()
            .values()
            .map(|proc| ProcessInfo {
                pid: proc.pid().as_u32(),
                name: proc.name().to_string_lossy().to_string(),
                cpu_percent: proc.cpu_usage(),
                memory_bytes: proc.memory(),
            })
            .collect();

        // Enumeration order is ascending pid
        processes.sort_by_key(|p| p.pid);

        select_top_processes(processes, limit)
    }

    /// Up to `limit` established TCP connections
    pub fn active_connections(&self, limit: usize) -> Vec<ConnectionInfo> {
        select_established(collect_connections(), limit)
    }

    /// Static host description
    pub fn system_overview(&mut self) -> SystemOverview {
        self.disks.refresh(true);

        SystemOverview {
            os_name: System::name().unwrap_or_else(|| "Unknown".to_string()),
            os_version: System::long_os_version().unwrap_or_default(),
            kernel_version: System::kernel_version().unwrap_or_default(),
            hostname: System::host_name().unwrap_or_else(|| "Unknown".to_string()),
            physical_cores: System::physical_core_count(),
            logical_cpus: self.system.cpus().len(),
            total_memory_bytes: self.system.total_memory(),
            total_disk_bytes: self
                .find_disk()
                .map(|disk| disk.total_space())
                .unwrap_or(0),
        }
    }

    fn collect_memory(&self) -> MemoryUsage {
        let total = self.system.total_memory();
        let used = self.system.used_memory();

        MemoryUsage {
            percent: percent_of(used, total),
            used_bytes: used,
            total_bytes: total,
        }
    }

    fn collect_disk(&mut self) -> DiskUsage {
        self.disks.refresh(true);

        let Some(disk) = self.find_disk() else {
            return DiskUsage::default();
        };

        let total = disk.total_space();
        let used = total.saturating_sub(disk.available_space());

        DiskUsage {
            percent: percent_of(used, total),
            used_bytes: used,
            total_bytes: total,
        }
    }

    fn find_disk(&self) -> Option<&sysinfo::Disk> {
        let mount = self.config.disk_mount.as_path();
        self.disks
            .iter()
            .find(|disk| disk.mount_point() == mount)
            .or_else(|| self.disks.iter().next())
    }

    fn collect_gpu(&mut self) -> Option<GpuUsage> {
        let provider = self.gpu_provider.as_mut()?;
        match provider.collect_usage() {
            Ok(usage) => Some(usage),
            Err(e) => {
                log::debug!("GPU sample skipped: {}", e);
                None
            }
        }
    }

    fn collect_cpu_temperature(&mut self) -> Option<f32> {
        if !self.config.collect_temperature {
            return None;
        }

        self.components.refresh(true);
        pick_cpu_temperature(
            self.components
                .iter()
                .map(|comp| (comp.label(), comp.temperature())),
        )
    }

    pub fn disk_mount(&self) -> &Path {
        &self.config.disk_mount
    }
}

impl Default for Sampler {
    fn default() -> Self {
        Self::new()
    }
}

impl SampleSource for Sampler {
    fn sample(&mut self) -> Sample {
        Sampler::sample(self)
    }
}

/// Keep the `limit` busiest processes. The sort is stable, so processes with
/// equal CPU usage keep their input order.
pub fn select_top_processes(mut processes: Vec<ProcessInfo>, limit: usize) -> Vec<ProcessInfo> {
    processes.sort_by(|a, b| {
        b.cpu_percent
            .partial_cmp(&a.cpu_percent)
            .unwrap_or(Ordering::Equal)
    });

    processes.truncate(limit);
    processes
}

/// First reading from a known CPU sensor chip
pub fn pick_cpu_temperature<'a>(
    readings: impl IntoIterator<Item = (&'a str, Option<f32>)>,
) -> Option<f32> {
    let readings: Vec<_> = readings.into_iter().collect();

    CPU_SENSOR_CHIPS.iter().find_map(|chip| {
        readings.iter().find_map(|(label, temp)| {
            if label.to_ascii_lowercase().contains(chip) {
                *temp
            } else {
                None
            }
        })
    })
}
