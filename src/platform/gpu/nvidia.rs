#[cfg(feature = "nvml")]
use nvml_wrapper::{enum_wrappers::device::TemperatureSensor, Device, Nvml};

use crate::core::system_monitor::{GpuProvider, GpuUsage};
use crate::error::{MonitorError, Result};

/// NVIDIA GPU provider using NVML
pub struct NvidiaGpuProvider {
    #[cfg(feature = "nvml")]
    nvml: Nvml,
    device_index: u32,
}

impl NvidiaGpuProvider {
    /// Create a new NVIDIA GPU provider
    ///
    /// Initializes NVML and selects the first available GPU.
    pub fn new() -> Result<Self> {
        Self::with_device_index(0)
    }

    /// Create provider for a specific GPU index
    pub fn with_device_index(index: u32) -> Result<Self> {
        #[cfg(feature = "nvml")]
        {
            let nvml = Nvml::init().map_err(|e| {
                MonitorError::gpu_not_available(format!("Failed to init NVML: {}", e))
            })?;

            // Verify device exists
            let _ = nvml.device_by_index(index).map_err(|e| {
                MonitorError::gpu_not_available(format!("GPU {} not found: {}", index, e))
            })?;

            Ok(Self {
                nvml,
                device_index: index,
            })
        }
        #[cfg(not(feature = "nvml"))]
        {
            let _ = index;
            Err(MonitorError::gpu_not_available(
                "NVIDIA GPU support not enabled",
            ))
        }
    }

    #[cfg(feature = "nvml")]
    fn get_device(&self) -> Result<Device<'_>> {
        self.nvml.device_by_index(self.device_index).map_err(|e| {
            MonitorError::metric_collection(format!("Failed to get GPU device: {}", e))
        })
    }
}

impl GpuProvider for NvidiaGpuProvider {
    fn name(&self) -> String {
        #[cfg(feature = "nvml")]
        {
            self.get_device()
                .and_then(|d| {
                    d.name()
                        .map_err(|e| MonitorError::metric_collection(e.to_string()))
                })
                .unwrap_or_else(|_| format!("NVIDIA GPU {}", self.device_index))
        }
        #[cfg(not(feature = "nvml"))]
        {
            format!("NVIDIA GPU {}", self.device_index)
        }
    }

    fn collect_usage(&mut self) -> Result<GpuUsage> {
        #[cfg(feature = "nvml")]
        {
            let device = self.get_device()?;

            let utilization = device.utilization_rates().map_err(|e| {
                MonitorError::metric_collection(format!("Failed to get utilization: {}", e))
            })?;

            let memory_info = device.memory_info().map_err(|e| {
                MonitorError::metric_collection(format!("Failed to get memory info: {}", e))
            })?;

            let temperature = device
                .temperature(TemperatureSensor::Gpu)
                .ok()
                .map(|t| t as f32);

            Ok(GpuUsage {
                usage_percent: utilization.gpu as f32,
                memory_used_bytes: memory_info.used,
                memory_total_bytes: memory_info.total,
                temperature_celsius: temperature,
            })
        }
        #[cfg(not(feature = "nvml"))]
        {
            Err(MonitorError::gpu_not_available(
                "NVIDIA GPU support not enabled",
            ))
        }
    }
}
