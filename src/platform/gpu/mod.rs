//! GPU-specific platform code.
//!
//! Provides GPU usage collection. NVIDIA devices are supported through NVML
//! when the `nvml` feature is enabled.

mod nvidia;

pub use nvidia::NvidiaGpuProvider;

use crate::core::system_monitor::GpuProvider;
use crate::error::{MonitorError, Result};

/// Attempt to get an available GPU provider
///
/// Returns error if no supported GPU is available.
pub fn get_gpu_provider() -> Result<Box<dyn GpuProvider>> {
    match NvidiaGpuProvider::new() {
        Ok(provider) => Ok(Box::new(provider)),
        Err(e) => {
            log::debug!("NVIDIA GPU unavailable: {}", e);
            Err(MonitorError::gpu_not_available("No supported GPU found"))
        }
    }
}
