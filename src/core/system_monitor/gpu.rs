use super::metrics::GpuUsage;
use crate::error::Result;

/// Trait for GPU metrics providers
///
/// Implementations live in the platform layer. A provider that fails to
/// report is treated by the sampler as "no GPU" for that sample.
pub trait GpuProvider: Send {
    /// Human readable device name
    fn name(&self) -> String;

    /// Collect current GPU usage
    fn collect_usage(&mut self) -> Result<GpuUsage>;
}
